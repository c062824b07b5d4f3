#![cfg_attr(not(feature = "std"), no_std)]

pub mod assets;
pub mod savings;

pub use assets::*;
pub use savings::*;
