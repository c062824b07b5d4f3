#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use core::marker::PhantomData;
use polkadot_sdk::frame_support::{
  traits::Get,
  weights::{constants::RocksDbWeight, Weight},
};

pub trait WeightInfo {
  fn install(n: u32) -> Weight;
  fn uninstall(n: u32) -> Weight;
  fn set_config() -> Weight;
  fn delete_config() -> Weight;
  fn auto_save() -> Weight;
}

pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config> WeightInfo for SubstrateWeight<T> {
  /// Storage: `AutoSavings::Registries` (r:1 w:1)
  /// Storage: `AutoSavings::TrackedAssetLinks` (r:n w:2n+1)
  /// Storage: `AutoSavings::SavingsConfigs` (r:0 w:n)
  fn install(n: u32) -> Weight {
    Weight::from_parts(18_000_000, 1600)
      .saturating_add(Weight::from_parts(6_500_000, 0).saturating_mul(n.into()))
      .saturating_add(T::DbWeight::get().reads(1_u64.saturating_add(n.into())))
      .saturating_add(T::DbWeight::get().writes(2_u64.saturating_add(3_u64.saturating_mul(n.into()))))
  }

  /// Storage: `AutoSavings::Registries` (r:1 w:1)
  /// Storage: `AutoSavings::TrackedAssetLinks` (r:n+1 w:n+1)
  /// Storage: `AutoSavings::SavingsConfigs` (r:0 w:n)
  fn uninstall(n: u32) -> Weight {
    Weight::from_parts(16_000_000, 1600)
      .saturating_add(Weight::from_parts(4_200_000, 0).saturating_mul(n.into()))
      .saturating_add(T::DbWeight::get().reads(3_u64.saturating_add(2_u64.saturating_mul(n.into()))))
      .saturating_add(T::DbWeight::get().writes(2_u64.saturating_add(2_u64.saturating_mul(n.into()))))
  }

  fn set_config() -> Weight {
    Weight::from_parts(22_000_000, 3200)
      .saturating_add(T::DbWeight::get().reads(3))
      .saturating_add(T::DbWeight::get().writes(4))
  }

  fn delete_config() -> Weight {
    Weight::from_parts(20_000_000, 3200)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(4))
  }

  /// Vault and venue calls are accounted for as the worst case conversion path.
  fn auto_save() -> Weight {
    Weight::from_parts(95_000_000, 8000)
      .saturating_add(T::DbWeight::get().reads(12))
      .saturating_add(T::DbWeight::get().writes(10))
  }
}

impl WeightInfo for () {
  fn install(n: u32) -> Weight {
    Weight::from_parts(18_000_000, 1600)
      .saturating_add(Weight::from_parts(6_500_000, 0).saturating_mul(n.into()))
      .saturating_add(RocksDbWeight::get().reads(1_u64.saturating_add(n.into())))
      .saturating_add(RocksDbWeight::get().writes(2_u64.saturating_add(3_u64.saturating_mul(n.into()))))
  }

  fn uninstall(n: u32) -> Weight {
    Weight::from_parts(16_000_000, 1600)
      .saturating_add(Weight::from_parts(4_200_000, 0).saturating_mul(n.into()))
      .saturating_add(RocksDbWeight::get().reads(3_u64.saturating_add(2_u64.saturating_mul(n.into()))))
      .saturating_add(RocksDbWeight::get().writes(2_u64.saturating_add(2_u64.saturating_mul(n.into()))))
  }

  fn set_config() -> Weight {
    Weight::from_parts(22_000_000, 3200)
      .saturating_add(RocksDbWeight::get().reads(3))
      .saturating_add(RocksDbWeight::get().writes(4))
  }

  fn delete_config() -> Weight {
    Weight::from_parts(20_000_000, 3200)
      .saturating_add(RocksDbWeight::get().reads(4))
      .saturating_add(RocksDbWeight::get().writes(4))
  }

  fn auto_save() -> Weight {
    Weight::from_parts(95_000_000, 8000)
      .saturating_add(RocksDbWeight::get().reads(12))
      .saturating_add(RocksDbWeight::get().writes(10))
  }
}
