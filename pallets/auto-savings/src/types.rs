use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use primitives::savings::BasisPoints;
use scale_info::TypeInfo;

/// Savings policy of one account for one tracked asset.
///
/// The default value is the zero policy (`0`, no vault, `0`), which is what lookups
/// return for assets without a configured policy.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct SavingsPolicy<VaultId> {
  /// Share of every received amount to save, in basis points
  pub percentage: BasisPoints,
  /// Destination vault, `None` only for the zero policy
  pub vault: Option<VaultId>,
  /// Execution price bound for conversions, in basis points (`0` = venue default)
  pub max_price_deviation: BasisPoints,
}

impl<VaultId> Default for SavingsPolicy<VaultId> {
  fn default() -> Self {
    Self {
      percentage: 0,
      vault: None,
      max_price_deviation: 0,
    }
  }
}

impl<VaultId> SavingsPolicy<VaultId> {
  pub fn new(percentage: BasisPoints, vault: VaultId, max_price_deviation: BasisPoints) -> Self {
    Self {
      percentage,
      vault: Some(vault),
      max_price_deviation,
    }
  }

  /// True for the zero policy, i.e. nothing configured.
  pub fn is_empty(&self) -> bool {
    self.vault.is_none()
  }
}

/// Node of the per-account tracked asset list.
///
/// `Sentinel` anchors the list and is a variant of its own, so it can never be mistaken
/// for an asset identifier.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  MaxEncodedLen,
)]
pub enum ListNode<AssetId> {
  Sentinel,
  Asset(AssetId),
}

impl<AssetId> ListNode<AssetId> {
  pub fn is_sentinel(&self) -> bool {
    matches!(self, ListNode::Sentinel)
  }
}

/// Header of an initialized tracked asset list.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Encode,
  Eq,
  PartialEq,
  TypeInfo,
  MaxEncodedLen,
)]
pub struct RegistryState<AssetId> {
  /// Last node before the sentinel; the sentinel itself while the list is empty
  pub tail: ListNode<AssetId>,
  pub len: u32,
}

impl<AssetId> Default for RegistryState<AssetId> {
  fn default() -> Self {
    Self {
      tail: ListNode::Sentinel,
      len: 0,
    }
  }
}
