//! Adapter traits for the auto-savings pallet
//!
//! The pallet never moves balances itself. Vault deposits and asset conversion go
//! through [`VaultOps`] and [`ConversionVenue`], which the runtime implements on top of
//! its vault and DEX pallets. The account framework drives the pallet through
//! [`SavingsLifecycle`] and [`OnAssetReceived`].

use frame::prelude::*;
use primitives::savings::BasisPoints;

/// Yield vault accepting deposits of a single underlying asset in exchange for shares.
pub trait VaultOps<AccountId, VaultId, AssetId, Balance> {
  /// Asset the vault accepts for deposits.
  fn underlying_asset(vault: &VaultId) -> Result<AssetId, DispatchError>;

  /// Moves `amount` of the underlying asset from `depositor` into `vault` and credits the
  /// issued shares to `depositor`. Returns the number of shares issued.
  ///
  /// Must fail without side effects on insufficient balance or allowance.
  fn deposit(
    vault: &VaultId,
    depositor: &AccountId,
    amount: Balance,
  ) -> Result<Balance, DispatchError>;
}

/// Asset conversion venue used when the received asset is not the vault's asset.
pub trait ConversionVenue<AccountId, AssetId, Balance> {
  /// Sells exactly `amount_in` of `asset_in` held by `who` for `asset_out`, credited to
  /// `who`. Returns the amount of `asset_out` received.
  ///
  /// `max_price_deviation` bounds the execution price in basis points; `0` requests the
  /// venue's default behaviour. Fails when the bound is violated or liquidity is short.
  fn swap_exact_in(
    who: &AccountId,
    asset_in: AssetId,
    amount_in: Balance,
    asset_out: AssetId,
    max_price_deviation: BasisPoints,
  ) -> Result<Balance, DispatchError>;
}

/// Lifecycle entry points called by the account framework.
pub trait SavingsLifecycle<AccountId> {
  /// Activates the module for `who`. `data` is the SCALE encoding of the tracked assets
  /// and their policies.
  fn on_install(who: &AccountId, data: &[u8]) -> DispatchResult;

  /// Deactivates the module for `who`, dropping every policy.
  fn on_uninstall(who: &AccountId) -> DispatchResult;

  fn is_initialized(who: &AccountId) -> bool;
}

/// Receipt notification from the account framework.
pub trait OnAssetReceived<AccountId, AssetId, Balance> {
  fn on_asset_received(who: &AccountId, asset: AssetId, amount: Balance) -> DispatchResult;
}

/// Vault adapter for runtimes without a vault backend. Every call fails.
impl<AccountId, VaultId, AssetId, Balance> VaultOps<AccountId, VaultId, AssetId, Balance> for () {
  fn underlying_asset(_: &VaultId) -> Result<AssetId, DispatchError> {
    Err(DispatchError::Other("VaultOps not configured"))
  }

  fn deposit(_: &VaultId, _: &AccountId, _: Balance) -> Result<Balance, DispatchError> {
    Err(DispatchError::Other("VaultOps not configured"))
  }
}

/// Venue adapter for runtimes where every vault takes the received asset directly.
impl<AccountId, AssetId, Balance> ConversionVenue<AccountId, AssetId, Balance> for () {
  fn swap_exact_in(
    _: &AccountId,
    _: AssetId,
    _: Balance,
    _: AssetId,
    _: BasisPoints,
  ) -> Result<Balance, DispatchError> {
    Err(DispatchError::Other("ConversionVenue not configured"))
  }
}
