//! Auto-Savings Pallet
//!
//! Per-account savings policies that divert a share of every incoming asset into a
//! yield-bearing vault. An account activates the module with a set of tracked assets and
//! their policies, adjusts them one asset at a time, and the account framework calls
//! [`OnAssetReceived`] whenever funds arrive so the configured share is deposited,
//! converting it first through the [`ConversionVenue`] when the vault takes a different
//! asset.
//!
//! Policies live in [`SavingsConfigs`]. The set of tracked assets per account is a
//! sentinel-anchored linked list ([`registry::TrackedAssetRegistry`]) giving O(1) insert
//! and remove with enumeration in insertion order.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod adapters;
pub use adapters::{ConversionVenue, OnAssetReceived, SavingsLifecycle, VaultOps};

pub mod registry;
pub use registry::TrackedAssetRegistry;

pub mod types;
pub use types::{ListNode, RegistryState, SavingsPolicy};

pub mod weights;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub const LOG_TARGET: &str = "runtime::auto-savings";

#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId, AssetId, VaultId, Balance> {
  /// Distinct asset for every `index`.
  fn asset(index: u32) -> AssetId;
  /// A vault accepting deposits of `underlying`.
  fn vault(underlying: AssetId) -> VaultId;
  fn fund(who: &AccountId, asset: AssetId, amount: Balance);
  /// Makes `asset_in -> asset_out` convertible on the venue.
  fn enable_conversion(asset_in: AssetId, asset_out: AssetId);
}

#[frame::pallet]
pub mod pallet {
  use super::{
    ConversionVenue, LOG_TARGET, ListNode, OnAssetReceived, RegistryState, SavingsLifecycle,
    SavingsPolicy, TrackedAssetRegistry, VaultOps, WeightInfo,
  };
  use alloc::{collections::BTreeSet, vec::Vec};
  use codec::DecodeAll;
  use frame::prelude::*;
  use polkadot_sdk::{
    frame_support::storage::with_storage_layer,
    sp_core::U256,
    sp_runtime::traits::{SaturatedConversion, Zero},
  };
  use primitives::savings::{BasisPoints, MAX_BASIS_POINTS, is_valid_basis_points};

  #[pallet::config]
  pub trait Config: frame_system::Config {
    /// Identifier of the assets an account receives and saves
    type AssetId: Parameter + Member + Copy + Ord + MaybeSerializeDeserialize + MaxEncodedLen;

    /// Identifier of a yield vault
    type VaultId: Parameter + Member + Copy + MaybeSerializeDeserialize + MaxEncodedLen;

    type Balance: Parameter
      + Member
      + AtLeast32BitUnsigned
      + Default
      + Copy
      + Into<u128>
      + MaybeSerializeDeserialize
      + MaxEncodedLen;

    /// Vault backend receiving the saved amounts
    type Vault: VaultOps<Self::AccountId, Self::VaultId, Self::AssetId, Self::Balance>;

    /// Conversion venue used when the vault takes a different asset than the one received
    type Venue: ConversionVenue<Self::AccountId, Self::AssetId, Self::Balance>;

    /// Maximum number of assets a single account may track
    #[pallet::constant]
    type MaxTrackedAssets: Get<u32>;

    type WeightInfo: WeightInfo;

    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<
        Self::AccountId,
        Self::AssetId,
        Self::VaultId,
        Self::Balance,
      >;
  }

  pub type BalanceOf<T> = <T as Config>::Balance;
  pub type AssetIdOf<T> = <T as Config>::AssetId;
  pub type PolicyOf<T> = SavingsPolicy<<T as Config>::VaultId>;
  pub type ListNodeOf<T> = ListNode<<T as Config>::AssetId>;
  pub type TrackedAssetsOf<T> = BoundedVec<<T as Config>::AssetId, <T as Config>::MaxTrackedAssets>;
  pub type PoliciesOf<T> = BoundedVec<PolicyOf<T>, <T as Config>::MaxTrackedAssets>;

  #[pallet::pallet]
  #[pallet::storage_version(STORAGE_VERSION)]
  pub struct Pallet<T>(_);

  /// The current storage version.
  const STORAGE_VERSION: StorageVersion = StorageVersion::new(1);

  /// Savings policy per account and asset. Absent entries read as the zero policy.
  #[pallet::storage]
  pub type SavingsConfigs<T: Config> = StorageDoubleMap<
    _,
    Blake2_128Concat,
    T::AccountId,
    Blake2_128Concat,
    T::AssetId,
    PolicyOf<T>,
    ValueQuery,
  >;

  /// Successor links of the per-account tracked asset list
  #[pallet::storage]
  pub type TrackedAssetLinks<T: Config> = StorageDoubleMap<
    _,
    Blake2_128Concat,
    T::AccountId,
    Blake2_128Concat,
    ListNodeOf<T>,
    ListNodeOf<T>,
    OptionQuery,
  >;

  /// List header per activated account
  #[pallet::storage]
  pub type Registries<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, RegistryState<T::AssetId>, OptionQuery>;

  #[pallet::hooks]
  impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
    fn integrity_test() {
      assert!(
        T::MaxTrackedAssets::get() > 0,
        "MaxTrackedAssets must allow at least one asset"
      );
    }

    #[cfg(feature = "try-runtime")]
    fn try_state(_n: BlockNumberFor<T>) -> Result<(), polkadot_sdk::sp_runtime::TryRuntimeError> {
      Self::do_try_state()
    }
  }

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// Module activated with `tracked` assets
    ModuleInstalled { account: T::AccountId, tracked: u32 },
    /// Module deactivated, `cleared` policies dropped
    ModuleUninstalled { account: T::AccountId, cleared: u32 },
    ConfigSet {
      account: T::AccountId,
      asset: T::AssetId,
      policy: PolicyOf<T>,
    },
    ConfigDeleted {
      account: T::AccountId,
      asset: T::AssetId,
    },
    /// Saved share converted into the vault asset
    AssetConverted {
      account: T::AccountId,
      asset_in: T::AssetId,
      asset_out: T::AssetId,
      amount_in: T::Balance,
      amount_out: T::Balance,
    },
    AutoSaveExecuted {
      account: T::AccountId,
      asset: T::AssetId,
      vault: T::VaultId,
      amount_saved: T::Balance,
      deposited: T::Balance,
      shares: T::Balance,
    },
    /// Policy yields nothing to save for the received amount
    AutoSaveSkipped {
      account: T::AccountId,
      asset: T::AssetId,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Percentage above 10 000 basis points
    InvalidPercentage,
    /// Policy without a destination vault
    InvalidVault,
    /// Price deviation above 10 000 basis points
    InvalidPriceDeviation,
    /// Asset and policy lists differ in length
    LengthMismatch,
    DuplicateAsset,
    AlreadyInitialized,
    NotInitialized,
    /// Given node is not the predecessor of the asset
    InvalidPredecessor,
    NoConfigForAsset,
    TooManyTrackedAssets,
    /// Install payload does not decode into assets and policies
    MalformedInstallData,
    /// Pagination cursor is neither the sentinel nor a tracked asset
    InvalidCursor,
    InvalidPageSize,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Activate the module for the caller with `assets` and their respective `policies`.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::install(assets.len() as u32))]
    pub fn install(
      origin: OriginFor<T>,
      assets: TrackedAssetsOf<T>,
      policies: PoliciesOf<T>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_activate(&who, &assets, &policies)
    }

    /// Deactivate the module for the caller, dropping every policy.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::uninstall(T::MaxTrackedAssets::get()))]
    pub fn uninstall(origin: OriginFor<T>) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_deactivate(&who)
    }

    /// Create or overwrite the caller's policy for `asset`.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::set_config())]
    pub fn set_config(
      origin: OriginFor<T>,
      asset: T::AssetId,
      policy: PolicyOf<T>,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_set_config(&who, asset, policy)
    }

    /// Stop tracking `asset`. `predecessor` is the node linking to it, see
    /// [`Pallet::predecessor_of`].
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::delete_config())]
    pub fn delete_config(
      origin: OriginFor<T>,
      predecessor: ListNodeOf<T>,
      asset: T::AssetId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_delete_config(&who, predecessor, asset)
    }

    /// Save the configured share of `amount_received` of `asset`.
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::auto_save())]
    pub fn auto_save(
      origin: OriginFor<T>,
      asset: T::AssetId,
      amount_received: T::Balance,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::do_auto_save(&who, asset, amount_received)
    }
  }

  impl<T: Config> Pallet<T> {
    pub fn is_initialized(who: &T::AccountId) -> bool {
      TrackedAssetRegistry::<T>::is_initialized(who)
    }

    /// Policy of `who` for `asset`; the zero policy when none is set.
    pub fn config_of(who: &T::AccountId, asset: &T::AssetId) -> PolicyOf<T> {
      SavingsConfigs::<T>::get(who, asset)
    }

    /// Tracked assets of `who` in insertion order.
    pub fn tracked_assets(who: &T::AccountId) -> Vec<T::AssetId> {
      TrackedAssetRegistry::<T>::list(who)
    }

    /// Page of at most `page_size` tracked assets after `start`, with the cursor of the
    /// next page (the sentinel when exhausted).
    pub fn tracked_assets_paginated(
      who: &T::AccountId,
      start: ListNodeOf<T>,
      page_size: u32,
    ) -> Result<(Vec<T::AssetId>, ListNodeOf<T>), DispatchError> {
      TrackedAssetRegistry::<T>::list_paginated(who, start, page_size)
    }

    pub fn predecessor_of(who: &T::AccountId, asset: &T::AssetId) -> Option<ListNodeOf<T>> {
      TrackedAssetRegistry::<T>::predecessor_of(who, asset)
    }

    pub fn validate_policy(policy: &PolicyOf<T>) -> DispatchResult {
      ensure!(
        is_valid_basis_points(policy.percentage),
        Error::<T>::InvalidPercentage
      );
      ensure!(policy.vault.is_some(), Error::<T>::InvalidVault);
      ensure!(
        is_valid_basis_points(policy.max_price_deviation),
        Error::<T>::InvalidPriceDeviation
      );
      Ok(())
    }

    /// `floor(amount * percentage / 10_000)`, computed without intermediate overflow.
    pub fn calc_deposit_amount(
      amount: T::Balance,
      percentage: BasisPoints,
    ) -> Result<T::Balance, DispatchError> {
      ensure!(
        is_valid_basis_points(percentage),
        Error::<T>::InvalidPercentage
      );
      let amount: u128 = amount.into();
      // A u128 times a u16 fits in 144 bits.
      let saved = U256::from(amount) * U256::from(percentage) / U256::from(MAX_BASIS_POINTS);
      // `saved <= amount`, so neither narrowing clamps.
      Ok(saved.low_u128().saturated_into())
    }

    /// Validates every entry before writing anything, so a failing entry leaves no state.
    pub fn do_activate(
      who: &T::AccountId,
      assets: &[T::AssetId],
      policies: &[PolicyOf<T>],
    ) -> DispatchResult {
      ensure!(assets.len() == policies.len(), Error::<T>::LengthMismatch);
      ensure!(!Self::is_initialized(who), Error::<T>::AlreadyInitialized);
      ensure!(
        assets.len() <= T::MaxTrackedAssets::get() as usize,
        Error::<T>::TooManyTrackedAssets
      );

      let mut seen = BTreeSet::new();
      for (asset, policy) in assets.iter().zip(policies) {
        Self::validate_policy(policy)?;
        ensure!(seen.insert(*asset), Error::<T>::DuplicateAsset);
      }

      TrackedAssetRegistry::<T>::initialize(who, assets)?;
      for (asset, policy) in assets.iter().zip(policies) {
        SavingsConfigs::<T>::insert(who, asset, policy);
      }

      let tracked = assets.len() as u32;
      log::debug!(target: LOG_TARGET, "auto-savings installed for {who:?} with {tracked} assets");
      Self::deposit_event(Event::ModuleInstalled {
        account: who.clone(),
        tracked,
      });
      Ok(())
    }

    pub fn do_deactivate(who: &T::AccountId) -> DispatchResult {
      ensure!(Self::is_initialized(who), Error::<T>::NotInitialized);
      for asset in TrackedAssetRegistry::<T>::list(who) {
        SavingsConfigs::<T>::remove(who, asset);
      }
      let cleared = TrackedAssetRegistry::<T>::clear(who)?;

      log::debug!(target: LOG_TARGET, "auto-savings uninstalled for {who:?}, {cleared} policies cleared");
      Self::deposit_event(Event::ModuleUninstalled {
        account: who.clone(),
        cleared,
      });
      Ok(())
    }

    pub fn do_set_config(
      who: &T::AccountId,
      asset: T::AssetId,
      policy: PolicyOf<T>,
    ) -> DispatchResult {
      ensure!(Self::is_initialized(who), Error::<T>::NotInitialized);
      Self::validate_policy(&policy)?;
      TrackedAssetRegistry::<T>::insert(who, asset)?;
      SavingsConfigs::<T>::insert(who, asset, policy);

      Self::deposit_event(Event::ConfigSet {
        account: who.clone(),
        asset,
        policy,
      });
      Ok(())
    }

    pub fn do_delete_config(
      who: &T::AccountId,
      predecessor: ListNodeOf<T>,
      asset: T::AssetId,
    ) -> DispatchResult {
      ensure!(Self::is_initialized(who), Error::<T>::NotInitialized);
      TrackedAssetRegistry::<T>::remove(who, predecessor, asset)?;
      SavingsConfigs::<T>::remove(who, asset);

      Self::deposit_event(Event::ConfigDeleted {
        account: who.clone(),
        asset,
      });
      Ok(())
    }

    /// Deposits the configured share of `amount_received` into the policy's vault.
    ///
    /// When the vault takes another asset the share is sold on [`Config::Venue`] first,
    /// bounded by the policy's `max_price_deviation`, and the proceeds are deposited.
    /// Venue and vault errors are returned unchanged. A zero share touches neither.
    pub fn do_auto_save(
      who: &T::AccountId,
      asset: T::AssetId,
      amount_received: T::Balance,
    ) -> DispatchResult {
      let policy = SavingsConfigs::<T>::get(who, asset);
      let vault = policy.vault.ok_or(Error::<T>::NoConfigForAsset)?;

      let amount_saved = Self::calc_deposit_amount(amount_received, policy.percentage)?;
      if amount_saved.is_zero() {
        log::debug!(target: LOG_TARGET, "nothing to save for {who:?} from {amount_received:?} of {asset:?}");
        Self::deposit_event(Event::AutoSaveSkipped {
          account: who.clone(),
          asset,
        });
        return Ok(());
      }

      let vault_asset = T::Vault::underlying_asset(&vault)?;
      let deposited = if vault_asset == asset {
        amount_saved
      } else {
        let amount_out = T::Venue::swap_exact_in(
          who,
          asset,
          amount_saved,
          vault_asset,
          policy.max_price_deviation,
        )?;
        Self::deposit_event(Event::AssetConverted {
          account: who.clone(),
          asset_in: asset,
          asset_out: vault_asset,
          amount_in: amount_saved,
          amount_out,
        });
        amount_out
      };

      let shares = T::Vault::deposit(&vault, who, deposited)?;
      log::debug!(
        target: LOG_TARGET,
        "saved {amount_saved:?} of {asset:?} for {who:?}, deposited {deposited:?} for {shares:?} shares"
      );
      Self::deposit_event(Event::AutoSaveExecuted {
        account: who.clone(),
        asset,
        vault,
        amount_saved,
        deposited,
        shares,
      });
      Ok(())
    }

    /// Checks every registry against its links and the stored policies.
    #[cfg(any(feature = "try-runtime", test))]
    pub fn do_try_state() -> Result<(), DispatchError> {
      let mut tracked = BTreeSet::new();
      for (who, state) in Registries::<T>::iter() {
        for asset in TrackedAssetRegistry::<T>::check_integrity(&who, &state)? {
          ensure!(
            !SavingsConfigs::<T>::get(&who, asset).is_empty(),
            DispatchError::Other("tracked asset without policy")
          );
          tracked.insert((who.clone(), asset));
        }
      }
      for (who, asset, _) in SavingsConfigs::<T>::iter() {
        ensure!(
          tracked.contains(&(who, asset)),
          DispatchError::Other("policy stored for untracked asset")
        );
      }
      for (who, _, _) in TrackedAssetLinks::<T>::iter() {
        ensure!(
          Registries::<T>::contains_key(&who),
          DispatchError::Other("list links left behind without registry")
        );
      }
      Ok(())
    }
  }

  impl<T: Config> SavingsLifecycle<T::AccountId> for Pallet<T> {
    fn on_install(who: &T::AccountId, data: &[u8]) -> DispatchResult {
      let (assets, policies) =
        <(TrackedAssetsOf<T>, PoliciesOf<T>)>::decode_all(&mut &data[..])
          .map_err(|_| Error::<T>::MalformedInstallData)?;
      with_storage_layer(|| Self::do_activate(who, &assets, &policies))
    }

    fn on_uninstall(who: &T::AccountId) -> DispatchResult {
      with_storage_layer(|| Self::do_deactivate(who))
    }

    fn is_initialized(who: &T::AccountId) -> bool {
      TrackedAssetRegistry::<T>::is_initialized(who)
    }
  }

  impl<T: Config> OnAssetReceived<T::AccountId, T::AssetId, T::Balance> for Pallet<T> {
    fn on_asset_received(
      who: &T::AccountId,
      asset: T::AssetId,
      amount: T::Balance,
    ) -> DispatchResult {
      with_storage_layer(|| Self::do_auto_save(who, asset, amount))
    }
  }
}
