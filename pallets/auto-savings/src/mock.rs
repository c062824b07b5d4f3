use crate as pallet_auto_savings;

use polkadot_sdk::frame_support::traits::fungible::UnionOf;
use polkadot_sdk::frame_support::traits::fungibles::{Inspect, Mutate};
use polkadot_sdk::frame_support::traits::tokens::Preservation;
use polkadot_sdk::frame_support::{
  assert_ok, construct_runtime, derive_impl,
  traits::{AsEnsureOriginWithArg, ConstU32, ConstU128},
};
use polkadot_sdk::frame_system::{self, EnsureRoot, EnsureSigned};
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, Either,
  testing::H256,
  traits::{BlakeTwo256, Convert, IdentityLookup},
};
use primitives::{AssetKind, savings::MAX_BASIS_POINTS};
use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::{ConversionVenue, VaultOps};

type Block = frame_system::mocking::MockBlock<Test>;
pub type AccountId = u64;
pub type Balance = u128;
pub type VaultId = u32;

pub const ALICE: AccountId = 1;
pub const BOB: AccountId = 2;
pub const CHARLIE: AccountId = 3;

/// Owner of every asset class the mock creates
pub const ASSET_OWNER: AccountId = 999;

pub const USDC: AssetKind = AssetKind::Local(1);
pub const DAI: AssetKind = AssetKind::Local(2);
pub const WETH: AssetKind = AssetKind::Foreign(3);
pub const NATIVE: AssetKind = AssetKind::Native;

pub const USDC_VAULT: VaultId = 10;
pub const DAI_VAULT: VaultId = 20;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    AutoSavings: pallet_auto_savings,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = AccountId;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<Balance>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = Balance;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = Balance;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = AsEnsureOriginWithArg<EnsureSigned<Self::AccountId>>;
  type ForceOrigin = EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type ReserveData = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = AssetBenchmarkHelper;
}

#[cfg(feature = "runtime-benchmarks")]
pub struct AssetBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl polkadot_sdk::pallet_assets::BenchmarkHelper<u32, ()> for AssetBenchmarkHelper {
  fn create_asset_id_parameter(id: u32) -> u32 {
    id
  }
  fn create_reserve_id_parameter(_id: u32) -> () {
    ()
  }
}

impl pallet_auto_savings::Config for Test {
  type AssetId = AssetKind;
  type VaultId = VaultId;
  type Balance = Balance;
  type Vault = MockVault;
  type Venue = MockVenue;
  type MaxTrackedAssets = ConstU32<8>;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = MockBenchmarkHelper;
}

pub struct NativeOrAssetIdConverter;
impl Convert<AssetKind, Either<(), u32>> for NativeOrAssetIdConverter {
  fn convert(asset: AssetKind) -> Either<(), u32> {
    match asset {
      AssetKind::Native => Either::Left(()),
      AssetKind::Local(id) | AssetKind::Foreign(id) => Either::Right(id),
    }
  }
}

/// Native balances and `pallet-assets` behind one `fungibles` interface keyed by `AssetKind`
pub type MockFungibles = UnionOf<Balances, Assets, NativeOrAssetIdConverter, AssetKind, AccountId>;

/// Static vault parameters. Everything a deposit changes lives in pallet storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VaultInfo {
  pub underlying: AssetKind,
  pub share_asset: u32,
}

thread_local! {
  static VAULTS: RefCell<BTreeMap<VaultId, VaultInfo>> = const { RefCell::new(BTreeMap::new()) };

  // Sorted pair -> account holding the pool reserves
  static POOLS: RefCell<BTreeMap<(AssetKind, AssetKind), AccountId>> =
    const { RefCell::new(BTreeMap::new()) };

  static DEPOSITS_FROZEN: RefCell<bool> = const { RefCell::new(false) };
}

pub fn reset_mock_adapters() {
  VAULTS.with(|v| v.borrow_mut().clear());
  POOLS.with(|p| p.borrow_mut().clear());
  DEPOSITS_FROZEN.with(|f| *f.borrow_mut() = false);
}

/// Creates the `pallet-assets` class `id` as a sufficient asset unless it exists.
pub fn ensure_asset_class(id: u32) {
  if !<Assets as Inspect<AccountId>>::asset_exists(id) {
    assert_ok!(Assets::force_create(
      RuntimeOrigin::root(),
      id,
      ASSET_OWNER,
      true,
      1
    ));
  }
}

/// Mints `amount` of `asset` to `who`.
pub fn fund(who: AccountId, asset: AssetKind, amount: Balance) {
  if let Either::Right(id) = NativeOrAssetIdConverter::convert(asset) {
    ensure_asset_class(id);
  }
  assert_ok!(<MockFungibles as Mutate<AccountId>>::mint_into(
    asset, &who, amount
  ));
}

pub fn balance_of(who: AccountId, asset: AssetKind) -> Balance {
  <MockFungibles as Inspect<AccountId>>::balance(asset, &who)
}

fn transfer(
  from: AccountId,
  to: AccountId,
  asset: AssetKind,
  amount: Balance,
) -> Result<(), DispatchError> {
  <MockFungibles as Mutate<AccountId>>::transfer(asset, &from, &to, amount, Preservation::Expendable)
    .map(|_| ())
}

/// Account holding the deposits of `vault`.
pub fn vault_account(vault: VaultId) -> AccountId {
  1_000 + u64::from(vault)
}

/// Registers `id` as a vault for `underlying` with its own share asset.
pub fn create_vault(id: VaultId, underlying: AssetKind) {
  let share_asset = 10_000 + id;
  ensure_asset_class(share_asset);
  VAULTS.with(|v| {
    v.borrow_mut().insert(
      id,
      VaultInfo {
        underlying,
        share_asset,
      },
    );
  });
}

fn vault_info(id: VaultId) -> Option<VaultInfo> {
  VAULTS.with(|v| v.borrow().get(&id).copied())
}

pub fn vault_total_assets(id: VaultId) -> Balance {
  vault_info(id)
    .map(|info| balance_of(vault_account(id), info.underlying))
    .unwrap_or(0)
}

pub fn vault_total_shares(id: VaultId) -> Balance {
  vault_info(id)
    .map(|info| <Assets as Inspect<AccountId>>::total_issuance(info.share_asset))
    .unwrap_or(0)
}

pub fn vault_shares(id: VaultId, who: AccountId) -> Balance {
  vault_info(id)
    .map(|info| <Assets as Inspect<AccountId>>::balance(info.share_asset, &who))
    .unwrap_or(0)
}

pub fn freeze_deposits(frozen: bool) {
  DEPOSITS_FROZEN.with(|f| *f.borrow_mut() = frozen);
}

fn pool_key(asset_a: AssetKind, asset_b: AssetKind) -> (AssetKind, AssetKind) {
  if asset_a <= asset_b {
    (asset_a, asset_b)
  } else {
    (asset_b, asset_a)
  }
}

pub fn pool_account(asset_a: AssetKind, asset_b: AssetKind) -> Option<AccountId> {
  POOLS.with(|p| p.borrow().get(&pool_key(asset_a, asset_b)).copied())
}

/// Seeds a constant product pool between `asset_a` and `asset_b`.
pub fn set_pool(asset_a: AssetKind, asset_b: AssetKind, reserve_a: Balance, reserve_b: Balance) {
  let account = POOLS.with(|p| {
    let mut pools = p.borrow_mut();
    let next = 5_000 + pools.len() as AccountId;
    *pools.entry(pool_key(asset_a, asset_b)).or_insert(next)
  });
  fund(account, asset_a, reserve_a);
  fund(account, asset_b, reserve_b);
}

pub fn pool_reserves(asset_in: AssetKind, asset_out: AssetKind) -> Option<(Balance, Balance)> {
  let account = pool_account(asset_in, asset_out)?;
  Some((balance_of(account, asset_in), balance_of(account, asset_out)))
}

pub struct MockVault;

impl VaultOps<AccountId, VaultId, AssetKind, Balance> for MockVault {
  fn underlying_asset(vault: &VaultId) -> Result<AssetKind, DispatchError> {
    vault_info(*vault)
      .map(|info| info.underlying)
      .ok_or(DispatchError::Other("UnknownVault"))
  }

  /// Issues shares pro rata to the assets already held, 1:1 for the first deposit.
  fn deposit(vault: &VaultId, depositor: &AccountId, amount: Balance) -> Result<Balance, DispatchError> {
    if DEPOSITS_FROZEN.with(|f| *f.borrow()) {
      return Err(DispatchError::Other("DepositRejected"));
    }
    if amount == 0 {
      return Err(DispatchError::Other("ZeroDeposit"));
    }
    let info = vault_info(*vault).ok_or(DispatchError::Other("UnknownVault"))?;
    let total_assets = vault_total_assets(*vault);
    let total_shares = vault_total_shares(*vault);
    let minted = if total_shares == 0 || total_assets == 0 {
      amount
    } else {
      amount.saturating_mul(total_shares) / total_assets
    };
    transfer(*depositor, vault_account(*vault), info.underlying, amount)?;
    <Assets as Mutate<AccountId>>::mint_into(info.share_asset, depositor, minted)?;
    Ok(minted)
  }
}

pub struct MockVenue;

impl ConversionVenue<AccountId, AssetKind, Balance> for MockVenue {
  /// Constant product swap. The price deviation is the price impact of the trade,
  /// `amount_in / (reserve_in + amount_in)` in basis points.
  fn swap_exact_in(
    who: &AccountId,
    asset_in: AssetKind,
    amount_in: Balance,
    asset_out: AssetKind,
    max_price_deviation: u16,
  ) -> Result<Balance, DispatchError> {
    let pool = pool_account(asset_in, asset_out).ok_or(DispatchError::Other("NoRoute"))?;
    let reserve_in = balance_of(pool, asset_in);
    let reserve_out = balance_of(pool, asset_out);
    let pool_after = reserve_in.saturating_add(amount_in);
    let impact = amount_in.saturating_mul(Balance::from(MAX_BASIS_POINTS)) / pool_after;
    if max_price_deviation != 0 && impact > Balance::from(max_price_deviation) {
      return Err(DispatchError::Other("PriceDeviationExceeded"));
    }
    let amount_out = amount_in.saturating_mul(reserve_out) / pool_after;
    if amount_out == 0 {
      return Err(DispatchError::Other("InsufficientOutput"));
    }
    transfer(*who, pool, asset_in, amount_in)?;
    transfer(pool, *who, asset_out, amount_out)?;
    Ok(amount_out)
  }
}

#[cfg(feature = "runtime-benchmarks")]
pub struct MockBenchmarkHelper;

#[cfg(feature = "runtime-benchmarks")]
impl crate::BenchmarkHelper<AccountId, AssetKind, VaultId, Balance> for MockBenchmarkHelper {
  fn asset(index: u32) -> AssetKind {
    AssetKind::Local(100 + index)
  }

  fn vault(underlying: AssetKind) -> VaultId {
    let id = match underlying {
      AssetKind::Native => 500,
      AssetKind::Local(id) | AssetKind::Foreign(id) => 500 + id,
    };
    create_vault(id, underlying);
    id
  }

  fn fund(who: &AccountId, asset: AssetKind, amount: Balance) {
    fund(*who, asset, amount);
  }

  fn enable_conversion(asset_in: AssetKind, asset_out: AssetKind) {
    set_pool(asset_in, asset_out, 1_000_000_000_000, 1_000_000_000_000);
  }
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  let mut ext = polkadot_sdk::sp_io::TestExternalities::new(t);
  ext.execute_with(|| {
    reset_mock_adapters();
    System::set_block_number(1);
  });
  ext
}

/// Externalities with the standard fixtures: a USDC vault, a DAI vault and a deep
/// WETH/USDC pool, plus balances for ALICE and BOB.
pub fn new_test_ext_with_fixtures() -> polkadot_sdk::sp_io::TestExternalities {
  let mut ext = new_test_ext();
  ext.execute_with(|| {
    create_vault(USDC_VAULT, USDC);
    create_vault(DAI_VAULT, DAI);
    set_pool(WETH, USDC, 1_000_000, 2_000_000);
    for who in [ALICE, BOB] {
      fund(who, USDC, 1_000_000);
      fund(who, DAI, 1_000_000);
      fund(who, WETH, 1_000_000);
    }
  });
  ext
}
