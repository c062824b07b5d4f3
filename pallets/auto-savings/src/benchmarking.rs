#![cfg(feature = "runtime-benchmarks")]

use crate::*;
use alloc::vec::Vec;
use frame::prelude::*;
use polkadot_sdk::frame_benchmarking::v2::*;
use polkadot_sdk::frame_system::RawOrigin;

#[benchmarks]
mod benches {
  use super::*;

  type Helper<T> = <T as Config>::BenchmarkHelper;

  fn tracked_fixture<T: Config>(n: u32) -> (TrackedAssetsOf<T>, PoliciesOf<T>) {
    let vault = Helper::<T>::vault(Helper::<T>::asset(0));
    let assets: Vec<T::AssetId> = (0..n).map(Helper::<T>::asset).collect();
    let policies: Vec<PolicyOf<T>> = (0..n)
      .map(|_| SavingsPolicy::new(5_000, vault, 0))
      .collect();
    (
      BoundedVec::truncate_from(assets),
      BoundedVec::truncate_from(policies),
    )
  }

  fn install_fixture<T: Config>(who: &T::AccountId, n: u32) {
    let (assets, policies) = tracked_fixture::<T>(n);
    assert!(Pallet::<T>::do_activate(who, &assets, &policies).is_ok());
  }

  #[benchmark]
  fn install(n: Linear<0, { T::MaxTrackedAssets::get() }>) {
    let caller: T::AccountId = whitelisted_caller();
    let (assets, policies) = tracked_fixture::<T>(n);

    #[extrinsic_call]
    _(RawOrigin::Signed(caller.clone()), assets, policies);

    assert_eq!(Pallet::<T>::tracked_assets(&caller).len() as u32, n);
  }

  #[benchmark]
  fn uninstall(n: Linear<0, { T::MaxTrackedAssets::get() }>) {
    let caller: T::AccountId = whitelisted_caller();
    install_fixture::<T>(&caller, n);

    #[extrinsic_call]
    _(RawOrigin::Signed(caller.clone()));

    assert!(!Pallet::<T>::is_initialized(&caller));
  }

  #[benchmark]
  fn set_config() {
    let caller: T::AccountId = whitelisted_caller();
    let max = T::MaxTrackedAssets::get();
    install_fixture::<T>(&caller, max.saturating_sub(1));
    let asset = Helper::<T>::asset(max);
    let policy = SavingsPolicy::new(2_500, Helper::<T>::vault(asset), 100);

    #[extrinsic_call]
    _(RawOrigin::Signed(caller.clone()), asset, policy);

    assert_eq!(Pallet::<T>::config_of(&caller, &asset), policy);
  }

  #[benchmark]
  fn delete_config() {
    let caller: T::AccountId = whitelisted_caller();
    let max = T::MaxTrackedAssets::get();
    install_fixture::<T>(&caller, max);
    let asset = Helper::<T>::asset(max.saturating_sub(1));
    let predecessor = Pallet::<T>::predecessor_of(&caller, &asset).unwrap_or(ListNode::Sentinel);

    #[extrinsic_call]
    _(RawOrigin::Signed(caller.clone()), predecessor, asset);

    assert!(Pallet::<T>::config_of(&caller, &asset).is_empty());
  }

  #[benchmark]
  fn auto_save() {
    let caller: T::AccountId = whitelisted_caller();
    let asset_in = Helper::<T>::asset(0);
    let asset_out = Helper::<T>::asset(1);
    let vault = Helper::<T>::vault(asset_out);
    let amount: T::Balance = 1_000_000u32.into();
    Helper::<T>::enable_conversion(asset_in, asset_out);
    Helper::<T>::fund(&caller, asset_in, amount);
    assert!(Pallet::<T>::do_activate(
      &caller,
      &[asset_in],
      &[SavingsPolicy::new(10_000, vault, 0)]
    )
    .is_ok());

    #[extrinsic_call]
    _(RawOrigin::Signed(caller.clone()), asset_in, amount);

    assert!(frame_system::Pallet::<T>::events().len() > 0);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
