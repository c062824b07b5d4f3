//! Tracked asset registry
//!
//! Every activated account owns a circular singly-linked list of the assets it has a
//! policy for. Links live in [`TrackedAssetLinks`] as `node -> successor`, anchored by
//! [`ListNode::Sentinel`]; walking from the sentinel yields the assets in insertion order
//! and ends back at the sentinel. [`Registries`] keeps the tail and the length so that
//! appends are O(1). Removal is O(1) as well but needs the caller to name the
//! predecessor, which [`TrackedAssetRegistry::list`] or
//! [`TrackedAssetRegistry::predecessor_of`] reveal.

use crate::pallet::{Config, Error, Registries, TrackedAssetLinks};
use crate::types::{ListNode, RegistryState};
use alloc::{collections::BTreeSet, vec::Vec};
use core::marker::PhantomData;
use frame::prelude::*;

pub struct TrackedAssetRegistry<T>(PhantomData<T>);

impl<T: Config> TrackedAssetRegistry<T> {
  pub fn is_initialized(who: &T::AccountId) -> bool {
    Registries::<T>::contains_key(who)
  }

  pub fn contains(who: &T::AccountId, asset: &T::AssetId) -> bool {
    TrackedAssetLinks::<T>::contains_key(who, ListNode::Asset(*asset))
  }

  pub fn len(who: &T::AccountId) -> u32 {
    Registries::<T>::get(who)
      .map(|state| state.len)
      .unwrap_or_default()
  }

  /// Creates the sentinel for `who` and appends `assets` in order.
  ///
  /// Nothing is written unless every asset is distinct and the list fits the bound.
  pub fn initialize(who: &T::AccountId, assets: &[T::AssetId]) -> DispatchResult {
    ensure!(!Self::is_initialized(who), Error::<T>::AlreadyInitialized);
    ensure!(
      assets.len() <= T::MaxTrackedAssets::get() as usize,
      Error::<T>::TooManyTrackedAssets
    );
    let mut seen = BTreeSet::new();
    for asset in assets {
      ensure!(seen.insert(*asset), Error::<T>::DuplicateAsset);
    }

    let sentinel = ListNode::<T::AssetId>::Sentinel;
    TrackedAssetLinks::<T>::insert(who, sentinel, sentinel);
    Registries::<T>::insert(who, RegistryState::<T::AssetId>::default());
    for asset in assets {
      Self::insert(who, *asset)?;
    }
    Ok(())
  }

  /// Links `asset` in right before the sentinel. Returns `false` if it was already listed.
  pub fn insert(who: &T::AccountId, asset: T::AssetId) -> Result<bool, DispatchError> {
    let mut state = Registries::<T>::get(who).ok_or(Error::<T>::NotInitialized)?;
    let node = ListNode::Asset(asset);
    if TrackedAssetLinks::<T>::contains_key(who, node) {
      return Ok(false);
    }
    ensure!(
      state.len < T::MaxTrackedAssets::get(),
      Error::<T>::TooManyTrackedAssets
    );
    TrackedAssetLinks::<T>::insert(who, state.tail, node);
    TrackedAssetLinks::<T>::insert(who, node, ListNode::<T::AssetId>::Sentinel);
    state.tail = node;
    state.len = state.len.saturating_add(1);
    Registries::<T>::insert(who, state);
    Ok(true)
  }

  /// Unlinks `asset`, whose current predecessor must be `predecessor`.
  pub fn remove(
    who: &T::AccountId,
    predecessor: ListNode<T::AssetId>,
    asset: T::AssetId,
  ) -> DispatchResult {
    let mut state = Registries::<T>::get(who).ok_or(Error::<T>::NotInitialized)?;
    let node = ListNode::Asset(asset);
    ensure!(
      TrackedAssetLinks::<T>::get(who, predecessor) == Some(node),
      Error::<T>::InvalidPredecessor
    );
    let successor = TrackedAssetLinks::<T>::take(who, node).ok_or(Error::<T>::InvalidPredecessor)?;
    TrackedAssetLinks::<T>::insert(who, predecessor, successor);
    if state.tail == node {
      state.tail = predecessor;
    }
    state.len = state.len.saturating_sub(1);
    Registries::<T>::insert(who, state);
    Ok(())
  }

  /// Every tracked asset of `who` in list order. Empty when not initialized.
  pub fn list(who: &T::AccountId) -> Vec<T::AssetId> {
    Self::list_paginated(who, ListNode::Sentinel, u32::MAX)
      .map(|(page, _)| page)
      .unwrap_or_default()
  }

  /// Up to `page_size` assets following `start`, plus the cursor to pass as `start` for
  /// the next page. The returned cursor is the sentinel once the end is reached.
  pub fn list_paginated(
    who: &T::AccountId,
    start: ListNode<T::AssetId>,
    page_size: u32,
  ) -> Result<(Vec<T::AssetId>, ListNode<T::AssetId>), DispatchError> {
    ensure!(page_size > 0, Error::<T>::InvalidPageSize);
    let mut cursor = match TrackedAssetLinks::<T>::get(who, start) {
      Some(next) => next,
      None if start.is_sentinel() => return Ok((Vec::new(), ListNode::Sentinel)),
      None => return Err(Error::<T>::InvalidCursor.into()),
    };
    let limit = Self::len(who).min(page_size) as usize;
    let mut page = Vec::with_capacity(limit);
    let mut last = start;
    while let ListNode::Asset(asset) = cursor {
      if page.len() as u32 == page_size {
        break;
      }
      page.push(asset);
      last = cursor;
      cursor = TrackedAssetLinks::<T>::get(who, cursor).unwrap_or(ListNode::Sentinel);
    }
    let next = if cursor.is_sentinel() {
      ListNode::Sentinel
    } else {
      last
    };
    Ok((page, next))
  }

  /// Node currently linking to `asset`, if `asset` is tracked.
  pub fn predecessor_of(
    who: &T::AccountId,
    asset: &T::AssetId,
  ) -> Option<ListNode<T::AssetId>> {
    let state = Registries::<T>::get(who)?;
    let target = ListNode::Asset(*asset);
    let mut previous = ListNode::<T::AssetId>::Sentinel;
    for _ in 0..state.len {
      let current = TrackedAssetLinks::<T>::get(who, previous)?;
      if current == target {
        return Some(previous);
      }
      if current.is_sentinel() {
        return None;
      }
      previous = current;
    }
    None
  }

  /// Unlinks every node including the sentinel. Returns how many assets were listed.
  pub fn clear(who: &T::AccountId) -> Result<u32, DispatchError> {
    let state = Registries::<T>::take(who).ok_or(Error::<T>::NotInitialized)?;
    let mut cursor = ListNode::<T::AssetId>::Sentinel;
    for _ in 0..=state.len {
      match TrackedAssetLinks::<T>::take(who, cursor) {
        Some(next) if !next.is_sentinel() => cursor = next,
        _ => break,
      }
    }
    Ok(state.len)
  }

  /// Walks the list of `who` and checks it against its header: `len` distinct assets,
  /// `tail` last, and a link back to the sentinel.
  pub fn check_integrity(
    who: &T::AccountId,
    state: &RegistryState<T::AssetId>,
  ) -> Result<Vec<T::AssetId>, DispatchError> {
    let mut seen = BTreeSet::new();
    let mut assets = Vec::new();
    let mut previous = ListNode::<T::AssetId>::Sentinel;
    let mut cursor = TrackedAssetLinks::<T>::get(who, previous)
      .ok_or(DispatchError::Other("registry without sentinel"))?;
    while let ListNode::Asset(asset) = cursor {
      ensure!(
        seen.insert(asset),
        DispatchError::Other("tracked asset list contains a cycle")
      );
      ensure!(
        assets.len() < state.len as usize,
        DispatchError::Other("tracked asset list longer than recorded")
      );
      assets.push(asset);
      previous = cursor;
      cursor = TrackedAssetLinks::<T>::get(who, cursor)
        .ok_or(DispatchError::Other("tracked asset list is broken"))?;
    }
    ensure!(
      assets.len() == state.len as usize,
      DispatchError::Other("tracked asset list shorter than recorded")
    );
    ensure!(
      previous == state.tail,
      DispatchError::Other("tracked asset tail is stale")
    );
    Ok(assets)
  }
}
