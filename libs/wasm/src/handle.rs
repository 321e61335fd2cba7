//! # Handle Manager
//!
//! Gives every kernel solid a host-visible identity with single-owner,
//! exactly-once release.
//!
//! Solids live in a generational slot map. A [`SolidHandle`] owns one slot;
//! dropping it (the host finalizing its reference) releases the slot, as does
//! an explicit [`HandleManager::release`]. Releasing twice is harmless, and a
//! stale key can never reach a solid created later in the same slot.
//!
//! Operations borrow solids through [`HandleManager::unwrap`], which hands
//! out a reference-counted pointer. A solid released while an operation still
//! holds it stays alive until that operation returns.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use csg_kernel::Manifold;
use serde::Serialize;
use slotmap::{new_key_type, Key, KeyData, SlotMap};
use tracing::{debug, warn};

use crate::error::{CsgError, CsgResult};

new_key_type! {
    /// Slot of one live solid.
    pub struct SolidKey;
}

impl SolidKey {
    /// Opaque integer form handed to the host.
    pub fn to_id(self) -> u64 {
        self.data().as_ffi()
    }

    /// Inverse of [`SolidKey::to_id`]. Unknown ids produce keys that match
    /// no slot.
    pub fn from_id(id: u64) -> Self {
        KeyData::from_ffi(id).into()
    }
}

#[derive(Debug, Default)]
struct Registry {
    solids: SlotMap<SolidKey, Rc<Manifold>>,
    wrapped: u64,
    released: u64,
}

impl Registry {
    fn remove(&mut self, key: SolidKey) -> Option<Rc<Manifold>> {
        let solid = self.solids.remove(key)?;
        self.released += 1;
        Some(solid)
    }
}

/// Counters for embedders checking that nothing leaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct HandleStats {
    /// Solids currently owned by a handle.
    pub live: usize,
    /// Total handles created.
    pub wrapped: u64,
    /// Total slots released, explicitly, by drop, or by donation.
    pub released: u64,
}

// =============================================================================
// MANAGER
// =============================================================================

/// Owner of every solid the host can see.
///
/// Cloning the manager yields another reference to the same registry.
#[derive(Debug, Clone, Default)]
pub struct HandleManager {
    registry: Rc<RefCell<Registry>>,
}

impl HandleManager {
    /// Empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a fresh solid and return its only handle.
    pub fn wrap(&self, solid: Manifold) -> SolidHandle {
        let mut registry = self.registry.borrow_mut();
        let key = registry.solids.insert(Rc::new(solid));
        registry.wrapped += 1;
        debug!(?key, "wrapped solid");
        SolidHandle {
            key,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Borrow the solid behind a handle for the duration of one operation.
    pub fn unwrap(&self, handle: &SolidHandle) -> CsgResult<Rc<Manifold>> {
        self.check_owner(handle)?;
        self.lookup(handle.key)
    }

    /// Borrow the solid in a slot.
    pub fn lookup(&self, key: SolidKey) -> CsgResult<Rc<Manifold>> {
        self.registry
            .borrow()
            .solids
            .get(key)
            .cloned()
            .ok_or_else(|| released(key))
    }

    /// Destroy the solid and invalidate the handle. Returns `false` when it
    /// was already released.
    pub fn release(&self, handle: &SolidHandle) -> CsgResult<bool> {
        self.check_owner(handle)?;
        Ok(self.release_key(handle.key))
    }

    pub(crate) fn release_key(&self, key: SolidKey) -> bool {
        let removed = self.registry.borrow_mut().remove(key);
        debug!(?key, released = removed.is_some(), "release");
        removed.is_some()
    }

    /// Remove a solid from its slot and hand it over, invalidating every
    /// reference to the slot.
    pub(crate) fn take(&self, key: SolidKey) -> CsgResult<Manifold> {
        let solid = self
            .registry
            .borrow_mut()
            .remove(key)
            .ok_or_else(|| released(key))?;
        debug!(?key, "donated solid");
        // an operation still borrowing the solid keeps its own copy alive
        Ok(Rc::try_unwrap(solid).unwrap_or_else(|shared| (*shared).clone()))
    }

    /// True while the slot holds a solid.
    pub fn is_live(&self, key: SolidKey) -> bool {
        self.registry.borrow().solids.contains_key(key)
    }

    /// True when `handle` was issued here and its solid is still live.
    pub fn holds(&self, handle: &SolidHandle) -> bool {
        self.check_owner(handle).is_ok() && self.is_live(handle.key)
    }

    /// Current counters.
    pub fn stats(&self) -> HandleStats {
        let registry = self.registry.borrow();
        HandleStats {
            live: registry.solids.len(),
            wrapped: registry.wrapped,
            released: registry.released,
        }
    }

    fn check_owner(&self, handle: &SolidHandle) -> CsgResult<()> {
        if Weak::ptr_eq(&handle.registry, &Rc::downgrade(&self.registry)) {
            Ok(())
        } else {
            Err(CsgError::ReleasedHandle(
                "handle belongs to another session".to_string(),
            ))
        }
    }
}

fn released(key: SolidKey) -> CsgError {
    CsgError::ReleasedHandle(format!("solid {} has been released", key.to_id()))
}

// =============================================================================
// HANDLE
// =============================================================================

/// The single owner of one solid. Not `Clone`: copying a solid goes through
/// the dispatcher and produces a second, independent handle.
#[derive(Debug)]
pub struct SolidHandle {
    key: SolidKey,
    registry: Weak<RefCell<Registry>>,
}

impl SolidHandle {
    /// Slot this handle owns.
    pub fn key(&self) -> SolidKey {
        self.key
    }

    /// Opaque id for the host.
    pub fn id(&self) -> u64 {
        self.key.to_id()
    }
}

impl Drop for SolidHandle {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let Ok(mut registry) = registry.try_borrow_mut() else {
            warn!(key = ?self.key, "registry busy, solid not released on drop");
            return;
        };
        if registry.remove(self.key).is_some() {
            debug!(key = ?self.key, "released solid on drop");
        }
    }
}

// =============================================================================
// COLLECTION
// =============================================================================

/// Input of a batch operation. Each element was either copied in, leaving
/// the source handle valid, or donated, invalidating it. Dropping the
/// collection releases every element exactly once.
#[derive(Debug, Default)]
pub struct SolidCollection {
    solids: Vec<Manifold>,
}

impl SolidCollection {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a deep copy. The source handle stays valid.
    pub fn copy_into(&mut self, manager: &HandleManager, handle: &SolidHandle) -> CsgResult<()> {
        let solid = manager.unwrap(handle)?;
        self.solids.push((*solid).clone());
        Ok(())
    }

    /// Append by key, copying.
    pub(crate) fn copy_key(&mut self, manager: &HandleManager, key: SolidKey) -> CsgResult<()> {
        let solid = manager.lookup(key)?;
        self.solids.push((*solid).clone());
        Ok(())
    }

    /// Append by consuming the handle. Its solid moves into the collection.
    pub fn donate_into(&mut self, manager: &HandleManager, handle: SolidHandle) -> CsgResult<()> {
        manager.check_owner(&handle)?;
        self.donate_key(manager, handle.key)
    }

    /// Append by key, donating. Host references to the key become stale.
    pub(crate) fn donate_key(&mut self, manager: &HandleManager, key: SolidKey) -> CsgResult<()> {
        self.solids.push(manager.take(key)?);
        Ok(())
    }

    /// Elements in insertion order.
    pub fn as_slice(&self) -> &[Manifold] {
        &self.solids
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.solids.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }
}
