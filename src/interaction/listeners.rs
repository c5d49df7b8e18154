use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Document-level pointer events a drag subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerEventKind {
    Move,
    Up,
}

/// Identity of something that can hold listeners (one per drag controller).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerOwner(u64);

#[derive(Debug, Default)]
struct Registry {
    next_owner: u64,
    next_entry: u64,
    entries: Vec<Entry>,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    id: u64,
    owner: ListenerOwner,
    kind: PointerEventKind,
}

/// Shared table of global pointer listeners.
///
/// Stands in for `document.addEventListener`: whoever routes raw pointer events asks the table
/// which owners currently listen for a kind. Entries live exactly as long as the
/// [`ListenerGuard`] returned by [`PointerListeners::attach`].
#[derive(Clone, Debug, Default)]
pub struct PointerListeners {
    inner: Rc<RefCell<Registry>>,
}

impl PointerListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh owner identity.
    pub fn new_owner(&self) -> ListenerOwner {
        let mut reg = self.inner.borrow_mut();
        reg.next_owner += 1;
        ListenerOwner(reg.next_owner)
    }

    /// Register `owner` for each of `kinds`; the listeners detach when the guard drops.
    pub fn attach(&self, owner: ListenerOwner, kinds: &[PointerEventKind]) -> ListenerGuard {
        let mut reg = self.inner.borrow_mut();
        let mut ids = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            reg.next_entry += 1;
            let id = reg.next_entry;
            reg.entries.push(Entry { id, owner, kind });
            ids.push(id);
        }
        tracing::trace!(?owner, ?kinds, "attached pointer listeners");
        ListenerGuard {
            registry: Rc::downgrade(&self.inner),
            ids,
        }
    }

    /// Owners listening for `kind`, in attach order.
    pub fn listeners_for(&self, kind: PointerEventKind) -> Vec<ListenerOwner> {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.owner)
            .collect()
    }

    pub fn is_attached(&self, owner: ListenerOwner, kind: PointerEventKind) -> bool {
        self.inner
            .borrow()
            .entries
            .iter()
            .any(|e| e.owner == owner && e.kind == kind)
    }

    /// Total number of live listener entries.
    pub fn attached_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

/// Keeps a set of listeners attached; dropping it detaches them.
#[derive(Debug)]
#[must_use = "listeners detach as soon as the guard is dropped"]
pub struct ListenerGuard {
    registry: Weak<RefCell<Registry>>,
    ids: Vec<u64>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut reg = registry.borrow_mut();
        reg.entries.retain(|e| !self.ids.contains(&e.id));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/interaction/listeners.rs"]
mod tests;
