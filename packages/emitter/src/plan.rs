use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use slot_pool::{Key, SlotPool};

use crate::slot::ListenerSlot;

/// One listener call captured in a [`DispatchPlan`].
pub(crate) struct PlannedCall<T, R> {
    /// The slot key the listener occupied at capture time. Removal after a planned
    /// invocation goes through this key, guarded by slot identity in case the slot has
    /// been reused since.
    key: Key,

    /// The captured listener. A strong reference, so the plan keeps planned listeners
    /// alive even if they are unregistered between capture and the pass that walks the
    /// plan.
    slot: Rc<ListenerSlot<T, R>>,
}

impl<T, R> PlannedCall<T, R> {
    pub(crate) fn key(&self) -> Key {
        self.key
    }

    pub(crate) fn slot(&self) -> &Rc<ListenerSlot<T, R>> {
        &self.slot
    }
}

/// A dispatch routine specialized for one snapshot of an event's listener set.
///
/// Walking the plan touches no live slot storage: every call was resolved at capture
/// time, so the pass performs no hole checks and no per-index lookups. The cost is that
/// the plan is only valid for the exact listener set it captured; the owning event
/// discards it on any mutation of the set and captures a fresh one on the next eligible
/// dispatch.
pub(crate) struct DispatchPlan<T, R> {
    calls: Vec<PlannedCall<T, R>>,
}

impl<T, R> DispatchPlan<T, R> {
    /// Captures the current listener set, in slot order.
    pub(crate) fn capture(store: &SlotPool<Rc<ListenerSlot<T, R>>>) -> Self {
        Self {
            calls: store
                .iter()
                .map(|(key, slot)| PlannedCall {
                    key,
                    slot: Rc::clone(slot),
                })
                .collect(),
        }
    }

    pub(crate) fn calls(&self) -> &[PlannedCall<T, R>] {
        &self.calls
    }
}

impl<T, R> Debug for DispatchPlan<T, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchPlan")
            .field("calls", &self.calls.len())
            .finish()
    }
}
