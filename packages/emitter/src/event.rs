use std::cell::{Cell, RefCell};
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use slot_pool::{Key, SlotPool};
use tracing::warn;

use crate::Args;
use crate::constants::{PLAN_MAX_LISTENERS, PLAN_MIN_LISTENERS};
use crate::error::{Result, UsageError};
use crate::options::{EventOptions, SharedConfig};
use crate::plan::DispatchPlan;
use crate::slot::{FutureCallback, ListenerKey, ListenerSlot, SyncCallback};

/// The complete state of one named event.
///
/// Shared by the registry map (one entry per name plus one per alias) and by every
/// [`EventHandle`][crate::EventHandle] pointing at the event. All mutation goes through
/// interior cells, and no borrow of any cell is held while a listener runs, so listeners
/// are free to call back into their own event.
pub(crate) struct EventCore<T, R> {
    /// The first name the event was created under.
    name: Rc<str>,

    /// Alternate names bound to this event by aliasing.
    aliases: RefCell<Vec<Rc<str>>>,

    /// The listener store. Borrowed only in short scopes, never across an invocation.
    store: RefCell<SlotPool<Rc<ListenerSlot<T, R>>>>,

    /// The dispatch plan for the current listener set. `None` means the next dispatch
    /// interprets, capturing a plan first if the set is eligible. Discarded eagerly on
    /// every mutation of the listener set.
    plan: RefCell<Option<Rc<DispatchPlan<T, R>>>>,

    /// Stop a pass when a listener returns [`Verdict::Break`][crate::Verdict::Break].
    halt_on_break: Cell<bool>,

    /// Gather `Continue` values during a pass and return them from the emit call.
    collect: Cell<bool>,

    /// Await each listener before the next one runs. Required for future-returning
    /// listeners and rejected by the synchronous emit surfaces.
    sequential: Cell<bool>,

    /// Permanently excludes this event from plan capture. One-way.
    deopt: Cell<bool>,

    /// The one-time leak warning for this event has been issued.
    warned: Cell<bool>,

    /// Listener count above which the leak warning fires.
    max_listeners: Cell<usize>,

    /// Set once the event completes; holds the payload replayed to late registrants.
    /// Shared through `Rc` so a replay can read the payload without holding a borrow of
    /// this cell while user code runs.
    latch: RefCell<Option<Rc<Args<T>>>>,

    /// Number of future-returning listeners currently in the store. Guards switching
    /// `sequential` off while any remain.
    future_listeners: Cell<usize>,

    /// Registry-wide configuration.
    config: Rc<SharedConfig>,
}

impl<T, R> EventCore<T, R> {
    pub(crate) fn new(name: Rc<str>, config: Rc<SharedConfig>) -> Rc<Self> {
        let max_listeners = config.default_max_listeners();

        Rc::new(Self {
            name,
            aliases: RefCell::new(Vec::new()),
            store: RefCell::new(SlotPool::new()),
            plan: RefCell::new(None),
            halt_on_break: Cell::new(false),
            collect: Cell::new(false),
            sequential: Cell::new(false),
            deopt: Cell::new(false),
            warned: Cell::new(false),
            max_listeners: Cell::new(max_listeners),
            latch: RefCell::new(None),
            future_listeners: Cell::new(0),
            config,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn note_alias(&self, alias: Rc<str>) {
        self.aliases.borrow_mut().push(alias);
    }

    pub(crate) fn is_sequential(&self) -> bool {
        self.sequential.get()
    }

    pub(crate) fn halt_on_break_enabled(&self) -> bool {
        self.halt_on_break.get()
    }

    pub(crate) fn collect_enabled(&self) -> bool {
        self.collect.get()
    }

    /// Applies an option set to this event. Only the options explicitly set are touched.
    ///
    /// Fails without applying anything if the set would switch sequential dispatch off
    /// while future-returning listeners remain registered.
    pub(crate) fn apply_options(&self, options: &EventOptions) -> Result<()> {
        if options.sequential == Some(false) && self.future_listeners.get() > 0 {
            return Err(UsageError::SequentialStillHasFutureListeners {
                event_name: self.name.to_string(),
            });
        }

        if let Some(sequential) = options.sequential {
            self.sequential.set(sequential);
        }

        if let Some(halt_on_break) = options.halt_on_break {
            self.halt_on_break.set(halt_on_break);
        }

        if let Some(collect) = options.collect {
            self.collect.set(collect);
        }

        if options.deopt {
            self.deopt.set(true);
            self.invalidate_plan();
        }

        if let Some(max_listeners) = options.max_listeners {
            self.max_listeners.set(max_listeners);
        }

        Ok(())
    }

    /// Registers a synchronous listener, or replays the latched payload to it if the
    /// event has already completed.
    ///
    /// Replay delivers the payload immediately and queues nothing, so there is no key to
    /// return. The replayed callback's verdict is discarded; with no slot in the store
    /// there is nothing for it to act on.
    pub(crate) fn add_sync(
        &self,
        mut callback: SyncCallback<T, R>,
        once: bool,
    ) -> Option<ListenerKey> {
        if let Some(latched) = self.latched_payload() {
            _ = callback(latched.values());
            return None;
        }

        Some(self.insert_slot(Rc::new(ListenerSlot::new_sync(callback, once))))
    }

    /// Registers a future-returning listener.
    ///
    /// Only sequential events can hold these, and a completed event cannot: its replay
    /// happens synchronously at registration time and cannot await.
    pub(crate) fn add_future(
        &self,
        callback: FutureCallback<T, R>,
        once: bool,
    ) -> Result<ListenerKey> {
        if self.is_completed() {
            return Err(UsageError::LatchedReplayRequiresSync {
                event_name: self.name.to_string(),
            });
        }

        if !self.sequential.get() {
            return Err(UsageError::SequentialRequired {
                event_name: self.name.to_string(),
            });
        }

        Ok(self.insert_slot(Rc::new(ListenerSlot::new_future(callback, once))))
    }

    fn insert_slot(&self, slot: Rc<ListenerSlot<T, R>>) -> ListenerKey {
        let is_future = slot.is_future();

        let (key, count) = {
            let mut store = self.store.borrow_mut();
            let key = store.insert(slot);
            (key, store.len())
        };

        if is_future {
            self.future_listeners.set(
                self.future_listeners
                    .get()
                    .checked_add(1)
                    .expect("future listener count cannot exceed the listener count"),
            );
        }

        self.invalidate_plan();
        self.warn_if_leaking(count);

        ListenerKey { key }
    }

    /// Unregisters the listener under `key`. Returns whether a listener was removed.
    pub(crate) fn remove_listener(&self, key: ListenerKey) -> bool {
        let removed = self.store.borrow_mut().remove(key.key);

        match removed {
            Some(slot) => {
                self.note_slot_removed(&slot);
                true
            }
            None => false,
        }
    }

    /// Unregisters the listener under `key` only if that slot still holds `slot`.
    ///
    /// Dispatch uses this for `once` and detach removal. Between the invocation and the
    /// removal the listener may have unregistered itself and the slot may already hold a
    /// newcomer, which must not be evicted by mistake.
    pub(crate) fn remove_listener_if_current(&self, key: Key, slot: &Rc<ListenerSlot<T, R>>) {
        let removed = {
            let mut store = self.store.borrow_mut();

            if store
                .get(key)
                .is_some_and(|current| Rc::ptr_eq(current, slot))
            {
                store.remove(key)
            } else {
                None
            }
        };

        if let Some(removed) = removed {
            self.note_slot_removed(&removed);
        }
    }

    fn note_slot_removed(&self, slot: &Rc<ListenerSlot<T, R>>) {
        if slot.is_future() {
            self.future_listeners.set(
                self.future_listeners
                    .get()
                    .checked_sub(1)
                    .expect("a future-returning listener was present, so the count is non-zero"),
            );
        }

        self.invalidate_plan();
    }

    /// Unregisters every listener of this event.
    pub(crate) fn clear_listeners(&self) {
        // The removed slots must outlive the store borrow: dropping a callback can run
        // arbitrary user code, including calls back into this event.
        let drained = {
            let mut store = self.store.borrow_mut();
            let drained: Vec<_> = store.iter().map(|(_, slot)| Rc::clone(slot)).collect();
            store.clear();
            drained
        };

        self.future_listeners.set(0);
        self.invalidate_plan();

        drop(drained);
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.store.borrow().len()
    }

    /// Number of slots a live walk of the store must visit, vacant slots included.
    pub(crate) fn store_span(&self) -> usize {
        self.store.borrow().span()
    }

    /// The listener at slot `index`, or `None` for a vacant slot or an index past the
    /// end. The store borrow is released before returning, so the caller can invoke the
    /// listener without holding it.
    pub(crate) fn slot_at(&self, index: usize) -> Option<Rc<ListenerSlot<T, R>>> {
        self.store.borrow().get(Key::from_index(index)).map(Rc::clone)
    }

    pub(crate) fn invalidate_plan(&self) {
        *self.plan.borrow_mut() = None;
    }

    /// The plan to walk for the coming pass, capturing one first if the listener set is
    /// eligible. `None` means the pass must interpret against live state.
    pub(crate) fn plan_for_dispatch(&self) -> Option<Rc<DispatchPlan<T, R>>> {
        if let Some(plan) = self.plan.borrow().as_ref() {
            return Some(Rc::clone(plan));
        }

        if !self.config.specialization_enabled() || self.deopt.get() {
            return None;
        }

        let plan = {
            let store = self.store.borrow();
            let count = store.len();

            if count < PLAN_MIN_LISTENERS || count >= PLAN_MAX_LISTENERS {
                return None;
            }

            Rc::new(DispatchPlan::capture(&store))
        };

        *self.plan.borrow_mut() = Some(Rc::clone(&plan));

        Some(plan)
    }

    /// The payload this event completed with, if it has completed.
    pub(crate) fn latched_payload(&self) -> Option<Rc<Args<T>>> {
        self.latch.borrow().clone()
    }

    /// Latches `args` as the completed payload without dispatching anything.
    pub(crate) fn set_latch(&self, args: Args<T>) {
        *self.latch.borrow_mut() = Some(Rc::new(args));
    }

    /// Releases the latch, returning the event to ordinary pre-completion behavior.
    /// Returns whether a latch was present.
    pub(crate) fn clear_latch(&self) -> bool {
        self.latch.borrow_mut().take().is_some()
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.latch.borrow().is_some()
    }

    fn warn_if_leaking(&self, count: usize) {
        if self.warned.get() || count <= self.max_listeners.get() {
            return;
        }

        self.warned.set(true);

        warn!(
            event_name = self.name.as_ref(),
            listener_count = count,
            max_listeners = self.max_listeners.get(),
            "listener count exceeds the configured maximum; this usually indicates a registration leak"
        );
    }

    /// Tears the event down: listeners, plan and latch are all dropped.
    ///
    /// Listeners that captured handles back into the registry form reference cycles;
    /// dropping the callbacks is what breaks them.
    pub(crate) fn teardown(&self) {
        self.clear_listeners();
        *self.latch.borrow_mut() = None;
    }
}

impl<T, R> Debug for EventCore<T, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventCore")
            .field("name", &self.name)
            .field("aliases", &self.aliases.borrow().len())
            .field("listeners", &self.store.borrow().len())
            .field("sequential", &self.sequential.get())
            .field("halt_on_break", &self.halt_on_break.get())
            .field("collect", &self.collect.get())
            .field("deopt", &self.deopt.get())
            .field("planned", &self.plan.borrow().is_some())
            .field("completed", &self.latch.borrow().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use futures::FutureExt;

    use super::*;
    use crate::Verdict;
    use crate::constants::DEFAULT_MAX_LISTENERS;

    fn test_core() -> Rc<EventCore<u32, ()>> {
        EventCore::new(
            Rc::from("test"),
            Rc::new(SharedConfig::new(true, DEFAULT_MAX_LISTENERS)),
        )
    }

    fn noop() -> SyncCallback<u32, ()> {
        Box::new(|_args| Verdict::Continue(()))
    }

    fn noop_future() -> FutureCallback<u32, ()> {
        Box::new(|_args| async { Verdict::Continue(()) }.boxed_local())
    }

    #[test]
    fn options_apply_only_what_was_set() {
        let core = test_core();

        core.apply_options(&EventOptions::new().collect(true))
            .unwrap();
        core.apply_options(&EventOptions::new().halt_on_break(true))
            .unwrap();

        // The second application must not have reset the first option.
        assert!(core.collect_enabled());
        assert!(core.halt_on_break_enabled());
        assert!(!core.is_sequential());
    }

    #[test]
    fn future_listener_requires_sequential() {
        let core = test_core();

        let result = core.add_future(noop_future(), false);

        assert_eq!(
            result.unwrap_err(),
            UsageError::SequentialRequired {
                event_name: "test".to_string()
            }
        );
    }

    #[test]
    fn sequential_is_locked_while_future_listeners_remain() {
        let core = test_core();
        core.apply_options(&EventOptions::new().sequential(true))
            .unwrap();

        let key = core.add_future(noop_future(), false).unwrap();

        assert_eq!(
            core.apply_options(&EventOptions::new().sequential(false))
                .unwrap_err(),
            UsageError::SequentialStillHasFutureListeners {
                event_name: "test".to_string()
            }
        );

        // Removing the future listener unlocks the option again.
        assert!(core.remove_listener(key));
        core.apply_options(&EventOptions::new().sequential(false))
            .unwrap();
        assert!(!core.is_sequential());
    }

    #[test]
    fn completed_event_rejects_future_listeners() {
        let core = test_core();
        core.apply_options(&EventOptions::new().sequential(true))
            .unwrap();
        core.set_latch(Args::from((7,)));

        let result = core.add_future(noop_future(), false);

        assert_eq!(
            result.unwrap_err(),
            UsageError::LatchedReplayRequiresSync {
                event_name: "test".to_string()
            }
        );
    }

    #[test]
    fn replay_delivers_payload_without_queueing() {
        let core = test_core();
        core.set_latch(Args::from((7,)));

        let seen = Rc::new(Cell::new(0_u32));
        let seen_by_listener = Rc::clone(&seen);

        let key = core.add_sync(
            Box::new(move |args| {
                seen_by_listener.set(args[0]);
                Verdict::Continue(())
            }),
            false,
        );

        assert_eq!(key, None);
        assert_eq!(seen.get(), 7);
        assert_eq!(core.listener_count(), 0);
    }

    #[test]
    fn clearing_the_latch_restores_queueing() {
        let core = test_core();
        core.set_latch(Args::new());

        assert!(core.clear_latch());
        assert!(!core.is_completed());

        let key = core.add_sync(noop(), false);

        assert!(key.is_some());
        assert_eq!(core.listener_count(), 1);
    }

    #[test]
    fn plan_requires_at_least_two_listeners() {
        let core = test_core();

        assert!(core.plan_for_dispatch().is_none());

        _ = core.add_sync(noop(), false);
        assert!(core.plan_for_dispatch().is_none());

        _ = core.add_sync(noop(), false);
        assert!(core.plan_for_dispatch().is_some());
    }

    #[test]
    fn plan_is_refused_at_the_ceiling() {
        let core = test_core();

        let mut keys = Vec::new();
        for _ in 0..PLAN_MAX_LISTENERS {
            keys.push(core.add_sync(noop(), false).unwrap());
        }

        assert!(core.plan_for_dispatch().is_none());

        // One below the ceiling is eligible again.
        let last = keys.pop().unwrap();
        assert!(core.remove_listener(last));

        assert!(core.plan_for_dispatch().is_some());
    }

    #[test]
    fn plan_is_reused_until_the_set_changes() {
        let core = test_core();
        _ = core.add_sync(noop(), false);
        _ = core.add_sync(noop(), false);

        let first = core.plan_for_dispatch().expect("set is eligible");
        let second = core.plan_for_dispatch().expect("set is unchanged");

        assert!(Rc::ptr_eq(&first, &second));

        _ = core.add_sync(noop(), false);
        let third = core.plan_for_dispatch().expect("set is still eligible");

        assert!(!Rc::ptr_eq(&first, &third));
    }

    #[test]
    fn removal_discards_the_plan() {
        let core = test_core();
        _ = core.add_sync(noop(), false);
        _ = core.add_sync(noop(), false);
        let key = core.add_sync(noop(), false).unwrap();

        let before = core.plan_for_dispatch().expect("set is eligible");

        assert!(core.remove_listener(key));

        let after = core.plan_for_dispatch().expect("set is still eligible");
        assert!(!Rc::ptr_eq(&before, &after));
    }

    #[test]
    fn deopt_suppresses_plan_capture() {
        let core = test_core();
        _ = core.add_sync(noop(), false);
        _ = core.add_sync(noop(), false);

        core.apply_options(&EventOptions::new().deopt()).unwrap();

        assert!(core.plan_for_dispatch().is_none());
    }

    #[test]
    fn disabled_specialization_suppresses_plan_capture() {
        let config = Rc::new(SharedConfig::new(false, DEFAULT_MAX_LISTENERS));
        let core = EventCore::<u32, ()>::new(Rc::from("test"), config);

        _ = core.add_sync(noop(), false);
        _ = core.add_sync(noop(), false);

        assert!(core.plan_for_dispatch().is_none());
    }

    #[test]
    fn removal_is_skipped_when_the_slot_was_reused() {
        let core = test_core();

        let key = core.add_sync(noop(), false).unwrap();
        let original = core.slot_at(key.index()).expect("slot is occupied");

        assert!(core.remove_listener(key));
        let replacement_key = core.add_sync(noop(), false).unwrap();
        assert_eq!(replacement_key.index(), key.index());

        // The identity guard must spare the newcomer now occupying the slot.
        core.remove_listener_if_current(key.key, &original);

        assert_eq!(core.listener_count(), 1);
    }

    #[test]
    fn leak_warning_is_issued_only_once() {
        let core = EventCore::<u32, ()>::new(Rc::from("test"), Rc::new(SharedConfig::new(true, 2)));

        _ = core.add_sync(noop(), false);
        _ = core.add_sync(noop(), false);
        assert!(!core.warned.get());

        _ = core.add_sync(noop(), false);
        assert!(core.warned.get());
    }

    #[test]
    fn teardown_empties_everything() {
        let core = test_core();
        _ = core.add_sync(noop(), false);
        _ = core.add_sync(noop(), false);
        core.set_latch(Args::new());

        core.teardown();

        assert_eq!(core.listener_count(), 0);
        assert!(!core.is_completed());
        assert!(core.plan_for_dispatch().is_none());
    }

    #[test]
    fn clearing_listeners_unlocks_sequential() {
        let core = test_core();
        core.apply_options(&EventOptions::new().sequential(true))
            .unwrap();
        _ = core.add_future(noop_future(), false).unwrap();
        _ = core.add_future(noop_future(), true).unwrap();

        core.clear_listeners();

        core.apply_options(&EventOptions::new().sequential(false))
            .unwrap();
        assert!(!core.is_sequential());
    }
}
