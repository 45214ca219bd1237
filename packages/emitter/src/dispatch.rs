use std::ops::ControlFlow;
use std::rc::Rc;

use slot_pool::Key;

use crate::Args;
use crate::error::{Result, UsageError};
use crate::event::EventCore;
use crate::slot::{Invocation, ListenerSlot};
use crate::verdict::Verdict;

impl<T, R> EventCore<T, R> {
    /// Ordered synchronous dispatch with the full verdict protocol.
    ///
    /// Returns the collected results when the event collects, `None` otherwise.
    pub(crate) fn emit_now(&self, args: &Args<T>) -> Result<Option<Vec<R>>> {
        if self.is_sequential() {
            return Err(UsageError::SequentialDispatchRequired {
                event_name: self.name().to_string(),
            });
        }

        Ok(self.run_full_pass(args))
    }

    /// Reduced-guarantee dispatch: verdicts are not evaluated beyond `once` removal,
    /// nothing is collected and no plan is consulted or captured.
    pub(crate) fn emit_quick_now(&self, args: &Args<T>) -> Result<()> {
        if self.is_sequential() {
            return Err(UsageError::SequentialDispatchRequired {
                event_name: self.name().to_string(),
            });
        }

        let mut index = 0_usize;

        while index < self.store_span() {
            if let Some(slot) = self.slot_at(index) {
                _ = slot.invoke_sync(args.values());

                if slot.is_once() {
                    self.remove_listener_if_current(Key::from_index(index), &slot);
                }
            }

            index = index
                .checked_add(1)
                .expect("slot indices are bounded by the store span, which fits in usize");
        }

        Ok(())
    }

    /// Ordered dispatch that awaits each listener's future before invoking the next.
    ///
    /// Works on any event; on events holding only synchronous listeners it behaves like
    /// the synchronous full pass.
    pub(crate) async fn emit_async_now(&self, args: &Args<T>) -> Option<Vec<R>> {
        let mut results = self.collect_enabled().then(Vec::new);

        if let Some(plan) = self.plan_for_dispatch() {
            for call in plan.calls() {
                let verdict = match call.slot().invoke(args.values()) {
                    Invocation::Ready(verdict) => verdict,
                    Invocation::Pending(future) => future.await,
                };

                if self
                    .settle(call.key(), call.slot(), verdict, &mut results)
                    .is_break()
                {
                    break;
                }
            }
        } else {
            let mut index = 0_usize;

            while index < self.store_span() {
                if let Some(slot) = self.slot_at(index) {
                    let verdict = match slot.invoke(args.values()) {
                        Invocation::Ready(verdict) => verdict,
                        Invocation::Pending(future) => future.await,
                    };

                    if self
                        .settle(Key::from_index(index), &slot, verdict, &mut results)
                        .is_break()
                    {
                        break;
                    }
                }

                index = index
                    .checked_add(1)
                    .expect("slot indices are bounded by the store span, which fits in usize");
            }
        }

        results
    }

    /// Dispatches a final pass with `args`, then latches `args` as the completed payload
    /// for replay to listeners registered afterwards.
    ///
    /// The pass discards results; completion is a signal, not a query. Listeners present
    /// at completion time stay registered.
    pub(crate) fn complete_now(&self, args: Args<T>) -> Result<()> {
        if self.is_sequential() {
            return Err(UsageError::SequentialDispatchRequired {
                event_name: self.name().to_string(),
            });
        }

        _ = self.run_full_pass(&args);
        self.set_latch(args);

        Ok(())
    }

    fn run_full_pass(&self, args: &Args<T>) -> Option<Vec<R>> {
        let mut results = self.collect_enabled().then(Vec::new);

        if let Some(plan) = self.plan_for_dispatch() {
            for call in plan.calls() {
                let verdict = call.slot().invoke_sync(args.values());

                if self
                    .settle(call.key(), call.slot(), verdict, &mut results)
                    .is_break()
                {
                    break;
                }
            }
        } else {
            self.interpret_pass(args, &mut results);
        }

        results
    }

    /// Walks the live store slot by slot, re-reading state before every step so that
    /// removals and registrations made by earlier listeners of the same pass are honored.
    fn interpret_pass(&self, args: &Args<T>, results: &mut Option<Vec<R>>) {
        let mut index = 0_usize;

        while index < self.store_span() {
            if let Some(slot) = self.slot_at(index) {
                let verdict = slot.invoke_sync(args.values());

                if self
                    .settle(Key::from_index(index), &slot, verdict, results)
                    .is_break()
                {
                    break;
                }
            }

            index = index
                .checked_add(1)
                .expect("slot indices are bounded by the store span, which fits in usize");
        }
    }

    /// Applies one listener's verdict: the break check first, then removal, then result
    /// collection.
    ///
    /// A break that stops the pass leaves the breaking listener registered even if it was
    /// registered with `once`; stopping the pass is not a completed invocation.
    fn settle(
        &self,
        key: Key,
        slot: &Rc<ListenerSlot<T, R>>,
        verdict: Verdict<R>,
        results: &mut Option<Vec<R>>,
    ) -> ControlFlow<()> {
        match verdict {
            Verdict::Break if self.halt_on_break_enabled() => return ControlFlow::Break(()),
            Verdict::Detach => self.remove_listener_if_current(key, slot),
            Verdict::Continue(value) => {
                if slot.is_once() {
                    self.remove_listener_if_current(key, slot);
                }

                if let Some(results) = results.as_mut() {
                    results.push(value);
                }
            }
            Verdict::Break => {
                // An inert break completes the listener normally; it just carries no
                // result value.
                if slot.is_once() {
                    self.remove_listener_if_current(key, slot);
                }
            }
        }

        ControlFlow::Continue(())
    }
}
