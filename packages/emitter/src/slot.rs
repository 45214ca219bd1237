use std::cell::RefCell;
use std::fmt::{self, Debug, Formatter};

use futures::future::LocalBoxFuture;
use slot_pool::Key;

use crate::Verdict;

/// A synchronous listener callback as stored by the registry.
pub(crate) type SyncCallback<T, R> = Box<dyn FnMut(&[T]) -> Verdict<R>>;

/// A future-returning listener callback as stored by the registry.
pub(crate) type FutureCallback<T, R> = Box<dyn FnMut(&[T]) -> LocalBoxFuture<'static, Verdict<R>>>;

/// Identifies one registered listener within one named event.
///
/// Returned by the registration methods and consumed by [`off()`][crate::Emitter::off].
/// A key addresses the slot the listener occupies, not the listener itself: after the
/// listener is unregistered, its slot (and therefore its key) is reused by the next
/// registration on the same event. Holding a key across removals is allowed, but acting
/// on a stale key affects whatever listener occupies the slot now, or nothing at all if
/// the slot is vacant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ListenerKey {
    pub(crate) key: Key,
}

impl ListenerKey {
    /// The raw slot index behind the key.
    ///
    /// Slot indices are observable behavior: a new registration reuses the most recently
    /// vacated slot, and an event whose listener set empties out starts again from index
    /// zero.
    #[must_use]
    pub fn index(self) -> usize {
        self.key.index()
    }
}

/// The callback behind one listener registration.
pub(crate) enum ListenerBody<T, R> {
    /// A listener that completes within the call.
    Sync(SyncCallback<T, R>),

    /// A listener that returns a future to await before the next listener runs. Only
    /// present on events configured for sequential dispatch.
    Future(FutureCallback<T, R>),
}

/// One occupied slot of an event's listener store.
///
/// Shared via `Rc` between the store and any dispatch plan that captured it, so removing
/// the listener from the store never invalidates an in-flight pass that already holds the
/// slot.
pub(crate) struct ListenerSlot<T, R> {
    /// The callback. In a cell because invoking an `FnMut` needs exclusive access while
    /// the slot itself is shared. The borrow spans one synchronous invocation at most; it
    /// is released before any returned future is awaited.
    body: RefCell<ListenerBody<T, R>>,

    /// Unregister after the first completed invocation.
    once: bool,

    /// The body is the `Future` variant. Kept outside the cell so bookkeeping can read it
    /// while an invocation is in progress.
    future: bool,
}

impl<T, R> ListenerSlot<T, R> {
    pub(crate) fn new_sync(callback: SyncCallback<T, R>, once: bool) -> Self {
        Self {
            body: RefCell::new(ListenerBody::Sync(callback)),
            once,
            future: false,
        }
    }

    pub(crate) fn new_future(callback: FutureCallback<T, R>, once: bool) -> Self {
        Self {
            body: RefCell::new(ListenerBody::Future(callback)),
            once,
            future: true,
        }
    }

    pub(crate) fn is_once(&self) -> bool {
        self.once
    }

    pub(crate) fn is_future(&self) -> bool {
        self.future
    }

    /// Invokes the listener on a path that cannot await.
    ///
    /// # Panics
    ///
    /// Panics if the body is future-returning (the registration rules keep those off
    /// events the synchronous paths dispatch) or if this listener is already
    /// mid-invocation, which happens when a listener emits its own event in a way that
    /// reaches itself recursively.
    pub(crate) fn invoke_sync(&self, args: &[T]) -> Verdict<R> {
        match &mut *self.body.borrow_mut() {
            ListenerBody::Sync(callback) => callback(args),
            ListenerBody::Future(_) => {
                panic!("future-returning listener reached a synchronous dispatch path")
            }
        }
    }

    /// Invokes the listener, returning either the verdict or the future that will produce
    /// it. The body borrow is released before this returns, so the caller can await the
    /// future without holding any borrow.
    pub(crate) fn invoke(&self, args: &[T]) -> Invocation<R> {
        match &mut *self.body.borrow_mut() {
            ListenerBody::Sync(callback) => Invocation::Ready(callback(args)),
            ListenerBody::Future(callback) => Invocation::Pending(callback(args)),
        }
    }
}

impl<T, R> Debug for ListenerSlot<T, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSlot")
            .field("once", &self.once)
            .field("future", &self.future)
            .finish_non_exhaustive()
    }
}

/// The immediate product of invoking a listener.
pub(crate) enum Invocation<R> {
    /// The listener completed synchronously.
    Ready(Verdict<R>),

    /// The listener returned a future; the verdict arrives when it resolves.
    Pending(LocalBoxFuture<'static, Verdict<R>>),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use futures::FutureExt;
    use futures::executor::block_on;

    use super::*;

    #[test]
    fn sync_body_returns_verdict_directly() {
        let slot = ListenerSlot::<u32, u32>::new_sync(
            Box::new(|args| Verdict::Continue(args.iter().sum())),
            false,
        );

        assert_eq!(slot.invoke_sync(&[1, 2, 3]), Verdict::Continue(6));
        assert!(!slot.is_once());
        assert!(!slot.is_future());
    }

    #[test]
    fn future_body_resolves_through_invoke() {
        let slot = ListenerSlot::<u32, u32>::new_future(
            Box::new(|args| {
                let total = args.iter().sum();
                async move { Verdict::Continue(total) }.boxed_local()
            }),
            true,
        );

        assert!(slot.is_once());
        assert!(slot.is_future());

        let verdict = match slot.invoke(&[4, 5]) {
            Invocation::Ready(_) => panic!("future body must not resolve synchronously"),
            Invocation::Pending(future) => block_on(future),
        };

        assert_eq!(verdict, Verdict::Continue(9));
    }

    #[test]
    fn sync_body_is_ready_through_invoke() {
        let slot = ListenerSlot::<u32, ()>::new_sync(Box::new(|_args| Verdict::Break), false);

        assert!(matches!(
            slot.invoke(&[]),
            Invocation::Ready(Verdict::Break)
        ));
    }

    #[test]
    #[should_panic]
    fn sync_path_rejects_future_body() {
        let slot = ListenerSlot::<u32, ()>::new_future(
            Box::new(|_args| async { Verdict::Continue(()) }.boxed_local()),
            false,
        );

        _ = slot.invoke_sync(&[]);
    }
}
