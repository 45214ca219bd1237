use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::error::Result;
use crate::event::EventCore;
use crate::options::EventOptions;
use crate::slot::ListenerKey;
use crate::{Args, Verdict};

/// A handle bound to one event of an [`Emitter`][crate::Emitter].
///
/// Offers the same operations as the registry without the name lookup on every call.
/// Obtained from [`prepare()`][crate::Emitter::prepare]; clones are cheap and address
/// the same event.
///
/// The binding is to the event itself, not to its name: the handle keeps working even if
/// the name is later rebound to a different event by
/// [`alias()`][crate::Emitter::alias].
///
/// # Example
///
/// ```
/// use emitter::{Emitter, EventOptions, Verdict};
///
/// let emitter = Emitter::<u32, u32>::new();
///
/// let job = emitter
///     .prepare("job", EventOptions::new().collect(true))
///     .unwrap();
///
/// _ = job.on(|args| Verdict::Continue(args[0] + 1));
///
/// let results = job.emit((4,)).unwrap();
/// assert_eq!(results, Some(vec![5]));
/// ```
pub struct EventHandle<T, R = ()> {
    core: Rc<EventCore<T, R>>,
}

impl<T, R> EventHandle<T, R> {
    pub(crate) fn new(core: Rc<EventCore<T, R>>) -> Self {
        Self { core }
    }

    /// The name the event was created under.
    ///
    /// Aliases do not change it: an event keeps its original name no matter how many
    /// other names are bound to it.
    #[must_use]
    pub fn name(&self) -> &str {
        self.core.name()
    }

    /// Applies options to the event. Only the options explicitly set are touched.
    ///
    /// # Errors
    ///
    /// Fails if the options would switch sequential dispatch off while future-returning
    /// listeners remain registered.
    pub fn configure(&self, options: EventOptions) -> Result<()> {
        self.core.apply_options(&options)
    }

    /// Registers a listener, or replays the latched payload to it immediately (returning
    /// `None`) if the event has already completed.
    #[must_use]
    pub fn on<F>(&self, callback: F) -> Option<ListenerKey>
    where
        F: FnMut(&[T]) -> Verdict<R> + 'static,
    {
        self.core.add_sync(Box::new(callback), false)
    }

    /// Registers a listener that unregisters itself after its first completed
    /// invocation.
    #[must_use]
    pub fn once<F>(&self, callback: F) -> Option<ListenerKey>
    where
        F: FnMut(&[T]) -> Verdict<R> + 'static,
    {
        self.core.add_sync(Box::new(callback), true)
    }

    /// Applies options and registers a listener in one call.
    ///
    /// # Errors
    ///
    /// Fails if the options cannot be applied; nothing is registered in that case.
    pub fn on_with<F>(&self, options: EventOptions, callback: F) -> Result<Option<ListenerKey>>
    where
        F: FnMut(&[T]) -> Verdict<R> + 'static,
    {
        self.core.apply_options(&options)?;

        Ok(self.core.add_sync(Box::new(callback), false))
    }

    /// Applies options and registers a single-invocation listener in one call.
    ///
    /// # Errors
    ///
    /// Fails if the options cannot be applied; nothing is registered in that case.
    pub fn once_with<F>(&self, options: EventOptions, callback: F) -> Result<Option<ListenerKey>>
    where
        F: FnMut(&[T]) -> Verdict<R> + 'static,
    {
        self.core.apply_options(&options)?;

        Ok(self.core.add_sync(Box::new(callback), true))
    }

    /// Registers a future-returning listener.
    ///
    /// # Errors
    ///
    /// Fails unless the event is configured for sequential dispatch, or if it has
    /// already completed.
    pub fn on_async<F>(&self, callback: F) -> Result<ListenerKey>
    where
        F: FnMut(&[T]) -> LocalBoxFuture<'static, Verdict<R>> + 'static,
    {
        self.core.add_future(Box::new(callback), false)
    }

    /// Registers a future-returning listener that unregisters itself after its first
    /// completed invocation.
    ///
    /// # Errors
    ///
    /// Same conditions as [`on_async()`][Self::on_async].
    pub fn once_async<F>(&self, callback: F) -> Result<ListenerKey>
    where
        F: FnMut(&[T]) -> LocalBoxFuture<'static, Verdict<R>> + 'static,
    {
        self.core.add_future(Box::new(callback), true)
    }

    /// Unregisters the listener under `key`. Returns whether a listener was removed.
    #[must_use]
    pub fn off(&self, key: ListenerKey) -> bool {
        self.core.remove_listener(key)
    }

    /// Unregisters every listener of the event.
    pub fn clear(&self) {
        self.core.clear_listeners();
    }

    /// Emits synchronously with the full verdict protocol.
    ///
    /// # Errors
    ///
    /// Fails if the event is configured for sequential dispatch.
    pub fn emit(&self, args: impl Into<Args<T>>) -> Result<Option<Vec<R>>> {
        self.core.emit_now(&args.into())
    }

    /// Emits with reduced guarantees: only `once` handling, no collection, no plan.
    ///
    /// # Errors
    ///
    /// Fails if the event is configured for sequential dispatch.
    pub fn emit_quick(&self, args: impl Into<Args<T>>) -> Result<()> {
        self.core.emit_quick_now(&args.into())
    }

    /// Emits, awaiting each listener's future before invoking the next.
    pub async fn emit_async(&self, args: impl Into<Args<T>>) -> Option<Vec<R>> {
        self.core.emit_async_now(&args.into()).await
    }

    /// Emits a final pass, then latches the payload for replay to late registrants.
    ///
    /// # Errors
    ///
    /// Fails if the event is configured for sequential dispatch.
    pub fn complete(&self, args: impl Into<Args<T>>) -> Result<()> {
        self.core.complete_now(args.into())
    }

    /// Latches a payload without dispatching anything.
    pub fn latch(&self, args: impl Into<Args<T>>) {
        self.core.set_latch(args.into());
    }

    /// Releases the latch. Returns whether a latch was present.
    #[must_use]
    pub fn clear_latch(&self) -> bool {
        self.core.clear_latch()
    }

    /// Whether the event has completed and currently holds a latched payload.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.core.is_completed()
    }

    /// The number of listeners currently registered.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.core.listener_count()
    }

    /// Whether any listeners are currently registered.
    #[must_use]
    pub fn has_listeners(&self) -> bool {
        self.core.listener_count() > 0
    }
}

impl<T, R> Clone for EventHandle<T, R> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T, R> Debug for EventHandle<T, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandle")
            .field("event", &self.core)
            .finish()
    }
}
