use std::cell::RefCell;
use std::fmt::{self, Debug, Formatter};
use std::mem;
use std::rc::Rc;

use foldhash::{HashMap, HashMapExt};
use futures::future::LocalBoxFuture;

use crate::builder::EmitterBuilder;
use crate::error::{Result, UsageError};
use crate::event::EventCore;
use crate::handle::EventHandle;
use crate::options::{EventOptions, SharedConfig};
use crate::slot::ListenerKey;
use crate::{Args, Verdict};

/// A registry of named events with ordered listener dispatch.
///
/// Events come into existence on first use of their name; there is no separate creation
/// step. `T` is the payload type listeners receive and `R` is the result type listeners
/// return (defaulting to `()` for fire-and-forget events).
///
/// The registry is single-threaded. Listeners run on the emitting thread, in registration
/// order, and are free to call back into the registry from inside a dispatch pass, with
/// one exception: a listener must not emit in a way that re-enters itself recursively.
///
/// # Example
///
/// ```
/// use emitter::{Emitter, Verdict};
///
/// let emitter = Emitter::<String>::new();
///
/// _ = emitter.on("greeting", |args| {
///     println!("heard: {args:?}");
///     Verdict::Continue(())
/// });
///
/// emitter.emit("greeting", ("hello".to_string(),)).unwrap();
/// ```
///
/// # Collecting results
///
/// ```
/// use emitter::{Emitter, EventOptions, Verdict};
///
/// let emitter = Emitter::<u32, u32>::new();
///
/// _ = emitter
///     .prepare("double", EventOptions::new().collect(true))
///     .unwrap();
///
/// _ = emitter.on("double", |args| Verdict::Continue(args[0] * 2));
/// _ = emitter.on("double", |args| Verdict::Continue(args[0] + 1));
///
/// let results = emitter.emit("double", (10,)).unwrap();
/// assert_eq!(results, Some(vec![20, 11]));
/// ```
pub struct Emitter<T, R = ()> {
    /// One entry per name, including alias names. Aliased names share one event.
    events: RefCell<HashMap<Rc<str>, Rc<EventCore<T, R>>>>,

    /// Settings shared with every event this registry creates.
    config: Rc<SharedConfig>,
}

impl<T, R> Emitter<T, R> {
    /// Creates a registry with the default configuration.
    ///
    /// Use [`builder()`][Self::builder] to customize the configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a registry with a custom configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use emitter::Emitter;
    ///
    /// let emitter = Emitter::<u32>::builder()
    ///     .specialization_enabled(false)
    ///     .build();
    /// # _ = emitter;
    /// ```
    #[must_use]
    pub fn builder() -> EmitterBuilder<T, R> {
        EmitterBuilder::new()
    }

    pub(crate) fn new_inner(config: SharedConfig) -> Self {
        Self {
            events: RefCell::new(HashMap::new()),
            config: Rc::new(config),
        }
    }

    /// Applies options to the named event, creating it if needed, and returns a handle
    /// bound to it.
    ///
    /// Options merge: only the options explicitly set are touched, so repeated calls can
    /// adjust one knob at a time. The handle stays bound to the event even if the name is
    /// later rebound by [`alias()`][Self::alias].
    ///
    /// # Errors
    ///
    /// Fails if the options would switch sequential dispatch off while future-returning
    /// listeners remain registered. The event is still created in that case.
    ///
    /// # Example
    ///
    /// ```
    /// use emitter::{Emitter, EventOptions};
    ///
    /// let emitter = Emitter::<u32, u32>::new();
    ///
    /// let handle = emitter
    ///     .prepare("job", EventOptions::new().collect(true).halt_on_break(true))
    ///     .unwrap();
    /// # _ = handle;
    /// ```
    pub fn prepare(&self, name: &str, options: EventOptions) -> Result<EventHandle<T, R>> {
        let core = self.resolve_or_create(name);
        core.apply_options(&options)?;

        Ok(EventHandle::new(core))
    }

    /// Registers a listener on the named event, creating the event if needed.
    ///
    /// Returns the key to unregister with, or `None` if the event has already completed,
    /// in which case the callback was invoked immediately with the latched payload and
    /// nothing was registered.
    ///
    /// # Example
    ///
    /// ```
    /// use emitter::{Emitter, Verdict};
    ///
    /// let emitter = Emitter::<u32>::new();
    ///
    /// let key = emitter
    ///     .on("tick", |args| {
    ///         println!("tick: {:?}", args.first());
    ///         Verdict::Continue(())
    ///     })
    ///     .expect("event has not completed, so the listener was registered");
    ///
    /// emitter.emit("tick", (1,)).unwrap();
    /// assert!(emitter.off("tick", key));
    /// ```
    #[must_use]
    pub fn on<F>(&self, name: &str, callback: F) -> Option<ListenerKey>
    where
        F: FnMut(&[T]) -> Verdict<R> + 'static,
    {
        self.resolve_or_create(name).add_sync(Box::new(callback), false)
    }

    /// Registers a listener that unregisters itself after its first completed invocation.
    ///
    /// Like [`on()`][Self::on], a completed event replays its latched payload immediately
    /// and returns `None` instead of registering.
    ///
    /// # Example
    ///
    /// ```
    /// use emitter::{Emitter, Verdict};
    ///
    /// let emitter = Emitter::<u32>::new();
    ///
    /// _ = emitter.once("tick", |_args| Verdict::Continue(()));
    ///
    /// emitter.emit("tick", ()).unwrap();
    /// assert_eq!(emitter.listener_count("tick"), 0);
    /// ```
    #[must_use]
    pub fn once<F>(&self, name: &str, callback: F) -> Option<ListenerKey>
    where
        F: FnMut(&[T]) -> Verdict<R> + 'static,
    {
        self.resolve_or_create(name).add_sync(Box::new(callback), true)
    }

    /// Applies options and registers a listener in one call.
    ///
    /// # Errors
    ///
    /// Fails if the options cannot be applied; nothing is registered in that case.
    pub fn on_with<F>(
        &self,
        name: &str,
        options: EventOptions,
        callback: F,
    ) -> Result<Option<ListenerKey>>
    where
        F: FnMut(&[T]) -> Verdict<R> + 'static,
    {
        let core = self.resolve_or_create(name);
        core.apply_options(&options)?;

        Ok(core.add_sync(Box::new(callback), false))
    }

    /// Applies options and registers a single-invocation listener in one call.
    ///
    /// # Errors
    ///
    /// Fails if the options cannot be applied; nothing is registered in that case.
    pub fn once_with<F>(
        &self,
        name: &str,
        options: EventOptions,
        callback: F,
    ) -> Result<Option<ListenerKey>>
    where
        F: FnMut(&[T]) -> Verdict<R> + 'static,
    {
        let core = self.resolve_or_create(name);
        core.apply_options(&options)?;

        Ok(core.add_sync(Box::new(callback), true))
    }

    /// Registers a future-returning listener on the named event.
    ///
    /// The event must already exist and be configured for sequential dispatch, which is
    /// the only dispatch mode that awaits listener futures. Configure it first through
    /// [`prepare()`][Self::prepare].
    ///
    /// # Errors
    ///
    /// Fails if the event is absent or not sequential, or if it has already completed
    /// (replay happens synchronously at registration time and cannot await).
    ///
    /// # Example
    ///
    /// ```
    /// use emitter::{Emitter, EventOptions, Verdict};
    /// use futures::FutureExt;
    /// use futures::executor::block_on;
    ///
    /// let emitter = Emitter::<u32>::new();
    ///
    /// _ = emitter
    ///     .prepare("startup", EventOptions::new().sequential(true))
    ///     .unwrap();
    ///
    /// _ = emitter
    ///     .on_async("startup", |_args| {
    ///         async { Verdict::Continue(()) }.boxed_local()
    ///     })
    ///     .unwrap();
    ///
    /// _ = block_on(emitter.emit_async("startup", ()));
    /// ```
    pub fn on_async<F>(&self, name: &str, callback: F) -> Result<ListenerKey>
    where
        F: FnMut(&[T]) -> LocalBoxFuture<'static, Verdict<R>> + 'static,
    {
        self.resolve_sequential(name)?
            .add_future(Box::new(callback), false)
    }

    /// Registers a future-returning listener that unregisters itself after its first
    /// completed invocation.
    ///
    /// # Errors
    ///
    /// Same conditions as [`on_async()`][Self::on_async].
    pub fn once_async<F>(&self, name: &str, callback: F) -> Result<ListenerKey>
    where
        F: FnMut(&[T]) -> LocalBoxFuture<'static, Verdict<R>> + 'static,
    {
        self.resolve_sequential(name)?
            .add_future(Box::new(callback), true)
    }

    /// Unregisters the listener under `key`. Returns whether a listener was removed.
    ///
    /// Keys address slots, and slots are reused: a key kept after its listener was
    /// already removed may now address a different listener. Removal through a stale key
    /// removes whatever occupies the slot, or nothing if it is vacant.
    #[must_use]
    pub fn off(&self, name: &str, key: ListenerKey) -> bool {
        self.resolve(name)
            .is_some_and(|core| core.remove_listener(key))
    }

    /// Unregisters every listener of the named event. Returns whether the event existed.
    ///
    /// The event itself survives with its configuration and latch state intact.
    #[must_use]
    pub fn clear(&self, name: &str) -> bool {
        let Some(core) = self.resolve(name) else {
            return false;
        };

        core.clear_listeners();
        true
    }

    /// Emits to the named event: every listener runs synchronously, in registration
    /// order, with the full verdict protocol.
    ///
    /// Emitting to a name with no event (or no listeners) is a no-op. Returns the
    /// collected results when the event collects, `None` otherwise.
    ///
    /// # Errors
    ///
    /// Fails on events configured for sequential dispatch; those are emitted through
    /// [`emit_async()`][Self::emit_async].
    pub fn emit(&self, name: &str, args: impl Into<Args<T>>) -> Result<Option<Vec<R>>> {
        let Some(core) = self.resolve(name) else {
            return Ok(None);
        };

        core.emit_now(&args.into())
    }

    /// Emits with reduced guarantees for hot paths: verdicts are not evaluated beyond
    /// `once` handling, nothing is collected and no dispatch plan is used.
    ///
    /// # Errors
    ///
    /// Fails on events configured for sequential dispatch.
    ///
    /// # Example
    ///
    /// ```
    /// use emitter::{Emitter, Verdict};
    ///
    /// let emitter = Emitter::<u64>::new();
    ///
    /// _ = emitter.on("sample", |_args| Verdict::Continue(()));
    ///
    /// for i in 0..100 {
    ///     emitter.emit_quick("sample", (i,)).unwrap();
    /// }
    /// ```
    pub fn emit_quick(&self, name: &str, args: impl Into<Args<T>>) -> Result<()> {
        let Some(core) = self.resolve(name) else {
            return Ok(());
        };

        core.emit_quick_now(&args.into())
    }

    /// Emits to the named event, awaiting each listener's future before invoking the
    /// next.
    ///
    /// This is the only dispatch surface for sequential events, but works on any event;
    /// listeners that complete synchronously are passed through without suspension.
    /// Returns the collected results when the event collects.
    pub async fn emit_async(&self, name: &str, args: impl Into<Args<T>>) -> Option<Vec<R>> {
        let core = self.resolve(name)?;

        core.emit_async_now(&args.into()).await
    }

    /// Emits a final pass to the named event, then latches the payload: listeners
    /// registered afterwards receive it immediately at registration time instead of
    /// being queued.
    ///
    /// Creates the event if needed, so completion is meaningful even before anything
    /// registers. Completing again re-dispatches and replaces the latched payload.
    ///
    /// # Errors
    ///
    /// Fails on events configured for sequential dispatch.
    ///
    /// # Example
    ///
    /// ```
    /// use emitter::{Emitter, Verdict};
    ///
    /// let emitter = Emitter::<String>::new();
    ///
    /// emitter.complete("ready", ("configured".to_string(),)).unwrap();
    ///
    /// // Too late to queue, but the payload is replayed immediately.
    /// let key = emitter.on("ready", |args| {
    ///     assert_eq!(args[0], "configured");
    ///     Verdict::Continue(())
    /// });
    ///
    /// assert_eq!(key, None);
    /// ```
    pub fn complete(&self, name: &str, args: impl Into<Args<T>>) -> Result<()> {
        self.resolve_or_create(name).complete_now(args.into())
    }

    /// Latches a payload on the named event without dispatching anything, creating the
    /// event if needed.
    ///
    /// Afterwards the event behaves as completed: registrations replay the payload
    /// immediately instead of queueing.
    pub fn latch(&self, name: &str, args: impl Into<Args<T>>) {
        self.resolve_or_create(name).set_latch(args.into());
    }

    /// Releases the named event's latch, returning it to ordinary pre-completion
    /// behavior. Returns whether a latch was present.
    #[must_use]
    pub fn clear_latch(&self, name: &str) -> bool {
        self.resolve(name).is_some_and(|core| core.clear_latch())
    }

    /// Whether the named event has completed and currently holds a latched payload.
    #[must_use]
    pub fn is_completed(&self, name: &str) -> bool {
        self.resolve(name).is_some_and(|core| core.is_completed())
    }

    /// The number of listeners registered on the named event. Zero for unknown names.
    #[must_use]
    pub fn listener_count(&self, name: &str) -> usize {
        self.resolve(name).map_or(0, |core| core.listener_count())
    }

    /// Whether the named event has any listeners registered.
    #[must_use]
    pub fn has_listeners(&self, name: &str) -> bool {
        self.listener_count(name) > 0
    }

    /// Binds an additional name to the event behind `name`, creating the event if
    /// needed.
    ///
    /// Afterwards both names address the same event: listeners registered through one
    /// are dispatched by emissions through the other. If the alias name was already
    /// bound to some other event, it is rebound; the other event keeps existing under
    /// its remaining names.
    ///
    /// # Example
    ///
    /// ```
    /// use emitter::{Emitter, Verdict};
    ///
    /// let emitter = Emitter::<u32>::new();
    ///
    /// _ = emitter.on("shutdown", |_args| Verdict::Continue(()));
    /// emitter.alias("shutdown", "sigterm");
    ///
    /// assert_eq!(emitter.listener_count("sigterm"), 1);
    /// emitter.emit("sigterm", ()).unwrap();
    /// ```
    pub fn alias(&self, name: &str, alias: &str) {
        let core = self.resolve_or_create(name);

        let alias: Rc<str> = Rc::from(alias);
        core.note_alias(Rc::clone(&alias));

        _ = self.events.borrow_mut().insert(alias, core);
    }

    /// Tears down every event: all listeners, plans and latches are dropped and the
    /// registry becomes empty.
    ///
    /// Dropping the registry itself is usually enough. This exists for listeners that
    /// captured handles back into the registry: those form reference cycles that plain
    /// drop cannot collect, and dropping the callbacks here is what breaks them.
    pub fn destroy(&self) {
        // Callback drops can run arbitrary user code, including calls back into this
        // registry, so the map borrow must be released before teardown begins.
        let drained = mem::take(&mut *self.events.borrow_mut());

        for core in drained.values() {
            core.teardown();
        }
    }

    /// Switches dispatch plan capture on or off for the whole registry.
    ///
    /// Switching it off also discards every existing plan, so the next emit of any event
    /// interprets against live state. Switching it back on lets eligible events capture
    /// plans again on their next dispatch.
    pub fn set_specialization_enabled(&self, enabled: bool) {
        self.config.set_specialization_enabled(enabled);

        if !enabled {
            for core in self.events.borrow().values() {
                core.invalidate_plan();
            }
        }
    }

    fn resolve(&self, name: &str) -> Option<Rc<EventCore<T, R>>> {
        self.events.borrow().get(name).map(Rc::clone)
    }

    fn resolve_or_create(&self, name: &str) -> Rc<EventCore<T, R>> {
        let mut events = self.events.borrow_mut();

        if let Some(core) = events.get(name) {
            return Rc::clone(core);
        }

        let name: Rc<str> = Rc::from(name);
        let core = EventCore::new(Rc::clone(&name), Rc::clone(&self.config));
        events.insert(name, Rc::clone(&core));

        core
    }

    fn resolve_sequential(&self, name: &str) -> Result<Rc<EventCore<T, R>>> {
        self.resolve(name).ok_or_else(|| UsageError::SequentialRequired {
            event_name: name.to_string(),
        })
    }
}

impl<T, R> Default for Emitter<T, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, R> Debug for Emitter<T, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field(
                "payload_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field(
                "result_type",
                &std::format_args!("{}", std::any::type_name::<R>()),
            )
            .field("events", &self.events.borrow().len())
            .field(
                "specialization_enabled",
                &self.config.specialization_enabled(),
            )
            .finish()
    }
}
