use std::cell::Cell;

/// Configuration applied to one named event.
///
/// Only the options explicitly set are applied; every other setting keeps the value the
/// event already has. This merge behavior is what lets repeated
/// [`prepare()`][crate::Emitter::prepare] calls adjust one knob without resetting the
/// others.
///
/// # Example
///
/// ```
/// use emitter::{Emitter, EventOptions};
///
/// let emitter = Emitter::<u32, String>::new();
///
/// let handle = emitter
///     .prepare("job", EventOptions::new().collect(true).halt_on_break(true))
///     .unwrap();
/// # _ = handle;
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[must_use]
pub struct EventOptions {
    pub(crate) halt_on_break: Option<bool>,
    pub(crate) collect: Option<bool>,
    pub(crate) sequential: Option<bool>,
    pub(crate) deopt: bool,
    pub(crate) max_listeners: Option<usize>,
}

impl EventOptions {
    /// Creates an option set that applies nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a [`Verdict::Break`][crate::Verdict::Break] from a listener stops the
    /// dispatch pass. Off by default, in which case the verdict is treated as a
    /// result-less completion.
    pub fn halt_on_break(mut self, enabled: bool) -> Self {
        self.halt_on_break = Some(enabled);
        self
    }

    /// Whether a dispatch pass gathers the values carried by
    /// [`Verdict::Continue`][crate::Verdict::Continue] and returns them from the emit
    /// call. Off by default; without it emit calls return no result set.
    pub fn collect(mut self, enabled: bool) -> Self {
        self.collect = Some(enabled);
        self
    }

    /// Whether dispatch awaits each listener before invoking the next. Required for
    /// registering future-returning listeners and only compatible with
    /// [`emit_async()`][crate::Emitter::emit_async].
    ///
    /// Switching this off fails while future-returning listeners remain registered.
    pub fn sequential(mut self, enabled: bool) -> Self {
        self.sequential = Some(enabled);
        self
    }

    /// Permanently excludes the event from dispatch plan capture, so every pass is
    /// interpreted against live state. One-way: there is no option to opt back in.
    ///
    /// Useful for events whose listener sets churn on nearly every pass, where captured
    /// plans would be discarded before they pay for themselves.
    pub fn deopt(mut self) -> Self {
        self.deopt = true;
        self
    }

    /// The listener count above which the event logs its one-time leak warning.
    pub fn max_listeners(mut self, limit: usize) -> Self {
        self.max_listeners = Some(limit);
        self
    }
}

/// Registry-wide settings shared by every event of one emitter.
#[derive(Debug)]
pub(crate) struct SharedConfig {
    /// Whether events may capture dispatch plans at all. Runtime-switchable; the registry
    /// discards all existing plans when this is switched off.
    specialization_enabled: Cell<bool>,

    /// The leak warning threshold given to newly created events.
    default_max_listeners: usize,
}

impl SharedConfig {
    pub(crate) fn new(specialization_enabled: bool, default_max_listeners: usize) -> Self {
        Self {
            specialization_enabled: Cell::new(specialization_enabled),
            default_max_listeners,
        }
    }

    pub(crate) fn specialization_enabled(&self) -> bool {
        self.specialization_enabled.get()
    }

    pub(crate) fn set_specialization_enabled(&self, enabled: bool) {
        self.specialization_enabled.set(enabled);
    }

    pub(crate) fn default_max_listeners(&self) -> usize {
        self.default_max_listeners
    }
}
