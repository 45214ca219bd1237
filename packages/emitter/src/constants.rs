/// Default per-event listener limit above which the one-time leak warning is logged.
///
/// This is a diagnostic threshold, not a cap: registrations above the limit still succeed.
/// Override it per event via
/// [`EventOptions::max_listeners()`][crate::EventOptions::max_listeners] or for the whole
/// registry via
/// [`EmitterBuilder::default_max_listeners()`][crate::EmitterBuilder::default_max_listeners].
pub const DEFAULT_MAX_LISTENERS: usize = 1000;

/// Listener sets smaller than this are dispatched by the interpreter without ever
/// capturing a plan. Below this size a plan walk saves nothing over a direct walk of the
/// store.
pub(crate) const PLAN_MIN_LISTENERS: usize = 2;

/// Listener sets at or above this size are dispatched by the interpreter without ever
/// capturing a plan. Sets this large churn too much for a snapshot to stay valid long
/// enough to pay for its capture.
pub(crate) const PLAN_MAX_LISTENERS: usize = 950;
