/// The outcome a listener reports back to the dispatch engine.
///
/// Every listener returns a verdict. Most return [`Continue`][Self::Continue] with their
/// result value; the other variants let a listener steer the pass it is part of without
/// reaching back into the registry.
///
/// # Example
///
/// ```
/// use emitter::{Emitter, Verdict};
///
/// let emitter = Emitter::<u32>::new();
///
/// _ = emitter.on("tick", |args| {
///     println!("tick: {args:?}");
///     Verdict::Continue(())
/// });
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Verdict<R = ()> {
    /// Normal completion. When the event collects results, the carried value is appended
    /// to the result set returned from the emit call.
    Continue(R),

    /// Stops the dispatch pass after this listener, provided the event has break-on-signal
    /// enabled via [`EventOptions::halt_on_break()`][crate::EventOptions::halt_on_break].
    /// Listeners later in the order are not invoked during that pass. The breaking
    /// listener itself stays registered, even if it was registered with `once`.
    ///
    /// On an event without break-on-signal this verdict completes the listener normally;
    /// it merely contributes no result value.
    Break,

    /// Unregisters this listener, whether or not it was registered with `once`.
    ///
    /// Carrying the detach request in the verdict type means no legitimate result value
    /// can collide with it, so listeners of any result type can detach themselves. The
    /// verdict is never appended to collected results.
    Detach,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn verdicts_compare_by_variant_and_value() {
        assert_eq!(Verdict::Continue(5_u32), Verdict::Continue(5));
        assert_ne!(Verdict::Continue(5_u32), Verdict::Continue(6));
        assert_ne!(Verdict::<u32>::Break, Verdict::Detach);
    }

    #[test]
    fn unit_result_type_is_the_default() {
        let verdict: Verdict = Verdict::Continue(());

        assert_eq!(verdict, Verdict::Continue(()));
    }
}
