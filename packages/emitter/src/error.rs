use thiserror::Error;

/// Errors returned when an operation conflicts with how an event is configured.
///
/// Every variant names the event it concerns. These are caller mistakes, not runtime
/// faults: each one is avoidable by configuring the event before using it.
#[derive(Debug, Eq, Error, PartialEq)]
#[non_exhaustive]
pub enum UsageError {
    /// A synchronous dispatch surface was used on an event configured for sequential
    /// dispatch. Sequential events may hold future-returning listeners, which the
    /// synchronous surfaces cannot await.
    #[error(
        "event '{event_name}' dispatches sequentially and can only be emitted through the asynchronous emit surface"
    )]
    SequentialDispatchRequired {
        /// Name of the event the dispatch was attempted on.
        event_name: String,
    },

    /// A future-returning listener was registered on an event that does not dispatch
    /// sequentially. Only sequential dispatch awaits each listener before invoking the
    /// next one, so only sequential events can hold such listeners.
    #[error(
        "registering a future-returning listener requires event '{event_name}' to be configured for sequential dispatch first"
    )]
    SequentialRequired {
        /// Name of the event the registration was attempted on.
        event_name: String,
    },

    /// Sequential dispatch was switched off while future-returning listeners were still
    /// registered. Those listeners cannot be dispatched by the synchronous engine, so the
    /// option is locked until they are unregistered.
    #[error(
        "event '{event_name}' cannot leave sequential dispatch while future-returning listeners remain registered"
    )]
    SequentialStillHasFutureListeners {
        /// Name of the event the reconfiguration was attempted on.
        event_name: String,
    },

    /// A future-returning listener was registered on an event that has already completed.
    /// Completion replays the latched payload synchronously at registration time, which
    /// cannot await a future.
    #[error(
        "event '{event_name}' has already completed; the latched payload replays synchronously, so only synchronous listeners may register"
    )]
    LatchedReplayRequiresSync {
        /// Name of the completed event.
        event_name: String,
    },
}

pub(crate) type Result<T> = std::result::Result<T, UsageError>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(UsageError: Send, Sync);

    #[test]
    fn messages_name_the_event() {
        let error = UsageError::SequentialRequired {
            event_name: "startup".to_string(),
        };

        assert!(error.to_string().contains("'startup'"));
    }
}
