#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Named events with ordered listener dispatch, listener verdicts and completion
//! latching, specialized per listener set while the set holds still.
//!
//! An [`Emitter`] is a single-threaded registry of named events. Events come into
//! existence on first use; listeners register under a name and every emission invokes
//! them synchronously, in registration order, on the emitting thread. Each listener
//! returns a [`Verdict`] through which it can carry a result value, stop the pass or
//! unregister itself.
//!
//! Key characteristics:
//!
//! - Listener storage reuses vacated slots and keeps registration order stable for the
//!   survivors, so long-lived events do not accumulate holes.
//! - Events whose listener set stays stable across emissions are dispatched through a
//!   captured plan that walks the set without any per-listener lookups; any change to
//!   the set discards the plan and the next emission rebuilds it.
//! - Listeners may call back into the registry from inside a dispatch pass. Removals
//!   and registrations made mid-pass are honored by interpreted passes and deferred to
//!   the next pass by planned ones.
//! - An event can complete with a payload, after which late listeners receive that
//!   payload immediately at registration time instead of being queued.
//! - Events configured for sequential dispatch await each listener's future before
//!   invoking the next, via [`emit_async()`][Emitter::emit_async].
//!
//! # Example
//!
//! ```
//! use emitter::{Emitter, Verdict};
//!
//! let emitter = Emitter::<u32>::new();
//!
//! _ = emitter.on("progress", |args| {
//!     println!("progress: {args:?}");
//!     Verdict::Continue(())
//! });
//!
//! emitter.emit("progress", (25,)).unwrap();
//! emitter.emit("progress", (50,)).unwrap();
//! ```
//!
//! # Listener verdicts
//!
//! Events opt into the richer parts of the verdict protocol through [`EventOptions`]:
//! collection gathers each listener's `Continue` value, break-on-signal lets a listener
//! stop the pass.
//!
//! ```
//! use emitter::{Emitter, EventOptions, Verdict};
//!
//! let emitter = Emitter::<u32, u32>::new();
//!
//! _ = emitter
//!     .prepare("poll", EventOptions::new().collect(true).halt_on_break(true))
//!     .unwrap();
//!
//! _ = emitter.on("poll", |args| Verdict::Continue(args[0] + 1));
//! _ = emitter.on("poll", |args| {
//!     if args[0] > 100 {
//!         Verdict::Break
//!     } else {
//!         Verdict::Continue(args[0] + 2)
//!     }
//! });
//!
//! let results = emitter.emit("poll", (1,)).unwrap();
//! assert_eq!(results, Some(vec![2, 3]));
//!
//! // The second listener breaks, so only the first result is returned.
//! let results = emitter.emit("poll", (200,)).unwrap();
//! assert_eq!(results, Some(vec![201]));
//! ```
//!
//! # Completion
//!
//! Completing an event dispatches one final pass and latches the payload. From then on,
//! registering delivers the payload immediately instead of queueing, which makes
//! "did this already happen" races impossible for one-shot lifecycle events.
//!
//! ```
//! use emitter::{Emitter, Verdict};
//!
//! let emitter = Emitter::<String>::new();
//!
//! emitter
//!     .complete("config_loaded", ("production".to_string(),))
//!     .unwrap();
//!
//! // Too late to queue, but the payload arrives anyway.
//! let key = emitter.on("config_loaded", |args| {
//!     assert_eq!(args[0], "production");
//!     Verdict::Continue(())
//! });
//! assert_eq!(key, None);
//! ```
//!
//! # Thread safety
//!
//! The registry is a single-threaded type: it is `!Send` and `!Sync`, listeners run on
//! the emitting thread and do not need to be thread-safe. Use one registry per thread
//! if multiple threads need events.

mod args;
mod builder;
mod constants;
mod dispatch;
mod error;
mod event;
mod handle;
mod options;
mod plan;
mod registry;
mod slot;
mod verdict;

pub use args::*;
pub use builder::*;
pub use constants::DEFAULT_MAX_LISTENERS;
pub use error::*;
pub use handle::*;
pub use options::*;
pub use registry::*;
pub use slot::ListenerKey;
pub use verdict::*;
