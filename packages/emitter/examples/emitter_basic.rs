//! Basic example of registering listeners and emitting events.
//!
//! Demonstrates the simplest usage pattern: events come into existence on first use,
//! listeners run in registration order and keys unregister exactly the listener they
//! were returned for.

use emitter::{Emitter, Verdict};

fn main() {
    println!("=== Emitter Basic Example ===");

    let emitter = Emitter::<u32>::new();

    // Listeners register under a name; the event springs into existence on first use.
    let first = emitter
        .on("progress", |args| {
            println!("listener one saw: {args:?}");
            Verdict::Continue(())
        })
        .expect("event has not completed, so the listener was registered");

    _ = emitter.on("progress", |args| {
        println!("listener two saw: {args:?}");
        Verdict::Continue(())
    });

    println!("Emitting with a single value...");
    emitter.emit("progress", (25,)).unwrap();

    println!("Emitting with several values...");
    emitter.emit("progress", (50, 75, 100)).unwrap();

    println!("Unregistering listener one...");
    assert!(emitter.off("progress", first));

    println!("Emitting again; only listener two remains...");
    emitter.emit("progress", (100,)).unwrap();

    println!("Example completed successfully!");
}
