//! Demonstrates completion latching: a one-shot lifecycle event whose payload is
//! replayed to listeners that arrive after the fact.

use emitter::{Emitter, Verdict};

fn main() {
    println!("=== Emitter Completed Example ===");

    let emitter = Emitter::<String>::new();

    // A listener that is present before completion is dispatched normally.
    _ = emitter.on("config_loaded", |args| {
        println!("early listener: configuration is {:?}", args[0]);
        Verdict::Continue(())
    });

    println!("Completing the event...");
    emitter
        .complete("config_loaded", ("production".to_string(),))
        .unwrap();

    assert!(emitter.is_completed("config_loaded"));

    // A listener arriving after completion receives the payload immediately at
    // registration time and is not queued.
    println!("Registering after completion...");
    let key = emitter.on("config_loaded", |args| {
        println!("late listener: configuration is {:?}", args[0]);
        Verdict::Continue(())
    });

    assert_eq!(key, None);
    println!(
        "late listener was replayed, not queued ({} listener registered)",
        emitter.listener_count("config_loaded")
    );

    // Releasing the latch restores ordinary queueing.
    println!("Clearing the latch...");
    assert!(emitter.clear_latch("config_loaded"));

    let key = emitter.on("config_loaded", |args| {
        println!("new listener: configuration is {:?}", args[0]);
        Verdict::Continue(())
    });
    assert!(key.is_some());

    println!("Emitting normally again...");
    emitter
        .emit("config_loaded", ("staging".to_string(),))
        .unwrap();

    println!("Example completed successfully!");
}
