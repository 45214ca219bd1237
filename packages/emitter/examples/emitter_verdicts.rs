//! Demonstrates the listener verdict protocol: collecting results, stopping a pass
//! and listeners unregistering themselves.

use emitter::{Emitter, EventOptions, Verdict};

fn main() {
    println!("=== Emitter Verdicts Example ===");

    let emitter = Emitter::<u32, String>::new();

    // Collection and break-on-signal are per-event options.
    _ = emitter
        .prepare(
            "inspect",
            EventOptions::new().collect(true).halt_on_break(true),
        )
        .unwrap();

    _ = emitter.on("inspect", |args| {
        Verdict::Continue(format!("sum is {}", args.iter().sum::<u32>()))
    });

    _ = emitter.on("inspect", |args| {
        if args.contains(&0) {
            println!("second listener vetoes the pass");
            Verdict::Break
        } else {
            Verdict::Continue(format!("count is {}", args.len()))
        }
    });

    // A self-removing listener: reports once, then detaches.
    _ = emitter.on("inspect", |_args| {
        println!("third listener detaches after this invocation");
        Verdict::Detach
    });

    println!("First emission collects from all three listeners...");
    let results = emitter.emit("inspect", (1, 2, 3)).unwrap();
    println!("collected: {results:?}");

    println!(
        "Second emission: the detached listener is gone ({} remain)...",
        emitter.listener_count("inspect")
    );
    let results = emitter.emit("inspect", (4, 5)).unwrap();
    println!("collected: {results:?}");

    println!("Third emission breaks midway...");
    let results = emitter.emit("inspect", (0,)).unwrap();
    println!("collected: {results:?}");

    println!("Example completed successfully!");
}
