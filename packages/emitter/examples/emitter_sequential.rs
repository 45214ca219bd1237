//! Demonstrates sequential dispatch: future-returning listeners awaited one after
//! another, mixed freely with synchronous listeners on the same event.

use emitter::{Emitter, EventOptions, Verdict};
use futures::FutureExt;
use futures::executor::block_on;

fn main() {
    println!("=== Emitter Sequential Example ===");

    let emitter = Emitter::<u32, u32>::new();

    // Sequential dispatch must be configured before future-returning listeners can
    // register.
    _ = emitter
        .prepare(
            "pipeline",
            EventOptions::new().sequential(true).collect(true),
        )
        .unwrap();

    _ = emitter
        .on_async("pipeline", |args| {
            let input = args[0];
            async move {
                println!("async stage one processes {input}");
                Verdict::Continue(input + 1)
            }
            .boxed_local()
        })
        .unwrap();

    // Synchronous listeners participate without suspension.
    _ = emitter.on("pipeline", |args| {
        println!("sync stage two processes {}", args[0]);
        Verdict::Continue(args[0] * 2)
    });

    _ = emitter
        .on_async("pipeline", |args| {
            let input = args[0];
            async move {
                println!("async stage three processes {input}");
                Verdict::Continue(input + 100)
            }
            .boxed_local()
        })
        .unwrap();

    println!("Dispatching through the awaiting emit surface...");
    let results = block_on(emitter.emit_async("pipeline", (10,)));
    println!("stage results: {results:?}");

    // The synchronous surfaces refuse sequential events.
    let error = emitter.emit("pipeline", (10,)).unwrap_err();
    println!("synchronous emit is rejected: {error}");

    println!("Example completed successfully!");
}
