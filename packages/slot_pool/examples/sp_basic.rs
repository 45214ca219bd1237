//! Basic usage of the `slot_pool` crate:
//!
//! * Creating a pool.
//! * Adding items.
//! * Retrieving items.
//! * Removing items and observing slot reuse.

use slot_pool::SlotPool;

fn main() {
    let mut pool = SlotPool::<String>::new();

    // Inserting an item gives you a key that you can later use to look up the item again.
    let alice_key = pool.insert("Alice".to_string());
    let bob_key = pool.insert("Bob".to_string());
    let charlie_key = pool.insert("Charlie".to_string());

    println!(
        "Pool contains {} items across {} slots",
        pool.len(),
        pool.span()
    );

    let alice = pool.get(alice_key).expect("inserted above");
    println!("Retrieved item: {alice}");

    // Removing an item leaves a hole in place; every other item keeps its key.
    let bob = pool.remove(bob_key).expect("inserted above");
    println!("Removed item: {bob}");

    let alice = pool.get(alice_key).expect("still present");
    println!("Retrieved item after removal of another: {alice}");

    // The freed slot is reused by the next insertion, most recently freed first.
    let dave_key = pool.insert("Dave".to_string());
    println!(
        "New item took over slot {}, vacated by the removed item (slot {})",
        dave_key.index(),
        bob_key.index()
    );

    // Iteration visits occupants in slot order, skipping holes.
    for (key, name) in &pool {
        println!("Slot {}: {name}", key.index());
    }

    // Emptying the pool resets it; the next insertion starts over at slot 0.
    _ = pool.remove(alice_key);
    _ = pool.remove(charlie_key);
    _ = pool.remove(dave_key);
    assert!(pool.is_empty());

    let eve_key = pool.insert("Eve".to_string());
    println!(
        "First insertion into an emptied pool took slot {}",
        eve_key.index()
    );
}
