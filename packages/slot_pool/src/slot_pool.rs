use std::any::type_name;
use std::iter::Enumerate;
use std::slice;

/// A growable pool of items with stable indices.
///
/// Items are stored in slots addressed by a [`Key`]. Removing an item vacates its slot in
/// place; the slots of all other items are untouched, so iteration order over the survivors
/// is the same before and after the removal. Vacated slots are pushed onto an internal
/// freelist and handed back out by later insertions, most recently freed first.
///
/// The pool is deliberately generation-free: a [`Key`] is nothing but an index, and an index
/// may be reused once its item has been removed. Callers that hold on to keys across
/// removals must be prepared for this, see [`Key`].
///
/// # Example
///
/// ```
/// use slot_pool::SlotPool;
///
/// let mut pool = SlotPool::new();
///
/// let a = pool.insert(10);
/// let b = pool.insert(20);
///
/// assert_eq!(pool.get(a), Some(&10));
/// assert_eq!(pool.remove(b), Some(20));
/// assert_eq!(pool.get(b), None);
/// ```
#[derive(Debug)]
pub struct SlotPool<T> {
    /// Slot storage. A `None` is a hole left behind by a removal, retained so that the
    /// indices of later slots keep their meaning.
    slots: Vec<Option<T>>,

    /// Indices of vacant slots available for reuse, most recently vacated last. Think of
    /// this as a stack: insertion pops the top entry and fills that slot before it ever
    /// considers growing the slot storage.
    free_indices: Vec<usize>,

    /// The number of occupied slots. `slots.len()` minus the hole count.
    count: usize,
}

/// A key that can be used to reference an item in a [`SlotPool`].
///
/// Keys are returned by [`SlotPool::insert()`] and accepted by [`SlotPool::get()`],
/// [`SlotPool::get_mut()`] and [`SlotPool::remove()`].
///
/// # Key reuse
///
/// Keys may be reused by the pool after an item is removed. Using a stale key therefore
/// either accesses a different item (if the slot has been refilled) or returns `None`
/// (if the slot is still vacant). The pool does not attach generation counters to keys;
/// callers that need to tell "my item" apart from "whatever now lives in that slot" must
/// carry that information themselves.
///
/// # Example
///
/// ```
/// use slot_pool::SlotPool;
///
/// let mut pool = SlotPool::new();
///
/// let key = pool.insert("payload");
///
/// // Keys are small and freely copyable.
/// let stored = key;
/// assert_eq!(pool.get(stored), Some(&"payload"));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Key {
    index_in_pool: usize,
}

impl Key {
    /// The raw slot index this key refers to.
    ///
    /// # Example
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::new();
    ///
    /// let first = pool.insert('x');
    /// assert_eq!(first.index(), 0);
    /// ```
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.index_in_pool
    }

    /// Creates a key referring to a raw slot index.
    ///
    /// This is the escape hatch for callers that walk the pool by index, such as a loop
    /// over `0..pool.span()` that needs to probe each slot. A key built this way has no
    /// more guarantees than any other key: the slot may be vacant or hold an item the
    /// caller has never seen.
    ///
    /// # Example
    ///
    /// ```
    /// use slot_pool::{Key, SlotPool};
    ///
    /// let mut pool = SlotPool::new();
    /// _ = pool.insert("first");
    ///
    /// assert_eq!(pool.get(Key::from_index(0)), Some(&"first"));
    /// assert_eq!(pool.get(Key::from_index(1)), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self {
            index_in_pool: index,
        }
    }
}

impl<T> SlotPool<T> {
    /// Creates a new empty [`SlotPool`].
    ///
    /// The pool starts with no storage and grows as items are inserted.
    ///
    /// # Example
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let pool = SlotPool::<String>::new();
    ///
    /// assert_eq!(pool.len(), 0);
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_indices: Vec::new(),
            count: 0,
        }
    }

    /// The number of items in the pool.
    ///
    /// Holes do not count, see [`span()`][Self::span] for the storage extent.
    ///
    /// # Example
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::new();
    ///
    /// let a = pool.insert(1);
    /// let _b = pool.insert(2);
    /// assert_eq!(pool.len(), 2);
    ///
    /// pool.remove(a);
    /// assert_eq!(pool.len(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the pool contains no items.
    ///
    /// # Example
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::new();
    /// assert!(pool.is_empty());
    ///
    /// let key = pool.insert(42);
    /// assert!(!pool.is_empty());
    ///
    /// pool.remove(key);
    /// assert!(pool.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// One past the highest slot index currently backed by storage.
    ///
    /// This is the exclusive upper bound for an index walk over the pool: every occupied
    /// slot has an index below `span()`, and indices in `0..span()` address either an item
    /// or a hole. When the pool holds no holes, `span()` equals [`len()`][Self::len].
    ///
    /// # Example
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::new();
    ///
    /// let a = pool.insert(1);
    /// let _b = pool.insert(2);
    /// pool.remove(a);
    ///
    /// // One item left but storage still extends over both slots.
    /// assert_eq!(pool.len(), 1);
    /// assert_eq!(pool.span(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn span(&self) -> usize {
        self.slots.len()
    }

    /// Returns a reference to the item under `key`, or `None` if the slot is vacant or the
    /// key lies outside the pool's storage.
    ///
    /// # Example
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::new();
    ///
    /// let key = pool.insert("hello");
    /// assert_eq!(pool.get(key), Some(&"hello"));
    ///
    /// pool.remove(key);
    /// assert_eq!(pool.get(key), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn get(&self, key: Key) -> Option<&T> {
        self.slots.get(key.index_in_pool).and_then(Option::as_ref)
    }

    /// Returns an exclusive reference to the item under `key`, or `None` if the slot is
    /// vacant or the key lies outside the pool's storage.
    ///
    /// # Example
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::new();
    ///
    /// let key = pool.insert(10);
    ///
    /// if let Some(value) = pool.get_mut(key) {
    ///     *value += 5;
    /// }
    ///
    /// assert_eq!(pool.get(key), Some(&15));
    /// ```
    #[inline]
    #[must_use]
    pub fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        self.slots
            .get_mut(key.index_in_pool)
            .and_then(Option::as_mut)
    }

    /// Inserts an item and returns the key of the slot it landed in.
    ///
    /// A vacant slot is reused if one exists, most recently vacated first. Only when no
    /// vacant slot remains does the pool extend its storage.
    ///
    /// # Example
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::new();
    ///
    /// let a = pool.insert("a");
    /// let b = pool.insert("b");
    /// assert_eq!(a.index(), 0);
    /// assert_eq!(b.index(), 1);
    ///
    /// pool.remove(a);
    ///
    /// // The freed slot is recycled before storage grows.
    /// let c = pool.insert("c");
    /// assert_eq!(c.index(), 0);
    /// ```
    #[must_use]
    pub fn insert(&mut self, value: T) -> Key {
        #[cfg(debug_assertions)]
        self.integrity_check();

        let index = match self.free_indices.pop() {
            Some(index) => {
                let slot = self
                    .slots
                    .get_mut(index)
                    .expect("freelist entries always point into the slot storage");

                assert!(
                    slot.is_none(),
                    "freelist pointed at occupied slot {index} in pool of {}",
                    type_name::<T>()
                );

                *slot = Some(value);
                index
            }
            None => {
                let index = self.slots.len();
                self.slots.push(Some(value));
                index
            }
        };

        self.count = self
            .count
            .checked_add(1)
            .expect("occupied slot count is bounded by the slot storage length");

        Key {
            index_in_pool: index,
        }
    }

    /// Removes the item under `key`, returning it.
    ///
    /// Removing from a vacant slot or with an out-of-range key is a no-op that returns
    /// `None`. The vacated slot keeps its position so the indices of all other items are
    /// unaffected; it is recycled by a later insertion.
    ///
    /// When the removal leaves the pool empty, the storage and the freelist are discarded
    /// entirely so that the next insertion starts again from index zero.
    ///
    /// # Example
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::new();
    ///
    /// let key = pool.insert(7);
    ///
    /// assert_eq!(pool.remove(key), Some(7));
    /// assert_eq!(pool.remove(key), None);
    /// ```
    pub fn remove(&mut self, key: Key) -> Option<T> {
        let value = self
            .slots
            .get_mut(key.index_in_pool)
            .and_then(Option::take)?;

        self.count = self
            .count
            .checked_sub(1)
            .expect("we just vacated an occupied slot, so the count cannot have been zero");

        if self.count == 0 {
            // No survivors whose indices we would have to preserve, so instead of
            // accumulating holes we restart from a clean slate.
            self.slots.clear();
            self.free_indices.clear();
        } else {
            self.free_indices.push(key.index_in_pool);
        }

        Some(value)
    }

    /// Removes all items from the pool, dropping them.
    ///
    /// Afterwards the pool behaves like a freshly created one: the next insertion receives
    /// index zero.
    ///
    /// # Example
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::new();
    ///
    /// _ = pool.insert(1);
    /// _ = pool.insert(2);
    ///
    /// pool.clear();
    ///
    /// assert!(pool.is_empty());
    /// assert_eq!(pool.span(), 0);
    /// ```
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_indices.clear();
        self.count = 0;
    }

    /// Iterates over the occupied slots in ascending index order, skipping holes.
    ///
    /// # Example
    ///
    /// ```
    /// use slot_pool::SlotPool;
    ///
    /// let mut pool = SlotPool::new();
    ///
    /// let _a = pool.insert("a");
    /// let b = pool.insert("b");
    /// let _c = pool.insert("c");
    ///
    /// pool.remove(b);
    ///
    /// let survivors: Vec<&str> = pool.iter().map(|(_, value)| *value).collect();
    /// assert_eq!(survivors, vec!["a", "c"]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.slots.iter().enumerate(),
        }
    }

    /// Verifies the internal bookkeeping. Debug builds run this before every insertion.
    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    fn integrity_check(&self) {
        let occupied_count = self.slots.iter().filter(|slot| slot.is_some()).count();

        assert!(
            self.count == occupied_count,
            "self.count {} does not match the observed occupied count {} in pool of {}",
            self.count,
            occupied_count,
            type_name::<T>()
        );

        let mut seen = vec![false; self.slots.len()];

        for &index in &self.free_indices {
            assert!(
                self.slots.get(index).is_some_and(Option::is_none),
                "freelist entry {index} does not point at a vacant slot in pool of {}",
                type_name::<T>()
            );

            let seen_entry = seen
                .get_mut(index)
                .expect("guarded by the vacancy check above");

            assert!(
                !*seen_entry,
                "freelist contains duplicate entry {index} in pool of {}",
                type_name::<T>()
            );

            *seen_entry = true;
        }

        let vacant_count = self
            .slots
            .len()
            .checked_sub(occupied_count)
            .expect("occupied slots are a subset of all slots");

        assert!(
            self.free_indices.len() == vacant_count,
            "freelist length {} does not match the vacant slot count {} in pool of {}",
            self.free_indices.len(),
            vacant_count,
            type_name::<T>()
        );
    }
}

impl<T> Default for SlotPool<T> {
    /// Creates a new empty [`SlotPool`].
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the occupied slots of a [`SlotPool`], in ascending index order.
///
/// Returned by [`SlotPool::iter()`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    inner: Enumerate<slice::Iter<'a, Option<T>>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (Key, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (index, slot) = self.inner.next()?;

            if let Some(value) = slot.as_ref() {
                return Some((
                    Key {
                        index_in_pool: index,
                    },
                    value,
                ));
            }
        }
    }
}

impl<'a, T> IntoIterator for &'a SlotPool<T> {
    type IntoIter = Iter<'a, T>;
    type Item = (Key, &'a T);

    /// Returns an iterator over the occupied slots, in ascending index order.
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn smoke_test() {
        let mut pool = SlotPool::new();

        let a = pool.insert(42);
        let b = pool.insert(43);
        let c = pool.insert(44);

        assert_eq!(pool.get(a), Some(&42));
        assert_eq!(pool.get(b), Some(&43));
        assert_eq!(pool.get(c), Some(&44));

        assert_eq!(pool.len(), 3);

        assert_eq!(pool.remove(b), Some(43));

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(b), None);

        let d = pool.insert(45);

        assert_eq!(pool.get(a), Some(&42));
        assert_eq!(pool.get(c), Some(&44));
        assert_eq!(pool.get(d), Some(&45));
    }

    #[test]
    fn remove_makes_room() {
        let mut pool = SlotPool::new();

        let a = pool.insert(1);
        let b = pool.insert(2);
        let _c = pool.insert(3);

        _ = pool.remove(b);

        // The freed slot is reused instead of growing the storage.
        let d = pool.insert(4);
        assert_eq!(d.index(), b.index());
        assert_eq!(pool.span(), 3);

        _ = pool.remove(a);
        _ = pool.remove(d);

        // Most recently freed first.
        let e = pool.insert(5);
        assert_eq!(e.index(), d.index());

        let f = pool.insert(6);
        assert_eq!(f.index(), a.index());
    }

    #[test]
    fn remove_vacant_is_noop() {
        let mut pool = SlotPool::new();

        let a = pool.insert(1);
        let _b = pool.insert(2);

        assert_eq!(pool.remove(a), Some(1));
        assert_eq!(pool.remove(a), None);

        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut pool = SlotPool::<u32>::new();

        assert_eq!(pool.remove(Key::from_index(1234)), None);
        assert!(pool.is_empty());
    }

    #[test]
    fn emptied_pool_restarts_from_index_zero() {
        let mut pool = SlotPool::new();

        let a = pool.insert(1);
        let b = pool.insert(2);
        let c = pool.insert(3);

        _ = pool.remove(c);
        _ = pool.remove(a);
        _ = pool.remove(b);

        assert!(pool.is_empty());
        assert_eq!(pool.span(), 0);

        let fresh = pool.insert(4);
        assert_eq!(fresh.index(), 0);
    }

    #[test]
    fn removal_preserves_order_of_survivors() {
        let mut pool = SlotPool::new();

        let _a = pool.insert("a");
        let b = pool.insert("b");
        let _c = pool.insert("c");
        let _d = pool.insert("d");

        _ = pool.remove(b);

        let survivors: Vec<&str> = pool.iter().map(|(_, value)| *value).collect();
        assert_eq!(survivors, vec!["a", "c", "d"]);

        let indexes: Vec<usize> = pool.iter().map(|(key, _)| key.index()).collect();
        assert_eq!(indexes, vec![0, 2, 3]);
    }

    #[test]
    fn span_counts_holes() {
        let mut pool = SlotPool::new();

        let a = pool.insert(1);
        let _b = pool.insert(2);
        let _c = pool.insert(3);

        _ = pool.remove(a);

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.span(), 3);
    }

    #[test]
    fn get_mut_mutates() {
        let mut pool = SlotPool::new();

        let key = pool.insert(String::from("before"));

        *pool.get_mut(key).unwrap() = String::from("after");

        assert_eq!(pool.get(key).map(String::as_str), Some("after"));
    }

    #[test]
    fn clear_empties_everything() {
        let mut pool = SlotPool::new();

        let a = pool.insert(1);
        _ = pool.insert(2);
        _ = pool.remove(a);

        pool.clear();

        assert!(pool.is_empty());
        assert_eq!(pool.span(), 0);

        let fresh = pool.insert(3);
        assert_eq!(fresh.index(), 0);
    }

    #[test]
    fn clear_drops_items() {
        struct Droppable {
            dropped: Rc<Cell<bool>>,
        }

        impl Drop for Droppable {
            fn drop(&mut self) {
                self.dropped.set(true);
            }
        }

        let dropped = Rc::new(Cell::new(false));
        let mut pool = SlotPool::new();

        _ = pool.insert(Droppable {
            dropped: Rc::clone(&dropped),
        });

        pool.clear();

        assert!(dropped.get());
    }

    #[test]
    fn iter_of_empty_pool_yields_nothing() {
        let pool = SlotPool::<u8>::new();

        assert_eq!(pool.iter().count(), 0);
    }

    #[test]
    fn into_iterator_for_reference() {
        let mut pool = SlotPool::new();

        _ = pool.insert(5);
        _ = pool.insert(6);

        let mut seen = Vec::new();
        for (_, value) in &pool {
            seen.push(*value);
        }

        assert_eq!(seen, vec![5, 6]);
    }

    #[test]
    fn key_from_index_addresses_slot() {
        let mut pool = SlotPool::new();

        let key = pool.insert(9);

        assert_eq!(Key::from_index(key.index()), key);
        assert_eq!(pool.get(Key::from_index(0)), Some(&9));
    }

    #[test]
    fn default_is_empty() {
        let pool = SlotPool::<u64>::default();

        assert!(pool.is_empty());
        assert_eq!(pool.span(), 0);
    }
}
