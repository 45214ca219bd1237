use smallvec::{SmallVec, smallvec};

/// How many values an [`Args`] pack stores inline before spilling to the heap.
const INLINE_VALUES: usize = 5;

/// The argument pack delivered to every listener of one emission.
///
/// Holds zero or more positional values of the event's payload type. Packs of up to five
/// values are stored inline, which keeps the common emit shapes free of heap allocation;
/// larger packs spill to the heap transparently.
///
/// Construction is usually implicit through the `From` conversions accepted by the emit
/// methods:
///
/// ```
/// use emitter::Args;
///
/// // The unit value is the empty pack.
/// let empty = Args::<u32>::from(());
/// assert!(empty.is_empty());
///
/// // Tuples of up to five values convert directly.
/// let pair = Args::from((1_u32, 2));
/// assert_eq!(pair.values(), &[1, 2]);
///
/// // Anything larger arrives as a `Vec` or through `collect()`.
/// let many = Args::from(vec![1_u32, 2, 3, 4, 5, 6]);
/// assert_eq!(many.len(), 6);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Args<T> {
    values: SmallVec<[T; INLINE_VALUES]>,
}

impl<T> Args<T> {
    /// Creates an empty argument pack.
    ///
    /// # Example
    ///
    /// ```
    /// use emitter::Args;
    ///
    /// let args = Args::<String>::new();
    ///
    /// assert!(args.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: SmallVec::new(),
        }
    }

    /// The packed values, in positional order. This is the slice listeners receive.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// The number of values in the pack.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the pack holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T> Default for Args<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<()> for Args<T> {
    fn from((): ()) -> Self {
        Self::new()
    }
}

impl<T> From<(T,)> for Args<T> {
    fn from(value: (T,)) -> Self {
        Self {
            values: smallvec![value.0],
        }
    }
}

impl<T> From<(T, T)> for Args<T> {
    fn from(value: (T, T)) -> Self {
        Self {
            values: smallvec![value.0, value.1],
        }
    }
}

impl<T> From<(T, T, T)> for Args<T> {
    fn from(value: (T, T, T)) -> Self {
        Self {
            values: smallvec![value.0, value.1, value.2],
        }
    }
}

impl<T> From<(T, T, T, T)> for Args<T> {
    fn from(value: (T, T, T, T)) -> Self {
        Self {
            values: smallvec![value.0, value.1, value.2, value.3],
        }
    }
}

impl<T> From<(T, T, T, T, T)> for Args<T> {
    fn from(value: (T, T, T, T, T)) -> Self {
        Self {
            values: smallvec![value.0, value.1, value.2, value.3, value.4],
        }
    }
}

impl<T> From<Vec<T>> for Args<T> {
    fn from(value: Vec<T>) -> Self {
        Self {
            values: SmallVec::from_vec(value),
        }
    }
}

impl<T> FromIterator<T> for Args<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
