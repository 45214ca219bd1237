use std::marker::PhantomData;

use crate::Emitter;
use crate::constants::DEFAULT_MAX_LISTENERS;
use crate::options::SharedConfig;

/// Builder for creating an instance of [`Emitter`].
///
/// You only need this builder to customize the registry configuration. The defaults used
/// by [`Emitter::new()`][1] are sufficient for most use cases.
///
/// # Example
///
/// ```
/// use emitter::Emitter;
///
/// let emitter = Emitter::<u32>::builder()
///     .specialization_enabled(false)
///     .default_max_listeners(50)
///     .build();
/// # _ = emitter;
/// ```
///
/// [1]: Emitter::new
#[must_use]
pub struct EmitterBuilder<T, R = ()> {
    specialization_enabled: bool,
    default_max_listeners: usize,

    _event: PhantomData<(T, R)>,
}

impl<T, R> std::fmt::Debug for EmitterBuilder<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmitterBuilder")
            .field(
                "payload_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field(
                "result_type",
                &std::format_args!("{}", std::any::type_name::<R>()),
            )
            .field("specialization_enabled", &self.specialization_enabled)
            .field("default_max_listeners", &self.default_max_listeners)
            .finish()
    }
}

impl<T, R> EmitterBuilder<T, R> {
    pub(crate) fn new() -> Self {
        Self {
            specialization_enabled: true,
            default_max_listeners: DEFAULT_MAX_LISTENERS,
            _event: PhantomData,
        }
    }

    /// Sets whether events of this registry may specialize dispatch by capturing plans
    /// for stable listener sets. On by default.
    ///
    /// This is the build-time form of
    /// [`Emitter::set_specialization_enabled()`][Emitter::set_specialization_enabled],
    /// which can also switch it at runtime.
    pub fn specialization_enabled(mut self, enabled: bool) -> Self {
        self.specialization_enabled = enabled;
        self
    }

    /// Sets the leak warning threshold given to events this registry creates.
    ///
    /// Individual events can override it via
    /// [`EventOptions::max_listeners()`][crate::EventOptions::max_listeners].
    pub fn default_max_listeners(mut self, limit: usize) -> Self {
        self.default_max_listeners = limit;
        self
    }

    /// Builds the registry with the specified configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use emitter::Emitter;
    ///
    /// let emitter = Emitter::<u32>::builder().build();
    /// # _ = emitter;
    /// ```
    #[must_use]
    pub fn build(self) -> Emitter<T, R> {
        Emitter::new_inner(SharedConfig::new(
            self.specialization_enabled,
            self.default_max_listeners,
        ))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_match_new() {
        let builder = EmitterBuilder::<u32, ()>::new();

        assert!(builder.specialization_enabled);
        assert_eq!(builder.default_max_listeners, DEFAULT_MAX_LISTENERS);
    }

    #[test]
    fn debug_output_names_the_types() {
        let builder = Emitter::<u32, String>::builder();

        let output = format!("{builder:?}");

        assert!(output.contains("u32"));
        assert!(output.contains("String"));
    }
}
