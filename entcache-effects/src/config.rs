//! Configuration for the effects runtime and dispatchers.

use std::time::Duration;

/// Configuration for the persistence effects.
#[derive(Debug, Clone)]
pub struct EffectsConfig {
    /// Minimum delay before a skipped or failed action's result is emitted.
    /// Callers expect persistence results to arrive asynchronously.
    pub response_delay: Duration,
    /// Capacity of the dispatch and persistence queues. Derived actions are
    /// buffered without limit until received.
    pub queue_capacity: usize,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            response_delay: Duration::from_millis(10),
            queue_capacity: 256,
        }
    }
}

/// Default optimistic/pessimistic policy for saves issued by an
/// [`EntityDispatcher`](crate::EntityDispatcher).
///
/// An optimistic save changes the collection before the server confirms; a
/// pessimistic one waits for the success action. Defaults are the safest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultDispatcherOptions {
    pub optimistic_add: bool,
    pub optimistic_delete: bool,
    pub optimistic_update: bool,
}

impl Default for DefaultDispatcherOptions {
    fn default() -> Self {
        Self {
            optimistic_add: false,
            optimistic_delete: true,
            optimistic_update: false,
        }
    }
}
