//! # Registry configuration.
//!
//! Provides [`RegistryConfig`], the construction-time settings of a
//! [`Registry`](crate::Registry).
//!
//! Config is used in two ways:
//! 1. **Standalone registries**: `Registry::with_config(config)`
//! 2. **Layer registries**: `EventLayer::builder(name).registry_config(config)`

/// Construction-time settings for a [`Registry`](crate::Registry).
///
/// ## Field semantics
/// - `allow_duplicate_registration`: skip the "already registered" scan in `add_handler`
/// - `prune_empty_buckets`: erase a bucket as soon as its last handler is removed or expires
///
/// ## Notes
/// All fields are public. The defaults are the checked settings; relaxing them trades
/// the duplicate scan and the map cleanup for cheaper registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Accept the same handler twice under the same event kind.
    ///
    /// - `false` = a second `add_handler` with an already registered handler is a no-op
    /// - `true` = the handler is appended again and runs once per registration
    pub allow_duplicate_registration: bool,

    /// Erase buckets that become empty.
    ///
    /// - `true` = no empty bucket outlives the call that emptied it
    /// - `false` = empty buckets stay in the map until [`Registry::clear`](crate::Registry::clear)
    pub prune_empty_buckets: bool,
}

impl RegistryConfig {
    /// Config with duplicate checks disabled.
    #[inline]
    pub fn permissive() -> Self {
        Self {
            allow_duplicate_registration: true,
            ..Self::default()
        }
    }
}

impl Default for RegistryConfig {
    /// Default configuration:
    ///
    /// - `allow_duplicate_registration = false` (duplicate registration is a no-op)
    /// - `prune_empty_buckets = true` (no dangling empty entries)
    fn default() -> Self {
        Self {
            allow_duplicate_registration: false,
            prune_empty_buckets: true,
        }
    }
}
