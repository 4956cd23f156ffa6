//! Registry configuration.

use crate::error::ConfigError;

/// Tunables for a [`Registry`](crate::Registry).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Reject copy-ins into a section whose `dimInfo` has not been set.
    /// Default: `true`.
    pub enforce_descriptor_order: bool,
    /// Largest copy-in, in elements, the registry will allocate for.
    /// Larger requests fail with `AllocationFailed`. Default: `1 << 30`.
    pub max_copy_in_elements: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enforce_descriptor_order: true,
            max_copy_in_elements: 1 << 30,
        }
    }
}

impl RegistryConfig {
    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_copy_in_elements == 0 {
            return Err(ConfigError::ZeroCopyInLimit);
        }
        Ok(())
    }
}
