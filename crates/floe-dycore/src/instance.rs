//! [`DyCoreInstance`]: one registry composed with one core.
//!
//! The instance owns the lifecycle state machine. The registry itself is
//! stateless across calls apart from its stored values; only the instance
//! knows whether the core has been initialized, is stepping, or has been
//! torn down.
//!
//! # Atomic steps
//!
//! [`run_dycore()`](DyCoreInstance::run_dycore) hands the core a private
//! copy of the model time and writes it back only on success, so a failed
//! step leaves both the caller's time and the lifecycle state unchanged.

use std::error::Error;
use std::fmt;
use std::path::Path;

use floe_core::Registry;

use crate::dycore::{DyCore, DyCoreError};

/// Where a core is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Constructed; the host is still populating the registry.
    Uninitialized,
    /// `init` succeeded.
    Initialized,
    /// At least one `run` succeeded.
    Running,
    /// `delete` succeeded. Terminal.
    Deleted,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initialized => write!(f, "initialized"),
            Self::Running => write!(f, "running"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// Errors from driving a [`DyCoreInstance`].
#[derive(Clone, Debug, PartialEq)]
pub enum LifecycleError {
    /// The operation is not allowed in the current state.
    NotAllowed {
        /// State at the time of the call.
        state: LifecycleState,
        /// The rejected operation.
        operation: &'static str,
    },
    /// `time_increment` is negative, NaN or infinite.
    InvalidTimeIncrement {
        /// The rejected value.
        value: f64,
    },
    /// The core's hook failed. The state did not change.
    Core {
        /// Name of the failing core.
        name: String,
        /// The underlying core error.
        reason: DyCoreError,
    },
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAllowed { state, operation } => {
                write!(f, "cannot {operation} a dycore that is {state}")
            }
            Self::InvalidTimeIncrement { value } => {
                write!(f, "time increment must be finite and non-negative, got {value}")
            }
            Self::Core { name, reason } => write!(f, "dycore '{name}' failed: {reason}"),
        }
    }
}

impl Error for LifecycleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Core { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// A registry and the core that consumes it.
pub struct DyCoreInstance {
    registry: Registry,
    core: Box<dyn DyCore>,
    state: LifecycleState,
}

impl DyCoreInstance {
    /// Compose a fresh registry, tagged with `dycore_type`, with `core`.
    pub fn new(dycore_type: i32, core: Box<dyn DyCore>) -> Self {
        let mut registry = Registry::new();
        registry.set_dycore_type(dycore_type);
        Self::with_registry(registry, core)
    }

    /// Compose an existing registry with `core`.
    pub fn with_registry(registry: Registry, core: Box<dyn DyCore>) -> Self {
        Self {
            registry,
            core,
            state: LifecycleState::Uninitialized,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Name of the composed core.
    pub fn core_name(&self) -> &str {
        self.core.name()
    }

    /// Shared registry, for readers.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Shared registry, for the host's setters.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Initialize the core from its configuration file.
    pub fn init_dycore(&mut self, config_path: impl AsRef<Path>) -> Result<(), LifecycleError> {
        self.require(&[LifecycleState::Uninitialized], "init")?;
        let path = config_path.as_ref();
        self.core
            .init(&mut self.registry, path)
            .map_err(|e| core_failed(self.core.name(), e))?;
        log::info!(
            "dycore '{}' (type {}) initialized from {}",
            self.core.name(),
            self.registry.dycore_type(),
            path.display()
        );
        self.state = LifecycleState::Initialized;
        Ok(())
    }

    /// Advance one step, updating `current_time` on success.
    pub fn run_dycore(
        &mut self,
        current_time: &mut f64,
        time_increment: f64,
    ) -> Result<(), LifecycleError> {
        self.require(&[LifecycleState::Initialized, LifecycleState::Running], "run")?;
        if !time_increment.is_finite() || time_increment < 0.0 {
            return Err(LifecycleError::InvalidTimeIncrement {
                value: time_increment,
            });
        }
        let mut time = *current_time;
        self.core
            .run(&mut self.registry, &mut time, time_increment)
            .map_err(|e| core_failed(self.core.name(), e))?;
        log::debug!(
            "dycore '{}' advanced {} -> {}",
            self.core.name(),
            current_time,
            time
        );
        *current_time = time;
        self.state = LifecycleState::Running;
        Ok(())
    }

    /// Tear the core down. The registry and its stored values survive
    /// until the instance is dropped.
    pub fn delete_dycore(&mut self) -> Result<(), LifecycleError> {
        self.require(&[LifecycleState::Initialized, LifecycleState::Running], "delete")?;
        self.core
            .delete(&mut self.registry)
            .map_err(|e| core_failed(self.core.name(), e))?;
        log::info!("dycore '{}' deleted", self.core.name());
        self.state = LifecycleState::Deleted;
        Ok(())
    }

    fn require(
        &self,
        allowed: &[LifecycleState],
        operation: &'static str,
    ) -> Result<(), LifecycleError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            log::debug!("rejected {operation} while {}", self.state);
            Err(LifecycleError::NotAllowed {
                state: self.state,
                operation,
            })
        }
    }
}

fn core_failed(name: &str, reason: DyCoreError) -> LifecycleError {
    log::warn!("dycore '{name}' failed: {reason}");
    LifecycleError::Core {
        name: name.to_owned(),
        reason,
    }
}
