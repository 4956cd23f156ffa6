//! The [`DyCore`] trait and the pass-through [`NullDyCore`].

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

use floe_core::{FieldKey, Registry, RegistryError};

/// A dynamical core driven through a shared [`Registry`].
///
/// # Contract
///
/// - `init()` receives the host's configuration path untouched and may
///   read any field the host has set.
/// - `run()` advances the model by `time_increment` years and updates
///   `current_time` in place. Outputs (e.g. `velocity.uvel`) are written
///   back through the registry's setters.
/// - `delete()` releases anything the core allocated itself. It must not
///   free memory behind registry aliases.
///
/// Every method has a pass-through default, so a core overrides only the
/// hooks it needs.
///
/// # Examples
///
/// ```
/// use floe_core::Registry;
/// use floe_dycore::{DyCore, DyCoreError};
///
/// struct Clock;
///
/// impl DyCore for Clock {
///     fn name(&self) -> &str { "clock" }
///
///     fn run(
///         &mut self,
///         vars: &mut Registry,
///         current_time: &mut f64,
///         time_increment: f64,
///     ) -> Result<(), DyCoreError> {
///         vars.set_double_scalar(9.81, "gravity", "constants")?;
///         *current_time += time_increment;
///         Ok(())
///     }
/// }
///
/// let mut reg = Registry::new();
/// let mut t = 0.0;
/// Clock.run(&mut reg, &mut t, 0.5).unwrap();
/// assert_eq!(t, 0.5);
/// ```
pub trait DyCore {
    /// Human-readable name for logging and error reporting.
    fn name(&self) -> &str;

    /// Prepare the core from its configuration file.
    fn init(&mut self, vars: &mut Registry, config_path: &Path) -> Result<(), DyCoreError> {
        let _ = (vars, config_path);
        Ok(())
    }

    /// Advance one step.
    fn run(
        &mut self,
        vars: &mut Registry,
        current_time: &mut f64,
        time_increment: f64,
    ) -> Result<(), DyCoreError> {
        let _ = vars;
        *current_time += time_increment;
        Ok(())
    }

    /// Release core-owned resources.
    fn delete(&mut self, vars: &mut Registry) -> Result<(), DyCoreError> {
        let _ = vars;
        Ok(())
    }
}

/// A core that accepts every call and only advances time.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDyCore;

impl DyCore for NullDyCore {
    fn name(&self) -> &str {
        "null"
    }
}

/// Errors a core reports from its lifecycle hooks.
#[derive(Clone, Debug, PartialEq)]
pub enum DyCoreError {
    /// The configuration file could not be used.
    Config {
        /// Path as passed to `init()`.
        path: PathBuf,
        /// Description of the problem.
        reason: String,
    },
    /// A field the core depends on has not been set by the host.
    MissingInput {
        /// The missing field.
        key: FieldKey,
    },
    /// A registry access failed.
    Registry(RegistryError),
    /// The step itself failed.
    StepFailed {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for DyCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { path, reason } => {
                write!(f, "config '{}': {reason}", path.display())
            }
            Self::MissingInput { key } => write!(f, "required input {key} is not set"),
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::StepFailed { reason } => write!(f, "step failed: {reason}"),
        }
    }
}

impl Error for DyCoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegistryError> for DyCoreError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}
