//! C-compatible status codes.
//!
//! [`FloeStatus`] is a `repr(i32)` enum covering every failure the shim
//! can report. `Ok` is zero and every error is negative; values are
//! ABI-stable. Conversions from the Rust error types are provided.

use floe_core::RegistryError;
use floe_dycore::LifecycleError;

/// Status code returned by every FFI function.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloeStatus {
    /// Success.
    Ok = 0,
    /// The (section, field) pair is not in the catalog.
    UnknownIdentity = -1,
    /// The field stores a different type than the call assumes.
    TypeMismatch = -2,
    /// Copy-in extent does not match the buffer.
    DimensionMismatch = -3,
    /// Dimension descriptor is malformed.
    InvalidDimInfo = -4,
    /// Copy-in attempted before the section's `dimInfo` was set.
    MissingDescriptor = -5,
    /// Registry-owned storage could not be allocated.
    AllocationFailed = -6,
    /// Scalar field exists but has never been set.
    Unset = -7,
    /// `dycore_index` is invalid or was already destroyed.
    InvalidHandle = -8,
    /// An argument is null, not UTF-8, or otherwise invalid.
    InvalidArgument = -9,
    /// No core is registered for the requested `dycore_type`.
    UnknownDyCoreType = -10,
    /// The lifecycle operation is not allowed in the current state.
    LifecycleViolation = -11,
    /// The dycore's own hook failed.
    DyCoreFailed = -12,
    /// Internal error (e.g. re-entrant call on the instance table).
    InternalError = -20,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&RegistryError> for FloeStatus {
    fn from(e: &RegistryError) -> Self {
        match e {
            RegistryError::UnknownSection { .. } | RegistryError::UnknownField { .. } => {
                FloeStatus::UnknownIdentity
            }
            RegistryError::TypeMismatch { .. } => FloeStatus::TypeMismatch,
            RegistryError::DimensionMismatch { .. } => FloeStatus::DimensionMismatch,
            RegistryError::InvalidDimInfo(_) => FloeStatus::InvalidDimInfo,
            RegistryError::MissingDescriptor { .. } => FloeStatus::MissingDescriptor,
            RegistryError::AllocationFailed { .. } => FloeStatus::AllocationFailed,
        }
    }
}

impl From<&LifecycleError> for FloeStatus {
    fn from(e: &LifecycleError) -> Self {
        match e {
            LifecycleError::NotAllowed { .. } => FloeStatus::LifecycleViolation,
            LifecycleError::InvalidTimeIncrement { .. } => FloeStatus::InvalidArgument,
            LifecycleError::Core { .. } => FloeStatus::DyCoreFailed,
        }
    }
}

/// Collapse a unit result to a raw status code.
pub(crate) fn to_status<E>(result: Result<(), E>) -> i32
where
    for<'a> FloeStatus: From<&'a E>,
{
    match result {
        Ok(()) => FloeStatus::Ok as i32,
        Err(e) => FloeStatus::from(&e) as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floe_core::{DimError, FieldKey, FieldKind, Section, VarType};
    use floe_dycore::{DyCoreError, LifecycleState};

    #[test]
    fn status_code_values_are_stable() {
        assert_eq!(FloeStatus::Ok as i32, 0);
        assert_eq!(FloeStatus::UnknownIdentity as i32, -1);
        assert_eq!(FloeStatus::TypeMismatch as i32, -2);
        assert_eq!(FloeStatus::DimensionMismatch as i32, -3);
        assert_eq!(FloeStatus::InvalidDimInfo as i32, -4);
        assert_eq!(FloeStatus::MissingDescriptor as i32, -5);
        assert_eq!(FloeStatus::AllocationFailed as i32, -6);
        assert_eq!(FloeStatus::Unset as i32, -7);
        assert_eq!(FloeStatus::InvalidHandle as i32, -8);
        assert_eq!(FloeStatus::InvalidArgument as i32, -9);
        assert_eq!(FloeStatus::UnknownDyCoreType as i32, -10);
        assert_eq!(FloeStatus::LifecycleViolation as i32, -11);
        assert_eq!(FloeStatus::DyCoreFailed as i32, -12);
        assert_eq!(FloeStatus::InternalError as i32, -20);
        assert_eq!(FloeStatus::Panicked as i32, -128);
    }

    #[test]
    fn registry_errors_map() {
        let key = FieldKey::lookup(Section::Geometry, "thck").unwrap();
        let cases = [
            (
                RegistryError::UnknownSection {
                    section: "x".into(),
                },
                FloeStatus::UnknownIdentity,
            ),
            (
                RegistryError::UnknownField {
                    section: Section::Geometry,
                    field: "x".into(),
                },
                FloeStatus::UnknownIdentity,
            ),
            (
                RegistryError::TypeMismatch {
                    key,
                    expected: FieldKind::DoubleArray,
                    found: VarType::LongArray,
                },
                FloeStatus::TypeMismatch,
            ),
            (
                RegistryError::DimensionMismatch {
                    key,
                    declared: 2,
                    actual: 3,
                },
                FloeStatus::DimensionMismatch,
            ),
            (
                RegistryError::InvalidDimInfo(DimError::Overflow),
                FloeStatus::InvalidDimInfo,
            ),
            (
                RegistryError::MissingDescriptor {
                    key,
                    descriptor: key,
                },
                FloeStatus::MissingDescriptor,
            ),
            (
                RegistryError::AllocationFailed { key, requested: 1 },
                FloeStatus::AllocationFailed,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(FloeStatus::from(&err), status, "{err}");
        }
    }

    #[test]
    fn lifecycle_errors_map() {
        assert_eq!(
            FloeStatus::from(&LifecycleError::NotAllowed {
                state: LifecycleState::Deleted,
                operation: "run",
            }),
            FloeStatus::LifecycleViolation
        );
        assert_eq!(
            FloeStatus::from(&LifecycleError::InvalidTimeIncrement { value: -1.0 }),
            FloeStatus::InvalidArgument
        );
        assert_eq!(
            FloeStatus::from(&LifecycleError::Core {
                name: "x".into(),
                reason: DyCoreError::StepFailed {
                    reason: "boom".into()
                },
            }),
            FloeStatus::DyCoreFailed
        );
    }
}
