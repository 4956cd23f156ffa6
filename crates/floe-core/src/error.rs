//! Error types for the variable registry.
//!
//! Every registry operation returns its failure to the immediate caller.
//! Nothing here aborts; an unset field is not an error and is reported
//! through `Ok(None)` rather than through these types.

use std::error::Error;
use std::fmt;

use crate::catalog::{FieldKey, FieldKind, Section, VarType};

/// Errors from registry set, get and copy-in operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// The section name is not in the catalog.
    UnknownSection {
        /// The name as supplied by the caller.
        section: String,
    },
    /// The section exists but has no field of this name.
    UnknownField {
        /// The resolved section.
        section: Section,
        /// The field name as supplied by the caller.
        field: String,
    },
    /// The field exists but stores a different type than the call assumes.
    TypeMismatch {
        /// The addressed field.
        key: FieldKey,
        /// The field's fixed storage kind.
        expected: FieldKind,
        /// The type the call assumed.
        found: VarType,
    },
    /// A copy-in buffer does not match the extent its descriptor declares.
    DimensionMismatch {
        /// The addressed field.
        key: FieldKey,
        /// Element count declared by the descriptor.
        declared: usize,
        /// Element count actually supplied.
        actual: usize,
    },
    /// A dimension descriptor failed validation.
    InvalidDimInfo(DimError),
    /// A copy-in was attempted before the section's `dimInfo` was set.
    MissingDescriptor {
        /// The addressed field.
        key: FieldKey,
        /// The descriptor that must be set first.
        descriptor: FieldKey,
    },
    /// Registry-owned storage for a copy-in could not be allocated.
    AllocationFailed {
        /// The addressed field.
        key: FieldKey,
        /// Number of elements requested.
        requested: usize,
    },
}

impl RegistryError {
    /// Whether this error means the (section, field) pair does not exist.
    pub fn is_unknown_identity(&self) -> bool {
        matches!(self, Self::UnknownSection { .. } | Self::UnknownField { .. })
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSection { section } => write!(f, "unknown section '{section}'"),
            Self::UnknownField { section, field } => {
                write!(f, "unknown field '{field}' in section '{section}'")
            }
            Self::TypeMismatch {
                key,
                expected,
                found,
            } => write!(f, "{key} stores a {expected}, not a {found}"),
            Self::DimensionMismatch {
                key,
                declared,
                actual,
            } => write!(
                f,
                "{key}: descriptor declares {declared} elements, buffer has {actual}"
            ),
            Self::InvalidDimInfo(e) => write!(f, "invalid dimension descriptor: {e}"),
            Self::MissingDescriptor { key, descriptor } => {
                write!(f, "{key}: {descriptor} must be set before copy-in")
            }
            Self::AllocationFailed { key, requested } => {
                write!(f, "{key}: could not allocate {requested} elements")
            }
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDimInfo(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DimError> for RegistryError {
    fn from(e: DimError) -> Self {
        Self::InvalidDimInfo(e)
    }
}

/// Errors from building or parsing a [`DimInfo`](crate::DimInfo).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DimError {
    /// Rank is zero, negative, or above [`MAX_RANK`](crate::MAX_RANK).
    RankOutOfRange {
        /// The declared rank.
        rank: i64,
    },
    /// An axis has zero extent.
    ZeroExtent {
        /// Zero-based axis index.
        axis: usize,
    },
    /// An axis has negative extent in the raw form.
    NegativeExtent {
        /// Zero-based axis index.
        axis: usize,
        /// The raw value.
        value: i64,
    },
    /// An extent does not fit in `i64` or the element count in `usize`.
    Overflow,
    /// The halo leaves no owned cells on a horizontal axis.
    HaloTooWide {
        /// Zero-based axis index.
        axis: usize,
        /// Requested halo width.
        halo: usize,
        /// Extent of that axis.
        extent: usize,
    },
    /// The raw form is shorter than its declared rank requires.
    Truncated {
        /// Entries required.
        needed: usize,
        /// Entries supplied.
        got: usize,
    },
}

impl fmt::Display for DimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RankOutOfRange { rank } => write!(f, "rank {rank} out of range"),
            Self::ZeroExtent { axis } => write!(f, "axis {axis} has zero extent"),
            Self::NegativeExtent { axis, value } => {
                write!(f, "axis {axis} has negative extent {value}")
            }
            Self::Overflow => write!(f, "extent or element count overflows the host integer width"),
            Self::HaloTooWide { axis, halo, extent } => {
                write!(f, "halo {halo} leaves no owned cells on axis {axis} (extent {extent})")
            }
            Self::Truncated { needed, got } => {
                write!(f, "descriptor needs {needed} entries, got {got}")
            }
        }
    }
}

impl Error for DimError {}

/// Errors detected by [`RegistryConfig::validate()`](crate::RegistryConfig::validate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_copy_in_elements` is zero, which would reject every copy-in.
    ZeroCopyInLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCopyInLimit => write!(f, "max_copy_in_elements must be at least 1"),
        }
    }
}

impl Error for ConfigError {}
