//! Core types for the Floe variable-exchange layer.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! fixed section catalog, the dimension and identity descriptors, and the
//! [`Registry`] dispatcher through which a host ice-sheet model and a
//! dynamical core exchange array and scalar state by name.
//!
//! Array fields either alias memory owned by the caller or hold a copy
//! owned by the registry. The registry never dereferences an alias; it
//! only stores and returns the pointer.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod dim;
pub mod error;
pub mod info;
pub mod registry;
mod slot;

pub use catalog::{FieldKey, FieldKind, FieldSpec, Section, VarType};
pub use config::RegistryConfig;
pub use dim::{DimInfo, MAX_RANK};
pub use error::{ConfigError, DimError, RegistryError};
pub use info::DyCoreInfo;
pub use registry::{FieldState, Registry};
