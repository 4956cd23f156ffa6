//! Dynamical-core lifecycle for Floe.
//!
//! A concrete ice-sheet core implements the small [`DyCore`] capability
//! trait. [`DyCoreInstance`] composes one core with the [`Registry`] it
//! reads its inputs from and writes its outputs to, and enforces the
//! lifecycle `Uninitialized -> Initialized -> Running -> Deleted`.
//!
//! [`Registry`]: floe_core::Registry

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dycore;
pub mod instance;

pub use dycore::{DyCore, DyCoreError, NullDyCore};
pub use instance::{DyCoreInstance, LifecycleError, LifecycleState};
