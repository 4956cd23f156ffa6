//! Test utilities and mock dycores for Floe development.
//!
//! - [`GridFixture`]: host-owned arrays for a small grid, with helpers to
//!   alias them into a [`Registry`](floe_core::Registry).
//! - [`RecordingDyCore`]: records every lifecycle call and writes velocity
//!   outputs back through the registry.
//! - [`FailingDyCore`]: fails deterministically at a chosen hook.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{CallLog, FailingDyCore, FailAt, GridFixture, RecordingDyCore};
