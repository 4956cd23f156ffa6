//! Floe: a named variable registry shared by an ice-sheet model and the
//! dynamical core ("dycore") it drives.
//!
//! This is the top-level facade crate that re-exports the public API of the
//! Rust-side sub-crates. The C surface for Fortran and C hosts lives in
//! `floe-ffi`.
//!
//! # Quick start
//!
//! ```rust
//! use floe::prelude::*;
//! use std::ptr::NonNull;
//!
//! // A core that doubles the ice thickness on every step.
//! struct Thicken;
//! impl DyCore for Thicken {
//!     fn name(&self) -> &str { "thicken" }
//!     fn run(
//!         &mut self,
//!         vars: &mut Registry,
//!         current_time: &mut f64,
//!         time_increment: f64,
//!     ) -> Result<(), DyCoreError> {
//!         let thck = vars.copied_double_var("thck", "geometry")?.unwrap_or(&[]);
//!         let doubled: Vec<f64> = thck.iter().map(|h| h * 2.0).collect();
//!         let dims = DimInfo::new(&[2, 2]).unwrap();
//!         vars.copy_in_double_var(&doubled, "thck", "geometry", &dims)?;
//!         *current_time += time_increment;
//!         Ok(())
//!     }
//! }
//!
//! let mut dim_info = [2i64, 2, 2];
//! let mut dycore = DyCoreInstance::new(1, Box::new(Thicken));
//! let reg = dycore.registry_mut();
//! reg.set_long_var(NonNull::new(dim_info.as_mut_ptr()).unwrap(), "dimInfo", "geometry")
//!     .unwrap();
//! let dims = DimInfo::new(&[2, 2]).unwrap();
//! reg.copy_in_double_var(&[1.0, 2.0, 3.0, 4.0], "thck", "geometry", &dims)
//!     .unwrap();
//!
//! dycore.init_dycore("thicken.config").unwrap();
//! let mut time = 0.0;
//! dycore.run_dycore(&mut time, 1.0).unwrap();
//! assert_eq!(time, 1.0);
//! assert_eq!(
//!     dycore.registry().copied_double_var("thck", "geometry").unwrap(),
//!     Some(&[2.0, 4.0, 6.0, 8.0][..])
//! );
//! dycore.delete_dycore().unwrap();
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`registry`] | `floe-core` | Section catalog, dimension descriptors, the dispatcher |
//! | [`dycore`] | `floe-dycore` | Dycore trait and lifecycle-managed instances |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Section catalog, dimension descriptors and the dispatcher (`floe-core`).
///
/// [`registry::Registry`] is the entry point; every field is addressed by a
/// `(field, section)` name pair from [`registry::catalog`].
pub use floe_core as registry;

/// Dycore trait and lifecycle-managed instances (`floe-dycore`).
///
/// Implement [`dycore::DyCore`] and compose it with a registry through
/// [`dycore::DyCoreInstance`].
pub use floe_dycore as dycore;

/// Common imports for typical Floe usage.
///
/// ```rust
/// use floe::prelude::*;
/// ```
pub mod prelude {
    // Catalog and descriptors
    pub use floe_core::{DimInfo, FieldKey, FieldKind, Section, VarType};

    // Dispatcher
    pub use floe_core::{FieldState, Registry, RegistryConfig};

    // Errors
    pub use floe_core::{DimError, RegistryError};
    pub use floe_dycore::{DyCoreError, LifecycleError};

    // Dycores
    pub use floe_dycore::{DyCore, DyCoreInstance, LifecycleState, NullDyCore};
}
