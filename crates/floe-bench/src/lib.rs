//! Benchmark profiles for the Floe variable registry.
//!
//! - [`REFERENCE_GRID`]: 200x150 horizontal grid (30K cells)
//! - [`catalog_names`]: every `(field, section)` pair, for dispatch loops
//! - [`populated_registry`]: a registry with every descriptor and scalar set

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::ptr::NonNull;

use floe_core::{DimInfo, FieldKey, FieldKind, Registry};
use floe_dycore::{DyCoreInstance, NullDyCore};

/// `(ewn, nsn)` of the reference grid.
pub const REFERENCE_GRID: (usize, usize) = (200, 150);

/// Shape of a 2-D field on the reference grid.
pub fn reference_dims() -> DimInfo {
    let (ewn, nsn) = REFERENCE_GRID;
    DimInfo::new(&[ewn, nsn]).expect("reference grid is non-empty")
}

/// Every catalog identity as `(field, section)` names.
pub fn catalog_names() -> Vec<(&'static str, &'static str)> {
    FieldKey::all()
        .map(|k| {
            let spec = k.spec();
            (spec.name, spec.section.name())
        })
        .collect()
}

/// A registry with every descriptor aliased to `dim_info` and every
/// scalar set. `dim_info` must outlive the registry.
pub fn populated_registry(dim_info: &mut [i64]) -> Registry {
    let mut reg = Registry::new();
    let dim_ptr = NonNull::new(dim_info.as_mut_ptr()).expect("slice pointers are never null");
    for key in FieldKey::all() {
        let spec = key.spec();
        let section = spec.section.name();
        let result = match spec.kind {
            FieldKind::LongArray if spec.descriptor => reg.set_long_var(dim_ptr, spec.name, section),
            FieldKind::DoubleScalar => reg.set_double_scalar(1.0, spec.name, section),
            FieldKind::LongScalar => reg.set_long_scalar(1, spec.name, section),
            _ => Ok(()),
        };
        result.expect("catalog identities resolve");
    }
    reg
}

/// A pass-through instance, initialized and ready to step.
pub fn null_instance() -> DyCoreInstance {
    let mut instance = DyCoreInstance::new(0, Box::new(NullDyCore));
    instance
        .init_dycore("bench.config")
        .expect("null core always initializes");
    instance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_resolve() {
        let reg = Registry::new();
        for (field, section) in catalog_names() {
            assert!(reg.resolve(field, section).is_ok(), "{section}.{field}");
        }
    }

    #[test]
    fn populated_registry_accepts_copies() {
        let dims = reference_dims();
        let mut raw = dims.to_raw().to_vec();
        let mut reg = populated_registry(&mut raw);
        let data = vec![0.0; dims.element_count()];
        reg.copy_in_double_var(&data, "uvel", "velocity", &dims)
            .unwrap();
    }
}
