//! Property tests over the whole catalog: set-then-get identity, unknown
//! identity rejection, unset reads, and copy-in independence/atomicity.

use std::ptr::NonNull;

use floe_core::catalog::CATALOG;
use floe_core::{DimInfo, FieldKey, FieldKind, FieldState, Registry, RegistryError, Section};
use proptest::prelude::*;

fn arb_key() -> impl Strategy<Value = FieldKey> {
    (0..CATALOG.len()).prop_map(|i| FieldKey::all().nth(i).unwrap())
}

fn arb_unknown_name() -> impl Strategy<Value = String> {
    "[a-zA-Z_]{0,16}".prop_filter("must not be a catalog name", |s| {
        CATALOG.iter().all(|spec| spec.name != s.as_str())
            && Section::ALL.iter().all(|sec| sec.name() != s.as_str())
    })
}

/// Registry with every section descriptor set, so copy-ins are admissible.
fn registry_with_descriptors(dim: &mut [i64]) -> Registry {
    let mut reg = Registry::new();
    let p = NonNull::new(dim.as_mut_ptr()).unwrap();
    for section in Section::ALL {
        if let Some(key) = section.descriptor() {
            let spec = key.spec();
            match spec.kind {
                FieldKind::LongArray => reg.set_long_var(p, spec.name, section.name()).unwrap(),
                FieldKind::LongScalar => reg
                    .set_long_scalar(dim[1], spec.name, section.name())
                    .unwrap(),
                _ => unreachable!("descriptors are integer"),
            }
        }
    }
    reg
}

proptest! {
    #[test]
    fn set_then_get_returns_what_was_set(key in arb_key(), value in any::<f64>(), long in any::<i64>()) {
        let spec = key.spec();
        let (field, section) = (spec.name, spec.section.name());
        let mut reg = Registry::new();
        let mut doubles = vec![value; 8];
        let mut longs = vec![long; 8];
        match spec.kind {
            FieldKind::DoubleArray => {
                let p = NonNull::new(doubles.as_mut_ptr()).unwrap();
                reg.set_double_var(p, field, section).unwrap();
                prop_assert_eq!(reg.get_double_var(field, section).unwrap(), Some(p));
            }
            FieldKind::LongArray => {
                let p = NonNull::new(longs.as_mut_ptr()).unwrap();
                reg.set_long_var(p, field, section).unwrap();
                prop_assert_eq!(reg.get_long_var(field, section).unwrap(), Some(p));
            }
            FieldKind::DoubleScalar => {
                reg.set_double_scalar(value, field, section).unwrap();
                let back = reg.get_double_scalar(field, section).unwrap().unwrap();
                prop_assert_eq!(back.to_bits(), value.to_bits());
            }
            FieldKind::LongScalar => {
                reg.set_long_scalar(long, field, section).unwrap();
                prop_assert_eq!(reg.get_long_scalar(field, section).unwrap(), Some(long));
            }
        }
        prop_assert!(reg.is_set(key));
    }

    #[test]
    fn never_set_fields_read_as_unset(key in arb_key()) {
        let spec = key.spec();
        let reg = Registry::new();
        prop_assert_eq!(
            reg.field_state(spec.name, spec.section.name()).unwrap(),
            FieldState::Unset
        );
        let unset = match spec.kind {
            FieldKind::DoubleArray => reg.get_double_var(spec.name, spec.section.name()).unwrap().is_none(),
            FieldKind::LongArray => reg.get_long_var(spec.name, spec.section.name()).unwrap().is_none(),
            FieldKind::DoubleScalar => reg.get_double_scalar(spec.name, spec.section.name()).unwrap().is_none(),
            FieldKind::LongScalar => reg.get_long_scalar(spec.name, spec.section.name()).unwrap().is_none(),
        };
        prop_assert!(unset);
    }

    #[test]
    fn unknown_fields_are_rejected_everywhere(section in prop::sample::select(Section::ALL.to_vec()), name in arb_unknown_name()) {
        let mut reg = Registry::new();
        let sec = section.name();
        let mut doubles = [0.0f64; 1];
        let mut longs = [0i64; 1];
        let one = DimInfo::new(&[1]).unwrap();

        let results = [
            reg.set_double_var(NonNull::new(doubles.as_mut_ptr()).unwrap(), &name, sec).err(),
            reg.get_double_var(&name, sec).err(),
            reg.set_long_var(NonNull::new(longs.as_mut_ptr()).unwrap(), &name, sec).err(),
            reg.get_long_var(&name, sec).err(),
            reg.set_double_scalar(1.0, &name, sec).err(),
            reg.get_double_scalar(&name, sec).err(),
            reg.set_long_scalar(1, &name, sec).err(),
            reg.get_long_scalar(&name, sec).err(),
            reg.copy_in_double_var(&[1.0], &name, sec, &one).err(),
            reg.copy_in_long_var(&[1], &name, sec, &one).err(),
        ];
        for err in results {
            prop_assert_eq!(
                err,
                Some(RegistryError::UnknownField { section, field: name.clone() })
            );
        }
    }

    #[test]
    fn unknown_sections_are_rejected(key in arb_key(), section in arb_unknown_name()) {
        let reg = Registry::new();
        let err = reg.field_state(key.spec().name, &section).unwrap_err();
        prop_assert!(err.is_unknown_identity());
        prop_assert_eq!(err, RegistryError::UnknownSection { section: section.clone() });
    }

    #[test]
    fn copy_in_matches_source_and_is_independent(
        src in prop::collection::vec(any::<f64>(), 1..256),
    ) {
        let mut dim = [1i64, src.len() as i64];
        let mut reg = registry_with_descriptors(&mut dim);
        let dims = DimInfo::new(&[src.len()]).unwrap();

        for key in FieldKey::all().filter(|k| k.spec().kind == FieldKind::DoubleArray) {
            let spec = key.spec();
            let mut buf = src.clone();
            reg.copy_in_double_var(&buf, spec.name, spec.section.name(), &dims).unwrap();
            for v in &mut buf {
                *v = 0.0;
            }
            let copied = reg.copied_double_var(spec.name, spec.section.name()).unwrap().unwrap();
            prop_assert_eq!(copied.len(), src.len());
            for (a, b) in copied.iter().zip(&src) {
                prop_assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }

    #[test]
    fn copy_in_with_wrong_extent_is_all_or_nothing(
        len in 1usize..64,
        declared in 1usize..64,
        prior in prop::option::of(prop::collection::vec(any::<i64>(), 1..8)),
    ) {
        prop_assume!(len != declared);
        let mut dim = [1i64, 1];
        let mut reg = registry_with_descriptors(&mut dim);
        if let Some(prior) = &prior {
            let d = DimInfo::new(&[prior.len()]).unwrap();
            reg.copy_in_long_var(prior, "my_rank", "mpi_vars", &d).unwrap();
        }

        let src = vec![7i64; len];
        let d = DimInfo::new(&[declared]).unwrap();
        let err = reg.copy_in_long_var(&src, "my_rank", "mpi_vars", &d).unwrap_err();
        let is_mismatch = matches!(
            err,
            RegistryError::DimensionMismatch { declared: d2, actual, .. } if d2 == declared && actual == len
        );
        prop_assert!(is_mismatch);
        prop_assert_eq!(
            reg.copied_long_var("my_rank", "mpi_vars").unwrap(),
            prior.as_deref()
        );
    }
}
