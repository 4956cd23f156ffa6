//! Instance lifecycle FFI: create, destroy, identity, init, run, delete.
//!
//! Instances live in a per-thread table addressed by `dycore_index`. The
//! table stays borrowed while a dycore hook runs, so a core that calls
//! back into the shim gets `InternalError` rather than a second mutable
//! borrow.

use std::cell::RefCell;
use std::ffi::c_char;

use floe_dycore::DyCoreInstance;

use crate::factory;
use crate::handle::HandleTable;
use crate::status::{to_status, FloeStatus};

thread_local! {
    static INSTANCES: RefCell<HandleTable<DyCoreInstance>> = const { RefCell::new(HandleTable::new()) };
}

/// Run `f` on the instance behind `index`.
pub(crate) fn with_instance<R>(
    index: i32,
    f: impl FnOnce(&mut DyCoreInstance) -> R,
) -> Result<R, FloeStatus> {
    INSTANCES.with(|cell| {
        let mut table = cell
            .try_borrow_mut()
            .map_err(|_| FloeStatus::InternalError)?;
        let instance = table.get_mut(index).ok_or(FloeStatus::InvalidHandle)?;
        Ok(f(instance))
    })
}

/// Create a registry composed with the core registered for `dycore_type`.
///
/// On success the new `dycore_index` is written to `index_out` and also
/// recorded in the registry itself.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_dycore_create(dycore_type: i32, index_out: *mut i32) -> i32 {
    ffi_guard!({
        if index_out.is_null() {
            return FloeStatus::InvalidArgument as i32;
        }
        let Some(core) = factory::construct(dycore_type) else {
            log::debug!("no dycore registered for type {dycore_type}");
            return FloeStatus::UnknownDyCoreType as i32;
        };
        let instance = DyCoreInstance::new(dycore_type, core);
        let index = ffi_try!(INSTANCES.with(|cell| {
            let mut table = cell
                .try_borrow_mut()
                .map_err(|_| FloeStatus::InternalError)?;
            let index = table.insert(instance).ok_or(FloeStatus::InternalError)?;
            if let Some(created) = table.get_mut(index) {
                created.registry_mut().set_dycore_index(index);
            }
            Ok::<_, FloeStatus>(index)
        }));
        log::info!("created dycore instance {index} (type {dycore_type})");
        // SAFETY: index_out is non-null and valid per caller contract.
        unsafe { *index_out = index };
        FloeStatus::Ok as i32
    })
}

/// Destroy an instance, freeing every registry-owned copy.
///
/// Aliased host arrays are untouched. The core's `delete` hook is not
/// called; hosts call [`floe_delete_dycore`] first.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_dycore_destroy(dycore_index: i32) -> i32 {
    ffi_guard!({
        let removed = ffi_try!(INSTANCES.with(|cell| {
            cell.try_borrow_mut()
                .map(|mut table| table.remove(dycore_index))
                .map_err(|_| FloeStatus::InternalError)
        }));
        match removed {
            Some(instance) => {
                log::info!(
                    "destroyed dycore instance {dycore_index} in state {}",
                    instance.state()
                );
                FloeStatus::Ok as i32
            }
            None => FloeStatus::InvalidHandle as i32,
        }
    })
}

/// Write the instance's `dycore_type` to `type_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_get_dycore_type(dycore_index: i32, type_out: *mut i32) -> i32 {
    ffi_guard!({
        if type_out.is_null() {
            return FloeStatus::InvalidArgument as i32;
        }
        let dycore_type = ffi_try!(with_instance(dycore_index, |i| i.registry().dycore_type()));
        // SAFETY: type_out is non-null and valid per caller contract.
        unsafe { *type_out = dycore_type };
        FloeStatus::Ok as i32
    })
}

/// Overwrite the instance's recorded `dycore_type`. The composed core is
/// not replaced.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_set_dycore_type(dycore_index: i32, dycore_type: i32) -> i32 {
    ffi_guard!({
        ffi_try!(with_instance(dycore_index, |i| {
            i.registry_mut().set_dycore_type(dycore_type)
        }));
        FloeStatus::Ok as i32
    })
}

/// Write the `dycore_index` the registry records for itself to `index_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_get_dycore_index(dycore_index: i32, index_out: *mut i32) -> i32 {
    ffi_guard!({
        if index_out.is_null() {
            return FloeStatus::InvalidArgument as i32;
        }
        let index = ffi_try!(with_instance(dycore_index, |i| i.registry().dycore_index()));
        // SAFETY: index_out is non-null and valid per caller contract.
        unsafe { *index_out = index };
        FloeStatus::Ok as i32
    })
}

/// Initialize the core from the configuration file at `config_path`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_init_dycore(dycore_index: i32, config_path: *const c_char) -> i32 {
    ffi_guard!({
        let path = ffi_try!(crate::c_str(config_path));
        ffi_try!(with_instance(dycore_index, |i| to_status(i.init_dycore(path))))
    })
}

/// Advance the core by `time_increment`.
///
/// `current_time` is read on entry and overwritten only if the step
/// succeeds.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_run_dycore(
    dycore_index: i32,
    current_time: *mut f64,
    time_increment: f64,
) -> i32 {
    ffi_guard!({
        if current_time.is_null() {
            return FloeStatus::InvalidArgument as i32;
        }
        // SAFETY: current_time is non-null and valid per caller contract.
        let mut time = unsafe { *current_time };
        let result = ffi_try!(with_instance(dycore_index, |i| {
            i.run_dycore(&mut time, time_increment)
        }));
        if let Err(e) = result {
            return FloeStatus::from(&e) as i32;
        }
        // SAFETY: as above.
        unsafe { *current_time = time };
        FloeStatus::Ok as i32
    })
}

/// Run the core's teardown hook. The instance stays addressable until
/// [`floe_dycore_destroy`].
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_delete_dycore(dycore_index: i32) -> i32 {
    ffi_guard!({ ffi_try!(with_instance(dycore_index, |i| to_status(i.delete_dycore()))) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use floe_dycore::LifecycleState;

    fn create(dycore_type: i32) -> i32 {
        let mut index = -1;
        assert_eq!(
            floe_dycore_create(dycore_type, &mut index),
            FloeStatus::Ok as i32
        );
        index
    }

    #[test]
    fn create_records_identity() {
        let index = create(0);
        assert!(index >= 0);
        let mut t = -1;
        assert_eq!(floe_get_dycore_type(index, &mut t), FloeStatus::Ok as i32);
        assert_eq!(t, 0);
        let mut i = -1;
        assert_eq!(floe_get_dycore_index(index, &mut i), FloeStatus::Ok as i32);
        assert_eq!(i, index);

        assert_eq!(floe_set_dycore_type(index, 3), FloeStatus::Ok as i32);
        floe_get_dycore_type(index, &mut t);
        assert_eq!(t, 3);
        assert_eq!(floe_dycore_destroy(index), FloeStatus::Ok as i32);
    }

    #[test]
    fn create_rejects_unknown_type_and_null_out() {
        let mut index = -1;
        assert_eq!(
            floe_dycore_create(99, &mut index),
            FloeStatus::UnknownDyCoreType as i32
        );
        assert_eq!(index, -1);
        assert_eq!(
            floe_dycore_create(0, std::ptr::null_mut()),
            FloeStatus::InvalidArgument as i32
        );
    }

    #[test]
    fn distinct_instances_get_distinct_indices() {
        let a = create(0);
        let b = create(0);
        assert_ne!(a, b);
        floe_dycore_destroy(a);
        floe_dycore_destroy(b);
    }

    #[test]
    fn destroyed_index_is_invalid() {
        let index = create(0);
        assert_eq!(floe_dycore_destroy(index), FloeStatus::Ok as i32);
        assert_eq!(floe_dycore_destroy(index), FloeStatus::InvalidHandle as i32);
        let mut t = 0;
        assert_eq!(
            floe_get_dycore_type(index, &mut t),
            FloeStatus::InvalidHandle as i32
        );
        assert_eq!(floe_delete_dycore(index), FloeStatus::InvalidHandle as i32);
        assert_eq!(floe_delete_dycore(-5), FloeStatus::InvalidHandle as i32);
    }

    #[test]
    fn lifecycle_through_the_shim() {
        let index = create(0);
        let path = c"glide.config";
        assert_eq!(floe_init_dycore(index, path.as_ptr()), FloeStatus::Ok as i32);

        let mut time = 10.0;
        assert_eq!(floe_run_dycore(index, &mut time, 2.5), FloeStatus::Ok as i32);
        assert_eq!(time, 12.5);
        assert_eq!(
            with_instance(index, |i| i.state()),
            Ok(LifecycleState::Running)
        );

        assert_eq!(floe_delete_dycore(index), FloeStatus::Ok as i32);
        assert_eq!(
            floe_run_dycore(index, &mut time, 1.0),
            FloeStatus::LifecycleViolation as i32
        );
        assert_eq!(time, 12.5);
        floe_dycore_destroy(index);
    }

    #[test]
    fn run_rejects_bad_arguments() {
        let index = create(0);
        assert_eq!(
            floe_run_dycore(index, std::ptr::null_mut(), 1.0),
            FloeStatus::InvalidArgument as i32
        );
        floe_init_dycore(index, c"x".as_ptr());
        let mut time = 1.0;
        assert_eq!(
            floe_run_dycore(index, &mut time, f64::NAN),
            FloeStatus::InvalidArgument as i32
        );
        assert_eq!(time, 1.0);
        assert_eq!(
            floe_init_dycore(index, std::ptr::null()),
            FloeStatus::InvalidArgument as i32
        );
        floe_dycore_destroy(index);
    }

    #[test]
    fn run_before_init_is_a_lifecycle_violation() {
        let index = create(0);
        let mut time = 0.0;
        assert_eq!(
            floe_run_dycore(index, &mut time, 1.0),
            FloeStatus::LifecycleViolation as i32
        );
        floe_dycore_destroy(index);
    }
}
