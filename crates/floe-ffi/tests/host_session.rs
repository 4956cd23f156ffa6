//! Integration test: a host session driven only through the C surface.
//!
//! Mirrors what a Fortran driver does: create an instance for a registered
//! core, alias its grid arrays, init, step, read the core's outputs back,
//! delete and destroy.

use std::ffi::c_char;

use floe_core::DimInfo;
use floe_ffi::factory::register_dycore;
use floe_ffi::instance::{
    floe_delete_dycore, floe_dycore_create, floe_dycore_destroy, floe_init_dycore,
    floe_run_dycore,
};
use floe_ffi::status::FloeStatus;
use floe_ffi::vars::{floe_get_double_var, floe_set_double_var, floe_set_long_var};
use floe_test_utils::RecordingDyCore;

const OK: i32 = FloeStatus::Ok as i32;
const RECORDING_TYPE: i32 = 2;

fn name(s: &std::ffi::CStr) -> *const c_char {
    s.as_ptr()
}

#[test]
fn host_session_round_trip() {
    register_dycore(RECORDING_TYPE, || {
        let dims = DimInfo::new(&[3, 2]).expect("fixed grid");
        Box::new(RecordingDyCore::new("recording", dims, 4.0))
    });

    let mut index = -1;
    assert_eq!(floe_dycore_create(RECORDING_TYPE, &mut index), OK);

    let mut thck = vec![500.0; 6];
    let mut dim_info = [2i64, 3, 2];
    assert_eq!(
        floe_set_double_var(index, thck.as_mut_ptr(), name(c"thck"), name(c"geometry")),
        OK
    );
    for section in [c"geometry", c"velocity"] {
        assert_eq!(
            floe_set_long_var(index, dim_info.as_mut_ptr(), name(c"dimInfo"), name(section)),
            OK
        );
    }

    assert_eq!(floe_init_dycore(index, name(c"recording.config")), OK);
    let mut time = 0.0;
    for _ in 0..3 {
        assert_eq!(floe_run_dycore(index, &mut time, 0.25), OK);
    }
    assert_eq!(time, 0.75);

    let mut uvel: *mut f64 = std::ptr::null_mut();
    assert_eq!(
        floe_get_double_var(index, name(c"uvel"), name(c"velocity"), &mut uvel),
        OK
    );
    assert!(!uvel.is_null());
    // SAFETY: the registry owns six elements behind uvel until destroy.
    let values = unsafe { std::slice::from_raw_parts(uvel, 6) };
    assert_eq!(values, &[4.0; 6]);

    assert_eq!(floe_delete_dycore(index), OK);
    assert_eq!(floe_dycore_destroy(index), OK);
    assert_eq!(thck[0], 500.0);
}

#[test]
fn failing_init_reports_dycore_failure() {
    let mut index = -1;
    register_dycore(RECORDING_TYPE, || {
        let dims = DimInfo::new(&[1, 1]).expect("fixed grid");
        Box::new(RecordingDyCore::new("recording", dims, 0.0))
    });
    assert_eq!(floe_dycore_create(RECORDING_TYPE, &mut index), OK);
    // geometry.thck was never set.
    assert_eq!(
        floe_init_dycore(index, name(c"x")),
        FloeStatus::DyCoreFailed as i32
    );
    assert_eq!(floe_dycore_destroy(index), OK);
}
