//! Variable access FFI: aliases, copies and scalars by `(field, section)`.
//!
//! Names are NUL-terminated UTF-8 strings matched exactly against the
//! catalog. Array getters write a null pointer for an unset field and
//! return `Ok`. Scalar getters on an unset field return `Unset` and leave
//! the output untouched.

use std::ffi::c_char;
use std::ptr::NonNull;

use floe_core::{DimInfo, FieldKind, MAX_RANK};

use crate::instance::with_instance;
use crate::status::{to_status, FloeStatus};

fn names<'a>(
    field: *const c_char,
    section: *const c_char,
) -> Result<(&'a str, &'a str), FloeStatus> {
    Ok((crate::c_str(field)?, crate::c_str(section)?))
}

/// Decode a `[rank, n1, ..., n_rank]` descriptor from caller memory.
#[allow(unsafe_code)]
fn read_dim_info(dim_info: *const i64) -> Result<DimInfo, FloeStatus> {
    if dim_info.is_null() {
        return Err(FloeStatus::InvalidArgument);
    }
    // SAFETY: dim_info is non-null and points to at least one i64.
    let rank = unsafe { *dim_info };
    if rank < 1 || rank > MAX_RANK as i64 {
        log::debug!("copy-in descriptor has rank {rank}");
        return Err(FloeStatus::InvalidDimInfo);
    }
    // SAFETY: caller guarantees rank + 1 readable entries.
    let raw = unsafe { std::slice::from_raw_parts(dim_info, rank as usize + 1) };
    DimInfo::from_raw(raw).map_err(|e| {
        log::debug!("copy-in descriptor rejected: {e}");
        FloeStatus::InvalidDimInfo
    })
}

/// Confirm `(field, section)` names a field of `kind`, so identity and
/// type errors are reported before descriptor errors.
fn expect_kind(
    dycore_index: i32,
    field: &str,
    section: &str,
    kind: FieldKind,
) -> Result<(), FloeStatus> {
    match with_instance(dycore_index, |i| i.registry().kind_of(field, section))? {
        Ok(found) if found == kind => Ok(()),
        Ok(_) => Err(FloeStatus::TypeMismatch),
        Err(e) => Err(FloeStatus::from(&e)),
    }
}

/// Element count a copy-in may read, bounded by the registry's copy-in
/// limit and by the largest slice of `T` that can exist.
fn copy_in_len<T>(dycore_index: i32, dims: &DimInfo) -> Result<usize, FloeStatus> {
    let len = dims.element_count();
    let limit = with_instance(dycore_index, |i| i.registry().config().max_copy_in_elements)?;
    let addressable = isize::MAX as usize / std::mem::size_of::<T>();
    if len > limit || len > addressable {
        log::debug!("copy-in of {len} elements exceeds limit {}", limit.min(addressable));
        return Err(FloeStatus::AllocationFailed);
    }
    Ok(len)
}

// ── Double arrays ──────────────────────────────────────────────

/// Alias a host-owned `double` array. The host keeps it alive.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_set_double_var(
    dycore_index: i32,
    var: *mut f64,
    field: *const c_char,
    section: *const c_char,
) -> i32 {
    ffi_guard!({
        let Some(var) = NonNull::new(var) else {
            return FloeStatus::InvalidArgument as i32;
        };
        let (field, section) = ffi_try!(names(field, section));
        ffi_try!(with_instance(dycore_index, |i| {
            to_status(i.registry_mut().set_double_var(var, field, section))
        }))
    })
}

/// Write the stored `double` array pointer to `var_out` (null if unset).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_get_double_var(
    dycore_index: i32,
    field: *const c_char,
    section: *const c_char,
    var_out: *mut *mut f64,
) -> i32 {
    ffi_guard!({
        if var_out.is_null() {
            return FloeStatus::InvalidArgument as i32;
        }
        let (field, section) = ffi_try!(names(field, section));
        let found = ffi_try!(with_instance(dycore_index, |i| {
            i.registry().get_double_var(field, section)
        }));
        match found {
            Ok(ptr) => {
                // SAFETY: var_out is non-null and valid per caller contract.
                unsafe { *var_out = ptr.map_or(std::ptr::null_mut(), NonNull::as_ptr) };
                FloeStatus::Ok as i32
            }
            Err(e) => FloeStatus::from(&e) as i32,
        }
    })
}

/// Copy `var`, shaped by the `dim_info` descriptor, into registry-owned
/// storage.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_copy_in_double_var(
    dycore_index: i32,
    var: *const f64,
    field: *const c_char,
    section: *const c_char,
    dim_info: *const i64,
) -> i32 {
    ffi_guard!({
        let (field, section) = ffi_try!(names(field, section));
        ffi_try!(expect_kind(
            dycore_index,
            field,
            section,
            FieldKind::DoubleArray
        ));
        let dims = ffi_try!(read_dim_info(dim_info));
        let len = ffi_try!(copy_in_len::<f64>(dycore_index, &dims));
        if var.is_null() {
            return FloeStatus::InvalidArgument as i32;
        }
        // SAFETY: var is non-null, len fits a slice, and the caller
        // guarantees it holds the element count its descriptor declares.
        let data = unsafe { std::slice::from_raw_parts(var, len) };
        ffi_try!(with_instance(dycore_index, |i| {
            to_status(i.registry_mut().copy_in_double_var(data, field, section, &dims))
        }))
    })
}

// ── Long arrays ────────────────────────────────────────────────

/// Alias a host-owned `int64_t` array. The host keeps it alive.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_set_long_var(
    dycore_index: i32,
    var: *mut i64,
    field: *const c_char,
    section: *const c_char,
) -> i32 {
    ffi_guard!({
        let Some(var) = NonNull::new(var) else {
            return FloeStatus::InvalidArgument as i32;
        };
        let (field, section) = ffi_try!(names(field, section));
        ffi_try!(with_instance(dycore_index, |i| {
            to_status(i.registry_mut().set_long_var(var, field, section))
        }))
    })
}

/// Write the stored `int64_t` array pointer to `var_out` (null if unset).
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_get_long_var(
    dycore_index: i32,
    field: *const c_char,
    section: *const c_char,
    var_out: *mut *mut i64,
) -> i32 {
    ffi_guard!({
        if var_out.is_null() {
            return FloeStatus::InvalidArgument as i32;
        }
        let (field, section) = ffi_try!(names(field, section));
        let found = ffi_try!(with_instance(dycore_index, |i| {
            i.registry().get_long_var(field, section)
        }));
        match found {
            Ok(ptr) => {
                // SAFETY: var_out is non-null and valid per caller contract.
                unsafe { *var_out = ptr.map_or(std::ptr::null_mut(), NonNull::as_ptr) };
                FloeStatus::Ok as i32
            }
            Err(e) => FloeStatus::from(&e) as i32,
        }
    })
}

/// Copy `var`, shaped by the `dim_info` descriptor, into registry-owned
/// storage.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_copy_in_long_var(
    dycore_index: i32,
    var: *const i64,
    field: *const c_char,
    section: *const c_char,
    dim_info: *const i64,
) -> i32 {
    ffi_guard!({
        let (field, section) = ffi_try!(names(field, section));
        ffi_try!(expect_kind(dycore_index, field, section, FieldKind::LongArray));
        let dims = ffi_try!(read_dim_info(dim_info));
        let len = ffi_try!(copy_in_len::<i64>(dycore_index, &dims));
        if var.is_null() {
            return FloeStatus::InvalidArgument as i32;
        }
        // SAFETY: as in floe_copy_in_double_var.
        let data = unsafe { std::slice::from_raw_parts(var, len) };
        ffi_try!(with_instance(dycore_index, |i| {
            to_status(i.registry_mut().copy_in_long_var(data, field, section, &dims))
        }))
    })
}

// ── Int4 arrays ────────────────────────────────────────────────

/// Alias a host-owned `int32_t` array. No catalog field stores 4-byte
/// integers, so known identities return `TypeMismatch`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_set_int4_var(
    dycore_index: i32,
    var: *mut i32,
    field: *const c_char,
    section: *const c_char,
) -> i32 {
    ffi_guard!({
        let Some(var) = NonNull::new(var) else {
            return FloeStatus::InvalidArgument as i32;
        };
        let (field, section) = ffi_try!(names(field, section));
        ffi_try!(with_instance(dycore_index, |i| {
            to_status(i.registry_mut().set_int4_var(var, field, section))
        }))
    })
}

/// Fetch an `int32_t` array pointer. Fails like [`floe_set_int4_var`].
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_get_int4_var(
    dycore_index: i32,
    field: *const c_char,
    section: *const c_char,
    var_out: *mut *mut i32,
) -> i32 {
    ffi_guard!({
        if var_out.is_null() {
            return FloeStatus::InvalidArgument as i32;
        }
        let (field, section) = ffi_try!(names(field, section));
        let found = ffi_try!(with_instance(dycore_index, |i| {
            i.registry().get_int4_var(field, section)
        }));
        match found {
            Ok(ptr) => {
                // SAFETY: var_out is non-null and valid per caller contract.
                unsafe { *var_out = ptr.map_or(std::ptr::null_mut(), NonNull::as_ptr) };
                FloeStatus::Ok as i32
            }
            Err(e) => FloeStatus::from(&e) as i32,
        }
    })
}

// ── Scalars ────────────────────────────────────────────────────

/// Store a `double` scalar.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_set_double_scalar(
    dycore_index: i32,
    value: f64,
    field: *const c_char,
    section: *const c_char,
) -> i32 {
    ffi_guard!({
        let (field, section) = ffi_try!(names(field, section));
        ffi_try!(with_instance(dycore_index, |i| {
            to_status(i.registry_mut().set_double_scalar(value, field, section))
        }))
    })
}

/// Write a stored `double` scalar to `value_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_get_double_scalar(
    dycore_index: i32,
    field: *const c_char,
    section: *const c_char,
    value_out: *mut f64,
) -> i32 {
    ffi_guard!({
        if value_out.is_null() {
            return FloeStatus::InvalidArgument as i32;
        }
        let (field, section) = ffi_try!(names(field, section));
        let found = ffi_try!(with_instance(dycore_index, |i| {
            i.registry().get_double_scalar(field, section)
        }));
        match found {
            Ok(Some(value)) => {
                // SAFETY: value_out is non-null and valid per caller contract.
                unsafe { *value_out = value };
                FloeStatus::Ok as i32
            }
            Ok(None) => FloeStatus::Unset as i32,
            Err(e) => FloeStatus::from(&e) as i32,
        }
    })
}

/// Store an `int64_t` scalar.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_set_long_scalar(
    dycore_index: i32,
    value: i64,
    field: *const c_char,
    section: *const c_char,
) -> i32 {
    ffi_guard!({
        let (field, section) = ffi_try!(names(field, section));
        ffi_try!(with_instance(dycore_index, |i| {
            to_status(i.registry_mut().set_long_scalar(value, field, section))
        }))
    })
}

/// Write a stored `int64_t` scalar to `value_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_get_long_scalar(
    dycore_index: i32,
    field: *const c_char,
    section: *const c_char,
    value_out: *mut i64,
) -> i32 {
    ffi_guard!({
        if value_out.is_null() {
            return FloeStatus::InvalidArgument as i32;
        }
        let (field, section) = ffi_try!(names(field, section));
        let found = ffi_try!(with_instance(dycore_index, |i| {
            i.registry().get_long_scalar(field, section)
        }));
        match found {
            Ok(Some(value)) => {
                // SAFETY: value_out is non-null and valid per caller contract.
                unsafe { *value_out = value };
                FloeStatus::Ok as i32
            }
            Ok(None) => FloeStatus::Unset as i32,
            Err(e) => FloeStatus::from(&e) as i32,
        }
    })
}
