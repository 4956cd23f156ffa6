//! Per-field storage.
//!
//! An array slot is either unset, an alias into caller memory, or a copy
//! the registry owns. Aliases are never freed here; dropping a slot only
//! drops owned copies.

use std::collections::TryReserveError;
use std::ptr::NonNull;

use crate::catalog::FieldKind;
use crate::dim::DimInfo;

/// Registry-owned copy of a caller array, with the shape it was copied under.
///
/// `ptr` is taken mutably from `data` whenever the contents change, so a
/// host may write through it until the next copy-in or alias.
pub(crate) struct OwnedArray<T> {
    pub data: Vec<T>,
    pub dims: DimInfo,
    ptr: NonNull<T>,
}

impl<T> OwnedArray<T> {
    fn new(mut data: Vec<T>, dims: DimInfo) -> Self {
        let ptr = vec_ptr(&mut data);
        Self { data, dims, ptr }
    }
}

fn vec_ptr<T>(data: &mut Vec<T>) -> NonNull<T> {
    NonNull::new(data.as_mut_ptr()).unwrap_or(NonNull::dangling())
}

pub(crate) enum ArraySlot<T> {
    Unset,
    Alias(NonNull<T>),
    Owned(OwnedArray<T>),
}

impl<T: Copy> ArraySlot<T> {
    /// Pointer to the current contents, alias or owned.
    pub fn ptr(&self) -> Option<NonNull<T>> {
        match self {
            Self::Unset => None,
            Self::Alias(p) => Some(*p),
            Self::Owned(owned) => Some(owned.ptr),
        }
    }

    pub fn owned(&self) -> Option<&OwnedArray<T>> {
        match self {
            Self::Owned(owned) => Some(owned),
            _ => None,
        }
    }

    pub fn set_alias(&mut self, ptr: NonNull<T>) {
        *self = Self::Alias(ptr);
    }

    /// Replace the slot's contents with a copy of `src`.
    ///
    /// An existing owned copy of the same length is reused in place.
    /// On allocation failure the slot is left untouched.
    pub fn copy_in(&mut self, src: &[T], dims: DimInfo) -> Result<(), TryReserveError> {
        if let Self::Owned(owned) = self {
            if owned.data.len() == src.len() {
                owned.data.copy_from_slice(src);
                owned.dims = dims;
                owned.ptr = vec_ptr(&mut owned.data);
                return Ok(());
            }
        }
        let mut data = Vec::new();
        data.try_reserve_exact(src.len())?;
        data.extend_from_slice(src);
        *self = Self::Owned(OwnedArray::new(data, dims));
        Ok(())
    }
}

pub(crate) enum Slot {
    Double(ArraySlot<f64>),
    Long(ArraySlot<i64>),
    DoubleValue(Option<f64>),
    LongValue(Option<i64>),
}

impl Slot {
    /// Empty storage for a field of the given kind.
    pub fn empty(kind: FieldKind) -> Self {
        match kind {
            FieldKind::DoubleArray => Self::Double(ArraySlot::Unset),
            FieldKind::LongArray => Self::Long(ArraySlot::Unset),
            FieldKind::DoubleScalar => Self::DoubleValue(None),
            FieldKind::LongScalar => Self::LongValue(None),
        }
    }

    pub fn is_set(&self) -> bool {
        match self {
            Self::Double(s) => !matches!(s, ArraySlot::Unset),
            Self::Long(s) => !matches!(s, ArraySlot::Unset),
            Self::DoubleValue(v) => v.is_some(),
            Self::LongValue(v) => v.is_some(),
        }
    }
}
