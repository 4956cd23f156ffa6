//! The [`Registry`] dispatcher: string-addressed, typed access to the
//! catalog's field slots.
//!
//! Every operation first resolves `(section, field)` against the catalog by
//! exact name, then checks that the call's type matches the field's fixed
//! kind, and only then touches the slot. A failed call never modifies
//! state.
//!
//! # Ownership
//!
//! `set_*_var` stores a pointer into caller memory. The registry never
//! reads, writes or frees through it; the caller keeps the array alive for
//! as long as anyone may fetch the pointer back. `copy_in_*_var` instead
//! copies the caller's elements into storage the registry owns and frees
//! on drop.
//!
//! The registry holds raw pointers and is therefore neither `Send` nor
//! `Sync`. Callers serialize all access.

use std::ptr::NonNull;

use indexmap::IndexMap;

use crate::catalog::{FieldKey, FieldKind, Section, VarType};
use crate::config::RegistryConfig;
use crate::dim::DimInfo;
use crate::error::{ConfigError, RegistryError};
use crate::info::DyCoreInfo;
use crate::slot::{ArraySlot, Slot};

type FieldNames = IndexMap<&'static str, FieldKey>;

/// What a field currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldState {
    /// Never set.
    Unset,
    /// Array alias into caller-owned memory.
    Alias,
    /// Array copy owned by the registry.
    Owned,
    /// Scalar value owned by the registry.
    Value,
}

/// Named variable registry shared by a host model and one dynamical core.
pub struct Registry {
    config: RegistryConfig,
    info: DyCoreInfo,
    names: IndexMap<&'static str, (Section, FieldNames)>,
    slots: Vec<Slot>,
}

impl Registry {
    /// Create a registry with every catalog field unset and default config.
    pub fn new() -> Self {
        Self::build(RegistryConfig::default())
    }

    /// Create a registry with a validated config.
    pub fn with_config(config: RegistryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: RegistryConfig) -> Self {
        let mut names: IndexMap<&'static str, (Section, FieldNames)> =
            IndexMap::with_capacity(Section::ALL.len());
        for section in Section::ALL {
            let fields = section.keys().map(|k| (k.spec().name, k)).collect();
            names.insert(section.name(), (section, fields));
        }
        let slots = FieldKey::all().map(|k| Slot::empty(k.spec().kind)).collect();
        Self {
            config,
            info: DyCoreInfo::default(),
            names,
            slots,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ── Name resolution ────────────────────────────────────────────

    /// Resolve a `(field, section)` pair to its catalog key.
    pub fn resolve(&self, field: &str, section: &str) -> Result<FieldKey, RegistryError> {
        let Some((resolved, fields)) = self.names.get(section) else {
            log::debug!("unknown section '{section}' (field '{field}')");
            return Err(RegistryError::UnknownSection {
                section: section.to_owned(),
            });
        };
        match fields.get(field) {
            Some(&key) => Ok(key),
            None => {
                log::debug!("unknown field '{field}' in section '{section}'");
                Err(RegistryError::UnknownField {
                    section: *resolved,
                    field: field.to_owned(),
                })
            }
        }
    }

    /// Storage kind of a field.
    pub fn kind_of(&self, field: &str, section: &str) -> Result<FieldKind, RegistryError> {
        Ok(self.resolve(field, section)?.spec().kind)
    }

    /// Whether the field behind `key` has been set.
    pub fn is_set(&self, key: FieldKey) -> bool {
        self.slots[key.index()].is_set()
    }

    /// What a field currently holds.
    pub fn field_state(&self, field: &str, section: &str) -> Result<FieldState, RegistryError> {
        let key = self.resolve(field, section)?;
        Ok(match &self.slots[key.index()] {
            Slot::Double(s) => array_state(s),
            Slot::Long(s) => array_state(s),
            Slot::DoubleValue(Some(_)) | Slot::LongValue(Some(_)) => FieldState::Value,
            Slot::DoubleValue(None) | Slot::LongValue(None) => FieldState::Unset,
        })
    }

    // ── Double arrays ──────────────────────────────────────────────

    /// Alias a caller-owned `f64` array.
    pub fn set_double_var(
        &mut self,
        var: NonNull<f64>,
        field: &str,
        section: &str,
    ) -> Result<(), RegistryError> {
        let key = self.resolve(field, section)?;
        match &mut self.slots[key.index()] {
            Slot::Double(slot) => {
                slot.set_alias(var);
                log::debug!("{key} aliased to {var:p}");
                Ok(())
            }
            _ => Err(mismatch(key, VarType::DoubleArray)),
        }
    }

    /// The stored `f64` array pointer, or `None` if never set.
    pub fn get_double_var(
        &self,
        field: &str,
        section: &str,
    ) -> Result<Option<NonNull<f64>>, RegistryError> {
        let key = self.resolve(field, section)?;
        match &self.slots[key.index()] {
            Slot::Double(slot) => {
                log::trace!("read {key}");
                Ok(slot.ptr())
            }
            _ => Err(mismatch(key, VarType::DoubleArray)),
        }
    }

    /// Copy `var` into registry-owned storage shaped by `dims`.
    pub fn copy_in_double_var(
        &mut self,
        var: &[f64],
        field: &str,
        section: &str,
        dims: &DimInfo,
    ) -> Result<(), RegistryError> {
        let key = self.resolve(field, section)?;
        if !matches!(self.slots[key.index()], Slot::Double(_)) {
            return Err(mismatch(key, VarType::DoubleArray));
        }
        self.check_copy_in(key, var.len(), dims)?;
        match &mut self.slots[key.index()] {
            Slot::Double(slot) => store_copy(slot, key, var, dims),
            _ => Err(mismatch(key, VarType::DoubleArray)),
        }
    }

    /// Registry-owned contents of a double array, or `None` if the field is
    /// unset or aliased.
    pub fn copied_double_var(
        &self,
        field: &str,
        section: &str,
    ) -> Result<Option<&[f64]>, RegistryError> {
        let key = self.resolve(field, section)?;
        match &self.slots[key.index()] {
            Slot::Double(slot) => Ok(slot.owned().map(|o| o.data.as_slice())),
            _ => Err(mismatch(key, VarType::DoubleArray)),
        }
    }

    // ── Long arrays ────────────────────────────────────────────────

    /// Alias a caller-owned `i64` array.
    pub fn set_long_var(
        &mut self,
        var: NonNull<i64>,
        field: &str,
        section: &str,
    ) -> Result<(), RegistryError> {
        let key = self.resolve(field, section)?;
        match &mut self.slots[key.index()] {
            Slot::Long(slot) => {
                slot.set_alias(var);
                log::debug!("{key} aliased to {var:p}");
                Ok(())
            }
            _ => Err(mismatch(key, VarType::LongArray)),
        }
    }

    /// The stored `i64` array pointer, or `None` if never set.
    pub fn get_long_var(
        &self,
        field: &str,
        section: &str,
    ) -> Result<Option<NonNull<i64>>, RegistryError> {
        let key = self.resolve(field, section)?;
        match &self.slots[key.index()] {
            Slot::Long(slot) => {
                log::trace!("read {key}");
                Ok(slot.ptr())
            }
            _ => Err(mismatch(key, VarType::LongArray)),
        }
    }

    /// Copy `var` into registry-owned storage shaped by `dims`.
    pub fn copy_in_long_var(
        &mut self,
        var: &[i64],
        field: &str,
        section: &str,
        dims: &DimInfo,
    ) -> Result<(), RegistryError> {
        let key = self.resolve(field, section)?;
        if !matches!(self.slots[key.index()], Slot::Long(_)) {
            return Err(mismatch(key, VarType::LongArray));
        }
        self.check_copy_in(key, var.len(), dims)?;
        match &mut self.slots[key.index()] {
            Slot::Long(slot) => store_copy(slot, key, var, dims),
            _ => Err(mismatch(key, VarType::LongArray)),
        }
    }

    /// Registry-owned contents of a long array, or `None` if the field is
    /// unset or aliased.
    pub fn copied_long_var(
        &self,
        field: &str,
        section: &str,
    ) -> Result<Option<&[i64]>, RegistryError> {
        let key = self.resolve(field, section)?;
        match &self.slots[key.index()] {
            Slot::Long(slot) => Ok(slot.owned().map(|o| o.data.as_slice())),
            _ => Err(mismatch(key, VarType::LongArray)),
        }
    }

    /// Shape an owned copy was taken under, or `None` if the field does not
    /// hold an owned copy.
    pub fn copied_dims(&self, field: &str, section: &str) -> Result<Option<&DimInfo>, RegistryError> {
        let key = self.resolve(field, section)?;
        Ok(match &self.slots[key.index()] {
            Slot::Double(slot) => slot.owned().map(|o| &o.dims),
            Slot::Long(slot) => slot.owned().map(|o| &o.dims),
            Slot::DoubleValue(_) | Slot::LongValue(_) => None,
        })
    }

    // ── Int4 arrays ────────────────────────────────────────────────

    /// Alias a caller-owned `i32` array.
    ///
    /// No catalog field stores 4-byte integers, so every known identity
    /// fails with [`RegistryError::TypeMismatch`].
    pub fn set_int4_var(
        &mut self,
        var: NonNull<i32>,
        field: &str,
        section: &str,
    ) -> Result<(), RegistryError> {
        let key = self.resolve(field, section)?;
        log::debug!("rejected int4 alias {var:p} for {key}");
        Err(mismatch(key, VarType::Int4Array))
    }

    /// Fetch an `i32` array pointer. Fails like [`set_int4_var`](Self::set_int4_var).
    pub fn get_int4_var(
        &self,
        field: &str,
        section: &str,
    ) -> Result<Option<NonNull<i32>>, RegistryError> {
        let key = self.resolve(field, section)?;
        Err(mismatch(key, VarType::Int4Array))
    }

    // ── Owned scalars ──────────────────────────────────────────────

    /// Store an `f64` value.
    pub fn set_double_scalar(
        &mut self,
        value: f64,
        field: &str,
        section: &str,
    ) -> Result<(), RegistryError> {
        let key = self.resolve(field, section)?;
        match &mut self.slots[key.index()] {
            Slot::DoubleValue(v) => {
                *v = Some(value);
                log::debug!("{key} = {value}");
                Ok(())
            }
            _ => Err(mismatch(key, VarType::DoubleScalar)),
        }
    }

    /// The stored `f64` value, or `None` if never set.
    pub fn get_double_scalar(&self, field: &str, section: &str) -> Result<Option<f64>, RegistryError> {
        let key = self.resolve(field, section)?;
        match self.slots[key.index()] {
            Slot::DoubleValue(v) => Ok(v),
            _ => Err(mismatch(key, VarType::DoubleScalar)),
        }
    }

    /// Store an `i64` value.
    pub fn set_long_scalar(
        &mut self,
        value: i64,
        field: &str,
        section: &str,
    ) -> Result<(), RegistryError> {
        let key = self.resolve(field, section)?;
        match &mut self.slots[key.index()] {
            Slot::LongValue(v) => {
                *v = Some(value);
                log::debug!("{key} = {value}");
                Ok(())
            }
            _ => Err(mismatch(key, VarType::LongScalar)),
        }
    }

    /// The stored `i64` value, or `None` if never set.
    pub fn get_long_scalar(&self, field: &str, section: &str) -> Result<Option<i64>, RegistryError> {
        let key = self.resolve(field, section)?;
        match self.slots[key.index()] {
            Slot::LongValue(v) => Ok(v),
            _ => Err(mismatch(key, VarType::LongScalar)),
        }
    }

    // ── Dycore identity ────────────────────────────────────────────

    /// Record which dycore implementation this registry serves.
    pub fn set_dycore_type(&mut self, dycore_type: i32) {
        self.info.dycore_type = dycore_type;
    }

    /// The recorded dycore implementation selector.
    pub fn dycore_type(&self) -> i32 {
        self.info.dycore_type
    }

    /// Record the host-side instance index.
    pub fn set_dycore_index(&mut self, dycore_index: i32) {
        self.info.dycore_index = dycore_index;
    }

    /// The recorded host-side instance index.
    pub fn dycore_index(&self) -> i32 {
        self.info.dycore_index
    }

    /// Both identity values.
    pub fn info(&self) -> DyCoreInfo {
        self.info
    }

    // ── Copy-in validation ─────────────────────────────────────────

    fn check_copy_in(&self, key: FieldKey, len: usize, dims: &DimInfo) -> Result<(), RegistryError> {
        self.check_descriptor_order(key)?;
        let declared = dims.element_count();
        if declared != len {
            log::debug!("{key}: copy-in of {len} elements under a {declared}-element descriptor");
            return Err(RegistryError::DimensionMismatch {
                key,
                declared,
                actual: len,
            });
        }
        if declared > self.config.max_copy_in_elements {
            return Err(RegistryError::AllocationFailed {
                key,
                requested: declared,
            });
        }
        Ok(())
    }

    fn check_descriptor_order(&self, key: FieldKey) -> Result<(), RegistryError> {
        let spec = key.spec();
        if !self.config.enforce_descriptor_order || spec.descriptor {
            return Ok(());
        }
        match spec.section.descriptor() {
            Some(descriptor) if !self.is_set(descriptor) => {
                log::debug!("{key}: copy-in before {descriptor}");
                Err(RegistryError::MissingDescriptor { key, descriptor })
            }
            _ => Ok(()),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn mismatch(key: FieldKey, found: VarType) -> RegistryError {
    let expected = key.spec().kind;
    log::debug!("{key}: {found} call on a {expected} field");
    RegistryError::TypeMismatch {
        key,
        expected,
        found,
    }
}

fn array_state<T>(slot: &ArraySlot<T>) -> FieldState {
    match slot {
        ArraySlot::Unset => FieldState::Unset,
        ArraySlot::Alias(_) => FieldState::Alias,
        ArraySlot::Owned(_) => FieldState::Owned,
    }
}

fn store_copy<T: Copy>(
    slot: &mut ArraySlot<T>,
    key: FieldKey,
    var: &[T],
    dims: &DimInfo,
) -> Result<(), RegistryError> {
    slot.copy_in(var, dims.clone()).map_err(|_| {
        log::debug!("{key}: allocation of {} elements failed", var.len());
        RegistryError::AllocationFailed {
            key,
            requested: var.len(),
        }
    })?;
    log::debug!("{key} copied in ({} elements)", var.len());
    Ok(())
}
