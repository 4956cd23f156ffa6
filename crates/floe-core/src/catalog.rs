//! The fixed section catalog: every (section, field) identity the registry
//! knows about, with its storage kind.
//!
//! The catalog is a schema, not a runtime structure. Sections and fields
//! are compile-time constants; [`FieldKey`] is a dense index into
//! [`CATALOG`] and is the only way the registry addresses a slot.

use std::fmt;

/// A named group of related fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    /// Ice thickness, surface and bed elevations, masks, partition bounds.
    Geometry,
    /// Three-dimensional velocity components and basal traction.
    Velocity,
    /// Ice temperature, basal heat flux and melt rate.
    Temper,
    /// Model time bounds and horizontal cell sizes.
    Numerics,
    /// Surface mass balance, calving flux and sea level.
    Climate,
    /// Higher-order velocity solver coefficients.
    VelocityHom,
    /// Physical constants, held by value.
    Constants,
    /// Opaque parallel-topology handles.
    MpiVars,
}

impl Section {
    /// Every section, in catalog order.
    pub const ALL: [Section; 8] = [
        Section::Geometry,
        Section::Velocity,
        Section::Temper,
        Section::Numerics,
        Section::Climate,
        Section::VelocityHom,
        Section::Constants,
        Section::MpiVars,
    ];

    /// The section's external name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Geometry => "geometry",
            Self::Velocity => "velocity",
            Self::Temper => "temper",
            Self::Numerics => "numerics",
            Self::Climate => "climate",
            Self::VelocityHom => "velocity_hom",
            Self::Constants => "constants",
            Self::MpiVars => "mpi_vars",
        }
    }

    /// Resolve an external section name. Exact, case-sensitive match only.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Keys of every field in this section, in catalog order.
    pub fn keys(self) -> impl Iterator<Item = FieldKey> {
        FieldKey::all().filter(move |k| k.spec().section == self)
    }

    /// The section's primary dimension descriptor (`dimInfo`), if it has one.
    pub fn descriptor(self) -> Option<FieldKey> {
        self.keys().find(|k| k.spec().name == DIM_INFO)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage type of a field. Fixed for the field's identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Array of `f64`, aliased or copied in.
    DoubleArray,
    /// Array of `i64` ("long"), aliased or copied in.
    LongArray,
    /// Single `f64` owned by the registry.
    DoubleScalar,
    /// Single `i64` owned by the registry.
    LongScalar,
}

impl FieldKind {
    /// Whether values of this kind are arrays (alias or owned copy).
    pub fn is_array(self) -> bool {
        matches!(self, Self::DoubleArray | Self::LongArray)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DoubleArray => write!(f, "double array"),
            Self::LongArray => write!(f, "long array"),
            Self::DoubleScalar => write!(f, "double scalar"),
            Self::LongScalar => write!(f, "long scalar"),
        }
    }
}

/// The type a caller assumes when it issues a typed call.
///
/// This is wider than [`FieldKind`]: the host interface also speaks
/// 4-byte integer arrays, which no catalog field stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarType {
    /// `f64` array pointer.
    DoubleArray,
    /// `i64` array pointer.
    LongArray,
    /// `i32` array pointer.
    Int4Array,
    /// `f64` value.
    DoubleScalar,
    /// `i64` value.
    LongScalar,
}

impl VarType {
    /// The field kind a call of this type addresses, if any field can have it.
    pub fn kind(self) -> Option<FieldKind> {
        match self {
            Self::DoubleArray => Some(FieldKind::DoubleArray),
            Self::LongArray => Some(FieldKind::LongArray),
            Self::Int4Array => None,
            Self::DoubleScalar => Some(FieldKind::DoubleScalar),
            Self::LongScalar => Some(FieldKind::LongScalar),
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => fmt::Display::fmt(&kind, f),
            None => write!(f, "int4 array"),
        }
    }
}

/// Static description of one catalog field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Owning section.
    pub section: Section,
    /// External field name, case-sensitive.
    pub name: &'static str,
    /// Storage type.
    pub kind: FieldKind,
    /// Whether the field describes the shape of other fields in its section.
    pub descriptor: bool,
}

/// Dense index of a field in [`CATALOG`].
///
/// Only constructed by the catalog itself, so every key is in range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldKey(u16);

impl FieldKey {
    /// Iterate over every key in the catalog.
    pub fn all() -> impl Iterator<Item = FieldKey> {
        (0..CATALOG.len() as u16).map(FieldKey)
    }

    /// Look up a field by section and exact name.
    pub fn lookup(section: Section, field: &str) -> Option<FieldKey> {
        section.keys().find(|k| k.spec().name == field)
    }

    /// Position of this field in [`CATALOG`].
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Static description of this field.
    pub fn spec(self) -> &'static FieldSpec {
        &CATALOG[self.index()]
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let spec = self.spec();
        write!(f, "{}.{}", spec.section, spec.name)
    }
}

/// Name shared by every section's primary dimension descriptor.
pub const DIM_INFO: &str = "dimInfo";

const fn field(section: Section, name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        section,
        name,
        kind,
        descriptor: false,
    }
}

const fn descriptor(section: Section, name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        section,
        name,
        kind,
        descriptor: true,
    }
}

use FieldKind::{DoubleArray, DoubleScalar, LongArray, LongScalar};
use Section::{Climate, Constants, Geometry, MpiVars, Numerics, Temper, Velocity, VelocityHom};

/// Every field the registry knows about, grouped by section.
pub static CATALOG: [FieldSpec; 46] = [
    field(Geometry, "thck", DoubleArray),
    field(Geometry, "usrf", DoubleArray),
    field(Geometry, "lsrf", DoubleArray),
    field(Geometry, "topg", DoubleArray),
    field(Geometry, "floating_mask", DoubleArray),
    field(Geometry, "ice_mask", DoubleArray),
    // z-location and temperature of the lowest cell centre
    field(Geometry, "lower_cell_loc", DoubleArray),
    field(Geometry, "lower_cell_temp", DoubleArray),
    descriptor(Geometry, DIM_INFO, LongArray),
    descriptor(Geometry, "ewlb", LongArray),
    descriptor(Geometry, "ewub", LongArray),
    descriptor(Geometry, "nslb", LongArray),
    descriptor(Geometry, "nsub", LongArray),
    descriptor(Geometry, "nhalo", LongArray),
    field(Velocity, "uvel", DoubleArray),
    field(Velocity, "vvel", DoubleArray),
    field(Velocity, "wvel", DoubleArray),
    field(Velocity, "wgrd", DoubleArray),
    field(Velocity, "btrc", DoubleArray),
    descriptor(Velocity, DIM_INFO, LongArray),
    field(Temper, "temp", DoubleArray),
    field(Temper, "bheatflx", DoubleArray),
    field(Temper, "bmlt", DoubleArray),
    descriptor(Temper, DIM_INFO, LongArray),
    field(Numerics, "tstart", DoubleArray),
    field(Numerics, "tend", DoubleArray),
    field(Numerics, "time", DoubleArray),
    field(Numerics, "dew", DoubleArray),
    field(Numerics, "dns", DoubleArray),
    field(Climate, "acab", DoubleArray),
    field(Climate, "acab_tavg", DoubleArray),
    field(Climate, "calving", DoubleArray),
    descriptor(Climate, DIM_INFO, LongArray),
    field(Climate, "eus", DoubleArray),
    field(VelocityHom, "beta", DoubleArray),
    // x (1,:,:) and y (2,:,:) components
    field(VelocityHom, "btraction", DoubleArray),
    descriptor(VelocityHom, DIM_INFO, LongScalar),
    field(Constants, "seconds_per_year", DoubleScalar),
    field(Constants, "gravity", DoubleScalar),
    field(Constants, "rho_ice", DoubleScalar),
    field(Constants, "rho_seawater", DoubleScalar),
    field(Constants, "therm_diffusivity_ice", DoubleScalar),
    field(Constants, "heat_capacity_ice", DoubleScalar),
    field(MpiVars, "communicator", LongArray),
    field(MpiVars, "process_count", LongArray),
    field(MpiVars, "my_rank", LongArray),
];
