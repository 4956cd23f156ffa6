//! Top-level dycore identity.

/// Which dynamical core a registry serves and where the host files it.
///
/// `dycore_type` selects the core implementation; `dycore_index` is the
/// slot the host's instance table assigned. Both are opaque to the
/// registry and default to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DyCoreInfo {
    /// Implementation selector.
    pub dycore_type: i32,
    /// Host-side instance index.
    pub dycore_index: i32,
}
