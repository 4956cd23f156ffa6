//! Per-thread table of dycore constructors keyed by `dycore_type`.
//!
//! Type `0` is pre-registered as [`NullDyCore`]. Rust code linked into
//! the shim registers further cores with [`register_dycore`] before the
//! host calls `floe_dycore_create`.

use std::cell::RefCell;

use floe_dycore::{DyCore, NullDyCore};
use indexmap::IndexMap;

/// Builds a fresh core for one instance.
pub type DyCoreCtor = fn() -> Box<dyn DyCore>;

/// `dycore_type` served by [`NullDyCore`].
pub const NULL_DYCORE_TYPE: i32 = 0;

thread_local! {
    static FACTORIES: RefCell<IndexMap<i32, DyCoreCtor>> = RefCell::new(builtin());
}

fn builtin() -> IndexMap<i32, DyCoreCtor> {
    let mut table: IndexMap<i32, DyCoreCtor> = IndexMap::new();
    table.insert(NULL_DYCORE_TYPE, || Box::new(NullDyCore));
    table
}

/// Register `ctor` for `dycore_type` on the calling thread, returning the
/// constructor it replaces.
pub fn register_dycore(dycore_type: i32, ctor: DyCoreCtor) -> Option<DyCoreCtor> {
    let previous = FACTORIES.with(|cell| cell.borrow_mut().insert(dycore_type, ctor));
    match previous {
        Some(_) => log::info!("replaced dycore constructor for type {dycore_type}"),
        None => log::info!("registered dycore constructor for type {dycore_type}"),
    }
    previous
}

/// Every registered `dycore_type`, in registration order.
pub fn registered_types() -> Vec<i32> {
    FACTORIES.with(|cell| cell.borrow().keys().copied().collect())
}

/// Build a core for `dycore_type`, or `None` if nothing is registered.
pub(crate) fn construct(dycore_type: i32) -> Option<Box<dyn DyCore>> {
    // Copy the fn pointer out so the constructor runs without the borrow.
    let ctor = FACTORIES.with(|cell| cell.borrow().get(&dycore_type).copied())?;
    Some(ctor())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named;

    impl DyCore for Named {
        fn name(&self) -> &str {
            "named"
        }
    }

    #[test]
    fn null_core_is_builtin() {
        assert_eq!(registered_types(), vec![NULL_DYCORE_TYPE]);
        let core = construct(NULL_DYCORE_TYPE).unwrap();
        assert_eq!(core.name(), NullDyCore.name());
    }

    #[test]
    fn unknown_type_constructs_nothing() {
        assert!(construct(42).is_none());
    }

    #[test]
    fn register_and_replace() {
        assert!(register_dycore(7, || Box::new(Named)).is_none());
        assert_eq!(construct(7).unwrap().name(), "named");
        assert!(register_dycore(7, || Box::new(NullDyCore)).is_some());
        assert_eq!(construct(7).unwrap().name(), NullDyCore.name());
        assert_eq!(registered_types(), vec![NULL_DYCORE_TYPE, 7]);
    }
}
