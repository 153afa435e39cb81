//! FXForge Type Registry
//!
//! Maps declared type names from markup to constructible descriptors and
//! owns the runtime object graph those descriptors produce. This is the
//! document model's stand-in for runtime reflection: a compile-time-built
//! dispatch table instead of class introspection.

mod descriptor;
mod runtime;
pub mod toolkit;

pub use descriptor::{Import, PropertyKind, PropertySpec, Registry, TypeDescriptor};
pub use runtime::{ObjId, RuntimeGraph, RuntimeObject, Value};

/// Type identifier (index into the registry's descriptor table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub(crate) u32);

impl TypeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

