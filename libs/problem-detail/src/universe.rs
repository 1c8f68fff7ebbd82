//! Type-existence lookup used by the convention fallback.
//!
//! There is no runtime reflection to ask "does a type with this name exist?",
//! so applications declare their exception types at start-up in a [`KnownTypes`]
//! table and the codec queries that table.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::exception::{Exception, ExceptionIdentity};

/// Answers whether a fully-qualified name denotes an exception type.
///
/// Implementations must be total: unknown names, malformed names and names of
/// non-exception types all yield `None`.
pub trait TypeUniverse: Send + Sync {
    fn lookup(&self, candidate: &str) -> Option<ExceptionIdentity>;
}

/// A universe that knows no types.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTypes;

impl TypeUniverse for NoTypes {
    fn lookup(&self, _candidate: &str) -> Option<ExceptionIdentity> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    Exception,
    Other,
}

/// Start-up populated table of known type names.
#[derive(Default)]
pub struct KnownTypes {
    map: RwLock<HashMap<String, TypeKind>>,
}

impl KnownTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `T` under its fully-qualified type name.
    pub fn register<T: Exception>(&self) -> ExceptionIdentity {
        let id = ExceptionIdentity::of::<T>();
        self.map
            .write()
            .insert(id.name().to_string(), TypeKind::Exception);
        id
    }

    /// Declare an exception type by name, e.g. for types living in another process.
    pub fn register_named(&self, name: impl Into<String>) -> ExceptionIdentity {
        let name = name.into();
        let id = ExceptionIdentity::named(&name);
        self.map.write().insert(name, TypeKind::Exception);
        id
    }

    /// Declare a type that exists but is not an exception.
    pub fn register_other(&self, name: impl Into<String>) {
        self.map.write().insert(name.into(), TypeKind::Other);
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl TypeUniverse for KnownTypes {
    fn lookup(&self, candidate: &str) -> Option<ExceptionIdentity> {
        match self.map.read().get(candidate) {
            Some(TypeKind::Exception) => Some(ExceptionIdentity::named(candidate)),
            Some(TypeKind::Other) | None => None,
        }
    }
}

impl std::fmt::Debug for KnownTypes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnownTypes")
            .field("len", &self.len())
            .finish()
    }
}
