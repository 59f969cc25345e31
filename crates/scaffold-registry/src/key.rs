//! Typed registry keys
//!
//! A [`RegistryKey`] pairs the Rust type identity of a registered value with
//! the caller-supplied string key, so the same string can name unrelated
//! entities of different types.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Type-aware registry key
///
/// Equality and hashing consider only the [`TypeId`] and the string key; the
/// type name is carried for diagnostics.
#[derive(Clone)]
pub struct RegistryKey {
    type_id: TypeId,
    type_name: &'static str,
    key: Arc<str>,
}

impl RegistryKey {
    /// Create key for values of type `T`
    #[inline]
    #[must_use]
    pub fn of<T: 'static>(key: impl Into<Arc<str>>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: short_type_name::<T>(),
            key: key.into(),
        }
    }

    /// Get type ID
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Short name of the registered type (last path segment)
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Get the string key
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Check whether this key addresses values of type `T`
    #[inline]
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl PartialEq for RegistryKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.key == other.key
    }
}

impl Eq for RegistryKey {}

impl Hash for RegistryKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.key.hash(state);
    }
}

impl fmt::Debug for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegistryKey({self})")
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.type_name, self.key)
    }
}

/// Last path segment of `std::any::type_name`, generics included
///
/// `scaffold_test_utils::model::Auth` becomes `Auth`,
/// `alloc::vec::Vec<alloc::string::String>` becomes `Vec<alloc::string::String>`.
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let head_end = full.find('<').unwrap_or(full.len());
    let start = full[..head_end].rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}
