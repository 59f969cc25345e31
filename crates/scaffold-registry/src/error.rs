//! Error types for the registry

use crate::RegistryKey;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No entry exists for the requested key
    #[error("no {type_name} registered under {key:?}")]
    NotRegistered {
        /// Short type name
        type_name: &'static str,
        /// String key
        key: String,
    },

    /// An entry already exists; the first registration wins
    #[error("{type_name} {key:?} is already registered")]
    AlreadyRegistered {
        /// Short type name
        type_name: &'static str,
        /// String key
        key: String,
    },

    /// Stored value does not have the type encoded in the key
    #[error("entry {type_name} {key:?} holds a value of another type")]
    TypeMismatch {
        /// Short type name
        type_name: &'static str,
        /// String key
        key: String,
    },

    /// Deferred entries wait on each other in a cycle
    #[error("deferred reference cycle: {}", chain.join(" -> "))]
    Cycle {
        /// Keys along the cycle, first key repeated at the end
        chain: Vec<String>,
    },
}

impl RegistryError {
    pub(crate) fn not_registered(key: &RegistryKey) -> Self {
        Self::NotRegistered {
            type_name: key.type_name(),
            key: key.key().to_string(),
        }
    }

    pub(crate) fn already_registered(key: &RegistryKey) -> Self {
        Self::AlreadyRegistered {
            type_name: key.type_name(),
            key: key.key().to_string(),
        }
    }

    pub(crate) fn type_mismatch(key: &RegistryKey) -> Self {
        Self::TypeMismatch {
            type_name: key.type_name(),
            key: key.key().to_string(),
        }
    }

    /// Check if the error reports a missing entry
    #[inline]
    #[must_use]
    pub fn is_not_registered(&self) -> bool {
        matches!(self, Self::NotRegistered { .. })
    }
}
