//! Error types for scaffold resolution
//!
//! Every failure aborts the whole top-level resolve call; no partially built
//! entity is ever returned. Errors carry the [`FieldPath`] at which they
//! occurred and, for references, the failing (type, key).

use crate::path::FieldPath;
use scaffold_registry::RegistryError;

/// Resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A reference names a key that was never registered
    #[error("unresolved reference {type_name}({key:?}) at {path}")]
    UnresolvedReference {
        /// Short type name of the referenced entity
        type_name: &'static str,
        /// Registry key
        key: String,
        /// Where the reference was dereferenced
        path: FieldPath,
    },

    /// A dispatcher met a variant outside its closed set
    ///
    /// Generated dispatchers match exhaustively and never produce this; hosts
    /// that dispatch on runtime tags report it.
    #[error("unknown variant {variant:?} of union {union}")]
    UnknownVariant {
        /// Union name
        union: &'static str,
        /// Offending variant tag
        variant: String,
    },

    /// A required field was never set by the spec
    #[error("missing required field {entity}.{field} at {path}")]
    MissingField {
        /// Entity name
        entity: &'static str,
        /// Field name
        field: &'static str,
        /// Path of the field
        path: FieldPath,
    },

    /// Deferred registry entries depend on each other
    #[error("reference cycle {} at {path}", chain.join(" -> "))]
    ReferenceCycle {
        /// Entries along the cycle
        chain: Vec<String>,
        /// Where the closing reference was dereferenced
        path: FieldPath,
    },

    /// Other registry failure
    #[error("registry error at {path}: {source}")]
    Registry {
        /// Underlying registry error
        #[source]
        source: RegistryError,
        /// Where the registry was consulted
        path: FieldPath,
    },

    /// The configured deadline elapsed
    #[error("resolution exceeded deadline of {deadline_ms}ms")]
    DeadlineExceeded {
        /// Configured deadline
        deadline_ms: u64,
    },
}

impl ResolveError {
    /// Convert a registry error raised at `path`
    #[must_use]
    pub fn from_registry(error: RegistryError, path: &FieldPath) -> Self {
        match error {
            RegistryError::NotRegistered { type_name, key } => Self::UnresolvedReference {
                type_name,
                key,
                path: path.clone(),
            },
            RegistryError::Cycle { chain } => Self::ReferenceCycle {
                chain,
                path: path.clone(),
            },
            source => Self::Registry {
                source,
                path: path.clone(),
            },
        }
    }

    /// Path at which the error occurred, if it has one
    #[must_use]
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Self::UnresolvedReference { path, .. }
            | Self::MissingField { path, .. }
            | Self::ReferenceCycle { path, .. }
            | Self::Registry { path, .. } => Some(path),
            Self::UnknownVariant { .. } | Self::DeadlineExceeded { .. } => None,
        }
    }

    /// Check if error indicates a generator/schema mismatch
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnknownVariant { .. })
    }

    /// Check if error reports a missing registry entry
    #[inline]
    #[must_use]
    pub fn is_unresolved_reference(&self) -> bool {
        matches!(self, Self::UnresolvedReference { .. })
    }
}

impl From<RegistryError> for ResolveError {
    fn from(error: RegistryError) -> Self {
        Self::from_registry(error, &FieldPath::root())
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Malformed TOML
    #[error("invalid resolve config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathSegment;

    #[test]
    fn not_registered_becomes_unresolved_reference() {
        let path = FieldPath::root().child(PathSegment::Field("auth"));
        let err = ResolveError::from_registry(
            RegistryError::NotRegistered {
                type_name: "Auth",
                key: "missing".into(),
            },
            &path,
        );
        assert!(err.is_unresolved_reference());
        assert_eq!(err.path(), Some(&path));
        assert_eq!(
            err.to_string(),
            "unresolved reference Auth(\"missing\") at auth"
        );
    }

    #[test]
    fn cycle_becomes_reference_cycle() {
        let err: ResolveError = RegistryError::Cycle {
            chain: vec!["A".into(), "B".into(), "A".into()],
        }
        .into();
        assert!(matches!(err, ResolveError::ReferenceCycle { .. }));
        assert!(err.to_string().contains("A -> B -> A"));
    }

    #[test]
    fn other_registry_errors_wrapped() {
        let err: ResolveError = RegistryError::AlreadyRegistered {
            type_name: "Auth",
            key: "ci".into(),
        }
        .into();
        assert!(matches!(err, ResolveError::Registry { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn unknown_variant_is_fatal() {
        let err = ResolveError::UnknownVariant {
            union: "Step",
            variant: "Deploy".into(),
        };
        assert!(err.is_fatal());
        assert!(err.path().is_none());
    }
}
