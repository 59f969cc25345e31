//! Field paths for diagnostics
//!
//! A [`FieldPath`] records where in the node tree a resolution step runs,
//! e.g. `jobs[1].steps[0]->Auth("ci").password`.

use std::fmt;

/// One step from a parent node to a child
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named field of an entity
    Field(&'static str),
    /// Position in a repeated or keyed field
    Index(usize),
    /// Dereference of a registry entry
    Reference(String),
}

/// Path from the resolution root to the current node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Empty path (the resolution root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend with one segment
    #[must_use]
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self { segments }
    }

    /// Check if this is the root path
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path segments, root first
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
                PathSegment::Reference(target) => write!(f, "->{target}")?,
            }
        }
        Ok(())
    }
}
