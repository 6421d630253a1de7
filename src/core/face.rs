//! Triangular faces.

use crate::core::mesh::EdgeKey;

/// A face of the mesh, identified by one of its bounding half-edges.
///
/// The outer face beyond the border-closing triangle is non-real.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Face {
    id: u64,
    pub(crate) edge: EdgeKey,
    is_real: bool,
}

impl Face {
    pub(crate) const fn new(id: u64, edge: EdgeKey, is_real: bool) -> Self {
        Self { id, edge, is_real }
    }

    /// Stable, never reused identifier.
    #[must_use]
    #[inline]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// One half-edge having this face on its left.
    #[must_use]
    #[inline]
    pub const fn edge(&self) -> EdgeKey {
        self.edge
    }

    /// Whether the face lies inside the border-closing triangle.
    #[must_use]
    #[inline]
    pub const fn is_real(&self) -> bool {
        self.is_real
    }
}
