//! Mesh construction options.
//!
//! [`MeshConfig`] gathers everything that shapes a fresh [`Mesh`]: the domain
//! size, how far out the border-closing triangle is placed, and whether the
//! domain rectangle is inserted as a constraint.
//!
//! | Situation | Recommended API |
//! |---|---|
//! | Plain domain, defaults | [`Mesh::new`] |
//! | Domain border as a constraint, custom border scale | [`MeshConfigBuilder`] + [`Mesh::with_config`] |
//!
//! # Examples
//!
//! ```rust
//! use cdt_mesh::core::builder::MeshConfigBuilder;
//! use cdt_mesh::core::mesh::Mesh;
//!
//! let config = MeshConfigBuilder::default()
//!     .width(64.0)
//!     .height(32.0)
//!     .build()
//!     .unwrap();
//! assert!(!config.bounded);
//! assert_eq!(config.border_scale, 10.0);
//!
//! let mesh = Mesh::with_config(&config).unwrap();
//! assert_eq!(mesh.width(), 64.0);
//!
//! // Validation runs at build time.
//! assert!(MeshConfigBuilder::default().width(-1.0).height(1.0).build().is_err());
//! ```
//!
//! [`Mesh`]: crate::core::mesh::Mesh
//! [`Mesh::new`]: crate::core::mesh::Mesh::new
//! [`Mesh::with_config`]: crate::core::mesh::Mesh::with_config

use serde::{Deserialize, Serialize};

/// Default distance of the border-closing vertices, in multiples of the
/// larger domain dimension.
pub const DEFAULT_BORDER_SCALE: f64 = 10.0;

const fn default_border_scale() -> f64 {
    DEFAULT_BORDER_SCALE
}

/// Construction options for a [`Mesh`](crate::core::mesh::Mesh).
#[derive(Builder, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct MeshConfig {
    /// Domain width; the domain spans `[0, width]`.
    pub width: f64,
    /// Domain height; the domain spans `[0, height]`.
    pub height: f64,
    /// Border-closing vertices sit this many `max(width, height)` away from
    /// the domain centre.
    #[builder(default = "DEFAULT_BORDER_SCALE")]
    #[serde(default = "default_border_scale")]
    pub border_scale: f64,
    /// Insert the domain rectangle as a constraint shape.
    #[builder(default)]
    #[serde(default)]
    pub bounded: bool,
}

impl MeshConfig {
    /// Unbounded configuration with the default border scale.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            border_scale: DEFAULT_BORDER_SCALE,
            bounded: false,
        }
    }
}

impl MeshConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        for (name, value) in [("width", self.width), ("height", self.height)] {
            if let Some(value) = value
                && !(value.is_finite() && value > 0.0)
            {
                return Err(format!("{name} must be finite and positive, got {value}"));
            }
        }
        if let Some(scale) = self.border_scale
            && !(scale.is_finite() && scale >= 1.0)
        {
            return Err(format!("border_scale must be finite and at least 1, got {scale}"));
        }
        Ok(())
    }
}
