//! # Acomodar
//!
//! Group-aware positional adjustment engine for statistical visualization.
//!
//! When a plot layer draws grouped marks (bars, points, lines) at shared
//! categorical positions, the marks overlap unless something shifts and
//! shrinks them. Acomodar is that something: a small, pure, deterministic
//! layout core that takes an observation table, a grouping specification,
//! and an orientation axis, and returns the table with adjusted position
//! and width columns. Rendering, scale resolution, and styling live in
//! other layers; this crate only does the positional algebra.
//!
//! ## Components
//!
//! - **Table**: schema-flexible columnar observation table
//! - **Scales**: declared category orders (the order-provider boundary)
//! - **GroupBy**: stable cross-product grouping with per-group aggregation
//! - **Moves**: composable position transforms (jitter, dodge)
//!
//! ## Quick Start
//!
//! ```rust
//! use acomodar::prelude::*;
//!
//! let mut data = Table::new();
//! data.add_column_f64("x", &[0.0, 0.0, 1.0]);
//! data.add_column_f64("y", &[1.0, 2.0, 3.0]);
//! data.add_column_str("grp", &["a", "b", "b"]);
//! data.add_column_f64("width", &[0.8, 0.8, 0.8]);
//!
//! let groupby = GroupBy::new(&["x", "grp"], &ScaleSet::new());
//! let out = Dodge::new().apply(&data, &groupby, Orient::X).unwrap();
//!
//! let x = out.get_f64("x").unwrap();
//! assert!((x[0] - -0.2).abs() < 1e-9);
//! ```
//!
//! ## Guarantees
//!
//! - Input tables are never mutated; every move returns a new table.
//! - Grouping is order-preserving and deterministic given identical input
//!   row order; the group cross-product always covers every declared
//!   level combination, observed or not.
//! - Seeded jitter reproduces byte-identical output.
//!
//! ## References
//!
//! - Wilkinson, L. (2005). *The Grammar of Graphics*. Springer.
//! - Wickham, H. (2010). "A Layered Grammar of Graphics." Journal of
//!   Computational and Graphical Statistics.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code (Cloudflare incident 2025-11-18)
#![cfg_attr(test, allow(clippy::unwrap_used))]
// Allow common patterns in layout/positional code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Columnar observation table and scalar values.
pub mod table;

/// Declared category orders (the scale-system boundary).
pub mod scale;

/// Cross-product grouping and per-group aggregation.
pub mod groupby;

// ============================================================================
// Transform Modules
// ============================================================================

/// Position-adjustment moves (jitter, dodge) and the move pipeline.
pub mod moves;

// ============================================================================
// Error Handling
// ============================================================================

/// Error types for acomodar operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Convenience re-exports of the most commonly used types.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::groupby::{GroupBy, Grouping, Reducer};
    pub use crate::moves::{apply_moves, Dodge, Empty, Jitter, Move, Orient};
    pub use crate::scale::ScaleSet;
    pub use crate::table::{Column, Table, Value};
}
