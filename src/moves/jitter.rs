//! Jitter move: random displacement of mark positions.

use crate::error::{Error, Result};
use crate::groupby::GroupBy;
use crate::moves::Orient;
use crate::table::Table;

/// Deterministic uniform noise source for jitter draws.
///
/// 64-bit LCG (Knuth MMIX constants) with a splitmix-style seed
/// scramble; the upper 53 bits become a uniform f64 in [0, 1).
#[derive(Debug, Clone)]
struct UniformRng {
    state: u64,
}

impl UniformRng {
    fn new(seed: u64) -> Self {
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self {
            state: z ^ (z >> 31),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }

    /// Uniform draw centered on zero: [-0.5, 0.5).
    fn next_centered(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64 - 0.5
    }
}

/// Seed source for unseeded jitter: wall clock mixed with a
/// process-local counter so rapid successive calls still diverge.
fn entropy_seed() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let clock = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64);
    clock ^ COUNTER
        .fetch_add(1, Ordering::Relaxed)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Random displacement of marks along one or both axes.
///
/// `width` and `height` are fractions of each row's own `width`/`height`
/// column; `x` and `y` are absolute magnitudes. Each enabled parameter
/// draws its own independent noise vector, in the fixed order width,
/// height, x, y, so a given `seed` reproduces byte-identical output.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Jitter {
    /// Jitter along the orientation axis, as a fraction of each row's
    /// `width` column.
    pub width: f64,
    /// Jitter along the perpendicular axis, as a fraction of each row's
    /// `height` column.
    pub height: f64,
    /// Absolute jitter magnitude along x.
    pub x: f64,
    /// Absolute jitter magnitude along y.
    pub y: f64,
    /// Optional deterministic seed.
    pub seed: Option<u64>,
}

impl Jitter {
    /// Create a jitter move with no displacement enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the width-relative jitter fraction.
    #[must_use]
    pub fn width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Set the height-relative jitter fraction.
    #[must_use]
    pub fn height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Set the absolute x jitter magnitude.
    #[must_use]
    pub fn x(mut self, x: f64) -> Self {
        self.x = x;
        self
    }

    /// Set the absolute y jitter magnitude.
    #[must_use]
    pub fn y(mut self, y: f64) -> Self {
        self.y = y;
        self
    }

    /// Set the deterministic seed.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Apply the jitter, returning a new table.
    ///
    /// Only `x`/`y` values are perturbed; all other columns, the row
    /// count, and the row order are unchanged. The grouping is unused
    /// (jitter is position-local) but accepted to satisfy the shared
    /// move contract.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] when an enabled parameter needs
    /// a column the table lacks (the orientation coordinate, `width`,
    /// or `height`).
    pub fn apply(&self, data: &Table, _groupby: &GroupBy, orient: Orient) -> Result<Table> {
        let mut out = data.clone();
        let mut rng = UniformRng::new(self.seed.unwrap_or_else(entropy_seed));

        let pos = orient.as_str();
        let thick = orient.cross().as_str();

        if self.width != 0.0 {
            let scales = extent_column(data, "width")?;
            perturb(&mut out, pos, &mut rng, |i| self.width * scales[i])?;
        }
        if self.height != 0.0 {
            let scales = extent_column(data, "height")?;
            perturb(&mut out, thick, &mut rng, |i| self.height * scales[i])?;
        }
        if self.x != 0.0 {
            perturb(&mut out, "x", &mut rng, |_| self.x)?;
        }
        if self.y != 0.0 {
            perturb(&mut out, "y", &mut rng, |_| self.y)?;
        }

        Ok(out)
    }
}

fn extent_column(data: &Table, name: &str) -> Result<Vec<f64>> {
    data.get_f64(name).ok_or_else(|| Error::MissingColumn {
        column: name.to_string(),
    })
}

fn perturb(
    table: &mut Table,
    column: &str,
    rng: &mut UniformRng,
    scale: impl Fn(usize) -> f64,
) -> Result<()> {
    let values = table.get_f64(column).ok_or_else(|| Error::MissingColumn {
        column: column.to_string(),
    })?;
    let mut jittered = Vec::with_capacity(values.len());
    for (i, v) in values.iter().enumerate() {
        jittered.push(v + rng.next_centered() * scale(i));
    }
    table.add_column_f64(column, &jittered);
    Ok(())
}


// ============================================================================
// Property-based tests with proptest
// ============================================================================
