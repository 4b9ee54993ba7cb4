//! Tunable parameters for blemish removal.

use crate::error::{Error, Result};

/// Border extension policy used when padding images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Mirror without repeating the edge pixel: `dcb|abcdefgh|gfe`.
    #[default]
    Reflect101,
}

/// Parameters controlling detection, patch search and blending.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalConfig {
    /// Side length `S` of the analysis box. Odd, at least 5.
    pub box_size: u32,
    /// Gradient magnitude above which a pixel counts as an edge (0-254).
    pub gradient_threshold: u8,
    /// Number of candidate positions `k` per grid axis. Odd, at least 3.
    pub grid_size: u32,
    /// How images are extended past their borders.
    pub border: BorderMode,
    /// Gaussian sigma of the noise-suppression pass.
    pub blur_sigma: f32,
    /// Radius of the median (rank) filter pass.
    pub median_radius: u32,
    /// Upper bound on Poisson solver sweeps.
    pub blend_iterations: u32,
    /// Solver stops once no pixel moves by more than this.
    pub blend_tolerance: f32,
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            box_size: 35,
            gradient_threshold: 50,
            grid_size: 5,
            border: BorderMode::Reflect101,
            // Sigma of a 5x5 Gaussian kernel with automatic sigma.
            blur_sigma: 1.1,
            median_radius: 1,
            blend_iterations: 2000,
            blend_tolerance: 0.01,
        }
    }
}

impl RemovalConfig {
    /// Reject degenerate settings before any click is processed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.box_size < 5 || self.box_size % 2 == 0 {
            return Err(invalid(
                "box_size",
                format!("must be odd and at least 5, got {}", self.box_size),
            ));
        }
        if self.gradient_threshold == u8::MAX {
            return Err(invalid(
                "gradient_threshold",
                format!("must be below {}, got {}", u8::MAX, self.gradient_threshold),
            ));
        }
        if self.grid_size < 3 || self.grid_size % 2 == 0 {
            return Err(invalid(
                "grid_size",
                format!("must be odd and at least 3, got {}", self.grid_size),
            ));
        }
        if !(self.blur_sigma.is_finite() && self.blur_sigma > 0.0) {
            return Err(invalid(
                "blur_sigma",
                format!("must be positive, got {}", self.blur_sigma),
            ));
        }
        if self.median_radius == 0 {
            return Err(invalid("median_radius", "must be at least 1".to_string()));
        }
        if self.blend_iterations == 0 {
            return Err(invalid("blend_iterations", "must be at least 1".to_string()));
        }
        if !(self.blend_tolerance.is_finite() && self.blend_tolerance > 0.0) {
            return Err(invalid(
                "blend_tolerance",
                format!("must be positive, got {}", self.blend_tolerance),
            ));
        }
        Ok(())
    }

    /// Half the box size, `H = (S - 1) / 2`.
    #[must_use]
    pub fn half_size(&self) -> u32 {
        (self.box_size - 1) / 2
    }

    /// Border added to every side so boxes and the whole search grid fit.
    ///
    /// `S + H`: the farthest candidate center sits `S` from the click and
    /// its square reaches another `H` beyond that.
    #[must_use]
    pub fn pad_width(&self) -> u32 {
        self.box_size + self.half_size()
    }

    /// Half the grid size, i.e. the number of cells on each side of the center.
    #[must_use]
    pub fn grid_half(&self) -> u32 {
        self.grid_size / 2
    }
}

fn invalid(field: &'static str, reason: String) -> Error {
    Error::InvalidConfig { field, reason }
}
