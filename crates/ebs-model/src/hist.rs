//! Binned densities: 1D histograms and the packed 3D overlap grid.

use ebs_core::config::{AxisBins, GridConfig};
use ebs_core::errors::{EbsError, ErrorInfo};
use ebs_core::Axis;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Validates all three axes of an overlap grid.
pub fn check_grid(grid: &GridConfig) -> Result<(), EbsError> {
    grid.x.validate("x")?;
    grid.y.validate("y")?;
    grid.z.validate("z")?;
    Ok(())
}

/// One-dimensional histogram with uniform linear binning.
///
/// `edges` holds `content.len() + 1` strictly increasing values. Content is
/// raw counts until [`Hist1D::normalize_density`] converts it to a
/// probability density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hist1D {
    /// Ordered bin edges, one more than the number of bins.
    pub edges: Vec<f64>,
    /// Bin contents, counts or density depending on stage.
    pub content: Vec<f64>,
}

impl Hist1D {
    /// Creates an empty histogram over the given axis specification.
    pub fn new(axis: &AxisBins) -> Result<Self, EbsError> {
        axis.validate("axis")?;
        let n = axis.bins as usize;
        let width = axis.width();
        let edges = (0..=n).map(|i| axis.min + i as f64 * width).collect();
        Ok(Self {
            edges,
            content: vec![0.0; n],
        })
    }

    /// Builds a histogram from externally supplied edges and content.
    pub fn from_parts(edges: Vec<f64>, content: Vec<f64>) -> Result<Self, EbsError> {
        if edges.len() != content.len() + 1 || content.is_empty() {
            return Err(EbsError::InvalidParameter(
                ErrorInfo::new("hist-shape", "edges must outnumber content by one")
                    .with_context("edges", edges.len().to_string())
                    .with_context("content", content.len().to_string()),
            ));
        }
        if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(EbsError::InvalidParameter(ErrorInfo::new(
                "edges-unsorted",
                "bin edges must be strictly increasing",
            )));
        }
        Ok(Self { edges, content })
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the histogram has no bins.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Uniform bin width taken from the first bin.
    pub fn width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    /// Midpoints of adjacent edges.
    pub fn centers(&self) -> Vec<f64> {
        self.edges
            .windows(2)
            .map(|pair| 0.5 * (pair[0] + pair[1]))
            .collect()
    }

    /// Increments the bin containing `value`; out-of-range values are dropped.
    pub fn fill(&mut self, value: f64) {
        let lo = self.edges[0];
        let hi = *self.edges.last().unwrap_or(&lo);
        if value < lo || value >= hi {
            return;
        }
        let idx = ((value - lo) / self.width()) as usize;
        if let Some(bin) = self.content.get_mut(idx) {
            *bin += 1.0;
        }
    }

    /// Adds `weight` to bin `idx`.
    pub fn add_content(&mut self, idx: usize, weight: f64) {
        if let Some(bin) = self.content.get_mut(idx) {
            *bin += weight;
        }
    }

    /// Accumulates another histogram with identical binning.
    pub fn accumulate(&mut self, other: &Hist1D) {
        for (bin, value) in self.content.iter_mut().zip(other.content.iter()) {
            *bin += value;
        }
    }

    /// Sum of all bin contents.
    pub fn total(&self) -> f64 {
        self.content.iter().sum()
    }

    /// Sum of contents times the uniform bin width.
    pub fn integral(&self) -> f64 {
        self.total() * self.width()
    }

    /// Largest bin content.
    pub fn maximum(&self) -> f64 {
        self.content.iter().copied().fold(0.0, f64::max)
    }

    /// Converts raw counts to a probability density,
    /// `content[i] / (total * width)`.
    pub fn normalize_density(&mut self) -> Result<(), EbsError> {
        let total = self.total();
        let width = self.width();
        if total <= 0.0 {
            return Err(EbsError::InvalidParameter(ErrorInfo::new(
                "density-empty",
                "histogram has zero total content",
            )));
        }
        if width <= 0.0 {
            return Err(EbsError::InvalidParameter(ErrorInfo::new(
                "width-zero",
                "histogram has a degenerate bin width",
            )));
        }
        for bin in self.content.iter_mut() {
            *bin /= total * width;
        }
        Ok(())
    }
}

/// Packed 3D counts over an overlap grid, x-major layout.
#[derive(Debug, Clone)]
pub struct Counts3 {
    grid: GridConfig,
    data: Vec<f64>,
}

impl Counts3 {
    /// Creates an empty 3D counts array over the given grid.
    pub fn new(grid: GridConfig) -> Result<Self, EbsError> {
        check_grid(&grid)?;
        let cells = grid.x.bins as usize * grid.y.bins as usize * grid.z.bins as usize;
        Ok(Self {
            grid,
            data: vec![0.0; cells],
        })
    }

    fn bin_index(axis: &AxisBins, value: f64) -> Option<usize> {
        if value < axis.min || value >= axis.max {
            return None;
        }
        let idx = ((value - axis.min) / axis.width()) as usize;
        (idx < axis.bins as usize).then_some(idx)
    }

    /// Bins one spatial point; points outside the grid are dropped.
    pub fn fill(&mut self, point: &Vector3<f64>) {
        let (Some(ix), Some(iy), Some(iz)) = (
            Self::bin_index(&self.grid.x, point.x),
            Self::bin_index(&self.grid.y, point.y),
            Self::bin_index(&self.grid.z, point.z),
        ) else {
            return;
        };
        let ny = self.grid.y.bins as usize;
        let nz = self.grid.z.bins as usize;
        self.data[(ix * ny + iy) * nz + iz] += 1.0;
    }

    /// Cell content at the given bin indices.
    pub fn get(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        let ny = self.grid.y.bins as usize;
        let nz = self.grid.z.bins as usize;
        self.data[(ix * ny + iy) * nz + iz]
    }

    /// Grid specification backing this array.
    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Combines two count arrays cell by cell with the per-cell minimum,
    /// the pairing rule of the overlap model.
    pub fn pair_min(&self, other: &Counts3) -> Counts3 {
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a.min(*b))
            .collect();
        Counts3 {
            grid: self.grid,
            data,
        }
    }

    /// Adds another array cell by cell.
    pub fn accumulate(&mut self, other: &Counts3) {
        for (cell, value) in self.data.iter_mut().zip(other.data.iter()) {
            *cell += value;
        }
    }

    /// Projects the counts onto one axis.
    pub fn project(&self, axis: Axis) -> Hist1D {
        let spec = match axis {
            Axis::X => self.grid.x,
            Axis::Y => self.grid.y,
            Axis::Z => self.grid.z,
        };
        // Grid was validated at construction.
        let mut hist = Hist1D::new(&spec).expect("validated axis");
        let (nx, ny, nz) = (
            self.grid.x.bins as usize,
            self.grid.y.bins as usize,
            self.grid.z.bins as usize,
        );
        for ix in 0..nx {
            for iy in 0..ny {
                for iz in 0..nz {
                    let idx = match axis {
                        Axis::X => ix,
                        Axis::Y => iy,
                        Axis::Z => iz,
                    };
                    hist.add_content(idx, self.get(ix, iy, iz));
                }
            }
        }
        hist
    }
}
