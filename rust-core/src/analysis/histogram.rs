// Histogram module: fixed-binning 1D, 2D and 3D histograms with running moments
// Statistics follow the usual convention of only counting entries inside the axis range

use nalgebra::Matrix2;
use serde::{Deserialize, Serialize};

/// Uniform binning of one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub nbins: usize,
    pub min: f64,
    pub max: f64,
}

impl Axis {
    pub fn new(nbins: usize, min: f64, max: f64) -> Self {
        debug_assert!(nbins > 0, "Axis needs at least one bin");
        debug_assert!(max > min, "Axis maximum must be larger than its minimum");
        Self { nbins, min, max }
    }

    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.nbins as f64
    }

    /// Bin holding `value`, `None` for underflow, overflow and NaN
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        if !(value >= self.min && value < self.max) {
            return None;
        }
        let index = ((value - self.min) / self.bin_width()) as usize;
        // Rounding can push values just below max into the overflow bin
        Some(index.min(self.nbins - 1))
    }

    pub fn bin_center(&self, index: usize) -> f64 {
        self.min + (index as f64 + 0.5) * self.bin_width()
    }
}

/// One-dimensional histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram1D {
    pub name: String,
    pub title: String,
    pub axis: Axis,
    pub bins: Vec<f64>,
    pub underflow: f64,
    pub overflow: f64,
    pub entries: u64,
    sum_w: f64,
    sum_wx: f64,
    sum_wx2: f64,
}

impl Histogram1D {
    pub fn new(name: &str, title: &str, nbins: usize, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            axis: Axis::new(nbins, min, max),
            bins: vec![0.0; nbins],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
            sum_w: 0.0,
            sum_wx: 0.0,
            sum_wx2: 0.0,
        }
    }

    pub fn fill(&mut self, x: f64) {
        self.fill_weighted(x, 1.0);
    }

    pub fn fill_weighted(&mut self, x: f64, weight: f64) {
        self.entries += 1;
        match self.axis.bin_index(x) {
            Some(i) => {
                self.bins[i] += weight;
                self.sum_w += weight;
                self.sum_wx += weight * x;
                self.sum_wx2 += weight * x * x;
            }
            None if x < self.axis.min => self.underflow += weight,
            None => self.overflow += weight,
        }
    }

    /// Sum of the in-range bin contents
    pub fn integral(&self) -> f64 {
        self.bins.iter().sum()
    }

    pub fn mean(&self) -> Option<f64> {
        (self.sum_w > 0.0).then(|| self.sum_wx / self.sum_w)
    }

    /// Standard deviation of the in-range entries
    pub fn rms(&self) -> Option<f64> {
        let mean = self.mean()?;
        Some((self.sum_wx2 / self.sum_w - mean * mean).max(0.0).sqrt())
    }
}

/// Two-dimensional histogram, bins stored row-major in y
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram2D {
    pub name: String,
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub bins: Vec<f64>,
    /// Weight of entries outside either axis
    pub outside: f64,
    pub entries: u64,
    sum_w: f64,
    sum_wx: f64,
    sum_wy: f64,
    sum_wxx: f64,
    sum_wxy: f64,
    sum_wyy: f64,
}

impl Histogram2D {
    pub fn new(name: &str, title: &str, x_axis: Axis, y_axis: Axis) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            x_axis,
            y_axis,
            bins: vec![0.0; x_axis.nbins * y_axis.nbins],
            outside: 0.0,
            entries: 0,
            sum_w: 0.0,
            sum_wx: 0.0,
            sum_wy: 0.0,
            sum_wxx: 0.0,
            sum_wxy: 0.0,
            sum_wyy: 0.0,
        }
    }

    pub fn fill(&mut self, x: f64, y: f64) {
        self.fill_weighted(x, y, 1.0);
    }

    pub fn fill_weighted(&mut self, x: f64, y: f64, weight: f64) {
        self.entries += 1;
        match (self.x_axis.bin_index(x), self.y_axis.bin_index(y)) {
            (Some(ix), Some(iy)) => {
                self.bins[iy * self.x_axis.nbins + ix] += weight;
                self.sum_w += weight;
                self.sum_wx += weight * x;
                self.sum_wy += weight * y;
                self.sum_wxx += weight * x * x;
                self.sum_wxy += weight * x * y;
                self.sum_wyy += weight * y * y;
            }
            _ => self.outside += weight,
        }
    }

    pub fn bin_content(&self, ix: usize, iy: usize) -> f64 {
        self.bins[iy * self.x_axis.nbins + ix]
    }

    pub fn integral(&self) -> f64 {
        self.bins.iter().sum()
    }

    pub fn mean(&self) -> Option<(f64, f64)> {
        (self.sum_w > 0.0).then(|| (self.sum_wx / self.sum_w, self.sum_wy / self.sum_w))
    }

    /// Population covariance matrix of the in-range entries
    pub fn covariance(&self) -> Option<Matrix2<f64>> {
        let (mx, my) = self.mean()?;
        let cxx = self.sum_wxx / self.sum_w - mx * mx;
        let cxy = self.sum_wxy / self.sum_w - mx * my;
        let cyy = self.sum_wyy / self.sum_w - my * my;
        Some(Matrix2::new(cxx, cxy, cxy, cyy))
    }
}

/// Three-dimensional histogram without moments, bins stored with x fastest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram3D {
    pub name: String,
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub z_axis: Axis,
    pub bins: Vec<f64>,
    pub outside: f64,
    pub entries: u64,
}

impl Histogram3D {
    pub fn new(name: &str, title: &str, x_axis: Axis, y_axis: Axis, z_axis: Axis) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            x_axis,
            y_axis,
            z_axis,
            bins: vec![0.0; x_axis.nbins * y_axis.nbins * z_axis.nbins],
            outside: 0.0,
            entries: 0,
        }
    }

    fn index(&self, ix: usize, iy: usize, iz: usize) -> usize {
        (iz * self.y_axis.nbins + iy) * self.x_axis.nbins + ix
    }

    pub fn fill_weighted(&mut self, x: f64, y: f64, z: f64, weight: f64) {
        self.entries += 1;
        match (self.x_axis.bin_index(x), self.y_axis.bin_index(y), self.z_axis.bin_index(z)) {
            (Some(ix), Some(iy), Some(iz)) => {
                let i = self.index(ix, iy, iz);
                self.bins[i] += weight;
            }
            _ => self.outside += weight,
        }
    }

    pub fn bin_content(&self, ix: usize, iy: usize, iz: usize) -> f64 {
        self.bins[self.index(ix, iy, iz)]
    }

    pub fn integral(&self) -> f64 {
        self.bins.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_binning() {
        let axis = Axis::new(10, 0.0, 1.0);
        assert_eq!(axis.bin_index(0.0), Some(0));
        assert_eq!(axis.bin_index(0.95), Some(9));
        assert_eq!(axis.bin_index(1.0), None);
        assert_eq!(axis.bin_index(-1e-12), None);
        assert_eq!(axis.bin_index(f64::NAN), None);
        assert_relative_eq!(axis.bin_center(3), 0.35);
    }

    #[test]
    fn test_histogram_1d_flows_and_moments() {
        let mut h = Histogram1D::new("h", "test", 4, 0.0, 4.0);
        for x in [0.5, 1.5, 1.5, 3.5, -1.0, 7.0] {
            h.fill(x);
        }
        assert_eq!(h.entries, 6);
        assert_eq!(h.bins, vec![1.0, 2.0, 0.0, 1.0]);
        assert_eq!(h.underflow, 1.0);
        assert_eq!(h.overflow, 1.0);
        assert_relative_eq!(h.integral(), 4.0);
        assert_relative_eq!(h.mean().unwrap(), 1.75);
        assert_relative_eq!(h.rms().unwrap(), (0.25f64 * (1.5625 + 0.0625 * 2.0 + 3.0625)).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_histogram_has_no_moments() {
        let h = Histogram1D::new("h", "", 3, 0.0, 1.0);
        assert!(h.mean().is_none());
        assert!(h.rms().is_none());
    }

    #[test]
    fn test_histogram_2d_covariance() {
        let mut h = Histogram2D::new("h2", "", Axis::new(20, -2.0, 2.0), Axis::new(20, -2.0, 2.0));
        for (x, y) in [(1.0, 1.0), (-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (5.0, 0.0)] {
            h.fill(x, y);
        }
        assert_eq!(h.entries, 5);
        assert_eq!(h.outside, 1.0);
        assert_relative_eq!(h.integral(), 4.0);
        assert_eq!(h.bin_content(15, 15), 1.0);

        let cov = h.covariance().unwrap();
        assert_relative_eq!(cov[(0, 0)], 1.0);
        assert_relative_eq!(cov[(1, 1)], 1.0);
        assert_relative_eq!(cov[(0, 1)], 0.0);
    }

    #[test]
    fn test_weighted_2d_mean() {
        let mut h = Histogram2D::new("w", "", Axis::new(10, 0.0, 10.0), Axis::new(10, 0.0, 10.0));
        h.fill_weighted(1.0, 1.0, 3.0);
        h.fill_weighted(5.0, 9.0, 1.0);
        h.fill_weighted(20.0, 1.0, 2.0);
        assert_relative_eq!(h.integral(), 4.0);
        assert_eq!(h.outside, 2.0);
        let (mx, my) = h.mean().unwrap();
        assert_relative_eq!(mx, 2.0);
        assert_relative_eq!(my, 3.0);
    }

    #[test]
    fn test_histogram_3d_weights() {
        let axis = Axis::new(4, -2.0, 2.0);
        let mut h = Histogram3D::new("h3", "", axis, axis, Axis::new(2, 0.0, 1.0));
        h.fill_weighted(-1.5, 0.5, 0.75, 2.5);
        h.fill_weighted(-1.5, 0.5, 0.75, 0.5);
        h.fill_weighted(0.0, 0.0, 1.5, 4.0);
        assert_eq!(h.entries, 3);
        assert_eq!(h.bins.len(), 32);
        assert_relative_eq!(h.bin_content(0, 2, 1), 3.0);
        assert_relative_eq!(h.integral(), 3.0);
        assert_eq!(h.outside, 4.0);
    }
}
