/* ************************************************************************ **
** This file is part of rsp2, and is licensed under EITHER the MIT license  **
** or the Apache 2.0 license, at your option.                               **
**                                                                          **
**     http://www.apache.org/licenses/LICENSE-2.0                           **
**     http://opensource.org/licenses/MIT                                   **
**                                                                          **
** Be aware that not all of rsp2 is provided under this permissive license, **
** and that the project as a whole is licensed under the GPL 3.0.           **
** ************************************************************************ */

use super::ConfigError;

use std::ops::RangeInclusive;

/// Evenly spaced sample points `r_k = k Δr` on `[0, maxr]`, endpoints included.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramGrid {
    maxr: f64,
    bin_width: f64,
    r: Vec<f64>,
    r_sq: Vec<f64>,
}

impl HistogramGrid {
    pub fn new(maxr: f64, nhist: usize) -> Result<Self, ConfigError> {
        if !(maxr > 0.0) {
            return Err(ConfigError::NonPositive { what: "maxr", value: maxr });
        }
        if nhist < 2 {
            return Err(ConfigError::TooFewBins { nhist });
        }

        let bin_width = maxr / (nhist - 1) as f64;
        let r = (0..nhist).map(|k| bin_width * k as f64).collect::<Vec<_>>();
        let r_sq = r.iter().map(|&r| r * r).collect();
        Ok(HistogramGrid { maxr, bin_width, r, r_sq })
    }

    pub fn len(&self) -> usize
    { self.r.len() }

    pub fn maxr(&self) -> f64
    { self.maxr }

    /// `Δr`
    pub fn bin_width(&self) -> f64
    { self.bin_width }

    pub fn r(&self) -> &[f64]
    { &self.r }

    pub fn r_sq(&self) -> &[f64]
    { &self.r_sq }

    /// Bins within `half_width` bins of the one containing `distance`, clamped to the grid.
    #[inline]
    pub fn window(&self, distance: f64, half_width: usize) -> RangeInclusive<usize> {
        let last = self.len() - 1;
        let bin = f64::floor(distance / self.bin_width) as usize;
        let lo = usize::min(bin.saturating_sub(half_width), last);
        let hi = usize::min(bin.saturating_add(half_width), last);
        lo..=hi
    }
}
