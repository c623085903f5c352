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

use std::f64::consts::PI;

/// Contributions of the kernel are dropped beyond this many standard deviations.
pub const TRUNCATION_SIGMAS: f64 = 3.0;

/// A normalized Gaussian of fixed width, used to smear out each pair distance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GaussianKernel {
    sigma: f64,
    // cached
    inv_sqrt_2pi_sigma: f64,
    sigma_sq: f64,
}

impl GaussianKernel {
    /// `sigma` must be positive; this is checked by the colvar's constructor.
    pub fn new(sigma: f64) -> Self {
        GaussianKernel {
            sigma,
            inv_sqrt_2pi_sigma: 1.0 / ((2.0 * PI).sqrt() * sigma),
            sigma_sq: sigma * sigma,
        }
    }

    pub fn sigma(&self) -> f64
    { self.sigma }

    /// Value of the kernel at offset `delta`, and its derivative with respect to `delta`.
    #[inline]
    pub fn evaluate(&self, delta: f64) -> (f64, f64) {
        let value = self.inv_sqrt_2pi_sigma * f64::exp(-0.5 * delta * delta / self.sigma_sq);
        let deriv = -delta * value / self.sigma_sq;
        (value, deriv)
    }

    /// Distance beyond which pairs contribute nothing.
    pub fn truncation_radius(&self) -> f64
    { TRUNCATION_SIGMAS * self.sigma }

    /// Number of bins on either side of a distance's own bin that receive contributions.
    pub fn half_width_in_bins(&self, bin_width: f64) -> usize
    { f64::floor(self.truncation_radius() / bin_width) as usize }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::numerical;

    #[test]
    fn normalized() {
        let kernel = GaussianKernel::new(0.3);
        let (peak, slope) = kernel.evaluate(0.0);
        assert_close!(rel=1e-14, peak, 1.0 / (0.3 * (2.0 * PI).sqrt()));
        assert_eq!(slope, 0.0);

        // crude riemann sum over +/- 10 sigma
        let dx = 1e-3;
        let total: f64 = (-3000..=3000).map(|i| kernel.evaluate(i as f64 * dx).0 * dx).sum();
        assert_close!(rel=1e-9, total, 1.0);
    }

    #[test]
    fn derivative() {
        let kernel = GaussianKernel::new(0.025);
        for &delta in &[-0.07, -0.02, 0.001, 0.03, 0.05] {
            let expected = numerical::slope(1e-5, None, delta, |x| kernel.evaluate(x).0);
            assert_close!(rel=1e-7, abs=1e-9, kernel.evaluate(delta).1, expected);
        }
    }

    #[test]
    fn window() {
        let kernel = GaussianKernel::new(0.025);
        assert_close!(kernel.truncation_radius(), 0.075);
        assert_eq!(kernel.half_width_in_bins(0.65 / 99.0), 11);
        assert_eq!(kernel.half_width_in_bins(0.02), 3);
        assert_eq!(kernel.half_width_in_bins(0.1), 0);
    }
}
