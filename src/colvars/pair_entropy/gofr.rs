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

//! Accumulation of the smoothed pair distribution function and its derivatives.

use super::{GaussianKernel, HistogramGrid};

use rsp2_array_types::{V3, M33, outer};
use rsp2_array_types::Unvee;
use slice_of_array::prelude::*;

use std::f64::consts::PI;

/// The kernel contributions of a single pair to a contiguous run of bins.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PairTerms {
    pub from: usize,
    pub to: usize,
    /// Displacement `x[to] - x[from]`.
    pub disp: V3,
    pub first_bin: usize,
    /// For each bin, the kernel value and its gradient with respect to `x[from]`.
    pub terms: Vec<(f64, V3)>,
}

impl PairTerms {
    /// Evaluate the kernel for a pair at the given displacement.
    ///
    /// Returns `None` for pairs at or beyond `sq_cutoff.sqrt()`.
    #[inline]
    pub fn compute(
        grid: &HistogramGrid,
        kernel: &GaussianKernel,
        half_width: usize,
        sq_cutoff: f64,
        (from, to): (usize, usize),
        disp: V3,
    ) -> Option<PairTerms> {
        let sqnorm = disp.sqnorm();
        if !(sqnorm < sq_cutoff) {
            return None;
        }

        let distance = sqnorm.sqrt();
        // coincident particles have no preferred direction
        let unit = match distance {
            d if d > 0.0 => disp / d,
            _ => V3::zero(),
        };

        let window = grid.window(distance, half_width);
        let first_bin = *window.start();
        let r = grid.r();
        let terms = window.map(|k| {
            let (value, deriv) = kernel.evaluate(r[k] - distance);
            (value, unit * deriv)
        }).collect();

        Some(PairTerms { from, to, disp, first_bin, terms })
    }
}

/// Per-frame g(r), per-(bin, atom) gradient, and per-bin virial.
///
/// Sized once, reset every frame.
#[derive(Debug, Clone)]
pub(crate) struct GofrState {
    num_atoms: usize,
    gofr: Vec<f64>,
    // indexed by [bin * num_atoms + atom]
    prime: Vec<V3>,
    virial: Vec<M33>,
}

impl GofrState {
    pub fn new(nhist: usize, num_atoms: usize) -> Self {
        GofrState {
            num_atoms,
            gofr: vec![0.0; nhist],
            prime: vec![V3::zero(); nhist * num_atoms],
            virial: vec![M33::zero(); nhist],
        }
    }

    pub fn reset(&mut self) {
        for x in &mut self.gofr { *x = 0.0; }
        for x in &mut self.prime { *x = V3::zero(); }
        for x in &mut self.virial { *x = M33::zero(); }
    }

    pub fn nhist(&self) -> usize
    { self.gofr.len() }

    pub fn gofr(&self) -> &[f64]
    { &self.gofr }

    pub fn gofr_mut(&mut self) -> &mut [f64]
    { &mut self.gofr }

    /// Gradient of `g[bin]` with respect to the position of `atom`.
    #[inline]
    pub fn prime(&self, bin: usize, atom: usize) -> V3
    { self.prime[bin * self.num_atoms + atom] }

    pub fn virial(&self, bin: usize) -> M33
    { self.virial[bin] }

    pub fn accumulate(&mut self, pair: &PairTerms) {
        let n = self.num_atoms;
        for (offset, &(value, grad)) in pair.terms.iter().enumerate() {
            let k = pair.first_bin + offset;
            self.gofr[k] += value;
            self.prime[k * n + pair.from] += grad;
            self.prime[k * n + pair.to] -= grad;
            self.virial[k] += outer(&grad, &pair.disp);
        }
    }

    /// Flat views of every field, in a fixed order, for reductions.
    pub fn buffers_mut(&mut self) -> [&mut [f64]; 3] {
        let GofrState { gofr, prime, virial, .. } = self;
        [
            &mut gofr[..],
            prime.unvee_mut().flat_mut(),
            virial.unvee_mut().flat_mut().flat_mut(),
        ]
    }

    /// Divide by the number of pairs expected in each spherical shell of an ideal gas.
    ///
    /// Every bin but the first is scaled by `1 / (2π ρ N r²)`.  The first bin has
    /// `r = 0`, where this is singular; it is set to zero, which is also where its
    /// weight `r²` puts it in every integral.
    pub fn normalize(&mut self, grid: &HistogramGrid, density: f64) {
        let n = self.num_atoms;
        let base = 2.0 * PI * density * n as f64;

        self.gofr[0] = 0.0;
        self.virial[0] = M33::zero();
        for x in &mut self.prime[..n] { *x = V3::zero(); }

        for k in 1..self.nhist() {
            let factor = base * grid.r_sq()[k];
            self.gofr[k] /= factor;
            self.virial[k] /= factor;
            for x in &mut self.prime[k * n..(k + 1) * n] {
                *x /= factor;
            }
        }
    }

    /// Scale the derivative fields, leaving g(r) alone.
    pub fn scale_derivatives(&mut self, factor: f64) {
        for x in &mut self.prime { *x *= factor; }
        for x in &mut self.virial { *x *= factor; }
    }
}

/// Running mean of g(r) over every frame seen so far.
#[derive(Debug, Clone)]
pub(crate) struct RunningMean {
    avg: Vec<f64>,
    iteration: u64,
}

impl RunningMean {
    pub fn new(nhist: usize) -> Self
    { RunningMean { avg: vec![0.0; nhist], iteration: 1 } }

    /// Fold in a new sample, and replace it with the updated mean.
    ///
    /// Returns the weight of the new sample in the mean.
    pub fn fold(&mut self, gofr: &mut [f64]) -> f64 {
        assert_eq!(gofr.len(), self.avg.len());

        let weight = 1.0 / self.iteration as f64;
        for (avg, g) in self.avg.iter_mut().zip(gofr) {
            *avg += (*g - *avg) * weight;
            *g = *avg;
        }
        self.iteration += 1;
        weight
    }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    fn setup() -> (HistogramGrid, GaussianKernel) {
        (HistogramGrid::new(1.0, 21).unwrap(), GaussianKernel::new(0.11))
    }

    #[test]
    fn pair_terms_cutoff() {
        let (grid, kernel) = setup();
        let half_width = kernel.half_width_in_bins(grid.bin_width());
        let disp = V3([0.48, 0.2, 0.0]); // distance 0.52

        assert!(PairTerms::compute(&grid, &kernel, half_width, 0.27, (0, 1), disp).is_none());
        let terms = PairTerms::compute(&grid, &kernel, half_width, 0.28, (0, 1), disp).unwrap();

        assert_eq!(terms.first_bin, 4);
        assert_eq!(terms.terms.len(), 13);
        for &(value, grad) in &terms.terms {
            assert!(value > 0.0);
            // parallel to the displacement
            assert_close!(abs=1e-12, grad.cross(&disp).norm(), 0.0);
        }
    }

    #[test]
    fn antisymmetry_and_normalization() {
        let (grid, kernel) = setup();
        let half_width = kernel.half_width_in_bins(grid.bin_width());
        let mut state = GofrState::new(grid.len(), 3);

        let pairs = vec![
            PairTerms::compute(&grid, &kernel, half_width, 4.0, (0, 2), V3([0.5, 0.1, 0.0])).unwrap(),
            PairTerms::compute(&grid, &kernel, half_width, 4.0, (1, 2), V3([0.0, 0.0, 0.02])).unwrap(),
        ];
        for pair in &pairs {
            state.accumulate(pair);
        }
        state.normalize(&grid, 1.5);

        assert_eq!(state.gofr()[0], 0.0);
        for k in 0..grid.len() {
            assert!(state.gofr()[k] >= 0.0);
            let total = (0..3).map(|i| state.prime(k, i)).sum::<V3>();
            assert_close!(abs=1e-12, total, V3::zero());
        }

        // the short pair (1, 2) does not reach this bin
        let k = 10;
        assert_eq!(state.prime(k, 1), V3::zero());
        assert_eq!(state.prime(k, 0), -state.prime(k, 2));
        assert_ne!(state.prime(k, 0), V3::zero());
    }

    #[test]
    fn reduction_buffers_cover_everything() {
        let mut state = GofrState::new(4, 2);
        {
            let [gofr, prime, virial] = state.buffers_mut();
            assert_eq!((gofr.len(), prime.len(), virial.len()), (4, 24, 36));
            prime[3] = 1.0;
            virial[9] = 2.0;
        }
        assert_eq!(state.prime(0, 1), V3([1.0, 0.0, 0.0]));
        assert_eq!(state.virial(1)[0][0], 2.0);

        state.reset();
        assert_eq!(state.prime(0, 1), V3::zero());
    }

    #[test]
    fn running_mean() {
        let mut mean = RunningMean::new(2);
        let mut samples = vec![vec![1.0, 2.0], vec![3.0, 2.0], vec![5.0, 8.0]];
        let weights = samples.iter_mut().map(|g| mean.fold(g)).collect::<Vec<_>>();

        assert_eq!(weights, vec![1.0, 0.5, 1.0 / 3.0]);
        assert_eq!(samples[0], vec![1.0, 2.0]);
        assert_eq!(samples[1], vec![2.0, 2.0]);
        assert_close!(samples[2], vec![3.0, 4.0]);
    }
}
