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

//! The pair entropy: an order parameter built from the radial distribution function.
//!
//! ```text
//!     S = -2π ρ ∫ [g(r) ln g(r) - g(r) + 1] r² dr
//! ```
//!
//! where `g(r)` is smoothed with a Gaussian kernel so that `S` is differentiable in the
//! positions.  Given a reference `g_ref(r)`, the integrand becomes
//! `g ln(g / g_ref) - g + g_ref` instead.
//!
//! Every frame runs through the same stages:
//!
//! * refresh the neighbor list (if there is one, and if a rebuild is due),
//! * scan this worker's pairs, smearing each distance onto the histogram,
//! * sum over workers,
//! * normalize by the ideal gas, and fold into the running mean (if averaging),
//! * build the integrand, and integrate it along with the derivative fields.

use crate::{Colvar, Communicator, Frame, FrameResult, FailResult, SerialComm};

use rsp2_array_types::{V3, M33, Unvee};
use rsp2_structure::{Displacer, Shard};

use rayon_cond::CondIterator;
use slice_of_array::prelude::*;

use std::f64::consts::PI;
use std::path::PathBuf;

/// Relative slack allowed when comparing a neighbor list cutoff to `maxr + 3*sigma`.
pub const CUTOFF_RTOL: f64 = 1e-9;

mod kernel;
mod grid;
mod gofr;
mod integrate;
mod integrand;
mod neighbor;
mod io;

pub use self::kernel::{GaussianKernel, TRUNCATION_SIGMAS};
pub use self::grid::HistogramGrid;
pub use self::integrate::{trapezoid, trapezoid_by, Integrable};
pub use self::integrand::GOFR_FLOOR;
pub use self::neighbor::NeighborList;
pub use self::io::{parse_reference_gofr, read_reference_gofr};

use self::gofr::{GofrState, PairTerms, RunningMean};
use self::integrand::{Integrand, volume_virial_integrand};

/// Problems with the parameters of a colvar, detected before the first frame.
#[derive(Debug, Fail)]
pub enum ConfigError {
    #[fail(display = "{} must be positive (got {})", what, value)]
    NonPositive { what: &'static str, value: f64 },

    #[fail(display = "{} must be at least 1", what)]
    ZeroStride { what: &'static str },

    #[fail(display = "need at least 2 histogram bins (got {})", nhist)]
    TooFewBins { nhist: usize },

    #[fail(display = "bin size {} is larger than sigma = {}; increase nhist", bin_width, sigma)]
    BinTooLarge { bin_width: f64, sigma: f64 },

    #[fail(display = "neighbor list cutoff {} must be at least maxr + 3*sigma = {}", cutoff, required)]
    CutoffTooSmall { cutoff: f64, required: f64 },

    #[fail(display = "reference g(r) must have exactly {} rows (found {})", expected, found)]
    ReferenceLength { expected: usize, found: usize },

    #[fail(display = "reference g(r), line {}: {}", line, reason)]
    MalformedReference { line: usize, reason: String },

    #[fail(display = "output stride {} was given, but no output was requested", stride)]
    OutputStrideWithoutOutput { stride: u64 },

    #[fail(display = "need at least 2 particles (got {})", num_atoms)]
    TooFewAtoms { num_atoms: usize },

    #[fail(display = "the particle group is empty")]
    EmptyGroup,

    #[fail(display = "particle {} appears more than once in the group", index)]
    DuplicateGroupIndex { index: usize },

    #[fail(display = "particle index {} out of range for a structure of {} particles", index, total)]
    GroupIndexOutOfRange { index: usize, total: usize },
}

/// Problems with a frame, detected while computing it.
#[derive(Debug, Fail)]
pub enum ConsistencyError {
    #[fail(
        display = "step {}: neighbor lists should be updated on exchange steps; \
                   choose a neighbor list stride (currently {}) which divides the exchange stride",
        step, stride
    )]
    ExchangeWithoutRebuild { step: u64, stride: u64 },

    #[fail(display = "step {}: a periodic cell is required (for periodic images or the density)", step)]
    MissingCell { step: u64 },

    #[fail(display = "step {}: expected {} particles, got {}", step, expected, found)]
    WrongAtomCount { step: u64, expected: usize, found: usize },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NeighborListParams {
    pub cutoff: f64,
    pub stride: u64,
}

/// Where and when to write g(r) and the integrand.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticOutput {
    pub dir: PathBuf,
    pub gofr: bool,
    pub integrand: bool,
    /// Write on steps that are a multiple of this.
    pub stride: u64,
}

impl DiagnosticOutput {
    pub const GOFR_FILENAME: &'static str = "gofr.txt";
    pub const INTEGRAND_FILENAME: &'static str = "integrand.txt";
}

#[derive(Debug, Clone, PartialEq)]
pub struct Params {
    /// Upper limit of integration.
    pub maxr: f64,
    /// Number of points on `[0, maxr]`, endpoints included.
    pub nhist: usize,
    /// Width of the smoothing kernel.
    pub sigma: f64,
    /// Fixed number density.  When absent, `N / V` is used, and the virial gains
    /// a contribution from the dependence of the density on the volume.
    pub density: Option<f64>,
    /// Use minimum image distances.
    pub pbc: bool,
    /// Ignore the communicator; do all of the work on every worker.
    pub serial: bool,
    pub neighbor_list: Option<NeighborListParams>,
    /// Switches the integrand to the relative form.
    pub reference_gofr: Option<Vec<f64>>,
    /// Integrate the running mean of g(r) over all frames instead of the current g(r).
    pub average_gofr: bool,
    pub output: Option<DiagnosticOutput>,
    /// Use threads within each worker.
    pub use_rayon: bool,
}

impl Params {
    pub fn new(maxr: f64, nhist: usize, sigma: f64) -> Self {
        Params {
            maxr, nhist, sigma,
            density: None,
            pbc: true,
            serial: false,
            neighbor_list: None,
            reference_gofr: None,
            average_gofr: false,
            output: None,
            use_rayon: false,
        }
    }
}

/// The pair entropy colvar.
///
/// Workers sharing a communicator must be fed identical frames.
#[derive(Debug, Clone)]
pub struct PairEntropy<C = SerialComm> {
    comm: C,
    num_atoms: usize,
    grid: HistogramGrid,
    kernel: GaussianKernel,
    half_width: usize,
    // pairs at or beyond this cannot contribute to any bin
    pair_cutoff: f64,
    density: Option<f64>,
    pbc: bool,
    serial: bool,
    use_rayon: bool,
    neighbor_list: Option<NeighborList>,
    reference: Option<Vec<f64>>,
    running_mean: Option<RunningMean>,
    output: Option<DiagnosticOutput>,
    state: GofrState,
    integrand: Vec<f64>,
}

impl<C: Communicator> PairEntropy<C> {
    pub fn new(params: Params, num_atoms: usize, comm: C) -> Result<Self, ConfigError> {
        let Params {
            maxr, nhist, sigma, density, pbc, serial, neighbor_list,
            reference_gofr, average_gofr, output, use_rayon,
        } = params;

        if num_atoms < 2 {
            return Err(ConfigError::TooFewAtoms { num_atoms });
        }
        let grid = HistogramGrid::new(maxr, nhist)?;
        if !(sigma > 0.0) {
            return Err(ConfigError::NonPositive { what: "sigma", value: sigma });
        }
        if grid.bin_width() > sigma {
            return Err(ConfigError::BinTooLarge { bin_width: grid.bin_width(), sigma });
        }
        if let Some(density) = density {
            if !(density > 0.0) {
                return Err(ConfigError::NonPositive { what: "density", value: density });
            }
        }

        let kernel = GaussianKernel::new(sigma);
        let half_width = kernel.half_width_in_bins(grid.bin_width());
        let pair_cutoff = maxr + kernel.truncation_radius();

        let neighbor_list = match neighbor_list {
            None => None,
            Some(NeighborListParams { cutoff, stride }) => {
                let nl = NeighborList::new(cutoff, stride)?;
                // the cutoff a user would compute by hand may round a hair below ours
                if cutoff < pair_cutoff * (1.0 - CUTOFF_RTOL) {
                    return Err(ConfigError::CutoffTooSmall { cutoff, required: pair_cutoff });
                }
                Some(nl)
            },
        };

        if let Some(reference) = &reference_gofr {
            if reference.len() != nhist {
                return Err(ConfigError::ReferenceLength { expected: nhist, found: reference.len() });
            }
        }

        if let Some(output) = &output {
            if output.stride == 0 {
                return Err(ConfigError::ZeroStride { what: "output stride" });
            }
            if output.stride != 1 && !output.gofr && !output.integrand {
                return Err(ConfigError::OutputStrideWithoutOutput { stride: output.stride });
            }
        }

        info!("Pair entropy of {} particles", num_atoms);
        match pbc {
            true => info!("  using periodic boundary conditions"),
            false => info!("  without periodic boundary conditions"),
        }
        if let Some(nl) = &neighbor_list {
            info!("  using neighbor lists, updated every {} steps with cutoff {}", nl.stride(), nl.cutoff());
        }
        info!("  integrating over [0, {}] with the trapezoid rule on {} points", maxr, nhist);
        info!("  Gaussian kernel with deviation {}", sigma);
        match density {
            Some(density) => info!("  g(r) normalized with a density of {}", density),
            None => info!("  g(r) normalized with a density of N/V"),
        }
        if reference_gofr.is_some() {
            info!("  integrand relative to a reference g(r)");
        }
        if average_gofr {
            info!("  g(r) averaged over all frames");
        }
        if let Some(output) = &output {
            if output.gofr { info!("  writing g(r) to {}", output.dir.join(DiagnosticOutput::GOFR_FILENAME).display()); }
            if output.integrand { info!("  writing the integrand to {}", output.dir.join(DiagnosticOutput::INTEGRAND_FILENAME).display()); }
            if output.stride > 1 { info!("  output stride is {}", output.stride); }
        }
        if serial {
            info!("  running serially");
        }

        Ok(PairEntropy {
            comm, num_atoms, grid, kernel, half_width, pair_cutoff,
            density, pbc, serial, use_rayon, neighbor_list, output,
            reference: reference_gofr,
            running_mean: match average_gofr {
                true => Some(RunningMean::new(nhist)),
                false => None,
            },
            state: GofrState::new(nhist, num_atoms),
            integrand: vec![0.0; nhist],
        })
    }

    pub fn grid(&self) -> &HistogramGrid
    { &self.grid }

    pub fn comm(&self) -> &C
    { &self.comm }

    /// g(r) from the last frame (the running mean, if averaging).
    pub fn gofr(&self) -> &[f64]
    { self.state.gofr() }

    /// The integrand from the last frame.
    pub fn integrand(&self) -> &[f64]
    { &self.integrand }

    fn shard(&self) -> FailResult<Shard> {
        match self.serial {
            true => Ok(Shard::whole()),
            false => Shard::new(self.comm.rank(), self.comm.size()),
        }
    }

    /// Kernel contributions from this worker's pairs, in a fixed order.
    fn scan_pairs(&self, carts: &[V3], displacer: &Displacer, shard: Shard) -> Vec<PairTerms> {
        let grid = &self.grid;
        let kernel = &self.kernel;
        let half_width = self.half_width;
        let sq_cutoff = self.pair_cutoff * self.pair_cutoff;
        let terms = |from: usize, to: usize| {
            let disp = displacer.displacement(&carts[from], &carts[to]);
            PairTerms::compute(grid, kernel, half_width, sq_cutoff, (from, to), disp)
        };

        let nested: Vec<Vec<PairTerms>> = match &self.neighbor_list {
            Some(nl) => {
                // collected so that it implements IntoParallelIterator
                let pairs = nl.pairs().iter().collect::<Vec<_>>();
                CondIterator::new(pairs, self.use_rayon)
                    .map(|pair| terms(pair.from, pair.to).into_iter().collect::<Vec<_>>())
                    .collect()
            },
            None => {
                let n = carts.len();
                let rows = shard.owned(n).collect::<Vec<_>>();
                CondIterator::new(rows, self.use_rayon)
                    .map(|from| (from + 1..n).filter_map(|to| terms(from, to)).collect::<Vec<_>>())
                    .collect()
            },
        };
        nested.into_iter().flatten().collect()
    }

    /// Rank 0 writes the requested profiles on output steps.
    fn write_diagnostics(&self, step: u64) -> FailResult<()> {
        let output = match &self.output {
            Some(output) if step % output.stride == 0 && self.comm.rank() == 0 => output,
            _ => return Ok(()),
        };
        if output.gofr {
            let path = output.dir.join(DiagnosticOutput::GOFR_FILENAME);
            io::write_profile(&path, "gofr", self.grid.r(), self.state.gofr())?;
        }
        if output.integrand {
            let path = output.dir.join(DiagnosticOutput::INTEGRAND_FILENAME);
            io::write_profile(&path, "integrand", self.grid.r(), &self.integrand)?;
        }
        Ok(())
    }
}

impl<C: Communicator> Colvar for PairEntropy<C> {
    fn num_atoms(&self) -> usize
    { self.num_atoms }

    fn compute_value_and_gradient(&mut self, frame: &Frame<'_>) -> FailResult<FrameResult> {
        let num_atoms = self.num_atoms;
        let step = frame.step;
        let carts = frame.carts;
        if carts.len() != num_atoms {
            return Err(ConsistencyError::WrongAtomCount { step, expected: num_atoms, found: carts.len() }.into());
        }

        let displacer = match (self.pbc, frame.lattice) {
            (false, _) => Displacer::Direct,
            (true, Some(lattice)) => Displacer::new(Some(lattice)),
            (true, None) => return Err(ConsistencyError::MissingCell { step }.into()),
        };
        let density = match (self.density, frame.lattice) {
            (Some(density), _) => density,
            (None, Some(lattice)) => num_atoms as f64 / lattice.volume(),
            (None, None) => return Err(ConsistencyError::MissingCell { step }.into()),
        };
        let two_pi_density = 2.0 * PI * density;
        let shard = self.shard()?;

        if let Some(nl) = &mut self.neighbor_list {
            if nl.prepare(step, frame.exchange_step)? {
                nl.rebuild(carts, &displacer, shard)?;
            }
        }

        let pairs = self.scan_pairs(carts, &displacer, shard);
        self.state.reset();
        for pair in &pairs {
            self.state.accumulate(pair);
        }
        trace!("step {}: {} pairs within {}", step, pairs.len(), self.pair_cutoff);

        if !self.serial {
            let [gofr, prime, virial] = self.state.buffers_mut();
            self.comm.sum_in_place(gofr)?;
            self.comm.sum_in_place(prime)?;
            self.comm.sum_in_place(virial)?;
        }

        self.state.normalize(&self.grid, density);
        if let Some(mean) = &mut self.running_mean {
            // the gradient of the mean only sees the newest sample
            let weight = mean.fold(self.state.gofr_mut());
            self.state.scale_derivatives(weight);
        }

        let reference = self.reference.as_ref().map(|r| &r[..]);
        let r_sq = self.grid.r_sq();
        let Integrand { integrand, deriv_weights, first_resolved } = {
            Integrand::build(self.state.gofr(), reference, r_sq)
        };
        trace!("step {}: first resolved bin is {:?}", step, first_resolved);
        self.integrand = integrand;

        let nhist = self.grid.len();
        let dr = self.grid.bin_width();
        let value = -two_pi_density * trapezoid(&self.integrand, dr);

        let gradient = {
            let state = &self.state;
            let weights = &deriv_weights;
            // collected so that it implements IntoParallelIterator
            let atoms = shard.owned(num_atoms).collect::<Vec<_>>();
            let terms = CondIterator::new(atoms, self.use_rayon).map(|atom| {
                let integral = trapezoid_by(nhist, dr, |k| state.prime(k, atom) * weights[k]);
                (atom, integral * -two_pi_density)
            }).collect::<Vec<_>>();

            let mut gradient = vec![V3::zero(); num_atoms];
            for (atom, grad) in terms {
                gradient[atom] = grad;
            }
            if !self.serial {
                self.comm.sum_in_place(gradient.unvee_mut().flat_mut())?;
            }
            gradient
        };

        let mut virial = {
            let integral = trapezoid_by(nhist, dr, |k| self.state.virial(k) * deriv_weights[k]);
            integral * -two_pi_density
        };
        if self.density.is_none() {
            let volume_term = volume_virial_integrand(self.state.gofr(), reference, r_sq);
            virial += M33::eye() * (-two_pi_density * trapezoid(&volume_term, dr));
        }
        trace!("step {}: pair entropy {}", step, value);

        // Only rank 0 writes, so nothing past this point may be collective.
        self.write_diagnostics(step)?;

        Ok(FrameResult { value, gradient, virial })
    }
}
