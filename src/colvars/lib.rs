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

//! Collective variables: differentiable functions of particle positions and the cell.
//!
//! The one implemented here is the pair entropy, an order parameter built from a
//! kernel-smoothed radial distribution function.  See [`PairEntropy`].
//!
//! Every colvar produces its value together with its analytic gradient with respect to
//! each particle position, and a virial (the negative derivative with respect to a
//! homogeneous deformation of the cell).

#[macro_use] extern crate failure;
#[macro_use] extern crate log;
#[cfg_attr(test, macro_use)] extern crate rsp2_assert_close;

pub type FailResult<T> = Result<T, failure::Error>;

use rsp2_array_types::{V3, M33};
use rsp2_structure::Lattice;

pub mod comm;
pub mod numerical;
mod group;
mod pair_entropy;

pub use crate::comm::{Communicator, SerialComm, ThreadComm};
#[cfg(feature = "mpi-support")]
pub use crate::comm::MpiComm;

pub use crate::group::ParticleGroup;

pub use crate::pair_entropy::{
    PairEntropy, Params, NeighborListParams, DiagnosticOutput,
    ConfigError, ConsistencyError,
    GaussianKernel, HistogramGrid, NeighborList,
    trapezoid, trapezoid_by, Integrable,
    read_reference_gofr, parse_reference_gofr,
    TRUNCATION_SIGMAS, GOFR_FLOOR,
};

/// The input for one step of a simulation.
#[derive(Debug, Copy, Clone)]
pub struct Frame<'a> {
    /// Cartesian positions of the participating particles.
    pub carts: &'a [V3],
    /// The periodic cell, if there is one.
    pub lattice: Option<&'a Lattice>,
    /// Monotonically increasing step counter.
    pub step: u64,
    /// Set on steps where particle identities may have changed discontinuously
    /// (e.g. replica exchange).
    pub exchange_step: bool,
}

/// The output for one step of a simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameResult {
    pub value: f64,
    /// Derivative of the value with respect to each particle position.
    pub gradient: Vec<V3>,
    /// Negative derivative of the value with respect to a homogeneous deformation
    /// `x -> x (I + ε)` of every cartesian vector, including the cell vectors.
    pub virial: M33,
}

/// A differentiable function of particle positions and the cell.
pub trait Colvar {
    /// Number of particles expected in each frame.
    fn num_atoms(&self) -> usize;

    fn compute_value_and_gradient(&mut self, frame: &Frame<'_>) -> FailResult<FrameResult>;
}
