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

//! Geometry of particles in a (possibly) periodic cell.
//!
//! The cell is described by a [`Lattice`] whose rows are the cell vectors.
//! Displacements between particles are resolved by a [`Displacer`], which either
//! takes direct differences or finds the minimum image under the lattice.

#[macro_use] extern crate failure;
#[macro_use] extern crate log;
#[cfg_attr(test, macro_use)] extern crate rsp2_assert_close;

pub type FailResult<T> = Result<T, failure::Error>;

mod core;
mod algo;

//---------------------------
// public reexports; API

pub use crate::core::lattice::Lattice;
pub use crate::core::coords::Coords;

pub use crate::algo::nearest_image::{Displacer, NearestImageFinder};
pub use crate::algo::pairs::{Pair, PairList, Shard};
