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

//! Fixed-size 3D vector and 3x3 matrix types.
//!
//! This library uses a row-based formalism; a matrix is a container of row vectors,
//! and most vector-matrix products put the vector on the left (`v * m`).

#[cfg(test)]
#[macro_use]
extern crate rsp2_assert_close;

pub use crate::types::*;
pub use crate::methods_v::{dot, cross, outer};
pub use crate::methods_m::{inv, mat};
pub use crate::conv::{Envee, Unvee};

mod types;
mod ops;
mod methods_v;
mod methods_m;
mod conv;
mod close;
