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

//! Matrices are conceptually understood to be containers of row-vectors.

use crate::types::{V3, M3, M33};
use crate::methods_v::{cross, dot};

impl M33 {
    #[inline(always)]
    pub fn zero() -> Self { M3([V3::zero(); 3]) }

    /// Construct the identity matrix.
    #[inline(always)]
    pub fn eye() -> Self { M33::from_fn(|r, c| if r == c { 1.0 } else { 0.0 }) }

    /// Construct a matrix from a function of `(row, col)`.
    #[inline(always)]
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> f64) -> Self
    { M3([V3::from_fn(|c| f(0, c)), V3::from_fn(|c| f(1, c)), V3::from_fn(|c| f(2, c))]) }

    /// Matrix transpose.
    #[inline(always)]
    pub fn t(&self) -> Self { M33::from_fn(|r, c| self[c][r]) }

    /// Matrix determinant.
    #[inline(always)]
    pub fn det(&self) -> f64 { dot(&self[0], &cross(&self[1], &self[2])) }

    #[inline(always)]
    pub fn trace(&self) -> f64 { self[0][0] + self[1][1] + self[2][2] }

    /// Apply a function to each element.
    #[inline(always)]
    pub fn map(self, mut f: impl FnMut(f64) -> f64) -> Self
    { M3([self[0].map(&mut f), self[1].map(&mut f), self[2].map(&mut f)]) }

    /// Test whether all off-diagonal elements are exactly zero.
    #[inline(always)]
    pub fn is_diagonal(&self) -> bool {
        (0..3).all(|r| (0..3).all(|c| r == c || self[r][c] == 0.0))
    }
}

/// Matrix inverse.
///
/// A singular matrix produces infinities and NaNs.
pub fn inv(m: &M33) -> M33 {
    // the columns of the inverse are the cross products of pairs of rows
    let cols = M3([
        cross(&m[1], &m[2]),
        cross(&m[2], &m[0]),
        cross(&m[0], &m[1]),
    ]);
    cols.t() / m.det()
}

/// Free-function constructors, for when type inference needs a push.
pub mod mat {
    use super::*;

    /// Construct a matrix from a 2D array of rows.
    #[inline(always)]
    pub fn from_array(arr: [[f64; 3]; 3]) -> M33
    { M3([V3(arr[0]), V3(arr[1]), V3(arr[2])]) }

    #[inline(always)]
    pub fn eye() -> M33 { M33::eye() }

    /// Construct a diagonal matrix.
    #[inline(always)]
    pub fn diag(d: [f64; 3]) -> M33
    { M33::from_fn(|r, c| if r == c { d[r] } else { 0.0 }) }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use crate::*;

    #[test]
    fn get_inverse() {
        // matrix whose inverse should be able to be computed exactly
        // by any reasonable matrix inversion algorithm working on f64s
        let matrix = mat::from_array([
            [2.0, 2.0, 0.0],
            [0.0, 4.0, 0.0],
            [0.0, 0.0, 2.0],
        ]);
        let exact_inverse = mat::from_array([
            [0.5, -0.25, 0.0],
            [0.0,  0.25, 0.0],
            [0.0,   0.0, 0.5],
        ]);
        assert_eq!(inv(&matrix), exact_inverse);
        assert_eq!(matrix.det(), 16.0);
        assert_eq!(matrix * exact_inverse, M33::eye());
    }

    #[test]
    fn skewed_inverse() {
        let matrix = mat::from_array([
            [1.0, 0.3, -0.2],
            [0.1, 2.0, 0.4],
            [-0.5, 0.2, 1.5],
        ]);
        assert_close!(abs=1e-12, matrix * inv(&matrix), M33::eye());
        assert_close!(abs=1e-12, inv(&matrix) * matrix, M33::eye());
        assert_close!(rel=1e-12, matrix.t().det(), matrix.det());
    }

    #[test]
    fn diagonal_detection() {
        assert!(mat::diag([1.0, 2.0, 3.0]).is_diagonal());
        assert!(!mat::from_array([[1.0, 0.0, 0.0], [0.0, 1.0, 1e-9], [0.0, 0.0, 1.0]]).is_diagonal());
        assert_eq!(mat::diag([1.0, 2.0, 3.0]).trace(), 6.0);
    }
}
