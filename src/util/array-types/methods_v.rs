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

use crate::types::{V3, M3, M33};

impl<X> V3<X> {
    /// Construct a vector from a function on indices.
    #[inline(always)]
    pub fn from_fn(mut f: impl FnMut(usize) -> X) -> Self
    { V3([f(0), f(1), f(2)]) }

    /// Apply a function to each element.
    #[inline(always)]
    pub fn map<B>(self, mut f: impl FnMut(X) -> B) -> V3<B>
    {
        let V3([a, b, c]) = self;
        V3([f(a), f(b), f(c)])
    }
}

impl V3 {
    #[inline(always)]
    pub fn zero() -> Self { V3([0.0; 3]) }

    /// Vector dot product.
    #[inline(always)]
    pub fn dot(&self, other: &V3) -> f64 { dot(self, other) }

    /// Square of the Euclidean norm.
    #[inline(always)]
    pub fn sqnorm(&self) -> f64 { dot(self, self) }

    /// Euclidean norm.
    #[inline(always)]
    pub fn norm(&self) -> f64 { self.sqnorm().sqrt() }

    /// Normalized vector.
    ///
    /// The zero vector produces NaNs.
    #[inline(always)]
    pub fn unit(&self) -> V3 { *self / self.norm() }

    #[inline(always)]
    pub fn cross(&self, other: &V3) -> V3 { cross(self, other) }

    /// Round each element to the nearest integer (as a float).
    #[inline(always)]
    pub fn round(&self) -> V3 { self.map(f64::round) }
}

/// Vector dot product.
#[inline(always)]
pub fn dot(a: &V3, b: &V3) -> f64
{ a[0] * b[0] + a[1] * b[1] + a[2] * b[2] }

/// Vector cross product.
#[inline(always)]
pub fn cross(a: &V3, b: &V3) -> V3
{
    V3([
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ])
}

/// Outer product `a ⊗ b`, i.e. the matrix with elements `a[r] * b[c]`.
#[inline(always)]
pub fn outer(a: &V3, b: &V3) -> M33
{ M3([b * a[0], b * a[1], b * a[2]]) }

#[cfg(test)]
#[deny(unused)]
mod tests {
    use crate::*;

    #[test]
    fn cross_is_orthogonal() {
        let a = V3([1.0, 2.0, 3.0]);
        let b = V3([-4.0, 0.5, 2.0]);
        let c = cross(&a, &b);
        assert_close!(abs=1e-12, dot(&a, &c), 0.0);
        assert_close!(abs=1e-12, dot(&b, &c), 0.0);
        assert_eq!(cross(&V3([1.0, 0.0, 0.0]), &V3([0.0, 1.0, 0.0])), V3([0.0, 0.0, 1.0]));
    }

    #[test]
    fn outer_convention() {
        let a = V3([1.0, 2.0, 3.0]);
        let b = V3([5.0, 7.0, 11.0]);
        let m = outer(&a, &b);
        assert_eq!(m[1][2], a[1] * b[2]);
        assert_eq!(m[2][0], a[2] * b[0]);
        // (a ⊗ b) c == a (b · c)
        let c = V3([0.5, -1.0, 2.0]);
        assert_close!(m * c, a * dot(&b, &c));
    }
}
