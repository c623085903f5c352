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

//! Utilities for numeric differentiation.
//!
//! These are publicly exported so that code which defines or consumes colvars
//! can check the analytic gradients and virials against finite differences.

use rsp2_array_types::{V3, M33};
use rsp2_structure::Lattice;

/// Approximation method for a numerical 1D derivative.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DerivativeKind {
    /// n-point stencil. `n` must be odd. Only implemented for `n = 3, 5, 7, 9`.
    Stencil(u32),
}

impl DerivativeKind {
    /// Alias for `DerivativeKind::Stencil(3)`.
    #[allow(bad_style)]
    pub const CentralDifference: Self = DerivativeKind::Stencil(3);
}

impl Default for DerivativeKind {
    fn default() -> DerivativeKind {
        DerivativeKind::Stencil(5)
    }
}

enum Never {}

/// Compute a numerical derivative using finite differences.
pub fn slope(
    interval_width: f64,
    kind: Option<DerivativeKind>,
    point: f64,
    mut value_fn: impl FnMut(f64) -> f64,
) -> f64 {
    try_slope::<Never, _>(interval_width, kind, point, |x| Ok(value_fn(x)))
        .unwrap_or_else(|e| match e {})
}

#[inline(always)]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    ::itertools::zip_eq(a, b).map(|(&a, &b)| a * b).sum()
}

macro_rules! stencil_sum {
    ($value_fn:expr, $point:expr, $step:expr, [
        $((offset: $sign:tt $offset:expr, coeff: $(+)?$coeff:expr),)*
    ]) => {{
        let mut value_fn = $value_fn;
        let point = $point;
        let step = $step;
        let values = [
            $(value_fn(point $sign $offset * step)?,)+
        ];
        let coeffs = [$($coeff),*];
        dot(&values, &coeffs)
    }};
}

/// `slope` for functions that can fail.
pub fn try_slope<E, F>(
    step: f64,
    kind: Option<DerivativeKind>,
    point: f64,
    value_fn: F,
) -> Result<f64, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    // http://www.holoborodko.com/pavel/numerical-methods/numerical-derivative/central-differences/
    match kind.unwrap_or_default() {
        DerivativeKind::Stencil(3) => {
            let numer = stencil_sum!(value_fn, point, step, [
                (offset: -1.0, coeff: -1.0),
                (offset: +1.0, coeff: +1.0),
            ]);
            let denom = 2.0 * step;
            Ok(numer / denom)
        },

        DerivativeKind::Stencil(5) => {
            let numer = stencil_sum!(value_fn, point, step, [
                (offset: -2.0, coeff: +1.0),
                (offset: -1.0, coeff: -8.0),
                (offset: +1.0, coeff: +8.0),
                (offset: +2.0, coeff: -1.0),
            ]);
            let denom = 12.0 * step;
            Ok(numer / denom)
        },

        DerivativeKind::Stencil(7) => {
            let numer = stencil_sum!(value_fn, point, step, [
                (offset: -3.0, coeff: -1.0),
                (offset: -2.0, coeff: +9.0),
                (offset: -1.0, coeff: -45.0),
                (offset: +1.0, coeff: +45.0),
                (offset: +2.0, coeff: -9.0),
                (offset: +3.0, coeff: +1.0),
            ]);
            let denom = 60.0 * step;
            Ok(numer / denom)
        },

        DerivativeKind::Stencil(9) => {
            let numer = stencil_sum!(value_fn, point, step, [
                (offset: -4.0, coeff: +3.0),
                (offset: -3.0, coeff: -32.0),
                (offset: -2.0, coeff: +168.0),
                (offset: -1.0, coeff: -672.0),
                (offset: +1.0, coeff: +672.0),
                (offset: +2.0, coeff: -168.0),
                (offset: +3.0, coeff: +32.0),
                (offset: +4.0, coeff: -3.0),
            ]);
            let denom = 840.0 * step;
            Ok(numer / denom)
        },

        DerivativeKind::Stencil(n@0) |
        DerivativeKind::Stencil(n@1) |
        DerivativeKind::Stencil(n) if n % 2 == 0 => {
            panic!("{}-point stencil does not exist", n);
        },

        DerivativeKind::Stencil(n) => {
            panic!("{}-point stencil is not implemented", n);
        },
    }
}

/// Numerically compute the gradient of a function of cartesian positions.
///
/// This independently performs a slope check along each axis of each particle,
/// so it makes `6 * carts.len()` or more function calls.
pub fn cart_gradient<E, F>(
    interval_width: f64,
    kind: Option<DerivativeKind>,
    carts: &[V3],
    mut value_fn: F,
) -> Result<Vec<V3>, E>
where
    F: FnMut(&[V3]) -> Result<f64, E>,
{
    let kind = kind.unwrap_or_default();
    let mut point = carts.to_vec();
    let mut out = Vec::with_capacity(carts.len());
    for atom in 0..carts.len() {
        let mut grad = V3::zero();
        for axis in 0..3 {
            let center = carts[atom][axis];
            grad[axis] = try_slope(interval_width, Some(kind), center, |x| {
                point[atom][axis] = x;
                value_fn(&point)
            })?;
            point[atom][axis] = center; // reset modifications
        }
        out.push(grad);
    }
    Ok(out)
}

/// Numerically compute the virial of a function of a periodic structure.
///
/// Every cartesian vector (positions and cell vectors alike) is deformed as
/// `x -> x (I + ε)`, and the result is `-∂f/∂ε` at `ε = 0`.
pub fn virial<E, F>(
    interval_width: f64,
    kind: Option<DerivativeKind>,
    lattice: &Lattice,
    carts: &[V3],
    mut value_fn: F,
) -> Result<M33, E>
where
    F: FnMut(&Lattice, &[V3]) -> Result<f64, E>,
{
    let kind = kind.unwrap_or_default();
    let mut out = M33::zero();
    for r in 0..3 {
        for c in 0..3 {
            let d_value = try_slope(interval_width, Some(kind), 0.0, |eps| {
                let mut deformation = M33::eye();
                deformation[r][c] += eps;

                let lattice = lattice.deformed_by(&deformation);
                let carts = carts.iter().map(|x| x * &deformation).collect::<Vec<_>>();
                value_fn(&lattice, &carts)
            })?;
            out[r][c] = -d_value;
        }
    }
    Ok(out)
}

//---------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // coefficients in increasing order of power
    fn random_poly(degree: u32) -> Vec<f64> {
        (0..=degree).map(|_| 4.0 * ::rand::random::<f64>() - 2.0).collect()
    }

    fn evaluate(poly: &[f64], x: f64) -> f64 {
        poly.iter().rev().fold(0.0, |acc, &c| acc * x + c)
    }

    fn derivative(poly: &[f64]) -> Vec<f64> {
        poly.iter().enumerate().skip(1).map(|(p, &c)| p as f64 * c).collect()
    }

    #[test]
    fn num_diff() {
        for n in vec![3, 5, 7, 9] {
            for _ in 0..10 {
                // n-point stencil is exact for polynomials up to order n-1
                let poly = random_poly(n - 1);
                let x = 20.0 * ::rand::random::<f64>() - 10.0;

                let expected = evaluate(&derivative(&poly), x);
                let actual = slope(1e-1, Some(DerivativeKind::Stencil(n)), x, |x| evaluate(&poly, x));
                assert_close!(abs=1e-8, rel=1e-8, expected, actual, "{}-point", n);
            }
        }
    }

    #[test]
    fn cart_gradient_of_sum_of_squares() {
        let carts = vec![V3([1.0, -2.0, 0.5]), V3([0.0, 3.0, -1.5])];
        let grad = cart_gradient::<Never, _>(1e-3, None, &carts, |carts| {
            Ok(carts.iter().map(|x| x.sqnorm()).sum())
        }).unwrap_or_else(|e| match e {});

        for (g, x) in grad.iter().zip(&carts) {
            assert_close!(abs=1e-9, *g, x * 2.0);
        }
    }

    #[test]
    fn virial_of_volume() {
        // d(det(L(I + ε)))/dε = det(L) I, so the virial is -V I
        let lattice = Lattice::orthorhombic(2.0, 3.0, 4.0);
        let out = virial::<Never, _>(1e-4, None, &lattice, &[], |lattice, _| {
            Ok(lattice.volume())
        }).unwrap_or_else(|e| match e {});

        assert_close!(abs=1e-7, out, M33::eye() * -24.0);
    }
}
