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

//! Approximate equality assertions for floating point data.
//!
//! ```ignore
//! assert_close!(energy, expected);
//! assert_close!(rel=1e-8, abs=1e-12, &gradient, &numerical_gradient);
//! assert_close!(abs=1e-10, virial, M33::zero(), "virial of {} atoms", n);
//! ```
//!
//! Containers are compared elementwise, and a failure reports the index of the
//! first offending element (e.g. `[7][2]` for component 2 of atom 7 of a gradient).

#[macro_use]
extern crate failure;

use std::fmt;

pub const DEFAULT_NONZERO_TOL: f64 = 1e-9;

#[macro_export]
macro_rules! assert_close {
    (@tol [$tol:expr] rel=$rel:expr, $($rest:tt)*) => {
        $crate::assert_close!(@tol [$tol.with_rel($rel)] $($rest)*)
    };
    (@tol [$tol:expr] abs=$abs:expr, $($rest:tt)*) => {
        $crate::assert_close!(@tol [$tol.with_abs($abs)] $($rest)*)
    };
    (@tol [$tol:expr] $a:expr, $b:expr $(,)?) => {
        $crate::__assert_close($tol, &$a, &$b, format_args!("not nearly equal!"))
    };
    (@tol [$tol:expr] $a:expr, $b:expr, $($fmt:tt)+) => {
        $crate::__assert_close($tol, &$a, &$b, format_args!($($fmt)+))
    };
    ($($t:tt)*) => {
        $crate::assert_close!(@tol [$crate::Tolerances::default()] $($t)*)
    };
}

#[macro_export]
macro_rules! debug_assert_close {
    ($($t:tt)*) => {{
        #[cfg(debug_assertions)] {
            $crate::assert_close!{$($t)*}
        }
    }};
}

#[doc(hidden)]
#[track_caller]
pub fn __assert_close<A, B>(tol: Tolerances, a: &A, b: &B, message: fmt::Arguments<'_>)
where
    A: ?Sized + CheckClose<B> + fmt::Debug,
    B: ?Sized + fmt::Debug,
    A::Scalar: fmt::Debug,
{
    if let Err(e) = a.check_close(b, tol) {
        panic!(
            "{} (tolerances: rel={}, abs={})\n left: {:?}\nright: {:?}\n{}",
            message, tol.rel, tol.abs, a, b, e,
        );
    }
}

/// Test whether two floats agree to within either tolerance.
///
/// Infinities are only close to themselves; NaN is close to nothing.
pub fn is_close(a: f64, b: f64, Tolerances { abs, rel }: Tolerances) -> bool {
    assert!(rel >= 0.0);
    assert!(abs >= 0.0);

    if a == b { return true; }
    if a.is_infinite() || b.is_infinite() { return false; }

    let scale = f64::max(a.abs(), b.abs());
    (a - b).abs() < f64::max(abs, rel * scale)
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tolerances<T = f64> {
    pub abs: T,
    pub rel: T,
}

/// A relative tolerance of `DEFAULT_NONZERO_TOL` and no absolute tolerance.
impl Default for Tolerances {
    fn default() -> Self
    { Tolerances { abs: 0.0, rel: DEFAULT_NONZERO_TOL } }
}

impl<T> Tolerances<T> {
    pub fn with_abs(self, abs: T) -> Self
    { Tolerances { abs, ..self } }

    pub fn with_rel(self, rel: T) -> Self
    { Tolerances { rel, ..self } }
}

#[derive(Debug, Fail)]
pub struct CheckCloseError<T: fmt::Debug + Send + Sync + 'static = f64> {
    pub values: (T, T),
    pub tol: Tolerances<T>,
    /// Indices leading to the failing element, outermost first.
    pub location: Vec<usize>,
}

impl<T: fmt::Debug + Send + Sync + 'static> CheckCloseError<T> {
    // containers call this on the way out, so indices arrive innermost first
    fn within(mut self, index: usize) -> Self {
        self.location.insert(0, index);
        self
    }
}

impl<T: fmt::Debug + Send + Sync + 'static> fmt::Display for CheckCloseError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (left, right) = &self.values;
        write!(f, "failed at:")?;
        for index in &self.location {
            write!(f, "[{}]", index)?;
        }
        write!(f, "\n  left: {:?}\n right: {:?}\n   tol: {:?}", left, right, self.tol)
    }
}

pub trait CheckClose<Rhs: ?Sized = Self> {
    type Scalar: fmt::Debug + Send + Sync + 'static;

    /// Test that all values of self and other are close.
    fn check_close(&self, other: &Rhs, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>;
}

impl CheckClose for f64 {
    type Scalar = f64;

    #[inline]
    fn check_close(&self, other: &f64, tol: Tolerances) -> Result<(), CheckCloseError>
    {
        match is_close(*self, *other, tol) {
            true => Ok(()),
            false => Err(CheckCloseError { values: (*self, *other), tol, location: vec![] }),
        }
    }
}

impl<'a, T: ?Sized + CheckClose> CheckClose for &'a T {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { (**self).check_close(*other, tol) }
}

impl<T: CheckClose> CheckClose for [T] {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    {
        assert_eq!(self.len(), other.len(), "length mismatch in check_close");
        for (index, (a, b)) in self.iter().zip(other).enumerate() {
            a.check_close(b, tol).map_err(|e| e.within(index))?;
        }
        Ok(())
    }
}

impl<T: CheckClose> CheckClose for Vec<T> {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { self[..].check_close(&other[..], tol) }
}

impl<T: CheckClose> CheckClose<[T]> for Vec<T> {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &[T], tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { self[..].check_close(other, tol) }
}

impl<T: CheckClose> CheckClose<Vec<T>> for [T] {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Vec<T>, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { self.check_close(&other[..], tol) }
}

impl<T: CheckClose, const N: usize> CheckClose for [T; N] {
    type Scalar = T::Scalar;

    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { self[..].check_close(&other[..], tol) }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn macro_forms() {
        assert_close!(1.0, 1.0);
        assert_close!(abs=1e-8, 1.0, 1.0);
        assert_close!(rel=1e-8, abs=1e-8, 1.0, 1.0);
        assert_close!(abs=1e-8, rel=1e-8, 1.0, 1.0,);
        assert_close!(1.0, 1.0, "with a message about {}", "something");
        debug_assert_close!(abs=1e-10, 1.0, 1.0);

        // a match arm needs an expression
        match Some(2.0) {
            Some(x) => assert_close!(x, 2.0),
            None => {},
        }
    }

    #[test]
    fn method_chains_are_not_tolerances() {
        #[derive(Debug)] struct S;
        impl S { fn x(self) -> S { self } }
        impl CheckClose for S {
            type Scalar = f64;
            fn check_close(&self, _: &S, _: Tolerances) -> Result<(), CheckCloseError> { Ok(()) }
        }
        assert_close!(abs=1e-10, S.x().x(), S.x().x());
        assert_close!(abs=1e-10, S.x().x(), S.x().x(), "{}", "hello");
    }

    #[test]
    fn tolerances() {
        let tol = Tolerances::default().with_abs(1e-3);
        assert_eq!(tol, Tolerances { abs: 1e-3, rel: DEFAULT_NONZERO_TOL });

        assert!(is_close(1e10, 1e10 + 1.0, Tolerances { abs: 0.0, rel: 1e-9 }));
        assert!(!is_close(0.0, 1e-20, Tolerances { abs: 0.0, rel: 1e-9 }));
        assert!(is_close(0.0, 1e-20, Tolerances { abs: 1e-12, rel: 0.0 }));
        assert!(is_close(std::f64::INFINITY, std::f64::INFINITY, tol));
        assert!(!is_close(std::f64::NAN, std::f64::NAN, tol));
    }

    #[test]
    fn failures_report_where() {
        let tol = Tolerances { abs: 1e-8, rel: 0.0 };
        let a = vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let mut b = a.clone();
        b[1][2] = 6.1;

        let err = a.check_close(&b, tol).unwrap_err();
        assert_eq!(err.location, vec![1, 2]);
        assert_eq!(err.values, (6.0, 6.1));
        assert!(err.to_string().starts_with("failed at:[1][2]"));
        assert!(a.check_close(&a, tol).is_ok());

    }

    #[test]
    #[should_panic(expected = "not nearly equal")]
    fn not_close() {
        assert_close!(abs=0.0, rel=0.0, vec![1.0], vec![1.1]);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic)]
    fn debug_not_close() {
        debug_assert_close!(abs=0.0, rel=0.0, 1.0, 1.1);
    }
}
