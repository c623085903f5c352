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

use std::ops::{Add, Sub, Mul, Div, Neg};
use std::ops::{AddAssign, SubAssign, MulAssign, DivAssign};
use std::iter::Sum;

use crate::types::{V3, M33, M3};
use crate::methods_v::dot;

// Generates an operator for all four combinations of by-value and by-reference operands.
// The body sees both operands as references.
macro_rules! impl_binop {
    (
        impl $Trait:ident::$method:ident for ($A:ty, $B:ty) -> $Out:ty
        |$a:ident, $b:ident| $body:expr
    ) => {
        impl $Trait<$B> for $A {
            type Output = $Out;

            #[inline]
            fn $method(self, other: $B) -> $Out {
                let $a = &self;
                let $b = &other;
                $body
            }
        }

        impl<'a> $Trait<$B> for &'a $A {
            type Output = $Out;

            #[inline]
            fn $method(self, other: $B) -> $Out {
                let $a = self;
                let $b = &other;
                $body
            }
        }

        impl<'b> $Trait<&'b $B> for $A {
            type Output = $Out;

            #[inline]
            fn $method(self, other: &'b $B) -> $Out {
                let $a = &self;
                let $b = other;
                $body
            }
        }

        impl<'a, 'b> $Trait<&'b $B> for &'a $A {
            type Output = $Out;

            #[inline]
            fn $method(self, other: &'b $B) -> $Out {
                let $a = self;
                let $b = other;
                $body
            }
        }
    };
}

// Generates an assignment operator for by-value and by-reference right hand sides.
macro_rules! impl_assign_op {
    (
        impl $Trait:ident::$method:ident for ($A:ty, $B:ty)
        |$a:ident, $b:ident| $body:expr
    ) => {
        impl $Trait<$B> for $A {
            #[inline]
            fn $method(&mut self, other: $B) {
                let $a = self;
                let $b = &other;
                $body
            }
        }

        impl<'b> $Trait<&'b $B> for $A {
            #[inline]
            fn $method(&mut self, other: &'b $B) {
                let $a = self;
                let $b = other;
                $body
            }
        }
    };
}

// ---------------------------------------------------------------------------
// vectors

impl_binop!{ impl Add::add for (V3, V3) -> V3 |a, b| V3::from_fn(|k| a[k] + b[k]) }
impl_binop!{ impl Sub::sub for (V3, V3) -> V3 |a, b| V3::from_fn(|k| a[k] - b[k]) }
impl_binop!{ impl Mul::mul for (V3, f64) -> V3 |a, b| V3::from_fn(|k| a[k] * *b) }
impl_binop!{ impl Mul::mul for (f64, V3) -> V3 |a, b| V3::from_fn(|k| *a * b[k]) }
impl_binop!{ impl Div::div for (V3, f64) -> V3 |a, b| V3::from_fn(|k| a[k] / *b) }

impl_assign_op!{ impl AddAssign::add_assign for (V3, V3) |a, b| { *a = *a + b; } }
impl_assign_op!{ impl SubAssign::sub_assign for (V3, V3) |a, b| { *a = *a - b; } }
impl_assign_op!{ impl MulAssign::mul_assign for (V3, f64) |a, b| { *a = *a * b; } }
impl_assign_op!{ impl DivAssign::div_assign for (V3, f64) |a, b| { *a = *a / b; } }

impl Neg for V3 {
    type Output = V3;

    #[inline]
    fn neg(self) -> V3 { V3::from_fn(|k| -self[k]) }
}

impl<'a> Neg for &'a V3 {
    type Output = V3;

    #[inline]
    fn neg(self) -> V3 { -*self }
}

impl Sum for V3 {
    fn sum<I: Iterator<Item=V3>>(iter: I) -> V3 { iter.fold(V3::zero(), |acc, v| acc + v) }
}

impl<'a> Sum<&'a V3> for V3 {
    fn sum<I: Iterator<Item=&'a V3>>(iter: I) -> V3 { iter.fold(V3::zero(), |acc, v| acc + v) }
}

// ---------------------------------------------------------------------------
// matrices

impl_binop!{ impl Add::add for (M33, M33) -> M33 |a, b| M3([a[0] + b[0], a[1] + b[1], a[2] + b[2]]) }
impl_binop!{ impl Sub::sub for (M33, M33) -> M33 |a, b| M3([a[0] - b[0], a[1] - b[1], a[2] - b[2]]) }
impl_binop!{ impl Mul::mul for (M33, f64) -> M33 |a, b| M3([a[0] * *b, a[1] * *b, a[2] * *b]) }
impl_binop!{ impl Mul::mul for (f64, M33) -> M33 |a, b| M3([*a * b[0], *a * b[1], *a * b[2]]) }
impl_binop!{ impl Div::div for (M33, f64) -> M33 |a, b| M3([a[0] / *b, a[1] / *b, a[2] / *b]) }

impl_assign_op!{ impl AddAssign::add_assign for (M33, M33) |a, b| { *a = *a + b; } }
impl_assign_op!{ impl SubAssign::sub_assign for (M33, M33) |a, b| { *a = *a - b; } }
impl_assign_op!{ impl MulAssign::mul_assign for (M33, f64) |a, b| { *a = *a * b; } }
impl_assign_op!{ impl DivAssign::div_assign for (M33, f64) |a, b| { *a = *a / b; } }

impl Neg for M33 {
    type Output = M33;

    #[inline]
    fn neg(self) -> M33 { M3([-self[0], -self[1], -self[2]]) }
}

impl Sum for M33 {
    fn sum<I: Iterator<Item=M33>>(iter: I) -> M33 { iter.fold(M33::zero(), |acc, m| acc + m) }
}

impl<'a> Sum<&'a M33> for M33 {
    fn sum<I: Iterator<Item=&'a M33>>(iter: I) -> M33 { iter.fold(M33::zero(), |acc, m| acc + m) }
}

// ---------------------------------------------------------------------------
// products

// row vector times matrix
impl_binop!{
    impl Mul::mul for (V3, M33) -> V3
    |v, m| V3::from_fn(|c| v[0] * m[0][c] + v[1] * m[1][c] + v[2] * m[2][c])
}

// matrix times column vector
impl_binop!{ impl Mul::mul for (M33, V3) -> V3 |m, v| V3::from_fn(|r| dot(&m[r], v)) }

// matrix times matrix
impl_binop!{ impl Mul::mul for (M33, M33) -> M33 |a, b| M3([a[0] * b, a[1] * b, a[2] * b]) }

#[cfg(test)]
#[deny(unused)]
mod tests {
    use crate::*;

    #[test]
    fn multiplication_order() {
        // a matrix not equal to its transpose
        let m = mat::from_array([
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 0.0],
        ]);
        let x = V3([1.0, 0.0, 0.0]);

        assert_eq!(x * m, V3([0.0, 1.0, 0.0]));
        assert_eq!(m * x, V3([0.0, 0.0, 1.0]));
        assert_eq!(&x * &m, x * m.t().t());
        assert_eq!((m * m) * x, m * (m * x));
    }

    #[test]
    fn assign_ops_agree_with_binops() {
        let a = V3([1.0, -2.0, 0.5]);
        let b = V3([0.25, 4.0, 3.0]);

        let mut c = a;
        c += b;
        c -= 2.0 * b;
        c *= 3.0;
        c /= 2.0;
        assert_eq!(c, (a - b) * 3.0 / 2.0);

        let mut m = outer(&a, &b);
        m += outer(&b, &a);
        assert_eq!(m, m.t());
        assert_eq!(vec![a, b].iter().sum::<V3>(), a + b);
        assert_eq!(-m + m, M33::zero());
    }
}
