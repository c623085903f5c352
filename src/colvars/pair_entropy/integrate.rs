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

use rsp2_array_types::{V3, M33};

use std::ops::{AddAssign, Mul};

/// Things that can be integrated by the trapezoid rule.
pub trait Integrable: Copy + AddAssign + Mul<f64, Output=Self> {
    fn zero() -> Self;
}

impl Integrable for f64 {
    fn zero() -> Self { 0.0 }
}

impl Integrable for V3 {
    fn zero() -> Self { V3::zero() }
}

impl Integrable for M33 {
    fn zero() -> Self { M33::zero() }
}

/// Trapezoid rule on evenly spaced samples.
///
/// Fewer than two samples integrate to zero.
pub fn trapezoid<T: Integrable>(samples: &[T], spacing: f64) -> T
{ trapezoid_by(samples.len(), spacing, |i| samples[i]) }

/// Trapezoid rule on evenly spaced samples produced on demand, in order.
pub fn trapezoid_by<T: Integrable>(len: usize, spacing: f64, mut sample: impl FnMut(usize) -> T) -> T {
    if len < 2 {
        return T::zero();
    }

    let mut sum = T::zero();
    for i in 1..len - 1 {
        sum += sample(i);
    }
    sum += sample(0) * 0.5;
    sum += sample(len - 1) * 0.5;
    sum * spacing
}
