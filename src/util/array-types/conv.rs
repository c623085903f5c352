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

use crate::types::{V3, M3};

/// Zero-cost transformations from slices of arrays into slices of `V3`s and `M33`s.
///
/// Both `V3` and `M3` are `#[repr(transparent)]`, so these casts preserve layout.
pub trait Envee {
    type En: ?Sized;

    /// Borrow a sequence of arrays as `V3`/`M33`s.
    fn envee_ref(&self) -> &Self::En;

    /// Mutably borrow a sequence of arrays as `V3`/`M33`s.
    fn envee_mut(&mut self) -> &mut Self::En;
}

/// Zero-cost transformations from slices of `V3`s and `M33`s into slices of arrays.
pub trait Unvee {
    type Un: ?Sized;

    /// Borrow a sequence of `V3`/`M33`s as arrays.
    fn unvee_ref(&self) -> &Self::Un;

    /// Mutably borrow a sequence of `V3`/`M33`s as arrays.
    fn unvee_mut(&mut self) -> &mut Self::Un;
}

macro_rules! impl_slice_casts {
    ($Array:ty => $Wrapped:ty) => {
        impl Envee for [$Array] {
            type En = [$Wrapped];

            #[inline(always)]
            fn envee_ref(&self) -> &[$Wrapped]
            { unsafe { &*(self as *const [$Array] as *const [$Wrapped]) } }

            #[inline(always)]
            fn envee_mut(&mut self) -> &mut [$Wrapped]
            { unsafe { &mut *(self as *mut [$Array] as *mut [$Wrapped]) } }
        }

        impl Unvee for [$Wrapped] {
            type Un = [$Array];

            #[inline(always)]
            fn unvee_ref(&self) -> &[$Array]
            { unsafe { &*(self as *const [$Wrapped] as *const [$Array]) } }

            #[inline(always)]
            fn unvee_mut(&mut self) -> &mut [$Array]
            { unsafe { &mut *(self as *mut [$Wrapped] as *mut [$Array]) } }
        }
    };
}

impl_slice_casts!{ [f64; 3] => V3 }
impl_slice_casts!{ [[f64; 3]; 3] => M3<V3> }
