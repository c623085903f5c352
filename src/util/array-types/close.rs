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

use rsp2_assert_close::{CheckClose, CheckCloseError, Tolerances};

use crate::types::{V3, M3};

impl<X: CheckClose> CheckClose for V3<X> {
    type Scalar = X::Scalar;

    #[inline]
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { self.0.check_close(&other.0, tol) }
}

impl<V: CheckClose> CheckClose for M3<V> {
    type Scalar = V::Scalar;

    #[inline]
    fn check_close(&self, other: &Self, tol: Tolerances) -> Result<(), CheckCloseError<Self::Scalar>>
    { self.0.check_close(&other.0, tol) }
}
