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

use crate::Lattice;

use rsp2_array_types::V3;

/// Cartesian positions of particles, with an optional periodic cell.
///
/// A `Coords` without a lattice describes a cluster in open space; all distances
/// between its particles are direct differences.
#[derive(Debug, Clone, PartialEq)]
pub struct Coords {
    lattice: Option<Lattice>,
    carts: Vec<V3>,
}

impl Coords {
    pub fn new(lattice: Option<Lattice>, carts: Vec<V3>) -> Self
    { Coords { lattice, carts } }

    pub fn periodic(lattice: Lattice, carts: Vec<V3>) -> Self
    { Coords::new(Some(lattice), carts) }

    pub fn open(carts: Vec<V3>) -> Self
    { Coords::new(None, carts) }

    #[inline]
    pub fn num_atoms(&self) -> usize
    { self.carts.len() }

    #[inline]
    pub fn lattice(&self) -> Option<&Lattice>
    { self.lattice.as_ref() }

    #[inline]
    pub fn carts(&self) -> &[V3]
    { &self.carts }

    /// Fractional coordinates, if the structure is periodic.
    pub fn to_fracs(&self) -> Option<Vec<V3>> {
        self.lattice.as_ref().map(|lattice| {
            self.carts.iter().map(|v| v / lattice).collect()
        })
    }

    /// Gather the positions of a subset of the particles, preserving the cell.
    pub fn subset(&self, indices: &[usize]) -> Coords {
        let carts = indices.iter().map(|&i| self.carts[i]).collect();
        Coords { lattice: self.lattice.clone(), carts }
    }
}
