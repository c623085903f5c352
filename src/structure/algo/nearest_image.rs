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

/// A helper type for locating nearest images under periodic boundary conditions.
#[derive(Debug, Clone)]
pub struct NearestImageFinder {
    lattice: Lattice,
    orthorhombic: bool,
    lattice_vector_carts_around_origin: Vec<V3>,
}

impl NearestImageFinder {
    /// Construct a `NearestImageFinder` for a lattice.
    ///
    /// For skewed cells, the search assumes that after reduction into the range
    /// `[-0.5, 0.5]` in fractional coordinates, the shortest image of a vector lies within
    /// the 27 cells centered around the origin.  This holds for any cell that is not
    /// pathologically skewed.
    pub fn new(lattice: &Lattice) -> Self {
        let mut vecs = Vec::with_capacity(27);
        for &fa in &[-1.0, 0.0, 1.0] {
            for &fb in &[-1.0, 0.0, 1.0] {
                for &fc in &[-1.0, 0.0, 1.0] {
                    vecs.push(V3([fa, fb, fc]) * lattice);
                }
            }
        }

        NearestImageFinder {
            lattice: lattice.clone(),
            orthorhombic: lattice.is_orthorhombic(),
            lattice_vector_carts_around_origin: vecs,
        }
    }

    pub fn lattice(&self) -> &Lattice
    { &self.lattice }

    /// Find the shortest periodic image of a displacement vector between two arbitrary points.
    ///
    /// Ties are broken in favor of the image with reduced fractional coordinates.
    #[inline]
    pub fn shortest_image_cart(&self, cart: V3) -> V3 {
        let frac = cart / &self.lattice;
        let frac = frac - frac.round();
        let cart = frac * &self.lattice;
        if self.orthorhombic {
            return cart;
        }

        let mut best = cart;
        let mut best_sqnorm = cart.sqnorm();
        for image in &self.lattice_vector_carts_around_origin {
            let candidate = cart + image;
            let sqnorm = candidate.sqnorm();
            if sqnorm < best_sqnorm {
                best = candidate;
                best_sqnorm = sqnorm;
            }
        }
        best
    }
}

/// Resolves the displacement vector between two particles.
#[derive(Debug, Clone)]
pub enum Displacer {
    /// Direct differences of cartesian positions, for clusters in open space.
    Direct,
    /// Minimum image convention under a periodic lattice.
    MinimumImage(NearestImageFinder),
}

impl Displacer {
    /// A minimum image displacer if a lattice is given, or a direct one otherwise.
    pub fn new(lattice: Option<&Lattice>) -> Self {
        match lattice {
            Some(lattice) => Displacer::MinimumImage(NearestImageFinder::new(lattice)),
            None => Displacer::Direct,
        }
    }

    /// The vector pointing from `from` to `to`.
    #[inline]
    pub fn displacement(&self, from: &V3, to: &V3) -> V3 {
        match self {
            Displacer::Direct => to - from,
            Displacer::MinimumImage(finder) => finder.shortest_image_cart(to - from),
        }
    }

    pub fn is_periodic(&self) -> bool {
        match self {
            Displacer::Direct => false,
            Displacer::MinimumImage(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsp2_array_types::mat;

    #[test]
    fn shortest_images() {
        let lattice = Lattice::diagonal(&[4.0, 8.0, 12.0]);
        // a reduced point
        let quarter_way = V3([1.0, -2.0, 3.0]);
        // images of quarter_way
        let quarter_way_nearby = V3([1.0, 6.0, -9.0]);
        let quarter_way_far = V3([13.0, 30.0, 15.0]);

        let finder = NearestImageFinder::new(&lattice);
        assert_close!(abs=1e-12, finder.shortest_image_cart(quarter_way), quarter_way);
        assert_close!(abs=1e-12, finder.shortest_image_cart(quarter_way_nearby), quarter_way);
        assert_close!(abs=1e-12, finder.shortest_image_cart(quarter_way_far), quarter_way);
    }

    #[test]
    fn skewed_cell() {
        // a hexagonal-like cell, where frac rounding alone can give the wrong image
        let lattice = Lattice::new(&mat::from_array([
            [1.0, 0.0, 0.0],
            [0.9, 0.5, 0.0],
            [0.0, 0.0, 1.0],
        ]));
        let finder = NearestImageFinder::new(&lattice);

        let cart = V3([0.45, 0.25, 0.0]);
        let found = finder.shortest_image_cart(cart);

        // compare against an exhaustive search
        let mut best = cart;
        for a in -3..=3 {
            for b in -3..=3 {
                let v = cart + V3([a as f64, b as f64, 0.0]) * &lattice;
                if v.sqnorm() < best.sqnorm() {
                    best = v;
                }
            }
        }
        assert_close!(abs=1e-12, found.norm(), best.norm());
    }

    #[test]
    fn direct_vs_minimum_image() {
        let from = V3([0.1, 0.1, 0.1]);
        let to = V3([0.9, 0.1, 0.1]);
        let direct = Displacer::new(None);
        let periodic = Displacer::new(Some(&Lattice::cubic(1.0)));

        assert!(!direct.is_periodic());
        assert!(periodic.is_periodic());
        assert_close!(abs=1e-12, direct.displacement(&from, &to), V3([0.8, 0.0, 0.0]));
        assert_close!(abs=1e-12, periodic.displacement(&from, &to), V3([-0.2, 0.0, 0.0]));
    }
}
