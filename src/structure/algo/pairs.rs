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

use crate::{Displacer, FailResult};

use rsp2_array_types::V3;

/// Identifies the portion of some work owned by one of several cooperating workers.
///
/// Work items are dealt out round-robin: item `i` belongs to shard `i % count`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Shard {
    pub index: usize,
    pub count: usize,
}

impl Shard {
    /// The shard that owns everything.
    pub fn whole() -> Self
    { Shard { index: 0, count: 1 } }

    pub fn new(index: usize, count: usize) -> FailResult<Self> {
        ensure!(count > 0, "shard count must be positive");
        ensure!(index < count, "shard index {} out of range for {} shards", index, count);
        Ok(Shard { index, count })
    }

    #[inline]
    pub fn owns(&self, item: usize) -> bool
    { item % self.count == self.index }

    /// The items in `0..len` owned by this shard.
    #[inline]
    pub fn owned(&self, len: usize) -> impl Iterator<Item=usize> + Clone
    { (self.index..len).step_by(self.count) }
}

/// An unordered pair of particle indices, stored with `from < to`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pair {
    pub from: usize,
    pub to: usize,
}

/// The pairs of particles separated by less than some cutoff.
///
/// Each pair appears once, in the order `from < to`.  Only the pairs whose `from` index
/// belongs to the shard used in construction are present.
#[derive(Debug, Clone, PartialEq)]
pub struct PairList {
    num_atoms: usize, // used for sanity checks
    cutoff: f64,
    from: Vec<usize>,
    to: Vec<usize>,
}

impl PairList {
    /// An empty list, which never matches any particles.
    pub fn empty() -> Self
    { PairList { num_atoms: 0, cutoff: 0.0, from: vec![], to: vec![] } }

    /// Compute pairs with a brute force strategy.
    ///
    /// Pairs at a distance exactly equal to the cutoff are excluded.
    pub fn from_brute_force(
        carts: &[V3],
        displacer: &Displacer,
        cutoff: f64,
        shard: Shard,
    ) -> FailResult<Self> {
        ensure!(cutoff > 0.0, "pair cutoff must be positive (got {})", cutoff);

        let num_atoms = carts.len();
        let sq_cutoff = cutoff * cutoff;

        let mut from = vec![];
        let mut to = vec![];
        for i in shard.owned(num_atoms) {
            for j in i + 1..num_atoms {
                let sqnorm = displacer.displacement(&carts[i], &carts[j]).sqnorm();
                if sqnorm < sq_cutoff {
                    from.push(i);
                    to.push(j);
                }
            }
        }
        trace!("pair search found {} pairs within {} among {} sites", from.len(), cutoff, num_atoms);
        Ok(PairList { num_atoms, cutoff, from, to })
    }

    #[inline]
    pub fn len(&self) -> usize
    { self.from.len() }

    #[inline]
    pub fn is_empty(&self) -> bool
    { self.from.is_empty() }

    #[inline]
    pub fn num_atoms(&self) -> usize
    { self.num_atoms }

    #[inline]
    pub fn cutoff(&self) -> f64
    { self.cutoff }

    #[inline]
    pub fn get(&self, index: usize) -> Pair
    { Pair { from: self.from[index], to: self.to[index] } }

    pub fn iter(&self) -> impl ExactSizeIterator<Item=Pair> + DoubleEndedIterator + '_ {
        self.from.iter().zip(&self.to).map(|(&from, &to)| Pair { from, to })
    }
}

impl<'a> IntoIterator for &'a PairList {
    type Item = Pair;
    type IntoIter = Box<dyn Iterator<Item=Pair> + 'a>;

    fn into_iter(self) -> Self::IntoIter
    { Box::new(self.iter()) }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;
    use crate::Lattice;

    fn random_carts(n: usize, side: f64) -> Vec<V3> {
        (0..n).map(|_| V3::from_fn(|_| ::rand::random::<f64>() * side)).collect()
    }

    #[test]
    fn shards_partition_the_full_list() {
        let carts = random_carts(40, 3.0);
        let displacer = Displacer::new(Some(&Lattice::cubic(3.0)));

        let full = PairList::from_brute_force(&carts, &displacer, 1.2, Shard::whole()).unwrap();
        assert!(!full.is_empty());

        let mut union = vec![];
        for index in 0..3 {
            let shard = Shard::new(index, 3).unwrap();
            let part = PairList::from_brute_force(&carts, &displacer, 1.2, shard).unwrap();
            assert!(part.iter().all(|pair| shard.owns(pair.from)));
            union.extend(part.iter());
        }
        union.sort();

        let mut expected = full.iter().collect::<Vec<_>>();
        expected.sort();
        assert_eq!(union, expected);
    }

    #[test]
    fn matches_explicit_distances() {
        let carts = random_carts(25, 2.0);
        let displacer = Displacer::new(None);
        let cutoff = 0.8;
        let pairs = PairList::from_brute_force(&carts, &displacer, cutoff, Shard::whole()).unwrap();

        let mut count = 0;
        for i in 0..carts.len() {
            for j in i + 1..carts.len() {
                if (carts[j] - carts[i]).norm() < cutoff {
                    count += 1;
                }
            }
        }
        assert_eq!(pairs.len(), count);
        assert_eq!(pairs.num_atoms(), 25);
        for pair in &pairs {
            assert!(pair.from < pair.to);
            assert!((carts[pair.to] - carts[pair.from]).norm() < cutoff);
        }
    }

    #[test]
    fn bad_input() {
        assert!(Shard::new(3, 3).is_err());
        assert!(Shard::new(0, 0).is_err());
        assert!(PairList::from_brute_force(&[], &Displacer::Direct, 0.0, Shard::whole()).is_err());
    }
}
