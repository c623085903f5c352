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

use super::{ConfigError, ConsistencyError};
use crate::FailResult;

use rsp2_array_types::V3;
use rsp2_structure::{Displacer, PairList, Shard};

/// Pairs within a cutoff, rebuilt every `stride` steps.
///
/// Between rebuilds the pairs are reused as-is, so the cutoff must exceed the
/// interaction range by enough to cover how far particles move in `stride` steps.
#[derive(Debug, Clone)]
pub struct NeighborList {
    cutoff: f64,
    stride: u64,
    // set initially, and again after an exchange step
    first_time: bool,
    pairs: PairList,
}

impl NeighborList {
    pub fn new(cutoff: f64, stride: u64) -> Result<Self, ConfigError> {
        if !(cutoff > 0.0) {
            return Err(ConfigError::NonPositive { what: "neighbor list cutoff", value: cutoff });
        }
        if stride == 0 {
            return Err(ConfigError::ZeroStride { what: "neighbor list stride" });
        }
        Ok(NeighborList { cutoff, stride, first_time: true, pairs: PairList::empty() })
    }

    pub fn cutoff(&self) -> f64
    { self.cutoff }

    pub fn stride(&self) -> u64
    { self.stride }

    /// Whether the pairs will be recomputed if `step` is the next frame.
    pub fn should_rebuild(&self, step: u64) -> bool
    { self.first_time || step % self.stride == 0 }

    /// Decide whether to rebuild at this frame.
    ///
    /// Particle identities may change arbitrarily on an exchange step, so the list must
    /// be rebuilt on that step and again on the step after.  It is an error for an
    /// exchange to land on a step where no rebuild was due.
    pub fn prepare(&mut self, step: u64, exchange_step: bool) -> Result<bool, ConsistencyError> {
        let rebuild = self.should_rebuild(step);
        if rebuild {
            self.first_time = false;
        } else if exchange_step {
            return Err(ConsistencyError::ExchangeWithoutRebuild { step, stride: self.stride });
        }

        if exchange_step {
            self.first_time = true;
        }
        Ok(rebuild)
    }

    pub fn rebuild(&mut self, carts: &[V3], displacer: &Displacer, shard: Shard) -> FailResult<()> {
        self.pairs = PairList::from_brute_force(carts, displacer, self.cutoff, shard)?;
        debug!(
            "rebuilt neighbor list: {} pairs within {} (shard {} of {})",
            self.pairs.len(), self.cutoff, shard.index, shard.count,
        );
        Ok(())
    }

    /// Pairs as of the last rebuild.
    pub fn pairs(&self) -> &PairList
    { &self.pairs }
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn schedule() {
        let mut nl = NeighborList::new(1.0, 3).unwrap();

        // the first frame always rebuilds, whatever the step
        assert_eq!(nl.prepare(7, false).unwrap(), true);
        assert_eq!(nl.prepare(8, false).unwrap(), false);
        assert_eq!(nl.prepare(9, false).unwrap(), true);
        assert_eq!(nl.prepare(10, false).unwrap(), false);
    }

    #[test]
    fn exchange() {
        let mut nl = NeighborList::new(1.0, 2).unwrap();
        assert!(nl.prepare(0, false).unwrap());

        // exchange on a rebuild step forces another rebuild on the next step
        assert!(nl.prepare(2, true).unwrap());
        assert!(nl.should_rebuild(3));
        assert!(nl.prepare(3, false).unwrap());
        assert!(!nl.prepare(5, false).unwrap());

        match nl.prepare(7, true) {
            Err(ConsistencyError::ExchangeWithoutRebuild { step: 7, stride: 2 }) => {},
            r => panic!("{:?}", r),
        }
    }

    #[test]
    fn bad_config() {
        assert!(NeighborList::new(0.0, 1).is_err());
        assert!(NeighborList::new(-1.0, 1).is_err());
        match NeighborList::new(1.0, 0) {
            Err(ConfigError::ZeroStride { .. }) => {},
            r => panic!("{:?}", r),
        }
    }

    #[test]
    fn rebuild_uses_shard() {
        let carts = vec![V3([0.0; 3]), V3([0.5, 0.0, 0.0]), V3([0.0, 0.5, 0.0])];
        let mut nl = NeighborList::new(0.6, 1).unwrap();

        nl.rebuild(&carts, &Displacer::Direct, Shard::whole()).unwrap();
        assert_eq!(nl.pairs().len(), 2);

        nl.rebuild(&carts, &Displacer::Direct, Shard::new(1, 2).unwrap()).unwrap();
        assert_eq!(nl.pairs().len(), 0);
    }
}
