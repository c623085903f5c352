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

//! Cooperation between workers that share the work of a colvar.
//!
//! Every worker runs the same computation on its own portion of the pairs and atoms.
//! The only synchronization points are calls to [`Communicator::sum_in_place`].

use crate::FailResult;

use std::sync::{Arc, Barrier, Mutex};

/// The sum-reduce primitive, plus enough topology to split work.
pub trait Communicator {
    /// Number of cooperating workers.
    fn size(&self) -> usize;

    /// Index of this worker, in `0..self.size()`.
    fn rank(&self) -> usize;

    /// Replace `data` on every worker with the elementwise sum over all workers.
    ///
    /// All workers must call this with buffers of the same length, and in the same order
    /// relative to other calls.
    fn sum_in_place(&self, data: &mut [f64]) -> FailResult<()>;
}

impl<'a, C: Communicator + ?Sized> Communicator for &'a C {
    fn size(&self) -> usize { (**self).size() }
    fn rank(&self) -> usize { (**self).rank() }
    fn sum_in_place(&self, data: &mut [f64]) -> FailResult<()> { (**self).sum_in_place(data) }
}

impl<C: Communicator + ?Sized> Communicator for Box<C> {
    fn size(&self) -> usize { (**self).size() }
    fn rank(&self) -> usize { (**self).rank() }
    fn sum_in_place(&self, data: &mut [f64]) -> FailResult<()> { (**self).sum_in_place(data) }
}

/// A lone worker.
#[derive(Debug, Copy, Clone, Default)]
pub struct SerialComm;

impl Communicator for SerialComm {
    fn size(&self) -> usize { 1 }
    fn rank(&self) -> usize { 0 }
    fn sum_in_place(&self, _: &mut [f64]) -> FailResult<()> { Ok(()) }
}

//---------------------------------------------------------

/// A group of workers living on threads of the same process.
///
/// Sums are always added up in rank order, so every worker sees bitwise identical
/// results, and repeated runs are reproducible.
#[derive(Debug, Clone)]
pub struct ThreadComm {
    rank: usize,
    size: usize,
    shared: Arc<ThreadShared>,
}

#[derive(Debug)]
struct ThreadShared {
    barrier: Barrier,
    slots: Mutex<Vec<Vec<f64>>>,
}

impl ThreadComm {
    /// Create the communicators for a group of `size` workers, in rank order.
    ///
    /// Each must be moved to its own thread; calling `sum_in_place` on one of them
    /// blocks until all of the others have done the same.
    pub fn group(size: usize) -> Vec<ThreadComm> {
        let shared = Arc::new(ThreadShared {
            barrier: Barrier::new(size),
            slots: Mutex::new(vec![vec![]; size]),
        });
        (0..size).map(|rank| ThreadComm { rank, size, shared: shared.clone() }).collect()
    }
}

impl Communicator for ThreadComm {
    fn size(&self) -> usize { self.size }
    fn rank(&self) -> usize { self.rank }

    fn sum_in_place(&self, data: &mut [f64]) -> FailResult<()> {
        let poisoned = || format_err!("a worker panicked during a reduction");

        {
            let mut slots = self.shared.slots.lock().map_err(|_| poisoned())?;
            slots[self.rank].clear();
            slots[self.rank].extend_from_slice(data);
        }
        self.shared.barrier.wait();

        let result = {
            let slots = self.shared.slots.lock().map_err(|_| poisoned())?;
            match slots.iter().find(|slot| slot.len() != data.len()) {
                Some(slot) => Err(format_err!(
                    "mismatched reduction buffers ({} vs {} elements)", slot.len(), data.len(),
                )),
                None => {
                    for (i, x) in data.iter_mut().enumerate() {
                        *x = slots.iter().map(|slot| slot[i]).sum();
                    }
                    Ok(())
                },
            }
        };

        // nobody may overwrite their slot until everyone has read it
        self.shared.barrier.wait();
        result
    }
}

//---------------------------------------------------------

#[cfg(feature = "mpi-support")]
pub use self::mpi_comm::MpiComm;

#[cfg(feature = "mpi-support")]
mod mpi_comm {
    use super::*;

    use ::mpi::topology::SystemCommunicator;
    use ::mpi::traits::Communicator as _;
    use ::mpi::collective::{CommunicatorCollectives, SystemOperation};

    /// The processes of an MPI world.
    ///
    /// MPI must have been initialized (and the universe must still be alive) for as long
    /// as this is used.
    #[derive(Debug, Copy, Clone)]
    pub struct MpiComm {
        world: SystemCommunicator,
    }

    impl MpiComm {
        pub fn world() -> Self
        { MpiComm { world: SystemCommunicator::world() } }
    }

    impl Communicator for MpiComm {
        fn size(&self) -> usize { self.world.size() as usize }
        fn rank(&self) -> usize { self.world.rank() as usize }

        fn sum_in_place(&self, data: &mut [f64]) -> FailResult<()> {
            let send = data.to_vec();
            self.world.all_reduce_into(&send[..], data, SystemOperation::sum());
            Ok(())
        }
    }
}

//---------------------------------------------------------

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    use std::thread;

    #[test]
    fn serial_is_identity() {
        let mut data = vec![1.0, 2.0, 3.0];
        SerialComm.sum_in_place(&mut data).unwrap();
        assert_eq!(data, vec![1.0, 2.0, 3.0]);
        assert_eq!((SerialComm.size(), SerialComm.rank()), (1, 0));
    }

    #[test]
    fn thread_group_sums() {
        let comms = ThreadComm::group(4);
        let handles = comms.into_iter().map(|comm| thread::spawn(move || {
            let rank = comm.rank() as f64;
            let mut data = vec![rank, 10.0 * rank, 1.0];
            comm.sum_in_place(&mut data).unwrap();

            // a second round must not see leftovers from the first
            let mut again = vec![1.0];
            comm.sum_in_place(&mut again).unwrap();
            (comm.size(), data, again)
        })).collect::<Vec<_>>();

        for handle in handles {
            let (size, data, again) = handle.join().unwrap();
            assert_eq!(size, 4);
            assert_eq!(data, vec![6.0, 60.0, 4.0]);
            assert_eq!(again, vec![4.0]);
        }
    }

    #[test]
    fn thread_group_rejects_mismatched_buffers() {
        let comms = ThreadComm::group(2);
        let handles = comms.into_iter().map(|comm| thread::spawn(move || {
            let mut data = vec![0.0; 1 + comm.rank()];
            comm.sum_in_place(&mut data).is_err()
        })).collect::<Vec<_>>();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
