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

use crate::ConfigError;

use rsp2_array_types::V3;

use std::collections::BTreeSet;

/// The particles of a structure that participate in a colvar.
///
/// Indices are unique and keep the order in which they were given; the colvar sees
/// particle `k` of the group as its own particle `k`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticleGroup {
    indices: Vec<usize>,
    total: usize,
}

impl ParticleGroup {
    pub fn new(indices: Vec<usize>, total: usize) -> Result<Self, ConfigError> {
        if indices.is_empty() {
            return Err(ConfigError::EmptyGroup);
        }

        let mut seen = BTreeSet::new();
        for &index in &indices {
            if index >= total {
                return Err(ConfigError::GroupIndexOutOfRange { index, total });
            }
            if !seen.insert(index) {
                return Err(ConfigError::DuplicateGroupIndex { index });
            }
        }
        Ok(ParticleGroup { indices, total })
    }

    /// Every particle of the structure, in order.
    pub fn all(total: usize) -> Self
    { ParticleGroup { indices: (0..total).collect(), total } }

    pub fn len(&self) -> usize
    { self.indices.len() }

    pub fn is_empty(&self) -> bool
    { self.indices.is_empty() }

    /// Number of particles in the full structure.
    pub fn total(&self) -> usize
    { self.total }

    pub fn indices(&self) -> &[usize]
    { &self.indices }

    /// Select the group members from positions of the full structure.
    pub fn gather(&self, carts: &[V3]) -> Vec<V3> {
        assert_eq!(carts.len(), self.total, "gather: wrong number of positions");
        self.indices.iter().map(|&i| carts[i]).collect()
    }

    /// Expand a per-member gradient into one over the full structure.
    ///
    /// Particles outside the group get zero.
    pub fn scatter_gradient(&self, gradient: &[V3]) -> Vec<V3> {
        assert_eq!(gradient.len(), self.len(), "scatter: wrong number of gradients");
        let mut out = vec![V3::zero(); self.total];
        for (&i, &g) in self.indices.iter().zip(gradient) {
            out[i] = g;
        }
        out
    }
}
