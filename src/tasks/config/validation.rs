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

//! All of the post-processing that occurs after deserialization is written here.
//!
//! Numerical constraints between `maxr`, `nhist`, `sigma` and the neighbor list cutoff are
//! checked where the colvar is constructed, so that library users get them too.

use crate::config::*;
use failure::Error;
use std::collections::BTreeSet;

impl Settings {
    pub fn validate(mut self) -> Result<ValidatedSettings, Error> {
        check_group(&self.pair_entropy.group)?;
        fix_output_stride(&mut self.pair_entropy)?;

        Ok(ValidatedSettings(self))
    }
}

fn check_group(group: &Option<Vec<usize>>) -> Result<(), Error> {
    if let Some(group) = group {
        ensure!(!group.is_empty(), "pair-entropy.group must not be empty");

        let mut seen = BTreeSet::new();
        for &index in group {
            if !seen.insert(index) {
                bail!("pair-entropy.group contains atom {} more than once", index);
            }
        }
    }
    Ok(())
}

fn fix_output_stride(settings: &mut PairEntropy) -> Result<(), Error> {
    let PairEntropy { output_gofr, output_integrand, output_stride, .. } = settings;

    match *output_stride {
        Some(0) => bail!("pair-entropy.output-stride must be at least 1"),
        Some(stride) if stride != 1 && !(*output_gofr || *output_integrand) => {
            bail!("\
                pair-entropy.output-stride was given without any diagnostic output. \
                (set output-gofr or output-integrand)\
            ");
        },
        Some(_) => {},
        None => *output_stride = Some(1),
    }
    Ok(())
}
