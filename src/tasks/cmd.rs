/* ********************************************************************** **
**  This file is part of rsp2.                                            **
**                                                                        **
**  rsp2 is free software: you can redistribute it and/or modify it under **
**  the terms of the GNU General Public License as published by the Free  **
**  Software Foundation, either version 3 of the License, or (at your     **
**  option) any later version.                                            **
**                                                                        **
**      http://www.gnu.org/licenses/                                      **
**                                                                        **
** Do note that, while the whole of rsp2 is licensed under the GPL, many  **
** parts of it are licensed under more permissive terms.                  **
** ********************************************************************** */

use crate::FailResult;
use crate::filetypes::XyzReader;

use std::io::prelude::*;
use std::path::{Path, PathBuf};

use rsp2_colvars::{
    Colvar, Communicator, Frame, PairEntropy, Params, ParticleGroup,
    NeighborListParams, DiagnosticOutput, ConsistencyError,
};
use rsp2_tasks_config as cfg;

pub const COLVAR_FILENAME: &str = "colvar.txt";
pub const LOG_FILENAME: &str = "rsp2.log";

#[derive(Debug, Clone)]
pub struct PairEntropyArgs {
    pub settings: cfg::Settings,
    pub trajectory: PathBuf,
    pub outdir: PathBuf,
    /// Steps that are multiples of this are flagged as exchange steps.
    pub exchange_stride: Option<u64>,
}

/// Computes the pair entropy of every frame in an extended XYZ trajectory.
///
/// The values are written to `colvar.txt` in the output directory, alongside any
/// diagnostic g(r) output.  Only the root worker writes files.
pub fn run_pair_entropy<C: Communicator>(args: &PairEntropyArgs, comm: C) -> FailResult<Vec<(u64, f64)>> {
    let PairEntropyArgs { settings, trajectory, outdir, exchange_stride } = args;
    if let Some(0) = exchange_stride {
        bail!("the exchange stride must be at least 1");
    }

    let is_root = comm.rank() == 0;
    if is_root {
        rsp2_fs_util::create_dir_all(outdir)?;
    }

    let mut frames = XyzReader::new(rsp2_fs_util::open_text(trajectory)?);
    let first = match frames.next() {
        Some(frame) => frame?,
        None => bail!("no frames in '{}'", trajectory.display()),
    };

    let total = first.coords.num_atoms();
    let group = match &settings.pair_entropy.group {
        Some(indices) => ParticleGroup::new(indices.clone(), total)?,
        None => ParticleGroup::all(total),
    };
    let params = params_from_config(settings, outdir)?;
    let mut colvar = PairEntropy::new(params, group.len(), comm)?;

    let mut file = match is_root {
        true => {
            let mut file = std::io::BufWriter::new(rsp2_fs_util::create(outdir.join(COLVAR_FILENAME))?);
            writeln!(file, "#! FIELDS step pair_entropy")?;
            Some(file)
        },
        false => None,
    };

    let mut values = vec![];
    for (index, frame) in std::iter::once(Ok(first)).chain(frames).enumerate() {
        let frame = frame?;
        let step = frame.step.unwrap_or(index as u64);

        if frame.coords.num_atoms() != total {
            let found = frame.coords.num_atoms();
            return Err(ConsistencyError::WrongAtomCount { step, expected: total, found }.into());
        }

        let carts = group.gather(frame.coords.carts());
        let exchange_step = exchange_stride.map_or(false, |stride| step % stride == 0);
        let result = colvar.compute_value_and_gradient(&Frame {
            carts: &carts,
            lattice: frame.coords.lattice(),
            exchange_step,
            step,
        })?;

        if let Some(file) = file.as_mut() {
            writeln!(file, "{} {}", step, result.value)?;
        }
        values.push((step, result.value));
    }

    if let Some(mut file) = file {
        file.flush()?;
    }
    info!("Processed {} frames", values.len());
    Ok(values)
}

fn params_from_config(settings: &cfg::Settings, outdir: &Path) -> FailResult<Params> {
    let cfg::PairEntropy {
        group: _, pbc, serial, ref neighbor_list, maxr, nhist, sigma, density,
        ref reference_gofr, average_gofr, output_gofr, output_integrand, output_stride,
    } = settings.pair_entropy;

    let reference_gofr = match reference_gofr {
        Some(path) => Some(rsp2_colvars::read_reference_gofr(path, nhist)?),
        None => None,
    };

    let output = match output_gofr || output_integrand {
        true => Some(DiagnosticOutput {
            dir: outdir.to_path_buf(),
            gofr: output_gofr,
            integrand: output_integrand,
            stride: output_stride.unwrap_or(1),
        }),
        false => None,
    };

    Ok(Params {
        maxr, nhist, sigma, density, pbc, serial, reference_gofr, average_gofr, output,
        neighbor_list: neighbor_list.as_ref().map(|nl| NeighborListParams {
            cutoff: nl.cutoff,
            stride: nl.stride,
        }),
        use_rayon: settings.threading == cfg::Threading::Rayon,
    })
}
