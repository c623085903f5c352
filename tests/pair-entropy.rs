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

#[macro_use] extern crate rsp2_assert_close;

use std::path::Path;
use std::process::Command;
use std::thread;

use rand::Rng;
use tempdir::TempDir;

use rsp2_array_types::V3;
use rsp2_colvars::{Colvar, Communicator, Frame, PairEntropy, Params, NeighborListParams, SerialComm, ThreadComm};
use rsp2_structure::{Coords, Lattice};
use rsp2_tasks::filetypes::XyzFrame;

const CONFIG: &str = "\
threading: rayon
pair-entropy:
  neighbor-list: { cutoff: 1.6, stride: 2 }
  maxr: 1.2
  nhist: 61
  sigma: 0.06
  output-integrand: true
  output-stride: 2
";

fn random_trajectory(num_frames: usize, num_atoms: usize, cell: f64) -> Vec<XyzFrame> {
    let mut rng = rand::thread_rng();
    let mut carts = (0..num_atoms)
        .map(|_| V3::from_fn(|_| rng.gen_range(0.0, cell)))
        .collect::<Vec<_>>();

    (0..num_frames).map(|frame| {
        // small moves, so that neighbor lists stay valid between updates
        for x in &mut carts {
            *x += V3::from_fn(|_| rng.gen_range(-0.02, 0.02));
        }
        XyzFrame {
            step: Some(frame as u64),
            symbols: vec!["Ar".to_string(); num_atoms],
            coords: Coords::periodic(Lattice::cubic(cell), carts.clone()),
        }
    }).collect()
}

fn write_trajectory(path: &Path, frames: &[XyzFrame]) {
    let mut text = vec![];
    for frame in frames {
        frame.to_writer(&mut text).unwrap();
    }
    std::fs::write(path, text).unwrap();
}

fn cli(dir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_rsp2-pair-entropy"));
    command.current_dir(dir);
    command
}

#[test]
fn cli_writes_colvar_and_diagnostics() {
    let dir = TempDir::new("rsp2-pair-entropy").unwrap();
    std::fs::write(dir.path().join("config.yaml"), CONFIG).unwrap();
    write_trajectory(&dir.path().join("traj.xyz"), &random_trajectory(5, 20, 3.5));

    let status = {
        cli(dir.path())
            .args(&["-c", "config.yaml", "traj.xyz", "-o", "out", "--exchange-stride", "4"])
            .status().unwrap()
    };
    assert!(status.success());

    let out = dir.path().join("out");
    let colvar = std::fs::read_to_string(out.join("colvar.txt")).unwrap();
    let rows = colvar.lines().filter(|line| !line.starts_with('#')).collect::<Vec<_>>();
    assert_eq!(rows.len(), 5);
    for (step, row) in rows.iter().enumerate() {
        let words = row.split_whitespace().collect::<Vec<_>>();
        assert_eq!(words[0], step.to_string());
        assert!(words[1].parse::<f64>().unwrap().is_finite());
    }
    assert!(out.join("integrand.txt").exists());
    assert!(!out.join("gofr.txt").exists());
    assert!(out.join("rsp2.log").exists());

    // refuses to reuse the directory unless asked
    let status = cli(dir.path()).args(&["-c", "config.yaml", "traj.xyz", "-o", "out"]).status().unwrap();
    assert!(!status.success());
    let status = cli(dir.path()).args(&["-c", "config.yaml", "traj.xyz", "-o", "out", "-f"]).status().unwrap();
    assert!(status.success());
}

#[test]
fn cli_reports_exchange_errors() {
    let dir = TempDir::new("rsp2-pair-entropy").unwrap();
    std::fs::write(dir.path().join("config.yaml"), CONFIG).unwrap();
    write_trajectory(&dir.path().join("traj.xyz"), &random_trajectory(4, 20, 3.5));

    // the neighbor list stride (2) does not divide 3
    let status = {
        cli(dir.path())
            .args(&["-c", "config.yaml", "traj.xyz", "-o", "out", "--exchange-stride", "3"])
            .status().unwrap()
    };
    assert!(!status.success());
}

#[test]
fn cli_reports_config_errors() {
    let dir = TempDir::new("rsp2-pair-entropy").unwrap();
    // sigma smaller than the bin width
    std::fs::write(dir.path().join("config.yaml"), "pair-entropy: { maxr: 1.0, nhist: 11, sigma: 0.01 }").unwrap();
    write_trajectory(&dir.path().join("traj.xyz"), &random_trajectory(1, 20, 3.5));

    let status = cli(dir.path()).args(&["-c", "config.yaml", "traj.xyz", "-o", "out"]).status().unwrap();
    assert!(!status.success());
}

// A trajectory evaluated by cooperating workers, with the optional parts of the
// parallel path switched on, must agree with one worker doing everything.
#[test]
fn decomposed_trajectory_matches_serial() {
    const WORKERS: usize = 3;
    let frames = random_trajectory(6, 24, 3.5);

    let params = Params {
        neighbor_list: Some(NeighborListParams { cutoff: 1.6, stride: 3 }),
        average_gofr: true,
        ..Params::new(1.2, 61, 0.06)
    };

    fn evaluate(colvar: &mut dyn Colvar, frame: &XyzFrame) -> rsp2_colvars::FrameResult {
        colvar.compute_value_and_gradient(&Frame {
            carts: frame.coords.carts(),
            lattice: frame.coords.lattice(),
            step: frame.step.unwrap(),
            exchange_step: false,
        }).unwrap()
    }

    let mut serial = PairEntropy::new(params.clone(), 24, SerialComm).unwrap();
    let expected = frames.iter().map(|frame| evaluate(&mut serial, frame)).collect::<Vec<_>>();

    let handles = ThreadComm::group(WORKERS).into_iter().map(|comm| {
        let frames = frames.clone();
        let params = Params { use_rayon: comm.rank() % 2 == 0, ..params.clone() };
        thread::spawn(move || {
            let mut colvar = PairEntropy::new(params, 24, comm).unwrap();
            frames.iter().map(|frame| evaluate(&mut colvar, frame)).collect::<Vec<_>>()
        })
    }).collect::<Vec<_>>();

    for handle in handles {
        let results = handle.join().unwrap();
        assert_eq!(results.len(), expected.len());
        for (actual, expected) in results.iter().zip(&expected) {
            assert_close!(rel=1e-9, abs=1e-12, actual.value, expected.value);
            assert_close!(rel=1e-9, abs=1e-9, &actual.gradient, &expected.gradient);
            assert_close!(rel=1e-9, abs=1e-9, actual.virial, expected.virial);
        }
    }
}
