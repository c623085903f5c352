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
use crate::cmd::{PairEntropyArgs, run_pair_entropy, LOG_FILENAME};
use crate::ui::logging::GlobalLogger;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use clap::{App, Arg, ArgMatches};
use failure::ResultExt;
use rsp2_colvars::Communicator;
use rsp2_tasks_config::{ValidatedSettings, YamlRead};

fn wrap_result_main<F>(main: F)
where F: FnOnce() -> FailResult<()>,
{
    main().unwrap_or_else(|e| {
        for cause in e.iter_chain() {
            error!("{}", cause);
        }

        if std::env::var_os("RUST_BACKTRACE") == Some(OsStr::new("1").to_owned()) {
            error!("{}", e.backtrace());
        } else {
            error!("\
                (If you found the above error message to be particularly lacking in \
                detail, try again with RUST_BACKTRACE=1)\
            ");
        }
        std::process::exit(1);
    });
}

pub fn rsp2_pair_entropy() {
    wrap_result_main(|| {
        let app = {
            App::new("rsp2-pair-entropy")
                .version(crate_version!())
                .about("Computes the pair entropy of each frame of an extended XYZ trajectory.")
                .args(&[
                    Arg::with_name("trajectory")
                        .value_name("TRAJECTORY")
                        .required(true)
                        .help("extended XYZ trajectory; frames with a Lattice=\"...\" are periodic"),
                    Arg::with_name("config")
                        .short("c").long("config")
                        .value_name("CONFIG")
                        .takes_value(true)
                        .required(true)
                        .help("config yaml"),
                    Arg::with_name("outdir")
                        .short("o").long("output")
                        .value_name("OUTDIR")
                        .takes_value(true)
                        .required(true)
                        .help("output directory"),
                    Arg::with_name("force")
                        .short("f").long("force")
                        .help("write into an existing output directory"),
                    Arg::with_name("exchange_stride")
                        .long("exchange-stride")
                        .value_name("N")
                        .takes_value(true)
                        .help("\
                            treat every step that is a multiple of N as an exchange step. \
                            The neighbor list stride must divide N.\
                        "),
                    Arg::with_name("verbose")
                        .short("v").long("verbose")
                        .help("log every stage of every frame"),
                ])
        };
        let matches = app.get_matches();
        with_communicator(&matches)
    });
}

#[cfg(feature = "mpi-support")]
fn with_communicator(matches: &ArgMatches<'_>) -> FailResult<()> {
    let _universe = match mpi::initialize() {
        Some(universe) => universe,
        None => bail!("failed to initialize MPI"),
    };
    pair_entropy_main(matches, rsp2_colvars::MpiComm::world())
}

#[cfg(not(feature = "mpi-support"))]
fn with_communicator(matches: &ArgMatches<'_>) -> FailResult<()> {
    pair_entropy_main(matches, rsp2_colvars::SerialComm)
}

fn pair_entropy_main<C: Communicator>(matches: &ArgMatches<'_>, comm: C) -> FailResult<()> {
    let is_root = comm.rank() == 0;
    let outdir = required_path(matches, "outdir")?;

    // the log file lives in the output directory, so trouble creating it
    // can only be reported once the logger is up
    let outdir_status = match is_root {
        true => prepare_outdir(&outdir, matches.is_present("force")),
        false => Ok(()),
    };

    let mut logger = GlobalLogger::default();
    logger.verbosity(matches.occurrences_of("verbose") as i32);
    if is_root && outdir_status.is_ok() {
        logger.path(outdir.join(LOG_FILENAME));
    }
    logger.apply()?;
    outdir_status?;

    let config = required_path(matches, "config")?;
    let trajectory = required_path(matches, "trajectory")?;
    let exchange_stride = match matches.is_present("exchange_stride") {
        true => Some(value_t!(matches, "exchange_stride", u64)?),
        false => None,
    };

    let ValidatedSettings(settings) = {
        ValidatedSettings::from_reader(rsp2_fs_util::open_text(&config)?)
            .with_context(|_| format!("while reading config '{}'", config.display()))?
    };

    let args = PairEntropyArgs { settings, trajectory, outdir, exchange_stride };
    run_pair_entropy(&args, comm)?;
    Ok(())
}

fn prepare_outdir(outdir: &Path, force: bool) -> FailResult<()> {
    if outdir.exists() && !force {
        bail!("'{}' already exists (use --force to write into it anyway)", outdir.display());
    }
    rsp2_fs_util::create_dir_all(outdir)?;
    Ok(())
}

fn required_path(matches: &ArgMatches<'_>, name: &str) -> FailResult<PathBuf> {
    match matches.value_of_os(name) {
        Some(value) => Ok(PathBuf::from(value)),
        None => bail!("missing required argument: {}", name),
    }
}
