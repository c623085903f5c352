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

//! Drivers that feed trajectories to the collective variables in `rsp2-colvars`.

#[macro_use] extern crate failure;
#[macro_use] extern crate log;
#[macro_use] extern crate clap;
#[cfg(test)] #[macro_use] extern crate rsp2_assert_close;

pub type FailResult<T> = Result<T, failure::Error>;

pub mod entry_points;
pub mod filetypes;
pub mod ui;

mod cmd;

pub use crate::cmd::{PairEntropyArgs, run_pair_entropy, COLVAR_FILENAME, LOG_FILENAME};
