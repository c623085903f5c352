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

//! Umbrella crate for the pair entropy workspace.
//!
//! The collective variable itself lives in `rsp2-colvars`; the command line driver
//! lives in `rsp2-tasks`.

pub use rsp2_colvars as colvars;
pub use rsp2_tasks as tasks;
