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

//! Thin wrappers around `std::fs` that record which path an operation failed on.

#[macro_use]
extern crate log;

use std::path::Path;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};

/// An I/O error, together with a description of what was being done at the time.
#[derive(Debug, thiserror::Error)]
#[error("{context}")]
pub struct Error {
    context: String,
    #[source]
    source: io::Error,
}

pub type Result<T> = std::result::Result<T, Error>;

trait ResultExt<T> {
    fn with_context(self, context: impl FnOnce() -> String) -> Result<T>;
}

impl<T> ResultExt<T> for io::Result<T> {
    fn with_context(self, context: impl FnOnce() -> String) -> Result<T>
    { self.map_err(|source| Error { context: context(), source }) }
}

impl Error {
    pub fn io_error(&self) -> &io::Error
    { &self.source }
}

/// Wrapper around `File::open` that adds context.
pub fn open<P: AsRef<Path>>(path: P) -> Result<File>
{
    File::open(path.as_ref())
        .with_context(|| format!("while opening file: '{}'", path.as_ref().display()))
}

/// Wrapper around `File::open` that adds context and makes a `BufReader`.
pub fn open_text<P: AsRef<Path>>(path: P) -> Result<BufReader<File>>
{ open(path).map(BufReader::new) }

/// Wrapper around `File::create` that adds context.
pub fn create<P: AsRef<Path>>(path: P) -> Result<File>
{
    File::create(path.as_ref())
        .with_context(|| format!("could not create file: '{}'", path.as_ref().display()))
}

/// Wrapper around `std::fs::create_dir_all` that adds context.
pub fn create_dir_all<P: AsRef<Path>>(dir: P) -> Result<()>
{
    fs::create_dir_all(dir.as_ref())
        .with_context(|| format!("could not create directory '{}'", dir.as_ref().display()))
}

/// Wrapper around `std::fs::read_to_string` that adds context.
pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String>
{
    fs::read_to_string(path.as_ref())
        .with_context(|| format!("while reading file: '{}'", path.as_ref().display()))
}

/// Replace the contents of a file, through a `BufWriter`.
///
/// The file is truncated first; nothing is appended.
pub fn rewrite<P, F>(path: P, write_contents: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let path = path.as_ref();
    trace!("rewriting '{}'", path.display());

    let mut file = BufWriter::new(create(path)?);
    write_contents(&mut file)
        .and_then(|()| file.flush())
        .with_context(|| format!("while writing file: '{}'", path.display()))
}
