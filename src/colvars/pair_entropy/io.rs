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

//! Reading a reference g(r), and writing diagnostic profiles.
//!
//! Both use the same plain text format: `#` lines are comments, and every other
//! nonblank line holds two whitespace-separated columns `r` and the value.
//! Anything a profile dump writes can be read back as a reference.

use super::ConfigError;
use crate::FailResult;

use failure::ResultExt;

use std::io::Write;
use std::path::Path;

/// Parse a reference g(r) with exactly `nhist` rows.  The `r` column is ignored.
pub fn parse_reference_gofr(text: &str, nhist: usize) -> Result<Vec<f64>, ConfigError> {
    let mut out = vec![];
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let malformed = |reason: String| ConfigError::MalformedReference { line: index + 1, reason };
        let parse = |word: &str| word.parse::<f64>().map_err(|e| malformed(format!("{:?}: {}", word, e)));

        let words = line.split_whitespace().collect::<Vec<_>>();
        if words.len() < 2 {
            return Err(malformed(format!("expected 2 columns, found {}", words.len())));
        }
        let _r = parse(words[0])?;
        out.push(parse(words[1])?);
    }

    if out.len() != nhist {
        return Err(ConfigError::ReferenceLength { expected: nhist, found: out.len() });
    }
    Ok(out)
}

/// Read a reference g(r) file.
pub fn read_reference_gofr(path: impl AsRef<Path>, nhist: usize) -> FailResult<Vec<f64>> {
    let path = path.as_ref();
    let text = rsp2_fs_util::read_to_string(path)?;
    let gofr = parse_reference_gofr(&text, nhist)
        .with_context(|_| format!("while reading reference g(r) from {}", path.display()))?;
    Ok(gofr)
}

/// Replace the contents of a file with a two-column profile.
pub(crate) fn write_profile(path: &Path, column: &str, r: &[f64], values: &[f64]) -> FailResult<()> {
    assert_eq!(r.len(), values.len());
    rsp2_fs_util::rewrite(path, |file| {
        writeln!(file, "#! FIELDS r {}", column)?;
        for (r, value) in r.iter().zip(values) {
            writeln!(file, "{} {}", r, value)?;
        }
        Ok(())
    })?;
    Ok(())
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    #[test]
    fn parse_reference() {
        let text = "#! FIELDS r gofr\n0.0 0.0\n\n  0.5   1.25 extra\n# comment\n1.0 2e-3\n";
        assert_eq!(parse_reference_gofr(text, 3).unwrap(), vec![0.0, 1.25, 2e-3]);
    }

    #[test]
    fn bad_references() {
        let text = "0.0 0.0\n0.5 1.25\n";
        match parse_reference_gofr(text, 3) {
            Err(ConfigError::ReferenceLength { expected: 3, found: 2 }) => {},
            r => panic!("{:?}", r),
        }
        match parse_reference_gofr(text, 1) {
            Err(ConfigError::ReferenceLength { expected: 1, found: 2 }) => {},
            r => panic!("{:?}", r),
        }
        match parse_reference_gofr("0.0 0.0\n0.5\n", 2) {
            Err(ConfigError::MalformedReference { line: 2, .. }) => {},
            r => panic!("{:?}", r),
        }
        match parse_reference_gofr("0.0 zero\n", 1) {
            Err(ConfigError::MalformedReference { line: 1, .. }) => {},
            r => panic!("{:?}", r),
        }
    }

    #[test]
    fn dump_is_a_valid_reference() {
        let dir = ::tempdir::TempDir::new("rsp2-colvars").unwrap();
        let path = dir.path().join("gofr.txt");

        let r = vec![0.0, 0.1, 0.2];
        let values = vec![0.0, 1.0 / 3.0, 2.718281828459045e-7];
        write_profile(&path, "gofr", &r, &values).unwrap();
        // rewritten, not appended
        write_profile(&path, "gofr", &r, &values).unwrap();

        assert_eq!(read_reference_gofr(&path, 3).unwrap(), values);
        assert!(read_reference_gofr(dir.path().join("missing.txt"), 3).is_err());
    }
}
