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

//! Extended XYZ trajectories.
//!
//! Each frame is an atom count, a comment line, and one `SYMBOL x y z` line per atom.
//! The comment line may carry `key=value` pairs; two of them are understood:
//!
//! * `Lattice="ax ay az bx by bz cx cy cz"` gives the periodic cell (rows are the
//!   cell vectors).  Frames without one are treated as non-periodic.
//! * `step=N` gives the simulation step.
//!
//! Other keys are ignored.

use crate::FailResult;

use std::io::prelude::*;

use failure::ResultExt;
use rsp2_array_types::{V3, mat};
use rsp2_structure::{Coords, Lattice};

//--------------------------------------------------------------------------------------
// public API

#[derive(Debug, Clone, PartialEq)]
pub struct XyzFrame {
    pub step: Option<u64>,
    pub symbols: Vec<String>,
    pub coords: Coords,
}

impl XyzFrame {
    /// Writes a frame in the format read by `XyzReader`.
    ///
    /// Frames can be written one after another to build a trajectory.
    pub fn to_writer(&self, mut w: impl Write) -> FailResult<()> {
        dump(&mut w, self)
    }
}

/// Iterator over the frames of a trajectory.
pub struct XyzReader<R> {
    lines: std::io::Lines<R>,
    // 1-based number of the last line read
    line_no: usize,
}

impl<R: BufRead> XyzReader<R> {
    pub fn new(r: R) -> Self
    { XyzReader { lines: r.lines(), line_no: 0 } }
}

impl<R: BufRead> Iterator for XyzReader<R> {
    type Item = FailResult<XyzFrame>;

    fn next(&mut self) -> Option<FailResult<XyzFrame>> {
        // blank lines between frames are tolerated
        let count_line = loop {
            match self.next_line()? {
                Err(e) => return Some(Err(e)),
                Ok(line) => if !line.trim().is_empty() { break line },
            }
        };

        let start = self.line_no;
        Some({
            self.read_frame(&count_line)
                .with_context(|_| format!("in xyz frame starting at line {}", start))
                .map_err(Into::into)
        })
    }
}

//--------------------------------------------------------------------------------------
// implementation

impl<R: BufRead> XyzReader<R> {
    fn next_line(&mut self) -> Option<FailResult<String>> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(line.map_err(Into::into))
    }

    fn expect_line(&mut self) -> FailResult<String> {
        match self.next_line() {
            Some(line) => line,
            None => bail!("unexpected end of file at line {}", self.line_no),
        }
    }

    fn read_frame(&mut self, count_line: &str) -> FailResult<XyzFrame> {
        let count: usize = {
            count_line.trim().parse::<usize>()
                .with_context(|_| format!("bad atom count {:?}", count_line.trim()))?
        };

        let comment = self.expect_line()?;
        let CommentInfo { step, lattice } = parse_comment(&comment)?;

        let mut symbols = Vec::with_capacity(count);
        let mut carts = Vec::with_capacity(count);
        for _ in 0..count {
            let line = self.expect_line()?;
            let line_no = self.line_no;
            let (symbol, cart) = {
                parse_atom_line(&line)
                    .with_context(|_| format!("on line {}", line_no))?
            };
            symbols.push(symbol);
            carts.push(cart);
        }

        Ok(XyzFrame { step, symbols, coords: Coords::new(lattice, carts) })
    }
}

#[derive(Debug, Default)]
struct CommentInfo {
    step: Option<u64>,
    lattice: Option<Lattice>,
}

fn parse_comment(comment: &str) -> FailResult<CommentInfo> {
    let mut out = CommentInfo::default();
    for (key, value) in comment_pairs(comment)? {
        match &key.to_lowercase()[..] {
            "lattice" => {
                let values = {
                    value.split_whitespace()
                        .map(|word| word.parse::<f64>())
                        .collect::<Result<Vec<_>, _>>()
                        .with_context(|_| format!("bad Lattice {:?}", value))?
                };
                ensure!(values.len() == 9, "Lattice needs 9 numbers, got {}", values.len());

                let matrix = mat::from_array([
                    [values[0], values[1], values[2]],
                    [values[3], values[4], values[5]],
                    [values[6], values[7], values[8]],
                ]);
                out.lattice = Some(Lattice::new(&matrix));
            },
            "step" => {
                let step = value.parse::<u64>().with_context(|_| format!("bad step {:?}", value))?;
                out.step = Some(step);
            },
            _ => {},
        }
    }
    Ok(out)
}

// Splits a comment line into `key=value` pairs, where a value may be double-quoted.
// Words without an `=` are skipped.
fn comment_pairs(comment: &str) -> FailResult<Vec<(&str, &str)>> {
    let mut out = vec![];
    let mut rest = comment.trim_start();
    while !rest.is_empty() {
        let word_end = rest.find(|c: char| c.is_whitespace() || c == '=').unwrap_or(rest.len());
        let key = &rest[..word_end];
        rest = &rest[word_end..];

        if !rest.starts_with('=') {
            rest = rest.trim_start();
            continue;
        }
        rest = &rest[1..];

        let value;
        if rest.starts_with('"') {
            let close = match rest[1..].find('"') {
                Some(close) => close + 1,
                None => bail!("unterminated quote after {}=", key),
            };
            value = &rest[1..close];
            rest = &rest[close + 1..];
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            value = &rest[..end];
            rest = &rest[end..];
        }
        out.push((key, value));
        rest = rest.trim_start();
    }
    Ok(out)
}

fn parse_atom_line(line: &str) -> FailResult<(String, V3)> {
    let words = line.split_whitespace().collect::<Vec<_>>();
    ensure!(words.len() >= 4, "expected 'SYMBOL x y z', got {:?}", line);

    let mut cart = V3::zero();
    for k in 0..3 {
        cart[k] = words[k + 1].parse::<f64>().with_context(|_| format!("bad coordinate {:?}", words[k + 1]))?;
    }
    Ok((words[0].to_string(), cart))
}

fn dump(w: &mut dyn Write, frame: &XyzFrame) -> FailResult<()>
{
    let XyzFrame { step, symbols, coords } = frame;
    assert_eq!(symbols.len(), coords.num_atoms());

    writeln!(w, "{}", coords.num_atoms())?;

    let mut comment = vec![];
    if let Some(lattice) = coords.lattice() {
        let m = lattice.matrix();
        let numbers = (0..3).flat_map(|r| (0..3).map(move |c| m[r][c].to_string()));
        comment.push(format!("Lattice=\"{}\"", numbers.collect::<Vec<_>>().join(" ")));
    }
    if let Some(step) = step {
        comment.push(format!("step={}", step));
    }
    writeln!(w, "{}", comment.join(" "))?;

    for (symbol, V3([x, y, z])) in symbols.iter().zip(coords.carts()) {
        writeln!(w, " {:>2} {} {} {}", symbol, x, y, z)?;
    }
    Ok(())
}

#[cfg(test)]
#[deny(unused)]
mod tests {
    use super::*;

    fn read_all(text: &str) -> FailResult<Vec<XyzFrame>>
    { XyzReader::new(text.as_bytes()).collect() }

    #[test]
    fn periodic_and_open_frames() {
        let text = "\
3
Lattice=\"2.0 0.0 0.0 0.0 3.0 0.0 0.0 0.0 4.0\" Properties=species:S:1:pos:R:3 step=10
 Ar 0.0 0.0 0.0
 Ar 1.0 0.5 0.25
 Ar 1.5 2.5 3.5

2
a comment with no keys
 Ar 0.0 0.0 0.0
 Ar 1.0 0.0 0.0
";
        let frames = read_all(text).unwrap();
        assert_eq!(frames.len(), 2);

        assert_eq!(frames[0].step, Some(10));
        assert_eq!(frames[0].coords.num_atoms(), 3);
        assert_eq!(frames[0].coords.lattice(), Some(&Lattice::orthorhombic(2.0, 3.0, 4.0)));
        assert_eq!(frames[0].coords.carts()[1], V3([1.0, 0.5, 0.25]));

        assert_eq!(frames[1].step, None);
        assert_eq!(frames[1].coords.lattice(), None);
        assert_eq!(frames[1].symbols, vec!["Ar".to_string(), "Ar".to_string()]);
    }

    #[test]
    fn written_frames_read_back() {
        let frames = vec![
            XyzFrame {
                step: Some(3),
                symbols: vec!["C".into(), "H".into()],
                coords: Coords::periodic(Lattice::cubic(5.5), vec![V3([0.1, 0.2, 0.3]), V3([1.0, 2.0, 3.0])]),
            },
            XyzFrame {
                step: None,
                symbols: vec!["C".into()],
                coords: Coords::open(vec![V3([-1.5, 0.0, 2.25])]),
            },
        ];

        let mut buf = vec![];
        for frame in &frames {
            frame.to_writer(&mut buf).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(read_all(&text).unwrap(), frames);
    }

    #[test]
    fn malformed() {
        // truncated frame
        assert!(read_all("3\n\n Ar 0 0 0\n").is_err());
        // bad count
        assert!(read_all("three\n\n").is_err());
        // bad lattice
        assert!(read_all("1\nLattice=\"1 0 0 0 1 0\"\n Ar 0 0 0\n").is_err());
        assert!(read_all("1\nLattice=\"1 0 0 0 1 0 0 0 1\n Ar 0 0 0\n").is_err());
        // bad coordinate
        assert!(read_all("1\n\n Ar 0 zero 0\n").is_err());
        // empty input is an empty trajectory
        assert_eq!(read_all("").unwrap(), vec![]);
    }

    #[test]
    fn comment_pairs_split() {
        let pairs = comment_pairs(r#"a=1 b="x y" lone  c=z"#).unwrap();
        assert_eq!(pairs, vec![("a", "1"), ("b", "x y"), ("c", "z")]);
    }
}
