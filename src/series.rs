//! Column extraction from whitespace-delimited text data.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::Error;

/// Zero-based token positions selecting the `x` and `y` columns of a
/// data record.  Fixed at build time; see the `leading-columns` cargo
/// feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    /// Token index of the `x` value.
    pub x: usize,
    /// Token index of the `y` value.
    pub y: usize,
}

impl Columns {
    /// Columns 1 and 2: the spatial pair of a three-column `t x y`
    /// record, as written by the simulation.
    pub const SPATIAL: Columns = Columns { x: 1, y: 2 };

    /// Columns 0 and 1: the first two tokens of each record.
    pub const LEADING: Columns = Columns { x: 0, y: 1 };

    pub const fn new(x: usize, y: usize) -> Self {
        Columns { x, y }
    }
}

/// Two parallel sequences of floats, in file order.
///
/// No deduplication and no sorting: each data record of the input
/// contributes exactly one point, in the order the records appear.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Series {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Series {
    /// Read `path` and collect the columns selected by `columns`.
    ///
    /// The file handle is released when this returns; nothing is kept
    /// open while the data is plotted.
    pub fn from_path(path: impl AsRef<Path>, columns: Columns)
                     -> Result<Series, Error> {
        let file = File::open(path.as_ref()).map_err(Error::Io)?;
        Series::from_reader(BufReader::new(file), columns)
    }

    /// Collect the columns selected by `columns` from any line-oriented
    /// source.
    ///
    /// A line whose first character is `#` is a comment and is ignored
    /// in full, even if otherwise malformed.  Blank lines are skipped.
    /// Every other line must carry parseable float tokens at both
    /// selected positions; extra tokens are ignored.  The first
    /// offending line aborts the read, so either the whole file is
    /// accepted or no series is produced.
    pub fn from_reader(reader: impl BufRead, columns: Columns)
                       -> Result<Series, Error> {
        let mut series = Series::default();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(Error::Io)?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            series.x.push(parse_token(&tokens, columns.x, index + 1)?);
            series.y.push(parse_token(&tokens, columns.y, index + 1)?);
        }
        Ok(series)
    }

    /// The `x` values, in file order.
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// The `y` values, in file order.
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of points (one per data record).
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

fn parse_token(tokens: &[&str], column: usize, line: usize)
               -> Result<f64, Error> {
    let token = tokens.get(column)
        .ok_or(Error::MissingColumn { line, column })?;
    token.parse().map_err(|_| Error::InvalidNumber {
        line,
        token: (*token).to_string(),
    })
}


#[cfg(test)]
mod tests {
    use std::io::Write;
    use super::*;

    const SAMPLE: &[u8] = b"# header comment\n\
                            0.0 1.0 2.0\n\
                            1.0 3.0 4.0\n";

    #[test]
    fn spatial_columns() -> Result<(), Error> {
        let s = Series::from_reader(SAMPLE, Columns::SPATIAL)?;
        assert_eq!(s.x(), [1.0, 3.0]);
        assert_eq!(s.y(), [2.0, 4.0]);
        Ok(())
    }

    #[test]
    fn leading_columns() -> Result<(), Error> {
        let s = Series::from_reader(SAMPLE, Columns::LEADING)?;
        assert_eq!(s.x(), [0.0, 1.0]);
        assert_eq!(s.y(), [1.0, 3.0]);
        Ok(())
    }

    #[test]
    fn one_point_per_data_line() -> Result<(), Error> {
        let data = b"# comment\n1 2 3\n# another\n4 5 6\n7 8 9\n" as &[u8];
        let s = Series::from_reader(data, Columns::SPATIAL)?;
        assert_eq!(s.len(), 3);
        Ok(())
    }

    #[test]
    fn comments_never_contribute_even_if_malformed() -> Result<(), Error> {
        let data = b"#\n# not numbers at all\n#1.0 2.0 3.0\n" as &[u8];
        let s = Series::from_reader(data, Columns::SPATIAL)?;
        assert!(s.is_empty());
        Ok(())
    }

    #[test]
    fn blank_lines_are_skipped() -> Result<(), Error> {
        let data = b"0 1 2\n\n   \n3 4 5\n" as &[u8];
        let s = Series::from_reader(data, Columns::SPATIAL)?;
        assert_eq!(s.len(), 2);
        Ok(())
    }

    #[test]
    fn extra_tokens_are_ignored() -> Result<(), Error> {
        let data = b"0 1 2 trailing junk\n" as &[u8];
        let s = Series::from_reader(data, Columns::SPATIAL)?;
        assert_eq!((s.x(), s.y()), (&[1.0][..], &[2.0][..]));
        Ok(())
    }

    #[test]
    fn indented_comment_is_a_data_line() {
        // Only a `#` in the first character marks a comment.
        let data = b" # indented\n" as &[u8];
        match Series::from_reader(data, Columns::LEADING) {
            Err(Error::InvalidNumber { line: 1, token }) => {
                assert_eq!(token, "#")
            }
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
    }

    #[test]
    fn short_line_is_fatal() {
        let data = b"0 1 2\n1.0\n" as &[u8];
        match Series::from_reader(data, Columns::SPATIAL) {
            Err(Error::MissingColumn { line: 2, column: 1 }) => {}
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn non_numeric_token_is_fatal() {
        let data = b"a b c\n" as &[u8];
        match Series::from_reader(data, Columns::SPATIAL) {
            Err(Error::InvalidNumber { line: 1, token }) => {
                assert_eq!(token, "b")
            }
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
    }

    #[test]
    fn empty_input_yields_empty_series() -> Result<(), Error> {
        let s = Series::from_reader(b"" as &[u8], Columns::SPATIAL)?;
        assert!(s.is_empty());
        Ok(())
    }

    #[test]
    fn signed_fixed_point_records() -> Result<(), Error> {
        // The simulation writes `%+.8f`-style records.
        let data = b"+0.01000000 -0.99994736 +0.42146254\n" as &[u8];
        let s = Series::from_reader(data, Columns::SPATIAL)?;
        assert_eq!((s.x()[0], s.y()[0]), (-0.99994736, 0.42146254));
        Ok(())
    }

    #[test]
    fn from_path_reads_a_file() -> Result<(), Error> {
        let mut file = tempfile::NamedTempFile::new().map_err(Error::Io)?;
        write!(file, "# t x y\n+0.00000000 +0.50000000 -0.25000000\n")
            .map_err(Error::Io)?;
        let s = Series::from_path(file.path(), Columns::SPATIAL)?;
        assert_eq!((s.x(), s.y()), (&[0.5][..], &[-0.25][..]));
        Ok(())
    }

    #[test]
    fn from_path_missing_file() {
        match Series::from_path("no_such_data.txt", Columns::SPATIAL) {
            Err(Error::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("expected Io, got {:?}", other),
        }
    }
}
