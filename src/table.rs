//! Loading of the delimited text tables written by the simulation.
//!
//! The files have no header: lines starting with `#` are comments and
//! columns are identified by position only.  Fields are separated by
//! commas or, when a line holds no comma, by white space.  A [`Schema`]
//! names the columns to keep and their positions.

use std::{fs, io, path::{Path, PathBuf}};
use polars_core::prelude::*;
use tracing::{debug, warn};
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Required numeric field.
    Float,
    /// Optional free-form label; stored as null when the row is too short.
    Text,
}

/// Columns to extract from a table, as `(name, position, kind)`.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<(String, usize, Kind)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns named `names`, taken in order from positions `0, 1,...`.
    pub fn floats(names: &[&str]) -> Self {
        names.iter().enumerate()
            .fold(Schema::new(), |s, (i, name)| s.float(name, i))
    }

    #[must_use]
    pub fn float(mut self, name: &str, index: usize) -> Self {
        self.columns.push((name.to_string(), index, Kind::Float));
        self
    }

    #[must_use]
    pub fn text(mut self, name: &str, index: usize) -> Self {
        self.columns.push((name.to_string(), index, Kind::Text));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _, _)| n.as_str())
    }
}

enum Buffer {
    Float(Vec<f64>),
    Text(Vec<Option<String>>),
}

/// Split a data line into fields, or return `None` for comments and
/// blank lines.
fn fields(line: &str) -> Option<Vec<&str>> {
    let line = match line.find('#') {
        Some(i) => &line[.. i],
        None => line,
    };
    let line = line.trim();
    if line.is_empty() {
        return None
    }
    if line.contains(',') {
        Some(line.split(',').map(str::trim).collect())
    } else {
        Some(line.split_whitespace().collect())
    }
}

/// Parse `content` (read from `path`) according to `schema`.
pub fn parse_table(content: &str, path: &Path, schema: &Schema)
                   -> Result<DataFrame, Error> {
    let mut buffers: Vec<Buffer> = schema.columns.iter()
        .map(|(_, _, kind)| match kind {
            Kind::Float => Buffer::Float(Vec::new()),
            Kind::Text => Buffer::Text(Vec::new()),
        })
        .collect();
    for (lineno, line) in content.lines().enumerate() {
        let Some(fields) = fields(line) else { continue };
        for ((name, index, _), buf) in schema.columns.iter().zip(&mut buffers) {
            let field = fields.get(*index).filter(|f| !f.is_empty());
            match buf {
                Buffer::Float(v) => {
                    let field = field.ok_or_else(|| Error::Parse {
                        path: path.to_path_buf(),
                        line: lineno + 1,
                        message: format!("missing column {} ({:?}), \
                                          the row has {} fields",
                                         index, name, fields.len()),
                    })?;
                    let x = field.parse::<f64>().map_err(|e| Error::Parse {
                        path: path.to_path_buf(),
                        line: lineno + 1,
                        message: format!("column {} ({:?}): {:?}: {}",
                                         index, name, field, e),
                    })?;
                    v.push(x)
                }
                Buffer::Text(v) => v.push(field.map(|f| f.to_string())),
            }
        }
    }
    let series: Vec<Series> = schema.columns.iter().zip(buffers)
        .map(|((name, _, _), buf)| match buf {
            Buffer::Float(v) => Series::new(name, v),
            Buffer::Text(v) => Series::new(name, v),
        })
        .collect();
    Ok(DataFrame::new(series)?)
}

/// Load the table at `path`.
pub fn read_table(path: impl AsRef<Path>, schema: &Schema)
                  -> Result<DataFrame, Error> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::FileNotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied =>
            Error::PermissionDenied(path.to_path_buf()),
        _ => Error::Io { path: path.to_path_buf(), source: e },
    })?;
    let df = parse_table(&content, path, schema)?;
    debug!(path = %path.display(), rows = df.height(), "loaded table");
    Ok(df)
}

/// Like [`read_table`] but a missing file is reported and skipped.
pub fn read_table_or_skip(path: impl AsRef<Path>, schema: &Schema)
                          -> Result<Option<DataFrame>, Error> {
    match read_table(path, schema) {
        Ok(df) => Ok(Some(df)),
        Err(Error::FileNotFound(p)) => {
            warn!(path = %p.display(), "file not found, skipping");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Values of the numeric column `name`.
pub fn floats(df: &DataFrame, name: &str) -> Result<Vec<f64>, Error> {
    Ok(df.column(name)?.f64()?.into_iter()
       .map(|x| x.unwrap_or(f64::NAN))
       .collect())
}

/// Values of the label column `name`, `None` where absent.
pub fn labels(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, Error> {
    Ok(df.column(name)?.str()?.into_iter()
       .map(|s| s.map(str::to_string))
       .collect())
}

/// The first column of the first existing file among `paths`.  It is
/// the common x axis of the figures aggregating several files.
pub fn n_axis_template<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<f64>, Error> {
    let schema = Schema::floats(&["n"]);
    for path in paths {
        if path.as_ref().exists() {
            let df = read_table(path, &schema)?;
            return floats(&df, "n")
        }
    }
    Err(Error::NoDataFiles)
}

/// Paths from `paths` that do not exist.
pub fn missing<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    paths.iter()
        .map(|p| p.as_ref())
        .filter(|p| !p.exists())
        .map(Path::to_path_buf)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FILLING: &str = "\
# n,energy,berry,bcd_x,bcd_y,qmd_x,qmd_y
0.0,-1.5,0.0,0.1,0.2,0.3,0.4
0.5,-1.0,0.5,1.1,1.2,1.3,1.4

1.0,-0.5,1.0,2.1,2.2,2.3,2.4   # trailing comment
";

    fn parse(content: &str, schema: &Schema) -> Result<DataFrame, Error> {
        parse_table(content, Path::new("test.dat"), schema)
    }

    #[test]
    fn positional_columns() -> Result<(), Error> {
        let schema = Schema::new().float("n", 0).float("bcd_x", 3)
            .float("qmd_y", 6);
        let df = parse(FILLING, &schema)?;
        assert_eq!(df.height(), 3);
        assert_eq!(df.get_column_names(), vec!["n", "bcd_x", "qmd_y"]);
        assert_eq!(floats(&df, "n")?, vec![0.0, 0.5, 1.0]);
        assert_eq!(floats(&df, "bcd_x")?, vec![0.1, 1.1, 2.1]);
        assert_eq!(floats(&df, "qmd_y")?, vec![0.4, 1.4, 2.4]);
        Ok(())
    }

    #[test]
    fn whitespace_delimited() -> Result<(), Error> {
        let df = parse("# n e\n 1  2\n3\t4\n", &Schema::floats(&["n", "e"]))?;
        assert_eq!(floats(&df, "e")?, vec![2., 4.]);
        Ok(())
    }

    #[test]
    fn optional_label_column() -> Result<(), Error> {
        let schema = Schema::new().float("n", 0).text("stable", 2);
        let df = parse("0.1,1,FmTmd\n0.2,2\n0.3,3,TwinTmd\n", &schema)?;
        assert_eq!(labels(&df, "stable")?,
                   vec![Some("FmTmd".to_string()), None,
                        Some("TwinTmd".to_string())]);
        Ok(())
    }

    #[test]
    fn short_row_is_an_error() {
        let schema = Schema::floats(&["n", "energy", "bc_sum"]);
        match parse("0.0,1.0,2.0\n0.5,1.5\n", &schema) {
            Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn garbage_is_an_error() {
        match parse("0.0,abc\n", &Schema::floats(&["n", "e"])) {
            Err(Error::Parse { line: 1, message, .. }) =>
                assert!(message.contains("abc")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_skipped() -> Result<(), Error> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.dat");
        assert!(matches!(read_table(&path, &Schema::floats(&["n"])),
                         Err(Error::FileNotFound(_))));
        assert!(read_table_or_skip(&path, &Schema::floats(&["n"]))?.is_none());
        Ok(())
    }

    #[test]
    fn template_from_first_existing_file() -> Result<(), Error> {
        let dir = tempfile::tempdir().expect("tempdir");
        let absent = dir.path().join("a.dat");
        let present = dir.path().join("b.dat");
        let mut f = fs::File::create(&present).expect("create");
        writeln!(f, "# n\n0.25,9\n0.75,9").expect("write");
        let paths = [absent.clone(), present];
        assert_eq!(n_axis_template(&paths)?, vec![0.25, 0.75]);
        assert_eq!(missing(&paths), vec![absent.clone()]);
        assert!(matches!(n_axis_template(&[absent]), Err(Error::NoDataFiles)));
        Ok(())
    }
}
