//! Columns of the filling tables and the quantities derived from them.

use std::path::Path;
use polars_core::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use crate::{
    bz::SQRT_3,
    spin::StableLabel,
    table::{self, Schema},
    Error,
};

/// Fixed positional columns of a filling table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    N,
    Energy,
    Bc,
    BcdX,
    BcdY,
    QmdX,
    QmdY,
}

/// Position of the optional label column holding the most stable
/// configuration.
pub const STABLE_INDEX: usize = 7;
const STABLE: &str = "stable";

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::N => "n",
            Column::Energy => "energy",
            Column::Bc => "bc_sum",
            Column::BcdX => "bcd_x_sum",
            Column::BcdY => "bcd_y_sum",
            Column::QmdX => "qmd_x_sum",
            Column::QmdY => "qmd_y_sum",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Column::N => 0,
            Column::Energy => 1,
            Column::Bc => 2,
            Column::BcdX => 3,
            Column::BcdY => 4,
            Column::QmdX => 5,
            Column::QmdY => 6,
        }
    }
}

/// A quantity plotted against the filling `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Observable {
    Energy,
    Bc,
    BcdX,
    BcdY,
    QmdX,
    QmdY,
    /// `bcd_y / 2 + bcd_x √3 / 2`, the dipole along the direction at
    /// 60° from the x axis.
    BcdRotated,
    /// `qmd_x / 2 + qmd_y √3 / 2`.
    QmdRotated,
}

impl Observable {
    pub fn columns(self) -> &'static [Column] {
        match self {
            Observable::Energy => &[Column::Energy],
            Observable::Bc => &[Column::Bc],
            Observable::BcdX => &[Column::BcdX],
            Observable::BcdY => &[Column::BcdY],
            Observable::QmdX => &[Column::QmdX],
            Observable::QmdY => &[Column::QmdY],
            Observable::BcdRotated => &[Column::BcdX, Column::BcdY],
            Observable::QmdRotated => &[Column::QmdX, Column::QmdY],
        }
    }

    /// Axis label.
    pub fn label(self) -> &'static str {
        match self {
            Observable::Energy => "energy",
            Observable::Bc => "BC",
            Observable::BcdX => "BCD X",
            Observable::BcdY => "BCD Y",
            Observable::QmdX => "QMD X",
            Observable::QmdY => "QMD Y",
            Observable::BcdRotated => "BCD Y'",
            Observable::QmdRotated => "QMD Y'",
        }
    }

    /// Short identifier, used in output file names.
    pub fn key(self) -> &'static str {
        match self {
            Observable::Energy => "energy",
            Observable::Bc => "bc",
            Observable::BcdX => "bcd_x",
            Observable::BcdY => "bcd_y",
            Observable::QmdX => "qmd_x",
            Observable::QmdY => "qmd_y",
            Observable::BcdRotated => "bcd_rot",
            Observable::QmdRotated => "qmd_rot",
        }
    }

    pub fn evaluate(self, t: &FillingTable) -> Result<Vec<f64>, Error> {
        let rotated = |a: Vec<f64>, b: Vec<f64>| -> Vec<f64> {
            a.iter().zip(&b).map(|(a, b)| a * 0.5 + b * SQRT_3 * 0.5).collect()
        };
        match self {
            Observable::Energy => t.column(Column::Energy),
            Observable::Bc => t.column(Column::Bc),
            Observable::BcdX => t.column(Column::BcdX),
            Observable::BcdY => t.column(Column::BcdY),
            Observable::QmdX => t.column(Column::QmdX),
            Observable::QmdY => t.column(Column::QmdY),
            Observable::BcdRotated =>
                Ok(rotated(t.column(Column::BcdY)?, t.column(Column::BcdX)?)),
            Observable::QmdRotated =>
                Ok(rotated(t.column(Column::QmdX)?, t.column(Column::QmdY)?)),
        }
    }
}

/// Schema loading `n`, the columns `observables` need and, if
/// `stable`, the label column.
pub fn schema(observables: &[Observable], stable: bool) -> Schema {
    let mut columns = vec![Column::N];
    for c in observables.iter().flat_map(|o| o.columns()) {
        if !columns.contains(c) {
            columns.push(*c)
        }
    }
    let schema = columns.into_iter()
        .fold(Schema::new(), |s, c| s.float(c.name(), c.index()));
    if stable { schema.text(STABLE, STABLE_INDEX) } else { schema }
}

/// One data file of quantities summed per filling.
#[derive(Debug, Clone)]
pub struct FillingTable {
    df: DataFrame,
}

impl FillingTable {
    pub fn load(path: impl AsRef<Path>, observables: &[Observable], stable: bool)
                -> Result<FillingTable, Error> {
        let df = table::read_table(path, &schema(observables, stable))?;
        Ok(FillingTable { df })
    }

    /// Like [`FillingTable::load`] but a missing file yields `None`.
    pub fn load_or_skip(path: impl AsRef<Path>, observables: &[Observable],
                        stable: bool) -> Result<Option<FillingTable>, Error> {
        let df = table::read_table_or_skip(path, &schema(observables, stable))?;
        Ok(df.map(|df| FillingTable { df }))
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn n(&self) -> Result<Vec<f64>, Error> {
        self.column(Column::N)
    }

    pub fn column(&self, c: Column) -> Result<Vec<f64>, Error> {
        table::floats(&self.df, c.name())
    }

    pub fn stable_labels(&self) -> Result<Vec<StableLabel>, Error> {
        Ok(table::labels(&self.df, STABLE)?.iter()
           .map(|l| StableLabel::parse(l.as_deref()))
           .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::PathBuf};
    use approx::assert_abs_diff_eq;
    use crate::spin::SpinConfig;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).expect("write fixture");
        path
    }

    #[test]
    fn schema_picks_needed_columns() {
        let s = schema(&[Observable::BcdRotated, Observable::BcdX], false);
        assert_eq!(s.names().collect::<Vec<_>>(),
                   vec!["n", "bcd_x_sum", "bcd_y_sum"]);
        let s = schema(&[Observable::Bc], true);
        assert_eq!(s.names().collect::<Vec<_>>(), vec!["n", "bc_sum", "stable"]);
    }

    #[test]
    fn derived_quantities() -> Result<(), Error> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write(dir.path(), "f.dat", "\
# n,energy,berry,bcd_x,bcd_y,qmd_x,qmd_y,stable
0.1,-1,0.5,2,4,6,8,TwinTmd
0.2,-2,0.6,0,2,0,0,Unknown
0.3,-3,0.7,0,0,2,0
");
        let all = [Observable::Bc, Observable::BcdRotated, Observable::QmdRotated];
        let t = FillingTable::load(&path, &all, true)?;
        assert_eq!(t.len(), 3);
        assert_eq!(t.n()?, vec![0.1, 0.2, 0.3]);
        assert_eq!(Observable::Bc.evaluate(&t)?, vec![0.5, 0.6, 0.7]);
        let bcd = Observable::BcdRotated.evaluate(&t)?;
        assert_abs_diff_eq!(bcd[0], 2. + SQRT_3, epsilon = 1e-12);
        assert_abs_diff_eq!(bcd[1], 1., epsilon = 1e-12);
        let qmd = Observable::QmdRotated.evaluate(&t)?;
        assert_abs_diff_eq!(qmd[0], 3. + 4. * SQRT_3, epsilon = 1e-12);
        assert_abs_diff_eq!(qmd[2], 1., epsilon = 1e-12);
        assert_eq!(t.stable_labels()?,
                   vec![StableLabel::Known(SpinConfig::Twin),
                        StableLabel::Unknown, StableLabel::Unknown]);
        Ok(())
    }

    #[test]
    fn missing_file() -> Result<(), Error> {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nope.dat");
        assert!(FillingTable::load_or_skip(&path, &[Observable::Bc], false)?
                .is_none());
        Ok(())
    }
}
