use serde::{Deserialize, Serialize};

use crate::error::{BayesError, Result};

/// A single named column of observations.
///
/// Discrete nodes accept integer-coded (`Int`) or label-coded (`Str`)
/// columns; continuous nodes use `Real`. Anything else is rejected at the
/// estimation boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataColumn {
    /// Integer level codes for a discrete variable.
    Int(Vec<i64>),
    /// String level labels for a discrete variable.
    Str(Vec<String>),
    /// Real values for a continuous variable.
    Real(Vec<f64>),
}

impl DataColumn {
    pub fn len(&self) -> usize {
        match self {
            DataColumn::Int(v) => v.len(),
            DataColumn::Str(v) => v.len(),
            DataColumn::Real(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Try to get the column as integer codes
    pub fn as_int(&self) -> Option<&[i64]> {
        match self {
            DataColumn::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get the column as string labels
    pub fn as_str(&self) -> Option<&[String]> {
        match self {
            DataColumn::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get the column as real values
    pub fn as_real(&self) -> Option<&[f64]> {
        match self {
            DataColumn::Real(v) => Some(v),
            _ => None,
        }
    }
}

/// A table with one named column per node.
///
/// This is the boundary type shared by the sampling engine (which produces
/// tables) and parameter estimation (which consumes them). Columns are kept
/// in insertion order; all columns have the same number of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    names: Vec<String>,
    columns: Vec<DataColumn>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, DataColumn::len)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Append a named column; all columns must share one row count.
    pub fn push_column(&mut self, name: &str, column: DataColumn) -> Result<()> {
        if self.names.iter().any(|n| n == name) {
            return Err(BayesError::Data(format!("duplicate column {name}")));
        }
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(BayesError::Data(format!(
                "column {name} has {} rows, table has {}",
                column.len(),
                self.n_rows()
            )));
        }
        self.names.push(name.to_string());
        self.columns.push(column);
        Ok(())
    }

    /// Replace an existing column, keeping its position.
    pub fn set_column(&mut self, name: &str, column: DataColumn) -> Result<()> {
        if !self.columns.is_empty() && column.len() != self.n_rows() {
            return Err(BayesError::Data(format!(
                "column {name} has {} rows, table has {}",
                column.len(),
                self.n_rows()
            )));
        }
        match self.names.iter().position(|n| n == name) {
            Some(i) => {
                self.columns[i] = column;
                Ok(())
            }
            None => Err(BayesError::Data(format!("no column named {name}"))),
        }
    }

    pub fn column(&self, name: &str) -> Option<&DataColumn> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    fn required(&self, name: &str) -> Result<&DataColumn> {
        self.column(name)
            .ok_or_else(|| BayesError::Data(format!("no column named {name}")))
    }

    /// Derive a discrete node's level set from the observed distinct
    /// values, rendered as strings and sorted for determinism.
    pub fn infer_levels(&self, name: &str) -> Result<Vec<String>> {
        let mut distinct: Vec<String> = match self.required(name)? {
            DataColumn::Int(v) => v.iter().map(|x| x.to_string()).collect(),
            DataColumn::Str(v) => v.clone(),
            DataColumn::Real(_) => {
                return Err(BayesError::UnsupportedColumnType {
                    column: name.to_string(),
                    reason: "cannot infer discrete levels from a real-valued column".to_string(),
                });
            }
        };
        distinct.sort();
        distinct.dedup();
        Ok(distinct)
    }

    /// Recode a discrete column into level indices against `levels`.
    ///
    /// Integer columns are interpreted as codes into `levels`; string
    /// columns are matched by label. Out-of-range codes and unknown labels
    /// are errors, not silently dropped rows.
    pub fn discrete_codes(&self, name: &str, levels: &[String]) -> Result<Vec<usize>> {
        match self.required(name)? {
            DataColumn::Int(values) => values
                .iter()
                .map(|&v| {
                    if v < 0 || v as usize >= levels.len() {
                        Err(BayesError::UnsupportedColumnType {
                            column: name.to_string(),
                            reason: format!("code {v} out of range for {} levels", levels.len()),
                        })
                    } else {
                        Ok(v as usize)
                    }
                })
                .collect(),
            DataColumn::Str(values) => values
                .iter()
                .map(|v| {
                    levels.iter().position(|l| l == v).ok_or_else(|| {
                        BayesError::UnsupportedColumnType {
                            column: name.to_string(),
                            reason: format!("value {v:?} not in levels"),
                        }
                    })
                })
                .collect(),
            DataColumn::Real(_) => Err(BayesError::UnsupportedColumnType {
                column: name.to_string(),
                reason: "real-valued column where a discrete column was expected".to_string(),
            }),
        }
    }

    /// Real values of a continuous column.
    pub fn real_values(&self, name: &str) -> Result<&[f64]> {
        match self.required(name)? {
            DataColumn::Real(values) => Ok(values),
            _ => Err(BayesError::UnsupportedColumnType {
                column: name.to_string(),
                reason: "expected a real-valued column".to_string(),
            }),
        }
    }

    /// Render the table as CSV with a header row.
    pub fn to_csv(&self) -> String {
        let mut out = self.names.join(",");
        out.push('\n');
        for row in 0..self.n_rows() {
            let mut fields = Vec::with_capacity(self.columns.len());
            for column in &self.columns {
                match column {
                    DataColumn::Int(v) => fields.push(v[row].to_string()),
                    DataColumn::Str(v) => fields.push(v[row].clone()),
                    DataColumn::Real(v) => fields.push(v[row].to_string()),
                }
            }
            out.push_str(&fields.join(","));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DataTable {
        let mut t = DataTable::new();
        t.push_column("A", DataColumn::Int(vec![0, 1, 1, 0])).unwrap();
        t.push_column(
            "B",
            DataColumn::Str(vec![
                "no".to_string(),
                "yes".to_string(),
                "yes".to_string(),
                "no".to_string(),
            ]),
        )
        .unwrap();
        t
    }

    #[test]
    fn test_push_column_rejects_mismatched_rows() {
        let mut t = table();
        let result = t.push_column("C", DataColumn::Int(vec![1, 2]));
        assert!(result.is_err());
        assert_eq!(t.n_columns(), 2);
    }

    #[test]
    fn test_infer_levels_sorts_and_dedups() {
        let t = table();
        assert_eq!(t.infer_levels("A").unwrap(), vec!["0", "1"]);
        assert_eq!(t.infer_levels("B").unwrap(), vec!["no", "yes"]);
    }

    #[test]
    fn test_discrete_codes_for_strings() {
        let t = table();
        let levels = vec!["no".to_string(), "yes".to_string()];
        assert_eq!(t.discrete_codes("B", &levels).unwrap(), vec![0, 1, 1, 0]);
    }

    #[test]
    fn test_discrete_codes_rejects_out_of_range() {
        let t = table();
        let levels = vec!["0".to_string()];
        assert!(t.discrete_codes("A", &levels).is_err());
    }

    #[test]
    fn test_csv_round_layout() {
        let t = table();
        let csv = t.to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("A,B"));
        assert_eq!(lines.next(), Some("0,no"));
    }
}
