use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::Path;

pub use crate::constants::metadata::{SUBJECT_ID_COLUMN, TRIAL_ID_COLUMN};
use crate::errors::FoldError;
use crate::types::{ColumnName, MetadataRow};

/// Ordered, string-valued sample metadata (one row per sample).
///
/// Column names are unique and every row holds exactly one value per column.
/// Cells are kept as text so that tables survive a CSV round trip unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataTable {
    columns: Vec<ColumnName>,
    rows: Vec<MetadataRow>,
}

impl MetadataTable {
    /// Create an empty table with the given column names.
    pub fn new<I, C>(columns: I) -> Result<Self, FoldError>
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnName>,
    {
        let columns: Vec<ColumnName> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(FoldError::Table(format!("duplicate column '{column}'")));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Create a table from column names and rows, checking row widths.
    pub fn from_rows<I, C>(columns: I, rows: Vec<MetadataRow>) -> Result<Self, FoldError>
    where
        I: IntoIterator<Item = C>,
        C: Into<ColumnName>,
    {
        let mut table = Self::new(columns)?;
        table.rows.reserve(rows.len());
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append one row; it must have one value per column.
    pub fn push_row<I, V>(&mut self, row: I) -> Result<(), FoldError>
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let row: MetadataRow = row.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(FoldError::Table(format!(
                "row {} has {} values but the table has {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order.
    pub fn columns(&self) -> &[ColumnName] {
        &self.columns
    }

    /// All rows in order.
    pub fn rows(&self) -> &[MetadataRow] {
        &self.rows
    }

    /// Row at `idx`.
    pub fn row(&self, idx: usize) -> Option<&MetadataRow> {
        self.rows.get(idx)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` among the columns.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Position of `name`, or `FoldError::MissingColumn`.
    pub fn require_column(&self, name: &str) -> Result<usize, FoldError> {
        self.column_index(name)
            .ok_or_else(|| FoldError::MissingColumn(name.to_string()))
    }

    /// Value of column `name` in row `idx`.
    pub fn value(&self, idx: usize, name: &str) -> Option<&str> {
        let column = self.column_index(name)?;
        self.rows.get(idx).map(|row| row[column].as_str())
    }

    /// New table holding the rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Result<Self, FoldError> {
        let mut rows = Vec::with_capacity(indices.len());
        for &idx in indices {
            let row = self.rows.get(idx).ok_or_else(|| {
                FoldError::Table(format!(
                    "row index {idx} out of range for a table of {} rows",
                    self.rows.len()
                ))
            })?;
            rows.push(row.clone());
        }
        Ok(Self {
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Parse a CSV table whose first record is the header.
    pub fn read_csv<R: io::Read>(reader: R) -> Result<Self, FoldError> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?.clone();
        let mut table = Self::new(headers.iter())?;
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter())?;
        }
        Ok(table)
    }

    /// Write the table as CSV, header first.
    ///
    /// A table without columns writes nothing.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), FoldError> {
        if self.columns.is_empty() {
            return Ok(());
        }
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read a CSV table from `path`.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, FoldError> {
        let file = File::open(path.as_ref())?;
        Self::read_csv(io::BufReader::new(file))
    }

    /// Write the table to `path` as CSV, replacing any existing file.
    pub fn to_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<(), FoldError> {
        let file = File::create(path.as_ref())?;
        self.write_csv(io::BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_table() -> MetadataTable {
        MetadataTable::from_rows(
            ["subject_id", "trial_id", "clip_id"],
            vec![
                vec!["s1".into(), "t0".into(), "c0".into()],
                vec!["s1".into(), "t0".into(), "c1".into()],
                vec!["s2".into(), "t0".into(), "c2".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_columns_and_ragged_rows() {
        let err = MetadataTable::new(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, FoldError::Table(ref msg) if msg.contains("duplicate column 'a'")));

        let mut table = MetadataTable::new(["a", "b"]).unwrap();
        let err = table.push_row(["only_one"]).unwrap_err();
        assert!(matches!(err, FoldError::Table(ref msg) if msg.contains("has 1 values")));
        assert!(table.is_empty());
    }

    #[test]
    fn column_lookup_and_values() {
        let table = sample_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.column_index("trial_id"), Some(1));
        assert_eq!(table.value(2, "clip_id"), Some("c2"));
        assert_eq!(table.value(9, "clip_id"), None);
        assert!(matches!(
            table.require_column("label"),
            Err(FoldError::MissingColumn(ref name)) if name == "label"
        ));
    }

    #[test]
    fn select_preserves_requested_order() {
        let table = sample_table();
        let picked = table.select(&[2, 0]).unwrap();
        assert_eq!(picked.columns(), table.columns());
        assert_eq!(picked.value(0, "clip_id"), Some("c2"));
        assert_eq!(picked.value(1, "clip_id"), Some("c0"));
        assert!(table.select(&[3]).is_err());
    }

    #[test]
    fn csv_round_trip_keeps_quoted_values() {
        let mut table = sample_table();
        table.push_row(["s3", "t1", "needs, quoting"]).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("info.csv");
        table.to_csv_path(&path).unwrap();
        let loaded = MetadataTable::from_csv_path(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn header_only_csv_loads_as_empty_table() {
        let table = MetadataTable::new(["subject_id", "trial_id"]).unwrap();
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf.clone()).unwrap(), "subject_id,trial_id\n");

        let loaded = MetadataTable::read_csv(buf.as_slice()).unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.columns(), table.columns());
    }

    #[test]
    fn ragged_csv_is_rejected() {
        let err = MetadataTable::read_csv("a,b\n1,2\n3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, FoldError::Csv(_)));
    }
}
