use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Read;

/// A whole CSV source table with shared headers
#[derive(Debug, Clone, Default)]
pub struct Table {
    name: String,
    columns: HashMap<String, usize>,
    rows: Vec<csv::StringRecord>,
}

/// One row of a [`Table`], addressed by column name
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a HashMap<String, usize>,
    row: &'a csv::StringRecord,
}

impl Table {
    /// Parse a CSV document with a header line
    pub fn from_reader(name: &str, reader: impl Read) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let columns = csv_reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", name))?
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.trim_start_matches('\u{feff}').to_string(), idx))
            .collect();

        let mut rows = Vec::new();
        for row in csv_reader.records() {
            let row = row.with_context(|| format!("Failed to parse record in {}", name))?;
            rows.push(row);
        }

        Ok(Self {
            name: name.to_string(),
            columns,
            rows,
        })
    }

    pub fn from_csv(name: &str, text: &str) -> Result<Self> {
        Self::from_reader(name, text.as_bytes())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.rows.iter().map(move |row| Record {
            columns: &self.columns,
            row,
        })
    }
}

impl<'a> Record<'a> {
    /// Raw field text; missing columns and short rows read as empty
    pub fn get(&self, column: &str) -> &'a str {
        self.columns
            .get(column)
            .and_then(|&idx| self.row.get(idx))
            .unwrap_or("")
    }

    /// Field text, or `None` when blank
    pub fn opt(&self, column: &str) -> Option<&'a str> {
        let value = self.get(column);
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }

    pub fn int(&self, column: &str, default: i64) -> i64 {
        parse_int(self.opt(column), default)
    }

    pub fn flag(&self, column: &str, default: bool) -> bool {
        self.int(column, default as i64) != 0
    }
}

/// Parse an integer field, falling back to `default` when blank or malformed
pub fn parse_int(value: Option<&str>, default: i64) -> i64 {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// A value bound into an INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Integer(if value { 1 } else { 0 })
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

/// Rows that can be written by the SQLite writer, in schema column order
pub trait ToSqlRow {
    fn to_sql_row(&self) -> Vec<SqlValue>;
}
