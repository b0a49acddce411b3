//! Tabular result sets produced by stored-procedure execution.
//!
//! Sites return procedure results as one or more tables. The reconciler
//! compares replica payloads by value, so the representation here is fully
//! owned and has total equality (floats compare bitwise).

use serde::{Deserialize, Serialize};

/// Column data types supported in procedure results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Tinyint,
    Integer,
    Bigint,
    Float,
    Text,
}

/// Schema entry for a single result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name as reported to the client.
    pub name: String,
    /// Declared data type for every value in this column.
    pub column_type: ColumnType,
}

impl ColumnInfo {
    /// Create a new column schema entry.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// A single field in a result row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FieldValue {
    Null,
    Tinyint(i8),
    Integer(i32),
    Bigint(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Check whether this value is storable in a column of the given type.
    ///
    /// `Null` is storable in any column.
    pub fn matches(&self, column_type: ColumnType) -> bool {
        matches!(
            (self, column_type),
            (FieldValue::Null, _)
                | (FieldValue::Tinyint(_), ColumnType::Tinyint)
                | (FieldValue::Integer(_), ColumnType::Integer)
                | (FieldValue::Bigint(_), ColumnType::Bigint)
                | (FieldValue::Float(_), ColumnType::Float)
                | (FieldValue::Text(_), ColumnType::Text)
        )
    }
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Tinyint(a), FieldValue::Tinyint(b)) => a == b,
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
            (FieldValue::Bigint(a), FieldValue::Bigint(b)) => a == b,
            // Bitwise so NaN payloads still compare deterministically.
            (FieldValue::Float(a), FieldValue::Float(b)) => a.to_bits() == b.to_bits(),
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for FieldValue {}

/// An owned result table: a schema plus zero or more rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Ordered column schema.
    pub columns: Vec<ColumnInfo>,
    /// Row data, one `Vec<FieldValue>` per row, arity matching `columns`.
    pub rows: Vec<Vec<FieldValue>>,
}

impl ResultTable {
    /// Create an empty table with the given schema.
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row.
    ///
    /// # Panics
    ///
    /// Panics if the row arity does not match the schema, or a non-null
    /// field does not match its column's declared type.
    pub fn add_row(&mut self, row: Vec<FieldValue>) {
        assert_eq!(
            row.len(),
            self.columns.len(),
            "row arity must match the table schema"
        );
        for (field, column) in row.iter().zip(&self.columns) {
            assert!(
                field.matches(column.column_type),
                "field does not match declared type of column {}",
                column.name
            );
        }
        self.rows.push(row);
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns in the schema.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_column_table() -> ResultTable {
        ResultTable::new(vec![
            ColumnInfo::new("id", ColumnType::Bigint),
            ColumnInfo::new("name", ColumnType::Text),
        ])
    }

    #[test]
    fn test_add_row_and_counts() {
        let mut table = two_column_table();
        assert!(table.is_empty());

        table.add_row(vec![
            FieldValue::Bigint(1),
            FieldValue::Text("alpha".to_string()),
        ]);
        table.add_row(vec![FieldValue::Bigint(2), FieldValue::Null]);

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    #[should_panic(expected = "row arity")]
    fn test_add_row_rejects_wrong_arity() {
        let mut table = two_column_table();
        table.add_row(vec![FieldValue::Bigint(1)]);
    }

    #[test]
    #[should_panic(expected = "declared type")]
    fn test_add_row_rejects_wrong_type() {
        let mut table = two_column_table();
        table.add_row(vec![
            FieldValue::Text("not an id".to_string()),
            FieldValue::Text("alpha".to_string()),
        ]);
    }

    #[test]
    fn test_value_equality() {
        let mut a = two_column_table();
        a.add_row(vec![
            FieldValue::Bigint(1),
            FieldValue::Text("alpha".to_string()),
        ]);

        let mut b = two_column_table();
        b.add_row(vec![
            FieldValue::Bigint(1),
            FieldValue::Text("alpha".to_string()),
        ]);

        assert_eq!(a, b);

        b.rows[0][1] = FieldValue::Text("beta".to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        assert_eq!(FieldValue::Float(1.5), FieldValue::Float(1.5));
        assert_ne!(FieldValue::Float(1.5), FieldValue::Float(2.5));
        // NaN == NaN under bitwise comparison, so tables containing NaN
        // still reconcile across replicas.
        assert_eq!(FieldValue::Float(f64::NAN), FieldValue::Float(f64::NAN));
        assert_ne!(FieldValue::Float(0.0), FieldValue::Float(-0.0));
    }
}
