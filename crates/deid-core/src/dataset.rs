use crate::error::DatasetError;
use arrow::{
    array::{Array, ArrayRef},
    datatypes::{DataType, SchemaRef},
    record_batch::{RecordBatch, RecordBatchOptions},
};

/// Semantic class of a column as far as anonymization is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Numeric,
    Text,
}

impl ColumnKind {
    /// Types without a semantic kind (booleans, temporals, nested types, ...)
    /// resolve to `None`.
    pub fn from_data_type(data_type: &DataType) -> Option<Self> {
        match data_type {
            DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::Float32
            | DataType::Float64 => Some(ColumnKind::Numeric),
            DataType::Utf8 | DataType::LargeUtf8 => Some(ColumnKind::Text),
            _ => None,
        }
    }
}

/// A fully materialized table: named, typed columns of equal length.
///
/// Backed by a single arrow [`RecordBatch`]. The row count is tracked
/// explicitly, so a dataset without any columns still knows how many rows it
/// has.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    pub fn try_new(schema: SchemaRef, columns: Vec<ArrayRef>) -> Result<Self, DatasetError> {
        let num_rows = columns.first().map_or(0, |column| column.len());
        Self::try_new_with_rows(schema, columns, num_rows)
    }

    pub fn try_new_with_rows(
        schema: SchemaRef,
        columns: Vec<ArrayRef>,
        num_rows: usize,
    ) -> Result<Self, DatasetError> {
        let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
        let batch = RecordBatch::try_new_with_options(schema, columns, &options)?;
        Ok(Self { batch })
    }

    pub fn empty(schema: SchemaRef) -> Self {
        Self {
            batch: RecordBatch::new_empty(schema),
        }
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.batch
            .schema_ref()
            .fields()
            .iter()
            .map(|field| field.name().as_str())
            .collect()
    }

    pub fn columns(&self) -> &[ArrayRef] {
        self.batch.columns()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// `Ok(None)` means the column exists but has no semantic kind.
    pub fn column_kind(&self, name: &str) -> Result<Option<ColumnKind>, DatasetError> {
        let field = self
            .batch
            .schema_ref()
            .field_with_name(name)
            .map_err(|_| DatasetError::UnknownColumn(name.to_string()))?;

        Ok(ColumnKind::from_data_type(field.data_type()))
    }

    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn into_record_batch(self) -> RecordBatch {
        self.batch
    }
}

impl From<RecordBatch> for Dataset {
    fn from(batch: RecordBatch) -> Self {
        Self { batch }
    }
}

impl From<Dataset> for RecordBatch {
    fn from(dataset: Dataset) -> Self {
        dataset.batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::{BooleanArray, Int32Array, StringArray},
        datatypes::{Field, Schema},
    };
    use std::sync::Arc;

    fn people() -> Dataset {
        let schema = Schema::new(vec![
            Field::new("age", DataType::Int32, false),
            Field::new("name", DataType::Utf8, true),
            Field::new("active", DataType::Boolean, false),
        ]);

        Dataset::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int32Array::from(vec![23, 47, 8])),
                Arc::new(StringArray::from(vec![Some("Alice"), None, Some("Alice")])),
                Arc::new(BooleanArray::from(vec![true, false, true])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_column_kinds() {
        let dataset = people();

        assert_eq!(dataset.column_kind("age").unwrap(), Some(ColumnKind::Numeric));
        assert_eq!(dataset.column_kind("name").unwrap(), Some(ColumnKind::Text));
        assert_eq!(dataset.column_kind("active").unwrap(), None);
        assert!(matches!(
            dataset.column_kind("zip"),
            Err(DatasetError::UnknownColumn(name)) if name == "zip"
        ));
    }

    #[test]
    fn test_float_and_large_utf8_kinds() {
        assert_eq!(
            ColumnKind::from_data_type(&DataType::Float32),
            Some(ColumnKind::Numeric)
        );
        assert_eq!(
            ColumnKind::from_data_type(&DataType::LargeUtf8),
            Some(ColumnKind::Text)
        );
        assert_eq!(ColumnKind::from_data_type(&DataType::Date32), None);
    }

    #[test]
    fn test_shape() {
        let dataset = people();

        assert_eq!(dataset.num_rows(), 3);
        assert_eq!(dataset.num_columns(), 3);
        assert_eq!(dataset.column_names(), vec!["age", "name", "active"]);
        assert_eq!(dataset.column("age").unwrap().len(), 3);
        assert!(dataset.column("zip").is_none());
    }

    #[test]
    fn test_zero_columns_keep_row_count() {
        let dataset = Dataset::try_new_with_rows(Arc::new(Schema::empty()), vec![], 4).unwrap();

        assert_eq!(dataset.num_columns(), 0);
        assert_eq!(dataset.num_rows(), 4);
    }

    #[test]
    fn test_empty() {
        let schema = Arc::new(Schema::new(vec![Field::new("age", DataType::Int64, true)]));
        let dataset = Dataset::empty(schema);

        assert_eq!(dataset.num_rows(), 0);
        assert_eq!(dataset.column_names(), vec!["age"]);
    }

    #[test]
    fn test_ragged_columns_are_rejected() {
        let schema = Schema::new(vec![
            Field::new("a", DataType::Int32, false),
            Field::new("b", DataType::Int32, false),
        ]);

        let result = Dataset::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int32Array::from(vec![1, 2])),
                Arc::new(Int32Array::from(vec![1])),
            ],
        );

        assert!(matches!(result, Err(DatasetError::Arrow(_))));
    }

    #[test]
    fn test_record_batch_round_trip() {
        let dataset = people();
        let batch: RecordBatch = dataset.clone().into();

        assert_eq!(Dataset::from(batch), dataset);
    }
}
