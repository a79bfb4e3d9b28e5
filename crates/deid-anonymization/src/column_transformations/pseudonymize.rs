use super::{
    ColumnTransformation, ColumnTransformationError, ColumnTransformationOutput,
    ColumnTransformationResult,
};
use arrow::{
    array::{Array, ArrayRef, GenericStringArray, OffsetSizeTrait},
    datatypes::DataType,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Lowercase hex SHA-256 of the value's UTF-8 bytes. Unsalted on purpose:
/// equal inputs must keep producing equal outputs across runs.
pub fn hash_value(value: &str) -> String {
    let mut sha = Sha256::new();
    sha.update(value.as_bytes());
    format!("{:x}", sha.finalize())
}

fn hash_string_array<O: OffsetSizeTrait>(
    data: &ArrayRef,
) -> ColumnTransformationResult<ArrayRef> {
    let array = data
        .as_any()
        .downcast_ref::<GenericStringArray<O>>()
        .ok_or(ColumnTransformationError::DowncastFailed)?;

    Ok(Arc::new(
        array
            .iter()
            .map(|value| value.map(hash_value))
            .collect::<GenericStringArray<O>>(),
    ))
}

/// Replaces every string with its digest. Nulls stay null.
pub struct Pseudonymize;

impl ColumnTransformation for Pseudonymize {
    fn transform_data(&self, data: ArrayRef) -> ColumnTransformationResult<ArrayRef> {
        match data.data_type() {
            DataType::Utf8 => hash_string_array::<i32>(&data),
            DataType::LargeUtf8 => hash_string_array::<i64>(&data),
            _ => Err(ColumnTransformationError::UnsupportedType(
                data.data_type().clone(),
            )),
        }
    }

    fn output_format(
        &self,
        input: &DataType,
    ) -> ColumnTransformationResult<ColumnTransformationOutput> {
        match input {
            DataType::Utf8 | DataType::LargeUtf8 => Ok(ColumnTransformationOutput {
                data_type: input.clone(),
                nullable: false,
            }),
            _ => Err(ColumnTransformationError::UnsupportedType(input.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int32Array, LargeStringArray, StringArray};

    #[test]
    fn test_known_digests() {
        assert_eq!(
            hash_value(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hash_value("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_equal_values_hash_equally() {
        let array = Arc::new(StringArray::from(vec!["Alice", "Bob", "Alice"]));
        let result = Pseudonymize.transform_data(array).unwrap();
        let result = result.as_any().downcast_ref::<StringArray>().unwrap();

        assert_eq!(result.value(0), result.value(2));
        assert_ne!(result.value(0), result.value(1));
        assert_eq!(result.value(0), hash_value("Alice"));
        assert_eq!(result.value(1).len(), 64);
        assert!(result
            .value(1)
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_large_utf8_and_nulls() {
        let array = Arc::new(LargeStringArray::from(vec![Some("x"), None]));
        let result = Pseudonymize.transform_data(array).unwrap();

        assert_eq!(result.data_type(), &DataType::LargeUtf8);
        assert_eq!(
            vec![Some(hash_value("x")), None],
            result
                .as_any()
                .downcast_ref::<LargeStringArray>()
                .unwrap()
                .iter()
                .map(|v| v.map(String::from))
                .collect::<Vec<Option<String>>>()
        );
    }

    #[test]
    fn test_numbers_are_unsupported() {
        let array = Arc::new(Int32Array::from(vec![1]));

        assert!(matches!(
            Pseudonymize.transform_data(array),
            Err(ColumnTransformationError::UnsupportedType(DataType::Int32))
        ));
    }
}
