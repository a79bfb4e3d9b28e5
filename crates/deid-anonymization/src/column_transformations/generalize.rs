use super::{
    ColumnTransformation, ColumnTransformationError, ColumnTransformationOutput,
    ColumnTransformationResult,
};
use crate::directive::IntervalSize;
use arrow::{
    array::{Array, ArrayRef, Float64Array, PrimitiveArray},
    compute::cast,
    datatypes::{
        ArrowPrimitiveType, DataType, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
        UInt16Type, UInt32Type, UInt64Type, UInt8Type,
    },
    error::ArrowError,
};
use deid_core::ColumnKind;
use std::sync::Arc;

/// Lower bound of the zero-anchored bucket of width `interval` containing `value`.
pub(crate) fn bucket_lower_bound(value: f64, interval: f64) -> f64 {
    (value / interval).floor() * interval
}

fn bucket_integers<T>(data: &ArrayRef, interval: u64) -> ColumnTransformationResult<ArrayRef>
where
    T: ArrowPrimitiveType,
    T::Native: Into<i128> + TryFrom<i128>,
{
    let array = data
        .as_any()
        .downcast_ref::<PrimitiveArray<T>>()
        .ok_or(ColumnTransformationError::DowncastFailed)?;
    let interval = i128::from(interval);

    let bucketed = array.try_unary::<_, T, ArrowError>(|value| {
        let value: i128 = value.into();
        let bound = value.div_euclid(interval) * interval;
        T::Native::try_from(bound).map_err(|_| {
            ArrowError::CastError(format!(
                "bucket lower bound {} of value {} does not fit {}",
                bound,
                value,
                T::DATA_TYPE
            ))
        })
    })?;

    Ok(Arc::new(bucketed))
}

fn bucket_floats(
    data: &ArrayRef,
    interval: IntervalSize,
) -> ColumnTransformationResult<ArrayRef> {
    let interval = interval.as_f64();
    let widened = cast(data, &DataType::Float64)?;
    let values = widened
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or(ColumnTransformationError::DowncastFailed)?;

    let bucketed: ArrayRef = Arc::new(
        values.unary::<_, Float64Type>(|value| bucket_lower_bound(value, interval)),
    );

    Ok(cast(&bucketed, data.data_type())?)
}

/// Replaces every numeric value with the lower bound of its bucket.
///
/// Integer columns are bucketed exactly in their own type. A lower bound below
/// the type's minimum (`-128` in an `Int8` column with width 10) is reported
/// as an error instead of becoming null. Float columns are bucketed as `f64`.
pub struct Generalize {
    interval: IntervalSize,
}

impl Generalize {
    pub fn new(interval: IntervalSize) -> Self {
        Self { interval }
    }
}

impl ColumnTransformation for Generalize {
    fn transform_data(&self, data: ArrayRef) -> ColumnTransformationResult<ArrayRef> {
        let interval = self.interval.get();

        match data.data_type() {
            DataType::Int8 => bucket_integers::<Int8Type>(&data, interval),
            DataType::Int16 => bucket_integers::<Int16Type>(&data, interval),
            DataType::Int32 => bucket_integers::<Int32Type>(&data, interval),
            DataType::Int64 => bucket_integers::<Int64Type>(&data, interval),
            DataType::UInt8 => bucket_integers::<UInt8Type>(&data, interval),
            DataType::UInt16 => bucket_integers::<UInt16Type>(&data, interval),
            DataType::UInt32 => bucket_integers::<UInt32Type>(&data, interval),
            DataType::UInt64 => bucket_integers::<UInt64Type>(&data, interval),
            DataType::Float32 | DataType::Float64 => bucket_floats(&data, self.interval),
            other => Err(ColumnTransformationError::UnsupportedType(other.clone())),
        }
    }

    fn output_format(
        &self,
        input: &DataType,
    ) -> ColumnTransformationResult<ColumnTransformationOutput> {
        match ColumnKind::from_data_type(input) {
            Some(ColumnKind::Numeric) => Ok(ColumnTransformationOutput {
                data_type: input.clone(),
                nullable: false,
            }),
            _ => Err(ColumnTransformationError::UnsupportedType(input.clone())),
        }
    }
}
