use crate::{
    column_transformations::{
        transformation_for, ColumnTransformation, ColumnTransformationOutput,
        ColumnTransformationResult, Pseudonymize,
    },
    directive::{AnonymizationRequest, UnlistedTextPolicy},
    error::AnonymizationError,
};
use arrow::{
    array::ArrayRef,
    datatypes::{Field, FieldRef, Schema},
};
use deid_core::{ColumnKind, Dataset};
use std::sync::Arc;

pub(crate) enum ColumnAction {
    Passthrough,
    Transform {
        kind: ColumnKind,
        transformation: Box<dyn ColumnTransformation>,
    },
}

/// The action for every column of a schema, resolved once before any data is
/// touched.
pub(crate) struct ColumnPlan {
    actions: Vec<ColumnAction>,
    unmatched: Vec<String>,
}

impl ColumnPlan {
    pub(crate) fn resolve(
        schema: &Schema,
        request: &AnonymizationRequest,
    ) -> Result<Self, AnonymizationError> {
        let intervals = request.directives.validate()?;

        let actions = schema
            .fields()
            .iter()
            .map(|field| {
                let kind = ColumnKind::from_data_type(field.data_type());
                match (intervals.get(field.name().as_str()), kind) {
                    (Some(interval), Some(kind)) => Ok(ColumnAction::Transform {
                        kind,
                        transformation: transformation_for(kind, *interval),
                    }),
                    (Some(_), None) => Err(AnonymizationError::UnsupportedColumnType {
                        column: field.name().clone(),
                        data_type: field.data_type().clone(),
                    }),
                    (None, Some(ColumnKind::Text))
                        if request.unlisted_text == UnlistedTextPolicy::Hash =>
                    {
                        Ok(ColumnAction::Transform {
                            kind: ColumnKind::Text,
                            transformation: Box::new(Pseudonymize),
                        })
                    }
                    (None, _) => Ok(ColumnAction::Passthrough),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut unmatched: Vec<String> = intervals
            .keys()
            .filter(|column| schema.field_with_name(column).is_err())
            .map(|column| column.to_string())
            .collect();
        unmatched.sort();

        Ok(Self { actions, unmatched })
    }

    pub(crate) fn len(&self) -> usize {
        self.actions.len()
    }

    pub(crate) fn action(&self, index: usize) -> &ColumnAction {
        &self.actions[index]
    }

    /// Directive names that match no column. They are ignored.
    pub(crate) fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    pub(crate) fn transform_column(
        &self,
        dataset: &Dataset,
        index: usize,
    ) -> Result<(FieldRef, ArrayRef), AnonymizationError> {
        let field = dataset.schema().fields()[index].clone();
        let data = dataset.columns()[index].clone();

        match &self.actions[index] {
            ColumnAction::Passthrough => Ok((field, data)),
            ColumnAction::Transform { transformation, .. } => Ok((
                Arc::new(transform_field(&field, transformation.as_ref())?),
                transformation.transform_data(data)?,
            )),
        }
    }

    /// Rebuilds a dataset from transformed columns, keeping the input's row
    /// count and schema metadata.
    pub(crate) fn assemble(
        dataset: &Dataset,
        columns: Vec<(FieldRef, ArrayRef)>,
    ) -> Result<Dataset, AnonymizationError> {
        let (fields, data): (Vec<FieldRef>, Vec<ArrayRef>) = columns.into_iter().unzip();
        let schema = Schema::new_with_metadata(fields, dataset.schema().metadata().clone());

        Ok(Dataset::try_new_with_rows(
            Arc::new(schema),
            data,
            dataset.num_rows(),
        )?)
    }
}

fn transform_field(
    field: &Field,
    transformation: &dyn ColumnTransformation,
) -> ColumnTransformationResult<Field> {
    let ColumnTransformationOutput {
        data_type,
        nullable,
    } = transformation.output_format(field.data_type())?;

    Ok(field
        .clone()
        .with_data_type(data_type)
        .with_nullable(field.is_nullable() || nullable))
}

/// Generalizes and pseudonymizes `dataset` as described by `request`.
///
/// Numeric columns with a directive are bucketed, text columns with a
/// directive are hashed, and text columns without one follow
/// `request.unlisted_text`. Directives naming absent columns are ignored.
/// Every interval is validated before any column is transformed, and the input
/// is never modified.
pub fn anonymize(
    dataset: &Dataset,
    request: &AnonymizationRequest,
) -> Result<Dataset, AnonymizationError> {
    let plan = ColumnPlan::resolve(&dataset.schema(), request)?;

    let columns = (0..plan.len())
        .map(|index| plan.transform_column(dataset, index))
        .collect::<Result<Vec<_>, _>>()?;

    ColumnPlan::assemble(dataset, columns)
}
