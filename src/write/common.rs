use crate::common;
use crate::error::{Error, Result};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use std::collections;

/// Internal representation of write operation parameters.
///
/// This holds the processed write parameters after conversion from the public
/// `WriteArgs` type: the compiled condition and its placeholder map, each left
/// out when empty, ready to be applied to a request builder.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct WriteInput {
    pub(crate) condition_expression: Option<String>,
    pub(crate) expression_attribute_values:
        Option<collections::HashMap<String, types::AttributeValue>>,
    pub(crate) return_values_on_condition_check_failure:
        Option<types::ReturnValuesOnConditionCheckFailure>,
    pub(crate) table_name: String,
}

impl WriteInput {
    /// Merge an expression operation into this write operation.
    pub(crate) fn merge_expression(&mut self, operation: common::ExpressionInput) -> String {
        operation.merge_into(&mut self.expression_attribute_values)
    }
}

/// Arguments common to single-item write operations (Put, Update, Delete).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteArgs<T> {
    /// Condition that must hold for the write to succeed.
    ///
    /// If the condition is false, the store rejects the write with a conditional
    /// check failure; inside a transaction the whole transaction is cancelled.
    pub condition: Option<common::condition::Filter<T>>,
    /// Which item attributes to return if a condition check fails.
    pub return_values_on_condition_check_failure:
        Option<types::ReturnValuesOnConditionCheckFailure>,
    /// The name of the table to write to.
    pub table_name: String,
}

impl<T> WriteArgs<T> {
    /// Arguments targeting `table_name` with no condition.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            condition: None,
            return_values_on_condition_check_failure: None,
            table_name: table_name.into(),
        }
    }

    /// Attach a condition. `None` leaves any previous condition in place.
    pub fn with_condition(mut self, condition: Option<common::condition::Filter<T>>) -> Self {
        if condition.is_some() {
            self.condition = condition;
        }
        self
    }
}

impl<T: Serialize> TryFrom<WriteArgs<T>> for WriteInput {
    type Error = Error;

    fn try_from(write_args: WriteArgs<T>) -> Result<Self> {
        let mut operation = Self {
            return_values_on_condition_check_failure: write_args
                .return_values_on_condition_check_failure,
            table_name: write_args.table_name,
            ..Default::default()
        };
        if let Some(condition) = write_args.condition {
            let condition_operation: common::ExpressionInput = condition.try_into()?;
            let condition_expression = operation.merge_expression(condition_operation);
            if !condition_expression.is_empty() {
                operation.condition_expression = Some(condition_expression);
            }
        }
        Ok(operation)
    }
}

/// apply common write operation settings to a builder
///
/// Works on the client's fluent builders and on the transaction item builders,
/// which share these setters.
macro_rules! apply_write_operation {
    ($builder:expr, $write_operation:expr) => {
        $builder
            .set_condition_expression($write_operation.condition_expression)
            .set_expression_attribute_values($write_operation.expression_attribute_values)
            .set_return_values_on_condition_check_failure(
                $write_operation.return_values_on_condition_check_failure,
            )
            .table_name($write_operation.table_name)
    };
}

pub(crate) use apply_write_operation;

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case::no_condition(
        WriteArgs::new("a"),
        WriteInput {
            table_name: "a".to_string(),
            ..Default::default()
        }
    )]
    #[case::empty_condition_is_dropped(
        WriteArgs::new("a").with_condition(Some(common::condition::Filter::default())),
        WriteInput {
            table_name: "a".to_string(),
            ..Default::default()
        }
    )]
    #[case::condition(
        WriteArgs {
            condition: Some(
                common::condition::Filter::default()
                    .and(
                        common::condition::ColumnCondition::new(
                            "b",
                            common::condition::Condition::Equals(
                                Value::String(
                                    "c".to_string()
                                )
                            )
                        )
                    )
            ),
            return_values_on_condition_check_failure: Some(
                types::ReturnValuesOnConditionCheckFailure::AllOld
            ),
            table_name: "a".to_string(),
        },
        WriteInput {
            condition_expression: Some(
                "b = :b_eq0".to_string()
            ),
            expression_attribute_values: Some(
                collections::HashMap::from(
                    [(
                        ":b_eq0".to_string(),
                        types::AttributeValue::S(
                            "c".to_string()
                        ),
                    )]
                )
            ),
            return_values_on_condition_check_failure: Some(
                types::ReturnValuesOnConditionCheckFailure::AllOld
            ),
            table_name: "a".to_string(),
        }
    )]
    fn test_write_args_to_write_input(
        #[case] args: WriteArgs<Value>,
        #[case] expected: WriteInput,
    ) {
        let actual: WriteInput = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
