use crate::error::{Error, Result};
use crate::{common, write};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use std::collections;

/// condition check operation
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ConditionCheckInput {
    keys: collections::HashMap<String, types::AttributeValue>,
    write_operation: write::common::WriteInput,
}

impl TryFrom<ConditionCheckInput> for types::ConditionCheck {
    type Error = Error;

    fn try_from(condition_check: ConditionCheckInput) -> Result<Self> {
        let builder = types::ConditionCheck::builder().set_key(Some(condition_check.keys));
        let condition_check =
            write::common::apply_write_operation!(builder, condition_check.write_operation)
                .build()?;
        Ok(condition_check)
    }
}

/// Condition check on a single item, only meaningful inside a transaction.
///
/// The item is not modified; if the condition does not hold the whole
/// transaction is cancelled.
///
/// ```rust
/// use dynamodb_facade::common::{condition, key};
/// use dynamodb_facade::write::condition_check::ConditionCheck;
/// use serde_json::json;
///
/// let check = ConditionCheck {
///     keys: key::Keys {
///         partition_key: key::Key::new("pk", json!("ACCOUNT#1")),
///         sort_key: Some(key::Key::new("sk", json!("BALANCE"))),
///     },
///     condition: condition::Filter::default().and(condition::ColumnCondition::new(
///         "balance",
///         condition::Condition::GreaterThanOrEqual(json!(100)),
///     )),
///     return_values_on_condition_check_failure: None,
///     table_name: "app".to_string(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionCheck<T> {
    /// The primary key of the item to check.
    pub keys: common::key::Keys<T>,
    /// The condition that must hold; it must not be empty.
    pub condition: common::condition::Filter<T>,
    /// Which item attributes to return if the check fails.
    pub return_values_on_condition_check_failure:
        Option<types::ReturnValuesOnConditionCheckFailure>,
    /// The name of the table holding the item.
    pub table_name: String,
}

impl<T: Serialize> TryFrom<ConditionCheck<T>> for ConditionCheckInput {
    type Error = Error;

    fn try_from(condition_check: ConditionCheck<T>) -> Result<Self> {
        if condition_check.condition.is_empty() {
            return Err(Error::EmptyCondition);
        }
        let keys = condition_check.keys.try_into()?;
        let write_args = write::common::WriteArgs {
            condition: Some(condition_check.condition),
            return_values_on_condition_check_failure: condition_check
                .return_values_on_condition_check_failure,
            table_name: condition_check.table_name,
        };
        let write_operation: write::common::WriteInput = write_args.try_into()?;
        if write_operation.condition_expression.is_none() {
            return Err(Error::EmptyCondition);
        }
        let operation = Self {
            keys,
            write_operation,
        };
        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::Value;

    fn keys() -> common::key::Keys<Value> {
        common::key::Keys {
            partition_key: common::key::Key::new("pk", Value::String("a".to_string())),
            sort_key: Some(common::key::Key::new("sk", Value::String("b".to_string()))),
        }
    }

    #[rstest]
    #[case::exists(
        ConditionCheck {
            keys: keys(),
            condition: common::condition::Filter::default()
                .and(
                    common::condition::ColumnCondition::new(
                        "pk",
                        common::condition::Condition::Exists
                    )
                ),
            return_values_on_condition_check_failure: None,
            table_name: "t".to_string(),
        },
        ConditionCheckInput {
            keys: collections::HashMap::from(
                [
                    (
                        "pk".to_string(),
                        types::AttributeValue::S(
                            "a".to_string()
                        )
                    ),
                    (
                        "sk".to_string(),
                        types::AttributeValue::S(
                            "b".to_string()
                        )
                    ),
                ]
            ),
            write_operation: write::common::WriteInput {
                condition_expression: Some(
                    "attribute_exists(pk)".to_string()
                ),
                table_name: "t".to_string(),
                ..Default::default()
            },
        }
    )]
    #[case::with_values(
        ConditionCheck {
            keys: keys(),
            condition: common::condition::Filter::default()
                .and(
                    common::condition::ColumnCondition::new(
                        "balance",
                        common::condition::Condition::GreaterThanOrEqual(
                            Value::Number(
                                100.into()
                            )
                        )
                    )
                ),
            return_values_on_condition_check_failure: Some(
                types::ReturnValuesOnConditionCheckFailure::AllOld
            ),
            table_name: "t".to_string(),
        },
        ConditionCheckInput {
            keys: collections::HashMap::from(
                [
                    (
                        "pk".to_string(),
                        types::AttributeValue::S(
                            "a".to_string()
                        )
                    ),
                    (
                        "sk".to_string(),
                        types::AttributeValue::S(
                            "b".to_string()
                        )
                    ),
                ]
            ),
            write_operation: write::common::WriteInput {
                condition_expression: Some(
                    "balance >= :balance_gte0".to_string()
                ),
                expression_attribute_values: Some(
                    collections::HashMap::from(
                        [(
                            ":balance_gte0".to_string(),
                            types::AttributeValue::N(
                                "100".to_string()
                            ),
                        )]
                    )
                ),
                return_values_on_condition_check_failure: Some(
                    types::ReturnValuesOnConditionCheckFailure::AllOld
                ),
                table_name: "t".to_string(),
                ..Default::default()
            },
        }
    )]
    fn test_condition_check(
        #[case] args: ConditionCheck<Value>,
        #[case] expected: ConditionCheckInput,
    ) {
        let actual: ConditionCheckInput = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_empty_condition_is_rejected() {
        let args = ConditionCheck {
            keys: keys(),
            condition: common::condition::Filter::default(),
            return_values_on_condition_check_failure: None,
            table_name: "t".to_string(),
        };
        let actual: Result<ConditionCheckInput> = args.try_into();
        assert!(matches!(actual, Err(Error::EmptyCondition)));
    }

    #[test]
    fn test_condition_check_to_transaction_item() {
        let args = ConditionCheck {
            keys: keys(),
            condition: common::condition::Filter::default().and(
                common::condition::ColumnCondition::new(
                    "pk",
                    common::condition::Condition::Exists,
                ),
            ),
            return_values_on_condition_check_failure: None,
            table_name: "t".to_string(),
        };
        let input: ConditionCheckInput = args.try_into().unwrap();
        let actual: types::ConditionCheck = input.try_into().unwrap();
        assert_eq!(actual.table_name(), "t");
        assert_eq!(actual.condition_expression(), "attribute_exists(pk)");
        assert_eq!(actual.key().len(), 2);
    }
}
