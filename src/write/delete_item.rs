use crate::error::{Error, Result};
use crate::{common, write};

use aws_sdk_dynamodb::{Client, operation, types};
use serde::Serialize;
use std::collections;

/// delete item operation
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DeleteItemInput {
    keys: collections::HashMap<String, types::AttributeValue>,
    write_operation: write::common::WriteInput,
}

impl TryFrom<DeleteItemInput> for types::Delete {
    type Error = Error;

    fn try_from(delete_item: DeleteItemInput) -> Result<Self> {
        let builder = types::Delete::builder().set_key(Some(delete_item.keys));
        let delete = write::common::apply_write_operation!(builder, delete_item.write_operation)
            .build()?;
        Ok(delete)
    }
}

/// Delete item operation.
///
/// Deleting an item that does not exist succeeds, unless a condition says otherwise.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_facade::{common, write};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let delete_item = write::delete_item::DeleteItem {
///     keys: common::key::Keys {
///         partition_key: common::key::Key::new("pk", "USER#1"),
///         sort_key: Some(common::key::Key::new("sk", "PROFILE")),
///     },
///     write_args: write::common::WriteArgs::new("app"),
/// };
/// delete_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteItem<T> {
    /// The primary key of the item to delete.
    pub keys: common::key::Keys<T>,
    /// Additional write operation arguments (table name, condition).
    pub write_args: write::common::WriteArgs<T>,
}

impl<T: Serialize> TryFrom<DeleteItem<T>> for DeleteItemInput {
    type Error = Error;

    fn try_from(delete_item: DeleteItem<T>) -> Result<Self> {
        let keys = delete_item.keys.try_into()?;
        let write_operation: write::common::WriteInput = delete_item.write_args.try_into()?;
        let operation = Self {
            keys,
            write_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize> DeleteItem<T> {
    /// Execute the delete item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_facade.delete_item",
            skip_all,
            fields(table_name = %self.write_args.table_name),
            err
        )
    )]
    pub async fn send(self, client: &Client) -> Result<operation::delete_item::DeleteItemOutput> {
        let delete_item: DeleteItemInput = self.try_into()?;
        let builder = client.delete_item().set_key(Some(delete_item.keys));
        write::common::apply_write_operation!(builder, delete_item.write_operation)
            .send()
            .await
            .map_err(Error::store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case::empty(
        DeleteItem {
            keys: common::key::Keys {
                partition_key: common::key::Key::new(
                    "a",
                    Value::String(
                        "b".to_string()
                    ),
                ),
                ..Default::default()
            },
            write_args: write::common::WriteArgs::new("c"),
        },
        DeleteItemInput {
            keys: collections::HashMap::from(
                [
                    (
                        "a".to_string(),
                        types::AttributeValue::S(
                            "b".to_string()
                        )
                    ),
                ]
            ),
            write_operation: write::common::WriteInput {
                table_name: "c".to_string(),
                ..Default::default()
            },
        }
    )]
    #[case::full(
        DeleteItem {
            keys: common::key::Keys {
                partition_key: common::key::Key::new(
                    "a",
                    Value::String(
                        "b".to_string()
                    ),
                ),
                sort_key: Some(
                    common::key::Key::new(
                        "c",
                        Value::String(
                            "d".to_string()
                        ),
                    )
                ),
            },
            write_args: write::common::WriteArgs {
                condition: Some(
                    common::condition::Filter::default()
                        .and(
                            common::condition::ColumnCondition::new(
                                "e",
                                common::condition::Condition::Equals(
                                    Value::String(
                                        "f".to_string()
                                    )
                                )
                            )
                        )
                ),
                return_values_on_condition_check_failure: None,
                table_name: "g".to_string(),
            },
        },
        DeleteItemInput {
            keys: collections::HashMap::from(
                [
                    (
                        "a".to_string(),
                        types::AttributeValue::S(
                            "b".to_string()
                        )
                    ),
                    (
                        "c".to_string(),
                        types::AttributeValue::S(
                            "d".to_string()
                        )
                    ),
                ]
            ),
            write_operation: write::common::WriteInput {
                condition_expression: Some(
                    "e = :e_eq0".to_string()
                ),
                expression_attribute_values: Some(
                    collections::HashMap::from(
                        [
                            (
                                ":e_eq0".to_string(),
                                types::AttributeValue::S(
                                    "f".to_string()
                                )
                            ),
                        ]
                    )
                ),
                table_name: "g".to_string(),
                ..Default::default()
            },
        }
    )]
    fn test_delete_item(#[case] args: DeleteItem<Value>, #[case] expected: DeleteItemInput) {
        let actual: DeleteItemInput = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
