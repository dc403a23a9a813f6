use crate::error::{Error, Result};
use crate::write;

use aws_sdk_dynamodb::{Client, operation, types};
use serde::Serialize;
use serde_dynamo::to_item;
use std::collections;

/// put item operation
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PutItemInput {
    item: collections::HashMap<String, types::AttributeValue>,
    write_operation: write::common::WriteInput,
}

impl TryFrom<PutItemInput> for types::Put {
    type Error = Error;

    fn try_from(put_item: PutItemInput) -> Result<Self> {
        let builder = types::Put::builder().set_item(Some(put_item.item));
        let put = write::common::apply_write_operation!(builder, put_item.write_operation)
            .build()?;
        Ok(put)
    }
}

/// Put item operation.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_facade::write;
/// use serde_json::json;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let put_item = write::put_item::PutItem {
///     item: json!({"pk": "USER#1", "sk": "PROFILE", "name": "John"}),
///     write_args: write::common::WriteArgs::new("app"),
/// };
/// put_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PutItem<T> {
    /// The item to put into the table.
    pub item: T,
    /// Additional write operation arguments (table name, condition).
    pub write_args: write::common::WriteArgs<T>,
}

impl<T: Serialize> TryFrom<PutItem<T>> for PutItemInput {
    type Error = Error;

    fn try_from(put_item: PutItem<T>) -> Result<Self> {
        let item = to_item(put_item.item)?;
        let write_operation: write::common::WriteInput = put_item.write_args.try_into()?;
        let operation = Self {
            item,
            write_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize> PutItem<T> {
    /// Execute the put item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_facade.put_item",
            skip_all,
            fields(table_name = %self.write_args.table_name),
            err
        )
    )]
    pub async fn send(self, client: &Client) -> Result<operation::put_item::PutItemOutput> {
        let put_item: PutItemInput = self.try_into()?;
        let builder = client.put_item().set_item(Some(put_item.item));
        write::common::apply_write_operation!(builder, put_item.write_operation)
            .send()
            .await
            .map_err(Error::store)
    }
}
