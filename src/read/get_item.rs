use crate::error::{Error, Result};
use crate::{common, read};

use aws_sdk_dynamodb::{Client, operation, types};
use serde::Serialize;
use std::collections;

/// get item operation
#[derive(Clone, Debug, Default, PartialEq)]
struct GetItemInput {
    keys: collections::HashMap<String, types::AttributeValue>,
    read_operation: read::common::ReadInput,
}

/// Get item operation.
///
/// A missing item is not an error: the output simply carries no item.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_facade::{common, read};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let get_item = read::get_item::GetItem {
///     keys: common::key::Keys {
///         partition_key: common::key::Key::new("pk", "USER#1"),
///         sort_key: Some(common::key::Key::new("sk", "PROFILE")),
///     },
///     read_args: read::common::ReadArgs::new("app"),
/// };
/// let output = get_item.send(client).await?;
/// println!("found: {}", output.item.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetItem<T> {
    /// The primary key of the item to retrieve.
    pub keys: common::key::Keys<T>,
    /// Additional read operation arguments (table name, consistent read).
    pub read_args: read::common::ReadArgs,
}

impl<T: Serialize> TryFrom<GetItem<T>> for GetItemInput {
    type Error = Error;

    fn try_from(get_item: GetItem<T>) -> Result<Self> {
        let keys = get_item.keys.try_into()?;
        let operation = Self {
            keys,
            read_operation: get_item.read_args.into(),
        };
        Ok(operation)
    }
}

impl<T: Serialize> GetItem<T> {
    /// Execute the get item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_facade.get_item",
            skip_all,
            fields(table_name = %self.read_args.table_name),
            err
        )
    )]
    pub async fn send(self, client: &Client) -> Result<operation::get_item::GetItemOutput> {
        let get_item: GetItemInput = self.try_into()?;
        let builder = client.get_item().set_key(Some(get_item.keys));
        read::common::apply_read_operation!(builder, get_item.read_operation)
            .send()
            .await
            .map_err(Error::store)
    }
}
