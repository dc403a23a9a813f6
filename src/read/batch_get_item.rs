use crate::error::{Error, Result};
use crate::{common, read};

use aws_sdk_dynamodb::{Client, operation, types};
use serde::Serialize;
use std::collections;

/// Result of a batch get against a single table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchGetOutput {
    /// The items found, in no particular order. Missing keys have no entry.
    pub items: Vec<collections::HashMap<String, types::AttributeValue>>,
    /// Keys the store did not get to, to be requested again by the caller.
    pub unprocessed_keys: Vec<collections::HashMap<String, types::AttributeValue>>,
}

impl BatchGetOutput {
    fn from_response(
        table_name: &str,
        output: operation::batch_get_item::BatchGetItemOutput,
    ) -> Self {
        let items = output
            .responses
            .and_then(|mut responses| responses.remove(table_name))
            .unwrap_or_default();
        let unprocessed_keys = output
            .unprocessed_keys
            .and_then(|mut unprocessed| unprocessed.remove(table_name))
            .map(|keys_and_attributes| keys_and_attributes.keys)
            .unwrap_or_default();
        Self {
            items,
            unprocessed_keys,
        }
    }
}

/// Batch get of several items from a single table.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_facade::{common, read};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let batch_get = read::batch_get_item::BatchGetItem {
///     keys: vec![
///         common::key::Keys {
///             partition_key: common::key::Key::new("pk", "USER#1"),
///             sort_key: Some(common::key::Key::new("sk", "PROFILE")),
///         },
///         common::key::Keys {
///             partition_key: common::key::Key::new("pk", "USER#2"),
///             sort_key: Some(common::key::Key::new("sk", "PROFILE")),
///         },
///     ],
///     read_args: read::common::ReadArgs::new("app"),
/// };
/// let output = batch_get.send(client).await?;
/// println!("found {} items", output.items.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchGetItem<T> {
    /// The primary keys of the items to retrieve.
    pub keys: Vec<common::key::Keys<T>>,
    /// Additional read operation arguments (table name, consistent read).
    pub read_args: read::common::ReadArgs,
}

impl<T: Serialize> TryFrom<BatchGetItem<T>> for operation::batch_get_item::BatchGetItemInput {
    type Error = Error;

    fn try_from(batch_get_item: BatchGetItem<T>) -> Result<Self> {
        let read_operation: read::common::ReadInput = batch_get_item.read_args.into();
        let mut serialized_keys = Vec::with_capacity(batch_get_item.keys.len());
        for key in batch_get_item.keys {
            let key = key.try_into()?;
            serialized_keys.push(key);
        }
        let keys_and_attributes = types::KeysAndAttributes::builder()
            .set_consistent_read(read_operation.consistent_read)
            .set_keys(Some(serialized_keys))
            .build()?;
        let input = Self::builder()
            .set_request_items(Some(collections::HashMap::from([(
                read_operation.table_name,
                keys_and_attributes,
            )])))
            .build()?;
        Ok(input)
    }
}

impl<T: Serialize> BatchGetItem<T> {
    /// Execute the batch get item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_facade.batch_get_item",
            skip_all,
            fields(table_name = %self.read_args.table_name, keys = self.keys.len()),
            err
        )
    )]
    pub async fn send(self, client: &Client) -> Result<BatchGetOutput> {
        let table_name = self.read_args.table_name.clone();
        let batch_get_item: operation::batch_get_item::BatchGetItemInput = self.try_into()?;
        let output = client
            .batch_get_item()
            .set_request_items(batch_get_item.request_items)
            .send()
            .await
            .map_err(Error::store)?;
        Ok(BatchGetOutput::from_response(&table_name, output))
    }
}
