use crate::error::{Error, Result};

use aws_sdk_dynamodb::{Client, operation, types};
use serde::Serialize;
use serde_dynamo::to_item;
use std::collections;

/// Items the store did not write during a batch write.
///
/// The store may leave part of a batch unprocessed (throughput limits, internal
/// errors). Those items are handed back as raw attribute maps so the caller can
/// resubmit them; nothing is retried here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchWriteOutput {
    /// The items that were not written, in the store's attribute representation.
    pub unprocessed_items: Vec<collections::HashMap<String, types::AttributeValue>>,
}

impl BatchWriteOutput {
    fn from_response(
        table_name: &str,
        output: operation::batch_write_item::BatchWriteItemOutput,
    ) -> Self {
        let unprocessed_items = output
            .unprocessed_items
            .and_then(|mut unprocessed| unprocessed.remove(table_name))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|request| request.put_request)
            .map(|put_request| put_request.item)
            .collect();
        Self { unprocessed_items }
    }

    /// Whether every item was written.
    pub fn is_complete(&self) -> bool {
        self.unprocessed_items.is_empty()
    }
}

/// Batch put of whole items into a single table.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_facade::write;
/// use serde_json::json;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let batch_write = write::batch_write_item::BatchWriteItem {
///     items: vec![
///         json!({"pk": "USER#1", "sk": "PROFILE", "name": "John"}),
///         json!({"pk": "USER#2", "sk": "PROFILE", "name": "Jane"}),
///     ],
///     table_name: "app".to_string(),
/// };
/// let output = batch_write.send(client).await?;
/// assert!(output.is_complete());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BatchWriteItem<T> {
    /// The items to put, each replacing any existing item with the same key.
    pub items: Vec<T>,
    /// The name of the table to write to.
    pub table_name: String,
}

impl<T: Serialize> TryFrom<BatchWriteItem<T>> for operation::batch_write_item::BatchWriteItemInput {
    type Error = Error;

    fn try_from(batch_write_item: BatchWriteItem<T>) -> Result<Self> {
        let mut write_requests = Vec::with_capacity(batch_write_item.items.len());
        for item in batch_write_item.items {
            let put_request = types::PutRequest::builder()
                .set_item(Some(to_item(item)?))
                .build()?;
            let write_request = types::WriteRequest::builder()
                .set_put_request(Some(put_request))
                .build();
            write_requests.push(write_request);
        }
        let operation = Self::builder()
            .set_request_items(Some(collections::HashMap::from([(
                batch_write_item.table_name,
                write_requests,
            )])))
            .build()?;
        Ok(operation)
    }
}

impl<T: Serialize> BatchWriteItem<T> {
    /// Execute the batch write item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_facade.batch_write_item",
            skip_all,
            fields(table_name = %self.table_name, items = self.items.len()),
            err
        )
    )]
    pub async fn send(self, client: &Client) -> Result<BatchWriteOutput> {
        let table_name = self.table_name.clone();
        let batch_write_item: operation::batch_write_item::BatchWriteItemInput =
            self.try_into()?;
        let output = client
            .batch_write_item()
            .set_request_items(batch_write_item.request_items)
            .send()
            .await
            .map_err(Error::store)?;
        let output = BatchWriteOutput::from_response(&table_name, output);
        #[cfg(feature = "tracing")]
        if !output.is_complete() {
            tracing::warn!(
                unprocessed = output.unprocessed_items.len(),
                "batch write left items unprocessed"
            );
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::{Value, json};

    fn put_request(name: &str, value: &str) -> types::WriteRequest {
        types::WriteRequest::builder()
            .set_put_request(Some(
                types::PutRequest::builder()
                    .set_item(Some(collections::HashMap::from([(
                        name.to_string(),
                        types::AttributeValue::S(value.to_string()),
                    )])))
                    .build()
                    .unwrap(),
            ))
            .build()
    }

    #[rstest]
    #[case::single(
        BatchWriteItem {
            items: vec![
                json!(
                    {
                        "a": "b"
                    }
                ),
            ],
            table_name: "t".to_string(),
        },
        vec![
            put_request("a", "b"),
        ]
    )]
    #[case::keeps_item_order(
        BatchWriteItem {
            items: vec![
                json!(
                    {
                        "a": "b"
                    }
                ),
                json!(
                    {
                        "c": "d"
                    }
                ),
            ],
            table_name: "t".to_string(),
        },
        vec![
            put_request("a", "b"),
            put_request("c", "d"),
        ]
    )]
    fn test_batch_write_item(
        #[case] args: BatchWriteItem<Value>,
        #[case] expected: Vec<types::WriteRequest>,
    ) {
        let actual: operation::batch_write_item::BatchWriteItemInput = args.try_into().unwrap();
        let expected = operation::batch_write_item::BatchWriteItemInput::builder()
            .set_request_items(Some(collections::HashMap::from([(
                "t".to_string(),
                expected,
            )])))
            .build()
            .unwrap();
        assert_eq!(actual, expected);
    }

    #[rstest]
    #[case::complete(
        operation::batch_write_item::BatchWriteItemOutput::builder().build(),
        vec![]
    )]
    #[case::other_table_ignored(
        operation::batch_write_item::BatchWriteItemOutput::builder()
            .unprocessed_items("other", vec![put_request("a", "b")])
            .build(),
        vec![]
    )]
    #[case::unprocessed(
        operation::batch_write_item::BatchWriteItemOutput::builder()
            .unprocessed_items("t", vec![put_request("a", "b"), put_request("c", "d")])
            .build(),
        vec![
            collections::HashMap::from(
                [(
                    "a".to_string(),
                    types::AttributeValue::S(
                        "b".to_string()
                    ),
                )]
            ),
            collections::HashMap::from(
                [(
                    "c".to_string(),
                    types::AttributeValue::S(
                        "d".to_string()
                    ),
                )]
            ),
        ]
    )]
    fn test_batch_write_output(
        #[case] output: operation::batch_write_item::BatchWriteItemOutput,
        #[case] expected: Vec<collections::HashMap<String, types::AttributeValue>>,
    ) {
        let actual = BatchWriteOutput::from_response("t", output);
        assert_eq!(actual.is_complete(), expected.is_empty());
        assert_eq!(actual.unprocessed_items, expected);
    }
}
