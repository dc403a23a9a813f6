use crate::error::{Error, Result};
use crate::write;

use aws_sdk_dynamodb::{Client, operation, types};
use serde::Serialize;

/// A single operation within a transactional write.
///
/// Each operation targets exactly one item in one table.
#[derive(Clone, Debug, PartialEq)]
pub enum TransactionOperation<T> {
    /// Create or replace an item.
    Put(write::put_item::PutItem<T>),
    /// Delete an item.
    Delete(write::delete_item::DeleteItem<T>),
    /// Update an item.
    Update(write::update_item::UpdateItem<T>),
    /// Require a condition on an item without modifying it.
    ConditionCheck(write::condition_check::ConditionCheck<T>),
}

impl<T: Serialize> TryFrom<TransactionOperation<T>> for types::TransactWriteItem {
    type Error = Error;

    fn try_from(operation: TransactionOperation<T>) -> Result<Self> {
        let builder = Self::builder();
        let builder = match operation {
            TransactionOperation::Put(put_item) => {
                let put_item: write::put_item::PutItemInput = put_item.try_into()?;
                builder.put(put_item.try_into()?)
            }
            TransactionOperation::Delete(delete_item) => {
                let delete_item: write::delete_item::DeleteItemInput = delete_item.try_into()?;
                builder.delete(delete_item.try_into()?)
            }
            TransactionOperation::Update(update_item) => {
                let update_item: write::update_item::UpdateItemInput = update_item.try_into()?;
                builder.update(update_item.try_into()?)
            }
            TransactionOperation::ConditionCheck(condition_check) => {
                let condition_check: write::condition_check::ConditionCheckInput =
                    condition_check.try_into()?;
                builder.condition_check(condition_check.try_into()?)
            }
        };
        Ok(builder.build())
    }
}

/// Transactional write of several items as one all-or-nothing unit.
///
/// Operations are submitted in the given order. If any condition fails the
/// store cancels the whole transaction; see
/// [`Error::is_conditional_check_failure`](crate::error::Error::is_conditional_check_failure).
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_facade::{common, write};
/// use serde_json::json;
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let transaction = write::transact_write_items::TransactWriteItems::new(vec![
///     write::transact_write_items::TransactionOperation::Put(write::put_item::PutItem {
///         item: json!({"pk": "ORDER#1", "sk": "META", "total": 25}),
///         write_args: write::common::WriteArgs::new("app"),
///     }),
///     write::transact_write_items::TransactionOperation::ConditionCheck(
///         write::condition_check::ConditionCheck {
///             keys: common::key::Keys {
///                 partition_key: common::key::Key::new("pk", json!("USER#1")),
///                 sort_key: Some(common::key::Key::new("sk", json!("PROFILE"))),
///             },
///             condition: common::condition::Filter::default().and(
///                 common::condition::ColumnCondition::new(
///                     "pk",
///                     common::condition::Condition::Exists,
///                 ),
///             ),
///             return_values_on_condition_check_failure: None,
///             table_name: "app".to_string(),
///         },
///     ),
/// ]);
/// transaction.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TransactWriteItems<T> {
    /// Idempotency token; repeating a request with the same token within the
    /// store's idempotency window has no further effect.
    pub client_request_token: Option<String>,
    /// The operations, in submission order.
    pub operations: Vec<TransactionOperation<T>>,
}

impl<T> TransactWriteItems<T> {
    /// Transaction over `operations` with no idempotency token.
    pub fn new(operations: Vec<TransactionOperation<T>>) -> Self {
        Self {
            client_request_token: None,
            operations,
        }
    }

    /// Set the idempotency token. `None` is a no-op.
    pub fn with_client_request_token(mut self, token: Option<String>) -> Self {
        if token.is_some() {
            self.client_request_token = token;
        }
        self
    }
}

impl<T> From<Vec<TransactionOperation<T>>> for TransactWriteItems<T> {
    fn from(operations: Vec<TransactionOperation<T>>) -> Self {
        Self::new(operations)
    }
}

impl<T: Serialize> TryFrom<TransactWriteItems<T>>
    for operation::transact_write_items::TransactWriteItemsInput
{
    type Error = Error;

    fn try_from(transaction: TransactWriteItems<T>) -> Result<Self> {
        if transaction.operations.is_empty() {
            return Err(Error::EmptyTransaction);
        }
        let transact_items = transaction
            .operations
            .into_iter()
            .map(types::TransactWriteItem::try_from)
            .collect::<Result<Vec<_>>>()?;
        let operation = Self::builder()
            .set_transact_items(Some(transact_items))
            .set_client_request_token(transaction.client_request_token)
            .build()?;
        Ok(operation)
    }
}

impl<T: Serialize> TransactWriteItems<T> {
    /// Execute the transactional write.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_facade.transact_write_items",
            skip_all,
            fields(operations = self.operations.len()),
            err
        )
    )]
    pub async fn send(
        self,
        client: &Client,
    ) -> Result<operation::transact_write_items::TransactWriteItemsOutput> {
        let transaction: operation::transact_write_items::TransactWriteItemsInput =
            self.try_into()?;
        client
            .transact_write_items()
            .set_transact_items(transaction.transact_items)
            .set_client_request_token(transaction.client_request_token)
            .send()
            .await
            .map_err(Error::store)
    }
}
