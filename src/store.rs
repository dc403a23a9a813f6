//! Storage facade for a single-table DynamoDB design.
//!
//! [`Store`] exposes the handful of operations an application needs (get, put,
//! update, counters, batches, paginated queries, delete, transactions) and
//! delegates expression assembly to the builders in [`mod@crate::read`] and
//! [`mod@crate::write`]. Store errors propagate unmodified.

use crate::error::Result;
use crate::{common, read, write};

use aws_sdk_dynamodb::Client;
use indexmap::IndexMap;
use serde::{Serialize, de::DeserializeOwned};
use serde_dynamo::{from_item, from_items};
use serde_json::Value;

/// Partition key attribute name used unless overridden.
pub const DEFAULT_PARTITION_KEY: &str = "pk";

/// Sort key attribute name used unless overridden.
pub const DEFAULT_SORT_KEY: &str = "sk";

/// Storage facade.
///
/// Items are addressed by a string partition key and sort key held in the
/// attributes named by [`Store::with_key_names`] (`pk` and `sk` by default).
///
/// ```rust,no_run
/// use dynamodb_facade::{config::AwsConfig, store::Store};
/// use indexmap::IndexMap;
/// use serde_json::{Value, json};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = Store::new(&AwsConfig::from_env().load().await);
/// store
///     .write("app", json!({"pk": "USER#1", "sk": "PROFILE", "name": "John"}))
///     .await?;
/// let user: Option<Value> = store.find_one("app", "USER#1", "PROFILE").await?;
/// let user: Value = store
///     .atomic_update("app", "USER#1", "PROFILE", IndexMap::from([("logins", 1)]))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Store {
    client: Client,
    key_names: KeyNames,
}

#[derive(Clone, Debug, PartialEq)]
struct KeyNames {
    partition_key: String,
    sort_key: String,
}

impl Default for KeyNames {
    fn default() -> Self {
        Self {
            partition_key: DEFAULT_PARTITION_KEY.to_string(),
            sort_key: DEFAULT_SORT_KEY.to_string(),
        }
    }
}

/// Key or caller-supplied attribute value in one update request.
///
/// Serializes as the wrapped value, so set and binary wrappers reach the
/// store with their attribute type intact.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
enum Attribute<V> {
    Key(String),
    Value(V),
}

impl KeyNames {
    fn keys(&self, pk: impl Into<String>, sk: impl Into<String>) -> common::key::Keys<Value> {
        self.keys_with(pk, sk, Value::String)
    }

    fn keys_with<T>(
        &self,
        pk: impl Into<String>,
        sk: impl Into<String>,
        value: impl Fn(String) -> T,
    ) -> common::key::Keys<T> {
        common::key::Keys::new(common::key::Key::new(&self.partition_key, value(pk.into())))
            .with_sort_key(Some(common::key::Key::new(
                &self.sort_key,
                value(sk.into()),
            )))
    }

    fn batch_read_request<P: Into<String>, S: Into<String>>(
        &self,
        table_name: &str,
        keys: impl IntoIterator<Item = (P, S)>,
    ) -> read::batch_get_item::BatchGetItem<Value> {
        read::batch_get_item::BatchGetItem {
            keys: keys.into_iter().map(|(pk, sk)| self.keys(pk, sk)).collect(),
            read_args: read::common::ReadArgs::new(table_name),
        }
    }
}

impl Store {
    /// Store backed by a client built from `sdk_config`.
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::from_client(Client::new(sdk_config))
    }

    /// Store backed by an existing client.
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            key_names: KeyNames::default(),
        }
    }

    /// Use other key attribute names.
    pub fn with_key_names(
        mut self,
        partition_key: impl Into<String>,
        sort_key: impl Into<String>,
    ) -> Self {
        self.key_names = KeyNames {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
        };
        self
    }

    /// The underlying client, for operations this facade does not cover.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Put `item` whole, replacing any item with the same key.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.write", skip(self, item), err)
    )]
    pub async fn write<I: Serialize>(&self, table_name: &str, item: I) -> Result<()> {
        write::put_item::PutItem {
            item,
            write_args: write::common::WriteArgs::new(table_name),
        }
        .send(&self.client)
        .await?;
        Ok(())
    }

    /// Get one item, or `None` when no item has this key.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.find_one", skip(self, pk, sk), err)
    )]
    pub async fn find_one<O: DeserializeOwned>(
        &self,
        table_name: &str,
        pk: impl Into<String>,
        sk: impl Into<String>,
    ) -> Result<Option<O>> {
        let output = read::get_item::GetItem {
            keys: self.key_names.keys(pk, sk),
            read_args: read::common::ReadArgs::new(table_name),
        }
        .send(&self.client)
        .await?;
        let item = output.item.map(from_item).transpose()?;
        Ok(item)
    }

    /// Assign `attributes` on an item and return the item as stored afterwards.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_facade.update",
            skip(self, pk, sk, attributes),
            fields(attributes = attributes.len()),
            err
        )
    )]
    pub async fn update<O: DeserializeOwned, K: Into<String>, V: Serialize>(
        &self,
        table_name: &str,
        pk: impl Into<String>,
        sk: impl Into<String>,
        attributes: IndexMap<K, V>,
    ) -> Result<O> {
        let keys = self.key_names.keys_with(pk, sk, Attribute::Key);
        let output = update_request(table_name, keys, attributes, IndexMap::new())
            .send(&self.client)
            .await?;
        let item = from_item(output.attributes.unwrap_or_default())?;
        Ok(item)
    }

    /// Add `deltas` to numeric attributes (or elements to set attributes)
    /// atomically and return the item as stored afterwards.
    ///
    /// Missing numeric attributes start from zero.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_facade.atomic_update",
            skip(self, pk, sk, deltas),
            fields(deltas = deltas.len()),
            err
        )
    )]
    pub async fn atomic_update<O: DeserializeOwned, K: Into<String>, V: Serialize>(
        &self,
        table_name: &str,
        pk: impl Into<String>,
        sk: impl Into<String>,
        deltas: IndexMap<K, V>,
    ) -> Result<O> {
        let keys = self.key_names.keys_with(pk, sk, Attribute::Key);
        let output = update_request(table_name, keys, IndexMap::new(), deltas)
            .send(&self.client)
            .await?;
        let item = from_item(output.attributes.unwrap_or_default())?;
        Ok(item)
    }

    /// Put several items in one request.
    ///
    /// Items the store leaves unprocessed are returned, not retried.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_facade.batch_write",
            skip(self, items),
            fields(items = items.len()),
            err
        )
    )]
    pub async fn batch_write<I: Serialize>(
        &self,
        table_name: &str,
        items: Vec<I>,
    ) -> Result<write::batch_write_item::BatchWriteOutput> {
        if items.is_empty() {
            return Ok(write::batch_write_item::BatchWriteOutput::default());
        }
        write::batch_write_item::BatchWriteItem {
            items,
            table_name: table_name.to_string(),
        }
        .send(&self.client)
        .await
    }

    /// Get several items by `(pk, sk)` in one request.
    ///
    /// Keys with no item, and keys the store leaves unprocessed, are absent
    /// from the result.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.batch_read", skip(self, keys), err)
    )]
    pub async fn batch_read<O: DeserializeOwned, P: Into<String>, S: Into<String>>(
        &self,
        table_name: &str,
        keys: impl IntoIterator<Item = (P, S)>,
    ) -> Result<Vec<O>> {
        let batch_get = self.key_names.batch_read_request(table_name, keys);
        if batch_get.keys.is_empty() {
            return Ok(Vec::new());
        }
        let output = batch_get.send(&self.client).await?;
        #[cfg(feature = "tracing")]
        if !output.unprocessed_keys.is_empty() {
            tracing::debug!(
                unprocessed = output.unprocessed_keys.len(),
                "batch read left keys unprocessed"
            );
        }
        let items = from_items(output.items)?;
        Ok(items)
    }

    /// Read one page of items matching `key_condition`.
    ///
    /// The page carries a cursor when more items remain; pass it back through
    /// [`QueryOptions::with_offset`](read::query::QueryOptions::with_offset).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.query", skip(self, key_condition), err)
    )]
    pub async fn query<O: DeserializeOwned, V: Serialize>(
        &self,
        table_name: &str,
        key_condition: read::query::KeyCondition<V>,
        options: read::query::QueryOptions,
    ) -> Result<read::query::QueryPage<O>> {
        read::query::Query {
            key_condition,
            options,
            table_name: table_name.to_string(),
        }
        .send(&self.client)
        .await?
        .try_into()
    }

    /// Delete one item. Deleting a missing item succeeds.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.delete", skip(self, pk, sk), err)
    )]
    pub async fn delete(
        &self,
        table_name: &str,
        pk: impl Into<String>,
        sk: impl Into<String>,
    ) -> Result<()> {
        write::delete_item::DeleteItem {
            keys: self.key_names.keys(pk, sk),
            write_args: write::common::WriteArgs::new(table_name),
        }
        .send(&self.client)
        .await?;
        Ok(())
    }

    /// Commit all operations atomically, in order.
    ///
    /// If any attached condition fails nothing is written and the error
    /// reports [`is_conditional_check_failure`](crate::error::Error::is_conditional_check_failure).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.transact_write", skip_all, err)
    )]
    pub async fn transact_write<V: Serialize>(
        &self,
        transaction: impl Into<write::transact_write_items::TransactWriteItems<V>>,
    ) -> Result<()> {
        transaction.into().send(&self.client).await?;
        Ok(())
    }
}

fn update_request<K: Into<String>, V>(
    table_name: &str,
    keys: common::key::Keys<Attribute<V>>,
    set: IndexMap<K, V>,
    add: IndexMap<K, V>,
) -> write::update_item::UpdateItem<Attribute<V>> {
    write::update_item::UpdateItem::new(table_name, keys)
        .with_set(Some(attribute_values(set)))
        .with_add(Some(attribute_values(add)))
}

fn attribute_values<K: Into<String>, V>(
    attributes: IndexMap<K, V>,
) -> IndexMap<String, Attribute<V>> {
    attributes
        .into_iter()
        .map(|(name, value)| (name.into(), Attribute::Value(value)))
        .collect()
}
