use crate::common;
use crate::error::{Error, Result};

use aws_sdk_dynamodb::{Client, operation, types};
use serde::{Serialize, de::DeserializeOwned};
use serde_dynamo::{from_items, to_attribute_value};
use std::collections;

/// Range condition on the sort key of a query.
#[derive(Clone, Debug, PartialEq)]
pub enum SortKeyCondition<T> {
    /// Prefix match on a string or binary sort key.
    BeginsWith(T),
    /// Inclusive range.
    Between(T, T),
    /// Exact match.
    Equals(T),
    /// Strictly greater than the value.
    GreaterThan(T),
    /// Greater than or equal to the value.
    GreaterThanOrEqual(T),
    /// Strictly less than the value.
    LessThan(T),
    /// Less than or equal to the value.
    LessThanOrEqual(T),
}

/// Sort key name plus the range condition it must satisfy.
#[derive(Clone, Debug, PartialEq)]
pub struct SortKey<T> {
    /// The condition on the sort key.
    pub condition: SortKeyCondition<T>,
    /// The attribute name of the sort key.
    pub name: String,
}

impl<T> SortKey<T> {
    /// Sort key attribute `name` constrained by `condition`.
    pub fn new(name: impl Into<String>, condition: SortKeyCondition<T>) -> Self {
        Self {
            condition,
            name: name.into(),
        }
    }
}

/// Key condition of a query: partition key equality plus an optional sort key
/// range, always joined with `and`.
///
/// Placeholders are derived from the key attribute names (`pk = :pk`). When
/// both names sanitize to the same token the sort key placeholders take a `_1`
/// suffix.
///
/// ```rust
/// use dynamodb_facade::common::key::Key;
/// use dynamodb_facade::read::query::{KeyCondition, SortKey, SortKeyCondition};
///
/// let key_condition = KeyCondition {
///     partition_key: Key::new("pk", "x"),
///     sort_key: Some(SortKey::new("sk", SortKeyCondition::BeginsWith("prefix"))),
/// };
/// // renders "pk = :pk and begins_with(sk  ,:sk)"
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyCondition<T> {
    /// The partition key, matched by equality.
    pub partition_key: common::key::Key<T>,
    /// Optional range condition on the sort key.
    pub sort_key: Option<SortKey<T>>,
}

impl<T: Serialize> SortKey<T> {
    fn get_expression(self, partition_placeholder: &str) -> Result<common::ExpressionInput> {
        let mut placeholder = common::name_placeholder(&self.name);
        let collides = partition_placeholder
            .strip_prefix(placeholder.as_str())
            .is_some_and(|rest| matches!(rest, "" | "_start" | "_end"));
        if collides {
            placeholder.push_str("_1");
        }
        let name = self.name;
        let (expression, expression_attribute_values) = match self.condition {
            SortKeyCondition::BeginsWith(value) => (
                format!("begins_with({name}  ,{placeholder})"),
                collections::HashMap::from([(placeholder, to_attribute_value(value)?)]),
            ),
            SortKeyCondition::Between(low, high) => {
                let start = format!("{placeholder}_start");
                let end = format!("{placeholder}_end");
                (
                    format!("{name} between {start} and {end}"),
                    collections::HashMap::from([
                        (start, to_attribute_value(low)?),
                        (end, to_attribute_value(high)?),
                    ]),
                )
            }
            SortKeyCondition::Equals(value) => comparison(&name, "=", placeholder, value)?,
            SortKeyCondition::GreaterThan(value) => comparison(&name, ">", placeholder, value)?,
            SortKeyCondition::GreaterThanOrEqual(value) => {
                comparison(&name, ">=", placeholder, value)?
            }
            SortKeyCondition::LessThan(value) => comparison(&name, "<", placeholder, value)?,
            SortKeyCondition::LessThanOrEqual(value) => {
                comparison(&name, "<=", placeholder, value)?
            }
        };
        Ok(common::ExpressionInput {
            expression,
            expression_attribute_values,
        })
    }
}

fn comparison<T: Serialize>(
    name: &str,
    operator: &str,
    placeholder: String,
    value: T,
) -> Result<(String, collections::HashMap<String, types::AttributeValue>)> {
    Ok((
        format!("{name} {operator} {placeholder}"),
        collections::HashMap::from([(placeholder, to_attribute_value(value)?)]),
    ))
}

impl<T: Serialize> TryFrom<KeyCondition<T>> for common::ExpressionInput {
    type Error = Error;

    fn try_from(key_condition: KeyCondition<T>) -> Result<Self> {
        let partition_key = key_condition.partition_key;
        let placeholder = common::name_placeholder(&partition_key.name);
        let sort_key = key_condition
            .sort_key
            .map(|sort_key| sort_key.get_expression(&placeholder))
            .transpose()?;
        let partition_key = Self {
            expression: format!("{} = {placeholder}", partition_key.name),
            expression_attribute_values: collections::HashMap::from([(
                placeholder,
                to_attribute_value(partition_key.value)?,
            )]),
        };
        let operations = std::iter::once(partition_key).chain(sort_key).collect();
        Ok(Self::merge(" and ", operations))
    }
}

/// Optional query settings. Every setter ignores absent or falsy values, so a
/// previously chosen setting is never cleared. Falsy values set directly on the
/// fields are dropped when the query is built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryOptions {
    /// Secondary index to query instead of the base table.
    pub index_name: Option<String>,
    /// Maximum number of items to evaluate per page.
    pub limit: Option<i32>,
    /// Cursor returned by the previous page.
    pub offset: Option<String>,
    /// Which attributes to return.
    pub select: Option<types::Select>,
    /// `true` reads in ascending sort key order, `false` descending.
    ///
    /// The store reads ascending when unset.
    pub scan_index_forward: Option<bool>,
}

impl QueryOptions {
    /// Query a secondary index. Empty names are ignored.
    pub fn with_index_name(mut self, index_name: Option<String>) -> Self {
        if let Some(index_name) = index_name.filter(|name| !name.is_empty()) {
            self.index_name = Some(index_name);
        }
        self
    }

    /// Limit the page size. Zero is ignored.
    pub fn with_limit(mut self, limit: Option<i32>) -> Self {
        if let Some(limit) = limit.filter(|limit| *limit != 0) {
            self.limit = Some(limit);
        }
        self
    }

    /// Resume from a cursor. Empty cursors are ignored.
    pub fn with_offset(mut self, offset: Option<String>) -> Self {
        if let Some(offset) = offset.filter(|offset| !offset.is_empty()) {
            self.offset = Some(offset);
        }
        self
    }

    /// Choose the result shape.
    pub fn with_select(mut self, select: Option<types::Select>) -> Self {
        if select.is_some() {
            self.select = select;
        }
        self
    }

    /// Choose the sort direction.
    pub fn with_scan_index_forward(mut self, scan_index_forward: Option<bool>) -> Self {
        if scan_index_forward.is_some() {
            self.scan_index_forward = scan_index_forward;
        }
        self
    }
}

/// query operation
#[derive(Clone, Debug, Default, PartialEq)]
struct QueryInput {
    exclusive_start_key: Option<collections::HashMap<String, types::AttributeValue>>,
    expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
    index_name: Option<String>,
    key_condition_expression: String,
    limit: Option<i32>,
    scan_index_forward: Option<bool>,
    select: Option<types::Select>,
    table_name: String,
}

/// Query operation, returning a single page.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_facade::{common, read};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let query = read::query::Query {
///     key_condition: read::query::KeyCondition {
///         partition_key: common::key::Key::new("customerId", "C1"),
///         sort_key: None,
///     },
///     options: read::query::QueryOptions::default()
///         .with_limit(Some(10))
///         .with_scan_index_forward(Some(false)),
///     table_name: "Orders".to_string(),
/// };
/// let output = query.send(client).await?;
/// let page: read::query::QueryPage<serde_json::Value> = output.try_into()?;
/// println!("{} items, more: {}", page.items.len(), page.offset.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query<T> {
    /// Which items to read.
    pub key_condition: KeyCondition<T>,
    /// Optional query settings.
    pub options: QueryOptions,
    /// The name of the table to query.
    pub table_name: String,
}

impl<T: Serialize> TryFrom<Query<T>> for QueryInput {
    type Error = Error;

    fn try_from(query: Query<T>) -> Result<Self> {
        let key_condition: common::ExpressionInput = query.key_condition.try_into()?;
        let options = QueryOptions::default()
            .with_index_name(query.options.index_name)
            .with_limit(query.options.limit)
            .with_offset(query.options.offset)
            .with_select(query.options.select)
            .with_scan_index_forward(query.options.scan_index_forward);
        let exclusive_start_key = options
            .offset
            .as_deref()
            .map(common::cursor::decode)
            .transpose()?;
        let operation = Self {
            exclusive_start_key,
            expression_attribute_values: key_condition.expression_attribute_values,
            index_name: options.index_name,
            key_condition_expression: key_condition.expression,
            limit: options.limit,
            scan_index_forward: options.scan_index_forward,
            select: options.select,
            table_name: query.table_name,
        };
        Ok(operation)
    }
}

impl<T: Serialize> Query<T> {
    /// Execute the query operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_facade.send_query",
            skip_all,
            fields(table_name = %self.table_name, index_name = ?self.options.index_name),
            err
        )
    )]
    pub async fn send(self, client: &Client) -> Result<operation::query::QueryOutput> {
        let query: QueryInput = self.try_into()?;
        client
            .query()
            .table_name(query.table_name)
            .key_condition_expression(query.key_condition_expression)
            .set_expression_attribute_values(Some(query.expression_attribute_values))
            .set_exclusive_start_key(query.exclusive_start_key)
            .set_index_name(query.index_name)
            .set_limit(query.limit)
            .set_scan_index_forward(query.scan_index_forward)
            .set_select(query.select)
            .send()
            .await
            .map_err(Error::store)
    }
}

/// One page of query results.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryPage<O> {
    /// The items of this page.
    pub items: Vec<O>,
    /// Cursor for the next page; present only when the store reports more.
    pub offset: Option<String>,
}

impl<O: DeserializeOwned> TryFrom<operation::query::QueryOutput> for QueryPage<O> {
    type Error = Error;

    fn try_from(output: operation::query::QueryOutput) -> Result<Self> {
        let items = from_items(output.items.unwrap_or_default())?;
        let offset = output
            .last_evaluated_key
            .filter(|key| !key.is_empty())
            .map(common::cursor::encode)
            .transpose()?;
        Ok(Self { items, offset })
    }
}
