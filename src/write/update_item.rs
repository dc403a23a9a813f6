use crate::error::{Error, Result};
use crate::{common, write};

use aws_sdk_dynamodb::{Client, operation, types};
use indexmap::IndexMap;
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Update expression keywords.
#[derive(Clone, Copy, Debug, PartialEq)]
enum UpdateAction {
    Set,
    Remove,
    Add,
    Delete,
}

impl UpdateAction {
    fn keyword(self) -> &'static str {
        match self {
            Self::Set => "SET",
            Self::Remove => "REMOVE",
            Self::Add => "ADD",
            Self::Delete => "DELETE",
        }
    }

    fn placeholder_prefix(self) -> &'static str {
        match self {
            Self::Set => "uniqueId",
            Self::Remove => "",
            Self::Add => "ADD",
            Self::Delete => "DELETE",
        }
    }
}

fn get_clause<T: Serialize>(
    action: UpdateAction,
    attributes: IndexMap<String, T>,
) -> Result<common::ExpressionInput> {
    let mut assignments = Vec::with_capacity(attributes.len());
    let mut expression_attribute_values = collections::HashMap::with_capacity(attributes.len());
    for (index, (name, value)) in attributes.into_iter().enumerate() {
        let value = to_attribute_value(value)?;
        let placeholder = format!(":{}{index}", action.placeholder_prefix());
        let assignment = match action {
            UpdateAction::Set => format!("{name} = {placeholder}"),
            _ => format!("{name} {placeholder}"),
        };
        assignments.push(assignment);
        expression_attribute_values.insert(placeholder, value);
    }
    let expression = if assignments.is_empty() {
        String::new()
    } else {
        format!("{} {}", action.keyword(), assignments.join(", "))
    };
    Ok(common::ExpressionInput {
        expression,
        expression_attribute_values,
    })
}

/// Clauses of an update expression.
///
/// Each clause appears at most once and clauses are always rendered in the
/// order SET, REMOVE, ADD, DELETE. Attribute order inside a clause follows
/// insertion order.
///
/// ```rust
/// use dynamodb_facade::write::update_item::UpdateExpression;
/// use indexmap::IndexMap;
///
/// let update = UpdateExpression::default()
///     .with_set(Some(IndexMap::from([("nickname".to_string(), "Bob")])))
///     .with_remove(Some(vec!["temp".to_string()]));
/// // renders "SET nickname = :uniqueId0 REMOVE temp"
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateExpression<T> {
    /// Attributes to assign, rendered as `SET a = :uniqueId0, ...`.
    pub set: IndexMap<String, T>,
    /// Attributes to remove, rendered as `REMOVE a, b`.
    pub remove: Vec<String>,
    /// Numeric increments or set additions, rendered as `ADD a :ADD0, ...`.
    pub add: IndexMap<String, T>,
    /// Elements to delete from set attributes, rendered as `DELETE a :DELETE0, ...`.
    pub delete: IndexMap<String, T>,
}

impl<T> Default for UpdateExpression<T> {
    fn default() -> Self {
        Self {
            set: IndexMap::new(),
            remove: Vec::new(),
            add: IndexMap::new(),
            delete: IndexMap::new(),
        }
    }
}

impl<T> UpdateExpression<T> {
    /// Assign attributes. `None` is a no-op.
    pub fn with_set(mut self, attributes: Option<IndexMap<String, T>>) -> Self {
        if let Some(attributes) = attributes {
            self.set.extend(attributes);
        }
        self
    }

    /// Remove attributes. `None` is a no-op.
    pub fn with_remove(mut self, attributes: Option<Vec<String>>) -> Self {
        if let Some(attributes) = attributes {
            self.remove.extend(attributes);
        }
        self
    }

    /// Add to numeric or set attributes. `None` is a no-op.
    pub fn with_add(mut self, attributes: Option<IndexMap<String, T>>) -> Self {
        if let Some(attributes) = attributes {
            self.add.extend(attributes);
        }
        self
    }

    /// Delete elements from set attributes. `None` is a no-op.
    pub fn with_delete(mut self, attributes: Option<IndexMap<String, T>>) -> Self {
        if let Some(attributes) = attributes {
            self.delete.extend(attributes);
        }
        self
    }

    /// Whether no clause has any entry.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty() && self.add.is_empty() && self.delete.is_empty()
    }
}

impl<T: Serialize> TryFrom<UpdateExpression<T>> for common::ExpressionInput {
    type Error = Error;

    fn try_from(update: UpdateExpression<T>) -> Result<Self> {
        if update.is_empty() {
            return Err(Error::EmptyUpdate);
        }
        let remove = if update.remove.is_empty() {
            common::ExpressionInput::default()
        } else {
            common::ExpressionInput {
                expression: format!(
                    "{} {}",
                    UpdateAction::Remove.keyword(),
                    update.remove.join(", ")
                ),
                ..Default::default()
            }
        };
        let operations = vec![
            get_clause(UpdateAction::Set, update.set)?,
            remove,
            get_clause(UpdateAction::Add, update.add)?,
            get_clause(UpdateAction::Delete, update.delete)?,
        ];
        let mut operation = common::ExpressionInput::merge(" ", operations);
        operation.expression = operation.expression.trim().to_string();
        Ok(operation)
    }
}

/// update item operation
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct UpdateItemInput {
    keys: collections::HashMap<String, types::AttributeValue>,
    return_values: types::ReturnValue,
    update_expression: String,
    write_operation: write::common::WriteInput,
}

impl TryFrom<UpdateItemInput> for types::Update {
    type Error = Error;

    fn try_from(update_item: UpdateItemInput) -> Result<Self> {
        let builder = types::Update::builder()
            .set_key(Some(update_item.keys))
            .update_expression(update_item.update_expression);
        let update = write::common::apply_write_operation!(builder, update_item.write_operation)
            .build()?;
        Ok(update)
    }
}

/// Update item operation.
///
/// Returns all new attribute values unless another return policy is chosen.
/// Transactional updates ignore the return policy.
///
/// ```rust,no_run
/// use aws_sdk_dynamodb::Client;
/// use dynamodb_facade::{common, write};
/// use indexmap::IndexMap;
/// use serde_json::{Value, json};
///
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let keys = common::key::Keys {
///     partition_key: common::key::Key::new("pk", json!("USER#1")),
///     sort_key: Some(common::key::Key::new("sk", json!("PROFILE"))),
/// };
/// let update_item = write::update_item::UpdateItem::new("app", keys)
///     .with_set(Some(IndexMap::from([("nickname".to_string(), json!("Jane"))])))
///     .with_add(Some(IndexMap::from([("logins".to_string(), json!(1))])));
/// // "SET nickname = :uniqueId0 ADD logins :ADD0"
/// update_item.send(client).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateItem<T> {
    /// The primary key of the item to update.
    pub keys: common::key::Keys<T>,
    /// Which attribute values to return; all new values when `None`.
    pub return_values: Option<types::ReturnValue>,
    /// The clauses of the update expression.
    pub update: UpdateExpression<T>,
    /// Additional write operation arguments (table name, condition).
    pub write_args: write::common::WriteArgs<T>,
}

impl<T> UpdateItem<T> {
    /// Update of the item at `keys` in `table_name`, with no clauses yet.
    pub fn new(table_name: impl Into<String>, keys: common::key::Keys<T>) -> Self {
        Self {
            keys,
            return_values: None,
            update: UpdateExpression::default(),
            write_args: write::common::WriteArgs::new(table_name),
        }
    }

    /// Assign attributes. `None` is a no-op.
    pub fn with_set(mut self, attributes: Option<IndexMap<String, T>>) -> Self {
        self.update = self.update.with_set(attributes);
        self
    }

    /// Remove attributes. `None` is a no-op.
    pub fn with_remove(mut self, attributes: Option<Vec<String>>) -> Self {
        self.update = self.update.with_remove(attributes);
        self
    }

    /// Add to numeric or set attributes. `None` is a no-op.
    pub fn with_add(mut self, attributes: Option<IndexMap<String, T>>) -> Self {
        self.update = self.update.with_add(attributes);
        self
    }

    /// Delete elements from set attributes. `None` is a no-op.
    pub fn with_delete(mut self, attributes: Option<IndexMap<String, T>>) -> Self {
        self.update = self.update.with_delete(attributes);
        self
    }

    /// Attach a condition. `None` is a no-op.
    pub fn with_condition(mut self, condition: Option<common::condition::Filter<T>>) -> Self {
        self.write_args = self.write_args.with_condition(condition);
        self
    }

    /// Choose which attribute values to return. `None` is a no-op.
    pub fn with_return_values(mut self, return_values: Option<types::ReturnValue>) -> Self {
        if return_values.is_some() {
            self.return_values = return_values;
        }
        self
    }
}

impl<T: Serialize> TryFrom<UpdateItem<T>> for UpdateItemInput {
    type Error = Error;

    fn try_from(update_item: UpdateItem<T>) -> Result<Self> {
        let keys = update_item.keys.try_into()?;
        let mut write_operation: write::common::WriteInput = update_item.write_args.try_into()?;
        let operation: common::ExpressionInput = update_item.update.try_into()?;
        let update_expression = write_operation.merge_expression(operation);
        let operation = Self {
            keys,
            return_values: update_item
                .return_values
                .unwrap_or(types::ReturnValue::AllNew),
            update_expression,
            write_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize> UpdateItem<T> {
    /// Execute the update item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_facade.update_item",
            skip_all,
            fields(table_name = %self.write_args.table_name),
            err
        )
    )]
    pub async fn send(self, client: &Client) -> Result<operation::update_item::UpdateItemOutput> {
        let update_item: UpdateItemInput = self.try_into()?;
        let builder = client
            .update_item()
            .set_key(Some(update_item.keys))
            .update_expression(update_item.update_expression)
            .return_values(update_item.return_values);
        write::common::apply_write_operation!(builder, update_item.write_operation)
            .send()
            .await
            .map_err(Error::store)
    }
}
