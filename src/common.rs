//! Common utilities for DynamoDB operations.
//!
//! This module provides shared types and utilities used across read and write operations,
//! including key handling, condition expressions, and pagination cursors.

/// Condition expression building for filters and conditional writes.
///
/// Attribute names are written into expressions as is; no
/// `ExpressionAttributeNames` are emitted, so names that are DynamoDB reserved
/// words (`status`, `name`, `count`, ...) are rejected by the store.
pub mod condition;

/// Opaque pagination cursors.
pub mod cursor;

/// Key types for identifying items in DynamoDB tables.
pub mod key;

use aws_sdk_dynamodb::types;
use std::collections;

/// Build a value placeholder that stays unique within one expression.
///
/// The token carries the attribute name so expressions stay readable, and the
/// shared counter keeps two conditions on the same attribute apart.
pub(crate) fn value_placeholder(name: &str, tag: &str, index: &mut usize) -> String {
    let placeholder = format!("{}_{tag}{index}", name_placeholder(name));
    *index += 1;
    placeholder
}

/// Colon-prefixed token derived from an attribute name alone.
pub(crate) fn name_placeholder(name: &str) -> String {
    let name: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!(":{name}")
}

fn get_expression(left: String, operator: &str, right: String) -> String {
    if left.is_empty() {
        right
    } else if right.is_empty() {
        left
    } else {
        format!("{left}{operator}{right}")
    }
}

/// expression operation
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ExpressionInput {
    pub(crate) expression: String,
    pub(crate) expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

impl ExpressionInput {
    pub(crate) fn merge(operator: &str, items: Vec<Self>) -> Self {
        let mut operation = Self::default();
        for item in items {
            operation
                .expression_attribute_values
                .extend(item.expression_attribute_values);
            operation.expression = get_expression(operation.expression, operator, item.expression);
        }
        operation
    }

    pub(crate) fn merge_into(
        self,
        values: &mut Option<collections::HashMap<String, types::AttributeValue>>,
    ) -> String {
        if !self.expression_attribute_values.is_empty() {
            match values {
                Some(existing) => existing.extend(self.expression_attribute_values),
                None => *values = Some(self.expression_attribute_values),
            }
        }
        self.expression
    }
}
