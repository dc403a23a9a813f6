use crate::error::{Error, Result};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use serde_dynamo::to_attribute_value;
use std::collections;

/// Key component.
///
/// ```rust
/// use dynamodb_facade::common::key;
///
/// let key = key::Key {
///     name: "pk".to_string(),
///     value: "USER#1".to_string(),
/// };
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Key<T> {
    /// The attribute name of the key.
    pub name: String,
    /// The value of the key.
    pub value: T,
}

impl<T> Key<T> {
    /// Key attribute `name` holding `value`.
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Primary key of one item: a partition key and, on composite-key tables, a sort key.
///
/// ```rust
/// use dynamodb_facade::common::key;
///
/// let keys = key::Keys::new(key::Key::new("pk", "USER#1"))
///     .with_sort_key(Some(key::Key::new("sk", "PROFILE")));
/// assert_eq!(keys.sort_key.map(|sort_key| sort_key.value), Some("PROFILE"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keys<T> {
    /// The partition key (required).
    pub partition_key: Key<T>,
    /// The sort key (optional, only for tables with composite primary keys).
    pub sort_key: Option<Key<T>>,
}

impl<T> Keys<T> {
    /// Key made of `partition_key` alone.
    pub fn new(partition_key: Key<T>) -> Self {
        Self {
            partition_key,
            sort_key: None,
        }
    }

    /// Add a sort key. `None` is a no-op.
    pub fn with_sort_key(mut self, sort_key: Option<Key<T>>) -> Self {
        if sort_key.is_some() {
            self.sort_key = sort_key;
        }
        self
    }
}

impl<T: Serialize> TryFrom<Keys<T>> for collections::HashMap<String, types::AttributeValue> {
    type Error = Error;

    fn try_from(keys: Keys<T>) -> Result<Self> {
        keys.sort_key
            .into_iter()
            .chain(std::iter::once(keys.partition_key))
            .map(|key| -> Result<_> { Ok((key.name, to_attribute_value(key.value)?)) })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case::partition_key_only(
        Keys {
            partition_key: Key::new(
                "pk",
                Value::String(
                    "USER#1".to_string()
                ),
            ),
            ..Default::default()
        },
        collections::HashMap::from(
            [(
                "pk".to_string(),
                types::AttributeValue::S(
                    "USER#1".to_string()
                ),
            )]
        )
    )]
    #[case::partition_key_string_sort_key_number(
        Keys {
            partition_key: Key::new(
                "pk",
                Value::String(
                    "ORDER#7".to_string()
                ),
            ),
            sort_key: Some(
                Key::new(
                    "sk",
                    Value::Number(
                        100.into()
                    ),
                )
            ),
        },
        collections::HashMap::from(
            [
                (
                    "pk".to_string(),
                    types::AttributeValue::S(
                        "ORDER#7".to_string()
                    )
                ),
                (
                    "sk".to_string(),
                    types::AttributeValue::N(
                        "100".to_string()
                    )
                ),
            ]
        )
    )]
    fn test_keys_to_hash_map(
        #[case] keys: Keys<Value>,
        #[case] expected: collections::HashMap<String, types::AttributeValue>,
    ) {
        let actual: collections::HashMap<String, types::AttributeValue> = keys.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
