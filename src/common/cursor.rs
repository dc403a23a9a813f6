//! Opaque pagination cursors.
//!
//! A cursor is the store's last evaluated key, serialized to JSON and encoded as
//! URL-safe base64 so it can travel in a query string. Key attributes can only be
//! strings, numbers or binaries, and numbers keep their exact textual form, so a
//! cursor always decodes back to the key it was made from.

use crate::error::{Error, Result};

use aws_sdk_dynamodb::{primitives, types};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use std::collections;

#[derive(Debug, Deserialize, Serialize)]
enum KeyValue {
    S(String),
    N(String),
    B(String),
}

impl KeyValue {
    fn from_attribute_value(attribute: &str, value: types::AttributeValue) -> Result<Self> {
        match value {
            types::AttributeValue::S(value) => Ok(Self::S(value)),
            types::AttributeValue::N(value) => Ok(Self::N(value)),
            types::AttributeValue::B(blob) => {
                Ok(Self::B(URL_SAFE_NO_PAD.encode(blob.into_inner())))
            }
            _ => Err(Error::UnsupportedCursorValue {
                attribute: attribute.to_string(),
            }),
        }
    }

    fn into_attribute_value(self) -> Result<types::AttributeValue> {
        let value = match self {
            Self::S(value) => types::AttributeValue::S(value),
            Self::N(value) => types::AttributeValue::N(value),
            Self::B(value) => {
                let bytes = URL_SAFE_NO_PAD
                    .decode(value)
                    .map_err(|err| Error::InvalidCursor(err.to_string()))?;
                types::AttributeValue::B(primitives::Blob::new(bytes))
            }
        };
        Ok(value)
    }
}

/// Encode a last evaluated key into an opaque cursor.
pub fn encode(
    last_evaluated_key: collections::HashMap<String, types::AttributeValue>,
) -> Result<String> {
    let mut key = collections::BTreeMap::new();
    for (name, value) in last_evaluated_key {
        let value = KeyValue::from_attribute_value(&name, value)?;
        key.insert(name, value);
    }
    let json = serde_json::to_vec(&key).map_err(|err| Error::InvalidCursor(err.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a cursor produced by [`encode`] back into an exclusive start key.
pub fn decode(cursor: &str) -> Result<collections::HashMap<String, types::AttributeValue>> {
    let json = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|err| Error::InvalidCursor(err.to_string()))?;
    let key: collections::BTreeMap<String, KeyValue> =
        serde_json::from_slice(&json).map_err(|err| Error::InvalidCursor(err.to_string()))?;
    let mut exclusive_start_key = collections::HashMap::with_capacity(key.len());
    for (name, value) in key {
        exclusive_start_key.insert(name, value.into_attribute_value()?);
    }
    Ok(exclusive_start_key)
}
