#![deny(missing_docs)]

//! # DynamoDB Facade
//!
//! Typed facades over DynamoDB and SQS for serverless backends.
//!
//! ## Overview
//!
//! The core of the crate compiles structured inputs into DynamoDB's string
//! expression language:
//! - Filters and conditions, correctly parenthesized, with collision-free value placeholders
//! - Key conditions on a partition key and an optional sort key
//! - Update expressions with SET, REMOVE, ADD and DELETE clauses
//! - Transactions mixing put, delete, update and condition check operations
//!
//! On top of the builders sit two facades: [`store::Store`] for a single-table
//! design and [`queue::Queue`] for message queues addressed by name.
//!
//! ## Quick Example
//!
//! ```no_run
//! use aws_sdk_dynamodb::Client;
//! use dynamodb_facade::{common, write};
//! use indexmap::IndexMap;
//! use serde_json::json;
//!
//! # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
//! let update_item = write::update_item::UpdateItem::new(
//!     "app",
//!     common::key::Keys {
//!         partition_key: common::key::Key::new("pk", json!("USER#1")),
//!         sort_key: Some(common::key::Key::new("sk", json!("PROFILE"))),
//!     },
//! )
//! .with_set(Some(IndexMap::from([("nickname".to_string(), json!("Jane"))])))
//! .with_add(Some(IndexMap::from([("logins".to_string(), json!(1))])))
//! .with_condition(Some(common::condition::Filter::default().and(
//!     common::condition::ColumnCondition::new("pk", common::condition::Condition::Exists),
//! )));
//! // SET nickname = :uniqueId0 ADD logins :ADD0, guarded by attribute_exists(pk)
//! update_item.send(client).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@common`] - Keys, conditions, cursors and expression plumbing
//! - [`mod@read`] - Read operations (GetItem, Query, BatchGetItem)
//! - [`mod@write`] - Write operations (PutItem, UpdateItem, DeleteItem, ConditionCheck, BatchWriteItem, TransactWriteItems)
//! - [`mod@store`] - Storage facade
//! - [`mod@queue`] - Message queue facade

/// Common utilities for keys, conditions, and pagination cursors.
pub mod common;

/// AWS client configuration.
pub mod config;

/// Crate error type.
pub mod error;

/// Message queue facade with a per-instance queue URL cache.
pub mod queue;

/// Read operations for retrieving data from DynamoDB tables.
pub mod read;

/// Storage facade over a single DynamoDB table design.
pub mod store;

/// Write operations for modifying data in DynamoDB tables.
///
/// This module provides operations for:
/// - Putting new items or replacing existing ones
/// - Updating items with SET, REMOVE, ADD and DELETE clauses
/// - Deleting items by key
/// - Checking conditions inside transactions
pub mod write;
