//! Write operations for modifying data in DynamoDB tables.
//!
//! This module provides operations for writing data to DynamoDB:
//! - Putting new items or replacing existing ones
//! - Updating items with SET, REMOVE, ADD and DELETE clauses
//! - Deleting items by primary key
//! - Batch putting multiple items
//! - Committing several operations as one transaction

/// Batch write item operation for putting multiple items at once.
pub mod batch_write_item;

/// Common utilities and types for write operations.
pub mod common;

/// Condition check operation, used inside transactions.
pub mod condition_check;

/// Delete item operation for removing items from tables.
pub mod delete_item;

/// Put item operation for creating or replacing items.
pub mod put_item;

/// Transactional write of several item operations.
pub mod transact_write_items;

/// Update item operation for modifying existing items.
///
/// Attribute names are written into update expressions as is, with no
/// `ExpressionAttributeNames`; reserved words cannot be used as attribute names.
pub mod update_item;
