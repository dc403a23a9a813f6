use aws_sdk_dynamodb::error::{BuildError, SdkError};

const CONDITIONAL_CHECK_FAILED: &str = "ConditionalCheckFailed";

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while building requests or talking to the managed services.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required field of an SDK request descriptor was missing.
    #[error("invalid request: {0}")]
    Build(#[from] BuildError),
    /// A condition check operation had nothing to check.
    #[error("condition check requires a non-empty condition")]
    EmptyCondition,
    /// An `in` condition was given an empty list of values.
    #[error("`in` condition on `{column}` requires at least one value")]
    EmptyInList {
        /// The column the condition applies to.
        column: String,
    },
    /// A transactional write was requested with no operations.
    #[error("transactional write requires at least one operation")]
    EmptyTransaction,
    /// An update was requested with no SET, REMOVE, ADD or DELETE entries.
    #[error("update requires at least one SET, REMOVE, ADD or DELETE entry")]
    EmptyUpdate,
    /// A pagination token could not be decoded.
    #[error("invalid pagination cursor: {0}")]
    InvalidCursor(String),
    /// A value could not be converted to or from JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The queue service failed the request.
    #[error(transparent)]
    Queue(Box<aws_sdk_sqs::Error>),
    /// No queue exists with the given name.
    #[error("{name} queue does not exist")]
    QueueNotFound {
        /// The queue name that was looked up.
        name: String,
    },
    /// A value could not be converted to or from its attribute representation.
    #[error(transparent)]
    Serialization(#[from] serde_dynamo::Error),
    /// The store failed the request. The store's error is kept unmodified.
    #[error(transparent)]
    Store(Box<aws_sdk_dynamodb::Error>),
    /// A last evaluated key held an attribute type that cannot be part of a key.
    #[error("attribute `{attribute}` cannot be encoded in a pagination cursor")]
    UnsupportedCursorValue {
        /// The offending attribute name.
        attribute: String,
    },
}

impl Error {
    /// Wrap an SDK error returned by the store.
    pub fn store<E, R>(err: SdkError<E, R>) -> Self
    where
        aws_sdk_dynamodb::Error: From<SdkError<E, R>>,
    {
        Self::Store(Box::new(err.into()))
    }

    /// Wrap an SDK error returned by the queue service.
    pub fn queue<E, R>(err: aws_sdk_sqs::error::SdkError<E, R>) -> Self
    where
        aws_sdk_sqs::Error: From<aws_sdk_sqs::error::SdkError<E, R>>,
    {
        Self::Queue(Box::new(err.into()))
    }

    /// Whether the store rejected the request because an attached condition failed.
    ///
    /// A cancelled transaction counts only when one of its cancellation
    /// reasons is a failed condition; conflicts and throttling do not.
    pub fn is_conditional_check_failure(&self) -> bool {
        let Self::Store(err) = self else {
            return false;
        };
        match err.as_ref() {
            aws_sdk_dynamodb::Error::ConditionalCheckFailedException(_) => true,
            aws_sdk_dynamodb::Error::TransactionCanceledException(err) => err
                .cancellation_reasons()
                .iter()
                .any(|reason| reason.code() == Some(CONDITIONAL_CHECK_FAILED)),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use aws_sdk_dynamodb::types;
    use rstest::rstest;

    fn cancelled(codes: &[Option<&str>]) -> Error {
        let reasons = codes
            .iter()
            .map(|code| {
                types::CancellationReason::builder()
                    .set_code(code.map(str::to_string))
                    .build()
            })
            .collect();
        Error::Store(Box::new(
            aws_sdk_dynamodb::Error::TransactionCanceledException(
                types::error::TransactionCanceledException::builder()
                    .message("cancelled")
                    .set_cancellation_reasons(Some(reasons))
                    .build(),
            ),
        ))
    }

    #[rstest]
    #[case::conditional_check_failed(
        Error::Store(
            Box::new(
                aws_sdk_dynamodb::Error::ConditionalCheckFailedException(
                    types::error::ConditionalCheckFailedException::builder()
                        .message("failed")
                        .build()
                )
            )
        ),
        true
    )]
    #[case::transaction_condition_failed(
        cancelled(&[None, Some("ConditionalCheckFailed")]),
        true
    )]
    #[case::transaction_conflict(
        cancelled(&[None, Some("TransactionConflict")]),
        false
    )]
    #[case::transaction_throttled(cancelled(&[Some("ThrottlingError")]), false)]
    #[case::transaction_without_reasons(cancelled(&[]), false)]
    #[case::other_store_error(
        Error::Store(
            Box::new(
                aws_sdk_dynamodb::Error::ResourceNotFoundException(
                    types::error::ResourceNotFoundException::builder()
                        .message("missing")
                        .build()
                )
            )
        ),
        false
    )]
    #[case::not_a_store_error(Error::EmptyTransaction, false)]
    fn test_is_conditional_check_failure(#[case] error: Error, #[case] expected: bool) {
        assert_eq!(error.is_conditional_check_failure(), expected);
    }
}
