use crate::error::{Error, Result};

use aws_sdk_sqs::{operation, types};
use serde::Serialize;
use serde_json::Value;

/// Body of a queue message: a raw string, or JSON serialized on send.
#[derive(Clone, Debug, PartialEq)]
pub enum MessageBody {
    /// Sent as is.
    Text(String),
    /// Sent as its compact JSON serialization.
    Json(Value),
}

impl MessageBody {
    /// JSON body from any serializable payload.
    pub fn json<S: Serialize>(payload: &S) -> Result<Self> {
        Ok(Self::Json(serde_json::to_value(payload)?))
    }

    /// The text that goes on the wire.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Json(value) => value.to_string(),
        }
    }
}

impl From<String> for MessageBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessageBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for MessageBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// A message to push.
///
/// ```rust
/// use dynamodb_facade::queue::message::PushMessage;
/// use serde_json::json;
///
/// let message = PushMessage::new(json!({"orderId": "1"}))
///     .with_message_group_id(Some("orders".to_string()))
///     .with_delay_seconds(Some(0));
/// assert_eq!(message.delay_seconds, None);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PushMessage {
    /// The message body, at most 256 KB once serialized.
    pub body: MessageBody,
    /// Seconds to delay delivery of this message (0 to 900).
    pub delay_seconds: Option<i32>,
    /// Deduplication token, FIFO queues only.
    pub message_deduplication_id: Option<String>,
    /// Message group, FIFO queues only. Messages in a group are delivered in order.
    pub message_group_id: Option<String>,
}

impl PushMessage {
    /// Message carrying `body` with no delivery options.
    pub fn new(body: impl Into<MessageBody>) -> Self {
        Self {
            body: body.into(),
            delay_seconds: None,
            message_deduplication_id: None,
            message_group_id: None,
        }
    }

    /// Delay delivery. `None` and zero are no-ops.
    pub fn with_delay_seconds(mut self, delay_seconds: Option<i32>) -> Self {
        if let Some(delay_seconds) = delay_seconds.filter(|delay| *delay != 0) {
            self.delay_seconds = Some(delay_seconds);
        }
        self
    }

    /// Set the deduplication token. `None` and empty strings are no-ops.
    pub fn with_message_deduplication_id(mut self, id: Option<String>) -> Self {
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            self.message_deduplication_id = Some(id);
        }
        self
    }

    /// Set the message group. `None` and empty strings are no-ops.
    pub fn with_message_group_id(mut self, id: Option<String>) -> Self {
        if let Some(id) = id.filter(|id| !id.is_empty()) {
            self.message_group_id = Some(id);
        }
        self
    }

    pub(crate) fn into_batch_entry(self, id: String) -> Result<types::SendMessageBatchRequestEntry> {
        let entry = types::SendMessageBatchRequestEntry::builder()
            .id(id)
            .message_body(self.body.into_text())
            .set_delay_seconds(self.delay_seconds)
            .set_message_deduplication_id(self.message_deduplication_id)
            .set_message_group_id(self.message_group_id)
            .build()?;
        Ok(entry)
    }
}

/// One message or a batch of messages to push.
#[derive(Clone, Debug, PartialEq)]
pub enum Push {
    /// A single message; a failure is reported in the output, not as an error.
    Single(PushMessage),
    /// Several messages, each with its own outcome.
    Batch(Vec<PushMessage>),
}

impl From<PushMessage> for Push {
    fn from(message: PushMessage) -> Self {
        Self::Single(message)
    }
}

impl From<Vec<PushMessage>> for Push {
    fn from(messages: Vec<PushMessage>) -> Self {
        Self::Batch(messages)
    }
}

/// A message accepted by the queue.
#[derive(Clone, Debug, PartialEq)]
pub struct PushSuccess {
    /// The batch entry id; `None` for a single push.
    pub id: Option<String>,
    /// The id the queue assigned to the message.
    pub message_id: String,
}

/// A message or batch entry the queue did not accept.
#[derive(Clone, Debug, PartialEq)]
pub struct Failure {
    /// The batch entry id; `None` for a single push.
    pub id: Option<String>,
    /// Why the entry failed.
    pub error_message: Option<String>,
    /// Error code of the failure.
    pub error_code: Option<String>,
}

impl Failure {
    /// One failure per entry of a batch request the queue service rejected whole.
    fn rejected(ids: Vec<String>, err: &Error) -> Vec<Self> {
        let error_message = err.to_string();
        ids.into_iter()
            .map(|id| Self {
                id: Some(id),
                error_message: Some(error_message.clone()),
                error_code: None,
            })
            .collect()
    }
}

impl From<types::BatchResultErrorEntry> for Failure {
    fn from(entry: types::BatchResultErrorEntry) -> Self {
        Self {
            id: Some(entry.id),
            error_message: entry.message,
            error_code: Some(entry.code),
        }
    }
}

/// Outcome of a push, split into accepted and failed messages.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PushOutput {
    /// Messages accepted by the queue.
    pub success: Vec<PushSuccess>,
    /// Messages the queue did not accept; they can be pushed again.
    pub failed: Vec<Failure>,
}

impl PushOutput {
    /// Add the outcome of one batch request holding the entries `ids`.
    pub(crate) fn record(
        &mut self,
        ids: Vec<String>,
        outcome: Result<operation::send_message_batch::SendMessageBatchOutput>,
    ) {
        let output = match outcome {
            Ok(output) => output,
            Err(err) => {
                self.failed.extend(Failure::rejected(ids, &err));
                return;
            }
        };
        self.success
            .extend(output.successful.into_iter().map(|entry| PushSuccess {
                id: Some(entry.id),
                message_id: entry.message_id,
            }));
        self.failed
            .extend(output.failed.into_iter().map(Failure::from));
    }

    pub(crate) fn single(outcome: Result<operation::send_message::SendMessageOutput>) -> Self {
        match outcome {
            Ok(output) => Self {
                success: vec![PushSuccess {
                    id: None,
                    message_id: output.message_id.unwrap_or_default(),
                }],
                failed: Vec::new(),
            },
            Err(err) => Self {
                success: Vec::new(),
                failed: vec![Failure {
                    id: None,
                    error_message: Some(err.to_string()),
                    error_code: None,
                }],
            },
        }
    }
}

/// A received message to delete.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteMessage {
    /// Caller-chosen id reported back in the output.
    pub id: String,
    /// The receipt handle obtained when the message was received.
    pub receipt_handle: String,
}

impl DeleteMessage {
    /// Delete the message received with `receipt_handle`, reported as `id`.
    pub fn new(id: impl Into<String>, receipt_handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            receipt_handle: receipt_handle.into(),
        }
    }
}

impl TryFrom<DeleteMessage> for types::DeleteMessageBatchRequestEntry {
    type Error = crate::error::Error;

    fn try_from(message: DeleteMessage) -> Result<Self> {
        let entry = Self::builder()
            .id(message.id)
            .receipt_handle(message.receipt_handle)
            .build()?;
        Ok(entry)
    }
}

/// Outcome of a delete, split into deleted and failed messages.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeleteOutput {
    /// Ids of the deleted messages.
    pub success: Vec<String>,
    /// Messages that were not deleted.
    pub failed: Vec<Failure>,
}

impl DeleteOutput {
    /// Add the outcome of one batch request holding the entries `ids`.
    pub(crate) fn record(
        &mut self,
        ids: Vec<String>,
        outcome: Result<operation::delete_message_batch::DeleteMessageBatchOutput>,
    ) {
        let output = match outcome {
            Ok(output) => output,
            Err(err) => {
                self.failed.extend(Failure::rejected(ids, &err));
                return;
            }
        };
        self.success
            .extend(output.successful.into_iter().map(|entry| entry.id));
        self.failed
            .extend(output.failed.into_iter().map(Failure::from));
    }
}
