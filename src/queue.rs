//! Message queue facade.
//!
//! [`Queue`] addresses queues by name. Names are resolved to queue URLs once
//! and remembered in the [`cache::QueueUrlCache`] owned by the facade.

/// Queue name to URL cache.
pub mod cache;
/// Messages and per-entry outcomes of batch operations.
pub mod message;

use crate::error::{Error, Result};

use aws_sdk_sqs::{Client, types};
use std::sync::Arc;

/// Largest number of entries the queue service accepts in one batch request.
pub const MAX_BATCH_SIZE: usize = 10;

/// Message queue facade.
///
/// ```rust,no_run
/// use dynamodb_facade::config::AwsConfig;
/// use dynamodb_facade::queue::{Queue, message::PushMessage};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let queue = Queue::new(&AwsConfig::from_env().load().await);
/// queue.create_queue("orders").await?;
/// let output = queue
///     .push("orders", PushMessage::new(json!({"orderId": "1"})))
///     .await?;
/// assert!(output.failed.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Queue {
    client: Client,
    urls: Arc<cache::QueueUrlCache>,
}

impl Queue {
    /// Queue facade backed by a client built from `sdk_config`.
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self::from_client(Client::new(sdk_config))
    }

    /// Queue facade backed by an existing client, with an empty URL cache.
    pub fn from_client(client: Client) -> Self {
        Self {
            client,
            urls: Arc::new(cache::QueueUrlCache::new()),
        }
    }

    /// The URL cache. Clones of this facade share it.
    pub fn cache(&self) -> &cache::QueueUrlCache {
        &self.urls
    }

    /// The underlying client, for operations this facade does not cover.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Create queue `name` and return its name.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.create_queue", skip(self), err)
    )]
    pub async fn create_queue(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .create_queue()
            .queue_name(name)
            .send()
            .await
            .map_err(Error::queue)?;
        if let Some(url) = output.queue_url {
            self.urls.insert(name, url);
        }
        Ok(name.to_string())
    }

    /// Delete queue `name` and forget its URL.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.delete_queue", skip(self), err)
    )]
    pub async fn delete_queue(&self, name: &str) -> Result<()> {
        let url = self.queue_url(name).await?;
        self.client
            .delete_queue()
            .queue_url(url)
            .send()
            .await
            .map_err(Error::queue)?;
        self.urls.remove(name);
        Ok(())
    }

    /// Delete every message in queue `name`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.clear_queue", skip(self), err)
    )]
    pub async fn clear_queue(&self, name: &str) -> Result<()> {
        let url = self.queue_url(name).await?;
        self.client
            .purge_queue()
            .queue_url(url)
            .send()
            .await
            .map_err(Error::queue)?;
        Ok(())
    }

    /// URL of queue `name`, from the cache when known.
    ///
    /// Fails with [`Error::QueueNotFound`] when no such queue exists.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.queue_url", skip(self), err)
    )]
    pub async fn queue_url(&self, name: &str) -> Result<String> {
        if let Some(url) = self.urls.get(name) {
            return Ok(url);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("queue url cache miss");
        let output = self
            .client
            .get_queue_url()
            .queue_name(name)
            .send()
            .await
            .map_err(|err| {
                let missing = err
                    .as_service_error()
                    .is_some_and(|service_error| service_error.is_queue_does_not_exist());
                if missing {
                    Error::QueueNotFound {
                        name: name.to_string(),
                    }
                } else {
                    Error::queue(err)
                }
            })?;
        let url = output.queue_url.ok_or_else(|| Error::QueueNotFound {
            name: name.to_string(),
        })?;
        self.urls.insert(name, url.clone());
        Ok(url)
    }

    /// Push one message or a batch of messages to queue `name`.
    ///
    /// Rejected messages are reported in [`message::PushOutput::failed`]; only
    /// resolving the queue URL or building a request fails the call. Batches
    /// are sent [`MAX_BATCH_SIZE`] messages at a time, and a batch request the
    /// service fails whole reports each of its messages as failed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.push", skip(self, messages), err)
    )]
    pub async fn push(
        &self,
        name: &str,
        messages: impl Into<message::Push>,
    ) -> Result<message::PushOutput> {
        let messages = messages.into();
        if matches!(&messages, message::Push::Batch(batch) if batch.is_empty()) {
            return Ok(message::PushOutput::default());
        }
        let url = self.queue_url(name).await?;
        let output = match messages {
            message::Push::Single(message) => {
                let outcome = self
                    .client
                    .send_message()
                    .queue_url(url)
                    .message_body(message.body.into_text())
                    .set_delay_seconds(message.delay_seconds)
                    .set_message_deduplication_id(message.message_deduplication_id)
                    .set_message_group_id(message.message_group_id)
                    .send()
                    .await
                    .map_err(Error::queue);
                message::PushOutput::single(outcome)
            }
            message::Push::Batch(messages) => {
                let mut output = message::PushOutput::default();
                for entries in push_batches(messages)? {
                    let ids = entries.iter().map(|entry| entry.id().to_string()).collect();
                    let response = self
                        .client
                        .send_message_batch()
                        .queue_url(&url)
                        .set_entries(Some(entries))
                        .send()
                        .await
                        .map_err(Error::queue);
                    output.record(ids, response);
                }
                output
            }
        };
        #[cfg(feature = "tracing")]
        if !output.failed.is_empty() {
            tracing::warn!(failed = output.failed.len(), "queue rejected messages");
        }
        Ok(output)
    }

    /// Delete received messages from queue `name`, [`MAX_BATCH_SIZE`] at a time.
    ///
    /// A batch request the service fails whole reports each of its messages
    /// in [`message::DeleteOutput::failed`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.delete_messages", skip(self, messages), err)
    )]
    pub async fn delete_messages(
        &self,
        name: &str,
        messages: Vec<message::DeleteMessage>,
    ) -> Result<message::DeleteOutput> {
        let mut output = message::DeleteOutput::default();
        if messages.is_empty() {
            return Ok(output);
        }
        let url = self.queue_url(name).await?;
        for entries in delete_batches(messages)? {
            let ids = entries.iter().map(|entry| entry.id().to_string()).collect();
            let response = self
                .client
                .delete_message_batch()
                .queue_url(&url)
                .set_entries(Some(entries))
                .send()
                .await
                .map_err(Error::queue);
            output.record(ids, response);
        }
        #[cfg(feature = "tracing")]
        if !output.failed.is_empty() {
            tracing::warn!(failed = output.failed.len(), "queue kept messages");
        }
        Ok(output)
    }

    /// URLs of the queues whose name starts with `prefix`, or of every queue.
    ///
    /// An empty prefix is the same as no prefix.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_facade.list_queues", skip(self), err)
    )]
    pub async fn list_queues(&self, prefix: Option<&str>) -> Result<Vec<String>> {
        let prefix = prefix.filter(|prefix| !prefix.is_empty());
        let mut urls = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .client
                .list_queues()
                .set_queue_name_prefix(prefix.map(str::to_string))
                .set_next_token(next_token)
                .send()
                .await
                .map_err(Error::queue)?;
            urls.extend(output.queue_urls.unwrap_or_default());
            next_token = output.next_token;
            if next_token.is_none() {
                break;
            }
        }
        Ok(urls)
    }
}

fn push_batches(
    messages: Vec<message::PushMessage>,
) -> Result<Vec<Vec<types::SendMessageBatchRequestEntry>>> {
    let entries = messages
        .into_iter()
        .map(|message| message.into_batch_entry(uuid::Uuid::new_v4().to_string()))
        .collect::<Result<Vec<_>>>()?;
    Ok(entries
        .chunks(MAX_BATCH_SIZE)
        .map(<[_]>::to_vec)
        .collect())
}

fn delete_batches(
    messages: Vec<message::DeleteMessage>,
) -> Result<Vec<Vec<types::DeleteMessageBatchRequestEntry>>> {
    let entries = messages
        .into_iter()
        .map(types::DeleteMessageBatchRequestEntry::try_from)
        .collect::<Result<Vec<_>>>()?;
    Ok(entries
        .chunks(MAX_BATCH_SIZE)
        .map(<[_]>::to_vec)
        .collect())
}
