use dashmap::DashMap;

/// Queue name to queue URL cache.
///
/// Owned by a [`Queue`](crate::queue::Queue); a lookup that hits the cache
/// skips the network call. Entries live until removed or cleared.
///
/// ```rust
/// use dynamodb_facade::queue::cache::QueueUrlCache;
///
/// let cache = QueueUrlCache::new();
/// cache.insert("orders", "https://sqs.ap-south-1.amazonaws.com/123/orders");
/// assert!(cache.get("orders").is_some());
/// cache.clear();
/// assert!(cache.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct QueueUrlCache {
    urls: DashMap<String, String>,
}

impl QueueUrlCache {
    /// Create a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached URL of queue `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.urls.get(name).map(|url| url.clone())
    }

    /// Remember the URL of queue `name`, replacing any previous entry.
    pub fn insert(&self, name: impl Into<String>, url: impl Into<String>) {
        self.urls.insert(name.into(), url.into());
    }

    /// Forget queue `name`, returning its URL if it was cached.
    pub fn remove(&self, name: &str) -> Option<String> {
        self.urls.remove(name).map(|(_, url)| url)
    }

    /// Forget every queue.
    pub fn clear(&self) {
        self.urls.clear();
    }

    /// Number of cached queues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
