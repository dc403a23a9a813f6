/// Internal representation of read operation parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct ReadInput {
    pub(crate) consistent_read: Option<bool>,
    pub(crate) table_name: String,
}

/// Arguments common to key-addressed reads (GetItem, BatchGetItem).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct ReadArgs {
    /// Whether to use a consistent read.
    ///
    /// `true` for strongly consistent reads, `false` or `None` for eventually consistent reads.
    /// Consistent reads consume more capacity units but guarantee you see the latest data.
    pub consistent_read: Option<bool>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl ReadArgs {
    /// Eventually consistent reads from `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            consistent_read: None,
            table_name: table_name.into(),
        }
    }

    /// Choose the read consistency. `None` is a no-op.
    pub fn with_consistent_read(mut self, consistent_read: Option<bool>) -> Self {
        if consistent_read.is_some() {
            self.consistent_read = consistent_read;
        }
        self
    }
}

impl From<ReadArgs> for ReadInput {
    fn from(read_args: ReadArgs) -> Self {
        Self {
            consistent_read: read_args.consistent_read,
            table_name: read_args.table_name,
        }
    }
}

/// apply common read operation settings to a builder
macro_rules! apply_read_operation {
    ($builder:expr, $read_operation:expr) => {
        $builder
            .set_consistent_read($read_operation.consistent_read)
            .table_name($read_operation.table_name)
    };
}

pub(crate) use apply_read_operation;
