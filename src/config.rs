//! AWS client configuration.

/// Region used when neither the configuration nor the environment names one.
pub const DEFAULT_REGION: &str = "ap-south-1";

/// Connection settings shared by the store and queue clients.
///
/// ```rust,no_run
/// use dynamodb_facade::{config::AwsConfig, store::Store};
///
/// # async fn example() {
/// let sdk_config = AwsConfig::from_env().load().await;
/// let store = Store::new(&sdk_config);
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AwsConfig {
    /// Custom endpoint URL, e.g. a local DynamoDB or an SQS emulator.
    pub endpoint_url: Option<String>,
    /// AWS region; [`DEFAULT_REGION`] when `None`.
    pub region: Option<String>,
}

impl AwsConfig {
    /// Read `AWS_REGION` and `AWS_ENDPOINT_URL`. Unset or empty variables are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());
        Self {
            endpoint_url: non_empty("AWS_ENDPOINT_URL"),
            region: non_empty("AWS_REGION"),
        }
    }

    /// The region the clients will talk to.
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Load the SDK configuration, with credentials from the default provider chain.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "dynamodb_facade.load_config",
            skip_all,
            fields(region = self.region(), endpoint_url = ?self.endpoint_url)
        )
    )]
    pub async fn load(&self) -> aws_config::SdkConfig {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(self.region().to_string()));
        if let Some(endpoint_url) = &self.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        loader.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use std::collections;

    #[rstest]
    #[case::unset(
        &[],
        AwsConfig::default(),
        "ap-south-1"
    )]
    #[case::empty_values_ignored(
        &[("AWS_REGION", ""), ("AWS_ENDPOINT_URL", "")],
        AwsConfig::default(),
        "ap-south-1"
    )]
    #[case::local(
        &[("AWS_REGION", "eu-west-1"), ("AWS_ENDPOINT_URL", "http://localhost:8000")],
        AwsConfig {
            endpoint_url: Some(
                "http://localhost:8000".to_string()
            ),
            region: Some(
                "eu-west-1".to_string()
            ),
        },
        "eu-west-1"
    )]
    fn test_from_lookup(
        #[case] variables: &[(&str, &str)],
        #[case] expected: AwsConfig,
        #[case] region: &str,
    ) {
        let variables: collections::HashMap<&str, &str> = variables.iter().copied().collect();
        let actual = AwsConfig::from_lookup(|name| variables.get(name).map(|v| v.to_string()));
        assert_eq!(actual, expected);
        assert_eq!(actual.region(), region);
    }
}
