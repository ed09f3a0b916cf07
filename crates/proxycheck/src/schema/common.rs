//! Shared building blocks referenced by filter configurations.

use proxycheck_validate::Oneof;
use proxycheck_validate::Validate;
use serde::Deserialize;

/// A span of time, split the way the wire format splits it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct Duration {
    #[validate(range(gte = 0, lt = 4_294_967_296))]
    pub seconds: i64,
    #[validate(range(gte = 0, lte = 999_999_999))]
    pub nanos: i32,
}

impl Duration {
    pub const fn from_secs(seconds: i64) -> Self {
        Self { seconds, nanos: 0 }
    }
}

/// Reference to a secret delivered out of band.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct SdsSecretConfig {
    #[validate(min_len = 1)]
    pub name: String,
}

impl SdsSecretConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A remote endpoint reached through an upstream cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct HttpUri {
    #[validate(min_len = 1)]
    pub uri: String,
    #[validate(oneof, required)]
    pub http_upstream_type: Option<HttpUpstreamType>,
    #[validate(required)]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Oneof)]
#[serde(rename_all = "snake_case")]
pub enum HttpUpstreamType {
    #[validate(min_len = 1)]
    Cluster(String),
}
