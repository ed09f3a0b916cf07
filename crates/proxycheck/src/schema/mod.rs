//! Message types for the proxy filter configurations this tool admits.
//!
//! Every message derives [`Validate`](proxycheck_validate::Validate) and
//! deserializes from TOML with absent fields left unset, so a missing value is
//! reported by validation rather than by the parser.

pub mod common;
pub mod matcher;
pub mod oauth2;

pub use self::common::Duration;
pub use self::common::HttpUpstreamType;
pub use self::common::HttpUri;
pub use self::common::SdsSecretConfig;
pub use self::matcher::HeaderMatchSpecifier;
pub use self::matcher::HeaderMatcher;
pub use self::matcher::MatchPattern;
pub use self::matcher::PathMatcher;
pub use self::matcher::PathRule;
pub use self::matcher::RegexMatcher;
pub use self::matcher::StringMatcher;
pub use self::oauth2::CookieNames;
pub use self::oauth2::OAuth2;
pub use self::oauth2::OAuth2Config;
pub use self::oauth2::OAuth2Credentials;
pub use self::oauth2::TokenFormation;
