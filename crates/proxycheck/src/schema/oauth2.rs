//! Configuration of the OAuth2 HTTP filter.

use proxycheck_validate::Oneof;
use proxycheck_validate::Validate;
use serde::Deserialize;

use super::common::HttpUri;
use super::common::SdsSecretConfig;
use super::matcher::HeaderMatcher;
use super::matcher::PathMatcher;

/// Filter root. An unset `config` is a pass-through filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
#[validate(type_name = "OAuth2")]
pub struct OAuth2 {
    pub config: Option<OAuth2Config>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct OAuth2Config {
    /// Endpoint tokens are requested from
    pub token_endpoint: Option<HttpUri>,
    /// Where users are sent to sign in
    #[validate(min_len = 1)]
    pub authorization_endpoint: String,
    #[validate(required)]
    pub credentials: Option<OAuth2Credentials>,
    /// Callback URI handed to the authorization server
    #[validate(min_len = 1)]
    pub redirect_uri: String,
    #[validate(required)]
    pub redirect_path_matcher: Option<PathMatcher>,
    #[validate(required)]
    pub signout_path: Option<PathMatcher>,
    pub forward_bearer_token: bool,
    /// Requests matching any of these bypass the filter
    pub pass_through_matcher: Vec<HeaderMatcher>,
    pub auth_scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct OAuth2Credentials {
    #[validate(min_len = 1)]
    pub client_id: String,
    #[validate(required)]
    pub token_secret: Option<SdsSecretConfig>,
    pub cookie_names: Option<CookieNames>,
    #[validate(oneof, required)]
    pub token_formation: Option<TokenFormation>,
}

/// How the filter signs the tokens it hands out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Oneof)]
#[serde(rename_all = "snake_case")]
pub enum TokenFormation {
    #[validate(required)]
    HmacSecret(Option<SdsSecretConfig>),
}

/// Cookie names override the defaults when non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
#[validate(type_name = "OAuth2Credentials_CookieNames")]
pub struct CookieNames {
    #[validate(pattern = r"^:?[0-9a-zA-Z!#$%&'*+-.^_|~`]+$")]
    pub bearer_token: String,
    #[validate(pattern = r"^:?[0-9a-zA-Z!#$%&'*+-.^_|~`]+$")]
    pub oauth_hmac: String,
    #[validate(pattern = r"^:?[0-9a-zA-Z!#$%&'*+-.^_|~`]+$")]
    pub oauth_expires: String,
}
