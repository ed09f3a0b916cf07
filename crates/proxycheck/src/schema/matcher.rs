//! Request matchers referenced by filter configurations.

use proxycheck_validate::Oneof;
use proxycheck_validate::Validate;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct RegexMatcher {
    #[validate(min_len = 1)]
    pub regex: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct StringMatcher {
    #[validate(oneof, required)]
    pub match_pattern: Option<MatchPattern>,
    pub ignore_case: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Oneof)]
#[serde(rename_all = "snake_case")]
pub enum MatchPattern {
    Exact(String),
    #[validate(min_len = 1)]
    Prefix(String),
    #[validate(min_len = 1)]
    Suffix(String),
    #[validate(min_len = 1)]
    Contains(String),
    #[validate(required)]
    SafeRegex(Option<RegexMatcher>),
}

impl StringMatcher {
    pub fn exact(value: impl Into<String>) -> Self {
        Self {
            match_pattern: Some(MatchPattern::Exact(value.into())),
            ignore_case: false,
        }
    }

    pub fn prefix(value: impl Into<String>) -> Self {
        Self {
            match_pattern: Some(MatchPattern::Prefix(value.into())),
            ignore_case: false,
        }
    }
}

/// Matches on the request path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct PathMatcher {
    #[validate(oneof, required)]
    pub rule: Option<PathRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Oneof)]
#[serde(rename_all = "snake_case")]
pub enum PathRule {
    #[validate(required)]
    Path(Option<StringMatcher>),
}

impl PathMatcher {
    pub fn exact(path: impl Into<String>) -> Self {
        Self {
            rule: Some(PathRule::Path(Some(StringMatcher::exact(path)))),
        }
    }
}

/// Matches on a request header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct HeaderMatcher {
    #[validate(min_len = 1, pattern = r"^[^\x00\n\r]+$")]
    pub name: String,
    #[validate(oneof)]
    pub header_match_specifier: Option<HeaderMatchSpecifier>,
    pub invert_match: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Oneof)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMatchSpecifier {
    ExactMatch(String),
    #[validate(min_len = 1)]
    PrefixMatch(String),
    PresentMatch(bool),
    #[validate(required)]
    StringMatch(Option<StringMatcher>),
}

impl HeaderMatcher {
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header_match_specifier: Some(HeaderMatchSpecifier::PresentMatch(true)),
            invert_match: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use proxycheck_validate::ErrorKind;

    use super::*;

    #[test]
    fn test_path_matcher_chain() {
        assert!(PathMatcher::exact("/callback").validate().is_ok());

        let err = PathMatcher::default().validate().unwrap_err();
        assert_eq!(err.field(), "Rule");
        assert_eq!(err.kind(), ErrorKind::UnionVariantMissing);

        let err = PathMatcher {
            rule: Some(PathRule::Path(None)),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), "Path");
        assert_eq!(err.kind(), ErrorKind::MissingRequired);

        let err = PathMatcher {
            rule: Some(PathRule::Path(Some(StringMatcher::prefix("")))),
        }
        .validate()
        .unwrap_err();
        insta::assert_snapshot!(
            err.to_string(),
            @"invalid PathMatcher.Path: embedded message failed validation | caused by: invalid StringMatcher.Prefix: value length must be at least 1 runes"
        );
    }

    #[test]
    fn test_exact_match_may_be_empty() {
        assert!(StringMatcher::exact("").validate().is_ok());
    }

    #[test]
    fn test_safe_regex_requires_matcher() {
        let matcher = StringMatcher {
            match_pattern: Some(MatchPattern::SafeRegex(None)),
            ignore_case: true,
        };
        let err = matcher.validate().unwrap_err();
        assert_eq!(err.field(), "SafeRegex");
    }

    #[test]
    fn test_header_name_rules() {
        assert!(HeaderMatcher::present("authorization").validate().is_ok());

        let err = HeaderMatcher::present("").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LengthViolation);

        let err = HeaderMatcher::present("x-bad\r\nheader").validate().unwrap_err();
        assert_eq!(err.field(), "Name");
        assert_eq!(err.kind(), ErrorKind::PatternMismatch);
        insta::assert_snapshot!(
            err.reason(),
            @r#"value does not match regex pattern "^[^\x00\n\r]+$""#
        );
    }

    #[test]
    fn test_header_specifier_is_optional() {
        let matcher = HeaderMatcher {
            name: "x-trace".to_string(),
            header_match_specifier: None,
            invert_match: true,
        };
        assert!(matcher.validate().is_ok());
    }
}
