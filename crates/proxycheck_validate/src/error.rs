use std::borrow::Cow;
use std::fmt;

use strum::Display;

/// The class of rule a [`ValidationError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// A required reference or scalar was absent.
    MissingRequired,
    /// A required discriminated union had no variant populated.
    UnionVariantMissing,
    /// A string was shorter or longer than its code-point bounds.
    LengthViolation,
    /// A non-empty string did not match its field's pattern.
    PatternMismatch,
    /// A number fell outside its declared bound.
    RangeViolation,
    /// A repeated or map field held too few or too many entries.
    ItemCountViolation,
    /// A nested, indexed, or union-variant child failed; see `cause`.
    EmbeddedValidationFailure,
}

/// Diagnostic returned by a failed validation walk.
///
/// `field` is relative to the message named by `type_name`; a failure in a
/// descendant is carried as `cause`, so the full location is recovered by
/// following the chain (see [`ValidationError::path`]).
///
/// Rendered as:
///
/// ```text
/// invalid [key for ]<TypeName>.<field>: <reason>[ | caused by: <cause>]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    type_name: &'static str,
    field: Cow<'static, str>,
    reason: Cow<'static, str>,
    kind: ErrorKind,
    cause: Option<Box<ValidationError>>,
    key: bool,
}

impl ValidationError {
    pub fn new(
        type_name: &'static str,
        field: impl Into<Cow<'static, str>>,
        kind: ErrorKind,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            type_name,
            field: field.into(),
            reason: reason.into(),
            kind,
            cause: None,
            key: false,
        }
    }

    /// Attach the descendant failure that caused this one.
    pub fn with_cause(mut self, cause: ValidationError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Mark this failure as concerning a map key rather than its value.
    pub fn for_key(mut self) -> Self {
        self.key = true;
        self
    }

    /// Name of the message type that owns the violated field
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn cause(&self) -> Option<&ValidationError> {
        self.cause.as_deref()
    }

    pub fn key(&self) -> bool {
        self.key
    }

    /// Per-type error name, e.g. `OAuth2ConfigValidationError`.
    pub fn error_name(&self) -> String {
        format!("{}ValidationError", self.type_name)
    }

    /// Iterate over this error followed by each nested cause.
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// The innermost error in the chain, i.e. the rule that actually failed.
    pub fn root_cause(&self) -> &ValidationError {
        let mut current = self;
        while let Some(cause) = current.cause() {
            current = cause;
        }
        current
    }

    /// Dotted location of the failing field, starting at the outermost type.
    ///
    /// For a failure three levels deep this reads like
    /// `OAuth2.Config.Credentials.TokenFormation`.
    pub fn path(&self) -> String {
        let mut path = self.type_name.to_string();
        for error in self.chain() {
            path.push('.');
            path.push_str(&error.field);
        }
        path
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.key { "key for " } else { "" };
        write!(
            f,
            "invalid {}{}.{}: {}",
            key, self.type_name, self.field, self.reason
        )?;
        if let Some(cause) = &self.cause {
            write!(f, " | caused by: {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Iterator returned by [`ValidationError::chain`].
pub struct Chain<'a> {
    next: Option<&'a ValidationError>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a ValidationError;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.cause();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hmac_missing() -> ValidationError {
        ValidationError::new(
            "OAuth2Credentials",
            "HmacSecret",
            ErrorKind::MissingRequired,
            "value is required",
        )
    }

    #[test]
    fn test_display_without_cause() {
        insta::assert_snapshot!(
            hmac_missing().to_string(),
            @"invalid OAuth2Credentials.HmacSecret: value is required"
        );
    }

    #[test]
    fn test_display_key_violation() {
        let error = ValidationError::new(
            "Metadata",
            "FilterMetadata[]",
            ErrorKind::LengthViolation,
            "value length must be at least 1 runes",
        )
        .for_key();
        assert!(error.key());
        insta::assert_snapshot!(
            error.to_string(),
            @"invalid key for Metadata.FilterMetadata[]: value length must be at least 1 runes"
        );
    }

    #[test]
    fn test_display_chained_causes() {
        let credentials = ValidationError::new(
            "OAuth2Config",
            "Credentials",
            ErrorKind::EmbeddedValidationFailure,
            "embedded message failed validation",
        )
        .with_cause(hmac_missing());
        let root = ValidationError::new(
            "OAuth2",
            "Config",
            ErrorKind::EmbeddedValidationFailure,
            "embedded message failed validation",
        )
        .with_cause(credentials);

        insta::assert_snapshot!(
            root.to_string(),
            @"invalid OAuth2.Config: embedded message failed validation | caused by: invalid OAuth2Config.Credentials: embedded message failed validation | caused by: invalid OAuth2Credentials.HmacSecret: value is required"
        );
        assert_eq!(root.to_string(), root.clone().to_string());
    }

    #[test]
    fn test_chain_path_and_root_cause() {
        let root = ValidationError::new(
            "OAuth2Config",
            "Credentials",
            ErrorKind::EmbeddedValidationFailure,
            "embedded message failed validation",
        )
        .with_cause(hmac_missing());

        let fields: Vec<&str> = root.chain().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["Credentials", "HmacSecret"]);
        assert_eq!(root.path(), "OAuth2Config.Credentials.HmacSecret");
        assert_eq!(root.root_cause().kind(), ErrorKind::MissingRequired);
        assert_eq!(root.error_name(), "OAuth2ConfigValidationError");
    }

    #[test]
    fn test_source_exposes_cause() {
        use std::error::Error;

        let root = ValidationError::new(
            "OAuth2",
            "Config",
            ErrorKind::EmbeddedValidationFailure,
            "embedded message failed validation",
        )
        .with_cause(hmac_missing());

        let source = root.source().expect("cause should be the source");
        assert_eq!(
            source.to_string(),
            "invalid OAuth2Credentials.HmacSecret: value is required"
        );
        assert!(hmac_missing().source().is_none());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::MissingRequired.to_string(), "missing_required");
        assert_eq!(
            ErrorKind::EmbeddedValidationFailure.to_string(),
            "embedded_validation_failure"
        );
    }
}
