use std::sync::Arc;

use crate::Fields;
use crate::ValidationError;

/// Capability shared by every configuration message: check the message's own
/// field rules and recurse into its children, stopping at the first failure.
///
/// Implementations are normally generated with `#[derive(Validate)]`; the
/// walker in [`Fields`] only ever talks to this trait, never to concrete
/// message types.
///
/// ## Example
///
/// ```ignore
/// #[derive(Validate)]
/// struct Upstream {
///     #[validate(min_len = 1)]
///     cluster: String,
///     #[validate(required)]
///     timeout: Option<Duration>,
/// }
///
/// // Equivalent to:
/// impl Validate for Upstream {
///     fn validate(&self) -> Result<(), ValidationError> {
///         let fields = Fields::new("Upstream");
///         fields.min_len("Cluster", &self.cluster, 1)?;
///         fields.required("Timeout", self.timeout.as_ref())?;
///         fields.embedded("Timeout", &self.timeout)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Validate {
    /// Validate this message and everything reachable from it.
    ///
    /// Returns the first violation found in declared field order.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// An unset optional message is valid; only a parent that marks the field
/// `required` can reject its absence.
impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Some(inner) => inner.validate(),
            None => Ok(()),
        }
    }
}

impl<T: Validate + ?Sized> Validate for &T {
    fn validate(&self) -> Result<(), ValidationError> {
        (**self).validate()
    }
}

impl<T: Validate + ?Sized> Validate for Box<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        (**self).validate()
    }
}

impl<T: Validate + ?Sized> Validate for Arc<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        (**self).validate()
    }
}

/// A discriminated union ("oneof") stored in its parent as `Option<Self>`.
///
/// Variant checks are reported against the parent message, so the walker
/// hands the parent's [`Fields`] to [`Oneof::validate_variant`]. Implement
/// with `#[derive(Oneof)]`.
pub trait Oneof {
    /// Check the populated variant's rules and recurse into its payload.
    fn validate_variant(&self, fields: &Fields) -> Result<(), ValidationError>;
}
