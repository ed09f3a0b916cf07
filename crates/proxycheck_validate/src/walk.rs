//! The recursive walk over a message's fields.
//!
//! A validator creates one [`Fields`] for the message it is checking and
//! calls it once per rule, in declared field order, propagating with `?`.
//! Every method either passes or returns a [`ValidationError`] that names the
//! owning message type and the field, wrapping descendant failures as causes.

use std::borrow::Cow;
use std::fmt::Display;

use crate::rules;
use crate::rules::NumericBound;
use crate::rules::Violation;
use crate::ErrorKind;
use crate::Oneof;
use crate::PatternCache;
use crate::Validate;
use crate::ValidationError;

/// Field checks for one message type.
#[derive(Debug, Clone, Copy)]
pub struct Fields {
    type_name: &'static str,
}

impl Fields {
    pub const fn new(type_name: &'static str) -> Self {
        Self { type_name }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    fn violation(
        &self,
        field: impl Into<Cow<'static, str>>,
        violation: Violation,
    ) -> ValidationError {
        ValidationError::new(self.type_name, field, violation.kind, violation.reason)
    }

    fn embedded_failure(
        &self,
        field: impl Into<Cow<'static, str>>,
        cause: ValidationError,
    ) -> ValidationError {
        ValidationError::new(
            self.type_name,
            field,
            ErrorKind::EmbeddedValidationFailure,
            rules::EMBEDDED_FAILED,
        )
        .with_cause(cause)
    }

    /// Require a field to be set, handing back the value for further checks.
    pub fn required<'v, T: ?Sized>(
        &self,
        field: &'static str,
        value: Option<&'v T>,
    ) -> Result<&'v T, ValidationError> {
        match value {
            Some(value) => Ok(value),
            None => Err(self.violation(
                field,
                Violation::new(ErrorKind::MissingRequired, rules::VALUE_REQUIRED),
            )),
        }
    }

    pub fn min_len(
        &self,
        field: &'static str,
        value: &str,
        min: usize,
    ) -> Result<(), ValidationError> {
        rules::min_len(value, min).map_err(|v| self.violation(field, v))
    }

    pub fn max_len(
        &self,
        field: &'static str,
        value: &str,
        max: usize,
    ) -> Result<(), ValidationError> {
        rules::max_len(value, max).map_err(|v| self.violation(field, v))
    }

    /// Match a non-empty value against the pattern registered for this field.
    pub fn pattern(&self, field: &'static str, value: &str) -> Result<(), ValidationError> {
        self.pattern_for(self.type_name, field, value)
    }

    /// Like [`Fields::pattern`], but with the pattern registered under `key`
    /// rather than this message's type name. Union variants use this: their
    /// patterns belong to the union, which any message may hold.
    pub fn pattern_for(
        &self,
        key: &'static str,
        field: &'static str,
        value: &str,
    ) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Ok(());
        }
        let regex = PatternCache::global().regex(key, field);
        rules::pattern(value, regex).map_err(|v| self.violation(field, v))
    }

    pub fn range<T>(
        &self,
        field: &'static str,
        value: &T,
        bound: &NumericBound<T>,
    ) -> Result<(), ValidationError>
    where
        T: PartialOrd + Display,
    {
        bound.check(value).map_err(|v| self.violation(field, v))
    }

    pub fn min_items(
        &self,
        field: &'static str,
        len: usize,
        min: usize,
    ) -> Result<(), ValidationError> {
        rules::min_items(len, min).map_err(|v| self.violation(field, v))
    }

    pub fn max_items(
        &self,
        field: &'static str,
        len: usize,
        max: usize,
    ) -> Result<(), ValidationError> {
        rules::max_items(len, max).map_err(|v| self.violation(field, v))
    }

    pub fn min_pairs(
        &self,
        field: &'static str,
        len: usize,
        min: usize,
    ) -> Result<(), ValidationError> {
        rules::min_pairs(len, min).map_err(|v| self.violation(field, v))
    }

    pub fn max_pairs(
        &self,
        field: &'static str,
        len: usize,
        max: usize,
    ) -> Result<(), ValidationError> {
        rules::max_pairs(len, max).map_err(|v| self.violation(field, v))
    }

    /// Recurse into a singular child message.
    pub fn embedded<T>(
        &self,
        field: impl Into<Cow<'static, str>>,
        value: &T,
    ) -> Result<(), ValidationError>
    where
        T: Validate + ?Sized,
    {
        value
            .validate()
            .map_err(|cause| self.embedded_failure(field, cause))
    }

    /// Recurse into each element of a repeated field, reporting the first
    /// failing element as `Field[index]`. Later elements are not visited.
    pub fn repeated<'a, T, I>(
        &self,
        field: &'static str,
        items: I,
    ) -> Result<(), ValidationError>
    where
        T: Validate + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        for (idx, item) in items.into_iter().enumerate() {
            if let Err(cause) = item.validate() {
                return Err(self.embedded_failure(format!("{}[{}]", field, idx), cause));
            }
        }
        Ok(())
    }

    /// Apply `rule` to every key of a map field in ascending key order.
    /// Failures are reported as `Field[key]` with the key flag set.
    pub fn map_keys<'a, K, I, R>(
        &self,
        field: &'static str,
        keys: I,
        rule: R,
    ) -> Result<(), ValidationError>
    where
        K: Display + Ord + ?Sized + 'a,
        I: IntoIterator<Item = &'a K>,
        R: Fn(&K) -> Result<(), Violation>,
    {
        let mut keys: Vec<&K> = keys.into_iter().collect();
        keys.sort();
        for key in keys {
            if let Err(v) = rule(key) {
                return Err(self.violation(format!("{}[{}]", field, key), v).for_key());
            }
        }
        Ok(())
    }

    /// Recurse into every value of a map field in ascending key order,
    /// reporting the first failure as `Field[key]`.
    pub fn map_values<'a, K, V, I>(
        &self,
        field: &'static str,
        entries: I,
    ) -> Result<(), ValidationError>
    where
        K: Display + Ord + 'a,
        V: Validate + 'a,
        I: IntoIterator<Item = (&'a K, &'a V)>,
    {
        let mut entries: Vec<(&K, &V)> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in entries {
            if let Err(cause) = value.validate() {
                return Err(self.embedded_failure(format!("{}[{}]", field, key), cause));
            }
        }
        Ok(())
    }

    /// Dispatch on a discriminated union.
    ///
    /// An unset union fails as `field` only when `required`; a populated one
    /// is checked by its variant, which reports against its own field name.
    pub fn oneof<U>(
        &self,
        field: &'static str,
        value: Option<&U>,
        required: bool,
    ) -> Result<(), ValidationError>
    where
        U: Oneof + ?Sized,
    {
        match value {
            Some(variant) => variant.validate_variant(self),
            None if required => Err(self.violation(
                field,
                Violation::new(ErrorKind::UnionVariantMissing, rules::VALUE_REQUIRED),
            )),
            None => Ok(()),
        }
    }
}
