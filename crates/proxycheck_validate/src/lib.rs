// Generated code refers to this crate by its absolute path
extern crate self as proxycheck_validate;

mod error;
mod pattern;
pub mod rules;
mod validate;
mod walk;

pub use error::Chain;
pub use error::ErrorKind;
pub use error::ValidationError;
pub use pattern::PatternCache;
pub use pattern::PatternError;
pub use pattern::PatternSpec;
pub use pattern::VALIDATION_PATTERNS;
pub use proxycheck_validate_derive::Oneof;
pub use proxycheck_validate_derive::Validate;
pub use rules::NumericBound;
pub use validate::Oneof;
pub use validate::Validate;
pub use walk::Fields;

#[doc(hidden)]
pub mod __private {
    pub use linkme;
}
