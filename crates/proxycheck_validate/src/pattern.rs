//! Process-wide table of compiled field patterns.
//!
//! Every `#[validate(pattern = "...")]` attribute registers a [`PatternSpec`]
//! in [`VALIDATION_PATTERNS`] at link time. The first lookup (or an explicit
//! [`PatternCache::init`] at startup) compiles the whole table once; after
//! that it is only ever read.

use std::collections::HashMap;
use std::sync::LazyLock;

use linkme::distributed_slice;
use regex::Regex;

/// A pattern literal attached to one field of one message type.
#[derive(Debug)]
pub struct PatternSpec {
    type_name: &'static str,
    field: &'static str,
    source: &'static str,
}

impl PatternSpec {
    pub const fn new(type_name: &'static str, field: &'static str, source: &'static str) -> Self {
        Self {
            type_name,
            field,
            source,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn source(&self) -> &'static str {
        self.source
    }
}

/// Link-time registry of every pattern declared by the derive macros.
#[distributed_slice]
pub static VALIDATION_PATTERNS: [PatternSpec];

static GLOBAL: LazyLock<PatternCache> = LazyLock::new(|| {
    match PatternCache::try_build(VALIDATION_PATTERNS.iter()) {
        Ok(cache) => cache,
        Err(e) => panic!("{}", e),
    }
});

/// Error building a [`PatternCache`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    Invalid {
        type_name: &'static str,
        field: &'static str,
        error: String, // regex::Error flattened to keep this Clone + Eq
    },
    Conflict {
        type_name: &'static str,
        field: &'static str,
        first: &'static str,
        second: &'static str,
    },
}

impl std::fmt::Display for PatternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternError::Invalid {
                type_name,
                field,
                error,
            } => write!(f, "invalid pattern for {}.{}: {}", type_name, field, error),
            PatternError::Conflict {
                type_name,
                field,
                first,
                second,
            } => write!(
                f,
                "conflicting patterns for {}.{}: {:?} and {:?}",
                type_name, field, first, second
            ),
        }
    }
}

impl std::error::Error for PatternError {}

/// Compiled patterns keyed by type name, then field name.
#[derive(Debug)]
pub struct PatternCache {
    compiled: HashMap<&'static str, HashMap<&'static str, Regex>>,
}

impl PatternCache {
    /// The process-wide cache built from [`VALIDATION_PATTERNS`].
    ///
    /// # Panics
    ///
    /// On first access, if any registered pattern fails to compile or two
    /// registrations disagree about the same field.
    pub fn global() -> &'static PatternCache {
        &GLOBAL
    }

    /// Force compilation of every registered pattern, returning how many
    /// fields are covered. Call at startup so a bad pattern aborts the
    /// process before any configuration is accepted.
    pub fn init() -> usize {
        Self::global().len()
    }

    /// Compile a set of pattern registrations into a cache.
    ///
    /// The same field may be registered more than once (e.g. a type
    /// deriving in several test binaries) as long as the source is identical.
    pub fn try_build<'a, I>(specs: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = &'a PatternSpec>,
    {
        let mut sources: HashMap<(&'static str, &'static str), &'static str> = HashMap::new();
        let mut compiled: HashMap<&'static str, HashMap<&'static str, Regex>> = HashMap::new();

        for spec in specs {
            let key = (spec.type_name, spec.field);
            if let Some(existing) = sources.get(&key) {
                if *existing != spec.source {
                    return Err(PatternError::Conflict {
                        type_name: spec.type_name,
                        field: spec.field,
                        first: *existing,
                        second: spec.source,
                    });
                }
                continue;
            }

            let regex = Regex::new(spec.source).map_err(|e| PatternError::Invalid {
                type_name: spec.type_name,
                field: spec.field,
                error: e.to_string(),
            })?;
            sources.insert(key, spec.source);
            compiled
                .entry(spec.type_name)
                .or_default()
                .insert(spec.field, regex);
        }

        Ok(Self { compiled })
    }

    pub fn get(&self, type_name: &str, field: &str) -> Option<&Regex> {
        self.compiled.get(type_name)?.get(field)
    }

    /// Look up the pattern for a field that is known to carry one.
    ///
    /// # Panics
    ///
    /// If no pattern was registered for `type_name.field`. Generated
    /// validators only ask for fields they registered, so reaching this is a
    /// mismatch between a hand-written validator and its registrations.
    pub fn regex(&self, type_name: &str, field: &str) -> &Regex {
        match self.get(type_name, field) {
            Some(regex) => regex,
            None => panic!("no pattern registered for {}.{}", type_name, field),
        }
    }

    /// Number of fields carrying a pattern.
    pub fn len(&self) -> usize {
        self.compiled.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOKIE: &str = "^:?[0-9a-zA-Z!#$%&'*+-.^_|~`]+$";

    #[test]
    fn test_build_and_lookup() {
        let specs = [
            PatternSpec::new("CookieNames", "BearerToken", COOKIE),
            PatternSpec::new("CookieNames", "OauthHmac", COOKIE),
        ];
        let cache = PatternCache::try_build(specs.iter()).unwrap();

        assert_eq!(cache.len(), 2);
        let regex = cache.regex("CookieNames", "BearerToken");
        assert_eq!(regex.as_str(), COOKIE);
        assert!(regex.is_match(":BearerToken"));
        assert!(!regex.is_match("tok en"));
        assert!(cache.get("CookieNames", "OauthExpires").is_none());
    }

    #[test]
    fn test_duplicate_identical_registration_is_accepted() {
        let specs = [
            PatternSpec::new("CookieNames", "BearerToken", COOKIE),
            PatternSpec::new("CookieNames", "BearerToken", COOKIE),
        ];
        let cache = PatternCache::try_build(specs.iter()).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_conflicting_registration_is_rejected() {
        let specs = [
            PatternSpec::new("CookieNames", "BearerToken", COOKIE),
            PatternSpec::new("CookieNames", "BearerToken", "^[a-z]+$"),
        ];
        let err = PatternCache::try_build(specs.iter()).unwrap_err();
        assert!(matches!(err, PatternError::Conflict { .. }));
        assert!(err.to_string().contains("CookieNames.BearerToken"));
    }

    #[test]
    fn test_malformed_pattern_is_rejected() {
        let specs = [PatternSpec::new("Broken", "Field", "([a-z")];
        let err = PatternCache::try_build(specs.iter()).unwrap_err();
        assert!(err.to_string().starts_with("invalid pattern for Broken.Field"));
    }

    #[test]
    fn test_global_cache_is_built_once() {
        let first = PatternCache::global() as *const PatternCache as usize;
        assert_eq!(PatternCache::global() as *const PatternCache as usize, first);

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| PatternCache::global() as *const PatternCache as usize))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), first);
            }
        });
    }

    #[test]
    #[should_panic(expected = "no pattern registered for Missing.Field")]
    fn test_unregistered_lookup_panics() {
        let cache = PatternCache::try_build(std::iter::empty()).unwrap();
        cache.regex("Missing", "Field");
    }
}
