use super::{
    Collector, CollectorConfig, CollectorContext, CollectorError, CollectorResolver, Predicate,
};
use crate::ast::{ClassLikeType, TokenReference};
use regex::Regex;
use std::sync::Arc;

/// Class-like names matching `value`, case-insensitively.
///
/// Restricted to one [`ClassLikeType`], only class-likes declared in the
/// analysed code can match, since the kind of an external name is unknown.
pub struct ClassLikeCollector {
    kind: Option<ClassLikeType>,
}

impl ClassLikeCollector {
    pub fn any() -> Self {
        Self { kind: None }
    }

    pub fn of(kind: ClassLikeType) -> Self {
        Self { kind: Some(kind) }
    }
}

impl Collector for ClassLikeCollector {
    fn prepare(
        &self,
        config: &CollectorConfig,
        _resolver: &CollectorResolver,
    ) -> Result<Arc<dyn Predicate>, CollectorError> {
        Ok(Arc::new(ClassLikeName {
            kind: self.kind,
            pattern: config.regex("value", true)?,
        }))
    }
}

/// Class-like names matching `value` exactly as written, case included.
pub struct ClassNameRegexCollector;

impl Collector for ClassNameRegexCollector {
    fn prepare(
        &self,
        config: &CollectorConfig,
        _resolver: &CollectorResolver,
    ) -> Result<Arc<dyn Predicate>, CollectorError> {
        Ok(Arc::new(ClassLikeName {
            kind: None,
            pattern: config.regex("value", false)?,
        }))
    }
}

struct ClassLikeName {
    kind: Option<ClassLikeType>,
    pattern: Regex,
}

impl Predicate for ClassLikeName {
    fn satisfy(
        &self,
        reference: &TokenReference<'_>,
        _ctx: &CollectorContext<'_>,
    ) -> Result<bool, CollectorError> {
        let matched = match (self.kind, reference) {
            (None, _) => reference
                .class_like_token()
                .is_some_and(|token| self.pattern.is_match(token.as_str())),
            (Some(kind), TokenReference::ClassLike(class)) => {
                class.kind == kind && self.pattern.is_match(class.token.as_str())
            }
            (Some(_), _) => false,
        };
        Ok(matched)
    }
}
