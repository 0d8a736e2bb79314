use super::{
    Collector, CollectorConfig, CollectorContext, CollectorError, CollectorResolver, Predicate,
};
use crate::ast::TokenReference;
use regex::Regex;
use std::sync::Arc;

/// Function names matching the `value` regex, case-insensitively.
pub struct FunctionNameCollector;

impl Collector for FunctionNameCollector {
    fn prepare(
        &self,
        config: &CollectorConfig,
        _resolver: &CollectorResolver,
    ) -> Result<Arc<dyn Predicate>, CollectorError> {
        Ok(Arc::new(FunctionName(config.regex("value", true)?)))
    }
}

struct FunctionName(Regex);

impl Predicate for FunctionName {
    fn satisfy(
        &self,
        reference: &TokenReference<'_>,
        _ctx: &CollectorContext<'_>,
    ) -> Result<bool, CollectorError> {
        Ok(reference
            .function_like_token()
            .is_some_and(|token| self.0.is_match(token.as_str())))
    }
}
