use super::{
    Collector, CollectorConfig, CollectorContext, CollectorError, CollectorResolver, Predicate,
};
use crate::ast::{Token, TokenReference};
use std::collections::HashSet;
use std::sync::Arc;

/// Superglobals named in `value`. A leading `$` in a name is ignored.
pub struct SuperGlobalCollector;

impl Collector for SuperGlobalCollector {
    fn prepare(
        &self,
        config: &CollectorConfig,
        _resolver: &CollectorResolver,
    ) -> Result<Arc<dyn Predicate>, CollectorError> {
        let names = config
            .str_list("value")?
            .into_iter()
            .map(|name| name.trim_start_matches('$').to_string())
            .collect();
        Ok(Arc::new(SuperGlobalNames(names)))
    }
}

struct SuperGlobalNames(HashSet<String>);

impl Predicate for SuperGlobalNames {
    fn satisfy(
        &self,
        reference: &TokenReference<'_>,
        _ctx: &CollectorContext<'_>,
    ) -> Result<bool, CollectorError> {
        let token = match reference {
            TokenReference::Variable(variable) => &variable.token,
            TokenReference::Unresolved(Token::SuperGlobal(token)) => token,
            _ => return Ok(false),
        };
        Ok(self.0.contains(token.as_str()))
    }
}
