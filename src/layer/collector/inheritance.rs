use super::{
    Collector, CollectorConfig, CollectorContext, CollectorError, CollectorResolver, Predicate,
};
use crate::ast::{InheritType, TokenReference};
use std::sync::Arc;

/// Class-likes that have the class-like named by `value` somewhere in
/// their hierarchy, optionally reached through one kind of inherit.
pub struct InheritanceCollector {
    kind: Option<InheritType>,
}

impl InheritanceCollector {
    pub fn any() -> Self {
        Self { kind: None }
    }

    pub fn of(kind: InheritType) -> Self {
        Self { kind: Some(kind) }
    }
}

impl Collector for InheritanceCollector {
    fn prepare(
        &self,
        config: &CollectorConfig,
        _resolver: &CollectorResolver,
    ) -> Result<Arc<dyn Predicate>, CollectorError> {
        Ok(Arc::new(Inherits {
            kind: self.kind,
            target: config.require_str("value")?.to_string(),
        }))
    }
}

struct Inherits {
    kind: Option<InheritType>,
    target: String,
}

impl Predicate for Inherits {
    fn satisfy(
        &self,
        reference: &TokenReference<'_>,
        ctx: &CollectorContext<'_>,
    ) -> Result<bool, CollectorError> {
        let Some(token) = reference.class_like_token() else {
            return Ok(false);
        };

        Ok(ctx.ast_map.class_inherits(token).iter().any(|inherit| {
            inherit.class_like.as_str() == self.target
                && self.kind.is_none_or(|kind| inherit.kind == kind)
        }))
    }
}
