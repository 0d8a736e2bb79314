use super::{
    Collectable, Collector, CollectorConfig, CollectorContext, CollectorError, CollectorResolver,
    Predicate,
};
use crate::ast::TokenReference;
use std::sync::Arc;

/// Combines nested definitions: every `must` entry has to match and no
/// `must_not` entry may.
pub struct BoolCollector;

impl BoolCollector {
    fn nested(
        definitions: &[CollectorConfig],
        resolver: &CollectorResolver,
    ) -> Result<Vec<Collectable>, CollectorError> {
        definitions
            .iter()
            .map(|definition| {
                let collectable = resolver.resolve(definition)?;
                collectable.validate(resolver)?;
                Ok(collectable)
            })
            .collect()
    }
}

impl Collector for BoolCollector {
    fn prepare(
        &self,
        config: &CollectorConfig,
        resolver: &CollectorResolver,
    ) -> Result<Arc<dyn Predicate>, CollectorError> {
        let must = config.list("must")?;
        let must_not = config.list("must_not")?;
        if must.is_empty() && must_not.is_empty() {
            return Err(CollectorError::MissingOption {
                kind: "bool".to_string(),
                key: "must".to_string(),
            });
        }

        Ok(Arc::new(Combined {
            must: Self::nested(&must, resolver)?,
            must_not: Self::nested(&must_not, resolver)?,
        }))
    }
}

struct Combined {
    must: Vec<Collectable>,
    must_not: Vec<Collectable>,
}

impl Predicate for Combined {
    fn satisfy(
        &self,
        reference: &TokenReference<'_>,
        ctx: &CollectorContext<'_>,
    ) -> Result<bool, CollectorError> {
        for collectable in &self.must {
            if !collectable.satisfy(reference, ctx)? {
                return Ok(false);
            }
        }

        for collectable in &self.must_not {
            if collectable.satisfy(reference, ctx)? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::satisfies;
    use super::*;
    use crate::ast::{AstMap, ClassLikeType, FileReferenceBuilder, Token};

    fn map() -> AstMap {
        AstMap::new(vec![
            FileReferenceBuilder::new("src/Controller/Admin.php")
                .class_like("App\\Controller\\AdminController", ClassLikeType::Class, 3)
                .class_like("App\\Controller\\PublicController", ClassLikeType::Class, 9)
                .build(),
        ])
    }

    const RULE: &str = r#"
        type = "bool"
        must = [{ type = "directory", value = "src/Controller/" }]
        must_not = [{ type = "classLike", value = "Admin" }]
    "#;

    #[test]
    fn test_must_and_must_not() {
        let map = map();

        let public = Token::class_like("App\\Controller\\PublicController");
        let admin = Token::class_like("App\\Controller\\AdminController");

        assert!(satisfies(RULE, &map, &public).unwrap());
        assert!(!satisfies(RULE, &map, &admin).unwrap());
    }

    #[test]
    fn test_nested_bool() {
        let map = map();
        let rule = r#"
            type = "bool"
            must_not = [{ type = "bool", must = [{ type = "classLike", value = "Public" }] }]
        "#;

        let public = Token::class_like("App\\Controller\\PublicController");
        let admin = Token::class_like("App\\Controller\\AdminController");

        assert!(satisfies(rule, &map, &admin).unwrap());
        assert!(!satisfies(rule, &map, &public).unwrap());
    }

    #[test]
    fn test_empty_bool_is_rejected() {
        let err = satisfies("type = \"bool\"", &map(), &Token::class_like("A")).unwrap_err();
        assert!(matches!(err, CollectorError::MissingOption { .. }));
    }

    #[test]
    fn test_nested_unknown_type_is_rejected() {
        let rule = "type = \"bool\"\nmust = [{ type = \"layer\", value = \"Domain\" }]";
        let err = satisfies(rule, &map(), &Token::class_like("A")).unwrap_err();
        assert!(matches!(err, CollectorError::UnsupportedType { .. }));
    }
}
