use async_graphql_parser::types as ast;
use stitching_directives::{ENTITIES_FIELD, ENTITY_UNION};

use crate::resolvers::{typename_of, ResolverMap};

const REPRESENTATIONS_ARGUMENT: &str = "representations";

/// The name of the query root type, if it declares the entity resolution field.
pub(crate) fn query_type_with_entities(document: &ast::ServiceDocument) -> Option<String> {
    let query_type = document
        .definitions
        .iter()
        .find_map(|definition| match definition {
            ast::TypeSystemDefinition::Schema(schema) => schema.node.query.as_ref().map(|name| name.node.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| "Query".to_string());

    let has_entities = document.definitions.iter().any(|definition| match definition {
        ast::TypeSystemDefinition::Type(ty) if ty.node.name.node.as_str() == query_type => match &ty.node.kind {
            ast::TypeKind::Object(object) => object
                .fields
                .iter()
                .any(|field| field.node.name.node.as_str() == ENTITIES_FIELD),
            _ => false,
        },
        _ => false,
    });

    has_entities.then_some(query_type)
}

/// Resolves entities to their own representations: the gateway sends `__typename` and the key
/// fields, and every other field is computed from them by the entity type's resolvers.
pub(crate) fn entity_resolvers(query_type: &str) -> ResolverMap {
    ResolverMap::new()
        .with_sync_resolver(query_type, ENTITIES_FIELD, |ctx| {
            let representations = ctx.args.try_get(REPRESENTATIONS_ARGUMENT)?;
            Ok(Some(representations.as_value().clone()))
        })
        .with_type_resolver(ENTITY_UNION, typename_of)
}
