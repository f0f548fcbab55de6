use std::{fmt, sync::Arc};

use async_graphql::{dynamic::DynamicRequest, extensions::ExtensionFactory, Value};
use async_graphql_parser::parse_schema;
use futures::stream::BoxStream;
use stitching_directives::{federation_to_stitching_sdl, StitchingDirectives};

use crate::{entities, registry::Registry, resolvers::ResolverMap, Result};

/// Name of the query field returning the full stitched SDL of the service.
pub const SDL_FIELD: &str = "_sdl";

const SDL_FIELD_EXTENSION: &str = "extend type Query {\n    _sdl: String!\n}\n";

#[derive(Clone, Default)]
pub struct BuildOptions {
    /// Names of the stitching directives in the output SDL.
    pub directives: StitchingDirectives,
    /// Engine extensions installed on every built schema.
    pub plugins: Vec<Arc<dyn ExtensionFactory>>,
}

impl fmt::Debug for BuildOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildOptions")
            .field("directives", &self.directives)
            .field("plugins", &self.plugins.len())
            .finish()
    }
}

/// A schema ready to execute operations, along with the stitched SDL it was built from.
///
/// Cloning is cheap, every clone shares the same engine schema.
#[derive(Clone)]
pub struct ExecutableSchema {
    schema: async_graphql::dynamic::Schema,
    sdl: Arc<str>,
    has_entities: bool,
}

impl ExecutableSchema {
    /// The stitched SDL, as returned by the `_sdl` field.
    pub fn sdl(&self) -> &str {
        &self.sdl
    }

    /// Whether `_entities` and `_Entity` resolution were installed.
    pub fn has_entities(&self) -> bool {
        self.has_entities
    }

    pub fn schema(&self) -> &async_graphql::dynamic::Schema {
        &self.schema
    }

    pub async fn execute(&self, request: impl Into<DynamicRequest>) -> async_graphql::Response {
        self.schema.execute(request).await
    }

    pub fn execute_stream(&self, request: impl Into<DynamicRequest> + 'static) -> BoxStream<'static, async_graphql::Response> {
        Box::pin(self.schema.execute_stream(request))
    }
}

impl fmt::Debug for ExecutableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableSchema")
            .field("has_entities", &self.has_entities)
            .finish_non_exhaustive()
    }
}

/// Builds an executable schema from federation type definitions.
///
/// The type definitions are rewritten with [`federation_to_stitching_sdl`] and extended with
/// `Query._sdl`. When the result declares `_entities` on the query type, entities resolve to
/// their representations and `_Entity` values are typed by their `__typename`. The resolvers
/// installed for these synthetic fields take precedence over `resolvers`.
///
/// ```
/// use graphql_microservice::{build_executable_schema, BuildOptions, ResolverMap};
///
/// # #[tokio::main]
/// # async fn main() {
/// let schema = build_executable_schema(
///     "type Query { foo: String }",
///     &ResolverMap::new().with_value("Query", "foo", "bar"),
///     &BuildOptions::default(),
/// )
/// .unwrap();
///
/// let response = schema.execute("{ foo }").await;
/// assert_eq!(response.data, async_graphql::value!({ "foo": "bar" }));
/// # }
/// ```
pub fn build_executable_schema(type_defs: &str, resolvers: &ResolverMap, options: &BuildOptions) -> Result<ExecutableSchema> {
    let stitched = federation_to_stitching_sdl(type_defs, &options.directives)?;
    let sdl = format!("{stitched}\n{SDL_FIELD_EXTENSION}");

    let document = parse_schema(&sdl)?;
    let entities_query_type = entities::query_type_with_entities(&document);

    let mut resolvers = resolvers
        .clone()
        .merge(ResolverMap::new().with_value("Query", SDL_FIELD, Value::String(sdl.clone())));

    if let Some(query_type) = &entities_query_type {
        resolvers = resolvers.merge(entities::entity_resolvers(query_type));
    }

    let registry = Registry::from_document(document)?;
    registry.validate(&resolvers)?;
    let schema = registry.build(&resolvers, &options.plugins)?;

    tracing::debug!(has_entities = entities_query_type.is_some(), "built executable schema");

    Ok(ExecutableSchema {
        schema,
        sdl: sdl.into(),
        has_entities: entities_query_type.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use async_graphql::value;
    use indoc::indoc;

    use super::*;
    use crate::Error;

    const PRODUCTS: &str = indoc! {r#"
        type Product @key(fields: "upc") {
            upc: String!
            name: String
        }

        type Query {
            topProducts: [Product]
        }
    "#};

    #[tokio::test]
    async fn sdl_field_returns_the_stitched_sdl() {
        let schema = build_executable_schema(PRODUCTS, &ResolverMap::new(), &BuildOptions::default()).unwrap();

        let response = schema.execute("{ _sdl }").await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(response.data, value!({ "_sdl": schema.sdl() }));
        assert!(schema.sdl().ends_with("extend type Query {\n    _sdl: String!\n}\n"));
        assert!(parse_schema(schema.sdl()).is_ok());
    }

    #[tokio::test]
    async fn entities_resolve_to_their_representations() {
        let resolvers = ResolverMap::new().with_sync_resolver("Product", "name", |ctx| {
            let Some(Value::String(upc)) = crate::output::parent_property(ctx.parent_value, "upc") else {
                return Ok(None);
            };
            Ok(Some(Value::String(format!("product {upc}"))))
        });
        let schema = build_executable_schema(PRODUCTS, &resolvers, &BuildOptions::default()).unwrap();
        assert!(schema.has_entities());

        let request = async_graphql::Request::new(indoc! {r#"
            query($representations: [_Any!]!) {
                _entities(representations: $representations) {
                    __typename
                    ... on Product { upc name }
                }
            }
        "#})
        .variables(async_graphql::Variables::from_value(value!({
            "representations": [
                { "__typename": "Product", "upc": "1" },
                { "__typename": "Product", "upc": "2" }
            ]
        })));

        let response = schema.execute(request).await;

        assert!(response.errors.is_empty(), "{:?}", response.errors);
        assert_eq!(
            response.data,
            value!({
                "_entities": [
                    { "__typename": "Product", "upc": "1", "name": "product 1" },
                    { "__typename": "Product", "upc": "2", "name": "product 2" }
                ]
            })
        );
    }

    #[test]
    fn no_entities_without_keys() {
        let schema = build_executable_schema("type Query { a: Int }", &ResolverMap::new(), &BuildOptions::default()).unwrap();

        assert!(!schema.has_entities());
        assert!(!schema.sdl().contains("_entities"));
    }

    #[test]
    fn resolvers_for_undeclared_fields_are_rejected() {
        let error = build_executable_schema(
            "type Query { a: Int }",
            &ResolverMap::new().with_value("Query", "b", 1),
            &BuildOptions::default(),
        )
        .unwrap_err();

        assert_eq!(error.to_string(), "Query.b defined in resolvers, but not in schema");
    }

    #[test]
    fn key_on_a_field_is_rejected() {
        let error = build_executable_schema(
            "type Query { foo: String @key }",
            &ResolverMap::new().with_value("Query", "foo", "bar"),
            &BuildOptions::default(),
        )
        .unwrap_err();

        assert_eq!(error.to_string(), "directive `@key` is not allowed on `Query.foo`");
    }

    #[test]
    fn stitching_errors_are_propagated() {
        let error = build_executable_schema("type Query {", &ResolverMap::new(), &BuildOptions::default()).unwrap_err();

        assert!(matches!(error, Error::Stitching(_)), "{error}");
    }
}
