//! Turns a parsed SDL document into an `async_graphql` dynamic schema.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_graphql::{
    dynamic::{
        Enum, EnumItem, Field, FieldFuture, InputObject, InputValue, Interface, InterfaceField, Object, Scalar, Schema,
        Subscription, SubscriptionField, SubscriptionFieldFuture, TypeRef, Union,
    },
    extensions::ExtensionFactory,
    Value,
};
use async_graphql_parser::{parse_schema, types as ast, Positioned};
use futures::StreamExt as _;
use indexmap::IndexMap;

use crate::{
    output::{parent_property, OutputShape},
    resolvers::{FieldResolver, ResolverMap},
    Error, Result,
};

const BUILTIN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];
const BUILTIN_DIRECTIVES: &str = r#"
    directive @deprecated(reason: String = "No longer supported") on FIELD_DEFINITION | ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION | ENUM_VALUE
    directive @specifiedBy(url: String!) on SCALAR
    directive @oneOf on INPUT_OBJECT
    directive @skip(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
    directive @include(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
"#;
const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

pub(crate) struct Registry {
    types: IndexMap<String, ast::TypeDefinition>,
    directives: HashMap<String, ast::DirectiveDefinition>,
    query: String,
    mutation: Option<String>,
    subscription: Option<String>,
}

impl Registry {
    /// Collects the type definitions of the document, folding extensions into their base types.
    pub(crate) fn from_document(document: ast::ServiceDocument) -> Result<Self> {
        let mut types: IndexMap<String, ast::TypeDefinition> = IndexMap::new();
        let mut extensions = Vec::new();
        let mut directives = HashMap::new();

        for definition in parse_schema(BUILTIN_DIRECTIVES)?.definitions {
            if let ast::TypeSystemDefinition::Directive(directive) = definition {
                directives.insert(directive.node.name.node.to_string(), directive.node);
            }
        }

        let mut query = None;
        let mut mutation = None;
        let mut subscription = None;

        for definition in document.definitions {
            match definition {
                ast::TypeSystemDefinition::Schema(schema) => {
                    let schema = schema.node;
                    query = schema.query.map(|name| name.node.to_string()).or(query);
                    mutation = schema.mutation.map(|name| name.node.to_string()).or(mutation);
                    subscription = schema.subscription.map(|name| name.node.to_string()).or(subscription);
                }
                ast::TypeSystemDefinition::Directive(directive) => {
                    directives.insert(directive.node.name.node.to_string(), directive.node);
                }
                ast::TypeSystemDefinition::Type(ty) if ty.node.extend => extensions.push(ty.node),
                ast::TypeSystemDefinition::Type(ty) => {
                    let name = ty.node.name.node.to_string();

                    if types.contains_key(&name) {
                        return Err(Error::DuplicateType(name));
                    }

                    types.insert(name, ty.node);
                }
            }
        }

        for extension in extensions {
            let name = extension.name.node.to_string();
            let Some(base) = types.get_mut(&name) else {
                return Err(Error::ExtensionWithoutBase(name));
            };

            fold_extension(base, extension)?;
        }

        let mutation = mutation.or_else(|| types.contains_key("Mutation").then(|| "Mutation".to_string()));
        let subscription = subscription.or_else(|| types.contains_key("Subscription").then(|| "Subscription".to_string()));

        Ok(Registry {
            types,
            directives,
            query: query.unwrap_or_else(|| "Query".to_string()),
            mutation,
            subscription,
        })
    }

    /// Checks what the engine would otherwise accept silently or report without context.
    pub(crate) fn validate(&self, resolvers: &ResolverMap) -> Result<()> {
        match self.types.get(&self.query).map(|ty| &ty.kind) {
            Some(ast::TypeKind::Object(_)) => (),
            _ => return Err(Error::MissingQueryType(self.query.clone())),
        }

        for (type_name, definition) in &self.types {
            let kind = match &definition.kind {
                ast::TypeKind::Scalar => ast::DirectiveLocation::Scalar,
                ast::TypeKind::Object(_) => ast::DirectiveLocation::Object,
                ast::TypeKind::Interface(_) => ast::DirectiveLocation::Interface,
                ast::TypeKind::Union(_) => ast::DirectiveLocation::Union,
                ast::TypeKind::Enum(_) => ast::DirectiveLocation::Enum,
                ast::TypeKind::InputObject(_) => ast::DirectiveLocation::InputObject,
            };
            self.validate_directives(&definition.directives, kind, type_name)?;

            match &definition.kind {
                ast::TypeKind::Scalar => (),
                ast::TypeKind::Object(ast::ObjectType { implements, fields })
                | ast::TypeKind::Interface(ast::InterfaceType { implements, fields }) => {
                    for interface in implements {
                        self.validate_type_name(interface.node.as_str(), type_name)?;
                    }

                    for field in fields {
                        let location = format!("{type_name}.{}", field.node.name.node);
                        self.validate_type_name(base_type_name(&field.node.ty.node), &location)?;
                        self.validate_directives(
                            &field.node.directives,
                            ast::DirectiveLocation::FieldDefinition,
                            &location,
                        )?;

                        for argument in &field.node.arguments {
                            let location = format!("{location}({}:)", argument.node.name.node);
                            self.validate_type_name(base_type_name(&argument.node.ty.node), &location)?;
                            self.validate_directives(
                                &argument.node.directives,
                                ast::DirectiveLocation::ArgumentDefinition,
                                &location,
                            )?;
                        }
                    }
                }
                ast::TypeKind::Union(union) => {
                    for member in &union.members {
                        self.validate_type_name(member.node.as_str(), type_name)?;
                    }
                }
                ast::TypeKind::Enum(enum_type) => {
                    for value in &enum_type.values {
                        let location = format!("{type_name}.{}", value.node.value.node);
                        self.validate_directives(&value.node.directives, ast::DirectiveLocation::EnumValue, &location)?;
                    }
                }
                ast::TypeKind::InputObject(input_object) => {
                    for field in &input_object.fields {
                        let location = format!("{type_name}.{}", field.node.name.node);
                        self.validate_type_name(base_type_name(&field.node.ty.node), &location)?;
                        self.validate_directives(
                            &field.node.directives,
                            ast::DirectiveLocation::InputFieldDefinition,
                            &location,
                        )?;
                    }
                }
            }
        }

        for (type_name, field_name) in resolvers.field_targets().chain(resolvers.subscription_targets()) {
            if self.output_field(type_name, field_name).is_none() {
                return Err(Error::MissingResolverTarget(format!("{type_name}.{field_name}")));
            }
        }

        for type_name in resolvers.type_resolver_targets() {
            match self.types.get(type_name).map(|ty| &ty.kind) {
                Some(ast::TypeKind::Union(_) | ast::TypeKind::Interface(_)) => (),
                _ => return Err(Error::MissingResolverTarget(type_name.to_string())),
            }
        }

        Ok(())
    }

    pub(crate) fn build(self, resolvers: &ResolverMap, plugins: &[Arc<dyn ExtensionFactory>]) -> Result<Schema> {
        let mut builder = Schema::build(&self.query, self.mutation.as_deref(), self.subscription.as_deref());

        for (type_name, definition) in &self.types {
            let description = definition.description.as_ref().map(|description| description.node.clone());

            match &definition.kind {
                ast::TypeKind::Scalar => {
                    if BUILTIN_SCALARS.contains(&type_name.as_str()) {
                        continue;
                    }

                    let mut scalar = Scalar::new(type_name);

                    if let Some(description) = description {
                        scalar = scalar.description(description);
                    }

                    if let Some(url) = string_argument(&definition.directives, "specifiedBy", "url") {
                        scalar = scalar.specified_by_url(url);
                    }

                    builder = builder.register(scalar);
                }
                ast::TypeKind::Object(object_type) if Some(type_name) == self.subscription.as_ref() => {
                    let mut subscription = Subscription::new(type_name);

                    if let Some(description) = description {
                        subscription = subscription.description(description);
                    }

                    for field in &object_type.fields {
                        subscription = subscription.field(self.subscription_field(type_name, &field.node, resolvers));
                    }

                    builder = builder.register(subscription);
                }
                ast::TypeKind::Object(object_type) => {
                    let mut object = Object::new(type_name);

                    if let Some(description) = description {
                        object = object.description(description);
                    }

                    for interface in &object_type.implements {
                        object = object.implement(interface.node.as_str());
                    }

                    for field in &object_type.fields {
                        object = object.field(self.field(type_name, &field.node, resolvers));
                    }

                    builder = builder.register(object);
                }
                ast::TypeKind::Interface(interface_type) => {
                    let mut interface = Interface::new(type_name);

                    if let Some(description) = description {
                        interface = interface.description(description);
                    }

                    for field in &interface_type.fields {
                        interface = interface.field(interface_field(&field.node));
                    }

                    builder = builder.register(interface);
                }
                ast::TypeKind::Union(union_type) => {
                    let mut union = Union::new(type_name);

                    if let Some(description) = description {
                        union = union.description(description);
                    }

                    for member in &union_type.members {
                        union = union.possible_type(member.node.as_str());
                    }

                    builder = builder.register(union);
                }
                ast::TypeKind::Enum(enum_type) => {
                    let mut enumeration = Enum::new(type_name);

                    if let Some(description) = description {
                        enumeration = enumeration.description(description);
                    }

                    for value in &enum_type.values {
                        let mut item = EnumItem::new(value.node.value.node.as_str());

                        if let Some(description) = &value.node.description {
                            item = item.description(description.node.as_str());
                        }

                        if let Some(reason) = deprecation(&value.node.directives) {
                            item = item.deprecation(Some(reason.as_str()));
                        }

                        enumeration = enumeration.item(item);
                    }

                    builder = builder.register(enumeration);
                }
                ast::TypeKind::InputObject(input_object_type) => {
                    let mut input_object = InputObject::new(type_name);

                    if let Some(description) = description {
                        input_object = input_object.description(description);
                    }

                    if has_directive(&definition.directives, "oneOf") {
                        input_object = input_object.oneof();
                    }

                    for field in &input_object_type.fields {
                        input_object = input_object.field(input_value(&field.node));
                    }

                    builder = builder.register(input_object);
                }
            }
        }

        for plugin in plugins {
            builder = builder.extension(SharedExtension(plugin.clone()));
        }

        builder.finish().map_err(|error| Error::InvalidSchema(error.to_string()))
    }

    fn field(&self, type_name: &str, definition: &ast::FieldDefinition, resolvers: &ResolverMap) -> Field {
        let field_name = definition.name.node.to_string();
        let shape = Arc::new(self.output_shape(&definition.ty.node, resolvers));
        let resolver = resolvers.field(type_name, &field_name).cloned();

        let mut field = Field::new(field_name.clone(), type_ref(&definition.ty.node), move |ctx| {
            let shape = shape.clone();
            let resolver = resolver.clone();
            let field_name = field_name.clone();

            FieldFuture::new(async move {
                let value = match resolver {
                    Some(FieldResolver::Value(value)) => Some(value),
                    Some(FieldResolver::Function(resolver)) => resolver(ctx).await?,
                    None => parent_property(ctx.parent_value, &field_name),
                };

                value.map(|value| shape.field_value(value)).transpose()
            })
        });

        if let Some(description) = &definition.description {
            field = field.description(description.node.as_str());
        }

        if let Some(reason) = deprecation(&definition.directives) {
            field = field.deprecation(Some(reason.as_str()));
        }

        for argument in &definition.arguments {
            field = field.argument(input_value(&argument.node));
        }

        field
    }

    fn subscription_field(
        &self,
        type_name: &str,
        definition: &ast::FieldDefinition,
        resolvers: &ResolverMap,
    ) -> SubscriptionField {
        let field_name = definition.name.node.to_string();
        let shape = Arc::new(self.output_shape(&definition.ty.node, resolvers));
        let resolver = resolvers.subscription(type_name, &field_name).cloned();
        let location = format!("{type_name}.{field_name}");

        let mut field = SubscriptionField::new(field_name, type_ref(&definition.ty.node), move |ctx| {
            let shape = shape.clone();
            let resolver = resolver.clone();
            let location = location.clone();

            SubscriptionFieldFuture::new(async move {
                let Some(resolver) = resolver else {
                    return Err(async_graphql::Error::new(format!(
                        "no subscription resolver registered for `{location}`"
                    )));
                };

                let events = resolver(&ctx)?;

                Ok(events.map(move |event| event.and_then(|value| shape.field_value(value))))
            })
        });

        if let Some(description) = &definition.description {
            field = field.description(description.node.as_str());
        }

        if let Some(reason) = deprecation(&definition.directives) {
            field = field.deprecation(Some(reason.as_str()));
        }

        for argument in &definition.arguments {
            field = field.argument(input_value(&argument.node));
        }

        field
    }

    fn output_shape(&self, ty: &ast::Type, resolvers: &ResolverMap) -> OutputShape {
        match &ty.base {
            ast::BaseType::List(inner) => OutputShape::List(Box::new(self.output_shape(inner, resolvers))),
            ast::BaseType::Named(name) => match self.types.get(name.as_str()).map(|ty| &ty.kind) {
                Some(ast::TypeKind::Union(_) | ast::TypeKind::Interface(_)) => OutputShape::Abstract {
                    type_name: name.to_string(),
                    resolver: resolvers.type_resolver(name.as_str()).cloned(),
                },
                _ => OutputShape::Plain,
            },
        }
    }

    fn output_field(&self, type_name: &str, field_name: &str) -> Option<&ast::FieldDefinition> {
        let fields = match &self.types.get(type_name)?.kind {
            ast::TypeKind::Object(object) => &object.fields,
            ast::TypeKind::Interface(interface) => &interface.fields,
            _ => return None,
        };

        fields
            .iter()
            .map(|field| &field.node)
            .find(|field| field.name.node.as_str() == field_name)
    }

    fn validate_type_name(&self, name: &str, location: &str) -> Result<()> {
        if BUILTIN_SCALARS.contains(&name) || self.types.contains_key(name) {
            return Ok(());
        }

        Err(Error::UnknownType {
            name: name.to_string(),
            location: location.to_string(),
        })
    }

    /// Checks applied directives against their definitions: location, repetition and arguments.
    fn validate_directives(
        &self,
        directives: &[Positioned<ast::ConstDirective>],
        kind: ast::DirectiveLocation,
        location: &str,
    ) -> Result<()> {
        let mut applied = HashSet::new();

        for directive in directives {
            let directive = &directive.node;
            let name = directive.name.node.as_str();

            let Some(definition) = self.directives.get(name) else {
                return Err(Error::UnknownDirective {
                    name: name.to_string(),
                    location: location.to_string(),
                });
            };

            if !definition.locations.iter().any(|allowed| allowed.node == kind) {
                return Err(Error::MisplacedDirective {
                    name: name.to_string(),
                    location: location.to_string(),
                });
            }

            if !applied.insert(name) && !definition.is_repeatable {
                return Err(Error::RepeatedDirective {
                    name: name.to_string(),
                    location: location.to_string(),
                });
            }

            for (argument, _) in &directive.arguments {
                if !definition
                    .arguments
                    .iter()
                    .any(|declared| declared.node.name.node == argument.node)
                {
                    return Err(Error::UnknownDirectiveArgument {
                        name: name.to_string(),
                        argument: argument.node.to_string(),
                        location: location.to_string(),
                    });
                }
            }

            for declared in &definition.arguments {
                let declared = &declared.node;
                let required = !declared.ty.node.nullable && declared.default_value.is_none();

                if required && !directive.arguments.iter().any(|(argument, _)| argument.node == declared.name.node) {
                    return Err(Error::MissingDirectiveArgument {
                        name: name.to_string(),
                        argument: declared.name.node.to_string(),
                        location: location.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

fn fold_extension(base: &mut ast::TypeDefinition, extension: ast::TypeDefinition) -> Result<()> {
    base.directives.extend(extension.directives);

    match (&mut base.kind, extension.kind) {
        (ast::TypeKind::Scalar, ast::TypeKind::Scalar) => (),
        (ast::TypeKind::Object(base), ast::TypeKind::Object(extension)) => {
            base.implements.extend(extension.implements);
            base.fields.extend(extension.fields);
        }
        (ast::TypeKind::Interface(base), ast::TypeKind::Interface(extension)) => {
            base.implements.extend(extension.implements);
            base.fields.extend(extension.fields);
        }
        (ast::TypeKind::Union(base), ast::TypeKind::Union(extension)) => base.members.extend(extension.members),
        (ast::TypeKind::Enum(base), ast::TypeKind::Enum(extension)) => base.values.extend(extension.values),
        (ast::TypeKind::InputObject(base), ast::TypeKind::InputObject(extension)) => {
            base.fields.extend(extension.fields);
        }
        _ => {
            return Err(Error::InvalidSchema(format!(
                "`{}` is extended with a different kind of type",
                extension.name.node
            )))
        }
    }

    Ok(())
}

fn interface_field(definition: &ast::FieldDefinition) -> InterfaceField {
    let mut field = InterfaceField::new(definition.name.node.as_str(), type_ref(&definition.ty.node));

    if let Some(description) = &definition.description {
        field = field.description(description.node.as_str());
    }

    if let Some(reason) = deprecation(&definition.directives) {
        field = field.deprecation(Some(reason.as_str()));
    }

    for argument in &definition.arguments {
        field = field.argument(input_value(&argument.node));
    }

    field
}

fn input_value(definition: &ast::InputValueDefinition) -> InputValue {
    let mut input_value = InputValue::new(definition.name.node.as_str(), type_ref(&definition.ty.node));

    if let Some(description) = &definition.description {
        input_value = input_value.description(description.node.as_str());
    }

    if let Some(default_value) = &definition.default_value {
        input_value = input_value.default_value(default_value.node.clone());
    }

    input_value
}

fn type_ref(ty: &ast::Type) -> TypeRef {
    let base = match &ty.base {
        ast::BaseType::Named(name) => TypeRef::named(name.as_str()),
        ast::BaseType::List(inner) => TypeRef::List(Box::new(type_ref(inner))),
    };

    if ty.nullable {
        base
    } else {
        TypeRef::NonNull(Box::new(base))
    }
}

fn base_type_name(ty: &ast::Type) -> &str {
    match &ty.base {
        ast::BaseType::Named(name) => name.as_str(),
        ast::BaseType::List(inner) => base_type_name(inner),
    }
}

fn has_directive(directives: &[Positioned<ast::ConstDirective>], name: &str) -> bool {
    directives.iter().any(|directive| directive.node.name.node.as_str() == name)
}

fn string_argument(
    directives: &[Positioned<ast::ConstDirective>],
    directive_name: &str,
    argument_name: &str,
) -> Option<String> {
    let directive = directives
        .iter()
        .find(|directive| directive.node.name.node.as_str() == directive_name)?;

    directive
        .node
        .arguments
        .iter()
        .find(|(name, _)| name.node.as_str() == argument_name)
        .and_then(|(_, value)| match &value.node {
            Value::String(value) => Some(value.clone()),
            _ => None,
        })
}

fn deprecation(directives: &[Positioned<ast::ConstDirective>]) -> Option<String> {
    if !has_directive(directives, "deprecated") {
        return None;
    }

    Some(string_argument(directives, "deprecated", "reason").unwrap_or_else(|| DEFAULT_DEPRECATION_REASON.to_string()))
}

/// Lets one plugin instance be installed on every schema built from the same options.
struct SharedExtension(Arc<dyn ExtensionFactory>);

impl ExtensionFactory for SharedExtension {
    fn create(&self) -> Arc<dyn async_graphql::extensions::Extension> {
        self.0.create()
    }
}

#[cfg(test)]
mod tests {
    use async_graphql_parser::parse_schema;
    use indoc::indoc;

    use super::*;

    fn registry(sdl: &str) -> Result<Registry> {
        Registry::from_document(parse_schema(sdl).unwrap())
    }

    #[test]
    fn extensions_are_folded_into_their_base() {
        let registry = registry(indoc! {r#"
            type Query { a: Int }
            extend type Query { b: Int }
        "#})
        .unwrap();

        assert!(registry.output_field("Query", "a").is_some());
        assert!(registry.output_field("Query", "b").is_some());
    }

    #[test]
    fn extension_without_base() {
        let error = registry("extend type Query { a: Int }").err().unwrap();

        assert_eq!(error.to_string(), "type `Query` is extended but never defined");
    }

    #[test]
    fn duplicate_types() {
        let error = registry("type Query { a: Int } type Query { b: Int }").err().unwrap();

        assert_eq!(error.to_string(), "type `Query` is defined more than once");
    }

    #[test]
    fn unknown_types_and_directives() {
        let error = registry("type Query { a: Missing }")
            .unwrap()
            .validate(&ResolverMap::new())
            .unwrap_err();

        assert_eq!(error.to_string(), "unknown type `Missing` referenced by `Query.a`");

        let error = registry("type Query { a: Int @shareable }")
            .unwrap()
            .validate(&ResolverMap::new())
            .unwrap_err();

        assert_eq!(error.to_string(), "unknown directive `@shareable` on `Query.a`");
    }

    fn validate(sdl: &str) -> Result<()> {
        registry(sdl).unwrap().validate(&ResolverMap::new())
    }

    #[test]
    fn directives_are_checked_against_their_locations() {
        let error = validate(indoc! {r#"
            directive @key(selectionSet: String!) on OBJECT
            type Query { foo: String @key(selectionSet: "{ foo }") }
        "#})
        .unwrap_err();
        assert_eq!(error.to_string(), "directive `@key` is not allowed on `Query.foo`");

        let error = validate(indoc! {r#"
            directive @key(selectionSet: String!) on OBJECT
            type Query { id: ID }
            interface Node @key(selectionSet: "{ id }") { id: ID! }
        "#})
        .unwrap_err();
        assert_eq!(error.to_string(), "directive `@key` is not allowed on `Node`");

        let error = validate("type Query { a: Int } type Product @deprecated { id: ID }").unwrap_err();
        assert_eq!(error.to_string(), "directive `@deprecated` is not allowed on `Product`");
    }

    #[test]
    fn required_directive_arguments() {
        let error = validate(indoc! {r#"
            directive @key(selectionSet: String!) on OBJECT
            type Query { a: Int }
            type Product @key { id: ID }
        "#})
        .unwrap_err();

        assert_eq!(
            error.to_string(),
            "directive `@key` on `Product` is missing the required argument `selectionSet`"
        );

        assert!(validate("type Query { a: Int @deprecated }").is_ok());
        assert!(validate(r#"scalar JSON @specifiedBy(url: "https://json.org") type Query { a: JSON }"#).is_ok());
        assert!(validate("scalar JSON @specifiedBy type Query { a: JSON }").is_err());
    }

    #[test]
    fn unknown_directive_arguments() {
        let error = validate("type Query { a: Int @deprecated(bogus: 1) }").unwrap_err();

        assert_eq!(error.to_string(), "directive `@deprecated` on `Query.a` has no argument `bogus`");
    }

    #[test]
    fn non_repeatable_directives_are_applied_once() {
        let error = validate(indoc! {r#"
            directive @tag(name: String!) on FIELD_DEFINITION
            directive @label(name: String!) repeatable on FIELD_DEFINITION
            type Query { a: Int @label(name: "x") @label(name: "y") b: Int @tag(name: "x") @tag(name: "y") }
        "#})
        .unwrap_err();

        assert_eq!(error.to_string(), "directive `@tag` is used more than once on `Query.b`");
    }

    #[test]
    fn missing_query_type() {
        let error = registry("type Foo { a: Int }")
            .unwrap()
            .validate(&ResolverMap::new())
            .unwrap_err();

        assert_eq!(error.to_string(), "query root type `Query` is not defined");
    }

    #[test]
    fn schema_definition_names_the_roots() {
        let registry = registry(indoc! {r#"
            schema { query: RootQuery }
            type RootQuery { a: Int }
        "#})
        .unwrap();

        assert_eq!(registry.query, "RootQuery");
        assert!(registry.validate(&ResolverMap::new()).is_ok());
    }

    #[test]
    fn resolvers_must_target_declared_fields() {
        let registry = registry("type Query { a: Int }").unwrap();

        let error = registry
            .validate(&ResolverMap::new().with_value("Query", "b", 1))
            .unwrap_err();
        assert_eq!(error.to_string(), "Query.b defined in resolvers, but not in schema");

        let error = registry
            .validate(&ResolverMap::new().with_type_resolver("Query", |_| None))
            .unwrap_err();
        assert_eq!(error.to_string(), "Query defined in resolvers, but not in schema");
    }

    #[test]
    fn engine_validation_errors_are_reported() {
        let registry = registry(indoc! {r#"
            type Query { a: Int }
            type Product implements Node { id: ID! }
            interface Node { id: ID! name: String! }
        "#})
        .unwrap();

        let resolvers = ResolverMap::new();
        registry.validate(&resolvers).unwrap();

        let error = registry.build(&resolvers, &[]).err().unwrap();

        assert!(matches!(error, Error::InvalidSchema(_)), "{error}");
    }
}
