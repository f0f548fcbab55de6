use async_graphql_parser::{
    parse_query, parse_schema,
    types::{
        BaseType, ConstDirective, DocumentOperations, FieldDefinition, InputValueDefinition, ObjectType, Selection,
        ServiceDocument, Type, TypeDefinition, TypeKind, TypeSystemDefinition, UnionType,
    },
    Pos, Positioned,
};
use async_graphql_value::{ConstValue, Name};
use indexmap::IndexSet;
use std::collections::HashSet;

use crate::{printer::print_document, Error, StitchingDirectives};

const FEDERATION_KEY: &str = "key";
const FEDERATION_EXTERNAL: &str = "external";
const FEDERATION_PROVIDES: &str = "provides";
const FEDERATION_REQUIRES: &str = "requires";
const FIELD_SET_ARGUMENT: &str = "fields";
const SELECTION_SET_ARGUMENT: &str = "selectionSet";
const QUERY_TYPE: &str = "Query";

pub const ANY_SCALAR: &str = "_Any";
pub const ENTITY_UNION: &str = "_Entity";
pub const ENTITIES_FIELD: &str = "_entities";
const REPRESENTATIONS_ARGUMENT: &str = "representations";

/// Rewrites a federation subgraph schema into a schema annotated with stitching directives.
///
/// The output starts with the definitions of the configured stitching directives, followed by
/// the rewritten document:
///
/// - extensions of types that are not defined in the document become definitions,
/// - `@key(fields: "...")` becomes a single `@key(selectionSet: "{ ... }")`,
/// - `@external` fields that are not part of a key are removed, `@provides` is dropped,
/// - `@requires(fields: "...")` becomes `@computed(selectionSet: "{ ... }")`,
/// - when entities are present, `_Any`, `_Entity` and `Query._entities` are added.
pub fn federation_to_stitching_sdl(federation_sdl: &str, directives: &StitchingDirectives) -> Result<String, Error> {
    directives.validate()?;

    let mut document = parse_schema(federation_sdl)?;

    flatten_orphan_extensions(&mut document);

    let mut entity_types = IndexSet::new();

    for definition in &mut document.definitions {
        let TypeSystemDefinition::Type(definition) = definition else {
            continue;
        };

        if rewrite_entity(&mut definition.node, directives)? {
            entity_types.insert(definition.node.name.node.to_string());
        }
    }

    if !entity_types.is_empty() {
        add_entities_field(&mut document, &entity_types, directives);
    }

    Ok([directives.type_defs(), print_document(&document)].join("\n"))
}

/// Stitching merges flat types, so an extension is only meaningful when the base type is local.
fn flatten_orphan_extensions(document: &mut ServiceDocument) {
    let base_type_names = document
        .definitions
        .iter()
        .filter_map(|definition| match definition {
            TypeSystemDefinition::Type(ty) if !ty.node.extend => Some(ty.node.name.node.clone()),
            _ => None,
        })
        .collect::<HashSet<Name>>();

    for definition in &mut document.definitions {
        if let TypeSystemDefinition::Type(ty) = definition {
            if ty.node.extend && !base_type_names.contains(&ty.node.name.node) {
                ty.node.extend = false;
            }
        }
    }
}

/// Returns true when the definition is an object entity.
fn rewrite_entity(definition: &mut TypeDefinition, directives: &StitchingDirectives) -> Result<bool, Error> {
    let TypeDefinition {
        name,
        directives: type_directives,
        kind,
        ..
    } = definition;

    let (is_object, fields) = match kind {
        TypeKind::Object(object) => (true, &mut object.fields),
        TypeKind::Interface(interface) => (false, &mut interface.fields),
        _ => return Ok(false),
    };

    let Some(pos) = type_directives.iter().find(|directive| is_key(directive)).map(|directive| directive.pos) else {
        return Ok(false);
    };

    let type_name = name.node.to_string();

    let key_fields = type_directives
        .iter()
        .filter(|directive| is_key(directive))
        .map(|directive| field_set_argument(&directive.node, &type_name))
        .collect::<Result<Vec<_>, _>>()?;

    let selection_set = format!("{{ {} }}", key_fields.join(" "));
    let key_field_names = top_level_fields(&selection_set, FEDERATION_KEY, &type_name)?;

    let key_directive = Positioned::new(stitching_directive(&directives.key, selection_set, pos), pos);
    let other_directives = std::mem::take(type_directives)
        .into_iter()
        .filter(|directive| !is_key(directive));

    *type_directives = std::iter::once(key_directive).chain(other_directives).collect();

    // Services only publish the fields they own, the gateway plans the rest.
    fields.retain(|field| {
        key_field_names.contains(field.node.name.node.as_str()) || !has_directive(&field.node, FEDERATION_EXTERNAL)
    });

    for field in fields.iter_mut() {
        rewrite_field_directives(&mut field.node, &type_name, directives)?;
    }

    Ok(is_object)
}

fn rewrite_field_directives(
    field: &mut FieldDefinition,
    type_name: &str,
    directives: &StitchingDirectives,
) -> Result<(), Error> {
    field.directives.retain(|directive| {
        let name = directive.node.name.node.as_str();
        name != FEDERATION_EXTERNAL && name != FEDERATION_PROVIDES
    });

    for directive in &mut field.directives {
        if directive.node.name.node.as_str() != FEDERATION_REQUIRES {
            continue;
        }

        let location = format!("{type_name}.{}", field.name.node);
        let fields = field_set_argument(&directive.node, &location)?;

        directive.node = stitching_directive(&directives.computed, format!("{{ {fields} }}"), directive.pos);
    }

    Ok(())
}

fn add_entities_field(document: &mut ServiceDocument, entity_types: &IndexSet<String>, directives: &StitchingDirectives) {
    let any = TypeDefinition {
        extend: false,
        description: None,
        name: positioned(Name::new(ANY_SCALAR)),
        directives: Vec::new(),
        kind: TypeKind::Scalar,
    };

    let entity = TypeDefinition {
        extend: false,
        description: None,
        name: positioned(Name::new(ENTITY_UNION)),
        directives: Vec::new(),
        kind: TypeKind::Union(UnionType {
            members: entity_types.iter().map(|name| positioned(Name::new(name))).collect(),
        }),
    };

    // _entities(representations: [_Any!]!): [_Entity]! @merge
    let entities_field = positioned(FieldDefinition {
        description: None,
        name: positioned(Name::new(ENTITIES_FIELD)),
        arguments: vec![positioned(InputValueDefinition {
            description: None,
            name: positioned(Name::new(REPRESENTATIONS_ARGUMENT)),
            ty: positioned(list_of(named(ANY_SCALAR, false), false)),
            default_value: None,
            directives: Vec::new(),
        })],
        ty: positioned(list_of(named(ENTITY_UNION, true), false)),
        directives: vec![positioned(ConstDirective {
            name: positioned(Name::new(&directives.merge)),
            arguments: Vec::new(),
        })],
    });

    document.definitions.push(TypeSystemDefinition::Type(positioned(any)));
    document.definitions.push(TypeSystemDefinition::Type(positioned(entity)));

    let existing_query = document.definitions.iter_mut().find_map(|definition| match definition {
        TypeSystemDefinition::Type(ty) if !ty.node.extend && ty.node.name.node.as_str() == QUERY_TYPE => {
            match &mut ty.node.kind {
                TypeKind::Object(object) => Some(object),
                _ => None,
            }
        }
        _ => None,
    });

    match existing_query {
        Some(query) => query.fields.push(entities_field),
        None => document
            .definitions
            .push(TypeSystemDefinition::Type(positioned(TypeDefinition {
                extend: false,
                description: None,
                name: positioned(Name::new(QUERY_TYPE)),
                directives: Vec::new(),
                kind: TypeKind::Object(ObjectType {
                    implements: Vec::new(),
                    fields: vec![entities_field],
                }),
            }))),
    }
}

/// The field set of a federation directive: its `fields` argument, or its first argument.
fn field_set_argument(directive: &ConstDirective, location: &str) -> Result<String, Error> {
    let argument = directive
        .arguments
        .iter()
        .find(|(name, _)| name.node.as_str() == FIELD_SET_ARGUMENT)
        .or_else(|| directive.arguments.first());

    match argument.map(|(_, value)| &value.node) {
        Some(ConstValue::String(fields)) => Ok(fields.clone()),
        _ => Err(Error::InvalidDirectiveArgument {
            directive: directive.name.node.to_string(),
            location: location.to_string(),
        }),
    }
}

fn top_level_fields(selection_set: &str, directive: &str, location: &str) -> Result<HashSet<String>, Error> {
    let invalid_field_set = |message: String| Error::InvalidFieldSet {
        directive: directive.to_string(),
        location: location.to_string(),
        fields: selection_set.to_string(),
        message,
    };

    let document = parse_query(selection_set).map_err(|err| invalid_field_set(err.to_string()))?;

    let DocumentOperations::Single(operation) = document.operations else {
        return Err(invalid_field_set("expected a single selection set".to_string()));
    };

    Ok(operation
        .node
        .selection_set
        .node
        .items
        .iter()
        .filter_map(|selection| match &selection.node {
            Selection::Field(field) => Some(field.node.name.node.to_string()),
            _ => None,
        })
        .collect())
}

fn stitching_directive(name: &str, selection_set: String, pos: Pos) -> ConstDirective {
    ConstDirective {
        name: Positioned::new(Name::new(name), pos),
        arguments: vec![(
            Positioned::new(Name::new(SELECTION_SET_ARGUMENT), pos),
            Positioned::new(ConstValue::String(selection_set), pos),
        )],
    }
}

fn is_key(directive: &Positioned<ConstDirective>) -> bool {
    directive.node.name.node.as_str() == FEDERATION_KEY
}

fn named(name: &str, nullable: bool) -> Type {
    Type {
        base: BaseType::Named(Name::new(name)),
        nullable,
    }
}

fn list_of(inner: Type, nullable: bool) -> Type {
    Type {
        base: BaseType::List(Box::new(inner)),
        nullable,
    }
}

fn positioned<T>(node: T) -> Positioned<T> {
    Positioned::new(node, Pos::default())
}

fn has_directive(field: &FieldDefinition, name: &str) -> bool {
    field
        .directives
        .iter()
        .any(|directive| directive.node.name.node.as_str() == name)
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn types_without_keys_are_left_alone() {
        let sdl = indoc! {r#"
            type Query {
                hello: String @deprecated
            }
        "#};

        let stitched = federation_to_stitching_sdl(sdl, &StitchingDirectives::default()).unwrap();

        assert!(stitched.ends_with(sdl));
        assert!(!stitched.contains("_entities"));
    }

    #[test]
    fn multiple_keys_are_merged_into_one_selection_set() {
        let sdl = indoc! {r#"
            type Product @key(fields: "upc") @key(fields: "sku") {
                upc: String!
                sku: String!
            }
        "#};

        let stitched = federation_to_stitching_sdl(sdl, &StitchingDirectives::default()).unwrap();

        assert!(stitched.contains(r#"type Product @key(selectionSet: "{ upc sku }") {"#));
    }

    #[test]
    fn key_without_field_set_is_an_error() {
        let err = federation_to_stitching_sdl("type Product @key { upc: String! }", &StitchingDirectives::default())
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "`@key` on `Product` must have a string field set argument"
        );
    }

    #[test]
    fn unparseable_field_set_is_an_error() {
        let err = federation_to_stitching_sdl(
            r#"type Product @key(fields: "upc {") { upc: String! }"#,
            &StitchingDirectives::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::InvalidFieldSet { ref location, .. } if location == "Product"));
    }

    #[test]
    fn invalid_sdl_is_a_parse_error() {
        let err = federation_to_stitching_sdl("type {", &StitchingDirectives::default()).unwrap_err();

        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn interfaces_with_keys_are_not_entities() {
        let sdl = indoc! {r#"
            interface Node @key(fields: "id") {
                id: ID!
            }

            type Query {
                node: Node
            }
        "#};

        let stitched = federation_to_stitching_sdl(sdl, &StitchingDirectives::default()).unwrap();

        assert!(stitched.contains(r#"interface Node @key(selectionSet: "{ id }") {"#));
        assert!(!stitched.contains("_Entity"));
    }
}
