#![allow(unused_crate_dependencies)]

use indoc::indoc;
use stitching_directives::{federation_to_stitching_sdl, StitchingDirectives};

const REVIEWS_SUBGRAPH: &str = indoc! {r#"
    extend type Product @key(fields: "upc") {
        upc: String! @external
        weight: Int @external
        price: Int @external
        inStock: Boolean
        shippingEstimate: Int @requires(fields: "price weight")
    }

    type Review @key(fields: "id") {
        id: ID!
        body: String
        author: User @provides(fields: "username")
        product: Product
    }

    extend type User @key(fields: "id") {
        id: ID! @external
        username: String @external
        reviews: [Review]
    }

    type Query {
        topReviews(first: Int = 5): [Review]
    }
"#};

#[test]
fn reviews_subgraph() {
    let stitched = federation_to_stitching_sdl(REVIEWS_SUBGRAPH, &StitchingDirectives::default()).unwrap();

    insta::assert_snapshot!(stitched, @r###"
    directive @key(selectionSet: String!) on OBJECT
    directive @computed(selectionSet: String!) on FIELD_DEFINITION
    directive @merge(argsExpr: String, keyArg: String, keyField: String, key: [String!], additionalArgs: String) on FIELD_DEFINITION
    directive @canonical on OBJECT | INTERFACE | INPUT_OBJECT | UNION | ENUM | SCALAR | FIELD_DEFINITION | INPUT_FIELD_DEFINITION

    type Product @key(selectionSet: "{ upc }") {
        upc: String!
        inStock: Boolean
        shippingEstimate: Int @computed(selectionSet: "{ price weight }")
    }

    type Review @key(selectionSet: "{ id }") {
        id: ID!
        body: String
        author: User
        product: Product
    }

    type User @key(selectionSet: "{ id }") {
        id: ID!
        reviews: [Review]
    }

    type Query {
        topReviews(first: Int = 5): [Review]
        _entities(representations: [_Any!]!): [_Entity]! @merge
    }

    scalar _Any

    union _Entity = Product | Review | User
    "###);
}

#[test]
fn renamed_stitching_directives() {
    let directives = StitchingDirectives::default()
        .with_key_directive("stitchingKey")
        .with_computed_directive("stitchingComputed")
        .with_merge_directive("stitchingMerge");

    let stitched = federation_to_stitching_sdl(REVIEWS_SUBGRAPH, &directives).unwrap();

    assert!(stitched.contains("directive @stitchingKey(selectionSet: String!) on OBJECT"));
    assert!(stitched.contains(r#"type Product @stitchingKey(selectionSet: "{ upc }") {"#));
    assert!(stitched.contains(r#"shippingEstimate: Int @stitchingComputed(selectionSet: "{ price weight }")"#));
    assert!(stitched.contains("_entities(representations: [_Any!]!): [_Entity]! @stitchingMerge"));
    assert!(!stitched.contains("@key("));
}

#[test]
fn entities_only_service_gets_a_query_type() {
    let sdl = indoc! {r#"
        extend type Product @key(fields: "upc") {
            upc: String! @external
            reviewCount: Int
        }
    "#};

    let stitched = federation_to_stitching_sdl(sdl, &StitchingDirectives::default()).unwrap();

    assert!(stitched.ends_with(indoc! {r#"
        type Product @key(selectionSet: "{ upc }") {
            upc: String!
            reviewCount: Int
        }

        scalar _Any

        union _Entity = Product

        type Query {
            _entities(representations: [_Any!]!): [_Entity]! @merge
        }
    "#}));
}

#[test]
fn extensions_of_local_types_are_kept() {
    let sdl = indoc! {r#"
        type Query {
            a: Int
        }

        extend type Query {
            b: Int
        }
    "#};

    let stitched = federation_to_stitching_sdl(sdl, &StitchingDirectives::default()).unwrap();

    assert!(stitched.contains("extend type Query {\n    b: Int\n}"));
}

#[test]
fn the_stitched_sdl_is_a_valid_document() {
    let stitched = federation_to_stitching_sdl(REVIEWS_SUBGRAPH, &StitchingDirectives::default()).unwrap();

    assert!(async_graphql_parser::parse_schema(&stitched).is_ok());
}
