//! Rewrites the SDL of an Apollo Federation subgraph into SDL annotated with [schema stitching
//! directives](https://the-guild.dev/graphql/stitching/docs/approaches/stitching-directives), so
//! a stitching gateway can merge the service without knowing about federation.
//!
//! ```
//! use stitching_directives::{federation_to_stitching_sdl, StitchingDirectives};
//!
//! let sdl = r#"type Product @key(fields: "upc") { upc: String! name: String }"#;
//! let stitched = federation_to_stitching_sdl(sdl, &StitchingDirectives::default()).unwrap();
//!
//! assert!(stitched.contains(r#"type Product @key(selectionSet: "{ upc }")"#));
//! assert!(stitched.contains("_entities(representations: [_Any!]!): [_Entity]! @merge"));
//! ```

mod directives;
mod error;
mod printer;
mod transform;

pub use self::{
    directives::StitchingDirectives,
    error::Error,
    printer::print_document,
    transform::{federation_to_stitching_sdl, ANY_SCALAR, ENTITIES_FIELD, ENTITY_UNION},
};
