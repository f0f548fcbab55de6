//! Serves a federation subgraph as a schema stitching service.
//!
//! The type definitions of the service are written with federation directives. They are
//! rewritten with stitching directives, extended with `Query._sdl` returning the rewritten SDL
//! and, when the service owns entities, with `Query._entities`. The resulting schema is served
//! over HTTP and over WebSocket for subscriptions.
//!
//! ```no_run
//! use axum::Router;
//! use graphql_microservice::{create_service, MicroserviceParams, ResolverMap, DEFAULT_PATH};
//!
//! # async fn run() -> graphql_microservice::Result<()> {
//! let type_defs = r#"
//!     type Product @key(fields: "upc") {
//!         upc: String!
//!         name: String
//!     }
//!
//!     type Query {
//!         topProducts: [Product]
//!     }
//! "#;
//!
//! let resolvers = ResolverMap::new().with_value(
//!     "Query",
//!     "topProducts",
//!     async_graphql::value!([{ "upc": "1", "name": "Table" }]),
//! );
//!
//! let mut service = create_service(MicroserviceParams::<()>::new(type_defs, resolvers).with_label("products")).await?;
//! service.start().await?;
//!
//! let listening = service.apply_middleware(Router::new(), DEFAULT_PATH)?.listen(4001).await?;
//! println!("{}", listening.endpoint());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(test, allow(unused_crate_dependencies))]

mod config;
mod entities;
mod error;
mod executable;
mod output;
mod registry;
mod resolvers;
mod runtime;
mod service;
mod source;
mod subscription;

pub use self::{
    config::ServiceConfig,
    error::{BoxError, Error, Result},
    executable::{build_executable_schema, BuildOptions, ExecutableSchema, SDL_FIELD},
    resolvers::{typename_of, FieldResolver, FieldResolverFn, ResolverMap, SubscriptionResolverFn, TypeResolverFn},
    runtime::{Ready, ServerRuntime},
    service::{create_service, Listening, Microservice, MicroserviceParams, MountedService, DEFAULT_PATH},
    source::{Resolvers, TypeDefs},
    subscription::{ConnectionContext, SubscribeMessage, SubscriptionContextArgs, SubscriptionContextFn, HEADERS_VARIABLE},
};

pub use stitching_directives::StitchingDirectives;
