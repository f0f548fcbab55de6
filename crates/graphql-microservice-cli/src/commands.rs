use std::net::SocketAddr;

use anyhow::{anyhow, Context as _};
use async_graphql::Value;
use axum::Router;
use graphql_microservice::{create_service, MicroserviceParams, ResolverMap};
use stitching_directives::federation_to_stitching_sdl;

use crate::args::{SchemaArgs, ServeArgs};

const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 4000);

pub(crate) fn stitch(args: &SchemaArgs) -> anyhow::Result<String> {
    let config = args.config()?;
    let type_defs = args.type_defs()?;

    Ok(federation_to_stitching_sdl(&type_defs, &config.directives)?)
}

pub(crate) async fn serve(args: &ServeArgs) -> anyhow::Result<()> {
    let config = args.schema.config()?;
    let type_defs = args.schema.type_defs()?;

    let resolvers = match args.root_value()? {
        Some(root_value) => root_value_resolvers(&root_value)?,
        None => ResolverMap::new(),
    };

    let params = config.apply(MicroserviceParams::<()>::new(type_defs, resolvers));
    let mut service = create_service(params).await?;
    service.start().await?;

    let listen_address = args
        .listen_address
        .or(config.listen_address)
        .unwrap_or(DEFAULT_LISTEN_ADDRESS);

    let listening = service
        .apply_middleware(Router::new(), &config.path)?
        .listen_on(listen_address)
        .await?;

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    tracing::info!("shutting down");

    listening.shutdown().await?;

    Ok(())
}

/// Every property of the JSON object becomes the value of the `Query` field with the same name.
pub(crate) fn root_value_resolvers(root_value: &str) -> anyhow::Result<ResolverMap> {
    let root_value: serde_json::Value = serde_json::from_str(root_value).context("parsing root value")?;

    let serde_json::Value::Object(fields) = root_value else {
        return Err(anyhow!("the root value must be a JSON object"));
    };

    let mut resolvers = ResolverMap::new();

    for (field, value) in fields {
        resolvers = resolvers.with_value("Query", &field, Value::from_json(value)?);
    }

    Ok(resolvers)
}
