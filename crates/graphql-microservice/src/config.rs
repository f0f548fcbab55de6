use std::net::SocketAddr;

use stitching_directives::StitchingDirectives;

use crate::{service::DEFAULT_PATH, MicroserviceParams};

/// Settings of a service, usually read from a TOML file.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Name of the service in the ready notification
    pub label: String,
    /// Path of the GraphQL endpoint
    pub path: String,
    /// Path of the subscription endpoint, defaults to `path`
    pub websocket_path: Option<String>,
    pub listen_address: Option<SocketAddr>,
    /// Names of the stitching directives in the served SDL
    pub directives: StitchingDirectives,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            label: "graphql-microservice".to_string(),
            path: DEFAULT_PATH.to_string(),
            websocket_path: None,
            listen_address: None,
            directives: StitchingDirectives::default(),
        }
    }
}

impl ServiceConfig {
    /// Copies the settings that belong to the service parameters. `path` and `listen_address`
    /// are used when mounting and binding the service.
    pub fn apply<C>(&self, params: MicroserviceParams<C>) -> MicroserviceParams<C>
    where
        C: Default + Send + Sync + 'static,
    {
        let params = params
            .with_label(self.label.clone())
            .with_directives(self.directives.clone());

        match &self.websocket_path {
            Some(path) => params.with_websocket_path(path.clone()),
            None => params,
        }
    }
}
