use std::{fmt, net::SocketAddr, sync::Arc};

use async_graphql::{extensions::ExtensionFactory, ServerError};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{FromRequest as _, Request, State},
    response::{IntoResponse as _, Response},
    routing::{get_service, post, MethodRouter},
    Router,
};
use http::request::Parts;
use stitching_directives::StitchingDirectives;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};

use crate::{
    build_executable_schema,
    runtime::{Ready, ServerRuntime},
    subscription::{SubscriptionContextArgs, SubscriptionContextFn, SubscriptionService},
    BuildOptions, Error, ExecutableSchema, Resolvers, Result, TypeDefs,
};

/// Path of the GraphQL endpoint when none is configured.
pub const DEFAULT_PATH: &str = "/graphql";

const DEFAULT_LABEL: &str = "graphql-microservice";

type ContextFn<C> = dyn Fn(&Parts) -> C + Send + Sync;

/// Everything needed to create a service.
///
/// `C` is the context of an operation: computed from each HTTP request, or by the subscription
/// context function for subscriptions, and available to resolvers with `ctx.data::<C>()`.
/// Derived type definitions and resolvers receive it too. `C::default()` is the context of the
/// schema built at startup.
pub struct MicroserviceParams<C> {
    type_defs: TypeDefs<C>,
    resolvers: Resolvers<C>,
    label: String,
    context: Arc<ContextFn<C>>,
    subscription_context: Option<Arc<SubscriptionContextFn<C>>>,
    options: BuildOptions,
    server_runtime: Arc<dyn ServerRuntime>,
    websocket_path: Option<String>,
}

impl<C> MicroserviceParams<C>
where
    C: Default + Send + Sync + 'static,
{
    pub fn new(type_defs: impl Into<TypeDefs<C>>, resolvers: impl Into<Resolvers<C>>) -> Self {
        MicroserviceParams {
            type_defs: type_defs.into(),
            resolvers: resolvers.into(),
            label: DEFAULT_LABEL.to_string(),
            context: Arc::new(|_| C::default()),
            subscription_context: None,
            options: BuildOptions::default(),
            server_runtime: Arc::new(()),
            websocket_path: None,
        }
    }

    /// Name of the service in the ready notification.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_context(mut self, context: impl Fn(&Parts) -> C + Send + Sync + 'static) -> Self {
        self.context = Arc::new(context);
        self
    }

    pub fn with_subscription_context(
        mut self,
        context: impl Fn(SubscriptionContextArgs<'_>) -> C + Send + Sync + 'static,
    ) -> Self {
        self.subscription_context = Some(Arc::new(context));
        self
    }

    pub fn with_plugin(mut self, plugin: impl ExtensionFactory) -> Self {
        self.options.plugins.push(Arc::new(plugin));
        self
    }

    pub fn with_directives(mut self, directives: StitchingDirectives) -> Self {
        self.options.directives = directives;
        self
    }

    pub fn with_server_runtime(mut self, server_runtime: impl ServerRuntime) -> Self {
        self.server_runtime = Arc::new(server_runtime);
        self
    }

    /// Serves subscriptions on another path than the GraphQL endpoint.
    pub fn with_websocket_path(mut self, path: impl Into<String>) -> Self {
        self.websocket_path = Some(path.into());
        self
    }
}

impl<C> fmt::Debug for MicroserviceParams<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MicroserviceParams")
            .field("type_defs", &self.type_defs)
            .field("resolvers", &self.resolvers)
            .field("label", &self.label)
            .field("options", &self.options)
            .field("websocket_path", &self.websocket_path)
            .finish_non_exhaustive()
    }
}

/// Where the schema of an HTTP request comes from.
enum SchemaSource<C> {
    Static(ExecutableSchema),
    /// Rebuilt for every request from its context.
    Dynamic {
        type_defs: TypeDefs<C>,
        resolvers: Resolvers<C>,
        options: BuildOptions,
    },
}

impl<C> SchemaSource<C> {
    async fn schema_for(&self, context: &C) -> Result<ExecutableSchema> {
        match self {
            SchemaSource::Static(schema) => Ok(schema.clone()),
            SchemaSource::Dynamic {
                type_defs,
                resolvers,
                options,
            } => {
                let type_defs = type_defs.resolve(context).await?;
                let resolvers = resolvers.resolve(context).await?;

                build_executable_schema(&*type_defs, &*resolvers, options)
            }
        }
    }
}

/// Creates a service, building its schema with the default context.
///
/// When the type definitions or the resolvers are derived, every HTTP request rebuilds the schema
/// from its own context. Subscriptions always run on the schema built here.
pub async fn create_service<C>(params: MicroserviceParams<C>) -> Result<Microservice<C>>
where
    C: Default + Send + Sync + 'static,
{
    let MicroserviceParams {
        type_defs,
        resolvers,
        label,
        context,
        subscription_context,
        options,
        server_runtime,
        websocket_path,
    } = params;

    let default_context = C::default();
    let schema = build_executable_schema(
        &*type_defs.resolve(&default_context).await?,
        &*resolvers.resolve(&default_context).await?,
        &options,
    )?;

    let source = if type_defs.is_derived() || resolvers.is_derived() {
        SchemaSource::Dynamic {
            type_defs,
            resolvers,
            options,
        }
    } else {
        SchemaSource::Static(schema.clone())
    };

    tracing::debug!(label = %label, dynamic = matches!(source, SchemaSource::Dynamic { .. }), "created service");

    Ok(Microservice {
        schema,
        source: Arc::new(source),
        label,
        context,
        subscription_context,
        server_runtime,
        websocket_path,
        started: false,
    })
}

pub struct Microservice<C> {
    schema: ExecutableSchema,
    source: Arc<SchemaSource<C>>,
    label: String,
    context: Arc<ContextFn<C>>,
    subscription_context: Option<Arc<SubscriptionContextFn<C>>>,
    server_runtime: Arc<dyn ServerRuntime>,
    websocket_path: Option<String>,
    started: bool,
}

impl<C> Microservice<C>
where
    C: Default + Send + Sync + 'static,
{
    /// The schema built at startup.
    pub fn schema(&self) -> &ExecutableSchema {
        &self.schema
    }

    /// Whether HTTP requests rebuild the schema.
    pub fn is_dynamic(&self) -> bool {
        matches!(*self.source, SchemaSource::Dynamic { .. })
    }

    pub async fn start(&mut self) -> Result<()> {
        if !self.started {
            tracing::debug!(label = %self.label, "starting service");
            self.started = true;
        }

        Ok(())
    }

    /// Mounts the GraphQL endpoint on `router` at `path`, see [`DEFAULT_PATH`].
    ///
    /// The routes are added when the service is turned into a router or starts listening. Like
    /// [`Router::route`], that panics if `router` already has a route at `path` or at the
    /// WebSocket path.
    pub fn apply_middleware(&self, router: Router, path: &str) -> Result<MountedService> {
        if !self.started {
            return Err(Error::NotStarted);
        }

        let websocket_path = self.websocket_path.as_deref().unwrap_or(path);

        for path in [path, websocket_path] {
            if !path.starts_with('/') {
                return Err(Error::InvalidPath(path.to_string()));
            }
        }

        let state = HttpState {
            source: self.source.clone(),
            context: self.context.clone(),
        };

        let subscriptions = SubscriptionService::new(self.schema.clone(), self.subscription_context.clone());

        Ok(MountedService {
            router,
            path: path.to_string(),
            websocket_path: websocket_path.to_string(),
            http: post(graphql_handler::<C>).with_state(state),
            subscriptions: get_service(subscriptions),
            label: self.label.clone(),
            server_runtime: self.server_runtime.clone(),
        })
    }
}

impl<C> fmt::Debug for Microservice<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Microservice")
            .field("label", &self.label)
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

struct HttpState<C> {
    source: Arc<SchemaSource<C>>,
    context: Arc<ContextFn<C>>,
}

impl<C> Clone for HttpState<C> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            context: self.context.clone(),
        }
    }
}

async fn graphql_handler<C>(State(state): State<HttpState<C>>, request: Request) -> Response
where
    C: Default + Send + Sync + 'static,
{
    let (parts, body) = request.into_parts();
    let context = (state.context)(&parts);

    let request = match <GraphQLRequest>::from_request(Request::from_parts(parts, body), &()).await {
        Ok(request) => request.into_inner(),
        Err(rejection) => return rejection.into_response(),
    };

    let schema = match state.source.schema_for(&context).await {
        Ok(schema) => schema,
        Err(error) => {
            tracing::warn!("schema rebuild failed: {error}");

            let response = async_graphql::Response::from_errors(vec![ServerError::new(error.to_string(), None)]);
            return GraphQLResponse::from(response).into_response();
        }
    };

    GraphQLResponse::from(schema.execute(request.data(context)).await).into_response()
}

/// A service mounted on a router, ready to listen.
pub struct MountedService {
    router: Router,
    path: String,
    websocket_path: String,
    http: MethodRouter,
    subscriptions: MethodRouter,
    label: String,
    server_runtime: Arc<dyn ServerRuntime>,
}

impl MountedService {
    /// The router with the GraphQL and WebSocket endpoints.
    pub fn into_router(self) -> Router {
        Self::router(self.router, &self.path, &self.websocket_path, self.http, self.subscriptions)
    }

    /// Listens on every interface at `port`, `0` picks a free port.
    pub async fn listen(self, port: u16) -> Result<Listening> {
        self.listen_on(SocketAddr::from(([0, 0, 0, 0], port))).await
    }

    pub async fn listen_on(self, addr: SocketAddr) -> Result<Listening> {
        let listener = TcpListener::bind(addr).await.map_err(Error::Server)?;
        let local_addr = listener.local_addr().map_err(Error::Server)?;

        let MountedService {
            router,
            path,
            websocket_path,
            http,
            subscriptions,
            label,
            server_runtime,
        } = self;

        let app = Self::router(router, &path, &websocket_path, http, subscriptions);
        let (shutdown_sender, shutdown_receiver) = oneshot::channel::<()>();

        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_receiver.await.ok();
                })
                .await
        });

        let ready = Ready {
            port: local_addr.port(),
            endpoint: format!("localhost:{}{path}", local_addr.port()),
            label,
            path,
        };

        tracing::info!(
            label = %ready.label,
            port = ready.port,
            path = %ready.path,
            endpoint = %ready.endpoint,
            "{} ready at {}",
            ready.label,
            ready.endpoint
        );
        server_runtime.on_ready(&ready);

        Ok(Listening {
            endpoint: ready.endpoint,
            local_addr,
            shutdown: Some(shutdown_sender),
            server: Some(server),
        })
    }

    fn router(router: Router, path: &str, websocket_path: &str, http: MethodRouter, subscriptions: MethodRouter) -> Router {
        if path == websocket_path {
            router.route(path, http.merge(subscriptions))
        } else {
            router.route(path, http).route(websocket_path, subscriptions)
        }
    }
}

impl fmt::Debug for MountedService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedService")
            .field("path", &self.path)
            .field("websocket_path", &self.websocket_path)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// A running server. Dropping it stops the server.
pub struct Listening {
    endpoint: String,
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<std::io::Result<()>>>,
}

impl Listening {
    /// `localhost:<port><path>`
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Stops accepting connections and waits for the open ones to complete.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }

        match self.server.take() {
            Some(server) => server
                .await
                .map_err(|error| Error::Server(std::io::Error::other(error)))?
                .map_err(Error::Server),
            None => Ok(()),
        }
    }
}

impl Drop for Listening {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
    }
}

impl fmt::Debug for Listening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listening")
            .field("endpoint", &self.endpoint)
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}
