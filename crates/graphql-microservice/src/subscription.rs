//! GraphQL over WebSocket, adapted from the async-graphql-axum subscription service to compute a
//! context for every subscribe message.

use std::{
    convert::Infallible,
    fmt,
    sync::{Arc, OnceLock},
    task::{Context, Poll},
};

use async_graphql::{http::ALL_WEBSOCKET_PROTOCOLS, Data, Value, Variables};
use async_graphql_axum::{GraphQLProtocol, GraphQLWebSocket};
use axum::{
    body::{Body, HttpBody},
    extract::{FromRequestParts as _, Request, WebSocketUpgrade},
    response::{IntoResponse as _, Response},
};
use futures::stream::BoxStream;
use futures_util::future::BoxFuture;
use http::HeaderMap;
use indexmap::IndexMap;
use tower::Service;

use crate::ExecutableSchema;

/// Variable carrying the per-operation headers of a subscription.
pub const HEADERS_VARIABLE: &str = "__headers";

pub type SubscriptionContextFn<C> = dyn Fn(SubscriptionContextArgs<'_>) -> C + Send + Sync;

/// Everything known about a subscription operation when its context is computed.
pub struct SubscriptionContextArgs<'a> {
    pub connection: &'a ConnectionContext,
    pub message: SubscribeMessage<'a>,
    pub schema: &'a ExecutableSchema,
    /// The `__headers` variable of the operation, empty when absent.
    pub headers: &'a IndexMap<String, String>,
}

/// The operation of a subscribe message.
#[derive(Debug, Clone, Copy)]
pub struct SubscribeMessage<'a> {
    pub query: &'a str,
    pub operation_name: Option<&'a str>,
    pub variables: &'a Variables,
}

/// State of one WebSocket connection.
#[derive(Debug)]
pub struct ConnectionContext {
    headers: HeaderMap,
    init_payload: OnceLock<serde_json::Value>,
}

impl ConnectionContext {
    /// Headers of the upgrade request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Payload of the `connection_init` message.
    pub fn init_payload(&self) -> Option<&serde_json::Value> {
        self.init_payload.get()
    }
}

pub(crate) struct SubscriptionService<C> {
    schema: ExecutableSchema,
    context: Option<Arc<SubscriptionContextFn<C>>>,
}

impl<C> SubscriptionService<C> {
    pub(crate) fn new(schema: ExecutableSchema, context: Option<Arc<SubscriptionContextFn<C>>>) -> Self {
        Self { schema, context }
    }
}

impl<C> Clone for SubscriptionService<C> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            context: self.context.clone(),
        }
    }
}

impl<B, C> Service<Request<B>> for SubscriptionService<C>
where
    B: HttpBody + Send + 'static,
    C: Default + Send + Sync + 'static,
{
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let schema = self.schema.clone();
        let context = self.context.clone();

        Box::pin(async move {
            let (mut parts, _body) = req.into_parts();

            let protocol = match GraphQLProtocol::from_request_parts(&mut parts, &()).await {
                Ok(protocol) => protocol,
                Err(err) => return Ok(err.into_response()),
            };
            let upgrade = match WebSocketUpgrade::from_request_parts(&mut parts, &()).await {
                Ok(upgrade) => upgrade,
                Err(err) => return Ok(err.into_response()),
            };

            let connection = Arc::new(ConnectionContext {
                headers: parts.headers,
                init_payload: OnceLock::new(),
            });

            let resp = upgrade.protocols(ALL_WEBSOCKET_PROTOCOLS).on_upgrade(move |stream| {
                let executor = SubscriptionExecutor {
                    schema,
                    connection: connection.clone(),
                    context,
                };

                GraphQLWebSocket::new(stream, executor, protocol)
                    .on_connection_init(move |payload| async move {
                        connection.init_payload.set(payload).ok();
                        Ok(Data::default())
                    })
                    .serve()
            });

            Ok(resp.into_response())
        })
    }
}

/// Executes the operations of one connection against the static schema.
struct SubscriptionExecutor<C> {
    schema: ExecutableSchema,
    connection: Arc<ConnectionContext>,
    context: Option<Arc<SubscriptionContextFn<C>>>,
}

impl<C> Clone for SubscriptionExecutor<C> {
    fn clone(&self) -> Self {
        Self {
            schema: self.schema.clone(),
            connection: self.connection.clone(),
            context: self.context.clone(),
        }
    }
}

impl<C> SubscriptionExecutor<C>
where
    C: Default + Send + Sync + 'static,
{
    fn with_context(&self, request: async_graphql::Request) -> async_graphql::Request {
        let context = match &self.context {
            Some(context) => {
                let headers = header_bag(&request.variables);

                context(SubscriptionContextArgs {
                    connection: &self.connection,
                    message: SubscribeMessage {
                        query: &request.query,
                        operation_name: request.operation_name.as_deref(),
                        variables: &request.variables,
                    },
                    schema: &self.schema,
                    headers: &headers,
                })
            }
            None => C::default(),
        };

        request.data(context)
    }
}

impl<C> async_graphql::Executor for SubscriptionExecutor<C>
where
    C: Default + Send + Sync + 'static,
{
    async fn execute(&self, request: async_graphql::Request) -> async_graphql::Response {
        self.schema.execute(self.with_context(request)).await
    }

    fn execute_stream(
        &self,
        request: async_graphql::Request,
        session_data: Option<Arc<Data>>,
    ) -> BoxStream<'static, async_graphql::Response> {
        async_graphql::Executor::execute_stream(self.schema.schema(), self.with_context(request), session_data)
    }
}

/// Reads the `__headers` variable: strings are taken as is, other values are printed as GraphQL
/// literals.
pub(crate) fn header_bag(variables: &Variables) -> IndexMap<String, String> {
    let Some(Value::Object(headers)) = variables.get(HEADERS_VARIABLE) else {
        return IndexMap::new();
    };

    headers
        .iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(value) => value.clone(),
                other => other.to_string(),
            };

            (name.to_string(), value)
        })
        .collect()
}

impl fmt::Debug for SubscriptionContextArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionContextArgs")
            .field("connection", &self.connection)
            .field("message", &self.message)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_graphql::value;

    use super::*;

    #[test]
    fn header_bag_copies_strings_and_prints_other_values() {
        let variables = Variables::from_value(value!({
            "id": 1,
            "__headers": { "x-user": "42", "x-retries": 3, "x-debug": true }
        }));

        let headers = header_bag(&variables);

        assert_eq!(
            headers.into_iter().collect::<Vec<_>>(),
            vec![
                ("x-user".to_string(), "42".to_string()),
                ("x-retries".to_string(), "3".to_string()),
                ("x-debug".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn header_bag_is_empty_without_headers() {
        assert!(header_bag(&Variables::default()).is_empty());
        assert!(header_bag(&Variables::from_value(value!({ "__headers": "x-user" }))).is_empty());
    }
}
