use std::{fmt, sync::Arc};

use async_graphql::{dynamic::ResolverContext, Value};
use futures::{future::BoxFuture, stream::BoxStream};
use indexmap::IndexMap;

/// An asynchronous field resolver.
pub type FieldResolverFn =
    dyn for<'a> Fn(ResolverContext<'a>) -> BoxFuture<'a, async_graphql::Result<Option<Value>>> + Send + Sync;

/// Picks the concrete object type of a union or interface value.
pub type TypeResolverFn = dyn Fn(&Value) -> Option<String> + Send + Sync;

/// Starts the event stream of a subscription field.
pub type SubscriptionResolverFn = dyn Fn(&ResolverContext<'_>) -> async_graphql::Result<BoxStream<'static, async_graphql::Result<Value>>>
    + Send
    + Sync;

#[derive(Clone)]
pub enum FieldResolver {
    /// Always resolves to the same value.
    Value(Value),
    Function(Arc<FieldResolverFn>),
}

impl fmt::Debug for FieldResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldResolver::Value(value) => f.debug_tuple("Value").field(value).finish(),
            FieldResolver::Function(_) => f.write_str("Function"),
        }
    }
}

/// Resolvers keyed by type and field name.
///
/// Fields without a resolver return the property of the same name on their parent value, and
/// union or interface values without a type resolver are typed by their `__typename` property.
///
/// ```
/// use async_graphql::value;
/// use graphql_microservice::ResolverMap;
///
/// let resolvers = ResolverMap::new()
///     .with_value("Query", "me", value!({"id": "1", "name": "Ada"}))
///     .with_sync_resolver("Query", "greeting", |ctx| {
///         let name = ctx.args.try_get("name")?.string()?;
///         Ok(Some(format!("Hello, {name}").into()))
///     });
///
/// assert!(resolvers.field("Query", "me").is_some());
/// ```
#[derive(Clone, Default)]
pub struct ResolverMap {
    fields: IndexMap<(String, String), FieldResolver>,
    types: IndexMap<String, Arc<TypeResolverFn>>,
    subscriptions: IndexMap<(String, String), Arc<SubscriptionResolverFn>>,
}

impl ResolverMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, type_name: &str, field_name: &str, value: impl Into<Value>) -> Self {
        self.fields
            .insert(key(type_name, field_name), FieldResolver::Value(value.into()));
        self
    }

    pub fn with_resolver<F>(mut self, type_name: &str, field_name: &str, resolver: F) -> Self
    where
        F: for<'a> Fn(ResolverContext<'a>) -> BoxFuture<'a, async_graphql::Result<Option<Value>>>
            + Send
            + Sync
            + 'static,
    {
        self.fields
            .insert(key(type_name, field_name), FieldResolver::Function(Arc::new(resolver)));
        self
    }

    pub fn with_sync_resolver<F>(self, type_name: &str, field_name: &str, resolver: F) -> Self
    where
        F: Fn(&ResolverContext<'_>) -> async_graphql::Result<Option<Value>> + Send + Sync + 'static,
    {
        self.with_resolver(type_name, field_name, move |ctx| {
            let result = resolver(&ctx);
            Box::pin(async move { result })
        })
    }

    pub fn with_type_resolver<F>(mut self, type_name: &str, resolver: F) -> Self
    where
        F: Fn(&Value) -> Option<String> + Send + Sync + 'static,
    {
        self.types.insert(type_name.to_string(), Arc::new(resolver));
        self
    }

    pub fn with_subscription<F>(mut self, type_name: &str, field_name: &str, resolver: F) -> Self
    where
        F: Fn(&ResolverContext<'_>) -> async_graphql::Result<BoxStream<'static, async_graphql::Result<Value>>>
            + Send
            + Sync
            + 'static,
    {
        self.subscriptions
            .insert(key(type_name, field_name), Arc::new(resolver));
        self
    }

    /// Layers `other` on top of these resolvers: on conflicting names, `other` wins.
    pub fn merge(mut self, other: ResolverMap) -> Self {
        self.fields.extend(other.fields);
        self.types.extend(other.types);
        self.subscriptions.extend(other.subscriptions);
        self
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldResolver> {
        self.fields.get(&key(type_name, field_name))
    }

    pub fn type_resolver(&self, type_name: &str) -> Option<&Arc<TypeResolverFn>> {
        self.types.get(type_name)
    }

    pub fn subscription(&self, type_name: &str, field_name: &str) -> Option<&Arc<SubscriptionResolverFn>> {
        self.subscriptions.get(&key(type_name, field_name))
    }

    pub(crate) fn field_targets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.keys().map(|(ty, field)| (ty.as_str(), field.as_str()))
    }

    pub(crate) fn type_resolver_targets(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub(crate) fn subscription_targets(&self) -> impl Iterator<Item = (&str, &str)> {
        self.subscriptions.keys().map(|(ty, field)| (ty.as_str(), field.as_str()))
    }
}

impl fmt::Debug for ResolverMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverMap")
            .field("fields", &self.fields)
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("subscriptions", &self.subscriptions.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn key(type_name: &str, field_name: &str) -> (String, String) {
    (type_name.to_string(), field_name.to_string())
}

/// The default type resolver: the `__typename` property of the value.
pub fn typename_of(value: &Value) -> Option<String> {
    match value {
        Value::Object(object) => match object.get("__typename") {
            Some(Value::String(typename)) => Some(typename.clone()),
            _ => None,
        },
        _ => None,
    }
}
