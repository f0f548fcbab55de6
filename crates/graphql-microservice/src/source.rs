use std::{borrow::Cow, fmt, sync::Arc};

use futures::future::BoxFuture;

use crate::{error::BoxError, Error, ResolverMap, Result};

type DeriveFn<C, T> = dyn for<'a> Fn(&'a C) -> BoxFuture<'a, Result<T, BoxError>> + Send + Sync;

/// Type definitions of a service, fixed or derived from the context of each request.
pub enum TypeDefs<C> {
    Static(String),
    Derived(Arc<DeriveFn<C, String>>),
}

impl<C> TypeDefs<C> {
    /// Type definitions computed from the request context. The function must return the same
    /// definitions for equal contexts.
    pub fn derived<F>(derive: F) -> Self
    where
        F: for<'a> Fn(&'a C) -> BoxFuture<'a, Result<String, BoxError>> + Send + Sync + 'static,
    {
        TypeDefs::Derived(Arc::new(derive))
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, TypeDefs::Derived(_))
    }

    pub(crate) async fn resolve(&self, context: &C) -> Result<Cow<'_, str>> {
        match self {
            TypeDefs::Static(type_defs) => Ok(Cow::Borrowed(type_defs)),
            TypeDefs::Derived(derive) => derive(context).await.map(Cow::Owned).map_err(Error::Derive),
        }
    }
}

impl<C> Clone for TypeDefs<C> {
    fn clone(&self) -> Self {
        match self {
            TypeDefs::Static(type_defs) => TypeDefs::Static(type_defs.clone()),
            TypeDefs::Derived(derive) => TypeDefs::Derived(derive.clone()),
        }
    }
}

impl<C> fmt::Debug for TypeDefs<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDefs::Static(type_defs) => f.debug_tuple("Static").field(type_defs).finish(),
            TypeDefs::Derived(_) => f.write_str("Derived"),
        }
    }
}

impl<C> From<&str> for TypeDefs<C> {
    fn from(type_defs: &str) -> Self {
        TypeDefs::Static(type_defs.to_string())
    }
}

impl<C> From<String> for TypeDefs<C> {
    fn from(type_defs: String) -> Self {
        TypeDefs::Static(type_defs)
    }
}

/// Resolvers of a service, fixed or derived from the context of each request.
pub enum Resolvers<C> {
    Static(ResolverMap),
    Derived(Arc<DeriveFn<C, ResolverMap>>),
}

impl<C> Resolvers<C> {
    pub fn derived<F>(derive: F) -> Self
    where
        F: for<'a> Fn(&'a C) -> BoxFuture<'a, Result<ResolverMap, BoxError>> + Send + Sync + 'static,
    {
        Resolvers::Derived(Arc::new(derive))
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, Resolvers::Derived(_))
    }

    pub(crate) async fn resolve(&self, context: &C) -> Result<Cow<'_, ResolverMap>> {
        match self {
            Resolvers::Static(resolvers) => Ok(Cow::Borrowed(resolvers)),
            Resolvers::Derived(derive) => derive(context).await.map(Cow::Owned).map_err(Error::Derive),
        }
    }
}

impl<C> Clone for Resolvers<C> {
    fn clone(&self) -> Self {
        match self {
            Resolvers::Static(resolvers) => Resolvers::Static(resolvers.clone()),
            Resolvers::Derived(derive) => Resolvers::Derived(derive.clone()),
        }
    }
}

impl<C> fmt::Debug for Resolvers<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolvers::Static(resolvers) => f.debug_tuple("Static").field(resolvers).finish(),
            Resolvers::Derived(_) => f.write_str("Derived"),
        }
    }
}

impl<C> Default for Resolvers<C> {
    fn default() -> Self {
        Resolvers::Static(ResolverMap::default())
    }
}

impl<C> From<ResolverMap> for Resolvers<C> {
    fn from(resolvers: ResolverMap) -> Self {
        Resolvers::Static(resolvers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tenant(&'static str);

    #[tokio::test]
    async fn derived_type_defs_see_the_context() {
        let type_defs = TypeDefs::<Tenant>::derived(|tenant| {
            Box::pin(async move { Ok(format!("type Query {{ {}: Int }}", tenant.0)) })
        });

        assert!(type_defs.is_derived());
        assert_eq!(
            type_defs.resolve(&Tenant("acme")).await.unwrap(),
            "type Query { acme: Int }"
        );
    }

    #[tokio::test]
    async fn derive_failures_are_reported() {
        let resolvers = Resolvers::<Tenant>::derived(|_| Box::pin(async { Err(BoxError::from("no tenant")) }));

        let error = resolvers.resolve(&Tenant::default()).await.unwrap_err();

        assert_eq!(error.to_string(), "deriving schema inputs: no tenant");
    }
}
