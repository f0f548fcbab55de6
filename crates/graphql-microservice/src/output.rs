use std::sync::Arc;

use async_graphql::{dynamic::FieldValue, Value};

use crate::resolvers::{typename_of, TypeResolverFn};

/// How a resolved value maps onto the declared output type of a field.
///
/// Only lists and abstract types need special handling: the engine reads object fields out of
/// the value, but it needs to be told which object type a union or interface value is.
#[derive(Clone)]
pub(crate) enum OutputShape {
    Plain,
    List(Box<OutputShape>),
    Abstract {
        type_name: String,
        resolver: Option<Arc<TypeResolverFn>>,
    },
}

impl OutputShape {
    pub(crate) fn field_value<'a>(&self, value: Value) -> async_graphql::Result<FieldValue<'a>> {
        match (self, value) {
            (_, Value::Null) => Ok(FieldValue::NULL),
            (OutputShape::List(inner), Value::List(items)) => {
                let items = items
                    .into_iter()
                    .map(|item| inner.field_value(item))
                    .collect::<async_graphql::Result<Vec<_>>>()?;

                Ok(FieldValue::list(items))
            }
            (OutputShape::Abstract { type_name, resolver }, value) => {
                let concrete = match resolver {
                    Some(resolver) => resolver(&value),
                    None => typename_of(&value),
                };

                let Some(concrete) = concrete else {
                    return Err(async_graphql::Error::new(format!(
                        "Abstract type `{type_name}` must resolve to an object type at runtime"
                    )));
                };

                Ok(FieldValue::value(value).with_type(concrete))
            }
            (_, value) => Ok(FieldValue::value(value)),
        }
    }
}

/// The property named after the field on the parent value, if the parent is an object.
pub(crate) fn parent_property(parent: &FieldValue<'_>, field_name: &str) -> Option<Value> {
    match parent.as_value() {
        Some(Value::Object(object)) => object.get(field_name).cloned(),
        _ => None,
    }
}
