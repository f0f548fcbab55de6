#![allow(unused_crate_dependencies)]

use std::sync::{Arc, Mutex};

use async_graphql::extensions::Analyzer;
use axum::Router;
use graphql_microservice::{
    create_service, BoxError, Listening, MicroserviceParams, Ready, ResolverMap, Resolvers, ServerRuntime, StitchingDirectives,
    TypeDefs, DEFAULT_PATH,
};
use indoc::indoc;
use serde_json::json;

const PRODUCTS: &str = indoc! {r#"
    type Product @key(fields: "upc") {
        upc: String!
        name: String
    }

    type Query {
        foo: String
        topProducts: [Product]
    }
"#};

async fn listen<C>(params: MicroserviceParams<C>) -> Listening
where
    C: Default + Send + Sync + 'static,
{
    let mut service = create_service(params).await.unwrap();
    service.start().await.unwrap();

    service
        .apply_middleware(Router::new(), DEFAULT_PATH)
        .unwrap()
        .listen(0)
        .await
        .unwrap()
}

async fn execute(listening: &Listening, headers: &[(&str, &str)], query: &str) -> serde_json::Value {
    let mut request = reqwest::Client::new()
        .post(format!("http://127.0.0.1:{}{DEFAULT_PATH}", listening.port()))
        .json(&json!({ "query": query }));

    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    request.send().await.unwrap().json().await.unwrap()
}

#[tokio::test]
async fn stitched_service_over_http() {
    let directives = StitchingDirectives::default().with_key_directive("stitchingKey");
    let params = MicroserviceParams::<()>::new(PRODUCTS, ResolverMap::new().with_value("Query", "foo", "bar"))
        .with_directives(directives);

    let mut service = create_service(params).await.unwrap();
    let sdl = service.schema().sdl().to_string();
    service.start().await.unwrap();

    let listening = service
        .apply_middleware(Router::new(), DEFAULT_PATH)
        .unwrap()
        .listen(0)
        .await
        .unwrap();

    let response = execute(&listening, &[], "{ foo _sdl }").await;

    assert_eq!(response["data"]["foo"], "bar");
    assert_eq!(response["data"]["_sdl"], sdl);
    assert!(sdl.contains(r#"type Product @stitchingKey(selectionSet: "{ upc }") {"#));
    assert!(sdl.contains("_entities(representations: [_Any!]!): [_Entity]! @merge"));
}

#[tokio::test]
async fn entities_echo_their_representations() {
    let listening = listen(MicroserviceParams::<()>::new(PRODUCTS, ResolverMap::new())).await;

    let response = execute(
        &listening,
        &[],
        indoc! {r#"
            {
                _entities(representations: [
                    { __typename: "Product", upc: "1", name: "Table" }
                    { __typename: "Product", upc: "2" }
                ]) {
                    __typename
                    ... on Product { upc name }
                }
            }
        "#},
    )
    .await;

    insta::assert_json_snapshot!(response, @r###"
    {
      "data": {
        "_entities": [
          {
            "__typename": "Product",
            "upc": "1",
            "name": "Table"
          },
          {
            "__typename": "Product",
            "upc": "2",
            "name": null
          }
        ]
      }
    }
    "###);
}

#[tokio::test]
async fn services_without_keys_have_no_entities_field() {
    let listening = listen(MicroserviceParams::<()>::new(
        "type Query { foo: String }",
        ResolverMap::new().with_value("Query", "foo", "bar"),
    ))
    .await;

    let response = execute(&listening, &[], "{ _entities(representations: []) { __typename } }").await;

    let message = response["errors"][0]["message"].as_str().unwrap();
    assert!(message.starts_with(r#"Unknown field "_entities" on type "Query"."#), "{message}");
}

#[derive(Default)]
struct Tenant(String);

fn tenant_params() -> MicroserviceParams<Tenant> {
    let type_defs = TypeDefs::derived(|tenant: &Tenant| {
        let broken = tenant.0 == "broken";
        Box::pin(async move {
            if broken {
                return Err(BoxError::from("unknown tenant"));
            }

            Ok("type Query { tenant: String fromData: String }".to_string())
        })
    });

    let resolvers = Resolvers::derived(|tenant: &Tenant| {
        let name = tenant.0.clone();
        Box::pin(async move {
            Ok(ResolverMap::new()
                .with_value("Query", "tenant", name)
                .with_sync_resolver("Query", "fromData", |ctx| {
                    Ok(Some(ctx.data::<Tenant>()?.0.clone().into()))
                }))
        })
    });

    MicroserviceParams::new(type_defs, resolvers).with_context(|parts| {
        let tenant = parts
            .headers
            .get("x-tenant")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("anonymous");

        Tenant(tenant.to_string())
    })
}

#[tokio::test]
async fn derived_inputs_follow_the_request_context() {
    let listening = listen(tenant_params()).await;

    let acme = execute(&listening, &[("x-tenant", "acme")], "{ tenant fromData }").await;
    let anonymous = execute(&listening, &[], "{ tenant fromData }").await;

    assert_eq!(acme, json!({ "data": { "tenant": "acme", "fromData": "acme" } }));
    assert_eq!(
        anonymous,
        json!({ "data": { "tenant": "anonymous", "fromData": "anonymous" } })
    );
}

#[tokio::test]
async fn each_request_sees_the_schema_of_its_context() {
    let type_defs = TypeDefs::derived(|tenant: &Tenant| {
        let type_defs = if tenant.0 == "acme" {
            "type Query { tenant: String acmeOnly: String }"
        } else {
            "type Query { tenant: String }"
        };
        Box::pin(async move { Ok(type_defs.to_string()) })
    });

    let resolvers = ResolverMap::new().with_sync_resolver("Query", "tenant", |ctx| {
        Ok(Some(ctx.data::<Tenant>()?.0.clone().into()))
    });

    let params = MicroserviceParams::new(type_defs, resolvers).with_context(|parts| {
        let tenant = parts
            .headers
            .get("x-tenant")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("anonymous");

        Tenant(tenant.to_string())
    });

    let listening = listen(params).await;

    let acme = execute(&listening, &[("x-tenant", "acme")], "{ tenant acmeOnly }").await;
    assert_eq!(acme, json!({ "data": { "tenant": "acme", "acmeOnly": null } }));

    let acme_sdl = execute(&listening, &[("x-tenant", "acme")], "{ _sdl }").await;
    assert!(acme_sdl["data"]["_sdl"].as_str().unwrap().contains("acmeOnly: String"));

    let anonymous = execute(&listening, &[], "{ tenant acmeOnly }").await;
    let message = anonymous["errors"][0]["message"].as_str().unwrap();
    assert!(message.starts_with(r#"Unknown field "acmeOnly" on type "Query"."#), "{message}");

    let anonymous_sdl = execute(&listening, &[], "{ _sdl }").await;
    assert!(!anonymous_sdl["data"]["_sdl"].as_str().unwrap().contains("acmeOnly"));
}

#[tokio::test]
async fn rebuild_failures_are_graphql_errors() {
    let listening = listen(tenant_params()).await;

    let response = execute(&listening, &[("x-tenant", "broken")], "{ tenant }").await;

    assert_eq!(
        response["errors"][0]["message"],
        "deriving schema inputs: unknown tenant"
    );
}

#[tokio::test]
async fn plugins_are_installed() {
    let listening = listen(
        MicroserviceParams::<()>::new(PRODUCTS, ResolverMap::new().with_value("Query", "foo", "bar"))
            .with_plugin(Analyzer),
    )
    .await;

    let response = execute(&listening, &[], "{ foo }").await;

    assert_eq!(response["data"]["foo"], "bar");
    assert_eq!(response["extensions"]["analyzer"]["depth"], 1);
}

#[derive(Clone, Default)]
struct ReadyRecorder(Arc<Mutex<Vec<Ready>>>);

impl ServerRuntime for ReadyRecorder {
    fn on_ready(&self, ready: &Ready) {
        self.0.lock().unwrap().push(ready.clone());
    }
}

#[tokio::test]
async fn ready_is_reported_once_listening() {
    let recorder = ReadyRecorder::default();
    let listening = listen(
        MicroserviceParams::<()>::new(PRODUCTS, ResolverMap::new())
            .with_label("products")
            .with_server_runtime(recorder.clone()),
    )
    .await;

    let ready = recorder.0.lock().unwrap().clone();

    assert_eq!(
        ready,
        vec![Ready {
            label: "products".to_string(),
            port: listening.port(),
            path: "/graphql".to_string(),
            endpoint: format!("localhost:{}/graphql", listening.port()),
        }]
    );
    assert_eq!(listening.endpoint(), ready[0].endpoint);

    listening.shutdown().await.unwrap();
}
