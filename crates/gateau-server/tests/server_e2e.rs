//! End-to-end tests: configuration, application, plugins, events, pipeline,
//! controllers and emitter together.

use gateau_config::ConfigLoader;
use gateau_controller::{ActionResult, Controller, ControllerFactory, ControllerState};
use gateau_core::{
    build_request, read_body, GateauResult, Request, RequestExt, Response, ResponseExt, RouteParams,
};
use gateau_middleware::{BoxFuture, MiddlewareContext, MiddlewareQueue, MiddlewareRegistry, MiddlewareUnit};
use gateau_server::{EventManager, Plugin, ResponseEmitter, Server, WebApplication};
use http::header::HeaderValue;
use http::StatusCode;

struct PostsController {
    state: ControllerState,
}

impl Controller for PostsController {
    fn state(&self) -> &ControllerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ControllerState {
        &mut self.state
    }

    fn invoke_action<'a>(
        &'a mut self,
        _ctx: &'a mut MiddlewareContext,
    ) -> BoxFuture<'a, GateauResult<ActionResult>> {
        Box::pin(async move {
            let action = self.state.action().to_string();
            match action.as_str() {
                "index" => {
                    let ext = self.state.params().and_then(|p| p.ext.clone());
                    self.state.set("posts", ["first", "second"])?;
                    self.state.set("ext", ext)?;
                    Ok(ActionResult::Nothing)
                }
                "view" => {
                    let id = self.state.pass().first().cloned().unwrap_or_default();
                    Response::text(StatusCode::OK, format!("post {id}")).map(ActionResult::from)
                }
                _ => Err(self.state.missing_action()),
            }
        })
    }
}

/// Adds an `x-powered-by` header on the way out.
struct PoweredBy;

impl Plugin for PoweredBy {
    fn name(&self) -> &str {
        "PoweredBy"
    }

    fn middleware(&self, mut queue: MiddlewareQueue) -> GateauResult<MiddlewareQueue> {
        queue.add(MiddlewareUnit::closure("powered_by", |ctx, req, next| {
            Box::pin(async move {
                let mut response = next.run(ctx, req).await?;
                response
                    .headers_mut()
                    .insert("x-powered-by", HeaderValue::from_static("gateau"));
                Ok(response)
            })
        }));
        Ok(queue)
    }
}

fn routed(path: &str, params: RouteParams) -> Request {
    build_request("GET", path).unwrap().with_route_params(params)
}

fn app() -> WebApplication {
    let config = ConfigLoader::new()
        .with_defaults()
        .with_string(
            r#"
                [app]
                name = "blog"
                default_extension = "json"
            "#,
            "toml",
        )
        .unwrap()
        .load()
        .unwrap();

    let mut controllers = ControllerFactory::new();
    controllers.register("Posts", |state| PostsController { state });

    WebApplication::builder()
        .config(config)
        .controllers(controllers)
        .plugin(PoweredBy)
        .build()
}

#[tokio::test]
async fn auto_rendered_action_through_full_stack() {
    let mut server = Server::new(app());
    let response = server
        .run(Some(routed("/posts", RouteParams::new("Posts", "index"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-powered-by"], "gateau");
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = serde_json::from_slice(&read_body(response.into_body()).await).unwrap();
    assert_eq!(body["posts"][1], "second");
    assert_eq!(body["ext"], "json");
    assert!(server.app().is_bootstrapped());
}

#[tokio::test]
async fn passed_arguments_reach_the_action() {
    let mut server = Server::new(app());
    let response = server
        .run(Some(routed("/posts/view/7", RouteParams::new("Posts", "view").with_pass(["7"]))))
        .await
        .unwrap();

    assert_eq!(read_body(response.into_body()).await, "post 7");
}

#[tokio::test]
async fn missing_action_rendered_as_404_envelope() {
    let mut server = Server::new(app());
    let response = server
        .run(Some(routed("/posts/delete", RouteParams::new("Posts", "delete"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_slice(&read_body(response.into_body()).await).unwrap();
    assert_eq!(body["error"]["code"], "MISSING_ACTION");
}

#[tokio::test]
async fn event_listener_can_resolve_named_middleware() {
    let mut registry = MiddlewareRegistry::new();
    registry.register("MaintenanceMiddleware", || {
        gateau_middleware::ClosureMiddleware::new("maintenance", |_ctx, _req, _next| {
            Box::pin(async { Response::text(StatusCode::SERVICE_UNAVAILABLE, "down for maintenance") })
        })
    });

    let mut controllers = ControllerFactory::new();
    controllers.register("Posts", |state| PostsController { state });
    let app = WebApplication::builder()
        .controllers(controllers)
        .registry(registry)
        .build();

    let events = EventManager::new().on_build_middleware("maintenance", |queue| {
        queue.insert_before("request_id", "Maintenance")?;
        Ok(())
    });

    let mut server = Server::new(app).with_events(events);
    let response = server
        .run(Some(routed("/posts", RouteParams::new("Posts", "index"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(!response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn response_is_emitted_with_configured_protocol() {
    let mut server = Server::new(app());
    let config = ConfigLoader::new()
        .with_string("[emitter]\nprotocol = \"HTTP/1.0\"\nmax_buffer_length = 3\n", "toml")
        .unwrap()
        .load()
        .unwrap();
    let mut emitter = ResponseEmitter::from_config(Vec::new(), &config.emitter);

    server
        .run_and_emit(
            Some(routed("/posts/view/42", RouteParams::new("Posts", "view").with_pass(["42"]))),
            &mut emitter,
        )
        .await
        .unwrap();

    let written = String::from_utf8(emitter.into_inner()).unwrap();
    assert!(written.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(written.contains("x-powered-by: gateau\r\n"));
    assert!(written.ends_with("\r\n\r\npost 42"));
}
