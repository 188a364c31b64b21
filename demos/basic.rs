//! Minimal torii example — a hyper service with a validated POST endpoint.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice"}'
//!   curl -X POST http://localhost:3000/users -d '{}'
//!   curl -X POST http://localhost:3000/users -d '{not json'

use std::convert::Infallible;

use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use torii::{
    Config, FieldKind, PayloadBody, ReferenceShape, Request, RequestValidationConfig, Response,
    ValidationLayer, validated_payload,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let shape = ReferenceShape::new()
        .field("name", FieldKind::String)
        .optional("nickname", FieldKind::String);

    let layer = ValidationLayer::new(
        Config::builder()
            .request_validation(RequestValidationConfig::builder().reference_shape(shape).build())
            .build(),
    );
    let create_user = layer.wrap(create_user);

    let listener = TcpListener::bind("0.0.0.0:3000").await.expect("bind failed");
    info!("torii demo listening on 0.0.0.0:3000");

    loop {
        let (stream, remote_addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("accept error: {e}");
                continue;
            }
        };

        let handler = create_user.clone();
        tokio::spawn(async move {
            let svc = service_fn(move |req: hyper::Request<Incoming>| {
                let handler = handler.clone();
                async move {
                    Ok::<_, Infallible>(handler.handle(req.map(PayloadBody::incoming)).await)
                }
            });

            if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(stream), svc)
                .await
            {
                error!(peer = %remote_addr, "connection error: {e}");
            }
        });
    }
}

// POST /users — only ever sees bodies that passed validation.
async fn create_user(req: Request) -> Response {
    // The exact bytes the schema evaluated, no second body read.
    let payload = validated_payload(&req).unwrap_or_default();
    info!(bytes = payload.len(), "creating user");

    let mut response = http::Response::new(Full::new(payload));
    *response.status_mut() = http::StatusCode::CREATED;
    response
        .headers_mut()
        .insert("content-type", http::HeaderValue::from_static("application/json"));
    response
}
