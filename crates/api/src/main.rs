// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{convert::Infallible, error::Error, sync::Arc};

use arena_api::{
    auth::{caller_from_headers, client_ip},
    config::Config,
    db,
    graphql::{self, BaseContext, Context, Schema},
    rest,
    store::PgStore,
};
use diesel::Connection;
use hyper::{Method, Response, StatusCode, service::service_fn};
use hyper_util::rt::{TokioExecutor, TokioIo};
use juniper_hyper::{graphiql, playground};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn empty_response(status: StatusCode) -> Response<String> {
    let mut resp = Response::new(String::new());
    *resp.status_mut() = status;
    resp
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Config::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .init();

    let root_node: Arc<Schema> = Arc::new(graphql::schema());

    let signing_key = config.signing_key()?;

    {
        let mut pg_connection = diesel::pg::PgConnection::establish(&config.database_url)?;
        db::run_migrations(&mut pg_connection)?;
    }
    let pool = db::build_pool(&config.database_url).await?;
    let ctx = BaseContext {
        store: Arc::new(PgStore::new(pool)),
        keypair: signing_key,
    };

    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!("Listening on http://{}", config.listen_addr);
    loop {
        let (stream, remote_addr) = listener.accept().await?;

        let io = TokioIo::new(stream);

        let root_node = root_node.clone();
        let ctx = ctx.clone();

        tokio::spawn(async move {
            if let Err(e) = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                .serve_connection(
                    io,
                    service_fn(move |req| {
                        let root_node = root_node.clone();
                        let remote_ip = client_ip(remote_addr.ip(), req.headers());
                        let caller = caller_from_headers(req.headers(), &ctx.keypair.verifying_key());

                        let ctx = Context::new(
                            ctx.clone(),
                            remote_ip,
                            req.headers()
                                .get("user-agent")
                                .and_then(|ua| ua.to_str().ok())
                                .unwrap_or("unknown")
                                .to_string(),
                            caller,
                        );

                        async move {
                            let method = req.method().clone();
                            let path = req.uri().path().to_string();
                            Ok::<_, Infallible>(match (&method, path.as_str()) {
                                (&Method::GET, "/graphql") | (&Method::POST, "/graphql") => {
                                    juniper_hyper::graphql(root_node, Arc::new(ctx), req).await
                                }
                                (&Method::OPTIONS, _) => empty_response(StatusCode::NO_CONTENT),
                                (&Method::GET, "/graphiql") => graphiql("/graphql", None).await,
                                (&Method::GET, "/playground") => playground("/graphql", None).await,
                                _ => {
                                    match rest::dispatch(&ctx, &method, &path, req.into_body()).await {
                                        Some(resp) => resp,
                                        None => empty_response(StatusCode::NOT_FOUND),
                                    }
                                }
                            })
                        }
                    }),
                )
                .await
            {
                tracing::error!("Error serving connection: {e}");
            }
        });
    }
}
