use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};
use warp::{Filter, Rejection};

use super::{ErrorBody, error_response, json_response};
use crate::error::{PortscoutError, Result};
use crate::monitoring::log_api_request;
use crate::service::QueryService;

/// Serves the query surface over HTTP
pub struct ApiServer {
    service: Arc<QueryService>,
    bind_address: SocketAddr,
    static_dir: Option<PathBuf>,
}

impl ApiServer {
    pub fn new(service: Arc<QueryService>) -> Self {
        Self {
            service,
            bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            static_dir: None,
        }
    }

    pub fn with_address(mut self, address: SocketAddr) -> Self {
        self.bind_address = address;
        self
    }

    pub fn with_static_dir(mut self, static_dir: Option<PathBuf>) -> Self {
        self.static_dir = static_dir;
        self
    }

    /// Serve until Ctrl-C.
    pub async fn start(&self) -> Result<()> {
        self.start_with_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await
    }

    pub async fn start_with_shutdown(
        &self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let routes = routes(self.service.clone(), self.static_dir.clone());

        let (addr, server) = warp::serve(routes)
            .try_bind_with_graceful_shutdown(self.bind_address, shutdown)
            .map_err(|e| PortscoutError::Server {
                reason: format!("failed to bind {}: {}", self.bind_address, e),
            })?;

        info!("Port query API listening on http://{}", addr);
        server.await;
        info!("Port query API stopped");

        Ok(())
    }
}

fn with_service(
    service: Arc<QueryService>,
) -> impl Filter<Extract = (Arc<QueryService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// The full route tree: endpoints at the root and under `/api`, optional
/// static files, JSON rejections and request logging.
pub fn routes(
    service: Arc<QueryService>,
    static_dir: Option<PathBuf>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let containers = warp::path("containers")
        .or(warp::path("ports"))
        .unify()
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service(service.clone()))
        .and_then(containers_handler);

    let check = warp::path("check")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_service(service.clone()))
        .and_then(check_handler);

    let suggest = warp::path("suggest")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_service(service))
        .and_then(suggest_handler);

    let endpoints = containers.or(check).unify().or(suggest).unify();
    let api = warp::path("api")
        .and(endpoints.clone())
        .or(endpoints)
        .unify()
        .boxed();

    let site = match static_dir {
        Some(dir) => api
            .or(warp::get()
                .and(warp::fs::dir(dir))
                .map(|file: warp::fs::File| file.into_response()))
            .unify()
            .boxed(),
        None => api,
    };

    site.recover(handle_rejection)
        .with(warp::log::custom(|info| {
            log_api_request(
                info.method().as_str(),
                info.path(),
                info.status().as_u16(),
                info.elapsed().as_secs_f64() * 1000.0,
            )
        }))
}

async fn containers_handler(service: Arc<QueryService>) -> Result<Response, Infallible> {
    Ok(match service.list_containers().await {
        Ok(containers) => json_response(&containers, StatusCode::OK),
        Err(e) => error_response(&e),
    })
}

async fn check_handler(
    params: HashMap<String, String>,
    service: Arc<QueryService>,
) -> Result<Response, Infallible> {
    Ok(
        match service.check(params.get("port").map(String::as_str)).await {
            Ok(availability) => json_response(&availability, StatusCode::OK),
            Err(e) => error_response(&e),
        },
    )
}

async fn suggest_handler(
    params: HashMap<String, String>,
    service: Arc<QueryService>,
) -> Result<Response, Infallible> {
    Ok(
        match service.suggest(params.get("start").map(String::as_str)).await {
            Ok(suggestion) => json_response(&suggestion, StatusCode::OK),
            Err(e) => error_response(&e),
        },
    )
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, body) = if err.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            ErrorBody::new("not_found", "not_found", "Not found"),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorBody::new(
                "method_not_allowed",
                "method_not_allowed",
                "Only GET is supported",
            ),
        )
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorBody::new("internal", "internal_error", "Internal server error"),
        )
    };

    Ok(json_response(&body, status))
}
