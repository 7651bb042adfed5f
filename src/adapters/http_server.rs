//! Status and metrics HTTP server.
//!
//! | Route           | Body                                   |
//! |-----------------|----------------------------------------|
//! | `/sensor_state` | latest [`StatusSnapshot`] as JSON      |
//! | `/metrics`      | Prometheus text exposition             |
//! | `/health`       | `{"status":"ok","uptimeSecs":n}`       |
//!
//! Handlers only read the [`StatusBoard`] and the atomic [`Metrics`]; they
//! never touch the duty loop.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspHttpServer` with `fn_handler` routes.
//! - **all other targets**: logs the routes; bodies are still testable.
//!
//! [`StatusSnapshot`]: crate::status::StatusSnapshot

use std::sync::Arc;
use std::time::Instant;

use log::info;
use serde::Serialize;

use crate::metrics::Metrics;
use crate::status::StatusBoard;

pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
pub const CONTENT_TYPE_PROMETHEUS: &str = "text/plain; version=0.0.4";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: &'static str,
    uptime_secs: u64,
}

/// Shared state behind the routes.  Cheap to clone into each handler.
#[derive(Clone)]
pub struct HttpApi {
    status: StatusBoard,
    metrics: Arc<Metrics>,
    started: Instant,
}

impl HttpApi {
    pub fn new(status: StatusBoard, metrics: Arc<Metrics>) -> Self {
        Self {
            status,
            metrics,
            started: Instant::now(),
        }
    }

    pub fn sensor_state_body(&self) -> serde_json::Result<Vec<u8>> {
        self.status.read().to_json()
    }

    pub fn metrics_body(&self) -> String {
        self.metrics.export()
    }

    pub fn health_body(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&Health {
            status: "ok",
            uptime_secs: self.started.elapsed().as_secs(),
        })
    }
}

#[cfg(target_os = "espidf")]
pub fn start(api: HttpApi, port: u16) -> anyhow::Result<esp_idf_svc::http::server::EspHttpServer<'static>> {
    use embedded_svc::http::Method;
    use embedded_svc::io::Write;
    use esp_idf_svc::http::server::{Configuration as HttpConfiguration, EspHttpServer};

    let conf = HttpConfiguration {
        http_port: port,
        stack_size: 10 * 1024,
        ..Default::default()
    };
    let mut server = EspHttpServer::new(&conf)?;

    let a = api.clone();
    server.fn_handler::<anyhow::Error, _>("/sensor_state", Method::Get, move |req| {
        let body = a.sensor_state_body()?;
        req.into_response(200, Some("OK"), &[("Content-Type", CONTENT_TYPE_JSON)])?
            .write_all(&body)?;
        Ok(())
    })?;

    let a = api.clone();
    server.fn_handler::<anyhow::Error, _>("/metrics", Method::Get, move |req| {
        let body = a.metrics_body();
        req.into_response(200, Some("OK"), &[("Content-Type", CONTENT_TYPE_PROMETHEUS)])?
            .write_all(body.as_bytes())?;
        Ok(())
    })?;

    server.fn_handler::<anyhow::Error, _>("/health", Method::Get, move |req| {
        let body = api.health_body()?;
        req.into_response(200, Some("OK"), &[("Content-Type", CONTENT_TYPE_JSON)])?
            .write_all(&body)?;
        Ok(())
    })?;

    info!("HTTP: listening on port {}", port);
    Ok(server)
}

/// Simulation: no listener, the routes are only logged.
#[cfg(not(target_os = "espidf"))]
pub fn start(api: HttpApi, port: u16) -> anyhow::Result<HttpApi> {
    info!("HTTP(sim): /sensor_state /metrics /health on port {}", port);
    Ok(api)
}
