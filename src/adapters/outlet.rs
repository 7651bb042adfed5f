//! Smart-outlet adapter.
//!
//! The duty loop never talks HTTP itself.  It drops [`OutletState`]
//! requests into [`OUTLET_CHANNEL`]; a dedicated worker thread drains the
//! channel and performs one JSON `POST` per request.  Outcomes are logged
//! and failures counted; nothing is retried.
//!
//! ```text
//!  duty loop ──try_send──▶ OUTLET_CHANNEL ──receive──▶ OutletWorker ──POST──▶ outlet
//! ```
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection` behind `embedded_svc`'s
//!   blocking HTTP client, with the IDF certificate bundle for HTTPS.
//! - **all other targets**: a simulation client that logs and succeeds.

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{error, info, warn};
use serde::Serialize;

use crate::app::ports::OutletState;
use crate::config::OutletConfig;
use crate::error::OutletError;
use crate::metrics::Metrics;

// ───────────────────────────────────────────────────────────────
// Channel
// ───────────────────────────────────────────────────────────────

/// Pending outlet requests.  A burst deeper than this is dropped with a
/// warning.
pub const OUTLET_QUEUE_DEPTH: usize = 4;

pub type OutletChannel = Channel<CriticalSectionRawMutex, OutletState, OUTLET_QUEUE_DEPTH>;

/// Duty loop → outlet worker.
pub static OUTLET_CHANNEL: OutletChannel = Channel::new();

/// Queue `state` for the worker without blocking.
pub fn enqueue(channel: &OutletChannel, state: OutletState) {
    if channel.try_send(state).is_err() {
        warn!("OUTLET: request queue full, dropping '{}'", state.as_str());
    }
}

// ───────────────────────────────────────────────────────────────
// Request body
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PowerRequest<'a> {
    api_key: &'a str,
    device: &'a str,
    power_state: &'static str,
}

/// JSON body of one outlet request.
pub fn request_body(config: &OutletConfig, state: OutletState) -> Result<Vec<u8>, OutletError> {
    serde_json::to_vec(&PowerRequest {
        api_key: &config.api_key,
        device: &config.device,
        power_state: state.as_str(),
    })
    .map_err(|_| OutletError::Encode)
}

// ───────────────────────────────────────────────────────────────
// Client
// ───────────────────────────────────────────────────────────────

/// One blocking request to the outlet.  Returns the response body on 2xx.
pub trait OutletClient {
    fn set_outlet_state(&mut self, state: OutletState) -> Result<String, OutletError>;
}

pub struct HttpOutletClient {
    config: OutletConfig,
}

impl HttpOutletClient {
    pub fn new(config: OutletConfig) -> Self {
        if !config.is_complete() {
            warn!("OUTLET: endpoint incomplete, requests will fail until configured");
        }
        Self { config }
    }
}

#[cfg(target_os = "espidf")]
const REQUEST_TIMEOUT: core::time::Duration = core::time::Duration::from_secs(15);

#[cfg(target_os = "espidf")]
const MAX_RESPONSE_BYTES: usize = 512;

#[cfg(target_os = "espidf")]
impl OutletClient for HttpOutletClient {
    fn set_outlet_state(&mut self, state: OutletState) -> Result<String, OutletError> {
        use embedded_svc::http::{Method, Status};
        use embedded_svc::http::client::Client as HttpClient;
        use embedded_svc::io::{Read, Write};
        use esp_idf_svc::http::client::{Configuration as HttpClientConfiguration, EspHttpConnection};

        if !self.config.is_complete() {
            return Err(OutletError::NotConfigured);
        }
        let body = request_body(&self.config, state)?;

        let conf = HttpClientConfiguration {
            timeout: Some(REQUEST_TIMEOUT),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&conf).map_err(|_| OutletError::Transport)?;
        let mut client = HttpClient::wrap(conn);

        let content_len = body.len().to_string();
        let headers = [
            ("Content-Type", "application/json"),
            ("Content-Length", content_len.as_str()),
        ];
        let mut request = client
            .request(Method::Post, &self.config.url, &headers)
            .map_err(|_| OutletError::Transport)?;
        request.write_all(&body).map_err(|_| OutletError::Transport)?;
        request.flush().map_err(|_| OutletError::Transport)?;
        let mut response = request.submit().map_err(|_| OutletError::Transport)?;

        let status = response.status();
        let mut buf = [0u8; MAX_RESPONSE_BYTES];
        let mut len = 0;
        while len < buf.len() {
            match response.read(&mut buf[len..]) {
                Ok(0) | Err(_) => break,
                Ok(n) => len += n,
            }
        }
        let text = String::from_utf8_lossy(&buf[..len]).into_owned();

        if (200..300).contains(&status) {
            Ok(text)
        } else {
            Err(OutletError::HttpStatus(status))
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl OutletClient for HttpOutletClient {
    fn set_outlet_state(&mut self, state: OutletState) -> Result<String, OutletError> {
        if !self.config.is_complete() {
            return Err(OutletError::NotConfigured);
        }
        let body = request_body(&self.config, state)?;
        info!(
            "OUTLET(sim): POST {} {}",
            self.config.url,
            String::from_utf8_lossy(&body)
        );
        Ok(String::from("{\"sim\":true}"))
    }
}

// ───────────────────────────────────────────────────────────────
// Worker
// ───────────────────────────────────────────────────────────────

pub struct OutletWorker<C: OutletClient> {
    client: C,
    channel: &'static OutletChannel,
    metrics: Arc<Metrics>,
}

impl<C: OutletClient> OutletWorker<C> {
    pub fn new(client: C, channel: &'static OutletChannel, metrics: Arc<Metrics>) -> Self {
        Self {
            client,
            channel,
            metrics,
        }
    }

    /// Perform one request and log the outcome.
    pub fn handle(&mut self, state: OutletState) -> Result<(), OutletError> {
        match self.client.set_outlet_state(state) {
            Ok(body) => {
                info!("OUTLET: set '{}' ok: {}", state.as_str(), body);
                Ok(())
            }
            Err(e) => {
                self.metrics.outlet_request_failures.inc();
                error!("OUTLET: set '{}' failed: {}", state.as_str(), e);
                Err(e)
            }
        }
    }

    /// Handle every request already queued.  Returns how many were handled.
    pub fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(state) = self.channel.try_receive() {
            let _ = self.handle(state);
            handled += 1;
        }
        handled
    }

    /// Worker thread body.  Blocks on the channel forever.
    pub fn run(mut self) -> ! {
        info!("OUTLET: worker started");
        loop {
            let state = futures_lite::future::block_on(self.channel.receive());
            let _ = self.handle(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedClient {
        results: Vec<Result<String, OutletError>>,
        seen: Vec<OutletState>,
    }

    impl OutletClient for ScriptedClient {
        fn set_outlet_state(&mut self, state: OutletState) -> Result<String, OutletError> {
            self.seen.push(state);
            self.results.remove(0)
        }
    }

    fn complete_config() -> OutletConfig {
        OutletConfig {
            url: "http://outlet.local/api/power".into(),
            api_key: "secret".into(),
            device: "freezer".into(),
        }
    }

    #[test]
    fn body_has_wire_field_names() {
        let body = request_body(&complete_config(), OutletState::Off).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["apiKey"], "secret");
        assert_eq!(v["device"], "freezer");
        assert_eq!(v["powerState"], "off");
    }

    #[test]
    fn incomplete_config_fails_at_call_time() {
        let mut client = HttpOutletClient::new(OutletConfig::default());
        assert_eq!(
            client.set_outlet_state(OutletState::On),
            Err(OutletError::NotConfigured)
        );
    }

    #[test]
    fn sim_client_succeeds_when_configured() {
        let mut client = HttpOutletClient::new(complete_config());
        assert!(client.set_outlet_state(OutletState::On).is_ok());
    }

    #[test]
    fn failures_are_counted_not_retried() {
        static CHANNEL: OutletChannel = Channel::new();
        let metrics = Arc::new(Metrics::new());
        let client = ScriptedClient {
            results: vec![Err(OutletError::HttpStatus(500)), Ok("{}".into())],
            seen: Vec::new(),
        };
        let mut worker = OutletWorker::new(client, &CHANNEL, Arc::clone(&metrics));

        enqueue(&CHANNEL, OutletState::Off);
        enqueue(&CHANNEL, OutletState::On);
        assert_eq!(worker.drain(), 2);

        assert_eq!(worker.client.seen, vec![OutletState::Off, OutletState::On]);
        assert_eq!(metrics.outlet_request_failures.get(), 1);
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        static CHANNEL: OutletChannel = Channel::new();
        for _ in 0..(OUTLET_QUEUE_DEPTH + 3) {
            enqueue(&CHANNEL, OutletState::Off);
        }
        assert_eq!(CHANNEL.len(), OUTLET_QUEUE_DEPTH);
    }
}
