use std::convert::Infallible;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use super::UplinkError;

const BANNER: &str = "Uplink webhook server is running!";

/// Shared slot holding the most recent uplink body.
///
/// Bodies are kept as posted, so fields a network server adds beyond
/// [`UplinkPayload`](super::UplinkPayload) survive the round trip.
#[derive(Debug, Clone, Default)]
pub struct LatestUplink(Arc<RwLock<Option<Value>>>);

impl LatestUplink {
    pub fn get(&self) -> Option<Value> {
        self.0.read().clone()
    }

    pub fn set(&self, payload: Value) {
        *self.0.write() = Some(payload);
    }
}

/// HTTP receiver for device uplinks.
#[derive(Debug)]
pub struct UplinkServer {
    listener: TcpListener,
    latest: LatestUplink,
}

impl UplinkServer {
    /// Bind to `addr` (e.g. "0.0.0.0:3001"; port 0 picks a free port).
    pub async fn bind(addr: &str) -> Result<Self, UplinkError> {
        let addr: SocketAddr = addr.parse()?;
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            latest: LatestUplink::default(),
        })
    }

    /// The address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr, UplinkError> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle to the latest-uplink slot, shared with the server.
    pub fn latest(&self) -> LatestUplink {
        self.latest.clone()
    }

    /// Accept connections until the listener fails.
    pub async fn serve(self) -> Result<(), UplinkError> {
        info!(addr = ?self.listener.local_addr().ok(), "Uplink webhook listening");

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let io = TokioIo::new(stream);
            let latest = self.latest.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let latest = latest.clone();
                    async move { handle_request(req, &latest).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(%peer, error = %e, "Uplink connection error");
                }
            });
        }
    }
}

fn respond(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// Route a single request.
pub async fn handle_request<B>(
    req: Request<B>,
    latest: &LatestUplink,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Display,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match (method, path.as_str()) {
        (Method::POST, "/api/ttn") => {
            let body = match req.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    warn!(error = %e, "Failed to read uplink body");
                    return Ok(respond(StatusCode::BAD_REQUEST, "text/plain", "Bad Request"));
                }
            };

            match serde_json::from_slice::<Value>(&body) {
                Ok(payload) => {
                    let device = payload
                        .pointer("/end_device_ids/device_id")
                        .and_then(Value::as_str)
                        .unwrap_or("unknown");
                    debug!(device, "Received uplink");
                    latest.set(payload);
                    respond(StatusCode::OK, "text/plain", "OK")
                }
                Err(e) => {
                    warn!(error = %e, "Rejected malformed uplink");
                    respond(StatusCode::BAD_REQUEST, "text/plain", format!("Invalid uplink: {}", e))
                }
            }
        }
        (Method::GET, "/api/ttn/latest") => {
            let body = serde_json::to_vec(&latest.get()).unwrap_or_else(|_| b"null".to_vec());
            respond(StatusCode::OK, "application/json", body)
        }
        (Method::GET, "/") => respond(StatusCode::OK, "text/plain", BANNER),
        _ => respond(StatusCode::NOT_FOUND, "text/plain", "Not Found"),
    };

    Ok(response)
}
