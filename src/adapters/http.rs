//! HTTP ingress adapter.
//!
//! ```text
//!   GET /max2 ──▶ route() ──▶ Route::Command(Max2) ──▶ respond() ──▶ submit_command()
//!   GET /mode ──▶ route() ──▶ Route::Mode          ──▶ respond() ──▶ query_mode()
//! ```
//!
//! Routing and response building are pure and run on the host; only
//! [`HttpAdapter`] touches `EspHttpServer`.  The server task never waits
//! for a command to run: it fills the pending slot and answers `200`
//! straight away.

use std::borrow::Cow;

use log::{debug, warn};

use crate::app::commands::ModeCommand;
use crate::app::shared::SharedController;

const INDEX_HTML: &str = include_str!("../../www/index.html");
const SCRIPT_JS: &str = include_str!("../../www/script.js");
const STYLE_CSS: &str = include_str!("../../www/style.css");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Script,
    Stylesheet,
    Command(ModeCommand),
    Mode,
    Status,
    NotFound,
}

/// Map a request path to a route.  Any query string is ignored.
pub fn route(path: &str) -> Route {
    let path = path.split_once('?').map_or(path, |(p, _)| p);
    match path {
        "/" | "/index.html" => Route::Index,
        "/script.js" => Route::Script,
        "/style.css" => Route::Stylesheet,
        "/mode" => Route::Mode,
        "/status" => Route::Status,
        // Commands are only reachable as a single `/token` segment.
        p if p.starts_with('/') => ModeCommand::parse(p).map_or(Route::NotFound, Route::Command),
        _ => Route::NotFound,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Cow<'static, str>,
}

impl Reply {
    fn ok(content_type: &'static str, body: impl Into<Cow<'static, str>>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type),
            body: body.into(),
        }
    }

    fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Cow::Borrowed(""),
        }
    }
}

/// Build the reply for `route`, submitting a command if it names one.
pub fn respond(route: Route, controller: &SharedController, now: u64) -> Reply {
    match route {
        Route::Index => Reply::ok("text/html", INDEX_HTML),
        Route::Script => Reply::ok("text/javascript", SCRIPT_JS),
        Route::Stylesheet => Reply::ok("text/css", STYLE_CSS),
        Route::Command(cmd) => {
            controller.submit_command(cmd);
            debug!("HTTP: queued '{}'", cmd);
            Reply::empty(200)
        }
        Route::Mode => Reply::ok("text/plain", controller.query_mode(now)),
        Route::Status => match serde_json::to_string(&controller.status(now)) {
            Ok(json) => Reply::ok("application/json", json),
            Err(e) => {
                warn!("HTTP: status serialisation failed: {}", e);
                Reply::empty(500)
            }
        },
        Route::NotFound => Reply::empty(404),
    }
}

/// Request methods the server answers.  Routing looks at the path only,
/// so `POST /max1` and `GET /max1` do the same thing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl RequestMethod {
    pub const ALL: [RequestMethod; 2] = [RequestMethod::Get, RequestMethod::Post];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Route and answer one request path.
pub fn handle(path: &str, controller: &SharedController, now: u64) -> Reply {
    let route = route(path);
    if route == Route::NotFound {
        warn!("HTTP 404: {}", path);
    }
    respond(route, controller, now)
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF server
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use server::HttpAdapter;

#[cfg(target_os = "espidf")]
mod server {
    use std::sync::Arc;

    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::server::{Configuration, EspHttpServer};
    use esp_idf_svc::io::Write;
    use log::info;

    use crate::app::ports::ClockPort;
    use crate::app::shared::SharedController;
    use crate::error::{CommsError, Result};

    /// Owns the running server; dropping it stops the server.
    pub struct HttpAdapter {
        _server: EspHttpServer<'static>,
    }

    impl From<super::RequestMethod> for Method {
        fn from(m: super::RequestMethod) -> Self {
            match m {
                super::RequestMethod::Get => Method::Get,
                super::RequestMethod::Post => Method::Post,
            }
        }
    }

    impl HttpAdapter {
        pub fn start<C>(port: u16, controller: Arc<SharedController>, clock: C) -> Result<Self>
        where
            C: ClockPort + Send + Sync + 'static,
        {
            let conf = Configuration {
                http_port: port,
                uri_match_wildcard: true,
                stack_size: 8 * 1024,
                ..Default::default()
            };
            let mut server =
                EspHttpServer::new(&conf).map_err(|_| CommsError::HttpServerFailed)?;

            let clock = Arc::new(clock);
            for method in super::RequestMethod::ALL {
                let controller = Arc::clone(&controller);
                let clock = Arc::clone(&clock);
                server
                    .fn_handler::<anyhow::Error, _>("/*", method.into(), move |req| {
                        let reply = super::handle(req.uri(), &controller, clock.now_secs());
                        let headers: &[(&str, &str)] = match reply.content_type {
                            Some(ct) => &[("Content-Type", ct)],
                            None => &[],
                        };
                        req.into_response(reply.status, None, headers)?
                            .write_all(reply.body.as_bytes())?;
                        Ok(())
                    })
                    .map_err(|_| CommsError::HttpServerFailed)?;
                info!("HTTP: {} /* registered", method.name());
            }

            info!("HTTP: listening on port {}", port);
            Ok(Self { _server: server })
        }
    }
}
