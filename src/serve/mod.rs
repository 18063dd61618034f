//! Static file server for the rendered output directory.

mod listing;
mod path;
mod response;

use crate::config::Config;
use crate::log;
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tiny_http::{Request, Server};

/// Bound server ready to accept requests.
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

/// Bind the HTTP server.
///
/// A bind failure is startup-fatal: the address is part of the tool's
/// contract, so there is no port fallback.
pub fn bind(config: &Config) -> Result<BoundServer> {
    let addr = config.bind_addr();
    let server =
        Server::http(addr).map_err(|e| anyhow::anyhow!("failed to bind {}: {}", addr, e))?;

    // Port 0 binds an ephemeral port; report the address actually bound
    let addr = server.server_addr().to_ip().unwrap_or(addr);
    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server: Arc::new(server),
        addr,
    })
}

impl BoundServer {
    /// Get the bound address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Server handle for shutdown registration (`unblock()`).
    pub fn handle(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }

    /// Accept loop (blocking). Returns once the server is unblocked by the
    /// shutdown handler. Requests are served sequentially; a failed request
    /// is logged and does not stop the loop.
    pub fn run(self, config: &Config) {
        for request in self.server.incoming_requests() {
            if crate::state::is_shutdown() {
                return;
            }
            if let Err(e) = handle_request(request, config) {
                log!("serve"; "request error: {e:#}");
            }
        }
    }
}

/// Handle a single HTTP request against the output directory.
fn handle_request(request: Request, config: &Config) -> Result<()> {
    let root = config.output_dir();

    match path::resolve(request.url(), &root) {
        Some(path::Resolved::File(file)) => response::respond_file(request, &file),
        Some(path::Resolved::Directory(dir)) => match listing::render(&dir, request.url()) {
            Ok(body) => response::respond_html(request, body),
            // A listing that cannot be read answers 404, not 500
            Err(_) => response::respond_not_found(request, "No permission to list directory"),
        },
        None => response::respond_not_found(request, "404 Not Found"),
    }
}
