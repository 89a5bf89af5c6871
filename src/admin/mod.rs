//! Admin server for the dev loop.
//!
//! Serves the dev dist as a static site and exposes a small JSON API for
//! editing feature and global configuration from a browser. Config
//! writes trigger background dev rebuilds.

mod api;
mod response;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use tiny_http::{Request, Server};

use crate::config::{BuildMode, Paths};
use crate::log;

pub const DEFAULT_PORT: u16 = 3000;

const MAX_PORT_RETRIES: u16 = 10;

/// Bind and run the admin server. Blocks for the life of the process.
pub fn serve(root: &std::path::Path, port: u16) -> Result<()> {
    let paths = Paths::new(root, BuildMode::Dev);
    let (server, addr) = bind_with_retry(port)?;

    log!("admin"; "serving {} at http://{addr}/", paths.dist.display());
    log!("admin"; "api at http://{addr}/api/features");

    let rebuild_lock = Arc::new(Mutex::new(()));
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &paths, &rebuild_lock) {
            log!("admin"; "request error: {e:#}");
        }
    }
    Ok(())
}

/// Bind to localhost, walking up from the base port when it is taken.
fn bind_with_retry(base_port: u16) -> Result<(Server, SocketAddr)> {
    let interface = IpAddr::V4(Ipv4Addr::LOCALHOST);
    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("admin"; "port {base_port} in use, using {port} instead");
                }
                return Ok((server, addr));
            }
            Err(_) if offset + 1 < MAX_PORT_RETRIES => continue,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to bind after {MAX_PORT_RETRIES} attempts (ports {base_port}-{port}): {e}"
                ));
            }
        }
    }
    unreachable!()
}

fn handle_request(request: Request, paths: &Paths, rebuild_lock: &Arc<Mutex<()>>) -> Result<()> {
    let url = request.url().to_string();

    if url.starts_with("/api/") || url == "/api" {
        return api::handle(request, paths, rebuild_lock);
    }

    if let Some(path) = response::resolve_path(&url, &paths.dist) {
        return response::respond_file(request, &path);
    }

    // Extension-less misses fall back to the root page for client-side
    // routing; asset misses are honest 404s.
    if !response::has_extension(&url) {
        let index = paths.dist.join("index.html");
        if index.is_file() {
            return response::respond_file(request, &index);
        }
    }

    response::respond_not_found(request)
}
