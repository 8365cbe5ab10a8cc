//! Preview server: HTTP and WebSocket on one port.

mod gateway;
mod lifecycle;
mod proxy;
mod response;
mod upgrade;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tiny_http::{Request, Server};

use crate::config::{LiveConfig, PreviewConfig};
use crate::content::ContentStore;
use crate::embed::serve::LIVERELOAD_URL;
use crate::reload::{Coordinator, NotificationHub};
use crate::shell::{BrowserShell, WindowShell};
use crate::{debug, log};

/// State shared by every request handler.
pub struct ServeContext {
    store: Arc<ContentStore>,
    hub: Arc<NotificationHub>,
    live: LiveConfig,
    /// Port the page connects its WebSocket to.
    port: u16,
    shutdown: Arc<AtomicBool>,
}

/// Serve `store` until Ctrl+C.
pub fn serve(config: &PreviewConfig, store: Arc<ContentStore>) -> Result<()> {
    let (listener, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let (server, upstream) = lifecycle::bind_upstream()?;
    let server = Arc::new(server);
    let shutdown = Arc::new(AtomicBool::new(false));
    lifecycle::install_shutdown_handler(Arc::downgrade(&server), Arc::clone(&shutdown))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("mdview-watch")
        .enable_time()
        .build()
        .context("failed to start watcher runtime")?;

    let hub = Arc::new(NotificationHub::new());
    let watcher = Coordinator::new(Arc::clone(&store), Arc::clone(&hub), config.live.push)
        .start(&config.watch, runtime.handle())
        .with_context(|| format!("failed to watch {}", store.path().display()))?;

    let ctx = Arc::new(ServeContext {
        store: Arc::clone(&store),
        hub: Arc::clone(&hub),
        live: config.live,
        port: addr.port(),
        shutdown,
    });
    let acceptor = gateway::spawn_acceptor(listener, upstream, Arc::clone(&ctx))?;

    let url = local_url(addr);
    log!("serve"; "{}", url);
    debug!("serve"; "bound {} (http on {}), push mode {:?}", addr, upstream, config.live.push);

    if config.serve.open
        && let Err(e) = BrowserShell.open(&url, &store.title())
    {
        log!("serve"; "could not open viewer: {:#}", e);
    }

    run_request_loop(&server, &ctx)?;

    lifecycle::shutdown(watcher, &hub, acceptor, server);
    Ok(())
}

/// URL printed for port discovery.
fn local_url(addr: SocketAddr) -> String {
    if addr.ip().is_loopback() || addr.ip().is_unspecified() {
        format!("http://localhost:{}", addr.port())
    } else {
        format!("http://{addr}")
    }
}

fn run_request_loop(server: &Server, ctx: &Arc<ServeContext>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .thread_name(|i| format!("mdview-http-{i}"))
        .build()
        .context("failed to create thread pool")?;

    for request in server.incoming_requests() {
        let ctx = Arc::clone(ctx);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &ctx) {
                log!("serve"; "request error: {:#}", e);
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request. Upgrades never get here, the gateway
/// takes them first.
fn handle_request(request: Request, ctx: &ServeContext) -> Result<()> {
    if ctx.shutdown.load(Ordering::SeqCst) {
        return response::respond_unavailable(request);
    }

    debug!("serve"; "{} {}", request.method(), request.url());

    match request_path(request.url()) {
        "/" | "/index.html" => response::respond_page(request, ctx),
        path if path == LIVERELOAD_URL => response::respond_livereload_js(request, ctx.port),
        _ => response::respond_not_found(request),
    }
}

/// Strip query string and fragment.
fn request_path(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}
