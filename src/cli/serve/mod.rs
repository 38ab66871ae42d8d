//! Local preview server over the output directory.
//!
//! Requests are answered one at a time on the calling thread. Ctrl+C
//! unblocks the server through the handler installed in `main`, after which
//! [`serve`] returns.

mod lifecycle;
mod path;
mod response;

use super::build::build;
use crate::{
    config::{Profile, SiteConfig},
    core::{is_shutdown, register_server},
    debug, log,
    utils::host::Host,
};
use anyhow::{Result, bail};
use std::{path::Path, sync::Arc};
use tiny_http::{Request, Server};

/// Serve the output directory until interrupted.
pub fn serve(config: &SiteConfig) -> Result<()> {
    let root = config.output_dir();
    if !root.is_dir() {
        bail!("{} does not exist; run `blogops build` first", root.display());
    }

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    register_server(Arc::clone(&server));

    log!("serve"; "http://{} (Ctrl+C to stop)", addr);
    run_request_loop(&server, &root);
    Ok(())
}

/// Build with the production settings, then serve.
pub fn reserve(config: &SiteConfig, host: &dyn Host) -> Result<()> {
    build(config, host, Profile::Production)?;
    serve(config)
}

fn run_request_loop(server: &Server, root: &Path) {
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, root) {
            log!("serve"; "request error: {e:#}");
        }
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, root: &Path) -> Result<()> {
    let method = request.method().clone();
    let url = request.url().to_string();

    let status = if is_shutdown() {
        response::respond_unavailable(request)?
    } else if !response::is_get_or_head(&request) {
        response::respond_method_not_allowed(request)?
    } else {
        match path::resolve_path(&url, root) {
            Some(file) => response::respond_file(request, &file)?,
            None => response::respond_not_found(request, root)?,
        }
    };

    debug!("serve"; "{} {} {}", method, url, status);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        fs,
        io::{Read, Write},
        net::{IpAddr, Ipv4Addr, TcpStream},
        thread,
    };
    use tempfile::TempDir;

    /// Send each raw request to a server on a free port; return the raw responses.
    fn exchange(root: &Path, requests: &[String]) -> Vec<String> {
        let (server, addr) =
            lifecycle::bind_with_retry(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        let root = root.to_path_buf();
        let count = requests.len();
        let worker = thread::spawn(move || {
            for request in server.incoming_requests().take(count) {
                handle_request(request, &root).unwrap();
            }
        });

        let responses = requests
            .iter()
            .map(|raw| {
                let mut stream = TcpStream::connect(addr).unwrap();
                stream.write_all(raw.as_bytes()).unwrap();
                let mut response = String::new();
                stream.read_to_string(&mut response).unwrap();
                response
            })
            .collect();

        worker.join().unwrap();
        responses
    }

    fn get(path: &str) -> String {
        format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
    }

    fn output() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("theme/css")).unwrap();
        fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
        fs::write(dir.path().join("theme/css/main.css"), "body{}").unwrap();
        dir
    }

    #[test]
    fn test_serves_index_and_assets() {
        let dir = output();
        let responses = exchange(dir.path(), &[get("/"), get("/theme/css/main.css")]);

        assert!(responses[0].starts_with("HTTP/1.1 200"), "{}", responses[0]);
        assert!(responses[0].contains("text/html"));
        assert!(responses[0].ends_with("<h1>home</h1>"));

        assert!(responses[1].starts_with("HTTP/1.1 200"));
        assert!(responses[1].contains("text/css"));
    }

    #[test]
    fn test_missing_file_is_404() {
        let dir = output();
        let responses = exchange(dir.path(), &[get("/missing.html")]);
        assert!(responses[0].starts_with("HTTP/1.1 404"), "{}", responses[0]);
        assert!(responses[0].ends_with("404 Not Found"));
    }

    #[test]
    fn test_custom_404_page() {
        let dir = output();
        fs::write(dir.path().join("404.html"), "<p>lost</p>").unwrap();
        let responses = exchange(dir.path(), &[get("/missing.html")]);
        assert!(responses[0].starts_with("HTTP/1.1 404"));
        assert!(responses[0].ends_with("<p>lost</p>"));
    }

    #[test]
    fn test_post_is_rejected() {
        let dir = output();
        let post = "POST / HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
        let responses = exchange(dir.path(), &[post.to_string()]);
        assert!(responses[0].starts_with("HTTP/1.1 405"), "{}", responses[0]);
    }

    #[test]
    fn test_serve_requires_output_dir() {
        let dir = TempDir::new().unwrap();
        let config = SiteConfig {
            root: dir.path().to_path_buf(),
            ..Default::default()
        };
        let err = serve(&config).unwrap_err();
        assert!(err.to_string().contains("blogops build"));
    }
}
