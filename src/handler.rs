//! Maps requests onto files under the document root.
//!
//! Every outcome is a status code: 405 for methods other than GET and HEAD,
//! 404 for paths escaping the root or files that cannot be read, 403 for
//! directories without an index document and 200 otherwise.

use std::convert::Infallible;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::task::{Context, Poll};

use futures::future::{self, Ready};
use log::debug;

use crate::config::ServerConfig;
use crate::http::{Method, Request, Response, StatusCode, mime};
use crate::service::Service;

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    index: String,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>, index: impl Into<String>) -> Self {
        let root = root.into();
        let root = std::path::absolute(&root).unwrap_or(root);

        StaticFiles {
            root: normalize(&root),
            index: index.into(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.root.clone(), config.index.clone())
    }

    pub fn handle(&self, request: &Request) -> Response {
        match request.method {
            Method::Get | Method::Head => self.serve(request),
            _ => Response::new(StatusCode::MethodNotAllowed),
        }
    }

    fn serve(&self, request: &Request) -> Response {
        let mut response = Response::default();

        let Some(candidate) = self.resolve(&request.path) else {
            debug!("{:?} escapes the document root", request.path);
            return response;
        };

        let index = candidate.join(&self.index);
        let target = if index.is_file() {
            index
        } else if candidate.is_dir() {
            response.status_code = StatusCode::Forbidden;
            return response;
        } else {
            candidate
        };

        match fs::read(&target) {
            Ok(contents) => {
                response.content_length = contents.len();
                response.set_content_type(mime::content_type(&target));
                if request.method == Method::Get {
                    response.body = contents;
                }
                response.status_code = StatusCode::OK;
            }
            Err(e) => debug!("cannot read {}: {}", target.display(), e),
        }

        response
    }

    /// Joins a decoded request path onto the root and normalizes it.
    ///
    /// Returns `None` unless the result is the root itself or lies under it,
    /// compared component by component so `/srv/www-old` is not inside
    /// `/srv/www`.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut joined = self.root.clone().into_os_string();
        joined.push("/");
        joined.push(path);

        let candidate = normalize(Path::new(&joined));
        candidate.starts_with(&self.root).then_some(candidate)
    }
}

impl Service for StaticFiles {
    type Response = Response;
    type Error = Infallible;
    type Future = Ready<Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        future::ready(Ok(self.handle(&request)))
    }
}

/// Lexically collapses `.`, `..` and repeated separators without touching the
/// filesystem. `..` never climbs above the root component.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_executor::block_on;

    use super::*;
    use crate::http::parse;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            static COUNTER: AtomicUsize = AtomicUsize::new(0);
            let path = std::env::temp_dir().join(format!(
                "httpd-handler-{}-{}",
                std::process::id(),
                COUNTER.fetch_add(1, Ordering::SeqCst)
            ));
            fs::create_dir_all(&path).unwrap();
            TempDir(path.canonicalize().unwrap())
        }

        fn write(&self, relative: &str, contents: &[u8]) {
            let path = self.0.join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn request(method: &str, target: &str) -> Request {
        parse(format!("{method} {target} HTTP/1.1\r\nHost: test\r\n\r\n").as_bytes()).unwrap()
    }

    /// Fixture layout: `<tmp>/site` is the root, `<tmp>/secret.txt` and
    /// `<tmp>/site-private/key.txt` sit next to it.
    fn site() -> (TempDir, StaticFiles) {
        let dir = TempDir::new();
        dir.write("site/index.html", b"<h1>home</h1>");
        dir.write("site/css/app.css", b"body { color: red }");
        dir.write("site/img/logo.PNG", &[0x89, b'P', b'N', b'G', 0, 0xff, 0x10]);
        dir.write("site/docs/guide/index.html", b"guide");
        dir.write("site/empty/.keep", b"");
        dir.write("site/notes.txt", b"plain");
        dir.write("secret.txt", b"top secret");
        dir.write("site-private/key.txt", b"private key");

        let files = StaticFiles::new(dir.0.join("site"), "index.html");
        (dir, files)
    }

    #[test]
    fn test_get_file_returns_exact_bytes() {
        let (_dir, files) = site();
        let response = files.handle(&request("GET", "/img/logo.PNG"));

        assert_eq!(response.status_code, StatusCode::OK);
        assert_eq!(response.body, vec![0x89, b'P', b'N', b'G', 0, 0xff, 0x10]);
        assert_eq!(response.content_length, 7);
        assert_eq!(response.content_type, "image/png");
    }

    #[test]
    fn test_head_keeps_length_drops_body() {
        let (_dir, files) = site();
        let get = files.handle(&request("GET", "/css/app.css"));
        let head = files.handle(&request("HEAD", "/css/app.css"));

        assert_eq!(head.status_code, StatusCode::OK);
        assert!(head.body.is_empty());
        assert_eq!(head.content_length, get.body.len());
        assert_eq!(head.content_type, "text/css");
    }

    #[test]
    fn test_root_serves_index() {
        let (_dir, files) = site();
        let response = files.handle(&request("GET", "/"));

        assert_eq!(response.status_code, StatusCode::OK);
        assert_eq!(response.body, b"<h1>home</h1>".to_vec());
        assert_eq!(response.content_length, 13);
        assert_eq!(response.content_type, "text/html");
    }

    #[test]
    fn test_nested_directory_serves_index_with_or_without_slash() {
        let (_dir, files) = site();

        for target in ["/docs/guide", "/docs/guide/", "/docs/./guide//"] {
            let response = files.handle(&request("GET", target));
            assert_eq!(response.status_code, StatusCode::OK, "{target}");
            assert_eq!(response.body, b"guide".to_vec(), "{target}");
        }
    }

    #[test]
    fn test_directory_without_index_is_forbidden() {
        let (_dir, files) = site();

        for target in ["/empty", "/docs/"] {
            let response = files.handle(&request("GET", target));
            assert_eq!(response.status_code, StatusCode::Forbidden, "{target}");
            assert!(response.body.is_empty());
        }
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let (_dir, files) = site();
        let response = files.handle(&request("GET", "/nope.html"));

        assert_eq!(response.status_code, StatusCode::NotFound);
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_unknown_extension_has_empty_content_type() {
        let (_dir, files) = site();
        let response = files.handle(&request("GET", "/notes.txt"));

        assert_eq!(response.status_code, StatusCode::OK);
        assert_eq!(response.content_type, "");
        assert_eq!(response.body, b"plain".to_vec());
    }

    #[test]
    fn test_other_methods_not_allowed() {
        let (_dir, files) = site();

        for method in ["POST", "PUT", "DELETE", "OPTIONS", "BREW"] {
            for target in ["/", "/css/app.css", "/nope"] {
                let response = files.handle(&request(method, target));
                assert_eq!(response.status_code, StatusCode::MethodNotAllowed);
                assert!(response.body.is_empty());
            }
        }
    }

    #[test]
    fn test_encoded_traversal_is_not_found() {
        let (_dir, files) = site();

        for target in ["/..%2Fsecret.txt", "/css/..%2F..%2Fsecret.txt", "/%2E%2E%2Fsecret.txt"] {
            let response = files.handle(&request("GET", target));
            assert_eq!(response.status_code, StatusCode::NotFound, "{target}");
            assert!(response.body.is_empty());
        }
    }

    #[test]
    fn test_dot_segments_above_root_are_not_found() {
        let (dir, files) = site();
        dir.write("index.html", b"outside");

        for target in ["/../index.html", "/%2e%2e/index.html", "/css/../../index.html"] {
            let req = request("GET", target);
            assert!(req.path.contains(".."), "{target} was collapsed to {}", req.path);

            let response = files.handle(&req);
            assert_eq!(response.status_code, StatusCode::NotFound, "{target}");
            assert!(response.body.is_empty());
        }
    }

    #[test]
    fn test_dot_segments_inside_root_still_resolve() {
        let (_dir, files) = site();
        let response = files.handle(&request("GET", "/img/../css/./app.css"));

        assert_eq!(response.status_code, StatusCode::OK);
        assert_eq!(response.body, b"body { color: red }".to_vec());
    }

    #[test]
    fn test_sibling_directory_with_shared_prefix_is_not_found() {
        let (_dir, files) = site();
        let mut req = request("GET", "/");
        req.path = "/../site-private/key.txt".to_string();

        let response = files.handle(&req);
        assert_eq!(response.status_code, StatusCode::NotFound);
        assert!(response.body.is_empty());
    }

    #[test]
    fn test_resolve_normalizes_inside_root() {
        let (dir, files) = site();
        let root = dir.0.join("site");

        assert_eq!(files.resolve("/a/../b/./c"), Some(root.join("b/c")));
        assert_eq!(files.resolve("//css///app.css"), Some(root.join("css/app.css")));
        assert_eq!(files.resolve("/"), Some(root.clone()));
        assert_eq!(files.resolve("/css/.."), Some(root));
    }

    #[test]
    fn test_resolve_rejects_escape() {
        let (_dir, files) = site();

        assert_eq!(files.resolve("/.."), None);
        assert_eq!(files.resolve("/../../../../etc/passwd"), None);
        assert_eq!(files.resolve("/css/../../secret.txt"), None);
    }

    #[test]
    fn test_normalize_does_not_climb_above_root() {
        assert_eq!(normalize(Path::new("/../../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_service_call_matches_handle() {
        let (_dir, mut files) = site();
        let response = block_on(files.call(request("GET", "/css/app.css"))).unwrap();

        assert_eq!(response.status_code, StatusCode::OK);
        assert_eq!(response.body, b"body { color: red }".to_vec());
    }
}
