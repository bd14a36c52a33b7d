//! Application-facing view of a request.
//!
//! # Responsibilities
//! - Prefix the request path with the configured root path
//! - Describe the request (scheme, server, version) for the application
//! - Attach that description to the request's extensions

use http::header::HOST;
use http::uri::PathAndQuery;
use http::{Method, Request, Uri, Version};

use crate::error::{Error, Result};
use crate::net::ConnectionKey;

/// What the application sees about the request it is handling.
///
/// Inserted into the request extensions before the application is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppScope {
    pub method: Method,
    /// Prefix the application is mounted under, possibly empty.
    pub root_path: String,
    /// Full application-facing path, root path included.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query_string: String,
    pub scheme: String,
    /// Host and port the request was addressed to.
    pub server: (String, u16),
    pub http_version: Version,
}

impl AppScope {
    /// Build the scope for a request arriving on a connection named by `key`.
    pub fn new<B>(request: &Request<B>, key: &ConnectionKey, root_path: &str) -> Self {
        let uri = request.uri();
        let path = format!("{}{}", root_path, uri.path());
        let server = request
            .headers()
            .get(HOST)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| server_from_host(h, key))
            .unwrap_or_else(|| (key.host.clone(), key.port));

        Self {
            method: request.method().clone(),
            root_path: root_path.to_string(),
            path,
            query_string: uri.query().unwrap_or_default().to_string(),
            scheme: key.scheme.clone(),
            server,
            http_version: request.version(),
        }
    }

    /// Path and query as the application's router will see them.
    pub fn path_and_query(&self) -> String {
        if self.query_string.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string)
        }
    }
}

fn server_from_host(host: &str, key: &ConnectionKey) -> Option<(String, u16)> {
    let authority: http::uri::Authority = host.parse().ok()?;
    let port = authority.port_u16().unwrap_or(key.port);
    Some((authority.host().to_string(), port))
}

/// Rewrite a request for the application mounted under `root_path`.
///
/// The URI becomes origin-form `root_path + path [? query]` and the
/// computed `AppScope` is stored in the extensions.
pub fn mount<B>(mut request: Request<B>, key: &ConnectionKey, root_path: &str) -> Result<Request<B>> {
    let scope = AppScope::new(&request, key, root_path);

    let path_and_query = PathAndQuery::try_from(scope.path_and_query())
        .map_err(|e| Error::InvalidRequest(format!("cannot mount under {:?}: {}", root_path, e)))?;
    let uri = Uri::builder()
        .path_and_query(path_and_query)
        .build()?;

    *request.uri_mut() = uri;
    request.extensions_mut().insert(scope);
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> ConnectionKey {
        ConnectionKey::from_uri(&"http://localhost/".parse().unwrap())
    }

    #[test]
    fn root_path_prefixes_request_path() {
        let request = Request::get("/foo?a=1&b=2").body(()).unwrap();
        let mounted = mount(request, &key(), "/api").unwrap();

        assert_eq!(mounted.uri(), "/api/foo?a=1&b=2");
        let scope = mounted.extensions().get::<AppScope>().unwrap();
        assert_eq!(scope.path, "/api/foo");
        assert_eq!(scope.root_path, "/api");
        assert_eq!(scope.query_string, "a=1&b=2");
        assert_eq!(scope.method, Method::GET);
    }

    #[test]
    fn empty_root_path_keeps_path() {
        let request = Request::post("/items").body(()).unwrap();
        let mounted = mount(request, &key(), "").unwrap();

        assert_eq!(mounted.uri(), "/items");
        let scope = mounted.extensions().get::<AppScope>().unwrap();
        assert_eq!(scope.root_path, "");
        assert_eq!(scope.query_string, "");
    }

    #[test]
    fn server_comes_from_host_header() {
        let request = Request::get("/")
            .header(HOST, "example.com:8080")
            .body(())
            .unwrap();
        let scope = AppScope::new(&request, &key(), "");
        assert_eq!(scope.server, ("example.com".to_string(), 8080));
        assert_eq!(scope.scheme, "http");
    }

    #[test]
    fn server_falls_back_to_connection_key() {
        let key = ConnectionKey::from_uri(&"https://api.local/".parse().unwrap());
        let request = Request::get("/").body(()).unwrap();
        let scope = AppScope::new(&request, &key, "");
        assert_eq!(scope.server, ("api.local".to_string(), 443));
        assert_eq!(scope.scheme, "https");
    }

    #[test]
    fn invalid_root_path_is_rejected() {
        let request = Request::get("/foo").body(()).unwrap();
        let err = mount(request, &key(), "/bad path").unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }
}
