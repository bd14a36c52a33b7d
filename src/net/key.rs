//! Connection keys and request heads.

use http::{Method, Uri};

/// Host used when a request URI carries no authority.
pub const DEFAULT_HOST: &str = "localhost";

/// Identifies the logical destination of a request.
///
/// There is no pool to index, but the key still names the connection in
/// logs and trace hooks and feeds the application's server address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl ConnectionKey {
    /// Derive a key from a request URI, defaulting to `http://localhost`.
    pub fn from_uri(uri: &Uri) -> Self {
        let scheme = uri.scheme_str().unwrap_or("http").to_ascii_lowercase();
        let host = uri.host().unwrap_or(DEFAULT_HOST).to_string();
        let port = uri.port_u16().unwrap_or_else(|| default_port(&scheme));
        Self { scheme, host, port }
    }
}

impl std::fmt::Display for ConnectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

fn default_port(scheme: &str) -> u16 {
    match scheme {
        "https" | "wss" => 443,
        _ => 80,
    }
}

/// Method and absolute URI of the request that opened a connection.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
}

impl RequestHead {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self { method, uri }
    }

    /// Key of the connection this request needs.
    pub fn key(&self) -> ConnectionKey {
        ConnectionKey::from_uri(&self.uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_absolute_uri() {
        let key = ConnectionKey::from_uri(&"https://Example.com/api".parse().unwrap());
        assert_eq!(key.scheme, "https");
        assert_eq!(key.host, "Example.com");
        assert_eq!(key.port, 443);
    }

    #[test]
    fn key_from_relative_uri_defaults_to_localhost() {
        let key = ConnectionKey::from_uri(&"/foo?x=1".parse().unwrap());
        assert_eq!(key.to_string(), "http://localhost:80");
    }

    #[test]
    fn explicit_port_is_kept() {
        let key = ConnectionKey::from_uri(&"http://app.local:8080/".parse().unwrap());
        assert_eq!(key.port, 8080);
    }
}
