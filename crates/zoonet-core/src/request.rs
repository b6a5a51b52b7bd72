//! Request descriptors: the immutable identity of one outbound call.
//!
//! The proxy classifies requests and the cache keys entries off this type,
//! so it carries exactly what those decisions need: method, absolute URL,
//! the Range header (partial responses must never be cached as complete),
//! and whether the request is a page navigation.

use url::Url;

/// HTTP method of an outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Method {
    pub fn is_get(self) -> bool {
        matches!(self, Method::Get)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Options => "OPTIONS",
        }
    }
}

/// One outbound request, fixed at issue time. Created per call and discarded
/// after the response (or failure) resolves.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    /// Raw `Range` header value, if the caller asked for a partial response.
    pub range: Option<String>,
    /// True for top-level page navigations (the app shell path).
    pub is_navigation: bool,
}

impl RequestDescriptor {
    /// Plain GET for `url`.
    pub fn get(url: Url) -> Self {
        RequestDescriptor {
            method: Method::Get,
            url,
            range: None,
            is_navigation: false,
        }
    }

    /// GET flagged as a page navigation.
    pub fn navigation(url: Url) -> Self {
        RequestDescriptor {
            is_navigation: true,
            ..RequestDescriptor::get(url)
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn has_range(&self) -> bool {
        self.range.is_some()
    }

    /// Identity used by the cache store: method plus full URL.
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method.as_str(), self.url)
    }

    /// True when this request targets the same scheme/host/port as `origin`.
    pub fn same_origin(&self, origin: &Url) -> bool {
        self.url.scheme() == origin.scheme()
            && self.url.host_str() == origin.host_str()
            && self.url.port_or_known_default() == origin.port_or_known_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn cache_key_includes_method_and_url() {
        let req = RequestDescriptor::get(url("http://localhost:3000/styles.css"));
        assert_eq!(req.cache_key(), "GET http://localhost:3000/styles.css");
    }

    #[test]
    fn same_origin_respects_scheme_host_port() {
        let origin = url("http://localhost:3000/");
        assert!(RequestDescriptor::get(url("http://localhost:3000/zoo.js")).same_origin(&origin));
        assert!(!RequestDescriptor::get(url("https://localhost:3000/zoo.js")).same_origin(&origin));
        assert!(!RequestDescriptor::get(url("http://localhost:8080/zoo.js")).same_origin(&origin));
        assert!(!RequestDescriptor::get(url("http://cdn.example.com/lib.js")).same_origin(&origin));
    }

    #[test]
    fn default_ports_match_explicit_ones() {
        let origin = url("https://zoo.example.com/");
        let req = RequestDescriptor::get(url("https://zoo.example.com:443/icon-192.png"));
        assert!(req.same_origin(&origin));
    }

    #[test]
    fn range_marker_via_builder() {
        let req = RequestDescriptor::get(url("http://localhost:3000/video.mp4"))
            .with_range("bytes=0-1023");
        assert!(req.has_range());
        assert!(!RequestDescriptor::get(url("http://localhost:3000/a")).has_range());
    }
}
