use std::collections::HashMap;

use bytes::Bytes;

/// A webhook request, normalized from whatever HTTP stack received it.
///
/// Header names are looked up in lowercase. The constructors of this type lowercase them for you,
/// but if you fill `headers` by hand, you must insert lowercase names yourself.
#[derive(Clone, Debug, Default)]
pub struct IncomingRequest {
    pub method: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
}

impl IncomingRequest {
    pub fn new(method: impl Into<String>) -> Self {
        IncomingRequest {
            method: method.into(),
            ..Default::default()
        }
    }

    /// Builds a request from the head of an `http::Request` and its fully read body.
    ///
    /// Header values that aren't visible ASCII are dropped. An unparsable query string is
    /// treated as empty.
    pub fn from_parts(parts: &http::request::Parts, body: Bytes) -> Self {
        let query: HashMap<String, String> = parts
            .uri
            .query()
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default();

        // `HeaderName`s are always lowercase.
        let headers = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_owned(), value.to_owned()))
            })
            .collect();

        IncomingRequest {
            method: parts.method.as_str().to_owned(),
            query,
            headers,
            body: Some(body),
        }
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub(crate) fn method_is(&self, method: &str) -> bool {
        self.method.eq_ignore_ascii_case(method)
    }

    /// Returns the query parameter `name` if it is present and non-empty.
    pub(crate) fn non_empty_query(&self, name: &str) -> Option<&str> {
        self.query
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub(crate) fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Returns the body if it is present and non-empty.
    pub(crate) fn non_empty_body(&self) -> Option<&Bytes> {
        self.body.as_ref().filter(|b| !b.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts() {
        let (parts, ()) = http::Request::get(
            "/webhook?hub.mode=subscribe&hub.challenge=1158201444&hub.verify_token=meatyhamhock",
        )
        .header("X-Hub-Signature-256", "sha256=00")
        .body(())
        .unwrap()
        .into_parts();
        let req = IncomingRequest::from_parts(&parts, Bytes::from_static(b"{}"));

        assert!(req.method_is("get"));
        assert_eq!(req.non_empty_query("hub.mode"), Some("subscribe"));
        assert_eq!(req.non_empty_query("hub.challenge"), Some("1158201444"));
        assert_eq!(req.non_empty_query("hub.verify_token"), Some("meatyhamhock"));
        assert_eq!(req.get_header("x-hub-signature-256"), Some("sha256=00"));
        assert_eq!(req.non_empty_body().map(|b| &b[..]), Some(&b"{}"[..]));
    }

    #[test]
    fn percent_decoded_query() {
        let (parts, ()) = http::Request::get("/?hub.challenge=a%2Bb+c")
            .body(())
            .unwrap()
            .into_parts();
        let req = IncomingRequest::from_parts(&parts, Bytes::new());
        assert_eq!(req.non_empty_query("hub.challenge"), Some("a+b c"));
        assert_eq!(req.non_empty_body(), None);
    }

    #[test]
    fn builder_lowercases_header_names() {
        let req = IncomingRequest::new("POST").header("X-Hub-Signature-256", "sha256=00");
        assert_eq!(req.get_header("x-hub-signature-256"), Some("sha256=00"));
        assert_eq!(req.get_header("X-Hub-Signature-256"), None);
    }

    #[test]
    fn empty_values_are_absent() {
        let req = IncomingRequest::new("GET")
            .query_param("hub.challenge", "")
            .body("");
        assert_eq!(req.non_empty_query("hub.challenge"), None);
        assert_eq!(req.non_empty_query("hub.mode"), None);
        assert_eq!(req.non_empty_body(), None);
    }
}
