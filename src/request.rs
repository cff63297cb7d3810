//! Incoming HTTP request type.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::method::Method;
use crate::session::Session;

/// An incoming HTTP request, as seen by handlers and middleware.
///
/// Carries the parsed query pairs, parsed cookies, the resolved [`Session`],
/// and — once the router has matched — the captured `:name` path parameters.
/// One `Request` exists per HTTP exchange and is dropped once the response is
/// written.
pub struct Request {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    query: HashMap<String, String>,
    cookies: HashMap<String, String>,
    params: HashMap<String, String>,
    session: Session,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        path: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        query: HashMap<String, String>,
        cookies: HashMap<String, String>,
        session: Session,
    ) -> Self {
        Self { method, path, headers, body, query, cookies, params: HashMap::new(), session }
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/:id`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a query-string value. A bare flag (`?csv`) is present with an
    /// empty value, so `req.query("csv").is_some()` tests for it.
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// Returns a request cookie by name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// The session resolved for this client.
    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// Parses a query string (`a=1&csv`) into key-value pairs.
///
/// A key without `=` maps to an empty value. Values are taken verbatim — no
/// percent-decoding.
pub(crate) fn parse_query(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((k, v)) => (k.to_owned(), v.to_owned()),
            None => (part.to_owned(), String::new()),
        })
        .collect()
}

/// Parses a `cookie` request header (`a=1; b=2`) into name-value pairs.
///
/// Pairs split on the first `=`; names and values are trimmed; a lone name
/// maps to an empty value.
pub(crate) fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter(|part| !part.trim().is_empty())
        .map(|part| match part.split_once('=') {
            Some((k, v)) => (k.trim().to_owned(), v.trim().to_owned()),
            None => (part.trim().to_owned(), String::new()),
        })
        .collect()
}
