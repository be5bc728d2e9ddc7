//! Per-request state handed to the gate and to every pipeline step.

use std::collections::HashMap;

use axum::http::{header, request::Parts, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use keeweb_session::Payload;

use crate::auth::Credentials;

#[derive(Debug)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
    session: Option<Payload>,
    response_headers: HeaderMap,
}

impl RequestContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
            params: HashMap::new(),
            session: None,
            response_headers: HeaderMap::new(),
        }
    }

    pub fn from_parts(parts: Parts, params: HashMap<String, String>) -> Self {
        Self::new(parts.method, parts.uri, parts.headers).with_params(params)
    }

    pub fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Basic credentials from the `Authorization` header, if well formed.
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_basic(&self.headers)
    }

    /// Set by the authentication gate before the first step of a protected route.
    pub fn session(&self) -> Option<&Payload> {
        self.session.as_ref()
    }

    pub fn set_session(&mut self, session: Payload) {
        self.session = Some(session);
    }

    /// Headers merged into the final response, error or not.
    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    pub fn set_response_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response_headers.insert(name, value);
    }

    /// Tells the client which credential scheme is expected.
    pub fn challenge(&mut self, realm: &str) {
        let value = format!("Basic realm=\"{}\"", realm.replace('"', ""));
        if let Ok(value) = HeaderValue::from_str(&value) {
            self.set_response_header(header::WWW_AUTHENTICATE, value);
        }
    }

    pub(crate) fn take_response_headers(&mut self) -> HeaderMap {
        std::mem::take(&mut self.response_headers)
    }
}
