//! HTTP client utilities for talking to the backend.
//!
//! Client construction and request decoration shared by every endpoint.

use reqwest::header::COOKIE;
use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;

use crate::options::{HttpTransport, SecretString, TransportOptions};

/// Cookie the backend reads the Supabase session token from.
pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// Build a configured HTTP client from transport options.
///
/// This applies common configuration like timeouts and proxies. An
/// unparseable proxy URL is returned as an error.
///
/// # Example
/// ```ignore
/// let client = build_http_client(&transport_options)?;
/// ```
pub fn build_http_client(
    transport_options: &TransportOptions<HttpTransport>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = transport_options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &transport_options.provider.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    builder.build()
}

/// Add extra headers to a request if specified in transport options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}

/// Attach the session token as the `sb-access-token` cookie, if present.
pub fn add_access_token(request: RequestBuilder, token: &Option<SecretString>) -> RequestBuilder {
    match token {
        Some(token) => request.header(
            COOKIE,
            format!("{}={}", ACCESS_TOKEN_COOKIE, token.expose_secret()),
        ),
        None => request,
    }
}
