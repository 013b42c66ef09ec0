//! Request dispatch
//!
//! The requestor turns a path, a [`Request`] and a format handler into one
//! HTTP exchange:
//! - content negotiation through the handler's `Accept` header
//! - error classification (transport failure vs. error status)
//! - buffered or lazy decoding, with the converter applied per unit

use super::session::Session;
use crate::error::{Error, ResponseError, Result};
use crate::formats::{FormatHandler, JsonHandler, RecordStream, JSON};
use crate::models::{noop, Converter};
use crate::types::{Body, Method, Params, ParamValue};
use futures::{stream, StreamExt, TryStreamExt};
use reqwest::Response;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Everything about a request except its method and path
pub struct Request<H: FormatHandler> {
    fmt: H,
    stream: bool,
    params: Params,
    body: Option<Body>,
    converter: Converter<H::Output>,
}

impl Request<JsonHandler> {
    /// A plain JSON request
    pub fn new() -> Self {
        Self::with_format(JSON)
    }
}

impl Default for Request<JsonHandler> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: FormatHandler> Request<H> {
    /// A request negotiated and decoded by `fmt`
    pub fn with_format(fmt: H) -> Self {
        Self {
            fmt,
            stream: false,
            params: Params::new(),
            body: None,
            converter: Arc::new(noop::<H::Output>),
        }
    }

    /// Decode the response lazily
    #[must_use]
    pub fn stream(self) -> Self {
        self.streaming(true)
    }

    /// Choose between buffered and lazy decoding
    #[must_use]
    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, Some(value.into()));
        self
    }

    /// Add a query parameter that is only sent when present
    #[must_use]
    pub fn param_opt<V: Into<ParamValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.params.insert(key, value.map(Into::into));
        self
    }

    /// Replace all query parameters
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Send a URL-encoded form body
    #[must_use]
    pub fn form(mut self, fields: Params) -> Self {
        self.body = Some(Body::Form(fields));
        self
    }

    /// Send a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(Body::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    /// Send a raw text body
    #[must_use]
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Body::Text(body.into()));
        self
    }

    /// Set the body directly
    #[must_use]
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Post-process every decoded unit
    #[must_use]
    pub fn converter<F>(mut self, converter: F) -> Self
    where
        F: Fn(H::Output) -> H::Output + Send + Sync + 'static,
    {
        self.converter = Arc::new(converter);
        self
    }

    /// The handler governing this request
    pub fn format_handler(&self) -> H {
        self.fmt
    }

    /// Whether the response will be decoded lazily
    pub fn is_stream(&self) -> bool {
        self.stream
    }

    /// Query parameters
    pub fn query(&self) -> &Params {
        &self.params
    }
}

impl<H: FormatHandler> fmt::Debug for Request<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("fmt", &self.fmt)
            .field("stream", &self.stream)
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Decoded response: one value, or a lazy sequence of values
pub enum Reply<T> {
    /// Buffered response
    Single(T),
    /// Streamed response; single pass, read as it is polled
    Stream(RecordStream<T>),
}

impl<T: Send + 'static> Reply<T> {
    /// Whether the response is a stream
    pub fn is_stream(&self) -> bool {
        matches!(self, Reply::Stream(_))
    }

    /// The buffered value, if this is not a stream
    pub fn into_single(self) -> Option<T> {
        match self {
            Reply::Single(value) => Some(value),
            Reply::Stream(_) => None,
        }
    }

    /// View as a stream; a buffered value becomes a one-element stream
    pub fn into_stream(self) -> RecordStream<T> {
        match self {
            Reply::Single(value) => stream::once(async move { Ok(value) }).boxed(),
            Reply::Stream(records) => records,
        }
    }

    /// Drain into a vector
    pub async fn collect(self) -> Result<Vec<T>> {
        self.into_stream().try_collect().await
    }
}

impl<T: fmt::Debug> fmt::Debug for Reply<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Single(value) => f.debug_tuple("Single").field(value).finish(),
            Reply::Stream(_) => f.debug_tuple("Stream").finish_non_exhaustive(),
        }
    }
}

/// Performs requests against one base URL over a shared session
#[derive(Debug, Clone)]
pub struct Requestor {
    session: Session,
    base_url: Url,
}

impl Requestor {
    /// Create a requestor for `base_url`
    pub fn new(session: Session, base_url: &str) -> Result<Self> {
        Ok(Self {
            session,
            base_url: Url::parse(base_url)?,
        })
    }

    /// The base URL paths are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The shared session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resolve a path against the base URL.
    ///
    /// Follows URL reference resolution: an absolute path replaces the base
    /// path, a relative one is resolved against the base's last segment.
    pub fn url_for(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Make a request, returning one value or a lazy sequence per the request's stream flag
    pub async fn request<H: FormatHandler>(
        &self,
        method: Method,
        path: &str,
        request: Request<H>,
    ) -> Result<Reply<H::Output>> {
        let stream = request.stream;
        let (response, fmt, converter) = self.send(method, path, request).await?;
        if stream {
            Ok(Reply::Stream(decode_stream(response, fmt, converter)))
        } else {
            decode_single(response, fmt, converter).await.map(Reply::Single)
        }
    }

    /// Make a GET request
    pub async fn get<H: FormatHandler>(
        &self,
        path: &str,
        request: Request<H>,
    ) -> Result<Reply<H::Output>> {
        self.request(Method::GET, path, request).await
    }

    /// Make a POST request
    pub async fn post<H: FormatHandler>(
        &self,
        path: &str,
        request: Request<H>,
    ) -> Result<Reply<H::Output>> {
        self.request(Method::POST, path, request).await
    }

    /// Make a request and decode the whole body, ignoring the stream flag
    pub async fn fetch<H: FormatHandler>(
        &self,
        method: Method,
        path: &str,
        request: Request<H>,
    ) -> Result<H::Output> {
        let (response, fmt, converter) = self.send(method, path, request.streaming(false)).await?;
        decode_single(response, fmt, converter).await
    }

    /// Make a request and decode the body lazily, ignoring the stream flag
    pub async fn fetch_stream<H: FormatHandler>(
        &self,
        method: Method,
        path: &str,
        request: Request<H>,
    ) -> Result<RecordStream<H::Output>> {
        let (response, fmt, converter) = self.send(method, path, request.streaming(true)).await?;
        Ok(decode_stream(response, fmt, converter))
    }

    /// Perform the HTTP exchange and classify its outcome
    async fn send<H: FormatHandler>(
        &self,
        method: Method,
        path: &str,
        request: Request<H>,
    ) -> Result<(Response, H, Converter<H::Output>)> {
        let url = self.url_for(path)?;
        let Request {
            fmt,
            stream,
            params,
            body,
            converter,
        } = request;

        debug!(
            "{} {} {} params={:?} body={:?}",
            if stream { "stream" } else { "request" },
            method,
            url,
            params,
            body
        );

        let mut req = self
            .session
            .inner()
            .request(method.into(), url.clone())
            .headers(fmt.headers());

        let query = params.to_pairs();
        if !query.is_empty() {
            req = req.query(&query);
        }

        req = match body {
            Some(Body::Form(fields)) => req.form(&fields.to_pairs()),
            Some(Body::Json(value)) => req.json(&value),
            Some(Body::Text(text)) => req.body(text),
            None => req,
        };

        let response = req.send().await.map_err(Error::Api)?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            debug!("Request failed with {}: {} {}", status.as_u16(), method, url);
            return Err(ResponseError::from_response(response).await.into());
        }

        debug!("Request succeeded: {} {}", method, url);
        Ok((response, fmt, converter))
    }
}

async fn decode_single<H: FormatHandler>(
    response: Response,
    fmt: H,
    converter: Converter<H::Output>,
) -> Result<H::Output> {
    let body = response.bytes().await.map_err(Error::Api)?;
    let value = fmt.parse(&body)?;
    Ok(converter(value))
}

fn decode_stream<H: FormatHandler>(
    response: Response,
    fmt: H,
    converter: Converter<H::Output>,
) -> RecordStream<H::Output> {
    let body = response.bytes_stream().map_err(Error::Api).boxed();
    fmt.parse_stream(body)
        .map_ok(move |unit| converter(unit))
        .boxed()
}
