//! Writing finished responses to an output sink.

use gateau_config::EmitterConfig;
use gateau_core::{read_body, GateauResult, Response};
use gateau_middleware::BoxFuture;
use std::io::Write;

/// Default number of body bytes written per write call.
pub const DEFAULT_MAX_BUFFER_LENGTH: usize = 8192;

/// Default protocol written on the status line.
pub const DEFAULT_PROTOCOL: &str = "HTTP/1.1";

/// Sends a finished response to the client.
pub trait Emitter: Send {
    /// Emits `response`.
    fn emit(&mut self, response: Response) -> BoxFuture<'_, GateauResult<()>>;
}

/// Writes a response as raw HTTP/1 text to any [`Write`] sink.
///
/// The status line comes first, then one line per header value, a blank
/// line, and the body in slices of at most `max_buffer_length` bytes.
///
/// # Example
///
/// ```
/// use gateau_core::ResponseExt;
/// use gateau_server::{Emitter, ResponseEmitter};
/// use http::StatusCode;
///
/// # tokio_test::block_on(async {
/// let mut emitter = ResponseEmitter::new(Vec::new());
/// emitter.emit(gateau_core::Response::text(StatusCode::OK, "hi").unwrap()).await.unwrap();
///
/// let written = String::from_utf8(emitter.into_inner()).unwrap();
/// assert!(written.starts_with("HTTP/1.1 200 OK\r\n"));
/// assert!(written.ends_with("\r\n\r\nhi"));
/// # });
/// ```
#[derive(Debug)]
pub struct ResponseEmitter<W> {
    sink: W,
    max_buffer_length: usize,
    protocol: String,
}

impl<W: Write + Send> ResponseEmitter<W> {
    /// Creates an emitter with the default buffer length and protocol.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            max_buffer_length: DEFAULT_MAX_BUFFER_LENGTH,
            protocol: DEFAULT_PROTOCOL.to_string(),
        }
    }

    /// Creates an emitter from the `[emitter]` configuration section.
    pub fn from_config(sink: W, config: &EmitterConfig) -> Self {
        Self::new(sink)
            .with_max_buffer_length(config.max_buffer_length)
            .with_protocol(config.protocol.clone())
    }

    /// Sets the number of body bytes written per write call. Zero is
    /// treated as one.
    #[must_use]
    pub fn with_max_buffer_length(mut self, max_buffer_length: usize) -> Self {
        self.max_buffer_length = max_buffer_length.max(1);
        self
    }

    /// Sets the protocol written on the status line.
    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Bytes written per body write.
    pub fn max_buffer_length(&self) -> usize {
        self.max_buffer_length
    }

    /// The status line protocol.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// The underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Consumes the emitter, returning the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_head(&mut self, response: &Response) -> std::io::Result<()> {
        let status = response.status();
        write!(self.sink, "{} {}", self.protocol, status.as_u16())?;
        if let Some(reason) = status.canonical_reason() {
            write!(self.sink, " {reason}")?;
        }
        self.sink.write_all(b"\r\n")?;

        for (name, value) in response.headers() {
            self.sink.write_all(name.as_str().as_bytes())?;
            self.sink.write_all(b": ")?;
            self.sink.write_all(value.as_bytes())?;
            self.sink.write_all(b"\r\n")?;
        }
        self.sink.write_all(b"\r\n")
    }

    fn write_body(&mut self, body: &[u8]) -> std::io::Result<()> {
        for chunk in body.chunks(self.max_buffer_length) {
            self.sink.write_all(chunk)?;
        }
        self.sink.flush()
    }
}

impl<W: Write + Send> Emitter for ResponseEmitter<W> {
    fn emit(&mut self, response: Response) -> BoxFuture<'_, GateauResult<()>> {
        Box::pin(async move {
            self.write_head(&response)?;
            let body = read_body(response.into_body()).await;
            self.write_body(&body)?;

            tracing::debug!(body_bytes = body.len(), "response emitted");
            Ok(())
        })
    }
}
