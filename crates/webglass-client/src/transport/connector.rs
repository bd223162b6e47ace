use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Sink, Stream};

use webglass_core::error::{Result, WebGlassError};

/// Outbound half of a link: accepts encoded envelopes.
pub type TextSink = Pin<Box<dyn Sink<String, Error = WebGlassError> + Send>>;
/// Inbound half of a link: yields text frames until the link closes.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// One established connection.
pub struct Link {
    pub sink: TextSink,
    pub stream: TextStream,
}

impl Link {
    pub fn new(sink: TextSink, stream: TextStream) -> Self {
        Self { sink, stream }
    }
}

/// Opens links to the remote browser.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Human-readable endpoint for logs.
    fn endpoint(&self) -> &str;

    async fn connect(&self) -> Result<Link>;
}
