use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::{
    error::{OutputError, Result},
    strip::Frame,
};

use super::RenderSink;

/// Pixel endpoint of a strip server running on the same machine
pub const DEFAULT_URL: &str = "http://localhost:5000/pixels/rgb";

/// Posts every frame to a remote strip server as `[[r, g, b], ...]`
///
/// This is the wire format `POST /pixels/rgb` accepts, so one instance can
/// drive the strip attached to another.
pub struct HttpSink {
    url: String,
    agent: ureq::Agent,
}

impl HttpSink {
    pub fn new(url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            url: url.to_string(),
            agent,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// JSON body for one frame
pub fn encode_frame(frame: &Frame) -> String {
    json!(frame.pixels()).to_string()
}

impl RenderSink for HttpSink {
    fn name(&self) -> &str {
        "http"
    }

    fn render(&mut self, frame: &Frame) -> Result<()> {
        let body = encode_frame(frame);
        self.agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(|e| OutputError::WriteFailed {
                sink: self.url.clone(),
                reason: e.to_string(),
            })?;

        debug!("Posted {} pixels to {}", frame.len(), self.url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_body_is_nested_triples() {
        let frame = Frame::new(vec![[255, 0, 0], [1, 2, 3]]);
        assert_eq!(encode_frame(&frame), "[[255,0,0],[1,2,3]]");
        assert_eq!(encode_frame(&Frame::new(Vec::new())), "[]");
    }
}
