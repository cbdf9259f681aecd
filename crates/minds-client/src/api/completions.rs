//! Chat completion API.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use eventsource_stream::Eventsource;
use futures::stream::{self, BoxStream, FusedStream};
use futures::{Stream, StreamExt};

use crate::client::MindsClient;
use crate::error::{Error, Result};
use crate::types::{ChatMessage, CompletionChunk, CompletionRequest, CompletionResponse, StreamFrame};

/// End-of-stream marker sent as the last `data:` frame.
const DONE_MARKER: &str = "[DONE]";

/// Chat completion API client.
pub struct CompletionsApi {
    client: MindsClient,
}

impl CompletionsApi {
    pub(crate) fn new(client: MindsClient) -> Self {
        Self { client }
    }

    fn request(mind: &str, message: String, stream: bool) -> CompletionRequest {
        CompletionRequest {
            model: mind.to_string(),
            messages: vec![ChatMessage::user(message)],
            stream,
        }
    }

    /// Ask a mind and wait for the whole answer.
    pub async fn complete(&self, mind: &str, message: impl Into<String>) -> Result<String> {
        let request = Self::request(mind, message.into(), false);
        let response: CompletionResponse = self
            .client
            .post(&["chat", "completions"], &request)
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::InvalidResponse("completion contains no answer".to_string()))
    }

    /// Ask a mind and receive the answer as it is generated.
    ///
    /// The returned stream holds the connection open until it ends, fails or
    /// is dropped.
    pub async fn stream(&self, mind: &str, message: impl Into<String>) -> Result<CompletionStream> {
        let request = Self::request(mind, message.into(), true);
        let response = self
            .client
            .post_stream(&["chat", "completions"], &request)
            .await?;

        let frames = response
            .bytes_stream()
            .eventsource()
            .map(|result| match result {
                Ok(event) => decode_frame(&event.data),
                Err(e) => Err(Error::Stream(e.to_string())),
            })
            .boxed();

        Ok(CompletionStream::new(frames))
    }
}

/// A decoded server-sent frame.
#[derive(Debug, PartialEq)]
enum Frame {
    Chunk(CompletionChunk),
    Skip,
    Done,
}

fn decode_frame(data: &str) -> Result<Frame> {
    let data = data.trim();
    if data.is_empty() {
        return Ok(Frame::Skip);
    }
    if data == DONE_MARKER {
        return Ok(Frame::Done);
    }

    let frame: StreamFrame = serde_json::from_str(data).map_err(|e| {
        tracing::warn!(data = %data, error = %e, "Failed to parse completion frame");
        Error::Json(e)
    })?;

    if let Some(error) = frame.error {
        let message = error
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .or_else(|| error.as_str().map(str::to_string))
            .unwrap_or_else(|| error.to_string());
        return Err(Error::Stream(message));
    }

    let Some(choice) = frame.choices.into_iter().next() else {
        return Ok(Frame::Skip);
    };

    Ok(Frame::Chunk(CompletionChunk {
        content: choice.delta.content.unwrap_or_default(),
        role: choice.delta.role,
        id: frame.id,
        model: frame.model,
        finish_reason: choice.finish_reason,
    }))
}

/// Single-pass stream of answer chunks.
///
/// Ends after the end-of-stream marker or the first error. The underlying
/// connection is released as soon as the stream ends or is dropped.
pub struct CompletionStream {
    frames: BoxStream<'static, Result<Frame>>,
    finished: bool,
}

impl CompletionStream {
    fn new(frames: BoxStream<'static, Result<Frame>>) -> Self {
        Self {
            frames,
            finished: false,
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        self.frames = stream::empty().boxed();
    }

    /// Drain the stream and concatenate every chunk's content.
    pub async fn collect_text(mut self) -> Result<String> {
        let mut text = String::new();
        while let Some(chunk) = self.next().await {
            text.push_str(&chunk?.content);
        }
        Ok(text)
    }
}

impl Stream for CompletionStream {
    type Item = Result<CompletionChunk>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        loop {
            match ready!(self.frames.poll_next_unpin(cx)) {
                Some(Ok(Frame::Chunk(chunk))) => return Poll::Ready(Some(Ok(chunk))),
                Some(Ok(Frame::Skip)) => continue,
                Some(Ok(Frame::Done)) | None => {
                    self.finish();
                    return Poll::Ready(None);
                }
                Some(Err(e)) => {
                    self.finish();
                    return Poll::Ready(Some(Err(e)));
                }
            }
        }
    }
}

impl FusedStream for CompletionStream {
    fn is_terminated(&self) -> bool {
        self.finished
    }
}

impl Drop for CompletionStream {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!("completion stream dropped early, closing connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_stream(frames: Vec<Result<Frame>>) -> CompletionStream {
        CompletionStream::new(stream::iter(frames).boxed())
    }

    fn text(content: &str) -> Result<Frame> {
        Ok(Frame::Chunk(CompletionChunk {
            content: content.to_string(),
            ..Default::default()
        }))
    }

    #[test]
    fn test_decode_markers() {
        assert_eq!(decode_frame("").unwrap(), Frame::Skip);
        assert_eq!(decode_frame(" [DONE] ").unwrap(), Frame::Done);
    }

    #[test]
    fn test_decode_chunk() {
        let frame = decode_frame(
            r#"{"id":"c1","model":"m1","created":1,"choices":[{"index":0,"delta":{"role":"assistant","content":"Ho"},"finish_reason":null}]}"#,
        )
        .unwrap();

        match frame {
            Frame::Chunk(chunk) => {
                assert_eq!(chunk.content, "Ho");
                assert_eq!(chunk.role.as_deref(), Some("assistant"));
                assert_eq!(chunk.id.as_deref(), Some("c1"));
                assert_eq!(chunk.model.as_deref(), Some("m1"));
                assert!(chunk.finish_reason.is_none());
            }
            other => panic!("expected chunk, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_final_chunk_without_content() {
        let frame = decode_frame(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#).unwrap();
        match frame {
            Frame::Chunk(chunk) => {
                assert_eq!(chunk.content, "");
                assert_eq!(chunk.finish_reason.as_deref(), Some("stop"));
            }
            other => panic!("expected chunk, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_empty_choices_skipped() {
        assert_eq!(decode_frame(r#"{"id":"c1","choices":[]}"#).unwrap(), Frame::Skip);
    }

    #[test]
    fn test_decode_errors() {
        let err = decode_frame(r#"{"error":{"message":"model overloaded"}}"#).unwrap_err();
        assert!(matches!(err, Error::Stream(ref m) if m == "model overloaded"));

        assert!(matches!(decode_frame("{not json"), Err(Error::Json(_))));
    }

    #[tokio::test]
    async fn test_stream_stops_at_done() {
        let stream = chunk_stream(vec![
            text("Ho"),
            Ok(Frame::Skip),
            text("la"),
            Ok(Frame::Done),
            text("ignored"),
        ]);

        assert_eq!(stream.collect_text().await.unwrap(), "Hola");
    }

    #[tokio::test]
    async fn test_stream_fuses_after_error() {
        let mut stream = chunk_stream(vec![
            text("partial"),
            Err(Error::Stream("connection reset".to_string())),
            text("never"),
        ]);

        assert_eq!(stream.next().await.unwrap().unwrap().content, "partial");
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.is_terminated());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_without_marker_ends() {
        let stream = chunk_stream(vec![text("a"), text("b")]);
        assert_eq!(stream.collect_text().await.unwrap(), "ab");
    }
}
