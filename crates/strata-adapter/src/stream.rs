//! Pull-based translation of upstream chunks into [`StreamEvent`]s
//!
//! The translator owns the upstream chunk stream and a family decoder. Each
//! pull decodes at most one upstream chunk; its outputs are handed out one
//! at a time in upstream order before the next chunk is read.

use std::collections::VecDeque;

use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::codec::{ChunkDecoder, ChunkEvent};
use crate::finish::map_finish_reason;
use crate::runtime::ChunkStream;
use crate::types::StreamEvent;

/// Finish reason reported when the upstream ends without one
const IMPLICIT_FINISH: &str = "stop";

/// Translator for one stream, `Open` until [`StreamTranslator::is_closed`]
pub struct StreamTranslator {
    model_id: String,
    upstream: Option<ChunkStream>,
    decoder: Box<dyn ChunkDecoder>,
    pending: VecDeque<StreamEvent>,
    cancellation: CancellationToken,
    /// Decode failure of the most recent chunk, fatal only if no chunk follows
    last_decode_error: Option<String>,
}

impl StreamTranslator {
    pub fn new(
        model_id: impl Into<String>,
        upstream: ChunkStream,
        decoder: Box<dyn ChunkDecoder>,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            upstream: Some(upstream),
            decoder,
            pending: VecDeque::new(),
            cancellation,
            last_decode_error: None,
        }
    }

    /// Model the stream was opened for
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Whether the terminal state has been reached
    pub fn is_closed(&self) -> bool {
        self.upstream.is_none() && self.pending.is_empty()
    }

    /// Drop the upstream, which closes it
    fn close(&mut self) {
        self.upstream = None;
    }

    /// Pull the next event
    ///
    /// Returns `None` once closed. Cancellation closes the stream without
    /// emitting anything further, including events already decoded. A chunk
    /// that fails to decode is skipped unless it is the last one, in which
    /// case the stream closes with [`StreamEvent::Error`].
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        loop {
            if self.cancellation.is_cancelled() {
                if !self.is_closed() {
                    tracing::debug!(model = %self.model_id, "stream cancelled");
                }
                self.pending.clear();
                self.close();
                return None;
            }

            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            let upstream = self.upstream.as_mut()?;
            let pulled = tokio::select! {
                biased;
                () = self.cancellation.cancelled() => continue,
                chunk = upstream.next() => chunk,
            };

            match pulled {
                None => {
                    self.close();
                    if let Some(error) = self.last_decode_error.take() {
                        tracing::warn!(
                            model = %self.model_id,
                            error = %error,
                            "stream ended on an undecodable chunk"
                        );
                        return Some(StreamEvent::Error(error));
                    }
                    return Some(StreamEvent::FinishReason(IMPLICIT_FINISH.to_owned()));
                }
                Some(Err(e)) => {
                    tracing::warn!(model = %self.model_id, error = %e, "upstream stream failed");
                    self.close();
                    return Some(StreamEvent::Error(e.to_string()));
                }
                Some(Ok(chunk)) => match self.decoder.decode_chunk(&chunk) {
                    Ok(events) => {
                        self.last_decode_error = None;
                        self.enqueue(events);
                    }
                    Err(e) => {
                        tracing::debug!(model = %self.model_id, error = %e, "skipping undecodable chunk");
                        self.last_decode_error = Some(e.to_string());
                    }
                },
            }
        }
    }

    /// Queue decoded events, closing after the first terminal one
    fn enqueue(&mut self, events: Vec<ChunkEvent>) {
        for event in events {
            let event = match event {
                ChunkEvent::Text(text) => StreamEvent::TextDelta(text),
                ChunkEvent::ToolCall(delta) => StreamEvent::ToolCallDelta(delta),
                ChunkEvent::Finish(raw) => {
                    StreamEvent::FinishReason(map_finish_reason(&raw).unwrap_or_else(|| IMPLICIT_FINISH.to_owned()))
                }
                ChunkEvent::Error(message) => StreamEvent::Error(message),
            };
            let terminal = event.is_terminal();
            self.pending.push_back(event);
            if terminal {
                self.close();
                return;
            }
        }
    }

    /// Adapt into a [`Stream`] of events
    pub fn into_stream(self) -> impl Stream<Item = StreamEvent> + Send {
        futures_util::stream::unfold(self, |mut translator| async move {
            let event = translator.next_event().await?;
            Some((event, translator))
        })
    }
}

impl std::fmt::Debug for StreamTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamTranslator")
            .field("model_id", &self.model_id)
            .field("closed", &self.is_closed())
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
