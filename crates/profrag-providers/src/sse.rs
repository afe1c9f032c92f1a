//! Server-sent events decoding for OpenAI-style streaming completions.
//!
//! Network chunks do not line up with SSE lines, so bytes are buffered until a
//! full line is available. Each `data:` payload is one JSON completion chunk;
//! `data: [DONE]` ends the stream.

use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use futures::{Stream, StreamExt};
use profrag_core::error::{ProfRagError, Result};
use profrag_core::traits::ChunkStream;
use serde_json::Value;

/// Decode a byte stream of SSE completion events into reply fragments.
///
/// Only non-empty `choices[0].delta.content` values are yielded. An `error`
/// event, an undecodable payload or a transport error becomes a single
/// terminal `Err` item.
pub fn delta_stream<S, B, E>(bytes: S, service: impl Into<String>) -> ChunkStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = SseState {
        inner: Box::pin(bytes),
        buf: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
        service: service.into(),
    };

    Box::pin(futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                if item.is_err() {
                    st.finished = true;
                    st.pending.clear();
                }
                return Some((item, st));
            }
            if st.finished {
                return None;
            }
            match st.inner.next().await {
                Some(Ok(chunk)) => {
                    st.buf.extend_from_slice(chunk.as_ref());
                    st.drain_lines();
                }
                Some(Err(e)) => {
                    st.finished = true;
                    let err = ProfRagError::upstream(&st.service, format!("stream interrupted: {e}"));
                    return Some((Err(err), st));
                }
                None => {
                    // A final event may arrive without its trailing newline.
                    if !st.buf.is_empty() {
                        let tail = std::mem::take(&mut st.buf);
                        st.handle_line(&String::from_utf8_lossy(&tail));
                    }
                    st.finished = true;
                }
            }
        }
    }))
}

struct SseState<S> {
    inner: Pin<Box<S>>,
    buf: Vec<u8>,
    pending: VecDeque<Result<String>>,
    finished: bool,
    service: String,
}

impl<S> SseState<S> {
    fn drain_lines(&mut self) {
        while !self.finished {
            let Some(pos) = self.buf.iter().position(|b| *b == b'\n') else {
                break;
            };
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            self.handle_line(&String::from_utf8_lossy(&line));
        }
    }

    fn handle_line(&mut self, line: &str) {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(data) = line.strip_prefix("data:") else {
            // Blank separators, comments, `event:` and `id:` lines.
            return;
        };
        let data = data.trim_start();

        if data == "[DONE]" {
            self.finished = true;
            return;
        }

        match parse_event(data) {
            Ok(Some(content)) => self.pending.push_back(Ok(content)),
            Ok(None) => {}
            Err(message) => {
                self.pending.push_back(Err(ProfRagError::upstream(&self.service, message)));
                self.finished = true;
            }
        }
    }
}

/// Extract the delta text of one event. `Err` carries a failure description.
fn parse_event(data: &str) -> std::result::Result<Option<String>, String> {
    let json: Value =
        serde_json::from_str(data).map_err(|e| format!("malformed stream event: {e}"))?;

    if let Some(error) = json.get("error") {
        let message = error["message"].as_str().map(String::from).unwrap_or_else(|| error.to_string());
        return Err(message);
    }

    Ok(json["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|c| !c.is_empty())
        .map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: &[&str]) -> impl Stream<Item = std::result::Result<Vec<u8>, String>> + Send + 'static {
        let owned: Vec<std::result::Result<Vec<u8>, String>> =
            parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        futures::stream::iter(owned)
    }

    fn event(content: &str) -> String {
        format!(
            "data: {}\n\n",
            serde_json::json!({"choices": [{"delta": {"content": content}, "index": 0}]})
        )
    }

    async fn collect(stream: ChunkStream) -> Vec<Result<String>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_yields_deltas_in_order() {
        let body = format!("{}{}{}data: [DONE]\n\n", event("Prof"), event(" A"), event(" rocks"));
        let out = collect(delta_stream(chunks(&[body.as_str()]), "openai")).await;
        let texts: Vec<String> = out.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(texts, vec!["Prof", " A", " rocks"]);
    }

    #[tokio::test]
    async fn test_lines_split_across_chunks() {
        let body = format!("{}{}data: [DONE]\n\n", event("Hello"), event(" world"));
        let (a, b) = body.split_at(17);
        let (b, c) = b.split_at(20);
        let out = collect(delta_stream(chunks(&[a, b, c]), "openai")).await;
        let texts: Vec<String> = out.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(texts, vec!["Hello", " world"]);
    }

    #[tokio::test]
    async fn test_skips_empty_and_role_only_deltas() {
        let role_only = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n";
        let body = format!("{role_only}{}{}: keep-alive\n\ndata: [DONE]\n\n", event(""), event("x"));
        let out = collect(delta_stream(chunks(&[body.as_str()]), "openai")).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().unwrap(), "x");
    }

    #[tokio::test]
    async fn test_nothing_after_done() {
        let body = format!("{}data: [DONE]\n\n{}", event("a"), event("ignored"));
        let out = collect(delta_stream(chunks(&[body.as_str()]), "openai")).await;
        assert_eq!(out.len(), 1);
    }

    #[tokio::test]
    async fn test_error_event_is_terminal() {
        let body = format!(
            "{}data: {{\"error\":{{\"message\":\"rate limited\"}}}}\n\n{}",
            event("partial"),
            event("never")
        );
        let out = collect(delta_stream(chunks(&[body.as_str()]), "openai")).await;
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].as_ref().unwrap(), "partial");
        let err = out[1].as_ref().unwrap_err();
        assert!(err.is_upstream());
        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_transport_error_is_terminal() {
        let first = event("one");
        let parts: Vec<std::result::Result<Vec<u8>, String>> = vec![
            Ok(first.into_bytes()),
            Err("connection reset".to_string()),
            Ok(event("two").into_bytes()),
        ];
        let out = collect(delta_stream(futures::stream::iter(parts), "openai")).await;
        assert_eq!(out.len(), 2);
        assert!(out[1].as_ref().unwrap_err().to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_final_event_without_newline() {
        let body = event("tail");
        let trimmed = body.trim_end();
        let out = collect(delta_stream(chunks(&[trimmed]), "openai")).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].as_ref().unwrap(), "tail");
    }

    #[tokio::test]
    async fn test_malformed_event() {
        let out = collect(delta_stream(chunks(&["data: {not json\n\n"]), "openai")).await;
        assert_eq!(out.len(), 1);
        assert!(out[0].is_err());
    }
}
