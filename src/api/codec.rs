//! Byte-level plumbing for the streaming chat response: incremental UTF-8
//! decoding across chunk boundaries, and the `"data: "` fragment split.
//!
//! The split is deliberately a naive tokenizer, not an SSE parser: it does
//! not interpret `event:`, `id:`, or multi-line `data:` fields. Every
//! `"data: "`-delimited segment is treated as raw text.

/// Literal delimiter between fragments in the response body.
pub const FRAGMENT_DELIMITER: &str = "data: ";

/// Streaming-safe UTF-8 decoder. A multi-byte character split across two
/// chunks is held back until its remaining bytes arrive instead of being
/// decoded as replacement characters.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, returning all complete characters seen so
    /// far. Invalid byte sequences decode to U+FFFD; an incomplete
    /// sequence at the end of the chunk is buffered for the next call.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let bytes = std::mem::take(&mut self.pending);

        let mut out = String::new();
        let mut rest = &bytes[..];
        loop {
            match std::str::from_utf8(rest) {
                Ok(s) => {
                    out.push_str(s);
                    break;
                }
                Err(e) => {
                    let (valid, tail) = rest.split_at(e.valid_up_to());
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(n) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[n..];
                        }
                        None => {
                            // incomplete sequence at the end, wait for more bytes
                            self.pending = tail.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Bytes still waiting for the rest of their character, if any.
    /// End-of-stream with a non-empty buffer means the stream was
    /// truncated mid-character; those bytes are dropped, matching the
    /// behavior of a streaming text decoder that is never flushed.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Split decoded text into fragments on the literal `"data: "` delimiter.
/// Empty segments are discarded before trimming, so a whitespace-only
/// segment still yields an (empty) entry; appending it to an accumulator
/// is a no-op.
pub fn split_fragments(text: &str) -> Vec<String> {
    text.split(FRAGMENT_DELIMITER)
        .filter(|t| !t.is_empty())
        .map(|t| t.trim().to_string())
        .collect()
}
