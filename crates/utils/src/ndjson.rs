//! Newline-delimited JSON decoding for streamed responses.
//!
//! Chunks arrive with arbitrary boundaries. [`NdjsonReader`] buffers raw
//! bytes, hands back every complete line it can parse and keeps the trailing
//! fragment for the next chunk. A line that fails to parse is logged and
//! dropped; later lines are unaffected.

use std::marker::PhantomData;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;

#[derive(Debug)]
pub struct NdjsonReader<T> {
    buffer: Vec<u8>,
    skipped: usize,
    _record: PhantomData<fn() -> T>,
}

impl<T> Default for NdjsonReader<T> {
    fn default() -> Self {
        Self {
            buffer: Vec::new(),
            skipped: 0,
            _record: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> NdjsonReader<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns the records completed by it, in order
    pub fn push(&mut self, chunk: &[u8]) -> Vec<T> {
        self.buffer.extend_from_slice(chunk);

        let Some(last_newline) = self.buffer.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        complete
            .split(|b| *b == b'\n')
            .filter_map(|line| self.parse_line(line))
            .collect()
    }

    /// Parse whatever is left once the stream has ended
    pub fn finish(mut self) -> Option<T> {
        let rest = std::mem::take(&mut self.buffer);
        self.parse_line(&rest)
    }

    /// Bytes held back waiting for a newline
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Lines dropped because they were not valid records
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn parse_line(&mut self, line: &[u8]) -> Option<T> {
        if line.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        match serde_json::from_slice(line) {
            Ok(record) => Some(record),
            Err(e) => {
                self.skipped += 1;
                tracing::warn!(
                    "Skipping malformed stream line ({}): {}",
                    e,
                    String::from_utf8_lossy(line)
                );
                None
            }
        }
    }
}

/// Adapt a byte-chunk stream (for example `reqwest::Response::bytes_stream`)
/// into a stream of decoded records. Transport errors end the stream after
/// being yielded.
pub fn decode_stream<T, S, E>(chunks: S) -> impl Stream<Item = Result<T, E>>
where
    T: DeserializeOwned,
    S: Stream<Item = Result<Bytes, E>>,
{
    async_stream::stream! {
        let mut chunks = Box::pin(chunks);
        let mut reader = NdjsonReader::<T>::new();

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    for record in reader.push(&bytes) {
                        yield Ok(record);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        if let Some(record) = reader.finish() {
            yield Ok(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        id: String,
    }

    fn rec(id: &str) -> Record {
        Record { id: id.to_string() }
    }

    #[test]
    fn reassembles_record_split_across_chunks() {
        let mut reader = NdjsonReader::<Record>::new();

        let first = reader.push(br#"{"id":"a"}
{"i"#);
        assert_eq!(first, vec![rec("a")]);
        assert_eq!(reader.pending(), 3);

        let second = reader.push(b"d\":\"b\"}\n");
        assert_eq!(second, vec![rec("b")]);
        assert_eq!(reader.pending(), 0);
        assert_eq!(reader.skipped(), 0);
    }

    #[test]
    fn malformed_line_does_not_stop_later_lines() {
        let mut reader = NdjsonReader::<Record>::new();
        let records = reader.push(b"{\"id\":\"a\"}\nnot json\n\n{\"id\":\"b\"}\n");

        assert_eq!(records, vec![rec("a"), rec("b")]);
        assert_eq!(reader.skipped(), 1);
    }

    #[test]
    fn multibyte_character_split_between_chunks() {
        let line = "{\"id\":\"caf\u{e9}\"}\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut reader = NdjsonReader::<Record>::new();

        assert!(reader.push(&line[..split]).is_empty());
        assert_eq!(reader.push(&line[split..]), vec![rec("caf\u{e9}")]);
    }

    #[test]
    fn finish_parses_unterminated_tail() {
        let mut reader = NdjsonReader::<Record>::new();
        assert!(reader.push(br#"{"id":"z"}"#).is_empty());
        assert_eq!(reader.finish(), Some(rec("z")));
    }

    #[tokio::test]
    async fn decode_stream_yields_records_in_order() {
        let chunks = futures::stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"{\"id\":\"a\"}\n{\"i")),
            Ok(Bytes::from_static(b"d\":\"b\"}\n")),
        ]);

        let records: Vec<Record> = decode_stream(chunks)
            .map(|r| r.unwrap())
            .collect()
            .await;

        assert_eq!(records, vec![rec("a"), rec("b")]);
    }
}
