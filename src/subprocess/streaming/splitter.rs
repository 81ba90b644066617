//! Reassembly of arbitrarily chunked output into lines

use std::borrow::Cow;

/// Splits a chunked byte stream into lines.
///
/// The buffer always holds exactly the output received since the last `\n`.
/// Lines are terminated by `\n` or `\r\n`; the terminator is stripped. A
/// `\r` that ends one chunk and the `\n` that starts the next form a single
/// terminator because splitting only happens on `\n`.
///
/// Bytes are decoded per completed line, so a multi-byte character split
/// across two chunks is decoded intact. Invalid UTF-8 is replaced lossily.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buffer: Vec<u8>,
    lines_emitted: usize,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and emit every line it completes, in order.
    pub fn feed<F>(&mut self, chunk: impl AsRef<[u8]>, mut emit: F)
    where
        F: FnMut(&str),
    {
        let chunk = chunk.as_ref();
        if chunk.is_empty() {
            return;
        }

        // The buffered prefix never contains a terminator.
        let mut search_from = self.buffer.len();
        self.buffer.extend_from_slice(chunk);

        let mut line_start = 0;
        while let Some(offset) = self.buffer[search_from..]
            .iter()
            .position(|&b| b == b'\n')
        {
            let newline = search_from + offset;
            emit(&decode_line(&self.buffer[line_start..newline]));
            self.lines_emitted += 1;
            line_start = newline + 1;
            search_from = line_start;
        }

        if line_start > 0 {
            self.buffer.drain(..line_start);
        }
    }

    /// Emit the trailing partial line, if any, and finish.
    ///
    /// One trailing carriage return is dropped as the remains of a `\r\n`
    /// that never completed, the same rule `feed` applies to terminated
    /// lines. Whatever is left is emitted when non-empty, whitespace
    /// included. Returns the total number of lines emitted.
    pub fn flush<F>(mut self, mut emit: F) -> usize
    where
        F: FnMut(&str),
    {
        let line = decode_line(&self.buffer);
        if !line.is_empty() {
            emit(&line);
            self.lines_emitted += 1;
        }

        self.lines_emitted
    }

    /// The buffered partial line
    pub fn pending(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn lines_emitted(&self) -> usize {
        self.lines_emitted
    }
}

fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes)
}
