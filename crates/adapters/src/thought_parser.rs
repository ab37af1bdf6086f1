// SPDX-License-Identifier: MIT

//! Streaming splitter for `<thought>...</thought>` markers.
//!
//! Feed it chunks of arbitrary size via [`ThoughtParser::push`]; each call
//! returns the visible and thought text extracted from that chunk. Markers
//! that straddle a chunk boundary are buffered internally. Call
//! [`ThoughtParser::finish`] on end-of-stream to flush whatever is held.

const OPEN: &str = "<thought>";
const CLOSE: &str = "</thought>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Visible,
    Thought,
}

/// One chunk's worth of split output.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ThoughtChunk {
    pub visible: String,
    pub thought: String,
}

pub struct ThoughtParser {
    mode: Mode,
    /// Bytes held back because they might be a partial marker.
    held: String,
}

impl Default for ThoughtParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ThoughtParser {
    pub fn new() -> Self {
        Self {
            mode: Mode::Visible,
            held: String::new(),
        }
    }

    /// Feed one chunk of raw agent output, returning the visible/thought
    /// text that can be safely emitted now.
    pub fn push(&mut self, input: &str) -> ThoughtChunk {
        self.held.push_str(input);
        self.drain(false)
    }

    /// Signal end-of-stream: flush any buffer as text in the current mode.
    pub fn finish(&mut self) -> ThoughtChunk {
        self.drain(true)
    }

    fn drain(&mut self, at_eof: bool) -> ThoughtChunk {
        let mut out = ThoughtChunk::default();
        loop {
            let marker = match self.mode {
                Mode::Visible => OPEN,
                Mode::Thought => CLOSE,
            };
            match self.held.find(marker) {
                Some(idx) => {
                    let before = self.held[..idx].to_string();
                    match self.mode {
                        Mode::Visible => out.visible.push_str(&before),
                        Mode::Thought => out.thought.push_str(&before),
                    }
                    self.held.drain(..idx + marker.len());
                    self.mode = match self.mode {
                        Mode::Visible => Mode::Thought,
                        Mode::Thought => Mode::Visible,
                    };
                }
                None => {
                    // No full marker present. Hold back a suffix that could
                    // be the start of one straddling the next chunk, unless
                    // this is the final flush.
                    let safe_len = if at_eof {
                        self.held.len()
                    } else {
                        longest_partial_marker_suffix(&self.held, marker)
                    };
                    let emit_len = self.held.len() - safe_len;
                    let emit: String = self.held.drain(..emit_len).collect();
                    match self.mode {
                        Mode::Visible => out.visible.push_str(&emit),
                        Mode::Thought => out.thought.push_str(&emit),
                    }
                    break;
                }
            }
        }
        out
    }
}

/// Length of the longest suffix of `s` that is a non-empty proper prefix of
/// `marker` (i.e. could still grow into `marker` with more input).
fn longest_partial_marker_suffix(s: &str, marker: &str) -> usize {
    let max = marker.len().saturating_sub(1).min(s.len());
    for len in (1..=max).rev() {
        if !s.is_char_boundary(s.len() - len) {
            continue;
        }
        let suffix = &s[s.len() - len..];
        if marker.starts_with(suffix) {
            return len;
        }
    }
    0
}

#[cfg(test)]
#[path = "thought_parser_tests.rs"]
mod tests;
