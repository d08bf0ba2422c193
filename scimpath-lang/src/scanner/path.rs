//! The path scanner: a byte-level state machine emitting one event per
//! byte. Drives the URN trie to recognise a registered namespace prefix as a
//! single atomic segment.

use crate::error::ScanError;
use crate::urn::{NodeId, Urn};

/// One event per input byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathEvent {
    Continue,
    BeginStep,
    EndStep,
    BeginFilter,
    EndFilter,
    Error(ScanError),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeginStep,
    TryNamespace(NodeId),
    InStep,
    InFilter,
    InFilterString,
    InFilterStringEscape,
    InFilterStringUnicode(u8),
    EndFilter,
    Eof,
}

fn is_first_alpha(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'$'
}

fn is_alpha(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Scans a path byte-by-byte. Single-use: construct one per compile.
///
/// Callers must feed the path's bytes followed by two `\0` sentinel bytes.
/// The first `\0` drives the final `end-step`/`end-filter` transition, the
/// second is consumed harmlessly once the scanner has reached its `Eof`
/// state.
pub struct PathScanner<'a> {
    urn: &'a Urn,
    source: &'a str,
    state: State,
    offset: usize,
    error: Option<ScanError>,
}

impl<'a> PathScanner<'a> {
    /// `source` is the original path text, kept only so errors can render a
    /// source line; it is not otherwise consulted by the state machine.
    pub fn new(urn: &'a Urn, source: &'a str) -> Self {
        PathScanner {
            urn,
            source,
            state: State::BeginStep,
            offset: 0,
            error: None,
        }
    }

    /// The byte offset of the most recently scanned byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Advances the state machine by one byte, returning the event it
    /// produced. Once errored, every subsequent call returns the same
    /// error without re-examining `byte`; the error state is sticky and
    /// absorbs all further input.
    pub fn step(&mut self, byte: u8) -> PathEvent {
        if let Some(err) = &self.error {
            return PathEvent::Error(err.clone());
        }
        let event = self.advance(byte);
        self.offset += 1;
        if let PathEvent::Error(err) = &event {
            self.error = Some(err.clone());
        }
        event
    }

    fn advance(&mut self, byte: u8) -> PathEvent {
        match self.state {
            State::BeginStep => {
                if !is_first_alpha(byte) {
                    return self.error_at(
                        "expected a path segment",
                        "a segment must start with a letter or '$'",
                    );
                }
                self.state = match self.urn.next(self.urn.root(), byte) {
                    Some(node) => State::TryNamespace(node),
                    None => State::InStep,
                };
                PathEvent::BeginStep
            }
            State::TryNamespace(node) => {
                if let Some(next) = self.urn.next(node, byte) {
                    self.state = State::TryNamespace(next);
                    PathEvent::Continue
                } else if is_alpha(byte) {
                    self.state = State::InStep;
                    PathEvent::Continue
                } else if byte == b':' && self.urn.is_word(node) {
                    self.state = State::BeginStep;
                    PathEvent::EndStep
                } else {
                    self.error_at(
                        "invalid character in path segment",
                        "expected a registered namespace to continue with ':' or more name characters",
                    )
                }
            }
            State::InStep => match byte {
                b if is_alpha(b) => PathEvent::Continue,
                b'.' => {
                    self.state = State::BeginStep;
                    PathEvent::EndStep
                }
                b'[' => {
                    self.state = State::InFilter;
                    PathEvent::BeginFilter
                }
                0 => {
                    self.state = State::Eof;
                    PathEvent::EndStep
                }
                _ => self.error_at(
                    "invalid character in path segment",
                    "expected a name character, '.', or '['",
                ),
            },
            State::InFilter => match byte {
                b'"' => {
                    self.state = State::InFilterString;
                    PathEvent::Continue
                }
                b']' => {
                    self.state = State::EndFilter;
                    PathEvent::EndFilter
                }
                0 => self.error_at("unterminated filter", "expected ']' before end of input"),
                _ => PathEvent::Continue,
            },
            State::InFilterString => match byte {
                b'"' => {
                    self.state = State::InFilter;
                    PathEvent::Continue
                }
                b'\\' => {
                    self.state = State::InFilterStringEscape;
                    PathEvent::Continue
                }
                0 => self.error_at("unterminated string literal", "expected a closing '\"'"),
                _ => PathEvent::Continue,
            },
            State::InFilterStringEscape => match byte {
                b'u' => {
                    self.state = State::InFilterStringUnicode(4);
                    PathEvent::Continue
                }
                0 => self.error_at("unterminated string literal", "expected an escape sequence"),
                _ => {
                    self.state = State::InFilterString;
                    PathEvent::Continue
                }
            },
            State::InFilterStringUnicode(remaining) => {
                if !byte.is_ascii_hexdigit() {
                    return self.error_at(
                        "invalid unicode escape",
                        "expected 4 hexadecimal digits after \\u",
                    );
                }
                self.state = if remaining > 1 {
                    State::InFilterStringUnicode(remaining - 1)
                } else {
                    State::InFilterString
                };
                PathEvent::Continue
            }
            State::EndFilter => match byte {
                b'.' => {
                    self.state = State::BeginStep;
                    PathEvent::Continue
                }
                0 => {
                    self.state = State::Eof;
                    PathEvent::End
                }
                _ => self.error_at(
                    "unexpected character after filter",
                    "expected '.' or end of input",
                ),
            },
            State::Eof => PathEvent::End,
        }
    }

    fn error_at(&mut self, message: &str, hint: &str) -> PathEvent {
        PathEvent::Error(ScanError::new(message, self.offset, hint, self.source))
    }
}
