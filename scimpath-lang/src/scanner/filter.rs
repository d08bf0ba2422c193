//! The filter scanner: a byte-level state machine emitting one event per
//! byte. Unlike the path scanner, it is *mode-driven*: the shunting-yard
//! compiler knows, from the grammar position it is in, what kind of token
//! comes next, and tells the scanner via [`FilterScanner::expect`] before
//! feeding that token's bytes. The scanner only disambiguates the one
//! genuine lexical ambiguity the grammar cannot resolve positionally: `not`
//! versus a path segment starting with `n`/`N` (e.g. `nickName`).

use crate::error::ScanError;

/// One event per input byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    Continue,
    SkipSpace,
    InsertSpace,
    BeginAny,
    BeginPath,
    EndPath,
    BeginOp,
    EndOp,
    BeginLiteral,
    EndLiteral,
    /// Carries the paren byte itself (`(` or `)`).
    Paren(u8),
    Error(ScanError),
    End,
}

/// What kind of token the compiler expects next. The compiler sets this
/// after consuming each terminal event, reflecting its position in the
/// filter grammar. See the module doc for why this is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Start of a unary: `not`, `(`, or a predicate's path.
    UnaryStart,
    /// A relational or logical operator keyword.
    Operator,
    /// A quoted string, number, or boolean.
    Literal,
}

const LOGICAL_AND_RELATIONAL_OPS: &[&str] = &[
    "eq", "ne", "sw", "ew", "co", "gt", "ge", "lt", "le", "pr", "and", "or",
];

fn is_word_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn is_bareword_literal_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'+'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Dispatch,
    InAny { pos: u8 },
    InAnyPendingInsertSpace,
    InPath,
    InPathPendingInsertSpace,
    InPathBracket,
    InPathBracketString,
    InPathBracketStringEscape,
    InPathBracketStringUnicode(u8),
    InOp,
    InOpPendingInsertSpace,
    InLiteralString,
    InLiteralStringEscape,
    InLiteralStringUnicode(u8),
    InLiteralBareword,
    InLiteralBarewordPendingInsertSpace,
}

/// Scans filter text byte-by-byte. Single-use: construct one per compile.
///
/// Contract for [`FilterEvent::InsertSpace`] (the "virtual rewind"): when
/// `step` returns it, the driver must call `step(b' ')`, which yields the
/// terminal event (`EndOp` or `EndLiteral`) that the real byte could not
/// trigger directly, and then call `step` again with the *same* byte that
/// produced `InsertSpace`, without having advanced its own input cursor.
pub struct FilterScanner<'a> {
    source: &'a str,
    state: State,
    expect: Expect,
    op_buf: String,
    paren_depth: u32,
    offset: usize,
    error: Option<ScanError>,
}

impl<'a> FilterScanner<'a> {
    pub fn new(source: &'a str) -> Self {
        FilterScanner {
            source,
            state: State::Dispatch,
            expect: Expect::UnaryStart,
            op_buf: String::new(),
            paren_depth: 0,
            offset: 0,
            error: None,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Tells the scanner what kind of token to expect at the next
    /// [`State::Dispatch`]. Must be called by the driver after every
    /// terminal event (`EndPath`, `EndOp`, `EndLiteral`, `Paren`) before
    /// feeding the next token's first byte.
    pub fn expect(&mut self, expect: Expect) {
        self.expect = expect;
    }

    /// A running count of unmatched `(` (incremented) vs `)` (decremented).
    /// Must be zero at `End`, otherwise the filter has a mismatched
    /// parenthesis.
    pub fn paren_depth(&self) -> u32 {
        self.paren_depth
    }

    pub fn step(&mut self, byte: u8) -> FilterEvent {
        if let Some(err) = &self.error {
            return FilterEvent::Error(err.clone());
        }
        let event = self.advance(byte);
        self.offset += 1;
        if let FilterEvent::Error(err) = &event {
            self.error = Some(err.clone());
        }
        event
    }

    fn advance(&mut self, byte: u8) -> FilterEvent {
        match self.state {
            State::Dispatch => self.dispatch(byte),
            State::InAny { pos } => self.in_any(pos, byte),
            State::InAnyPendingInsertSpace => {
                self.state = State::Dispatch;
                FilterEvent::EndOp
            }
            State::InPath => self.in_path(byte),
            State::InPathPendingInsertSpace => {
                self.state = State::Dispatch;
                FilterEvent::EndPath
            }
            State::InPathBracket => self.in_path_bracket(byte),
            State::InPathBracketString => match byte {
                b'"' => {
                    self.state = State::InPathBracket;
                    FilterEvent::Continue
                }
                b'\\' => {
                    self.state = State::InPathBracketStringEscape;
                    FilterEvent::Continue
                }
                0 => self.error_at("unterminated string literal", "expected a closing '\"'"),
                _ => FilterEvent::Continue,
            },
            State::InPathBracketStringEscape => match byte {
                b'u' => {
                    self.state = State::InPathBracketStringUnicode(4);
                    FilterEvent::Continue
                }
                0 => self.error_at("unterminated string literal", "expected an escape sequence"),
                _ => {
                    self.state = State::InPathBracketString;
                    FilterEvent::Continue
                }
            },
            State::InPathBracketStringUnicode(remaining) => {
                if !byte.is_ascii_hexdigit() {
                    return self.error_at(
                        "invalid unicode escape",
                        "expected 4 hexadecimal digits after \\u",
                    );
                }
                self.state = if remaining > 1 {
                    State::InPathBracketStringUnicode(remaining - 1)
                } else {
                    State::InPathBracketString
                };
                FilterEvent::Continue
            }
            State::InOp => self.in_op(byte),
            State::InOpPendingInsertSpace => self.resolve_op(byte),
            State::InLiteralString => match byte {
                b'"' => {
                    self.state = State::Dispatch;
                    FilterEvent::EndLiteral
                }
                b'\\' => {
                    self.state = State::InLiteralStringEscape;
                    FilterEvent::Continue
                }
                0 => self.error_at("unterminated string literal", "expected a closing '\"'"),
                _ => FilterEvent::Continue,
            },
            State::InLiteralStringEscape => match byte {
                b'u' => {
                    self.state = State::InLiteralStringUnicode(4);
                    FilterEvent::Continue
                }
                0 => self.error_at("unterminated string literal", "expected an escape sequence"),
                _ => {
                    self.state = State::InLiteralString;
                    FilterEvent::Continue
                }
            },
            State::InLiteralStringUnicode(remaining) => {
                if !byte.is_ascii_hexdigit() {
                    return self.error_at(
                        "invalid unicode escape",
                        "expected 4 hexadecimal digits after \\u",
                    );
                }
                self.state = if remaining > 1 {
                    State::InLiteralStringUnicode(remaining - 1)
                } else {
                    State::InLiteralString
                };
                FilterEvent::Continue
            }
            State::InLiteralBareword => self.in_literal_bareword(byte),
            State::InLiteralBarewordPendingInsertSpace => {
                self.state = State::Dispatch;
                FilterEvent::EndLiteral
            }
        }
    }

    fn dispatch(&mut self, byte: u8) -> FilterEvent {
        match byte {
            b' ' => FilterEvent::SkipSpace,
            b'(' => {
                self.paren_depth += 1;
                FilterEvent::Paren(byte)
            }
            b')' => {
                if self.paren_depth == 0 {
                    return self.error_at("mismatched parenthesis", "no matching '(' for this ')'");
                }
                self.paren_depth -= 1;
                FilterEvent::Paren(byte)
            }
            0 => {
                if self.paren_depth != 0 {
                    return self.error_at("mismatched parenthesis", "expected a closing ')'");
                }
                FilterEvent::End
            }
            _ => match self.expect {
                Expect::UnaryStart => {
                    if byte == b'n' || byte == b'N' {
                        self.state = State::InAny { pos: 1 };
                        FilterEvent::BeginAny
                    } else if byte.is_ascii_alphabetic() || byte == b'$' {
                        self.state = State::InPath;
                        FilterEvent::BeginPath
                    } else {
                        self.error_at(
                            "expected 'not', '(', or a path",
                            "a unary must start with a letter, '$', or '('",
                        )
                    }
                }
                Expect::Operator => {
                    if byte.is_ascii_alphabetic() {
                        self.op_buf.clear();
                        self.op_buf.push((byte as char).to_ascii_lowercase());
                        self.state = State::InOp;
                        FilterEvent::BeginOp
                    } else {
                        self.error_at("expected an operator", "expected a relational or logical keyword")
                    }
                }
                Expect::Literal => {
                    if byte == b'"' {
                        self.state = State::InLiteralString;
                        FilterEvent::BeginLiteral
                    } else if byte.is_ascii_digit() || byte == b'-' || byte.is_ascii_alphabetic() {
                        self.state = State::InLiteralBareword;
                        FilterEvent::BeginLiteral
                    } else {
                        self.error_at("expected a literal", "expected a quoted string, number, or boolean")
                    }
                }
            },
        }
    }

    fn in_any(&mut self, pos: u8, byte: u8) -> FilterEvent {
        const NOT: &[u8] = b"not";
        if (pos as usize) < NOT.len() {
            if byte.to_ascii_lowercase() == NOT[pos as usize] {
                self.state = State::InAny { pos: pos + 1 };
                return FilterEvent::Continue;
            }
            // Can never become "not" now; whatever this token is, it's a
            // path. Hand the current byte to ordinary path scanning.
            self.state = State::InPath;
            return self.in_path(byte);
        }
        // Fully matched "not": a path-continuing byte means the real token
        // is longer (e.g. "nothing"); anything else resolves it as the
        // keyword.
        if is_word_continue(byte) || byte == b'.' || byte == b'[' {
            self.state = State::InPath;
            return self.in_path(byte);
        }
        match byte {
            b' ' => {
                self.state = State::Dispatch;
                FilterEvent::EndOp
            }
            b'(' | b')' | 0 => {
                // Resolved as the "not" keyword but glued to what follows;
                // insert a virtual space first.
                self.state = State::InAnyPendingInsertSpace;
                FilterEvent::InsertSpace
            }
            _ => self.terminate_path(byte),
        }
    }

    /// A path token's text, as captured here, may itself contain `.` and
    /// `[...]`. The filter scanner hands the *whole* blob to the path
    /// compiler, which is what actually splits it into segments.
    fn in_path(&mut self, byte: u8) -> FilterEvent {
        match byte {
            b if is_word_continue(b) || b == b':' || b == b'.' => FilterEvent::Continue,
            b'[' => {
                self.state = State::InPathBracket;
                FilterEvent::Continue
            }
            _ => self.terminate_path(byte),
        }
    }

    fn terminate_path(&mut self, byte: u8) -> FilterEvent {
        match byte {
            b' ' => {
                self.state = State::Dispatch;
                FilterEvent::EndPath
            }
            0 => {
                self.state = State::Dispatch;
                FilterEvent::EndPath
            }
            b'(' | b')' => {
                self.state = State::InPathPendingInsertSpace;
                FilterEvent::InsertSpace
            }
            _ => self.error_at(
                "unexpected character in path segment",
                "expected a name character, '.', '[', or a separator",
            ),
        }
    }

    fn in_path_bracket(&mut self, byte: u8) -> FilterEvent {
        match byte {
            b'"' => {
                self.state = State::InPathBracketString;
                FilterEvent::Continue
            }
            b']' => {
                self.state = State::InPath;
                FilterEvent::Continue
            }
            0 => self.error_at("unterminated filter", "expected ']' before end of input"),
            _ => FilterEvent::Continue,
        }
    }

    fn in_op(&mut self, byte: u8) -> FilterEvent {
        if byte.is_ascii_alphabetic() {
            self.op_buf.push((byte as char).to_ascii_lowercase());
            return FilterEvent::Continue;
        }
        self.resolve_op(byte)
    }

    fn resolve_op(&mut self, byte: u8) -> FilterEvent {
        if !LOGICAL_AND_RELATIONAL_OPS.contains(&self.op_buf.as_str()) {
            return self.error_at("unknown operator", "expected one of eq/ne/sw/ew/co/gt/ge/lt/le/pr/and/or");
        }
        match byte {
            b' ' => {
                self.state = State::Dispatch;
                FilterEvent::EndOp
            }
            0 => {
                self.state = State::Dispatch;
                FilterEvent::EndOp
            }
            b'(' | b')' => {
                self.state = State::InOpPendingInsertSpace;
                FilterEvent::InsertSpace
            }
            _ => self.error_at("unexpected character after operator", "expected a separator"),
        }
    }

    fn in_literal_bareword(&mut self, byte: u8) -> FilterEvent {
        if is_bareword_literal_continue(byte) {
            return FilterEvent::Continue;
        }
        match byte {
            b' ' => {
                self.state = State::Dispatch;
                FilterEvent::EndLiteral
            }
            0 => {
                self.state = State::Dispatch;
                FilterEvent::EndLiteral
            }
            b'(' | b')' => {
                self.state = State::InLiteralBarewordPendingInsertSpace;
                FilterEvent::InsertSpace
            }
            _ => self.error_at("unexpected character in literal", "expected a separator"),
        }
    }

    fn error_at(&mut self, message: &str, hint: &str) -> FilterEvent {
        FilterEvent::Error(ScanError::new(message, self.offset, hint, self.source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Drives the scanner through `input`, auto-advancing `expect` the way a
    /// real driver would, without building a tree. Enough to exercise the
    /// state machine's token boundaries.
    fn run(input: &str) -> Vec<FilterEvent> {
        let mut scanner = FilterScanner::new(input);
        let mut events = Vec::new();
        let bytes: Vec<u8> = input.bytes().chain([0, 0]).collect();
        let mut i = 0;
        let mut token = Vec::new();
        while i < bytes.len() {
            let byte = bytes[i];
            let event = scanner.step(byte);
            match &event {
                FilterEvent::BeginPath | FilterEvent::BeginAny | FilterEvent::BeginOp | FilterEvent::BeginLiteral => {
                    token.clear();
                    token.push(byte);
                }
                FilterEvent::Continue => token.push(byte),
                _ => {}
            }
            let expect = match &event {
                FilterEvent::EndPath => Some(Expect::Operator),
                FilterEvent::EndLiteral => Some(Expect::Operator),
                FilterEvent::EndOp => {
                    let text = String::from_utf8_lossy(&token).to_ascii_lowercase();
                    Some(match text.as_str() {
                        "pr" => Expect::Operator,
                        "and" | "or" | "not" => Expect::UnaryStart,
                        _ => Expect::Literal,
                    })
                }
                FilterEvent::Paren(b'(') => Some(Expect::UnaryStart),
                FilterEvent::Paren(_) => Some(Expect::Operator),
                _ => None,
            };
            let is_insert_space = event == FilterEvent::InsertSpace;
            let is_terminal = matches!(event, FilterEvent::End | FilterEvent::Error(_));
            events.push(event);
            if let Some(expect) = expect {
                scanner.expect(expect);
            }
            if is_terminal {
                break;
            }
            if is_insert_space {
                let ev = scanner.step(b' ');
                let expect = match &ev {
                    FilterEvent::EndOp => {
                        let text = String::from_utf8_lossy(&token).to_ascii_lowercase();
                        Some(match text.as_str() {
                            "pr" => Expect::Operator,
                            "and" | "or" | "not" => Expect::UnaryStart,
                            _ => Expect::Literal,
                        })
                    }
                    FilterEvent::EndPath => Some(Expect::Operator),
                    FilterEvent::EndLiteral => Some(Expect::Operator),
                    _ => None,
                };
                if let Some(expect) = expect {
                    scanner.expect(expect);
                }
                events.push(ev);
                continue; // replay the same byte now that the token is closed
            }
            i += 1;
        }
        events
    }

    #[test]
    fn simple_predicate() {
        let events = run(r#"value eq "x""#);
        assert_eq!(events[0], FilterEvent::BeginPath);
        assert!(events.contains(&FilterEvent::EndPath));
        assert!(events.contains(&FilterEvent::BeginOp));
        assert!(events.contains(&FilterEvent::EndOp));
        assert!(events.contains(&FilterEvent::BeginLiteral));
        assert_eq!(*events.last().unwrap(), FilterEvent::End);
        assert!(!events.iter().any(|e| matches!(e, FilterEvent::Error(_))));
    }

    #[test]
    fn not_versus_path_disambiguation() {
        let events = run(r#"not (value pr)"#);
        assert!(events.contains(&FilterEvent::BeginAny));
        assert!(events.contains(&FilterEvent::EndOp));
        assert!(!events.iter().any(|e| matches!(e, FilterEvent::Error(_))));
    }

    #[test]
    fn path_beginning_with_n_is_not_confused_with_not() {
        let events = run("nickName pr");
        assert!(events.contains(&FilterEvent::BeginAny));
        assert!(events.contains(&FilterEvent::EndPath));
        assert!(!events.iter().any(|e| matches!(e, FilterEvent::Error(_))));
    }

    #[test]
    fn not_glued_to_paren_inserts_virtual_space() {
        let events = run("not(value pr)");
        assert!(events.contains(&FilterEvent::InsertSpace));
        assert!(!events.iter().any(|e| matches!(e, FilterEvent::Error(_))));
    }

    #[test]
    fn pr_glued_to_close_paren_inserts_virtual_space() {
        let events = run("(value pr)");
        assert!(events.contains(&FilterEvent::InsertSpace));
        assert!(!events.iter().any(|e| matches!(e, FilterEvent::Error(_))));
    }

    #[test]
    fn unmatched_close_paren_errors() {
        let events = run("value pr)");
        assert!(events.iter().any(|e| matches!(e, FilterEvent::Error(_))));
    }

    #[test]
    fn string_with_escaped_bracket_does_not_end_path_filter() {
        let events = run(r#"emails[value eq "a\]b"] pr"#);
        assert!(!events.iter().any(|e| matches!(e, FilterEvent::Error(_))));
    }
}
