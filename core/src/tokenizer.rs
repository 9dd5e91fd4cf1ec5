//! Tokenizer for raw command lines.
//!
//! A single left-to-right scan with an explicit stack of open delimiters.
//! Quotes and braces nest inside each other (`{-z"{A}B"}` is one token), so
//! a flat split or a regex cannot express the rules. Malformed input never
//! fails: an unterminated span consumes the rest of the line.

/// Option reference prefix.
pub const OPTION_PREFIX: char = '-';
/// Separator between independently bound argument groups.
pub const SEPARATOR: &str = "|";

const OPEN_BRACE: char = '{';
const CLOSE_BRACE: char = '}';
const QUOTE: char = '"';
const SINGLE_QUOTE: char = '\'';
const ESCAPE: char = '\\';
const PIPE: char = '|';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Brace,
    Quote,
    SingleQuote,
    TripleQuote,
}

/// Splits a raw command line into tokens.
///
/// # Examples
///
/// ```
/// use optline_core::tokenize;
///
/// assert_eq!(tokenize("  -n 99 "), vec!["-n", "99"]);
/// assert_eq!(tokenize(r#"-text "a b c""#), vec!["-text", r#""a b c""#]);
/// assert_eq!(tokenize(r#"-options {-z "AA"}"#), vec!["-options", r#"{-z "AA"}"#]);
/// assert_eq!(tokenize("-A 1 | -B 2"), vec!["-A", "1", "|", "-B", "2"]);
/// ```
pub fn tokenize(raw: &str) -> Vec<String> {
    Lexer::new(raw).run()
}

struct Lexer<'a> {
    raw: &'a str,
    chars: Vec<(usize, char)>,
    stack: Vec<Delimiter>,
    tokens: Vec<String>,
    /// Byte offset where the current token starts.
    start: usize,
}

impl<'a> Lexer<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            chars: raw.char_indices().collect(),
            stack: Vec::new(),
            tokens: Vec::new(),
            start: 0,
        }
    }

    fn run(mut self) -> Vec<String> {
        let mut i = 0;
        while i < self.chars.len() {
            i = if self.stack.is_empty() {
                self.scan_open(i)
            } else {
                self.scan_enclosed(i)
            };
        }

        self.emit(self.raw.len());
        self.tokens
    }

    /// Handles one position outside any delimiter; returns the next position.
    fn scan_open(&mut self, i: usize) -> usize {
        let c = self.chars[i].1;
        if c.is_whitespace() {
            self.cut(i, i + 1);
            i + 1
        } else if c == PIPE || c == CLOSE_BRACE {
            // Separators and unmatched closing braces stand alone.
            self.cut(i, i);
            self.emit(self.offset(i + 1));
            self.start = self.offset(i + 1);
            i + 1
        } else if self.triple_quote_at(i) {
            self.cut(i, i);
            self.stack.push(Delimiter::TripleQuote);
            i + 3
        } else if c == OPEN_BRACE {
            self.cut(i, i);
            self.stack.push(Delimiter::Brace);
            i + 1
        } else if c == QUOTE && !self.escaped(i) {
            self.cut(i, i);
            self.stack.push(Delimiter::Quote);
            i + 1
        } else if c == SINGLE_QUOTE && !self.escaped(i) {
            self.cut(i, i);
            self.stack.push(Delimiter::SingleQuote);
            i + 1
        } else {
            i + 1
        }
    }

    /// Handles one position inside the innermost open delimiter.
    fn scan_enclosed(&mut self, i: usize) -> usize {
        let c = self.chars[i].1;
        let top = match self.stack.last() {
            Some(top) => *top,
            None => return i,
        };

        match top {
            Delimiter::TripleQuote => {
                if self.triple_quote_at(i) {
                    // Swallow the whole run so `""""` closes after the last quote.
                    let run = self.quote_run(i);
                    self.close(i + run);
                    i + run
                } else {
                    i + 1
                }
            }
            Delimiter::Quote => {
                if c == QUOTE && !self.escaped(i) {
                    self.close(i + 1);
                }
                i + 1
            }
            Delimiter::SingleQuote => {
                if c == SINGLE_QUOTE && !self.escaped(i) {
                    self.close(i + 1);
                }
                i + 1
            }
            Delimiter::Brace => {
                if self.triple_quote_at(i) {
                    self.stack.push(Delimiter::TripleQuote);
                    i + 3
                } else if c == QUOTE && !self.escaped(i) {
                    self.stack.push(Delimiter::Quote);
                    i + 1
                } else if c == SINGLE_QUOTE && !self.escaped(i) {
                    self.stack.push(Delimiter::SingleQuote);
                    i + 1
                } else if c == OPEN_BRACE {
                    self.stack.push(Delimiter::Brace);
                    i + 1
                } else if c == CLOSE_BRACE {
                    self.close(i + 1);
                    i + 1
                } else {
                    i + 1
                }
            }
        }
    }

    /// Pops the innermost delimiter; when the stack empties, the span up to
    /// `end` (a char index) becomes a token.
    fn close(&mut self, end: usize) {
        self.stack.pop();
        if self.stack.is_empty() {
            let end = self.offset(end);
            self.emit(end);
            self.start = end;
        }
    }

    /// Emits the pending token ending before char `end`, restarting at char `next`.
    fn cut(&mut self, end: usize, next: usize) {
        self.emit(self.offset(end));
        self.start = self.offset(next);
    }

    fn emit(&mut self, end: usize) {
        if self.start < end {
            let token = self.raw[self.start..end].trim();
            if !token.is_empty() {
                self.tokens.push(token.to_string());
            }
        }
    }

    fn offset(&self, index: usize) -> usize {
        self.chars
            .get(index)
            .map(|(offset, _)| *offset)
            .unwrap_or(self.raw.len())
    }

    fn escaped(&self, index: usize) -> bool {
        index > 0 && self.chars[index - 1].1 == ESCAPE
    }

    fn triple_quote_at(&self, index: usize) -> bool {
        self.quote_run(index) >= 3
    }

    fn quote_run(&self, index: usize) -> usize {
        self.chars[index..]
            .iter()
            .take_while(|(_, c)| *c == QUOTE)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(raw: &str, expected: &[&str]) {
        assert_eq!(tokenize(raw), expected, "input: {raw:?}");
    }

    #[test]
    fn test_whitespace_splitting() {
        check("", &[]);
        check("   ", &[]);
        check("test", &["test"]);
        check("test -abc", &["test", "-abc"]);
        check("  -n 99 ", &["-n", "99"]);
        check("  -test  1 23  ", &["-test", "1", "23"]);
        check("a\tb\r\nc", &["a", "b", "c"]);
    }

    #[test]
    fn test_quoted_spans() {
        check(r#"-text "abc""#, &["-text", r#""abc""#]);
        check(r#"-text "a b c""#, &["-text", r#""a b c""#]);
        check("-text 'a b' x", &["-text", "'a b'", "x"]);
        check(r#" -text"a \"b c" "#, &["-text", r#""a \"b c""#]);
        check(r#"-text "a 'b' c""#, &["-text", r#""a 'b' c""#]);
        check(r#"a\"b c"#, &[r#"a\"b"#, "c"]);
    }

    #[test]
    fn test_unterminated_quote_consumes_rest() {
        check(r#"-text "a b c"#, &["-text", r#""a b c"#]);
        check("-text 'a | b", &["-text", "'a | b"]);
    }

    #[test]
    fn test_triple_quotes_preserve_content() {
        let raw = "-s \"\"\"line 1\n  \"quoted\" and 'single'\nline 3\"\"\" -n 1";
        check(
            raw,
            &[
                "-s",
                "\"\"\"line 1\n  \"quoted\" and 'single'\nline 3\"\"\"",
                "-n",
                "1",
            ],
        );
        check("-s \"\"\"a\"\"\"\" x", &["-s", "\"\"\"a\"\"\"\"", "x"]);
    }

    #[test]
    fn test_brace_nesting() {
        check("-options {}", &["-options", "{}"]);
        check("-options {}} ", &["-options", "{}", "}"]);
        check("-options {{} ", &["-options", "{{}"]);
        check(r#"-options {-z "AA"}"#, &["-options", r#"{-z "AA"}"#]);
        check(r#"-options {-z"AA"} "#, &["-options", r#"{-z"AA"}"#]);
        check(r#"-options {-z"{A}B"}"#, &["-options", r#"{-z"{A}B"}"#]);
        check(
            r#"-ns {-node "{3.18.216.240}:49152(1)"}"#,
            &["-ns", r#"{-node "{3.18.216.240}:49152(1)"}"#],
        );
        check(
            r#"-options {-text "message"} -string "{options2}""#,
            &["-options", r#"{-text "message"}"#, "-string", r#""{options2}""#],
        );
        check("-o {-a {-b 1} | -c 2}", &["-o", "{-a {-b 1} | -c 2}"]);
    }

    #[test]
    fn test_separator_stands_alone() {
        check("-A 1 | -B 2", &["-A", "1", "|", "-B", "2"]);
        check("-A 1|-B 2", &["-A", "1", "|", "-B", "2"]);
        check("||", &["|", "|"]);
        check(r#"-t "a|b""#, &["-t", r#""a|b""#]);
    }

    #[test]
    fn test_multibyte_text() {
        check("-name \"日本 語\" ü", &["-name", "\"日本 語\"", "ü"]);
    }
}
