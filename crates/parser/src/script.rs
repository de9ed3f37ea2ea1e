/// A single SQL statement extracted from a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based line where the statement's first token starts.
    pub lineno: usize,
    /// Statement text without the terminating `;` and without leading comments.
    pub sql: String,
}

/// Splits SQL text on top-level `;` terminators.
///
/// Semicolons inside single-quoted strings (including `E'...'` strings with
/// backslash escapes), dollar-quoted strings (`$$...$$`, `$tag$...$tag$`),
/// double-quoted identifiers, `--` line comments and `/* */` block comments do
/// not terminate a statement. Statements made only of whitespace and comments
/// are dropped.
pub struct ScriptParser<'a> {
    content: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> ScriptParser<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            pos: 0,
            line: 1,
        }
    }

    pub fn parse(&mut self) -> Vec<Statement> {
        self.pos = 0;
        self.line = 1;

        let mut statements = Vec::new();
        while self.pos < self.content.len() {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }
        }
        statements
    }

    pub fn set_content(&mut self, content: &'a str) {
        self.content = content;
        self.pos = 0;
        self.line = 1;
    }

    fn parse_statement(&mut self) -> Option<Statement> {
        let mut buf = String::new();
        let mut start_line: Option<usize> = None;

        while self.pos < self.content.len() {
            if self.lookahead("--") {
                let comment = self.take_until("\n", false);
                if start_line.is_some() {
                    buf.push_str(&comment);
                }
            } else if self.lookahead("/*") {
                let comment = self.take_until("*/", true);
                if start_line.is_some() {
                    buf.push_str(&comment);
                }
            } else {
                let line = self.line;
                let c = self.consume();
                match c {
                    ';' => break,
                    '\'' | '"' => {
                        start_line.get_or_insert(line);
                        buf.push(c);
                        self.take_quoted(c, &mut buf);
                    }
                    'e' | 'E'
                        if self.peek() == Some('\'')
                            && !buf.ends_with(|p: char| p.is_alphanumeric() || p == '_') =>
                    {
                        start_line.get_or_insert(line);
                        buf.push(c);
                        buf.push(self.consume());
                        self.take_escaped(&mut buf);
                    }
                    '$' => {
                        start_line.get_or_insert(line);
                        buf.push(c);
                        if let Some(tag) = self.dollar_tag() {
                            let close = format!("${tag}");
                            for _ in tag.chars() {
                                buf.push(self.consume());
                            }
                            buf.push_str(&self.take_until(&close, true));
                        }
                    }
                    c if c.is_whitespace() => {
                        if start_line.is_some() {
                            buf.push(c);
                        }
                    }
                    c => {
                        start_line.get_or_insert(line);
                        buf.push(c);
                    }
                }
            }
        }

        start_line.map(|lineno| Statement {
            lineno,
            sql: buf.trim_end().to_string(),
        })
    }

    /// Consume the body of a quoted section whose opening `quote` was already consumed.
    /// A doubled quote is an escaped quote and does not close the section.
    fn take_quoted(&mut self, quote: char, buf: &mut String) {
        while self.pos < self.content.len() {
            let c = self.consume();
            buf.push(c);
            if c == quote {
                if self.peek() == Some(quote) {
                    buf.push(self.consume());
                    continue;
                }
                return;
            }
        }
    }

    /// Body of an `E'...'` string: a backslash escapes the next character.
    fn take_escaped(&mut self, buf: &mut String) {
        while self.pos < self.content.len() {
            let c = self.consume();
            buf.push(c);
            match c {
                '\\' if self.pos < self.content.len() => buf.push(self.consume()),
                '\'' if self.peek() == Some('\'') => buf.push(self.consume()),
                '\'' => return,
                _ => {}
            }
        }
    }

    /// After a `$`, the rest of a dollar-quote opener (`$` or `tag$`), if any.
    /// `$1` and `$name` parameters are not openers.
    fn dollar_tag(&self) -> Option<&'a str> {
        let rest = &self.content[self.pos..];
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if rest[..len].starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        rest[len..].starts_with('$').then(|| &rest[..len + 1])
    }

    /// Consume up to `end`. The terminator itself is consumed only when `inclusive`.
    fn take_until(&mut self, end: &str, inclusive: bool) -> String {
        let mut out = String::new();
        while self.pos < self.content.len() && !self.lookahead(end) {
            out.push(self.consume());
        }
        if inclusive && self.lookahead(end) {
            for _ in end.chars() {
                out.push(self.consume());
            }
        }
        out
    }

    fn lookahead(&self, pat: &str) -> bool {
        self.content.as_bytes()[self.pos..].starts_with(pat.as_bytes())
    }

    fn peek(&self) -> Option<char> {
        self.content[self.pos..].chars().next()
    }

    fn consume(&mut self) -> char {
        let ch = self.peek().unwrap_or('\0');
        // advance by the byte length of this char
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        ch
    }
}

/// Convenience wrapper around [`ScriptParser`].
pub fn split_statements(content: &str) -> Vec<Statement> {
    ScriptParser::new(content).parse()
}
