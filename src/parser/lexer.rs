//! Lexer (tokenizer) for GLSL source code
//!
//! Produces [`Token`]s on demand through [`Lexer::read`]. Whitespace and
//! comments never reach the parser. Preprocessor lines are handled here as
//! well: `#version` and `#extension` are recorded for the translation unit,
//! `#pragma` and `#line` are dropped, and anything else is rejected since no
//! preprocessor runs before the lexer.

use super::ast::{Directive, ExtensionBehavior, ExtensionDirective, VersionDirective};
use super::lexemes::{Keyword, Operator, MAX_OPERATOR_LEN};
use std::fmt;
use thiserror::Error;

/// Classification and payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Keyword(Keyword),
    Identifier(String),
    /// Includes parentheses, brackets, `,`, `:`, `.` and `?`.
    Operator(Operator),
    IntConstant(i32),
    UIntConstant(u32),
    FloatConstant(f32),
    DoubleConstant(f64),
    ScopeBegin,
    ScopeEnd,
    Semicolon,
    Eof,
}

/// A token and the 1-based line it starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize) -> Self {
        Token { kind, line }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn as_keyword(&self) -> Option<Keyword> {
        match self.kind {
            TokenKind::Keyword(keyword) => Some(keyword),
            _ => None,
        }
    }

    pub fn as_operator(&self) -> Option<Operator> {
        match self.kind {
            TokenKind::Operator(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(keyword) => write!(f, "'{}'", keyword),
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::Operator(op) => write!(f, "'{}'", op),
            TokenKind::IntConstant(n) => write!(f, "integer constant {}", n),
            TokenKind::UIntConstant(n) => write!(f, "unsigned constant {}u", n),
            TokenKind::FloatConstant(x) => write!(f, "float constant {:?}", x),
            TokenKind::DoubleConstant(x) => write!(f, "double constant {:?}lf", x),
            TokenKind::ScopeBegin => write!(f, "'{{'"),
            TokenKind::ScopeEnd => write!(f, "'}}'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} near line {line}")]
pub struct LexError {
    pub message: String,
    pub line: usize,
}

impl LexError {
    fn new(message: impl Into<String>, line: usize) -> Self {
        LexError {
            message: message.into(),
            line,
        }
    }
}

/// Lexer for GLSL source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    /// True while only whitespace has been seen on the current line.
    at_line_start: bool,
    directives: Vec<Directive>,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    ///
    /// A NUL character ends the input, whatever follows it.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().take_while(|ch| *ch != '\0').collect(),
            position: 0,
            line: 1,
            at_line_start: true,
            directives: Vec::new(),
        }
    }

    /// Read the next token. Returns `Eof` forever once input is exhausted.
    pub fn read(&mut self) -> Result<Token, LexError> {
        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                return Ok(Token::new(TokenKind::Eof, self.line));
            }

            if self.at_line_start && self.peek() == Some('#') {
                self.preprocessor_directive()?;
                continue;
            }

            return self.next_token();
        }
    }

    /// Tokenize the entire input, `Eof` included.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            let token = self.read()?;
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    /// Directives recorded so far, leaving the lexer's list empty.
    pub fn take_directives(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.directives)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let line = self.line;
        let ch = match self.peek() {
            Some(ch) => ch,
            None => return Ok(Token::new(TokenKind::Eof, line)),
        };

        if ch.is_ascii_digit()
            || (ch == '.' && self.peek_ahead(1).is_some_and(|next| next.is_ascii_digit()))
        {
            return self.number_literal();
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(self.identifier_or_keyword());
        }

        let kind = match ch {
            '{' => Some(TokenKind::ScopeBegin),
            '}' => Some(TokenKind::ScopeEnd),
            ';' => Some(TokenKind::Semicolon),
            _ => None,
        };
        if let Some(kind) = kind {
            self.advance();
            return Ok(Token::new(kind, line));
        }

        // Longest match first: ">>=" before ">>" before ">".
        for len in (1..=MAX_OPERATOR_LEN).rev() {
            if self.position + len > self.input.len() {
                continue;
            }
            let candidate: String = self.input[self.position..self.position + len].iter().collect();
            if let Some(op) = Operator::lookup(&candidate) {
                for _ in 0..len {
                    self.advance();
                }
                return Ok(Token::new(TokenKind::Operator(op), line));
            }
        }

        Err(LexError::new(format!("unexpected character '{}'", ch.escape_default()), line))
    }

    /// Parse integer, unsigned, float or double literal
    fn number_literal(&mut self) -> Result<Token, LexError> {
        let line = self.line;

        if self.peek() == Some('0') && matches!(self.peek_ahead(1), Some('x') | Some('X')) {
            self.advance();
            self.advance();
            let digits = self.take_while(|ch| ch.is_ascii_hexdigit());
            if digits.is_empty() {
                return Err(LexError::new("missing digits in hexadecimal literal", line));
            }
            let suffix = self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');
            return Self::integer_token(&digits, 16, &suffix, line);
        }

        let mut text = self.take_while(|ch| ch.is_ascii_digit());
        let mut is_float = false;

        if self.peek() == Some('.') {
            is_float = true;
            self.advance();
            text.push('.');
            text.push_str(&self.take_while(|ch| ch.is_ascii_digit()));
        }

        if let Some(exponent) = self.exponent() {
            is_float = true;
            text.push_str(&exponent);
        }

        let suffix = self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');

        if !is_float {
            match suffix.as_str() {
                "f" | "F" | "lf" | "LF" => {}
                _ => {
                    let radix = if text.len() > 1 && text.starts_with('0') { 8 } else { 10 };
                    return Self::integer_token(&text, radix, &suffix, line);
                }
            }
        }

        match suffix.as_str() {
            "" | "f" | "F" => text
                .parse::<f32>()
                .map(|value| Token::new(TokenKind::FloatConstant(value), line))
                .map_err(|_| LexError::new(format!("invalid float literal '{}'", text), line)),
            "lf" | "LF" => text
                .parse::<f64>()
                .map(|value| Token::new(TokenKind::DoubleConstant(value), line))
                .map_err(|_| LexError::new(format!("invalid double literal '{}'", text), line)),
            _ => Err(LexError::new(
                format!("invalid numeric literal suffix '{}'", suffix),
                line,
            )),
        }
    }

    /// Consume an exponent part (`e+10`) if one follows the cursor
    fn exponent(&mut self) -> Option<String> {
        if !matches!(self.peek(), Some('e') | Some('E')) {
            return None;
        }
        let signed = matches!(self.peek_ahead(1), Some('+') | Some('-'));
        let digit_at = if signed { 2 } else { 1 };
        if !self.peek_ahead(digit_at).is_some_and(|ch| ch.is_ascii_digit()) {
            return None;
        }

        let mut exponent = String::new();
        for _ in 0..digit_at {
            exponent.extend(self.advance());
        }
        exponent.push_str(&self.take_while(|ch| ch.is_ascii_digit()));
        Some(exponent)
    }

    fn integer_token(digits: &str, radix: u32, suffix: &str, line: usize) -> Result<Token, LexError> {
        let unsigned = match suffix {
            "" => false,
            "u" | "U" => true,
            _ => {
                return Err(LexError::new(
                    format!("invalid numeric literal suffix '{}'", suffix),
                    line,
                ))
            }
        };

        let value = u32::from_str_radix(digits, radix).map_err(|_| {
            if digits.chars().all(|ch| ch.is_digit(radix)) {
                LexError::new(format!("integer literal '{}' is out of range", digits), line)
            } else {
                LexError::new(format!("invalid digit in octal literal '{}'", digits), line)
            }
        })?;

        let kind = if unsigned {
            TokenKind::UIntConstant(value)
        } else {
            // Signed literals keep their 32-bit pattern (0xFFFFFFFF is -1).
            TokenKind::IntConstant(value as i32)
        };
        Ok(Token::new(kind, line))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self) -> Token {
        let line = self.line;
        let ident = self.take_while(|ch| ch.is_ascii_alphanumeric() || ch == '_');

        match Keyword::lookup(&ident) {
            Some(keyword) => Token::new(TokenKind::Keyword(keyword), line),
            None => Token::new(TokenKind::Identifier(ident), line),
        }
    }

    /// Record or skip one `#` line
    fn preprocessor_directive(&mut self) -> Result<(), LexError> {
        let line = self.line;
        self.advance(); // skip '#'

        let mut text = self.take_while(|ch| ch != '\n');
        if let Some(comment) = text.find("//") {
            text.truncate(comment);
        }

        let mut words = text.split_whitespace();
        match words.next() {
            None => Ok(()),
            Some("version") => {
                let number = words
                    .next()
                    .and_then(|word| word.parse::<u32>().ok())
                    .ok_or_else(|| LexError::new("expected version number after '#version'", line))?;
                let profile = words.next().map(str::to_string);
                self.directives.push(Directive::Version(VersionDirective {
                    number,
                    profile,
                    line,
                }));
                Ok(())
            }
            Some("extension") => {
                let rest = text.trim_start().trim_start_matches("extension");
                let (name, behavior) = rest
                    .split_once(':')
                    .map(|(name, behavior)| (name.trim(), behavior.trim()))
                    .ok_or_else(|| {
                        LexError::new("expected 'name : behavior' after '#extension'", line)
                    })?;
                let behavior = ExtensionBehavior::from_name(behavior).ok_or_else(|| {
                    LexError::new(format!("unknown extension behavior '{}'", behavior), line)
                })?;
                if name.is_empty() {
                    return Err(LexError::new("missing extension name", line));
                }
                self.directives.push(Directive::Extension(ExtensionDirective {
                    name: name.to_string(),
                    behavior,
                    line,
                }));
                Ok(())
            }
            Some(skipped @ ("pragma" | "line")) => {
                log::trace!("skipping #{} directive on line {}", skipped, line);
                Ok(())
            }
            Some(other) => Err(LexError::new(
                format!("preprocessor directive '#{}' is not supported", other),
                line,
            )),
        }
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') | Some('\x0B') | Some('\x0C') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...), leaving the newline
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_line = self.line;
        let at_line_start = self.at_line_start;
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                // A comment alone doesn't stop a directive from starting the line.
                if self.line == start_line {
                    self.at_line_start = at_line_start;
                }
                return Ok(());
            }
            self.advance();
        }

        Err(LexError::new("unterminated block comment", start_line))
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.at_line_start = true;
        } else if !ch.is_whitespace() {
            self.at_line_start = false;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexemes::BuiltinType;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("void main() { return; }");

        assert_eq!(tokens[0], TokenKind::Keyword(Keyword::Type(BuiltinType::Void)));
        assert_eq!(tokens[1], TokenKind::Identifier("main".to_string()));
        assert_eq!(tokens[2], TokenKind::Operator(Operator::ParenthesisBegin));
        assert_eq!(tokens[3], TokenKind::Operator(Operator::ParenthesisEnd));
        assert_eq!(tokens[4], TokenKind::ScopeBegin);
        assert_eq!(tokens[5], TokenKind::Keyword(Keyword::Return));
        assert_eq!(tokens[6], TokenKind::Semicolon);
        assert_eq!(tokens[7], TokenKind::ScopeEnd);
        assert_eq!(tokens[8], TokenKind::Eof);
    }

    #[test]
    fn test_longest_match_operators() {
        let tokens = kinds(">>= >> > >= ^^ ^= ++ + +=");

        assert_eq!(tokens[0], TokenKind::Operator(Operator::ShiftRightAssign));
        assert_eq!(tokens[1], TokenKind::Operator(Operator::ShiftRight));
        assert_eq!(tokens[2], TokenKind::Operator(Operator::Greater));
        assert_eq!(tokens[3], TokenKind::Operator(Operator::GreaterEqual));
        assert_eq!(tokens[4], TokenKind::Operator(Operator::LogicalXor));
        assert_eq!(tokens[5], TokenKind::Operator(Operator::BitXorAssign));
        assert_eq!(tokens[6], TokenKind::Operator(Operator::Increment));
        assert_eq!(tokens[7], TokenKind::Operator(Operator::Plus));
        assert_eq!(tokens[8], TokenKind::Operator(Operator::AddAssign));
    }

    #[test]
    fn test_operators_without_spaces() {
        let tokens = kinds("a+++b");

        assert_eq!(tokens[1], TokenKind::Operator(Operator::Increment));
        assert_eq!(tokens[2], TokenKind::Operator(Operator::Plus));
        assert!(matches!(tokens[3], TokenKind::Identifier(ref s) if s == "b"));
    }

    #[test]
    fn test_numeric_literals() {
        let tokens = kinds("42 42u 0x1F 017 1.5 .5 2. 1e3 2.5e-2 3f 1.0lf 0xFFFFFFFF");

        assert_eq!(tokens[0], TokenKind::IntConstant(42));
        assert_eq!(tokens[1], TokenKind::UIntConstant(42));
        assert_eq!(tokens[2], TokenKind::IntConstant(31));
        assert_eq!(tokens[3], TokenKind::IntConstant(15));
        assert_eq!(tokens[4], TokenKind::FloatConstant(1.5));
        assert_eq!(tokens[5], TokenKind::FloatConstant(0.5));
        assert_eq!(tokens[6], TokenKind::FloatConstant(2.0));
        assert_eq!(tokens[7], TokenKind::FloatConstant(1000.0));
        assert_eq!(tokens[8], TokenKind::FloatConstant(0.025));
        assert_eq!(tokens[9], TokenKind::FloatConstant(3.0));
        assert_eq!(tokens[10], TokenKind::DoubleConstant(1.0));
        assert_eq!(tokens[11], TokenKind::IntConstant(-1));
    }

    #[test]
    fn test_invalid_suffix() {
        let err = Lexer::new("\n12abc").tokenize().unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("suffix"), "{}", err.message);

        assert!(Lexer::new("1.0u").tokenize().is_err());
        assert!(Lexer::new("089").tokenize().is_err());
        assert!(Lexer::new("4294967296").tokenize().is_err());
    }

    #[test]
    fn test_comments_and_lines() {
        let tokens = Lexer::new("int x; // comment\nint y; /* block\ncomment */ int z;")
            .tokenize()
            .unwrap();

        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[3].line, 2);
        assert!(matches!(tokens[4].kind, TokenKind::Identifier(ref s) if s == "y"));
        assert!(matches!(tokens[7].kind, TokenKind::Identifier(ref s) if s == "z"));
        assert_eq!(tokens[7].line, 3);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let err = Lexer::new("int x;\n/* never\nclosed").tokenize().unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert!(matches!(lexer.read().unwrap().kind, TokenKind::Identifier(_)));
        assert!(lexer.read().unwrap().is_eof());
        assert!(lexer.read().unwrap().is_eof());
    }

    #[test]
    fn test_nul_terminates_input() {
        let tokens = kinds("int\0 garbage $$");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1], TokenKind::Eof);
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("int $x;").tokenize().unwrap_err();
        assert!(err.message.contains("'$'"));
    }

    #[test]
    fn test_directives() {
        let mut lexer = Lexer::new(
            "#version 440 core\n#extension GL_ARB_shading_language_420pack : enable\n#pragma optimize(on)\nvoid main() {}",
        );
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[0].line, 4);

        let directives = lexer.take_directives();
        assert_eq!(directives.len(), 2);
        assert!(matches!(
            &directives[0],
            Directive::Version(VersionDirective { number: 440, profile: Some(p), line: 1 }) if p == "core"
        ));
        assert!(matches!(
            &directives[1],
            Directive::Extension(ExtensionDirective { behavior: ExtensionBehavior::Enable, line: 2, .. })
        ));
    }

    #[test]
    fn test_unsupported_directive() {
        let err = Lexer::new("#define FOO 1\n").tokenize().unwrap_err();
        assert!(err.message.contains("#define"));
    }
}
