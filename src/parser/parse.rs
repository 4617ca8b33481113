//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: qualifiers, structures, interface blocks, functions and
//!   the top-level loop
//! - `statements`: statements and local declarations
//! - `expressions`: expressions with precedence climbing
//!
//! The parser pulls tokens from the [`Lexer`] one at a time and keeps at most
//! one token of lookahead past the current one. Names are resolved against a
//! [`ScopeChain`] while parsing, so the finished [`TranslationUnit`] never
//! holds an unresolved reference.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::lexemes::{Keyword, Operator};
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind};
use crate::parser::scope::{FunctionTable, ScopeChain, Symbol};
use crate::parser::stage::{BuiltinArray, ParseOptions, ShaderStage};
use std::fmt;
use thiserror::Error;

/// Category of a [`ParseError`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed token.
    Lexical,
    /// Token out of place for the grammar.
    Syntax,
    /// Construct not available in the selected shader stage.
    Stage,
    /// Undeclared, redeclared or redefined name.
    Scope,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::Stage => "stage error",
            ErrorKind::Scope => "scope error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parser error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_name}: {message} near line {line}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
    pub source_name: String,
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>, line: usize) -> Self {
        ParseError {
            kind,
            message: message.into(),
            line,
            source_name: String::new(),
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(ErrorKind::Lexical, err.message, err.line)
    }
}

/// Deepest nesting of statements and expressions before parsing gives up.
pub(crate) const MAX_NESTING_DEPTH: usize = 128;

/// Recursive descent parser for GLSL
pub struct Parser {
    source: String,
    source_name: String,
    lexer: Lexer,
    current: Token,
    lookahead: Option<Token>,
    previous_line: usize,
    pub(crate) stage: ShaderStage,
    pub(crate) unit: TranslationUnit,
    pub(crate) scopes: ScopeChain,
    pub(crate) functions: FunctionTable,
    pub(crate) loop_depth: usize,
    pub(crate) switch_depth: usize,
    depth: usize,
    /// Line of the `{` opening the function body being parsed.
    pub(crate) body_line: Option<usize>,
    error: Option<ParseError>,
}

impl Parser {
    pub fn new(source: &str, source_name: impl Into<String>) -> Self {
        Self {
            source: source.to_string(),
            source_name: source_name.into(),
            lexer: Lexer::new(source),
            current: Token::new(TokenKind::Eof, 1),
            lookahead: None,
            previous_line: 1,
            stage: ShaderStage::default(),
            unit: TranslationUnit::new(ShaderStage::default()),
            scopes: ScopeChain::new(),
            functions: FunctionTable::default(),
            loop_depth: 0,
            switch_depth: 0,
            depth: 0,
            body_line: None,
            error: None,
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// The error of the most recent failed [`Parser::parse`], if any.
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Parse the whole buffer as a shader of the given stage.
    ///
    /// Every call starts over from the beginning of the source with fresh
    /// state. On failure the partial tree is dropped and the error is also
    /// kept for [`Parser::error`].
    pub fn parse(&mut self, stage: ShaderStage) -> Result<TranslationUnit, ParseError> {
        log::debug!("parsing '{}' as a {} shader", self.source_name, stage);
        self.reset(stage);

        match self.parse_translation_unit() {
            Ok(unit) => {
                log::debug!(
                    "parsed '{}': {} globals, {} functions, {} structures",
                    self.source_name,
                    unit.globals.len(),
                    unit.functions.len(),
                    unit.structures.len()
                );
                self.error = None;
                Ok(unit)
            }
            Err(mut err) => {
                err.source_name = self.source_name.clone();
                log::debug!("failed to parse '{}': {}", self.source_name, err);
                self.unit = TranslationUnit::new(stage);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn reset(&mut self, stage: ShaderStage) {
        self.lexer = Lexer::new(&self.source);
        self.current = Token::new(TokenKind::Eof, 1);
        self.lookahead = None;
        self.previous_line = 1;
        self.stage = stage;
        self.unit = TranslationUnit::new(stage);
        self.scopes = ScopeChain::new();
        self.functions = FunctionTable::default();
        self.loop_depth = 0;
        self.switch_depth = 0;
        self.depth = 0;
        self.body_line = None;
        self.error = None;
    }

    fn parse_translation_unit(&mut self) -> Result<TranslationUnit, ParseError> {
        self.declare_builtin_variables();
        self.current = self.lexer.read()?;

        while !self.is_at_end() {
            self.parse_top_level_declaration()?;
        }

        for directive in self.lexer.take_directives() {
            match directive {
                Directive::Version(version) => {
                    if self.unit.version.is_some() {
                        return Err(ParseError::new(
                            ErrorKind::Syntax,
                            "duplicate '#version' directive",
                            version.line,
                        ));
                    }
                    self.unit.version = Some(version);
                }
                Directive::Extension(extension) => self.unit.extensions.push(extension),
            }
        }

        Ok(std::mem::replace(&mut self.unit, TranslationUnit::new(self.stage)))
    }

    fn declare_builtin_variables(&mut self) {
        for builtin in self.stage.builtin_variables() {
            let mut variable = Variable::new(
                builtin.name,
                builtin.ty,
                VariableKind::Builtin {
                    direction: builtin.direction,
                },
                0,
            );
            variable.is_const = builtin.is_const;
            match builtin.array {
                BuiltinArray::Scalar => {}
                BuiltinArray::Unsized => variable.array_sizes.push(None),
                BuiltinArray::Sized(size) => variable
                    .array_sizes
                    .push(Some(Expression::new(ExpressionKind::IntConstant(size), 0))),
            }

            let id = self.unit.add_variable(variable);
            self.scopes.declare_builtin(builtin.name, Symbol::Variable(id));
        }
    }

    // ===== Helper methods =====

    /// Run `parse` one nesting level deeper.
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.syntax_error(
                format!("nesting too deep (more than {} levels)", MAX_NESTING_DEPTH),
                self.current_line(),
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.current
    }

    /// The token after the current one.
    pub(crate) fn peek_next(&mut self) -> Result<&Token, ParseError> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.lexer.read()?);
        }
        match &self.lookahead {
            Some(token) => Ok(token),
            None => unreachable!("lookahead was just filled"),
        }
    }

    /// Consume the current token and return it.
    pub(crate) fn advance(&mut self) -> Result<Token, ParseError> {
        let next = match self.lookahead.take() {
            Some(token) => token,
            None => self.lexer.read()?,
        };
        let token = std::mem::replace(&mut self.current, next);
        self.previous_line = token.line;
        Ok(token)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current.is_eof()
    }

    pub(crate) fn current_line(&self) -> usize {
        self.current.line
    }

    pub(crate) fn previous_line(&self) -> usize {
        self.previous_line
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn check_operator(&self, op: Operator) -> bool {
        self.current.as_operator() == Some(op)
    }

    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current.as_keyword() == Some(keyword)
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> Result<bool, ParseError> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn match_operator(&mut self, op: Operator) -> Result<bool, ParseError> {
        if self.check_operator(op) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn match_keyword(&mut self, keyword: Keyword) -> Result<bool, ParseError> {
        if self.check_keyword(keyword) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect_token(&mut self, kind: &TokenKind, message: &str) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance()?;
            Ok(())
        } else {
            Err(self.unexpected(message))
        }
    }

    pub(crate) fn expect_operator(&mut self, op: Operator, ctx: &str) -> Result<(), ParseError> {
        if self.match_operator(op)? {
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected '{}' {}", op, ctx)))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_operator(Operator::ParenthesisBegin, ctx)
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_operator(Operator::ParenthesisEnd, ctx)
    }

    /// Expect `{` and return its line.
    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<usize, ParseError> {
        let line = self.current_line();
        self.expect_token(&TokenKind::ScopeBegin, &format!("expected '{{' {ctx}"))?;
        Ok(line)
    }

    /// Expect the `}` matching a `{` opened on `open_line`.
    ///
    /// Running out of input is reported at the opening line.
    pub(crate) fn expect_rbrace(&mut self, open_line: usize, ctx: &str) -> Result<(), ParseError> {
        if self.is_at_end() {
            return Err(ParseError::new(
                ErrorKind::Syntax,
                format!("missing '}}' {ctx}"),
                open_line,
            ));
        }
        self.expect_token(&TokenKind::ScopeEnd, &format!("expected '}}' {ctx}"))
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::Semicolon, &format!("expected ';' {ctx}"))
    }

    pub(crate) fn expect_identifier(&mut self, ctx: &str) -> Result<String, ParseError> {
        if let TokenKind::Identifier(_) = self.current.kind {
            match self.advance()?.kind {
                TokenKind::Identifier(name) => Ok(name),
                _ => unreachable!("current token was an identifier"),
            }
        } else {
            Err(self.unexpected(&format!("expected identifier {ctx}")))
        }
    }

    /// Syntax error quoting the current token.
    pub(crate) fn unexpected(&self, message: &str) -> ParseError {
        ParseError::new(
            ErrorKind::Syntax,
            format!("{}, found {}", message, self.current),
            self.current_line(),
        )
    }

    pub(crate) fn syntax_error(&self, message: impl Into<String>, line: usize) -> ParseError {
        ParseError::new(ErrorKind::Syntax, message, line)
    }

    pub(crate) fn stage_error(&self, message: impl Into<String>, line: usize) -> ParseError {
        ParseError::new(ErrorKind::Stage, message, line)
    }

    pub(crate) fn scope_error(&self, message: impl Into<String>, line: usize) -> ParseError {
        ParseError::new(ErrorKind::Scope, message, line)
    }
}

/// Parse `source` with the given options.
///
/// ```
/// use glsl_front::{parse, ParseOptions, ShaderStage};
///
/// let options = ParseOptions::default().with_stage(ShaderStage::Vertex);
/// let unit = parse("void main() { gl_Position = vec4(0.0); }", &options).unwrap();
/// assert_eq!(unit.functions.len(), 1);
/// ```
pub fn parse(source: &str, options: &ParseOptions) -> Result<TranslationUnit, ParseError> {
    Parser::new(source, options.source_name.clone()).parse(options.stage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::lexemes::BuiltinType;

    fn parse_fragment(source: &str) -> Result<TranslationUnit, ParseError> {
        Parser::new(source, "test.frag").parse(ShaderStage::Fragment)
    }

    #[test]
    fn test_parse_simple_function() {
        let unit = parse_fragment("void main() { return; }").unwrap();

        assert_eq!(unit.functions.len(), 1);
        let main = &unit.functions[0];
        assert_eq!(main.name, "main");
        assert!(main.parameters.is_empty());
        assert_eq!(main.return_type, TypeRef::Builtin(BuiltinType::Void));
        assert!(!main.is_prototype);
        assert_eq!(main.body.len(), 1);
    }

    #[test]
    fn test_parse_global() {
        let unit = parse_fragment("int x;").unwrap();

        assert_eq!(unit.globals.len(), 1);
        let x = unit.variable(unit.globals[0]);
        assert_eq!(x.name, "x");
        assert_eq!(x.base_type, TypeRef::Builtin(BuiltinType::Int));
        assert_eq!(x.global_qualifiers(), Some(&GlobalQualifiers::default()));
        assert!(x.initial_value.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = parse_fragment("void main() {\n  x = 1;\n}").unwrap_err();

        assert_eq!(err.kind, ErrorKind::Scope);
        assert_eq!(err.line, 2);
        assert_eq!(
            err.to_string(),
            "test.frag: use of undeclared identifier 'x' near line 2"
        );
    }

    #[test]
    fn test_error_is_remembered() {
        let mut parser = Parser::new("int x", "test.frag");
        assert!(parser.parse(ShaderStage::Fragment).is_err());
        assert!(parser.error().unwrap().message.contains("';'"));
    }

    #[test]
    fn test_reparse_starts_fresh() {
        let mut parser = Parser::new("float f; void main() {}", "test.frag");
        let first = parser.parse(ShaderStage::Fragment).unwrap();
        let second = parser.parse(ShaderStage::Fragment).unwrap();

        assert_eq!(first, second);
        assert!(parser.error().is_none());
    }

    #[test]
    fn test_lexical_error_kind() {
        let err = parse_fragment("int x = 12abc;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.source_name, "test.frag");
    }

    #[test]
    fn test_directives_recorded() {
        let unit = parse_fragment("#version 440\n#extension GL_ARB_gpu_shader5 : require\nvoid main() {}")
            .unwrap();

        assert_eq!(unit.version.as_ref().map(|version| version.number), Some(440));
        assert_eq!(unit.extensions.len(), 1);
        assert_eq!(unit.extensions[0].behavior, ExtensionBehavior::Require);
    }
}
