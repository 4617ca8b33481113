//! Statement parsing implementation
//!
//! This module handles parsing of all GLSL statement types:
//!
//! - Local declarations: `const float scale = 2.0;`
//! - Control flow: `if`, `while`, `for`, `do-while`, `switch`
//! - Jump statements: `return`, `break`, `continue`, `discard`
//! - Compound statements: `{ ... }`
//! - Expression statements: function calls, assignments
//!
//! # Grammar
//!
//! ```text
//! statement ::= local_decl | if_stmt | while_stmt | for_stmt
//!             | do_while_stmt | switch_stmt | return_stmt
//!             | break_stmt | continue_stmt | discard_stmt
//!             | block | ';' | expr ';'
//! switch_stmt ::= 'switch' '(' expr ')' '{' { case_label | statement } '}'
//! case_label  ::= 'case' expr ':' | 'default' ':'
//! ```
//!
//! `case` and `default` are only accepted directly inside a switch body, so
//! they appear as flat [`StatementKind::CaseLabel`] entries rather than
//! owning the statements that follow them.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::declarations::is_qualifier_keyword;
use crate::parser::lexemes::{Keyword, Operator};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse statements up to and including the `}` opened on `open_line`
    pub(crate) fn parse_block_statements(
        &mut self,
        open_line: usize,
        ctx: &str,
    ) -> Result<Vec<Statement>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&TokenKind::ScopeEnd) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        self.expect_rbrace(open_line, ctx)?;
        Ok(statements)
    }

    /// Parse a statement one nesting level down
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        self.nested(Self::parse_single_statement)
    }

    fn parse_single_statement(&mut self) -> Result<Statement, ParseError> {
        let line = self.current_line();

        if self.check(&TokenKind::ScopeBegin) {
            return self.parse_compound_statement();
        }

        if self.match_token(&TokenKind::Semicolon)? {
            return Ok(Statement::new(StatementKind::Empty, line));
        }

        if let Some(keyword) = self.peek().as_keyword() {
            match keyword {
                Keyword::If => return self.parse_if_statement(),
                Keyword::Switch => return self.parse_switch_statement(),
                Keyword::While => return self.parse_while_statement(),
                Keyword::Do => return self.parse_do_while_statement(),
                Keyword::For => return self.parse_for_statement(),
                Keyword::Return => return self.parse_return_statement(),
                Keyword::Break => return self.parse_break_statement(),
                Keyword::Continue => return self.parse_continue_statement(),
                Keyword::Discard => return self.parse_discard_statement(),
                Keyword::Case | Keyword::Default => {
                    return Err(self.syntax_error(
                        format!("'{}' label outside of a switch body", keyword),
                        line,
                    ));
                }
                Keyword::Struct => {
                    return Err(self.syntax_error(
                        "structures can only be defined at global scope",
                        line,
                    ));
                }
                _ => {}
            }
        }

        if self.is_declaration_start()? {
            let variables = self.parse_local_declaration()?;
            return Ok(Statement::new(StatementKind::Declaration(variables), line));
        }

        // Otherwise, it's an expression statement
        let expression = self.parse_expression()?;
        self.expect_semicolon("after expression")?;
        Ok(Statement::new(StatementKind::Expression(expression), line))
    }

    /// Whether the upcoming tokens start a local declaration
    ///
    /// Type names start a declaration only when a name or `[` follows them;
    /// otherwise `vec3(...)` and `S(...)` are constructor calls.
    fn is_declaration_start(&mut self) -> Result<bool, ParseError> {
        match self.peek().as_keyword() {
            Some(Keyword::Type(_)) => {}
            Some(keyword) => return Ok(is_qualifier_keyword(keyword)),
            None => {
                if !self.is_type_start() {
                    return Ok(false);
                }
            }
        }
        let next = self.peek_next()?;
        Ok(matches!(next.kind, TokenKind::Identifier(_)) || next.as_operator() == Some(Operator::BracketBegin))
    }

    /// Parse `[const] [precise] [precision] type declarators ;`
    pub(crate) fn parse_local_declaration(&mut self) -> Result<Vec<VariableId>, ParseError> {
        let qualifiers = self.parse_qualifiers()?;
        if let Some(name) = qualifiers.first_disallowed(&["const", "precise", "lowp", "mediump", "highp"]) {
            return Err(self.syntax_error(
                format!("'{}' is not allowed on local variables", name),
                qualifiers.line,
            ));
        }

        let ty = self.parse_type_specifier()?;
        let type_sizes = self.parse_array_sizes()?;
        let line = self.current_line();
        let name = self.expect_identifier("in declaration")?;

        // `type name (` cannot start a statement: the enclosing body was left open.
        if self.check_operator(Operator::ParenthesisBegin) {
            if let Some(open_line) = self.body_line {
                return Err(self.syntax_error("missing '}' to close function body", open_line));
            }
        }

        let mut template = Variable::new(String::new(), ty, VariableKind::Local, line);
        template.is_const = qualifiers.is_const;
        template.is_precise = qualifiers.is_precise;
        template.precision = qualifiers.precision;
        template.array_sizes = type_sizes;

        self.parse_declarators(&template, name, line)
    }

    /// Parse `{ ... }` in a new scope
    fn parse_compound_statement(&mut self) -> Result<Statement, ParseError> {
        self.scopes.begin_scope();
        let compound = self.parse_compound_in_current_scope()?;
        self.scopes.end_scope();
        Ok(compound)
    }

    fn parse_compound_in_current_scope(&mut self) -> Result<Statement, ParseError> {
        let line = self.expect_lbrace("to begin block")?;
        let statements = self.parse_block_statements(line, "to close block")?;
        Ok(Statement::new(StatementKind::Compound(statements), line))
    }

    /// Parse a loop body with `break` and `continue` enabled
    ///
    /// With `in_loop_scope`, a `{ ... }` body declares into the scope the
    /// loop header opened, so it cannot redeclare the header's variables.
    fn parse_loop_body(&mut self, in_loop_scope: bool) -> Result<Box<Statement>, ParseError> {
        self.loop_depth += 1;
        let body = if in_loop_scope && self.check(&TokenKind::ScopeBegin) {
            self.nested(Self::parse_compound_in_current_scope)
        } else {
            self.parse_statement()
        };
        self.loop_depth -= 1;
        body.map(Box::new)
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        let line = self.current_line();
        self.advance()?; // 'return'

        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.expect_semicolon("after return")?;
        Ok(Statement::new(StatementKind::Return(value), line))
    }

    fn parse_break_statement(&mut self) -> Result<Statement, ParseError> {
        let line = self.current_line();
        self.advance()?; // 'break'

        if self.loop_depth == 0 && self.switch_depth == 0 {
            return Err(self.syntax_error("'break' outside of a loop or switch", line));
        }

        self.expect_semicolon("after 'break'")?;
        Ok(Statement::new(StatementKind::Break, line))
    }

    fn parse_continue_statement(&mut self) -> Result<Statement, ParseError> {
        let line = self.current_line();
        self.advance()?; // 'continue'

        if self.loop_depth == 0 {
            return Err(self.syntax_error("'continue' outside of a loop", line));
        }

        self.expect_semicolon("after 'continue'")?;
        Ok(Statement::new(StatementKind::Continue, line))
    }

    fn parse_discard_statement(&mut self) -> Result<Statement, ParseError> {
        let line = self.current_line();
        self.advance()?; // 'discard'

        if !self.stage.allows_discard() {
            return Err(self.stage_error(
                format!("'discard' is not allowed in {} shaders", self.stage),
                line,
            ));
        }

        self.expect_semicolon("after 'discard'")?;
        Ok(Statement::new(StatementKind::Discard, line))
    }

    /// Parse if statement; `else` binds to the nearest `if`
    fn parse_if_statement(&mut self) -> Result<Statement, ParseError> {
        let line = self.current_line();
        self.advance()?; // 'if'

        self.expect_lparen("after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after if condition")?;

        let then_branch = Box::new(self.parse_statement()?);

        let else_branch = if self.match_keyword(Keyword::Else)? {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Statement::new(
            StatementKind::If {
                condition,
                then_branch,
                else_branch,
            },
            line,
        ))
    }

    /// Parse switch statement with its flat body
    fn parse_switch_statement(&mut self) -> Result<Statement, ParseError> {
        let line = self.current_line();
        self.advance()?; // 'switch'

        self.expect_lparen("after 'switch'")?;
        let selector = self.parse_expression()?;
        self.expect_rparen("after switch selector")?;

        let open_line = self.expect_lbrace("to begin switch body")?;
        self.scopes.begin_scope();
        self.switch_depth += 1;

        let mut body = Vec::new();
        while !self.check(&TokenKind::ScopeEnd) && !self.is_at_end() {
            let label_line = self.current_line();
            if self.match_keyword(Keyword::Case)? {
                let value = self.parse_expression()?;
                self.expect_operator(Operator::Colon, "after case label")?;
                body.push(Statement::new(StatementKind::CaseLabel(Some(value)), label_line));
            } else if self.match_keyword(Keyword::Default)? {
                self.expect_operator(Operator::Colon, "after 'default'")?;
                body.push(Statement::new(StatementKind::CaseLabel(None), label_line));
            } else {
                body.push(self.parse_statement()?);
            }
        }
        self.expect_rbrace(open_line, "to close switch body")?;

        self.switch_depth -= 1;
        self.scopes.end_scope();

        Ok(Statement::new(StatementKind::Switch { selector, body }, line))
    }

    /// Parse while statement; the condition may declare a variable
    fn parse_while_statement(&mut self) -> Result<Statement, ParseError> {
        let line = self.current_line();
        self.advance()?; // 'while'

        self.scopes.begin_scope();
        self.expect_lparen("after 'while'")?;
        let condition = self.parse_loop_condition()?;
        self.expect_rparen("after while condition")?;

        let body = self.parse_loop_body(true)?;
        self.scopes.end_scope();

        Ok(Statement::new(StatementKind::While { condition, body }, line))
    }

    /// Parse `type name = initializer` or an expression
    fn parse_loop_condition(&mut self) -> Result<LoopClause, ParseError> {
        if !self.is_declaration_start()? {
            return Ok(LoopClause::Expression(self.parse_expression()?));
        }

        let ty = self.parse_type_specifier()?;
        let line = self.current_line();
        let name = self.expect_identifier("in condition declaration")?;
        self.expect_operator(Operator::Assign, "in condition declaration")?;
        let initializer = self.parse_assignment()?;

        let mut variable = Variable::new(name, ty, VariableKind::Local, line);
        variable.initial_value = Some(initializer);
        let id = self.declare_variable(variable)?;

        Ok(LoopClause::Declaration(vec![id]))
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self) -> Result<Statement, ParseError> {
        let line = self.current_line();
        self.advance()?; // 'do'

        let body = self.parse_loop_body(false)?;

        if !self.match_keyword(Keyword::While)? {
            return Err(self.unexpected("expected 'while' after do body"));
        }
        self.expect_lparen("after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after do-while condition")?;
        self.expect_semicolon("after do-while")?;

        Ok(Statement::new(StatementKind::Do { body, condition }, line))
    }

    /// Parse for statement; the loop owns a scope for its initializer
    fn parse_for_statement(&mut self) -> Result<Statement, ParseError> {
        let line = self.current_line();
        self.advance()?; // 'for'

        self.expect_lparen("after 'for'")?;
        self.scopes.begin_scope();

        // Init (optional)
        let init = if self.match_token(&TokenKind::Semicolon)? {
            None
        } else if self.is_declaration_start()? {
            // Declaration includes semicolon, so don't expect another
            Some(LoopClause::Declaration(self.parse_local_declaration()?))
        } else {
            let expression = self.parse_expression()?;
            self.expect_semicolon("after for initializer")?;
            Some(LoopClause::Expression(expression))
        };

        // Condition (optional)
        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon("after for condition")?;

        // Step (optional)
        let step = if self.check_operator(Operator::ParenthesisEnd) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_rparen("after for clauses")?;

        let body = self.parse_loop_body(true)?;
        self.scopes.end_scope();

        Ok(Statement::new(
            StatementKind::For {
                init,
                condition,
                step,
                body,
            },
            line,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::{ErrorKind, ParseError, Parser};
    use crate::parser::stage::ShaderStage;

    fn parse_body(stage: ShaderStage, body: &str) -> Result<Vec<Statement>, ParseError> {
        let source = format!("void main() {{\n{}\n}}", body);
        let mut unit = Parser::new(&source, "test").parse(stage)?;
        Ok(unit.functions.remove(0).body)
    }

    fn fragment_body(body: &str) -> Vec<Statement> {
        parse_body(ShaderStage::Fragment, body).unwrap()
    }

    #[test]
    fn test_local_declarations() {
        let body = fragment_body("const float a = 1.0, b = 2.0; mediump vec3 c; c = vec3(a);");

        assert_eq!(body.len(), 3);
        assert!(matches!(&body[0].kind, StatementKind::Declaration(ids) if ids.len() == 2));
        assert!(matches!(&body[1].kind, StatementKind::Declaration(ids) if ids.len() == 1));
        assert!(matches!(body[2].kind, StatementKind::Expression(_)));
    }

    #[test]
    fn test_storage_qualifier_on_local() {
        let err = parse_body(ShaderStage::Fragment, "uniform float x;").unwrap_err();
        assert!(err.message.contains("local variables"));
    }

    #[test]
    fn test_dangling_else_binds_to_nearest_if() {
        let body = fragment_body("bool a = true, b = false; if (a) if (b) return; else return;");

        match &body[1].kind {
            StatementKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert!(else_branch.is_none());
                assert!(matches!(
                    then_branch.kind,
                    StatementKind::If {
                        else_branch: Some(_),
                        ..
                    }
                ));
            }
            other => panic!("Expected if statement, got {:?}", other),
        }
    }

    #[test]
    fn test_switch_body_is_flat() {
        let body = fragment_body("int x = 1;\nswitch (x) {\ncase 0:\ncase 1: x = 2; break;\ndefault: break;\n}");

        match &body[1].kind {
            StatementKind::Switch { body, .. } => {
                assert_eq!(body.len(), 6);
                assert!(matches!(body[0].kind, StatementKind::CaseLabel(Some(_))));
                assert!(matches!(body[1].kind, StatementKind::CaseLabel(Some(_))));
                assert!(matches!(body[3].kind, StatementKind::Break));
                assert!(matches!(body[4].kind, StatementKind::CaseLabel(None)));
                assert_eq!(body[4].line, 6);
            }
            other => panic!("Expected switch statement, got {:?}", other),
        }
    }

    #[test]
    fn test_case_outside_switch() {
        let err = parse_body(ShaderStage::Fragment, "int x = 1; switch (x) { case 0: { case 1: } }")
            .unwrap_err();
        assert!(err.message.contains("outside of a switch"));
    }

    #[test]
    fn test_loops() {
        let body = fragment_body(
            "for (int i = 0; i < 4; ++i) { continue; }\n\
             for (;;) break;\n\
             int n = 3; while (n > 0) n--;\n\
             do { n++; } while (n < 3);",
        );

        match &body[0].kind {
            StatementKind::For {
                init: Some(LoopClause::Declaration(ids)),
                condition: Some(_),
                step: Some(_),
                ..
            } => assert_eq!(ids.len(), 1),
            other => panic!("Expected for statement, got {:?}", other),
        }
        assert!(matches!(
            body[1].kind,
            StatementKind::For {
                init: None,
                condition: None,
                step: None,
                ..
            }
        ));
        assert!(matches!(
            body[3].kind,
            StatementKind::While {
                condition: LoopClause::Expression(_),
                ..
            }
        ));
        assert!(matches!(body[4].kind, StatementKind::Do { .. }));
    }

    #[test]
    fn test_for_variable_scoped_to_loop() {
        let err = parse_body(ShaderStage::Fragment, "for (int i = 0; i < 4; i++) {}\ni = 2;")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Scope);
    }

    #[test]
    fn test_loop_body_shares_loop_scope() {
        let err = parse_body(ShaderStage::Fragment, "for (int i = 0; i < 2; i++) { int i = 3; }")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Scope);
        assert!(err.message.contains("redeclaration of 'i'"));

        let err = parse_body(ShaderStage::Fragment, "while (bool keep = true) {\n  bool keep = false;\n}")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Scope);
        assert_eq!(err.line, 3);

        // A block nested inside the body still opens its own scope.
        assert!(parse_body(ShaderStage::Fragment, "for (int i = 0; i < 2; i++) { { int i = 3; } }").is_ok());
        assert!(parse_body(ShaderStage::Fragment, "int i = 0; do { int i = 1; } while (i < 2);").is_ok());
    }

    #[test]
    fn test_while_condition_declaration() {
        let body = fragment_body("while (bool keep = false) {}");
        assert!(matches!(
            &body[0].kind,
            StatementKind::While {
                condition: LoopClause::Declaration(ids),
                ..
            } if ids.len() == 1
        ));
    }

    #[test]
    fn test_jump_placement() {
        let err = parse_body(ShaderStage::Fragment, "break;").unwrap_err();
        assert!(err.message.contains("'break'"));

        let err = parse_body(ShaderStage::Fragment, "int x = 0; switch (x) { default: continue; }")
            .unwrap_err();
        assert!(err.message.contains("'continue'"));

        assert!(parse_body(ShaderStage::Fragment, "while (true) { switch (1) { default: continue; } }").is_ok());
    }

    #[test]
    fn test_discard_only_in_fragment() {
        assert!(parse_body(ShaderStage::Fragment, "discard;").is_ok());
        let err = parse_body(ShaderStage::Vertex, "discard;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Stage);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_struct_only_at_global_scope() {
        let err = parse_body(ShaderStage::Fragment, "struct S { int a; };").unwrap_err();
        assert!(err.message.contains("global scope"));
    }

    #[test]
    fn test_shadowing_and_redeclaration() {
        assert!(parse_body(ShaderStage::Fragment, "float x; { float x; }").is_ok());
        let err = parse_body(ShaderStage::Fragment, "float x; int x;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Scope);
        assert!(err.message.contains("redeclaration of 'x'"));
    }

    #[test]
    fn test_type_side_array_sizes() {
        let source = "void main() {\n  float[3] a, b[2];\n  a[0] = b[1][2];\n}";
        let unit = Parser::new(source, "test").parse(ShaderStage::Fragment).unwrap();
        let ids = match &unit.functions[0].body[0].kind {
            StatementKind::Declaration(ids) => ids.clone(),
            other => panic!("Expected declaration, got {:?}", other),
        };
        assert_eq!(unit.variable(ids[0]).array_sizes.len(), 1);
        assert_eq!(unit.variable(ids[1]).array_sizes.len(), 2);
        assert!(matches!(
            unit.variable(ids[1]).array_sizes[1],
            Some(Expression {
                kind: ExpressionKind::IntConstant(3),
                ..
            })
        ));
    }

    #[test]
    fn test_missing_brace_before_next_function() {
        let source = "void f() {\n  int x;\nvoid main() {}\n";
        let err = Parser::new(source, "test").parse(ShaderStage::Fragment).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Syntax);
        assert_eq!(err.line, 1);
        assert!(err.message.contains("missing '}'"));
    }

    #[test]
    fn test_missing_brace_reports_opening_line() {
        let err = parse_body(ShaderStage::Fragment, "if (true) {\n  return;\n").unwrap_err();
        // The wrapper's closing brace ends the `if` block, leaving the
        // function body opened on line 1 unterminated.
        assert_eq!(err.line, 1);
        assert!(err.message.contains("missing '}'"));
    }
}
