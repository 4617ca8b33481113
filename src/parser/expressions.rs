//! Expression parsing implementation
//!
//! This module handles parsing of GLSL expressions using precedence climbing
//! for binary operators and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: integers, unsigned integers, floats, doubles, `true`/`false`
//! - Variables, resolved against the scope chain as they are read
//! - Binary operators: arithmetic, shift, comparison, bitwise, logical
//! - Unary operators: `+`, `-`, `~`, `!`, `++`, `--`
//! - Postfix: `[]`, `.field` / `.swizzle`, `++`, `--`
//! - Ternary: `? :`
//! - Function calls and constructor calls (`vec3(...)`, `Light(...)`)
//! - Assignment and the comma operator
//!
//! # Precedence
//!
//! Binary operator levels come straight from the lexeme table, so the climb
//! in [`Parser::parse_binary`] never hard-codes an operator. All binary
//! operators are left-associative; assignment and `?:` are handled above the
//! climb and associate to the right.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexemes::{Keyword, Operator, LOWEST_BINARY_PRECEDENCE};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use crate::parser::scope::Symbol;
use crate::parser::stage::ShaderStage;

impl Parser {
    /// Parse expression (top-level entry point, includes `,`)
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_assignment()?;

        while self.match_operator(Operator::Comma)? {
            let line = self.previous_line();
            let right = self.parse_assignment()?;
            left = Expression::new(
                ExpressionKind::Sequence {
                    left: Box::new(left),
                    right: Box::new(right),
                },
                line,
            );
        }

        Ok(left)
    }

    /// Parse assignment or ternary (right-associative)
    ///
    /// Every nested expression passes through here, so this is where the
    /// nesting depth is counted.
    pub(crate) fn parse_assignment(&mut self) -> Result<Expression, ParseError> {
        self.nested(|parser| {
            let lhs = parser.parse_ternary()?;

            let operator = match parser.peek().as_operator().and_then(AssignmentOperator::from_operator) {
                Some(operator) => operator,
                None => return Ok(lhs),
            };
            let line = parser.current_line();
            parser.advance()?;

            let rhs = parser.parse_assignment()?;
            Ok(Expression::new(
                ExpressionKind::Assignment {
                    lhs: Box::new(lhs),
                    operator,
                    rhs: Box::new(rhs),
                },
                line,
            ))
        })
    }

    /// Parse ternary: condition ? expression : assignment
    pub(crate) fn parse_ternary(&mut self) -> Result<Expression, ParseError> {
        let condition = self.parse_binary(LOWEST_BINARY_PRECEDENCE)?;

        if !self.match_operator(Operator::QuestionMark)? {
            return Ok(condition);
        }
        let line = self.previous_line();

        let on_true = self.parse_expression()?;
        self.expect_operator(Operator::Colon, "in ternary expression")?;
        let on_false = self.parse_assignment()?;

        Ok(Expression::new(
            ExpressionKind::Ternary {
                condition: Box::new(condition),
                on_true: Box::new(on_true),
                on_false: Box::new(on_false),
            },
            line,
        ))
    }

    /// Precedence climbing over binary operators at `min_precedence` or above
    pub(crate) fn parse_binary(&mut self, min_precedence: u8) -> Result<Expression, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let Some(op) = self.peek().as_operator() else {
                break;
            };
            let Some(precedence) = op.binary_precedence() else {
                break;
            };
            if precedence < min_precedence {
                break;
            }

            let operator = match BinaryOperator::from_operator(op) {
                Some(operator) => operator,
                None => unreachable!("'{}' has a binary precedence but no binary operator", op),
            };
            let line = self.current_line();
            self.advance()?;

            // Left-associative: the right operand only takes tighter operators.
            let right = self.parse_binary(precedence + 1)?;
            left = Expression::new(
                ExpressionKind::Operation {
                    left: Box::new(left),
                    operator,
                    right: Box::new(right),
                },
                line,
            );
        }

        Ok(left)
    }

    /// Parse prefix unary operators
    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let line = self.current_line();

        let wrap: fn(Box<Expression>) -> ExpressionKind = match self.peek().as_operator() {
            Some(Operator::Increment) => ExpressionKind::PrefixIncrement,
            Some(Operator::Decrement) => ExpressionKind::PrefixDecrement,
            Some(Operator::Plus) => ExpressionKind::UnaryPlus,
            Some(Operator::Minus) => ExpressionKind::UnaryMinus,
            Some(Operator::BitNot) => ExpressionKind::BitNot,
            Some(Operator::LogicalNot) => ExpressionKind::LogicalNot,
            _ => return self.parse_postfix(),
        };
        self.advance()?;

        let operand = self.nested(Self::parse_unary)?;
        Ok(Expression::new(wrap(Box::new(operand)), line))
    }

    /// Parse postfix operators
    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let line = self.current_line();
            let kind = if self.match_operator(Operator::BracketBegin)? {
                let index = self.parse_expression()?;
                self.expect_operator(Operator::BracketEnd, "after array index")?;
                ExpressionKind::ArraySubscript {
                    operand: Box::new(expr),
                    index: Box::new(index),
                }
            } else if self.match_operator(Operator::Dot)? {
                let name = self.expect_identifier("after '.'")?;
                if self.check_operator(Operator::ParenthesisBegin) {
                    return Err(self.syntax_error(
                        format!("method call '.{}()' is not supported", name),
                        line,
                    ));
                }
                ExpressionKind::FieldOrSwizzle {
                    operand: Box::new(expr),
                    name,
                }
            } else if self.match_operator(Operator::Increment)? {
                ExpressionKind::PostIncrement(Box::new(expr))
            } else if self.match_operator(Operator::Decrement)? {
                ExpressionKind::PostDecrement(Box::new(expr))
            } else {
                break;
            };
            expr = Expression::new(kind, line);
        }

        Ok(expr)
    }

    /// Parse primary expression
    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let line = self.current_line();

        let constant = match self.peek().kind {
            TokenKind::IntConstant(value) => Some(ExpressionKind::IntConstant(value)),
            TokenKind::UIntConstant(value) => Some(ExpressionKind::UIntConstant(value)),
            TokenKind::FloatConstant(value) => Some(ExpressionKind::FloatConstant(value)),
            TokenKind::DoubleConstant(value) => Some(ExpressionKind::DoubleConstant(value)),
            TokenKind::Keyword(Keyword::True) => Some(ExpressionKind::BoolConstant(true)),
            TokenKind::Keyword(Keyword::False) => Some(ExpressionKind::BoolConstant(false)),
            _ => None,
        };
        if let Some(kind) = constant {
            self.advance()?;
            return Ok(Expression::new(kind, line));
        }

        // Constructor by built-in type: vec4(1.0)
        if let Some(Keyword::Type(ty)) = self.peek().as_keyword() {
            self.advance()?;
            if !self.check_operator(Operator::ParenthesisBegin) {
                return Err(self.unexpected(&format!("expected '(' after type '{}' in expression", ty)));
            }
            let arguments = self.parse_arguments()?;
            return Ok(Expression::new(
                ExpressionKind::ConstructorCall {
                    target: TypeRef::Builtin(ty),
                    arguments,
                },
                line,
            ));
        }

        if matches!(self.peek().kind, TokenKind::Identifier(_)) {
            let name = self.expect_identifier("in expression")?;
            if self.check_operator(Operator::ParenthesisBegin) {
                return self.parse_call(name, line);
            }
            return self.resolve_variable(name, line);
        }

        // Parenthesized expression
        if self.match_operator(Operator::ParenthesisBegin)? {
            let expr = self.parse_expression()?;
            self.expect_rparen("after expression")?;
            return Ok(expr);
        }

        Err(self.unexpected("expected expression"))
    }

    fn resolve_variable(&self, name: String, line: usize) -> Result<Expression, ParseError> {
        match self.scopes.lookup(&name) {
            Some(Symbol::Variable(id)) => {
                Ok(Expression::new(ExpressionKind::VariableIdentifier(id), line))
            }
            Some(Symbol::Struct(_)) => Err(self.syntax_error(
                format!("type name '{}' used as a value", name),
                line,
            )),
            None => Err(self.scope_error(format!("use of undeclared identifier '{}'", name), line)),
        }
    }

    /// Parse `name(...)` as a constructor or function call
    fn parse_call(&mut self, name: String, line: usize) -> Result<Expression, ParseError> {
        if let Some(id) = self.scopes.lookup_struct(&name) {
            let arguments = self.parse_arguments()?;
            return Ok(Expression::new(
                ExpressionKind::ConstructorCall {
                    target: TypeRef::Struct(id),
                    arguments,
                },
                line,
            ));
        }

        let callee = if self.functions.contains(&name) {
            Callee::User
        } else if self.stage.has_builtin_function(&name) {
            Callee::Builtin
        } else if ShaderStage::ALL
            .iter()
            .any(|stage| stage.has_builtin_function(&name))
        {
            return Err(self.stage_error(
                format!("'{}' is not available in {} shaders", name, self.stage),
                line,
            ));
        } else {
            return Err(self.scope_error(format!("call to undeclared function '{}'", name), line));
        };

        let arguments = self.parse_arguments()?;
        Ok(Expression::new(
            ExpressionKind::FunctionCall {
                name,
                callee,
                arguments,
            },
            line,
        ))
    }

    /// Parse `( [argument {, argument}] )`
    fn parse_arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        self.expect_lparen("before arguments")?;
        let mut arguments = Vec::new();

        if self.match_operator(Operator::ParenthesisEnd)? {
            return Ok(arguments);
        }

        loop {
            arguments.push(self.parse_assignment()?);
            if !self.match_operator(Operator::Comma)? {
                break;
            }
        }

        self.expect_rparen("after arguments")?;
        Ok(arguments)
    }
}
