//! GLSL source code parser
//!
//! This module transforms GLSL 4.40 source text into a [`ast::TranslationUnit`]:
//! - [`lexemes`]: Keyword, builtin type and operator tables
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: The [`parse::Parser`] driver, token helpers and errors
//! - [`ast`]: AST node definitions
//! - [`stage`]: Per-stage rules, layout qualifiers and builtin variables
//! - [`scope`]: Lexical scopes and the function table
//! - [`visit`]: Depth-first traversal over a parsed unit
//!
//! # Supported GLSL Subset
//!
//! - Every builtin type of GLSL 4.40, structs and interface blocks
//! - Storage, auxiliary, interpolation, memory, precision and layout qualifiers
//! - All statements, including `switch` with flat `case` labels and `discard`
//! - `#version`, `#extension`, `#pragma` and `#line`; no other preprocessing
//! - No subroutines, overload resolution or type checking
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! Identifiers are resolved while parsing, so every variable reference in the tree
//! points at its declaration.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexemes;
pub mod lexer;
pub mod parse;
pub mod scope;
pub mod stage;
mod statements;
pub mod visit;
