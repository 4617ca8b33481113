//! # Introduction
//!
//! `glsl-front` lexes and parses GLSL 4.40 shaders into a typed syntax tree.
//! Parsing is stage-aware: qualifiers, layout qualifiers, builtin variables
//! and builtin functions are checked against the [`ShaderStage`] being parsed.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → TranslationUnit → Visitor
//! ```
//!
//! 1. [`parser::lexer`] turns source text into tokens and records `#version`
//!    and `#extension` lines.
//! 2. [`Parser`] builds a [`parser::ast::TranslationUnit`], resolving every
//!    identifier against its declaration as it goes.
//! 3. [`parser::visit`] walks the finished tree in source order.
//!
//! ## Example
//!
//! ```
//! use glsl_front::{parse, ParseOptions, ShaderStage};
//!
//! let source = "out vec4 color;\nvoid main() { color = vec4(1.0); }\n";
//! let unit = parse(source, &ParseOptions::default().with_stage(ShaderStage::Fragment)).unwrap();
//! assert_eq!(unit.functions.len(), 1);
//! ```
//!
//! Failures are reported as a single [`ParseError`] carrying the source name
//! and the line the problem was found on.

pub mod parser;

pub use parser::parse::{parse, ErrorKind, ParseError, Parser};
pub use parser::stage::{ParseOptions, ShaderStage};
