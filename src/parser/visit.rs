//! Read-only traversal of a [`TranslationUnit`]
//!
//! Implement [`Visitor`] and override only the methods for the nodes you care
//! about; every default forwards to the matching `walk_*` function, which
//! visits the node's children in source order. An override that still wants
//! the children visited calls the `walk_*` function itself.
//!
//! [`walk_translation_unit`] visits structures, then interface blocks, then
//! global variables, then functions, each in declaration order.
//!
//! ```
//! use glsl_front::parser::ast::{Expression, ExpressionKind, TranslationUnit};
//! use glsl_front::parser::visit::{self, Visitor};
//! use glsl_front::{parse, ParseOptions};
//!
//! #[derive(Default)]
//! struct CallCounter(usize);
//!
//! impl Visitor for CallCounter {
//!     fn visit_expression(&mut self, unit: &TranslationUnit, expression: &Expression) {
//!         if let ExpressionKind::FunctionCall { .. } = expression.kind {
//!             self.0 += 1;
//!         }
//!         visit::walk_expression(self, unit, expression);
//!     }
//! }
//!
//! let unit = parse("float f() { return max(abs(1.0), 2.0); }", &ParseOptions::default()).unwrap();
//! let mut counter = CallCounter::default();
//! visit::walk_translation_unit(&mut counter, &unit);
//! assert_eq!(counter.0, 2);
//! ```

use super::ast::*;

/// Callbacks for each node family of the tree
pub trait Visitor {
    fn visit_struct(&mut self, unit: &TranslationUnit, structure: &Struct) {
        walk_struct(self, unit, structure);
    }

    fn visit_interface_block(&mut self, unit: &TranslationUnit, block: &InterfaceBlock) {
        walk_interface_block(self, unit, block);
    }

    /// A global variable; forwards to [`Visitor::visit_variable`] by default.
    fn visit_global(&mut self, unit: &TranslationUnit, variable: &Variable) {
        self.visit_variable(unit, variable);
    }

    fn visit_function(&mut self, unit: &TranslationUnit, function: &Function) {
        walk_function(self, unit, function);
    }

    /// Any variable: fields, block members, parameters, locals and globals.
    fn visit_variable(&mut self, unit: &TranslationUnit, variable: &Variable) {
        walk_variable(self, unit, variable);
    }

    fn visit_statement(&mut self, unit: &TranslationUnit, statement: &Statement) {
        walk_statement(self, unit, statement);
    }

    fn visit_expression(&mut self, unit: &TranslationUnit, expression: &Expression) {
        walk_expression(self, unit, expression);
    }

    fn visit_type(&mut self, _unit: &TranslationUnit, _ty: TypeRef) {}
}

pub fn walk_translation_unit<V: Visitor + ?Sized>(visitor: &mut V, unit: &TranslationUnit) {
    for structure in &unit.structures {
        visitor.visit_struct(unit, structure);
    }
    for block in &unit.interface_blocks {
        visitor.visit_interface_block(unit, block);
    }
    for id in &unit.globals {
        visitor.visit_global(unit, unit.variable(*id));
    }
    for function in &unit.functions {
        visitor.visit_function(unit, function);
    }
}

pub fn walk_struct<V: Visitor + ?Sized>(visitor: &mut V, unit: &TranslationUnit, structure: &Struct) {
    for field in &structure.fields {
        visitor.visit_variable(unit, field);
    }
}

pub fn walk_interface_block<V: Visitor + ?Sized>(
    visitor: &mut V,
    unit: &TranslationUnit,
    block: &InterfaceBlock,
) {
    walk_layout(visitor, unit, &block.layout);
    for id in &block.members {
        visitor.visit_variable(unit, unit.variable(*id));
    }
    if let Some(instance) = block.instance {
        visitor.visit_variable(unit, unit.variable(instance));
    }
}

pub fn walk_function<V: Visitor + ?Sized>(visitor: &mut V, unit: &TranslationUnit, function: &Function) {
    visitor.visit_type(unit, function.return_type);
    for id in &function.parameters {
        visitor.visit_variable(unit, unit.variable(*id));
    }
    for statement in &function.body {
        visitor.visit_statement(unit, statement);
    }
}

pub fn walk_variable<V: Visitor + ?Sized>(visitor: &mut V, unit: &TranslationUnit, variable: &Variable) {
    match &variable.kind {
        VariableKind::Global(qualifiers) => walk_layout(visitor, unit, &qualifiers.layout),
        VariableKind::BlockMember { layout, .. } => walk_layout(visitor, unit, layout),
        VariableKind::Local
        | VariableKind::Parameter(_)
        | VariableKind::Field
        | VariableKind::Builtin { .. } => {}
    }

    visitor.visit_type(unit, variable.base_type);
    for size in variable.array_sizes.iter().flatten() {
        visitor.visit_expression(unit, size);
    }
    if let Some(initial_value) = &variable.initial_value {
        visitor.visit_expression(unit, initial_value);
    }
}

fn walk_layout<V: Visitor + ?Sized>(visitor: &mut V, unit: &TranslationUnit, layout: &[LayoutQualifier]) {
    for value in layout.iter().filter_map(|qualifier| qualifier.initial_value.as_ref()) {
        visitor.visit_expression(unit, value);
    }
}

fn walk_loop_clause<V: Visitor + ?Sized>(visitor: &mut V, unit: &TranslationUnit, clause: &LoopClause) {
    match clause {
        LoopClause::Declaration(ids) => {
            for id in ids {
                visitor.visit_variable(unit, unit.variable(*id));
            }
        }
        LoopClause::Expression(expression) => visitor.visit_expression(unit, expression),
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, unit: &TranslationUnit, statement: &Statement) {
    match &statement.kind {
        StatementKind::Compound(statements) => {
            for inner in statements {
                visitor.visit_statement(unit, inner);
            }
        }
        StatementKind::Switch { selector, body } => {
            visitor.visit_expression(unit, selector);
            for inner in body {
                visitor.visit_statement(unit, inner);
            }
        }
        StatementKind::Declaration(ids) => {
            for id in ids {
                visitor.visit_variable(unit, unit.variable(*id));
            }
        }
        StatementKind::Expression(expression) => visitor.visit_expression(unit, expression),
        StatementKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            visitor.visit_expression(unit, condition);
            visitor.visit_statement(unit, then_branch);
            if let Some(else_branch) = else_branch {
                visitor.visit_statement(unit, else_branch);
            }
        }
        StatementKind::CaseLabel(value) => {
            if let Some(value) = value {
                visitor.visit_expression(unit, value);
            }
        }
        StatementKind::While { condition, body } => {
            walk_loop_clause(visitor, unit, condition);
            visitor.visit_statement(unit, body);
        }
        StatementKind::Do { body, condition } => {
            visitor.visit_statement(unit, body);
            visitor.visit_expression(unit, condition);
        }
        StatementKind::For {
            init,
            condition,
            step,
            body,
        } => {
            if let Some(init) = init {
                walk_loop_clause(visitor, unit, init);
            }
            if let Some(condition) = condition {
                visitor.visit_expression(unit, condition);
            }
            if let Some(step) = step {
                visitor.visit_expression(unit, step);
            }
            visitor.visit_statement(unit, body);
        }
        StatementKind::Return(value) => {
            if let Some(value) = value {
                visitor.visit_expression(unit, value);
            }
        }
        StatementKind::Empty
        | StatementKind::Continue
        | StatementKind::Break
        | StatementKind::Discard => {}
    }
}

pub fn walk_expression<V: Visitor + ?Sized>(
    visitor: &mut V,
    unit: &TranslationUnit,
    expression: &Expression,
) {
    match &expression.kind {
        ExpressionKind::IntConstant(_)
        | ExpressionKind::UIntConstant(_)
        | ExpressionKind::FloatConstant(_)
        | ExpressionKind::DoubleConstant(_)
        | ExpressionKind::BoolConstant(_)
        | ExpressionKind::VariableIdentifier(_) => {}
        ExpressionKind::FieldOrSwizzle { operand, .. } => visitor.visit_expression(unit, operand),
        ExpressionKind::ArraySubscript { operand, index } => {
            visitor.visit_expression(unit, operand);
            visitor.visit_expression(unit, index);
        }
        ExpressionKind::FunctionCall { arguments, .. } => {
            for argument in arguments {
                visitor.visit_expression(unit, argument);
            }
        }
        ExpressionKind::ConstructorCall { target, arguments } => {
            visitor.visit_type(unit, *target);
            for argument in arguments {
                visitor.visit_expression(unit, argument);
            }
        }
        ExpressionKind::PostIncrement(operand)
        | ExpressionKind::PostDecrement(operand)
        | ExpressionKind::PrefixIncrement(operand)
        | ExpressionKind::PrefixDecrement(operand)
        | ExpressionKind::UnaryMinus(operand)
        | ExpressionKind::UnaryPlus(operand)
        | ExpressionKind::BitNot(operand)
        | ExpressionKind::LogicalNot(operand) => visitor.visit_expression(unit, operand),
        ExpressionKind::Assignment { lhs, rhs, .. } => {
            visitor.visit_expression(unit, lhs);
            visitor.visit_expression(unit, rhs);
        }
        ExpressionKind::Sequence { left, right } | ExpressionKind::Operation { left, right, .. } => {
            visitor.visit_expression(unit, left);
            visitor.visit_expression(unit, right);
        }
        ExpressionKind::Ternary {
            condition,
            on_true,
            on_false,
        } => {
            visitor.visit_expression(unit, condition);
            visitor.visit_expression(unit, on_true);
            visitor.visit_expression(unit, on_false);
        }
    }
}
