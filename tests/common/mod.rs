// Shared helpers for integration tests: a fully parenthesized GLSL printer and
// a line-insensitive shape trace, both built on the visitor.

#![allow(dead_code)]

use glsl_front::parser::ast::*;
use glsl_front::parser::visit::{self, Visitor};

/// Prints a translation unit back to GLSL source.
///
/// Every compound expression is wrapped in parentheses, so the output parses
/// back to the same tree regardless of precedence. Top-level items are emitted
/// in the order they appeared in the parsed source.
#[derive(Default)]
pub struct Renderer {
    items: Vec<(usize, u8, String)>,
}

pub fn render(unit: &TranslationUnit) -> String {
    let mut renderer = Renderer::default();
    visit::walk_translation_unit(&mut renderer, unit);

    for precision in &unit.precisions {
        let text = format!("precision {} {};", precision.precision.as_str(), precision.base_type);
        renderer.items.push((precision.line, 2, text));
    }
    for default in &unit.default_layouts {
        let text = format!("{} {};", layout_text(unit, &default.layout), default.storage.as_str());
        renderer.items.push((default.line, 3, text.trim_start().to_string()));
    }
    renderer.items.sort_by_key(|(line, priority, _)| (*line, *priority));

    let mut out = String::new();
    if let Some(version) = &unit.version {
        out.push_str(&format!("#version {}", version.number));
        if let Some(profile) = &version.profile {
            out.push_str(&format!(" {}", profile));
        }
        out.push('\n');
    }
    for extension in &unit.extensions {
        let behavior = match extension.behavior {
            ExtensionBehavior::Require => "require",
            ExtensionBehavior::Enable => "enable",
            ExtensionBehavior::Warn => "warn",
            ExtensionBehavior::Disable => "disable",
        };
        out.push_str(&format!("#extension {} : {}\n", extension.name, behavior));
    }
    for (_, _, text) in renderer.items {
        out.push_str(&text);
        out.push('\n');
    }
    out
}

impl Visitor for Renderer {
    fn visit_struct(&mut self, unit: &TranslationUnit, structure: &Struct) {
        let mut text = format!("struct {} {{\n", structure.name);
        for field in &structure.fields {
            text.push_str(&format!("    {};\n", declarator(unit, field, true)));
        }
        text.push_str("};");
        self.items.push((structure.line, 0, text));
    }

    fn visit_interface_block(&mut self, unit: &TranslationUnit, block: &InterfaceBlock) {
        let mut text = layout_text(unit, &block.layout);
        text.push_str(&format!("{} {} {{\n", block.storage.as_str(), block.name));
        for id in &block.members {
            let member = unit.variable(*id);
            let mut line = String::from("    ");
            if let VariableKind::BlockMember { layout, .. } = &member.kind {
                line.push_str(&layout_text(unit, layout));
            }
            line.push_str(&declarator(unit, member, true));
            text.push_str(&format!("{};\n", line));
        }
        text.push('}');
        if let Some(instance) = block.instance {
            let instance = unit.variable(instance);
            text.push_str(&format!(" {}{}", instance.name, array_text(unit, &instance.array_sizes)));
        }
        text.push(';');
        self.items.push((block.line, 1, text));
    }

    fn visit_global(&mut self, unit: &TranslationUnit, variable: &Variable) {
        let mut text = String::new();
        if variable.is_precise {
            text.push_str("precise ");
        }
        if variable.is_const {
            text.push_str("const ");
        }
        if let Some(qualifiers) = variable.global_qualifiers() {
            if qualifiers.is_invariant {
                text.push_str("invariant ");
            }
            text.push_str(&layout_text(unit, &qualifiers.layout));
            if let Some(storage) = qualifiers.storage {
                text.push_str(&format!("{} ", storage.as_str()));
            }
            if let Some(auxiliary) = qualifiers.auxiliary {
                text.push_str(&format!("{} ", auxiliary.as_str()));
            }
            if let Some(interpolation) = qualifiers.interpolation {
                text.push_str(&format!("{} ", interpolation.as_str()));
            }
            let memory = &qualifiers.memory;
            for (set, name) in [
                (memory.coherent, "coherent"),
                (memory.volatile, "volatile"),
                (memory.restrict, "restrict"),
                (memory.readonly, "readonly"),
                (memory.writeonly, "writeonly"),
            ] {
                if set {
                    text.push_str(name);
                    text.push(' ');
                }
            }
        }
        text.push_str(&declarator(unit, variable, true));
        text.push(';');
        self.items.push((variable.line, 4, text));
    }

    fn visit_function(&mut self, unit: &TranslationUnit, function: &Function) {
        let parameters: Vec<String> = function
            .parameters
            .iter()
            .map(|id| {
                let parameter = unit.variable(*id);
                let mut text = String::new();
                if parameter.is_const {
                    text.push_str("const ");
                }
                if let VariableKind::Parameter(direction) = parameter.kind {
                    text.push_str(direction.as_str());
                    text.push(' ');
                }
                text.push_str(&declarator(unit, parameter, true));
                text
            })
            .collect();

        let mut text = format!(
            "{} {}({})",
            unit.type_name(function.return_type),
            function.name,
            parameters.join(", ")
        );
        if function.is_prototype {
            text.push(';');
        } else {
            text.push_str(" {\n");
            for statement in &function.body {
                render_statement(unit, statement, 1, &mut text);
            }
            text.push('}');
        }
        self.items.push((function.line, 5, text));
    }
}

fn layout_text(unit: &TranslationUnit, layout: &[LayoutQualifier]) -> String {
    if layout.is_empty() {
        return String::new();
    }
    let entries: Vec<String> = layout
        .iter()
        .map(|qualifier| match &qualifier.initial_value {
            Some(value) => format!("{} = {}", qualifier.name, expression(unit, value)),
            None => qualifier.name.clone(),
        })
        .collect();
    format!("layout({}) ", entries.join(", "))
}

fn array_text(unit: &TranslationUnit, sizes: &[Option<Expression>]) -> String {
    sizes
        .iter()
        .map(|size| match size {
            Some(size) => format!("[{}]", expression(unit, size)),
            None => "[]".to_string(),
        })
        .collect()
}

/// `precision type name[..] = init`, with the type when `with_type` is set.
fn declarator(unit: &TranslationUnit, variable: &Variable, with_type: bool) -> String {
    let mut text = String::new();
    if with_type {
        if let Some(precision) = variable.precision {
            text.push_str(precision.as_str());
            text.push(' ');
        }
        text.push_str(unit.type_name(variable.base_type));
        text.push(' ');
    }
    text.push_str(&variable.name);
    text.push_str(&array_text(unit, &variable.array_sizes));
    if let Some(value) = &variable.initial_value {
        text.push_str(&format!(" = {}", expression(unit, value)));
    }
    text
}

fn local_declaration(unit: &TranslationUnit, ids: &[VariableId]) -> String {
    let mut text = String::new();
    for (index, id) in ids.iter().enumerate() {
        let variable = unit.variable(*id);
        if index == 0 {
            if variable.is_precise {
                text.push_str("precise ");
            }
            if variable.is_const {
                text.push_str("const ");
            }
            text.push_str(&declarator(unit, variable, true));
        } else {
            text.push_str(", ");
            text.push_str(&declarator(unit, variable, false));
        }
    }
    text
}

fn render_statement(unit: &TranslationUnit, statement: &Statement, depth: usize, out: &mut String) {
    let indent = "    ".repeat(depth);
    match &statement.kind {
        StatementKind::Compound(statements) => {
            out.push_str(&format!("{}{{\n", indent));
            for inner in statements {
                render_statement(unit, inner, depth + 1, out);
            }
            out.push_str(&format!("{}}}\n", indent));
        }
        StatementKind::Empty => out.push_str(&format!("{};\n", indent)),
        StatementKind::Declaration(ids) => {
            out.push_str(&format!("{}{};\n", indent, local_declaration(unit, ids)));
        }
        StatementKind::Expression(value) => {
            out.push_str(&format!("{}{};\n", indent, expression(unit, value)));
        }
        StatementKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            out.push_str(&format!("{}if ({})\n", indent, expression(unit, condition)));
            render_statement(unit, then_branch, depth + 1, out);
            if let Some(else_branch) = else_branch {
                out.push_str(&format!("{}else\n", indent));
                render_statement(unit, else_branch, depth + 1, out);
            }
        }
        StatementKind::Switch { selector, body } => {
            out.push_str(&format!("{}switch ({}) {{\n", indent, expression(unit, selector)));
            for inner in body {
                render_statement(unit, inner, depth + 1, out);
            }
            out.push_str(&format!("{}}}\n", indent));
        }
        StatementKind::CaseLabel(Some(value)) => {
            out.push_str(&format!("{}case {}:\n", indent, expression(unit, value)));
        }
        StatementKind::CaseLabel(None) => out.push_str(&format!("{}default:\n", indent)),
        StatementKind::While { condition, body } => {
            let condition = match condition {
                LoopClause::Declaration(ids) => local_declaration(unit, ids),
                LoopClause::Expression(value) => expression(unit, value),
            };
            out.push_str(&format!("{}while ({})\n", indent, condition));
            render_statement(unit, body, depth + 1, out);
        }
        StatementKind::Do { body, condition } => {
            out.push_str(&format!("{}do\n", indent));
            render_statement(unit, body, depth + 1, out);
            out.push_str(&format!("{}while ({});\n", indent, expression(unit, condition)));
        }
        StatementKind::For {
            init,
            condition,
            step,
            body,
        } => {
            let init = match init {
                Some(LoopClause::Declaration(ids)) => local_declaration(unit, ids),
                Some(LoopClause::Expression(value)) => expression(unit, value),
                None => String::new(),
            };
            let condition = condition.as_ref().map(|value| expression(unit, value)).unwrap_or_default();
            let step = step.as_ref().map(|value| expression(unit, value)).unwrap_or_default();
            out.push_str(&format!("{}for ({}; {}; {})\n", indent, init, condition, step));
            render_statement(unit, body, depth + 1, out);
        }
        StatementKind::Return(Some(value)) => {
            out.push_str(&format!("{}return {};\n", indent, expression(unit, value)));
        }
        StatementKind::Return(None) => out.push_str(&format!("{}return;\n", indent)),
        StatementKind::Continue => out.push_str(&format!("{}continue;\n", indent)),
        StatementKind::Break => out.push_str(&format!("{}break;\n", indent)),
        StatementKind::Discard => out.push_str(&format!("{}discard;\n", indent)),
    }
}

fn arguments(unit: &TranslationUnit, values: &[Expression]) -> String {
    values
        .iter()
        .map(|value| expression(unit, value))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn expression(unit: &TranslationUnit, value: &Expression) -> String {
    match &value.kind {
        ExpressionKind::IntConstant(value) if *value < 0 => format!("0x{:X}", *value as u32),
        ExpressionKind::IntConstant(value) => value.to_string(),
        ExpressionKind::UIntConstant(value) => format!("{}u", value),
        ExpressionKind::FloatConstant(value) => format!("{:?}", value),
        ExpressionKind::DoubleConstant(value) => format!("{:?}lf", value),
        ExpressionKind::BoolConstant(value) => value.to_string(),
        ExpressionKind::VariableIdentifier(id) => unit.variable(*id).name.clone(),
        ExpressionKind::FieldOrSwizzle { operand, name } => {
            format!("{}.{}", expression(unit, operand), name)
        }
        ExpressionKind::ArraySubscript { operand, index } => {
            format!("{}[{}]", expression(unit, operand), expression(unit, index))
        }
        ExpressionKind::FunctionCall { name, arguments: values, .. } => {
            format!("{}({})", name, arguments(unit, values))
        }
        ExpressionKind::ConstructorCall { target, arguments: values } => {
            format!("{}({})", unit.type_name(*target), arguments(unit, values))
        }
        ExpressionKind::PostIncrement(operand) => format!("({}++)", expression(unit, operand)),
        ExpressionKind::PostDecrement(operand) => format!("({}--)", expression(unit, operand)),
        ExpressionKind::PrefixIncrement(operand) => format!("(++{})", expression(unit, operand)),
        ExpressionKind::PrefixDecrement(operand) => format!("(--{})", expression(unit, operand)),
        ExpressionKind::UnaryMinus(operand) => format!("(-{})", expression(unit, operand)),
        ExpressionKind::UnaryPlus(operand) => format!("(+{})", expression(unit, operand)),
        ExpressionKind::BitNot(operand) => format!("(~{})", expression(unit, operand)),
        ExpressionKind::LogicalNot(operand) => format!("(!{})", expression(unit, operand)),
        ExpressionKind::Assignment { lhs, operator, rhs } => format!(
            "({} {} {})",
            expression(unit, lhs),
            operator.as_str(),
            expression(unit, rhs)
        ),
        ExpressionKind::Sequence { left, right } => {
            format!("({}, {})", expression(unit, left), expression(unit, right))
        }
        ExpressionKind::Operation { left, operator, right } => format!(
            "({} {} {})",
            expression(unit, left),
            operator.as_str(),
            expression(unit, right)
        ),
        ExpressionKind::Ternary {
            condition,
            on_true,
            on_false,
        } => format!(
            "({} ? {} : {})",
            expression(unit, condition),
            expression(unit, on_true),
            expression(unit, on_false)
        ),
    }
}

/// Node kinds in traversal order, without lines or payloads.
#[derive(Default)]
pub struct ShapeTrace {
    pub events: Vec<String>,
}

pub fn shape(unit: &TranslationUnit) -> Vec<String> {
    let mut trace = ShapeTrace::default();
    visit::walk_translation_unit(&mut trace, unit);
    trace.events
}

fn kind_name<T: std::fmt::Debug>(node: &T) -> String {
    let text = format!("{:?}", node);
    let end = text
        .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .unwrap_or(text.len());
    text[..end].to_string()
}

impl Visitor for ShapeTrace {
    fn visit_struct(&mut self, unit: &TranslationUnit, structure: &Struct) {
        self.events.push(format!("struct {}", structure.name));
        visit::walk_struct(self, unit, structure);
    }

    fn visit_interface_block(&mut self, unit: &TranslationUnit, block: &InterfaceBlock) {
        self.events.push(format!("block {}", block.name));
        visit::walk_interface_block(self, unit, block);
    }

    fn visit_function(&mut self, unit: &TranslationUnit, function: &Function) {
        self.events.push(format!("function {} {}", function.name, function.is_prototype));
        visit::walk_function(self, unit, function);
    }

    fn visit_variable(&mut self, unit: &TranslationUnit, variable: &Variable) {
        self.events.push(format!("variable {} {}", variable.name, kind_name(&variable.kind)));
        visit::walk_variable(self, unit, variable);
    }

    fn visit_statement(&mut self, unit: &TranslationUnit, statement: &Statement) {
        self.events.push(kind_name(&statement.kind));
        visit::walk_statement(self, unit, statement);
    }

    fn visit_expression(&mut self, unit: &TranslationUnit, expression: &Expression) {
        self.events.push(kind_name(&expression.kind));
        visit::walk_expression(self, unit, expression);
    }

    fn visit_type(&mut self, unit: &TranslationUnit, ty: TypeRef) {
        self.events.push(format!("type {}", unit.type_name(ty)));
    }
}
