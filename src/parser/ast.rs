//! AST definitions for GLSL translation units
//!
//! Every polymorphic family (types, expressions, statements, variable kinds)
//! is a closed enum. Variables that can be referenced by name live in the
//! [`TranslationUnit`]'s arena and are addressed by [`VariableId`]; structures
//! and interface blocks are addressed by [`StructId`] and [`BlockId`]. Handles
//! are only meaningful for the unit that produced them.

use super::lexemes::{BuiltinType, Operator};
use super::stage::ShaderStage;
use std::fmt;

/// Handle to a variable in [`TranslationUnit::variable`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub(crate) usize);

/// Handle to a structure in [`TranslationUnit::structures`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct StructId(pub(crate) usize);

/// Handle to an interface block in [`TranslationUnit::interface_blocks`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlockId(pub(crate) usize);

impl VariableId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl StructId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl BlockId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// The type a variable, parameter or constructor refers to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Builtin(BuiltinType),
    Struct(StructId),
    /// Type of a named interface block instance.
    Block(BlockId),
    /// The implicit `gl_PerVertex` block behind `gl_in` and `gl_out`.
    PerVertex,
}

impl TypeRef {
    pub fn is_builtin(&self) -> bool {
        matches!(self, TypeRef::Builtin(_))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Storage {
    In,
    Out,
    Uniform,
    Buffer,
    Shared,
    Attribute,
    Varying,
}

impl Storage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Storage::In => "in",
            Storage::Out => "out",
            Storage::Uniform => "uniform",
            Storage::Buffer => "buffer",
            Storage::Shared => "shared",
            Storage::Attribute => "attribute",
            Storage::Varying => "varying",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Auxiliary {
    Centroid,
    Sample,
    Patch,
}

impl Auxiliary {
    pub fn as_str(&self) -> &'static str {
        match self {
            Auxiliary::Centroid => "centroid",
            Auxiliary::Sample => "sample",
            Auxiliary::Patch => "patch",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Interpolation {
    Smooth,
    Flat,
    NoPerspective,
}

impl Interpolation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interpolation::Smooth => "smooth",
            Interpolation::Flat => "flat",
            Interpolation::NoPerspective => "noperspective",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Precision {
    Low,
    Medium,
    High,
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Low => "lowp",
            Precision::Medium => "mediump",
            Precision::High => "highp",
        }
    }
}

/// Memory qualifiers; any combination may apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryQualifiers {
    pub coherent: bool,
    pub volatile: bool,
    pub restrict: bool,
    pub readonly: bool,
    pub writeonly: bool,
}

impl MemoryQualifiers {
    pub fn is_empty(&self) -> bool {
        *self == MemoryQualifiers::default()
    }
}

/// One entry of a `layout(...)` list: `name` or `name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutQualifier {
    pub name: String,
    pub initial_value: Option<Expression>,
}

/// Qualifiers carried by global variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalQualifiers {
    pub storage: Option<Storage>,
    pub auxiliary: Option<Auxiliary>,
    pub interpolation: Option<Interpolation>,
    pub memory: MemoryQualifiers,
    pub layout: Vec<LayoutQualifier>,
    pub is_invariant: bool,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ParameterDirection {
    #[default]
    In,
    Out,
    InOut,
}

impl ParameterDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterDirection::In => "in",
            ParameterDirection::Out => "out",
            ParameterDirection::InOut => "inout",
        }
    }
}

/// Whether a built-in variable is read or written by the shader
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BuiltinDirection {
    Input,
    Output,
}

/// What declared a variable, with the qualifiers specific to that context
#[derive(Debug, Clone, PartialEq)]
pub enum VariableKind {
    Global(GlobalQualifiers),
    Local,
    Parameter(ParameterDirection),
    /// A structure member.
    Field,
    BlockMember {
        block: BlockId,
        layout: Vec<LayoutQualifier>,
    },
    Builtin {
        direction: BuiltinDirection,
    },
}

/// A named, typed storage location
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Empty for unnamed prototype parameters.
    pub name: String,
    pub base_type: TypeRef,
    /// One entry per dimension; `None` for an unsized `[]`.
    pub array_sizes: Vec<Option<Expression>>,
    pub is_const: bool,
    pub is_precise: bool,
    pub precision: Option<Precision>,
    pub initial_value: Option<Expression>,
    pub kind: VariableKind,
    pub line: usize,
}

impl Variable {
    pub fn new(name: impl Into<String>, base_type: TypeRef, kind: VariableKind, line: usize) -> Self {
        Variable {
            name: name.into(),
            base_type,
            array_sizes: Vec::new(),
            is_const: false,
            is_precise: false,
            precision: None,
            initial_value: None,
            kind,
            line,
        }
    }

    pub fn is_array(&self) -> bool {
        !self.array_sizes.is_empty()
    }

    /// Qualifiers of a global variable, `None` for every other kind.
    pub fn global_qualifiers(&self) -> Option<&GlobalQualifiers> {
        match &self.kind {
            VariableKind::Global(qualifiers) => Some(qualifiers),
            _ => None,
        }
    }
}

/// A user-defined structure
#[derive(Debug, Clone, PartialEq)]
pub struct Struct {
    pub name: String,
    pub fields: Vec<Variable>,
    pub line: usize,
}

/// `uniform Name { members } instance;` and friends
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceBlock {
    pub name: String,
    pub storage: Storage,
    pub layout: Vec<LayoutQualifier>,
    pub members: Vec<VariableId>,
    /// The instance variable, when the block is named at use sites.
    pub instance: Option<VariableId>,
    pub line: usize,
}

/// A qualifier-only declaration such as `layout(local_size_x = 8) in;`
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultLayout {
    pub storage: Storage,
    pub layout: Vec<LayoutQualifier>,
    pub line: usize,
}

/// `precision mediump float;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecisionDeclaration {
    pub precision: Precision,
    pub base_type: BuiltinType,
    pub line: usize,
}

/// `#version 440 core`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDirective {
    pub number: u32,
    pub profile: Option<String>,
    pub line: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExtensionBehavior {
    Require,
    Enable,
    Warn,
    Disable,
}

impl ExtensionBehavior {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "require" => Some(ExtensionBehavior::Require),
            "enable" => Some(ExtensionBehavior::Enable),
            "warn" => Some(ExtensionBehavior::Warn),
            "disable" => Some(ExtensionBehavior::Disable),
            _ => None,
        }
    }
}

/// `#extension GL_ARB_foo : enable`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDirective {
    pub name: String,
    pub behavior: ExtensionBehavior,
    pub line: usize,
}

/// A preprocessor line the lexer keeps for the translation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Version(VersionDirective),
    Extension(ExtensionDirective),
}

/// Binary operators of [`ExpressionKind::Operation`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    Multiply,
    Divide,
    Modulus,
    Add,
    Subtract,
    ShiftLeft,
    ShiftRight,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Equal,
    NotEqual,
    BitAnd,
    BitXor,
    BitOr,
    LogicalAnd,
    LogicalXor,
    LogicalOr,
}

impl BinaryOperator {
    pub fn from_operator(op: Operator) -> Option<Self> {
        let binary = match op {
            Operator::Multiply => BinaryOperator::Multiply,
            Operator::Divide => BinaryOperator::Divide,
            Operator::Modulus => BinaryOperator::Modulus,
            Operator::Plus => BinaryOperator::Add,
            Operator::Minus => BinaryOperator::Subtract,
            Operator::ShiftLeft => BinaryOperator::ShiftLeft,
            Operator::ShiftRight => BinaryOperator::ShiftRight,
            Operator::Less => BinaryOperator::Less,
            Operator::Greater => BinaryOperator::Greater,
            Operator::LessEqual => BinaryOperator::LessEqual,
            Operator::GreaterEqual => BinaryOperator::GreaterEqual,
            Operator::Equal => BinaryOperator::Equal,
            Operator::NotEqual => BinaryOperator::NotEqual,
            Operator::BitAnd => BinaryOperator::BitAnd,
            Operator::BitXor => BinaryOperator::BitXor,
            Operator::BitOr => BinaryOperator::BitOr,
            Operator::LogicalAnd => BinaryOperator::LogicalAnd,
            Operator::LogicalXor => BinaryOperator::LogicalXor,
            Operator::LogicalOr => BinaryOperator::LogicalOr,
            _ => return None,
        };
        Some(binary)
    }

    pub fn as_operator(&self) -> Operator {
        match self {
            BinaryOperator::Multiply => Operator::Multiply,
            BinaryOperator::Divide => Operator::Divide,
            BinaryOperator::Modulus => Operator::Modulus,
            BinaryOperator::Add => Operator::Plus,
            BinaryOperator::Subtract => Operator::Minus,
            BinaryOperator::ShiftLeft => Operator::ShiftLeft,
            BinaryOperator::ShiftRight => Operator::ShiftRight,
            BinaryOperator::Less => Operator::Less,
            BinaryOperator::Greater => Operator::Greater,
            BinaryOperator::LessEqual => Operator::LessEqual,
            BinaryOperator::GreaterEqual => Operator::GreaterEqual,
            BinaryOperator::Equal => Operator::Equal,
            BinaryOperator::NotEqual => Operator::NotEqual,
            BinaryOperator::BitAnd => Operator::BitAnd,
            BinaryOperator::BitXor => Operator::BitXor,
            BinaryOperator::BitOr => Operator::BitOr,
            BinaryOperator::LogicalAnd => Operator::LogicalAnd,
            BinaryOperator::LogicalXor => Operator::LogicalXor,
            BinaryOperator::LogicalOr => Operator::LogicalOr,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.as_operator().as_str()
    }
}

/// Operators of [`ExpressionKind::Assignment`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AssignmentOperator {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
    ShiftLeft,
    ShiftRight,
    BitAnd,
    BitXor,
    BitOr,
}

impl AssignmentOperator {
    pub fn from_operator(op: Operator) -> Option<Self> {
        let assignment = match op {
            Operator::Assign => AssignmentOperator::Assign,
            Operator::AddAssign => AssignmentOperator::Add,
            Operator::SubAssign => AssignmentOperator::Subtract,
            Operator::MultiplyAssign => AssignmentOperator::Multiply,
            Operator::DivideAssign => AssignmentOperator::Divide,
            Operator::ModulusAssign => AssignmentOperator::Modulus,
            Operator::ShiftLeftAssign => AssignmentOperator::ShiftLeft,
            Operator::ShiftRightAssign => AssignmentOperator::ShiftRight,
            Operator::BitAndAssign => AssignmentOperator::BitAnd,
            Operator::BitXorAssign => AssignmentOperator::BitXor,
            Operator::BitOrAssign => AssignmentOperator::BitOr,
            _ => return None,
        };
        Some(assignment)
    }

    pub fn as_operator(&self) -> Operator {
        match self {
            AssignmentOperator::Assign => Operator::Assign,
            AssignmentOperator::Add => Operator::AddAssign,
            AssignmentOperator::Subtract => Operator::SubAssign,
            AssignmentOperator::Multiply => Operator::MultiplyAssign,
            AssignmentOperator::Divide => Operator::DivideAssign,
            AssignmentOperator::Modulus => Operator::ModulusAssign,
            AssignmentOperator::ShiftLeft => Operator::ShiftLeftAssign,
            AssignmentOperator::ShiftRight => Operator::ShiftRightAssign,
            AssignmentOperator::BitAnd => Operator::BitAndAssign,
            AssignmentOperator::BitXor => Operator::BitXorAssign,
            AssignmentOperator::BitOr => Operator::BitOrAssign,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.as_operator().as_str()
    }
}

/// What a function call resolved to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Callee {
    /// A function declared earlier in the unit.
    User,
    /// A built-in function available in the unit's stage.
    Builtin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub line: usize,
}

impl Expression {
    pub fn new(kind: ExpressionKind, line: usize) -> Self {
        Expression { kind, line }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    IntConstant(i32),
    UIntConstant(u32),
    FloatConstant(f32),
    DoubleConstant(f64),
    BoolConstant(bool),
    VariableIdentifier(VariableId),
    FieldOrSwizzle {
        operand: Box<Expression>,
        name: String,
    },
    ArraySubscript {
        operand: Box<Expression>,
        index: Box<Expression>,
    },
    FunctionCall {
        name: String,
        callee: Callee,
        arguments: Vec<Expression>,
    },
    ConstructorCall {
        target: TypeRef,
        arguments: Vec<Expression>,
    },
    PostIncrement(Box<Expression>),
    PostDecrement(Box<Expression>),
    PrefixIncrement(Box<Expression>),
    PrefixDecrement(Box<Expression>),
    UnaryMinus(Box<Expression>),
    UnaryPlus(Box<Expression>),
    BitNot(Box<Expression>),
    LogicalNot(Box<Expression>),
    Assignment {
        lhs: Box<Expression>,
        operator: AssignmentOperator,
        rhs: Box<Expression>,
    },
    /// The comma operator.
    Sequence {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Operation {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
    Ternary {
        condition: Box<Expression>,
        on_true: Box<Expression>,
        on_false: Box<Expression>,
    },
}

/// A `while` condition or `for` initializer
#[derive(Debug, Clone, PartialEq)]
pub enum LoopClause {
    Declaration(Vec<VariableId>),
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: usize,
}

impl Statement {
    pub fn new(kind: StatementKind, line: usize) -> Self {
        Statement { kind, line }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Compound(Vec<Statement>),
    Empty,
    Declaration(Vec<VariableId>),
    Expression(Expression),
    If {
        condition: Expression,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    /// The body is flat; `case` and `default` appear as [`StatementKind::CaseLabel`].
    Switch {
        selector: Expression,
        body: Vec<Statement>,
    },
    /// `None` is the `default` label.
    CaseLabel(Option<Expression>),
    While {
        condition: LoopClause,
        body: Box<Statement>,
    },
    Do {
        body: Box<Statement>,
        condition: Expression,
    },
    For {
        init: Option<LoopClause>,
        condition: Option<Expression>,
        step: Option<Expression>,
        body: Box<Statement>,
    },
    Return(Option<Expression>),
    Continue,
    Break,
    Discard,
}

/// A function prototype or definition
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub return_type: TypeRef,
    pub parameters: Vec<VariableId>,
    pub is_prototype: bool,
    /// Empty for prototypes.
    pub body: Vec<Statement>,
    pub line: usize,
}

/// Root of a parsed shader
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    pub stage: ShaderStage,
    pub version: Option<VersionDirective>,
    pub extensions: Vec<ExtensionDirective>,
    pub precisions: Vec<PrecisionDeclaration>,
    pub default_layouts: Vec<DefaultLayout>,
    pub structures: Vec<Struct>,
    pub interface_blocks: Vec<InterfaceBlock>,
    /// Global variables in declaration order.
    pub globals: Vec<VariableId>,
    pub functions: Vec<Function>,
    variables: Vec<Variable>,
}

impl TranslationUnit {
    pub fn new(stage: ShaderStage) -> Self {
        TranslationUnit {
            stage,
            version: None,
            extensions: Vec::new(),
            precisions: Vec::new(),
            default_layouts: Vec::new(),
            structures: Vec::new(),
            interface_blocks: Vec::new(),
            globals: Vec::new(),
            functions: Vec::new(),
            variables: Vec::new(),
        }
    }

    /// Resolves a variable handle produced by this unit.
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different unit and is out of range.
    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn structure(&self, id: StructId) -> &Struct {
        &self.structures[id.0]
    }

    pub fn interface_block(&self, id: BlockId) -> &InterfaceBlock {
        &self.interface_blocks[id.0]
    }

    /// Every variable in the arena, built-ins included, in creation order.
    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(index, variable)| (VariableId(index), variable))
    }

    /// Global variables in declaration order.
    pub fn global_variables(&self) -> impl Iterator<Item = &Variable> {
        self.globals.iter().map(|id| self.variable(*id))
    }

    /// Looks up the first function with the given name.
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|function| function.name == name)
    }

    /// Spelling of a type for diagnostics and printers.
    pub fn type_name(&self, ty: TypeRef) -> &str {
        match ty {
            TypeRef::Builtin(builtin) => builtin.as_str(),
            TypeRef::Struct(id) => &self.structure(id).name,
            TypeRef::Block(id) => &self.interface_block(id).name,
            TypeRef::PerVertex => "gl_PerVertex",
        }
    }

    pub(crate) fn add_variable(&mut self, variable: Variable) -> VariableId {
        self.variables.push(variable);
        VariableId(self.variables.len() - 1)
    }

    pub(crate) fn add_struct(&mut self, structure: Struct) -> StructId {
        self.structures.push(structure);
        StructId(self.structures.len() - 1)
    }

    pub(crate) fn add_interface_block(&mut self, block: InterfaceBlock) -> BlockId {
        self.interface_blocks.push(block);
        BlockId(self.interface_blocks.len() - 1)
    }

    pub(crate) fn interface_block_mut(&mut self, id: BlockId) -> &mut InterfaceBlock {
        &mut self.interface_blocks[id.0]
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AssignmentOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
