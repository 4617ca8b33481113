//! Lexeme table for GLSL 4.40
//!
//! Every reserved word, built-in type name and operator symbol the lexer can
//! produce is listed here exactly once. The enums below are generated from
//! those lists, along with their spellings and the lookup tables used by the
//! lexer.
//!
//! Lookups go through [`FxHashMap`]s built on first use and never mutated
//! afterwards, so the table can be shared freely between parses running on
//! different threads.

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::LazyLock;

// Generates `BuiltinType` with its spelling and the full variant list.
macro_rules! define_builtin_types {
    ($($variant:ident => $text:literal),* $(,)?) => {
        /// A type name predefined by the language.
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        pub enum BuiltinType {
            $($variant),*
        }

        impl BuiltinType {
            /// All built-in types, in table order.
            pub const ALL: &'static [BuiltinType] = &[$(Self::$variant),*];

            /// The source spelling of the type.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),*
                }
            }
        }
    };
}

// Generates the non-type part of `Keyword`.
macro_rules! define_keywords {
    ($($variant:ident => $text:literal),* $(,)?) => {
        /// A reserved word.
        ///
        /// Type names are folded into [`Keyword::Type`] so the parser can ask
        /// "is this a type" with a single pattern.
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        pub enum Keyword {
            $($variant,)*
            Type(BuiltinType),
        }

        impl Keyword {
            /// Reserved words that are not type names, in table order.
            pub const NON_TYPE: &'static [Keyword] = &[$(Self::$variant),*];

            /// The source spelling of the keyword.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)*
                    Self::Type(ty) => ty.as_str(),
                }
            }
        }
    };
}

// Generates `Operator` with spelling and precedence level.
macro_rules! define_operators {
    ($($variant:ident => $text:literal, $precedence:literal),* $(,)?) => {
        /// An operator or punctuation symbol.
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
        pub enum Operator {
            $($variant),*
        }

        impl Operator {
            /// All operators, in table order.
            pub const ALL: &'static [Operator] = &[$(Self::$variant),*];

            /// The source spelling of the operator.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),*
                }
            }

            /// Precedence level; higher binds tighter.
            pub const fn precedence(&self) -> u8 {
                match self {
                    $(Self::$variant => $precedence),*
                }
            }
        }
    };
}

#[rustfmt::skip]
define_builtin_types! {
    //
    // Scalars
    //
    Void                   => "void",
    Bool                   => "bool",
    Int                    => "int",
    Uint                   => "uint",
    Float                  => "float",
    Double                 => "double",
    //
    // Vectors
    //
    Vec2                   => "vec2",
    Vec3                   => "vec3",
    Vec4                   => "vec4",
    Ivec2                  => "ivec2",
    Ivec3                  => "ivec3",
    Ivec4                  => "ivec4",
    Bvec2                  => "bvec2",
    Bvec3                  => "bvec3",
    Bvec4                  => "bvec4",
    Dvec2                  => "dvec2",
    Dvec3                  => "dvec3",
    Dvec4                  => "dvec4",
    Uvec2                  => "uvec2",
    Uvec3                  => "uvec3",
    Uvec4                  => "uvec4",
    //
    // Matrices
    //
    Mat2                   => "mat2",
    Mat3                   => "mat3",
    Mat4                   => "mat4",
    Dmat2                  => "dmat2",
    Dmat3                  => "dmat3",
    Dmat4                  => "dmat4",
    Mat2x2                 => "mat2x2",
    Mat2x3                 => "mat2x3",
    Mat2x4                 => "mat2x4",
    Dmat2x2                => "dmat2x2",
    Dmat2x3                => "dmat2x3",
    Dmat2x4                => "dmat2x4",
    Mat3x2                 => "mat3x2",
    Mat3x3                 => "mat3x3",
    Mat3x4                 => "mat3x4",
    Dmat3x2                => "dmat3x2",
    Dmat3x3                => "dmat3x3",
    Dmat3x4                => "dmat3x4",
    Mat4x2                 => "mat4x2",
    Mat4x3                 => "mat4x3",
    Mat4x4                 => "mat4x4",
    Dmat4x2                => "dmat4x2",
    Dmat4x3                => "dmat4x3",
    Dmat4x4                => "dmat4x4",
    //
    // Samplers
    //
    Sampler1D              => "sampler1D",
    Sampler2D              => "sampler2D",
    Sampler3D              => "sampler3D",
    SamplerCube            => "samplerCube",
    Sampler1DShadow        => "sampler1DShadow",
    Sampler2DShadow        => "sampler2DShadow",
    SamplerCubeShadow      => "samplerCubeShadow",
    Sampler1DArray         => "sampler1DArray",
    Sampler2DArray         => "sampler2DArray",
    Sampler1DArrayShadow   => "sampler1DArrayShadow",
    Sampler2DArrayShadow   => "sampler2DArrayShadow",
    Isampler1D             => "isampler1D",
    Isampler2D             => "isampler2D",
    Isampler3D             => "isampler3D",
    IsamplerCube           => "isamplerCube",
    Isampler1DArray        => "isampler1DArray",
    Isampler2DArray        => "isampler2DArray",
    Usampler1D             => "usampler1D",
    Usampler2D             => "usampler2D",
    Usampler3D             => "usampler3D",
    UsamplerCube           => "usamplerCube",
    Usampler1DArray        => "usampler1DArray",
    Usampler2DArray        => "usampler2DArray",
    Sampler2DRect          => "sampler2DRect",
    Sampler2DRectShadow    => "sampler2DRectShadow",
    Isampler2DRect         => "isampler2DRect",
    Usampler2DRect         => "usampler2DRect",
    SamplerBuffer          => "samplerBuffer",
    IsamplerBuffer         => "isamplerBuffer",
    UsamplerBuffer         => "usamplerBuffer",
    Sampler2DMS            => "sampler2DMS",
    Isampler2DMS           => "isampler2DMS",
    Usampler2DMS           => "usampler2DMS",
    Sampler2DMSArray       => "sampler2DMSArray",
    Isampler2DMSArray      => "isampler2DMSArray",
    Usampler2DMSArray      => "usampler2DMSArray",
    SamplerCubeArray       => "samplerCubeArray",
    SamplerCubeArrayShadow => "samplerCubeArrayShadow",
    IsamplerCubeArray      => "isamplerCubeArray",
    UsamplerCubeArray      => "usamplerCubeArray",
    //
    // Images
    //
    Image1D                => "image1D",
    Iimage1D               => "iimage1D",
    Uimage1D               => "uimage1D",
    Image2D                => "image2D",
    Iimage2D               => "iimage2D",
    Uimage2D               => "uimage2D",
    Image3D                => "image3D",
    Iimage3D               => "iimage3D",
    Uimage3D               => "uimage3D",
    Image2DRect            => "image2DRect",
    Iimage2DRect           => "iimage2DRect",
    Uimage2DRect           => "uimage2DRect",
    ImageCube              => "imageCube",
    IimageCube             => "iimageCube",
    UimageCube             => "uimageCube",
    ImageBuffer            => "imageBuffer",
    IimageBuffer           => "iimageBuffer",
    UimageBuffer           => "uimageBuffer",
    Image1DArray           => "image1DArray",
    Iimage1DArray          => "iimage1DArray",
    Uimage1DArray          => "uimage1DArray",
    Image2DArray           => "image2DArray",
    Iimage2DArray          => "iimage2DArray",
    Uimage2DArray          => "uimage2DArray",
    ImageCubeArray         => "imageCubeArray",
    IimageCubeArray        => "iimageCubeArray",
    UimageCubeArray        => "uimageCubeArray",
    Image2DMS              => "image2DMS",
    Iimage2DMS             => "iimage2DMS",
    Uimage2DMS             => "uimage2DMS",
    Image2DMSArray         => "image2DMSArray",
    Iimage2DMSArray        => "iimage2DMSArray",
    Uimage2DMSArray        => "uimage2DMSArray",
    //
    // Atomic counters
    //
    AtomicUint             => "atomic_uint",
}

#[rustfmt::skip]
define_keywords! {
    //
    // Storage, memory and auxiliary qualifiers
    //
    Attribute      => "attribute",
    Const          => "const",
    Uniform        => "uniform",
    Varying        => "varying",
    Buffer         => "buffer",
    Shared         => "shared",
    Coherent       => "coherent",
    Volatile       => "volatile",
    Restrict       => "restrict",
    Readonly       => "readonly",
    Writeonly      => "writeonly",
    Layout         => "layout",
    Centroid       => "centroid",
    Flat           => "flat",
    Smooth         => "smooth",
    Noperspective  => "noperspective",
    Patch          => "patch",
    Sample         => "sample",
    //
    // Control flow
    //
    Break          => "break",
    Continue       => "continue",
    Do             => "do",
    For            => "for",
    While          => "while",
    Switch         => "switch",
    Case           => "case",
    Default        => "default",
    If             => "if",
    Else           => "else",
    Discard        => "discard",
    Return         => "return",
    //
    // Parameters and miscellany
    //
    Subroutine     => "subroutine",
    In             => "in",
    Out            => "out",
    Inout          => "inout",
    True           => "true",
    False          => "false",
    Invariant      => "invariant",
    Precise        => "precise",
    //
    // Precision
    //
    Lowp           => "lowp",
    Mediump        => "mediump",
    Highp          => "highp",
    Precision      => "precision",
    Struct         => "struct",
}

#[rustfmt::skip]
define_operators! {
    ParenthesisBegin => "(",   17,
    ParenthesisEnd   => ")",   17,
    BracketBegin     => "[",   16,
    BracketEnd       => "]",   16,
    Dot              => ".",   16,
    Increment        => "++",  15,
    Decrement        => "--",  15,
    BitNot           => "~",   15,
    LogicalNot       => "!",   15,
    Multiply         => "*",   14,
    Divide           => "/",   14,
    Modulus          => "%",   14,
    Plus             => "+",   13,
    Minus            => "-",   13,
    ShiftLeft        => "<<",  12,
    ShiftRight       => ">>",  12,
    Less             => "<",   11,
    Greater          => ">",   11,
    LessEqual        => "<=",  11,
    GreaterEqual     => ">=",  11,
    Equal            => "==",  10,
    NotEqual         => "!=",  10,
    BitAnd           => "&",   9,
    BitXor           => "^",   8,
    BitOr            => "|",   7,
    LogicalAnd       => "&&",  6,
    LogicalXor       => "^^",  5,
    LogicalOr        => "||",  4,
    QuestionMark     => "?",   3,
    Colon            => ":",   3,
    Assign           => "=",   2,
    AddAssign        => "+=",  2,
    SubAssign        => "-=",  2,
    MultiplyAssign   => "*=",  2,
    DivideAssign     => "/=",  2,
    ModulusAssign    => "%=",  2,
    ShiftLeftAssign  => "<<=", 2,
    ShiftRightAssign => ">>=", 2,
    BitAndAssign     => "&=",  2,
    BitXorAssign     => "^=",  2,
    BitOrAssign      => "|=",  2,
    Comma            => ",",   1,
}

/// Longest operator spelling, in characters.
pub const MAX_OPERATOR_LEN: usize = 3;

/// Lowest precedence level handled by binary precedence climbing (`||`).
pub const LOWEST_BINARY_PRECEDENCE: u8 = 4;

static KEYWORDS: LazyLock<FxHashMap<&'static str, Keyword>> = LazyLock::new(|| {
    let mut table = FxHashMap::default();
    for keyword in Keyword::NON_TYPE {
        table.insert(keyword.as_str(), *keyword);
    }
    for ty in BuiltinType::ALL {
        table.insert(ty.as_str(), Keyword::Type(*ty));
    }
    table
});

static OPERATORS: LazyLock<FxHashMap<&'static str, Operator>> =
    LazyLock::new(|| Operator::ALL.iter().map(|op| (op.as_str(), *op)).collect());

/// How operators of equal precedence group.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Associativity {
    Left,
    Right,
}

impl Keyword {
    /// Looks up a reserved word by its spelling.
    pub fn lookup(text: &str) -> Option<Keyword> {
        KEYWORDS.get(text).copied()
    }

    /// Every reserved word: the non-type keywords followed by all type names.
    pub fn all() -> impl Iterator<Item = Keyword> {
        Keyword::NON_TYPE
            .iter()
            .copied()
            .chain(BuiltinType::ALL.iter().map(|ty| Keyword::Type(*ty)))
    }
}

impl BuiltinType {
    /// Looks up a type name by its spelling.
    pub fn lookup(text: &str) -> Option<BuiltinType> {
        match Keyword::lookup(text) {
            Some(Keyword::Type(ty)) => Some(ty),
            _ => None,
        }
    }

    /// Samplers, images and atomic counters.
    pub fn is_opaque(&self) -> bool {
        if *self == BuiltinType::AtomicUint {
            return true;
        }
        let name = self.as_str();
        ["sampler", "isampler", "usampler", "image", "iimage", "uimage"]
            .iter()
            .any(|prefix| name.starts_with(prefix))
    }

    /// Whether `precision <qualifier> <type>;` may name this type.
    pub fn accepts_default_precision(&self) -> bool {
        matches!(self, BuiltinType::Int | BuiltinType::Float) || self.is_opaque()
    }
}

impl Operator {
    /// Looks up an operator by its exact spelling.
    pub fn lookup(text: &str) -> Option<Operator> {
        OPERATORS.get(text).copied()
    }

    /// `=` and every compound assignment form.
    pub const fn is_assignment(&self) -> bool {
        self.precedence() == 2
    }

    /// Precedence for operators that can appear between two operands.
    ///
    /// Returns `None` for everything that isn't a plain binary operator:
    /// unary-only operators, punctuation, `?:`, assignments and `,`.
    pub const fn binary_precedence(&self) -> Option<u8> {
        let level = self.precedence();
        if level >= LOWEST_BINARY_PRECEDENCE && level <= 14 {
            Some(level)
        } else {
            None
        }
    }

    /// Grouping of a chain of this operator: assignments and `?:` group to the right.
    pub const fn associativity(&self) -> Associativity {
        match self.precedence() {
            2 | 3 => Associativity::Right,
            _ => Associativity::Left,
        }
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
