//! Shader stages and the per-stage language surface
//!
//! The grammar of a shader depends on the pipeline stage it is compiled for:
//! which layout qualifiers exist, which storage qualifiers are legal, which
//! `gl_*` variables are predeclared and which built-in functions can be
//! called. All of that is described here as static tables.

use super::ast::{Auxiliary, BuiltinDirection, Storage, TypeRef};
use super::lexemes::BuiltinType;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Pipeline stage a shader is written for
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Compute,
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    #[default]
    Fragment,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 6] = [
        ShaderStage::Compute,
        ShaderStage::Vertex,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShaderStage::Compute => "compute",
            ShaderStage::Vertex => "vertex",
            ShaderStage::TessControl => "tessellation control",
            ShaderStage::TessEvaluation => "tessellation evaluation",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
        }
    }

    /// Short flag spelling (`c`, `v`, `tc`, `te`, `g`, `f`).
    pub fn flag(&self) -> &'static str {
        match self {
            ShaderStage::Compute => "c",
            ShaderStage::Vertex => "v",
            ShaderStage::TessControl => "tc",
            ShaderStage::TessEvaluation => "te",
            ShaderStage::Geometry => "g",
            ShaderStage::Fragment => "f",
        }
    }

    pub fn is_tessellation(&self) -> bool {
        matches!(self, ShaderStage::TessControl | ShaderStage::TessEvaluation)
    }

    pub fn allows_storage(&self, storage: Storage) -> bool {
        match storage {
            Storage::Attribute => *self == ShaderStage::Vertex,
            Storage::Varying => matches!(self, ShaderStage::Vertex | ShaderStage::Fragment),
            Storage::Shared => *self == ShaderStage::Compute,
            // Compute has no user-declared stage inputs or outputs, only
            // qualifier-only defaults such as `layout(local_size_x = 8) in;`.
            Storage::In | Storage::Out => *self != ShaderStage::Compute,
            Storage::Uniform | Storage::Buffer => true,
        }
    }

    pub fn allows_auxiliary(&self, auxiliary: Auxiliary) -> bool {
        match auxiliary {
            Auxiliary::Patch => self.is_tessellation(),
            Auxiliary::Centroid | Auxiliary::Sample => *self != ShaderStage::Compute,
        }
    }

    pub fn allows_interpolation(&self) -> bool {
        *self != ShaderStage::Compute
    }

    pub fn allows_discard(&self) -> bool {
        *self == ShaderStage::Fragment
    }

    /// Looks up a layout qualifier accepted in this stage.
    pub fn layout_qualifier(&self, name: &str) -> Option<&'static LayoutQualifierInfo> {
        LAYOUT_QUALIFIERS
            .iter()
            .find(|info| info.name == name && info.stages.contains(*self))
    }

    /// Predeclared `gl_*` variables of this stage, common constants included.
    pub fn builtin_variables(&self) -> impl Iterator<Item = &'static BuiltinVariable> {
        let stage_specific: &'static [BuiltinVariable] = match self {
            ShaderStage::Compute => COMPUTE_VARIABLES,
            ShaderStage::Vertex => VERTEX_VARIABLES,
            ShaderStage::TessControl => TESS_CONTROL_VARIABLES,
            ShaderStage::TessEvaluation => TESS_EVALUATION_VARIABLES,
            ShaderStage::Geometry => GEOMETRY_VARIABLES,
            ShaderStage::Fragment => FRAGMENT_VARIABLES,
        };
        COMMON_CONSTANTS.iter().chain(stage_specific)
    }

    /// Whether `name` is a built-in function callable from this stage.
    pub fn has_builtin_function(&self, name: &str) -> bool {
        if COMMON_FUNCTIONS.contains(&name) {
            return true;
        }
        STAGE_FUNCTIONS
            .iter()
            .any(|(function, stages)| *function == name && stages.contains(*self))
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown shader stage '{0}'")]
pub struct UnknownStageError(pub String);

impl FromStr for ShaderStage {
    type Err = UnknownStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let flag = s.strip_prefix('-').unwrap_or(s);
        match flag {
            "c" | "compute" => Ok(ShaderStage::Compute),
            "v" | "vertex" => Ok(ShaderStage::Vertex),
            "tc" | "tess-control" | "tesscontrol" => Ok(ShaderStage::TessControl),
            "te" | "tess-evaluation" | "tessevaluation" => Ok(ShaderStage::TessEvaluation),
            "g" | "geometry" => Ok(ShaderStage::Geometry),
            "f" | "fragment" => Ok(ShaderStage::Fragment),
            _ if s == ShaderStage::TessControl.as_str() => Ok(ShaderStage::TessControl),
            _ if s == ShaderStage::TessEvaluation.as_str() => Ok(ShaderStage::TessEvaluation),
            _ => Err(UnknownStageError(s.to_string())),
        }
    }
}

/// Options for a single parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub stage: ShaderStage,
    /// Name used to prefix diagnostics, usually a file name.
    pub source_name: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            stage: ShaderStage::default(),
            source_name: "<source>".to_string(),
        }
    }
}

impl ParseOptions {
    pub fn with_stage(mut self, stage: ShaderStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }
}

/// A small set of stages
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StageSet(u8);

impl StageSet {
    pub const ALL: StageSet = StageSet(0b11_1111);

    pub const fn of(stages: &[ShaderStage]) -> StageSet {
        let mut bits = 0;
        let mut i = 0;
        while i < stages.len() {
            bits |= 1 << stages[i] as u8;
            i += 1;
        }
        StageSet(bits)
    }

    pub const fn contains(&self, stage: ShaderStage) -> bool {
        self.0 & (1 << stage as u8) != 0
    }
}

const COMPUTE: StageSet = StageSet::of(&[ShaderStage::Compute]);
const TESS_CONTROL: StageSet = StageSet::of(&[ShaderStage::TessControl]);
const TESS_EVALUATION: StageSet = StageSet::of(&[ShaderStage::TessEvaluation]);
const GEOMETRY: StageSet = StageSet::of(&[ShaderStage::Geometry]);
const FRAGMENT: StageSet = StageSet::of(&[ShaderStage::Fragment]);
const PRE_RASTER: StageSet = StageSet::of(&[
    ShaderStage::Vertex,
    ShaderStage::TessControl,
    ShaderStage::TessEvaluation,
    ShaderStage::Geometry,
]);
const TESS_EVALUATION_AND_GEOMETRY: StageSet =
    StageSet::of(&[ShaderStage::TessEvaluation, ShaderStage::Geometry]);
const COMPUTE_AND_TESS_CONTROL: StageSet =
    StageSet::of(&[ShaderStage::Compute, ShaderStage::TessControl]);

/// One entry of the layout qualifier table
#[derive(Debug)]
pub struct LayoutQualifierInfo {
    pub name: &'static str,
    /// `name = value` rather than a bare flag.
    pub takes_value: bool,
    pub stages: StageSet,
}

// Generates the layout qualifier table.
macro_rules! layout_qualifiers {
    (@value) => { false };
    (@value $value:tt) => { true };
    ($($name:literal $(= $value:tt)? in $stages:expr),* $(,)?) => {
        &[$(LayoutQualifierInfo {
            name: $name,
            takes_value: layout_qualifiers!(@value $($value)?),
            stages: $stages,
        }),*]
    };
}

#[rustfmt::skip]
static LAYOUT_QUALIFIERS: &[LayoutQualifierInfo] = layout_qualifiers![
    // Blocks and buffers
    "shared"                 in StageSet::ALL,
    "packed"                 in StageSet::ALL,
    "std140"                 in StageSet::ALL,
    "std430"                 in StageSet::ALL,
    "row_major"              in StageSet::ALL,
    "column_major"           in StageSet::ALL,
    "binding" = v            in StageSet::ALL,
    "offset" = v             in StageSet::ALL,
    "align" = v              in StageSet::ALL,
    "location" = v           in StageSet::ALL,
    "component" = v          in StageSet::ALL,
    // Image formats
    "rgba32f"                in StageSet::ALL,
    "rgba16f"                in StageSet::ALL,
    "rg32f"                  in StageSet::ALL,
    "rg16f"                  in StageSet::ALL,
    "r11f_g11f_b10f"         in StageSet::ALL,
    "r32f"                   in StageSet::ALL,
    "r16f"                   in StageSet::ALL,
    "rgba16"                 in StageSet::ALL,
    "rgb10_a2"               in StageSet::ALL,
    "rgba8"                  in StageSet::ALL,
    "rg16"                   in StageSet::ALL,
    "rg8"                    in StageSet::ALL,
    "r16"                    in StageSet::ALL,
    "r8"                     in StageSet::ALL,
    "rgba16_snorm"           in StageSet::ALL,
    "rgba8_snorm"            in StageSet::ALL,
    "rg16_snorm"             in StageSet::ALL,
    "rg8_snorm"              in StageSet::ALL,
    "r16_snorm"              in StageSet::ALL,
    "r8_snorm"               in StageSet::ALL,
    "rgba32i"                in StageSet::ALL,
    "rgba16i"                in StageSet::ALL,
    "rgba8i"                 in StageSet::ALL,
    "rg32i"                  in StageSet::ALL,
    "rg16i"                  in StageSet::ALL,
    "rg8i"                   in StageSet::ALL,
    "r32i"                   in StageSet::ALL,
    "r16i"                   in StageSet::ALL,
    "r8i"                    in StageSet::ALL,
    "rgba32ui"               in StageSet::ALL,
    "rgba16ui"               in StageSet::ALL,
    "rgb10_a2ui"             in StageSet::ALL,
    "rgba8ui"                in StageSet::ALL,
    "rg32ui"                 in StageSet::ALL,
    "rg16ui"                 in StageSet::ALL,
    "rg8ui"                  in StageSet::ALL,
    "r32ui"                  in StageSet::ALL,
    "r16ui"                  in StageSet::ALL,
    "r8ui"                   in StageSet::ALL,
    // Transform feedback
    "xfb_buffer" = v         in PRE_RASTER,
    "xfb_offset" = v         in PRE_RASTER,
    "xfb_stride" = v         in PRE_RASTER,
    // Compute
    "local_size_x" = v       in COMPUTE,
    "local_size_y" = v       in COMPUTE,
    "local_size_z" = v       in COMPUTE,
    // Tessellation control
    "vertices" = v           in TESS_CONTROL,
    // Tessellation evaluation
    "triangles"              in TESS_EVALUATION_AND_GEOMETRY,
    "quads"                  in TESS_EVALUATION,
    "isolines"               in TESS_EVALUATION,
    "equal_spacing"          in TESS_EVALUATION,
    "fractional_even_spacing" in TESS_EVALUATION,
    "fractional_odd_spacing" in TESS_EVALUATION,
    "cw"                     in TESS_EVALUATION,
    "ccw"                    in TESS_EVALUATION,
    "point_mode"             in TESS_EVALUATION,
    // Geometry
    "points"                 in GEOMETRY,
    "lines"                  in GEOMETRY,
    "lines_adjacency"        in GEOMETRY,
    "triangles_adjacency"    in GEOMETRY,
    "invocations" = v        in GEOMETRY,
    "line_strip"             in GEOMETRY,
    "triangle_strip"         in GEOMETRY,
    "max_vertices" = v       in GEOMETRY,
    "stream" = v             in GEOMETRY,
    // Fragment
    "origin_upper_left"      in FRAGMENT,
    "pixel_center_integer"   in FRAGMENT,
    "early_fragment_tests"   in FRAGMENT,
    "index" = v              in FRAGMENT,
    "depth_any"              in FRAGMENT,
    "depth_greater"          in FRAGMENT,
    "depth_less"             in FRAGMENT,
    "depth_unchanged"        in FRAGMENT,
];

/// Array shape of a built-in variable
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BuiltinArray {
    Scalar,
    Unsized,
    Sized(i32),
}

/// A predeclared `gl_*` variable
#[derive(Debug)]
pub struct BuiltinVariable {
    pub name: &'static str,
    pub ty: TypeRef,
    pub array: BuiltinArray,
    pub direction: BuiltinDirection,
    pub is_const: bool,
}

// Generates a built-in variable table.
macro_rules! builtin_variables {
    (@type PerVertex) => { TypeRef::PerVertex };
    (@type $ty:ident) => { TypeRef::Builtin(BuiltinType::$ty) };
    (@array) => { BuiltinArray::Scalar };
    (@array []) => { BuiltinArray::Unsized };
    (@array [$size:literal]) => { BuiltinArray::Sized($size) };
    (@dir out) => { BuiltinDirection::Output };
    (@dir $dir:ident) => { BuiltinDirection::Input };
    (@is_const constant) => { true };
    (@is_const $dir:ident) => { false };
    ($($dir:ident $ty:ident $name:ident $([$($size:literal)?])?;)*) => {
        &[$(BuiltinVariable {
            name: stringify!($name),
            ty: builtin_variables!(@type $ty),
            array: builtin_variables!(@array $([$($size)?])?),
            direction: builtin_variables!(@dir $dir),
            is_const: builtin_variables!(@is_const $dir),
        }),*]
    };
}

#[rustfmt::skip]
static COMMON_CONSTANTS: &[BuiltinVariable] = builtin_variables![
    constant Int gl_MaxVertexAttribs;
    constant Int gl_MaxVertexUniformComponents;
    constant Int gl_MaxClipDistances;
    constant Int gl_MaxDrawBuffers;
    constant Int gl_MaxTextureImageUnits;
    constant Int gl_MaxFragmentUniformComponents;
    constant Int gl_MaxCombinedTextureImageUnits;
    constant Int gl_MaxImageUnits;
    constant Int gl_MaxViewports;
    constant Int gl_MaxPatchVertices;
    constant Int gl_MaxTessGenLevel;
    constant Int gl_MaxGeometryOutputVertices;
    constant Int gl_MaxAtomicCounterBindings;
];

#[rustfmt::skip]
static COMPUTE_VARIABLES: &[BuiltinVariable] = builtin_variables![
    input Uvec3 gl_NumWorkGroups;
    constant Uvec3 gl_WorkGroupSize;
    input Uvec3 gl_WorkGroupID;
    input Uvec3 gl_LocalInvocationID;
    input Uvec3 gl_GlobalInvocationID;
    input Uint gl_LocalInvocationIndex;
    constant Ivec3 gl_MaxComputeWorkGroupCount;
    constant Ivec3 gl_MaxComputeWorkGroupSize;
];

#[rustfmt::skip]
static VERTEX_VARIABLES: &[BuiltinVariable] = builtin_variables![
    input Int gl_VertexID;
    input Int gl_InstanceID;
    out Vec4 gl_Position;
    out Float gl_PointSize;
    out Float gl_ClipDistance[];
];

#[rustfmt::skip]
static TESS_CONTROL_VARIABLES: &[BuiltinVariable] = builtin_variables![
    input PerVertex gl_in[];
    input Int gl_PatchVerticesIn;
    input Int gl_PrimitiveID;
    input Int gl_InvocationID;
    out PerVertex gl_out[];
    out Float gl_TessLevelOuter[4];
    out Float gl_TessLevelInner[2];
];

#[rustfmt::skip]
static TESS_EVALUATION_VARIABLES: &[BuiltinVariable] = builtin_variables![
    input PerVertex gl_in[];
    input Int gl_PatchVerticesIn;
    input Int gl_PrimitiveID;
    input Vec3 gl_TessCoord;
    input Float gl_TessLevelOuter[4];
    input Float gl_TessLevelInner[2];
    out Vec4 gl_Position;
    out Float gl_PointSize;
    out Float gl_ClipDistance[];
];

#[rustfmt::skip]
static GEOMETRY_VARIABLES: &[BuiltinVariable] = builtin_variables![
    input PerVertex gl_in[];
    input Int gl_PrimitiveIDIn;
    input Int gl_InvocationID;
    out Vec4 gl_Position;
    out Float gl_PointSize;
    out Float gl_ClipDistance[];
    out Int gl_PrimitiveID;
    out Int gl_Layer;
    out Int gl_ViewportIndex;
];

#[rustfmt::skip]
static FRAGMENT_VARIABLES: &[BuiltinVariable] = builtin_variables![
    input Vec4 gl_FragCoord;
    input Bool gl_FrontFacing;
    input Float gl_ClipDistance[];
    input Vec2 gl_PointCoord;
    input Int gl_PrimitiveID;
    input Int gl_SampleID;
    input Vec2 gl_SamplePosition;
    input Int gl_SampleMaskIn[];
    input Int gl_Layer;
    input Int gl_ViewportIndex;
    out Float gl_FragDepth;
    out Int gl_SampleMask[];
];

#[rustfmt::skip]
static COMMON_FUNCTIONS: &[&str] = &[
    // Angle and trigonometry
    "radians", "degrees", "sin", "cos", "tan", "asin", "acos", "atan",
    "sinh", "cosh", "tanh", "asinh", "acosh", "atanh",
    // Exponential
    "pow", "exp", "log", "exp2", "log2", "sqrt", "inversesqrt",
    // Common
    "abs", "sign", "floor", "trunc", "round", "roundEven", "ceil", "fract",
    "mod", "modf", "min", "max", "clamp", "mix", "step", "smoothstep",
    "isnan", "isinf", "floatBitsToInt", "floatBitsToUint", "intBitsToFloat",
    "uintBitsToFloat", "fma", "frexp", "ldexp",
    // Packing
    "packUnorm2x16", "packSnorm2x16", "packUnorm4x8", "packSnorm4x8",
    "unpackUnorm2x16", "unpackSnorm2x16", "unpackUnorm4x8", "unpackSnorm4x8",
    "packDouble2x32", "unpackDouble2x32", "packHalf2x16", "unpackHalf2x16",
    // Geometric
    "length", "distance", "dot", "cross", "normalize", "faceforward",
    "reflect", "refract",
    // Matrix
    "matrixCompMult", "outerProduct", "transpose", "determinant", "inverse",
    // Vector relational
    "lessThan", "lessThanEqual", "greaterThan", "greaterThanEqual", "equal",
    "notEqual", "any", "all", "not",
    // Integer
    "uaddCarry", "usubBorrow", "umulExtended", "imulExtended",
    "bitfieldExtract", "bitfieldInsert", "bitfieldReverse", "bitCount",
    "findLSB", "findMSB",
    // Texture
    "textureSize", "textureQueryLod", "textureQueryLevels", "texture",
    "textureProj", "textureLod", "textureOffset", "texelFetch",
    "texelFetchOffset", "textureProjOffset", "textureLodOffset",
    "textureProjLod", "textureProjLodOffset", "textureGrad",
    "textureGradOffset", "textureProjGrad", "textureProjGradOffset",
    "textureGather", "textureGatherOffset", "textureGatherOffsets",
    // Atomics and images
    "atomicCounterIncrement", "atomicCounterDecrement", "atomicCounter",
    "atomicAdd", "atomicMin", "atomicMax", "atomicAnd", "atomicOr",
    "atomicXor", "atomicExchange", "atomicCompSwap",
    "imageSize", "imageLoad", "imageStore", "imageAtomicAdd",
    "imageAtomicMin", "imageAtomicMax", "imageAtomicAnd", "imageAtomicOr",
    "imageAtomicXor", "imageAtomicExchange", "imageAtomicCompSwap",
    // Memory control
    "memoryBarrier", "memoryBarrierAtomicCounter", "memoryBarrierBuffer",
    "memoryBarrierImage",
    // Noise
    "noise1", "noise2", "noise3", "noise4",
];

#[rustfmt::skip]
static STAGE_FUNCTIONS: &[(&str, StageSet)] = &[
    ("dFdx", FRAGMENT),
    ("dFdy", FRAGMENT),
    ("fwidth", FRAGMENT),
    ("interpolateAtCentroid", FRAGMENT),
    ("interpolateAtSample", FRAGMENT),
    ("interpolateAtOffset", FRAGMENT),
    ("EmitVertex", GEOMETRY),
    ("EndPrimitive", GEOMETRY),
    ("EmitStreamVertex", GEOMETRY),
    ("EndStreamPrimitive", GEOMETRY),
    ("barrier", COMPUTE_AND_TESS_CONTROL),
    ("memoryBarrierShared", COMPUTE),
    ("groupMemoryBarrier", COMPUTE),
];
