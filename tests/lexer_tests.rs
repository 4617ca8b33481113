// Lexer conformance tests over the full reserved word and operator tables

use glsl_front::parser::lexemes::{BuiltinType, Keyword, Operator};
use glsl_front::parser::lexer::{Lexer, Token, TokenKind};

/// Reserved words of GLSL 4.40 in the order the language specification lists them.
const RESERVED_WORDS: &[&str] = &[
    "attribute", "const", "uniform", "varying", "buffer", "shared", "coherent", "volatile",
    "restrict", "readonly", "writeonly", "atomic_uint", "layout", "centroid", "flat", "smooth",
    "noperspective", "patch", "sample", "break", "continue", "do", "for", "while", "switch",
    "case", "default", "if", "else", "subroutine", "in", "out", "inout", "float", "double",
    "int", "void", "bool", "true", "false", "invariant", "precise", "discard", "return",
    "mat2", "mat3", "mat4", "dmat2", "dmat3", "dmat4", "mat2x2", "mat2x3", "mat2x4",
    "dmat2x2", "dmat2x3", "dmat2x4", "mat3x2", "mat3x3", "mat3x4", "dmat3x2", "dmat3x3",
    "dmat3x4", "mat4x2", "mat4x3", "mat4x4", "dmat4x2", "dmat4x3", "dmat4x4", "vec2", "vec3",
    "vec4", "ivec2", "ivec3", "ivec4", "bvec2", "bvec3", "bvec4", "dvec2", "dvec3", "dvec4",
    "uint", "uvec2", "uvec3", "uvec4", "lowp", "mediump", "highp", "precision", "sampler1D",
    "sampler2D", "sampler3D", "samplerCube", "sampler1DShadow", "sampler2DShadow",
    "samplerCubeShadow", "sampler1DArray", "sampler2DArray", "sampler1DArrayShadow",
    "sampler2DArrayShadow", "isampler1D", "isampler2D", "isampler3D", "isamplerCube",
    "isampler1DArray", "isampler2DArray", "usampler1D", "usampler2D", "usampler3D",
    "usamplerCube", "usampler1DArray", "usampler2DArray", "sampler2DRect",
    "sampler2DRectShadow", "isampler2DRect", "usampler2DRect", "samplerBuffer",
    "isamplerBuffer", "usamplerBuffer", "sampler2DMS", "isampler2DMS", "usampler2DMS",
    "sampler2DMSArray", "isampler2DMSArray", "usampler2DMSArray", "samplerCubeArray",
    "samplerCubeArrayShadow", "isamplerCubeArray", "usamplerCubeArray", "image1D", "iimage1D",
    "uimage1D", "image2D", "iimage2D", "uimage2D", "image3D", "iimage3D", "uimage3D",
    "image2DRect", "iimage2DRect", "uimage2DRect", "imageCube", "iimageCube", "uimageCube",
    "imageBuffer", "iimageBuffer", "uimageBuffer", "image1DArray", "iimage1DArray",
    "uimage1DArray", "image2DArray", "iimage2DArray", "uimage2DArray", "imageCubeArray",
    "iimageCubeArray", "uimageCubeArray", "image2DMS", "iimage2DMS", "uimage2DMS",
    "image2DMSArray", "iimage2DMSArray", "uimage2DMSArray", "struct",
];

fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize().unwrap()
}

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).into_iter().map(|token| token.kind).collect()
}

#[test]
fn test_every_keyword_alone() {
    for keyword in Keyword::all() {
        let tokens = tokenize(keyword.as_str());

        assert_eq!(tokens.len(), 2, "'{}' should lex as one token", keyword);
        assert_eq!(tokens[0].kind, TokenKind::Keyword(keyword));
        assert_eq!(tokens[0].as_keyword(), Some(keyword));
        assert!(tokens[1].is_eof());
    }
}

#[test]
fn test_every_operator_alone() {
    for op in Operator::ALL {
        let tokens = tokenize(op.as_str());

        assert_eq!(tokens.len(), 2, "'{}' should lex as one token", op);
        assert_eq!(tokens[0].as_operator(), Some(*op));
        assert!(tokens[1].is_eof());
    }
}

#[test]
fn test_reserved_words_in_order() {
    let source: String = RESERVED_WORDS.iter().map(|word| format!(" {} ", word)).collect();
    let tokens = tokenize(&source);

    assert_eq!(tokens.len(), RESERVED_WORDS.len() + 1);
    for (token, word) in tokens.iter().zip(RESERVED_WORDS) {
        match token.as_keyword() {
            Some(keyword) => assert_eq!(keyword.as_str(), *word),
            None => panic!("Expected keyword '{}', found {}", word, token),
        }
    }
    assert!(tokens.last().unwrap().is_eof());
}

#[test]
fn test_reserved_words_cover_table() {
    // Every table entry appears in the ordered list and nothing else does.
    assert_eq!(RESERVED_WORDS.len(), Keyword::all().count());
    for word in RESERVED_WORDS {
        assert!(Keyword::lookup(word).is_some(), "'{}' missing from the table", word);
    }
    assert_eq!(Keyword::lookup("atomic_uint"), Some(Keyword::Type(BuiltinType::AtomicUint)));
}

#[test]
fn test_skip_comment() {
    let kinds = kinds("// comment\nvoid main()\n{\n}\n");

    assert_eq!(
        kinds,
        vec![
            TokenKind::Keyword(Keyword::Type(BuiltinType::Void)),
            TokenKind::Identifier("main".to_string()),
            TokenKind::Operator(Operator::ParenthesisBegin),
            TokenKind::Operator(Operator::ParenthesisEnd),
            TokenKind::ScopeBegin,
            TokenKind::ScopeEnd,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lines_follow_newlines() {
    let tokens = tokenize("// comment\nvoid main()\n{\n}\n");
    let lines: Vec<usize> = tokens.iter().map(|token| token.line).collect();

    assert_eq!(lines, vec![2, 2, 2, 2, 3, 4, 5]);
}

#[test]
fn test_longest_operator_match() {
    let ops: Vec<Operator> = tokenize("a<<=b>>c^^d")
        .iter()
        .filter_map(Token::as_operator)
        .collect();

    assert_eq!(ops, vec![Operator::ShiftLeftAssign, Operator::ShiftRight, Operator::LogicalXor]);
}

#[test]
fn test_near_keywords_are_identifiers() {
    for word in ["mainx", "vec5", "Float", "in_color", "_int", "gl_Position"] {
        assert_eq!(kinds(word)[0], TokenKind::Identifier(word.to_string()));
    }
}

#[test]
fn test_unterminated_comment_reports_start_line() {
    let err = Lexer::new("int x;\n/* never\nclosed").tokenize().unwrap_err();

    assert_eq!(err.line, 2);
    assert!(err.message.contains("comment"));
}
