//! Declaration parsing implementation
//!
//! This module handles everything that can appear at the top level of a
//! shader, plus the qualifier and declarator machinery shared with local
//! declarations:
//!
//! - Global variables: `layout(location = 0) flat in ivec2 id;`
//! - Structures: `struct Light { vec3 position; float radius; } lights[4];`
//! - Interface blocks: `uniform Matrices { mat4 mvp; } matrices;`
//! - Default layouts: `layout(local_size_x = 64) in;`
//! - Default precisions: `precision highp float;`
//! - Function prototypes and definitions
//!
//! # Grammar
//!
//! ```text
//! top_level   ::= ';' | precision_decl | qualifiers declaration
//! declaration ::= struct_def [declarators] ';'
//!               | ';'                                   (default layout)
//!               | IDENT '{' members '}' [IDENT [sizes]] ';'   (interface block)
//!               | type IDENT '(' params ')' (';' | block)
//!               | type declarators ';'
//! declarators ::= IDENT [sizes] ['=' assignment] {',' IDENT [sizes] ['=' assignment]}
//! qualifiers  ::= { storage | auxiliary | interpolation | memory | precision
//!                 | layout '(' layout_item {',' layout_item} ')'
//!                 | 'const' | 'invariant' | 'precise' }
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexemes::{BuiltinType, Keyword, Operator};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ErrorKind, ParseError, Parser};
use crate::parser::scope::{ParameterSignature, Symbol};
use crate::parser::stage::ShaderStage;

/// Qualifiers read before a type, not yet checked against where they appear
#[derive(Debug, Default)]
pub(crate) struct Qualifiers {
    pub storage: Option<Storage>,
    pub auxiliary: Option<Auxiliary>,
    pub interpolation: Option<Interpolation>,
    pub memory: MemoryQualifiers,
    pub layout: Vec<LayoutQualifier>,
    pub precision: Option<Precision>,
    pub is_const: bool,
    pub is_invariant: bool,
    pub is_precise: bool,
    pub line: usize,
}

impl Qualifiers {
    /// Spellings of every qualifier present, `layout` standing for the whole list.
    fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.is_const {
            names.push("const");
        }
        if self.is_precise {
            names.push("precise");
        }
        if self.is_invariant {
            names.push("invariant");
        }
        names.extend(self.storage.map(|storage| storage.as_str()));
        names.extend(self.auxiliary.map(|auxiliary| auxiliary.as_str()));
        names.extend(self.interpolation.map(|interpolation| interpolation.as_str()));
        let memory = [
            (self.memory.coherent, "coherent"),
            (self.memory.volatile, "volatile"),
            (self.memory.restrict, "restrict"),
            (self.memory.readonly, "readonly"),
            (self.memory.writeonly, "writeonly"),
        ];
        names.extend(memory.iter().filter(|(set, _)| *set).map(|(_, name)| *name));
        if !self.layout.is_empty() {
            names.push("layout");
        }
        names.extend(self.precision.map(|precision| precision.as_str()));
        names
    }

    /// First qualifier not in `allowed`.
    pub(crate) fn first_disallowed(&self, allowed: &[&str]) -> Option<&'static str> {
        self.names().into_iter().find(|name| !allowed.contains(name))
    }

    fn into_global(self) -> GlobalQualifiers {
        GlobalQualifiers {
            storage: self.storage,
            auxiliary: self.auxiliary,
            interpolation: self.interpolation,
            memory: self.memory,
            layout: self.layout,
            is_invariant: self.is_invariant,
        }
    }
}

pub(crate) fn precision_of(keyword: Keyword) -> Option<Precision> {
    match keyword {
        Keyword::Lowp => Some(Precision::Low),
        Keyword::Mediump => Some(Precision::Medium),
        Keyword::Highp => Some(Precision::High),
        _ => None,
    }
}

fn storage_of(keyword: Keyword) -> Option<Storage> {
    match keyword {
        Keyword::In => Some(Storage::In),
        Keyword::Out => Some(Storage::Out),
        Keyword::Uniform => Some(Storage::Uniform),
        Keyword::Buffer => Some(Storage::Buffer),
        Keyword::Shared => Some(Storage::Shared),
        Keyword::Attribute => Some(Storage::Attribute),
        Keyword::Varying => Some(Storage::Varying),
        _ => None,
    }
}

fn auxiliary_of(keyword: Keyword) -> Option<Auxiliary> {
    match keyword {
        Keyword::Centroid => Some(Auxiliary::Centroid),
        Keyword::Sample => Some(Auxiliary::Sample),
        Keyword::Patch => Some(Auxiliary::Patch),
        _ => None,
    }
}

fn interpolation_of(keyword: Keyword) -> Option<Interpolation> {
    match keyword {
        Keyword::Smooth => Some(Interpolation::Smooth),
        Keyword::Flat => Some(Interpolation::Flat),
        Keyword::Noperspective => Some(Interpolation::NoPerspective),
        _ => None,
    }
}

/// Whether `keyword` can start a qualifier list.
pub(crate) fn is_qualifier_keyword(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::Const
            | Keyword::Precise
            | Keyword::Invariant
            | Keyword::Layout
            | Keyword::Coherent
            | Keyword::Volatile
            | Keyword::Restrict
            | Keyword::Readonly
            | Keyword::Writeonly
    ) || precision_of(keyword).is_some()
        || storage_of(keyword).is_some()
        || auxiliary_of(keyword).is_some()
        || interpolation_of(keyword).is_some()
}

fn set_once<T>(slot: &mut Option<T>, value: T, category: &str, line: usize) -> Result<(), ParseError> {
    if slot.is_some() {
        return Err(ParseError::new(
            ErrorKind::Syntax,
            format!("multiple {} qualifiers", category),
            line,
        ));
    }
    *slot = Some(value);
    Ok(())
}

fn set_flag(flag: &mut bool, name: &str, line: usize) -> Result<(), ParseError> {
    if *flag {
        return Err(ParseError::new(
            ErrorKind::Syntax,
            format!("duplicate '{}' qualifier", name),
            line,
        ));
    }
    *flag = true;
    Ok(())
}

impl Parser {
    /// Parse one top-level declaration
    pub(crate) fn parse_top_level_declaration(&mut self) -> Result<(), ParseError> {
        if self.match_token(&TokenKind::Semicolon)? {
            return Ok(());
        }

        if self.check_keyword(Keyword::Precision) {
            return self.parse_precision_declaration();
        }

        let qualifiers = self.parse_qualifiers()?;

        if self.check_keyword(Keyword::Struct) {
            return self.parse_struct_definition(qualifiers);
        }

        if self.check(&TokenKind::Semicolon) {
            return self.parse_default_layout(qualifiers);
        }

        if qualifiers.storage.is_some()
            && matches!(self.peek().kind, TokenKind::Identifier(_))
            && self.peek_next()?.kind == TokenKind::ScopeBegin
        {
            return self.parse_interface_block(qualifiers);
        }

        let line = self.current_line();
        let ty = self.parse_type_specifier()?;
        let type_sizes = self.parse_array_sizes()?;
        let name_line = self.current_line();
        let name = self.expect_identifier("in declaration")?;

        if self.check_operator(Operator::ParenthesisBegin) {
            if !type_sizes.is_empty() {
                return Err(self.syntax_error("array return types are not supported", line));
            }
            return self.parse_function(qualifiers, ty, name, line);
        }

        self.parse_global_declarators(qualifiers, ty, type_sizes, name, name_line)
    }

    /// Parse qualifiers in any order, each category at most once
    pub(crate) fn parse_qualifiers(&mut self) -> Result<Qualifiers, ParseError> {
        let mut qualifiers = Qualifiers {
            line: self.current_line(),
            ..Qualifiers::default()
        };

        while let Some(keyword) = self.peek().as_keyword() {
            let line = self.current_line();

            if keyword == Keyword::Layout {
                self.advance()?;
                let list = self.parse_layout_qualifier_list()?;
                qualifiers.layout.extend(list);
                continue;
            }

            if let Some(storage) = storage_of(keyword) {
                set_once(&mut qualifiers.storage, storage, "storage", line)?;
            } else if let Some(auxiliary) = auxiliary_of(keyword) {
                set_once(&mut qualifiers.auxiliary, auxiliary, "auxiliary storage", line)?;
            } else if let Some(interpolation) = interpolation_of(keyword) {
                set_once(&mut qualifiers.interpolation, interpolation, "interpolation", line)?;
            } else if let Some(precision) = precision_of(keyword) {
                set_once(&mut qualifiers.precision, precision, "precision", line)?;
            } else {
                let memory = &mut qualifiers.memory;
                match keyword {
                    Keyword::Const => set_flag(&mut qualifiers.is_const, "const", line)?,
                    Keyword::Invariant => set_flag(&mut qualifiers.is_invariant, "invariant", line)?,
                    Keyword::Precise => set_flag(&mut qualifiers.is_precise, "precise", line)?,
                    Keyword::Coherent => set_flag(&mut memory.coherent, "coherent", line)?,
                    Keyword::Volatile => set_flag(&mut memory.volatile, "volatile", line)?,
                    Keyword::Restrict => set_flag(&mut memory.restrict, "restrict", line)?,
                    Keyword::Readonly => set_flag(&mut memory.readonly, "readonly", line)?,
                    Keyword::Writeonly => set_flag(&mut memory.writeonly, "writeonly", line)?,
                    _ => break,
                }
            }

            self.advance()?;
        }

        Ok(qualifiers)
    }

    /// Parse `( item {, item} )` after `layout`
    fn parse_layout_qualifier_list(&mut self) -> Result<Vec<LayoutQualifier>, ParseError> {
        self.expect_lparen("after 'layout'")?;
        let mut list = Vec::new();

        loop {
            let line = self.current_line();
            // `shared` is both a storage keyword and a block layout.
            let name = if self.match_keyword(Keyword::Shared)? {
                Keyword::Shared.as_str().to_string()
            } else {
                self.expect_identifier("in layout qualifier list")?
            };

            let info = match self.stage.layout_qualifier(&name) {
                Some(info) => info,
                None if ShaderStage::ALL
                    .iter()
                    .any(|stage| stage.layout_qualifier(&name).is_some()) =>
                {
                    return Err(self.stage_error(
                        format!(
                            "layout qualifier '{}' is not allowed in {} shaders",
                            name, self.stage
                        ),
                        line,
                    ));
                }
                None => {
                    return Err(self.syntax_error(format!("unknown layout qualifier '{}'", name), line));
                }
            };

            let initial_value = if self.match_operator(Operator::Assign)? {
                if !info.takes_value {
                    return Err(self.syntax_error(
                        format!("layout qualifier '{}' does not take a value", name),
                        line,
                    ));
                }
                Some(self.parse_ternary()?)
            } else {
                if info.takes_value {
                    return Err(self.syntax_error(
                        format!("layout qualifier '{}' requires a value", name),
                        line,
                    ));
                }
                None
            };

            list.push(LayoutQualifier { name, initial_value });

            if !self.match_operator(Operator::Comma)? {
                break;
            }
        }

        self.expect_rparen("to close layout qualifier list")?;
        Ok(list)
    }

    /// Whether the current token names a type
    pub(crate) fn is_type_start(&self) -> bool {
        match &self.peek().kind {
            TokenKind::Keyword(Keyword::Type(_)) => true,
            TokenKind::Identifier(name) => self.scopes.lookup_struct(name).is_some(),
            _ => false,
        }
    }

    /// Parse a built-in type keyword or structure name
    pub(crate) fn parse_type_specifier(&mut self) -> Result<TypeRef, ParseError> {
        if let Some(Keyword::Type(ty)) = self.peek().as_keyword() {
            self.advance()?;
            return Ok(TypeRef::Builtin(ty));
        }

        if let Some(name) = self.peek().as_identifier() {
            if let Some(id) = self.scopes.lookup_struct(name) {
                self.advance()?;
                return Ok(TypeRef::Struct(id));
            }
        }

        Err(self.unexpected("expected type"))
    }

    /// Parse `[size]` suffixes; `[]` yields an unsized dimension
    pub(crate) fn parse_array_sizes(&mut self) -> Result<Vec<Option<Expression>>, ParseError> {
        let mut sizes = Vec::new();

        while self.match_operator(Operator::BracketBegin)? {
            if self.match_operator(Operator::BracketEnd)? {
                sizes.push(None);
                continue;
            }
            let size = self.parse_ternary()?;
            self.expect_operator(Operator::BracketEnd, "after array size")?;
            sizes.push(Some(size));
        }

        Ok(sizes)
    }

    /// Parse declarators after the first name, then the closing `;`
    ///
    /// Every declarator starts as a copy of `template`, whose array sizes
    /// come from the type and follow the declarator's own. A name becomes
    /// visible once its initializer has been parsed.
    pub(crate) fn parse_declarators(
        &mut self,
        template: &Variable,
        first_name: String,
        first_line: usize,
    ) -> Result<Vec<VariableId>, ParseError> {
        let mut ids = Vec::new();
        let mut name = first_name;
        let mut line = first_line;

        loop {
            let mut variable = template.clone();
            variable.name = name;
            variable.line = line;
            variable.array_sizes = self.parse_array_sizes()?;
            variable.array_sizes.extend(template.array_sizes.iter().cloned());

            if self.match_operator(Operator::Assign)? {
                variable.initial_value = Some(self.parse_assignment()?);
            } else if variable.is_const {
                return Err(self.syntax_error(
                    format!("const variable '{}' must be initialized", variable.name),
                    line,
                ));
            }

            ids.push(self.declare_variable(variable)?);

            if !self.match_operator(Operator::Comma)? {
                break;
            }
            line = self.current_line();
            name = self.expect_identifier("after ','")?;
        }

        self.expect_semicolon("after declaration")?;
        Ok(ids)
    }

    /// Add a variable to the unit and make its name visible
    pub(crate) fn declare_variable(&mut self, variable: Variable) -> Result<VariableId, ParseError> {
        let name = variable.name.clone();
        let line = variable.line;
        let id = self.unit.add_variable(variable);

        self.scopes
            .declare(&name, Symbol::Variable(id))
            .map_err(|err| self.scope_error(err.to_string(), line))?;

        Ok(id)
    }

    fn check_global_qualifiers(&self, qualifiers: &Qualifiers) -> Result<(), ParseError> {
        let line = qualifiers.line;
        let stage = self.stage;

        if let Some(storage) = qualifiers.storage {
            if !stage.allows_storage(storage) {
                return Err(self.stage_error(
                    format!("'{}' is not allowed in {} shaders", storage.as_str(), stage),
                    line,
                ));
            }
        }
        if let Some(auxiliary) = qualifiers.auxiliary {
            if !stage.allows_auxiliary(auxiliary) {
                return Err(self.stage_error(
                    format!("'{}' is not allowed in {} shaders", auxiliary.as_str(), stage),
                    line,
                ));
            }
        }
        if let Some(interpolation) = qualifiers.interpolation {
            if !stage.allows_interpolation() {
                return Err(self.stage_error(
                    format!("'{}' is not allowed in {} shaders", interpolation.as_str(), stage),
                    line,
                ));
            }
        }

        Ok(())
    }

    fn parse_global_declarators(
        &mut self,
        qualifiers: Qualifiers,
        ty: TypeRef,
        type_sizes: Vec<Option<Expression>>,
        first_name: String,
        first_line: usize,
    ) -> Result<(), ParseError> {
        self.check_global_qualifiers(&qualifiers)?;

        let mut template = Variable::new(String::new(), ty, VariableKind::Local, first_line);
        template.array_sizes = type_sizes;
        template.is_const = qualifiers.is_const;
        template.is_precise = qualifiers.is_precise;
        template.precision = qualifiers.precision;
        template.kind = VariableKind::Global(qualifiers.into_global());

        let ids = self.parse_declarators(&template, first_name, first_line)?;
        for id in &ids {
            log::trace!(
                "global '{}' on line {}",
                self.unit.variable(*id).name,
                self.unit.variable(*id).line
            );
        }
        self.unit.globals.extend(ids);
        Ok(())
    }

    /// Parse `precision <qualifier> <type>;`
    fn parse_precision_declaration(&mut self) -> Result<(), ParseError> {
        let line = self.current_line();
        self.advance()?; // 'precision'

        let precision = match self.peek().as_keyword().and_then(precision_of) {
            Some(precision) => precision,
            None => return Err(self.unexpected("expected precision qualifier after 'precision'")),
        };
        self.advance()?;

        let base_type = match self.peek().as_keyword() {
            Some(Keyword::Type(ty)) => ty,
            _ => return Err(self.unexpected("expected type in precision declaration")),
        };
        if !base_type.accepts_default_precision() {
            return Err(self.syntax_error(
                format!("default precision cannot be declared for type '{}'", base_type),
                self.current_line(),
            ));
        }
        self.advance()?;
        self.expect_semicolon("after precision declaration")?;

        log::trace!("default precision for '{}' on line {}", base_type, line);
        self.unit.precisions.push(PrecisionDeclaration {
            precision,
            base_type,
            line,
        });
        Ok(())
    }

    /// Parse `layout(...) in;` and friends
    fn parse_default_layout(&mut self, qualifiers: Qualifiers) -> Result<(), ParseError> {
        let storage = match qualifiers.storage {
            Some(storage @ (Storage::In | Storage::Out | Storage::Uniform | Storage::Buffer))
                if !qualifiers.layout.is_empty() =>
            {
                storage
            }
            _ => return Err(self.unexpected("expected type")),
        };
        if let Some(name) = qualifiers.first_disallowed(&[storage.as_str(), "layout"]) {
            return Err(self.syntax_error(
                format!("'{}' is not allowed in a default layout declaration", name),
                qualifiers.line,
            ));
        }
        self.advance()?; // ';'

        log::trace!("default layout for '{}' on line {}", storage.as_str(), qualifiers.line);
        self.unit.default_layouts.push(DefaultLayout {
            storage,
            layout: qualifiers.layout,
            line: qualifiers.line,
        });
        Ok(())
    }

    /// Parse a structure definition and any declarators following it
    fn parse_struct_definition(&mut self, qualifiers: Qualifiers) -> Result<(), ParseError> {
        let line = self.current_line();
        self.advance()?; // 'struct'

        let name = self.expect_identifier("after 'struct'")?;
        let open_line = self.expect_lbrace("to begin structure body")?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::ScopeEnd) && !self.is_at_end() {
            self.parse_struct_fields(&mut fields)?;
        }
        self.expect_rbrace(open_line, "to close structure body")?;

        if fields.is_empty() {
            return Err(self.syntax_error(format!("structure '{}' has no fields", name), line));
        }

        log::trace!("structure '{}' on line {}", name, line);
        let id = self.unit.add_struct(Struct {
            name: name.clone(),
            fields,
            line,
        });
        self.scopes
            .declare(&name, Symbol::Struct(id))
            .map_err(|err| self.scope_error(err.to_string(), line))?;

        if self.match_token(&TokenKind::Semicolon)? {
            if let Some(qualifier) = qualifiers.first_disallowed(&[]) {
                return Err(self.syntax_error(
                    format!("'{}' requires a variable to qualify", qualifier),
                    qualifiers.line,
                ));
            }
            return Ok(());
        }

        let first_line = self.current_line();
        let first_name = self.expect_identifier("or ';' after structure definition")?;
        self.parse_global_declarators(qualifiers, TypeRef::Struct(id), Vec::new(), first_name, first_line)
    }

    /// Parse one field line: `[precision] type name [sizes] {, name [sizes]};`
    fn parse_struct_fields(&mut self, fields: &mut Vec<Variable>) -> Result<(), ParseError> {
        let precision = self.peek().as_keyword().and_then(precision_of);
        if precision.is_some() {
            self.advance()?;
        }

        if self.check_keyword(Keyword::Struct) {
            return Err(self.syntax_error(
                "nested structure definitions are not supported",
                self.current_line(),
            ));
        }

        let ty = self.parse_type_specifier()?;
        let type_sizes = self.parse_array_sizes()?;

        loop {
            let line = self.current_line();
            let name = self.expect_identifier("for structure field")?;
            if fields.iter().any(|field| field.name == name) {
                return Err(self.scope_error(format!("duplicate field '{}'", name), line));
            }

            let mut field = Variable::new(name, ty, VariableKind::Field, line);
            field.precision = precision;
            field.array_sizes = self.parse_array_sizes()?;
            field.array_sizes.extend(type_sizes.iter().cloned());
            fields.push(field);

            if !self.match_operator(Operator::Comma)? {
                break;
            }
        }

        self.expect_semicolon("after structure field")
    }

    /// Parse `storage Name { members } [instance [sizes]];`
    fn parse_interface_block(&mut self, qualifiers: Qualifiers) -> Result<(), ParseError> {
        let line = qualifiers.line;
        let storage = match qualifiers.storage {
            Some(storage @ (Storage::In | Storage::Out | Storage::Uniform | Storage::Buffer)) => storage,
            Some(other) => {
                return Err(self.syntax_error(
                    format!("'{}' interface blocks are not supported", other.as_str()),
                    line,
                ));
            }
            None => unreachable!("interface blocks start with a storage qualifier"),
        };
        self.check_global_qualifiers(&qualifiers)?;
        if let Some(name) = qualifiers.first_disallowed(&[storage.as_str(), "layout"]) {
            return Err(self.syntax_error(
                format!("'{}' is not supported on interface blocks", name),
                line,
            ));
        }

        let name = self.expect_identifier("for interface block")?;
        let open_line = self.expect_lbrace("to begin interface block")?;
        let block = self.unit.add_interface_block(InterfaceBlock {
            name: name.clone(),
            storage,
            layout: qualifiers.layout,
            members: Vec::new(),
            instance: None,
            line,
        });

        let mut members = Vec::new();
        while !self.check(&TokenKind::ScopeEnd) && !self.is_at_end() {
            self.parse_block_members(block, &mut members)?;
        }
        self.expect_rbrace(open_line, "to close interface block")?;

        if members.is_empty() {
            return Err(self.syntax_error(format!("interface block '{}' has no members", name), line));
        }

        let instance = if matches!(self.peek().kind, TokenKind::Identifier(_)) {
            let instance_line = self.current_line();
            let instance_name = self.expect_identifier("for interface block instance")?;
            let qualifiers = GlobalQualifiers {
                storage: Some(storage),
                ..GlobalQualifiers::default()
            };
            let mut variable = Variable::new(
                instance_name,
                TypeRef::Block(block),
                VariableKind::Global(qualifiers),
                instance_line,
            );
            variable.array_sizes = self.parse_array_sizes()?;
            Some(self.declare_variable(variable)?)
        } else {
            // Without an instance name the members are globals in their own right.
            for id in &members {
                let member = self.unit.variable(*id);
                let (member_name, member_line) = (member.name.clone(), member.line);
                self.scopes
                    .declare(&member_name, Symbol::Variable(*id))
                    .map_err(|err| self.scope_error(err.to_string(), member_line))?;
            }
            None
        };
        self.expect_semicolon("after interface block")?;

        log::trace!("interface block '{}' on line {}", name, line);
        let entry = self.unit.interface_block_mut(block);
        entry.members = members;
        entry.instance = instance;
        Ok(())
    }

    fn parse_block_members(
        &mut self,
        block: BlockId,
        members: &mut Vec<VariableId>,
    ) -> Result<(), ParseError> {
        let qualifiers = self.parse_qualifiers()?;
        let allowed = ["layout", "lowp", "mediump", "highp"];
        if let Some(name) = qualifiers.first_disallowed(&allowed) {
            return Err(self.syntax_error(
                format!("'{}' is not supported on interface block members", name),
                qualifiers.line,
            ));
        }

        let ty = self.parse_type_specifier()?;
        let type_sizes = self.parse_array_sizes()?;

        loop {
            let line = self.current_line();
            let name = self.expect_identifier("for interface block member")?;
            if members.iter().any(|id| self.unit.variable(*id).name == name) {
                return Err(self.scope_error(format!("duplicate member '{}'", name), line));
            }

            let kind = VariableKind::BlockMember {
                block,
                layout: qualifiers.layout.clone(),
            };
            let mut member = Variable::new(name, ty, kind, line);
            member.precision = qualifiers.precision;
            member.array_sizes = self.parse_array_sizes()?;
            member.array_sizes.extend(type_sizes.iter().cloned());
            members.push(self.unit.add_variable(member));

            if !self.match_operator(Operator::Comma)? {
                break;
            }
        }

        self.expect_semicolon("after interface block member")
    }

    /// Parse a function prototype or definition, starting at `(`
    fn parse_function(
        &mut self,
        qualifiers: Qualifiers,
        return_type: TypeRef,
        name: String,
        line: usize,
    ) -> Result<(), ParseError> {
        if let Some(qualifier) = qualifiers.first_disallowed(&["lowp", "mediump", "highp"]) {
            return Err(self.syntax_error(
                format!("'{}' is not allowed on a function return type", qualifier),
                qualifiers.line,
            ));
        }

        self.expect_lparen("after function name")?;
        let parameters = self.parse_parameter_list()?;
        let signature = parameters
            .iter()
            .map(|id| {
                let parameter = self.unit.variable(*id);
                ParameterSignature {
                    ty: parameter.base_type,
                    array_dimensions: parameter.array_sizes.len(),
                }
            })
            .collect();

        if self.match_token(&TokenKind::Semicolon)? {
            self.functions
                .declare(&name, signature, false)
                .map_err(|err| self.scope_error(err.to_string(), line))?;

            log::trace!("prototype '{}' on line {}", name, line);
            self.unit.functions.push(Function {
                name,
                return_type,
                parameters,
                is_prototype: true,
                body: Vec::new(),
                line,
            });
            return Ok(());
        }

        if !self.check(&TokenKind::ScopeBegin) {
            return Err(self.unexpected("expected ';' or '{' after function parameters"));
        }
        let open_line = self.expect_lbrace("to begin function body")?;

        self.functions
            .declare(&name, signature, true)
            .map_err(|err| self.scope_error(err.to_string(), line))?;

        // Parameters and the outermost statements of the body share a scope.
        self.scopes.begin_scope();
        for id in &parameters {
            let parameter = self.unit.variable(*id);
            if parameter.name.is_empty() {
                continue;
            }
            let (parameter_name, parameter_line) = (parameter.name.clone(), parameter.line);
            self.scopes
                .declare(&parameter_name, Symbol::Variable(*id))
                .map_err(|err| self.scope_error(err.to_string(), parameter_line))?;
        }
        self.body_line = Some(open_line);
        let body = self.parse_block_statements(open_line, "to close function body")?;
        self.body_line = None;
        self.scopes.end_scope();

        log::trace!("function '{}' on line {}", name, line);
        self.unit.functions.push(Function {
            name,
            return_type,
            parameters,
            is_prototype: false,
            body,
            line,
        });
        Ok(())
    }

    /// Parse parameters up to and including the closing `)`
    fn parse_parameter_list(&mut self) -> Result<Vec<VariableId>, ParseError> {
        let mut parameters = Vec::new();

        if self.match_operator(Operator::ParenthesisEnd)? {
            return Ok(parameters);
        }

        // `f(void)` declares no parameters.
        if self.check_keyword(Keyword::Type(BuiltinType::Void))
            && self.peek_next()?.as_operator() == Some(Operator::ParenthesisEnd)
        {
            self.advance()?;
            self.advance()?;
            return Ok(parameters);
        }

        loop {
            parameters.push(self.parse_parameter()?);
            if !self.match_operator(Operator::Comma)? {
                break;
            }
        }

        self.expect_rparen("after function parameters")?;
        Ok(parameters)
    }

    /// Parse `[const] [in|out|inout] [precision] type [name] [sizes]`
    fn parse_parameter(&mut self) -> Result<VariableId, ParseError> {
        let line = self.current_line();
        let mut is_const = false;
        let mut direction = None;
        let mut precision = None;

        while let Some(keyword) = self.peek().as_keyword() {
            let keyword_line = self.current_line();
            match keyword {
                Keyword::Const => set_flag(&mut is_const, "const", keyword_line)?,
                Keyword::In => set_once(&mut direction, ParameterDirection::In, "parameter", keyword_line)?,
                Keyword::Out => set_once(&mut direction, ParameterDirection::Out, "parameter", keyword_line)?,
                Keyword::Inout => {
                    set_once(&mut direction, ParameterDirection::InOut, "parameter", keyword_line)?
                }
                _ => match precision_of(keyword) {
                    Some(value) => set_once(&mut precision, value, "precision", keyword_line)?,
                    None => break,
                },
            }
            self.advance()?;
        }

        let ty = self.parse_type_specifier()?;
        if ty == TypeRef::Builtin(BuiltinType::Void) {
            return Err(self.syntax_error("parameters cannot have type 'void'", line));
        }
        let type_sizes = self.parse_array_sizes()?;

        let name = if matches!(self.peek().kind, TokenKind::Identifier(_)) {
            self.expect_identifier("for parameter")?
        } else {
            String::new()
        };

        let mut parameter = Variable::new(
            name,
            ty,
            VariableKind::Parameter(direction.unwrap_or_default()),
            line,
        );
        parameter.is_const = is_const;
        parameter.precision = precision;
        parameter.array_sizes = self.parse_array_sizes()?;
        parameter.array_sizes.extend(type_sizes);

        Ok(self.unit.add_variable(parameter))
    }
}
