use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{Statement, TypeRef},
    error::ParseError,
    interpreter::{
        lexer::{Location, Token},
        value::{core::PRIMITIVE_KINDS, host::HostType},
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// A recursive-descent parser with one token of lookahead.
///
/// The parser owns a stack of type scopes. The root scope is seeded with
/// the primitive type names and every host-bound type; struct
/// declarations push their names into the scope they appear in. When a
/// statement begins with an identifier, resolving it here is what makes
/// it a declaration — which is why struct types must be declared before
/// use.
pub struct Parser<'a> {
    pub(crate) tokens: &'a [(Token, Location)],
    pub(crate) pos:    usize,
    pub(crate) types:  Vec<HashMap<String, TypeRef>>,
}

impl<'a> Parser<'a> {
    /// Creates a parser over a token buffer, seeding the root type scope
    /// with the primitives and the given host types.
    #[must_use]
    pub fn new(tokens: &'a [(Token, Location)], host_types: &[Rc<HostType>]) -> Self {
        let mut root = HashMap::new();
        for kind in PRIMITIVE_KINDS {
            root.insert(kind.name().to_string(), TypeRef::Primitive(*kind));
        }
        for ty in host_types {
            root.insert(ty.name().to_string(), TypeRef::Host(Rc::clone(ty)));
        }

        Self { tokens,
               pos: 0,
               types: vec![root] }
    }

    /// Parses the whole buffer as a statement sequence.
    ///
    /// # Errors
    /// Fails fast on the first syntax error; there is no recovery.
    pub fn parse_program(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while !self.at_end() {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    /// Opens a nested type scope.
    pub(crate) fn push_types(&mut self) {
        self.types.push(HashMap::new());
    }

    /// Closes the innermost type scope.
    pub(crate) fn pop_types(&mut self) {
        self.types.pop();
    }

    /// Resolves a type name through the scope stack, innermost first.
    pub(crate) fn find_type(&self, name: &str) -> Option<TypeRef> {
        self.types.iter().rev().find_map(|scope| scope.get(name).cloned())
    }

    /// Registers a type in the innermost scope.
    pub(crate) fn declare_type(&mut self, name: &str, ty: TypeRef) {
        self.types
            .last_mut()
            .expect("at least the root type scope")
            .insert(name.to_string(), ty);
    }
}

/// Parses a token buffer into a statement sequence, with the root scope
/// seeded from the given host types.
///
/// # Errors
/// Returns the first [`ParseError`] encountered.
pub fn parse_program(tokens: &[(Token, Location)],
                     host_types: &[Rc<HostType>])
                     -> ParseResult<Vec<Statement>> {
    Parser::new(tokens, host_types).parse_program()
}
