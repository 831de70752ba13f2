use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    ast::{FunctionDef, Param, Statement, StructDef, TypeRef},
    error::ParseError,
    interpreter::{
        lexer::{Location, Token, TokenKind},
        parser::core::{ParseResult, Parser},
    },
};

impl Parser<'_> {
    /// Parses a single statement.
    ///
    /// A statement may be a block, control flow, a struct declaration, a
    /// variable or function declaration, or an expression statement. The
    /// leading token decides: keywords and `{` dispatch directly, and an
    /// identifier that resolves as a type opens a declaration. Everything
    /// else is an expression followed by `;`.
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.peek_token() {
            Some(Token::LeftBrace) => self.parse_block(),
            Some(Token::If) => self.parse_if(),
            Some(Token::For) => self.parse_for(),
            Some(Token::While) => self.parse_while(),
            Some(Token::Return) => self.parse_return(),
            Some(Token::Break) => {
                let (_, location) = self.advance()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Break { location })
            },
            Some(Token::Struct) => self.parse_struct(),
            Some(Token::Else) => Err(ParseError::StrayElse { location: self.peek_location(), }),
            Some(Token::Semicolon) => {
                // Stray semicolons are harmless.
                self.advance()?;
                Ok(Statement::Block(Vec::new()))
            },
            Some(Token::Identifier(name)) if self.find_type(&name).is_some() => {
                self.parse_declaration()
            },
            Some(_) => {
                let expr = self.parse_expression()?;
                let location = expr.location();
                self.expect(TokenKind::Semicolon)?;
                Ok(Statement::Expression { expr, location })
            },
            None => Err(ParseError::UnexpectedEndOfInput { location: self.peek_location(), }),
        }
    }

    /// Parses a `{ ... }` block with its own type scope.
    fn parse_block(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::LeftBrace)?;
        self.push_types();

        let statements = self.parse_until_brace();

        self.pop_types();
        self.expect(TokenKind::RightBrace)?;
        statements.map(Statement::Block)
    }

    /// Parses statements up to (but not including) the closing `}`.
    fn parse_until_brace(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) {
            if self.at_end() {
                return Err(ParseError::UnexpectedEndOfInput { location: self.peek_location(), });
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    /// Parses a declaration opened by a type name: either a variable
    /// (`Type name [= expr];`) or, when `(` follows the name, a function.
    fn parse_declaration(&mut self) -> ParseResult<Statement> {
        let (type_name, type_location) = self.expect_identifier()?;
        let ty = self.find_type(&type_name)
                     .ok_or(ParseError::UnknownType { name:     type_name.clone(),
                                                      location: type_location, })?;

        let (name, location) = self.expect_identifier()?;

        if self.check(TokenKind::LeftParen) {
            let def = self.parse_function_tail(ty, name, location)?;
            Ok(Statement::Function(Rc::new(def)))
        } else {
            self.parse_variable_tail(ty, name, location)
        }
    }

    /// Parses the `[= expr];` tail of a variable declaration.
    fn parse_variable_tail(&mut self,
                           ty: TypeRef,
                           name: String,
                           location: Location)
                           -> ParseResult<Statement> {
        let init = if self.eat(TokenKind::Assign) { Some(self.parse_expression()?) } else { None };
        self.expect(TokenKind::Semicolon)?;

        Ok(Statement::Declaration { ty,
                                    name,
                                    init,
                                    location })
    }

    /// Parses a function's parameter list and body; the return type and
    /// name were already consumed. A `void` return type becomes `None`.
    fn parse_function_tail(&mut self,
                           return_type: TypeRef,
                           name: String,
                           location: Location)
                           -> ParseResult<FunctionDef> {
        let return_type = match &return_type {
            TypeRef::Primitive(kind) if kind.name() == "void" => None,
            other => Some(other.clone()),
        };

        self.expect(TokenKind::LeftParen)?;
        let mut params = Vec::new();
        if !self.eat(TokenKind::RightParen) {
            loop {
                let (type_name, type_location) = self.expect_identifier()?;
                let ty = self.find_type(&type_name)
                             .ok_or(ParseError::UnknownType { name:     type_name.clone(),
                                                              location: type_location, })?;
                let (param_name, _) = self.expect_identifier()?;
                params.push(Param { name: param_name,
                                    ty });

                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RightParen)?;
        }

        self.expect(TokenKind::LeftBrace)?;
        self.push_types();
        let body = self.parse_until_brace();
        self.pop_types();
        self.expect(TokenKind::RightBrace)?;

        Ok(FunctionDef { name,
                         params,
                         return_type,
                         body: body?,
                         location })
    }

    /// Parses a struct declaration.
    ///
    /// The body is a sequence of member declarations (`Type name;`) and
    /// method definitions (`RetType name(params) { ... }`). The struct is
    /// registered in the enclosing type scope only after its body, so
    /// members cannot recursively mention the struct itself. The closing
    /// brace requires a trailing semicolon.
    fn parse_struct(&mut self) -> ParseResult<Statement> {
        self.expect_token(&Token::Struct)?;
        let (name, location) = self.expect_identifier()?;

        if self.find_type(&name).is_some() {
            return Err(ParseError::DuplicateType { name, location });
        }

        self.expect(TokenKind::LeftBrace)?;
        self.push_types();

        let mut members: IndexMap<String, TypeRef> = IndexMap::new();
        let mut methods: IndexMap<String, Rc<FunctionDef>> = IndexMap::new();

        while !self.check(TokenKind::RightBrace) {
            if self.at_end() {
                self.pop_types();
                return Err(ParseError::UnexpectedEndOfInput { location: self.peek_location(), });
            }

            let result = self.parse_struct_entry(&mut members, &mut methods);
            if let Err(error) = result {
                self.pop_types();
                return Err(error);
            }
        }

        self.pop_types();
        self.expect(TokenKind::RightBrace)?;
        self.expect(TokenKind::Semicolon)?;

        let def = Rc::new(StructDef { name:     name.clone(),
                                      members,
                                      methods:  Rc::new(methods),
                                      location, });
        self.declare_type(&name, TypeRef::Struct(Rc::clone(&def)));

        Ok(Statement::Struct(def))
    }

    /// Parses one member or method inside a struct body.
    fn parse_struct_entry(&mut self,
                          members: &mut IndexMap<String, TypeRef>,
                          methods: &mut IndexMap<String, Rc<FunctionDef>>)
                          -> ParseResult<()> {
        let (type_name, type_location) = self.expect_identifier()?;
        let ty = self.find_type(&type_name)
                     .ok_or(ParseError::UnknownType { name:     type_name.clone(),
                                                      location: type_location, })?;
        let (entry_name, entry_location) = self.expect_identifier()?;

        if members.contains_key(&entry_name) || methods.contains_key(&entry_name) {
            return Err(ParseError::DuplicateMember { name:     entry_name,
                                                     location: entry_location, });
        }

        if self.check(TokenKind::LeftParen) {
            let def = self.parse_function_tail(ty, entry_name.clone(), entry_location)?;
            methods.insert(entry_name, Rc::new(def));
        } else {
            self.expect(TokenKind::Semicolon)?;
            members.insert(entry_name, ty);
        }

        Ok(())
    }

    /// Parses an `if`/`else if`/`else` chain into parallel condition and
    /// body lists; a trailing `else` contributes the extra body.
    fn parse_if(&mut self) -> ParseResult<Statement> {
        let (_, location) = self.advance()?;

        let mut conditions = Vec::new();
        let mut bodies = Vec::new();

        loop {
            self.expect(TokenKind::LeftParen)?;
            conditions.push(self.parse_expression()?);
            self.expect(TokenKind::RightParen)?;
            bodies.push(self.parse_statement()?);

            if self.peek_token() != Some(Token::Else) {
                break;
            }
            self.advance()?;

            if self.peek_token() == Some(Token::If) {
                self.advance()?;
                continue;
            }

            bodies.push(self.parse_statement()?);
            break;
        }

        Ok(Statement::IfElseChain { conditions,
                                    bodies,
                                    location })
    }

    /// Parses a `for (init; condition; step) body` loop. The initializer
    /// may be a variable declaration or an expression and lives in the
    /// loop's own scope; both the initializer and the step are optional.
    fn parse_for(&mut self) -> ParseResult<Statement> {
        let (_, location) = self.advance()?;
        self.expect(TokenKind::LeftParen)?;
        self.push_types();

        let result = self.parse_for_tail(location);

        self.pop_types();
        result
    }

    fn parse_for_tail(&mut self, location: Location) -> ParseResult<Statement> {
        let init = match self.peek_token() {
            Some(Token::Semicolon) => {
                self.advance()?;
                None
            },
            Some(Token::Identifier(name)) if self.find_type(&name).is_some() => {
                let (type_name, type_location) = self.expect_identifier()?;
                let ty = self.find_type(&type_name)
                             .ok_or(ParseError::UnknownType { name:     type_name,
                                                              location: type_location, })?;
                let (var_name, var_location) = self.expect_identifier()?;
                Some(Box::new(self.parse_variable_tail(ty, var_name, var_location)?))
            },
            _ => {
                let expr = self.parse_expression()?;
                let expr_location = expr.location();
                self.expect(TokenKind::Semicolon)?;
                Some(Box::new(Statement::Expression { expr,
                                                      location: expr_location, }))
            },
        };

        let condition = self.parse_expression()?;
        self.expect(TokenKind::Semicolon)?;

        let step = if self.check(TokenKind::RightParen) { None } else { Some(self.parse_expression()?) };
        self.expect(TokenKind::RightParen)?;

        let body = Box::new(self.parse_statement()?);

        Ok(Statement::For { init,
                            condition,
                            step,
                            body,
                            location })
    }

    /// Parses a `while (condition) body` loop.
    fn parse_while(&mut self) -> ParseResult<Statement> {
        let (_, location) = self.advance()?;
        self.expect(TokenKind::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RightParen)?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::While { condition,
                              body,
                              location })
    }

    /// Parses `return;` or `return expr;`.
    fn parse_return(&mut self) -> ParseResult<Statement> {
        let (_, location) = self.advance()?;

        let value = if self.check(TokenKind::Semicolon) { None } else { Some(self.parse_expression()?) };
        self.expect(TokenKind::Semicolon)?;

        Ok(Statement::Return { value, location })
    }

    /// Consumes the next token, requiring it to equal `expected`.
    fn expect_token(&mut self, expected: &Token) -> ParseResult<Location> {
        match self.peek_token() {
            Some(token) if &token == expected => Ok(self.advance()?.1),
            _ => Err(self.unexpected(expected.kind().into())),
        }
    }
}
