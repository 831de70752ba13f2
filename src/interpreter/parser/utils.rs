use crate::{
    ast::Expr,
    error::ParseError,
    interpreter::{
        lexer::{ExpectedSet, Location, Token, TokenKind},
        parser::core::{ParseResult, Parser},
    },
};

impl Parser<'_> {
    /// Whether the cursor has consumed every token.
    #[must_use]
    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// The next token without consuming it.
    #[must_use]
    pub(crate) fn peek_token(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(token, _)| token.clone())
    }

    /// The location of the next token, or of the last one when the input
    /// is exhausted.
    #[must_use]
    pub(crate) fn peek_location(&self) -> Location {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map_or_else(Location::default, |(_, location)| *location)
    }

    /// Consumes and returns the next token.
    pub(crate) fn advance(&mut self) -> ParseResult<(Token, Location)> {
        let entry = self.tokens
                        .get(self.pos)
                        .cloned()
                        .ok_or(ParseError::UnexpectedEndOfInput { location: self.peek_location(), })?;
        self.pos += 1;
        Ok(entry)
    }

    /// Consumes the next token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.tokens.get(self.pos).is_some_and(|(token, _)| token.kind() == kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Whether the next token has the given kind.
    #[must_use]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.tokens.get(self.pos).is_some_and(|(token, _)| token.kind() == kind)
    }

    /// Consumes the next token, requiring the given kind.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> ParseResult<(Token, Location)> {
        match self.tokens.get(self.pos) {
            Some((token, location)) if token.kind() == kind => {
                let entry = (token.clone(), *location);
                self.pos += 1;
                Ok(entry)
            },
            Some((token, location)) => {
                Err(ParseError::UnexpectedToken { expected: ExpectedSet::of(kind),
                                                  found:    token.to_string(),
                                                  location: *location, })
            },
            None => Err(ParseError::UnexpectedEndOfInput { location: self.peek_location(), }),
        }
    }

    /// Consumes the next token, requiring a plain identifier (keywords do
    /// not qualify).
    pub(crate) fn expect_identifier(&mut self) -> ParseResult<(String, Location)> {
        match self.tokens.get(self.pos) {
            Some((Token::Identifier(name), location)) => {
                let entry = (name.clone(), *location);
                self.pos += 1;
                Ok(entry)
            },
            Some((token, location)) => {
                Err(ParseError::UnexpectedToken { expected: ExpectedSet::of(TokenKind::Identifier),
                                                  found:    token.to_string(),
                                                  location: *location, })
            },
            None => Err(ParseError::UnexpectedEndOfInput { location: self.peek_location(), }),
        }
    }

    /// Builds an unexpected-token error for the current position.
    #[must_use]
    pub(crate) fn unexpected(&self, expected: ExpectedSet) -> ParseError {
        match self.tokens.get(self.pos) {
            Some((token, location)) => ParseError::UnexpectedToken { expected,
                                                                     found: token.to_string(),
                                                                     location: *location },
            None => ParseError::UnexpectedEndOfInput { location: self.peek_location(), },
        }
    }

    /// Parses a parenthesized, comma-separated argument list, consuming
    /// both parentheses.
    pub(crate) fn parse_arguments(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(TokenKind::LeftParen)?;

        let mut arguments = Vec::new();
        if self.eat(TokenKind::RightParen) {
            return Ok(arguments);
        }

        loop {
            arguments.push(self.parse_expression()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen)?;

        Ok(arguments)
    }
}
