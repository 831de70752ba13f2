use crate::{
    ast::{Expr, LiteralValue, UnaryOperator},
    interpreter::{
        lexer::{Token, TokenKind},
        parser::core::{ParseResult, Parser},
    },
};

impl Parser<'_> {
    /// Parses prefix operators.
    ///
    /// Grammar: `unary := ('!' | '-' | '++' | '--') unary | postfix`
    pub(crate) fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek_token() {
            Some(Token::Bang) => UnaryOperator::Not,
            Some(Token::Minus) => UnaryOperator::Negate,
            Some(Token::Increment) => UnaryOperator::PreIncrement,
            Some(Token::Decrement) => UnaryOperator::PreDecrement,
            _ => return self.parse_postfix(),
        };

        let (_, location) = self.advance()?;
        let expr = self.parse_unary()?;

        Ok(Expr::Unary { op,
                         expr: Box::new(expr),
                         location })
    }

    /// Parses the postfix chain: member access, method calls, indexing
    /// and postfix increment/decrement, tightest-binding first.
    ///
    /// Grammar: `postfix := primary ('.' ident args? | '[' expression ']' | '++' | '--')*`
    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_token() {
                Some(Token::Dot) => {
                    self.advance()?;
                    let (name, location) = self.expect_identifier()?;
                    if self.check(TokenKind::LeftParen) {
                        let arguments = self.parse_arguments()?;
                        expr = Expr::MethodCall { receiver: Box::new(expr),
                                                  method: name,
                                                  arguments,
                                                  location };
                    } else {
                        expr = Expr::Member { object: Box::new(expr),
                                              member: name,
                                              location };
                    }
                },
                Some(Token::LeftBracket) => {
                    let (_, location) = self.advance()?;
                    let index = self.parse_expression()?;
                    self.expect(TokenKind::RightBracket)?;
                    expr = Expr::Index { object: Box::new(expr),
                                         index: Box::new(index),
                                         location };
                },
                Some(Token::Increment) => {
                    let (_, location) = self.advance()?;
                    expr = Expr::Unary { op: UnaryOperator::PostIncrement,
                                         expr: Box::new(expr),
                                         location };
                },
                Some(Token::Decrement) => {
                    let (_, location) = self.advance()?;
                    expr = Expr::Unary { op: UnaryOperator::PostDecrement,
                                         expr: Box::new(expr),
                                         location };
                },
                _ => return Ok(expr),
            }
        }
    }

    /// Parses a primary expression: a literal, a parenthesized
    /// expression, a construction, a call or a variable.
    ///
    /// An identifier that resolves as a type must be followed by an
    /// argument list; `Type()` is the type's zero value and `Type(args)`
    /// dispatches a constructor overload.
    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.peek_token() {
            Some(Token::Int(value)) => {
                let (_, location) = self.advance()?;
                Ok(Expr::Literal { value: LiteralValue::Int(value),
                                   location })
            },
            Some(Token::Float(value)) => {
                let (_, location) = self.advance()?;
                Ok(Expr::Literal { value: LiteralValue::Float(value),
                                   location })
            },
            Some(Token::Double(value)) => {
                let (_, location) = self.advance()?;
                Ok(Expr::Literal { value: LiteralValue::Double(value),
                                   location })
            },
            Some(Token::Str(value)) => {
                let (_, location) = self.advance()?;
                Ok(Expr::Literal { value: LiteralValue::Str(value),
                                   location })
            },
            Some(Token::CharLit(value)) => {
                let (_, location) = self.advance()?;
                Ok(Expr::Literal { value: LiteralValue::Char(value),
                                   location })
            },
            Some(Token::LeftParen) => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RightParen)?;
                Ok(expr)
            },
            Some(Token::Identifier(name)) => {
                if let Some(ty) = self.find_type(&name) {
                    let (_, location) = self.advance()?;
                    let arguments = self.parse_arguments()?;
                    return Ok(Expr::Construct { ty,
                                                arguments,
                                                location });
                }

                let (_, location) = self.advance()?;
                if self.check(TokenKind::LeftParen) {
                    let arguments = self.parse_arguments()?;
                    Ok(Expr::Call { name,
                                    arguments,
                                    location })
                } else {
                    Ok(Expr::Variable { name, location })
                }
            },
            _ => Err(self.unexpected(TokenKind::Number
                                     | TokenKind::Str
                                     | TokenKind::Char
                                     | TokenKind::Identifier
                                     | TokenKind::LeftParen)),
        }
    }
}
