use crate::{
    ast::{BinaryOperator, Expr},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::core::{ParseResult, Parser},
    },
};

impl Parser<'_> {
    /// Parses a full expression.
    ///
    /// This is the entry point for expression parsing. It begins at the
    /// lowest-precedence level, assignment, and recursively descends
    /// through the precedence ladder. Ties at one level associate left to
    /// right; assignment associates right to left.
    ///
    /// Grammar: `expression := assignment`
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    /// Parses plain and compound assignment.
    ///
    /// Grammar: `assignment := equality (('=' | '+=' | '-=' | '*=' | '/=') assignment)?`
    ///
    /// The left-hand side must be an assignable place: a variable, a
    /// member access or an index expression.
    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let target = self.parse_equality()?;

        let op = match self.peek_token() {
            Some(Token::Assign) => None,
            Some(Token::PlusAssign) => Some(BinaryOperator::Add),
            Some(Token::MinusAssign) => Some(BinaryOperator::Sub),
            Some(Token::StarAssign) => Some(BinaryOperator::Mul),
            Some(Token::SlashAssign) => Some(BinaryOperator::Div),
            _ => return Ok(target),
        };

        let (_, location) = self.advance()?;

        if !matches!(target, Expr::Variable { .. } | Expr::Member { .. } | Expr::Index { .. }) {
            return Err(ParseError::InvalidAssignmentTarget { location: target.location(), });
        }

        let value = self.parse_assignment()?;

        Ok(Expr::Assign { target: Box::new(target),
                          op,
                          value: Box::new(value),
                          location })
    }

    /// Grammar: `equality := relational (('==' | '!=') relational)*`
    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_relational()?;

        loop {
            let op = match self.peek_token() {
                Some(Token::EqualEqual) => BinaryOperator::Equal,
                Some(Token::BangEqual) => BinaryOperator::NotEqual,
                _ => return Ok(left),
            };
            let (_, location) = self.advance()?;
            let right = self.parse_relational()?;
            left = Expr::Binary { left: Box::new(left),
                                  op,
                                  right: Box::new(right),
                                  location };
        }
    }

    /// Grammar: `relational := additive (('<' | '<=' | '>' | '>=') additive)*`
    fn parse_relational(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.peek_token() {
                Some(Token::Less) => BinaryOperator::Less,
                Some(Token::LessEqual) => BinaryOperator::LessEqual,
                Some(Token::Greater) => BinaryOperator::Greater,
                Some(Token::GreaterEqual) => BinaryOperator::GreaterEqual,
                _ => return Ok(left),
            };
            let (_, location) = self.advance()?;
            let right = self.parse_additive()?;
            left = Expr::Binary { left: Box::new(left),
                                  op,
                                  right: Box::new(right),
                                  location };
        }
    }

    /// Grammar: `additive := multiplicative (('+' | '-') multiplicative)*`
    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek_token() {
                Some(Token::Plus) => BinaryOperator::Add,
                Some(Token::Minus) => BinaryOperator::Sub,
                _ => return Ok(left),
            };
            let (_, location) = self.advance()?;
            let right = self.parse_multiplicative()?;
            left = Expr::Binary { left: Box::new(left),
                                  op,
                                  right: Box::new(right),
                                  location };
        }
    }

    /// Grammar: `multiplicative := unary (('*' | '/') unary)*`
    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek_token() {
                Some(Token::Star) => BinaryOperator::Mul,
                Some(Token::Slash) => BinaryOperator::Div,
                _ => return Ok(left),
            };
            let (_, location) = self.advance()?;
            let right = self.parse_unary()?;
            left = Expr::Binary { left: Box::new(left),
                                  op,
                                  right: Box::new(right),
                                  location };
        }
    }
}
