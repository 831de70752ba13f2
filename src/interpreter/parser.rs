/// Parser state and entry points.
///
/// Holds the token cursor and the stack of type scopes the parser
/// consults to tell declarations apart from expressions.
pub mod core;

/// Binary expression parsing.
///
/// Implements the precedence ladder for assignment, equality, relational,
/// additive and multiplicative expressions.
pub mod binary;

/// Unary, postfix and primary expression parsing.
///
/// Handles prefix operators, the postfix member/call/index/increment
/// chain, literals, grouping, calls and type construction.
pub mod unary;

/// Statement parsing.
///
/// Implements declarations, struct and function definitions, control
/// flow, blocks and expression statements.
pub mod statement;

/// Cursor and token-matching helpers shared by the parser modules.
pub mod utils;
