use crate::interpreter::lexer::{ExpectedSet, Location};

#[derive(Debug)]
/// Represents all errors that can occur during lexing or parsing.
pub enum ParseError {
    /// Encountered a character or malformed literal the lexer does not
    /// recognize.
    InvalidToken {
        /// The source location of the offending character.
        location: Location,
    },
    /// Found an unexpected token while parsing.
    UnexpectedToken {
        /// The set of token kinds that would have been accepted.
        expected: ExpectedSet,
        /// A description of the token that was found instead.
        found:    String,
        /// The source location of the found token.
        location: Location,
    },
    /// Reached the end of input while more tokens were required.
    UnexpectedEndOfInput {
        /// The location of the last consumed token.
        location: Location,
    },
    /// The left-hand side of an assignment is not a variable, member
    /// access or index expression.
    InvalidAssignmentTarget {
        /// The source location of the target.
        location: Location,
    },
    /// A name was used where a declared type is required.
    UnknownType {
        /// The name that did not resolve to a type.
        name:     String,
        /// The source location of the name.
        location: Location,
    },
    /// An `else` without a preceding `if`.
    StrayElse {
        /// The source location of the `else`.
        location: Location,
    },
    /// A struct declares the same member or method name twice.
    DuplicateMember {
        /// The repeated name.
        name:     String,
        /// The source location of the second declaration.
        location: Location,
    },
    /// A struct declaration reuses an existing type name.
    DuplicateType {
        /// The type name.
        name:     String,
        /// The source location of the declaration.
        location: Location,
    },
}

impl ParseError {
    /// The source location the error refers to.
    #[must_use]
    pub const fn location(&self) -> Location {
        match self {
            Self::InvalidToken { location }
            | Self::UnexpectedToken { location, .. }
            | Self::UnexpectedEndOfInput { location }
            | Self::InvalidAssignmentTarget { location }
            | Self::UnknownType { location, .. }
            | Self::StrayElse { location }
            | Self::DuplicateMember { location, .. }
            | Self::DuplicateType { location, .. } => *location,
        }
    }

    /// Renders the error with the standard source snippet:
    ///
    /// ```text
    /// <path>:<line>:<col>:
    /// <source line>
    ///     ~~~~
    /// <message>
    /// ```
    #[must_use]
    pub fn show(&self, path: &str, source: &str) -> String {
        format!("{}\n{self}", self.location().show(path, source))
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidToken { location } => {
                write!(f, "Error on line {}: Unrecognized token.", location.line)
            },

            Self::UnexpectedToken { expected,
                                    found,
                                    location, } => {
                write!(f,
                       "Error on line {}: Expected {expected}, found {found}.",
                       location.line)
            },

            Self::UnexpectedEndOfInput { location } => {
                write!(f, "Error on line {}: Unexpected end of input.", location.line)
            },

            Self::InvalidAssignmentTarget { location } => {
                write!(f,
                       "Error on line {}: Only variables, members and indexed elements can be \
                        assigned to.",
                       location.line)
            },

            Self::UnknownType { name, location } => {
                write!(f, "Error on line {}: Unknown type \"{name}\".", location.line)
            },

            Self::StrayElse { location } => {
                write!(f, "Error on line {}: 'else' without a preceding 'if'.", location.line)
            },

            Self::DuplicateMember { name, location } => {
                write!(f,
                       "Error on line {}: Member \"{name}\" is declared twice.",
                       location.line)
            },

            Self::DuplicateType { name, location } => {
                write!(f,
                       "Error on line {}: Type \"{name}\" is already declared.",
                       location.line)
            },
        }
    }
}

impl std::error::Error for ParseError {}
