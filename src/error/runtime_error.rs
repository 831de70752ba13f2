use crate::interpreter::lexer::Location;

/// Coarse classification of a [`RuntimeError`], mirroring the error
/// taxonomy the host sees: type errors, name lookup failures, range
/// violations from host types, and plain runtime faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Assignment, argument, return or operand type mismatches, unknown
    /// members and methods, and constructor overload failures.
    Type,
    /// Lookup through the full scope chain failed.
    Name,
    /// An index handed to a host-bound type was out of range.
    Range,
    /// Division by zero, arithmetic overflow, misplaced control flow and
    /// other evaluation faults.
    Runtime,
}

#[derive(Debug)]
/// Represents all errors that can occur during evaluation and host calls.
pub enum RuntimeError {
    /// Tried to use a variable that is not in scope.
    UnknownVariable {
        /// The name of the variable.
        name:     String,
        /// The source location of the use.
        location: Location,
    },
    /// Called a function that is not in scope.
    UnknownFunction {
        /// The name of the function.
        name:     String,
        /// The source location of the call.
        location: Location,
    },
    /// Accessed a member the value does not have.
    UnknownMember {
        /// The type of the value being accessed.
        type_name: String,
        /// The member name.
        member:    String,
        /// The source location of the access.
        location:  Location,
    },
    /// Called a method the value does not have.
    UnknownMethod {
        /// The type of the receiver.
        type_name: String,
        /// The method name.
        method:    String,
        /// The source location of the call.
        location:  Location,
    },
    /// A value had an incompatible type for the slot or operation.
    TypeMismatch {
        /// The type that was required.
        expected: String,
        /// The type that was found.
        found:    String,
        /// The source location of the offending expression.
        location: Location,
    },
    /// The wrong number of arguments was supplied to a call.
    ArgumentCountMismatch {
        /// How many arguments the callee declares.
        expected: usize,
        /// How many arguments were supplied.
        found:    usize,
        /// The source location of the call.
        location: Location,
    },
    /// A function returned a value whose type does not match its
    /// declaration, or fell off the end of a non-void body.
    ReturnTypeMismatch {
        /// The declared return type.
        expected: String,
        /// What was actually produced.
        found:    String,
        /// The source location of the call.
        location: Location,
    },
    /// No registered constructor overload matches the argument types.
    NoMatchingConstructor {
        /// The type being constructed.
        type_name: String,
        /// The argument type names, comma separated.
        arguments: String,
        /// The source location of the construction.
        location:  Location,
    },
    /// More than one constructor overload is reachable by numeric
    /// conversion from the argument types.
    AmbiguousConstructor {
        /// The type being constructed.
        type_name: String,
        /// The argument type names, comma separated.
        arguments: String,
        /// The source location of the construction.
        location:  Location,
    },
    /// An operator was applied to a type that does not support it.
    UnsupportedOperator {
        /// The operator, as written.
        op:        String,
        /// The operand type.
        type_name: String,
        /// The source location of the operation.
        location:  Location,
    },
    /// The operand of `++`, `--` or an assignment is not an assignable
    /// place.
    NotAssignable {
        /// The source location of the operand.
        location: Location,
    },
    /// A `void` result was used where a value is required.
    VoidInExpression {
        /// The source location of the use.
        location: Location,
    },
    /// A host-bound assertion evaluated to false.
    AssertionFailed {
        /// The source location of the assertion, when known.
        location: Location,
    },
    /// Attempted integer division by zero.
    DivisionByZero {
        /// The source location of the division.
        location: Location,
    },
    /// Signed integer arithmetic overflowed.
    Overflow {
        /// The source location of the operation.
        location: Location,
    },
    /// A host-bound type rejected an index.
    IndexOutOfRange {
        /// The requested index.
        index:    i64,
        /// The number of valid elements.
        length:   usize,
        /// The source location of the index expression.
        location: Location,
    },
    /// A `break` executed outside any enclosing loop.
    StrayBreak {
        /// The source location of the `break`.
        location: Location,
    },
    /// A `return` executed outside any function body.
    StrayReturn {
        /// The source location of the `return`.
        location: Location,
    },
    /// Script recursion exceeded the evaluator's depth limit.
    RecursionLimit {
        /// The source location of the call that overflowed.
        location: Location,
    },
    /// A host function returned a Rust type that was never registered
    /// with the compiler.
    UnboundHostType {
        /// The Rust type name.
        name:     String,
        /// The source location of the call, when known.
        location: Location,
    },
}

impl RuntimeError {
    /// The coarse [`ErrorKind`] of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownVariable { .. } | Self::UnknownFunction { .. } => ErrorKind::Name,

            Self::UnknownMember { .. }
            | Self::UnknownMethod { .. }
            | Self::TypeMismatch { .. }
            | Self::ArgumentCountMismatch { .. }
            | Self::ReturnTypeMismatch { .. }
            | Self::NoMatchingConstructor { .. }
            | Self::AmbiguousConstructor { .. }
            | Self::UnsupportedOperator { .. }
            | Self::NotAssignable { .. }
            | Self::VoidInExpression { .. }
            | Self::UnboundHostType { .. } => ErrorKind::Type,

            Self::IndexOutOfRange { .. } => ErrorKind::Range,

            Self::AssertionFailed { .. }
            | Self::DivisionByZero { .. }
            | Self::Overflow { .. }
            | Self::StrayBreak { .. }
            | Self::StrayReturn { .. }
            | Self::RecursionLimit { .. } => ErrorKind::Runtime,
        }
    }

    /// The source location the error refers to.
    #[must_use]
    pub const fn location(&self) -> Location {
        *self.location_ref()
    }

    /// Fills in the location if none was recorded yet. Host adapters
    /// raise errors without positions; the evaluator patches in the call
    /// site on the way out.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        let slot = self.location_mut();
        if slot.is_unset() {
            *slot = location;
        }
        self
    }

    /// Renders the error with the standard source snippet.
    #[must_use]
    pub fn show(&self, path: &str, source: &str) -> String {
        format!("{}\n{self}", self.location().show(path, source))
    }

    const fn location_ref(&self) -> &Location {
        match self {
            Self::UnknownVariable { location, .. }
            | Self::UnknownFunction { location, .. }
            | Self::UnknownMember { location, .. }
            | Self::UnknownMethod { location, .. }
            | Self::TypeMismatch { location, .. }
            | Self::ArgumentCountMismatch { location, .. }
            | Self::ReturnTypeMismatch { location, .. }
            | Self::NoMatchingConstructor { location, .. }
            | Self::AmbiguousConstructor { location, .. }
            | Self::UnsupportedOperator { location, .. }
            | Self::NotAssignable { location }
            | Self::VoidInExpression { location }
            | Self::AssertionFailed { location }
            | Self::DivisionByZero { location }
            | Self::Overflow { location }
            | Self::IndexOutOfRange { location, .. }
            | Self::StrayBreak { location }
            | Self::StrayReturn { location }
            | Self::RecursionLimit { location }
            | Self::UnboundHostType { location, .. } => location,
        }
    }

    fn location_mut(&mut self) -> &mut Location {
        match self {
            Self::UnknownVariable { location, .. }
            | Self::UnknownFunction { location, .. }
            | Self::UnknownMember { location, .. }
            | Self::UnknownMethod { location, .. }
            | Self::TypeMismatch { location, .. }
            | Self::ArgumentCountMismatch { location, .. }
            | Self::ReturnTypeMismatch { location, .. }
            | Self::NoMatchingConstructor { location, .. }
            | Self::AmbiguousConstructor { location, .. }
            | Self::UnsupportedOperator { location, .. }
            | Self::NotAssignable { location }
            | Self::VoidInExpression { location }
            | Self::AssertionFailed { location }
            | Self::DivisionByZero { location }
            | Self::Overflow { location }
            | Self::IndexOutOfRange { location, .. }
            | Self::StrayBreak { location }
            | Self::StrayReturn { location }
            | Self::RecursionLimit { location }
            | Self::UnboundHostType { location, .. } => location,
        }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownVariable { name, location } => {
                write!(f, "Error on line {}: Unknown variable \"{name}\".", location.line)
            },
            Self::UnknownFunction { name, location } => {
                write!(f, "Error on line {}: Unknown function \"{name}\".", location.line)
            },
            Self::UnknownMember { type_name,
                                  member,
                                  location, } => {
                write!(f,
                       "Error on line {}: Type \"{type_name}\" has no member \"{member}\".",
                       location.line)
            },
            Self::UnknownMethod { type_name,
                                  method,
                                  location, } => {
                write!(f,
                       "Error on line {}: Type \"{type_name}\" has no method \"{method}\".",
                       location.line)
            },
            Self::TypeMismatch { expected,
                                 found,
                                 location, } => {
                write!(f,
                       "Error on line {}: Expected type \"{expected}\", found \"{found}\".",
                       location.line)
            },
            Self::ArgumentCountMismatch { expected,
                                          found,
                                          location, } => {
                write!(f,
                       "Error on line {}: Expected {expected} argument(s), found {found}.",
                       location.line)
            },
            Self::ReturnTypeMismatch { expected,
                                       found,
                                       location, } => {
                write!(f,
                       "Error on line {}: Function declares return type \"{expected}\" but \
                        produced \"{found}\".",
                       location.line)
            },
            Self::NoMatchingConstructor { type_name,
                                          arguments,
                                          location, } => {
                write!(f,
                       "Error on line {}: No constructor of \"{type_name}\" matches \
                        ({arguments}).",
                       location.line)
            },
            Self::AmbiguousConstructor { type_name,
                                         arguments,
                                         location, } => {
                write!(f,
                       "Error on line {}: Construction of \"{type_name}\" from ({arguments}) is \
                        ambiguous.",
                       location.line)
            },
            Self::UnsupportedOperator { op,
                                        type_name,
                                        location, } => {
                write!(f,
                       "Error on line {}: Type \"{type_name}\" does not support operator \
                        \"{op}\".",
                       location.line)
            },
            Self::NotAssignable { location } => {
                write!(f, "Error on line {}: Expression is not assignable.", location.line)
            },
            Self::VoidInExpression { location } => {
                write!(f,
                       "Error on line {}: A void result cannot be used as a value.",
                       location.line)
            },
            Self::AssertionFailed { location } => {
                write!(f, "Error on line {}: Assertion failed.", location.line)
            },
            Self::DivisionByZero { location } => {
                write!(f, "Error on line {}: Division by zero.", location.line)
            },
            Self::Overflow { location } => {
                write!(f, "Error on line {}: Integer overflow.", location.line)
            },
            Self::IndexOutOfRange { index,
                                    length,
                                    location, } => {
                write!(f,
                       "Error on line {}: Index {index} is out of range for length {length}.",
                       location.line)
            },
            Self::StrayBreak { location } => {
                write!(f, "Error on line {}: \"break\" outside of a loop.", location.line)
            },
            Self::StrayReturn { location } => {
                write!(f, "Error on line {}: \"return\" outside of a function.", location.line)
            },
            Self::RecursionLimit { location } => {
                write!(f, "Error on line {}: Recursion limit exceeded.", location.line)
            },
            Self::UnboundHostType { name, location } => {
                write!(f,
                       "Error on line {}: Host type \"{name}\" was never bound.",
                       location.line)
            },
        }
    }
}

impl std::error::Error for RuntimeError {}
