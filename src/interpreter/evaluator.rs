/// Call dispatch.
///
/// Implements script function and method invocation: argument binding,
/// call frames, receiver binding, return-type checking and the recursion
/// guard.
pub mod call;

/// Evaluation environment and statement execution.
///
/// Holds the frame stack, variable and function lookup, and the
/// statement-level evaluator including the typed control-flow signals
/// loops and calls catch.
pub mod core;

/// Expression evaluation.
///
/// Implements expression evaluation and the place (lvalue) resolution
/// used by assignment, increment and method dispatch.
pub mod expr;

/// Operator semantics.
///
/// Implements the primitive operator table: C-style numeric promotion
/// and conversion, checked signed arithmetic, string concatenation and
/// comparisons.
pub mod ops;
