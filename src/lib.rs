//! # lilt
//!
//! lilt is an embeddable, statically typed scripting language with a
//! C-like surface, written in Rust. A host program binds functions and
//! types, compiles source text into a [`Program`], runs it, and calls
//! back and forth across the boundary: scripts call host functions and
//! construct host types; the host reads script variables and invokes
//! script functions and struct methods.
//!
//! ```
//! use lilt::Compiler;
//!
//! let mut compiler = Compiler::new();
//! compiler.bind("emit", |n: i64| println!("{n}"));
//!
//! let source = "
//!     int total = 0;
//!     for (int i = 0; i < 10; ++i) {
//!         if (i == 5)
//!             break;
//!         total = total + i;
//!     }
//!     emit(total);
//! ";
//!
//! let mut program = compiler.compile(source).unwrap();
//! program.run().unwrap();
//!
//! assert_eq!(program.var::<i64>("total").unwrap(), 10);
//! ```

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
)]
#![allow(clippy::missing_errors_doc)]

/// Defines the structure of parsed code.
///
/// This module declares the `Statement` and `Expr` types that represent
/// the syntactic structure of source code as a tree, plus the function,
/// struct and type-reference records the parser resolves while reading
/// declarations.
///
/// # Responsibilities
/// - Defines statement and expression types for all language constructs.
/// - Attaches source locations to AST nodes for error reporting.
/// - Carries parse-time-resolved type references into evaluation.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised while lexing,
/// parsing, evaluating or crossing the host boundary. Every error
/// carries a source location and can render the standard
/// line/underline snippet.
///
/// # Responsibilities
/// - Defines error enums for all failure modes.
/// - Classifies runtime errors into type/name/range/runtime kinds.
/// - Renders diagnostics with source context.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, the value
/// model and the host binding layer to provide a complete runtime for
/// embedded scripts.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, values,
///   bindings.
/// - Provides the compilation and execution pipeline.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// The embedding surface: the compiler and compiled programs.
///
/// This module exposes the two types a host touches first: a
/// [`Compiler`] that collects bindings and compiles sources, and the
/// [`Program`]s it produces.
///
/// # Responsibilities
/// - Collects host function and type bindings before compilation.
/// - Compiles source text into runnable programs.
/// - Exposes script variables, functions and methods to the host.
pub mod program;

pub use crate::{
    error::{ErrorKind, ParseError, RuntimeError},
    interpreter::{
        binding::{FromValue, IntoValue, TypeBinder},
        lexer::Location,
        value::core::{Primitive, Value},
    },
    program::{Compiler, Program},
};
