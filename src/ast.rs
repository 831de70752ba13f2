use std::rc::Rc;

use indexmap::IndexMap;

use crate::interpreter::{
    lexer::Location,
    value::{core::PrimitiveKind, host::HostType},
};

/// Represents a literal value in the language.
///
/// `LiteralValue` covers all raw, constant values that can appear directly
/// in source code. Integer literals are `int`, `1.5` is a `double` and the
/// `f` suffix marks a `float`; the distinction is made by the lexer and
/// preserved here so typing happens before evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// An integer literal such as `42`.
    Int(i64),
    /// A float literal such as `1.5f`.
    Float(f32),
    /// A double literal such as `1.5`.
    Double(f64),
    /// A string literal with its escapes already resolved.
    Str(String),
    /// A character literal such as `'c'`.
    Char(char),
}

/// Represents a binary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Addition (`+`); also string concatenation.
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Less than (`<`)
    Less,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than (`>`)
    Greater,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Equal to (`==`)
    Equal,
    /// Not equal to (`!=`)
    NotEqual,
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operator = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        };
        write!(f, "{operator}")
    }
}

/// Represents a unary operator.
///
/// The increment and decrement forms require their operand to be an
/// assignable place; the evaluator enforces that.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Arithmetic negation (`-x`).
    Negate,
    /// Logical NOT (`!x`).
    Not,
    /// Prefix increment (`++x`); yields the updated value.
    PreIncrement,
    /// Prefix decrement (`--x`); yields the updated value.
    PreDecrement,
    /// Postfix increment (`x++`); yields the previous value.
    PostIncrement,
    /// Postfix decrement (`x--`); yields the previous value.
    PostDecrement,
}

/// A reference to a declared type, resolved at parse time.
///
/// The parser keeps a stack of scopes mapping type names to `TypeRef`s;
/// when a statement begins with a name that resolves here, it is a
/// declaration. Because resolution happens during parsing, struct types
/// must be declared before use.
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// One of the built-in primitive types.
    Primitive(PrimitiveKind),
    /// A script-declared struct.
    Struct(Rc<StructDef>),
    /// A host-registered type.
    Host(Rc<HostType>),
}

impl TypeRef {
    /// The canonical name of the referenced type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Primitive(kind) => kind.name(),
            Self::Struct(def) => &def.name,
            Self::Host(ty) => ty.name(),
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

/// A single `Type name` parameter of a function or method.
#[derive(Debug, Clone)]
pub struct Param {
    /// The parameter name.
    pub name: String,
    /// The declared parameter type.
    pub ty:   TypeRef,
}

/// Represents a function or method definition.
///
/// The body is a statement list run in a fresh call frame. `return_type`
/// is `None` for `void` functions; otherwise the returned value must be
/// compatible with it.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// The function name.
    pub name:        String,
    /// The declared parameters, in order.
    pub params:      Vec<Param>,
    /// The declared return type, or `None` for `void`.
    pub return_type: Option<TypeRef>,
    /// The statements making up the body.
    pub body:        Vec<Statement>,
    /// Where the function was declared.
    pub location:    Location,
}

/// Represents a struct declaration.
///
/// Members keep their declaration order so instances are constructed
/// deterministically. The method table is shared by every instance; a
/// method resolves bare member names against its receiver at dispatch
/// time, so copying an instance never requires fixing methods up.
#[derive(Debug, Clone)]
pub struct StructDef {
    /// The struct name.
    pub name:     String,
    /// Member names mapped to their declared types, in declaration order.
    pub members:  IndexMap<String, TypeRef>,
    /// Methods by name, shared across instances.
    pub methods:  Rc<IndexMap<String, Rc<FunctionDef>>>,
    /// Where the struct was declared.
    pub location: Location,
}

/// An abstract syntax tree (AST) node representing an expression.
///
/// `Expr` covers all types of expressions, from literals and variables to
/// calls, member access, indexing and assignment. Each variant carries the
/// source location used for error reporting.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A literal value.
    Literal {
        /// The constant value.
        value:    LiteralValue,
        /// Position in the source code.
        location: Location,
    },
    /// Reference to a variable by name.
    Variable {
        /// Name of the variable.
        name:     String,
        /// Position in the source code.
        location: Location,
    },
    /// A unary operation.
    Unary {
        /// The unary operator to apply.
        op:       UnaryOperator,
        /// The operand expression.
        expr:     Box<Self>,
        /// Position in the source code.
        location: Location,
    },
    /// A binary operation.
    Binary {
        /// Left operand.
        left:     Box<Self>,
        /// The operator.
        op:       BinaryOperator,
        /// Right operand.
        right:    Box<Self>,
        /// Position in the source code.
        location: Location,
    },
    /// Plain or compound assignment into a place.
    Assign {
        /// The target place; a variable, member access or index.
        target:   Box<Self>,
        /// `None` for `=`, or the operator of `+=`, `-=`, `*=`, `/=`.
        op:       Option<BinaryOperator>,
        /// The value being assigned.
        value:    Box<Self>,
        /// Position in the source code.
        location: Location,
    },
    /// Free function call, such as `prints("hi")`.
    Call {
        /// Name of the function being called.
        name:      String,
        /// Arguments to the function.
        arguments: Vec<Self>,
        /// Position in the source code.
        location:  Location,
    },
    /// Method call on a receiver, such as `v.push(1)`.
    MethodCall {
        /// The receiver expression.
        receiver:  Box<Self>,
        /// Name of the method.
        method:    String,
        /// Arguments to the method.
        arguments: Vec<Self>,
        /// Position in the source code.
        location:  Location,
    },
    /// Member access, such as `v.x`.
    Member {
        /// The expression owning the member.
        object:   Box<Self>,
        /// Name of the member.
        member:   String,
        /// Position in the source code.
        location: Location,
    },
    /// Index access, such as `v[0]`.
    Index {
        /// The expression being indexed.
        object:   Box<Self>,
        /// The index expression.
        index:    Box<Self>,
        /// Position in the source code.
        location: Location,
    },
    /// Construction by type name: `Type()` yields the zero value,
    /// `Type(args...)` dispatches a registered constructor overload, and a
    /// primitive name with one numeric argument is a cast.
    Construct {
        /// The type being constructed.
        ty:        TypeRef,
        /// Constructor arguments.
        arguments: Vec<Self>,
        /// Position in the source code.
        location:  Location,
    },
}

impl Expr {
    /// Gets the source location from `self`.
    #[must_use]
    pub const fn location(&self) -> Location {
        match self {
            Self::Literal { location, .. }
            | Self::Variable { location, .. }
            | Self::Unary { location, .. }
            | Self::Binary { location, .. }
            | Self::Assign { location, .. }
            | Self::Call { location, .. }
            | Self::MethodCall { location, .. }
            | Self::Member { location, .. }
            | Self::Index { location, .. }
            | Self::Construct { location, .. } => *location,
        }
    }
}

/// Represents a statement.
///
/// Statements are the units a scope executes in order. Control-flow
/// statements own their bodies as nested statements; a body may be a
/// single statement or a [`Statement::Block`].
#[derive(Debug, Clone)]
pub enum Statement {
    /// A variable declaration: `Type name;` or `Type name = expr;`.
    Declaration {
        /// The declared type, resolved at parse time.
        ty:       TypeRef,
        /// The variable name.
        name:     String,
        /// The optional initializer; without one, the type's zero value is
        /// used.
        init:     Option<Expr>,
        /// Position in the source code.
        location: Location,
    },
    /// A function declaration.
    Function(Rc<FunctionDef>),
    /// A struct declaration. The type itself was registered during
    /// parsing; at run time this is inert.
    Struct(Rc<StructDef>),
    /// An `if`/`else if`/`else` chain. `bodies` has either as many
    /// entries as `conditions` or one more (the trailing `else`).
    IfElseChain {
        /// The conditions, evaluated left to right.
        conditions: Vec<Expr>,
        /// The bodies paired with the conditions, plus an optional
        /// trailing `else` body.
        bodies:     Vec<Statement>,
        /// Position in the source code.
        location:   Location,
    },
    /// A `for (init; condition; step) body` loop. The initializer lives
    /// in the loop's own scope.
    For {
        /// The optional loop initializer.
        init:      Option<Box<Statement>>,
        /// The loop condition; must evaluate to `bool`.
        condition: Expr,
        /// The optional step expression, run after each iteration.
        step:      Option<Expr>,
        /// The loop body.
        body:      Box<Statement>,
        /// Position in the source code.
        location:  Location,
    },
    /// A `while (condition) body` loop.
    While {
        /// The loop condition; must evaluate to `bool`.
        condition: Expr,
        /// The loop body.
        body:      Box<Statement>,
        /// Position in the source code.
        location:  Location,
    },
    /// A `return;` or `return expr;` statement.
    Return {
        /// The returned value, if any.
        value:    Option<Expr>,
        /// Position in the source code.
        location: Location,
    },
    /// A `break;` statement.
    Break {
        /// Position in the source code.
        location: Location,
    },
    /// A `{ ... }` block with its own scope.
    Block(Vec<Statement>),
    /// A standalone expression evaluated for its effect.
    Expression {
        /// The expression to evaluate.
        expr:     Expr,
        /// Position in the source code.
        location: Location,
    },
}
