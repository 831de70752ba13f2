use std::{cell::RefCell, rc::Rc};

use crate::{
    ast::Statement,
    error::{ParseError, RuntimeError},
    interpreter::{
        binding::{FromValue, HostFn, HostFunction, HostRegistry, IntoValue, TypeBinder},
        evaluator::core::{Env, Flow, FunctionRef},
        lexer::{tokenize, Location},
        parser::core::parse_program,
    },
};

pub use crate::interpreter::value::core::Value;

/// Compiles sources into runnable [`Program`]s.
///
/// Host functions and types must be bound *before* [`Compiler::compile`]:
/// the parser needs the type names to recognize declarations, and the
/// bound functions are seeded into every compiled program's root scope.
/// One compiler can compile any number of independent programs.
///
/// # Example
/// ```
/// use lilt::Compiler;
///
/// let mut compiler = Compiler::new();
/// compiler.bind("double_it", |n: i64| n * 2);
///
/// let mut program = compiler.compile("int x = double_it(21);").unwrap();
/// program.run().unwrap();
///
/// assert_eq!(program.var::<i64>("x").unwrap(), 42);
/// ```
#[derive(Default)]
pub struct Compiler {
    registry:  Rc<RefCell<HostRegistry>>,
    functions: Vec<Rc<HostFunction>>,
}

impl Compiler {
    /// Creates a compiler with no host bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a host function under a name callable from scripts.
    ///
    /// Any `Fn` of up to four [`FromValue`] parameters qualifies; it may
    /// return nothing, a convertible value, or a
    /// `Result<_, RuntimeError>`.
    ///
    /// # Example
    /// ```
    /// use lilt::Compiler;
    ///
    /// let mut compiler = Compiler::new();
    /// compiler.bind("prints", |s: String| println!("{s}"));
    /// compiler.bind("add", |a: i64, b: i64| a + b);
    /// ```
    pub fn bind<Args, Ret>(&mut self, name: &str, function: impl HostFn<Args, Ret>) -> &mut Self {
        let registry = Rc::clone(&self.registry);
        let invoke =
            Box::new(move |args: &[Value]| function.call(args, &registry.borrow()));
        self.functions.push(Rc::new(HostFunction::new(name, invoke)));
        self
    }

    /// Registers a host type under a language name and returns the
    /// builder for its constructors, fields, methods and indexer. The
    /// registration commits when the builder is dropped, at the end of
    /// the binding statement.
    ///
    /// # Example
    /// ```
    /// use lilt::Compiler;
    ///
    /// #[derive(Clone, Default)]
    /// struct Point {
    ///     x: f32,
    ///     y: f32,
    /// }
    ///
    /// let mut compiler = Compiler::new();
    /// compiler.bind_type::<Point>("Point")
    ///         .ctor(|x: f32, y: f32| Point { x, y })
    ///         .field("x", |p: &mut Point| &mut p.x)
    ///         .field("y", |p: &mut Point| &mut p.y);
    ///
    /// let mut program = compiler.compile("Point p = Point(1f, 2f);").unwrap();
    /// program.run().unwrap();
    /// ```
    pub fn bind_type<T: Default + Clone + 'static>(&mut self, name: &str) -> TypeBinder<T> {
        TypeBinder::new(Rc::clone(&self.registry), name)
    }

    /// Compiles a source string into a [`Program`].
    ///
    /// Compilation is pure: it tokenizes and parses, but runs nothing.
    ///
    /// # Errors
    /// Returns the first [`ParseError`], including a location that can
    /// render a source snippet.
    pub fn compile(&self, source: &str) -> Result<Program, ParseError> {
        let tokens = tokenize(source)?;
        let host_types: Vec<_> = self.registry.borrow().iter().cloned().collect();
        let statements = parse_program(&tokens, &host_types)?;

        let mut env = Env::new();
        for function in &self.functions {
            env.declare_function(&function.name, FunctionRef::Host(Rc::clone(function)));
        }

        Ok(Program { source: source.to_string(),
                     statements,
                     env,
                     registry: Rc::clone(&self.registry) })
    }
}

/// A compiled program: the top-level statements plus the environment
/// they execute in.
///
/// After [`Program::run`], the host reads variables back with
/// [`Program::get`] / [`Program::var`], writes them with
/// [`Program::set`], and invokes script functions and methods with
/// [`Program::call`] / [`Program::call_method`]. A program is
/// single-threaded and independent of any other program compiled from
/// the same source.
pub struct Program {
    source:     String,
    statements: Vec<Statement>,
    env:        Env,
    registry:   Rc<RefCell<HostRegistry>>,
}

impl std::fmt::Debug for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Program")
         .field("statements", &self.statements.len())
         .finish_non_exhaustive()
    }
}

impl Program {
    /// The source this program was compiled from, for error rendering.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Executes the top-level statements in order.
    ///
    /// # Errors
    /// Returns the first [`RuntimeError`]; a `return` or `break` escaping
    /// the top level is also an error.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        match self.env.run_sequence(&self.statements)? {
            Flow::Normal => Ok(()),
            Flow::Return { location, .. } => Err(RuntimeError::StrayReturn { location }),
            Flow::Break { location } => Err(RuntimeError::StrayBreak { location }),
        }
    }

    /// Reads a variable as a copy.
    ///
    /// # Errors
    /// Fails when the name is not bound.
    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        let place = self.env
                        .lookup_place(name)
                        .ok_or_else(|| RuntimeError::UnknownVariable { name:     name.to_string(),
                                                                       location:
                                                                           Location::default(), })?;
        Ok(self.env.read_place(&place, Location::default())?.deep_copy())
    }

    /// Reads a variable and extracts it as a host type.
    ///
    /// # Errors
    /// Fails when the name is not bound or the value does not convert.
    pub fn var<T: FromValue>(&self, name: &str) -> Result<T, RuntimeError> {
        T::from_value(&self.get(name)?)
    }

    /// Writes a variable, converting the value to the slot's type.
    ///
    /// # Errors
    /// Fails when the name is not bound or the types are incompatible.
    pub fn set(&mut self, name: &str, value: impl IntoValue) -> Result<(), RuntimeError> {
        let value = value.into_value(&self.registry.borrow())?;
        let place = self.env
                        .lookup_place(name)
                        .ok_or_else(|| RuntimeError::UnknownVariable { name:     name.to_string(),
                                                                       location:
                                                                           Location::default(), })?;
        self.env.write_place(&place, value, Location::default())
    }

    /// Calls a script function by name.
    ///
    /// # Errors
    /// Fails when the function is unknown or its body raises an error.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let lookup = self.env
                         .lookup_function(name)
                         .ok_or_else(|| RuntimeError::UnknownFunction { name:     name.to_string(),
                                                                        location:
                                                                            Location::default(), })?;
        let args: Vec<Value> = args.iter().map(Value::deep_copy).collect();
        self.env.dispatch_call(lookup, args, Location::default())
    }

    /// Calls a method on a script variable; mutations are visible in the
    /// variable afterwards.
    ///
    /// # Errors
    /// Fails when the variable or method is unknown, or the body raises
    /// an error.
    pub fn call_method(&mut self,
                       variable: &str,
                       method: &str,
                       args: &[Value])
                       -> Result<Value, RuntimeError> {
        let place = self.env
                        .lookup_place(variable)
                        .ok_or_else(|| RuntimeError::UnknownVariable { name:
                                                                           variable.to_string(),
                                                                       location:
                                                                           Location::default(), })?;
        let receiver = self.env.read_place(&place, Location::default())?;
        let args: Vec<Value> = args.iter().map(Value::deep_copy).collect();
        self.env.dispatch_method(&receiver, method, args, Location::default())
    }
}
