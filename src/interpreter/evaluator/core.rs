use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    ast::{Expr, FunctionDef, Statement},
    error::RuntimeError,
    interpreter::{
        binding::HostFunction,
        evaluator::ops,
        lexer::Location,
        value::{aggregate::AggregateState, core::Value},
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Maximum script call depth before evaluation is aborted.
pub const RECURSION_LIMIT: usize = 256;

/// The outcome of running one statement.
///
/// `return` and `break` travel upward through nested statement evaluation
/// as explicit values: every frame either propagates the signal or
/// consumes it. Loops consume [`Flow::Break`], call sites consume
/// [`Flow::Return`]; a signal that reaches the top unconsumed is an
/// error.
#[derive(Debug)]
pub enum Flow {
    /// The statement completed; continue with the next one.
    Normal,
    /// A `return` is unwinding toward the nearest call site.
    Return {
        /// The returned value, if any.
        value:    Option<Value>,
        /// Where the `return` was written.
        location: Location,
    },
    /// A `break` is unwinding toward the innermost loop.
    Break {
        /// Where the `break` was written.
        location: Location,
    },
}

/// A callable bound in some scope: either a script function or an
/// adapted host function.
#[derive(Debug, Clone)]
pub enum FunctionRef {
    /// A function declared in the script.
    Script(Rc<FunctionDef>),
    /// A function the host bound before compilation.
    Host(Rc<HostFunction>),
}

/// What a call-site name resolved to.
pub(crate) enum FunctionLookup {
    /// A free function.
    Function(FunctionRef),
    /// A method of the enclosing method call's receiver, called bare
    /// from inside another method of the same aggregate.
    Method(Rc<RefCell<AggregateState>>, Rc<FunctionDef>),
}

/// Why a frame was pushed; call frames are visibility barriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameKind {
    /// A `{ ... }` block or loop scope.
    Block,
    /// A function or method body.
    Call,
}

/// One lexical frame: variables and functions declared at this level,
/// plus the receiver when the frame is a method body.
pub(crate) struct Frame {
    pub(crate) vars:     HashMap<String, Value>,
    pub(crate) funcs:    HashMap<String, FunctionRef>,
    pub(crate) kind:     FrameKind,
    pub(crate) receiver: Option<Rc<RefCell<AggregateState>>>,
}

impl Frame {
    fn new(kind: FrameKind, receiver: Option<Rc<RefCell<AggregateState>>>) -> Self {
        Self { vars: HashMap::new(),
               funcs: HashMap::new(),
               kind,
               receiver }
    }
}

/// Stores the runtime evaluation state.
///
/// The environment is a stack of frames. Variable lookup walks frames
/// innermost-out but cannot cross a call frame except into the globals,
/// so function bodies see their own locals, their receiver's members,
/// and the global scope — never their caller's locals.
pub struct Env {
    pub(crate) frames: Vec<Frame>,
    pub(crate) depth:  usize,
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl Env {
    /// Creates an environment holding only the empty global frame.
    #[must_use]
    pub fn new() -> Self {
        Self { frames: vec![Frame::new(FrameKind::Block, None)],
               depth:  0, }
    }

    pub(crate) fn push_frame(&mut self,
                             kind: FrameKind,
                             receiver: Option<Rc<RefCell<AggregateState>>>) {
        self.frames.push(Frame::new(kind, receiver));
    }

    pub(crate) fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Declares a variable in the innermost frame, shadowing any outer
    /// binding of the same name.
    pub(crate) fn declare(&mut self, name: &str, value: Value) {
        self.frames
            .last_mut()
            .expect("at least the global frame")
            .vars
            .insert(name.to_string(), value);
    }

    /// Registers a function in the innermost frame.
    pub(crate) fn declare_function(&mut self, name: &str, function: FunctionRef) {
        self.frames
            .last_mut()
            .expect("at least the global frame")
            .funcs
            .insert(name.to_string(), function);
    }

    /// Resolves a call-site name: local functions first, then the
    /// receiver's methods, then outer scopes.
    pub(crate) fn lookup_function(&self, name: &str) -> Option<FunctionLookup> {
        for frame in self.frames.iter().rev() {
            if let Some(function) = frame.funcs.get(name) {
                return Some(FunctionLookup::Function(function.clone()));
            }
            if let Some(receiver) = &frame.receiver {
                if let Some(method) = receiver.borrow().method(name) {
                    return Some(FunctionLookup::Method(Rc::clone(receiver), method));
                }
            }
        }
        None
    }

    /// Runs one statement.
    ///
    /// # Errors
    /// Propagates the first [`RuntimeError`] raised while evaluating.
    pub fn run_statement(&mut self, statement: &Statement) -> EvalResult<Flow> {
        match statement {
            Statement::Declaration { ty,
                                     name,
                                     init,
                                     location, } => {
                let value = match init {
                    Some(expr) => {
                        let value = self.eval_expr(expr)?;
                        ops::convert_for_slot(value, ty.name(), *location)?
                    },
                    None => ty.zero(),
                };
                self.declare(name, value);
                Ok(Flow::Normal)
            },

            Statement::Function(def) => {
                self.declare_function(&def.name, FunctionRef::Script(Rc::clone(def)));
                Ok(Flow::Normal)
            },

            // The type itself was registered during parsing.
            Statement::Struct(_) => Ok(Flow::Normal),

            Statement::Block(statements) => {
                self.push_frame(FrameKind::Block, None);
                let flow = self.run_sequence(statements);
                self.pop_frame();
                flow
            },

            Statement::IfElseChain { conditions,
                                     bodies,
                                     .. } => {
                for (condition, body) in conditions.iter().zip(bodies) {
                    if self.eval_bool(condition)? {
                        return self.run_statement(body);
                    }
                }
                match bodies.get(conditions.len()) {
                    Some(fallback) => self.run_statement(fallback),
                    None => Ok(Flow::Normal),
                }
            },

            Statement::For { init,
                             condition,
                             step,
                             body,
                             .. } => {
                self.push_frame(FrameKind::Block, None);
                let flow = self.run_for(init.as_deref(), condition, step.as_ref(), body);
                self.pop_frame();
                flow
            },

            Statement::While { condition, body, .. } => {
                loop {
                    if !self.eval_bool(condition)? {
                        return Ok(Flow::Normal);
                    }
                    match self.run_statement(body)? {
                        Flow::Normal => {},
                        Flow::Break { .. } => return Ok(Flow::Normal),
                        flow @ Flow::Return { .. } => return Ok(flow),
                    }
                }
            },

            Statement::Return { value, location } => {
                let value = match value {
                    Some(expr) => {
                        let value = self.eval_expr(expr)?;
                        // `return f();` in a void function counts as a
                        // bare return.
                        if value.is_void() { None } else { Some(value) }
                    },
                    None => None,
                };
                Ok(Flow::Return { value,
                                  location: *location, })
            },

            Statement::Break { location } => Ok(Flow::Break { location: *location, }),

            Statement::Expression { expr, .. } => {
                self.eval_expr(expr)?;
                Ok(Flow::Normal)
            },
        }
    }

    /// Runs statements in order inside the current frame, stopping at
    /// the first signal.
    pub(crate) fn run_sequence(&mut self, statements: &[Statement]) -> EvalResult<Flow> {
        for statement in statements {
            match self.run_statement(statement)? {
                Flow::Normal => {},
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn run_for(&mut self,
               init: Option<&Statement>,
               condition: &Expr,
               step: Option<&Expr>,
               body: &Statement)
               -> EvalResult<Flow> {
        if let Some(init) = init {
            match self.run_statement(init)? {
                Flow::Normal => {},
                flow => return Ok(flow),
            }
        }

        loop {
            if !self.eval_bool(condition)? {
                return Ok(Flow::Normal);
            }
            match self.run_statement(body)? {
                Flow::Normal => {},
                Flow::Break { .. } => return Ok(Flow::Normal),
                flow @ Flow::Return { .. } => return Ok(flow),
            }
            if let Some(step) = step {
                self.eval_expr(step)?;
            }
        }
    }
}
