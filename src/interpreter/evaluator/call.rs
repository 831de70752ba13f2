use std::{cell::RefCell, rc::Rc};

use crate::{
    ast::{FunctionDef, TypeRef},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Env, EvalResult, Flow, FrameKind, FunctionLookup, FunctionRef,
                   RECURSION_LIMIT},
            ops,
        },
        lexer::Location,
        value::{
            aggregate::AggregateState,
            core::{PrimitiveKind, Value},
        },
    },
};

impl Env {
    /// Invokes whatever a call-site name resolved to.
    pub(crate) fn dispatch_call(&mut self,
                                lookup: FunctionLookup,
                                args: Vec<Value>,
                                location: Location)
                                -> EvalResult<Value> {
        match lookup {
            FunctionLookup::Function(FunctionRef::Script(def)) => {
                self.call_script(&def, None, args, location)
            },
            FunctionLookup::Function(FunctionRef::Host(function)) => {
                function.invoke(&args).map_err(|error| error.with_location(location))
            },
            FunctionLookup::Method(receiver, def) => {
                self.call_script(&def, Some(receiver), args, location)
            },
        }
    }

    /// Invokes a method on an already-resolved receiver.
    pub(crate) fn dispatch_method(&mut self,
                                  receiver: &Value,
                                  method: &str,
                                  args: Vec<Value>,
                                  location: Location)
                                  -> EvalResult<Value> {
        match receiver {
            Value::Aggregate(state) => {
                let def = state.borrow().method(method).ok_or_else(|| {
                              RuntimeError::UnknownMethod { type_name: state.borrow()
                                                                            .type_name
                                                                            .clone(),
                                                            method: method.to_string(),
                                                            location }
                          })?;
                self.call_script(&def, Some(Rc::clone(state)), args, location)
            },

            Value::Host(host) => {
                let adapter = host.ty.methods.get(method).ok_or_else(|| {
                                  RuntimeError::UnknownMethod { type_name:
                                                                    host.ty.name().to_string(),
                                                                method: method.to_string(),
                                                                location }
                              })?;
                let mut data = host.data.borrow_mut();
                (adapter.invoke)(&mut **data, &args).map_err(|error| error.with_location(location))
            },

            other => Err(RuntimeError::UnknownMethod { type_name: other.type_name(),
                                                       method:    method.to_string(),
                                                       location, }),
        }
    }

    /// Calls a script function or method.
    ///
    /// Arguments are checked against the declared parameters and bound
    /// into a fresh call frame; for a method the receiver's aggregate
    /// handle rides along on the frame, so bare member names inside the
    /// body resolve against — and mutate — this exact instance. The body
    /// runs until a `return` signal or the end; the produced value is
    /// checked against the declared return type.
    pub(crate) fn call_script(&mut self,
                              def: &Rc<FunctionDef>,
                              receiver: Option<Rc<RefCell<AggregateState>>>,
                              args: Vec<Value>,
                              location: Location)
                              -> EvalResult<Value> {
        if args.len() != def.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch { expected: def.params.len(),
                                                             found:    args.len(),
                                                             location, });
        }

        let mut bound = Vec::with_capacity(args.len());
        for (param, arg) in def.params.iter().zip(args) {
            bound.push((param.name.clone(), ops::convert_for_slot(arg, param.ty.name(), location)?));
        }

        if self.depth >= RECURSION_LIMIT {
            return Err(RuntimeError::RecursionLimit { location });
        }
        self.depth += 1;
        self.push_frame(FrameKind::Call, receiver);
        for (name, value) in bound {
            self.declare(&name, value);
        }

        let flow = self.run_sequence(&def.body);

        self.pop_frame();
        self.depth -= 1;

        match flow? {
            Flow::Return { value, .. } => self.check_return(def, value, location),
            Flow::Normal => self.check_return(def, None, location),
            Flow::Break { location } => Err(RuntimeError::StrayBreak { location }),
        }
    }

    /// Checks a produced return value against the declaration and
    /// converts it into the declared slot.
    fn check_return(&self,
                    def: &FunctionDef,
                    value: Option<Value>,
                    location: Location)
                    -> EvalResult<Value> {
        match (&def.return_type, value) {
            (None, None) => Ok(Value::void()),
            (None, Some(value)) => {
                Err(RuntimeError::ReturnTypeMismatch { expected: "void".to_string(),
                                                       found:    value.type_name(),
                                                       location, })
            },
            (Some(ty), None) => {
                Err(RuntimeError::ReturnTypeMismatch { expected: ty.name().to_string(),
                                                       found:    "void".to_string(),
                                                       location, })
            },
            (Some(ty), Some(value)) => {
                let found = value.type_name();
                ops::convert_for_slot(value, ty.name(), location).map_err(|_| {
                    RuntimeError::ReturnTypeMismatch { expected: ty.name().to_string(),
                                                       found,
                                                       location }
                })
            },
        }
    }

    /// Evaluates `Type(args...)`.
    ///
    /// With no arguments every type yields its zero value. A primitive
    /// type applied to one numeric argument is a cast. A host type
    /// dispatches its registered constructor overloads: an exact match
    /// on the argument type names wins, otherwise the single overload
    /// reachable by numeric conversion.
    pub(crate) fn construct(&mut self,
                            ty: &TypeRef,
                            args: Vec<Value>,
                            location: Location)
                            -> EvalResult<Value> {
        if args.is_empty() {
            return Ok(ty.zero());
        }

        match ty {
            TypeRef::Primitive(kind) => Self::primitive_cast(*kind, args, location),

            TypeRef::Struct(def) => {
                Err(RuntimeError::NoMatchingConstructor { type_name: def.name.clone(),
                                                          arguments: type_names(&args),
                                                          location, })
            },

            TypeRef::Host(host) => {
                let arg_names: Vec<String> = args.iter().map(Value::type_name).collect();

                if let Some(ctor) =
                    host.constructors.iter().find(|ctor| ctor.param_types == arg_names)
                {
                    let data = (ctor.build)(&args).map_err(|error| {
                                                      error.with_location(location)
                                                  })?;
                    return Ok(Value::Host(host.wrap(data)));
                }

                let convertible: Vec<_> =
                    host.constructors
                        .iter()
                        .filter(|ctor| {
                            ctor.param_types.len() == args.len()
                            && ctor.param_types
                                   .iter()
                                   .zip(&args)
                                   .all(|(param, arg)| numeric_convertible(param, arg))
                        })
                        .collect();

                match convertible.as_slice() {
                    [ctor] => {
                        let data = (ctor.build)(&args).map_err(|error| {
                                                          error.with_location(location)
                                                      })?;
                        Ok(Value::Host(host.wrap(data)))
                    },
                    [] => Err(RuntimeError::NoMatchingConstructor { type_name: host.name()
                                                                                   .to_string(),
                                                                    arguments: type_names(&args),
                                                                    location, }),
                    _ => Err(RuntimeError::AmbiguousConstructor { type_name: host.name()
                                                                                 .to_string(),
                                                                  arguments: type_names(&args),
                                                                  location, }),
                }
            },
        }
    }

    /// A primitive type name applied to one numeric argument casts it.
    fn primitive_cast(kind: PrimitiveKind,
                      args: Vec<Value>,
                      location: Location)
                      -> EvalResult<Value> {
        if args.len() == 1 && kind.is_numeric() {
            if let Value::Primitive(p) = &args[0] {
                if let Some(converted) = p.convert_to(kind) {
                    return Ok(Value::Primitive(converted));
                }
            }
        }

        Err(RuntimeError::NoMatchingConstructor { type_name: kind.name().to_string(),
                                                  arguments: type_names(&args),
                                                  location, })
    }
}

/// Whether a call argument can flow into a constructor parameter by
/// numeric conversion.
fn numeric_convertible(param: &str, arg: &Value) -> bool {
    if param == arg.type_name() {
        return true;
    }

    let param_numeric = PrimitiveKind::from_name(param).is_some_and(PrimitiveKind::is_numeric);
    let arg_numeric = matches!(arg, Value::Primitive(p) if p.kind().is_numeric());

    param_numeric && arg_numeric
}

/// Comma-separated argument type names for diagnostics.
fn type_names(args: &[Value]) -> String {
    args.iter().map(Value::type_name).collect::<Vec<_>>().join(", ")
}
