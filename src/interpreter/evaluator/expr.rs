use std::{cell::RefCell, rc::Rc};

use crate::{
    ast::{BinaryOperator, Expr, LiteralValue, UnaryOperator},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Env, EvalResult},
            ops,
        },
        lexer::Location,
        value::{
            aggregate::AggregateState,
            core::{Primitive, Scalar, Value},
            host::HostValue,
        },
    },
};

/// An assignable location: where assignments, increments and method
/// receivers resolve to. Reading a place yields a shallow alias of the
/// stored value, which is what lets method calls mutate the variable they
/// were invoked on.
pub(crate) enum Place {
    /// A variable slot in some frame.
    Var {
        frame: usize,
        name:  String,
    },
    /// A member of an aggregate.
    Member {
        state:  Rc<RefCell<AggregateState>>,
        member: String,
    },
    /// A bound field of a host value.
    HostField {
        value: HostValue,
        field: String,
    },
    /// An indexed element of a host value.
    HostIndex {
        value: HostValue,
        index: i64,
    },
}

impl Env {
    /// Evaluates an expression to a value.
    ///
    /// Reads of variables and members return deep copies: the language
    /// has value semantics, and sharing only happens through places.
    pub fn eval_expr(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal { value, .. } => {
                Ok(Value::Primitive(match value {
                                        LiteralValue::Int(v) => Primitive::Int(*v),
                                        LiteralValue::Float(v) => Primitive::Float(*v),
                                        LiteralValue::Double(v) => Primitive::Double(*v),
                                        LiteralValue::Str(v) => Primitive::Str(v.clone()),
                                        LiteralValue::Char(v) => Primitive::Char(*v),
                                    }))
            },

            Expr::Variable { name, location } => {
                let place =
                    self.lookup_place(name)
                        .ok_or_else(|| RuntimeError::UnknownVariable { name:     name.clone(),
                                                                       location: *location, })?;
                Ok(self.read_place(&place, *location)?.deep_copy())
            },

            Expr::Unary { op,
                          expr: operand,
                          location, } => match op {
                UnaryOperator::Not => {
                    let value = self.eval_expr(operand)?;
                    ops::not(&value, *location)
                },
                UnaryOperator::Negate => {
                    let value = self.eval_expr(operand)?;
                    ops::negate(&value, *location)
                },
                UnaryOperator::PreIncrement => {
                    self.step_place(operand, BinaryOperator::Add, "++", false, *location)
                },
                UnaryOperator::PreDecrement => {
                    self.step_place(operand, BinaryOperator::Sub, "--", false, *location)
                },
                UnaryOperator::PostIncrement => {
                    self.step_place(operand, BinaryOperator::Add, "++", true, *location)
                },
                UnaryOperator::PostDecrement => {
                    self.step_place(operand, BinaryOperator::Sub, "--", true, *location)
                },
            },

            Expr::Binary { left,
                           op,
                           right,
                           location, } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                ops::binary(*op, &left, &right, *location)
            },

            Expr::Assign { target,
                           op,
                           value,
                           location, } => {
                let place = self.eval_place(target)?;
                let rhs = self.eval_expr(value)?;
                let result = match op {
                    None => rhs,
                    Some(op) => {
                        let current = self.read_place(&place, *location)?;
                        ops::binary(*op, &current, &rhs, *location)?
                    },
                };
                self.write_place(&place, result, *location)?;
                Ok(self.read_place(&place, *location)?.deep_copy())
            },

            Expr::Call { name,
                         arguments,
                         location, } => {
                let lookup =
                    self.lookup_function(name)
                        .ok_or_else(|| RuntimeError::UnknownFunction { name:     name.clone(),
                                                                       location: *location, })?;
                let args = self.eval_arguments(arguments)?;
                self.dispatch_call(lookup, args, *location)
            },

            Expr::MethodCall { receiver,
                               method,
                               arguments,
                               location, } => {
                let receiver = self.eval_receiver(receiver)?;
                let args = self.eval_arguments(arguments)?;
                self.dispatch_method(&receiver, method, args, *location)
            },

            Expr::Member { object,
                           member,
                           location, } => {
                let object = self.eval_receiver(object)?;
                Ok(self.read_member(&object, member, *location)?.deep_copy())
            },

            Expr::Index { object,
                          index,
                          location, } => {
                let object = self.eval_receiver(object)?;
                let index = self.eval_index(index)?;
                self.read_index(&object, index, *location)
            },

            Expr::Construct { ty,
                              arguments,
                              location, } => {
                let args = self.eval_arguments(arguments)?;
                self.construct(ty, args, *location)
            },
        }
    }

    /// Evaluates an expression that must produce a `bool`, as the loop
    /// and branch conditions do.
    pub(crate) fn eval_bool(&mut self, expr: &Expr) -> EvalResult<bool> {
        match self.eval_expr(expr)? {
            Value::Primitive(Primitive::Bool(b)) => Ok(b),
            other => Err(RuntimeError::TypeMismatch { expected: "bool".to_string(),
                                                      found:    other.type_name(),
                                                      location: expr.location(), }),
        }
    }

    /// Evaluates call arguments in order.
    pub(crate) fn eval_arguments(&mut self, arguments: &[Expr]) -> EvalResult<Vec<Value>> {
        arguments.iter().map(|argument| self.eval_expr(argument)).collect()
    }

    /// Evaluates an index expression to an integer.
    fn eval_index(&mut self, expr: &Expr) -> EvalResult<i64> {
        let value = self.eval_expr(expr)?;
        if let Value::Primitive(p) = &value {
            if let Some(Scalar::Int(index)) = p.scalar() {
                return Ok(index as i64);
            }
        }
        Err(RuntimeError::TypeMismatch { expected: "int".to_string(),
                                         found:    value.type_name(),
                                         location: expr.location(), })
    }

    /// Resolves a variable name to its place, walking frames innermost
    /// out. A call frame is a barrier: past it, only the receiver's
    /// members and the globals are visible.
    pub(crate) fn lookup_place(&self, name: &str) -> Option<Place> {
        let mut index = self.frames.len();
        while index > 0 {
            index -= 1;
            let frame = &self.frames[index];

            if frame.vars.contains_key(name) {
                return Some(Place::Var { frame: index,
                                         name:  name.to_string(), });
            }
            if let Some(receiver) = &frame.receiver {
                if receiver.borrow().members.contains_key(name) {
                    return Some(Place::Member { state:  Rc::clone(receiver),
                                                member: name.to_string(), });
                }
            }
            if matches!(frame.kind, super::core::FrameKind::Call) {
                if index != 0 && self.frames[0].vars.contains_key(name) {
                    return Some(Place::Var { frame: 0,
                                             name:  name.to_string(), });
                }
                return None;
            }
        }
        None
    }

    /// Resolves an expression to a place when it is one (a variable, a
    /// member access or an index); `Ok(None)` otherwise.
    pub(crate) fn try_place(&mut self, expr: &Expr) -> EvalResult<Option<Place>> {
        match expr {
            Expr::Variable { name, location } => {
                self.lookup_place(name)
                    .ok_or_else(|| RuntimeError::UnknownVariable { name:     name.clone(),
                                                                   location: *location, })
                    .map(Some)
            },

            Expr::Member { object,
                           member,
                           location, } => {
                let object = self.eval_receiver(object)?;
                match object {
                    Value::Aggregate(state) => {
                        if state.borrow().members.contains_key(member) {
                            Ok(Some(Place::Member { state,
                                                    member: member.clone() }))
                        } else {
                            let type_name = state.borrow().type_name.clone();
                            Err(RuntimeError::UnknownMember { type_name,
                                                              member: member.clone(),
                                                              location: *location })
                        }
                    },
                    Value::Host(host) => {
                        if host.ty.fields.contains_key(member) {
                            Ok(Some(Place::HostField { value: host,
                                                       field: member.clone(), }))
                        } else {
                            Err(RuntimeError::UnknownMember { type_name: host.ty
                                                                             .name()
                                                                             .to_string(),
                                                              member:    member.clone(),
                                                              location:  *location, })
                        }
                    },
                    other => Err(RuntimeError::UnknownMember { type_name: other.type_name(),
                                                               member:    member.clone(),
                                                               location:  *location, }),
                }
            },

            Expr::Index { object,
                          index,
                          location, } => {
                let object = self.eval_receiver(object)?;
                let index = self.eval_index(index)?;
                match object {
                    Value::Host(host) if host.ty.indexer.is_some() => {
                        Ok(Some(Place::HostIndex { value: host,
                                                   index }))
                    },
                    other => Err(RuntimeError::UnsupportedOperator { op:        "[]".to_string(),
                                                                     type_name: other.type_name(),
                                                                     location:  *location, }),
                }
            },

            _ => Ok(None),
        }
    }

    /// Resolves an assignment target to its place.
    pub(crate) fn eval_place(&mut self, expr: &Expr) -> EvalResult<Place> {
        match self.try_place(expr)? {
            Some(place) => Ok(place),
            None => Err(RuntimeError::NotAssignable { location: expr.location(), }),
        }
    }

    /// Evaluates an expression as a method receiver: places alias the
    /// stored value so mutation is visible; anything else is a
    /// temporary.
    pub(crate) fn eval_receiver(&mut self, expr: &Expr) -> EvalResult<Value> {
        match self.try_place(expr)? {
            Some(place) => self.read_place(&place, expr.location()),
            None => self.eval_expr(expr),
        }
    }

    /// Reads a place, yielding a shallow alias of the stored value.
    pub(crate) fn read_place(&self, place: &Place, location: Location) -> EvalResult<Value> {
        match place {
            Place::Var { frame, name } => {
                self.frames[*frame]
                    .vars
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UnknownVariable { name:     name.clone(),
                                                                   location, })
            },

            Place::Member { state, member } => {
                let borrowed = state.borrow();
                borrowed.members
                        .get(member)
                        .cloned()
                        .ok_or_else(|| RuntimeError::UnknownMember { type_name: borrowed.type_name
                                                                                        .clone(),
                                                                     member:    member.clone(),
                                                                     location, })
            },

            Place::HostField { value, field } => {
                let accessor = value.ty.fields.get(field).ok_or_else(|| {
                                   RuntimeError::UnknownMember { type_name:
                                                                     value.ty.name().to_string(),
                                                                 member: field.clone(),
                                                                 location }
                               })?;
                let mut data = value.data.borrow_mut();
                (accessor.get)(&mut **data).map_err(|error| error.with_location(location))
            },

            Place::HostIndex { value, index } => {
                let indexer = value.ty.indexer.as_ref().ok_or_else(|| {
                                  RuntimeError::UnsupportedOperator { op:        "[]".to_string(),
                                                                      type_name: value.ty
                                                                                      .name()
                                                                                      .to_string(),
                                                                      location }
                              })?;
                let data = value.data.borrow();
                (indexer.get)(&**data, *index).map_err(|error| error.with_location(location))
            },
        }
    }

    /// Writes a value into a place, converting it to the slot's type.
    pub(crate) fn write_place(&mut self,
                              place: &Place,
                              value: Value,
                              location: Location)
                              -> EvalResult<()> {
        match place {
            Place::Var { frame, name } => {
                let expected = self.frames[*frame]
                                   .vars
                                   .get(name)
                                   .ok_or_else(|| RuntimeError::UnknownVariable { name:
                                                                                      name.clone(),
                                                                                  location })?
                                   .type_name();
                let converted = ops::convert_for_slot(value, &expected, location)?;
                self.frames[*frame].vars.insert(name.clone(), converted);
                Ok(())
            },

            Place::Member { state, member } => {
                let expected = {
                    let borrowed = state.borrow();
                    borrowed.members
                            .get(member)
                            .map(Value::type_name)
                            .ok_or_else(|| RuntimeError::UnknownMember { type_name:
                                                                             borrowed.type_name
                                                                                     .clone(),
                                                                         member: member.clone(),
                                                                         location })?
                };
                let converted = ops::convert_for_slot(value, &expected, location)?;
                state.borrow_mut().members.insert(member.clone(), converted);
                Ok(())
            },

            Place::HostField { value: host, field } => {
                let accessor = host.ty.fields.get(field).ok_or_else(|| {
                                   RuntimeError::UnknownMember { type_name:
                                                                     host.ty.name().to_string(),
                                                                 member: field.clone(),
                                                                 location }
                               })?;
                let mut data = host.data.borrow_mut();
                (accessor.set)(&mut **data, &value).map_err(|error| error.with_location(location))
            },

            Place::HostIndex { value: host, index } => {
                let indexer = host.ty.indexer.as_ref().ok_or_else(|| {
                                  RuntimeError::UnsupportedOperator { op:        "[]".to_string(),
                                                                      type_name: host.ty
                                                                                     .name()
                                                                                     .to_string(),
                                                                      location }
                              })?;
                let mut data = host.data.borrow_mut();
                (indexer.set)(&mut **data, *index, &value)
                    .map_err(|error| error.with_location(location))
            },
        }
    }

    /// Reads a member off a receiver, yielding a shallow alias.
    pub(crate) fn read_member(&mut self,
                              object: &Value,
                              member: &str,
                              location: Location)
                              -> EvalResult<Value> {
        match object {
            Value::Aggregate(state) => {
                let borrowed = state.borrow();
                borrowed.members
                        .get(member)
                        .cloned()
                        .ok_or_else(|| RuntimeError::UnknownMember { type_name: borrowed.type_name
                                                                                        .clone(),
                                                                     member: member.to_string(),
                                                                     location })
            },
            Value::Host(host) => {
                let accessor = host.ty.fields.get(member).ok_or_else(|| {
                                   RuntimeError::UnknownMember { type_name:
                                                                     host.ty.name().to_string(),
                                                                 member: member.to_string(),
                                                                 location }
                               })?;
                let mut data = host.data.borrow_mut();
                (accessor.get)(&mut **data).map_err(|error| error.with_location(location))
            },
            other => Err(RuntimeError::UnknownMember { type_name: other.type_name(),
                                                       member:    member.to_string(),
                                                       location, }),
        }
    }

    /// Reads an indexed element off a receiver.
    fn read_index(&mut self, object: &Value, index: i64, location: Location) -> EvalResult<Value> {
        match object {
            Value::Host(host) => {
                let indexer = host.ty.indexer.as_ref().ok_or_else(|| {
                                  RuntimeError::UnsupportedOperator { op:        "[]".to_string(),
                                                                      type_name: host.ty
                                                                                     .name()
                                                                                     .to_string(),
                                                                      location }
                              })?;
                let data = host.data.borrow();
                (indexer.get)(&**data, index).map_err(|error| error.with_location(location))
            },
            other => Err(RuntimeError::UnsupportedOperator { op:        "[]".to_string(),
                                                             type_name: other.type_name(),
                                                             location, }),
        }
    }

    /// Applies `++` or `--` to a place, returning the previous value for
    /// the postfix forms and the updated one otherwise.
    fn step_place(&mut self,
                  target: &Expr,
                  op: BinaryOperator,
                  symbol: &str,
                  post: bool,
                  location: Location)
                  -> EvalResult<Value> {
        let place = self.eval_place(target)?;
        let current = self.read_place(&place, location)?;

        let kind = match &current {
            Value::Primitive(p) if p.kind().is_numeric() => p.kind(),
            other => {
                return Err(RuntimeError::UnsupportedOperator { op:        symbol.to_string(),
                                                               type_name: other.type_name(),
                                                               location, });
            },
        };

        let one = Primitive::Int(1).convert_to(kind).expect("numeric kind");
        let updated = ops::binary(op, &current, &Value::Primitive(one), location)?;
        self.write_place(&place, updated.clone(), location)?;

        Ok(if post { current } else { updated })
    }
}
