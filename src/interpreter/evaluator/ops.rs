use crate::{
    ast::BinaryOperator,
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        lexer::Location,
        value::core::{Primitive, PrimitiveKind, Value},
    },
};

/// Converts a value for storage into a slot of the given type name.
///
/// Matching type names pass through unchanged. Numeric primitives
/// convert C-style into any other numeric kind (this is what lets an
/// `int` flow into a `float` parameter, and a widened arithmetic result
/// flow back into its integer slot). Everything else is a mismatch.
pub fn convert_for_slot(value: Value, expected: &str, location: Location) -> EvalResult<Value> {
    if value.type_name() == expected {
        return Ok(value);
    }

    if let Value::Primitive(p) = &value {
        if let Some(kind) = PrimitiveKind::from_name(expected) {
            if kind.is_numeric() {
                if let Some(converted) = p.convert_to(kind) {
                    return Ok(Value::Primitive(converted));
                }
            }
        }
    }

    Err(RuntimeError::TypeMismatch { expected: expected.to_string(),
                                     found:    value.type_name(),
                                     location, })
}

/// Evaluates a binary operator over two values.
///
/// Numeric operands are promoted to their common kind first, so the
/// usual semantics of that width apply. `+` concatenates strings;
/// equality applies to any same-typed primitives; ordering applies to
/// numerics and strings.
pub fn binary(op: BinaryOperator,
              left: &Value,
              right: &Value,
              location: Location)
              -> EvalResult<Value> {
    let (l, r) = match (left, right) {
        (Value::Primitive(l), Value::Primitive(r)) => (l, r),
        _ => {
            return Err(RuntimeError::UnsupportedOperator { op:        op.to_string(),
                                                           type_name: left.type_name(),
                                                           location, });
        },
    };

    if matches!(l, Primitive::Void) || matches!(r, Primitive::Void) {
        return Err(RuntimeError::VoidInExpression { location });
    }

    match (l, r) {
        (Primitive::Str(a), Primitive::Str(b)) => string_op(op, a, b, location),

        (Primitive::Bool(a), Primitive::Bool(b)) => match op {
            BinaryOperator::Equal => Ok(Value::from(a == b)),
            BinaryOperator::NotEqual => Ok(Value::from(a != b)),
            _ => Err(RuntimeError::UnsupportedOperator { op:        op.to_string(),
                                                         type_name: "bool".to_string(),
                                                         location, }),
        },

        (Primitive::Char(a), Primitive::Char(b)) => match op {
            BinaryOperator::Equal => Ok(Value::from(a == b)),
            BinaryOperator::NotEqual => Ok(Value::from(a != b)),
            _ => Err(RuntimeError::UnsupportedOperator { op:        op.to_string(),
                                                         type_name: "char".to_string(),
                                                         location, }),
        },

        _ => {
            let (l, r) = promote(l, r, location)?;
            if is_comparison(op) {
                compare(op, &l, &r).map(Value::from)
            } else {
                arith(op, &l, &r, location).map(Value::Primitive)
            }
        },
    }
}

/// Logical NOT.
pub fn not(value: &Value, location: Location) -> EvalResult<Value> {
    match value {
        Value::Primitive(Primitive::Bool(b)) => Ok(Value::from(!b)),
        other => Err(RuntimeError::UnsupportedOperator { op:        "!".to_string(),
                                                         type_name: other.type_name(),
                                                         location, }),
    }
}

/// Arithmetic negation. Signed overflow (negating the minimum) is an
/// error; unsigned negation wraps.
pub fn negate(value: &Value, location: Location) -> EvalResult<Value> {
    let p = match value {
        Value::Primitive(p) => p,
        other => {
            return Err(RuntimeError::UnsupportedOperator { op:        "-".to_string(),
                                                           type_name: other.type_name(),
                                                           location, });
        },
    };

    macro_rules! signed {
        ($variant:ident, $v:expr) => {
            $v.checked_neg()
              .map(Primitive::$variant)
              .ok_or(RuntimeError::Overflow { location })?
        };
    }

    Ok(Value::Primitive(match p {
                            Primitive::Int(v) => signed!(Int, v),
                            Primitive::I8(v) => signed!(I8, v),
                            Primitive::I16(v) => signed!(I16, v),
                            Primitive::I32(v) => signed!(I32, v),
                            Primitive::I64(v) => signed!(I64, v),
                            Primitive::U8(v) => Primitive::U8(v.wrapping_neg()),
                            Primitive::U16(v) => Primitive::U16(v.wrapping_neg()),
                            Primitive::U32(v) => Primitive::U32(v.wrapping_neg()),
                            Primitive::U64(v) => Primitive::U64(v.wrapping_neg()),
                            Primitive::Float(v) => Primitive::Float(-v),
                            Primitive::Double(v) => Primitive::Double(-v),
                            other => {
                                return Err(RuntimeError::UnsupportedOperator {
                                    op:        "-".to_string(),
                                    type_name: other.type_name().to_string(),
                                    location,
                                });
                            },
                        }))
}

/// Whether the operator yields a `bool`.
const fn is_comparison(op: BinaryOperator) -> bool {
    matches!(op,
             BinaryOperator::Less
             | BinaryOperator::LessEqual
             | BinaryOperator::Greater
             | BinaryOperator::GreaterEqual
             | BinaryOperator::Equal
             | BinaryOperator::NotEqual)
}

/// String operators: concatenation, equality and lexicographic order.
fn string_op(op: BinaryOperator, a: &str, b: &str, location: Location) -> EvalResult<Value> {
    Ok(match op {
           BinaryOperator::Add => Value::from(format!("{a}{b}")),
           BinaryOperator::Equal => Value::from(a == b),
           BinaryOperator::NotEqual => Value::from(a != b),
           BinaryOperator::Less => Value::from(a < b),
           BinaryOperator::LessEqual => Value::from(a <= b),
           BinaryOperator::Greater => Value::from(a > b),
           BinaryOperator::GreaterEqual => Value::from(a >= b),
           BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div => {
               return Err(RuntimeError::UnsupportedOperator { op:        op.to_string(),
                                                              type_name: "string".to_string(),
                                                              location, });
           },
       })
}

/// Promotes two numeric primitives to their common kind, following the
/// usual arithmetic conversions.
fn promote(l: &Primitive, r: &Primitive, location: Location) -> EvalResult<(Primitive, Primitive)> {
    let (Some(lrank), Some(rrank)) = (l.kind().rank(), r.kind().rank()) else {
        return Err(RuntimeError::TypeMismatch { expected: l.type_name().to_string(),
                                                found:    r.type_name().to_string(),
                                                location, });
    };

    let kind = if lrank >= rrank { l.kind() } else { r.kind() };

    let l = l.convert_to(kind).expect("numeric conversion");
    let r = r.convert_to(kind).expect("numeric conversion");
    Ok((l, r))
}

/// Arithmetic over two primitives of the same kind. Signed integer
/// overflow is an error; unsigned arithmetic wraps; floats follow IEEE.
fn arith(op: BinaryOperator, l: &Primitive, r: &Primitive, location: Location)
         -> EvalResult<Primitive> {
    macro_rules! signed {
        ($variant:ident, $a:expr, $b:expr) => {{
            let result = match op {
                BinaryOperator::Add => $a.checked_add(*$b),
                BinaryOperator::Sub => $a.checked_sub(*$b),
                BinaryOperator::Mul => $a.checked_mul(*$b),
                BinaryOperator::Div => {
                    if *$b == 0 {
                        return Err(RuntimeError::DivisionByZero { location });
                    }
                    $a.checked_div(*$b)
                },
                _ => unreachable!("comparisons are handled before arithmetic"),
            };
            Primitive::$variant(result.ok_or(RuntimeError::Overflow { location })?)
        }};
    }

    macro_rules! unsigned {
        ($variant:ident, $a:expr, $b:expr) => {{
            Primitive::$variant(match op {
                BinaryOperator::Add => $a.wrapping_add(*$b),
                BinaryOperator::Sub => $a.wrapping_sub(*$b),
                BinaryOperator::Mul => $a.wrapping_mul(*$b),
                BinaryOperator::Div => {
                    if *$b == 0 {
                        return Err(RuntimeError::DivisionByZero { location });
                    }
                    $a.wrapping_div(*$b)
                },
                _ => unreachable!("comparisons are handled before arithmetic"),
            })
        }};
    }

    macro_rules! float {
        ($variant:ident, $a:expr, $b:expr) => {{
            Primitive::$variant(match op {
                BinaryOperator::Add => $a + $b,
                BinaryOperator::Sub => $a - $b,
                BinaryOperator::Mul => $a * $b,
                BinaryOperator::Div => $a / $b,
                _ => unreachable!("comparisons are handled before arithmetic"),
            })
        }};
    }

    Ok(match (l, r) {
           (Primitive::Int(a), Primitive::Int(b)) => signed!(Int, a, b),
           (Primitive::I8(a), Primitive::I8(b)) => signed!(I8, a, b),
           (Primitive::I16(a), Primitive::I16(b)) => signed!(I16, a, b),
           (Primitive::I32(a), Primitive::I32(b)) => signed!(I32, a, b),
           (Primitive::I64(a), Primitive::I64(b)) => signed!(I64, a, b),
           (Primitive::U8(a), Primitive::U8(b)) => unsigned!(U8, a, b),
           (Primitive::U16(a), Primitive::U16(b)) => unsigned!(U16, a, b),
           (Primitive::U32(a), Primitive::U32(b)) => unsigned!(U32, a, b),
           (Primitive::U64(a), Primitive::U64(b)) => unsigned!(U64, a, b),
           (Primitive::Float(a), Primitive::Float(b)) => float!(Float, a, b),
           (Primitive::Double(a), Primitive::Double(b)) => float!(Double, a, b),
           _ => unreachable!("operands were promoted to a common kind"),
       })
}

/// Comparison over two primitives of the same kind.
fn compare(op: BinaryOperator, l: &Primitive, r: &Primitive) -> EvalResult<bool> {
    macro_rules! cmp {
        ($a:expr, $b:expr) => {
            match op {
                BinaryOperator::Less => $a < $b,
                BinaryOperator::LessEqual => $a <= $b,
                BinaryOperator::Greater => $a > $b,
                BinaryOperator::GreaterEqual => $a >= $b,
                BinaryOperator::Equal => $a == $b,
                BinaryOperator::NotEqual => $a != $b,
                _ => unreachable!("arithmetic is handled before comparisons"),
            }
        };
    }

    Ok(match (l, r) {
           (Primitive::Int(a), Primitive::Int(b)) => cmp!(a, b),
           (Primitive::I8(a), Primitive::I8(b)) => cmp!(a, b),
           (Primitive::I16(a), Primitive::I16(b)) => cmp!(a, b),
           (Primitive::I32(a), Primitive::I32(b)) => cmp!(a, b),
           (Primitive::I64(a), Primitive::I64(b)) => cmp!(a, b),
           (Primitive::U8(a), Primitive::U8(b)) => cmp!(a, b),
           (Primitive::U16(a), Primitive::U16(b)) => cmp!(a, b),
           (Primitive::U32(a), Primitive::U32(b)) => cmp!(a, b),
           (Primitive::U64(a), Primitive::U64(b)) => cmp!(a, b),
           (Primitive::Float(a), Primitive::Float(b)) => cmp!(a, b),
           (Primitive::Double(a), Primitive::Double(b)) => cmp!(a, b),
           _ => unreachable!("operands were promoted to a common kind"),
       })
}
