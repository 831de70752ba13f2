use std::{any::TypeId, cell::RefCell, rc::Rc};

use crate::{
    ast::TypeRef,
    interpreter::value::{aggregate::AggregateState, host::HostValue},
};

/// The built-in primitive types, by canonical name.
///
/// `int` is the default 64-bit integer; the fixed-width names keep their
/// exact widths. `float` and `double` are IEEE single and double
/// precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// `void`
    Void,
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `int`
    Int,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `string`
    Str,
}

/// Every primitive kind with its canonical name, in seeding order.
pub const PRIMITIVE_KINDS: &[PrimitiveKind] = &[PrimitiveKind::Void,
                                                PrimitiveKind::Bool,
                                                PrimitiveKind::Char,
                                                PrimitiveKind::Int,
                                                PrimitiveKind::I8,
                                                PrimitiveKind::I16,
                                                PrimitiveKind::I32,
                                                PrimitiveKind::I64,
                                                PrimitiveKind::U8,
                                                PrimitiveKind::U16,
                                                PrimitiveKind::U32,
                                                PrimitiveKind::U64,
                                                PrimitiveKind::Float,
                                                PrimitiveKind::Double,
                                                PrimitiveKind::Str];

impl PrimitiveKind {
    /// The canonical type name, as written in scripts.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::Int => "int",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Str => "string",
        }
    }

    /// Resolves a canonical name back to its kind.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        PRIMITIVE_KINDS.iter().copied().find(|kind| kind.name() == name)
    }

    /// The zero value of this kind, used for uninitialized declarations.
    #[must_use]
    pub const fn zero(self) -> Primitive {
        match self {
            Self::Void => Primitive::Void,
            Self::Bool => Primitive::Bool(false),
            Self::Char => Primitive::Char('\0'),
            Self::Int => Primitive::Int(0),
            Self::I8 => Primitive::I8(0),
            Self::I16 => Primitive::I16(0),
            Self::I32 => Primitive::I32(0),
            Self::I64 => Primitive::I64(0),
            Self::U8 => Primitive::U8(0),
            Self::U16 => Primitive::U16(0),
            Self::U32 => Primitive::U32(0),
            Self::U64 => Primitive::U64(0),
            Self::Float => Primitive::Float(0.0),
            Self::Double => Primitive::Double(0.0),
            Self::Str => Primitive::Str(String::new()),
        }
    }

    /// Whether values of this kind participate in arithmetic and numeric
    /// conversion.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !matches!(self, Self::Void | Self::Bool | Self::Char | Self::Str)
    }

    /// Conversion rank for mixed-kind arithmetic; higher ranks win.
    /// Follows the C usual arithmetic conversions: integers below
    /// floating point, wider widths above narrower ones.
    #[must_use]
    pub const fn rank(self) -> Option<u8> {
        match self {
            Self::I8 => Some(0),
            Self::U8 => Some(1),
            Self::I16 => Some(2),
            Self::U16 => Some(3),
            Self::I32 => Some(4),
            Self::U32 => Some(5),
            Self::Int => Some(6),
            Self::I64 => Some(7),
            Self::U64 => Some(8),
            Self::Float => Some(9),
            Self::Double => Some(10),
            Self::Void | Self::Bool | Self::Char | Self::Str => None,
        }
    }
}

/// A numeric value widened to the largest lane of its family, used as the
/// intermediate step of every numeric conversion.
#[derive(Debug, Clone, Copy)]
pub enum Scalar {
    /// Any integer kind, widened to `i128`.
    Int(i128),
    /// Any floating-point kind, widened to `f64`.
    Float(f64),
}

/// A primitive value together with its host type identity.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// The absence of a value.
    Void,
    /// A `bool` value.
    Bool(bool),
    /// A `char` value.
    Char(char),
    /// An `int` value.
    Int(i64),
    /// An `i8` value.
    I8(i8),
    /// An `i16` value.
    I16(i16),
    /// An `i32` value.
    I32(i32),
    /// An `i64` value.
    I64(i64),
    /// A `u8` value.
    U8(u8),
    /// A `u16` value.
    U16(u16),
    /// A `u32` value.
    U32(u32),
    /// A `u64` value.
    U64(u64),
    /// A `float` value.
    Float(f32),
    /// A `double` value.
    Double(f64),
    /// A `string` value.
    Str(String),
}

impl Primitive {
    /// The [`PrimitiveKind`] of this value.
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Void => PrimitiveKind::Void,
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::Char(_) => PrimitiveKind::Char,
            Self::Int(_) => PrimitiveKind::Int,
            Self::I8(_) => PrimitiveKind::I8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::U8(_) => PrimitiveKind::U8,
            Self::U16(_) => PrimitiveKind::U16,
            Self::U32(_) => PrimitiveKind::U32,
            Self::U64(_) => PrimitiveKind::U64,
            Self::Float(_) => PrimitiveKind::Float,
            Self::Double(_) => PrimitiveKind::Double,
            Self::Str(_) => PrimitiveKind::Str,
        }
    }

    /// The canonical type name of this value.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// Widens a numeric value to its [`Scalar`] lane. Returns `None` for
    /// non-numeric values.
    #[must_use]
    pub fn scalar(&self) -> Option<Scalar> {
        match self {
            Self::Int(v) | Self::I64(v) => Some(Scalar::Int(i128::from(*v))),
            Self::I8(v) => Some(Scalar::Int(i128::from(*v))),
            Self::I16(v) => Some(Scalar::Int(i128::from(*v))),
            Self::I32(v) => Some(Scalar::Int(i128::from(*v))),
            Self::U8(v) => Some(Scalar::Int(i128::from(*v))),
            Self::U16(v) => Some(Scalar::Int(i128::from(*v))),
            Self::U32(v) => Some(Scalar::Int(i128::from(*v))),
            Self::U64(v) => Some(Scalar::Int(i128::from(*v))),
            Self::Float(v) => Some(Scalar::Float(f64::from(*v))),
            Self::Double(v) => Some(Scalar::Float(*v)),
            Self::Void | Self::Bool(_) | Self::Char(_) | Self::Str(_) => None,
        }
    }

    /// Converts a numeric value to another numeric kind, C-cast style:
    /// narrowing integers wrap, float-to-integer truncates. Identical
    /// kinds pass through; any non-numeric conversion returns `None`.
    #[must_use]
    pub fn convert_to(&self, kind: PrimitiveKind) -> Option<Self> {
        if self.kind() == kind {
            return Some(self.clone());
        }

        let scalar = self.scalar()?;
        if !kind.is_numeric() {
            return None;
        }

        macro_rules! cast {
            ($variant:ident, $ty:ty) => {
                match scalar {
                    Scalar::Int(v) => Self::$variant(v as $ty),
                    Scalar::Float(v) => Self::$variant(v as $ty),
                }
            };
        }

        Some(match kind {
                 PrimitiveKind::Int => cast!(Int, i64),
                 PrimitiveKind::I8 => cast!(I8, i8),
                 PrimitiveKind::I16 => cast!(I16, i16),
                 PrimitiveKind::I32 => cast!(I32, i32),
                 PrimitiveKind::I64 => cast!(I64, i64),
                 PrimitiveKind::U8 => cast!(U8, u8),
                 PrimitiveKind::U16 => cast!(U16, u16),
                 PrimitiveKind::U32 => cast!(U32, u32),
                 PrimitiveKind::U64 => cast!(U64, u64),
                 PrimitiveKind::Float => cast!(Float, f32),
                 PrimitiveKind::Double => cast!(Double, f64),
                 _ => return None,
             })
    }

    /// Clones the value into a `Box<dyn Any>` of the requested Rust type,
    /// converting between numeric kinds on the way. This is how host
    /// adapters extract typed arguments.
    #[must_use]
    pub fn clone_into_any(&self, want: TypeId) -> Option<Box<dyn std::any::Any>> {
        if want == TypeId::of::<String>() {
            return match self {
                Self::Str(s) => Some(Box::new(s.clone())),
                _ => None,
            };
        }
        if want == TypeId::of::<bool>() {
            return match self {
                Self::Bool(b) => Some(Box::new(*b)),
                _ => None,
            };
        }
        if want == TypeId::of::<char>() {
            return match self {
                Self::Char(c) => Some(Box::new(*c)),
                _ => None,
            };
        }
        if want == TypeId::of::<()>() {
            return match self {
                Self::Void => Some(Box::new(())),
                _ => None,
            };
        }

        let scalar = self.scalar()?;

        macro_rules! numeric {
            ($($ty:ty),*) => {
                $(if want == TypeId::of::<$ty>() {
                    return Some(match scalar {
                        Scalar::Int(v) => Box::new(v as $ty),
                        Scalar::Float(v) => Box::new(v as $ty),
                    });
                })*
            };
        }

        numeric!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

        None
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::Int(v) | Self::I64(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
        }
    }
}

/// Maps a Rust type to the canonical primitive name it stands for at the
/// host boundary, if any. `i64` maps to `int`, the script's default
/// integer type.
#[must_use]
pub fn primitive_name_for(id: TypeId) -> Option<&'static str> {
    if id == TypeId::of::<()>() {
        Some("void")
    } else if id == TypeId::of::<bool>() {
        Some("bool")
    } else if id == TypeId::of::<char>() {
        Some("char")
    } else if id == TypeId::of::<i64>() {
        Some("int")
    } else if id == TypeId::of::<i8>() {
        Some("i8")
    } else if id == TypeId::of::<i16>() {
        Some("i16")
    } else if id == TypeId::of::<i32>() {
        Some("i32")
    } else if id == TypeId::of::<u8>() {
        Some("u8")
    } else if id == TypeId::of::<u16>() {
        Some("u16")
    } else if id == TypeId::of::<u32>() {
        Some("u32")
    } else if id == TypeId::of::<u64>() {
        Some("u64")
    } else if id == TypeId::of::<f32>() {
        Some("float")
    } else if id == TypeId::of::<f64>() {
        Some("double")
    } else if id == TypeId::of::<String>() {
        Some("string")
    } else {
        None
    }
}

/// Represents a runtime value.
///
/// A `Value` is a handle: primitives carry their datum inline, script
/// aggregates and host values are reference counted. `Clone` is a shallow
/// handle copy used for aliasing inside the evaluator; the language's
/// value semantics ("copying an object copies its state") go through
/// [`Value::deep_copy`].
#[derive(Debug, Clone)]
pub enum Value {
    /// A primitive value.
    Primitive(Primitive),
    /// A script struct instance.
    Aggregate(Rc<RefCell<AggregateState>>),
    /// A host-registered value.
    Host(HostValue),
}

impl Value {
    /// The `void` value.
    #[must_use]
    pub const fn void() -> Self {
        Self::Primitive(Primitive::Void)
    }

    /// Returns `true` for the `void` value.
    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Primitive(Primitive::Void))
    }

    /// The type name this value reports, used for every compatibility
    /// check.
    ///
    /// # Example
    /// ```
    /// use lilt::Value;
    ///
    /// assert_eq!(Value::from(3i64).type_name(), "int");
    /// assert_eq!(Value::from(1.5f32).type_name(), "float");
    /// assert_eq!(Value::from("hi").type_name(), "string");
    /// ```
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Primitive(p) => p.type_name().to_string(),
            Self::Aggregate(state) => state.borrow().type_name.clone(),
            Self::Host(host) => host.ty.name().to_string(),
        }
    }

    /// Copies the value with the language's value semantics: primitives
    /// copy, aggregates deep-copy their members, host values go through
    /// the cloner their registration provided. Method tables are shared;
    /// methods bind their receiver at dispatch time, so there is nothing
    /// to fix up afterwards.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        match self {
            Self::Primitive(p) => Self::Primitive(p.clone()),
            Self::Aggregate(state) => {
                Self::Aggregate(Rc::new(RefCell::new(state.borrow().deep_copy())))
            },
            Self::Host(host) => Self::Host(host.deep_copy()),
        }
    }

    /// The primitive payload, if this is a primitive.
    #[must_use]
    pub const fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            Self::Primitive(p) => Some(p),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::Aggregate(state) => {
                let state = state.borrow();
                write!(f, "{} {{ ", state.type_name)?;
                for (index, (name, value)) in state.members.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, " }}")
            },
            Self::Host(host) => write!(f, "<{}>", host.ty.name()),
        }
    }
}

impl From<Primitive> for Value {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Primitive(Primitive::Int(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Primitive(Primitive::Float(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Primitive(Primitive::Double(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Primitive(Primitive::Bool(v))
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Primitive(Primitive::Char(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Primitive(Primitive::Str(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Primitive(Primitive::Str(v.to_string()))
    }
}

impl TypeRef {
    /// Builds the zero value of this type: primitive zeros, an aggregate
    /// with zeroed members, or the host type's default instance.
    #[must_use]
    pub fn zero(&self) -> Value {
        match self {
            Self::Primitive(kind) => Value::Primitive(kind.zero()),
            Self::Struct(def) => {
                Value::Aggregate(Rc::new(RefCell::new(AggregateState::zero_of(def))))
            },
            Self::Host(ty) => Value::Host(ty.instantiate_default()),
        }
    }
}
