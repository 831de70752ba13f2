use std::{
    any::{Any, TypeId},
    cell::RefCell,
    collections::HashMap,
    marker::PhantomData,
    rc::Rc,
};

use crate::{
    error::RuntimeError,
    interpreter::{
        lexer::Location,
        value::{
            core::{primitive_name_for, Primitive, Value},
            host::{AnyBox, Constructor, FieldAccessor, HostMethod, HostType, Indexer},
        },
    },
};

/// All host types registered with a compiler, addressable both by the
/// language name scripts use and by the Rust `TypeId` the adapters see.
#[derive(Debug, Default)]
pub struct HostRegistry {
    by_name: HashMap<String, Rc<HostType>>,
    by_id:   HashMap<TypeId, Rc<HostType>>,
}

impl HostRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a finished host type under both of its names.
    pub fn insert(&mut self, id: TypeId, ty: Rc<HostType>) {
        self.by_name.insert(ty.name().to_string(), Rc::clone(&ty));
        self.by_id.insert(id, ty);
    }

    /// Looks a host type up by its language name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<Rc<HostType>> {
        self.by_name.get(name).map(Rc::clone)
    }

    /// Looks a host type up by the Rust type it adapts.
    #[must_use]
    pub fn by_id(&self, id: TypeId) -> Option<Rc<HostType>> {
        self.by_id.get(&id).map(Rc::clone)
    }

    /// The language type name a Rust type corresponds to: a primitive
    /// name, or the name a host type was registered under.
    #[must_use]
    pub fn type_name_for(&self, id: TypeId) -> Option<String> {
        primitive_name_for(id).map(str::to_string)
                              .or_else(|| self.by_id.get(&id).map(|ty| ty.name().to_string()))
    }

    /// Every registered type, for seeding the parser's root scope.
    pub fn iter(&self) -> impl Iterator<Item = &Rc<HostType>> {
        self.by_name.values()
    }
}

/// Conversion from a language [`Value`] into a typed host parameter.
///
/// A single blanket implementation covers both directions of the host
/// boundary: the primitive Rust types convert (numerics C-style) out of
/// [`Primitive`] values, and any registered host type is extracted from a
/// host value by downcast and clone.
pub trait FromValue: Sized + 'static {
    /// Extracts `Self` from a value, or reports the mismatch. Errors
    /// carry no location; the evaluator patches in the call site.
    fn from_value(value: &Value) -> Result<Self, RuntimeError>;
}

impl<T: Any + Clone> FromValue for T {
    fn from_value(value: &Value) -> Result<Self, RuntimeError> {
        match value {
            Value::Primitive(p) => {
                if let Some(any) = p.clone_into_any(TypeId::of::<T>()) {
                    return Ok(*any.downcast::<T>().expect("checked type id"));
                }
            },
            Value::Host(host) => {
                if let Some(concrete) = host.data.borrow().downcast_ref::<T>() {
                    return Ok(concrete.clone());
                }
            },
            Value::Aggregate(_) => {},
        }

        Err(RuntimeError::TypeMismatch { expected: expected_name::<T>(),
                                         found:    value.type_name(),
                                         location: Location::default(), })
    }
}

/// Conversion of a typed host result back into a language [`Value`].
///
/// Primitive Rust types become primitives; anything else must have been
/// registered through the binder, which is what the registry parameter
/// resolves.
pub trait IntoValue: 'static {
    /// Lifts `self` into a value.
    fn into_value(self, registry: &HostRegistry) -> Result<Value, RuntimeError>;
}

impl<T: Any + Clone> IntoValue for T {
    fn into_value(self, registry: &HostRegistry) -> Result<Value, RuntimeError> {
        let any: AnyBox = Box::new(self);

        macro_rules! unbox {
            ($any:ident, $ty:ty, $make:expr) => {
                let $any = match $any.downcast::<$ty>() {
                    Ok(v) => return Ok(Value::Primitive($make(*v))),
                    Err(other) => other,
                };
            };
        }

        unbox!(any, (), |()| Primitive::Void);
        unbox!(any, bool, Primitive::Bool);
        unbox!(any, char, Primitive::Char);
        unbox!(any, i64, Primitive::Int);
        unbox!(any, i8, Primitive::I8);
        unbox!(any, i16, Primitive::I16);
        unbox!(any, i32, Primitive::I32);
        unbox!(any, u8, Primitive::U8);
        unbox!(any, u16, Primitive::U16);
        unbox!(any, u32, Primitive::U32);
        unbox!(any, u64, Primitive::U64);
        unbox!(any, f32, Primitive::Float);
        unbox!(any, f64, Primitive::Double);
        unbox!(any, String, Primitive::Str);

        match registry.by_id(TypeId::of::<T>()) {
            Some(ty) => Ok(Value::Host(ty.wrap(any))),
            None => Err(RuntimeError::UnboundHostType { name:     std::any::type_name::<T>()
                                                                      .to_string(),
                                                        location: Location::default(), }),
        }
    }
}

/// Lifts what a host closure returned into the call result. The `Marker`
/// parameter distinguishes plain values from `Result`s so both return
/// styles are accepted without overlapping implementations.
pub trait IntoCallResult<Marker>: 'static {
    /// Produces the call's value or error.
    fn into_call_result(self, registry: &HostRegistry) -> Result<Value, RuntimeError>;
}

impl<T: IntoValue> IntoCallResult<T> for T {
    fn into_call_result(self, registry: &HostRegistry) -> Result<Value, RuntimeError> {
        self.into_value(registry)
    }
}

impl<T: IntoValue> IntoCallResult<T> for Result<T, RuntimeError> {
    fn into_call_result(self, registry: &HostRegistry) -> Result<Value, RuntimeError> {
        self?.into_value(registry)
    }
}

/// The language name to report when extraction of `T` fails.
fn expected_name<T: 'static>() -> String {
    primitive_name_for(TypeId::of::<T>()).map_or_else(|| std::any::type_name::<T>().to_string(),
                                                      str::to_string)
}

/// Checks an adapted call's argument count before extraction.
fn check_arity(args: &[Value], expected: usize) -> Result<(), RuntimeError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::ArgumentCountMismatch { expected,
                                                  found: args.len(),
                                                  location: Location::default(), })
    }
}

/// A host function adapted for calls from scripts.
pub struct HostFunction {
    /// The name the function was bound under.
    pub name: String,
    invoke:   Box<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>,
}

impl HostFunction {
    /// Wraps an erased invoker under a name.
    #[must_use]
    pub fn new(name: &str, invoke: Box<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>) -> Self {
        Self { name: name.to_string(),
               invoke }
    }

    /// Calls the function with already-evaluated arguments.
    pub fn invoke(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.invoke)(args)
    }
}

impl std::fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostFunction").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A Rust `Fn` usable as a free host function: up to four [`FromValue`]
/// parameters and a return type that is [`IntoValue`] or a `Result` of
/// one.
pub trait HostFn<Args, Ret>: 'static {
    /// Extracts arguments, calls the function, and lifts the result.
    fn call(&self, args: &[Value], registry: &HostRegistry) -> Result<Value, RuntimeError>;
}

impl<F, FR, Ret> HostFn<(), Ret> for F
    where F: Fn() -> FR + 'static,
          FR: IntoCallResult<Ret>,
          Ret: 'static
{
    fn call(&self, args: &[Value], registry: &HostRegistry) -> Result<Value, RuntimeError> {
        check_arity(args, 0)?;
        (self)().into_call_result(registry)
    }
}

macro_rules! impl_host_fn {
    ($count:expr; $($A:ident => $idx:tt),+) => {
        impl<F, FR, Ret, $($A),+> HostFn<($($A,)+), Ret> for F
            where F: Fn($($A),+) -> FR + 'static,
                  FR: IntoCallResult<Ret>,
                  Ret: 'static,
                  $($A: FromValue),+
        {
            fn call(&self, args: &[Value], registry: &HostRegistry) -> Result<Value, RuntimeError> {
                check_arity(args, $count)?;
                (self)($($A::from_value(&args[$idx])?),+).into_call_result(registry)
            }
        }
    };
}

impl_host_fn!(1; A0 => 0);
impl_host_fn!(2; A0 => 0, A1 => 1);
impl_host_fn!(3; A0 => 0, A1 => 1, A2 => 2);
impl_host_fn!(4; A0 => 0, A1 => 1, A2 => 2, A3 => 3);

/// A Rust `Fn` usable as a constructor overload for a bound type: one to
/// four [`FromValue`] parameters producing the host value.
pub trait CtorFn<Args, T>: 'static {
    /// The language type names keying this overload, resolved against the
    /// registry. `None` when a parameter type was never bound.
    fn param_keys(registry: &HostRegistry) -> Option<Vec<String>>;

    /// Builds the host value from evaluated arguments.
    fn build(&self, args: &[Value]) -> Result<T, RuntimeError>;
}

macro_rules! impl_ctor_fn {
    ($count:expr; $($A:ident => $idx:tt),+) => {
        impl<F, T, $($A),+> CtorFn<($($A,)+), T> for F
            where F: Fn($($A),+) -> T + 'static,
                  T: 'static,
                  $($A: FromValue),+
        {
            fn param_keys(registry: &HostRegistry) -> Option<Vec<String>> {
                Some(vec![$(registry.type_name_for(TypeId::of::<$A>())?),+])
            }

            fn build(&self, args: &[Value]) -> Result<T, RuntimeError> {
                check_arity(args, $count)?;
                Ok((self)($($A::from_value(&args[$idx])?),+))
            }
        }
    };
}

impl_ctor_fn!(1; A0 => 0);
impl_ctor_fn!(2; A0 => 0, A1 => 1);
impl_ctor_fn!(3; A0 => 0, A1 => 1, A2 => 2);
impl_ctor_fn!(4; A0 => 0, A1 => 1, A2 => 2, A3 => 3);

/// A Rust `Fn` usable as a method of a bound type: a `&mut T` receiver,
/// up to four [`FromValue`] parameters, and an [`IntoCallResult`] return.
pub trait MethodFn<T, Args, Ret>: 'static {
    /// Extracts arguments, calls the method on the receiver, and lifts
    /// the result.
    fn call(&self,
            receiver: &mut T,
            args: &[Value],
            registry: &HostRegistry)
            -> Result<Value, RuntimeError>;
}

impl<F, FR, Ret, T> MethodFn<T, (), Ret> for F
    where F: Fn(&mut T) -> FR + 'static,
          FR: IntoCallResult<Ret>,
          Ret: 'static,
          T: 'static
{
    fn call(&self,
            receiver: &mut T,
            args: &[Value],
            registry: &HostRegistry)
            -> Result<Value, RuntimeError> {
        check_arity(args, 0)?;
        (self)(receiver).into_call_result(registry)
    }
}

macro_rules! impl_method_fn {
    ($count:expr; $($A:ident => $idx:tt),+) => {
        impl<F, FR, Ret, T, $($A),+> MethodFn<T, ($($A,)+), Ret> for F
            where F: Fn(&mut T, $($A),+) -> FR + 'static,
                  FR: IntoCallResult<Ret>,
                  Ret: 'static,
                  T: 'static,
                  $($A: FromValue),+
        {
            fn call(&self,
                    receiver: &mut T,
                    args: &[Value],
                    registry: &HostRegistry)
                    -> Result<Value, RuntimeError> {
                check_arity(args, $count)?;
                (self)(receiver, $($A::from_value(&args[$idx])?),+).into_call_result(registry)
            }
        }
    };
}

impl_method_fn!(1; A0 => 0);
impl_method_fn!(2; A0 => 0, A1 => 1);
impl_method_fn!(3; A0 => 0, A1 => 1, A2 => 2);
impl_method_fn!(4; A0 => 0, A1 => 1, A2 => 2, A3 => 3);

/// Builder returned by [`Compiler::bind_type`](crate::Compiler::bind_type).
///
/// Chain constructor, field, method and indexer registrations; the
/// finished type commits to the registry when the binder is dropped at
/// the end of the binding statement.
pub struct TypeBinder<T: Default + Clone + 'static> {
    registry: Rc<RefCell<HostRegistry>>,
    ty:       Option<HostType>,
    marker:   PhantomData<T>,
}

impl<T: Default + Clone + 'static> TypeBinder<T> {
    /// Starts a registration of `T` under `name`.
    #[must_use]
    pub(crate) fn new(registry: Rc<RefCell<HostRegistry>>, name: &str) -> Self {
        Self { registry,
               ty: Some(HostType::new::<T>(name)),
               marker: PhantomData }
    }

    fn ty_mut(&mut self) -> &mut HostType {
        self.ty.as_mut().expect("binder still open")
    }

    /// Registers a constructor overload. The overload is keyed by the
    /// language type names of the closure's parameters; a call site picks
    /// the overload whose key matches its argument types.
    ///
    /// # Panics
    /// Panics if a parameter type was never bound to a language name.
    #[must_use]
    pub fn ctor<Args, F>(mut self, f: F) -> Self
        where F: CtorFn<Args, T>
    {
        let keys = <F as CtorFn<Args, T>>::param_keys(&self.registry.borrow())
            .expect("constructor parameter types must be primitives or bound host types");

        let build = Box::new(move |args: &[Value]| -> Result<AnyBox, RuntimeError> {
            let data: AnyBox = Box::new(f.build(args)?);
            Ok(data)
        });

        self.ty_mut().constructors.push(Constructor { param_types: keys,
                                                      build });
        self
    }

    /// Registers a readable and writable field through a projection to
    /// it, e.g. `.field("x", |v: &mut Vec3| &mut v.x)`.
    #[must_use]
    pub fn field<M, P>(mut self, name: &str, projection: P) -> Self
        where M: FromValue + IntoValue + Clone,
              P: Fn(&mut T) -> &mut M + 'static
    {
        let projection = Rc::new(projection);

        let get = {
            let projection = Rc::clone(&projection);
            let registry = Rc::clone(&self.registry);
            Box::new(move |any: &mut dyn Any| -> Result<Value, RuntimeError> {
                let receiver = any.downcast_mut::<T>().expect("host value type");
                (*projection)(receiver).clone().into_value(&registry.borrow())
            })
        };

        let set = Box::new(move |any: &mut dyn Any, value: &Value| -> Result<(), RuntimeError> {
            let receiver = any.downcast_mut::<T>().expect("host value type");
            *(*projection)(receiver) = M::from_value(value)?;
            Ok(())
        });

        self.ty_mut().fields.insert(name.to_string(), FieldAccessor { get, set });
        self
    }

    /// Registers a method, e.g.
    /// `.method("push", |v: &mut Buffer, x: i64| v.items.push(x))`.
    #[must_use]
    pub fn method<Args, Ret, F>(mut self, name: &str, f: F) -> Self
        where F: MethodFn<T, Args, Ret>
    {
        let registry = Rc::clone(&self.registry);
        let invoke =
            Box::new(move |any: &mut dyn Any, args: &[Value]| -> Result<Value, RuntimeError> {
                let receiver = any.downcast_mut::<T>().expect("host value type");
                f.call(receiver, args, &registry.borrow())
            });

        self.ty_mut().methods.insert(name.to_string(), HostMethod { invoke });
        self
    }

    /// Registers integer indexing. The closures see the receiver and the
    /// index and report range violations themselves, which is where the
    /// valid length is known.
    #[must_use]
    pub fn indexer<M, G, S>(mut self, get: G, set: S) -> Self
        where M: FromValue + IntoValue,
              G: Fn(&T, i64) -> Result<M, RuntimeError> + 'static,
              S: Fn(&mut T, i64, M) -> Result<(), RuntimeError> + 'static
    {
        let registry = Rc::clone(&self.registry);
        let get = Box::new(move |any: &dyn Any, index: i64| -> Result<Value, RuntimeError> {
            let receiver = any.downcast_ref::<T>().expect("host value type");
            get(receiver, index)?.into_value(&registry.borrow())
        });

        let set =
            Box::new(move |any: &mut dyn Any, index: i64, value: &Value| -> Result<(),
                                                                                   RuntimeError> {
                let receiver = any.downcast_mut::<T>().expect("host value type");
                set(receiver, index, M::from_value(value)?)
            });

        self.ty_mut().indexer = Some(Indexer { get, set });
        self
    }
}

impl<T: Default + Clone + 'static> Drop for TypeBinder<T> {
    fn drop(&mut self) {
        if let Some(ty) = self.ty.take() {
            self.registry.borrow_mut().insert(TypeId::of::<T>(), Rc::new(ty));
        }
    }
}
