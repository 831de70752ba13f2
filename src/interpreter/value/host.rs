use std::{any::Any, cell::RefCell, collections::HashMap, rc::Rc};

use crate::{error::RuntimeError, interpreter::value::core::Value};

/// An erased host datum.
pub type AnyBox = Box<dyn Any>;

/// One registered constructor overload, keyed by the language type names
/// of its parameters. Dispatch at a call site compares the argument type
/// names against `param_types`.
pub struct Constructor {
    /// The language type name of each parameter, in order.
    pub param_types: Vec<String>,
    /// Builds the host datum from already-evaluated arguments.
    pub build:       Box<dyn Fn(&[Value]) -> Result<AnyBox, RuntimeError>>,
}

/// A read/write accessor for one field of a host type.
pub struct FieldAccessor {
    /// Reads the field as a language value.
    pub get: Box<dyn Fn(&mut dyn Any) -> Result<Value, RuntimeError>>,
    /// Writes the field from a language value.
    pub set: Box<dyn Fn(&mut dyn Any, &Value) -> Result<(), RuntimeError>>,
}

/// An adapted host method.
pub struct HostMethod {
    /// Invokes the method on the receiver with evaluated arguments.
    pub invoke: Box<dyn Fn(&mut dyn Any, &[Value]) -> Result<Value, RuntimeError>>,
}

/// Integer indexing support for a host type. Out-of-range accesses are
/// reported by the host closures themselves, which is where the length is
/// known.
pub struct Indexer {
    /// Reads the element at an index.
    pub get: Box<dyn Fn(&dyn Any, i64) -> Result<Value, RuntimeError>>,
    /// Writes the element at an index.
    pub set: Box<dyn Fn(&mut dyn Any, i64, &Value) -> Result<(), RuntimeError>>,
}

/// Everything the interpreter knows about one host-registered type: how
/// to default-construct and clone its values, plus the constructors,
/// field accessors, methods and indexer the host bound.
pub struct HostType {
    name:         String,
    make_default: Box<dyn Fn() -> AnyBox>,
    clone_value:  Box<dyn Fn(&dyn Any) -> AnyBox>,
    /// Registered constructor overloads.
    pub constructors: Vec<Constructor>,
    /// Field accessors by member name.
    pub fields:       HashMap<String, FieldAccessor>,
    /// Adapted methods by name.
    pub methods:      HashMap<String, HostMethod>,
    /// Indexing support, if registered.
    pub indexer:      Option<Indexer>,
}

impl HostType {
    /// Starts an empty registration for `T` under the given language
    /// name. The binder fills in constructors, fields and methods.
    #[must_use]
    pub fn new<T: Default + Clone + 'static>(name: &str) -> Self {
        Self { name:         name.to_string(),
               make_default: Box::new(|| Box::new(T::default()) as AnyBox),
               clone_value:  Box::new(|any: &dyn Any| {
                                 let value = any.downcast_ref::<T>().expect("host value type");
                                 Box::new(value.clone()) as AnyBox
                             }),
               constructors: Vec::new(),
               fields:       HashMap::new(),
               methods:      HashMap::new(),
               indexer:      None, }
    }

    /// The language name this type was registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the zero value: the host type's `Default` instance.
    #[must_use]
    pub fn instantiate_default(self: &Rc<Self>) -> HostValue {
        self.wrap((self.make_default)())
    }

    /// Wraps an already-built host datum into a value of this type.
    #[must_use]
    pub fn wrap(self: &Rc<Self>, data: AnyBox) -> HostValue {
        HostValue { ty:   Rc::clone(self),
                    data: Rc::new(RefCell::new(data)), }
    }
}

impl std::fmt::Debug for HostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostType").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A host datum flowing through scripts: the registration that knows how
/// to operate on it, plus the reference-counted datum itself. `Clone` is
/// a shallow alias; value semantics go through [`HostValue::deep_copy`].
#[derive(Clone)]
pub struct HostValue {
    /// The registration for this value's type.
    pub ty:   Rc<HostType>,
    /// The opaque host datum.
    pub data: Rc<RefCell<AnyBox>>,
}

impl HostValue {
    /// Clones the underlying host datum through the registered cloner.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        let data = {
            let borrowed = self.data.borrow();
            (self.ty.clone_value)(&**borrowed)
        };
        Self { ty:   Rc::clone(&self.ty),
               data: Rc::new(RefCell::new(data)), }
    }
}

impl std::fmt::Debug for HostValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostValue").field("type", &self.ty.name).finish_non_exhaustive()
    }
}
