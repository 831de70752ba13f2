use std::rc::Rc;

use indexmap::IndexMap;

use crate::{
    ast::{FunctionDef, StructDef},
    interpreter::value::core::Value,
};

/// The state behind one struct instance.
///
/// Members keep declaration order; the method table is the one the struct
/// declaration produced, shared by every instance. A method call resolves
/// bare member names against the receiver's state, so two copies of an
/// aggregate never observe each other.
#[derive(Debug)]
pub struct AggregateState {
    /// The declared struct name.
    pub type_name: String,
    /// Member values, in declaration order.
    pub members:   IndexMap<String, Value>,
    /// The struct's methods, shared across instances.
    pub methods:   Rc<IndexMap<String, Rc<FunctionDef>>>,
}

impl AggregateState {
    /// Builds the zero instance of a struct: every member takes its own
    /// type's zero value.
    #[must_use]
    pub fn zero_of(def: &StructDef) -> Self {
        Self { type_name: def.name.clone(),
               members:   def.members
                             .iter()
                             .map(|(name, ty)| (name.clone(), ty.zero()))
                             .collect(),
               methods:   Rc::clone(&def.methods), }
    }

    /// Copies the state member by member. The method table stays shared.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self { type_name: self.type_name.clone(),
               members:   self.members
                              .iter()
                              .map(|(name, value)| (name.clone(), value.deep_copy()))
                              .collect(),
               methods:   Rc::clone(&self.methods), }
    }

    /// Looks up a method by name.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<Rc<FunctionDef>> {
        self.methods.get(name).map(Rc::clone)
    }
}
