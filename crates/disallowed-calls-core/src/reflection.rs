//! In-memory class model implementing the reflection seams.
//!
//! Stands in for the host analyzer when call sites come from a snapshot
//! file. Lookups follow PHP rules: class and method names are
//! case-insensitive, a method imported from a trait belongs to the class
//! using the trait, and an inherited method belongs to the ancestor that
//! declares it.

use crate::origin::{ClassInfo, MethodInfo, TypeInfo};
use crate::rule::normalize_identifier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A class or trait declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Fully qualified name (e.g., `Inheritance\Sub`).
    pub name: String,
    /// Parent class, if any.
    #[serde(default)]
    pub parent: Option<String>,
    /// Traits used by this class, in declaration order.
    #[serde(default)]
    pub traits: Vec<String>,
    /// Methods declared directly in the body.
    #[serde(default)]
    pub methods: Vec<String>,
}

impl ClassDef {
    /// Creates a declaration without parent, traits or methods.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the parent class.
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Adds a used trait.
    #[must_use]
    pub fn uses(mut self, trait_name: impl Into<String>) -> Self {
        self.traits.push(trait_name.into());
        self
    }

    /// Adds a declared method.
    #[must_use]
    pub fn method(mut self, name: impl Into<String>) -> Self {
        self.methods.push(name.into());
        self
    }

    fn declares(&self, method: &str) -> Option<&str> {
        self.methods
            .iter()
            .find(|m| m.eq_ignore_ascii_case(method))
            .map(String::as_str)
    }
}

/// Errors raised by class lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReflectionError {
    /// A referenced class, parent or trait is not in the table.
    #[error("class `{0}` not found")]
    ClassNotFound(String),

    /// The method is not declared anywhere in the hierarchy.
    #[error("method `{class}::{method}` not found")]
    MethodNotFound {
        /// Class the lookup started from.
        class: String,
        /// Requested method.
        method: String,
    },

    /// The hierarchy refers back to itself.
    #[error("circular class hierarchy at `{0}`")]
    CircularHierarchy(String),

    /// A method was looked up on a type that has no class.
    #[error("cannot look up `{0}` on a non-object type")]
    NotAnObject(String),
}

/// All known classes and traits, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    classes: HashMap<String, ClassDef>,
}

fn key(name: &str) -> String {
    normalize_identifier(name).to_ascii_lowercase()
}

impl ClassTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a declaration.
    pub fn insert(&mut self, mut def: ClassDef) {
        def.name = normalize_identifier(&def.name).to_string();
        self.classes.insert(key(&def.name), def);
    }

    /// Returns the number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Looks up a class or trait.
    ///
    /// # Errors
    ///
    /// Returns [`ReflectionError::ClassNotFound`] for unknown names.
    pub fn class(&self, name: &str) -> Result<ClassRef<'_>, ReflectionError> {
        self.classes
            .get(&key(name))
            .map(|def| ClassRef { table: self, def })
            .ok_or_else(|| ReflectionError::ClassNotFound(normalize_identifier(name).to_string()))
    }

    /// The object type of an explicit class reference (`Foo::bar()`) or
    /// a receiver inferred as `Foo`.
    #[must_use]
    pub fn object_type(&self, name: &str) -> ObjectType<'_> {
        let class = self.class(name).ok();
        let name = class.map_or_else(
            || normalize_identifier(name).to_string(),
            |c| c.def.name.clone(),
        );
        ObjectType { name, class }
    }

    /// The receiver type for an optional inferred class name; `None` means
    /// the host could not infer an object type.
    #[must_use]
    pub fn receiver(&self, name: Option<&str>) -> ReceiverType<'_> {
        match name {
            Some(name) => ReceiverType::Object(self.object_type(name)),
            None => ReceiverType::Unknown,
        }
    }
}

impl FromIterator<ClassDef> for ClassTable {
    fn from_iter<T: IntoIterator<Item = ClassDef>>(iter: T) -> Self {
        let mut table = Self::new();
        for def in iter {
            table.insert(def);
        }
        table
    }
}

/// A class or trait inside a [`ClassTable`].
#[derive(Debug, Clone, Copy)]
pub struct ClassRef<'a> {
    table: &'a ClassTable,
    def: &'a ClassDef,
}

impl<'a> ClassRef<'a> {
    /// Returns the underlying declaration.
    #[must_use]
    pub fn def(&self) -> &'a ClassDef {
        self.def
    }

    /// Finds the method and the class it belongs to, walking parents.
    ///
    /// # Errors
    ///
    /// Returns an error if a parent or trait is missing or the hierarchy is
    /// circular.
    pub fn find_method(
        &self,
        method: &str,
    ) -> Result<Option<MethodInfo<ClassRef<'a>>>, ReflectionError> {
        let mut visited: Vec<&'a str> = Vec::new();
        let mut current = *self;
        loop {
            let def: &'a ClassDef = current.def;
            if visited.contains(&def.name.as_str()) {
                return Err(ReflectionError::CircularHierarchy(def.name.clone()));
            }
            visited.push(def.name.as_str());

            let own = def.declares(method).map(str::to_string);
            let found = match own {
                Some(name) => Some(name),
                None => current.trait_method(method, &mut Vec::new())?,
            };
            if let Some(name) = found {
                debug!("{}::{} declared in {}", self.def.name, name, def.name);
                return Ok(Some(MethodInfo {
                    name,
                    declaring_class: current,
                }));
            }

            let table: &'a ClassTable = current.table;
            match &def.parent {
                Some(parent) => current = table.class(parent)?,
                None => return Ok(None),
            }
        }
    }

    /// Searches the traits used by this class, recursively.
    fn trait_method(
        &self,
        method: &str,
        path: &mut Vec<String>,
    ) -> Result<Option<String>, ReflectionError> {
        for trait_name in &self.def.traits {
            let used = self.table.class(trait_name)?;
            let trait_key = key(&used.def.name);
            if path.contains(&trait_key) {
                return Err(ReflectionError::CircularHierarchy(used.def.name.clone()));
            }
            if let Some(name) = used.def.declares(method) {
                return Ok(Some(name.to_string()));
            }
            path.push(trait_key);
            let nested = used.trait_method(method, path)?;
            path.pop();
            if nested.is_some() {
                return Ok(nested);
            }
        }
        Ok(None)
    }
}

impl ClassInfo for ClassRef<'_> {
    type Error = ReflectionError;

    fn display_name(&self) -> &str {
        &self.def.name
    }

    fn has_method(&self, method: &str) -> Result<bool, ReflectionError> {
        Ok(self.find_method(method)?.is_some())
    }

    fn traits(&self) -> Result<Vec<Self>, ReflectionError> {
        self.def
            .traits
            .iter()
            .map(|name| self.table.class(name))
            .collect()
    }
}

/// An object type, possibly of a class the table does not know.
#[derive(Debug, Clone)]
pub struct ObjectType<'a> {
    name: String,
    class: Option<ClassRef<'a>>,
}

impl<'a> TypeInfo for ObjectType<'a> {
    type Error = ReflectionError;
    type Class = ClassRef<'a>;

    fn can_call_methods(&self) -> bool {
        true
    }

    /// A broken hierarchy counts as "has the method" so that
    /// [`method`](TypeInfo::method) reports the lookup error.
    fn has_method(&self, method: &str) -> bool {
        self.class
            .is_some_and(|c| !matches!(c.find_method(method), Ok(None)))
    }

    fn class_name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn method(&self, method: &str) -> Result<MethodInfo<ClassRef<'a>>, ReflectionError> {
        let class = self
            .class
            .ok_or_else(|| ReflectionError::ClassNotFound(self.name.clone()))?;
        class
            .find_method(method)?
            .ok_or_else(|| ReflectionError::MethodNotFound {
                class: self.name.clone(),
                method: method.to_string(),
            })
    }
}

/// The inferred type of a method receiver.
#[derive(Debug, Clone)]
pub enum ReceiverType<'a> {
    /// An object of a named class.
    Object(ObjectType<'a>),
    /// The host could not infer an object type.
    Unknown,
}

impl<'a> TypeInfo for ReceiverType<'a> {
    type Error = ReflectionError;
    type Class = ClassRef<'a>;

    fn can_call_methods(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    fn has_method(&self, method: &str) -> bool {
        match self {
            Self::Object(object) => object.has_method(method),
            Self::Unknown => false,
        }
    }

    fn class_name(&self) -> Option<&str> {
        match self {
            Self::Object(object) => object.class_name(),
            Self::Unknown => None,
        }
    }

    fn method(&self, method: &str) -> Result<MethodInfo<ClassRef<'a>>, ReflectionError> {
        match self {
            Self::Object(object) => object.method(method),
            Self::Unknown => Err(ReflectionError::NotAnObject(method.to_string())),
        }
    }
}
