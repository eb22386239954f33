//! Normalized, language-agnostic metadata model: namespaces, classes, methods.
//!
//! Adapters populate a [`Namespace`] per file; the aggregator merges fragments
//! sharing a name. Everything here is additive: nothing is ever removed.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::{AnalysisError, Result};

/// A named, optionally typed slot: a class attribute or a method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedName {
    pub name: String,
    /// Declared type text, empty when the language or adapter cannot recover it.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedName {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }
}

pub type Attribute = TypedName;
pub type Parameter = TypedName;

/// One method-like member of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// Call-site text as written; qualified in place by the reference resolver.
    pub invoked_methods: Vec<String>,
}

impl Method {
    pub fn new(name: impl Into<String>, parameters: Vec<Parameter>, invoked_methods: Vec<String>) -> Self {
        Self {
            name: name.into(),
            parameters,
            invoked_methods,
        }
    }
}

/// One type declaration (class, interface, object, trait...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassMetadata {
    #[serde(skip)]
    pub name: String,
    pub file_path: Option<String>,
    pub stereotypes: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub methods: Vec<Method>,
    /// Raw invocation strings recorded by the resolver. Not deduplicated.
    #[serde(skip)]
    pub dependencies: Vec<String>,
}

impl ClassMetadata {
    pub fn new(name: impl Into<String>, file_path: Option<&str>) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.map(str::to_string),
            stereotypes: Vec::new(),
            attributes: Vec::new(),
            methods: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn add_stereotype(&mut self, stereotype: impl Into<String>) {
        self.stereotypes.push(stereotype.into());
    }

    pub fn add_attribute(&mut self, name: impl Into<String>, type_name: impl Into<String>) {
        self.attributes.push(TypedName::new(name, type_name));
    }

    pub fn add_method(&mut self, method: Method) {
        self.methods.push(method);
    }

    pub fn add_dependency(&mut self, dependency: impl Into<String>) {
        self.dependencies.push(dependency.into());
    }
}

/// A logical package/module grouping classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Namespace {
    /// May be empty for files without a package declaration.
    pub name: String,
    pub imports: BTreeSet<String>,
    pub classes: BTreeMap<String, ClassMetadata>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_import(&mut self, import: impl Into<String>) {
        self.imports.insert(import.into());
    }

    pub fn add_imports<I, S>(&mut self, imports: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports.extend(imports.into_iter().map(Into::into));
    }

    /// Register a class. Re-registering an existing name is a no-op.
    pub fn add_class(&mut self, class_name: &str, file_path: Option<&str>) -> &mut ClassMetadata {
        self.classes
            .entry(class_name.to_string())
            .or_insert_with(|| ClassMetadata::new(class_name, file_path))
    }

    pub fn get_class(&self, class_name: &str) -> Option<&ClassMetadata> {
        self.classes.get(class_name)
    }

    fn registered_class(&mut self, class_name: &str) -> Result<&mut ClassMetadata> {
        match self.classes.get_mut(class_name) {
            Some(class) => Ok(class),
            None => Err(AnalysisError::UnknownClass {
                namespace: self.name.clone(),
                class: class_name.to_string(),
            }),
        }
    }

    pub fn add_class_attribute(&mut self, class_name: &str, name: &str, type_name: &str) -> Result<()> {
        self.registered_class(class_name)?.add_attribute(name, type_name);
        Ok(())
    }

    pub fn add_class_method(&mut self, class_name: &str, method: Method) -> Result<()> {
        self.registered_class(class_name)?.add_method(method);
        Ok(())
    }

    pub fn add_class_stereotype(&mut self, class_name: &str, stereotype: &str) -> Result<()> {
        self.registered_class(class_name)?.add_stereotype(stereotype);
        Ok(())
    }

    /// Merge a same-named fragment into this namespace.
    ///
    /// Imports are unioned. A class already present gets the other fragment's
    /// attributes and methods appended (no dedup); new classes are inserted as-is.
    pub fn merge(&mut self, other: Namespace) -> Result<()> {
        if self.name != other.name {
            return Err(AnalysisError::NamespaceMismatch {
                expected: self.name.clone(),
                found: other.name,
            });
        }

        self.imports.extend(other.imports);

        for (class_name, incoming) in other.classes {
            match self.classes.get_mut(&class_name) {
                Some(existing) => {
                    existing.attributes.extend(incoming.attributes);
                    existing.methods.extend(incoming.methods);
                }
                None => {
                    self.classes.insert(class_name, incoming);
                }
            }
        }
        Ok(())
    }

    pub fn method_count(&self) -> usize {
        self.classes.values().map(|c| c.methods.len()).sum()
    }
}
