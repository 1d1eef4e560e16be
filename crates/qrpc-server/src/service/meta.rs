use qrpc_common::{Args, ServiceError};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Declared type of a parameter, used to coerce incoming values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Bool,
    Int,
    Float,
    String,
    /// Any JSON value, passed through untouched
    Value,
    /// The call's parameter multi-map
    Params,
    /// A deferred-response handle, always injected by the dispatcher
    Callback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Value,
}

/// Declarative metadata attached to a service, a method or a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// Route mapping; the first non-empty path is used
    RequestMapping(Vec<String>),
    Name(String),
    Service(String),
    ServiceMethod(String),
    /// Binds a parameter to a named call parameter
    RequestParam {
        name: String,
        required: bool,
        default_value: Option<String>,
    },
    /// Binds a parameter to a named path segment
    PathVariable(String),
}

impl Annotation {
    pub fn request_param(name: impl Into<String>, required: bool) -> Self {
        Annotation::RequestParam {
            name: name.into(),
            required,
            default_value: None,
        }
    }

    pub fn request_param_or(name: impl Into<String>, default_value: impl Into<String>) -> Self {
        Annotation::RequestParam {
            name: name.into(),
            required: false,
            default_value: Some(default_value.into()),
        }
    }
}

/// Type and annotations of one method parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamMeta {
    pub type_tag: TypeTag,
    pub annotations: Vec<Annotation>,
}

impl ParamMeta {
    pub fn new(type_tag: TypeTag) -> Self {
        Self {
            type_tag,
            annotations: Vec::new(),
        }
    }

    pub fn is_callback(&self) -> bool {
        self.type_tag == TypeTag::Callback
    }

    /// Logical path-variable name from the first non-empty `Name` or
    /// `PathVariable` annotation.
    pub fn path_variable_name(&self) -> Option<&str> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Name(name) | Annotation::PathVariable(name) if !name.is_empty() => {
                Some(name.as_str())
            }
            _ => None,
        })
    }
}

pub type Handler<S> = Arc<dyn Fn(&mut S, Args) -> Result<Value, ServiceError> + Send + Sync>;

/// An invokable method of a service of type `S`.
pub struct MethodAccess<S> {
    name: String,
    public: bool,
    annotations: Vec<Annotation>,
    params: Vec<ParamMeta>,
    return_type: ReturnType,
    handler: Handler<S>,
}

impl<S> MethodAccess<S> {
    /// A public method returning a value, with no parameters declared yet.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut S, Args) -> Result<Value, ServiceError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            public: true,
            annotations: Vec::new(),
            params: Vec::new(),
            return_type: ReturnType::Value,
            handler: Arc::new(handler),
        }
    }

    pub fn param(mut self, type_tag: TypeTag) -> Self {
        self.params.push(ParamMeta::new(type_tag));
        self
    }

    pub fn annotated_param(mut self, type_tag: TypeTag, annotation: Annotation) -> Self {
        self.params.push(ParamMeta {
            type_tag,
            annotations: vec![annotation],
        });
        self
    }

    pub fn param_meta(mut self, meta: ParamMeta) -> Self {
        self.params.push(meta);
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn returns_void(mut self) -> Self {
        self.return_type = ReturnType::Void;
        self
    }

    pub fn private(mut self) -> Self {
        self.public = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn params(&self) -> &[ParamMeta] {
        &self.params
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn type_tag(&self, index: usize) -> Option<TypeTag> {
        self.params.get(index).map(|p| p.type_tag)
    }

    pub fn return_type(&self) -> ReturnType {
        self.return_type
    }

    pub fn invoke(&self, service: &mut S, args: Args) -> Result<Value, ServiceError> {
        (self.handler)(service, args)
    }
}

impl<S> fmt::Debug for MethodAccess<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodAccess")
            .field("name", &self.name)
            .field("public", &self.public)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .finish()
    }
}

/// Name, annotations and methods of a service type.
pub struct ClassMeta<S> {
    name: String,
    annotations: Vec<Annotation>,
    methods: Vec<Arc<MethodAccess<S>>>,
}

impl<S> ClassMeta<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotations: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn method(mut self, method: MethodAccess<S>) -> Self {
        self.methods.push(Arc::new(method));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn methods(&self) -> &[Arc<MethodAccess<S>>] {
        &self.methods
    }

    /// First method declared under `name`.
    pub fn find(&self, name: &str) -> Option<&Arc<MethodAccess<S>>> {
        self.methods.iter().find(|m| m.name() == name)
    }
}

impl<S> fmt::Debug for ClassMeta<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassMeta")
            .field("name", &self.name)
            .field("annotations", &self.annotations)
            .field("methods", &self.methods)
            .finish()
    }
}
