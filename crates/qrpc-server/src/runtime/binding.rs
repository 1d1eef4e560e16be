//! Per-method binding descriptors.
//!
//! A [`MethodBinding`] records, for one registered address, how the slots of
//! a method are filled: from path segments (positional `{N}` or named
//! `{name}` template segments) or from named call parameters.

use crate::service::{Annotation, MethodAccess};

/// A parameter bound to a named call parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestParamBinding {
    pub param: usize,
    pub name: String,
    pub required: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamBinding {
    /// Parameter `param` takes the path segment at `uri_position`
    PositionalUri { param: usize, uri_position: usize },
    /// Parameters whose path-variable name is `name` take the segment at
    /// `uri_position`, or at their own index when the template is silent
    NamedPathVariable {
        name: String,
        uri_position: Option<usize>,
    },
    RequestParam(RequestParamBinding),
}

/// Bindings for one method at one address.
///
/// The address may be a template such as `calc/add/{0}/{1}`. Its lookup
/// [`key`](MethodBinding::key) is the literal prefix before the first
/// template segment, and template positions count path segments after it.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBinding {
    method: String,
    address: String,
    key: String,
    params: Vec<ParamBinding>,
}

impl MethodBinding {
    /// Parses `address` for template segments.
    pub fn new(method: impl Into<String>, address: impl Into<String>) -> Self {
        let address = address.into();
        let segments: Vec<&str> = address.split('/').collect();
        let first_template = segments.iter().position(|s| template_name(s).is_some());

        let mut params = Vec::new();
        let key = match first_template {
            Some(start) => {
                for (offset, segment) in segments[start..].iter().enumerate() {
                    let Some(name) = template_name(segment) else {
                        continue;
                    };
                    if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
                        if let Ok(param) = name.parse() {
                            params.push(ParamBinding::PositionalUri {
                                param,
                                uri_position: offset,
                            });
                            continue;
                        }
                    }
                    params.push(ParamBinding::NamedPathVariable {
                        name: name.to_string(),
                        uri_position: Some(offset),
                    });
                }
                segments[..start].join("/")
            }
            None => address.clone(),
        };

        Self {
            method: method.into(),
            address,
            key,
            params,
        }
    }

    /// Template bindings plus those declared by parameter annotations.
    pub fn for_method<S>(method: &MethodAccess<S>, address: impl Into<String>) -> Self {
        let mut binding = Self::new(method.name(), address);

        for (index, param) in method.params().iter().enumerate() {
            for annotation in &param.annotations {
                match annotation {
                    Annotation::RequestParam {
                        name,
                        required,
                        default_value,
                    } => binding.params.push(ParamBinding::RequestParam(RequestParamBinding {
                        param: index,
                        name: name.clone(),
                        required: *required,
                        default_value: default_value.clone(),
                    })),
                    Annotation::Name(name) | Annotation::PathVariable(name) if !name.is_empty() => {
                        if !binding.declares_path_variable(name) {
                            binding.params.push(ParamBinding::NamedPathVariable {
                                name: name.clone(),
                                uri_position: None,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }

        binding
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Full registered address, template segments included.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Literal part of the address used as the table key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn params(&self) -> &[ParamBinding] {
        &self.params
    }

    pub fn is_template(&self) -> bool {
        self.key.len() != self.address.len()
    }

    pub fn request_param_binding(&self, index: usize) -> Option<&RequestParamBinding> {
        self.params.iter().find_map(|p| match p {
            ParamBinding::RequestParam(rp) if rp.param == index => Some(rp),
            _ => None,
        })
    }

    pub fn has_request_param_bindings(&self) -> bool {
        self.params
            .iter()
            .any(|p| matches!(p, ParamBinding::RequestParam(_)))
    }

    pub fn has_named_bindings(&self) -> bool {
        self.params
            .iter()
            .any(|p| matches!(p, ParamBinding::NamedPathVariable { .. }))
    }

    /// Whether an exact hit binds from the call's named parameters.
    pub fn reads_call_params(&self) -> bool {
        self.has_request_param_bindings() || self.has_named_bindings()
    }

    pub fn declares_path_variable(&self, name: &str) -> bool {
        self.params.iter().any(|p| {
            matches!(p, ParamBinding::NamedPathVariable { name: n, .. } if n == name)
        })
    }
}

fn template_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{ParamMeta, TypeTag};
    use serde_json::Value;

    fn method(name: &str) -> MethodAccess<()> {
        MethodAccess::new(name, |_, _| Ok(Value::Null))
    }

    #[test]
    fn test_plain_address() {
        let binding = MethodBinding::new("add", "calc/add");
        assert_eq!(binding.key(), "calc/add");
        assert!(!binding.is_template());
        assert!(binding.params().is_empty());
    }

    #[test]
    fn test_positional_template() {
        let binding = MethodBinding::new("add", "calc/add/{0}/{1}");
        assert_eq!(binding.key(), "calc/add");
        assert_eq!(binding.address(), "calc/add/{0}/{1}");
        assert!(binding.is_template());
        assert_eq!(
            binding.params(),
            &[
                ParamBinding::PositionalUri { param: 0, uri_position: 0 },
                ParamBinding::PositionalUri { param: 1, uri_position: 1 },
            ]
        );
    }

    #[test]
    fn test_mixed_template_counts_literal_segments() {
        let binding = MethodBinding::new("get", "todo/{id}/items/{0}");
        assert_eq!(binding.key(), "todo");
        assert_eq!(
            binding.params(),
            &[
                ParamBinding::NamedPathVariable {
                    name: "id".into(),
                    uri_position: Some(0)
                },
                ParamBinding::PositionalUri { param: 0, uri_position: 2 },
            ]
        );
    }

    #[test]
    fn test_annotations_add_bindings() {
        let access = method("find")
            .annotated_param(TypeTag::String, Annotation::PathVariable("id".into()))
            .annotated_param(TypeTag::Int, Annotation::request_param("limit", true))
            .annotated_param(TypeTag::String, Annotation::request_param_or("sort", "asc"))
            .param_meta(ParamMeta {
                type_tag: TypeTag::String,
                annotations: vec![Annotation::Name("slug".into())],
            });

        let binding = MethodBinding::for_method(&access, "todo/{id}");
        assert!(binding.has_request_param_bindings());
        assert_eq!(binding.request_param_binding(0), None);
        assert_eq!(binding.request_param_binding(1).unwrap().name, "limit");
        assert!(binding.request_param_binding(1).unwrap().required);
        assert_eq!(
            binding.request_param_binding(2).unwrap().default_value.as_deref(),
            Some("asc")
        );

        // "id" comes from the template only once; "slug" has no template position
        let named: Vec<_> = binding
            .params()
            .iter()
            .filter(|p| matches!(p, ParamBinding::NamedPathVariable { .. }))
            .collect();
        assert_eq!(named.len(), 2);
        assert!(binding.params().contains(&ParamBinding::NamedPathVariable {
            name: "slug".into(),
            uri_position: None
        }));
    }

    #[test]
    fn test_empty_template_segment_is_unnamed() {
        let binding = MethodBinding::new("m", "svc/{}");
        assert_eq!(binding.key(), "svc");
        assert_eq!(
            binding.params(),
            &[ParamBinding::NamedPathVariable {
                name: String::new(),
                uri_position: Some(0)
            }]
        );
    }
}
