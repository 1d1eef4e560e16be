//! Address derivation and normalization.
//!
//! Every address stored in the binding table is normalized: `/`-delimited
//! with no leading or trailing slash.

use crate::service::Annotation;

/// Trims leading and trailing slashes.
pub fn normalize(address: &str) -> &str {
    address.trim_matches('/')
}

/// Joins address parts with exactly one `/` between non-empty parts.
pub fn compose(base: &str, path: &str) -> String {
    let base = normalize(base);
    let path = normalize(path);
    match (base.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}/{}", base, path),
    }
}

/// Address declared by annotations, checked in priority order: route
/// mapping, name, service, service method. Empty values count as absent.
pub fn address_from_annotations(annotations: &[Annotation]) -> Option<String> {
    let find = |pick: fn(&Annotation) -> Option<&str>| {
        annotations
            .iter()
            .filter_map(pick)
            .find(|address| !address.is_empty())
            .map(str::to_string)
    };

    find(|a| match a {
        Annotation::RequestMapping(paths) => paths.first().map(String::as_str),
        _ => None,
    })
    .or_else(|| {
        find(|a| match a {
            Annotation::Name(name) => Some(name.as_str()),
            _ => None,
        })
    })
    .or_else(|| {
        find(|a| match a {
            Annotation::Service(name) => Some(name.as_str()),
            _ => None,
        })
    })
    .or_else(|| {
        find(|a| match a {
            Annotation::ServiceMethod(name) => Some(name.as_str()),
            _ => None,
        })
    })
}

/// Effective base address of a service.
///
/// The explicit address wins, then the annotated one, then the class name in
/// lower camel case. A root address, when given, is prepended.
pub fn service_address(
    class_name: &str,
    annotations: &[Annotation],
    explicit: Option<&str>,
    root: Option<&str>,
) -> String {
    let service = explicit
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .or_else(|| address_from_annotations(annotations))
        .unwrap_or_else(|| camel_case_lower(class_name));

    match root.filter(|r| !normalize(r).is_empty()) {
        Some(root) => compose(root, &service),
        None => normalize(&service).to_string(),
    }
}

/// `TodoService` → `todoService`, `todo_service` → `todoService`.
pub fn camel_case_lower(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, word) in name
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if i == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    out
}
