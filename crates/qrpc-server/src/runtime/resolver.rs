use std::sync::Arc;

use qrpc_common::Fault;

use super::table::{BindingEntry, BindingTable};

/// Outcome of looking up a call address.
#[derive(Debug)]
pub enum Resolution<S> {
    /// The address is a key of the table
    Exact(Arc<BindingEntry<S>>),
    /// The address extends a key; `remainder` holds the trailing segments
    Prefix {
        entry: Arc<BindingEntry<S>>,
        remainder: Vec<String>,
    },
}

/// Resolves a normalized address: exact key first, then the longest key
/// that is a whole-segment prefix of it.
///
/// `svc/add` matches `svc/add/1/2` but not `svc/addition`.
pub fn resolve<S>(table: &BindingTable<S>, address: &str) -> Result<Resolution<S>, Fault> {
    if let Some(entry) = table.get(address) {
        return Ok(Resolution::Exact(Arc::clone(entry)));
    }

    // Segment prefixes, longest first
    let mut end = address.len();
    while let Some(cut) = address[..end].rfind('/') {
        end = cut;
        let candidate = &address[..end];
        if let Some(entry) = table.get(candidate) {
            tracing::trace!("Address {} resolved by prefix {}", address, candidate);
            return Ok(Resolution::Prefix {
                entry: Arc::clone(entry),
                remainder: address[end + 1..].split('/').map(str::to_string).collect(),
            });
        }
    }

    Err(Fault::MethodNotFound(address.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{Annotation, ClassMeta, MethodAccess};
    use serde_json::json;

    #[derive(Debug)]
    struct Svc;

    fn table() -> BindingTable<Svc> {
        let meta = ClassMeta::new("Svc")
            .method(MethodAccess::new("add", |_: &mut Svc, _| Ok(json!(0))))
            .method(MethodAccess::new("item", |_: &mut Svc, _| Ok(json!(0))))
            .method(
                MethodAccess::new("deep", |_: &mut Svc, _| Ok(json!(0)))
                    .annotate(Annotation::Name("item/deep".into())),
            )
            .method(MethodAccess::new("add-x", |_: &mut Svc, _| Ok(json!(0))));
        BindingTable::build(&meta, "svc")
    }

    fn prefix(resolution: Resolution<Svc>) -> (String, Vec<String>) {
        match resolution {
            Resolution::Prefix { entry, remainder } => (entry.binding.key().to_string(), remainder),
            Resolution::Exact(entry) => panic!("unexpected exact match {}", entry.binding.key()),
        }
    }

    #[test]
    fn test_exact() {
        let table = table();
        assert!(matches!(resolve(&table, "svc/add").unwrap(), Resolution::Exact(_)));
    }

    #[test]
    fn test_prefix_with_remainder() {
        let table = table();
        let (key, remainder) = prefix(resolve(&table, "svc/add/1/2").unwrap());
        assert_eq!(key, "svc/add");
        assert_eq!(remainder, vec!["1", "2"]);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = table();
        let (key, remainder) = prefix(resolve(&table, "svc/item/deep/7").unwrap());
        assert_eq!(key, "svc/item/deep");
        assert_eq!(remainder, vec!["7"]);

        let (key, _) = prefix(resolve(&table, "svc/item/other").unwrap());
        assert_eq!(key, "svc/item");
    }

    #[test]
    fn test_prefix_respects_segment_boundaries() {
        let table = table();
        assert_eq!(
            resolve(&table, "svc/addition").unwrap_err(),
            Fault::MethodNotFound("svc/addition".into())
        );
        // "svc/add-x" sorts between "svc/add" and "svc/add/..."
        let (key, _) = prefix(resolve(&table, "svc/add/9").unwrap());
        assert_eq!(key, "svc/add");
    }

    #[test]
    fn test_prefix_among_many_siblings() {
        let mut meta = ClassMeta::new("Svc")
            .method(MethodAccess::new("add", |_: &mut Svc, _| Ok(json!(0))));
        for i in 0..500 {
            meta = meta.method(
                MethodAccess::new("sibling", |_: &mut Svc, _| Ok(json!(0)))
                    .annotate(Annotation::Name(format!("add/{:03}", i))),
            );
        }
        let table = BindingTable::build(&meta, "svc");

        let (key, remainder) = prefix(resolve(&table, "svc/add/999/x").unwrap());
        assert_eq!(key, "svc/add");
        assert_eq!(remainder, vec!["999", "x"]);

        let (key, remainder) = prefix(resolve(&table, "svc/add/042/x").unwrap());
        assert_eq!(key, "svc/add/042");
        assert_eq!(remainder, vec!["x"]);
    }

    #[test]
    fn test_unknown_address() {
        let table = table();
        assert!(matches!(resolve(&table, "other/add"), Err(Fault::MethodNotFound(_))));
        assert!(matches!(resolve(&table, ""), Err(Fault::MethodNotFound(_))));
    }
}
