//! Tests for the protocol module
//!
//! These tests verify call construction, ID generation, body handling,
//! responses and callbacks.

#[cfg(test)]
mod tests {
    use super::super::*;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_call_to_address() {
        let call = Call::to_address("calc/add").with_body(json!([1, 2]));
        assert!(call.name.is_empty());
        assert_eq!(call.address, "calc/add");
        match &call.body {
            Body::Sequence(items) => assert_eq!(items.len(), 2),
            other => panic!("Expected sequence body, got {:?}", other),
        }
    }

    #[test]
    fn test_call_to_method_with_params() {
        let call = Call::to_method("search")
            .with_param("q", "rust")
            .with_return_address("client-1");
        assert_eq!(call.name, "search");
        assert_eq!(call.params.get_first("q"), Some("rust"));
        assert_eq!(call.return_address, "client-1");
        assert!(call.body.is_empty());
    }

    #[test]
    fn test_call_id_uniqueness() {
        let ids: HashSet<_> = (0..1000).map(|_| Call::to_method("test").id).collect();
        assert_eq!(ids.len(), 1000, "All call IDs should be unique");
    }

    #[test]
    fn test_body_from_json() {
        assert!(matches!(Body::from(json!(null)), Body::Empty));
        assert!(matches!(Body::from(json!("x")), Body::Value(_)));
        assert!(matches!(Body::from(json!({"a": 1})), Body::Value(_)));
        assert!(matches!(Body::from(json!([1])), Body::Sequence(_)));
    }

    #[test]
    fn test_body_emptiness() {
        assert!(Body::Empty.is_empty());
        assert!(Body::from(json!("")).is_empty());
        assert!(!Body::from(json!("x")).is_empty());
        assert!(!Body::from(json!([])).is_empty());
    }

    #[test]
    fn test_body_to_value_masks_callbacks() {
        let body = Body::Sequence(vec![
            Arg::Callback(Callback::new(|_| {})),
            Arg::Value(json!(5)),
        ]);
        assert_eq!(body.to_value(), json!([null, 5]));
    }

    #[test]
    fn test_args_accessors() {
        let args = Args::new(vec![
            Arg::Value(json!(42)),
            Arg::Params(MultiMap::new().with("k", "v")),
            Arg::Callback(Callback::new(|_| {})),
        ]);
        assert_eq!(args.param::<i64>(0).unwrap(), 42);
        assert_eq!(args.value(1), Some(json!({"k": "v"})));
        assert_eq!(args.params(1).and_then(|p| p.get_first("k")), Some("v"));
        assert!(args.callback(2).is_some());
        assert!(args.value(2).is_none());
        assert!(args.param::<String>(0).is_err());
    }

    #[test]
    fn test_response_echoes_call() {
        let call = Arc::new(
            Call::to_method("add")
                .with_id(99)
                .with_return_address("client-7"),
        );
        let resp = Response::success(&call, json!({"sum": 3}));
        assert!(resp.is_success());
        assert_eq!(resp.id, 99);
        assert_eq!(resp.name, "add");
        assert_eq!(resp.return_address, "client-7");
        assert_eq!(resp.timestamp, call.timestamp);
        assert!(Arc::ptr_eq(resp.call.as_ref().unwrap(), &call));
    }

    #[test]
    fn test_response_fault() {
        let call = Arc::new(Call::to_address("svc/missing"));
        let resp = Response::fault(&call, Fault::MethodNotFound("svc/missing".into()));
        assert!(!resp.is_success());
        assert!(resp.value().is_none());
        assert_eq!(
            resp.error(),
            Some(&Fault::MethodNotFound("svc/missing".into()))
        );
    }

    #[test]
    fn test_void_is_shared() {
        let a = Response::void();
        let b = Response::void();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_void());

        let call = Arc::new(Call::to_method("x"));
        assert!(!Response::success(&call, json!(null)).is_void());
    }

    #[test]
    fn test_fault_fatality() {
        let config = Fault::from(ConfigFault::UnnamedPathVariable {
            method: "get".into(),
        });
        assert!(config.is_fatal());
        assert!(!Fault::MethodNotFound("x".into()).is_fatal());
        assert!(!Fault::from(ServiceError::new("boom")).is_fatal());
    }

    #[test]
    fn test_raised_fault_displays_original_message() {
        let fault = Fault::from(ServiceError::new("division by zero"));
        assert_eq!(fault.to_string(), "division by zero");
    }

    #[test]
    fn test_callback_delivers_every_completion() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback = Callback::new(move |result| sink.lock().unwrap().push(result));

        callback.accept(json!(1));
        callback.clone().accept(json!(2));
        callback.fail(ServiceError::new("late failure"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], Ok(json!(1)));
        assert_eq!(seen[1], Ok(json!(2)));
        assert_eq!(seen[2], Err(Fault::Raised(ServiceError::new("late failure"))));
    }
}
