#[cfg(test)]
mod tests {
    use crate::demo::Calculator;
    use crate::{build_call, parse_param, routes, run_call};
    use qrpc_common::{Body, Call};
    use qrpc_server::{QueueConfig, ServiceConfig, ServiceMethodHandler};
    use serde_json::{json, Value};

    async fn call(call: Call) -> (Value, bool) {
        let output = run_call(&ServiceConfig::default(), QueueConfig::default(), call)
            .await
            .unwrap();
        (serde_json::from_str(&output.encoded).unwrap(), output.fatal)
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("a=1").unwrap(), ("a".to_string(), "1".to_string()));
        assert_eq!(parse_param("q=").unwrap(), ("q".to_string(), String::new()));
        assert_eq!(parse_param("k=a=b").unwrap().1, "a=b");
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=1").is_err());
    }

    #[test]
    fn test_build_call() {
        let call = build_call(
            Some("calc/divide"),
            None,
            Some("[1, 2]"),
            &["a=1".to_string(), "a=2".to_string()],
            "me",
        )
        .unwrap();
        assert_eq!(call.address, "calc/divide");
        assert!(call.name.is_empty());
        assert!(matches!(call.body, Body::Sequence(ref items) if items.len() == 2));
        assert_eq!(call.params.get_all("a").len(), 2);
        assert_eq!(call.return_address, "me");

        assert!(build_call(None, None, None, &[], "me").is_err());
        assert!(build_call(Some("a"), Some("b"), None, &[], "me").is_err());
        assert!(build_call(None, Some("add"), Some("{bad"), &[], "me").is_err());
    }

    #[test]
    fn test_routes_listing() {
        let lines = routes(&ServiceConfig::new().with_root_address("api")).unwrap();
        assert!(lines.iter().all(|l| l.starts_with("api/calc/")));
        assert!(lines
            .iter()
            .any(|l| l.starts_with("api/calc/add -> add [api/calc/add/{0}/{1}]")));
        assert!(lines
            .iter()
            .any(|l| l.contains("arg1 <- ?b (default 1)")));
    }

    #[test]
    fn test_demo_memory() {
        let mut handler = ServiceMethodHandler::new(Calculator::default(), &ServiceConfig::default()).unwrap();
        assert!(handler.dispatch(Call::to_address("calc/store").with_body(json!(2.5))).is_void());
        let response = handler.dispatch(Call::to_method("recall"));
        assert_eq!(response.value(), Some(&json!(2.5)));
    }

    #[tokio::test]
    async fn test_run_call_uri() {
        let (batch, fatal) = call(Call::to_address("calc/add/2/3").with_return_address("cli")).await;
        assert!(!fatal);
        assert_eq!(batch["return_address"], json!("cli"));
        assert_eq!(batch["responses"][0]["result"], json!(5));
    }

    #[tokio::test]
    async fn test_run_call_division_by_zero() {
        let (batch, fatal) = call(Call::to_address("calc/divide").with_param("a", "1").with_param("b", "0")).await;
        assert!(!fatal);
        assert_eq!(batch["responses"][0]["success"], json!(false));
        assert_eq!(batch["responses"][0]["error"], json!("division by zero"));
    }

    #[tokio::test]
    async fn test_run_call_missing_parameter_is_fatal() {
        let (batch, fatal) = call(Call::to_address("calc/divide")).await;
        assert!(fatal);
        assert_eq!(batch["responses"][0]["success"], json!(false));
    }

    #[tokio::test]
    async fn test_run_call_deferred_responses() {
        let (batch, _) = call(Call::to_address("calc/countdown/2")).await;
        let results: Vec<_> = batch["responses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["result"].clone())
            .collect();
        assert_eq!(results, vec![json!(2), json!(1), json!(0)]);
    }

    #[tokio::test]
    async fn test_run_call_countdown_from_param() {
        let (batch, fatal) = call(Call::to_address("calc/countdown").with_param("from", "1")).await;
        assert!(!fatal);
        let results: Vec<_> = batch["responses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["result"].clone())
            .collect();
        assert_eq!(results, vec![json!(1), json!(0)]);
    }

    #[tokio::test]
    async fn test_run_call_describe_params() {
        let (batch, _) = call(Call::to_method("describe").with_param("x", "1").with_param("x", "2")).await;
        assert_eq!(batch["responses"][0]["result"], json!({ "x": ["1", "2"] }));
    }
}
