//! RPC dispatcher: resolves methods, converts parameters, invokes bindings and
//! shapes JSON-RPC responses.

use std::sync::Arc;

use barrister_idl::Contract;
use barrister_json_rpc::{IDL_METHOD, JsonRpcError, JsonRpcRequest, JsonRpcResponse};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::builder::ServerBuilder;
use crate::convert::Converter;
use crate::error::{ConvertError, RegistrationResult};
use crate::handler::{Handler, capitalize};
use crate::registry::HandlerRegistry;

/// Body returned if a response cannot be encoded at all
const ENCODE_FAILURE: &[u8] =
    br#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Unable to encode response"}}"#;

/// A contract plus its registered handlers.
///
/// Register through `&mut self` (or [`ServerBuilder`]) first, then share
/// behind an `Arc`; every dispatch method takes `&self`.
#[derive(Debug, Clone)]
pub struct Server {
    contract: Arc<Contract>,
    registry: HandlerRegistry,
}

impl Server {
    pub fn new(contract: impl Into<Arc<Contract>>) -> Self {
        let contract = contract.into();
        Self {
            registry: HandlerRegistry::new(Arc::clone(&contract)),
            contract,
        }
    }

    pub fn builder(contract: impl Into<Arc<Contract>>) -> ServerBuilder {
        ServerBuilder::new(contract)
    }

    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Verify and store a handler for `interface`
    pub fn register(&mut self, interface: &str, handler: Handler) -> RegistrationResult<()> {
        self.registry.register(interface, handler)
    }

    /// Dispatch `method` with positional `params`
    pub fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, JsonRpcError> {
        debug!(method = method, params = params.len(), "Dispatching call");

        let Some(function) = self.contract.method(method) else {
            return Err(JsonRpcError::method_not_found(format!(
                "Unsupported method: {method}"
            )));
        };

        let (interface, function_name) = parse_method(method);
        let handler = self.registry.get(interface).ok_or_else(|| {
            JsonRpcError::method_not_found(format!(
                "No handler registered for interface: {interface}"
            ))
        })?;
        let binding = handler.get(&function_name).ok_or_else(|| {
            JsonRpcError::method_not_found(format!(
                "Function {function_name} not found on handler {interface}"
            ))
        })?;

        let signature = binding.signature();
        for expected in [signature.params.len(), function.params.len()] {
            if params.len() != expected {
                return Err(JsonRpcError::invalid_params(format!(
                    "Method {method} expects {expected} params but was passed {}",
                    params.len()
                )));
            }
        }

        let converter = Converter::new(&self.contract);
        let mut args = Vec::with_capacity(params.len());
        for (i, ((field, repr), value)) in function
            .params
            .iter()
            .zip(&signature.params)
            .zip(&params)
            .enumerate()
        {
            let converted = converter
                .convert(field, repr, value, &format!("param[{i}]"))
                .map_err(|err| match err {
                    ConvertError::Mismatch { .. } => JsonRpcError::invalid_params(err.to_string()),
                    ConvertError::UnknownType { .. } => {
                        error!(method = method, error = %err, "IDL references an unknown type");
                        JsonRpcError::internal_error(err.to_string())
                    }
                })?;
            args.push(converted);
        }

        let slots = binding.invoke(args);
        let [result, rpc_error]: [Value; 2] = slots.try_into().map_err(|slots: Vec<Value>| {
            JsonRpcError::internal_error(format!(
                "Method {method} did not return 2 values. len(ret)={}",
                slots.len()
            ))
        })?;

        if rpc_error.is_null() {
            return Ok(result);
        }
        match serde_json::from_value::<JsonRpcError>(rpc_error.clone()) {
            Ok(err) => Err(err),
            Err(_) => Err(JsonRpcError::internal_error(format!(
                "Method {method} did not return JsonRpcError for last return val: {rpc_error}"
            ))),
        }
    }

    /// Handle one decoded request. `barrister-idl` answers with the contract
    /// elements without consulting the registry.
    pub fn invoke_one(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        if request.method == IDL_METHOD {
            let elements = Value::Array(self.contract.raw_elements().to_vec());
            return JsonRpcResponse::success(request.id, elements);
        }

        let params = request.positional_params();
        let outcome = self.call(&request.method, params);
        JsonRpcResponse::from_outcome(request.id, outcome)
    }

    /// Handle decoded requests in order, one response per request
    pub fn call_batch(&self, requests: Vec<JsonRpcRequest>) -> Vec<JsonRpcResponse> {
        debug!(size = requests.len(), "Dispatching batch");
        requests
            .into_iter()
            .map(|request| self.invoke_one(request))
            .collect()
    }

    /// Decode a single request or a batch from bytes, dispatch, and encode
    /// the response(s)
    pub fn invoke_json(&self, bytes: &[u8]) -> Vec<u8> {
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'[') => match serde_json::from_slice::<Vec<JsonRpcRequest>>(bytes) {
                Ok(requests) => encode(&self.call_batch(requests)),
                Err(e) => parse_error(&e.to_string()),
            },
            Some(b'{') => match serde_json::from_slice::<JsonRpcRequest>(bytes) {
                Ok(request) => encode(&self.invoke_one(request)),
                Err(e) => parse_error(&e.to_string()),
            },
            _ => parse_error("expected a JSON object or array"),
        }
    }
}

/// Split `Interface.function` into the interface and the capitalized
/// function name. Without a usable `.` the whole name is the interface.
pub fn parse_method(method: &str) -> (&str, String) {
    match method.find('.') {
        Some(pos) if pos + 1 < method.len() => (&method[..pos], capitalize(&method[pos + 1..])),
        _ => (method, String::new()),
    }
}

fn parse_error(reason: &str) -> Vec<u8> {
    warn!(reason = reason, "Rejecting undecodable request");
    let error = JsonRpcError::parse_error(format!("Unable to parse JSON: {reason}"));
    encode(&JsonRpcResponse::error(None, error))
}

fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).unwrap_or_else(|e| {
        error!(error = %e, "Failed to encode response");
        ENCODE_FAILURE.to_vec()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{DynamicFunction, Signature};
    use crate::repr::TypeRepr;
    use barrister_json_rpc::{RequestId, RequestParams, error_codes};
    use serde_json::json;
    use tracing_test::traced_test;

    fn conform() -> Contract {
        Contract::parse(include_bytes!("../../../tests/fixtures/conform.json")).unwrap()
    }

    fn echo_handler() -> Handler {
        Handler::new().function("echo", |s: String| {
            if s == "err" {
                Err(JsonRpcError::application(99, "Error!"))
            } else {
                Ok(Some(s))
            }
        })
    }

    fn any_function(params: usize, result: Value) -> DynamicFunction {
        DynamicFunction::new(
            Signature::new(vec![TypeRepr::Any; params], TypeRepr::Any),
            move |_| vec![result.clone(), Value::Null],
        )
    }

    fn a_handler() -> Handler {
        Handler::new()
            .function("add", |a: i64, b: i64| Ok::<_, JsonRpcError>(a + b))
            .function("calc", |nums: Vec<f64>, _op: String| {
                Ok::<_, JsonRpcError>(nums.iter().sum::<f64>())
            })
            .function("sqrt", |a: f64| Ok::<_, JsonRpcError>(a.sqrt()))
            .callable("repeat", any_function(1, json!({"status": "ok", "count": 0, "items": []})))
            .callable("say_hi", any_function(0, json!({"hi": "hi"})))
            .function("repeat_num", |num: i64, count: i64| {
                Ok::<_, JsonRpcError>(vec![num; count.max(0) as usize])
            })
            .callable("putPerson", any_function(1, json!("ok")))
    }

    fn server() -> Server {
        let mut server = Server::new(conform());
        server.register("A", a_handler()).unwrap();
        server.register("B", echo_handler()).unwrap();
        server
    }

    fn invoke(server: &Server, body: Value) -> Value {
        let bytes = server.invoke_json(&serde_json::to_vec(&body).unwrap());
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("B.echo"), ("B", "Echo".to_string()));
        assert_eq!(parse_method("A.say_hi"), ("A", "Say_hi".to_string()));
        assert_eq!(parse_method("nodot"), ("nodot", String::new()));
        assert_eq!(parse_method("trailing."), ("trailing.", String::new()));
        assert_eq!(parse_method("a.b.c"), ("a", "B.c".to_string()));
    }

    #[test]
    fn test_call_success() {
        let server = server();
        assert_eq!(server.call("B.echo", vec![json!("hi")]).unwrap(), json!("hi"));
        assert_eq!(server.call("A.add", vec![json!(2), json!(3.0)]).unwrap(), json!(5));
        assert_eq!(server.call("A.repeat_num", vec![json!(7), json!(2)]).unwrap(), json!([7, 7]));
    }

    #[test]
    fn test_unknown_method() {
        let err = server().call("UnknownIface.foo", vec![]).unwrap_err();
        assert_eq!(err.code, error_codes::METHOD_NOT_FOUND);
        assert_eq!(err.message, "Unsupported method: UnknownIface.foo");
    }

    #[test]
    fn test_interface_without_handler() {
        let mut server = Server::new(conform());
        server.register("A", a_handler()).unwrap();

        let err = server.call("B.echo", vec![json!("hi")]).unwrap_err();
        assert_eq!(err.code, error_codes::METHOD_NOT_FOUND);
        assert_eq!(err.message, "No handler registered for interface: B");
    }

    #[test]
    fn test_wrong_param_count() {
        let err = server().call("A.add", vec![json!(1)]).unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
        assert_eq!(err.message, "Method A.add expects 2 params but was passed 1");
    }

    #[test]
    fn test_bad_argument() {
        let err = server().call("B.echo", vec![json!(123)]).unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
        assert_eq!(err.message, "param[0]: expected string, got number");

        let err = server().call("A.add", vec![json!(1.5), json!(2)]).unwrap_err();
        assert_eq!(err.code, error_codes::INVALID_PARAMS);
    }

    #[test]
    fn test_handler_error_passthrough() {
        let err = server().call("B.echo", vec![json!("err")]).unwrap_err();
        assert_eq!(err, JsonRpcError::application(99, "Error!"));
    }

    #[test]
    fn test_malformed_error_slot() {
        let contract = conform();
        let mut server = Server::new(contract);
        let broken = DynamicFunction::new(
            Signature::new(vec![TypeRepr::String], TypeRepr::optional(TypeRepr::String)),
            |_| vec![Value::Null, json!("not an error object")],
        );
        server.register("B", Handler::new().callable("echo", broken)).unwrap();

        let err = server.call("B.echo", vec![json!("x")]).unwrap_err();
        assert_eq!(err.code, error_codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_single_request_roundtrip() {
        let response = invoke(
            &server(),
            json!({"jsonrpc": "2.0", "id": "abc", "method": "B.echo", "params": ["hi"]}),
        );
        assert_eq!(response, json!({"jsonrpc": "2.0", "id": "abc", "result": "hi"}));
    }

    #[test]
    fn test_non_array_params_are_single_argument() {
        let response = invoke(&server(), json!({"id": 1, "method": "B.echo", "params": "solo"}));
        assert_eq!(response["result"], "solo");

        let response = invoke(&server(), json!({"id": 2, "method": "B.echo", "params": null}));
        assert_eq!(response["error"]["code"], error_codes::INVALID_PARAMS);
        assert_eq!(response["error"]["message"], "param[0]: required value missing");

        let response = invoke(&server(), json!({"id": 3, "method": "B.echo"}));
        assert_eq!(
            response["error"]["message"],
            "Method B.echo expects 1 params but was passed 0"
        );
    }

    #[test]
    fn test_batch_is_positional() {
        let response = invoke(
            &server(),
            json!([
                {"jsonrpc": "2.0", "id": "1", "method": "B.echo", "params": ["hi"]},
                {"jsonrpc": "2.0", "id": "2", "method": "X.nope", "params": []}
            ]),
        );

        let responses = response.as_array().unwrap();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], "1");
        assert_eq!(responses[0]["result"], "hi");
        assert_eq!(responses[1]["id"], "2");
        assert_eq!(responses[1]["error"]["code"], error_codes::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_call_batch_decoded() {
        let responses = server().call_batch(vec![
            JsonRpcRequest::new_with_params(1, "A.sqrt", vec![json!(16)]),
            JsonRpcRequest::new(2, "B.echo", Some(RequestParams::Single(json!("x")))),
        ]);

        assert_eq!(responses[0].id, Some(RequestId::Number(1)));
        assert_eq!(responses[0].result(), Some(&json!(4.0)));
        assert_eq!(responses[1].result(), Some(&json!("x")));
    }

    #[test]
    fn test_parse_errors() {
        let server = server();
        let bodies: [&[u8]; 5] = [b"not json", b"{\"id\": 1,", b"[1, 2", b"   ", b"42"];
        for body in bodies {
            let response: Value = serde_json::from_slice(&server.invoke_json(body)).unwrap();
            assert_eq!(response["error"]["code"], error_codes::PARSE_ERROR);
            assert_eq!(response["id"], Value::Null);
            assert!(
                response["error"]["message"]
                    .as_str()
                    .unwrap()
                    .starts_with("Unable to parse JSON")
            );
        }
    }

    #[test]
    #[traced_test]
    fn test_parse_error_is_logged() {
        server().invoke_json(b"{oops");
        assert!(logs_contain("Rejecting undecodable request"));
    }

    #[test]
    fn test_introspection_bypasses_registry() {
        let server = Server::new(conform());
        let response = invoke(&server, json!({"jsonrpc": "2.0", "id": "i", "method": "barrister-idl"}));

        let expected: Value =
            serde_json::from_slice(include_bytes!("../../../tests/fixtures/conform.json")).unwrap();
        assert_eq!(response["result"], expected);
        assert_eq!(response["result"][3]["extends"], "");
    }

    #[test]
    fn test_response_has_exactly_one_payload() {
        let server = server();
        let ok = invoke(&server, json!({"id": 1, "method": "B.echo", "params": ["x"]}));
        let err = invoke(&server, json!({"id": 2, "method": "B.echo", "params": [1]}));

        let ok = ok.as_object().unwrap();
        assert!(ok.contains_key("result") && !ok.contains_key("error"));
        let err = err.as_object().unwrap();
        assert!(err.contains_key("error") && !err.contains_key("result"));
    }
}
