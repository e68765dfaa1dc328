//! Typed implementation of the conformance IDL (`tests/fixtures/conform.json`)

use barrister_derive::IdlType;
use barrister_server::prelude::*;
use serde::{Deserialize, Serialize};

/// Raw bytes of the conformance IDL
pub const CONFORM_JSON: &[u8] = include_bytes!("../../fixtures/conform.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IdlType)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Err,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IdlType)]
#[serde(rename_all = "lowercase")]
pub enum MathOp {
    Add,
    Multiply,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IdlType)]
pub struct RepeatRequest {
    pub to_repeat: String,
    pub count: i64,
    pub force_uppercase: bool,
}

/// `RepeatResponse extends Response`, so it carries `status` as well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IdlType)]
pub struct RepeatResponse {
    pub status: Status,
    pub count: i64,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IdlType)]
pub struct HiResponse {
    pub hi: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IdlType)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub person_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

pub fn conform_contract() -> Contract {
    match Contract::parse(CONFORM_JSON) {
        Ok(contract) => contract,
        Err(err) => panic!("conform.json must parse: {err}"),
    }
}

/// Handler for interface `A`
pub fn a_handler() -> Handler {
    Handler::new()
        .function("add", |a: i64, b: i64| Ok::<_, JsonRpcError>(a + b))
        .function("calc", |nums: Vec<f64>, operation: MathOp| {
            let result = match operation {
                MathOp::Add => nums.iter().sum(),
                MathOp::Multiply => nums.iter().product(),
            };
            Ok::<f64, JsonRpcError>(result)
        })
        .function("sqrt", |a: f64| Ok::<_, JsonRpcError>(a.sqrt()))
        .function("repeat", |req: RepeatRequest| {
            let item = if req.force_uppercase {
                req.to_repeat.to_uppercase()
            } else {
                req.to_repeat.clone()
            };
            let count = req.count.max(0);
            Ok::<_, JsonRpcError>(RepeatResponse {
                status: Status::Ok,
                count,
                items: vec![item; count as usize],
            })
        })
        .function("say_hi", || {
            Ok::<_, JsonRpcError>(HiResponse {
                hi: "hi".to_string(),
            })
        })
        .function("repeat_num", |num: i64, count: i64| {
            Ok::<_, JsonRpcError>(vec![num; count.max(0) as usize])
        })
        .function("putPerson", |p: Person| Ok::<_, JsonRpcError>(p.person_id))
}

/// Handler for interface `B`; `"return-null"` echoes back a null
pub fn b_handler() -> Handler {
    Handler::new().function("echo", |s: String| {
        if s == "return-null" {
            Ok::<_, JsonRpcError>(None)
        } else {
            Ok(Some(s))
        }
    })
}

/// A server with both conformance interfaces registered
pub fn conform_server() -> Server {
    let built = Server::builder(conform_contract())
        .strict_types(true)
        .handler("A", a_handler())
        .handler("B", b_handler())
        .build();
    match built {
        Ok(server) => server,
        Err(err) => panic!("conformance handlers must register: {err}"),
    }
}
