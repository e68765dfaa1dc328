//! Handler binding tables.
//!
//! A [`Handler`] maps capitalized function names to [`Callable`] bindings.
//! Typed closures become bindings through [`IntoCallable`]; their signature
//! is derived from the [`IdlType`] representations of the argument and
//! result types.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use barrister_json_rpc::JsonRpcError;
use serde::Serialize;
use serde_json::Value;

use crate::repr::{IdlType, TypeRepr};

/// Declared parameter and return representations of a binding
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub params: Vec<TypeRepr>,
    /// Return slots: the result followed by the rpc error slot
    pub returns: Vec<TypeRepr>,
}

impl Signature {
    pub fn new(params: Vec<TypeRepr>, result: TypeRepr) -> Self {
        Self {
            params,
            returns: vec![result, TypeRepr::RpcError],
        }
    }
}

/// A function bound to an IDL function
pub trait Callable: Send + Sync {
    fn signature(&self) -> Signature;

    /// Invoke with already-converted arguments, returning one value per
    /// return slot. A non-null error slot is the call's rpc error.
    fn invoke(&self, args: Vec<Value>) -> Vec<Value>;
}

/// Conversion of a typed closure into a binding. `Args` is the tuple of the
/// closure's parameter types.
pub trait IntoCallable<Args> {
    fn into_callable(self) -> Arc<dyn Callable>;
}

struct TypedFunction<F, M> {
    func: F,
    _marker: PhantomData<M>,
}

fn decode_arg<T: IdlType>(index: usize, arg: Option<Value>) -> Result<T, Vec<Value>> {
    serde_json::from_value(arg.unwrap_or(Value::Null)).map_err(|e| {
        error_slots(JsonRpcError::invalid_params(format!(
            "param[{index}] could not be decoded: {e}"
        )))
    })
}

fn encode_outcome<R: Serialize, E: Serialize>(outcome: Result<R, E>) -> Vec<Value> {
    match outcome {
        Ok(result) => match serde_json::to_value(result) {
            Ok(value) => vec![value, Value::Null],
            Err(e) => error_slots(JsonRpcError::internal_error(format!(
                "Unable to encode result: {e}"
            ))),
        },
        Err(err) => match serde_json::to_value(err) {
            Ok(value) => vec![Value::Null, value],
            Err(e) => error_slots(JsonRpcError::internal_error(format!(
                "Unable to encode error: {e}"
            ))),
        },
    }
}

fn error_slots(error: JsonRpcError) -> Vec<Value> {
    vec![
        Value::Null,
        serde_json::to_value(error).unwrap_or(Value::Null),
    ]
}

macro_rules! impl_typed_function {
    ($($arg:ident $var:ident),*) => {
        impl<F, R, E, $($arg,)*> Callable for TypedFunction<F, fn($($arg),*) -> Result<R, E>>
        where
            F: Fn($($arg),*) -> Result<R, E> + Send + Sync,
            R: IdlType,
            E: Serialize,
            $($arg: IdlType,)*
        {
            fn signature(&self) -> Signature {
                Signature::new(vec![$($arg::repr()),*], R::repr())
            }

            #[allow(unused_mut, unused_variables, unused_assignments)]
            fn invoke(&self, args: Vec<Value>) -> Vec<Value> {
                let mut args = args.into_iter();
                let mut index = 0usize;
                $(
                    let $var: $arg = match decode_arg(index, args.next()) {
                        Ok(value) => value,
                        Err(slots) => return slots,
                    };
                    index += 1;
                )*
                encode_outcome((self.func)($($var),*))
            }
        }

        impl<F, R, E, $($arg,)*> IntoCallable<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> Result<R, E> + Send + Sync + 'static,
            R: IdlType + 'static,
            E: Serialize + 'static,
            $($arg: IdlType + 'static,)*
        {
            fn into_callable(self) -> Arc<dyn Callable> {
                Arc::new(TypedFunction::<F, fn($($arg),*) -> Result<R, E>> {
                    func: self,
                    _marker: PhantomData,
                })
            }
        }
    };
}

impl_typed_function!();
impl_typed_function!(A1 a1);
impl_typed_function!(A1 a1, A2 a2);
impl_typed_function!(A1 a1, A2 a2, A3 a3);
impl_typed_function!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_typed_function!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_typed_function!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);

/// Binding over raw values with an explicitly declared signature
pub struct DynamicFunction {
    signature: Signature,
    func: Box<dyn Fn(Vec<Value>) -> Vec<Value> + Send + Sync>,
}

impl DynamicFunction {
    pub fn new<F>(signature: Signature, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Vec<Value> + Send + Sync + 'static,
    {
        Self {
            signature,
            func: Box::new(func),
        }
    }
}

impl Callable for DynamicFunction {
    fn signature(&self) -> Signature {
        self.signature.clone()
    }

    fn invoke(&self, args: Vec<Value>) -> Vec<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for DynamicFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicFunction")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Binding table for one interface implementation
#[derive(Clone, Default)]
pub struct Handler {
    functions: HashMap<String, Arc<dyn Callable>>,
}

impl Handler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a typed closure to the IDL function `name`
    pub fn function<Args, F>(mut self, name: &str, func: F) -> Self
    where
        F: IntoCallable<Args>,
    {
        self.functions.insert(capitalize(name), func.into_callable());
        self
    }

    /// Bind a prebuilt callable to the IDL function `name`
    pub fn callable(mut self, name: &str, callable: impl Callable + 'static) -> Self {
        self.functions.insert(capitalize(name), Arc::new(callable));
        self
    }

    /// Look up a binding by its capitalized name, e.g. `Echo`
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Callable>> {
        self.functions.get(name)
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.function_names().collect();
        names.sort_unstable();
        f.debug_struct("Handler").field("functions", &names).finish()
    }
}

/// Upper-case the first character: `echo` binds as `Echo`
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
