//! Declarative expression trees and their wire form.
//!
//! The Earth Engine REST API accepts computations as an `Expression`: a flat
//! table of value nodes keyed by id plus the id of the result node. Function
//! bodies are referenced by id rather than nested inline.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Value),
    Call {
        function: String,
        args: BTreeMap<String, Expr>,
    },
    Argument(String),
    Function {
        params: Vec<String>,
        body: Box<Expr>,
    },
}

impl Expr {
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant(value.into())
    }

    pub fn call<I, K>(function: &str, args: I) -> Self
    where
        I: IntoIterator<Item = (K, Expr)>,
        K: Into<String>,
    {
        Self::Call {
            function: function.to_string(),
            args: args.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn argument(name: &str) -> Self {
        Self::Argument(name.to_string())
    }

    pub fn function(params: &[&str], body: Expr) -> Self {
        Self::Function {
            params: params.iter().map(|p| p.to_string()).collect(),
            body: Box::new(body),
        }
    }

    /// A constant promoted to a single-band image, as the client libraries do
    /// for numeric operands of image arithmetic.
    pub fn image_constant(value: impl Into<Value>) -> Self {
        Self::call("Image.constant", [("value", Self::constant(value))])
    }

    pub fn function_name(&self) -> Option<&str> {
        match self {
            Self::Call { function, .. } => Some(function),
            _ => None,
        }
    }

    pub fn arg(&self, name: &str) -> Option<&Expr> {
        match self {
            Self::Call { args, .. } => args.get(name),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Self::Constant(v) => Some(v),
            _ => None,
        }
    }

    /// Serializes the tree into the API's `Expression` object.
    pub fn to_graph(&self) -> ExpressionGraph {
        let mut encoder = GraphEncoder::default();
        let result = encoder.intern(self);
        ExpressionGraph {
            result,
            values: encoder.values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionGraph {
    pub result: String,
    pub values: BTreeMap<String, Value>,
}

#[derive(Default)]
struct GraphEncoder {
    values: BTreeMap<String, Value>,
    next_id: usize,
}

impl GraphEncoder {
    fn intern(&mut self, expr: &Expr) -> String {
        let node = self.encode(expr);
        let id = self.next_id.to_string();
        self.next_id += 1;
        self.values.insert(id.clone(), node);
        id
    }

    fn encode(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Constant(v) => json!({ "constantValue": v }),
            Expr::Argument(name) => json!({ "argumentReference": name }),
            Expr::Call { function, args } => {
                let arguments: serde_json::Map<String, Value> = args
                    .iter()
                    .map(|(k, v)| (k.clone(), self.encode(v)))
                    .collect();
                json!({
                    "functionInvocationValue": {
                        "functionName": function,
                        "arguments": arguments,
                    }
                })
            }
            Expr::Function { params, body } => {
                let body_id = self.intern(body);
                json!({
                    "functionDefinitionValue": {
                        "argumentNames": params,
                        "body": body_id,
                    }
                })
            }
        }
    }
}
