// Copyright 2025 QRPC Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Demo Service
//!
//! A calculator with a one-value memory, exposed by `qrpc call` and listed
//! by `qrpc routes`. It covers every binding style:
//!
//! | Route | Binding |
//! |-------|---------|
//! | `calc/add/{0}/{1}` | positional path segments |
//! | `calc/divide?a=..&b=..` | request parameters, `b` defaults to 1 |
//! | `calc/store` | body, void return |
//! | `calc/recall` | no arguments |
//! | `calc/countdown/{from}` | named path variable plus a callback |
//! | `calc/describe` | the raw parameter map |

use qrpc_common::ServiceError;
use qrpc_server::service::{Annotation, ClassMeta, MethodAccess, Service, TypeTag};
use serde_json::{json, Value};

#[derive(Debug, Default)]
pub struct Calculator {
    pub memory: f64,
    pub idle_ticks: u32,
}

impl Service for Calculator {
    fn class_meta() -> ClassMeta<Self> {
        ClassMeta::new("Calculator")
            .annotate(Annotation::Service("calc".into()))
            .method(
                MethodAccess::new("add", |_: &mut Calculator, args| {
                    Ok(json!(args.param::<i64>(0)? + args.param::<i64>(1)?))
                })
                .annotate(Annotation::RequestMapping(vec!["add/{0}/{1}".into()]))
                .param(TypeTag::Int)
                .param(TypeTag::Int),
            )
            .method(
                MethodAccess::new("divide", |_: &mut Calculator, args| {
                    let a: f64 = args.param(0)?;
                    let b: f64 = args.param(1)?;
                    if b == 0.0 {
                        return Err(ServiceError::new("division by zero").with_data(json!({ "a": a })));
                    }
                    Ok(json!(a / b))
                })
                .annotated_param(TypeTag::Float, Annotation::request_param("a", true))
                .annotated_param(TypeTag::Float, Annotation::request_param_or("b", "1")),
            )
            .method(
                MethodAccess::new("store", |calc: &mut Calculator, args| {
                    calc.memory = args.param(0)?;
                    Ok(Value::Null)
                })
                .param(TypeTag::Float)
                .returns_void(),
            )
            .method(MethodAccess::new("recall", |calc: &mut Calculator, _| {
                Ok(json!(calc.memory))
            }))
            .method(
                MethodAccess::new("countdown", |_: &mut Calculator, args| {
                    let from: i64 = args.param(0)?;
                    let callback = args
                        .callback(1)
                        .ok_or_else(|| ServiceError::new("missing callback"))?;
                    for n in (0..=from).rev() {
                        callback.accept(json!(n));
                    }
                    Ok(Value::Null)
                })
                .annotate(Annotation::RequestMapping(vec!["countdown/{from}".into()]))
                .annotated_param(TypeTag::Int, Annotation::PathVariable("from".into()))
                .param(TypeTag::Callback)
                .returns_void(),
            )
            .method(
                MethodAccess::new("describe", |_: &mut Calculator, args| {
                    Ok(args.value(0).unwrap_or_default())
                })
                .param(TypeTag::Params),
            )
            .method(MethodAccess::new("queueIdle", |calc: &mut Calculator, _| {
                calc.idle_ticks += 1;
                Ok(Value::Null)
            }))
    }
}
