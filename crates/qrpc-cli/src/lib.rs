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

//! # QRPC CLI
//!
//! Command-line front end for the QRPC dispatch core.
//!
//! Calls are dispatched in-process against the [`demo::Calculator`]
//! service through a [`ServiceQueue`], exactly as a transport would drive it.
//! Every response the call produced, deferred ones included, is printed as a
//! single JSON batch.
//!
//! ## Key Commands
//!
//! - `qrpc call`: dispatch one call and print the responses
//! - `qrpc routes`: list every registered address and its method

pub mod demo;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use qrpc_common::{Body, Call, ChannelQueue, JsonEncoder, MultiMap, ProtocolEncoder};
use qrpc_server::runtime::ParamBinding;
use qrpc_server::{QueueConfig, ServiceConfig, ServiceMethodHandler, ServiceQueue};
use std::sync::Arc;

use demo::Calculator;

/// What a call printed and whether it hit a fatal configuration fault.
#[derive(Debug)]
pub struct CallOutput {
    pub encoded: String,
    pub responses: usize,
    pub fatal: bool,
}

/// Splits a `key=value` parameter. The value may be empty.
pub fn parse_param(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Invalid parameter '{}': expected key=value", raw))?;
    if key.is_empty() {
        anyhow::bail!("Invalid parameter '{}': empty key", raw);
    }
    Ok((key.to_string(), value.to_string()))
}

/// Builds a call from command-line pieces. Exactly one of `address` and
/// `name` must be given; `body` is JSON.
pub fn build_call(
    address: Option<&str>,
    name: Option<&str>,
    body: Option<&str>,
    params: &[String],
    return_address: &str,
) -> Result<Call> {
    let call = match (address, name) {
        (Some(address), None) => Call::to_address(address),
        (None, Some(name)) => Call::to_method(name),
        (Some(_), Some(_)) => anyhow::bail!("--address and --name are mutually exclusive"),
        (None, None) => anyhow::bail!("one of --address or --name is required"),
    };

    let body = match body {
        Some(raw) => Body::from(
            serde_json::from_str::<serde_json::Value>(raw)
                .map_err(|e| anyhow::anyhow!("Invalid JSON in body: {}", e))?,
        ),
        None => Body::Empty,
    };

    let params = params
        .iter()
        .map(|raw| parse_param(raw))
        .collect::<Result<MultiMap>>()?;

    Ok(call
        .with_body(body)
        .with_params(params)
        .with_return_address(return_address))
}

/// Dispatches `call` through a service queue and encodes every response.
pub async fn run_call(config: &ServiceConfig, queue_config: QueueConfig, call: Call) -> Result<CallOutput> {
    let return_address = call.return_address.clone();
    let handler = ServiceMethodHandler::new(Calculator::default(), config)?;

    let (outbound, mut receiver) = ChannelQueue::new();
    let queue = ServiceQueue::start(handler, Arc::new(outbound), queue_config)?;
    queue.send(call).await?;
    queue.shutdown().await?;

    let mut responses = Vec::new();
    while let Ok(response) = receiver.try_recv() {
        responses.push(response);
    }
    tracing::debug!("Call produced {} responses", responses.len());

    let fatal = responses
        .iter()
        .any(|r| r.error().is_some_and(|fault| fault.is_fatal()));
    let encoded = JsonEncoder.encode_responses(&return_address, &responses)?;

    Ok(CallOutput {
        encoded,
        responses: responses.len(),
        fatal,
    })
}

/// One line per registered address: `address -> method`, with the full
/// template and its bindings when the method takes any.
pub fn routes(config: &ServiceConfig) -> Result<Vec<String>> {
    let handler = ServiceMethodHandler::new(Calculator::default(), config)?;

    Ok(handler
        .bindings()
        .map(|(address, binding)| {
            let mut line = format!("{} -> {}", address, binding.method());
            if binding.is_template() {
                line.push_str(&format!(" [{}]", binding.address()));
            }
            let described: Vec<String> = binding.params().iter().map(describe).collect();
            if !described.is_empty() {
                line.push_str(&format!(" ({})", described.join(", ")));
            }
            line
        })
        .collect())
}

fn describe(binding: &ParamBinding) -> String {
    match binding {
        ParamBinding::PositionalUri { param, uri_position } => {
            format!("arg{} <- segment {}", param, uri_position)
        }
        ParamBinding::NamedPathVariable { name, uri_position } => match uri_position {
            Some(position) => format!("{} <- segment {}", name, position),
            None => format!("{} <- segment by index", name),
        },
        ParamBinding::RequestParam(rp) => {
            let mut text = format!("arg{} <- ?{}", rp.param, rp.name);
            if rp.required {
                text.push_str(" (required)");
            } else if let Some(default) = &rp.default_value {
                text.push_str(&format!(" (default {})", default));
            }
            text
        }
    }
}
