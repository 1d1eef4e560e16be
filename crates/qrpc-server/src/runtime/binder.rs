//! Argument Binding
//!
//! Turns a [`Call`] into the argument list of a method. Three strategies
//! exist, chosen by the dispatcher:
//!
//! - **URI**: the address extended a table key; trailing path segments and
//!   named call parameters fill the slots
//! - **Request parameters**: an exact address hit on a method with
//!   parameter annotations; named call parameters fill annotated slots and the
//!   body fills at most one unannotated slot
//! - **Positional**: everything else; the body's elements fill the slots in
//!   order
//!
//! Callback slots are never filled from call data. Each one receives a
//! [`Callback`](qrpc_common::Callback) bound to the call and the outbound
//! queue.

use std::sync::Arc;

use qrpc_common::{Arg, Args, Body, Call, ConfigFault, Fault, SendQueue};

use super::binding::{MethodBinding, ParamBinding, RequestParamBinding};
use super::bridge::callback_for;
use super::conversions::{coerce_arg, coerce_str, coerce_value};
use crate::service::{MethodAccess, TypeTag};

pub struct ArgumentBinder<'a> {
    call: &'a Arc<Call>,
    outbound: Option<&'a Arc<dyn SendQueue>>,
}

impl<'a> ArgumentBinder<'a> {
    pub fn new(call: &'a Arc<Call>, outbound: Option<&'a Arc<dyn SendQueue>>) -> Self {
        Self { call, outbound }
    }

    /// One slot per declared parameter: callbacks injected, the rest null.
    fn prepare<S>(&self, method: &MethodAccess<S>) -> Vec<Arg> {
        method
            .params()
            .iter()
            .map(|p| {
                if p.is_callback() {
                    Arg::Callback(callback_for(self.outbound.cloned(), Arc::clone(self.call)))
                } else {
                    Arg::null()
                }
            })
            .collect()
    }

    /// URI strategy. `remainder` holds the path segments after the matched key.
    pub fn bind_uri<S>(
        &self,
        method: &MethodAccess<S>,
        binding: &MethodBinding,
        remainder: &[String],
    ) -> Result<Args, Fault> {
        let mut args = self.prepare(method);
        let params = method.params();

        let segment = |position: usize| {
            remainder.get(position).ok_or_else(|| {
                Fault::from(ConfigFault::UriPositionOutOfRange {
                    method: method.name().to_string(),
                    position,
                    available: remainder.len(),
                })
            })
        };

        for param_binding in binding.params() {
            match param_binding {
                ParamBinding::PositionalUri {
                    param,
                    uri_position,
                } => {
                    let meta = params.get(*param).ok_or_else(|| ConfigFault::ParamPositionOutOfRange {
                        method: method.name().to_string(),
                        position: *param,
                        count: params.len(),
                    })?;
                    let raw = segment(*uri_position)?;
                    if !meta.is_callback() {
                        args[*param] = coerce_str(meta.type_tag, raw)?;
                    }
                }
                ParamBinding::NamedPathVariable { name, uri_position } => {
                    if name.is_empty() {
                        return Err(ConfigFault::UnnamedPathVariable {
                            method: method.name().to_string(),
                        }
                        .into());
                    }
                    for (index, meta) in params.iter().enumerate() {
                        if meta.is_callback() || meta.path_variable_name() != Some(name.as_str()) {
                            continue;
                        }
                        let raw = segment(uri_position.unwrap_or(index))?;
                        args[index] = coerce_str(meta.type_tag, raw)?;
                    }
                }
                ParamBinding::RequestParam(rp) => {
                    if let Some(meta) = params.get(rp.param).filter(|m| !m.is_callback()) {
                        args[rp.param] = self.request_param(method, rp, meta.type_tag)?;
                    }
                }
            }
        }

        Ok(Args::from(args))
    }

    /// Request-parameter strategy, used on exact address hits.
    pub fn bind_request_params<S>(
        &self,
        method: &MethodAccess<S>,
        binding: &MethodBinding,
    ) -> Result<Args, Fault> {
        let mut args = self.prepare(method);
        let mut body_bound = false;

        for (index, meta) in method.params().iter().enumerate() {
            if meta.is_callback() {
                continue;
            }

            if let Some(rp) = binding.request_param_binding(index) {
                args[index] = self.request_param(method, rp, meta.type_tag)?;
                continue;
            }

            // Named path variables have no path here; read the same-named parameter
            if let Some(name) = meta.path_variable_name() {
                if binding.declares_path_variable(name) {
                    if let Some(raw) = self.call.params.get_first(name) {
                        args[index] = coerce_str(meta.type_tag, raw)?;
                    }
                    continue;
                }
            }

            if body_bound {
                return Err(ConfigFault::BodyAlreadyBound {
                    method: method.name().to_string(),
                    index,
                }
                .into());
            }
            body_bound = true;
            args[index] = coerce_arg(meta.type_tag, body_argument(&self.call.body))?;
        }

        Ok(Args::from(args))
    }

    /// Positional strategy.
    pub fn bind_positional<S>(&self, method: &MethodAccess<S>) -> Result<Args, Fault> {
        let params = method.params();
        if params.is_empty() {
            return Ok(Args::default());
        }

        let mut args = self.prepare(method);
        let slots: Vec<usize> = (0..params.len()).filter(|&i| !params[i].is_callback()).collect();

        match (&self.call.body, slots.as_slice()) {
            (body, [only]) if body.is_empty() => {
                args[*only] = self.params_argument(params[*only].type_tag)?;
            }
            (Body::Sequence(items), _) => {
                let skip = usize::from(
                    items.len() == slots.len() + 1 && items.first().is_some_and(Arg::is_callback),
                );
                for (&slot, item) in slots.iter().zip(items.iter().skip(skip)) {
                    args[slot] = coerce_arg(params[slot].type_tag, item.clone())?;
                }
            }
            (Body::Value(value), [only]) => {
                args[*only] = coerce_value(params[*only].type_tag, value.clone())?;
            }
            _ => {}
        }

        Ok(Args::from(args))
    }

    fn request_param<S>(
        &self,
        method: &MethodAccess<S>,
        rp: &RequestParamBinding,
        tag: TypeTag,
    ) -> Result<Arg, Fault> {
        let raw = match self.call.params.get_first(&rp.name) {
            Some(raw) => Some(raw),
            None if rp.required => {
                return Err(ConfigFault::MissingRequiredParam {
                    method: method.name().to_string(),
                    param: rp.name.clone(),
                }
                .into());
            }
            None => rp.default_value.as_deref(),
        };

        match raw {
            Some(raw) => coerce_str(tag, raw),
            None => Ok(Arg::null()),
        }
    }

    /// The call's parameter map as the sole argument.
    fn params_argument(&self, tag: TypeTag) -> Result<Arg, Fault> {
        let params = &self.call.params;
        match tag {
            TypeTag::Params => Ok(Arg::Params(params.clone())),
            TypeTag::Value => Ok(Arg::Value(params.to_json())),
            _ if params.is_empty() => Ok(Arg::null()),
            _ => coerce_arg(tag, Arg::Params(params.clone())),
        }
    }
}

/// The sole element of a one-element sequence, null for any other sequence,
/// otherwise the whole body.
fn body_argument(body: &Body) -> Arg {
    match body {
        Body::Sequence(items) if items.len() == 1 => items[0].clone(),
        Body::Sequence(_) => Arg::null(),
        other => Arg::Value(other.to_value()),
    }
}
