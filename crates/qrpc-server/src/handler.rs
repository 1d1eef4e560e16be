use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use qrpc_common::protocol::error::{QrpcError, Result};
use qrpc_common::{Args, Call, Fault, Response, SendQueue, ServiceError};
use serde_json::Value;

use crate::config::ServiceConfig;
use crate::runtime::address::{normalize, service_address};
use crate::runtime::binder::ArgumentBinder;
use crate::runtime::binding::MethodBinding;
use crate::runtime::resolver::{resolve, Resolution};
use crate::runtime::table::BindingTable;
use crate::service::{ClassMeta, MethodAccess, ReturnType, Service};

/// Queue lifecycle notifications a service may opt into by declaring a
/// parameterless method with the reserved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleHook {
    /// The queue drained a batch and found nothing more to do
    Empty,
    /// A batch hit the configured limit
    Limit,
    /// The queue is closing
    Shutdown,
    /// No calls arrived for the idle timeout
    Idle,
}

impl LifecycleHook {
    pub const ALL: [LifecycleHook; 4] = [
        LifecycleHook::Empty,
        LifecycleHook::Limit,
        LifecycleHook::Shutdown,
        LifecycleHook::Idle,
    ];

    pub fn method_name(self) -> &'static str {
        match self {
            LifecycleHook::Empty => "queueEmpty",
            LifecycleHook::Limit => "queueLimit",
            LifecycleHook::Shutdown => "queueShutdown",
            LifecycleHook::Idle => "queueIdle",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Dispatches calls to the methods of one service instance.
///
/// The binding table is built once in [`ServiceMethodHandler::initialize`]
/// and never changes afterwards. Dispatch takes `&mut self`: calls against a
/// handler are serialized by whoever owns it, usually a
/// [`ServiceQueue`](crate::ServiceQueue).
///
/// # Example
///
/// ```
/// use qrpc_common::Call;
/// use qrpc_server::service::{ClassMeta, MethodAccess, Service, TypeTag};
/// use qrpc_server::{ServiceConfig, ServiceMethodHandler};
/// use serde_json::json;
///
/// struct Echo;
///
/// impl Service for Echo {
///     fn class_meta() -> ClassMeta<Self> {
///         ClassMeta::new("Echo").method(
///             MethodAccess::new("echo", |_svc: &mut Echo, args| Ok(args.value(0).unwrap_or_default()))
///                 .param(TypeTag::Value),
///         )
///     }
/// }
///
/// let mut handler = ServiceMethodHandler::new(Echo, &ServiceConfig::default()).unwrap();
/// let response = handler.dispatch(Call::to_address("echo/echo").with_body(json!(["hi"])));
/// assert_eq!(response.value(), Some(&json!("hi")));
/// ```
pub struct ServiceMethodHandler<S> {
    service: S,
    meta: ClassMeta<S>,
    address: String,
    table: BindingTable<S>,
    hooks: [Option<Arc<MethodAccess<S>>>; 4],
    outbound: Option<Arc<dyn SendQueue>>,
}

impl<S: Service> ServiceMethodHandler<S> {
    /// Creates a handler from the service's own metadata.
    pub fn new(service: S, config: &ServiceConfig) -> Result<Self> {
        config.validate().map_err(QrpcError::InvalidConfig)?;
        Ok(Self::initialize(
            service,
            S::class_meta(),
            config.root_address.as_deref(),
            config.service_address.as_deref(),
        ))
    }
}

impl<S> ServiceMethodHandler<S> {
    /// Derives the service address and builds the binding table.
    ///
    /// The address is `explicit_address` if given, else the one annotated on
    /// the class, else the class name in lower camel case, in every case
    /// prefixed with `root` when present.
    pub fn initialize(
        service: S,
        meta: ClassMeta<S>,
        root: Option<&str>,
        explicit_address: Option<&str>,
    ) -> Self {
        let address = service_address(meta.name(), meta.annotations(), explicit_address, root);
        let table = BindingTable::build(&meta, &address);

        let hooks = LifecycleHook::ALL.map(|hook| {
            meta.methods()
                .iter()
                .find(|m| m.name() == hook.method_name() && m.param_count() == 0)
                .cloned()
        });

        tracing::info!(
            "Service {} registered at '{}' with {} addresses",
            meta.name(),
            address,
            table.len()
        );

        Self {
            service,
            meta,
            address,
            table,
            hooks,
            outbound: None,
        }
    }

    /// Effective base address of the service.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Every resolvable address key, in sorted order.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.table.index().iter()
    }

    /// Registered addresses and their bindings, in registration order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &MethodBinding)> {
        self.table
            .entries()
            .map(|entry| (entry.binding.key(), &entry.binding))
    }

    /// Binds the channel deferred callback responses are sent on.
    pub fn init_outbound(&mut self, outbound: Arc<dyn SendQueue>) {
        self.outbound = Some(outbound);
    }

    pub fn outbound(&self) -> Option<&Arc<dyn SendQueue>> {
        self.outbound.as_ref()
    }

    pub fn class_meta(&self) -> &ClassMeta<S> {
        &self.meta
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    pub fn into_service(self) -> S {
        self.service
    }

    /// Dispatches a call and returns its response.
    ///
    /// Never fails: every fault ends up in the response. Void methods return
    /// the shared [`Response::void`] sentinel.
    pub fn dispatch(&mut self, call: Call) -> Arc<Response> {
        let call = Arc::new(call);

        match self.try_dispatch(&call) {
            Ok(Some(value)) => Arc::new(Response::success(&call, value)),
            Ok(None) => Response::void(),
            Err(fault) => {
                if fault.is_fatal() {
                    tracing::error!("Call {} ({}): {}", call.id, target(&call), fault);
                } else {
                    tracing::debug!("Call {} ({}) failed: {}", call.id, target(&call), fault);
                }
                Arc::new(Response::fault(&call, fault))
            }
        }
    }

    fn try_dispatch(&mut self, call: &Arc<Call>) -> std::result::Result<Option<Value>, Fault> {
        tracing::debug!("Dispatching call {} to {}", call.id, target(call));
        let binder = ArgumentBinder::new(call, self.outbound.as_ref());

        let (method, args) = if !call.name.is_empty() {
            let method = self
                .meta
                .methods()
                .iter()
                .find(|m| m.is_public() && m.name() == call.name)
                .cloned()
                .ok_or_else(|| Fault::MethodNotFound(call.name.clone()))?;
            let args = binder.bind_positional(&method)?;
            (method, args)
        } else {
            match resolve(&self.table, normalize(&call.address))? {
                Resolution::Exact(entry) => {
                    let args = if entry.binding.reads_call_params() {
                        binder.bind_request_params(&entry.method, &entry.binding)?
                    } else {
                        binder.bind_positional(&entry.method)?
                    };
                    (Arc::clone(&entry.method), args)
                }
                Resolution::Prefix { entry, remainder } => {
                    let args = binder.bind_uri(&entry.method, &entry.binding, &remainder)?;
                    (Arc::clone(&entry.method), args)
                }
            }
        };

        tracing::debug!("Invoking {} with {} arguments", method.name(), args.len());
        let value = invoke(&method, &mut self.service, args)?;

        Ok(match method.return_type() {
            ReturnType::Void => None,
            ReturnType::Value => Some(value),
        })
    }

    /// Whether the service declared the hook.
    pub fn has_hook(&self, hook: LifecycleHook) -> bool {
        self.hooks[hook.slot()].is_some()
    }

    /// Invokes the hook if the service declared it. Failures are logged.
    pub fn notify(&mut self, hook: LifecycleHook) {
        let Some(method) = self.hooks[hook.slot()].clone() else {
            return;
        };
        tracing::trace!("Notifying {}", hook.method_name());
        if let Err(e) = invoke(&method, &mut self.service, Args::default()) {
            tracing::warn!("Lifecycle hook {} failed: {}", hook.method_name(), e);
        }
    }

    pub fn notify_idle(&mut self) {
        self.notify(LifecycleHook::Idle)
    }

    pub fn notify_empty(&mut self) {
        self.notify(LifecycleHook::Empty)
    }

    pub fn notify_limit(&mut self) {
        self.notify(LifecycleHook::Limit)
    }

    pub fn notify_shutdown(&mut self) {
        self.notify(LifecycleHook::Shutdown)
    }
}

/// Invokes `method`, turning a panic into a raised error.
fn invoke<S>(
    method: &MethodAccess<S>,
    service: &mut S,
    args: Args,
) -> std::result::Result<Value, ServiceError> {
    panic::catch_unwind(AssertUnwindSafe(|| method.invoke(service, args))).unwrap_or_else(|payload| {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            format!("panic in {}: {}", method.name(), s)
        } else if let Some(s) = payload.downcast_ref::<String>() {
            format!("panic in {}: {}", method.name(), s)
        } else {
            format!("panic in {}", method.name())
        };
        tracing::error!("{}", message);
        Err(ServiceError::new(message))
    })
}

fn target(call: &Call) -> &str {
    if call.name.is_empty() {
        &call.address
    } else {
        &call.name
    }
}
