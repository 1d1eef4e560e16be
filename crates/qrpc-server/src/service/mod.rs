//! Service metadata
//!
//! Rust has no runtime reflection, so a service describes itself once with a
//! [`ClassMeta`]: its name, its annotations and one [`MethodAccess`] per
//! method. Each method carries its parameter type tags, per-parameter
//! annotations, return type and the handler that invokes it.
//!
//! # Example
//!
//! ```
//! use qrpc_server::service::{Annotation, ClassMeta, MethodAccess, Service, TypeTag};
//! use serde_json::json;
//!
//! struct Calculator;
//!
//! impl Service for Calculator {
//!     fn class_meta() -> ClassMeta<Self> {
//!         ClassMeta::new("Calculator")
//!             .annotate(Annotation::Service("calc".into()))
//!             .method(
//!                 MethodAccess::new("add", |_svc: &mut Calculator, args| {
//!                     Ok(json!(args.param::<i64>(0)? + args.param::<i64>(1)?))
//!                 })
//!                 .param(TypeTag::Int)
//!                 .param(TypeTag::Int),
//!             )
//!     }
//! }
//! ```

mod meta;

pub use meta::{Annotation, ClassMeta, Handler, MethodAccess, ParamMeta, ReturnType, TypeTag};

/// A type that can describe its own dispatchable surface.
pub trait Service: Sized + 'static {
    fn class_meta() -> ClassMeta<Self>;
}
