pub mod address;
pub mod binder;
pub mod binding;
pub mod bridge;
pub mod conversions;
pub mod resolver;
pub mod table;


pub use binder::ArgumentBinder;
pub use binding::{MethodBinding, ParamBinding, RequestParamBinding};
pub use resolver::{resolve, Resolution};
pub use table::{AddressIndex, BindingEntry, BindingTable};
