pub mod call;
pub mod callback;
pub mod error;
pub mod params;
pub mod response;

#[cfg(test)]
mod tests;

pub use call::{Arg, Args, Body, Call, CallId};
pub use callback::Callback;
pub use error::{ConfigFault, Fault, QrpcError, Result, ServiceError};
pub use params::MultiMap;
pub use response::Response;
