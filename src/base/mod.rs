//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): error codes shared by every stage of a run
//! - [`IoResultExt`](context::IoResultExt): path and domain context for IO errors

pub mod context;
pub mod neterror;
