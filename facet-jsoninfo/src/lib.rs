#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

mod tracing_macros;

mod typeid;
pub use typeid::*;

mod shape;
pub use shape::*;

mod impls;

mod field_info;
pub use field_info::*;

mod error;
pub use error::*;

mod type_info;
pub use type_info::*;

mod registry;
pub use registry::*;
