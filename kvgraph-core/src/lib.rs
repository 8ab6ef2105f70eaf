#![warn(missing_docs)]
//! Runtime type descriptors for kvgraph.
//!
//! Every type that can be reached by a key path implements [`Model`], which
//! hands out a [`Shape`]: the category of the type ([`Def`]) plus a small
//! vtable to construct and overwrite values of that type through `dyn Any`.
//!
//! Structs and enums are registered with the [`model!`] macro:
//!
//! ```
//! use kvgraph_core::{model, Def, Model};
//!
//! model! {
//!     #[derive(Debug, Default)]
//!     pub struct Address {
//!         pub city: String,
//!         pub zip: Option<u32>,
//!     }
//! }
//!
//! let shape = Address::shape();
//! assert_eq!(shape.type_identifier, "Address");
//! assert!(matches!(shape.def, Def::Struct(_)));
//! assert_eq!(shape.field("City").map(|f| f.name), Some("city"));
//! ```

mod change_type;
pub use change_type::*;

mod def;
pub use def::*;

mod impls;

mod macros;

mod raw;
pub use raw::*;

mod scalar;
pub use scalar::*;

mod shape;
pub use shape::*;
