#![warn(missing_docs)]
//! Build typed object graphs from flat, colon-delimited key paths.
//!
//! A [`ModelService`] takes pairs such as `("Address:City", ..)` or
//! `("Tags:0", ..)`, walks each path against the runtime [`Shape`] of the
//! target type, creates intermediate objects and list elements on demand, and
//! converts the terminal value through a [`BuilderChain`].
//!
//! ```
//! use kvgraph::{model, ModelService};
//!
//! model! {
//!     #[derive(Debug, Default)]
//!     pub struct Address {
//!         pub city: String,
//!     }
//! }
//!
//! model! {
//!     #[derive(Debug, Default)]
//!     pub struct Person {
//!         pub address: Option<Address>,
//!         pub tags: Vec<String>,
//!     }
//! }
//!
//! let service = ModelService::new();
//! let person: Person = service
//!     .build_model([("Address:City", "")], "Paris")
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(person.address.unwrap().city, "Paris");
//! ```
//!
//! Paths that do not resolve (unknown properties, indices without a list) and
//! values no builder can convert leave the graph unchanged; the only error is
//! asking for a target that is not a concrete struct.

extern crate alloc;

pub use kvgraph_core::*;

mod builder;
pub use builder::*;

mod cancel;
pub use cancel::CancellationToken;

mod error;
pub use error::*;

mod graph;
pub use graph::*;

mod path;
pub use path::*;

mod service;
pub use service::*;
