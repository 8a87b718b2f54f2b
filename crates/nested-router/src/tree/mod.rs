//! Route tree model and construction
//!
//! Definitions are compiled into an immutable [`RouteTree`] of [`RouteNode`]s:
//!
//! ```rust,ignore
//! let tree = RouteTreeBuilder::new()
//!     .route(index("home"))
//!     .route(layout("auth", vec![route("login", "login"), route("register", "register")]))
//!     .build()?;
//! ```
//!
//! The process-wide tree lives in a [`TreeSlot`], which refuses a second
//! installation.

mod builder;
mod core;
mod node;

pub use builder::RouteTreeBuilder;
pub use core::{RouteTree, TreeSlot};
pub use node::{NodeId, NodeKind, RouteNode, Segment, SegmentPattern};

pub(crate) use node::RouteEntry;
