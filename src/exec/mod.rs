// src/exec/mod.rs

//! Build execution layer.
//!
//! - [`backend`] provides the `BuildInvoker` trait the dispatcher talks to.
//! - [`maven`] is the production invoker, running `mvn` via
//!   `tokio::process::Command`.
//! - [`dispatcher`] resolves the owning module of a change and awaits one
//!   build at a time.

pub mod backend;
pub mod dispatcher;
pub mod maven;

pub use backend::{BuildInvoker, BuildOutcome};
pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use maven::MavenInvoker;
