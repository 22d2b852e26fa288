// src/exec/backend.rs

//! Pluggable build invoker abstraction.
//!
//! The dispatcher talks to a `BuildInvoker` instead of spawning processes
//! itself. Production code uses [`MavenInvoker`](super::maven::MavenInvoker);
//! tests provide invokers that record requests and return canned outcomes.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::types::BuildRequest;

/// Exit code of a finished build; `0` means success.
pub type BuildOutcome = i32;

/// Runs one build to completion.
pub trait BuildInvoker: Send {
    /// Execute the build described by `request` and resolve once it has
    /// finished.
    ///
    /// An `Err` means the build could not be run at all (e.g. the program is
    /// missing); a build that ran and failed resolves to a non-zero outcome.
    fn invoke(
        &mut self,
        request: BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BuildOutcome>> + Send + '_>>;
}
