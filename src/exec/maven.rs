// src/exec/maven.rs

//! Build invoker that runs Maven as a child process.

use std::ffi::OsString;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::info;

use crate::config::BuildSection;
use crate::errors::{PomwatchError, Result};
use crate::exec::backend::{BuildInvoker, BuildOutcome};
use crate::types::BuildRequest;

/// Runs `<program> -f <root>/pom.xml [flags] <goals>`.
///
/// The child inherits stdout/stderr so build output reaches the terminal
/// unchanged. It is killed if the invocation future is dropped (e.g. the
/// watch session is stopped mid-build).
#[derive(Debug, Clone)]
pub struct MavenInvoker {
    options: BuildSection,
}

impl MavenInvoker {
    pub fn new(options: BuildSection) -> Self {
        Self { options }
    }

    /// Arguments passed to the program for `request`, in order.
    pub fn args(&self, request: &BuildRequest) -> Vec<OsString> {
        let opts = &self.options;
        let mut args: Vec<OsString> = vec!["-f".into(), request.descriptor().into_os_string()];

        if opts.batch_mode {
            args.push("-B".into());
        }
        if opts.offline {
            args.push("-o".into());
        }
        if opts.quiet {
            args.push("-q".into());
        }
        if let Some(ref settings) = opts.settings {
            args.push("-s".into());
            args.push(settings.clone().into_os_string());
        }
        for (key, value) in opts.defines.iter() {
            args.push(format!("-D{key}={value}").into());
        }

        args.extend(request.goals.iter().map(OsString::from));
        args
    }

    async fn run(&self, request: BuildRequest) -> Result<BuildOutcome> {
        let args = self.args(&request);
        info!(
            root = ?request.project_root,
            program = %self.options.program,
            ?args,
            "starting build"
        );

        let status = Command::new(&self.options.program)
            .args(&args)
            .current_dir(&request.project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .status()
            .await
            .with_context(|| {
                format!(
                    "running '{}' for {:?}",
                    self.options.program, request.project_root
                )
            })
            .map_err(|err| PomwatchError::BuildInvocation {
                root: request.project_root.clone(),
                reason: format!("{err:#}"),
            })?;

        // Killed by a signal: no exit code.
        Ok(status.code().unwrap_or(-1))
    }
}

impl BuildInvoker for MavenInvoker {
    fn invoke(
        &mut self,
        request: BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BuildOutcome>> + Send + '_>> {
        Box::pin(self.run(request))
    }
}
