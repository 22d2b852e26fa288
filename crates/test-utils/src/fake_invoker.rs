use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use pomwatch::errors::{PomwatchError, Result};
use pomwatch::exec::{BuildInvoker, BuildOutcome};
use pomwatch::types::BuildRequest;

/// One recorded build with its entry/exit timestamps.
#[derive(Debug, Clone)]
pub struct BuildRecord {
    pub request: BuildRequest,
    pub entered: Instant,
    pub exited: Option<Instant>,
}

/// What the next invocation should do.
#[derive(Debug, Clone, Copy)]
pub enum Scripted {
    Exit(BuildOutcome),
    Error,
}

/// A fake build invoker that:
/// - records every request with entry/exit times
/// - optionally sleeps to simulate a slow build
/// - returns scripted outcomes (success once the script runs out).
#[derive(Clone, Default)]
pub struct RecordingInvoker {
    records: Arc<Mutex<Vec<BuildRecord>>>,
    script: Arc<Mutex<VecDeque<Scripted>>>,
    delay: Duration,
}

impl RecordingInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_script(self, script: impl IntoIterator<Item = Scripted>) -> Self {
        self.script.lock().unwrap().extend(script);
        self
    }

    pub fn records(&self) -> Vec<BuildRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Project roots of every build so far, in order.
    pub fn roots(&self) -> Vec<PathBuf> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.request.project_root.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

impl BuildInvoker for RecordingInvoker {
    fn invoke(
        &mut self,
        request: BuildRequest,
    ) -> Pin<Box<dyn Future<Output = Result<BuildOutcome>> + Send + '_>> {
        let records = Arc::clone(&self.records);
        let next = self.script.lock().unwrap().pop_front();
        let delay = self.delay;

        Box::pin(async move {
            let index = {
                let mut guard = records.lock().unwrap();
                guard.push(BuildRecord {
                    request: request.clone(),
                    entered: Instant::now(),
                    exited: None,
                });
                guard.len() - 1
            };

            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            records.lock().unwrap()[index].exited = Some(Instant::now());

            match next.unwrap_or(Scripted::Exit(0)) {
                Scripted::Exit(code) => Ok(code),
                Scripted::Error => Err(PomwatchError::BuildInvocation {
                    root: request.project_root,
                    reason: "scripted failure".to_string(),
                }),
            }
        })
    }
}
