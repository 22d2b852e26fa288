// tests/common/mod.rs

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use pomwatch::fs::mock::MockFileSystem;
use pomwatch::types::CoalesceMode;
use pomwatch::watch::{start_with, WatchOptions, WatchSession};
use pomwatch_test_utils::fake_invoker::RecordingInvoker;
use pomwatch_test_utils::fake_platform::FakePlatform;

pub use pomwatch_test_utils::{init_tracing, wait_until, with_timeout};

/// `root/moduleA/pom.xml`, `root/moduleA/src/Foo`, `root/moduleB/pom.xml`,
/// `root/moduleB/src/Bar`, `root/standalone-file`, plus build output that
/// must never be watched.
pub fn sample_tree() -> MockFileSystem {
    let fs = MockFileSystem::new();
    fs.add_file("/root/moduleA/pom.xml");
    fs.add_file("/root/moduleA/src/Foo");
    fs.add_file("/root/moduleA/target/classes/Foo.class");
    fs.add_file("/root/moduleB/pom.xml");
    fs.add_file("/root/moduleB/src/Bar");
    fs.add_file("/root/standalone-file");
    fs
}

/// Start a session on `/root` over the fake platform.
pub fn start_fake(
    fs: MockFileSystem,
    invoker: RecordingInvoker,
    coalesce: CoalesceMode,
) -> (FakePlatform, WatchSession) {
    let (platform, backend, events) = FakePlatform::new(fs.clone());
    let options = WatchOptions {
        root: PathBuf::from("/root"),
        coalesce,
        max_depth: 64,
    };
    let session = start_with(options, Arc::new(fs), backend, events, invoker)
        .expect("fake session should start");
    (platform, session)
}

pub fn paths(items: &[&str]) -> Vec<PathBuf> {
    items.iter().map(PathBuf::from).collect()
}
