// src/watch/mod.rs

//! File watching and change-to-module resolution.
//!
//! This module is responsible for:
//! - Registering every directory of the source tree (except build output)
//!   with the platform notification facility, one directory at a time.
//! - Pumping notifications: registering new directories as they appear and
//!   handing changes to the build dispatcher.
//! - Dropping watches for directories that disappear, and stopping once
//!   nothing is left.
//!
//! It does **not** run builds; that is the [`exec`](crate::exec) layer.

pub mod backend;
pub mod classify;
pub mod decode;
pub mod pump;
pub mod registrar;
pub mod registry;
pub mod session;

pub use backend::{
    DryRunBackend, Notification, NotificationRx, NotificationTx, NotifyBackend, WatchBackend,
};
pub use classify::classify;
pub use pump::{EventPump, PumpExit, PumpState};
pub use registrar::{register_tree, Registration};
pub use registry::{WatchHandle, WatchSet};
pub use session::{start, start_with, WatchOptions, WatchSession};
