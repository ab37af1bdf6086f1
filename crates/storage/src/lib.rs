// SPDX-License-Identifier: MIT

//! On-disk persistence for sessions, tasks, the registry and audit logs.
//! Every mutation that crosses process boundaries goes through an atomic
//! write and, where concurrent writers are possible, a sibling `.lock` file.

mod atomic;
mod audit;
mod error;
mod lockfile;
mod paths;
mod registry_store;
mod session_store;
mod task_store;

pub use atomic::write_atomic;
pub use audit::{append_audit, tail_audit};
pub use error::StorageError;
pub use lockfile::FileLock;
pub use paths::{slugify, StorageRoot};
pub use registry_store::RegistryStore;
pub use session_store::{IndexEntry, SessionStore, INDEX_REBUILD_CAP};
pub use task_store::{has_cycle, select_next_task, TaskStore};
