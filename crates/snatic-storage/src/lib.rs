//! Remote directory abstraction for snatic deployments.
//!
//! This crate provides a [`RemoteStore`] trait describing the handful of
//! directory operations a mirror needs from a remote file store. This enables:
//!
//! - **Unit testing** of the mirror algorithms without a server
//! - **Transport independence** (SFTP today, anything with directories tomorrow)
//!
//! # Architecture
//!
//! The crate provides:
//! - [`RemoteStore`] trait with `list_dir()`, `remove_file()`, `remove_dir()`,
//!   `create_dir()` and `write_file()`
//! - [`StorageError`] with a semantic [`StorageErrorKind`]
//! - [`MockRemote`] for testing (behind `mock` feature flag)
//!
//! Remote paths are POSIX strings; use [`join`] to build them.

#[cfg(feature = "mock")]
mod mock;
mod remote;
mod storage;

#[cfg(feature = "mock")]
pub use mock::{MockRemote, RemoteOp};
pub use remote::{EntryKind, RemoteEntry, RemoteStore, join};
pub use storage::{StorageError, StorageErrorKind};
