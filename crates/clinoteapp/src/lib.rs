//! # Clinote Architecture
//!
//! Clinote is the local half of a command line client for a remote note
//! service. The remote service owns notes and notebooks; this library keeps what
//! the client needs between invocations and makes edits crash safe:
//!
//! - the **notebook cache**, a time-bounded copy of the notebook list
//! - the **saved search**, so `3` can mean "the third note of my last search"
//! - the **recovery point**, the last edit that failed to reach the remote store
//! - the **credential store** and the **settings** record
//! - the **schema migrator** that upgrades all of the above on open
//!
//! ## The Three-Layer Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Client: config, store, remote store, editor, codec       │
//! │  - Thin facade over commands                                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Cache policy, ordinal addressing, edit/recover flow      │
//! │  - Operates on Rust types, returns Rust types               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - StorageBackend trait: bucketed key-value transactions    │
//! │  - SqliteBackend (production), MemBackend (testing)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The remote store sits beside the command layer behind
//! [`notestore::NoteStoreClient`]; the front end supplies the implementation.
//!
//! ## No I/O Assumptions
//!
//! Nothing here writes to stdout/stderr or exits the process. Diagnostics go
//! through the `log` facade and the front end installs whatever logger it wants.
//! The only processes started are the user's editor, from [`editor`].
//!
//! ## Module Overview
//!
//! - [`api`]: The [`api::Client`] facade
//! - [`commands`]: Business logic
//! - [`store`]: Persistence, migrations, credentials
//! - [`model`]: Notes, notebooks, credentials, settings, fingerprints
//! - [`config`]: Configuration, folders, client and note options
//! - [`markup`]: Note envelope and markdown/markup conversion
//! - [`editor`]: External editor integration
//! - [`notestore`]: The remote note store interface
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod markup;
pub mod model;
pub mod notestore;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
