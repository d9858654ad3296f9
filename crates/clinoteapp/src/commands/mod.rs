//! # Command Layer
//!
//! The business logic of clinote. Each command is a plain function over the
//! store ([`Database`](crate::store::Database)), the remote note store
//! ([`NoteStoreClient`](crate::notestore::NoteStoreClient)) and, where needed,
//! the editor and markup codec. Everything a command needs is passed in; there
//! is no ambient session.
//!
//! ## What Commands Do NOT Do
//!
//! - **Terminal I/O**: no stdout, no prompts, no table formatting
//! - **Argument parsing**: titles, ordinals and indices arrive already split out
//! - **Exit codes**: they return `Result` and the caller decides
//!
//! ## Testing Strategy
//!
//! Command tests run against `MemBackend` and the recording `MockNoteStore` from
//! `test_utils`, so every branch (cache hit, forced sync, recovery fallback)
//! is checked without a file system or network.
//!
//! ## Command Modules
//!
//! - [`notebook`]: Cached notebook listing, lookup by name, create and update
//! - [`note`]: Search, ordinal addressing, content loading, rename, move, delete, create
//! - [`edit`]: Editor round trip with change detection and the recovery point
//! - [`credential`]: Credential list and the active session

pub mod credential;
pub mod edit;
pub mod note;
pub mod notebook;
