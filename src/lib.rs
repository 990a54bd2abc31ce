//! gatefs - A Sequential File-Operation Gateway to Remote Hierarchical Storage
//!
//! gatefs is a small client facade over a remote hierarchical storage
//! service: it holds one connection context and issues file and directory
//! operations against it. It features:
//!
//! - **Single connection context**: the gateway is either fully connected
//!   or fully disconnected; every operation fails fast when disconnected
//! - **Pass-through semantics**: no caching, no retries, no partial-failure
//!   recovery; every call round-trips to the remote service and failures
//!   surface immediately as typed errors carrying the failing path
//! - **Pluggable store backends**: the wire protocol belongs to the remote
//!   service; the gateway only sees the [`store::RemoteStore`] trait, with
//!   an in-process `mem://` backend shipped for demos and tests
//! - **Progress-reporting transfers**: uploads and downloads copy in
//!   configurable chunks, with an optional no-payload progress sink
//!   invoked per chunk
//!
//! # Architecture
//!
//! - **API layer** ([`api`]): the [`api::RemoteFileGateway`] facade, its
//!   connection context, typed errors, and listing/stream types
//! - **Store layer** ([`store`]): the opaque remote-service seam and the
//!   in-memory backend
//! - **Path handling** ([`path`]): validated absolute slash-delimited
//!   remote paths
//! - **Configuration** ([`config`]): TOML-backed settings for endpoint,
//!   identity, transfer chunk size, and overwrite policy
//!
//! # Example
//!
//! ```rust
//! use gatefs::api::RemoteFileGateway;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut gateway = RemoteFileGateway::new();
//! gateway.connect("mem://localhost:9000", "hadoop")?;
//!
//! gateway.mkdir("/demo1")?;
//! gateway.create_file("/demo1/a.txt", b"hello gateway")?;
//!
//! let bytes = gateway.read_file("/demo1/a.txt")?.read_to_vec()?;
//! assert_eq!(bytes, b"hello gateway");
//!
//! for entry in gateway.list("/demo1")? {
//!     println!("{} ({} bytes)", entry.path, entry.len);
//! }
//!
//! gateway.disconnect();
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod api;
pub mod config;
pub mod logging;
pub mod path;
pub mod store;
