//! Client for the `cstore` configuration/secrets CLI.
//!
//! cstore decrypts secret material and writes it to stdout, so calling it
//! from another program safely means two things: the child's output streams
//! must be captured in memory (never inherited, never logged), and the exit
//! status must decide whether that captured stdout is a JSON payload or
//! whether the captured stderr is a diagnostic to surface. This crate wraps
//! exactly that discipline around `cstore pull`.
//!
//! ## Key Components
//!
//! - **`pull`**: The [`SecretPuller`] client and its [`PullOptions`]: one
//!   call, one child process, a parsed `serde_json::Value` or a typed error.
//! - **`runner`**: The [`CommandRunner`] seam that executes the binary with
//!   captured output, so the client is testable without real processes.
//! - **`errors`**: The [`Error`] enum. A non-zero exit surfaces the child's
//!   stderr verbatim; unparseable stdout is reported as malformed output.
//! - **`types`**: [`TagFilter`] and [`CommandArguments`] newtypes.
//!
//! ## Example
//!
//! ```no_run
//! use cstore_client::{SecretPuller, TagFilter};
//!
//! # async fn demo() -> cstore_client::Result<()> {
//! let puller = SecretPuller::new("bin/cstore");
//! let config = puller.pull(&TagFilter::new("prod,db")).await?;
//! let _db_pass = config["DB_PASS"].as_str();
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod pull;
pub mod runner;
pub mod types;

pub use self::{
    errors::{Error, Result},
    pull::{PullOptions, SecretPuller},
    runner::{CommandRunner, SystemRunner},
    types::{CommandArguments, TagFilter},
};
