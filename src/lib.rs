// Library root
// -----------
// The binary (`main.rs`) is a thin shell over these modules so the whole
// command contract can be exercised from tests.
//
// Module responsibilities:
// - `api`: the `Talk` record and the blocking HTTP client for the
//   registry's two endpoints.
// - `cli`: clap argument definitions and the `run` dispatcher.
// - `ui`: the `talks` and `new` handlers and the listing format.
// - `error`: the shared error type and its exit codes.
pub mod api;
pub mod cli;
pub mod error;
pub mod ui;

pub use api::{ApiClient, Talk};
pub use cli::{run, Cli, Commands};
pub use error::TalksError;
