// Library root
// -----------
// This crate exposes the pieces the console binary (`main.rs`) wires
// together.
//
// Module responsibilities:
// - `config`: Loads and validates `appsettings.json`.
// - `auth`: Client-credentials token provider behind the `TokenSource`
//   trait.
// - `api`: Raw blocking HTTP client with request interceptors; the bearer
//   interceptor injects tokens.
// - `graph`: Typed OneNote client and the multipart page creator.
// - `onenote`: Get-or-create orchestration for notebook, section and page.
// - `ui`: Spinner and status lines for the console run.
//
// Clients are built once in `main` and passed down, so the orchestration
// can be tested against in-memory fakes.
pub mod api;
pub mod auth;
pub mod config;
pub mod graph;
pub mod onenote;
pub mod ui;
