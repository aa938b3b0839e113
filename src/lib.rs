//! # ConfOps Harness Library
//!
//! This crate is an integration-test harness for the ConfOps configuration-management
//! API. It exercises the full lifecycle of a profile-parameter association: create an
//! association between a profile and a parameter, read it back by its composite key,
//! and delete it again, with both a sequential and a concurrent deletion path.
//!
//! The harness talks to the API only through the [`session::ConfOpsSession`] trait, so
//! the HTTP transport, authentication, and wire encoding live entirely in the session
//! implementation. A bundled in-memory session ([`mock::InMemorySession`]) stands in
//! for the real service in tests and self-test runs.
//!
//! ## Crate Structure
//!
//! - **`config`**: Figment-based harness configuration (TOML file + environment
//!   overrides) with semantic validation.
//! - **`error`**: The `HarnessError` and `SessionError` enums plus the failure
//!   taxonomy used by the report.
//! - **`fixtures`**: The `FixtureSet` of seed records driving the dependency phases.
//! - **`logging`**: Tracing subscriber initialization from the harness config.
//! - **`mock`**: In-memory `ConfOpsSession` with configurable delays and fault
//!   injection, for tests and the self-test binary.
//! - **`model`**: Wire-shaped resource records (`Cdn`, `Profile`, `ProfileParameter`,
//!   ...) and the `Reply` envelope carrying body plus HTTP status.
//! - **`orchestrator`**: The `LifecycleSuite` that sequences fixture phases, the
//!   lookup-then-mutate delete procedure, and the concurrent fan-out variant.
//! - **`query`**: The canonical composite-key query builder.
//! - **`report`**: The shared, concurrency-safe failure sink.
//! - **`session`**: The `ConfOpsSession` CRUD trait, the seam to the real API.

pub mod config;
pub mod error;
pub mod fixtures;
pub mod logging;
pub mod mock;
pub mod model;
pub mod orchestrator;
pub mod query;
pub mod report;
pub mod session;
