//! # labhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the versioned JSON API under `/api/v1`
//!   (`/printers`, `/jobs`, `/hubs`, `/sensors`, `/users`)
//! - Authenticate every API request from its `Authorization: Bearer` token
//!   before any handler logic runs
//! - Unwrap root-keyed request bodies (`{"job": {...}}`) into whitelisted
//!   domain parameters
//! - Map application results into HTTP responses, field errors (including
//!   mistyped body attributes) into `422`
//! - Publish an `OpenAPI` document at `/api/v1/swagger.json`
//!
//! ## Dependency rule
//! Depends on `labhub-app` (for port traits and services) and `labhub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod auth;
pub mod docs;
pub mod error;
pub mod extract;
pub mod router;
pub mod state;
pub mod views;
