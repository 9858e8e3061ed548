//! # waveplus-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve `GET /metrics` in the Prometheus text exposition format; every
//!   scrape runs exactly one acquisition cycle through a
//!   [`MetricsSource`](waveplus_app::ports::MetricsSource)
//! - Hand failed cycles to the
//!   [`FailureHandler`](waveplus_app::failure::FailureHandler) and map the
//!   outcome to `500` (terminal) or `503` (isolated)
//! - Serve `GET /health` for liveness checks
//!
//! ## Dependency rule
//! Depends on `waveplus-app` (for port traits and failure handling) and
//! `waveplus-domain` (for the metric family model). Never leaks axum types
//! into the domain.

pub mod error;
pub mod exposition;
pub mod metrics;
pub mod router;
pub mod state;
