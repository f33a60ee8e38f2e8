//! Pur Beurre web application library.
//!
//! The binary in `main.rs` only wires configuration, telemetry and the
//! listener; everything servable lives here so route tests can drive the
//! same router with `tower::ServiceExt::oneshot`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
