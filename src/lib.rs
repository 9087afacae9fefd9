//! HiveWatch monitor library.
//!
//! Exposes the pure-logic modules and the host adapters for integration
//! testing.  The binary in `main.rs` only wires them together.

#![deny(unused_must_use)]

pub mod adapters;
pub mod alerts;
pub mod app;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fsm;
pub mod http;
pub mod model;
pub mod runtime;
pub mod scheduler;
pub mod sensors;
pub mod session;
pub mod storage;
