//! NextGCore Rust Integration Tests
//!
//! End-to-end NGAP flows between simulated gNBs and the AMF NGAP core. All
//! traffic crosses the APER codec in both directions.
//!
//! ## Test Categories
//!
//! - `interface`: NG Setup, NG Reset and association loss
//! - `session`: NAS transport and PDU session resource management
//! - `handover`: N2 handover preparation, execution, cancel and failure
//! - `runtime`: the same flows through the worker runtime and its timers
//! - `property`: randomized handover message sequences

pub mod handover;
pub mod interface;
pub mod property;
pub mod runtime;
pub mod session;
