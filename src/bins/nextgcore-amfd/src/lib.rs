//! NextGCore AMF NGAP core
//!
//! UE context registry, handover state machine and the message handlers
//! between the NGAP codec (`ogs-ngap`) and the transport. The daemon in
//! `main.rs` wires this library to a worker runtime.

pub mod amf;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod gnb;
pub mod handover;
pub mod ngap_build;
pub mod ngap_handler;
pub mod runtime;

#[cfg(test)]
mod property_tests;

pub use amf::Amf;
pub use config::{AmfConfig, AmfProfile, ConfigError};
pub use context::{AssocId, RanKey, UeHandle, UeNgapContext, UeRegistry};
pub use error::{AmfError, AmfResult, RegistryError, UeKey};
pub use event::{AmfIndication, DecodedMessage, HandoverStep, OutboundMessage};
pub use handover::{HandoverPhase, HandoverSession};
pub use runtime::{Runtime, RuntimeOutputs};
