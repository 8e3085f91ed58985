//! # notif-core: Foundational Types for Notification Actions
//!
//! Defines the canonical data model exchanged by notification producers and
//! consumers, and the temporal codec that normalizes every timestamp to a
//! zone-less UTC wall-clock value.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `notif-*` crates (this is the leaf of the DAG).
//! - No `panic!()` or `.unwrap()` outside tests.
//! - The model types are plain records; validation lives in `notif-schema`
//!   and is orchestrated by `notif-ingress`.

pub mod error;
pub mod model;
pub mod temporal;

pub use error::TemporalError;
pub use model::{
    Action, ActionBuilder, ActionOut, Context, DisplayName, Event, Metadata, Payload, Recipient,
    Source, DEFAULT_VERSION,
};
pub use temporal::TemporalMode;
