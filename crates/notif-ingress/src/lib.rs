//! # notif-ingress: Action Codec
//!
//! Decodes producer JSON into validated [`notif_core::Action`] values and
//! encodes Actions back to canonical JSON, rejecting anything that breaks a
//! schema or document rule in either direction.
//!
//! ## Profiles
//!
//! Input is decoded under a relaxed [`Profile`]: offset timestamps are
//! folded into UTC, `context` and `payload` may arrive as JSON strings, and
//! unknown event keys are kept. Output is encoded and validated under the
//! strict profile. Both are configurable through [`CodecConfig`].
//!
//! ## Legacy Records
//!
//! [`LegacyDecoder`] reads version-tagged record renderings from producers
//! that predate the canonical schema, projecting them through the
//! [`notif_schema::SchemaRegistry`] before decoding.

pub mod codec;
pub mod config;
pub mod error;
pub mod legacy;
pub mod profile;

pub use codec::ActionCodec;
pub use config::{CodecConfig, ConfigError};
pub use error::CodecError;
pub use legacy::{
    read_version, LegacyDecoder, LegacyEncoder, CURRENT_RECORD_VERSION, LEGACY_DEFAULT_VERSION,
};
pub use profile::{EmbeddedDocuments, Profile, UnknownEventProperties};
