//! # notif-schema: Schema Layer for Notification Actions
//!
//! Two independent schema systems live here:
//!
//! - **JSON Schema** governs the canonical Action document. A
//!   [`StructuralValidator`] applies declared defaults, collects every
//!   structural violation (with `date-time` and `uuid` formats backed by the
//!   same parsers the data model uses), then runs post-structural
//!   [`DocumentRule`]s such as [`AtLeastOneOf`].
//! - **Record schemas** govern the historical wire versions. The
//!   [`SchemaRegistry`] loads them on demand and [`record::project`] resolves
//!   a document written under one version into the shape of another.
//!
//! Schema documents are resources: compiled in by default
//! ([`EmbeddedResources`]) or read from a directory
//! ([`DirectoryResources`]).

pub mod defaults;
pub mod error;
pub mod formats;
pub mod record;
pub mod registry;
pub mod resources;
pub mod rules;
pub mod validate;

pub use error::SchemaError;
pub use record::{FieldType, GenericRecord, RecordField, RecordSchema};
pub use registry::{SchemaHandle, SchemaRegistry};
pub use resources::{
    DirectoryResources, EmbeddedResources, ResourceSource, ACTION_OUT_SCHEMA, ACTION_SCHEMA,
};
pub use rules::{AtLeastOneOf, DocumentRule};
pub use validate::{StructuralValidator, ValidationViolations, Violation, ViolationKind};
