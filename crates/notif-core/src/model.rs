//! # Action Data Model
//!
//! The canonical in-memory shape of a notification Action, plus the
//! enriched outbound [`ActionOut`] variant.
//!
//! These are plain records. They carry no validation of their own: the
//! codec checks every value against the schema before it is serialized, and
//! every wire document before it is materialized into one of these types.
//! Fields that the schema may reject when absent or null (`payload`,
//! `display_name`) are modelled as `Option` so that invalid values remain
//! representable and the codec can report them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::temporal::iso_local;

/// Version stamped on Actions that do not carry one.
pub const DEFAULT_VERSION: &str = "2.0.0";

/// Open key/value metadata attached to the whole Action.
pub type Context = Map<String, Value>;

/// Open key/value business data of one event.
pub type Payload = Map<String, Value>;

/// Open key/value metadata of one event.
pub type Metadata = Map<String, Value>;

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// Canonical notification envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Opaque identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Envelope version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Owning bundle.
    pub bundle: String,
    /// Emitting application.
    pub application: String,
    /// Event type within the application.
    pub event_type: String,
    /// UTC wall-clock instant of the event.
    #[serde(with = "iso_local")]
    pub timestamp: NaiveDateTime,
    /// Legacy account identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Organization identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    /// Free-form context.
    #[serde(default)]
    pub context: Context,
    /// Recipient selection.
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    /// Sub-events, in emission order.
    pub events: Vec<Event>,
}

impl Action {
    /// Start building an Action from its required envelope fields.
    pub fn builder(
        bundle: impl Into<String>,
        application: impl Into<String>,
        event_type: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> ActionBuilder {
        ActionBuilder::new(bundle, application, event_type, timestamp)
    }
}

/// One sub-event of an Action.
///
/// Keys other than `metadata` and `payload` are kept in
/// `additional_properties` so that lenient decoding preserves them; strict
/// validation rejects any Action where this map is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event-level metadata.
    #[serde(default)]
    pub metadata: Metadata,
    /// Business data. `None` serializes as `null` and fails validation.
    #[serde(default)]
    pub payload: Option<Payload>,
    /// Unrecognized sibling keys.
    #[serde(flatten)]
    pub additional_properties: Map<String, Value>,
}

impl Event {
    /// An event with empty metadata carrying `payload`.
    pub fn new(payload: Payload) -> Self {
        Self {
            metadata: Metadata::new(),
            payload: Some(payload),
            additional_properties: Map::new(),
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Recipient selection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(default)]
    pub only_admins: bool,
    #[serde(default)]
    pub ignore_user_preferences: bool,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
}

/// Outbound Action enriched with display names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOut {
    #[serde(flatten)]
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
}

impl ActionOut {
    /// Wrap `action` with an optional source descriptor.
    pub fn new(action: Action, source: Option<Source>) -> Self {
        Self { action, source }
    }
}

/// Display names of the bundle, application and event type of an Action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<DisplayName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle: Option<DisplayName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<DisplayName>,
}

/// A named descriptor inside [`Source`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl DisplayName {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
        }
    }
}

/// Builder for [`Action`].
///
/// Required envelope fields are taken up front; everything else defaults the
/// same way the schema does (`version` = [`DEFAULT_VERSION`], empty context,
/// no recipients). An Action built without events is representable but will
/// not pass validation.
#[derive(Debug, Clone)]
pub struct ActionBuilder {
    action: Action,
}

impl ActionBuilder {
    pub fn new(
        bundle: impl Into<String>,
        application: impl Into<String>,
        event_type: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            action: Action {
                id: None,
                version: default_version(),
                bundle: bundle.into(),
                application: application.into(),
                event_type: event_type.into(),
                timestamp,
                account_id: None,
                org_id: None,
                context: Context::new(),
                recipients: Vec::new(),
                events: Vec::new(),
            },
        }
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.action.id = Some(id);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.action.version = version.into();
        self
    }

    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.action.account_id = Some(account_id.into());
        self
    }

    pub fn org_id(mut self, org_id: impl Into<String>) -> Self {
        self.action.org_id = Some(org_id.into());
        self
    }

    pub fn context(mut self, context: Context) -> Self {
        self.action.context = context;
        self
    }

    /// Insert a single context entry.
    pub fn context_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.action.context.insert(key.into(), value.into());
        self
    }

    pub fn recipient(mut self, recipient: Recipient) -> Self {
        self.action.recipients.push(recipient);
        self
    }

    /// Append one event.
    pub fn event(mut self, event: Event) -> Self {
        self.action.events.push(event);
        self
    }

    /// Replace all events.
    pub fn events(mut self, events: Vec<Event>) -> Self {
        self.action.events = events;
        self
    }

    pub fn build(self) -> Action {
        self.action
    }
}
