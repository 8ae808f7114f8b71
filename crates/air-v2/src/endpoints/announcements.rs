//! Platform announcements.

use crate::mixins::{CreateApi, DeleteApi, ListApi};
use crate::model::{air_endpoint, air_model};
use crate::schema::{Capability, Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use serde::Serialize;
use validator::Validate;

static ANNOUNCEMENT: ModelSchema = ModelSchema {
    name: "Announcement",
    path: "announcements",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("severity", FieldKind::Str),
        FieldSpec::new("created", FieldKind::DateTime),
        FieldSpec::new("modified", FieldKind::DateTime),
        FieldSpec::new("message", FieldKind::Optional(&FieldKind::Str)),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Detail,
    post_load: None,
    supports: &[Capability::Delete],
};

air_model!(
    /// A message shown to platform users.
    Announcement,
    &ANNOUNCEMENT
);

air_endpoint!(
    /// Announcements endpoint.
    AnnouncementEndpoint,
    Announcement
);

/// Body of [`AnnouncementEndpoint::create`](CreateApi::create).
#[derive(Debug, Clone, Serialize, Validate)]
pub struct AnnouncementCreate {
    /// Severity level, e.g. `INFO`
    #[validate(length(min = 1))]
    pub severity: String,
    /// Message text
    pub message: String,
}

impl ListApi for AnnouncementEndpoint {}

impl CreateApi for AnnouncementEndpoint {
    type Request = AnnouncementCreate;
}

impl DeleteApi for AnnouncementEndpoint {}
