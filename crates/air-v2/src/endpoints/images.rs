//! Node images.

use crate::endpoints::accounts::Account;
use crate::endpoints::organizations::Organization;
use crate::mixins::{GetApi, ListApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Fetch, FieldKind, FieldSpec, Identity, ModelSchema};

const OPTIONAL_STR: FieldKind = FieldKind::Optional(&FieldKind::Str);

static IMAGE: ModelSchema = ModelSchema {
    name: "Image",
    path: "images",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("agent_enabled", FieldKind::Bool),
        FieldSpec::new("archived", FieldKind::Bool),
        FieldSpec::new("bios", FieldKind::Optional(&FieldKind::Model(Image::schema))).foreign_key(),
        FieldSpec::new("bus", FieldKind::Str),
        FieldSpec::new("console_support", FieldKind::Dict),
        FieldSpec::new("cpu_arch", FieldKind::Str),
        FieldSpec::new("created", FieldKind::DateTime),
        FieldSpec::new("default_username", OPTIONAL_STR),
        FieldSpec::new("default_password", OPTIONAL_STR),
        FieldSpec::new("features", FieldKind::Dict),
        FieldSpec::new("modified", FieldKind::Optional(&FieldKind::DateTime)),
        FieldSpec::new("mountpoint", OPTIONAL_STR),
        FieldSpec::new("minimum_resources", FieldKind::Dict),
        FieldSpec::new("name", OPTIONAL_STR),
        FieldSpec::new("notes", OPTIONAL_STR),
        FieldSpec::new(
            "organization",
            FieldKind::Optional(&FieldKind::Model(Organization::schema)),
        )
        .foreign_key(),
        FieldSpec::new("published", FieldKind::Optional(&FieldKind::Bool)),
        FieldSpec::new("provider", OPTIONAL_STR),
        FieldSpec::new("release_notes", OPTIONAL_STR),
        FieldSpec::new("simx", OPTIONAL_STR),
        FieldSpec::new("size", FieldKind::Int),
        FieldSpec::new("upload_status", FieldKind::Str),
        FieldSpec::new("uploader", FieldKind::Optional(&FieldKind::Model(Account::schema)))
            .foreign_key(),
        FieldSpec::new("user_manual", OPTIONAL_STR),
        FieldSpec::new("version", FieldKind::Str),
        FieldSpec::new("can_edit", FieldKind::Bool),
        FieldSpec::new("organization_name", OPTIONAL_STR),
        FieldSpec::new("uploader_username", OPTIONAL_STR),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Detail,
    post_load: None,
    supports: &[],
};

air_model!(
    /// A disk image nodes boot from. Images may reference a separate BIOS image.
    Image,
    &IMAGE
);

air_endpoint!(
    /// Images endpoint.
    ImageEndpoint,
    Image
);

impl ListApi for ImageEndpoint {}

impl GetApi for ImageEndpoint {}
