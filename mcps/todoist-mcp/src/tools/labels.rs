//! Personal and shared label tools
//!
//! Shared labels have no ID, so rename and remove are plain posts keyed by
//! name.

use super::Catalog;
use crate::error::BuildError;
use crate::handlers::{BatchOpConfig, HttpMethod, OpMode, OpPath, SingleOpConfig};
use crate::schema::{FieldSpec, ItemSchema};

fn label_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::integer("order", "Number that is used by clients to sort list of labels"),
        FieldSpec::string(
            "color",
            "The color of the label icon. Refer to utils_get_colors for the available names",
        ),
        FieldSpec::boolean(
            "is_favorite",
            "Whether the label is a favorite (a true or false value)",
        ),
    ]
}

pub(super) fn register(catalog: &mut Catalog<'_>) -> Result<(), BuildError> {
    catalog.single(
        SingleOpConfig::builder(
            "get_labels",
            "Get all personal labels from Todoist",
            HttpMethod::Get,
            "/labels",
        )
        .build()?,
    )?;

    catalog.single(
        SingleOpConfig::builder(
            "get_label",
            "Get a personal label from Todoist by ID",
            HttpMethod::Get,
            "/labels/{id}",
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("id", "ID of the label to retrieve").required(),
        ]))
        .build()?,
    )?;

    let mut create_fields = vec![FieldSpec::string("name", "Name of the label").required()];
    create_fields.extend(label_fields());
    catalog.batch(
        BatchOpConfig::builder(
            "create_labels",
            "Create one or more personal labels in Todoist",
            HttpMethod::Post,
            OpPath::full("/labels"),
        )
        .schema(ItemSchema::new(create_fields))
        .build()?,
    )?;

    let mut update_fields = vec![
        FieldSpec::string("id", "ID of the label to update").required(),
        FieldSpec::string("name", "New name of the label"),
    ];
    update_fields.extend(label_fields());
    catalog.batch(
        BatchOpConfig::builder(
            "update_labels",
            "Update one or more personal labels in Todoist",
            HttpMethod::Post,
            OpPath::full("/labels/{id}"),
        )
        .schema(ItemSchema::new(update_fields))
        .mode(OpMode::Update)
        .id_field("id")
        .build()?,
    )?;

    catalog.batch(
        BatchOpConfig::builder(
            "delete_labels",
            "Delete one or more personal labels in Todoist",
            HttpMethod::Delete,
            OpPath::full("/labels/{id}"),
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("id", "ID of the label to delete").required(),
        ]))
        .mode(OpMode::Delete)
        .id_field("id")
        .build()?,
    )?;

    catalog.single(
        SingleOpConfig::builder(
            "get_shared_labels",
            "Get all shared labels from Todoist",
            HttpMethod::Get,
            "/labels/shared",
        )
        .schema(ItemSchema::new(vec![FieldSpec::boolean(
            "omit_personal",
            "Leave out the names of the user's personal labels",
        )]))
        .build()?,
    )?;

    catalog.batch(
        BatchOpConfig::builder(
            "rename_shared_labels",
            "Rename one or more shared labels in Todoist",
            HttpMethod::Post,
            OpPath::full("/labels/shared/rename"),
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("name", "The name of the existing label to rename").required(),
            FieldSpec::string("new_name", "The new name for the label").required(),
        ]))
        .build()?,
    )?;

    catalog.batch(
        BatchOpConfig::builder(
            "remove_shared_labels",
            "Remove one or more shared labels from all tasks in Todoist",
            HttpMethod::Post,
            OpPath::full("/labels/shared/remove"),
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("name", "The name of the label to remove").required(),
        ]))
        .build()?,
    )?;

    Ok(())
}
