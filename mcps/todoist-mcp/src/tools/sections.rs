//! Section tools

use serde_json::{Map, Value};

use super::{command_args, Catalog};
use crate::error::BuildError;
use crate::handlers::{
    BatchOpConfig, HttpMethod, NameLookup, OpMode, OpPath, SingleOpConfig, SyncOpConfig,
};
use crate::resolve::ContainsIgnoreCase;
use crate::schema::{FieldSpec, ItemSchema};

fn section_lookup() -> NameLookup {
    NameLookup::new("section_name", ContainsIgnoreCase::new("name"))
}

fn section_move_args(item: &Map<String, Value>, id: &str) -> Map<String, Value> {
    command_args(item, id, &["project_id"])
}

fn id_or_name(action: &'static str) -> Vec<FieldSpec> {
    vec![
        FieldSpec::string("id", action),
        FieldSpec::string(
            "section_name",
            "Name of the section to search for when the ID is not known (case-insensitive partial match)",
        ),
    ]
}

pub(super) fn register(catalog: &mut Catalog<'_>) -> Result<(), BuildError> {
    catalog.single(
        SingleOpConfig::builder(
            "get_sections",
            "Get all sections from Todoist",
            HttpMethod::Get,
            "/sections",
        )
        .schema(ItemSchema::new(vec![FieldSpec::string(
            "project_id",
            "Filter sections by project ID",
        )]))
        .build()?,
    )?;

    catalog.single(
        SingleOpConfig::builder(
            "get_section",
            "Get a section from Todoist by ID",
            HttpMethod::Get,
            "/sections/{id}",
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("id", "ID of the section to retrieve").required(),
        ]))
        .build()?,
    )?;

    catalog.batch(
        BatchOpConfig::builder(
            "create_sections",
            "Create one or more sections in Todoist",
            HttpMethod::Post,
            OpPath::full("/sections"),
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("name", "Section name").required(),
            FieldSpec::string("project_id", "Project ID this section should belong to").required(),
            FieldSpec::integer("order", "Order among other sections in a project"),
        ]))
        .build()?,
    )?;

    let mut update_fields = id_or_name("ID of the section to update");
    update_fields.push(FieldSpec::string("name", "New section name").required());
    catalog.batch(
        BatchOpConfig::builder(
            "update_sections",
            "Rename one or more sections in Todoist",
            HttpMethod::Post,
            OpPath::full("/sections/{id}"),
        )
        .schema(ItemSchema::new(update_fields))
        .mode(OpMode::Update)
        .id_field("id")
        .lookup(section_lookup())
        .build()?,
    )?;

    catalog.batch(
        BatchOpConfig::builder(
            "delete_sections",
            "Delete one or more sections in Todoist, including their tasks",
            HttpMethod::Delete,
            OpPath::full("/sections/{id}"),
        )
        .schema(ItemSchema::new(id_or_name("ID of the section to delete")))
        .mode(OpMode::Delete)
        .id_field("id")
        .lookup(section_lookup())
        .build()?,
    )?;

    let mut move_fields = id_or_name("ID of the section to move");
    move_fields.push(FieldSpec::string("project_id", "ID of the destination project").required());
    catalog.sync(
        SyncOpConfig::builder(
            "move_sections",
            "Move one or more sections to another project",
            "section_move",
            "id",
            section_move_args,
        )
        .schema(ItemSchema::new(move_fields))
        .lookup(section_lookup(), "/sections")
        .build()?,
    )?;

    Ok(())
}
