//! Project tools

use serde_json::{Map, Value};

use super::{command_args, Catalog};
use crate::error::BuildError;
use crate::handlers::{
    BatchOpConfig, HttpMethod, NameLookup, OpMode, OpPath, SingleOpConfig, SyncOpConfig,
};
use crate::resolve::{ContainsIgnoreCase, ExactIgnoreCase};
use crate::schema::{FieldSpec, ItemSchema};

const VIEW_STYLES: &[&str] = &["list", "board"];

fn appearance_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::string(
            "color",
            "The color of the project icon. Refer to utils_get_colors for the available names",
        ),
        FieldSpec::boolean(
            "is_favorite",
            "Whether the project is a favorite (a true or false value)",
        ),
        FieldSpec::string_enum(
            "view_style",
            "This determines the way the project is displayed within the Todoist clients",
            VIEW_STYLES,
        ),
    ]
}

fn project_move_args(item: &Map<String, Value>, id: &str) -> Map<String, Value> {
    command_args(item, id, &["parent_id"])
}

pub(super) fn register(catalog: &mut Catalog<'_>) -> Result<(), BuildError> {
    catalog.single(
        SingleOpConfig::builder(
            "get_projects",
            "Get all projects from Todoist",
            HttpMethod::Get,
            "/projects",
        )
        .build()?,
    )?;

    catalog.single(
        SingleOpConfig::builder(
            "get_project",
            "Get a project from Todoist by ID",
            HttpMethod::Get,
            "/projects/{id}",
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("id", "ID of the project to retrieve").required(),
        ]))
        .build()?,
    )?;

    let mut create_fields = vec![
        FieldSpec::string("name", "Name of the project").required(),
        FieldSpec::string("parent_id", "Parent project ID"),
    ];
    create_fields.extend(appearance_fields());
    catalog.batch(
        BatchOpConfig::builder(
            "create_projects",
            "Create one or more projects in Todoist",
            HttpMethod::Post,
            OpPath::full("/projects"),
        )
        .schema(ItemSchema::new(create_fields))
        .build()?,
    )?;

    let mut update_fields = vec![
        FieldSpec::string("id", "ID of the project to update"),
        FieldSpec::string(
            "project_name",
            "Name of the project to search for when the ID is not known (case-insensitive partial match)",
        ),
        FieldSpec::string("name", "New name of the project"),
    ];
    update_fields.extend(appearance_fields());
    catalog.batch(
        BatchOpConfig::builder(
            "update_projects",
            "Update one or more projects in Todoist",
            HttpMethod::Post,
            OpPath::full("/projects/{id}"),
        )
        .schema(ItemSchema::new(update_fields))
        .mode(OpMode::Update)
        .id_field("id")
        .lookup(NameLookup::new("project_name", ContainsIgnoreCase::new("name")))
        .build()?,
    )?;

    // Deleting by a partial name is too easy to get wrong
    catalog.batch(
        BatchOpConfig::builder(
            "delete_projects",
            "Delete one or more projects in Todoist, including their tasks and sections",
            HttpMethod::Delete,
            OpPath::full("/projects/{id}"),
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("id", "ID of the project to delete"),
            FieldSpec::string(
                "name",
                "Exact name of the project to delete when the ID is not known (case-insensitive)",
            ),
        ]))
        .mode(OpMode::Delete)
        .id_field("id")
        .lookup(NameLookup::new("name", ExactIgnoreCase::new("name")))
        .build()?,
    )?;

    catalog.sync(
        SyncOpConfig::builder(
            "move_projects",
            "Move one or more projects under another parent project",
            "project_move",
            "id",
            project_move_args,
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("id", "ID of the project to move"),
            FieldSpec::string(
                "name",
                "Name of the project to search for when the ID is not known (case-insensitive partial match)",
            ),
            FieldSpec::string("parent_id", "ID of the new parent project").required(),
        ]))
        .lookup(NameLookup::new("name", ContainsIgnoreCase::new("name")), "/projects")
        .build()?,
    )?;

    catalog.single(
        SingleOpConfig::builder(
            "get_collaborators",
            "Get all collaborators for a project in Todoist",
            HttpMethod::Get,
            "/projects/{id}/collaborators",
        )
        .schema(ItemSchema::new(vec![
            FieldSpec::string("id", "ID of the project to get collaborators for").required(),
        ]))
        .build()?,
    )?;

    Ok(())
}
