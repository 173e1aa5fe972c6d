use sea_orm::*;
use tracing::info;

use crate::entity::{role, role_permission};

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &["admin", "matrizador", "caja", "recepcion"];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: all permissions
    ("admin", "document:create"),
    ("admin", "document:edit"),
    ("admin", "document:delete"),
    ("admin", "document:deliver"),
    ("admin", "document:view_all"),
    ("admin", "escritura:create"),
    ("admin", "escritura:edit"),
    ("admin", "escritura:delete"),
    ("admin", "escritura:view"),
    ("admin", "template:manage"),
    ("admin", "user:manage"),
    // Matrizador: drafts documents and escrituras
    ("matrizador", "document:create"),
    ("matrizador", "document:edit"),
    ("matrizador", "document:view_all"),
    ("matrizador", "escritura:create"),
    ("matrizador", "escritura:edit"),
    ("matrizador", "escritura:view"),
    // Caja: dashboard, gap audits, payments and delivery
    ("caja", "document:create"),
    ("caja", "document:edit"),
    ("caja", "document:deliver"),
    ("caja", "document:view_all"),
    // Recepción: front desk lookups and handover
    ("recepcion", "document:deliver"),
    ("recepcion", "document:view_all"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(role::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => perms_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}
