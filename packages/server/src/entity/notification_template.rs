use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_template")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Template identifier shown in the office UI, e.g. "documento_listo".
    #[sea_orm(unique)]
    pub nombre: String,
    /// Message body with `{placeholder}` markers.
    pub mensaje: String,
    pub activo: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
