use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "escritura")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Opaque public identifier embedded in the printed QR code.
    #[sea_orm(unique)]
    pub token: String,

    /// One of: activo, revision_requerida, inactivo
    pub estado: String,

    pub pdf_file_name: Option<String>,
    /// Content hash of the stored PDF in the archive. NULL until uploaded.
    pub pdf_hash: Option<String>,
    /// Page count reported by the extraction pipeline.
    pub num_pages: i32,

    /// 1-based page indices redacted from the public view.
    /// Stored as JSON array of integers.
    #[sea_orm(column_type = "JsonBinary")]
    pub hidden_pages: serde_json::Value,

    /// Extracted field set (otorgantes, beneficiarios, ubicación, ...).
    #[sea_orm(column_type = "JsonBinary")]
    pub datos_completos: serde_json::Value,

    pub foto_url: Option<String>,

    pub created_by: i32,
    #[sea_orm(belongs_to, from = "created_by", to = "id")]
    pub creator: BelongsTo<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
