use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Protocol number (filing code), e.g. `20241701022P04128`.
    #[sea_orm(unique)]
    pub codigo: String,
    /// Kind of notarial act, e.g. "Escritura", "Poder", "Declaración".
    pub tipo_documento: String,
    pub cliente: String,
    pub telefono: Option<String>,

    /// One of: en_proceso, listo, entregado, anulado
    pub estado: String,

    /// Matrizador responsible for the document. NULL while unassigned.
    pub asignado_a: Option<i32>,
    #[sea_orm(belongs_to, from = "asignado_a", to = "id")]
    pub asignado: BelongsTo<Option<super::user::Entity>>,

    /// Retrieval code generated when the document is marked ready; the
    /// client quotes it at the counter to pick the document up.
    pub codigo_retiro: Option<String>,
    /// Who picked the document up, recorded on delivery.
    pub entregado_a: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
