use common::datos::DatosCompletos;
use serde::Serialize;

/// Everything a public visitor holding a verification token gets to see.
///
/// Built from an `activo` escritura only; the persona lists are already
/// sanitized and the staff photo URL is never included.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PublicEscrituraResponse {
    pub token: String,
    pub num_pages: i32,
    /// Pages the viewer must render as redacted placeholders.
    pub hidden_pages: Vec<u32>,
    /// Sanitized extracted field set.
    pub datos: DatosCompletos,
}
