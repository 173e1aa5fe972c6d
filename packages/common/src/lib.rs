pub mod access;
pub mod datos;
pub mod document_status;
pub mod escritura_estado;
pub mod gaps;
pub mod import;
pub mod notify;
pub mod persona;
pub mod protocol;
pub mod storage;

pub use document_status::DocumentStatus;
pub use escritura_estado::EscrituraEstado;
pub use persona::{DocumentoTipo, Persona};
