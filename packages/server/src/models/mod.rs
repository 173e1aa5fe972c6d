pub mod admin;
pub mod auth;
pub mod document;
pub mod escritura;
pub mod shared;
pub mod template;
pub mod verify;
