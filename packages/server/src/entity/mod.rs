pub mod document;
pub mod escritura;
pub mod notification_template;
pub mod role;
pub mod role_permission;
pub mod user;
