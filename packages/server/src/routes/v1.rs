use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
        .nest("/documents", document_routes())
        .nest("/escrituras", escritura_routes())
        .nest("/verify", verify_routes())
        .nest("/templates", template_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::admin::list_users))
        .routes(routes!(handlers::admin::update_user_role))
}

fn document_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::document::list_documents,
            handlers::document::create_document
        ))
        .routes(routes!(handlers::document::get_sequence_gaps))
        .routes(routes!(
            handlers::document::get_document,
            handlers::document::update_document,
            handlers::document::delete_document
        ))
        .routes(routes!(handlers::document::change_document_estado))
}

fn escritura_routes() -> OpenApiRouter<AppState> {
    let crud = OpenApiRouter::new()
        .routes(routes!(
            handlers::escritura::list_escrituras,
            handlers::escritura::create_escritura
        ))
        .routes(routes!(
            handlers::escritura::get_escritura,
            handlers::escritura::update_escritura,
            handlers::escritura::delete_escritura
        ))
        .routes(routes!(handlers::escritura::change_escritura_estado))
        .routes(routes!(handlers::escritura::set_hidden_pages))
        .routes(routes!(handlers::escritura::import_personas));

    let pdf = OpenApiRouter::new()
        .routes(routes!(
            handlers::escritura::upload_pdf,
            handlers::escritura::download_pdf
        ))
        .layer(handlers::escritura::pdf_body_limit());

    crud.merge(pdf)
}

fn verify_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::verify::verify_escritura))
        .routes(routes!(handlers::verify::resolve_page))
}

fn template_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::template::list_templates,
            handlers::template::create_template
        ))
        .routes(routes!(
            handlers::template::get_template,
            handlers::template::update_template,
            handlers::template::delete_template
        ))
        .routes(routes!(handlers::template::preview_template))
}
