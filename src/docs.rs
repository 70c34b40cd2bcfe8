//! OpenAPI document for the documentation endpoint.

use crate::config::SwaggerConfig;
use crate::handlers;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::openapi::tag::TagBuilder;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::students::list_students,
        handlers::students::read_student,
        handlers::students::create_student,
        handlers::students::update_student,
        handlers::students::delete_student,
        handlers::users::list_users,
        handlers::users::read_user,
        handlers::users::create_user,
        handlers::users::delete_user,
    ),
    components(schemas(handlers::students::Student, handlers::users::User))
)]
struct ApiDoc;

/// Derive output plus env-sourced metadata and the bearer auth scheme.
/// Path annotations carry the default "/api" prefix; when the resolved
/// prefix differs, the documented paths are rewritten to match the routes
/// actually mounted.
pub fn build_openapi(cfg: &SwaggerConfig, prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if prefix != "/api" {
        let paths = std::mem::take(&mut doc.paths.paths);
        doc.paths.paths = paths
            .into_iter()
            .map(|(path, item)| {
                let rewritten = match path.strip_prefix("/api") {
                    Some(rest) => format!("{}{}", prefix, rest),
                    None => path,
                };
                (rewritten, item)
            })
            .collect();
    }
    doc.info.title = cfg.title.clone();
    doc.info.description = Some(cfg.description.clone());
    doc.info.version = cfg.version.clone();
    doc.tags = Some(vec![TagBuilder::new().name(cfg.tag.clone()).build()]);
    let components = doc.components.get_or_insert_with(Default::default);
    components.add_security_scheme(
        "bearer",
        SecurityScheme::Http(
            HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .build(),
        ),
    );
    doc
}
