use crate::routes::{face, root};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        root::handlers::root,
        root::handlers::health_check,
        // Face handlers
        face::handlers::trigger_handler,
        face::handlers::enqueue_job_handler,
        face::handlers::processing_status_handler,
        face::handlers::check_profile_handler,
        face::handlers::recall_search_handler,
        face::handlers::selfie_search_handler,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Face", description = "Face processing pipeline and gallery face search"),
        (name = "System", description = "Health check"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
