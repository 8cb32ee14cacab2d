//! OpenAPI/Utoipa configuration.

use crate::api::{admin_alerts::ADMIN_ALERTS_TAG, health::MISC_TAG, users::USERS_TAG};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Security addon for OpenAPI documentation.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    #[tracing::instrument(skip(self, openapi))]
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            let bearer = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some(
                    "Access token issued by the Climatrix SL auth service. Admin routes require the Admin role.",
                ))
                .build();
            components.add_security_scheme("Authorization", SecurityScheme::Http(bearer));
        }
    }
}

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Climatrix SL Alerts API",
        version = "1.0.0",
        description = "Email alert dispatch and alert opt-in management for Climatrix SL."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = ADMIN_ALERTS_TAG, description = "Bulk alert dispatch"),
        (name = USERS_TAG, description = "Email alert opt-in management")
    )
)]
pub struct ApiDoc;
