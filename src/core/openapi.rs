use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth::model::AuthenticatedUser;
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        files_handlers::list_files,
        files_handlers::upload_file,
        files_handlers::download_file,
        files_handlers::search_files,
    ),
    components(
        schemas(
            ApiResponse<files_dtos::FileInfoDto>,
            ApiResponse<files_dtos::FileListResponseDto>,
            ApiResponse<files_dtos::SearchFilesResponseDto>,
            Meta,
            AuthenticatedUser,
            files_dtos::FileInfoDto,
            files_dtos::FileListResponseDto,
            files_dtos::SearchFilesResponseDto,
            files_dtos::UploadFileDto,
            files_dtos::FileSortBy,
        )
    ),
    tags(
        (name = "files", description = "Upload, download, list and search files"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "File Gateway API",
        version = "0.1.0",
        description = "API documentation for the file gateway",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
