use utoipa::OpenApi;

use crate::api::handlers::auth::types::{CredentialsInput, FieldError, UserBody, UserResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::auth::register::register,
        crate::api::handlers::auth::login::login,
        crate::api::handlers::auth::me::me,
    ),
    components(schemas(CredentialsInput, FieldError, UserBody, UserResponse)),
    tags(
        (name = "account", description = "User registration, login and session lookup"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::ApiDoc;
    use utoipa::OpenApi;

    #[test]
    fn document_lists_account_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/register"));
        assert!(paths.contains_key("/login"));
        assert!(paths.contains_key("/me"));
        assert!(paths.contains_key("/health"));
    }
}
