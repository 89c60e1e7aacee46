use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Langflow Relay",
        version = "0.1.0",
        description = "Forwards a chat message to a hosted Langflow flow and relays its reply."
    ),
    servers(
        (url = "http://localhost:8080", description = "Local dev")
    ),
    tags(
        (name = "relay", description = "Langflow relay endpoint"),
        (name = "health", description = "Liveness")
    ),
    // Handlers (paths)
    paths(
        crate::routes::query::query,
        crate::routes::health::health,
    ),
    // Schemas used in requests/responses
    components(
        schemas(
            crate::models::query::QueryRequest,
            crate::models::query::QueryResponse,
            crate::models::query::HealthResponse,
            crate::models::query::HealthEnvironment,
            crate::models::langflow::RunRequest,
            crate::models::common::ErrorMessage
        )
    )
)]
pub struct ApiDoc;
