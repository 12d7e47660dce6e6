use super::dto::{
    ChatRequest, ChatResponse, ErrorResponse, ThreadMessageRequest, ThreadResponse,
    ToolInventoryResponse,
};
use super::routes;
use crate::tooling::ToolSpec;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::chat::chat_handler,
        routes::chat::thread_chat_handler,
        routes::threads::thread_handler,
        routes::tools::tools_handler
    ),
    components(
        schemas(
            ChatRequest,
            ThreadMessageRequest,
            ChatResponse,
            ErrorResponse,
            ThreadResponse,
            ToolInventoryResponse,
            ToolSpec
        )
    ),
    tags(
        (name = "chat", description = "Send a message to the agent"),
        (name = "threads", description = "Stored conversation threads"),
        (name = "tools", description = "Tools available to the agent")
    )
)]
pub struct ApiDoc;
