//! REST surface over an [`Agent`](crate::agent::Agent).

mod docs;
mod dto;
mod error;
mod router;
mod routes;
mod state;

pub use docs::ApiDoc;
pub use dto::{
    ChatRequest, ChatResponse, ErrorResponse, ThreadMessageRequest, ThreadResponse,
    ToolInventoryResponse,
};
pub use error::ServerError;
pub use router::{build_router, serve, serve_listener};
pub use state::ServerState;
