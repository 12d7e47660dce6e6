//! Tools the model can call, and the registry that validates their arguments.

pub mod error;
pub mod lookup;
pub mod registry;
pub mod search;
pub mod tool;

pub use error::{RegistryError, SearchError, ToolError};
pub use lookup::{EMPLOYEE_LOOKUP, EmployeeLookupTool};
pub use registry::ToolRegistry;
pub use search::{Document, DocumentSearch, HttpDocumentSearch, ScoredDocument};
pub use tool::{Tool, ToolSpec};
