//! Property-management console core: typed access to the rental property
//! API, concurrent image resolution, view assembly and multi-step writes.

pub mod assembler;
pub mod error;
pub mod fanout;
pub mod gateway;
pub mod identifier;
pub mod models;
pub mod orchestrator;

pub use assembler::{assemble_detail, dashboard_stats, load_dashboard, load_listing};
pub use error::{Action, ConsoleError, ConsoleResult, OperationError, ValidationErrors};
pub use fanout::{resolve_images, ImageBatch};
pub use gateway::{GatewayConfig, HttpGateway, InMemoryGateway, ListingFilter, PropertyGateway};
pub use identifier::{is_object_id, RequesterId};
pub use orchestrator::{
    delete_property, save_property, submit_rental_request, submit_review, PropertyDraft,
};
