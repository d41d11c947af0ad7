use crate::error::ConsoleResult;
use crate::models::{
    ImagePatch, NewProperty, NewRentalRequest, NewReview, Property, RentalRequest, ResolvedImage,
    Review, StagedImage,
};
use async_trait::async_trait;

/// Everything the console needs from the remote property store.
/// One method per endpoint, no retries.
#[async_trait]
pub trait PropertyGateway: Send + Sync {
    /// `GET /inmuebles`
    async fn list_properties(&self) -> ConsoleResult<Vec<Property>>;

    /// `GET /inmuebles/{id}`
    async fn get_property(&self, id: &str) -> ConsoleResult<Property>;

    /// `POST /inmuebles`; the store assigns the identifier
    async fn create_property(&self, property: &NewProperty) -> ConsoleResult<Property>;

    /// `PUT /inmuebles/{id}` with the full record
    async fn update_property(&self, id: &str, property: &NewProperty) -> ConsoleResult<Property>;

    /// `PUT /inmuebles/{id}` touching only the image references
    async fn patch_images(&self, id: &str, patch: &ImagePatch) -> ConsoleResult<Property>;

    /// `DELETE /inmuebles/{id}`
    async fn delete_property(&self, id: &str) -> ConsoleResult<()>;

    /// `POST /inmuebles/{id}/imagenes`, returns the assigned image identifiers
    async fn upload_images(&self, id: &str, files: &[StagedImage]) -> ConsoleResult<Vec<String>>;

    /// `GET /imagenes/{id}`
    async fn fetch_image(&self, id: &str) -> ConsoleResult<ResolvedImage>;

    /// `GET /inmuebles/{id}/solicitudes_renta`
    async fn list_rental_requests(&self, id: &str) -> ConsoleResult<Vec<RentalRequest>>;

    /// `POST /inmuebles/{id}/solicitudes_renta`
    async fn create_rental_request(
        &self,
        id: &str,
        request: &NewRentalRequest,
    ) -> ConsoleResult<RentalRequest>;

    /// `GET /inmuebles/{id}/resenas`
    async fn list_reviews(&self, id: &str) -> ConsoleResult<Vec<Review>>;

    /// `POST /inmuebles/{id}/resenas`
    async fn create_review(&self, id: &str, review: &NewReview) -> ConsoleResult<Review>;

    /// Short name used in log lines
    fn backend_name(&self) -> &'static str;
}
