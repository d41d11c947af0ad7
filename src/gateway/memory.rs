use crate::error::{ConsoleError, ConsoleResult};
use crate::gateway::traits::PropertyGateway;
use crate::identifier::is_object_id;
use crate::models::{
    Contract, ContractStatus, ImagePatch, NewProperty, NewRentalRequest, NewReview, PaymentStatus,
    Price, Property, RentPayment, RentalRequest, RequestStatus, ResolvedImage, Review,
    StagedImage,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

/// Endpoints that can be switched into failure mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListProperties,
    GetProperty,
    CreateProperty,
    UpdateProperty,
    UploadImages,
    DeleteProperty,
    RentalRequests,
    Reviews,
}

#[derive(Default)]
struct State {
    properties: Vec<Property>,
    reviews: HashMap<String, Vec<Review>>,
    images: HashMap<String, ResolvedImage>,
    failing_images: HashSet<String>,
    image_delays: HashMap<String, Duration>,
    failing_endpoints: HashSet<Endpoint>,
    next_id: u64,
}

impl State {
    fn assign_id(&mut self) -> String {
        self.next_id += 1;
        format!("64f5a53d{:016x}", self.next_id)
    }

    fn property_mut(&mut self, id: &str) -> ConsoleResult<&mut Property> {
        self.properties
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ConsoleError::NotFound(format!("/inmuebles/{}", id)))
    }

    fn check(&self, endpoint: Endpoint, path: &str) -> ConsoleResult<()> {
        if self.failing_endpoints.contains(&endpoint) {
            Err(connection_refused(path))
        } else {
            Ok(())
        }
    }
}

fn connection_refused(path: &str) -> ConsoleError {
    ConsoleError::transport(
        format!("memory://{}", path),
        io::Error::new(io::ErrorKind::ConnectionRefused, "simulated network failure"),
    )
}

/// Process-local stand-in for the property API.
/// Backs the `--demo` mode and the test suites.
#[derive(Default)]
pub struct InMemoryGateway {
    state: Mutex<State>,
    image_fetches: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store an image and return its identifier
    pub fn insert_image(&self, url: impl Into<String>) -> String {
        let mut state = self.lock();
        let id = state.assign_id();
        state.images.insert(
            id.clone(),
            ResolvedImage {
                id: id.clone(),
                url: url.into(),
            },
        );
        id
    }

    /// Store a property as-is, assigning an identifier
    pub fn insert_property(&self, property: NewProperty) -> String {
        let mut state = self.lock();
        let id = state.assign_id();
        state.properties.push(Property {
            id: id.clone(),
            location: property.location,
            price: property.price,
            features: property.features,
            available: property.available,
            images: property.images,
            description: property.description,
            rental_requests: Vec::new(),
            contracts: Vec::new(),
        });
        id
    }

    /// Make every fetch of `image_id` fail with a transport error
    pub fn fail_image(&self, image_id: &str) {
        self.lock().failing_images.insert(image_id.to_string());
    }

    pub fn delay_image(&self, image_id: &str, delay: Duration) {
        self.lock().image_delays.insert(image_id.to_string(), delay);
    }

    pub fn fail_endpoint(&self, endpoint: Endpoint) {
        self.lock().failing_endpoints.insert(endpoint);
    }

    /// How many times `fetch_image` reached the store
    pub fn image_fetch_count(&self) -> usize {
        self.image_fetches.load(Ordering::SeqCst)
    }

    /// Gateway preloaded with a handful of Mexico City listings
    pub fn with_demo_data() -> Self {
        info!("📋 Loading demo properties into the in-memory store");

        let gateway = Self::new();
        let tenant = "64f5a53d1234567890abcdef".to_string();
        // 1x1 transparent PNG
        let pixel = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";
        let cover = gateway.insert_image(format!("data:image/png;base64,{}", pixel));

        let listings = [
            ("Av. Reforma 100, Juárez", 15_000u32, vec!["wifi", "estacionamiento"], true),
            ("Calle Durango 245, Roma Norte", 18_500, vec!["balcón", "amueblado"], true),
            ("Av. Universidad 1200, Xoco", 12_000, vec!["gimnasio"], false),
            ("Calle Tamaulipas 30, Condesa", 22_000, vec!["terraza", "mascotas"], true),
        ];

        let mut ids = Vec::new();
        for (i, (location, price, features, available)) in listings.into_iter().enumerate() {
            let id = gateway.insert_property(NewProperty {
                location: location.to_string(),
                price: Price::from(price),
                features: features.into_iter().map(String::from).collect(),
                available,
                images: if i == 0 { vec![cover.clone()] } else { vec![] },
                description: None,
            });
            ids.push(id);
        }

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        let end = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).single();
        {
            let mut state = gateway.lock();
            if let Ok(property) = state.property_mut(&ids[2]) {
                property.contracts.push(Contract {
                    id: None,
                    tenant_id: tenant.clone(),
                    status: ContractStatus::Active,
                    start_date: start,
                    end_date: end,
                    monthly_rent: 12_000.0,
                    payments: vec![RentPayment {
                        date: start,
                        amount: 12_000.0,
                        status: PaymentStatus::Paid,
                    }],
                });
            }
            if let Ok(property) = state.property_mut(&ids[1]) {
                property.rental_requests.push(RentalRequest {
                    id: None,
                    requester_id: tenant,
                    status: RequestStatus::Pending,
                    requested_at: start,
                });
            }
        }

        gateway
    }
}

#[async_trait]
impl PropertyGateway for InMemoryGateway {
    async fn list_properties(&self) -> ConsoleResult<Vec<Property>> {
        let state = self.lock();
        state.check(Endpoint::ListProperties, "/inmuebles")?;
        Ok(state.properties.clone())
    }

    async fn get_property(&self, id: &str) -> ConsoleResult<Property> {
        let mut state = self.lock();
        state.check(Endpoint::GetProperty, "/inmuebles/{id}")?;
        state.property_mut(id).map(|p| p.clone())
    }

    async fn create_property(&self, property: &NewProperty) -> ConsoleResult<Property> {
        self.lock().check(Endpoint::CreateProperty, "/inmuebles")?;
        let id = self.insert_property(property.clone());
        debug!("Created property {}", id);
        self.lock().property_mut(&id).map(|p| p.clone())
    }

    async fn update_property(&self, id: &str, property: &NewProperty) -> ConsoleResult<Property> {
        let mut state = self.lock();
        state.check(Endpoint::UpdateProperty, "/inmuebles/{id}")?;
        let stored = state.property_mut(id)?;
        stored.location = property.location.clone();
        stored.price = property.price;
        stored.features = property.features.clone();
        stored.available = property.available;
        stored.images = property.images.clone();
        stored.description = property.description.clone();
        Ok(stored.clone())
    }

    async fn patch_images(&self, id: &str, patch: &ImagePatch) -> ConsoleResult<Property> {
        let mut state = self.lock();
        state.check(Endpoint::UpdateProperty, "/inmuebles/{id}")?;
        let stored = state.property_mut(id)?;
        stored.images = patch.images.clone();
        Ok(stored.clone())
    }

    async fn delete_property(&self, id: &str) -> ConsoleResult<()> {
        let mut state = self.lock();
        state.check(Endpoint::DeleteProperty, "/inmuebles/{id}")?;
        let before = state.properties.len();
        state.properties.retain(|p| p.id != id);
        if state.properties.len() == before {
            return Err(ConsoleError::NotFound(format!("/inmuebles/{}", id)));
        }
        state.reviews.remove(id);
        Ok(())
    }

    async fn upload_images(&self, id: &str, files: &[StagedImage]) -> ConsoleResult<Vec<String>> {
        let mut state = self.lock();
        state.check(Endpoint::UploadImages, "/inmuebles/{id}/imagenes")?;
        state.property_mut(id)?;

        let mut assigned = Vec::with_capacity(files.len());
        for file in files {
            let image_id = state.assign_id();
            let url = format!("data:{};base64,{}", file.content_type, STANDARD.encode(&file.bytes));
            state.images.insert(
                image_id.clone(),
                ResolvedImage {
                    id: image_id.clone(),
                    url,
                },
            );
            assigned.push(image_id);
        }
        Ok(assigned)
    }

    async fn fetch_image(&self, id: &str) -> ConsoleResult<ResolvedImage> {
        if !is_object_id(id) {
            return Err(ConsoleError::InvalidIdentifier(id.to_string()));
        }
        self.image_fetches.fetch_add(1, Ordering::SeqCst);

        let delay = self.lock().image_delays.get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.lock();
        if state.failing_images.contains(id) {
            return Err(connection_refused(&format!("/imagenes/{}", id)));
        }
        state
            .images
            .get(id)
            .cloned()
            .ok_or_else(|| ConsoleError::NotFound(format!("/imagenes/{}", id)))
    }

    async fn list_rental_requests(&self, id: &str) -> ConsoleResult<Vec<RentalRequest>> {
        let mut state = self.lock();
        state.check(Endpoint::RentalRequests, "/inmuebles/{id}/solicitudes_renta")?;
        Ok(state.property_mut(id)?.rental_requests.clone())
    }

    async fn create_rental_request(
        &self,
        id: &str,
        request: &NewRentalRequest,
    ) -> ConsoleResult<RentalRequest> {
        let mut state = self.lock();
        state.check(Endpoint::RentalRequests, "/inmuebles/{id}/solicitudes_renta")?;
        let request_id = state.assign_id();
        let created = RentalRequest {
            id: Some(request_id),
            requester_id: request.requester_id.clone(),
            status: request.status,
            requested_at: Some(Utc::now()),
        };
        state.property_mut(id)?.rental_requests.push(created.clone());
        Ok(created)
    }

    async fn list_reviews(&self, id: &str) -> ConsoleResult<Vec<Review>> {
        let mut state = self.lock();
        state.check(Endpoint::Reviews, "/inmuebles/{id}/resenas")?;
        state.property_mut(id)?;
        Ok(state.reviews.get(id).cloned().unwrap_or_default())
    }

    async fn create_review(&self, id: &str, review: &NewReview) -> ConsoleResult<Review> {
        let mut state = self.lock();
        state.check(Endpoint::Reviews, "/inmuebles/{id}/resenas")?;
        state.property_mut(id)?;
        let review_id = state.assign_id();
        let created = Review {
            id: Some(review_id),
            requester_id: review.requester_id.clone(),
            rating: review.rating,
            comment: review.comment.clone(),
            created_at: Some(Utc::now()),
        };
        state
            .reviews
            .entry(id.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
