//! Multi-step writes: property create/update with image attachment,
//! deletion, rental requests and reviews.

use crate::error::{Action, ActionContext, OperationError, ValidationErrors};
use crate::gateway::PropertyGateway;
use crate::identifier::RequesterId;
use crate::models::{
    ImagePatch, NewProperty, NewRentalRequest, NewReview, Price, Property, Rating, RentalRequest,
    RequestStatus, Review, StagedImage,
};
use reqwest::multipart::Part;
use tracing::{debug, info};

/// Property form contents before submission
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDraft {
    pub location: String,
    /// `None` when the field was left empty
    pub price: Option<f64>,
    pub features: Vec<String>,
    pub available: bool,
    /// Image references the property already has
    pub images: Vec<String>,
    pub description: Option<String>,
}

impl Default for PropertyDraft {
    fn default() -> Self {
        Self {
            location: String::new(),
            price: None,
            features: vec![String::new()],
            available: true,
            images: Vec::new(),
            description: None,
        }
    }
}

impl From<&Property> for PropertyDraft {
    fn from(property: &Property) -> Self {
        Self {
            location: property.location.clone(),
            price: Some(property.price.value()),
            features: property.features.clone(),
            available: property.available,
            images: property.images.clone(),
            description: property.description.clone(),
        }
    }
}

impl PropertyDraft {
    /// Check required fields and build the outgoing record.
    /// Blank features are dropped.
    pub fn validate(&self) -> Result<NewProperty, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let location = self.location.trim();
        if location.is_empty() {
            errors.push("location is required");
        }

        let price = match self.price {
            None => {
                errors.push("price is required");
                None
            }
            Some(raw) => match Price::new(raw) {
                Ok(price) => Some(price),
                Err(message) => {
                    errors.push(message);
                    None
                }
            },
        };

        let (Some(price), true) = (price, errors.is_empty()) else {
            return Err(errors);
        };

        Ok(NewProperty {
            location: location.to_string(),
            price,
            features: self
                .features
                .iter()
                .filter(|f| !f.trim().is_empty())
                .cloned()
                .collect(),
            available: self.available,
            images: self.images.clone(),
            description: self
                .description
                .as_ref()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        })
    }
}

/// Every staged file must carry a content type the multipart encoder accepts
fn check_staged_images(staged: &[StagedImage], errors: &mut ValidationErrors) {
    for file in staged {
        if Part::bytes(Vec::new()).mime_str(&file.content_type).is_err() {
            errors.push(format!(
                "{}: unsupported content type {:?}",
                file.file_name, file.content_type
            ));
        }
    }
}

/// Existing references followed by the new ones, without adding repeats
pub fn merge_image_refs(existing: &[String], uploaded: &[String]) -> Vec<String> {
    let mut merged = existing.to_vec();
    for id in uploaded {
        if !merged.contains(id) {
            merged.push(id.clone());
        }
    }
    merged
}

/// Create (`existing_id == None`) or update a property, then attach any
/// staged images. Stops at the first failing step; completed steps are
/// not rolled back.
pub async fn save_property<G>(
    gateway: &G,
    existing_id: Option<&str>,
    draft: &PropertyDraft,
    staged: &[StagedImage],
) -> Result<Property, OperationError>
where
    G: PropertyGateway + ?Sized,
{
    let mut problems = ValidationErrors::new();
    let record = draft.validate().map_err(|e| problems.extend(e)).ok();
    check_staged_images(staged, &mut problems);
    let (Some(record), true) = (record, problems.is_empty()) else {
        return Err(problems).during(Action::SaveProperty);
    };

    let saved = match existing_id {
        None => {
            let created = gateway
                .create_property(&record)
                .await
                .during(Action::SaveProperty)?;
            info!("Created property {} at {}", created.id, created.location);
            created
        }
        Some(id) => {
            let updated = gateway
                .update_property(id, &record)
                .await
                .during(Action::SaveProperty)?;
            info!("Updated property {}", updated.id);
            updated
        }
    };

    if staged.is_empty() {
        return Ok(saved);
    }

    debug!("Uploading {} staged image(s) for {}", staged.len(), saved.id);
    let uploaded = gateway
        .upload_images(&saved.id, staged)
        .await
        .during(Action::SaveProperty)?;

    let patch = ImagePatch {
        images: merge_image_refs(&record.images, &uploaded),
    };
    let patched = gateway
        .patch_images(&saved.id, &patch)
        .await
        .during(Action::SaveProperty)?;
    info!("Attached {} image(s) to property {}", uploaded.len(), patched.id);

    Ok(patched)
}

/// Deletion of nested requests and reviews is left to the store
pub async fn delete_property<G>(gateway: &G, id: &str) -> Result<(), OperationError>
where
    G: PropertyGateway + ?Sized,
{
    gateway
        .delete_property(id)
        .await
        .during(Action::DeleteProperty)?;
    info!("Deleted property {}", id);
    Ok(())
}

/// Post a pending request on behalf of `requester` and return the
/// refreshed request list
pub async fn submit_rental_request<G>(
    gateway: &G,
    property_id: &str,
    requester: &RequesterId,
) -> Result<Vec<RentalRequest>, OperationError>
where
    G: PropertyGateway + ?Sized,
{
    let request = NewRentalRequest {
        requester_id: requester.as_str().to_string(),
        status: RequestStatus::Pending,
    };
    gateway
        .create_rental_request(property_id, &request)
        .await
        .during(Action::SubmitRentalRequest)?;
    info!("Rental request sent for property {} by {}", property_id, requester);

    gateway
        .list_rental_requests(property_id)
        .await
        .during(Action::SubmitRentalRequest)
}

/// Validate locally, then post the review and return the refreshed list
pub async fn submit_review<G>(
    gateway: &G,
    property_id: &str,
    requester: &RequesterId,
    stars: u8,
    comment: &str,
) -> Result<Vec<Review>, OperationError>
where
    G: PropertyGateway + ?Sized,
{
    let review = review_body(requester, stars, comment).during(Action::SubmitReview)?;

    gateway
        .create_review(property_id, &review)
        .await
        .during(Action::SubmitReview)?;
    info!("Review sent for property {} by {}", property_id, requester);

    gateway
        .list_reviews(property_id)
        .await
        .during(Action::SubmitReview)
}

fn review_body(requester: &RequesterId, stars: u8, comment: &str) -> Result<NewReview, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let rating = match Rating::new(stars) {
        Ok(rating) => Some(rating),
        Err(message) => {
            errors.push(message);
            None
        }
    };
    let comment = comment.trim();
    if comment.is_empty() {
        errors.push("comment must not be empty");
    }

    let (Some(rating), true) = (rating, errors.is_empty()) else {
        return Err(errors);
    };

    Ok(NewReview {
        requester_id: requester.as_str().to_string(),
        rating,
        comment: comment.to_string(),
    })
}
