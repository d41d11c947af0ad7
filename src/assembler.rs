//! Builds what the home, list and detail views display.

use crate::error::{Action, ActionContext, OperationError};
use crate::fanout::resolve_images;
use crate::gateway::{ListingFilter, PropertyGateway};
use crate::models::{DashboardStats, Property, PropertyAggregate};
use serde::Serialize;
use tracing::{info, warn};

/// Number of properties highlighted on the home view
pub const FEATURED_COUNT: usize = 3;

/// Home view data
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub featured: Vec<Property>,
}

/// List view data
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub properties: Vec<Property>,
    /// Size of the unfiltered collection
    pub total: usize,
}

/// Fold the collection into the dashboard counters
pub fn dashboard_stats(properties: &[Property]) -> DashboardStats {
    properties
        .iter()
        .fold(DashboardStats::default(), |mut stats, property| {
            stats.total_properties += 1;
            if property.available {
                stats.available_properties += 1;
            }
            stats.active_contracts += property.active_contracts();
            stats.pending_requests += property.pending_requests();
            stats
        })
}

pub async fn load_dashboard<G>(gateway: &G) -> Result<Dashboard, OperationError>
where
    G: PropertyGateway + ?Sized,
{
    let properties = gateway
        .list_properties()
        .await
        .during(Action::LoadDashboard)?;

    let stats = dashboard_stats(&properties);
    let featured = properties.into_iter().take(FEATURED_COUNT).collect();

    Ok(Dashboard { stats, featured })
}

pub async fn load_listing<G>(gateway: &G, filter: &ListingFilter) -> Result<Listing, OperationError>
where
    G: PropertyGateway + ?Sized,
{
    let all = gateway
        .list_properties()
        .await
        .during(Action::LoadProperties)?;

    let total = all.len();
    let properties: Vec<Property> = all.into_iter().filter(|p| filter.matches(p)).collect();
    info!("Showing {} of {} properties", properties.len(), total);

    Ok(Listing { properties, total })
}

/// Assemble the detail view of one property.
///
/// The base record must load. After that, images, rental requests and
/// reviews are fetched concurrently: image failures only set
/// `images_unavailable`, while a failure of the request or review list
/// fails the whole assembly.
pub async fn assemble_detail<G>(gateway: &G, id: &str) -> Result<PropertyAggregate, OperationError>
where
    G: PropertyGateway + ?Sized,
{
    let property = gateway
        .get_property(id)
        .await
        .during(Action::LoadProperty)?;

    let (batch, rental_requests, reviews) = tokio::join!(
        resolve_images(gateway, &property.images),
        gateway.list_rental_requests(id),
        gateway.list_reviews(id),
    );

    let rental_requests = rental_requests.during(Action::LoadProperty)?;
    let reviews = reviews.during(Action::LoadProperty)?;

    let images_unavailable = batch.is_partial();
    if images_unavailable {
        warn!(
            "Images unavailable for property {}: {} of {} failed",
            id,
            batch.failures.len(),
            property.images.len()
        );
    }

    Ok(PropertyAggregate {
        property,
        images: batch.into_images(),
        images_unavailable,
        rental_requests,
        reviews,
    })
}
