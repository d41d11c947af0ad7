//! Concurrent image resolution that tolerates individual failures.

use crate::error::ConsoleError;
use crate::gateway::PropertyGateway;
use crate::identifier::partition_object_ids;
use crate::models::ResolvedImage;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, warn};

/// One image that could not be resolved
#[derive(Debug)]
pub struct ImageFailure {
    pub id: String,
    pub cause: ConsoleError,
}

/// Outcome of resolving a batch of image identifiers
#[derive(Debug, Default)]
pub struct ImageBatch {
    /// Successfully resolved images, in the order their fetches were issued
    pub images: Vec<ResolvedImage>,
    /// Identifiers dropped for having the wrong shape
    pub rejected: Vec<String>,
    pub failures: Vec<ImageFailure>,
}

impl ImageBatch {
    /// True when some well-formed identifier could not be fetched
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn into_images(self) -> Vec<ResolvedImage> {
        self.images
    }
}

/// Fetch every well-formed identifier concurrently and keep the ones that
/// succeed. Never fails: rejected shapes and failed fetches end up in the
/// batch diagnostics.
pub async fn resolve_images<G, S>(gateway: &G, ids: &[S]) -> ImageBatch
where
    G: PropertyGateway + ?Sized,
    S: AsRef<str>,
{
    let (valid, rejected) = partition_object_ids(ids);
    if valid.is_empty() {
        debug!("No image identifiers to resolve");
        return ImageBatch {
            rejected,
            ..ImageBatch::default()
        };
    }

    debug!(
        "Resolving {} image(s) through {}",
        valid.len(),
        gateway.backend_name()
    );

    let mut pending: FuturesUnordered<_> = valid
        .iter()
        .enumerate()
        .map(|(index, id)| async move { (index, gateway.fetch_image(id).await) })
        .collect();

    // Completion order is arbitrary; park each result in its issue slot
    let mut slots: Vec<Option<ResolvedImage>> = vec![None; valid.len()];
    let mut failures = Vec::new();

    while let Some((index, result)) = pending.next().await {
        match result {
            Ok(image) => slots[index] = Some(image),
            Err(cause) => {
                warn!("Failed to load image {}: {}", valid[index], cause);
                failures.push((
                    index,
                    ImageFailure {
                        id: valid[index].clone(),
                        cause,
                    },
                ));
            }
        }
    }

    failures.sort_by_key(|(index, _)| *index);

    ImageBatch {
        images: slots.into_iter().flatten().collect(),
        rejected,
        failures: failures.into_iter().map(|(_, failure)| failure).collect(),
    }
}
