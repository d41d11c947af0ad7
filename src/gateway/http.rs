use crate::error::{ConsoleError, ConsoleResult, ValidationErrors};
use crate::gateway::traits::PropertyGateway;
use crate::gateway::types::GatewayConfig;
use crate::identifier::is_object_id;
use crate::models::{
    ImagePatch, NewProperty, NewRentalRequest, NewReview, Property, RentalRequest, ResolvedImage,
    Review, StagedImage,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Body of `POST /inmuebles/{id}/imagenes`
#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "imagenes")]
    images: Vec<String>,
}

/// JSON flavour of `GET /imagenes/{id}`
#[derive(Debug, Deserialize)]
struct ImagePayload {
    #[serde(default)]
    url: Option<String>,
    /// Base64 encoded bytes
    #[serde(default)]
    data: Option<String>,
    #[serde(default, alias = "contentType")]
    content_type: Option<String>,
}

/// Gateway talking to the REST property API over HTTP
pub struct HttpGateway {
    client: Client,
    config: GatewayConfig,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> ConsoleResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConsoleError::transport(config.base_url.clone(), e))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Send and normalise the status into the error taxonomy
    async fn send(&self, request: RequestBuilder, url: &str) -> ConsoleResult<Response> {
        debug!("Requesting {}", url);

        let response = request.send().await.map_err(|e| {
            warn!("Network error for {}: {}", url, e);
            ConsoleError::transport(url, e)
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            warn!("{} returned 404", url);
            return Err(ConsoleError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("API error from {}: {} {}", url, status, body);
            return Err(ConsoleError::Remote {
                url: url.to_string(),
                status,
                body,
            });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> ConsoleResult<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ConsoleError::transport(url, e))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Malformed response from {}: {}", url, e);
            ConsoleError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ConsoleResult<T> {
        let url = self.config.url(path);
        let response = self.send(self.client.get(&url), &url).await?;
        Self::decode(response, &url).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ConsoleResult<T>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.url(path);
        let response = self.send(self.client.post(&url).json(body), &url).await?;
        Self::decode(response, &url).await
    }

    async fn put_json<B, T>(&self, path: &str, body: &B) -> ConsoleResult<T>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.url(path);
        let response = self.send(self.client.put(&url).json(body), &url).await?;
        Self::decode(response, &url).await
    }

    fn resolve_payload(id: &str, payload: ImagePayload, url: &str) -> ConsoleResult<ResolvedImage> {
        if let Some(remote) = payload.url {
            return Ok(ResolvedImage {
                id: id.to_string(),
                url: remote,
            });
        }
        if let Some(data) = payload.data {
            let mime = payload
                .content_type
                .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
            return Ok(ResolvedImage {
                id: id.to_string(),
                url: format!("data:{};base64,{}", mime, data),
            });
        }
        Err(ConsoleError::Decode {
            url: url.to_string(),
            message: "image payload has neither `url` nor `data`".to_string(),
        })
    }
}

#[async_trait]
impl PropertyGateway for HttpGateway {
    async fn list_properties(&self) -> ConsoleResult<Vec<Property>> {
        self.get_json("/inmuebles").await
    }

    async fn get_property(&self, id: &str) -> ConsoleResult<Property> {
        self.get_json(&format!("/inmuebles/{}", id)).await
    }

    async fn create_property(&self, property: &NewProperty) -> ConsoleResult<Property> {
        self.post_json("/inmuebles", property).await
    }

    async fn update_property(&self, id: &str, property: &NewProperty) -> ConsoleResult<Property> {
        self.put_json(&format!("/inmuebles/{}", id), property).await
    }

    async fn patch_images(&self, id: &str, patch: &ImagePatch) -> ConsoleResult<Property> {
        self.put_json(&format!("/inmuebles/{}", id), patch).await
    }

    async fn delete_property(&self, id: &str) -> ConsoleResult<()> {
        let url = self.config.url(&format!("/inmuebles/{}", id));
        self.send(self.client.delete(&url), &url).await?;
        Ok(())
    }

    async fn upload_images(&self, id: &str, files: &[StagedImage]) -> ConsoleResult<Vec<String>> {
        let url = self.config.url(&format!("/inmuebles/{}/imagenes", id));

        let mut form = Form::new();
        let mut problems = ValidationErrors::new();
        for file in files {
            match Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)
            {
                Ok(part) => form = form.part("imagenes", part),
                Err(_) => problems.push(format!(
                    "{}: unsupported content type {:?}",
                    file.file_name, file.content_type
                )),
            }
        }
        problems.into_result()?;

        debug!("Uploading {} image(s) to {}", files.len(), url);
        let response = self
            .send(self.client.post(&url).multipart(form), &url)
            .await?;
        let uploaded: UploadResponse = Self::decode(response, &url).await?;
        Ok(uploaded.images)
    }

    async fn fetch_image(&self, id: &str) -> ConsoleResult<ResolvedImage> {
        if !is_object_id(id) {
            return Err(ConsoleError::InvalidIdentifier(id.to_string()));
        }

        let url = self.config.url(&format!("/imagenes/{}", id));
        let response = self.send(self.client.get(&url), &url).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        match content_type.as_deref() {
            Some(ct) if ct.starts_with("application/json") => {
                let payload: ImagePayload = Self::decode(response, &url).await?;
                Self::resolve_payload(id, payload, &url)
            }
            _ => {
                let mime = content_type
                    .filter(|ct| ct.starts_with("image/"))
                    .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| ConsoleError::transport(url.clone(), e))?;
                Ok(ResolvedImage {
                    id: id.to_string(),
                    url: format!("data:{};base64,{}", mime, STANDARD.encode(&bytes)),
                })
            }
        }
    }

    async fn list_rental_requests(&self, id: &str) -> ConsoleResult<Vec<RentalRequest>> {
        self.get_json(&format!("/inmuebles/{}/solicitudes_renta", id))
            .await
    }

    async fn create_rental_request(
        &self,
        id: &str,
        request: &NewRentalRequest,
    ) -> ConsoleResult<RentalRequest> {
        self.post_json(&format!("/inmuebles/{}/solicitudes_renta", id), request)
            .await
    }

    async fn list_reviews(&self, id: &str) -> ConsoleResult<Vec<Review>> {
        self.get_json(&format!("/inmuebles/{}/resenas", id)).await
    }

    async fn create_review(&self, id: &str, review: &NewReview) -> ConsoleResult<Review> {
        self.post_json(&format!("/inmuebles/{}/resenas", id), review)
            .await
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
