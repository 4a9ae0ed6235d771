//! Payload CMS provider implementation.
//!
//! This module provides the concrete implementation of `ContentStore` on top
//! of the Payload REST API, using `reqwest`.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{PayloadAuth, PayloadConfig};
use crate::errors::ContentStoreError;
use crate::interfaces::ContentStore;
use crate::types::{Collection, Document, DocumentId, FileUpload, Filter};

/// Payload REST provider.
///
/// # Example
///
/// ```ignore
/// use content_store::{Collection, ContentStore, PayloadConfig, PayloadProvider};
///
/// let provider = PayloadProvider::new(&PayloadConfig::from_env()).await?;
/// let mut data = serde_json::Map::new();
/// data.insert("name".into(), "Languages".into());
/// let doc = provider.create(Collection::SkillCategories, &data).await?;
/// ```
pub struct PayloadProvider {
    client: Client,
    base_url: Url,
    authorization: Option<String>,
    find_limit: u32,
}

impl PayloadProvider {
    /// Create a provider and authenticate according to the config.
    ///
    /// With `PayloadAuth::Login` this performs the login request up front, so
    /// a wrong password fails here rather than on the first write.
    pub async fn new(config: &PayloadConfig) -> Result<Self, ContentStoreError> {
        let base_url =
            Url::parse(&config.url).map_err(|e| ContentStoreError::connection(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ContentStoreError::connection(format!(
                "{} cannot be used as a base URL",
                config.url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ContentStoreError::connection(e.to_string()))?;

        let mut provider = Self {
            client,
            base_url,
            authorization: None,
            find_limit: config.find_limit,
        };

        provider.authorization = match &config.auth {
            PayloadAuth::Anonymous => None,
            PayloadAuth::ApiKey { collection, key } => {
                Some(format!("{} API-Key {}", collection, key))
            }
            PayloadAuth::Login {
                collection,
                email,
                password,
            } => {
                let token = provider.login(collection, email, password).await?;
                Some(format!("JWT {}", token))
            }
        };

        info!(
            url = %provider.base_url,
            authenticated = provider.authorization.is_some(),
            "Created Payload provider"
        );

        Ok(provider)
    }

    async fn login(
        &self,
        collection: &str,
        email: &str,
        password: &str,
    ) -> Result<String, ContentStoreError> {
        let url = self.endpoint(&[collection, "login"])?;
        let body = Self::send(
            self.client
                .post(url)
                .json(&json!({ "email": email, "password": password })),
        )
        .await
        .map_err(|e| ContentStoreError::auth(e.to_string()))?;

        body.get("token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ContentStoreError::auth("login response carried no token"))
    }

    /// Build `{base}/api/{segments...}`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ContentStoreError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ContentStoreError::connection(format!(
                    "{} cannot be used as a base URL",
                    self.base_url
                ))
            })?;
            path.pop_if_empty().push("api").extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.authorization {
            Some(value) => builder.header(AUTHORIZATION, value),
            None => builder,
        }
    }

    /// Send a request and parse its JSON body, mapping non-success statuses
    /// to `ContentStoreError::Rejected`.
    async fn send(builder: RequestBuilder) -> Result<Value, ContentStoreError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ContentStoreError::rejected(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| ContentStoreError::parse(e.to_string()))
    }

    fn extract_doc(mut body: Value) -> Result<Document, ContentStoreError> {
        match body.get_mut("doc").map(Value::take) {
            Some(doc) => Document::from_value(doc),
            None => Err(ContentStoreError::parse("response carried no `doc`")),
        }
    }

    fn extract_docs(mut body: Value) -> Result<Vec<Document>, ContentStoreError> {
        match body.get_mut("docs").map(Value::take) {
            Some(Value::Array(docs)) => docs.into_iter().map(Document::from_value).collect(),
            _ => Err(ContentStoreError::parse("response carried no `docs` array")),
        }
    }
}

/// Query parameters selecting the documents a filter describes.
pub(crate) fn filter_query(filter: &Filter) -> Vec<(String, String)> {
    match filter {
        Filter::All => vec![("where[id][exists]".to_string(), "true".to_string())],
        Filter::Equals { field, value } => {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            vec![(format!("where[{}][equals]", field), value)]
        }
    }
}

fn locale_query(locale: Option<&str>) -> Vec<(String, String)> {
    let mut query = vec![("depth".to_string(), "0".to_string())];
    if let Some(locale) = locale {
        query.push(("locale".to_string(), locale.to_string()));
    }
    query
}

#[async_trait]
impl ContentStore for PayloadProvider {
    async fn create(
        &self,
        collection: Collection,
        data: &Map<String, Value>,
    ) -> Result<Document, ContentStoreError> {
        let url = self.endpoint(&[collection.slug()])?;
        let body = Self::send(
            self.request(Method::POST, url)
                .query(&locale_query(None))
                .json(data),
        )
        .await?;

        let doc = Self::extract_doc(body)?;
        debug!(collection = %collection, id = %doc.id, "Created document");
        Ok(doc)
    }

    async fn upload(
        &self,
        collection: Collection,
        data: &Map<String, Value>,
        file: &FileUpload,
    ) -> Result<Document, ContentStoreError> {
        let url = self.endpoint(&[collection.slug()])?;

        let mut part = Part::bytes(file.data.clone()).file_name(file.name.clone());
        if let Some(mime) = &file.mime_type {
            part = part
                .mime_str(mime)
                .map_err(|e| ContentStoreError::serialization(e.to_string()))?;
        }
        let form = Form::new()
            .text("_payload", serde_json::to_string(data)?)
            .part("file", part);

        let body = Self::send(
            self.request(Method::POST, url)
                .query(&locale_query(None))
                .multipart(form),
        )
        .await?;

        let doc = Self::extract_doc(body)?;
        debug!(
            collection = %collection,
            id = %doc.id,
            file = %file.name,
            size = file.size(),
            "Uploaded document"
        );
        Ok(doc)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &DocumentId,
        data: &Map<String, Value>,
        locale: Option<&str>,
    ) -> Result<Document, ContentStoreError> {
        let id = id.to_string();
        let url = self.endpoint(&[collection.slug(), &id])?;
        let body = Self::send(
            self.request(Method::PATCH, url)
                .query(&locale_query(locale))
                .json(data),
        )
        .await?;

        let doc = Self::extract_doc(body)?;
        debug!(collection = %collection, id = %doc.id, locale = ?locale, "Updated document");
        Ok(doc)
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        locale: Option<&str>,
    ) -> Result<Vec<Document>, ContentStoreError> {
        let url = self.endpoint(&[collection.slug()])?;
        let mut query = filter_query(filter);
        query.extend(locale_query(locale));
        query.push(("limit".to_string(), self.find_limit.to_string()));

        let body = Self::send(self.request(Method::GET, url).query(&query)).await?;
        Self::extract_docs(body)
    }

    async fn delete(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<usize, ContentStoreError> {
        let url = self.endpoint(&[collection.slug()])?;
        let body = Self::send(
            self.request(Method::DELETE, url)
                .query(&filter_query(filter)),
        )
        .await?;

        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                warn!(
                    collection = %collection,
                    failed = errors.len(),
                    "Bulk delete completed with some failures"
                );
            }
        }

        Ok(body
            .get("docs")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0))
    }
}
