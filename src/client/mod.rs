/// Typed HTTP client for the Notebase API
///
/// Wraps every endpoint and reproduces the browser upload flow: request an
/// upload URL, POST the bytes there, then record the file's metadata.
/// Failed responses are decoded back into `WorkspaceError`.

use crate::{
    api::{
        database::{
            AddColumnRequest, CreateDatabaseRequest, CreatePageRequest, CreateViewRequest,
            CreatedResponse, ItemFieldsRequest,
        },
        documents::{CreateDocumentRequest, UpdateDocumentRequest},
        files::{FileUrlResponse, UploadResponse, UploadUrlResponse},
    },
    auth::Session,
    documents::{Document, RichText},
    error::{ErrorBody, Result, WorkspaceError},
    files::{FileMetadata, NewFileMetadata},
    media::{Drawing, NewDrawing, NewVoiceNote, VoiceNote},
    render::Layout,
    workspace::{ColumnDefinition, Fields, Item, Page, View, ViewConfig, ViewPatch, ViewType},
};
use reqwest::{header::CONTENT_TYPE, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};

/// Result of a completed upload
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub storage_id: String,
    pub metadata_id: String,
}

#[derive(Debug, Clone)]
pub struct NotebaseClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl NotebaseClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a bearer token to every following request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sign in anonymously and keep the returned token
    pub async fn sign_in_anonymous(&mut self) -> Result<Session> {
        let session: Session = self.send_json(Method::POST, "/api/auth/anonymous", None::<&()>).await?;
        self.token = Some(session.token.clone());
        Ok(session)
    }

    /// Invalidate the current token on the server and forget it
    pub async fn sign_out(&mut self) -> Result<()> {
        self.send_empty(Method::DELETE, "/api/auth/session", None::<&()>).await?;
        self.token = None;
        Ok(())
    }

    // ---- pages ----

    pub async fn list_pages(&self) -> Result<Vec<Page>> {
        self.send_json(Method::GET, "/api/pages", None::<&()>).await
    }

    pub async fn get_page(&self, page_id: &str) -> Result<Option<Page>> {
        self.send_json(Method::GET, &format!("/api/pages/{page_id}"), None::<&()>).await
    }

    pub async fn create_page(&self, title: &str, parent_id: Option<&str>) -> Result<String> {
        let body = CreatePageRequest {
            title: title.to_string(),
            parent_id: parent_id.map(str::to_string),
        };
        let created: CreatedResponse = self.send_json(Method::POST, "/api/pages", Some(&body)).await?;
        Ok(created.id)
    }

    pub async fn delete_page(&self, page_id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/api/pages/{page_id}"), None::<&()>).await
    }

    pub async fn create_database(
        &self,
        title: &str,
        parent_id: Option<&str>,
        schema: Vec<ColumnDefinition>,
    ) -> Result<String> {
        let body = CreateDatabaseRequest {
            title: title.to_string(),
            parent_id: parent_id.map(str::to_string),
            schema,
        };
        let created: CreatedResponse = self.send_json(Method::POST, "/api/databases", Some(&body)).await?;
        Ok(created.id)
    }

    pub async fn add_column(&self, page_id: &str, column: ColumnDefinition) -> Result<()> {
        let body = AddColumnRequest { column };
        self.send_empty(Method::POST, &format!("/api/pages/{page_id}/columns"), Some(&body)).await
    }

    // ---- items ----

    pub async fn get_items(&self, page_id: &str) -> Result<Vec<Item>> {
        self.send_json(Method::GET, &format!("/api/pages/{page_id}/items"), None::<&()>).await
    }

    pub async fn create_item(&self, page_id: &str, fields: Fields) -> Result<String> {
        let body = ItemFieldsRequest { fields };
        let created: CreatedResponse = self
            .send_json(Method::POST, &format!("/api/pages/{page_id}/items"), Some(&body))
            .await?;
        Ok(created.id)
    }

    pub async fn update_item(&self, item_id: &str, fields: Fields) -> Result<()> {
        let body = ItemFieldsRequest { fields };
        self.send_empty(Method::PUT, &format!("/api/items/{item_id}"), Some(&body)).await
    }

    pub async fn delete_item(&self, item_id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/api/items/{item_id}"), None::<&()>).await
    }

    // ---- views ----

    pub async fn get_views(&self, page_id: &str) -> Result<Vec<View>> {
        self.send_json(Method::GET, &format!("/api/pages/{page_id}/views"), None::<&()>).await
    }

    pub async fn create_view(
        &self,
        page_id: &str,
        name: &str,
        view_type: ViewType,
        config: ViewConfig,
    ) -> Result<String> {
        let body = CreateViewRequest { name: name.to_string(), view_type, config };
        let created: CreatedResponse = self
            .send_json(Method::POST, &format!("/api/pages/{page_id}/views"), Some(&body))
            .await?;
        Ok(created.id)
    }

    pub async fn update_view(&self, view_id: &str, patch: ViewPatch) -> Result<()> {
        self.send_empty(Method::PATCH, &format!("/api/views/{view_id}"), Some(&patch)).await
    }

    pub async fn delete_view(&self, view_id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/api/views/{view_id}"), None::<&()>).await
    }

    pub async fn render_view(&self, page_id: &str, view_id: Option<&str>) -> Result<Layout> {
        let path = match view_id {
            Some(view_id) => format!("/api/pages/{page_id}/render?view={view_id}"),
            None => format!("/api/pages/{page_id}/render"),
        };
        self.send_json(Method::GET, &path, None::<&()>).await
    }

    // ---- documents ----

    pub async fn create_document(&self, title: &str, owner_id: &str) -> Result<String> {
        let body = CreateDocumentRequest {
            title: title.to_string(),
            owner_id: owner_id.to_string(),
        };
        let created: CreatedResponse = self.send_json(Method::POST, "/api/documents", Some(&body)).await?;
        Ok(created.id)
    }

    pub async fn get_document(&self, document_id: &str) -> Result<Option<Document>> {
        self.send_json(Method::GET, &format!("/api/documents/{document_id}"), None::<&()>).await
    }

    pub async fn update_document(&self, document_id: &str, content: RichText) -> Result<()> {
        let body = UpdateDocumentRequest { content };
        self.send_empty(Method::PUT, &format!("/api/documents/{document_id}"), Some(&body)).await
    }

    // ---- files ----

    pub async fn generate_upload_url(&self) -> Result<String> {
        let response: UploadUrlResponse =
            self.send_json(Method::POST, "/api/upload-url", None::<&()>).await?;
        Ok(response.url)
    }

    /// POST bytes to an upload URL; any non-2xx answer is an upload failure
    pub async fn upload_bytes(&self, upload_url: &str, content_type: &str, bytes: Vec<u8>) -> Result<String> {
        let response = self
            .http
            .post(upload_url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("❌ Upload rejected by storage with status {}", status);
            return Err(WorkspaceError::UploadFailure { status: status.as_u16() });
        }
        let uploaded: UploadResponse = response.json().await?;
        Ok(uploaded.storage_id)
    }

    /// Upload a file and record its metadata, attaching it to `document_id` if given
    pub async fn upload_file(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
        document_id: Option<&str>,
    ) -> Result<UploadedFile> {
        let size = bytes.len() as u64;
        let upload_url = self.generate_upload_url().await?;
        let storage_id = self.upload_bytes(&upload_url, content_type, bytes).await?;

        let metadata_id = self
            .save_file_metadata(NewFileMetadata {
                storage_id: storage_id.clone(),
                name: name.to_string(),
                content_type: content_type.to_string(),
                size,
                document_id: document_id.map(str::to_string),
            })
            .await?;

        Ok(UploadedFile { storage_id, metadata_id })
    }

    pub async fn save_file_metadata(&self, metadata: NewFileMetadata) -> Result<String> {
        let created: CreatedResponse = self.send_json(Method::POST, "/api/files", Some(&metadata)).await?;
        Ok(created.id)
    }

    pub async fn get_file_metadata(&self, metadata_id: &str) -> Result<Option<FileMetadata>> {
        self.send_json(Method::GET, &format!("/api/files/{metadata_id}"), None::<&()>).await
    }

    pub async fn get_file_url(&self, storage_id: &str) -> Result<Option<String>> {
        let response: FileUrlResponse = self
            .send_json(Method::GET, &format!("/api/storage/{storage_id}/url"), None::<&()>)
            .await?;
        Ok(response.url)
    }

    /// Fetch the bytes behind a file URL
    pub async fn download(&self, file_url: &str) -> Result<Vec<u8>> {
        let response = check(self.http.get(file_url).send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    // ---- media ----

    pub async fn create_drawing(&self, page_id: &str, drawing: NewDrawing) -> Result<String> {
        let created: CreatedResponse = self
            .send_json(Method::POST, &format!("/api/pages/{page_id}/drawings"), Some(&drawing))
            .await?;
        Ok(created.id)
    }

    pub async fn get_drawings_for_page(&self, page_id: &str) -> Result<Vec<Drawing>> {
        self.send_json(Method::GET, &format!("/api/pages/{page_id}/drawings"), None::<&()>).await
    }

    pub async fn create_voice_note(&self, page_id: &str, note: NewVoiceNote) -> Result<String> {
        let created: CreatedResponse = self
            .send_json(Method::POST, &format!("/api/pages/{page_id}/voice-notes"), Some(&note))
            .await?;
        Ok(created.id)
    }

    pub async fn get_voice_notes_for_page(&self, page_id: &str) -> Result<Vec<VoiceNote>> {
        self.send_json(Method::GET, &format!("/api/pages/{page_id}/voice-notes"), None::<&()>).await
    }

    // ---- plumbing ----

    fn request<B: Serialize>(&self, method: Method, path: &str, body: Option<&B>) -> RequestBuilder {
        let mut request = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let response = check(self.request(method, path, body).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty<B: Serialize>(&self, method: Method, path: &str, body: Option<&B>) -> Result<()> {
        check(self.request(method, path, body).send().await?).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into the matching `WorkspaceError`
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.json::<ErrorBody>().await.ok();
    Err(WorkspaceError::from_response(status.as_u16(), body))
}
