// ── Resource adapters ──
//
// One adapter per entity type, parametrized by its REST resource name.
// `RemoteResource` is the capability set the collection container is
// generic over; `RestResource` is the HTTP implementation.

use async_trait::async_trait;

use crate::client::RestClient;
use crate::error::Error;
use crate::page::{ListQuery, Page, records_from_body};
use crate::record::{Record, RecordId};

/// The fixed operation vocabulary every entity adapter exposes.
#[async_trait]
pub trait RemoteResource: Send + Sync {
    /// REST resource name (e.g. `"produtos"`).
    fn name(&self) -> &str;

    /// Filtered, paginated fetch.
    async fn list_page(&self, query: &ListQuery) -> Result<Page, Error>;

    /// Unpaginated fetch, for dropdown population.
    async fn list_all(
        &self,
        search: Option<&str>,
        ordering: Option<&str>,
    ) -> Result<Vec<Record>, Error>;

    /// Create a record; any `id` on the input is stripped.
    async fn create(&self, record: &Record) -> Result<Record, Error>;

    /// Replace a record; requires `id`.
    async fn update(&self, record: &Record) -> Result<Record, Error>;

    /// Delete by id. A second delete of the same id is `NotFound`.
    async fn delete(&self, id: &RecordId) -> Result<(), Error>;
}

/// How the unpaginated variant of a resource is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListAllMode {
    /// `GET /X/todos/`, answering a bare array.
    Dedicated,
    /// `GET /X/`, unwrapping `results` if the server paginates anyway.
    #[default]
    Unpaged,
}

/// Which write operations a resource accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl Capabilities {
    pub const CRUD: Self = Self {
        create: true,
        update: true,
        delete: true,
    };
    pub const UPDATE_ONLY: Self = Self {
        create: false,
        update: true,
        delete: false,
    };
    pub const APPEND_ONLY: Self = Self {
        create: true,
        update: false,
        delete: false,
    };
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::CRUD
    }
}

/// HTTP adapter for one REST resource.
#[derive(Debug, Clone)]
pub struct RestResource {
    client: RestClient,
    name: String,
    list_all: ListAllMode,
    capabilities: Capabilities,
}

impl RestResource {
    pub fn new(client: RestClient, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into().trim_matches('/').to_owned(),
            list_all: ListAllMode::default(),
            capabilities: Capabilities::default(),
        }
    }

    pub fn with_list_all(mut self, mode: ListAllMode) -> Self {
        self.list_all = mode;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn collection_path(&self) -> String {
        format!("{}/", self.name)
    }

    fn item_path(&self, id: &RecordId) -> String {
        format!("{}/{}/", self.name, path_segment(id))
    }

    /// `GET /X/?k=v…`, unwrapped into records.
    ///
    /// Used for dependency sources that only want a filtered subset
    /// (e.g. `ativo=true`). Only the first page of a paginated answer
    /// is returned.
    pub async fn list_filtered(&self, filters: &[(String, String)]) -> Result<Vec<Record>, Error> {
        let body = self.client.get_json(&self.collection_path(), filters).await?;
        records_from_body(body)
    }
}

#[async_trait]
impl RemoteResource for RestResource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_page(&self, query: &ListQuery) -> Result<Page, Error> {
        let body = self
            .client
            .get_json(&self.collection_path(), &query.to_params())
            .await?;
        Page::from_body(body, query.page)
    }

    async fn list_all(
        &self,
        search: Option<&str>,
        ordering: Option<&str>,
    ) -> Result<Vec<Record>, Error> {
        let mut params = Vec::new();
        if let Some(search) = search.filter(|s| !s.is_empty()) {
            params.push(("search".to_owned(), search.to_owned()));
        }
        if let Some(ordering) = ordering.filter(|o| !o.is_empty()) {
            params.push(("ordering".to_owned(), ordering.to_owned()));
        }

        let path = match self.list_all {
            ListAllMode::Dedicated => format!("{}/todos/", self.name),
            ListAllMode::Unpaged => self.collection_path(),
        };
        let body = self.client.get_json(&path, &params).await?;
        records_from_body(body)
    }

    async fn create(&self, record: &Record) -> Result<Record, Error> {
        if !self.capabilities.create {
            return Err(Error::UnsupportedOperation("create"));
        }
        let body = self
            .client
            .post_json(&self.collection_path(), &record.without_id())
            .await?;
        decode_record(body)
    }

    async fn update(&self, record: &Record) -> Result<Record, Error> {
        if !self.capabilities.update {
            return Err(Error::UnsupportedOperation("update"));
        }
        let id = record.id().ok_or(Error::MissingId {
            operation: "update",
        })?;
        let body = self.client.put_json(&self.item_path(&id), record).await?;
        decode_record(body)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), Error> {
        if !self.capabilities.delete {
            return Err(Error::UnsupportedOperation("delete"));
        }
        self.client.delete(&self.item_path(id)).await
    }
}

/// Percent-encode an id so `/`, `?` and `#` stay inside its path segment.
fn path_segment(id: &RecordId) -> String {
    match id {
        RecordId::Int(n) => n.to_string(),
        RecordId::Text(text) => url::form_urlencoded::byte_serialize(text.as_bytes())
            .map(|chunk| if chunk == "+" { "%20" } else { chunk })
            .collect(),
    }
}

fn decode_record(body: serde_json::Value) -> Result<Record, Error> {
    Record::try_from(body).map_err(|rejected| Error::Deserialization {
        message: "expected the saved record as a JSON object".into(),
        body: rejected.to_string(),
    })
}
