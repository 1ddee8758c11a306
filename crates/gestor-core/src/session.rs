// ── Session ──
//
// One collection per catalog entity, created together when the session
// opens and shared by reference for its whole lifetime. Dependency
// loaders are wired here because a slot may read another collection.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, info, warn};

use gestor_api::{ListQuery, Page, Record, RecordId, RestClient, RestResource};

use crate::catalog::{DependencySource, Entity, ReportKind};
use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::store::{Collection, DependencyLoader};

/// Ordering of a product's movement history, newest first.
const MOVEMENT_ORDERING: &str = "-data_movimentacao";

/// Per-session owner of every entity collection.
///
/// Cheaply cloneable via `Arc<SessionInner>`.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    collections: BTreeMap<Entity, Arc<Collection>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("url", &self.inner.config.url.as_str())
            .field("collections", &self.inner.collections.len())
            .finish()
    }
}

impl Session {
    /// Build the HTTP client from `config` and open a session.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let client = RestClient::new(config.url.as_str(), &config.transport())?;
        Ok(Self::with_client(config, client))
    }

    /// Open a session over an existing client.
    pub fn with_client(config: SessionConfig, client: RestClient) -> Self {
        let mut collections = BTreeMap::new();
        for entity in Entity::all() {
            build_collection(entity, &config, &client, &mut collections);
        }
        info!(url = %config.url, collections = collections.len(), "session opened");

        Self {
            inner: Arc::new(SessionInner {
                config,
                collections,
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn collection(&self, entity: Entity) -> Arc<Collection> {
        Arc::clone(&self.inner.collections[&entity])
    }

    pub fn collections(&self) -> impl Iterator<Item = (Entity, &Arc<Collection>)> {
        self.inner.collections.iter().map(|(entity, c)| (*entity, c))
    }

    // ── Composite actions ────────────────────────────────────────────

    /// Record a stock movement, then reload the current stock page.
    ///
    /// The stock reload is best-effort; its failure is left on the
    /// stock collection and does not fail the movement.
    pub async fn register_stock_movement(&self, movement: Record) -> Result<Record, CoreError> {
        let created = self
            .collection(Entity::StockMovement)
            .save(movement.without_id())
            .await?;

        let stock = self.collection(Entity::Stock);
        if let Err(e) = stock.refresh().await {
            warn!(error = %e, "stock reload after movement failed");
        }
        Ok(created)
    }

    /// Movement history of one product, newest first.
    pub async fn stock_movements(&self, product: &RecordId) -> Result<Arc<Page>, CoreError> {
        let movements = self.collection(Entity::StockMovement);
        let query = ListQuery::default()
            .with_ordering(Some(MOVEMENT_ORDERING))
            .with_filter("produto", product.to_string());
        movements.fetch(query).await?;
        Ok(movements.page())
    }

    /// Ask the backend to generate a report, then show the first page
    /// of that report list.
    pub async fn generate_report(
        &self,
        kind: ReportKind,
        parameters: Record,
    ) -> Result<Record, CoreError> {
        let reports = self.collection(Entity::from(kind));
        let created = reports.save(parameters.without_id()).await?;
        debug!(%kind, id = ?created.id(), "report generated");

        if let Err(e) = reports.fetch_page(1, "", None).await {
            warn!(%kind, error = %e, "report list reload failed");
        }
        Ok(created)
    }
}

fn rest_resource(client: &RestClient, entity: Entity) -> RestResource {
    RestResource::new(client.clone(), entity.resource())
        .with_list_all(entity.list_all_mode())
        .with_capabilities(entity.capabilities())
}

/// Build `entity`'s collection, building collection-sourced
/// dependencies first.
fn build_collection(
    entity: Entity,
    config: &SessionConfig,
    client: &RestClient,
    built: &mut BTreeMap<Entity, Arc<Collection>>,
) -> Arc<Collection> {
    if let Some(existing) = built.get(&entity) {
        return Arc::clone(existing);
    }

    let mut loader = DependencyLoader::new();
    for dep in entity.dependencies() {
        loader = match dep.source {
            DependencySource::Collection(source) => {
                let other = build_collection(source, config, client, built);
                loader.with(dep.slot(), move || {
                    let other = Arc::clone(&other);
                    async move { other.fetch_all().await.map(|list| list.to_vec()) }.boxed()
                })
            }
            DependencySource::Filtered(source, filters) => {
                let resource = rest_resource(client, source);
                let params: Vec<(String, String)> = filters
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                    .collect();
                let limit = config.request_timeout;
                loader.with(dep.slot(), move || {
                    let resource = resource.clone();
                    let params = params.clone();
                    async move {
                        match tokio::time::timeout(limit, resource.list_filtered(&params)).await {
                            Ok(result) => result.map_err(CoreError::from),
                            Err(_) => Err(CoreError::timed_out(limit)),
                        }
                    }
                    .boxed()
                })
            }
        };
    }

    let resource = Arc::new(rest_resource(client, entity));
    let collection = Arc::new(
        Collection::new(resource, config.collection_options(entity)).with_dependencies(loader),
    );
    built.insert(entity, Arc::clone(&collection));
    collection
}
