use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use relgate_application::{BridgeRepository, PrincipalDirectory};
use relgate_core::{AppResult, EntityId, PrincipalId};
use relgate_domain::{Affiliation, AttributeLookup, PrincipalCapabilities, RelationConfig};
use tokio::sync::RwLock;

use crate::postgres_bridge_repository::ensure_linkable;

type StoredRow = BTreeMap<String, Option<EntityId>>;

#[derive(Debug, Default)]
struct RelationStoreState {
    tables: HashMap<String, Vec<StoredRow>>,
    staff_roster: BTreeSet<PrincipalId>,
    capabilities: HashMap<PrincipalId, PrincipalCapabilities>,
    owned_customers: HashMap<PrincipalId, BTreeSet<EntityId>>,
    affiliations: HashMap<PrincipalId, BTreeSet<Affiliation>>,
    partner_regions: HashMap<PrincipalId, EntityId>,
    branches: BTreeSet<(EntityId, EntityId)>,
}

impl RelationStoreState {
    fn column(row: &StoredRow, column: &str) -> Option<EntityId> {
        row.get(column).copied().flatten()
    }

    /// Yields `(scope, entity, branch)` for every row with both ids set.
    fn linked_rows(
        &self,
        config: &RelationConfig,
    ) -> impl Iterator<Item = (EntityId, EntityId, Option<EntityId>)> {
        let scope_column = config.scope_column().as_str();
        let entity_column = config.entity_column().as_str();
        let branch_column = config.branch_column().map(|column| column.as_str());

        self.tables
            .get(config.bridge_table().as_str())
            .into_iter()
            .flatten()
            .filter_map(move |row| {
                Some((
                    Self::column(row, scope_column)?,
                    Self::column(row, entity_column)?,
                    branch_column.and_then(|column| Self::column(row, column)),
                ))
            })
    }
}

/// In-memory relation store implementing both the bridge repository and the
/// principal directory ports.
///
/// Only compiled for tests and the `test-support` feature.
#[derive(Debug, Default)]
pub struct InMemoryRelationStore {
    state: RwLock<RelationStoreState>,
}

impl InMemoryRelationStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row to `table`. Columns left out read as null.
    pub async fn insert_row(&self, table: &str, columns: &[(&str, Option<EntityId>)]) {
        let row = columns
            .iter()
            .map(|(column, value)| ((*column).to_owned(), *value))
            .collect();

        self.state
            .write()
            .await
            .tables
            .entry(table.to_owned())
            .or_default()
            .push(row);
    }

    /// Puts a principal on the platform staff roster.
    pub async fn add_staff(&self, principal_id: PrincipalId) {
        self.state.write().await.staff_roster.insert(principal_id);
    }

    /// Replaces a principal's capability flags.
    pub async fn set_capabilities(
        &self,
        principal_id: PrincipalId,
        capabilities: PrincipalCapabilities,
    ) {
        self.state
            .write()
            .await
            .capabilities
            .insert(principal_id, capabilities);
    }

    /// Records customer ownership.
    pub async fn add_owned_customer(&self, principal_id: PrincipalId, customer_id: EntityId) {
        self.state
            .write()
            .await
            .owned_customers
            .entry(principal_id)
            .or_default()
            .insert(customer_id);
    }

    /// Records an employee affiliation.
    pub async fn add_affiliation(&self, principal_id: PrincipalId, affiliation: Affiliation) {
        self.state
            .write()
            .await
            .affiliations
            .entry(principal_id)
            .or_default()
            .insert(affiliation);
    }

    /// Sets the home region of a partner principal.
    pub async fn set_partner_region(&self, principal_id: PrincipalId, region_id: EntityId) {
        self.state
            .write()
            .await
            .partner_regions
            .insert(principal_id, region_id);
    }

    /// Records a branch under a customer.
    pub async fn add_branch(&self, customer_id: EntityId, branch_id: EntityId) {
        self.state
            .write()
            .await
            .branches
            .insert((customer_id, branch_id));
    }
}

#[async_trait]
impl BridgeRepository for InMemoryRelationStore {
    async fn count_linked_scopes(
        &self,
        config: &RelationConfig,
        entity_id: EntityId,
        scope_ids: Option<&BTreeSet<EntityId>>,
    ) -> AppResult<u64> {
        let state = self.state.read().await;
        let scopes: BTreeSet<EntityId> = state
            .linked_rows(config)
            .filter(|(scope, entity, _)| {
                *entity == entity_id && scope_ids.is_none_or(|allowed| allowed.contains(scope))
            })
            .map(|(scope, _, _)| scope)
            .collect();

        Ok(u64::try_from(scopes.len()).unwrap_or(u64::MAX))
    }

    async fn list_entities_for_scopes(
        &self,
        config: &RelationConfig,
        scope_ids: &BTreeSet<EntityId>,
        branch_id: Option<EntityId>,
    ) -> AppResult<BTreeSet<EntityId>> {
        let branch_filter = branch_id.filter(|_| config.branch_column().is_some());
        let state = self.state.read().await;
        Ok(state
            .linked_rows(config)
            .filter(|(scope, _, branch)| {
                scope_ids.contains(scope)
                    && branch_filter.is_none_or(|wanted| *branch == Some(wanted))
            })
            .map(|(_, entity, _)| entity)
            .collect())
    }

    async fn list_entities_by_attribute(
        &self,
        lookup: &AttributeLookup,
        value: EntityId,
    ) -> AppResult<BTreeSet<EntityId>> {
        let state = self.state.read().await;
        Ok(state
            .tables
            .get(lookup.table().as_str())
            .into_iter()
            .flatten()
            .filter(|row| {
                RelationStoreState::column(row, lookup.attribute_column().as_str()) == Some(value)
            })
            .filter_map(|row| RelationStoreState::column(row, lookup.id_column().as_str()))
            .collect())
    }

    async fn link(
        &self,
        config: &RelationConfig,
        scope_id: EntityId,
        entity_id: EntityId,
        branch_id: Option<EntityId>,
    ) -> AppResult<bool> {
        ensure_linkable(config)?;

        let branch_id = branch_id.filter(|_| config.branch_column().is_some());
        let mut state = self.state.write().await;
        if state
            .linked_rows(config)
            .any(|linked| linked == (scope_id, entity_id, branch_id))
        {
            return Ok(false);
        }

        let mut row = BTreeMap::from([
            (config.scope_column().as_str().to_owned(), Some(scope_id)),
            (config.entity_column().as_str().to_owned(), Some(entity_id)),
        ]);
        if let Some(column) = config.branch_column() {
            row.insert(column.as_str().to_owned(), branch_id);
        }

        state
            .tables
            .entry(config.bridge_table().as_str().to_owned())
            .or_default()
            .push(row);

        Ok(true)
    }

    async fn unlink(
        &self,
        config: &RelationConfig,
        scope_id: EntityId,
        entity_id: EntityId,
        branch_id: Option<EntityId>,
    ) -> AppResult<bool> {
        ensure_linkable(config)?;

        let mut state = self.state.write().await;
        let Some(rows) = state.tables.get_mut(config.bridge_table().as_str()) else {
            return Ok(false);
        };

        let before = rows.len();
        rows.retain(|row| {
            let matches = RelationStoreState::column(row, config.scope_column().as_str())
                == Some(scope_id)
                && RelationStoreState::column(row, config.entity_column().as_str())
                    == Some(entity_id)
                && config.branch_column().is_none_or(|column| {
                    RelationStoreState::column(row, column.as_str()) == branch_id
                });
            !matches
        });

        Ok(rows.len() != before)
    }
}

#[async_trait]
impl PrincipalDirectory for InMemoryRelationStore {
    async fn is_on_staff_roster(&self, principal_id: PrincipalId) -> AppResult<bool> {
        Ok(self.state.read().await.staff_roster.contains(&principal_id))
    }

    async fn capabilities(&self, principal_id: PrincipalId) -> AppResult<PrincipalCapabilities> {
        Ok(self
            .state
            .read()
            .await
            .capabilities
            .get(&principal_id)
            .copied()
            .unwrap_or_default())
    }

    async fn owned_customer_ids(
        &self,
        principal_id: PrincipalId,
    ) -> AppResult<BTreeSet<EntityId>> {
        Ok(self
            .state
            .read()
            .await
            .owned_customers
            .get(&principal_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn affiliations(&self, principal_id: PrincipalId) -> AppResult<Vec<Affiliation>> {
        Ok(self
            .state
            .read()
            .await
            .affiliations
            .get(&principal_id)
            .map(|affiliations| affiliations.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn partner_region(&self, principal_id: PrincipalId) -> AppResult<Option<EntityId>> {
        Ok(self
            .state
            .read()
            .await
            .partner_regions
            .get(&principal_id)
            .copied())
    }

    async fn branch_ids_for_customers(
        &self,
        customer_ids: &BTreeSet<EntityId>,
    ) -> AppResult<BTreeSet<EntityId>> {
        Ok(self
            .state
            .read()
            .await
            .branches
            .iter()
            .filter(|(customer_id, _)| customer_ids.contains(customer_id))
            .map(|(_, branch_id)| *branch_id)
            .collect())
    }
}
