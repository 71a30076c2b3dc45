use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use relgate_core::{AppError, AppResult, EntityId, PrincipalId};
use relgate_domain::{
    AccessCacheKey, Affiliation, AttributeLookup, CachedAccessValue, PrincipalCapabilities,
    RelationConfig,
};
use tokio::sync::Mutex;

use crate::{AccessCache, BridgeRepository, PrincipalDirectory};

pub type FakeRow = BTreeMap<String, Option<EntityId>>;

pub fn row(columns: &[(&str, Option<u64>)]) -> FakeRow {
    columns
        .iter()
        .map(|(column, value)| ((*column).to_owned(), value.map(EntityId::new)))
        .collect()
}

#[derive(Default)]
pub struct FakeDirectory {
    pub staff_roster: BTreeSet<PrincipalId>,
    pub capabilities: HashMap<PrincipalId, PrincipalCapabilities>,
    pub owned_customers: HashMap<PrincipalId, BTreeSet<EntityId>>,
    pub affiliations: HashMap<PrincipalId, Vec<Affiliation>>,
    pub partner_regions: HashMap<PrincipalId, EntityId>,
    pub branches: Vec<(EntityId, EntityId)>,
    pub fail_reads: bool,
}

impl FakeDirectory {
    fn check(&self) -> AppResult<()> {
        if self.fail_reads {
            return Err(AppError::Internal("directory unavailable".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl PrincipalDirectory for FakeDirectory {
    async fn is_on_staff_roster(&self, principal_id: PrincipalId) -> AppResult<bool> {
        self.check()?;
        Ok(self.staff_roster.contains(&principal_id))
    }

    async fn capabilities(&self, principal_id: PrincipalId) -> AppResult<PrincipalCapabilities> {
        self.check()?;
        Ok(self
            .capabilities
            .get(&principal_id)
            .copied()
            .unwrap_or_default())
    }

    async fn owned_customer_ids(
        &self,
        principal_id: PrincipalId,
    ) -> AppResult<BTreeSet<EntityId>> {
        self.check()?;
        Ok(self
            .owned_customers
            .get(&principal_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn affiliations(&self, principal_id: PrincipalId) -> AppResult<Vec<Affiliation>> {
        self.check()?;
        Ok(self
            .affiliations
            .get(&principal_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn partner_region(&self, principal_id: PrincipalId) -> AppResult<Option<EntityId>> {
        self.check()?;
        Ok(self.partner_regions.get(&principal_id).copied())
    }

    async fn branch_ids_for_customers(
        &self,
        customer_ids: &BTreeSet<EntityId>,
    ) -> AppResult<BTreeSet<EntityId>> {
        self.check()?;
        Ok(self
            .branches
            .iter()
            .filter(|(customer_id, _)| customer_ids.contains(customer_id))
            .map(|(_, branch_id)| *branch_id)
            .collect())
    }
}

#[derive(Default)]
pub struct FakeBridgeRepository {
    pub tables: Mutex<HashMap<String, Vec<FakeRow>>>,
    pub reads: AtomicUsize,
    pub fail_reads: AtomicBool,
}

impl FakeBridgeRepository {
    pub fn with_rows(table: &str, rows: Vec<FakeRow>) -> Self {
        Self {
            tables: Mutex::new(HashMap::from([(table.to_owned(), rows)])),
            ..Self::default()
        }
    }

    pub async fn insert_rows(&self, table: &str, rows: Vec<FakeRow>) {
        self.tables
            .lock()
            .await
            .entry(table.to_owned())
            .or_default()
            .extend(rows);
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn record_read(&self) -> AppResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Internal("bridge table unavailable".to_owned()));
        }
        Ok(())
    }

    async fn linked_rows(
        &self,
        config: &RelationConfig,
    ) -> Vec<(EntityId, EntityId, Option<EntityId>)> {
        let tables = self.tables.lock().await;
        tables
            .get(config.bridge_table().as_str())
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| {
                        let scope = row.get(config.scope_column().as_str()).copied().flatten()?;
                        let entity = row.get(config.entity_column().as_str()).copied().flatten()?;
                        let branch = config
                            .branch_column()
                            .and_then(|column| row.get(column.as_str()).copied().flatten());
                        Some((scope, entity, branch))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl BridgeRepository for FakeBridgeRepository {
    async fn count_linked_scopes(
        &self,
        config: &RelationConfig,
        entity_id: EntityId,
        scope_ids: Option<&BTreeSet<EntityId>>,
    ) -> AppResult<u64> {
        self.record_read()?;
        let scopes: BTreeSet<EntityId> = self
            .linked_rows(config)
            .await
            .into_iter()
            .filter(|(scope, entity, _)| {
                *entity == entity_id && scope_ids.is_none_or(|allowed| allowed.contains(scope))
            })
            .map(|(scope, _, _)| scope)
            .collect();
        Ok(scopes.len() as u64)
    }

    async fn list_entities_for_scopes(
        &self,
        config: &RelationConfig,
        scope_ids: &BTreeSet<EntityId>,
        branch_id: Option<EntityId>,
    ) -> AppResult<BTreeSet<EntityId>> {
        self.record_read()?;
        let branch_filter = branch_id.filter(|_| config.branch_column().is_some());
        Ok(self
            .linked_rows(config)
            .await
            .into_iter()
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
        self.record_read()?;
        let tables = self.tables.lock().await;
        Ok(tables
            .get(lookup.table().as_str())
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        row.get(lookup.attribute_column().as_str()).copied().flatten()
                            == Some(value)
                    })
                    .filter_map(|row| row.get(lookup.id_column().as_str()).copied().flatten())
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn link(
        &self,
        config: &RelationConfig,
        scope_id: EntityId,
        entity_id: EntityId,
        branch_id: Option<EntityId>,
    ) -> AppResult<bool> {
        let branch_id = branch_id.filter(|_| config.branch_column().is_some());
        if self
            .linked_rows(config)
            .await
            .contains(&(scope_id, entity_id, branch_id))
        {
            return Ok(false);
        }

        let mut new_row = BTreeMap::from([
            (config.scope_column().as_str().to_owned(), Some(scope_id)),
            (config.entity_column().as_str().to_owned(), Some(entity_id)),
        ]);
        if let Some(column) = config.branch_column() {
            new_row.insert(column.as_str().to_owned(), branch_id);
        }

        let mut tables = self.tables.lock().await;
        tables
            .entry(config.bridge_table().as_str().to_owned())
            .or_default()
            .push(new_row);
        Ok(true)
    }

    async fn unlink(
        &self,
        config: &RelationConfig,
        scope_id: EntityId,
        entity_id: EntityId,
        branch_id: Option<EntityId>,
    ) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        let Some(rows) = tables.get_mut(config.bridge_table().as_str()) else {
            return Ok(false);
        };

        let value = |row: &FakeRow, column: &str| row.get(column).copied().flatten();
        let before = rows.len();
        rows.retain(|row| {
            let branch_matches = config
                .branch_column()
                .is_none_or(|column| value(row, column.as_str()) == branch_id);
            value(row, config.scope_column().as_str()) != Some(scope_id)
                || value(row, config.entity_column().as_str()) != Some(entity_id)
                || !branch_matches
        });
        Ok(rows.len() != before)
    }
}

#[derive(Default)]
pub struct FakeAccessCache {
    pub entries: Mutex<HashMap<String, (String, CachedAccessValue)>>,
    pub fail: AtomicBool,
    pub group_flushes: Mutex<Vec<String>>,
}

impl FakeAccessCache {
    fn check(&self) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("cache backend unavailable".to_owned()));
        }
        Ok(())
    }

    pub async fn contains(&self, key: &AccessCacheKey) -> bool {
        self.entries.lock().await.contains_key(&key.storage_key())
    }
}

#[async_trait]
impl AccessCache for FakeAccessCache {
    async fn get(&self, key: &AccessCacheKey) -> AppResult<Option<CachedAccessValue>> {
        self.check()?;
        Ok(self
            .entries
            .lock()
            .await
            .get(&key.storage_key())
            .map(|(_, value)| value.clone()))
    }

    async fn set(
        &self,
        key: &AccessCacheKey,
        value: CachedAccessValue,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        self.check()?;
        if ttl_seconds == 0 {
            return Ok(());
        }
        self.entries
            .lock()
            .await
            .insert(key.storage_key(), (key.cache_group().to_owned(), value));
        Ok(())
    }

    async fn invalidate(&self, key: &AccessCacheKey) -> AppResult<()> {
        self.check()?;
        self.entries.lock().await.remove(&key.storage_key());
        Ok(())
    }

    async fn invalidate_group(&self, cache_group: &str) -> AppResult<()> {
        self.check()?;
        self.group_flushes.lock().await.push(cache_group.to_owned());
        self.entries
            .lock()
            .await
            .retain(|_, (group, _)| group != cache_group);
        Ok(())
    }
}
