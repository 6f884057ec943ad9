//! An in-process data service holding canned result sets.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use fetchgraph_proto::{
    ColumnSet, EntityCollection, QueryExpression, RecordRequest, RecordResult, Row, Value,
};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use super::DataService;
use crate::error::DataServiceError;

/// Failures reported by [`InMemoryDataService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InMemoryError {
    /// No record with the requested identifier.
    #[error("no `{entity}` record with id {id}")]
    NotFound { entity: String, id: String },

    /// A failure queued with [`InMemoryDataService::fail_next`].
    #[error("injected failure: {0}")]
    Injected(String),
}

/// A [`DataService`] answering queries from canned rows.
///
/// Query results are whatever rows were registered for the root entity,
/// cut to `top`. Single-record requests run against a separate record table.
/// Every received query is logged for inspection.
#[derive(Debug, Default)]
pub struct InMemoryDataService {
    result_sets: RwLock<HashMap<String, Vec<Row>>>,
    records: RwLock<HashMap<(String, [u8; 16]), Row>>,
    received: Mutex<Vec<QueryExpression>>,
    failure: Mutex<Option<String>>,
    next_id: AtomicU64,
}

impl InMemoryDataService {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the rows returned for queries rooted at `entity`.
    pub fn with_rows(self, entity: impl Into<String>, rows: Vec<Row>) -> Self {
        self.set_rows(entity, rows);
        self
    }

    /// Replace the rows returned for queries rooted at `entity`.
    pub fn set_rows(&self, entity: impl Into<String>, rows: Vec<Row>) {
        self.result_sets.write().insert(entity.into(), rows);
    }

    /// Make the next call fail with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        *self.failure.lock() = Some(message.into());
    }

    /// Queries received so far, oldest first.
    pub fn received_queries(&self) -> Vec<QueryExpression> {
        self.received.lock().clone()
    }

    /// Number of records in the record table.
    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    fn take_failure(&self) -> Result<(), DataServiceError> {
        match self.failure.lock().take() {
            Some(message) => Err(DataServiceError::new(InMemoryError::Injected(message))),
            None => Ok(()),
        }
    }

    fn allocate_id(&self) -> [u8; 16] {
        let sequence = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut id = [0u8; 16];
        id[8..].copy_from_slice(&sequence.to_be_bytes());
        id
    }
}

fn not_found(entity: &str, id: [u8; 16]) -> DataServiceError {
    DataServiceError::new(InMemoryError::NotFound {
        entity: entity.to_string(),
        id: Value::Uuid(id).to_string(),
    })
}

fn project(row: &Row, columns: &ColumnSet) -> Row {
    match columns {
        ColumnSet::All => row.clone(),
        ColumnSet::None => Row::new(),
        ColumnSet::Columns(_) => Row {
            attributes: row
                .attributes
                .iter()
                .filter(|a| columns.contains(&a.key))
                .cloned()
                .collect(),
        },
    }
}

#[async_trait]
impl DataService for InMemoryDataService {
    async fn retrieve_multiple(
        &self,
        query: &QueryExpression,
    ) -> Result<EntityCollection, DataServiceError> {
        self.take_failure()?;
        self.received.lock().push(query.clone());

        let mut rows = self
            .result_sets
            .read()
            .get(&query.entity_name)
            .cloned()
            .unwrap_or_default();
        let mut more_records = false;
        if let Some(top) = query.top {
            if rows.len() > top as usize {
                rows.truncate(top as usize);
                more_records = true;
            }
        }

        tracing::trace!(
            entity = %query.entity_name,
            rows = rows.len(),
            more_records,
            "served canned rows"
        );
        let mut collection = EntityCollection::new(query.entity_name.clone(), rows);
        collection.more_records = more_records;
        Ok(collection)
    }

    async fn execute_record(
        &self,
        request: RecordRequest,
    ) -> Result<RecordResult, DataServiceError> {
        self.take_failure()?;
        match request {
            RecordRequest::Create { entity, attributes } => {
                let id = self.allocate_id();
                self.records.write().insert((entity, id), attributes);
                Ok(RecordResult::Created(id))
            }
            RecordRequest::Retrieve {
                entity,
                id,
                columns,
            } => {
                let records = self.records.read();
                let row = records
                    .get(&(entity.clone(), id))
                    .ok_or_else(|| not_found(&entity, id))?;
                Ok(RecordResult::Retrieved(project(row, &columns)))
            }
            RecordRequest::Update {
                entity,
                id,
                attributes,
            } => {
                let mut records = self.records.write();
                let row = records
                    .get_mut(&(entity.clone(), id))
                    .ok_or_else(|| not_found(&entity, id))?;
                for attribute in attributes.attributes {
                    row.insert(attribute.key, attribute.value);
                }
                Ok(RecordResult::Done)
            }
            RecordRequest::Delete { entity, id } => {
                self.records
                    .write()
                    .remove(&(entity.clone(), id))
                    .ok_or_else(|| not_found(&entity, id))?;
                Ok(RecordResult::Done)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_top_truncates_and_flags_more_records() {
        let service = InMemoryDataService::new().with_rows(
            "flight",
            (0..5).map(|n| Row::new().with("seq", n)).collect(),
        );
        let mut query = QueryExpression::new("flight");
        query.top = Some(3);

        let collection = service.retrieve_multiple(&query).await.unwrap();
        assert_eq!(collection.len(), 3);
        assert!(collection.more_records);
        assert_eq!(service.received_queries(), vec![query]);
    }

    #[tokio::test]
    async fn test_record_lifecycle() {
        let service = InMemoryDataService::new();
        let id = service
            .create("contact", Row::new().with("fullname", "Ada").with("age", 36))
            .await
            .unwrap();
        service
            .update("contact", id, Row::new().with("age", 37))
            .await
            .unwrap();

        let row = service
            .retrieve("contact", id, ColumnSet::columns(["age"]))
            .await
            .unwrap();
        assert_eq!(row, Row::new().with("age", 37));

        service.delete("contact", id).await.unwrap();
        assert_eq!(service.record_count(), 0);

        let err = service.delete("contact", id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<InMemoryError>(),
            Some(InMemoryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed() {
        let service = InMemoryDataService::new();
        service.fail_next("link down");

        let err = service
            .retrieve_multiple(&QueryExpression::new("flight"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "injected failure: link down");
        assert!(service.received_queries().is_empty());

        assert!(service
            .retrieve_multiple(&QueryExpression::new("flight"))
            .await
            .is_ok());
    }
}
