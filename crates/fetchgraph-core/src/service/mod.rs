//! The data-service boundary.
//!
//! Everything behind [`DataService`] (transport, auth, retries) belongs to
//! its implementor; the engine only compiles queries, hands them over, and
//! surfaces failures unchanged as [`DataServiceError`].

mod memory;

pub use memory::{InMemoryDataService, InMemoryError};

use async_trait::async_trait;
use fetchgraph_proto::{
    ColumnSet, EntityCollection, QueryExpression, RecordRequest, RecordResult, Row,
};

use crate::error::{DataServiceError, Result};
use crate::metadata::{metadata_of, Entity};
use crate::query::downcast_entity;

/// A remote record store that runs compiled queries and single-record
/// requests.
#[async_trait]
pub trait DataService: Send + Sync {
    /// Run a compiled query.
    async fn retrieve_multiple(
        &self,
        query: &QueryExpression,
    ) -> Result<EntityCollection, DataServiceError>;

    /// Run a single-record request.
    async fn execute_record(
        &self,
        request: RecordRequest,
    ) -> Result<RecordResult, DataServiceError>;

    /// Create a record, returning its identifier.
    async fn create(&self, entity: &str, attributes: Row) -> Result<[u8; 16], DataServiceError> {
        match self
            .execute_record(RecordRequest::create(entity, attributes))
            .await?
        {
            RecordResult::Created(id) => Ok(id),
            other => Err(unexpected("create", other)),
        }
    }

    /// Retrieve one record by identifier.
    async fn retrieve(
        &self,
        entity: &str,
        id: [u8; 16],
        columns: ColumnSet,
    ) -> Result<Row, DataServiceError> {
        match self
            .execute_record(RecordRequest::retrieve(entity, id, columns))
            .await?
        {
            RecordResult::Retrieved(row) => Ok(row),
            other => Err(unexpected("retrieve", other)),
        }
    }

    /// Overwrite attributes of an existing record.
    async fn update(
        &self,
        entity: &str,
        id: [u8; 16],
        attributes: Row,
    ) -> Result<(), DataServiceError> {
        match self
            .execute_record(RecordRequest::update(entity, id, attributes))
            .await?
        {
            RecordResult::Done => Ok(()),
            other => Err(unexpected("update", other)),
        }
    }

    /// Delete a record.
    async fn delete(&self, entity: &str, id: [u8; 16]) -> Result<(), DataServiceError> {
        match self.execute_record(RecordRequest::delete(entity, id)).await? {
            RecordResult::Done => Ok(()),
            other => Err(unexpected("delete", other)),
        }
    }
}

fn unexpected(operation: &str, result: RecordResult) -> DataServiceError {
    DataServiceError::new(format!("unexpected result for {operation}: {result:?}"))
}

/// Retrieve one `E` by identifier, projecting every declared field.
pub async fn retrieve_entity<E: Entity>(service: &dyn DataService, id: [u8; 16]) -> Result<E> {
    let metadata = metadata_of::<E>()?;
    let row = service
        .retrieve(
            metadata.logical_name(),
            id,
            ColumnSet::Columns(metadata.mapped_columns()),
        )
        .await?;
    let instance = metadata.construct(|column| row.get(column))?;
    Ok(downcast_entity(&metadata, instance)?)
}
