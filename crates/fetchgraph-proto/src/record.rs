//! Single-record requests passed straight through to the data service.

use crate::query::ColumnSet;
use crate::result::Row;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A create, retrieve, update, or delete of one record.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub enum RecordRequest {
    /// Create a new record.
    Create {
        /// Logical name of the entity.
        entity: String,
        /// Attributes of the new record.
        attributes: Row,
    },
    /// Retrieve one record by id.
    Retrieve {
        /// Logical name of the entity.
        entity: String,
        /// Record identifier.
        id: [u8; 16],
        /// Columns to return.
        columns: ColumnSet,
    },
    /// Update attributes of an existing record.
    Update {
        /// Logical name of the entity.
        entity: String,
        /// Record identifier.
        id: [u8; 16],
        /// Attributes to overwrite.
        attributes: Row,
    },
    /// Delete a record.
    Delete {
        /// Logical name of the entity.
        entity: String,
        /// Record identifier.
        id: [u8; 16],
    },
}

impl RecordRequest {
    /// Create a create request.
    pub fn create(entity: impl Into<String>, attributes: Row) -> Self {
        RecordRequest::Create {
            entity: entity.into(),
            attributes,
        }
    }

    /// Create a retrieve request.
    pub fn retrieve(entity: impl Into<String>, id: [u8; 16], columns: ColumnSet) -> Self {
        RecordRequest::Retrieve {
            entity: entity.into(),
            id,
            columns,
        }
    }

    /// Create an update request.
    pub fn update(entity: impl Into<String>, id: [u8; 16], attributes: Row) -> Self {
        RecordRequest::Update {
            entity: entity.into(),
            id,
            attributes,
        }
    }

    /// Create a delete request.
    pub fn delete(entity: impl Into<String>, id: [u8; 16]) -> Self {
        RecordRequest::Delete {
            entity: entity.into(),
            id,
        }
    }

    /// Logical name of the targeted entity.
    pub fn entity(&self) -> &str {
        match self {
            RecordRequest::Create { entity, .. }
            | RecordRequest::Retrieve { entity, .. }
            | RecordRequest::Update { entity, .. }
            | RecordRequest::Delete { entity, .. } => entity,
        }
    }
}

/// Outcome of a single-record request.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub enum RecordResult {
    /// Identifier assigned to a created record.
    Created([u8; 16]),
    /// The retrieved record.
    Retrieved(Row),
    /// Update or delete applied.
    Done,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_entity() {
        let request = RecordRequest::update("flight", [2; 16], Row::new().with("completed", true));
        assert_eq!(request.entity(), "flight");
        assert_eq!(RecordRequest::delete("contact", [1; 16]).entity(), "contact");
    }
}
