//! Request and response message types.

use crate::query::QueryExpression;
use crate::record::{RecordRequest, RecordResult};
use crate::result::EntityCollection;
use rkyv::{Archive, Deserialize, Serialize};
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// A request from client to data service.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct Request {
    /// Unique request identifier for correlation.
    pub id: u64,
    /// Identity the request runs as (user-scoped operators resolve against it).
    pub caller_id: Option<[u8; 16]>,
    /// The operation to perform.
    pub operation: Operation,
}

/// Operations that can be requested.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub enum Operation {
    /// Run a compiled query.
    RetrieveMultiple(QueryExpression),
    /// Run a single-record request.
    Record(RecordRequest),
    /// Health check.
    Ping,
}

impl Request {
    /// Create a query request.
    pub fn retrieve_multiple(id: u64, query: QueryExpression) -> Self {
        Self {
            id,
            caller_id: None,
            operation: Operation::RetrieveMultiple(query),
        }
    }

    /// Create a single-record request.
    pub fn record(id: u64, request: RecordRequest) -> Self {
        Self {
            id,
            caller_id: None,
            operation: Operation::Record(request),
        }
    }

    /// Create a ping request.
    pub fn ping(id: u64) -> Self {
        Self {
            id,
            caller_id: None,
            operation: Operation::Ping,
        }
    }

    /// Run the request as a specific caller.
    pub fn with_caller(mut self, caller_id: Option<[u8; 16]>) -> Self {
        self.caller_id = caller_id;
        self
    }
}

/// A response from data service to client.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub struct Response {
    /// Request ID this response correlates to.
    pub id: u64,
    /// Response status.
    pub status: Status,
    /// Response payload.
    pub payload: ResponsePayload,
}

/// Response status.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub enum Status {
    /// Request succeeded.
    Ok,
    /// Request failed.
    Error {
        /// Error code for programmatic handling.
        code: u32,
        /// Human-readable error message.
        message: String,
    },
}

impl Status {
    /// Check if this is a success status.
    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}

/// Response payload variants.
#[derive(
    Debug, Clone, PartialEq, Archive, Serialize, Deserialize, SerdeSerialize, SerdeDeserialize,
)]
pub enum ResponsePayload {
    /// Rows of a compiled query.
    Collection(EntityCollection),
    /// Outcome of a single-record request.
    Record(RecordResult),
    /// Pong response to ping.
    Pong,
    /// Empty payload (for errors).
    Empty,
}

impl Response {
    /// Create a successful query response.
    pub fn collection(id: u64, collection: EntityCollection) -> Self {
        Self {
            id,
            status: Status::Ok,
            payload: ResponsePayload::Collection(collection),
        }
    }

    /// Create a successful single-record response.
    pub fn record(id: u64, result: RecordResult) -> Self {
        Self {
            id,
            status: Status::Ok,
            payload: ResponsePayload::Record(result),
        }
    }

    /// Create a pong response.
    pub fn pong(id: u64) -> Self {
        Self {
            id,
            status: Status::Ok,
            payload: ResponsePayload::Pong,
        }
    }

    /// Create an error response.
    pub fn error(id: u64, code: u32, message: impl Into<String>) -> Self {
        Self {
            id,
            status: Status::Error {
                code,
                message: message.into(),
            },
            payload: ResponsePayload::Empty,
        }
    }
}

/// Standard error codes reported by data services.
pub mod error_codes {
    /// Malformed request.
    pub const INVALID_REQUEST: u32 = 1;
    /// Unknown entity or column.
    pub const UNKNOWN_SCHEMA_OBJECT: u32 = 2;
    /// Record not found.
    pub const NOT_FOUND: u32 = 3;
    /// Caller lacks privileges.
    pub const ACCESS_DENIED: u32 = 4;
    /// Unexpected server failure.
    pub const INTERNAL: u32 = 100;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = Request::retrieve_multiple(7, QueryExpression::new("flight"))
            .with_caller(Some([9; 16]));
        assert_eq!(request.id, 7);
        assert_eq!(request.caller_id, Some([9; 16]));
        assert!(matches!(request.operation, Operation::RetrieveMultiple(_)));
    }

    #[test]
    fn test_error_response() {
        let response = Response::error(3, error_codes::NOT_FOUND, "no such flight");
        assert!(!response.status.is_ok());
        assert_eq!(response.payload, ResponsePayload::Empty);
    }
}
