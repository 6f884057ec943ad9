//! fetchgraph client API.
//!
//! [`Client`] speaks the request/response protocol to a remote data service
//! and implements [`DataService`], so queries built with `fetchgraph-core`
//! run against it directly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use fetchgraph_core::{DataService, DataServiceError};
use fetchgraph_proto::{
    EntityCollection, QueryExpression, RecordRequest, RecordResult, Request, Response,
    ResponsePayload, Status,
};

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::Error;

/// A client for a remote fetchgraph data service.
///
/// # Example
///
/// ```ignore
/// use fetchgraph_client::{Client, ClientConfig};
/// use fetchgraph_core::RawQuery;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::connect(ClientConfig::from_env()?).await?;
///     client.ping().await?;
///
///     let rows = RawQuery::new("account").top(10).execute(&client).await?;
///     println!("{} accounts", rows.len());
///
///     client.close().await;
///     Ok(())
/// }
/// ```
pub struct Client {
    connection: Arc<Mutex<Connection>>,
    next_request_id: AtomicU64,
    caller_id: Option<[u8; 16]>,
}

impl Client {
    /// Connect to a data service.
    pub async fn connect(config: ClientConfig) -> Result<Self, Error> {
        let caller_id = config.caller_id;
        let connection = Connection::establish(config).await?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
            next_request_id: AtomicU64::new(1),
            caller_id,
        })
    }

    /// Connect to a data service at the given address.
    pub async fn connect_to(address: impl Into<String>) -> Result<Self, Error> {
        Self::connect(ClientConfig::new(address)).await
    }

    /// Connect to localhost on the default port.
    pub async fn connect_localhost() -> Result<Self, Error> {
        Self::connect(ClientConfig::localhost()).await
    }

    /// Run a compiled query.
    pub async fn query(&self, query: QueryExpression) -> Result<EntityCollection, Error> {
        let request = Request::retrieve_multiple(self.next_request_id(), query)
            .with_caller(self.caller_id);
        let response = self.send_request(&request).await?;

        handle_response(response, |payload| match payload {
            ResponsePayload::Collection(collection) => Ok(collection),
            _ => Err(unexpected_payload("expected entity collection")),
        })
    }

    /// Run a single-record request.
    pub async fn record(&self, record: RecordRequest) -> Result<RecordResult, Error> {
        let request =
            Request::record(self.next_request_id(), record).with_caller(self.caller_id);
        let response = self.send_request(&request).await?;

        handle_response(response, |payload| match payload {
            ResponsePayload::Record(result) => Ok(result),
            _ => Err(unexpected_payload("expected record result")),
        })
    }

    /// Ping the data service to check connectivity.
    pub async fn ping(&self) -> Result<(), Error> {
        let request = Request::ping(self.next_request_id());
        let response = self.send_request(&request).await?;

        handle_response(response, |payload| match payload {
            ResponsePayload::Pong => Ok(()),
            _ => Err(unexpected_payload("expected pong response")),
        })
    }

    /// Close the client connection.
    pub async fn close(&self) {
        let mut conn = self.connection.lock().await;
        conn.close();
    }

    /// Check if the client is connected.
    pub async fn is_connected(&self) -> bool {
        let conn = self.connection.lock().await;
        conn.is_connected()
    }

    fn next_request_id(&self) -> u64 {
        self.next_request_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn send_request(&self, request: &Request) -> Result<Response, Error> {
        let conn = self.connection.lock().await;
        conn.send_request(request).await
    }
}

#[async_trait]
impl DataService for Client {
    async fn retrieve_multiple(
        &self,
        query: &QueryExpression,
    ) -> Result<EntityCollection, DataServiceError> {
        self.query(query.clone()).await.map_err(DataServiceError::new)
    }

    async fn execute_record(
        &self,
        request: RecordRequest,
    ) -> Result<RecordResult, DataServiceError> {
        self.record(request).await.map_err(DataServiceError::new)
    }
}

/// Extract the payload of a successful response, or convert its error status.
fn handle_response<T, F>(response: Response, extract: F) -> Result<T, Error>
where
    F: FnOnce(ResponsePayload) -> Result<T, Error>,
{
    match response.status {
        Status::Ok => extract(response.payload),
        Status::Error { code, message } => Err(Error::Server { code, message }),
    }
}

fn unexpected_payload(message: &str) -> Error {
    Error::Protocol(fetchgraph_proto::Error::InvalidMessage(message.to_string()))
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("next_request_id", &self.next_request_id.load(Ordering::SeqCst))
            .field("caller_id", &self.caller_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetchgraph_proto::{error_codes, Row};
    use pretty_assertions::assert_eq;

    fn collection(response: Response) -> Result<EntityCollection, Error> {
        handle_response(response, |payload| match payload {
            ResponsePayload::Collection(collection) => Ok(collection),
            _ => Err(unexpected_payload("expected entity collection")),
        })
    }

    #[test]
    fn test_collection_payload() {
        let rows = EntityCollection::new("account", vec![Row::new().with("name", "Contoso")]);
        let response = Response::collection(4, rows.clone());
        assert_eq!(collection(response).unwrap(), rows);
    }

    #[test]
    fn test_error_status_becomes_server_error() {
        let response = Response::error(5, error_codes::UNKNOWN_SCHEMA_OBJECT, "no entity `acount`");
        match collection(response) {
            Err(Error::Server { code, message }) => {
                assert_eq!(code, error_codes::UNKNOWN_SCHEMA_OBJECT);
                assert_eq!(message, "no entity `acount`");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_payload_is_protocol_error() {
        assert!(matches!(
            collection(Response::pong(6)),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_client_errors_cross_the_boundary() {
        let err = DataServiceError::new(Error::Timeout);
        assert_eq!(err.to_string(), "request timed out");
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Timeout)));
    }
}
