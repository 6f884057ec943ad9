//! Connection management for the fetchgraph client.

use async_nng::AsyncContext;
use nng::options::Options;
use nng::{Message, Protocol, Socket};

use fetchgraph_proto::codec::{decode_response, encode_request};
use fetchgraph_proto::{Request, Response};

use crate::config::ClientConfig;
use crate::error::Error;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Socket dialed, ready for requests.
    Connected,
    /// Connection closed.
    Closed,
}

/// A REQ socket dialed to a data service.
///
/// NNG delimits messages itself, so each request is one rkyv payload.
pub struct Connection {
    socket: Socket,
    state: ConnectionState,
    config: ClientConfig,
}

impl Connection {
    /// Dial the configured address.
    pub async fn establish(config: ClientConfig) -> Result<Self, Error> {
        let socket = Socket::new(Protocol::Req0)
            .map_err(|e| Error::Connection(format!("failed to create socket: {}", e)))?;

        socket
            .set_opt::<nng::options::RecvMaxSize>(config.max_message_size)
            .map_err(|e| Error::Connection(format!("failed to set max message size: {}", e)))?;
        socket
            .set_opt::<nng::options::SendTimeout>(Some(config.timeout))
            .map_err(|e| Error::Connection(format!("failed to set send timeout: {}", e)))?;
        socket
            .set_opt::<nng::options::RecvTimeout>(Some(config.timeout))
            .map_err(|e| Error::Connection(format!("failed to set recv timeout: {}", e)))?;

        socket.dial(&config.address).map_err(|e| {
            Error::Connection(format!("failed to connect to {}: {}", config.address, e))
        })?;

        tracing::debug!(
            address = %config.address,
            client_id = %config.client_id,
            "dialed data service"
        );
        Ok(Self {
            socket,
            state: ConnectionState::Connected,
            config,
        })
    }

    fn create_context(&self) -> Result<AsyncContext<'_>, Error> {
        AsyncContext::try_from(&self.socket)
            .map_err(|e| Error::Connection(format!("failed to create async context: {}", e)))
    }

    /// Send a request and receive its response.
    pub async fn send_request(&self, request: &Request) -> Result<Response, Error> {
        if self.state != ConnectionState::Connected {
            return Err(Error::Connection(format!(
                "cannot send request in state {:?}",
                self.state
            )));
        }

        let payload = encode_request(request)?;
        check_size(payload.len(), self.config.max_message_size)?;

        let mut ctx = self.create_context()?;
        let msg = Message::from(payload.as_slice());
        ctx.send(msg, Some(self.config.timeout))
            .await
            .map_err(|(_, e)| match e {
                nng::Error::TimedOut => Error::Timeout,
                _ => Error::Connection(format!("failed to send request: {}", e)),
            })?;

        let response_msg = ctx
            .receive(Some(self.config.timeout))
            .await
            .map_err(|e| match e {
                nng::Error::TimedOut => Error::Timeout,
                _ => Error::Connection(format!("failed to receive response: {}", e)),
            })?;

        let response = decode_response(response_msg.as_slice())?;
        if response.id != request.id {
            return Err(Error::Protocol(fetchgraph_proto::Error::InvalidMessage(format!(
                "response ID mismatch: expected {}, got {}",
                request.id, response.id
            ))));
        }

        Ok(response)
    }

    /// Close the connection.
    pub fn close(&mut self) {
        self.state = ConnectionState::Closed;
    }

    /// Check if the connection accepts requests.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// The configuration this connection was dialed with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

fn check_size(size: usize, max: usize) -> Result<(), Error> {
    if size > max {
        return Err(Error::Protocol(fetchgraph_proto::Error::TooLarge { size, max }));
    }
    Ok(())
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("address", &self.config.address)
            .field("state", &self.state)
            .field("client_id", &self.config.client_id)
            .finish()
    }
}
