//! Async facade pairing `AnimalClient` with a `Transport`.
//!
//! Every call builds the request on the caller's task, runs the round-trip on
//! tokio's blocking pool, then parses on the caller's task again. Dropping
//! the returned future abandons the result; the blocking round-trip itself
//! runs to completion.

use std::sync::Arc;

use tracing::debug;

use crate::client::AnimalClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::Animal;

#[derive(Clone)]
pub struct AnimalApi {
    client: AnimalClient,
    transport: Arc<dyn Transport>,
}

impl AnimalApi {
    pub fn new(client: AnimalClient, transport: Arc<dyn Transport>) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &AnimalClient {
        &self.client
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let transport = Arc::clone(&self.transport);
        tokio::task::spawn_blocking(move || transport.execute(request))
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?
    }

    pub async fn list(&self) -> Result<Vec<Animal>, ApiError> {
        let request = self.client.build_list_animals();
        let response = self.round_trip(request).await?;
        self.client.parse_list_animals(response)
    }

    /// Returns the record as stored by the server.
    pub async fn create(&self, animal: &Animal) -> Result<Animal, ApiError> {
        let request = self.client.build_create_animal(animal)?;
        let response = self.round_trip(request).await?;
        self.client.parse_create_animal(response, animal)
    }

    pub async fn rename(&self, id: i64, name: &str) -> Result<(), ApiError> {
        let request = self.client.build_rename_animal(id, name)?;
        let response = self.round_trip(request).await?;
        self.client.parse_rename_animal(response)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        let request = self.client.build_delete_animal(id);
        let response = self.round_trip(request).await?;
        self.client.parse_delete_animal(response)
    }
}
