//! Stateless HTTP request builder and response parser for the animal API.
//!
//! # Design
//! `AnimalClient` holds only the collection URL. Each operation is split into
//! a `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`; a `Transport` executes the round-trip in
//! between.
//!
//! Item URLs are the collection URL with the id appended (`.../animal/7`),
//! so the collection URL always ends in exactly one `/`.

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Animal, RenameAnimal};

const COLLECTION_PATH: &str = "/api/animal";

const LIST_OK: &[u16] = &[200];
const CREATE_OK: &[u16] = &[200, 201];
const RENAME_OK: &[u16] = &[200];
const DELETE_OK: &[u16] = &[200, 204];

#[derive(Debug, Clone)]
pub struct AnimalClient {
    collection_url: String,
}

impl AnimalClient {
    /// Accepts either the server root (`http://host:3000`) or the full
    /// collection URL (`http://host:3000/api/animal/`).
    pub fn new(base_url: &str) -> Self {
        let trimmed = base_url.trim_end_matches('/');
        let collection_url = if trimmed.ends_with(COLLECTION_PATH) {
            format!("{trimmed}/")
        } else {
            format!("{trimmed}{COLLECTION_PATH}/")
        };
        Self { collection_url }
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}{id}", self.collection_url)
    }

    pub fn build_list_animals(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.collection_url.clone(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_animal(&self, animal: &Animal) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(animal).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.collection_url.clone(),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_rename_animal(&self, id: i64, name: &str) -> Result<HttpRequest, ApiError> {
        let input = RenameAnimal {
            name: name.to_string(),
        };
        let body = serde_json::to_string(&input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: self.item_url(id),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_delete_animal(&self, id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.item_url(id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_animals(&self, response: HttpResponse) -> Result<Vec<Animal>, ApiError> {
        check_status(&response, LIST_OK)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Returns the record the server stored. Servers that echo the record
    /// (possibly with a reassigned id) win; anything else in the body means
    /// the submitted record was stored as-is.
    pub fn parse_create_animal(&self, response: HttpResponse, submitted: &Animal) -> Result<Animal, ApiError> {
        check_status(&response, CREATE_OK)?;
        match serde_json::from_str::<Animal>(&response.body) {
            Ok(stored) => {
                if stored.id != submitted.id {
                    debug!(requested = submitted.id, assigned = stored.id, "server assigned a different id");
                }
                Ok(stored)
            }
            Err(_) => Ok(submitted.clone()),
        }
    }

    pub fn parse_rename_animal(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, RENAME_OK)
    }

    pub fn parse_delete_animal(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, DELETE_OK)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

/// Map status codes outside `accepted` to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, accepted: &[u16]) -> Result<(), ApiError> {
    if accepted.contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
