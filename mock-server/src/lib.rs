use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animal {
    pub id: i64,
    pub name: String,
}

#[derive(Deserialize)]
pub struct RenameAnimal {
    pub name: String,
}

/// Records in insertion order; `GET` returns them in this order.
pub type Db = Arc<RwLock<Vec<Animal>>>;

pub fn app() -> Router {
    app_with(Vec::new())
}

/// Router pre-populated with `animals`.
pub fn app_with(animals: Vec<Animal>) -> Router {
    let db: Db = Arc::new(RwLock::new(animals));
    Router::new()
        .route("/api/animal/", get(list_animals).post(create_animal))
        .route("/api/animal/{id}", put(rename_animal).delete(delete_animal))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_animals(State(db): State<Db>) -> Json<Vec<Animal>> {
    let animals = db.read().await;
    info!(count = animals.len(), "list animals");
    Json(animals.clone())
}

async fn create_animal(
    State(db): State<Db>,
    Json(mut input): Json<Animal>,
) -> Result<(StatusCode, Json<Animal>), StatusCode> {
    let mut animals = db.write().await;
    if animals.iter().any(|a| a.id == input.id) {
        let Some(next) = animals.iter().map(|a| a.id).max().unwrap_or(0).checked_add(1) else {
            warn!(requested = input.id, "id taken and no higher id left");
            return Err(StatusCode::CONFLICT);
        };
        info!(requested = input.id, assigned = next, "id taken, assigning next free id");
        input.id = next;
    }
    info!(id = input.id, name = %input.name, "create animal");
    animals.push(input.clone());
    Ok((StatusCode::CREATED, Json(input)))
}

async fn rename_animal(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<RenameAnimal>,
) -> Result<Json<Animal>, StatusCode> {
    let mut animals = db.write().await;
    let animal = animals
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    info!(id, name = %input.name, "rename animal");
    animal.name = input.name;
    Ok(Json(animal.clone()))
}

async fn delete_animal(State(db): State<Db>, Path(id): Path<i64>) -> StatusCode {
    let mut animals = db.write().await;
    let before = animals.len();
    animals.retain(|a| a.id != id);
    if animals.len() == before {
        return StatusCode::NOT_FOUND;
    }
    info!(id, "delete animal");
    StatusCode::NO_CONTENT
}
