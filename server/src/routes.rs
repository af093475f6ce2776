//! HTTP endpoints of the upload gateway.
//!
//! - POST /upload/<filename> - store the raw body, hash it and index it
//! - POST /upload/file/<shahash>/<filename> - look up or create the entry matching a client digest
//! - GET /files - list entries
//! - GET /files/<hash> - fetch one entry
//! - DELETE /files/<hash> - drop an entry
//! - POST /files/refresh - run a staleness sweep now
//! - GET /journal - diagnostic journal lines

use filehash::storage::validation::validate_file_name;
use filehash::{DigestEngine, Entry, RefreshSummary, RegistryError};
use rocket::data::{ByteUnit, Data, Limits, ToByteUnit};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, post, routes, Route, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

/// Body cap used when the `upload` limit is not configured.
pub fn default_upload_limit() -> ByteUnit {
    64.mebibytes()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub created: bool,
    pub entry: Entry,
}

pub fn routes() -> Vec<Route> {
    routes![upload, verify, list_files, get_file, delete_file, refresh, journal]
}

async fn next_version(state: &AppState, file_name: &str) -> u32 {
    state.index.latest_version(file_name).await.map_or(1, |v| v.saturating_add(1))
}

#[post("/upload/<filename>", data = "<data>")]
async fn upload(
    state: &State<AppState>,
    limits: &Limits,
    filename: &str,
    data: Data<'_>,
) -> Result<(Status, Json<Entry>), ApiError> {
    validate_file_name(filename)?;

    let limit = limits.get("upload").unwrap_or_else(default_upload_limit);
    let body = data.open(limit).into_bytes().await.map_err(RegistryError::from)?;
    if !body.is_complete() {
        return Err(ApiError::PayloadTooLarge(limit.to_string()));
    }

    // Nothing is hashed or indexed unless the whole body reached storage.
    let expected_hash = DigestEngine::digest_bytes(&body);
    let written = state.store.persist(filename, &body).await?;

    let version = next_version(state, filename).await;
    let entry = state.index.hash(Entry::new(filename).with_version(version)).await;
    state.validation.validate_entry(&entry, written, &expected_hash).await?;

    let file_hash = entry.file_hash.clone();
    state.index.add(entry.clone()).await;
    // Storage keeps only the latest bytes under a name.
    let superseded = state.index.supersede(filename, &file_hash).await;
    info!(file_name = %filename, %file_hash, bytes = written, version, superseded = superseded.len(), "indexed upload");

    let stored = state.index.get(&file_hash).await.unwrap_or(entry);
    Ok((Status::Created, Json(stored)))
}

#[post("/upload/file/<shahash>/<filename>")]
async fn verify(
    state: &State<AppState>,
    shahash: &str,
    filename: &str,
) -> Result<(Status, Json<VerifyResponse>), ApiError> {
    validate_file_name(filename)?;

    if let Some(existing) = state.index.get(shahash).await {
        if existing.file_name == filename {
            let entry = state.index.touch(shahash).await.unwrap_or(existing);
            return Ok((Status::Ok, Json(VerifyResponse { created: false, entry })));
        }
    }

    let (file_hash, file_bytes) = state.index.digest_engine().try_digest(filename).await?;
    if file_hash != shahash {
        return Err(RegistryError::DigestMismatch { expected: shahash.to_string(), actual: file_hash }.into());
    }

    let mut entry = Entry::new(filename)
        .with_version(next_version(state, filename).await)
        .with_hash(file_hash);
    entry.file_bytes = file_bytes;
    state.index.add(entry.clone()).await;
    state.index.supersede(filename, shahash).await;
    info!(file_name = %filename, file_hash = %shahash, "indexed verified file");

    let entry = state.index.get(shahash).await.unwrap_or(entry);
    Ok((Status::Created, Json(VerifyResponse { created: true, entry })))
}

#[get("/files")]
async fn list_files(state: &State<AppState>) -> Json<Vec<Entry>> {
    Json(state.index.entries().await)
}

#[get("/files/<hash>")]
async fn get_file(state: &State<AppState>, hash: &str) -> Result<Json<Entry>, ApiError> {
    state
        .index
        .get(hash)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::EntryNotFound(hash.to_string()))
}

/// Removes the entry, and the stored file too once no other entry uses its name.
#[delete("/files/<hash>")]
async fn delete_file(state: &State<AppState>, hash: &str) -> Result<Json<Entry>, ApiError> {
    let removed = state
        .index
        .remove(hash)
        .await
        .ok_or_else(|| ApiError::EntryNotFound(hash.to_string()))?;

    if state.index.find_by_name(&removed.file_name).await.is_empty() {
        match state.store.remove(&removed.file_name).await {
            Ok(()) | Err(RegistryError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    info!(file_hash = %hash, file_name = %removed.file_name, "removed entry");
    Ok(Json(removed))
}

#[post("/files/refresh")]
async fn refresh(state: &State<AppState>) -> Json<RefreshSummary> {
    Json(state.index.refresh().await)
}

#[get("/journal")]
async fn journal(state: &State<AppState>) -> Json<Vec<String>> {
    Json(state.index.journal().lines().await)
}
