use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const ACCOUNTS_PATH: &str = "/v1/organisation/accounts";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub organisation_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub version: i64,
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize)]
pub struct NewAccount {
    pub id: String,
    pub organisation_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub attributes: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    pub version: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_message: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn reject(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error_message: message.into(),
        }),
    )
}

pub type Db = Arc<RwLock<HashMap<String, Account>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route(ACCOUNTS_PATH, post(create_account))
        .route(
            &format!("{ACCOUNTS_PATH}/{{id}}"),
            get(fetch_account).delete(delete_account),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Same rules the real service applies to a new account.
fn validate(input: &NewAccount) -> Result<(), String> {
    if Uuid::parse_str(&input.id).is_err() {
        return Err(format!("id in body must be of type uuid: {:?}", input.id));
    }
    if Uuid::parse_str(&input.organisation_id).is_err() {
        return Err(format!(
            "organisation_id in body must be of type uuid: {:?}",
            input.organisation_id
        ));
    }
    if input.kind != "accounts" {
        return Err(format!("type in body should be one of [accounts]: {:?}", input.kind));
    }
    let attributes = input
        .attributes
        .as_ref()
        .ok_or_else(|| "attributes in body is required".to_string())?;
    match attributes.get("country").and_then(|c| c.as_str()) {
        Some(country) if country.len() == 2 && country.chars().all(|c| c.is_ascii_uppercase()) => {
            Ok(())
        }
        _ => Err("country in body should match '^[A-Z]{2}$'".to_string()),
    }
}

async fn create_account(
    State(db): State<Db>,
    Json(input): Json<Envelope<NewAccount>>,
) -> Result<(StatusCode, Json<Envelope<Account>>), ApiError> {
    let input = input.data;
    validate(&input).map_err(|msg| reject(StatusCode::BAD_REQUEST, msg))?;

    let mut accounts = db.write().await;
    if accounts.contains_key(&input.id) {
        return Err(reject(
            StatusCode::CONFLICT,
            "Account cannot be created as it violates a duplicate constraint",
        ));
    }
    let account = Account {
        id: input.id,
        organisation_id: input.organisation_id,
        kind: input.kind,
        version: 0,
        attributes: input.attributes.unwrap_or_default(),
    };
    tracing::info!(id = %account.id, "account created");
    accounts.insert(account.id.clone(), account.clone());
    Ok((StatusCode::CREATED, Json(Envelope { data: account })))
}

async fn fetch_account(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Account>>, ApiError> {
    let accounts = db.read().await;
    accounts
        .get(&id)
        .cloned()
        .map(|account| Json(Envelope { data: account }))
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, format!("record {id} does not exist")))
}

async fn delete_account(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, ApiError> {
    if params.version < 0 {
        return Err(reject(StatusCode::BAD_REQUEST, "invalid version number"));
    }
    let mut accounts = db.write().await;
    let account = accounts.get(&id).ok_or_else(|| reject(StatusCode::NOT_FOUND, ""))?;
    if account.version != params.version {
        return Err(reject(StatusCode::CONFLICT, "invalid version"));
    }
    accounts.remove(&id);
    tracing::info!(%id, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}
