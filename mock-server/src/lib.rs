use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::Response,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
}

/// What `/echo` saw of the request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub struct AppState {
    users: RwLock<BTreeMap<u64, User>>,
    next_id: AtomicU64,
    token: Option<String>,
}

impl AppState {
    fn seeded(token: Option<String>) -> Arc<Self> {
        let users: BTreeMap<u64, User> = [
            (1, "Leanne Graham", "Bret", "Sincere@april.biz"),
            (2, "Ervin Howell", "Antonette", "Shanna@melissa.tv"),
            (3, "Clementine Bauch", "Samantha", "Nathan@yesenia.net"),
        ]
        .into_iter()
        .map(|(id, name, username, email)| {
            let user = User {
                id,
                name: name.to_string(),
                username: username.to_string(),
                email: email.to_string(),
            };
            (id, user)
        })
        .collect();
        let next_id = users.len() as u64 + 1;
        Arc::new(Self {
            users: RwLock::new(users),
            next_id: AtomicU64::new(next_id),
            token,
        })
    }
}

pub type Db = Arc<AppState>;

/// Users API with three seeded users and no authentication.
pub fn app() -> Router {
    router(AppState::seeded(None))
}

/// Same as [`app`] but every request must carry `Authorization: Bearer <token>`.
pub fn app_with_token(token: &str) -> Router {
    router(AppState::seeded(Some(token.to_string())))
}

fn router(state: Db) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state)
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

async fn require_bearer(State(db): State<Db>, request: Request, next: Next) -> Result<Response, StatusCode> {
    let Some(token) = db.token.as_deref() else {
        return Ok(next.run(request).await);
    };
    let presented = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));
    if presented == Some(token) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(path = %request.uri().path(), "rejected request without valid bearer token");
        Err(StatusCode::UNAUTHORIZED)
    }
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    let users = db.users.read().await;
    Json(users.values().cloned().collect())
}

async fn create_user(State(db): State<Db>, Json(input): Json<NewUser>) -> (StatusCode, Json<User>) {
    let user = User {
        id: db.next_id.fetch_add(1, Ordering::SeqCst),
        name: input.name,
        username: input.username,
        email: input.email,
    };
    db.users.write().await.insert(user.id, user.clone());
    tracing::debug!(id = user.id, "created user");
    (StatusCode::CREATED, Json(user))
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<User>, StatusCode> {
    let users = db.users.read().await;
    users.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UserPatch>,
) -> Result<Json<User>, StatusCode> {
    let mut users = db.users.write().await;
    let user = users.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(username) = input.username {
        user.username = username;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    Ok(Json(user.clone()))
}

/// Responds with the removed user so clients always get a JSON body.
async fn delete_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<User>, StatusCode> {
    let mut users = db.users.write().await;
    users.remove(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serializes_to_json() {
        let user = User {
            id: 3,
            name: "Clementine Bauch".to_string(),
            username: "Samantha".to_string(),
            email: "Nathan@yesenia.net".to_string(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["username"], "Samantha");
    }

    #[test]
    fn new_user_defaults_email() {
        let input: NewUser = serde_json::from_str(r#"{"name":"Kurtis","username":"Elwyn"}"#).unwrap();
        assert_eq!(input.name, "Kurtis");
        assert!(input.email.is_empty());
    }

    #[test]
    fn new_user_rejects_missing_username() {
        let result: Result<NewUser, _> = serde_json::from_str(r#"{"name":"Kurtis"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn user_patch_all_fields_optional() {
        let input: UserPatch = serde_json::from_str("{}").unwrap();
        assert!(input.name.is_none());
        assert!(input.username.is_none());
        assert!(input.email.is_none());
    }

    #[test]
    fn seeded_state_continues_ids() {
        let state = AppState::seeded(None);
        assert_eq!(state.next_id.load(Ordering::SeqCst), 4);
        assert!(state.token.is_none());
    }
}
