use crate::models::{AccountInfo, Block, BlockKind, BlockStyle};
use crate::storage::{TOKEN_KEY, USER_KEY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    NotFound,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    pub(crate) fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    /// Classify a non-2xx status. 401 and 404 get their own kinds so the
    /// sync layer can branch on them; everything else is a generic HTTP
    /// failure.
    fn from_status(status: u16, body: String, ctx: &str) -> Self {
        match status {
            401 => Self::unauthorized(),
            404 => Self {
                kind: ApiErrorKind::NotFound,
                message: format!("{ctx}: not found"),
            },
            _ => Self {
                kind: ApiErrorKind::Http,
                message: format!("{ctx} ({status}): {body}"),
            },
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let default_api_url = "http://localhost:6689".to_string();

        // We support BOTH `window.ENV.API_URL` (documented in README) and
        // `window.ENV.api_url` (legacy/implementation detail) for compatibility.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    for key in ["API_URL", "api_url"] {
                        if let Ok(api_url) = js_sys::Reflect::get(&env, &key.into()) {
                            if let Some(url_str) = api_url.as_string() {
                                return Self { api_url: url_str };
                            }
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn get_api_url() -> String {
    EnvConfig::new().api_url
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub user: AccountInfo,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct SignupRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct SignupResponse {
    pub token: String,
    pub user: AccountInfo,
}

/// Partial block update. Only supplied fields change server-side
/// (PATCH semantics); everything absent stays off the wire.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub(crate) struct BlockUpdate {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<BlockKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionUpdate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<BlockStyle>,
}

/// Position subset: a drop sends only `x`/`y`, a resize only `w`/`h`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default)]
pub(crate) struct PositionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<i32>,
}

impl BlockUpdate {
    pub fn moved_to(x: i32, y: i32) -> Self {
        Self {
            position: Some(PositionUpdate {
                x: Some(x),
                y: Some(y),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn resized_to(w: i32, h: i32) -> Self {
        Self {
            position: Some(PositionUpdate {
                w: Some(w),
                h: Some(h),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    #[allow(dead_code)]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn load_from_storage() -> Self {
        let base_url = get_api_url();
        let token = leptos::web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten());

        Self { base_url, token }
    }

    pub fn save_to_storage(&self) {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            if let Some(token) = &self.token {
                let _ = storage.set_item(TOKEN_KEY, token);
            }
        }
    }

    pub fn clear_storage() {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(USER_KEY);
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    fn get_auth_token(&self) -> Option<String> {
        self.token.clone()
    }

    pub fn logout(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// All-blocks collection URL, scoped to one user's page.
    fn blocks_url(base_url: &str, username: &str) -> String {
        format!(
            "{}/api/blocks?username={}",
            base_url,
            urlencoding::encode(username)
        )
    }

    fn block_url(base_url: &str, id: &str, acting: &str) -> String {
        format!(
            "{}/api/blocks/{}?username={}",
            base_url,
            urlencoding::encode(id),
            urlencoding::encode(acting)
        )
    }

    fn with_auth_headers(
        mut req: reqwest::RequestBuilder,
        token: Option<String>,
    ) -> reqwest::RequestBuilder {
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    async fn send(
        &self,
        method: reqwest::Method,
        url: String,
        body: Option<&impl serde::Serialize>,
        ctx: &str,
    ) -> ApiResult<reqwest::Response> {
        let client = reqwest::Client::new();
        let mut req = client.request(method, url);
        req = Self::with_auth_headers(req, self.get_auth_token());

        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(res)
        } else {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, body, ctx))
        }
    }

    async fn request_api<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: String,
        body: Option<&impl serde::Serialize>,
        ctx: &str,
    ) -> ApiResult<T> {
        let res = self.send(method, url, body, ctx).await?;
        res.json().await.map_err(ApiError::parse)
    }

    /// Like `request_api` but for endpoints whose response body we
    /// don't consume (PATCH/DELETE acks).
    async fn request_unit(
        &self,
        method: reqwest::Method,
        url: String,
        body: Option<&impl serde::Serialize>,
        ctx: &str,
    ) -> ApiResult<()> {
        self.send(method, url, body, ctx).await.map(|_| ())
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        self.request_api(
            reqwest::Method::POST,
            format!("{}/api/auth/login", self.base_url),
            Some(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            }),
            "Login failed",
        )
        .await
    }

    pub async fn signup(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> ApiResult<SignupResponse> {
        self.request_api(
            reqwest::Method::POST,
            format!("{}/api/auth/register", self.base_url),
            Some(&SignupRequest {
                email: email.to_string(),
                username: username.to_string(),
                password: password.to_string(),
            }),
            "Signup failed",
        )
        .await
    }

    /// Public read; no auth required and no center-block synthesis
    /// (that happens client-side, see `crate::grid::renderable_blocks`).
    pub async fn list_blocks(&self, username: &str) -> ApiResult<Vec<Block>> {
        self.request_api(
            reqwest::Method::GET,
            Self::blocks_url(&self.base_url, username),
            None::<&()>,
            "Failed to load blocks",
        )
        .await
    }

    /// Create a block on the acting user's own page. Returns the
    /// server's canonical full list, which the caller adopts wholesale
    /// to absorb server-side normalization.
    pub async fn create_block(&self, acting: &str, block: &Block) -> ApiResult<Vec<Block>> {
        self.request_api(
            reqwest::Method::POST,
            Self::blocks_url(&self.base_url, acting),
            Some(block),
            "Failed to create block",
        )
        .await
    }

    pub async fn update_block(
        &self,
        acting: &str,
        id: &str,
        updates: &BlockUpdate,
    ) -> ApiResult<()> {
        self.request_unit(
            reqwest::Method::PATCH,
            Self::block_url(&self.base_url, id, acting),
            Some(updates),
            "Failed to update block",
        )
        .await
    }

    pub async fn delete_block(&self, acting: &str, id: &str) -> ApiResult<()> {
        self.request_unit(
            reqwest::Method::DELETE,
            Self::block_url(&self.base_url, id, acting),
            None::<&()>,
            "Failed to delete block",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_contract_deserialize() {
        let json = r#"{
            "token": "jwt-token",
            "user": {"username": "ada", "email": "ada@example.com"}
        }"#;
        let parsed: LoginResponse = serde_json::from_str(json).expect("login response should parse");
        assert_eq!(parsed.token, "jwt-token");
        assert_eq!(parsed.user.username, "ada");
    }

    #[test]
    fn position_update_serializes_only_supplied_fields() {
        let v = serde_json::to_value(BlockUpdate::moved_to(3, 2)).expect("should serialize");
        assert_eq!(v["position"]["x"], 3);
        assert_eq!(v["position"]["y"], 2);
        assert!(v["position"].get("w").is_none());
        assert!(v["position"].get("h").is_none());
        assert!(v.get("content").is_none());
        assert!(v.get("type").is_none());
    }

    #[test]
    fn resize_update_serializes_only_size() {
        let v = serde_json::to_value(BlockUpdate::resized_to(2, 3)).expect("should serialize");
        assert_eq!(v["position"]["w"], 2);
        assert_eq!(v["position"]["h"], 3);
        assert!(v["position"].get("x").is_none());
    }

    #[test]
    fn kind_update_uses_wire_name() {
        let upd = BlockUpdate {
            kind: Some(BlockKind::Video),
            ..Default::default()
        };
        let v = serde_json::to_value(upd).expect("should serialize");
        assert_eq!(v["type"], "video");
    }

    #[test]
    fn error_status_classification() {
        assert_eq!(
            ApiError::from_status(401, String::new(), "x").kind,
            ApiErrorKind::Unauthorized
        );
        assert_eq!(
            ApiError::from_status(404, String::new(), "x").kind,
            ApiErrorKind::NotFound
        );
        assert_eq!(
            ApiError::from_status(500, "boom".to_string(), "x").kind,
            ApiErrorKind::Http
        );
    }

    #[test]
    fn block_urls_encode_identities() {
        assert_eq!(
            ApiClient::blocks_url("http://localhost:6689", "ada lovelace"),
            "http://localhost:6689/api/blocks?username=ada%20lovelace"
        );
        assert_eq!(
            ApiClient::block_url("http://localhost:6689", "b1", "ada"),
            "http://localhost:6689/api/blocks/b1?username=ada"
        );
    }

    #[test]
    fn api_client_auth_header_state() {
        let mut client = ApiClient::new("http://localhost:6689".to_string());
        assert!(!client.is_authenticated());
        client.set_token("my-jwt-token".to_string());
        assert!(client.is_authenticated());
        assert_eq!(client.get_auth_token().as_deref(), Some("my-jwt-token"));
    }
}
