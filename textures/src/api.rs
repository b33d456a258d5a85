use crate::config::Listener;
use crate::descriptor::TexturesDescriptor;
use crate::legacy::{LegacyHost, LegacyParams, LegacyTarget};
use crate::metrics_defs::{
    CAPE_REQUEST, LEGACY_CAPE_REQUEST, LEGACY_SKIN_REQUEST, SET_SKIN_FAILURE, SET_SKIN_FORBIDDEN,
    SET_SKIN_REQUEST, SKIN_FALLBACK, SKIN_REQUEST, TEXTURES_FALLBACK, TEXTURES_REQUEST,
};
use crate::nickname::{normalize, strip_png_suffix};
use crate::store::{StoreError, TexturesStore};
use crate::types::{TextureFields, TextureRecord};
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State, rejection::FormRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use shared::counter;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Header carrying the shared secret on writes. Historically sent as
/// `X-Ely-key`; header names compare case-insensitively.
pub const API_KEY_HEADER: &str = "x-ely-key";

/// Body of every rejected write. Old clients match on it verbatim.
pub const FORBIDDEN_BODY: &str = "Хорошая попытка";

const NOT_FOUND_BODY: &str = "Not Found";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("stored texture url is not a valid redirect target: {0}")]
    InvalidRedirect(String),

    #[error("could not build redirect: {0}")]
    Url(#[from] url::ParseError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) | ApiError::InvalidRedirect(_) | ApiError::Url(_) => {
                tracing::error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, self.to_string()).into_response()
    }
}

struct SkinSystemInner {
    store: Arc<dyn TexturesStore>,
    legacy_host: LegacyHost,
    api_key: String,
}

/// Handler state: the record store plus what the handlers need from config.
#[derive(Clone)]
pub struct SkinSystem {
    inner: Arc<SkinSystemInner>,
}

impl SkinSystem {
    pub fn new(
        store: Arc<dyn TexturesStore>,
        legacy_host: LegacyHost,
        api_key: impl Into<String>,
    ) -> Self {
        SkinSystem {
            inner: Arc::new(SkinSystemInner {
                store,
                legacy_host,
                api_key: api_key.into(),
            }),
        }
    }

    /// The record for `nickname` if it carries a real skin.
    async fn find_skin(&self, nickname: &str) -> Result<Option<TextureRecord>, ApiError> {
        let record = self
            .inner
            .store
            .find_by_nickname(&normalize(nickname))
            .await?;

        Ok(record.filter(TextureRecord::has_skin))
    }

    async fn skin_redirect(&self, raw_nickname: &str) -> Result<Response, ApiError> {
        counter!(SKIN_REQUEST).increment(1);
        let nickname = strip_png_suffix(raw_nickname);

        match self.find_skin(nickname).await? {
            Some(record) => {
                tracing::debug!(nickname, url = %record.fields.url, "skin found");
                redirect(&record.fields.url)
            }
            None => {
                tracing::debug!(nickname, "no skin, redirecting to legacy host");
                counter!(SKIN_FALLBACK).increment(1);
                redirect(self.inner.legacy_host.skin_url(nickname).as_str())
            }
        }
    }

    fn cape_redirect(&self, raw_nickname: &str) -> Result<Response, ApiError> {
        counter!(CAPE_REQUEST).increment(1);
        let nickname = strip_png_suffix(raw_nickname);
        redirect(self.inner.legacy_host.cape_url(nickname).as_str())
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(API_KEY_HEADER)
            .is_some_and(|key| key.as_bytes() == self.inner.api_key.as_bytes())
    }

    async fn set_skin(
        &self,
        headers: &HeaderMap,
        path_nickname: Option<String>,
        form: Result<Form<SetSkinForm>, FormRejection>,
    ) -> Response {
        counter!(SET_SKIN_REQUEST).increment(1);

        if !self.is_authorized(headers) {
            tracing::warn!("rejected skin write with missing or wrong key");
            counter!(SET_SKIN_FORBIDDEN).increment(1);
            return (StatusCode::FORBIDDEN, FORBIDDEN_BODY).into_response();
        }

        let Form(form) = match form {
            Ok(form) => form,
            Err(rejection) => {
                return ApiError::BadRequest(rejection.body_text()).into_response();
            }
        };

        let nickname = form
            .nickname
            .clone()
            .filter(|n| !n.is_empty())
            .or(path_nickname.filter(|n| !n.is_empty()));
        let Some(nickname) = nickname else {
            tracing::warn!("skin write without a nickname");
            counter!(SET_SKIN_FAILURE).increment(1);
            return "ERROR".into_response();
        };

        let nickname = normalize(&nickname);
        let fields = form.into_fields();

        match self.inner.store.upsert(&nickname, fields).await {
            Ok(()) => {
                tracing::info!(%nickname, "skin saved");
                "OK".into_response()
            }
            Err(err) => {
                tracing::error!(%nickname, error = %err, "could not save skin");
                counter!(SET_SKIN_FAILURE).increment(1);
                "ERROR".into_response()
            }
        }
    }
}

/// Every redirect answers with 302.
fn redirect(location: &str) -> Result<Response, ApiError> {
    let value = HeaderValue::try_from(location)
        .map_err(|_| ApiError::InvalidRedirect(location.to_string()))?;

    Ok((StatusCode::FOUND, [(LOCATION, value)]).into_response())
}

pub fn router(skinsystem: SkinSystem) -> Router {
    Router::new()
        .route("/skins/{nickname}", get(skin_handler))
        .route("/cloaks/{nickname}", get(cape_handler))
        .route("/textures/{nickname}", get(textures_handler))
        .route("/system/setSkin", post(set_skin_handler))
        .route("/api/user/{nickname}/skin", post(user_skin_handler))
        // Legacy
        .route("/minecraft.php", get(minecraft_php_handler))
        .route("/skins", get(skin_get_handler))
        .route("/cloaks", get(cape_get_handler))
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        .with_state(skinsystem)
}

pub async fn serve(listener: &Listener, skinsystem: SkinSystem) -> Result<(), std::io::Error> {
    let app = router(skinsystem);

    let tcp_listener = TcpListener::bind(listener.addr()).await?;
    tracing::info!(addr = %listener.addr(), "textures API listening");
    axum::serve(tcp_listener, app).await
}

#[derive(Deserialize, Debug)]
struct SkinParams {
    version: Option<String>,
    minecraft_version: Option<String>,
}

#[derive(Deserialize, Debug)]
struct NameParams {
    name: Option<String>,
}

impl NameParams {
    fn require_name(self) -> Result<String, ApiError> {
        self.name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::BadRequest("name is required".into()))
    }
}

/// Write payload. Everything arrives as text and is coerced here, so
/// malformed numbers become 0 instead of failing the whole write.
#[derive(Deserialize, Debug, Default)]
struct SetSkinForm {
    nickname: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
    #[serde(rename = "skinId")]
    skin_id: Option<String>,
    hash: Option<String>,
    #[serde(rename = "is1_8")]
    is_1_8: Option<String>,
    #[serde(rename = "isSlim")]
    is_slim: Option<String>,
    url: Option<String>,
}

impl SetSkinForm {
    fn into_fields(self) -> TextureFields {
        TextureFields {
            user_id: parse_int(self.user_id.as_deref()),
            skin_id: parse_int(self.skin_id.as_deref()),
            url: self.url.unwrap_or_default(),
            hash: self.hash.unwrap_or_default(),
            is_slim: parse_flag(self.is_slim.as_deref()),
            is_1_8: parse_flag(self.is_1_8.as_deref()),
        }
    }
}

fn parse_int(value: Option<&str>) -> i64 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

fn parse_flag(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("true") => true,
        Some(v) => v.parse::<i64>().is_ok_and(|n| n != 0),
        None => false,
    }
}

async fn skin_handler(
    State(skinsystem): State<SkinSystem>,
    Path(nickname): Path<String>,
    Query(params): Query<SkinParams>,
) -> Result<Response, ApiError> {
    tracing::debug!(
        %nickname,
        version = ?params.version,
        minecraft_version = ?params.minecraft_version,
        "skin requested"
    );
    skinsystem.skin_redirect(&nickname).await
}

async fn skin_get_handler(
    State(skinsystem): State<SkinSystem>,
    Query(params): Query<NameParams>,
) -> Result<Response, ApiError> {
    let nickname = params.require_name()?;
    skinsystem.skin_redirect(&nickname).await
}

async fn cape_handler(
    State(skinsystem): State<SkinSystem>,
    Path(nickname): Path<String>,
) -> Result<Response, ApiError> {
    skinsystem.cape_redirect(&nickname)
}

async fn cape_get_handler(
    State(skinsystem): State<SkinSystem>,
    Query(params): Query<NameParams>,
) -> Result<Response, ApiError> {
    let nickname = params.require_name()?;
    skinsystem.cape_redirect(&nickname)
}

async fn textures_handler(
    State(skinsystem): State<SkinSystem>,
    Path(nickname): Path<String>,
) -> Result<Json<TexturesDescriptor>, ApiError> {
    counter!(TEXTURES_REQUEST).increment(1);

    let record = skinsystem.find_skin(&nickname).await?;
    let now = chrono::Local::now().naive_local();
    let host = &skinsystem.inner.legacy_host;
    let descriptor = TexturesDescriptor::build(record.as_ref(), &nickname, host, now);

    if record.is_none() {
        counter!(TEXTURES_FALLBACK).increment(1);
    }

    Ok(Json(descriptor))
}

async fn minecraft_php_handler(
    State(skinsystem): State<SkinSystem>,
    Query(params): Query<LegacyParams>,
) -> Result<Response, ApiError> {
    if params.name.as_deref().is_none_or(str::is_empty) {
        return Err(ApiError::BadRequest("name is required".into()));
    }

    let target = LegacyTarget::resolve(params);
    match target {
        LegacyTarget::Cape { .. } => counter!(LEGACY_CAPE_REQUEST).increment(1),
        LegacyTarget::Skin { .. } => counter!(LEGACY_SKIN_REQUEST).increment(1),
    }

    let location = target.location(&skinsystem.inner.legacy_host)?;
    tracing::debug!(?target, %location, "legacy request rewritten");
    redirect(&location)
}

async fn set_skin_handler(
    State(skinsystem): State<SkinSystem>,
    headers: HeaderMap,
    form: Result<Form<SetSkinForm>, FormRejection>,
) -> Response {
    skinsystem.set_skin(&headers, None, form).await
}

async fn user_skin_handler(
    State(skinsystem): State<SkinSystem>,
    Path(nickname): Path<String>,
    headers: HeaderMap,
    form: Result<Form<SetSkinForm>, FormRejection>,
) -> Response {
    skinsystem.set_skin(&headers, Some(nickname), form).await
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}
