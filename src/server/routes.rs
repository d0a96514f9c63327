use axum::{
    extract::{Query, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::form_urlencoded;

use super::page::INDEX_HTML;
use super::AppState;
use crate::animation::{Bounds, Frame, Heart, HeartField, DEFAULT_HEART_COUNT};
use crate::quotes::RngSource;

/// 单次请求最多返回的动画帧数
pub const MAX_FRAMES: u64 = 3_000;
const DEFAULT_FRAMES: u64 = 600;
/// 续播请求中允许的最多爱心数
pub const MAX_HEARTS: usize = 64;

#[derive(Debug, Deserialize)]
pub struct HeartsQuery {
    aspect: Option<f64>,
    ticks: Option<u64>,
    seed: Option<u64>,
}

/// 续播请求：客户端回传上一批的 `bounds` 和 `hearts`
#[derive(Debug, Deserialize)]
pub struct HeartsContinuation {
    pub bounds: Bounds,
    pub hearts: Vec<Heart>,
    /// 当前视口宽高比，与上一批不同时只更新边界
    pub aspect: Option<f64>,
    /// 上一批最后一帧的帧号
    #[serde(default)]
    pub start: u64,
    pub ticks: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct HeartsResponse {
    pub bounds: Bounds,
    pub frames: Vec<Frame>,
    /// 最后一帧之后的完整状态，用于下一次续播
    pub hearts: Vec<Heart>,
}

pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// 取查询串中的第一个 `lang`，其余参数忽略
fn first_lang(query: Option<&str>) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "lang")
        .map(|(_, value)| value.into_owned())
}

pub async fn quote_handler(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Response {
    let lang = first_lang(query.as_deref());
    let mut rng = RngSource::from_entropy();
    match state.quotes.random_quote(lang.as_deref(), &mut rng).await {
        Ok(quote) => (StatusCode::OK, quote.into_inner()).into_response(),
        Err(e) => e.into_response(),
    }
}

fn valid_aspect(aspect: f64) -> bool {
    aspect.is_finite() && aspect > 0.0
}

fn bad_request(message: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, message).into_response()
}

fn play(mut field: HeartField, start: u64, ticks: Option<u64>) -> Response {
    let ticks = ticks.unwrap_or(DEFAULT_FRAMES).min(MAX_FRAMES);
    let frames = field.frames_from(start, ticks);

    Json(HeartsResponse {
        bounds: field.bounds(),
        frames,
        hearts: field.hearts().to_vec(),
    })
    .into_response()
}

pub async fn hearts_handler(Query(query): Query<HeartsQuery>) -> Response {
    let aspect = query.aspect.unwrap_or(16.0 / 9.0);
    if !valid_aspect(aspect) {
        return bad_request("aspect must be a positive number");
    }

    let mut rng = match query.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let field = HeartField::new(aspect, DEFAULT_HEART_COUNT, &mut rng);
    play(field, 0, query.ticks)
}

/// 从客户端回传的状态继续模拟，视口变化时只调整边界
pub async fn continue_hearts_handler(Json(body): Json<HeartsContinuation>) -> Response {
    if body.hearts.len() > MAX_HEARTS {
        return bad_request("too many hearts");
    }
    if !body.hearts.iter().all(Heart::is_finite)
        || !valid_aspect(body.bounds.max_x)
        || !body.bounds.max_y.is_finite()
        || !body.bounds.max_z.is_finite()
    {
        return bad_request("heart state must be finite");
    }

    let mut field = HeartField::with_hearts(body.bounds, body.hearts);
    if let Some(aspect) = body.aspect {
        if !valid_aspect(aspect) {
            return bad_request("aspect must be a positive number");
        }
        field.resize(aspect);
    }
    play(field, body.start, body.ticks)
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
