//! HTTP random number server.
//!
//! Serves generator output over HTTP. `/api/v1/random` follows the ANU QRNG
//! API format so existing QRNG clients can point at it unchanged; the other
//! endpoints expose each generator draw directly.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use qrng_core::{QrngError, QuantumRng};

/// Shared server state.
struct AppState {
    rng: Mutex<QuantumRng>,
}

/// Generator error rendered as a 400 JSON body.
struct ApiError(QrngError);

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: &'static str,
    code: i32,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::debug!("request rejected: {}", self.0);
        let body = ErrorBody {
            success: false,
            error: self.0.as_str(),
            code: self.0.code(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl From<QrngError> for ApiError {
    fn from(err: QrngError) -> Self {
        Self(err)
    }
}

#[derive(Deserialize)]
struct RandomParams {
    length: Option<usize>,
    #[serde(rename = "type")]
    data_type: Option<String>,
}

#[derive(Serialize)]
struct RandomResponse {
    #[serde(rename = "type")]
    data_type: String,
    length: usize,
    data: serde_json::Value,
    success: bool,
}

#[derive(Deserialize)]
struct RangeParams<T> {
    min: Option<T>,
    max: Option<T>,
}

#[derive(Serialize)]
struct ValueResponse<T> {
    value: T,
    success: bool,
}

#[derive(Serialize)]
struct RangeResponse<T> {
    value: T,
    min: T,
    max: T,
    success: bool,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    entropy_estimate: f64,
    steps: u64,
}

#[derive(Serialize)]
struct EntropyResponse {
    entropy_estimate: f64,
    steps: u64,
    buffered: usize,
}

#[derive(Serialize)]
struct ErrorStringResponse {
    code: i32,
    message: &'static str,
}

fn encode_random(raw: &[u8], data_type: &str) -> serde_json::Value {
    match data_type {
        "hex16" => serde_json::Value::Array(
            raw.chunks_exact(2)
                .map(|c| serde_json::Value::String(format!("{:02x}{:02x}", c[0], c[1])))
                .collect(),
        ),
        "uint8" => {
            serde_json::Value::Array(raw.iter().map(|&b| serde_json::Value::from(b)).collect())
        }
        "uint16" => serde_json::Value::Array(
            raw.chunks_exact(2)
                .map(|c| serde_json::Value::from(u16::from_le_bytes([c[0], c[1]])))
                .collect(),
        ),
        _ => serde_json::Value::String(hex::encode(raw)),
    }
}

async fn handle_random(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RandomParams>,
) -> Result<Json<RandomResponse>, ApiError> {
    let length = params.length.unwrap_or(1024).clamp(1, 65536);
    let data_type = params.data_type.unwrap_or_else(|| "hex16".to_string());

    // 16-bit types consume byte pairs; round up so odd lengths keep their last word.
    let draw = match data_type.as_str() {
        "hex16" | "uint16" => length.next_multiple_of(2),
        _ => length,
    };
    let raw = state.rng.lock().await.generate_bytes(draw)?;
    let data = encode_random(&raw, &data_type);

    let len = match &data {
        serde_json::Value::Array(a) => a.len(),
        _ => length,
    };

    Ok(Json(RandomResponse {
        data_type,
        length: len,
        data,
        success: true,
    }))
}

async fn handle_uint64(State(state): State<Arc<AppState>>) -> Json<ValueResponse<u64>> {
    let value = state.rng.lock().await.generate_uint64();
    Json(ValueResponse {
        value,
        success: true,
    })
}

async fn handle_double(State(state): State<Arc<AppState>>) -> Json<ValueResponse<f64>> {
    let value = state.rng.lock().await.generate_double();
    Json(ValueResponse {
        value,
        success: true,
    })
}

async fn handle_range32(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams<i32>>,
) -> Result<Json<RangeResponse<i32>>, ApiError> {
    let min = params.min.unwrap_or(0);
    let max = params.max.unwrap_or(i32::MAX);
    let value = state.rng.lock().await.generate_range32(min, max)?;
    Ok(Json(RangeResponse {
        value,
        min,
        max,
        success: true,
    }))
}

async fn handle_range64(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeParams<u64>>,
) -> Result<Json<RangeResponse<u64>>, ApiError> {
    let min = params.min.unwrap_or(0);
    let max = params.max.unwrap_or(u64::MAX);
    let value = state.rng.lock().await.generate_range64(min, max)?;
    Ok(Json(RangeResponse {
        value,
        min,
        max,
        success: true,
    }))
}

async fn handle_entropy(State(state): State<Arc<AppState>>) -> Json<EntropyResponse> {
    let mut rng = state.rng.lock().await;
    Json(EntropyResponse {
        entropy_estimate: rng.entropy_estimate(),
        steps: rng.steps(),
        buffered: rng.buffered(),
    })
}

async fn handle_error_string(Path(code): Path<i32>) -> Json<ErrorStringResponse> {
    Json(ErrorStringResponse {
        code,
        message: qrng_core::error_string(code),
    })
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut rng = state.rng.lock().await;
    let entropy_estimate = rng.entropy_estimate();
    Json(HealthResponse {
        status: if entropy_estimate.is_finite() {
            "healthy"
        } else {
            "degraded"
        },
        version: qrng_core::VERSION,
        entropy_estimate,
        steps: rng.steps(),
    })
}

async fn handle_index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "QRNG Server",
        "version": qrng_core::VERSION,
        "endpoints": {
            "/": "This API index",
            "/api/v1/random": {
                "method": "GET",
                "description": "Get random bytes (ANU QRNG compatible)",
                "params": {
                    "length": "Number of bytes (1-65536, default: 1024)",
                    "type": "Output format: hex16, uint8, uint16, hex (default: hex16)",
                }
            },
            "/api/v1/uint64": "Random 64-bit unsigned integer",
            "/api/v1/double": "Random double in [0, 1)",
            "/api/v1/range32": "Random signed integer in [min, max] (default 0..i32::MAX)",
            "/api/v1/range64": "Random unsigned integer in [min, max] (default 0..u64::MAX)",
            "/api/v1/entropy": "Entropy estimate of the generator state",
            "/api/v1/error/{code}": "Description of an error code",
            "/health": "Health check",
        },
        "examples": {
            "bytes": "/api/v1/random?length=32&type=uint8",
            "dice": "/api/v1/range32?min=1&max=6",
        }
    }))
}

/// Build the axum router around a generator context.
pub fn build_router(rng: QuantumRng) -> Router {
    let state = Arc::new(AppState {
        rng: Mutex::new(rng),
    });

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/api/v1/random", get(handle_random))
        .route("/api/v1/uint64", get(handle_uint64))
        .route("/api/v1/double", get(handle_double))
        .route("/api/v1/range32", get(handle_range32))
        .route("/api/v1/range64", get(handle_range64))
        .route("/api/v1/entropy", get(handle_entropy))
        .route("/api/v1/error/{code}", get(handle_error_string))
        .with_state(state)
}

/// Run the HTTP server until the listener fails.
pub async fn run_server(rng: QuantumRng, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(rng);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("qrng server listening on http://{addr}");
    axum::serve(listener, app).await
}

mod hex {
    pub fn encode(data: &[u8]) -> String {
        data.iter().map(|b| format!("{b:02x}")).collect()
    }
}
