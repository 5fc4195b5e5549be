//! Browser front end for `color_namer`.
//!
//! Serves an upload form, decodes the uploaded image, and answers with the color name,
//! RGB triple and a swatch for the requested pixel. Markup is rendered server side
//! with leptos; there is no client script.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use color_namer::{DetectError, Detection, DetectionPipeline, PipelineConfig};
use log::{error, info, warn};
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub colors_path: PathBuf,
}

impl ServerConfig {
    /// Reads `CN_BIND` and `CN_COLORS`, falling back to the defaults.
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("CN_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            colors_path: std::env::var("CN_COLORS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(color_namer::pipeline::DEFAULT_COLORS_PATH)),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("{0}")]
    BadForm(String),

    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error("detection task failed: {0}")]
    Internal(String),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::BadForm(_) => StatusCode::BAD_REQUEST,
            WebError::Detect(DetectError::Io { .. }) | WebError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            WebError::Detect(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_columns: Vec<String>,
}

impl From<&WebError> for ErrorBody {
    fn from(err: &WebError) -> Self {
        let missing_columns = match err {
            WebError::Detect(detect) => detect
                .missing_columns()
                .unwrap_or_default()
                .iter()
                .map(ToString::to_string)
                .collect(),
            _ => Vec::new(),
        };
        Self {
            error: err.to_string(),
            missing_columns,
        }
    }
}

#[derive(Clone)]
struct AppState {
    pipeline: Arc<DetectionPipeline>,
}

/// The fields of one upload form submission.
struct Upload {
    image: Vec<u8>,
    x: u32,
    y: u32,
}

fn parse_coordinate(axis: &str, raw: &str) -> Result<u32, WebError> {
    raw.trim().parse::<u32>().map_err(|_| {
        WebError::BadForm(format!("{axis} must be a non-negative integer, got {raw:?}"))
    })
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, WebError> {
    let mut image = None;
    let mut x = None;
    let mut y = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WebError::BadForm(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let bytes = field.bytes().await.map_err(|e| WebError::BadForm(e.to_string()))?;
                if !bytes.is_empty() {
                    image = Some(bytes.to_vec());
                }
            }
            "x" | "y" => {
                let text = field.text().await.map_err(|e| WebError::BadForm(e.to_string()))?;
                let value = parse_coordinate(&name, &text)?;
                if name == "x" {
                    x = Some(value);
                } else {
                    y = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok(Upload {
        image: image.ok_or_else(|| WebError::BadForm("Please upload an image to start.".into()))?,
        x: x.ok_or_else(|| WebError::BadForm("missing x coordinate".into()))?,
        y: y.ok_or_else(|| WebError::BadForm("missing y coordinate".into()))?,
    })
}

async fn run_detection(state: &AppState, multipart: Multipart) -> Result<Detection, WebError> {
    let upload = read_upload(multipart).await?;
    let pipeline = Arc::clone(&state.pipeline);
    let detection = tokio::task::spawn_blocking(move || {
        pipeline.detect_bytes(&upload.image, upload.x, upload.y)
    })
    .await
    .map_err(|e| WebError::Internal(e.to_string()))??;
    Ok(detection)
}

mod pages {
    use color_namer::Detection;
    use leptos::*;

    #[component]
    fn Page(children: Children) -> impl IntoView {
        view! {
            <main style="font-family:sans-serif;max-width:640px;margin:2em auto">
                <h1>"Color Detection from Image"</h1>
                <p>"Upload an image and enter pixel coordinates to detect the color name and RGB values."</p>
                {children()}
            </main>
        }
    }

    #[component]
    fn UploadForm() -> impl IntoView {
        view! {
            <form action="/detect" method="post" enctype="multipart/form-data">
                <p>
                    <label>"Upload Image "<input type="file" name="image" accept=".jpg,.jpeg,.png" required=true/></label>
                </p>
                <p>
                    <label>"X Coordinate "<input type="number" name="x" min="0" step="1" value="0"/></label>
                    " "
                    <label>"Y Coordinate "<input type="number" name="y" min="0" step="1" value="0"/></label>
                </p>
                <button type="submit">"Detect Color"</button>
            </form>
        }
    }

    #[component]
    fn DetectionCard(detection: Detection) -> impl IntoView {
        let (red, green, blue) = detection.rgb();
        let swatch_style = format!(
            "width:100px;height:100px;background-color:{};border-radius:10px",
            detection.pixel.css_rgb()
        );
        view! {
            <section>
                <p><strong>"Color Name: "</strong>{detection.name}</p>
                <p><strong>"RGB: "</strong>{format!("({red}, {green}, {blue})")}</p>
                <h3>"Detected Color:"</h3>
                <div style=swatch_style></div>
            </section>
        }
    }

    fn render_document<F, N>(content: F) -> String
    where
        F: FnOnce() -> N + 'static,
        N: IntoView,
    {
        let body = leptos::ssr::render_to_string(content);
        format!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"/>\
             <title>Color Detection from Image</title></head><body>{body}</body></html>"
        )
    }

    pub fn index() -> String {
        render_document(|| view! { <Page><UploadForm/></Page> })
    }

    pub fn result(detection: Detection) -> String {
        render_document(move || {
            view! {
                <Page>
                    <DetectionCard detection=detection/>
                    <hr/>
                    <UploadForm/>
                </Page>
            }
        })
    }

    pub fn failure(message: String) -> String {
        render_document(move || {
            view! {
                <Page>
                    <p role="alert" style="color:#b00020">{message}</p>
                    <UploadForm/>
                </Page>
            }
        })
    }
}

async fn index_page() -> Html<String> {
    Html(pages::index())
}

async fn detect_page(State(state): State<AppState>, multipart: Multipart) -> Response {
    match run_detection(&state, multipart).await {
        Ok(detection) => Html(pages::result(detection)).into_response(),
        Err(err) => {
            warn!("detection failed: {err}");
            (err.status(), Html(pages::failure(err.to_string()))).into_response()
        }
    }
}

async fn detect_api(State(state): State<AppState>, multipart: Multipart) -> Response {
    match run_detection(&state, multipart).await {
        Ok(detection) => Json(detection).into_response(),
        Err(err) => {
            warn!("detection failed: {err}");
            (err.status(), Json(ErrorBody::from(&err))).into_response()
        }
    }
}

pub fn router(pipeline: Arc<DetectionPipeline>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/detect", post(detect_page))
        .route("/api/detect", post(detect_api))
        .route("/healthz", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(AppState { pipeline })
}

pub async fn start_server(cfg: ServerConfig) -> anyhow::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let pipeline = Arc::new(DetectionPipeline::new(PipelineConfig {
        colors_path: cfg.colors_path.clone(),
    }));

    // Loaded eagerly so a broken table is reported at startup.
    match pipeline.table() {
        Ok(table) => info!("loaded {} colors from {}", table.len(), cfg.colors_path.display()),
        Err(err) => warn!("color table is not usable yet: {err}"),
    }

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("could not bind {}", cfg.bind_addr))?;
    let local_addr = listener.local_addr()?;
    info!("color namer listening on http://{local_addr}");

    let app = router(pipeline);
    let server = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            error!("server stopped: {err}");
        }
    });

    Ok((local_addr, server))
}
