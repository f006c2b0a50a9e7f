use crate::io_struct::ChatRequest;
use crate::relay::relay_stream;
use crate::upstream::UpstreamClient;
use actix_cors::Cors;
use actix_web::{HttpResponse, HttpServer, post, web};
use log::{debug, error, info};
use serde_json::json;
use std::io::Write;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub timeout: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            upstream: UpstreamClient::new(config)?,
        })
    }
}

#[post("/")]
pub async fn chat(
    body: web::Bytes,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, actix_web::Error> {
    let mut request = match ChatRequest::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            debug!("rejecting malformed request: {}", e);
            return Ok(HttpResponse::BadRequest().json(json!({"error": "Bad request"})));
        }
    };
    debug!(
        "received messages: {}",
        serde_json::to_string(&request.messages)?
    );

    request.inject_instruction();
    info!("sending request upstream ({} messages)", request.messages.len());

    let chunks = match app_state.upstream.stream_chat_completions(&request.messages).await {
        Ok(chunks) => chunks,
        Err(e) => {
            error!("failed to initiate upstream stream: {}", e);
            return Err(actix_web::error::ErrorBadGateway(e));
        }
    };

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .streaming(relay_stream(chunks)))
}

#[post("/oauth/callback")]
pub async fn oauth_callback() -> HttpResponse {
    HttpResponse::Ok().json(json!({"ok": true}))
}

#[post("/webhook")]
pub async fn webhook() -> HttpResponse {
    HttpResponse::Ok().json(json!({"ok": true}))
}

pub async fn startup(config: RelayConfig, app_state: AppState) -> std::io::Result<()> {
    let app_state = web::Data::new(app_state);

    println!("Starting server at {}:{}", config.host, config.port);

    // default level is info
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .parse_default_env()
        .init();

    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .service(chat)
            .service(oauth_callback)
            .service(webhook)
    })
    .bind((config.host, config.port))?
    .run()
    .await?;

    std::io::Result::Ok(())
}
