//! The push relay: the one server-side artifact. Accepts a title/message
//! pair and forwards it to the third-party push gateway under the fixed
//! broadcast topic. The gateway server key lives only in this service's
//! configuration.

pub mod auth;

use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::config::{AppConfig, PushConfig, RelayConfig};
use crate::remote::RemoteError;

#[derive(Debug, Deserialize)]
pub struct PushRequest {
    pub title: String,
    pub message: String,
}

/// Client for the downstream push gateway.
pub struct Gateway {
    http: reqwest::Client,
    config: PushConfig,
}

impl Gateway {
    pub fn new(config: PushConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub async fn forward(
        &self,
        title: &str,
        message: &str,
    ) -> Result<serde_json::Value, RemoteError> {
        if self.config.server_key.is_empty() {
            return Err(RemoteError::Api {
                status: 500,
                message: "push gateway server key is not configured".into(),
            });
        }

        let payload = json!({
            "to": self.config.topic,
            "notification": {
                "title": title,
                "body": message,
            },
            "data": {
                "url": "/notifications",
            },
        });

        info!(topic = %self.config.topic, "forwarding push");
        let response = self
            .http
            .post(&self.config.gateway_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("key={}", self.config.server_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: body.to_string(),
            });
        }
        Ok(body)
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "healthy"}))
}

#[post("/push")]
async fn push(gateway: web::Data<Gateway>, req: web::Json<PushRequest>) -> HttpResponse {
    let req = req.into_inner();

    match gateway.forward(&req.title, &req.message).await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => {
            error!(error = %e, "push forward failed");
            HttpResponse::BadGateway().json(json!({ "error": e.to_string() }))
        }
    }
}

pub async fn serve(config: AppConfig) -> std::io::Result<()> {
    let relay: RelayConfig = config.relay.clone();
    let gateway = web::Data::new(Gateway::new(config.push.clone()));

    let host = relay.host.clone();
    let port = relay.port;
    info!("Push relay listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(gateway.clone())
            .app_data(web::Data::new(relay.clone()))
            .wrap(auth::BearerAuth)
            .service(health)
            .service(push)
    })
    .bind((host, port))?
    .run()
    .await
}
