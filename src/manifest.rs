use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;

pub const MANIFEST_PATH: &str = "/.well-known/farcaster.json";

// 宿主签名的身份证明（header / payload / signature）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountAssociation {
    pub header: String,
    pub payload: String,
    pub signature: String,
}

// 宿主平台读取的 mini-app 描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameDescriptor {
    pub version: String,
    pub name: String,
    pub icon_url: String,
    pub home_url: String,
    pub image_url: String,
    pub button_title: String,
    pub webhook_url: String,
    pub splash_image_url: String,
    pub splash_background_color: String,
    pub primary_category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub account_association: AccountAssociation,
    pub frame: FrameDescriptor,
}

// 根据配置生成 manifest，同样的配置总得到同样的结果
pub fn build_manifest(config: &AppConfig) -> Manifest {
    let base = config.app_url.as_str();
    Manifest {
        account_association: config.association.clone(),
        frame: FrameDescriptor {
            version: "1".to_string(),
            name: config.project_title.clone(),
            icon_url: format!("{base}/icon.png"),
            home_url: base.to_string(),
            image_url: format!("{base}/og.png"),
            button_title: "Open".to_string(),
            webhook_url: format!("{base}/api/webhook"),
            splash_image_url: format!("{base}/splash.png"),
            splash_background_color: "#555555".to_string(),
            primary_category: "social".to_string(),
        },
    }
}

async fn farcaster_manifest(State(manifest): State<Arc<Manifest>>) -> Json<Manifest> {
    debug!("serving mini-app manifest");
    Json(manifest.as_ref().clone())
}

pub fn router(config: &AppConfig) -> Router {
    let manifest = Arc::new(build_manifest(config));
    Router::new()
        .route(MANIFEST_PATH, get(farcaster_manifest))
        .with_state(manifest)
}
