use actix_web::{
    post,
    web::{self, Json, ServiceConfig},
    HttpResponse, Responder,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::app_state::AppState;
use crate::services::pipeline::merge_audio_urls;

#[derive(Debug, Deserialize, Serialize)]
pub struct AudioRequest {
    pub audio_urls: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AudioResponse {
    pub merged_audio_url: String,
}

/// POST /merge-audios
/// Downloads every URL in order, concatenates the audio and reports where the
/// merged file was published.
#[post("/merge-audios")]
pub async fn merge_audios(
    state: web::Data<AppState>,
    payload: Json<AudioRequest>,
) -> impl Responder {
    info!(
        "POST /merge-audios called with {} URLs",
        payload.audio_urls.len()
    );

    match merge_audio_urls(&state, &payload.audio_urls).await {
        Ok(outcome) => {
            info!(
                "Merged {} into {} ({:.2}s)",
                payload.audio_urls.len(),
                outcome.merged_filename,
                outcome.duration.as_secs_f64()
            );
            HttpResponse::Ok().json(AudioResponse {
                merged_audio_url: outcome.public_url,
            })
        }
        Err(e) if e.is_empty_request() => {
            info!("Rejecting merge request: {}", e);
            HttpResponse::BadRequest().json(json!({ "detail": e.to_string() }))
        }
        Err(e) => {
            error!("Merge request failed: {}", e);
            HttpResponse::InternalServerError().json(json!({ "detail": e.to_string() }))
        }
    }
}

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(merge_audios);
}
