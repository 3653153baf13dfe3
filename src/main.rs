use actix_files::Files;
use actix_web::web::{self, ServiceConfig};

use audio_merge::app_state::AppState;
use audio_merge::config::AppConfig;
use audio_merge::endpoints::merge::configure as merge_configure;

use shuttle_actix_web::ShuttleActixWeb;
use shuttle_runtime::SecretStore;

#[shuttle_runtime::main]
async fn main(
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> ShuttleActixWeb<impl FnOnce(&mut ServiceConfig) + Send + Clone + 'static> {
    let config = AppConfig::from_lookup(|key| secrets.get(key))
        .map_err(|e| shuttle_runtime::Error::Custom(e.into()))?;
    tracing::info!(
        "Merging into {} as {}",
        config.work_dir.display(),
        config.merged_format
    );

    // Create the work dir so that actix-files won't throw an error.
    // If it already exists, `create_dir_all` does nothing.
    if let Err(e) = std::fs::create_dir_all(&config.work_dir) {
        tracing::error!("Failed to create {}: {:?}", config.work_dir.display(), e);
    }

    let work_dir = config.work_dir.clone();
    let state = web::Data::new(AppState::new(config));

    let app_config = move |cfg: &mut ServiceConfig| {
        cfg.service(
            Files::new("/user_files", work_dir)
                .prefer_utf8(true)
                .use_last_modified(true),
        )
        .configure(merge_configure)
        .app_data(state);
    };

    Ok(app_config.into())
}
