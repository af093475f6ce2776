pub mod config;
pub mod error;
pub mod routes;

use filehash::storage::disk::{DiskStore, UploadStore};
use filehash::storage::validation::ValidationManager;
use filehash::HashIndex;
use rocket::fairing::{self, AdHoc};
use rocket::figment::Figment;
use rocket::{Build, Orbit, Rocket, Shutdown};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

pub use config::GatewayConfig;

pub struct AppState {
    pub index: HashIndex,
    pub store: Arc<dyn UploadStore>,
    pub validation: ValidationManager,
}

/// Gateway configured from `Rocket.toml` and `ROCKET_*` variables.
pub fn rocket() -> Rocket<Build> {
    assemble(rocket::build())
}

pub fn rocket_with(figment: Figment) -> Rocket<Build> {
    assemble(rocket::custom(figment))
}

fn assemble(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(AdHoc::try_on_ignite("File registry", init_state))
        .attach(AdHoc::on_liftoff("Refresh sweep", |rocket| Box::pin(start_refresh(rocket))))
        .mount("/", routes::routes())
}

async fn init_state(rocket: Rocket<Build>) -> fairing::Result {
    let config: GatewayConfig = match rocket.figment().extract() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid gateway configuration");
            return Err(rocket);
        }
    };

    let store = match DiskStore::new(&config.files_path).await {
        Ok(store) => store,
        Err(e) => {
            error!(files_path = %config.files_path.display(), error = %e, "cannot open storage directory");
            return Err(rocket);
        }
    };

    let state = AppState {
        index: HashIndex::with_config(config.index_config()),
        store: Arc::new(store),
        validation: ValidationManager::new(config.files_path.clone()),
    };

    Ok(rocket.manage(state).manage(config))
}

async fn start_refresh(rocket: &Rocket<Orbit>) {
    let (Some(state), Some(config)) = (rocket.state::<AppState>(), rocket.state::<GatewayConfig>()) else {
        return;
    };

    let period = config.refresh_interval();
    info!(interval_secs = period.as_secs(), "starting refresh sweep");
    tokio::spawn(refresh_loop(state.index.clone(), period, rocket.shutdown()));
}

async fn refresh_loop(index: HashIndex, period: Duration, shutdown: Shutdown) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let summary = index.refresh().await;
                info!(active = summary.active, stale = summary.stale, "refresh sweep");
            }
            _ = &mut shutdown => break,
        }
    }
}
