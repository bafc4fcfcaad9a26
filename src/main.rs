use anyhow::Result;
use log::info;

use config::Config;
use controllers::AccountController;
use limiter::RateLimiter;
use store::Store;

mod config;
mod controllers;
mod error;
mod filters;
mod limiter;
mod models;
mod password;
mod routes;
mod store;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().await?;

    let store = Store::open(&config.data_dir)?;
    info!(
        "Storing users in {} and scores in {}",
        store.users.path().display(),
        store.scores.path().display()
    );

    let controller = AccountController::new(store);
    controller.bootstrap(config.admin_password.clone()).await?;

    let limiter = RateLimiter::new(
        config.rate_limit.window(),
        config.rate_limit.max_attempts,
    );
    tokio::spawn(limiter.clone().sweep_every(config.rate_limit.sweep_interval()));

    let server = routes::api(controller, limiter, config.cors_origin.as_deref());

    info!("Server running on {}", config.bind);
    warp::serve(server).run(config.bind).await;

    Ok(())
}
