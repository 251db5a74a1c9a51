use std::process;
use std::sync::Arc;

use skillswap_functions::config::Config;
use skillswap_functions::scheduler::ReminderScheduler;
use skillswap_functions::server;
use skillswap_functions::state::AppState;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(config));

    let scheduler_state = state.clone();
    tokio::spawn(async move {
        ReminderScheduler::new(scheduler_state).run().await;
    });

    if let Err(e) = server::serve(state).await {
        log::error!("Server error: {}", e);
        process::exit(1);
    }
}
