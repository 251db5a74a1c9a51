//! Shared application state.
//!
//! Everything here is read-only after startup: the validated config and
//! the three external clients. The service keeps no mutable state of its
//! own — meetings, summaries, and activity all live in the store.

use crate::config::Config;
use crate::mailer::HttpMailer;
use crate::store::DocumentStore;
use crate::video::VideoApi;

pub struct AppState {
    pub config: Config,
    pub store: DocumentStore,
    pub mailer: HttpMailer,
    pub video: VideoApi,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = DocumentStore::new(&config);
        let mailer = HttpMailer::new(&config);
        let video = VideoApi::new(&config);
        Self {
            config,
            store,
            mailer,
            video,
        }
    }
}
