use std::sync::Arc;

use tally_service::TallyService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<TallyService>,
}
impl AppState {
	pub fn new(config: tally_config::Config) -> Self {
		Self { service: Arc::new(TallyService::new(config)) }
	}

	pub fn with_service(service: Arc<TallyService>) -> Self {
		Self { service }
	}
}
