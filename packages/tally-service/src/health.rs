use crate::TallyService;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
	pub embedding_available: bool,
	pub phrasing_available: bool,
}

impl TallyService {
	/// Probes the external providers concurrently. A down provider makes
	/// the service degraded, not unavailable, so this always succeeds.
	pub async fn health(&self) -> HealthResponse {
		let (embedding_available, phrasing_available) = tokio::join!(
			self.providers.embedding.health(&self.cfg.providers.embedding),
			self.providers.phrasing.health(&self.cfg.providers.phrasing),
		);

		HealthResponse { embedding_available, phrasing_available }
	}
}
