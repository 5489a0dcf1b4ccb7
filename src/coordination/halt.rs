use super::coordinator::Coordinator;
use crate::domain::errors::CoordinationResult;
use crate::domain::halt::HaltInfo;

impl Coordinator {
    /// Raises the emergency stop for every agent sharing this store
    pub async fn trigger_halt(&self, reason: impl Into<String>) -> CoordinationResult<HaltInfo> {
        let reason = reason.into();
        let info = self
            .with_exclusive_access(move |s| s.raise_halt(reason))
            .await?;
        tracing::warn!(reason = ?info.reason, "Halt raised");
        Ok(info)
    }

    pub async fn clear_halt(&self) -> CoordinationResult<()> {
        self.with_exclusive_access(|s| s.clear_halt()).await?;
        tracing::info!("Halt cleared");
        Ok(())
    }

    /// Lock-free read of the halt flag
    pub async fn halt_status(&self) -> HaltInfo {
        self.store().load().await.halt_info().clone()
    }
}
