use async_trait::async_trait;
use interface::TradeRecord;

/// 거래 기록 저장소 인터페이스
/// 분류/표시 로직은 이 트레이트만 보고 동작하므로 저장 방식과 무관
#[async_trait]
pub trait TradeRepository: Send + Sync {
    /// 거래 기록 저장 (같은 id가 있으면 교체)
    async fn save(&self, record: &TradeRecord) -> Result<(), RecordError>;

    /// 거래 기록 여러 개 일괄 저장
    async fn save_batch(&self, records: &[TradeRecord]) -> Result<(), RecordError> {
        for record in records {
            self.save(record).await?;
        }
        Ok(())
    }

    /// ID로 거래 기록 조회
    async fn find_by_id(&self, id: &str) -> Result<Option<TradeRecord>, RecordError>;

    /// 모든 거래 기록 조회 (updated_at 내림차순)
    async fn list(&self, limit: Option<u64>) -> Result<Vec<TradeRecord>, RecordError>;

    /// 사용자가 판매자 또는 구매자인 거래 조회 (updated_at 내림차순)
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<TradeRecord>, RecordError>;
}

/// 기록 저장소 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    Invalid(String),

    #[error("Other error: {0}")]
    Other(String),
}
