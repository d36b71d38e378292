use async_trait::async_trait;
use interface::TradeRecord;
use tokio::sync::RwLock;

use super::{RecordError, TradeRepository};

/// 메모리 기반 거래 기록 저장소 (테스트, 데모 데이터용)
#[derive(Default)]
pub struct MemoryTradeRepository {
    records: RwLock<Vec<TradeRecord>>,
}

impl MemoryTradeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<TradeRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

fn newest_first(mut records: Vec<TradeRecord>) -> Vec<TradeRecord> {
    records.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    records
}

#[async_trait]
impl TradeRepository for MemoryTradeRepository {
    async fn save(&self, record: &TradeRecord) -> Result<(), RecordError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TradeRecord>, RecordError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, limit: Option<u64>) -> Result<Vec<TradeRecord>, RecordError> {
        let records = newest_first(self.records.read().await.clone());
        Ok(match limit {
            Some(limit_val) => records.into_iter().take(limit_val as usize).collect(),
            None => records,
        })
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<TradeRecord>, RecordError> {
        let records = self.records.read().await;
        let mine = records
            .iter()
            .filter(|r| r.role_of(user_id).is_some())
            .cloned()
            .collect();
        Ok(newest_first(mine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use interface::Party;

    fn trade(id: &str, seller: &str, buyer: &str, age_minutes: i64) -> TradeRecord {
        let mut trade = TradeRecord::new(
            id,
            Party::new(seller, "S"),
            Party::new(buyer, "B"),
            Utc::now(),
        );
        trade.updated_at = trade.updated_at - Duration::minutes(age_minutes);
        trade
    }

    #[tokio::test]
    async fn test_upsert_and_list_for_user() {
        let repo = MemoryTradeRepository::new();
        repo.save_batch(&[
            trade("T-1", "alice", "bob", 30),
            trade("T-2", "bob", "alice", 5),
            trade("T-3", "carol", "dave", 1),
        ])
        .await
        .unwrap();

        let mut updated = trade("T-1", "alice", "bob", 0);
        updated.remarks = Some("revised".to_string());
        repo.save(&updated).await.unwrap();

        assert_eq!(repo.list(None).await.unwrap().len(), 3);

        let ids: Vec<_> = repo
            .list_for_user("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["T-1", "T-2"]);

        let found = repo.find_by_id("T-1").await.unwrap().unwrap();
        assert_eq!(found.remarks.as_deref(), Some("revised"));
    }

    #[tokio::test]
    async fn test_list_limit() {
        let repo = MemoryTradeRepository::with_records(vec![
            trade("T-1", "a", "b", 10),
            trade("T-2", "a", "b", 0),
        ]);
        let listed = repo.list(Some(1)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "T-2");
    }
}
