use async_trait::async_trait;
use chrono::SecondsFormat;
use interface::TradeRecord;
use sea_orm::sea_query::{Index, OnConflict};
use sea_orm::{
    ColumnTrait, Condition, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Schema, Set,
};
use std::convert::{TryFrom, TryInto};
use std::path::Path;
use tracing::info;

use super::entities::navi_trade;
use super::{RecordError, TradeRepository};

/// SQLite 기반 거래 기록 저장소
pub struct SqliteTradeRepository {
    db: DatabaseConnection,
}

impl SqliteTradeRepository {
    /// 파일 경로로 저장소 생성. 디렉토리가 없으면 생성
    pub async fn open(path: &Path) -> Result<Self, RecordError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RecordError::Other(format!("Failed to create DB directory: {}", e)))?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", path.to_string_lossy());
        Self::connect(ConnectOptions::new(db_url)).await
    }

    /// 접속 옵션으로 저장소 생성 후 테이블/인덱스 초기화
    pub async fn connect(options: ConnectOptions) -> Result<Self, RecordError> {
        info!("Connecting to SQLite database: {}", options.get_url());

        let db = Database::connect(options).await?;

        // SeaORM SchemaBuilder를 사용하여 테이블 생성 (IF NOT EXISTS)
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);

        let mut create_table_stmt = schema.create_table_from_entity(navi_trade::Entity);
        create_table_stmt.if_not_exists();
        db.execute(backend.build(&create_table_stmt)).await?;

        let indexes = [
            ("idx_navi_trades_seller", navi_trade::Column::SellerUserId),
            ("idx_navi_trades_buyer", navi_trade::Column::BuyerUserId),
            ("idx_navi_trades_updated_at", navi_trade::Column::UpdatedAt),
        ];
        for (name, column) in indexes {
            let mut stmt = Index::create()
                .name(name)
                .table(navi_trade::Entity)
                .col(column)
                .to_owned();
            stmt.if_not_exists();

            if let Err(e) = db.execute(backend.build(&stmt)).await {
                tracing::debug!("Index {} creation skipped: {}", name, e);
            }
        }

        info!("Navi trades table initialized");

        Ok(Self { db })
    }

    fn to_active_model(record: &TradeRecord) -> Result<navi_trade::ActiveModel, RecordError> {
        Ok(navi_trade::ActiveModel {
            id: Set(record.id.clone()),
            navi_id: Set(record.navi_id),
            seller_user_id: Set(record.seller.user_id.clone()),
            buyer_user_id: Set(record.buyer.user_id.clone()),
            category: Set(record.category.map(|c| c.to_string())),
            updated_at: Set(record
                .updated_at
                .to_rfc3339_opts(SecondsFormat::Micros, true)),
            payload: Set(serde_json::to_string(record)?),
        })
    }

    fn upsert() -> OnConflict {
        OnConflict::column(navi_trade::Column::Id)
            .update_columns([
                navi_trade::Column::NaviId,
                navi_trade::Column::SellerUserId,
                navi_trade::Column::BuyerUserId,
                navi_trade::Column::Category,
                navi_trade::Column::UpdatedAt,
                navi_trade::Column::Payload,
            ])
            .to_owned()
    }
}

#[async_trait]
impl TradeRepository for SqliteTradeRepository {
    async fn save(&self, record: &TradeRecord) -> Result<(), RecordError> {
        let model = Self::to_active_model(record)?;

        navi_trade::Entity::insert(model)
            .on_conflict(Self::upsert())
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn save_batch(&self, records: &[TradeRecord]) -> Result<(), RecordError> {
        if records.is_empty() {
            return Ok(());
        }

        let models = records
            .iter()
            .map(Self::to_active_model)
            .collect::<Result<Vec<_>, _>>()?;

        navi_trade::Entity::insert_many(models)
            .on_conflict(Self::upsert())
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TradeRecord>, RecordError> {
        let model = navi_trade::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?;

        match model {
            Some(m) => Ok(Some(m.try_into()?)),
            None => Ok(None),
        }
    }

    async fn list(&self, limit: Option<u64>) -> Result<Vec<TradeRecord>, RecordError> {
        let mut query = navi_trade::Entity::find().order_by_desc(navi_trade::Column::UpdatedAt);

        if let Some(limit_val) = limit {
            query = query.limit(limit_val);
        }

        let models = query.all(&self.db).await?;

        models.into_iter().map(|m| m.try_into()).collect()
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<TradeRecord>, RecordError> {
        let models = navi_trade::Entity::find()
            .filter(
                Condition::any()
                    .add(navi_trade::Column::SellerUserId.eq(user_id))
                    .add(navi_trade::Column::BuyerUserId.eq(user_id)),
            )
            .order_by_desc(navi_trade::Column::UpdatedAt)
            .all(&self.db)
            .await?;

        models.into_iter().map(|m| m.try_into()).collect()
    }
}

/// navi_trade::Model을 TradeRecord로 변환
impl TryFrom<navi_trade::Model> for TradeRecord {
    type Error = RecordError;

    fn try_from(model: navi_trade::Model) -> Result<Self, Self::Error> {
        let record: TradeRecord = serde_json::from_str(&model.payload)?;
        if record.id != model.id {
            return Err(RecordError::Invalid(format!(
                "payload id {} does not match row id {}",
                record.id, model.id
            )));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use interface::{LineItem, Party};

    async fn memory_repo() -> SqliteTradeRepository {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        SqliteTradeRepository::connect(options).await.unwrap()
    }

    fn trade(id: &str, seller: &str, buyer: &str, minutes: i64) -> TradeRecord {
        let created = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        let mut trade = TradeRecord::new(
            id,
            Party::new(seller, "Seller Co"),
            Party::new(buyer, "Buyer Co"),
            created,
        );
        trade.updated_at = created + Duration::minutes(minutes);
        trade.items.push(LineItem::new("P Machine", "Newgin", 4, 80_000));
        trade
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = memory_repo().await;
        let record = trade("T-1", "alice", "bob", 0);
        repo.save(&record).await.unwrap();

        let found = repo.find_by_id("T-1").await.unwrap();
        assert_eq!(found, Some(record));
        assert_eq!(repo.find_by_id("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_replaces_existing() {
        let repo = memory_repo().await;
        let mut record = trade("T-1", "alice", "bob", 0);
        repo.save(&record).await.unwrap();

        record.contract_date = Some(Utc::now());
        record.updated_at = record.updated_at + Duration::hours(1);
        repo.save(&record).await.unwrap();

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].contract_date.is_some());
    }

    #[tokio::test]
    async fn test_list_for_user_ordered_by_update() {
        let repo = memory_repo().await;
        repo.save_batch(&[
            trade("T-1", "alice", "bob", 10),
            trade("T-2", "carol", "alice", 30),
            trade("T-3", "dave", "erin", 20),
        ])
        .await
        .unwrap();

        let ids: Vec<_> = repo
            .list_for_user("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["T-2", "T-1"]);

        let limited = repo.list(Some(1)).await.unwrap();
        assert_eq!(limited[0].id, "T-2");
    }

    #[tokio::test]
    async fn test_row_with_foreign_payload_is_invalid() {
        let repo = memory_repo().await;
        let mut model = SqliteTradeRepository::to_active_model(&trade("T-1", "alice", "bob", 0))
            .unwrap();
        model.id = Set("T-9".to_string());
        navi_trade::Entity::insert(model)
            .exec(&repo.db)
            .await
            .unwrap();

        let result = repo.find_by_id("T-9").await;
        assert!(matches!(result, Err(RecordError::Invalid(_))));
    }
}
