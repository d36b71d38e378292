/// 거래 기록 엔티티 모듈
pub mod navi_trade {
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "navi_trades")]
    pub struct Model {
        /// 거래 ID
        #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
        pub id: String,

        /// 나비 번호 (NULL 가능)
        #[sea_orm(nullable)]
        pub navi_id: Option<i64>,

        /// 판매자 사용자 ID
        #[sea_orm(column_type = "Text")]
        pub seller_user_id: String,

        /// 구매자 사용자 ID
        #[sea_orm(column_type = "Text")]
        pub buyer_user_id: String,

        /// 기계 분류 (pachinko, slot, others)
        #[sea_orm(column_type = "Text", nullable)]
        pub category: Option<String>,

        /// 최종 갱신 UTC 시간 (ISO 8601 형식)
        #[sea_orm(column_type = "Text")]
        pub updated_at: String,

        /// 정규화된 거래 기록 전문 (JSON)
        #[sea_orm(column_type = "Text")]
        pub payload: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
