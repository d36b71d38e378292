pub mod config;
pub mod invoice;
pub mod logger;
pub mod presenter;
pub mod record;
pub mod row;
pub mod server;
pub mod todo;
pub mod totals;

pub use config::NaviConfig;
pub use invoice::{InvoiceSummary, TaxPolicy};
pub use presenter::{Presentation, SectionFilter, StatusPresenter};
pub use record::{MemoryTradeRepository, RecordError, SqliteTradeRepository, TradeRepository};
pub use row::{rows_for_user, SectionCounts, TradeRow};
pub use todo::{classify, Checkpoint, Section, TodoKind, TodoStatus};
pub use totals::{Charges, TaxRate, Totals};

// 라이브러리 로드 시 .env 자동 로드
#[ctor::ctor]
fn load_dotenv() {
    dotenv::dotenv().ok();
}
