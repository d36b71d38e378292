use std::path::{Path, PathBuf};
use std::sync::Arc;

use color_eyre::eyre;
use navi::record::normalize_legacy_batch;
use navi::server::AppState;
use navi::{
    rows_for_user, InvoiceSummary, NaviConfig, SectionFilter, SqliteTradeRepository,
    TradeRepository, TradeRow,
};
use structopt::StructOpt;
use tracing::info;

// lib.rs에서 자동으로 dotenv가 로드됨

#[derive(Debug, StructOpt)]
#[structopt(name = "navi", about = "中古遊技機 取引ナビ")]
enum Command {
    /// API 서버 실행
    Serve,
    /// 사용자의 거래 목록 출력
    List {
        user_id: String,
        /// all, approval, in_progress, completed, canceled
        #[structopt(long, default_value = "all")]
        section: SectionFilter,
    },
    /// 거래 상세와 청구 금액 출력
    Show { id: String, user_id: String },
    /// 레거시 JSON 배열 파일을 정규화하여 저장
    Import {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // init error reporting
    color_eyre::install()?;

    let config = NaviConfig::from_env();

    // init logging
    let _guards = navi::logger::init_tracing(&config.log_dir);
    config.report_invalid_vars();

    let repo = SqliteTradeRepository::open(&config.db_path)
        .await
        .map_err(|e| eyre::eyre!("거래 기록 저장소 초기화 실패: {}", e))?;
    let repo: Arc<dyn TradeRepository> = Arc::new(repo);

    match Command::from_args() {
        Command::Serve => run_server(&config, repo).await,
        Command::List { user_id, section } => run_list(&config, repo, &user_id, section).await,
        Command::Show { id, user_id } => run_show(&config, repo, &id, &user_id).await,
        Command::Import { path } => run_import(repo, &path).await,
    }
}

async fn run_server(config: &NaviConfig, repo: Arc<dyn TradeRepository>) -> eyre::Result<()> {
    let state = AppState {
        repo,
        policy: config.tax_policy,
    };
    navi::server::start_server(config.api_port, state).await
}

async fn run_list(
    config: &NaviConfig,
    repo: Arc<dyn TradeRepository>,
    user_id: &str,
    section: SectionFilter,
) -> eyre::Result<()> {
    let trades = repo.list_for_user(user_id).await?;
    let rows = rows_for_user(&trades, user_id, section, &config.tax_policy);

    if rows.is_empty() {
        println!("取引が見つかりません");
        return Ok(());
    }

    for row in &rows {
        print_row(row);
    }
    info!("{}건 출력 (user={}, section={:?})", rows.len(), user_id, section);

    Ok(())
}

async fn run_show(
    config: &NaviConfig,
    repo: Arc<dyn TradeRepository>,
    id: &str,
    user_id: &str,
) -> eyre::Result<()> {
    let trade = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| eyre::eyre!("거래를 찾을 수 없습니다: {}", id))?;
    let row = TradeRow::build(&trade, user_id, &config.tax_policy)
        .ok_or_else(|| eyre::eyre!("{}는 거래 {}의 당사자가 아닙니다", user_id, id))?;

    print_row(&row);
    println!("  {}", row.description);

    let invoice = InvoiceSummary::for_trade(&trade, &config.tax_policy);
    println!("  請求区分: {} ({}%)", invoice.kind, invoice.tax_percent);
    for line in &invoice.lines {
        println!(
            "  - {} / {} x{} @{} = {}",
            line.item_name, line.maker, line.quantity, line.unit_price, line.amount
        );
    }
    println!("  小計: {}", invoice.totals.subtotal);
    println!("  消費税: {}", invoice.totals.tax);
    if invoice.insurance != 0 {
        println!("  保険料: {}", invoice.insurance);
    }
    if invoice.shipping_fee != 0 {
        println!("  送料: {}", invoice.shipping_fee);
    }
    println!("  合計: {}", invoice.totals.total);

    Ok(())
}

async fn run_import(repo: Arc<dyn TradeRepository>, path: &Path) -> eyre::Result<()> {
    let raw = std::fs::read_to_string(path)?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw)?;

    let records = normalize_legacy_batch(&values);
    repo.save_batch(&records).await?;

    info!(
        "{}건 중 {}건 저장 완료 ({})",
        values.len(),
        records.len(),
        path.display()
    );

    Ok(())
}

fn print_row(row: &TradeRow) {
    let marker = if row.active_todo { "*" } else { " " };
    println!(
        "{} [{}] {} {} / {} ({}台) {}円 - {}",
        marker,
        row.section,
        row.id,
        row.counterparty,
        row.headline_item,
        row.total_quantity,
        row.total_amount,
        row.title
    );
}
