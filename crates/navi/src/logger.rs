use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// stdout + 일별 로그 파일로 tracing 초기화
/// 반환된 guard는 main이 끝날 때까지 들고 있어야 버퍼가 flush 됨
pub fn init_tracing(log_dir: &Path) -> Vec<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_appender = tracing_appender::rolling::daily(log_dir, "navi.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(stdout_writer))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init();

    if let Err(e) = result {
        eprintln!("tracing already initialized: {}", e);
    }

    vec![file_guard, stdout_guard]
}
