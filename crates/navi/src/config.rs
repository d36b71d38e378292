use std::env;
use std::path::PathBuf;

use crate::invoice::TaxPolicy;
use crate::totals::TaxRate;

const DEFAULT_DB_PATH: &str = "navi_trades.db";
const DEFAULT_API_PORT: u16 = 12091;
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_HALL_TAX_PERCENT: u32 = 10;
const DEFAULT_VENDOR_TAX_PERCENT: u32 = 5;

/// 환경 변수 기반 설정
/// .env 파일은 lib.rs에서 자동으로 로드됨
#[derive(Debug, Clone)]
pub struct NaviConfig {
    /// SQLite 파일 경로 (NAVI_DB_PATH)
    pub db_path: PathBuf,
    /// API 서버 포트 (NAVI_API_PORT)
    pub api_port: u16,
    /// 로그 파일 디렉토리 (NAVI_LOG_DIR)
    pub log_dir: PathBuf,
    /// 청구서 종류별 세율 (NAVI_HALL_TAX_PERCENT, NAVI_VENDOR_TAX_PERCENT)
    pub tax_policy: TaxPolicy,
    /// 해석에 실패해 기본값으로 대체된 변수
    pub invalid_vars: Vec<InvalidVar>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVar {
    pub key: &'static str,
    pub raw: String,
}

impl NaviConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 키 조회 함수로 설정 구성. 해석에 실패한 값은 기본값으로 대체하고 invalid_vars에 남김
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut invalid_vars = Vec::new();
        let hall = parse_var(&lookup, "NAVI_HALL_TAX_PERCENT", &mut invalid_vars)
            .unwrap_or(DEFAULT_HALL_TAX_PERCENT);
        let vendor = parse_var(&lookup, "NAVI_VENDOR_TAX_PERCENT", &mut invalid_vars)
            .unwrap_or(DEFAULT_VENDOR_TAX_PERCENT);
        let api_port =
            parse_var(&lookup, "NAVI_API_PORT", &mut invalid_vars).unwrap_or(DEFAULT_API_PORT);

        let db_path = lookup("NAVI_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let log_dir = lookup("NAVI_LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_string());

        Self {
            db_path: resolve_path(&db_path),
            api_port,
            log_dir: PathBuf::from(log_dir),
            tax_policy: TaxPolicy {
                hall: TaxRate::percent(hall),
                vendor: TaxRate::percent(vendor),
            },
            invalid_vars,
        }
    }

    /// tracing 초기화 이후에 호출
    pub fn report_invalid_vars(&self) {
        for var in &self.invalid_vars {
            tracing::warn!("Ignoring invalid value for {}: {:?} (using default)", var.key, var.raw);
        }
    }
}

impl Default for NaviConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            api_port: DEFAULT_API_PORT,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            tax_policy: TaxPolicy::default(),
            invalid_vars: Vec::new(),
        }
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self {
            hall: TaxRate::percent(DEFAULT_HALL_TAX_PERCENT),
            vendor: TaxRate::percent(DEFAULT_VENDOR_TAX_PERCENT),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &'static str, invalid_vars: &mut Vec<InvalidVar>) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            invalid_vars.push(InvalidVar { key, raw });
            None
        }
    }
}

/// 상대 경로는 현재 디렉토리 기준
fn resolve_path(raw: &str) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return path;
    }
    match env::current_dir() {
        Ok(current_dir) => current_dir.join(path),
        Err(_) => path,
    }
}
