//! 레거시 JSON 거래 객체 정규화
//! 화면마다 다르게 저장된 필드명을 저장소 경계에서 한 번만 정리한다.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use interface::{
    Category, EventKind, InvoiceKind, LineItem, Party, TerminalStatus, TodoEvent, TradeRecord,
};
use serde_json::Value;

use super::RecordError;

/// 레거시 객체 하나를 TradeRecord로 변환
/// 객체가 아니면 에러, 그 외 누락/잘못된 값은 기본값으로 채운다
pub fn normalize_legacy(value: &Value) -> Result<TradeRecord, RecordError> {
    let obj = value
        .as_object()
        .ok_or_else(|| RecordError::Invalid(format!("expected object, got {}", kind_of(value))))?;

    let id = match text(obj.get("id")) {
        Some(id) => id,
        None => {
            let generated = uuid::Uuid::new_v4().to_string();
            tracing::warn!("Legacy trade without id, assigned {}", generated);
            generated
        }
    };

    let seller = party(value, "seller", "sellerUserId", "sellerName");
    let buyer = party(value, "buyer", "buyerUserId", "buyerName");

    let created_at = date(obj.get("createdAt"))
        .or_else(|| date(obj.get("updatedAt")))
        .unwrap_or_else(Utc::now);
    let updated_at = date(obj.get("updatedAt")).unwrap_or(created_at);

    let items = obj
        .get("items")
        .and_then(|v| v.as_array())
        .map(|items| items.iter().map(line_item).collect())
        .unwrap_or_default();

    let mut record = TradeRecord::new(id, seller, buyer, created_at);
    record.updated_at = updated_at;
    record.items = items;
    record.navi_id = optional_number(first(value, &["naviId", "navi_id"]));
    record.contract_date = date(obj.get("contractDate"));
    record.payment_date = date(obj.get("paymentDate"));
    record.shipment_date = date(obj.get("shipmentDate"));
    record.document_sent_date = date(first(value, &["documentSentDate", "documentsSentDate"]));
    record.category = text(obj.get("category")).map(|c| category(&c));
    record.terminal_status = text(obj.get("status")).and_then(|s| terminal_status(&s));
    record.events = events(first(value, &["todos", "events"]));
    record.invoice_kind = text(first(value, &["invoiceKind", "invoiceType"]))
        .map(|k| invoice_kind(&k))
        .unwrap_or_default();
    record.insurance = optional_number(obj.get("insurance"));
    record.shipping_fee = optional_number(first(value, &["shippingFee", "shipping"]));
    record.total_amount = optional_number(obj.get("totalAmount"));
    record.remarks = text(first(value, &["remarks", "note"]));

    Ok(record)
}

/// 레거시 배열 전체 변환. 변환 실패한 항목은 건너뛰고 경고
pub fn normalize_legacy_batch(values: &[Value]) -> Vec<TradeRecord> {
    values
        .iter()
        .enumerate()
        .filter_map(|(index, value)| match normalize_legacy(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping legacy trade at index {}: {}", index, e);
                None
            }
        })
        .collect()
}

/// 여러 후보 필드 중 null이 아닌 첫 값
fn first<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|v| !v.is_null())
}

fn party(value: &Value, key: &str, flat_user_key: &str, flat_name_key: &str) -> Party {
    let nested = value.get(key);

    // 1. 중첩 객체 (seller.userId), 2. 평탄화된 필드 (sellerUserId)
    let user_id = text(nested.and_then(|p| first(p, &["userId", "user_id", "id"])))
        .or_else(|| text(value.get(flat_user_key)))
        .unwrap_or_default();

    let company_name = text(nested.and_then(|p| first(p, &["companyName", "company_name", "name"])))
        .or_else(|| text(value.get(flat_name_key)))
        .unwrap_or_default();

    Party {
        user_id,
        company_name,
    }
}

fn line_item(value: &Value) -> LineItem {
    LineItem {
        item_name: text(first(value, &["itemName", "name", "machineName"])).unwrap_or_default(),
        maker: text(value.get("maker")).unwrap_or_default(),
        quantity: number(first(value, &["qty", "quantity"])),
        unit_price: number(first(value, &["unitPrice", "price"])),
        amount: optional_number(value.get("amount")),
    }
}

fn events(value: Option<&Value>) -> Vec<TodoEvent> {
    let Some(entries) = value.and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let raw_kind = text(first(entry, &["kind", "type"]))?;
            let Some(kind) = event_kind(&raw_kind) else {
                tracing::debug!("Ignoring unknown legacy todo kind: {}", raw_kind);
                return None;
            };
            // 완료 시각이 없는 todo는 아직 열린 상태
            let occurred_at = date(first(entry, &["completedAt", "occurredAt", "at"]))?;
            Some(TodoEvent { kind, occurred_at })
        })
        .collect()
}

fn event_kind(raw: &str) -> Option<EventKind> {
    match raw.trim().to_lowercase().as_str() {
        "approval" | "contract" | "contract_approved" | "approved" => {
            Some(EventKind::ContractApproved)
        }
        "payment" | "payment_confirmed" | "paid" => Some(EventKind::PaymentConfirmed),
        "shipment" | "shipped" => Some(EventKind::Shipped),
        "documents" | "document_sent" | "documents_sent" => Some(EventKind::DocumentsSent),
        "cancel" | "canceled" | "cancelled" => Some(EventKind::Canceled),
        _ => None,
    }
}

fn category(raw: &str) -> Category {
    match raw.trim().to_lowercase().as_str() {
        "pachinko" => Category::Pachinko,
        "slot" | "pachislot" => Category::Slot,
        _ => Category::Others,
    }
}

fn terminal_status(raw: &str) -> Option<TerminalStatus> {
    match raw.trim().to_lowercase().as_str() {
        "canceled" | "cancelled" => Some(TerminalStatus::Canceled),
        "completed" | "done" => Some(TerminalStatus::Completed),
        _ => None,
    }
}

fn invoice_kind(raw: &str) -> InvoiceKind {
    match raw.trim().to_lowercase().as_str() {
        "hall" => InvoiceKind::Hall,
        _ => InvoiceKind::Vendor,
    }
}

/// 문자열/숫자를 공백 제거한 문자열로. 빈 값은 None
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 숫자로 읽을 수 없으면 0
fn number(value: Option<&Value>) -> i64 {
    value.and_then(parse_number).unwrap_or(0)
}

/// 필드가 없으면 None, 있는데 읽을 수 없으면 경고 후 None
fn optional_number(value: Option<&Value>) -> Option<i64> {
    let value = value.filter(|v| !v.is_null())?;
    if matches!(value, Value::String(s) if s.trim().is_empty()) {
        return None;
    }
    let parsed = parse_number(value);
    if parsed.is_none() {
        tracing::warn!("Ignoring non-numeric legacy value: {}", value);
    }
    parsed
}

fn parse_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            // "¥128,000", "128,000円" 같은 표기 허용
            let cleaned: String = s
                .chars()
                .filter(|c| !matches!(c, ',' | '¥' | '￥' | '円') && !c.is_whitespace())
                .collect();
            cleaned.parse::<i64>().ok().or_else(|| {
                cleaned
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    }
}

/// RFC 3339, 날짜만 (YYYY-MM-DD, YYYY/MM/DD), 시간대 없는 일시, epoch 밀리초 허용
fn date(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(day) = NaiveDate::parse_from_str(raw, format) {
            return day.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_nested_shape() {
        let legacy = json!({
            "id": "navi-001",
            "naviId": 42,
            "seller": {"userId": "u-s", "companyName": "Sankyo Trading"},
            "buyer": {"userId": "u-b", "companyName": "Hall Tokyo"},
            "items": [{"itemName": "P Eva 15", "maker": "Bisty", "qty": 10, "unitPrice": 128000}],
            "createdAt": "2024-05-01T09:00:00+09:00",
            "contractDate": "2024-05-03",
            "category": "Pachinko",
            "invoiceType": "hall"
        });

        let record = normalize_legacy(&legacy).unwrap();
        assert_eq!(record.id, "navi-001");
        assert_eq!(record.navi_id, Some(42));
        assert_eq!(record.seller, Party::new("u-s", "Sankyo Trading"));
        assert_eq!(record.buyer.company_name, "Hall Tokyo");
        assert_eq!(record.items[0].quantity, 10);
        assert_eq!(record.items[0].unit_price, 128_000);
        assert_eq!(
            record.created_at,
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(record.updated_at, record.created_at);
        assert_eq!(
            record.contract_date,
            Some(Utc.with_ymd_and_hms(2024, 5, 3, 0, 0, 0).unwrap())
        );
        assert_eq!(record.category, Some(Category::Pachinko));
        assert_eq!(record.invoice_kind, InvoiceKind::Hall);
    }

    #[test]
    fn test_flat_shape_and_string_numbers() {
        let legacy = json!({
            "id": 77,
            "sellerUserId": "u-s",
            "buyerUserId": "u-b",
            "buyerName": "Buyer KK",
            "items": [
                {"name": "S Hokuto", "quantity": "3", "price": "¥45,000"},
                {"itemName": "Broken", "qty": "many", "unitPrice": null}
            ],
            "shippingFee": "8,000",
            "totalAmount": "n/a",
            "status": "cancelled",
            "documentsSentDate": "2024/06/10"
        });

        let record = normalize_legacy(&legacy).unwrap();
        assert_eq!(record.id, "77");
        assert_eq!(record.seller.user_id, "u-s");
        assert_eq!(record.seller.company_name, "");
        assert_eq!(record.buyer.company_name, "Buyer KK");
        assert_eq!(record.items[0].quantity, 3);
        assert_eq!(record.items[0].unit_price, 45_000);
        assert_eq!(record.items[1].quantity, 0);
        assert_eq!(record.items[1].unit_price, 0);
        assert_eq!(record.shipping_fee, Some(8_000));
        assert_eq!(record.total_amount, None);
        assert_eq!(record.terminal_status, Some(TerminalStatus::Canceled));
        assert!(record.document_sent_date.is_some());
    }

    #[test]
    fn test_todo_history_becomes_events() {
        let legacy = json!({
            "id": "navi-3",
            "todos": [
                {"kind": "approval", "completedAt": "2024-05-02T10:00:00Z"},
                {"kind": "payment", "completedAt": null},
                {"kind": "inspection", "completedAt": "2024-05-04T10:00:00Z"}
            ]
        });

        let record = normalize_legacy(&legacy).unwrap();
        assert_eq!(record.events.len(), 1);
        assert_eq!(record.events[0].kind, EventKind::ContractApproved);
    }

    #[test]
    fn test_missing_id_is_generated() {
        let record = normalize_legacy(&json!({"seller": {"userId": "a"}})).unwrap();
        assert!(!record.id.is_empty());
        assert!(record.items.is_empty());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(matches!(
            normalize_legacy(&json!([1, 2])),
            Err(RecordError::Invalid(_))
        ));
    }

    #[test]
    fn test_batch_skips_invalid_entries() {
        let values = vec![json!({"id": "a"}), json!("oops"), json!({"id": "b"})];
        let records = normalize_legacy_batch(&values);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_number_variants() {
        assert_eq!(parse_number(&json!(12.9)), Some(12));
        assert_eq!(parse_number(&json!("128,000円")), Some(128_000));
        assert_eq!(parse_number(&json!("abc")), None);
        assert_eq!(parse_number(&json!("NaN")), None);
        assert_eq!(parse_number(&json!(true)), None);
    }
}
