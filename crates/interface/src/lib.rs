use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// 거래 당사자 (판매자 또는 구매자 회사)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub user_id: String,
    pub company_name: String,
}

impl Party {
    pub fn new(user_id: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            company_name: company_name.into(),
        }
    }
}

/// 조회하는 사용자가 거래에서 맡은 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    pub fn counterpart(self) -> Role {
        match self {
            Role::Buyer => Role::Seller,
            Role::Seller => Role::Buyer,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Buyer => write!(f, "buyer"),
            Role::Seller => write!(f, "seller"),
        }
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            _ => Err(ParseEnumError::new("Role", s)),
        }
    }
}

/// 기계 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Pachinko,
    Slot,
    Others,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Pachinko => write!(f, "pachinko"),
            Category::Slot => write!(f, "slot"),
            Category::Others => write!(f, "others"),
        }
    }
}

impl FromStr for Category {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pachinko" => Ok(Category::Pachinko),
            "slot" => Ok(Category::Slot),
            "others" => Ok(Category::Others),
            _ => Err(ParseEnumError::new("Category", s)),
        }
    }
}

/// 청구서 종류. 홀(파친코 점포) 거래와 업자 거래는 세율이 다르다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceKind {
    /// 홀 청구서
    Hall,
    /// 업자 청구서
    #[default]
    Vendor,
}

impl Display for InvoiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvoiceKind::Hall => write!(f, "hall"),
            InvoiceKind::Vendor => write!(f, "vendor"),
        }
    }
}

/// 외부에서 기록된 종료 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStatus {
    Canceled,
    Completed,
}

/// 거래 진행 이벤트 종류 (승인, 입금, 발송 등)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ContractApproved,
    PaymentConfirmed,
    Shipped,
    DocumentsSent,
    Canceled,
}

/// 기록된 진행 이벤트
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoEvent {
    pub kind: EventKind,
    pub occurred_at: DateTime<Utc>,
}

/// 거래 품목 한 줄
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_name: String,
    pub maker: String,
    pub quantity: i64,
    /// 단가 (엔)
    pub unit_price: i64,
    /// 금액이 따로 기록된 경우 수량 * 단가 대신 사용
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

impl LineItem {
    pub fn new(
        item_name: impl Into<String>,
        maker: impl Into<String>,
        quantity: i64,
        unit_price: i64,
    ) -> Self {
        Self {
            item_name: item_name.into(),
            maker: maker.into(),
            quantity,
            unit_price,
            amount: None,
        }
    }

    /// 한 줄의 금액 (엔)
    pub fn line_amount(&self) -> i64 {
        self.amount
            .unwrap_or_else(|| self.quantity.saturating_mul(self.unit_price))
    }
}

/// 정규화된 거래 기록 (나비 1건)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: String,
    #[serde(default)]
    pub navi_id: Option<i64>,
    pub seller: Party,
    pub buyer: Party,
    /// 표시 순서 = 입력 순서
    #[serde(default)]
    pub items: Vec<LineItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub contract_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shipment_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub document_sent_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub terminal_status: Option<TerminalStatus>,
    #[serde(default)]
    pub events: Vec<TodoEvent>,
    #[serde(default)]
    pub invoice_kind: InvoiceKind,
    #[serde(default)]
    pub insurance: Option<i64>,
    #[serde(default)]
    pub shipping_fee: Option<i64>,
    /// 기록된 총액이 있으면 계산값보다 우선
    #[serde(default)]
    pub total_amount: Option<i64>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl TradeRecord {
    /// 선택 필드가 모두 비어 있는 거래 생성
    pub fn new(id: impl Into<String>, seller: Party, buyer: Party, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            navi_id: None,
            seller,
            buyer,
            items: Vec::new(),
            created_at,
            updated_at: created_at,
            contract_date: None,
            payment_date: None,
            shipment_date: None,
            document_sent_date: None,
            category: None,
            terminal_status: None,
            events: Vec::new(),
            invoice_kind: InvoiceKind::default(),
            insurance: None,
            shipping_fee: None,
            total_amount: None,
            remarks: None,
        }
    }

    /// 사용자가 이 거래의 판매자인지 구매자인지. 어느 쪽도 아니면 None.
    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        if user_id.is_empty() {
            return None;
        }
        if self.seller.user_id == user_id {
            Some(Role::Seller)
        } else if self.buyer.user_id == user_id {
            Some(Role::Buyer)
        } else {
            None
        }
    }

    pub fn party(&self, role: Role) -> &Party {
        match role {
            Role::Seller => &self.seller,
            Role::Buyer => &self.buyer,
        }
    }

    pub fn has_event(&self, kind: EventKind) -> bool {
        self.events.iter().any(|e| e.kind == kind)
    }

    pub fn is_canceled(&self) -> bool {
        self.terminal_status == Some(TerminalStatus::Canceled) || self.has_event(EventKind::Canceled)
    }

    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, item| acc.saturating_add(item.quantity))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
