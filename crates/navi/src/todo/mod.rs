//! 거래 기록에서 현재 할 일(todo)과 섹션을 도출

use interface::{EventKind, Role, TerminalStatus, TradeRecord};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// 거래 진행 체크포인트. 순서가 곧 우선순위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Checkpoint {
    /// 판매자 승인 (계약 성립)
    Approval,
    /// 구매자 입금
    Payment,
    /// 기계 발송
    Shipment,
    /// 서류 발송
    Documents,
}

/// 고정된 체크포인트 순서
pub const CHECKPOINTS: [Checkpoint; 4] = [
    Checkpoint::Approval,
    Checkpoint::Payment,
    Checkpoint::Shipment,
    Checkpoint::Documents,
];

impl Checkpoint {
    /// 이 체크포인트를 처리해야 하는 쪽
    pub fn actor(self) -> Role {
        match self {
            Checkpoint::Payment => Role::Buyer,
            Checkpoint::Approval | Checkpoint::Shipment | Checkpoint::Documents => Role::Seller,
        }
    }

    pub fn section(self) -> Section {
        match self {
            Checkpoint::Approval => Section::Approval,
            _ => Section::InProgress,
        }
    }

    pub fn event(self) -> EventKind {
        match self {
            Checkpoint::Approval => EventKind::ContractApproved,
            Checkpoint::Payment => EventKind::PaymentConfirmed,
            Checkpoint::Shipment => EventKind::Shipped,
            Checkpoint::Documents => EventKind::DocumentsSent,
        }
    }

    pub fn todo_kind(self) -> TodoKind {
        match self {
            Checkpoint::Approval => TodoKind::AwaitingApproval,
            Checkpoint::Payment => TodoKind::AwaitingPayment,
            Checkpoint::Shipment => TodoKind::AwaitingShipment,
            Checkpoint::Documents => TodoKind::AwaitingDocuments,
        }
    }

    /// 날짜 필드 또는 기록된 이벤트 중 하나라도 있으면 완료
    pub fn is_satisfied(self, trade: &TradeRecord) -> bool {
        let date = match self {
            Checkpoint::Approval => trade.contract_date,
            Checkpoint::Payment => trade.payment_date,
            Checkpoint::Shipment => trade.shipment_date,
            Checkpoint::Documents => trade.document_sent_date,
        };
        date.is_some() || trade.has_event(self.event())
    }
}

/// 현재 할 일 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoKind {
    AwaitingApproval,
    AwaitingPayment,
    AwaitingShipment,
    AwaitingDocuments,
    Completed,
    Canceled,
}

impl TodoKind {
    pub const ALL: [TodoKind; 6] = [
        TodoKind::AwaitingApproval,
        TodoKind::AwaitingPayment,
        TodoKind::AwaitingShipment,
        TodoKind::AwaitingDocuments,
        TodoKind::Completed,
        TodoKind::Canceled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TodoKind::AwaitingApproval => "awaiting_approval",
            TodoKind::AwaitingPayment => "awaiting_payment",
            TodoKind::AwaitingShipment => "awaiting_shipment",
            TodoKind::AwaitingDocuments => "awaiting_documents",
            TodoKind::Completed => "completed",
            TodoKind::Canceled => "canceled",
        }
    }

    pub fn checkpoint(self) -> Option<Checkpoint> {
        match self {
            TodoKind::AwaitingApproval => Some(Checkpoint::Approval),
            TodoKind::AwaitingPayment => Some(Checkpoint::Payment),
            TodoKind::AwaitingShipment => Some(Checkpoint::Shipment),
            TodoKind::AwaitingDocuments => Some(Checkpoint::Documents),
            TodoKind::Completed | TodoKind::Canceled => None,
        }
    }

    pub fn section(self) -> Section {
        match self {
            TodoKind::Completed => Section::Completed,
            TodoKind::Canceled => Section::Canceled,
            other => other
                .checkpoint()
                .map(Checkpoint::section)
                .unwrap_or(Section::Approval),
        }
    }
}

impl Display for TodoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TodoKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TodoKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Invalid TodoKind: {}", s))
    }
}

/// 탭 필터에 쓰이는 큰 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Approval,
    InProgress,
    Completed,
    Canceled,
}

impl Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Section::Approval => write!(f, "approval"),
            Section::InProgress => write!(f, "in_progress"),
            Section::Completed => write!(f, "completed"),
            Section::Canceled => write!(f, "canceled"),
        }
    }
}

/// 분류 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoStatus {
    pub todo_kind: TodoKind,
    pub section: Section,
    /// 조회자가 지금 처리해야 하는 할 일이 있는지
    pub active_todo: bool,
}

/// 아직 완료되지 않은 첫 체크포인트. 종료된 거래는 None.
pub fn resolve_current_checkpoint(trade: &TradeRecord) -> Option<Checkpoint> {
    if trade.is_canceled() || trade.terminal_status == Some(TerminalStatus::Completed) {
        return None;
    }

    let pending = CHECKPOINTS
        .into_iter()
        .position(|checkpoint| !checkpoint.is_satisfied(trade))?;

    if CHECKPOINTS[pending + 1..]
        .iter()
        .any(|later| later.is_satisfied(trade))
    {
        tracing::debug!(
            "Trade {} has later checkpoints recorded before {:?}",
            trade.id,
            CHECKPOINTS[pending]
        );
    }

    Some(CHECKPOINTS[pending])
}

/// 거래 기록과 조회자 역할로 현재 할 일을 분류
pub fn classify(trade: &TradeRecord, role: Role) -> TodoStatus {
    if trade.is_canceled() {
        return TodoStatus {
            todo_kind: TodoKind::Canceled,
            section: Section::Canceled,
            active_todo: false,
        };
    }

    match resolve_current_checkpoint(trade) {
        Some(checkpoint) => TodoStatus {
            todo_kind: checkpoint.todo_kind(),
            section: checkpoint.section(),
            active_todo: checkpoint.actor() == role,
        },
        None => TodoStatus {
            todo_kind: TodoKind::Completed,
            section: Section::Completed,
            active_todo: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use interface::{Party, TodoEvent};

    fn empty_trade() -> TradeRecord {
        TradeRecord::new(
            "T-100",
            Party::new("seller-1", "Seller Co"),
            Party::new("buyer-1", "Buyer Co"),
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        )
    }

    fn day(d: u32) -> Option<chrono::DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 5, d, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_trade_is_awaiting_approval() {
        let trade = empty_trade();
        let status = classify(&trade, Role::Buyer);
        assert_eq!(status.todo_kind, TodoKind::AwaitingApproval);
        assert_eq!(status.section, Section::Approval);
        assert!(!status.active_todo);

        let status = classify(&trade, Role::Seller);
        assert!(status.active_todo);
    }

    #[test]
    fn test_contract_only_waits_for_payment() {
        let mut trade = empty_trade();
        trade.contract_date = day(2);

        let status = classify(&trade, Role::Seller);
        assert_eq!(status.todo_kind, TodoKind::AwaitingPayment);
        assert_eq!(status.section, Section::InProgress);
        assert!(!status.active_todo);

        let status = classify(&trade, Role::Buyer);
        assert!(status.active_todo);
    }

    #[test]
    fn test_all_checkpoints_completed() {
        let mut trade = empty_trade();
        trade.contract_date = day(2);
        trade.payment_date = day(3);
        trade.shipment_date = day(4);
        trade.document_sent_date = day(5);

        for role in [Role::Buyer, Role::Seller] {
            let status = classify(&trade, role);
            assert_eq!(status.todo_kind, TodoKind::Completed);
            assert_eq!(status.section, Section::Completed);
            assert!(!status.active_todo);
        }
    }

    #[test]
    fn test_cancel_short_circuits() {
        let mut trade = empty_trade();
        trade.contract_date = day(2);
        trade.payment_date = day(3);
        trade.shipment_date = day(4);
        trade.document_sent_date = day(5);
        trade.terminal_status = Some(TerminalStatus::Canceled);

        let status = classify(&trade, Role::Seller);
        assert_eq!(status.section, Section::Canceled);
        assert_eq!(status.todo_kind, TodoKind::Canceled);

        let mut trade = empty_trade();
        trade.events.push(TodoEvent {
            kind: EventKind::Canceled,
            occurred_at: Utc::now(),
        });
        assert_eq!(classify(&trade, Role::Buyer).section, Section::Canceled);
    }

    #[test]
    fn test_earlier_checkpoint_wins_on_inconsistent_data() {
        let mut trade = empty_trade();
        trade.contract_date = day(2);
        trade.shipment_date = day(4);

        let status = classify(&trade, Role::Buyer);
        assert_eq!(status.todo_kind, TodoKind::AwaitingPayment);
        assert!(status.active_todo);
    }

    #[test]
    fn test_events_satisfy_checkpoints() {
        let mut trade = empty_trade();
        trade.events.push(TodoEvent {
            kind: EventKind::ContractApproved,
            occurred_at: Utc::now(),
        });
        trade.events.push(TodoEvent {
            kind: EventKind::PaymentConfirmed,
            occurred_at: Utc::now(),
        });

        let status = classify(&trade, Role::Seller);
        assert_eq!(status.todo_kind, TodoKind::AwaitingShipment);
        assert!(status.active_todo);
    }

    #[test]
    fn test_explicit_completed_status() {
        let mut trade = empty_trade();
        trade.terminal_status = Some(TerminalStatus::Completed);
        assert_eq!(classify(&trade, Role::Buyer).section, Section::Completed);
        assert_eq!(resolve_current_checkpoint(&trade), None);
    }

    #[test]
    fn test_classify_is_idempotent() {
        let mut trade = empty_trade();
        trade.contract_date = day(2);
        trade.payment_date = day(3);
        assert_eq!(classify(&trade, Role::Seller), classify(&trade, Role::Seller));
    }

    #[test]
    fn test_todo_kind_keys() {
        for kind in TodoKind::ALL {
            assert_eq!(kind.as_str().parse::<TodoKind>(), Ok(kind));
        }
        assert!("awaiting_lunch".parse::<TodoKind>().is_err());
        assert_eq!(TodoKind::AwaitingDocuments.section(), Section::InProgress);
    }
}
