//! 테이블 렌더링용 거래 행

use chrono::{DateTime, Utc};
use interface::{Category, Role, TradeRecord};
use serde::Serialize;

use crate::invoice::TaxPolicy;
use crate::presenter::{SectionFilter, StatusPresenter};
use crate::todo::{self, Section, TodoKind};
use crate::totals;

/// 조회자 관점에서 본 거래 한 행
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeRow {
    pub id: String,
    pub navi_id: Option<i64>,
    pub role: Role,
    pub counterparty: String,
    pub category: Option<Category>,
    /// 첫 품목명 (없으면 빈 문자열)
    pub headline_item: String,
    pub item_count: usize,
    pub total_quantity: i64,
    pub total_amount: i64,
    pub todo_kind: TodoKind,
    pub title: &'static str,
    pub description: &'static str,
    pub section: Section,
    pub active_todo: bool,
    pub updated_at: DateTime<Utc>,
}

impl TradeRow {
    /// 조회자가 거래 당사자가 아니면 None
    pub fn build(trade: &TradeRecord, viewer_user_id: &str, policy: &TaxPolicy) -> Option<Self> {
        let role = trade.role_of(viewer_user_id)?;
        let status = todo::classify(trade, role);
        let presentation = StatusPresenter::present_status(&status, role);
        let totals = totals::for_trade(trade, policy.rate_for(trade.invoice_kind));

        Some(Self {
            id: trade.id.clone(),
            navi_id: trade.navi_id,
            role,
            counterparty: trade.party(role.counterpart()).company_name.clone(),
            category: trade.category,
            headline_item: trade
                .items
                .first()
                .map(|item| item.item_name.clone())
                .unwrap_or_default(),
            item_count: trade.items.len(),
            total_quantity: trade.total_quantity(),
            total_amount: totals.total,
            todo_kind: status.todo_kind,
            title: presentation.title,
            description: presentation.description,
            section: status.section,
            active_todo: status.active_todo,
            updated_at: trade.updated_at,
        })
    }
}

/// 사용자의 거래 목록을 행으로 변환하고 필터 적용
pub fn rows_for_user(
    trades: &[TradeRecord],
    viewer_user_id: &str,
    filter: SectionFilter,
    policy: &TaxPolicy,
) -> Vec<TradeRow> {
    trades
        .iter()
        .filter_map(|trade| TradeRow::build(trade, viewer_user_id, policy))
        .filter(|row| filter.matches(row.section))
        .collect()
}

/// 탭 배지용 섹션별 건수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionCounts {
    pub approval: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub canceled: usize,
    /// 네 구역 합계
    pub total: usize,
    /// 조회자가 처리해야 하는 건수
    pub action_required: usize,
}

impl SectionCounts {
    pub fn from_rows(rows: &[TradeRow]) -> Self {
        rows.iter().fold(Self::default(), |mut counts, row| {
            match row.section {
                Section::Approval => counts.approval += 1,
                Section::InProgress => counts.in_progress += 1,
                Section::Completed => counts.completed += 1,
                Section::Canceled => counts.canceled += 1,
            }
            counts.total += 1;
            if row.active_todo {
                counts.action_required += 1;
            }
            counts
        })
    }
}
