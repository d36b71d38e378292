//! 할 일 종류 → 화면 표시 문구 변환

use interface::Role;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::todo::{Section, TodoKind, TodoStatus};

/// 행/배지 렌더링용 표시 정보
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub title: &'static str,
    pub description: &'static str,
    pub section: Section,
}

struct Entry {
    kind: TodoKind,
    /// 처리 담당자에게 보이는 문구
    action: (&'static str, &'static str),
    /// 상대방에게 보이는 문구
    waiting: (&'static str, &'static str),
}

static TABLE: [Entry; 6] = [
    Entry {
        kind: TodoKind::AwaitingApproval,
        action: ("承認してください", "購入申請が届いています。内容を確認して承認してください。"),
        waiting: ("承認待ち", "相手方の承認をお待ちください。"),
    },
    Entry {
        kind: TodoKind::AwaitingPayment,
        action: ("入金してください", "契約が成立しました。請求書の金額をお振込みください。"),
        waiting: ("入金待ち", "買主からの入金をお待ちください。"),
    },
    Entry {
        kind: TodoKind::AwaitingShipment,
        action: ("発送してください", "入金が確認されました。機械を発送してください。"),
        waiting: ("発送待ち", "売主からの発送をお待ちください。"),
    },
    Entry {
        kind: TodoKind::AwaitingDocuments,
        action: ("書類を送付してください", "機械の発送が完了しました。関連書類を送付してください。"),
        waiting: ("書類待ち", "売主からの書類送付をお待ちください。"),
    },
    Entry {
        kind: TodoKind::Completed,
        action: ("取引完了", "すべての手続きが完了しました。"),
        waiting: ("取引完了", "すべての手続きが完了しました。"),
    },
    Entry {
        kind: TodoKind::Canceled,
        action: ("キャンセル", "この取引はキャンセルされました。"),
        waiting: ("キャンセル", "この取引はキャンセルされました。"),
    },
];

/// 알 수 없는 할 일 키에 대한 기본 표시
pub const FALLBACK: Presentation = Presentation {
    title: "確認中",
    description: "取引の状況を確認しています。",
    section: Section::Approval,
};

/// 정적 테이블 기반 상태 표시기
pub struct StatusPresenter;

impl StatusPresenter {
    /// 할 일 종류와 조회자 역할에 맞는 문구
    pub fn present(kind: TodoKind, role: Role) -> Presentation {
        let Some(entry) = TABLE.iter().find(|entry| entry.kind == kind) else {
            return FALLBACK;
        };

        let is_actor = kind
            .checkpoint()
            .map(|checkpoint| checkpoint.actor() == role)
            .unwrap_or(true);
        let (title, description) = if is_actor { entry.action } else { entry.waiting };

        Presentation {
            title,
            description,
            section: kind.section(),
        }
    }

    pub fn present_status(status: &TodoStatus, role: Role) -> Presentation {
        Self::present(status.todo_kind, role)
    }

    /// 저장된 문자열 키로 조회. 모르는 키는 FALLBACK
    pub fn present_key(key: &str, role: Role) -> Presentation {
        match TodoKind::from_str(key) {
            Ok(kind) => Self::present(kind, role),
            Err(e) => {
                tracing::warn!("Unknown todo key, using fallback: {}", e);
                FALLBACK
            }
        }
    }
}

/// 탭 필터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionFilter {
    #[default]
    All,
    Approval,
    InProgress,
    Completed,
    Canceled,
}

impl SectionFilter {
    pub fn matches(self, section: Section) -> bool {
        match self {
            SectionFilter::All => true,
            SectionFilter::Approval => section == Section::Approval,
            SectionFilter::InProgress => section == Section::InProgress,
            SectionFilter::Completed => section == Section::Completed,
            SectionFilter::Canceled => section == Section::Canceled,
        }
    }
}

impl FromStr for SectionFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SectionFilter::All),
            "approval" => Ok(SectionFilter::Approval),
            "in_progress" | "in-progress" => Ok(SectionFilter::InProgress),
            "completed" => Ok(SectionFilter::Completed),
            "canceled" | "cancelled" => Ok(SectionFilter::Canceled),
            _ => Err(format!("Invalid SectionFilter: {}", s)),
        }
    }
}
