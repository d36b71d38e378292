use interface::{InvoiceKind, TradeRecord};
use serde::Serialize;

use crate::totals::{self, TaxRate, Totals};

/// 청구서 종류별 세율
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxPolicy {
    pub hall: TaxRate,
    pub vendor: TaxRate,
}

impl TaxPolicy {
    pub fn rate_for(&self, kind: InvoiceKind) -> TaxRate {
        match kind {
            InvoiceKind::Hall => self.hall,
            InvoiceKind::Vendor => self.vendor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLine {
    pub item_name: String,
    pub maker: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub amount: i64,
}

/// 청구서 수치 요약 (레이아웃은 다루지 않음)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceSummary {
    pub trade_id: String,
    pub kind: InvoiceKind,
    pub tax_percent: u32,
    pub lines: Vec<InvoiceLine>,
    pub insurance: i64,
    pub shipping_fee: i64,
    #[serde(flatten)]
    pub totals: Totals,
}

impl InvoiceSummary {
    pub fn for_trade(trade: &TradeRecord, policy: &TaxPolicy) -> Self {
        let rate = policy.rate_for(trade.invoice_kind);
        let lines = trade
            .items
            .iter()
            .map(|item| InvoiceLine {
                item_name: item.item_name.clone(),
                maker: item.maker.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                amount: item.line_amount(),
            })
            .collect();

        Self {
            trade_id: trade.id.clone(),
            kind: trade.invoice_kind,
            tax_percent: rate.as_percent(),
            lines,
            insurance: trade.insurance.unwrap_or(0),
            shipping_fee: trade.shipping_fee.unwrap_or(0),
            totals: totals::for_trade(trade, rate),
        }
    }
}
