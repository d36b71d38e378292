use interface::{LineItem, TradeRecord};
use serde::{Deserialize, Serialize};

/// 세율 (정수 퍼센트). 세액 계산은 항상 버림
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    percent: u32,
}

impl TaxRate {
    pub const fn percent(percent: u32) -> Self {
        Self { percent }
    }

    pub fn as_percent(self) -> u32 {
        self.percent
    }

    /// floor(subtotal * rate)
    pub fn tax_on(self, subtotal: i64) -> i64 {
        let scaled = i128::from(subtotal) * i128::from(self.percent);
        clamp_i64(scaled.div_euclid(100))
    }
}

/// 소계와 별도로 더해지는 정액 비용
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Charges {
    pub insurance: Option<i64>,
    pub shipping: Option<i64>,
}

impl Charges {
    pub fn of(trade: &TradeRecord) -> Self {
        Self {
            insurance: trade.insurance,
            shipping: trade.shipping_fee,
        }
    }

    fn sum(&self) -> i64 {
        self.insurance
            .unwrap_or(0)
            .saturating_add(self.shipping.unwrap_or(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
}

pub fn subtotal(items: &[LineItem]) -> i64 {
    items
        .iter()
        .fold(0i64, |acc, item| acc.saturating_add(item.line_amount()))
}

/// 품목 목록으로 소계/세액/합계 계산
pub fn compute(items: &[LineItem], rate: TaxRate, charges: Charges) -> Totals {
    let subtotal = subtotal(items);
    let tax = rate.tax_on(subtotal);
    let total = subtotal.saturating_add(tax).saturating_add(charges.sum());

    Totals {
        subtotal,
        tax,
        total,
    }
}

/// 거래에 기록된 총액이 있으면 그 값을 합계로 사용
pub fn for_trade(trade: &TradeRecord, rate: TaxRate) -> Totals {
    let mut totals = compute(&trade.items, rate, Charges::of(trade));
    if let Some(total_amount) = trade.total_amount {
        totals.total = total_amount;
    }
    totals
}

fn clamp_i64(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use interface::Party;

    #[test]
    fn test_reference_example() {
        let items = vec![LineItem::new("P Machine", "Sankyo", 10, 128_000)];
        let totals = compute(&items, TaxRate::percent(10), Charges::default());
        assert_eq!(totals.subtotal, 1_280_000);
        assert_eq!(totals.tax, 128_000);
        assert_eq!(totals.total, 1_408_000);
    }

    #[test]
    fn test_tax_truncates() {
        let rate = TaxRate::percent(10);
        assert_eq!(rate.tax_on(19), 1);
        assert_eq!(rate.tax_on(99_999), 9_999);
        assert_eq!(TaxRate::percent(5).tax_on(39), 1);
        // 음수는 0 방향이 아니라 아래로 버림
        assert_eq!(rate.tax_on(-15), -2);
    }

    #[test]
    fn test_recorded_amount_and_charges() {
        let mut discounted = LineItem::new("S Machine", "Sammy", 2, 50_000);
        discounted.amount = Some(90_000);
        let items = vec![discounted, LineItem::new("Frame", "Sammy", 1, 5_001)];

        let charges = Charges {
            insurance: Some(3_000),
            shipping: None,
        };
        let totals = compute(&items, TaxRate::percent(10), charges);
        assert_eq!(totals.subtotal, 95_001);
        assert_eq!(totals.tax, 9_500);
        assert_eq!(totals.total, 95_001 + 9_500 + 3_000);
    }

    #[test]
    fn test_empty_items() {
        let totals = compute(&[], TaxRate::percent(10), Charges::default());
        assert_eq!(totals, Totals { subtotal: 0, tax: 0, total: 0 });
    }

    #[test]
    fn test_overflow_saturates() {
        let items = vec![
            LineItem::new("a", "m", i64::MAX, 2),
            LineItem::new("b", "m", 1, 1),
        ];
        let totals = compute(&items, TaxRate::percent(10), Charges::default());
        assert_eq!(totals.subtotal, i64::MAX);
        assert_eq!(totals.total, i64::MAX);
    }

    #[test]
    fn test_recorded_total_is_authoritative() {
        let mut trade = TradeRecord::new(
            "T-1",
            Party::new("s", "S"),
            Party::new("b", "B"),
            Utc::now(),
        );
        trade.items.push(LineItem::new("P Machine", "Kyoraku", 1, 100_000));
        trade.shipping_fee = Some(8_000);

        let totals = for_trade(&trade, TaxRate::percent(10));
        assert_eq!(totals.total, 118_000);

        trade.total_amount = Some(115_000);
        let totals = for_trade(&trade, TaxRate::percent(10));
        assert_eq!(totals.subtotal, 100_000);
        assert_eq!(totals.total, 115_000);
    }
}
