use chrono::{DateTime, Duration, FixedOffset, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::agent::clock::Clock;
use crate::agent::error::AgentError;
use crate::agent::summary::{
    money, percent, Anomaly, CategorySpend, CreditSummary, FinancialSummary, LoanSummary,
    Period, PeriodComparison, Totals,
};
use crate::database::{CreditCardSnapshot, Direction, LoanSnapshot, RecordStore, Transaction};
use crate::types::CustomerId;

const SECONDS_PER_DAY: i64 = 86_400;

/// Reduction window anchored at `now`: current window is `[now - days, now)`,
/// the comparison window the equal-length span right before it.
#[derive(Debug, Clone, Copy)]
pub struct ReductionWindow {
    pub now: DateTime<Utc>,
    pub days: u32,
    pub reference_offset: FixedOffset,
}

impl ReductionWindow {
    pub fn new(now: DateTime<Utc>, days: u32, reference_offset: FixedOffset) -> Self {
        Self {
            now,
            days: days.max(1),
            reference_offset,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.now - Duration::days(i64::from(self.days))
    }

    pub fn prior_start(&self) -> DateTime<Utc> {
        self.start() - Duration::days(i64::from(self.days))
    }
}

/// Pulls a customer's raw records and reduces them into a `FinancialSummary`
pub struct SummaryReducer {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    reference_offset: FixedOffset,
}

impl SummaryReducer {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, reference_offset: FixedOffset) -> Self {
        Self {
            store,
            clock,
            reference_offset,
        }
    }

    pub async fn reduce(
        &self,
        customer: &CustomerId,
        window_days: u32,
    ) -> Result<FinancialSummary, AgentError> {
        let window = ReductionWindow::new(self.clock.now(), window_days, self.reference_offset);

        let (current, prior, card, loan) = tokio::try_join!(
            self.store.list_transactions(customer, window.start(), window.now),
            self.store.list_transactions(customer, window.prior_start(), window.start()),
            self.store.latest_credit_snapshot(customer),
            self.store.latest_loan_snapshot(customer),
        )?;

        tracing::debug!(
            "Reducing {} current / {} prior transactions for customer {} over {} days",
            current.len(),
            prior.len(),
            customer,
            window.days
        );

        Ok(summarize(&window, &current, &prior, card.as_ref(), loan.as_ref()))
    }
}

/// Pure reduction step over already-fetched records
pub fn summarize(
    window: &ReductionWindow,
    current: &[Transaction],
    prior: &[Transaction],
    card: Option<&CreditCardSnapshot>,
    loan: Option<&LoanSnapshot>,
) -> FinancialSummary {
    let prior_by_category = spending_by_category(prior);
    let spending_by_category = spending_by_category(current)
        .into_iter()
        .map(|(category, (total, count))| {
            let prior_total = prior_by_category
                .get(&category)
                .map(|(total, _)| *total)
                .unwrap_or(Decimal::ZERO);

            let spend = CategorySpend {
                total: money(total),
                count,
                average: money(total / Decimal::from(count)),
                change_pct: percent(change_pct(total, prior_total)),
            };
            (category, spend)
        })
        .collect();

    let anomalies = current
        .iter()
        .filter(|t| t.anomalous)
        .map(|t| Anomaly {
            date: t.date,
            amount: money(t.amount),
            merchant: t.merchant.clone(),
            category: t.category.clone(),
        })
        .collect();

    let total_spent = sum_direction(current, Direction::Outflow);
    let total_income = sum_direction(current, Direction::Inflow);
    let previous_spent = sum_direction(prior, Direction::Outflow);

    FinancialSummary {
        period: Period {
            start_date: window.start().with_timezone(&window.reference_offset).date_naive(),
            days: window.days,
        },
        spending_by_category,
        anomalies,
        totals: Totals {
            total_spent: money(total_spent),
            total_income: money(total_income),
            net_change: money(total_income - total_spent),
            daily_avg: money(total_spent / Decimal::from(window.days)),
        },
        comparison: PeriodComparison {
            previous_spent: money(previous_spent),
            change_pct: percent(change_pct(total_spent, previous_spent)),
        },
        credit_card: card.map(|c| credit_summary(c, window.now)),
        loan: loan.map(loan_summary),
    }
}

/// Outflow totals and counts per non-empty category
fn spending_by_category(transactions: &[Transaction]) -> BTreeMap<String, (Decimal, u32)> {
    let mut by_category: BTreeMap<String, (Decimal, u32)> = BTreeMap::new();
    for transaction in transactions.iter().filter(|t| t.direction == Direction::Outflow) {
        if let Some(category) = transaction.spending_category() {
            let entry = by_category
                .entry(category.to_string())
                .or_insert((Decimal::ZERO, 0));
            entry.0 += transaction.amount;
            entry.1 += 1;
        }
    }
    by_category
}

fn sum_direction(transactions: &[Transaction], direction: Direction) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.direction == direction)
        .map(|t| t.amount)
        .sum()
}

/// Percent change against the prior total; floored to 0 when there is no prior spend
pub fn change_pct(current: Decimal, prior: Decimal) -> Decimal {
    if prior > Decimal::ZERO {
        (current - prior) / prior * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Utilization against a limit floored at one unit
pub fn utilization_pct(balance: Decimal, limit: Decimal) -> Decimal {
    balance / limit.max(Decimal::ONE) * Decimal::ONE_HUNDRED
}

fn credit_summary(card: &CreditCardSnapshot, now: DateTime<Utc>) -> CreditSummary {
    CreditSummary {
        balance: money(card.balance),
        credit_limit: money(card.credit_limit),
        utilization_pct: percent(utilization_pct(card.balance, card.credit_limit)),
        minimum_payment: money(card.minimum_payment_due),
        days_until_due: card.payment_due_date.map(|due| days_until(now, due)),
        rewards_points: card.rewards_points,
    }
}

/// Whole days until `due`, rounded up
fn days_until(now: DateTime<Utc>, due: DateTime<Utc>) -> i64 {
    let seconds = (due - now).num_seconds();
    let days = seconds.div_euclid(SECONDS_PER_DAY);
    if seconds.rem_euclid(SECONDS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}

fn loan_summary(loan: &LoanSnapshot) -> LoanSummary {
    let balance = loan.balance.to_f64().unwrap_or(0.0);
    let monthly_rate = loan.interest_rate.to_f64().unwrap_or(0.0) / 100.0 / 12.0;

    let payment = monthly_payment(balance, monthly_rate, loan.term_months);
    let months_remaining = months_remaining(balance, monthly_rate, payment);
    let payment = money(Decimal::from_f64(payment).unwrap_or(Decimal::ZERO));

    LoanSummary {
        balance: money(loan.balance),
        loan_type: loan.loan_type.clone(),
        interest_rate: money(loan.interest_rate),
        term_months: loan.term_months,
        monthly_payment: payment,
        months_remaining,
        total_interest: months_remaining
            .map(|months| money(payment * Decimal::from(months) - loan.balance)),
        status: loan.status.clone(),
    }
}

/// Standard amortization: `P·r·(1+r)^n / ((1+r)^n − 1)`; 0 when `n <= 0`
pub fn monthly_payment(principal: f64, monthly_rate: f64, term_months: i32) -> f64 {
    if term_months <= 0 {
        return 0.0;
    }
    if monthly_rate == 0.0 {
        return principal / f64::from(term_months);
    }
    let growth = (1.0 + monthly_rate).powi(term_months);
    principal * monthly_rate * growth / (growth - 1.0)
}

/// Payments left at `payment` per month; none when the payment never retires the balance
pub fn months_remaining(balance: f64, monthly_rate: f64, payment: f64) -> Option<u32> {
    if balance <= 0.0 {
        return Some(0);
    }
    if payment <= 0.0 {
        return None;
    }

    let exact = if monthly_rate == 0.0 {
        balance / payment
    } else {
        let interest = balance * monthly_rate;
        if payment <= interest {
            return None;
        }
        -(1.0 - interest / payment).ln() / (1.0 + monthly_rate).ln()
    };

    // absorb float noise so a fresh loan lands on its exact term
    let months = ((exact * 1e6).round() / 1e6).ceil();
    if months.is_finite() && months >= 0.0 {
        months.to_u32()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryRecordStore;
    use crate::agent::clock::FixedClock;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 12, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn days_ago(days: i64) -> DateTime<Utc> {
        now() - Duration::days(days)
    }

    #[test]
    fn empty_window_yields_zero_summary() {
        let window = ReductionWindow::new(now(), 30, utc());
        let summary = summarize(&window, &[], &[], None, None);

        assert!(summary.spending_by_category.is_empty());
        assert!(summary.anomalies.is_empty());
        assert_eq!(summary.totals.total_spent, Decimal::ZERO);
        assert_eq!(summary.totals.total_income, Decimal::ZERO);
        assert_eq!(summary.totals.net_change, Decimal::ZERO);
        assert_eq!(summary.totals.daily_avg, Decimal::ZERO);
        assert_eq!(summary.comparison.change_pct, Decimal::ZERO);
        assert_eq!(summary.period.days, 30);
        assert_eq!(summary.period.start_date.to_string(), "2025-05-31");
    }

    #[test]
    fn category_aggregates_and_change_against_prior() {
        let window = ReductionWindow::new(now(), 30, utc());
        let current = vec![
            Transaction::outflow(days_ago(2), dec("60.00"), "Groceries", "FreshMart"),
            Transaction::outflow(days_ago(9), dec("90.00"), "Groceries", "FreshMart"),
            Transaction::outflow(days_ago(4), dec("25.50"), "Dining", "Noodle Bar"),
        ];
        let prior = vec![Transaction::outflow(days_ago(40), dec("100.00"), "Groceries", "FreshMart")];

        let summary = summarize(&window, &current, &prior, None, None);

        let groceries = &summary.spending_by_category["Groceries"];
        assert_eq!(groceries.total, dec("150.00"));
        assert_eq!(groceries.count, 2);
        assert_eq!(groceries.average, dec("75.00"));
        assert_eq!(groceries.change_pct, dec("50.0"));

        // no prior dining spend: floored to zero rather than infinity
        let dining = &summary.spending_by_category["Dining"];
        assert_eq!(dining.change_pct, Decimal::ZERO);
        assert_eq!(dining.average, dec("25.50"));
    }

    #[test]
    fn only_categorized_outflows_aggregate_by_category() {
        let window = ReductionWindow::new(now(), 30, utc());
        let mut uncategorized = Transaction::outflow(days_ago(1), dec("19.99"), "", "Kiosk");
        uncategorized.category = None;
        let current = vec![
            uncategorized,
            Transaction::inflow(days_ago(1), dec("500.00"), "Payroll"),
            Transaction::outflow(days_ago(3), dec("10.00"), "Transport", "Metro"),
        ];

        let summary = summarize(&window, &current, &[], None, None);

        assert_eq!(summary.spending_by_category.len(), 1);
        assert!(summary.spending_by_category.contains_key("Transport"));
        // uncategorized outflows still count toward total spend
        assert_eq!(summary.totals.total_spent, dec("29.99"));
        assert_eq!(summary.totals.total_income, dec("500.00"));
    }

    #[test]
    fn anomalies_pass_through_verbatim() {
        let window = ReductionWindow::new(now(), 30, utc());
        let current = vec![
            Transaction::outflow(days_ago(5), dec("450"), "Electronics", "Gadget Hub").flagged(),
            Transaction::outflow(days_ago(6), dec("12"), "Dining", "Cafe"),
        ];

        let summary = summarize(&window, &current, &[], None, None);

        assert_eq!(summary.anomalies.len(), 1);
        let anomaly = &summary.anomalies[0];
        assert_eq!(anomaly.amount.to_string(), "450.00");
        assert_eq!(anomaly.merchant.as_deref(), Some("Gadget Hub"));
        assert_eq!(anomaly.category.as_deref(), Some("Electronics"));
        assert_eq!(anomaly.date, days_ago(5));
    }

    #[test]
    fn utilization_floors_zero_limit_at_one() {
        assert_eq!(utilization_pct(dec("5"), Decimal::ZERO), dec("500"));
        assert_eq!(utilization_pct(dec("750"), dec("3000")), dec("25"));

        let window = ReductionWindow::new(now(), 30, utc());
        let card = CreditCardSnapshot {
            record_date: days_ago(1),
            balance: dec("900"),
            credit_limit: dec("3000"),
            minimum_payment_due: dec("35"),
            payment_due_date: Some(now() + Duration::hours(60)),
            rewards_points: Some(1200),
            card_type: Some("Gold".to_string()),
        };
        let summary = summarize(&window, &[], &[], Some(&card), None);
        let credit = summary.credit_card.unwrap();
        assert_eq!(credit.utilization_pct.to_string(), "30.0");
        assert_eq!(credit.days_until_due, Some(3));
        assert_eq!(credit.minimum_payment.to_string(), "35.00");
    }

    #[test]
    fn days_until_rounds_up_partial_days() {
        assert_eq!(days_until(now(), now()), 0);
        assert_eq!(days_until(now(), now() + Duration::hours(1)), 1);
        assert_eq!(days_until(now(), now() + Duration::days(2)), 2);
        assert_eq!(days_until(now(), now() - Duration::hours(1)), 0);
        assert_eq!(days_until(now(), now() - Duration::hours(25)), -1);
    }

    #[test]
    fn loan_amortization_matches_standard_formula() {
        let payment = monthly_payment(12_000.0, 0.06 / 12.0, 24);
        assert!((payment - 531.85).abs() < 0.01, "payment was {payment}");
        assert_eq!(months_remaining(12_000.0, 0.005, payment), Some(24));

        let window = ReductionWindow::new(now(), 30, utc());
        let loan = LoanSnapshot {
            record_date: days_ago(3),
            balance: dec("12000"),
            interest_rate: dec("6"),
            term_months: 24,
            loan_type: Some("Auto".to_string()),
            status: Some("Current".to_string()),
        };
        let summary = summarize(&window, &[], &[], None, Some(&loan));
        let loan = summary.loan.unwrap();
        assert_eq!(loan.monthly_payment.to_string(), "531.85");
        assert_eq!(loan.months_remaining, Some(24));
        assert_eq!(loan.total_interest, Some(dec("764.40")));
    }

    #[test]
    fn loan_edge_cases() {
        assert_eq!(monthly_payment(5_000.0, 0.01, 0), 0.0);
        assert_eq!(monthly_payment(5_000.0, 0.01, -3), 0.0);
        assert_eq!(monthly_payment(1_200.0, 0.0, 12), 100.0);
        assert_eq!(months_remaining(1_200.0, 0.0, 100.0), Some(12));
        assert_eq!(months_remaining(10_000.0, 0.01, 50.0), None);
        assert_eq!(months_remaining(0.0, 0.01, 0.0), Some(0));
        assert_eq!(months_remaining(100.0, 0.01, 0.0), None);
    }

    #[tokio::test]
    async fn reduce_reads_both_windows_from_store() {
        let customer = CustomerId::new("1001");
        let store = MemoryRecordStore::new().with_transactions(
            &customer,
            vec![
                Transaction::outflow(days_ago(1), dec("80"), "Utilities", "PowerCo"),
                Transaction::outflow(days_ago(31), dec("40"), "Utilities", "PowerCo"),
                // outside both windows
                Transaction::outflow(days_ago(75), dec("999"), "Utilities", "PowerCo"),
            ],
        );
        let reducer = SummaryReducer::new(Arc::new(store), Arc::new(FixedClock::new(now())), utc());

        let summary = reducer.reduce(&customer, 30).await.unwrap();

        assert_eq!(summary.totals.total_spent, dec("80"));
        assert_eq!(summary.comparison.previous_spent, dec("40"));
        assert_eq!(summary.comparison.change_pct, dec("100.0"));
        assert_eq!(summary.spending_by_category["Utilities"].change_pct, dec("100.0"));
    }

    #[tokio::test]
    async fn reduce_surfaces_store_failure() {
        let reducer = SummaryReducer::new(
            Arc::new(crate::testing::UnavailableStore),
            Arc::new(FixedClock::new(now())),
            utc(),
        );

        let err = reducer.reduce(&CustomerId::new("1001"), 30).await.unwrap_err();
        assert!(matches!(err, AgentError::RecordStoreUnavailable(_)));
    }
}
