use crate::credits;
use crate::errors::DomainError;
use crate::money;
use crate::models::{AppData, DailyPoint, DaySummary, StatsResponse, WeeklyAveragePoint, WeeklyPoint};
use crate::orders::{Order, OrderStatus, PaymentMethod};
use chrono::{Datelike, Duration, Local, NaiveDate};
use rust_decimal::Decimal;

pub fn build_stats(data: &AppData) -> StatsResponse {
    build_stats_at(Local::now().date_naive(), data)
}

/// Sales that count towards takings. Converted quotations waiting for payment do not.
fn sales_on(data: &AppData, date: NaiveDate) -> impl Iterator<Item = &Order> {
    data.orders
        .iter()
        .filter(move |order| order.status != OrderStatus::Pending && order.created_at.date() == date)
}

fn day_sales(data: &AppData, date: NaiveDate) -> (u64, Decimal) {
    sales_on(data, date).fold((0u64, Decimal::ZERO), |(count, total), order| (count + 1, total + order.total))
}

fn payments_on(data: &AppData, date: NaiveDate, method: PaymentMethod) -> Decimal {
    data.orders
        .iter()
        .flat_map(|order| order.payments.iter())
        .filter(|payment| payment.method == method && payment.paid_at.date() == date)
        .map(|payment| payment.amount)
        .sum()
}

pub fn day_summary(data: &AppData, date: NaiveDate) -> DaySummary {
    let (order_count, total_sales) = day_sales(data, date);
    DaySummary {
        date: date.to_string(),
        total_sales,
        order_count,
        cash_total: payments_on(data, date, PaymentMethod::Cash),
        mpesa_total: payments_on(data, date, PaymentMethod::Mpesa),
        outstanding_credit: credits::outstanding(&data.credits),
    }
}

/// Cash received on a `YYYY-MM-DD` date.
pub fn cash_on(data: &AppData, date: &str) -> Result<Decimal, DomainError> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::validation("invalid date format, use YYYY-MM-DD"))?;
    Ok(payments_on(data, date, PaymentMethod::Cash))
}

pub fn build_stats_at(today: NaiveDate, data: &AppData) -> StatsResponse {
    const WEEK_COUNT: usize = 8;

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset as i64);
        let (order_count, total_sales) = day_sales(data, date);
        last_7_days.push(DailyPoint {
            date: date.to_string(),
            order_count,
            total_sales,
        });
    }

    let current_week_start = week_start(today);
    let mut weekly_totals = Vec::with_capacity(WEEK_COUNT);
    let mut weekly_averages = Vec::with_capacity(WEEK_COUNT);

    for offset in (0..WEEK_COUNT).rev() {
        let start = current_week_start - Duration::weeks(offset as i64);
        let end = start + Duration::days(6);

        let mut order_sum = 0u64;
        let mut sales_sum = Decimal::ZERO;
        for day_offset in 0..7 {
            let (count, total) = day_sales(data, start + Duration::days(day_offset));
            order_sum += count;
            sales_sum += total;
        }

        let days_counted = if today < start {
            0
        } else if today > end {
            7
        } else {
            (today - start).num_days() as u8 + 1
        };
        let denom = days_counted.max(1);

        weekly_totals.push(WeeklyPoint {
            week: week_label(start),
            start_date: start.to_string(),
            end_date: end.to_string(),
            order_count: order_sum,
            total_sales: sales_sum,
        });

        weekly_averages.push(WeeklyAveragePoint {
            week: week_label(start),
            days_counted,
            avg_sales: money::round(sales_sum / Decimal::from(denom)),
            avg_orders: order_sum as f64 / f64::from(denom),
        });
    }

    StatsResponse {
        today: day_summary(data, today),
        last_7_days,
        weekly_totals,
        weekly_averages,
    }
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::d;
    use crate::orders::Payment;

    fn order(id: &str, date: NaiveDate, total: Decimal, status: OrderStatus, payments: Vec<(PaymentMethod, Decimal)>) -> Order {
        let at = date.and_hms_opt(10, 0, 0).unwrap();
        Order {
            id: id.into(),
            created_at: at,
            updated_at: None,
            customer: None,
            items: Vec::new(),
            subtotal: total,
            tax: Decimal::ZERO,
            discount: Decimal::ZERO,
            total,
            amount_paid: payments.iter().map(|(_, amount)| amount).sum(),
            balance: Decimal::ZERO,
            status,
            payment_method: None,
            payments: payments
                .into_iter()
                .map(|(method, amount)| Payment {
                    method,
                    amount,
                    paid_at: at,
                })
                .collect(),
            invoice_id: None,
            parent_order_id: None,
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap()
    }

    #[test]
    fn stats_last_7_days_includes_each_day() {
        let mut data = AppData::default();
        let today = monday();
        let two_days_ago = today - Duration::days(2);
        data.orders.push(order("ORD-1", two_days_ago, d("1200"), OrderStatus::Completed, vec![]));
        data.orders.push(order("ORD-2", two_days_ago, d("300"), OrderStatus::Credit, vec![]));
        data.orders.push(order("ORD-3", two_days_ago, d("999"), OrderStatus::Pending, vec![]));

        let stats = build_stats_at(today, &data);
        assert_eq!(stats.last_7_days.len(), 7);
        let point = stats
            .last_7_days
            .iter()
            .find(|day| day.date == two_days_ago.to_string())
            .expect("missing day");
        assert_eq!(point.order_count, 2);
        assert_eq!(point.total_sales, d("1500"));
    }

    #[test]
    fn stats_weekly_series_lengths() {
        let data = AppData::default();
        let stats = build_stats_at(monday(), &data);
        assert_eq!(stats.weekly_totals.len(), 8);
        assert_eq!(stats.weekly_averages.len(), 8);
        assert_eq!(stats.last_7_days.len(), 7);
        assert_eq!(stats.weekly_totals[7].week, "2026-W02");
        assert_eq!(stats.weekly_averages[7].days_counted, 1);
    }

    #[test]
    fn weekly_average_divides_by_days_so_far() {
        let mut data = AppData::default();
        data.orders.push(order("ORD-1", monday(), d("100"), OrderStatus::Completed, vec![]));

        let wednesday = monday() + Duration::days(2);
        let stats = build_stats_at(wednesday, &data);
        let current = &stats.weekly_averages[7];
        assert_eq!(current.days_counted, 3);
        assert_eq!(current.avg_sales, d("33.33"));
        assert!((current.avg_orders - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.weekly_totals[7].total_sales, d("100"));
    }

    #[test]
    fn day_summary_splits_payment_methods() {
        let mut data = AppData::default();
        data.orders.push(order(
            "ORD-1",
            monday(),
            d("1000"),
            OrderStatus::Completed,
            vec![(PaymentMethod::Cash, d("300")), (PaymentMethod::Mpesa, d("700"))],
        ));
        data.orders.push(order(
            "ORD-2",
            monday(),
            d("250"),
            OrderStatus::Completed,
            vec![(PaymentMethod::Cash, d("250"))],
        ));

        let summary = day_summary(&data, monday());
        assert_eq!(summary.order_count, 2);
        assert_eq!(summary.total_sales, d("1250"));
        assert_eq!(summary.cash_total, d("550"));
        assert_eq!(summary.mpesa_total, d("700"));
    }

    #[test]
    fn cash_on_parses_date() {
        let mut data = AppData::default();
        data.orders.push(order(
            "ORD-1",
            monday(),
            d("80"),
            OrderStatus::Completed,
            vec![(PaymentMethod::Cash, d("80"))],
        ));
        assert_eq!(cash_on(&data, "2026-01-05").unwrap(), d("80"));
        assert_eq!(cash_on(&data, "2026-01-06").unwrap(), Decimal::ZERO);
        assert!(matches!(
            cash_on(&data, "05/01/2026"),
            Err(DomainError::Validation(_))
        ));
    }
}
