use std::{collections::BTreeMap, sync::Arc};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{CategoryTotal, Expense, ExpenseQuery, Metrics, MonthlyTotal, Summary};
use crate::storage::Storage;
use crate::Result;

#[derive(Clone)]
pub struct ReportService {
    storage: Arc<dyn Storage>,
}

impl ReportService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        ReportService { storage }
    }
    /// Summary over every stored expense
    pub async fn summary(&self) -> Result<Summary> {
        let expenses = self
            .storage
            .list_expenses(&ExpenseQuery::default())
            .await?;
        let summary = summarize(&expenses);
        tracing::debug!(
            "summarized {} expenses into {} categories and {} months",
            summary.metrics.total_expenses,
            summary.by_category.len(),
            summary.monthly.len()
        );
        Ok(summary)
    }
}

/// Totals, per-category breakdown (largest total first, then by name) and
/// monthly trend (oldest month first). Sums keep two decimal places.
pub fn summarize(expenses: &[Expense]) -> Summary {
    let zero = Decimal::new(0, 2);
    let mut total_amount = zero;
    let mut by_category: BTreeMap<i64, CategoryTotal> = BTreeMap::new();
    let mut monthly: BTreeMap<NaiveDate, MonthlyTotal> = BTreeMap::new();

    for expense in expenses {
        total_amount += expense.amount;

        let entry = by_category
            .entry(expense.category)
            .or_insert_with(|| CategoryTotal {
                category: expense.category_name.clone(),
                count: 0,
                total: zero,
            });
        entry.count += 1;
        entry.total += expense.amount;

        let month = first_of_month(expense.expense_date);
        let entry = monthly.entry(month).or_insert(MonthlyTotal {
            month,
            count: 0,
            total: zero,
        });
        entry.count += 1;
        entry.total += expense.amount;
    }

    let mut by_category: Vec<CategoryTotal> = by_category.into_values().collect();
    by_category.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });

    Summary {
        metrics: Metrics {
            total_expenses: expenses.len() as u64,
            total_amount,
        },
        by_category,
        monthly: monthly.into_values().collect(),
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn expense(id: i64, cents: i64, category: (i64, &str), date: (i32, u32, u32)) -> Expense {
        Expense {
            id,
            title: format!("expense {id}"),
            amount: Decimal::new(cents, 2),
            currency: "INR".into(),
            expense_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            notes: String::new(),
            category: category.0,
            category_name: category.1.into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn worked_example() {
        let expenses = vec![
            expense(1, 10000, (1, "A"), (2024, 1, 5)),
            expense(2, 5000, (1, "A"), (2024, 2, 1)),
            expense(3, 2500, (2, "B"), (2024, 2, 10)),
        ];
        let summary = serde_json::to_value(summarize(&expenses)).unwrap();
        assert_eq!(
            summary,
            json!({
                "metrics": {"total_expenses": 3, "total_amount": "175.00"},
                "by_category": [
                    {"category": "A", "count": 2, "total": "150.00"},
                    {"category": "B", "count": 1, "total": "25.00"}
                ],
                "monthly": [
                    {"month": "2024-01-01", "count": 1, "total": "100.00"},
                    {"month": "2024-02-01", "count": 2, "total": "75.00"}
                ]
            })
        );
    }

    #[test]
    fn empty_store() {
        let summary = summarize(&[]);
        assert_eq!(summary.metrics.total_expenses, 0);
        assert_eq!(summary.metrics.total_amount.to_string(), "0.00");
        assert!(summary.by_category.is_empty());
        assert!(summary.monthly.is_empty());
    }

    #[test]
    fn group_sums_match_total_and_ordering_holds() {
        // newest first, the way storage hands them over
        let expenses = vec![
            expense(9, 1, (3, "Rent"), (2025, 1, 31)),
            expense(8, 99999, (3, "Rent"), (2024, 12, 1)),
            expense(7, 1234, (1, "Food"), (2024, 12, 31)),
            expense(6, 4321, (2, "Travel"), (2023, 6, 15)),
            expense(5, 1234, (4, "Books"), (2023, 6, 1)),
            expense(4, -500, (1, "Food"), (2022, 2, 28)),
        ];
        let summary = summarize(&expenses);
        let total = summary.metrics.total_amount;
        let category_sum: Decimal = summary.by_category.iter().map(|c| c.total).sum();
        let monthly_sum: Decimal = summary.monthly.iter().map(|m| m.total).sum();
        assert_eq!(category_sum, total);
        assert_eq!(monthly_sum, total);
        assert_eq!(
            summary.by_category.iter().map(|c| c.count).sum::<u64>(),
            summary.metrics.total_expenses
        );
        assert!(summary
            .by_category
            .windows(2)
            .all(|w| w[0].total >= w[1].total));
        assert!(summary.monthly.windows(2).all(|w| w[0].month < w[1].month));
        assert_eq!(
            summary
                .monthly
                .iter()
                .map(|m| m.month.to_string())
                .collect::<Vec<_>>(),
            ["2022-02-01", "2023-06-01", "2024-12-01", "2025-01-01"]
        );
    }

    #[test]
    fn equal_category_totals_sort_by_name() {
        let expenses = vec![
            expense(1, 500, (2, "Zoo"), (2024, 1, 1)),
            expense(2, 500, (1, "Art"), (2024, 1, 1)),
        ];
        let names: Vec<String> = summarize(&expenses)
            .by_category
            .into_iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(names, ["Art", "Zoo"]);
    }
}
