//! Postgres backend checks. Each test gets a fresh database with the
//! migrations applied; run with `DATABASE_URL` set and `--ignored`.

use chrono::NaiveDate;
use expense_tracker::models::{ExpenseDraft, ExpenseQuery, NewCategory};
use expense_tracker::storage::{CategoryStorage, ExpenseStorage, PgStorage};
use expense_tracker::AppError;
use rust_decimal::Decimal;
use sqlx::PgPool;

fn category(name: &str) -> NewCategory {
    NewCategory { name: name.into() }
}

fn draft(category_id: i64, title: &str, cents: i64, date: (i32, u32, u32)) -> ExpenseDraft {
    ExpenseDraft {
        category_id,
        title: title.into(),
        amount: Decimal::new(cents, 2),
        currency: "INR".into(),
        expense_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        notes: String::new(),
    }
}

#[sqlx::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn expenses_carry_their_category_name(pool: PgPool) {
    let storage = PgStorage::new(pool);
    let food = storage.create_category(category("Food")).await.unwrap();
    let travel = storage.create_category(category("Travel")).await.unwrap();

    let created = storage
        .create_expense(draft(food.id, "Lunch", 1240, (2024, 4, 2)))
        .await
        .unwrap();
    assert_eq!(created.category, food.id);
    assert_eq!(created.category_name, "Food");
    assert_eq!(created.amount.to_string(), "12.40");
    assert_eq!(
        storage.get_expense(created.id).await.unwrap(),
        Some(created.clone())
    );

    let mut moved = draft(travel.id, "Lunch on the train", 1240, (2024, 4, 2));
    moved.notes = "50% off".into();
    let updated = storage.update_expense(created.id, moved).await.unwrap();
    assert_eq!(updated.category_name, "Travel");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);

    assert!(matches!(
        storage
            .update_expense(created.id + 100, draft(food.id, "Ghost", 100, (2024, 1, 1)))
            .await,
        Err(AppError::NotFound)
    ));
}

#[sqlx::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn list_orders_and_filters(pool: PgPool) {
    let storage = PgStorage::new(pool);
    let food = storage.create_category(category("Food")).await.unwrap();
    let travel = storage.create_category(category("Travel")).await.unwrap();
    let old = storage
        .create_expense(draft(food.id, "Groceries", 4000, (2024, 1, 1)))
        .await
        .unwrap();
    let taxi = storage
        .create_expense(draft(travel.id, "Taxi", 1500, (2024, 3, 1)))
        .await
        .unwrap();
    let mut promo = draft(food.id, "Coffee", 300, (2024, 3, 1));
    promo.notes = "50% off".into();
    let coffee = storage.create_expense(promo).await.unwrap();

    let ids = |expenses: Vec<expense_tracker::models::Expense>| {
        expenses.into_iter().map(|e| e.id).collect::<Vec<_>>()
    };
    let all = storage.list_expenses(&ExpenseQuery::default()).await.unwrap();
    assert_eq!(ids(all), [coffee.id, taxi.id, old.id]);

    let by_category = ExpenseQuery {
        category: Some(food.id),
        ..Default::default()
    };
    assert_eq!(
        ids(storage.list_expenses(&by_category).await.unwrap()),
        [coffee.id, old.id]
    );

    // `%` is matched literally, not as a wildcard
    let search = ExpenseQuery {
        search: Some("50%".into()),
        ..Default::default()
    };
    assert_eq!(ids(storage.list_expenses(&search).await.unwrap()), [coffee.id]);

    let window = ExpenseQuery {
        limit: Some(1),
        offset: Some(1),
        ..Default::default()
    };
    assert_eq!(ids(storage.list_expenses(&window).await.unwrap()), [taxi.id]);
}

#[sqlx::test]
#[ignore = "needs a Postgres DATABASE_URL"]
async fn constraint_violations_become_api_errors(pool: PgPool) {
    let storage = PgStorage::new(pool);
    let food = storage.create_category(category("Food")).await.unwrap();

    match storage.create_category(category("Food")).await {
        Err(AppError::Validation(errors)) => assert!(errors.contains("name")),
        other => panic!("expected duplicate name error, got {other:?}"),
    }

    match storage
        .create_expense(draft(food.id + 100, "Orphan", 100, (2024, 1, 1)))
        .await
    {
        Err(AppError::Validation(errors)) => assert!(errors.contains("category")),
        other => panic!("expected category error, got {other:?}"),
    }

    let bread = storage
        .create_expense(draft(food.id, "Bread", 210, (2024, 2, 2)))
        .await
        .unwrap();
    assert!(matches!(
        storage.delete_category(food.id).await,
        Err(AppError::Protected(_))
    ));
    assert!(storage.get_category(food.id).await.unwrap().is_some());

    storage.delete_expense(bread.id).await.unwrap();
    storage.delete_category(food.id).await.unwrap();
    assert!(matches!(
        storage.delete_category(food.id).await,
        Err(AppError::NotFound)
    ));
}
