use anyhow::Context;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::meals::dto::{MealFilters, UpdateMealRequest};
use crate::meals::repo_types::{Meal, NewMeal};

const MEAL_COLUMNS: &str = "id, user_id, name, description, date, respect_diet, created_at";

pub async fn insert(db: &SqlitePool, user_id: Uuid, meal: &NewMeal) -> anyhow::Result<Meal> {
    let sql = format!(
        "INSERT INTO meals ({MEAL_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {MEAL_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Meal>(&sql)
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&meal.name)
        .bind(&meal.description)
        .bind(&meal.date)
        .bind(meal.respect_diet)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(db)
        .await
        .context("insert meal")?;
    Ok(row)
}

/// Meals owned by `user_id` matching every supplied filter, earliest `date` first.
pub async fn list_by_user(
    db: &SqlitePool,
    user_id: Uuid,
    filters: &MealFilters,
) -> anyhow::Result<Vec<Meal>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {MEAL_COLUMNS} FROM meals WHERE user_id = "
    ));
    qb.push_bind(user_id);
    if let Some(name) = &filters.name {
        qb.push(" AND name = ").push_bind(name.clone());
    }
    if let Some(description) = &filters.description {
        qb.push(" AND description = ").push_bind(description.clone());
    }
    if let Some(date) = &filters.date {
        qb.push(" AND date = ").push_bind(date.clone());
    }
    if let Some(respect_diet) = filters.respect_diet {
        qb.push(" AND respect_diet = ").push_bind(respect_diet);
    }
    // julianday() folds UTC offsets; text order only breaks ties it cannot parse
    qb.push(" ORDER BY julianday(date) ASC, date ASC, created_at ASC, rowid ASC");

    let rows = qb
        .build_query_as::<Meal>()
        .fetch_all(db)
        .await
        .context("list meals")?;
    Ok(rows)
}

pub async fn find_owned(db: &SqlitePool, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<Option<Meal>> {
    let sql = format!("SELECT {MEAL_COLUMNS} FROM meals WHERE id = ? AND user_id = ?");
    let row = sqlx::query_as::<_, Meal>(&sql)
        .bind(meal_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("find meal")?;
    Ok(row)
}

/// Writes the supplied fields in one statement scoped to the owner.
/// Returns false when no owned meal has that id.
pub async fn update_owned(
    db: &SqlitePool,
    user_id: Uuid,
    meal_id: Uuid,
    changes: &UpdateMealRequest,
) -> anyhow::Result<bool> {
    if changes.is_empty() {
        return Ok(find_owned(db, user_id, meal_id).await?.is_some());
    }

    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE meals SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(name) = &changes.name {
            set.push("name = ").push_bind_unseparated(name.trim().to_string());
        }
        if let Some(description) = &changes.description {
            set.push("description = ")
                .push_bind_unseparated(description.trim().to_string());
        }
        if let Some(date) = &changes.date {
            set.push("date = ").push_bind_unseparated(date.clone());
        }
        if let Some(respect_diet) = changes.respect_diet {
            set.push("respect_diet = ").push_bind_unseparated(respect_diet);
        }
    }
    qb.push(" WHERE id = ")
        .push_bind(meal_id)
        .push(" AND user_id = ")
        .push_bind(user_id);

    let res = qb.build().execute(db).await.context("update meal")?;
    Ok(res.rows_affected() > 0)
}

/// Returns false when no owned meal has that id.
pub async fn delete_owned(db: &SqlitePool, user_id: Uuid, meal_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM meals WHERE id = ? AND user_id = ?")
        .bind(meal_id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete meal")?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;
    use crate::state::AppState;
    use crate::users::User;

    fn new_meal(name: &str, date: &str, respect_diet: bool) -> NewMeal {
        NewMeal {
            name: name.into(),
            description: "desc".into(),
            date: date.into(),
            respect_diet,
        }
    }

    async fn user(state: &AppState, name: &str) -> User {
        User::create(&state.db, name, &SessionId::mint()).await.unwrap()
    }

    #[tokio::test]
    async fn list_applies_filters_within_owner() {
        let state = AppState::fake().await;
        let alice = user(&state, "alice").await;
        let bob = user(&state, "bob").await;

        insert(&state.db, alice.id, &new_meal("lunch", "2024-03-02", true)).await.unwrap();
        insert(&state.db, alice.id, &new_meal("dinner", "2024-03-01", false)).await.unwrap();
        insert(&state.db, bob.id, &new_meal("lunch", "2024-03-01", true)).await.unwrap();

        let all = list_by_user(&state.db, alice.id, &MealFilters::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "dinner");
        assert!(all.iter().all(|m| m.user_id == alice.id));

        let on_diet = MealFilters {
            respect_diet: Some(true),
            ..Default::default()
        };
        let rows = list_by_user(&state.db, alice.id, &on_diet).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "lunch");

        let by_name = MealFilters {
            name: Some("lunch".into()),
            date: Some("2024-03-01".into()),
            ..Default::default()
        };
        assert!(list_by_user(&state.db, alice.id, &by_name).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_orders_by_instant_across_offsets() {
        let state = AppState::fake().await;
        let alice = user(&state, "alice").await;

        // 20:00Z on the 1st, written with a +05:00 offset
        insert(&state.db, alice.id, &new_meal("late", "2024-03-01T23:00:00Z", true)).await.unwrap();
        insert(&state.db, alice.id, &new_meal("early", "2024-03-02T01:00:00+05:00", true))
            .await
            .unwrap();
        insert(&state.db, alice.id, &new_meal("day", "2024-03-01", false)).await.unwrap();

        let rows = list_by_user(&state.db, alice.id, &MealFilters::default()).await.unwrap();
        let names: Vec<&str> = rows.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["day", "early", "late"]);
    }

    #[tokio::test]
    async fn update_and_delete_are_scoped_to_owner() {
        let state = AppState::fake().await;
        let alice = user(&state, "alice").await;
        let bob = user(&state, "bob").await;
        let meal = insert(&state.db, alice.id, &new_meal("lunch", "2024-03-01", true))
            .await
            .unwrap();

        let changes = UpdateMealRequest {
            respect_diet: Some(false),
            ..Default::default()
        };
        assert!(!update_owned(&state.db, bob.id, meal.id, &changes).await.unwrap());
        assert!(update_owned(&state.db, alice.id, meal.id, &changes).await.unwrap());

        let stored = find_owned(&state.db, alice.id, meal.id).await.unwrap().unwrap();
        assert!(!stored.respect_diet);
        assert_eq!(stored.name, "lunch");

        assert!(!delete_owned(&state.db, bob.id, meal.id).await.unwrap());
        assert!(delete_owned(&state.db, alice.id, meal.id).await.unwrap());
        assert!(find_owned(&state.db, alice.id, meal.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_update_reports_existence() {
        let state = AppState::fake().await;
        let alice = user(&state, "alice").await;
        let meal = insert(&state.db, alice.id, &new_meal("lunch", "2024-03-01", true))
            .await
            .unwrap();

        let none = UpdateMealRequest::default();
        assert!(update_owned(&state.db, alice.id, meal.id, &none).await.unwrap());
        assert!(!update_owned(&state.db, alice.id, Uuid::new_v4(), &none).await.unwrap());
    }

    #[tokio::test]
    async fn respect_diet_is_stored_as_integer() {
        let state = AppState::fake().await;
        let alice = user(&state, "alice").await;
        let meal = insert(&state.db, alice.id, &new_meal("lunch", "2024-03-01", true))
            .await
            .unwrap();

        let raw: i64 = sqlx::query_scalar("SELECT respect_diet FROM meals WHERE id = ?")
            .bind(meal.id)
            .fetch_one(&state.db)
            .await
            .unwrap();
        assert_eq!(raw, 1);
    }
}
