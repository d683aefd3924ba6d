use serde::{de, Deserialize, Deserializer, Serialize};

use crate::meals::repo_types::{Meal, NewMeal};
use crate::validation::{meal_date, non_empty, require, Validate, ValidationError};

/// POST /meals body. Fields are optional here so a missing one is reported by name.
#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub respect_diet: Option<bool>,
}

impl Validate for CreateMealRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        non_empty("name", require("name", self.name.as_ref())?)?;
        non_empty(
            "description",
            require("description", self.description.as_ref())?,
        )?;
        meal_date("date", require("date", self.date.as_ref())?)?;
        require("respect_diet", self.respect_diet.as_ref())?;
        Ok(())
    }
}

impl CreateMealRequest {
    /// Only meaningful once [`Validate::validate`] has passed.
    pub fn into_new_meal(self) -> NewMeal {
        NewMeal {
            name: self.name.unwrap_or_default().trim().to_string(),
            description: self.description.unwrap_or_default().trim().to_string(),
            date: self.date.unwrap_or_default(),
            respect_diet: self.respect_diet.unwrap_or_default(),
        }
    }
}

/// PUT /meals/:id body. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub respect_diet: Option<bool>,
}

impl UpdateMealRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.respect_diet.is_none()
    }
}

impl Validate for UpdateMealRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            non_empty("name", name)?;
        }
        if let Some(description) = &self.description {
            non_empty("description", description)?;
        }
        if let Some(date) = &self.date {
            meal_date("date", date)?;
        }
        Ok(())
    }
}

/// GET /meals query. Every supplied field narrows the list by equality.
#[derive(Debug, Default, Deserialize)]
pub struct MealFilters {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    #[serde(default, deserialize_with = "flag_or_bit")]
    pub respect_diet: Option<bool>,
}

/// Query flag as `true`/`false` or the stored `1`/`0`.
fn flag_or_bit<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(de::Error::custom(format!(
            "respect_diet must be true, false, 1 or 0, got `{}`",
            other
        ))),
    }
}

impl Validate for MealFilters {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct MealSummary {
    pub total_meals: usize,
    pub within_diet: usize,
    pub off_diet: usize,
    pub best_streak: usize,
}

impl MealSummary {
    /// `meals` must already be in chronological order.
    pub fn from_meals(meals: &[Meal]) -> Self {
        let mut within_diet = 0;
        let mut best_streak = 0;
        let mut run = 0;
        for meal in meals {
            if meal.respect_diet {
                within_diet += 1;
                run += 1;
                best_streak = best_streak.max(run);
            } else {
                run = 0;
            }
        }
        Self {
            total_meals: meals.len(),
            within_diet,
            off_diet: meals.len() - within_diet,
            best_streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn create_body() -> CreateMealRequest {
        CreateMealRequest {
            name: Some("lunch".into()),
            description: Some("rice and chicken".into()),
            date: Some("2024-03-01T12:00:00.000Z".into()),
            respect_diet: Some(true),
        }
    }

    fn meal(respect_diet: bool) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "m".into(),
            description: "d".into(),
            date: "2024-03-01".into(),
            respect_diet,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn create_body_reports_first_failing_field() {
        assert!(create_body().validate().is_ok());

        let mut body = create_body();
        body.description = Some("   ".into());
        body.date = Some("not a date".into());
        assert_eq!(body.validate().unwrap_err().field, "description");

        let mut body = create_body();
        body.respect_diet = None;
        assert_eq!(
            body.validate().unwrap_err(),
            ValidationError::new("respect_diet", "is required")
        );
    }

    #[test]
    fn into_new_meal_trims_text_fields() {
        let mut body = create_body();
        body.name = Some("  dinner ".into());
        let new = body.into_new_meal();
        assert_eq!(new.name, "dinner");
        assert!(new.respect_diet);
    }

    #[test]
    fn update_body_checks_only_supplied_fields() {
        let empty = UpdateMealRequest::default();
        assert!(empty.is_empty());
        assert!(empty.validate().is_ok());

        let partial = UpdateMealRequest {
            respect_diet: Some(false),
            ..Default::default()
        };
        assert!(!partial.is_empty());
        assert!(partial.validate().is_ok());

        let bad = UpdateMealRequest {
            name: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(bad.validate().unwrap_err().field, "name");
    }

    #[test]
    fn filter_flag_accepts_words_and_bits() {
        let parse = |q: &str| {
            let uri: axum::http::Uri = format!("/meals?{}", q).parse().unwrap();
            axum::extract::Query::<MealFilters>::try_from_uri(&uri).map(|f| f.0.respect_diet)
        };
        assert_eq!(parse("respect_diet=true").unwrap(), Some(true));
        assert_eq!(parse("respect_diet=1").unwrap(), Some(true));
        assert_eq!(parse("respect_diet=false").unwrap(), Some(false));
        assert_eq!(parse("respect_diet=0").unwrap(), Some(false));
        assert_eq!(parse("name=lunch").unwrap(), None);
        assert!(parse("respect_diet=yes").is_err());
    }

    #[test]
    fn summary_counts_and_longest_streak() {
        let meals = vec![
            meal(true),
            meal(true),
            meal(false),
            meal(true),
            meal(true),
            meal(true),
            meal(false),
        ];
        assert_eq!(
            MealSummary::from_meals(&meals),
            MealSummary {
                total_meals: 7,
                within_diet: 5,
                off_diet: 2,
                best_streak: 3,
            }
        );
        assert_eq!(
            MealSummary::from_meals(&[]),
            MealSummary {
                total_meals: 0,
                within_diet: 0,
                off_diet: 0,
                best_streak: 0,
            }
        );
    }
}
