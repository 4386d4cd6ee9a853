use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::question::Question;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryPayload {
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(length(max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTestPayload {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateTestPayload {
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(length(max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TestListQuery {
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateQuestionPayload {
    #[validate(length(min = 1))]
    pub text: String,
    pub options: Vec<String>,
    pub correct_option_index: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateQuestionPayload {
    #[serde(default, deserialize_with = "trim_optional_string")]
    #[validate(length(min = 1))]
    pub text: Option<String>,
    #[validate(length(min = 2))]
    pub options: Option<Vec<String>>,
    pub correct_option_index: Option<i32>,
}

/// What a learner sees of a question: everything but the answer key.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionView {
    pub id: Uuid,
    pub test_id: Uuid,
    pub text: String,
    pub options: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Question> for QuestionView {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            test_id: q.test_id,
            text: q.text,
            options: q.options,
            created_at: q.created_at,
        }
    }
}

// Trims strings and turns empty ones into None ("leave unchanged").
fn trim_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_update_fields_mean_unchanged() {
        let payload: UpdateCategoryPayload =
            serde_json::from_value(serde_json::json!({ "name": "   " })).unwrap();
        assert!(payload.name.is_none());
        assert!(payload.description.is_none());

        let payload: UpdateTestPayload =
            serde_json::from_value(serde_json::json!({ "name": "  Algebra II " })).unwrap();
        assert_eq!(payload.name.as_deref(), Some("Algebra II"));
    }

    #[test]
    fn question_view_hides_answer_key() {
        let question = Question {
            id: Uuid::new_v4(),
            test_id: Uuid::new_v4(),
            text: "2+2?".into(),
            options: vec!["3".into(), "4".into()],
            correct_option_index: 1,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(QuestionView::from(question)).unwrap();
        assert!(json.get("correct_option_index").is_none());
        assert_eq!(json["options"][1], "4");
    }

    #[test]
    fn question_update_rules_apply_to_supplied_fields() {
        let untouched = UpdateQuestionPayload {
            text: None,
            options: None,
            correct_option_index: None,
        };
        assert!(untouched.validate().is_ok());

        let empty_text = UpdateQuestionPayload {
            text: Some(String::new()),
            options: None,
            correct_option_index: None,
        };
        assert!(empty_text.validate().is_err());

        let single_option = UpdateQuestionPayload {
            text: None,
            options: Some(vec!["only".into()]),
            correct_option_index: None,
        };
        assert!(single_option.validate().is_err());
    }

    #[test]
    fn create_payload_requires_a_name() {
        let payload = CreateCategoryPayload {
            name: String::new(),
            description: String::new(),
        };
        assert!(payload.validate().is_err());
    }
}
