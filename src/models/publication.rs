use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use uuid::fmt::Hyphenated;

use crate::error::AppError;
use crate::models::validation::required_text;

pub const TITLE_MAX_LEN: usize = 200;
pub const BODY_MAX_LEN: usize = 1000;

/// Row of the `publications` table.
#[derive(Debug, Clone, FromRow)]
pub struct Publication {
    pub id: Hyphenated,
    pub course_id: Hyphenated,
    pub title: String,
    pub value: i32,
    pub body: String,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationView {
    pub id: Uuid,
    pub title: String,
    pub value: i32,
    pub body: String,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

impl From<Publication> for PublicationView {
    fn from(publication: Publication) -> Self {
        Self {
            id: publication.id.into_uuid(),
            title: publication.title,
            value: publication.value,
            body: publication.body,
            created_date: publication.created_date,
            modified_date: publication.modified_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPublicationRequest {
    pub title: String,
    pub value: i32,
    pub body: String,
}

impl NewPublicationRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        required_text("title", &self.title, TITLE_MAX_LEN)?;
        required_text("body", &self.body, BODY_MAX_LEN)?;
        Ok(())
    }

    pub fn into_publication(self, id: Uuid, course_id: Uuid, now: DateTime<Utc>) -> Publication {
        Publication {
            id: id.hyphenated(),
            course_id: course_id.hyphenated(),
            title: self.title,
            value: self.value,
            body: self.body,
            created_date: now,
            modified_date: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now;

    #[test]
    fn test_new_publication_validation() {
        let ok = NewPublicationRequest {
            title: "Week 1".to_string(),
            value: 10,
            body: "Read chapter one".to_string(),
        };
        assert!(ok.validate().is_ok());

        let missing_body = NewPublicationRequest {
            body: String::new(),
            ..ok.clone()
        };
        assert!(matches!(missing_body.validate(), Err(AppError::Validation(_))));

        let long_title = NewPublicationRequest {
            title: "t".repeat(TITLE_MAX_LEN + 1),
            ..ok.clone()
        };
        assert!(long_title.validate().is_err());

        let long_body = NewPublicationRequest {
            body: "b".repeat(BODY_MAX_LEN + 1),
            ..ok
        };
        assert!(long_body.validate().is_err());
    }

    #[test]
    fn test_value_is_required_on_the_wire() {
        let parsed: Result<NewPublicationRequest, _> =
            serde_json::from_str(r#"{"title":"Week 1","body":"Read"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_into_publication_sets_both_timestamps() {
        let id = Uuid::new_v4();
        let course_id = Uuid::new_v4();
        let created = now();
        let publication = NewPublicationRequest {
            title: "Week 1".to_string(),
            value: 3,
            body: "Read chapter one".to_string(),
        }
        .into_publication(id, course_id, created);

        assert_eq!(publication.course_id.into_uuid(), course_id);
        assert_eq!(publication.created_date, publication.modified_date);

        let view = PublicationView::from(publication);
        assert_eq!(view.id, id);
        assert_eq!(view.value, 3);
    }
}
