use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use uuid::fmt::Hyphenated;

use crate::error::AppError;
use crate::models::publication::{Publication, PublicationView};
use crate::models::validation::{max_length, required_text};

pub const NAME_MAX_LEN: usize = 80;
pub const DESCRIPTION_MAX_LEN: usize = 200;
pub const MEETING_URL_MAX_LEN: usize = 200;

/// Shown in summaries until courses carry instructor data.
pub const PLACEHOLDER_INSTRUCTOR: &str = "Sample Instructor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum CourseType {
    Class,
    Workshop,
}

/// Row of the `courses` table.
#[derive(Debug, Clone, FromRow)]
pub struct Course {
    pub id: Hyphenated,
    pub name: String,
    pub area_of_study: String,
    pub description: String,
    pub course_type: CourseType,
    pub meeting_url: Option<String>,
    pub is_archived: bool,
    pub created_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseView {
    pub id: Uuid,
    pub name: String,
    pub area_of_study: String,
    pub description: String,
    pub course_type: CourseType,
    pub publications: Vec<PublicationView>,
    pub meeting_url: Option<String>,
    pub is_archived: bool,
    pub created_date: DateTime<Utc>,
}

impl CourseView {
    pub fn with_publications(course: Course, publications: Vec<Publication>) -> Self {
        let mut view = Self::from(course);
        view.publications = publications.into_iter().map(PublicationView::from).collect();
        view
    }

    /// Compares identity only: id, creation time and archived flag.
    pub fn same_record(&self, other: &CourseView) -> bool {
        self.id == other.id
            && self.created_date == other.created_date
            && self.is_archived == other.is_archived
    }
}

impl From<Course> for CourseView {
    fn from(course: Course) -> Self {
        Self {
            id: course.id.into_uuid(),
            name: course.name,
            area_of_study: course.area_of_study,
            description: course.description,
            course_type: course.course_type,
            publications: Vec::new(),
            meeting_url: course.meeting_url,
            is_archived: course.is_archived,
            created_date: course.created_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummaryView {
    pub id: Uuid,
    pub name: String,
    pub instructor_name: String,
    pub area_of_study: String,
    pub is_archived: bool,
}

impl From<Course> for CourseSummaryView {
    fn from(course: Course) -> Self {
        Self {
            id: course.id.into_uuid(),
            name: course.name,
            instructor_name: PLACEHOLDER_INSTRUCTOR.to_string(),
            area_of_study: course.area_of_study,
            is_archived: course.is_archived,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourseRequest {
    pub name: String,
    #[serde(default)]
    pub area_of_study: String,
    #[serde(default)]
    pub description: String,
    pub course_type: CourseType,
    #[serde(default)]
    pub meeting_url: Option<String>,
}

impl NewCourseRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_course_fields(&self.name, &self.description, self.meeting_url.as_deref())
    }

    /// Builds the row for a freshly created course.
    pub fn into_course(self, id: Uuid, created_date: DateTime<Utc>) -> Course {
        Course {
            id: id.hyphenated(),
            name: self.name,
            area_of_study: self.area_of_study,
            description: self.description,
            course_type: self.course_type,
            meeting_url: self.meeting_url,
            is_archived: false,
            created_date,
        }
    }
}

/// Full replacement of a course's mutable fields. An absent `isArchived`
/// keeps the stored flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub name: String,
    #[serde(default)]
    pub area_of_study: String,
    #[serde(default)]
    pub description: String,
    pub course_type: CourseType,
    #[serde(default)]
    pub meeting_url: Option<String>,
    #[serde(default)]
    pub is_archived: Option<bool>,
}

impl UpdateCourseRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_course_fields(&self.name, &self.description, self.meeting_url.as_deref())
    }

    pub fn apply_to(self, current: Course) -> Course {
        Course {
            id: current.id,
            name: self.name,
            area_of_study: self.area_of_study,
            description: self.description,
            course_type: self.course_type,
            meeting_url: self.meeting_url,
            is_archived: self.is_archived.unwrap_or(current.is_archived),
            created_date: current.created_date,
        }
    }
}

fn validate_course_fields(
    name: &str,
    description: &str,
    meeting_url: Option<&str>,
) -> Result<(), AppError> {
    required_text("name", name, NAME_MAX_LEN)?;
    max_length("description", description, DESCRIPTION_MAX_LEN)?;
    if let Some(url) = meeting_url {
        max_length("meetingUrl", url, MEETING_URL_MAX_LEN)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now;

    fn sample_request() -> NewCourseRequest {
        NewCourseRequest {
            name: "Algorithms".to_string(),
            area_of_study: "Comp. Sci.".to_string(),
            description: "A short description".to_string(),
            course_type: CourseType::Class,
            meeting_url: None,
        }
    }

    #[test]
    fn test_new_course_validation() {
        assert!(sample_request().validate().is_ok());

        let mut blank = sample_request();
        blank.name = "".to_string();
        assert!(matches!(blank.validate(), Err(AppError::Validation(_))));

        let mut long_name = sample_request();
        long_name.name = "x".repeat(NAME_MAX_LEN + 1);
        assert!(long_name.validate().is_err());

        let mut long_description = sample_request();
        long_description.description = "x".repeat(DESCRIPTION_MAX_LEN + 1);
        assert!(long_description.validate().is_err());

        let mut long_url = sample_request();
        long_url.meeting_url = Some("x".repeat(MEETING_URL_MAX_LEN + 1));
        assert!(long_url.validate().is_err());
    }

    #[test]
    fn test_into_course_starts_unarchived() {
        let id = Uuid::new_v4();
        let created = now();
        let course = sample_request().into_course(id, created);

        assert_eq!(course.id.into_uuid(), id);
        assert_eq!(course.created_date, created);
        assert!(!course.is_archived);

        let view = CourseView::from(course.clone());
        assert_eq!(view.name, "Algorithms");
        assert!(view.publications.is_empty());

        let summary = CourseSummaryView::from(course);
        assert_eq!(summary.instructor_name, PLACEHOLDER_INSTRUCTOR);
        assert_eq!(summary.area_of_study, "Comp. Sci.");
    }

    #[test]
    fn test_update_keeps_identity() {
        let course = sample_request().into_course(Uuid::new_v4(), now());
        let update = UpdateCourseRequest {
            name: "Data Structures".to_string(),
            area_of_study: "Comp. Sci.".to_string(),
            description: String::new(),
            course_type: CourseType::Workshop,
            meeting_url: Some("https://meet.example.com/ds".to_string()),
            is_archived: None,
        };

        let updated = update.apply_to(course.clone());
        assert_eq!(updated.id, course.id);
        assert_eq!(updated.created_date, course.created_date);
        assert_eq!(updated.name, "Data Structures");
        assert_eq!(updated.course_type, CourseType::Workshop);
        assert!(!updated.is_archived);
    }

    #[test]
    fn test_same_record_ignores_descriptive_fields() {
        let view = CourseView::from(sample_request().into_course(Uuid::new_v4(), now()));
        let mut renamed = view.clone();
        renamed.name = "Something else".to_string();

        assert!(view.same_record(&renamed));
        assert_ne!(view, renamed);

        renamed.is_archived = true;
        assert!(!view.same_record(&renamed));
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let view = CourseView::from(sample_request().into_course(Uuid::new_v4(), now()));
        let json = serde_json::to_value(&view).expect("serialize course");

        assert_eq!(json["areaOfStudy"], "Comp. Sci.");
        assert_eq!(json["courseType"], "Class");
        assert_eq!(json["isArchived"], false);
        assert!(json["meetingUrl"].is_null());
        assert!(json["publications"].as_array().is_some());
    }
}
