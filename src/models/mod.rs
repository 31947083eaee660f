pub mod course;
pub mod publication;
mod validation;

use chrono::{DateTime, SubsecRound, Utc};

pub use course::{
    Course, CourseSummaryView, CourseType, CourseView, NewCourseRequest, UpdateCourseRequest,
};
pub use publication::{NewPublicationRequest, Publication, PublicationView};

/// Current time, truncated to milliseconds so it reads back from the store unchanged.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
