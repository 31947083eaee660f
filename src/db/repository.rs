use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Course, CourseSummaryView, CourseView, NewCourseRequest, NewPublicationRequest, Publication,
    PublicationView, UpdateCourseRequest, now,
};

/// Access to persisted courses and their publications.
///
/// Reads return wire views; rows never leave the implementation.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn list_courses(&self) -> Result<Vec<CourseView>, AppError>;
    async fn list_courses_simplified(&self) -> Result<Vec<CourseSummaryView>, AppError>;
    async fn get_course(&self, id: Uuid) -> Result<Option<CourseView>, AppError>;
    async fn create_course(&self, req: NewCourseRequest) -> Result<CourseView, AppError>;
    async fn update_course(&self, id: Uuid, req: UpdateCourseRequest) -> Result<CourseView, AppError>;
    /// Flips the archived flag.
    async fn archive_course(&self, id: Uuid) -> Result<CourseView, AppError>;
    /// Removes the course together with its publications.
    async fn delete_course(&self, id: Uuid) -> Result<(), AppError>;
    async fn list_publications_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<PublicationView>, AppError>;
    async fn create_publication(
        &self,
        course_id: Uuid,
        req: NewPublicationRequest,
    ) -> Result<PublicationView, AppError>;
    async fn get_publication(&self, id: Uuid) -> Result<Option<PublicationView>, AppError>;
    async fn delete_publication(&self, id: Uuid) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct SqliteCourseRepository {
    db: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

async fn find_course<'e, E: SqliteExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        r#"
        SELECT id, name, area_of_study, description, course_type,
            meeting_url, is_archived, created_date
        FROM courses
        WHERE id = ?1
        "#,
    )
    .bind(id.hyphenated())
    .fetch_optional(executor)
    .await
}

async fn course_exists<'e, E: SqliteExecutor<'e>>(executor: E, id: Uuid) -> Result<bool, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE id = ?1")
        .bind(id.hyphenated())
        .fetch_one(executor)
        .await?;
    Ok(count > 0)
}

async fn fetch_publications_for<'e, E: SqliteExecutor<'e>>(
    executor: E,
    course_id: Uuid,
) -> Result<Vec<Publication>, sqlx::Error> {
    sqlx::query_as::<_, Publication>(
        r#"
        SELECT id, course_id, title, value, body, created_date, modified_date
        FROM publications
        WHERE course_id = ?1
        ORDER BY created_date, id
        "#,
    )
    .bind(course_id.hyphenated())
    .fetch_all(executor)
    .await
}

async fn fetch_all_courses(db: &SqlitePool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        r#"
        SELECT id, name, area_of_study, description, course_type,
            meeting_url, is_archived, created_date
        FROM courses
        ORDER BY created_date, id
        "#,
    )
    .fetch_all(db)
    .await
}

#[async_trait]
impl CourseStore for SqliteCourseRepository {
    async fn list_courses(&self) -> Result<Vec<CourseView>, AppError> {
        let courses = fetch_all_courses(&self.db).await?;
        let publications = sqlx::query_as::<_, Publication>(
            r#"
            SELECT id, course_id, title, value, body, created_date, modified_date
            FROM publications
            ORDER BY created_date, id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let mut by_course: HashMap<Uuid, Vec<Publication>> = HashMap::new();
        for publication in publications {
            by_course
                .entry(publication.course_id.into_uuid())
                .or_default()
                .push(publication);
        }

        Ok(courses
            .into_iter()
            .map(|course| {
                let owned = by_course.remove(course.id.as_uuid()).unwrap_or_default();
                CourseView::with_publications(course, owned)
            })
            .collect())
    }

    async fn list_courses_simplified(&self) -> Result<Vec<CourseSummaryView>, AppError> {
        let courses = fetch_all_courses(&self.db).await?;
        Ok(courses.into_iter().map(CourseSummaryView::from).collect())
    }

    async fn get_course(&self, id: Uuid) -> Result<Option<CourseView>, AppError> {
        let Some(course) = find_course(&self.db, id).await? else {
            return Ok(None);
        };
        let publications = fetch_publications_for(&self.db, id).await?;
        Ok(Some(CourseView::with_publications(course, publications)))
    }

    async fn create_course(&self, req: NewCourseRequest) -> Result<CourseView, AppError> {
        req.validate()?;
        let course = req.into_course(Uuid::new_v4(), now());

        sqlx::query(
            r#"
            INSERT INTO courses
                (id, name, area_of_study, description, course_type,
                meeting_url, is_archived, created_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.area_of_study)
        .bind(&course.description)
        .bind(course.course_type)
        .bind(&course.meeting_url)
        .bind(course.is_archived)
        .bind(course.created_date)
        .execute(&self.db)
        .await?;

        info!("created course {}", course.id);
        Ok(CourseView::from(course))
    }

    async fn update_course(&self, id: Uuid, req: UpdateCourseRequest) -> Result<CourseView, AppError> {
        req.validate()?;
        let mut tx = self.db.begin().await?;

        let current = find_course(&mut *tx, id).await?.ok_or(AppError::NotFound)?;
        let course = req.apply_to(current);

        sqlx::query(
            r#"
            UPDATE courses
            SET name = ?1,
                area_of_study = ?2,
                description = ?3,
                course_type = ?4,
                meeting_url = ?5,
                is_archived = ?6
            WHERE id = ?7
            "#,
        )
        .bind(&course.name)
        .bind(&course.area_of_study)
        .bind(&course.description)
        .bind(course.course_type)
        .bind(&course.meeting_url)
        .bind(course.is_archived)
        .bind(course.id)
        .execute(&mut *tx)
        .await?;

        let publications = fetch_publications_for(&mut *tx, id).await?;
        tx.commit().await?;

        debug!("updated course {}", id);
        Ok(CourseView::with_publications(course, publications))
    }

    async fn archive_course(&self, id: Uuid) -> Result<CourseView, AppError> {
        let mut tx = self.db.begin().await?;

        let affected = sqlx::query("UPDATE courses SET is_archived = NOT is_archived WHERE id = ?1")
            .bind(id.hyphenated())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(AppError::NotFound);
        }

        let course = find_course(&mut *tx, id).await?.ok_or(AppError::NotFound)?;
        let publications = fetch_publications_for(&mut *tx, id).await?;
        tx.commit().await?;

        info!("course {} archived = {}", id, course.is_archived);
        Ok(CourseView::with_publications(course, publications))
    }

    async fn delete_course(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM publications WHERE course_id = ?1")
            .bind(id.hyphenated())
            .execute(&mut *tx)
            .await?;

        let affected = sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(id.hyphenated())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(AppError::NotFound);
        }

        tx.commit().await?;
        info!("deleted course {}", id);
        Ok(())
    }

    async fn list_publications_for_course(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<PublicationView>, AppError> {
        if !course_exists(&self.db, course_id).await? {
            return Err(AppError::NotFound);
        }
        let publications = fetch_publications_for(&self.db, course_id).await?;
        Ok(publications.into_iter().map(PublicationView::from).collect())
    }

    async fn create_publication(
        &self,
        course_id: Uuid,
        req: NewPublicationRequest,
    ) -> Result<PublicationView, AppError> {
        req.validate()?;
        let mut tx = self.db.begin().await?;

        if !course_exists(&mut *tx, course_id).await? {
            return Err(AppError::NotFound);
        }

        let publication = req.into_publication(Uuid::new_v4(), course_id, now());
        sqlx::query(
            r#"
            INSERT INTO publications
                (id, course_id, title, value, body, created_date, modified_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(publication.id)
        .bind(publication.course_id)
        .bind(&publication.title)
        .bind(publication.value)
        .bind(&publication.body)
        .bind(publication.created_date)
        .bind(publication.modified_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("created publication {} for course {}", publication.id, course_id);
        Ok(PublicationView::from(publication))
    }

    async fn get_publication(&self, id: Uuid) -> Result<Option<PublicationView>, AppError> {
        let publication = sqlx::query_as::<_, Publication>(
            r#"
            SELECT id, course_id, title, value, body, created_date, modified_date
            FROM publications
            WHERE id = ?1
            "#,
        )
        .bind(id.hyphenated())
        .fetch_optional(&self.db)
        .await?;

        Ok(publication.map(PublicationView::from))
    }

    async fn delete_publication(&self, id: Uuid) -> Result<(), AppError> {
        let affected = sqlx::query("DELETE FROM publications WHERE id = ?1")
            .bind(id.hyphenated())
            .execute(&self.db)
            .await?
            .rows_affected();
        if affected == 0 {
            return Err(AppError::NotFound);
        }

        info!("deleted publication {}", id);
        Ok(())
    }
}
