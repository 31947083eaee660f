use std::sync::Arc;

use sqlx::SqlitePool;

use crate::db::{CourseStore, SqliteCourseRepository};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub courses: Arc<dyn CourseStore>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        let courses = Arc::new(SqliteCourseRepository::new(db.clone()));
        Self { db, courses }
    }
}
