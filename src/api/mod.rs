mod extract;

use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use chrono::Utc;
use tower::ServiceBuilder;
use tracing::info;
use uuid::Uuid;

use crate::api::extract::{AppJson, AppPath};
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/simple", get(list_simplified_courses))
        .route(
            "/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/courses/{id}/archive", patch(archive_course))
        .route(
            "/courses/{id}/publications",
            get(list_publications).post(create_publication),
        )
        .route(
            "/courses/{id}/publications/{publication_id}",
            get(get_publication).delete(delete_publication),
        )
        .layer(ServiceBuilder::new().layer(middleware::from_fn(log_request)))
        .with_state(state)
}

async fn log_request(req: Request, next: Next) -> Response {
    info!(
        "[{}] {} - {}",
        Utc::now().format("%H:%M:%S"),
        req.method(),
        req.uri().path()
    );
    next.run(req).await
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<CourseView>>, AppError> {
    let courses = state.courses.list_courses().await?;
    Ok(Json(courses))
}

async fn list_simplified_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseSummaryView>>, AppError> {
    let courses = state.courses.list_courses_simplified().await?;
    Ok(Json(courses))
}

async fn get_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<CourseView>, AppError> {
    let course = state.courses.get_course(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(course))
}

async fn create_course(
    State(state): State<AppState>,
    AppJson(req): AppJson<NewCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = state.courses.create_course(req).await?;
    let location = format!("/courses/{}", course.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(course)))
}

async fn update_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(req): AppJson<UpdateCourseRequest>,
) -> Result<Json<CourseView>, AppError> {
    let course = state.courses.update_course(id, req).await?;
    Ok(Json(course))
}

async fn archive_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<CourseView>, AppError> {
    let course = state.courses.archive_course(id).await?;
    Ok(Json(course))
}

async fn delete_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.courses.delete_course(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_publications(
    State(state): State<AppState>,
    AppPath(course_id): AppPath<Uuid>,
) -> Result<Json<Vec<PublicationView>>, AppError> {
    let publications = state.courses.list_publications_for_course(course_id).await?;
    Ok(Json(publications))
}

async fn create_publication(
    State(state): State<AppState>,
    AppPath(course_id): AppPath<Uuid>,
    AppJson(req): AppJson<NewPublicationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let publication = state.courses.create_publication(course_id, req).await?;
    let location = format!("/courses/{}/publications/{}", course_id, publication.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(publication)))
}

// Publications are looked up by their own id; the course segment only scopes the route.
async fn get_publication(
    State(state): State<AppState>,
    AppPath((_course_id, id)): AppPath<(Uuid, Uuid)>,
) -> Result<Json<PublicationView>, AppError> {
    let publication = state.courses.get_publication(id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(publication))
}

async fn delete_publication(
    State(state): State<AppState>,
    AppPath((_course_id, id)): AppPath<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.courses.delete_publication(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
