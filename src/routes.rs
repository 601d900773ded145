use crate::{
    error::RosterError,
    routes::students::{delete_student, get_student, get_students, post_student, put_student},
    state::RosterState,
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    routing::get,
};
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;

pub mod students;

/// A JSON body, parsed whatever `Content-Type` the client sent.
///
/// Any rejection becomes a [`RosterError`] so it gets the usual error body.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RosterError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        let Json(value) = Json::from_bytes(&bytes)?;
        Ok(Self(value))
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(RosterError))]
pub struct PathParam<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(RosterError))]
pub struct QueryParams<T>(pub T);

pub fn router(state: RosterState) -> Router {
    Router::new()
        .route("/students/", get(get_students).post(post_student))
        .route("/students", get(get_students).post(post_student))
        .route(
            "/students/{id}",
            get(get_student).put(put_student).delete(delete_student),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
