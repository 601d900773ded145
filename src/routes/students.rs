use crate::{
    data::{
        DataType,
        student::{FormStudent, Student},
    },
    error::{MissingStudentSnafu, RosterResult},
    routes::{JsonBody, PathParam, QueryParams},
    state::RosterState,
};
use axum::{Json, extract::State};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use snafu::{OptionExt, ensure};

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct ActiveFilter {
    #[serde(deserialize_with = "query_bool")]
    active: bool,
}

/// Query-string boolean. Also takes `1`/`0`, `yes`/`no`, `on`/`off`, `t`/`f` and `y`/`n`,
/// in any case.
fn query_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "on" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "off" | "0" => Ok(false),
        _ => Err(D::Error::invalid_value(
            Unexpected::Str(&raw),
            &"a boolean such as true/false, 1/0, yes/no or on/off",
        )),
    }
}

impl Default for ActiveFilter {
    fn default() -> Self {
        Self { active: true }
    }
}

#[derive(Serialize)]
pub struct Deleted {
    detail: &'static str,
}

pub async fn post_student(
    State(state): State<RosterState>,
    JsonBody(form): JsonBody<FormStudent>,
) -> RosterResult<Json<Student>> {
    let mut conn = state.get_connection().await?;
    let student = Student::insert_into_database(form, &mut conn).await?;

    info!(id = student.id, "created student");
    Ok(Json(student))
}

pub async fn get_student(
    State(state): State<RosterState>,
    PathParam(id): PathParam<i64>,
) -> RosterResult<Json<Student>> {
    let mut conn = state.get_connection().await?;

    Student::get_from_db_by_id(id, &mut conn)
        .await?
        .context(MissingStudentSnafu { id })
        .map(Json)
}

pub async fn get_students(
    State(state): State<RosterState>,
    QueryParams(ActiveFilter { active }): QueryParams<ActiveFilter>,
) -> RosterResult<Json<Vec<Student>>> {
    let mut conn = state.get_connection().await?;
    Student::get_all_with_active(active, &mut conn)
        .await
        .map(Json)
}

pub async fn put_student(
    State(state): State<RosterState>,
    PathParam(id): PathParam<i64>,
    JsonBody(form): JsonBody<FormStudent>,
) -> RosterResult<Json<Student>> {
    let mut conn = state.get_connection().await?;
    let student = Student::replace_in_database(id, form, &mut conn)
        .await?
        .context(MissingStudentSnafu { id })?;

    info!(id, "replaced student");
    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<RosterState>,
    PathParam(id): PathParam<i64>,
) -> RosterResult<Json<Deleted>> {
    let mut conn = state.get_connection().await?;
    ensure!(
        Student::remove_from_database(id, &mut conn).await?,
        MissingStudentSnafu { id }
    );

    info!(id, "deleted student");
    Ok(Json(Deleted {
        detail: "Student deleted",
    }))
}
