use crate::{
    data::DataType,
    error::{CreateSchemaSnafu, MakeQuerySnafu, RosterResult},
};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use sqlx::{FromRow, SqliteConnection};

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub term: i64,
    pub active: bool,
}

/// Client input for both creating and replacing a student. Never carries an id.
#[derive(Deserialize, Debug)]
pub struct FormStudent {
    pub name: String,
    pub term: i64,
    #[serde(default = "active_by_default")]
    pub active: bool,
}

const fn active_by_default() -> bool {
    true
}

impl Student {
    pub async fn create_table_if_missing(conn: &mut SqliteConnection) -> RosterResult<()> {
        // AUTOINCREMENT so ids of deleted rows are never handed out again
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS students (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                term INTEGER NOT NULL,
                active BOOLEAN NOT NULL DEFAULT 1
            )",
        )
        .execute(&mut *conn)
        .await
        .context(CreateSchemaSnafu)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS ix_students_name ON students (name)")
            .execute(conn)
            .await
            .context(CreateSchemaSnafu)?;

        Ok(())
    }

    pub async fn get_all_with_active(
        active: bool,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, name, term, active FROM students WHERE active = ?1 ORDER BY id",
        )
        .bind(active)
        .fetch_all(conn)
        .await
        .context(MakeQuerySnafu)
    }
}

impl DataType for Student {
    type Id = i64;
    type FormForAdding = FormStudent;

    async fn get_from_db_by_id(
        id: Self::Id,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT id, name, term, active FROM students WHERE id = ?1")
            .bind(id)
            .fetch_optional(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Self> {
        let FormStudent { name, term, active } = to_be_added;

        sqlx::query_as::<_, Self>(
            "INSERT INTO students (name, term, active) VALUES (?1, ?2, ?3)
            RETURNING id, name, term, active",
        )
        .bind(name)
        .bind(term)
        .bind(active)
        .fetch_one(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn replace_in_database(
        id: Self::Id,
        replacement: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Option<Self>> {
        let FormStudent { name, term, active } = replacement;

        sqlx::query_as::<_, Self>(
            "UPDATE students SET name = ?2, term = ?3, active = ?4 WHERE id = ?1
            RETURNING id, name, term, active",
        )
        .bind(id)
        .bind(name)
        .bind(term)
        .bind(active)
        .fetch_optional(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn remove_from_database(id: Self::Id, conn: &mut SqliteConnection) -> RosterResult<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = ?1")
            .bind(id)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Connection;

    async fn fresh_db() -> SqliteConnection {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        Student::create_table_if_missing(&mut conn).await.unwrap();
        conn
    }

    fn form(name: &str, term: i64, active: bool) -> FormStudent {
        FormStudent {
            name: name.to_string(),
            term,
            active,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_reads_back() {
        let mut conn = fresh_db().await;

        let ana = Student::insert_into_database(form("Ana", 3, true), &mut conn)
            .await
            .unwrap();
        let bruno = Student::insert_into_database(form("Bruno", 1, false), &mut conn)
            .await
            .unwrap();

        assert_ne!(ana.id, bruno.id);
        assert_eq!(ana.name, "Ana");
        assert_eq!(ana.term, 3);
        assert!(ana.active);
        assert!(!bruno.active);

        let fetched = Student::get_from_db_by_id(ana.id, &mut conn).await.unwrap();
        assert_eq!(fetched, Some(ana));
    }

    #[tokio::test]
    async fn missing_id_is_none() {
        let mut conn = fresh_db().await;

        assert_eq!(
            Student::get_from_db_by_id(999_999, &mut conn).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn filters_on_active_in_id_order() {
        let mut conn = fresh_db().await;
        for (name, active) in [("a", true), ("b", false), ("c", true), ("d", false)] {
            Student::insert_into_database(form(name, 2, active), &mut conn)
                .await
                .unwrap();
        }

        let names = |students: Vec<Student>| {
            students
                .into_iter()
                .map(|student| student.name)
                .collect::<Vec<_>>()
        };

        let active = Student::get_all_with_active(true, &mut conn).await.unwrap();
        assert_eq!(names(active), ["a", "c"]);
        let inactive = Student::get_all_with_active(false, &mut conn).await.unwrap();
        assert_eq!(names(inactive), ["b", "d"]);
    }

    #[tokio::test]
    async fn replace_overwrites_every_field() {
        let mut conn = fresh_db().await;
        let original = Student::insert_into_database(form("Ana", 3, true), &mut conn)
            .await
            .unwrap();

        let replaced = Student::replace_in_database(original.id, form("Ana M", 4, false), &mut conn)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            replaced,
            Student {
                id: original.id,
                name: "Ana M".to_string(),
                term: 4,
                active: false,
            }
        );
        assert_eq!(
            Student::get_from_db_by_id(original.id, &mut conn).await.unwrap(),
            Some(replaced)
        );
    }

    #[tokio::test]
    async fn replace_of_missing_id_creates_nothing() {
        let mut conn = fresh_db().await;

        let replaced = Student::replace_in_database(7, form("Ghost", 1, true), &mut conn)
            .await
            .unwrap();

        assert_eq!(replaced, None);
        assert!(Student::get_all_with_active(true, &mut conn).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_reports_whether_a_row_went_away() {
        let mut conn = fresh_db().await;
        let ana = Student::insert_into_database(form("Ana", 3, true), &mut conn)
            .await
            .unwrap();

        assert!(Student::remove_from_database(ana.id, &mut conn).await.unwrap());
        assert!(!Student::remove_from_database(ana.id, &mut conn).await.unwrap());
        assert_eq!(Student::get_from_db_by_id(ana.id, &mut conn).await.unwrap(), None);
    }

    #[tokio::test]
    async fn deleted_ids_are_not_reused() {
        let mut conn = fresh_db().await;
        let first = Student::insert_into_database(form("Ana", 3, true), &mut conn)
            .await
            .unwrap();
        Student::remove_from_database(first.id, &mut conn).await.unwrap();

        let second = Student::insert_into_database(form("Bruno", 3, true), &mut conn)
            .await
            .unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn form_defaults_to_active() {
        let form: FormStudent = serde_json::from_str(r#"{"name": "Ana", "term": 3}"#).unwrap();
        assert!(form.active);
    }
}
