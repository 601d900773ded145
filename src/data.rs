use crate::error::RosterResult;
use sqlx::SqliteConnection;

pub mod student;

/// A record kept in its own table, addressed by `Id` and written from a client-supplied form.
///
/// Every method is a single statement on the caller's connection, so each one either fully
/// applies or not at all.
pub trait DataType: Sized {
    type Id;
    type FormForAdding;

    async fn get_from_db_by_id(
        id: Self::Id,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Option<Self>>;
    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Self>;
    /// Overwrites every mutable column. `None` if nothing has that id.
    async fn replace_in_database(
        id: Self::Id,
        replacement: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Option<Self>>;
    /// `false` if nothing had that id.
    async fn remove_from_database(id: Self::Id, conn: &mut SqliteConnection) -> RosterResult<bool>;
}
