use depot_db::{
    models::index::{NewUser, User},
    repository::users::UserRepository,
};
use diesel::SqliteConnection;
use tracing::debug;

use crate::{error::DepotError, DepotResult};

/// Creates an index user that packages can be owned by.
pub fn add_user(
    conn: &mut SqliteConnection,
    username: &str,
    email: Option<&str>,
) -> DepotResult<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(DepotError::Custom("Username must not be empty".into()));
    }
    let email = email.map(str::trim).filter(|email| !email.is_empty());

    let id = UserRepository::insert(conn, &NewUser { username, email }).map_err(|err| {
        if depot_db::error::is_unique_violation(&err) {
            DepotError::UserExists(username.to_string())
        } else {
            err.into()
        }
    })?;
    debug!("created user {} with id {}", username, id);

    UserRepository::find_by_id(conn, id)?
        .ok_or_else(|| DepotError::Custom(format!("User '{username}' vanished after insert")))
}

pub fn list_users(conn: &mut SqliteConnection) -> DepotResult<Vec<User>> {
    Ok(UserRepository::list_all(conn)?)
}
