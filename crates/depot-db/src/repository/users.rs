use diesel::prelude::*;

use crate::{
    models::index::{NewUser, User},
    schema::index::users,
};

/// Repository for index users.
pub struct UserRepository;

impl UserRepository {
    pub fn list_all(conn: &mut SqliteConnection) -> QueryResult<Vec<User>> {
        users::table
            .order(users::username.asc())
            .select(User::as_select())
            .load(conn)
    }

    pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<User>> {
        users::table
            .find(id)
            .select(User::as_select())
            .first(conn)
            .optional()
    }

    pub fn find_by_username(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> QueryResult<Option<User>> {
        users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(conn)
            .optional()
    }

    /// Finds users whose email matches, ignoring ASCII case.
    pub fn find_by_email(conn: &mut SqliteConnection, email: &str) -> QueryResult<Vec<User>> {
        users::table
            .filter(users::email.eq(email))
            .order(users::id.asc())
            .select(User::as_select())
            .load(conn)
    }

    pub fn insert(conn: &mut SqliteConnection, user: &NewUser) -> QueryResult<i32> {
        diesel::insert_into(users::table)
            .values(user)
            .returning(users::id)
            .get_result(conn)
    }

    pub fn count(conn: &mut SqliteConnection) -> QueryResult<i64> {
        users::table.count().get_result(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::is_unique_violation, repository::test_support::open_temp_db};

    #[test]
    fn test_insert_and_find() {
        let (_dir, mut db) = open_temp_db();
        let id = UserRepository::insert(
            db.conn(),
            &NewUser {
                username: "alice",
                email: Some("Alice@Example.com"),
            },
        )
        .unwrap();

        let user = UserRepository::find_by_username(db.conn(), "alice")
            .unwrap()
            .unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email.as_deref(), Some("Alice@Example.com"));
        assert!(UserRepository::find_by_username(db.conn(), "bob")
            .unwrap()
            .is_none());
        assert_eq!(
            UserRepository::find_by_id(db.conn(), id).unwrap().unwrap().username,
            "alice"
        );
    }

    #[test]
    fn test_find_by_email_ignores_case() {
        let (_dir, mut db) = open_temp_db();
        UserRepository::insert(
            db.conn(),
            &NewUser {
                username: "alice",
                email: Some("Alice@Example.com"),
            },
        )
        .unwrap();

        let found = UserRepository::find_by_email(db.conn(), "alice@example.COM").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "alice");
    }

    #[test]
    fn test_duplicate_username_is_unique_violation() {
        let (_dir, mut db) = open_temp_db();
        let user = NewUser {
            username: "alice",
            email: None,
        };
        UserRepository::insert(db.conn(), &user).unwrap();

        let err = UserRepository::insert(db.conn(), &user).unwrap_err();
        assert!(is_unique_violation(&err));
        assert_eq!(UserRepository::count(db.conn()).unwrap(), 1);
    }
}
