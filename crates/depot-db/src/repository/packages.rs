use diesel::prelude::*;

use crate::{
    models::index::{NewPackage, Package},
    schema::index::packages,
};

/// Repository for packages.
pub struct PackageRepository;

impl PackageRepository {
    pub fn list_all(conn: &mut SqliteConnection) -> QueryResult<Vec<Package>> {
        packages::table
            .order(packages::name.asc())
            .select(Package::as_select())
            .load(conn)
    }

    /// Finds a package by its exact name.
    pub fn find_by_name(conn: &mut SqliteConnection, name: &str) -> QueryResult<Option<Package>> {
        packages::table
            .filter(packages::name.eq(name))
            .select(Package::as_select())
            .first(conn)
            .optional()
    }

    pub fn insert(conn: &mut SqliteConnection, package: &NewPackage) -> QueryResult<i32> {
        diesel::insert_into(packages::table)
            .values(package)
            .returning(packages::id)
            .get_result(conn)
    }

    pub fn count(conn: &mut SqliteConnection) -> QueryResult<i64> {
        packages::table.count().get_result(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::is_unique_violation,
        models::index::NewUser,
        repository::{test_support::open_temp_db, users::UserRepository},
    };

    #[test]
    fn test_insert_with_owner() {
        let (_dir, mut db) = open_temp_db();
        let owner = UserRepository::insert(
            db.conn(),
            &NewUser {
                username: "alice",
                email: None,
            },
        )
        .unwrap();

        PackageRepository::insert(
            db.conn(),
            &NewPackage {
                name: "requests",
                owner_id: Some(owner),
            },
        )
        .unwrap();

        let package = PackageRepository::find_by_name(db.conn(), "requests")
            .unwrap()
            .unwrap();
        assert_eq!(package.owner_id, Some(owner));
        assert!(PackageRepository::find_by_name(db.conn(), "Requests")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_name_is_unique() {
        let (_dir, mut db) = open_temp_db();
        let package = NewPackage {
            name: "requests",
            owner_id: None,
        };
        PackageRepository::insert(db.conn(), &package).unwrap();

        let err = PackageRepository::insert(db.conn(), &package).unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[test]
    fn test_unknown_owner_is_rejected() {
        let (_dir, mut db) = open_temp_db();
        let result = PackageRepository::insert(
            db.conn(),
            &NewPackage {
                name: "requests",
                owner_id: Some(42),
            },
        );
        assert!(result.is_err());
        assert_eq!(PackageRepository::count(db.conn()).unwrap(), 0);
    }

    #[test]
    fn test_list_all_sorted() {
        let (_dir, mut db) = open_temp_db();
        for name in ["zope", "attrs", "mako"] {
            PackageRepository::insert(
                db.conn(),
                &NewPackage {
                    name,
                    owner_id: None,
                },
            )
            .unwrap();
        }

        let names: Vec<_> = PackageRepository::list_all(db.conn())
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["attrs", "mako", "zope"]);
    }
}
