use diesel::prelude::*;

use crate::{
    models::index::{NewRelease, Release},
    schema::index::releases,
};

/// Repository for package releases.
pub struct ReleaseRepository;

impl ReleaseRepository {
    /// Finds the release of a package with exactly this version string.
    pub fn find(
        conn: &mut SqliteConnection,
        package_id: i32,
        version: &str,
    ) -> QueryResult<Option<Release>> {
        releases::table
            .filter(releases::package_id.eq(package_id))
            .filter(releases::version.eq(version))
            .select(Release::as_select())
            .first(conn)
            .optional()
    }

    pub fn find_by_id(conn: &mut SqliteConnection, id: i32) -> QueryResult<Option<Release>> {
        releases::table
            .find(id)
            .select(Release::as_select())
            .first(conn)
            .optional()
    }

    /// Lists the releases of a package in registration order.
    pub fn list_for_package(
        conn: &mut SqliteConnection,
        package_id: i32,
    ) -> QueryResult<Vec<Release>> {
        releases::table
            .filter(releases::package_id.eq(package_id))
            .order(releases::id.asc())
            .select(Release::as_select())
            .load(conn)
    }

    pub fn insert(conn: &mut SqliteConnection, release: &NewRelease) -> QueryResult<i32> {
        diesel::insert_into(releases::table)
            .values(release)
            .returning(releases::id)
            .get_result(conn)
    }

    pub fn count(conn: &mut SqliteConnection) -> QueryResult<i64> {
        releases::table.count().get_result(conn)
    }
}
