use diesel::prelude::*;

use crate::{
    models::index::{Distribution, NewDistribution},
    schema::index::distributions,
};

/// Repository for stored distribution files.
pub struct DistributionRepository;

impl DistributionRepository {
    pub fn list_for_release(
        conn: &mut SqliteConnection,
        release_id: i32,
    ) -> QueryResult<Vec<Distribution>> {
        distributions::table
            .filter(distributions::release_id.eq(release_id))
            .order(distributions::id.asc())
            .select(Distribution::as_select())
            .load(conn)
    }

    pub fn insert(conn: &mut SqliteConnection, distribution: &NewDistribution) -> QueryResult<i32> {
        diesel::insert_into(distributions::table)
            .values(distribution)
            .returning(distributions::id)
            .get_result(conn)
    }

    pub fn count(conn: &mut SqliteConnection) -> QueryResult<i64> {
        distributions::table.count().get_result(conn)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        models::index::{NewPackage, NewRelease},
        repository::{
            packages::PackageRepository, releases::ReleaseRepository, test_support::open_temp_db,
        },
    };

    #[test]
    fn test_insert_and_list() {
        let (_dir, mut db) = open_temp_db();
        let package_id = PackageRepository::insert(
            db.conn(),
            &NewPackage {
                name: "six",
                owner_id: None,
            },
        )
        .unwrap();
        let release_id = ReleaseRepository::insert(
            db.conn(),
            &NewRelease {
                package_id,
                version: "1.16.0",
                package_info: json!({}),
            },
        )
        .unwrap();

        DistributionRepository::insert(
            db.conn(),
            &NewDistribution {
                release_id,
                filename: "six-1.16.0.tar.gz",
                content: "dists/six/six-1.16.0.tar.gz",
                size: 34041,
                checksum: "abc123",
            },
        )
        .unwrap();

        let dists = DistributionRepository::list_for_release(db.conn(), release_id).unwrap();
        assert_eq!(dists.len(), 1);
        assert_eq!(dists[0].filename, "six-1.16.0.tar.gz");
        assert_eq!(dists[0].size, 34041);
        assert_eq!(DistributionRepository::count(db.conn()).unwrap(), 1);
    }

    #[test]
    fn test_release_must_exist() {
        let (_dir, mut db) = open_temp_db();
        let result = DistributionRepository::insert(
            db.conn(),
            &NewDistribution {
                release_id: 7,
                filename: "six-1.16.0.tar.gz",
                content: "dists/six/six-1.16.0.tar.gz",
                size: 1,
                checksum: "abc",
            },
        );
        assert!(result.is_err());
    }
}
