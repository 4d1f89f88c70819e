use diesel::{prelude::*, sqlite::Sqlite};
use serde_json::Value;

use crate::{
    models::types::{package_info_from_value, PackageInfo},
    schema::index::*,
};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub created_at: String,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: Option<&'a str>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = packages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Package {
    pub id: i32,
    pub name: String,
    pub owner_id: Option<i32>,
    pub created_at: String,
}

#[derive(Insertable)]
#[diesel(table_name = packages)]
pub struct NewPackage<'a> {
    pub name: &'a str,
    pub owner_id: Option<i32>,
}

#[derive(Debug, Clone, Selectable)]
#[diesel(table_name = releases)]
pub struct Release {
    pub id: i32,
    pub package_id: i32,
    pub version: String,
    pub package_info: PackageInfo,
    pub created_at: String,
}

impl Queryable<releases::SqlType, Sqlite> for Release {
    type Row = (i32, i32, String, Value, String);

    fn build(row: Self::Row) -> diesel::deserialize::Result<Self> {
        Ok(Self {
            id: row.0,
            package_id: row.1,
            version: row.2,
            package_info: package_info_from_value(row.3),
            created_at: row.4,
        })
    }
}

#[derive(Insertable)]
#[diesel(table_name = releases)]
pub struct NewRelease<'a> {
    pub package_id: i32,
    pub version: &'a str,
    pub package_info: Value,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = distributions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Distribution {
    pub id: i32,
    pub release_id: i32,
    pub filename: String,
    /// Path of the stored file, relative to the storage root.
    pub content: String,
    pub size: i64,
    pub checksum: String,
    pub created_at: String,
}

#[derive(Insertable)]
#[diesel(table_name = distributions)]
pub struct NewDistribution<'a> {
    pub release_id: i32,
    pub filename: &'a str,
    pub content: &'a str,
    pub size: i64,
    pub checksum: &'a str,
}
