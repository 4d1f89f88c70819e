use std::{
    cell::RefCell,
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use depot_db::{
    connection::DbConnection, models::index::NewUser, repository::users::UserRepository,
};
use depot_dl::{error::DownloadError, traits::DistributionResolver};
use depot_package::{CoreMetadata, FieldValue, MetadataExtractor};
use tempfile::TempDir;

use crate::{
    register::{RegisterOutcome, Registrar},
    storage::ContentStore,
    DepotResult,
};

pub fn metadata(name: &str, version: &str, extra: &[(&str, &str)]) -> CoreMetadata {
    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert("name".to_string(), FieldValue::Single(name.to_string()));
    attributes.insert(
        "version".to_string(),
        FieldValue::Single(version.to_string()),
    );
    for (key, value) in extra {
        attributes.insert(key.to_string(), FieldValue::Single(value.to_string()));
    }

    CoreMetadata {
        name: name.to_string(),
        version: version.to_string(),
        attributes,
    }
}

/// Extractor answering from a table keyed by file name.
#[derive(Clone, Default)]
pub struct StaticExtractor {
    entries: Rc<RefCell<HashMap<String, CoreMetadata>>>,
}

impl MetadataExtractor for StaticExtractor {
    type Metadata = CoreMetadata;

    fn get_metadata(&self, path: &Path) -> depot_package::Result<Option<CoreMetadata>> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.entries.borrow().get(&name).cloned())
    }
}

/// Resolver serving archives from the fixture directory.
#[derive(Default)]
pub struct FakeResolver {
    pub labels: HashMap<String, PathBuf>,
    pub failing: Vec<String>,
    pub scratch_dirs: RefCell<Vec<PathBuf>>,
}

impl DistributionResolver for FakeResolver {
    fn download(&self, label: &str, dest_dir: &Path) -> Result<Option<PathBuf>, DownloadError> {
        self.scratch_dirs.borrow_mut().push(dest_dir.to_path_buf());
        assert!(dest_dir.is_dir());

        if self.failing.iter().any(|failing| failing == label) {
            return Err(DownloadError::HttpError {
                status: 500,
                url: format!("https://index.example.com/pypi/{label}/json"),
            });
        }

        let Some(source) = self.labels.get(label) else {
            return Ok(None);
        };
        let target = dest_dir.join(source.file_name().unwrap());
        fs::copy(source, &target)?;
        Ok(Some(target))
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub db: DbConnection,
    pub extractor: StaticExtractor,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("archives")).unwrap();
        let db = DbConnection::open(dir.path().join("depot.db")).unwrap();
        Self {
            dir,
            db,
            extractor: StaticExtractor::default(),
        }
    }

    /// Writes a fake archive whose metadata the extractor reports.
    pub fn archive(&mut self, filename: &str, metadata: CoreMetadata) -> PathBuf {
        self.extractor
            .entries
            .borrow_mut()
            .insert(filename.to_string(), metadata);
        self.archive_without_metadata(filename)
    }

    pub fn archive_without_metadata(&mut self, filename: &str) -> PathBuf {
        let path = self.path(filename);
        fs::write(&path, format!("contents of {filename}")).unwrap();
        path
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.dir.path().join("archives").join(filename)
    }

    pub fn storage_root(&self) -> PathBuf {
        self.dir.path().join("storage")
    }

    pub fn store(&self) -> ContentStore {
        ContentStore::new(self.storage_root())
    }

    pub fn register<E: MetadataExtractor>(
        &mut self,
        registrar: &Registrar<E>,
        filename: &str,
        owner: Option<&str>,
    ) -> DepotResult<RegisterOutcome> {
        let path = self.path(filename);
        registrar.register(self.db.conn(), &path, owner)
    }

    pub fn scratch_root(&self) -> PathBuf {
        let root = self.dir.path().join("scratch");
        fs::create_dir_all(&root).unwrap();
        root
    }
}

pub fn add_user(fixture: &mut Fixture, username: &str, email: Option<&str>) -> i32 {
    UserRepository::insert(fixture.db.conn(), &NewUser { username, email }).unwrap()
}
