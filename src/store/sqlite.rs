use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;
use crate::version;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_string_list(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_else(|e| {
        tracing::error!("Invalid string list in database: '{}' - {}", s, e);
        Vec::new()
    })
}

fn format_string_list(list: &[String]) -> String {
    serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string())
}

fn parse_role(s: &str) -> Role {
    s.parse().unwrap_or_else(|_| {
        tracing::error!("Invalid role in database: '{}'", s);
        Role::Owner
    })
}

const VERSION_COLUMNS: &str =
    "version, checksum, size, yanked, signature, publisher_fingerprint, published_at";

fn version_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<VersionRecord> {
    Ok(VersionRecord {
        version: row.get(0)?,
        checksum: row.get(1)?,
        size: row.get(2)?,
        yanked: row.get(3)?,
        signature: row.get(4)?,
        publisher_fingerprint: row.get(5)?,
        published_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

impl SqliteStore {
    fn load_versions(&self, conn: &Connection, name: &str) -> Result<Vec<VersionRecord>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {VERSION_COLUMNS} FROM versions WHERE package_name = ?1
             ORDER BY major DESC, minor DESC, patch DESC, id ASC"
        ))?;

        let rows = stmt.query_map(params![name], version_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn load_package(&self, conn: &Connection, name: &str) -> Result<Option<PackageRecord>> {
        let row = conn
            .query_row(
                "SELECT name, description, authors, license, repository, homepage, keywords,
                        downloads, created_at, updated_at
                 FROM packages WHERE name = ?1",
                params![name],
                |row| {
                    Ok(PackageRecord {
                        name: row.get(0)?,
                        description: row.get(1)?,
                        authors: parse_string_list(&row.get::<_, String>(2)?),
                        license: row.get(3)?,
                        repository: row.get(4)?,
                        homepage: row.get(5)?,
                        keywords: parse_string_list(&row.get::<_, String>(6)?),
                        downloads: row.get(7)?,
                        versions: Vec::new(),
                        created_at: parse_datetime(&row.get::<_, String>(8)?),
                        updated_at: parse_datetime(&row.get::<_, String>(9)?),
                    })
                },
            )
            .optional()?;

        match row {
            Some(mut pkg) => {
                pkg.versions = self.load_versions(conn, name)?;
                Ok(Some(pkg))
            }
            None => Ok(None),
        }
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Package operations

    fn get_package(&self, name: &str) -> Result<Option<PackageRecord>> {
        let conn = self.conn();
        self.load_package(&conn, name)
    }

    fn list_packages(&self) -> Result<Vec<PackageRecord>> {
        let conn = self.conn();
        let names: Vec<String> = conn
            .prepare("SELECT name FROM packages ORDER BY updated_at DESC, name ASC")?
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut packages = Vec::with_capacity(names.len());
        for name in &names {
            if let Some(pkg) = self.load_package(&conn, name)? {
                packages.push(pkg);
            }
        }
        Ok(packages)
    }

    fn create_or_append_version(
        &self,
        name: &str,
        version: &VersionRecord,
        defaults: &PackageDefaults,
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let now = format_datetime(&Utc::now());

        let exists: i64 = tx.query_row(
            "SELECT COUNT(*) FROM packages WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;

        if exists == 0 {
            tx.execute(
                "INSERT INTO packages (name, description, authors, license, repository, homepage,
                                       keywords, downloads, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)",
                params![
                    name,
                    defaults.description,
                    format_string_list(&defaults.authors),
                    defaults.license,
                    defaults.repository,
                    defaults.homepage,
                    format_string_list(&defaults.keywords),
                    now,
                ],
            )?;
        }

        let duplicate: i64 = tx.query_row(
            "SELECT COUNT(*) FROM versions WHERE package_name = ?1 AND version = ?2",
            params![name, version.version],
            |row| row.get(0),
        )?;
        if duplicate > 0 {
            return Err(Error::VersionExists);
        }

        let (major, minor, patch) = version::numeric_parts(&version.version);
        let result = tx.execute(
            "INSERT INTO versions (package_name, version, major, minor, patch, checksum, size,
                                   yanked, signature, publisher_fingerprint, published_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                name,
                version.version,
                major,
                minor,
                patch,
                version.checksum,
                version.size,
                version.yanked,
                version.signature,
                version.publisher_fingerprint,
                format_datetime(&version.published_at),
            ],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(Error::VersionExists);
            }
            Err(e) => return Err(Error::from(e)),
        }

        tx.execute(
            "UPDATE packages SET updated_at = ?1 WHERE name = ?2",
            params![now, name],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn remove_version(&self, name: &str, version: &str) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "DELETE FROM versions WHERE package_name = ?1 AND version = ?2",
            params![name, version],
        )?;

        if rows > 0 {
            let remaining: i64 = tx.query_row(
                "SELECT COUNT(*) FROM versions WHERE package_name = ?1",
                params![name],
                |row| row.get(0),
            )?;
            if remaining == 0 {
                tx.execute("DELETE FROM packages WHERE name = ?1", params![name])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn set_yanked(&self, name: &str, version: &str, yanked: bool) -> Result<()> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE versions SET yanked = ?1 WHERE package_name = ?2 AND version = ?3",
            params![yanked, name, version],
        )?;

        if rows == 0 {
            let pkg_exists: i64 = conn.query_row(
                "SELECT COUNT(*) FROM packages WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )?;
            return Err(if pkg_exists == 0 {
                Error::PackageNotFound
            } else {
                Error::VersionNotFound
            });
        }

        conn.execute(
            "UPDATE packages SET updated_at = ?1 WHERE name = ?2",
            params![format_datetime(&Utc::now()), name],
        )?;
        Ok(())
    }

    fn increment_downloads(&self, name: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE packages SET downloads = downloads + 1 WHERE name = ?1",
            params![name],
        )?;

        if rows == 0 {
            return Err(Error::PackageNotFound);
        }
        Ok(())
    }

    fn update_descriptive_fields(&self, name: &str, update: &PackageUpdate) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let existing = tx
            .query_row(
                "SELECT description, authors, license, repository, homepage, keywords
                 FROM packages WHERE name = ?1",
                params![name],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()?;

        let Some((description, authors, license, repository, homepage, keywords)) = existing else {
            return Err(Error::PackageNotFound);
        };

        let description = update.description.clone().unwrap_or(description);
        let authors = update
            .authors
            .as_ref()
            .map_or(authors, |a| format_string_list(a));
        let license = update.license.clone().unwrap_or(license);
        let repository = update.repository.clone().or(repository);
        let homepage = update.homepage.clone().or(homepage);
        let keywords = update
            .keywords
            .as_ref()
            .map_or(keywords, |k| format_string_list(k));

        tx.execute(
            "UPDATE packages SET description = ?1, authors = ?2, license = ?3, repository = ?4,
                                 homepage = ?5, keywords = ?6, updated_at = ?7
             WHERE name = ?8",
            params![
                description,
                authors,
                license,
                repository,
                homepage,
                keywords,
                format_datetime(&Utc::now()),
                name,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    // Ownership operations

    fn grant_owner(&self, owner_id: &str, package_name: &str) -> Result<()> {
        self.conn().execute(
            "INSERT OR IGNORE INTO owners (owner_id, package_name, created_at)
             VALUES (?1, ?2, ?3)",
            params![owner_id, package_name, format_datetime(&Utc::now())],
        )?;
        Ok(())
    }

    fn is_owner(&self, owner_id: &str, package_name: &str) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM owners WHERE owner_id = ?1 AND package_name = ?2",
            params![owner_id, package_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn list_owners(&self, package_name: &str) -> Result<Vec<OwnershipRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT owner_id, package_name, created_at FROM owners
             WHERE package_name = ?1 ORDER BY created_at ASC, owner_id ASC",
        )?;

        let rows = stmt.query_map(params![package_name], |row| {
            Ok(OwnershipRecord {
                owner_id: row.get(0)?,
                package_name: row.get(1)?,
                created_at: parse_datetime(&row.get::<_, String>(2)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        self.conn().execute(
            "INSERT INTO users (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                user.id,
                user.name,
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM users WHERE id = ?1",
            params![id],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                    updated_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at, updated_at FROM users WHERE name = ?1",
            params![name],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                    updated_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, role, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.role.as_str(),
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::TokenLookupCollision)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, token_hash, token_lookup, role, user_id, created_at, expires_at, last_used_at
             FROM tokens WHERE token_lookup = ?1",
            params![lookup],
            |row| {
                Ok(Token {
                    id: row.get(0)?,
                    token_hash: row.get(1)?,
                    token_lookup: row.get(2)?,
                    role: parse_role(&row.get::<_, String>(3)?),
                    user_id: row.get(4)?,
                    created_at: parse_datetime(&row.get::<_, String>(5)?),
                    expires_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
                    last_used_at: row.get::<_, Option<String>>(7)?.map(|s| parse_datetime(&s)),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    fn has_super_user_token(&self) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM tokens WHERE role = 'superuser'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(temp: &TempDir) -> SqliteStore {
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        store
    }

    fn version_record(version: &str) -> VersionRecord {
        VersionRecord {
            version: version.to_string(),
            checksum: "0".repeat(64),
            size: 17,
            yanked: false,
            signature: None,
            publisher_fingerprint: None,
            published_at: Utc::now(),
        }
    }

    fn defaults() -> PackageDefaults {
        PackageDefaults {
            description: "A test package".to_string(),
            authors: vec!["alice".to_string()],
            license: "MIT".to_string(),
            repository: None,
            homepage: None,
            keywords: vec!["testing".to_string()],
        }
    }

    #[test]
    fn test_initialize_creates_tables() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"packages".to_string()));
        assert!(tables.contains(&"versions".to_string()));
        assert!(tables.contains(&"owners".to_string()));
        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"tokens".to_string()));
    }

    #[test]
    fn test_first_publish_creates_package() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();

        let pkg = store.get_package("json-lib").unwrap().unwrap();
        assert_eq!(pkg.description, "A test package");
        assert_eq!(pkg.authors, vec!["alice".to_string()]);
        assert_eq!(pkg.keywords, vec!["testing".to_string()]);
        assert_eq!(pkg.downloads, 0);
        assert_eq!(pkg.versions.len(), 1);
        assert_eq!(pkg.versions[0].version, "1.0.0");
    }

    #[test]
    fn test_append_keeps_descriptive_fields() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();

        let other = PackageDefaults {
            description: "Different description".to_string(),
            ..defaults()
        };
        store
            .create_or_append_version("json-lib", &version_record("1.1.0"), &other)
            .unwrap();

        let pkg = store.get_package("json-lib").unwrap().unwrap();
        assert_eq!(pkg.description, "A test package");
        assert_eq!(pkg.versions.len(), 2);
    }

    #[test]
    fn test_duplicate_version_rejected() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();
        let result =
            store.create_or_append_version("json-lib", &version_record("1.0.0"), &defaults());
        assert!(matches!(result, Err(Error::VersionExists)));

        let pkg = store.get_package("json-lib").unwrap().unwrap();
        assert_eq!(pkg.versions.len(), 1);
    }

    #[test]
    fn test_versions_sorted_descending() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        for v in ["1.2.0", "1.10.0", "0.9.1"] {
            store
                .create_or_append_version("json-lib", &version_record(v), &defaults())
                .unwrap();
        }

        let pkg = store.get_package("json-lib").unwrap().unwrap();
        let order: Vec<&str> = pkg.versions.iter().map(|v| v.version.as_str()).collect();
        assert_eq!(order, vec!["1.10.0", "1.2.0", "0.9.1"]);
    }

    #[test]
    fn test_yank_and_unyank() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();
        store
            .create_or_append_version("json-lib", &version_record("1.1.0"), &defaults())
            .unwrap();

        store.set_yanked("json-lib", "1.1.0", true).unwrap();
        // Idempotent
        store.set_yanked("json-lib", "1.1.0", true).unwrap();

        let pkg = store.get_package("json-lib").unwrap().unwrap();
        assert!(pkg.versions[0].yanked);
        assert_eq!(pkg.latest().unwrap().version, "1.0.0");

        store.set_yanked("json-lib", "1.1.0", false).unwrap();
        let pkg = store.get_package("json-lib").unwrap().unwrap();
        assert!(!pkg.versions[0].yanked);
        assert_eq!(pkg.latest().unwrap().version, "1.1.0");
    }

    #[test]
    fn test_set_yanked_not_found_errors() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        assert!(matches!(
            store.set_yanked("missing", "1.0.0", true),
            Err(Error::PackageNotFound)
        ));

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();
        assert!(matches!(
            store.set_yanked("json-lib", "9.9.9", true),
            Err(Error::VersionNotFound)
        ));
    }

    #[test]
    fn test_increment_downloads() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();
        store.increment_downloads("json-lib").unwrap();
        store.increment_downloads("json-lib").unwrap();

        let pkg = store.get_package("json-lib").unwrap().unwrap();
        assert_eq!(pkg.downloads, 2);

        assert!(matches!(
            store.increment_downloads("missing"),
            Err(Error::PackageNotFound)
        ));
    }

    #[test]
    fn test_update_descriptive_fields_partial() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();

        let update = PackageUpdate {
            description: Some("New description".to_string()),
            keywords: Some(vec!["json".to_string(), "parsing".to_string()]),
            ..PackageUpdate::default()
        };
        store
            .update_descriptive_fields("json-lib", &update)
            .unwrap();

        let pkg = store.get_package("json-lib").unwrap().unwrap();
        assert_eq!(pkg.description, "New description");
        assert_eq!(
            pkg.keywords,
            vec!["json".to_string(), "parsing".to_string()]
        );
        // Untouched fields retain prior values
        assert_eq!(pkg.authors, vec!["alice".to_string()]);
        assert_eq!(pkg.license, "MIT");
    }

    #[test]
    fn test_remove_version_drops_empty_package() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();
        store.remove_version("json-lib", "1.0.0").unwrap();

        assert!(store.get_package("json-lib").unwrap().is_none());
    }

    #[test]
    fn test_list_packages_most_recent_first() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store
            .create_or_append_version("alpha", &version_record("1.0.0"), &defaults())
            .unwrap();
        store
            .create_or_append_version("beta", &version_record("1.0.0"), &defaults())
            .unwrap();
        // Touch alpha so it sorts first again
        store.set_yanked("alpha", "1.0.0", true).unwrap();

        let names: Vec<String> = store
            .list_packages()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names[0], "alpha");
    }

    #[test]
    fn test_ownership_relation() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        store
            .create_or_append_version("json-lib", &version_record("1.0.0"), &defaults())
            .unwrap();

        store.grant_owner("user-1", "json-lib").unwrap();
        // Idempotent upsert
        store.grant_owner("user-1", "json-lib").unwrap();

        assert!(store.is_owner("user-1", "json-lib").unwrap());
        assert!(!store.is_owner("user-2", "json-lib").unwrap());
        assert_eq!(store.list_owners("json-lib").unwrap().len(), 1);
    }

    #[test]
    fn test_token_lookup_collision() {
        let temp = TempDir::new().unwrap();
        let store = open_store(&temp);

        let token1 = Token {
            id: "token-1".to_string(),
            token_hash: "hash1".to_string(),
            token_lookup: "lookup123".to_string(),
            role: Role::SuperUser,
            user_id: None,
            created_at: Utc::now(),
            expires_at: None,
            last_used_at: None,
        };
        store.create_token(&token1).unwrap();

        let token2 = Token {
            id: "token-2".to_string(),
            token_hash: "hash2".to_string(),
            token_lookup: "lookup123".to_string(), // Same lookup
            role: Role::SuperUser,
            user_id: None,
            created_at: Utc::now(),
            expires_at: None,
            last_used_at: None,
        };

        let result = store.create_token(&token2);
        assert!(matches!(result, Err(Error::TokenLookupCollision)));
        assert!(store.has_super_user_token().unwrap());
    }
}
