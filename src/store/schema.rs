pub const SCHEMA: &str = r#"
-- One row per package name
CREATE TABLE IF NOT EXISTS packages (
    name TEXT PRIMARY KEY,
    description TEXT NOT NULL DEFAULT '',
    authors TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    license TEXT NOT NULL DEFAULT '',
    repository TEXT,
    homepage TEXT,
    keywords TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    downloads INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- One row per (package, version); immutable except for yanked
CREATE TABLE IF NOT EXISTS versions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    package_name TEXT NOT NULL REFERENCES packages(name) ON DELETE CASCADE,
    version TEXT NOT NULL,

    -- Derived numeric components kept for sort order
    major INTEGER NOT NULL,
    minor INTEGER NOT NULL,
    patch INTEGER NOT NULL,

    checksum TEXT NOT NULL,
    size INTEGER NOT NULL,
    yanked INTEGER NOT NULL DEFAULT 0,

    -- Stored verbatim, never validated
    signature TEXT,
    publisher_fingerprint TEXT,

    published_at TEXT DEFAULT (datetime('now')),

    UNIQUE(package_name, version)
);

-- Ownership relation; the creating owner is added on first publish
CREATE TABLE IF NOT EXISTS owners (
    owner_id TEXT NOT NULL,
    package_name TEXT NOT NULL REFERENCES packages(name) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (owner_id, package_name)
);

-- Registered identities
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Tokens are auth credentials; owner tokens must belong to a user
CREATE TABLE IF NOT EXISTS tokens (
    id TEXT PRIMARY KEY,
    token_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    token_lookup TEXT NOT NULL,        -- first 8 chars for fast lookup
    role TEXT NOT NULL DEFAULT 'owner',

    -- User binding (required for owner tokens, NULL for super-user tokens)
    user_id TEXT REFERENCES users(id) ON DELETE CASCADE,

    -- Lifecycle
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT,            -- NULL = never
    last_used_at TEXT
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_versions_package ON versions(package_name);
CREATE INDEX IF NOT EXISTS idx_owners_package ON owners(package_name);
CREATE INDEX IF NOT EXISTS idx_owners_owner ON owners(owner_id);
CREATE INDEX IF NOT EXISTS idx_packages_updated ON packages(updated_at);
CREATE UNIQUE INDEX IF NOT EXISTS idx_tokens_lookup ON tokens(token_lookup);
CREATE INDEX IF NOT EXISTS idx_tokens_user ON tokens(user_id);
"#;
