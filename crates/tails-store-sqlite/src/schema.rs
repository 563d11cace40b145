//! SQL schema for the Happy Tails SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE,
    name          TEXT NOT NULL,
    password_hash TEXT,              -- argon2 PHC string; NULL for Google-only
    google_sub    TEXT UNIQUE,
    is_admin      INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_profiles (
    user_id        INTEGER PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
    occupation     TEXT,
    housing_type   TEXT,             -- HousingType, snake_case
    has_yard       INTEGER NOT NULL DEFAULT 0,
    experience     TEXT,             -- ExperienceLevel, snake_case
    household_size INTEGER,
    other_pets     TEXT,
    about          TEXT,
    updated_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS pet_types (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE
);

CREATE TABLE IF NOT EXISTS pet_breeds (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    type_id INTEGER NOT NULL REFERENCES pet_types(id),
    name    TEXT NOT NULL COLLATE NOCASE,
    UNIQUE (type_id, name)
);

CREATE TABLE IF NOT EXISTS addresses (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    street      TEXT,
    city        TEXT NOT NULL,
    region      TEXT,
    postal_code TEXT,
    country     TEXT
);

CREATE TABLE IF NOT EXISTS adoptables (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    caretaker_id  INTEGER NOT NULL REFERENCES users(id),
    name          TEXT NOT NULL,
    gender        TEXT NOT NULL,     -- 'male' | 'female'
    dob           TEXT NOT NULL,     -- YYYY-MM-DD
    weight_kg     REAL,
    sterilized    TEXT NOT NULL DEFAULT 'unknown',
    vaccinated    TEXT NOT NULL DEFAULT 'unknown',
    dewormed      TEXT NOT NULL DEFAULT 'unknown',
    house_trained TEXT NOT NULL DEFAULT 'unknown',
    description   TEXT,
    status        TEXT NOT NULL DEFAULT 'available',
    address_id    INTEGER NOT NULL REFERENCES addresses(id),
    type_id       INTEGER NOT NULL REFERENCES pet_types(id),
    breed_id      INTEGER REFERENCES pet_breeds(id),
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

-- Image order is the upload order; position 0 is the cover.
CREATE TABLE IF NOT EXISTS adoptable_images (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    adoptable_id INTEGER NOT NULL REFERENCES adoptables(id) ON DELETE CASCADE,
    filename     TEXT NOT NULL,
    position     INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS adoption_requests (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    adopter_id   INTEGER NOT NULL REFERENCES users(id),
    adoptable_id INTEGER NOT NULL REFERENCES adoptables(id) ON DELETE CASCADE,
    message      TEXT NOT NULL DEFAULT '',
    status       TEXT NOT NULL DEFAULT 'pending',
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    UNIQUE (adopter_id, adoptable_id)
);

-- Append-only apart from the read flag.
CREATE TABLE IF NOT EXISTS messages (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    request_id INTEGER NOT NULL REFERENCES adoption_requests(id) ON DELETE CASCADE,
    sender_id  INTEGER NOT NULL REFERENCES users(id),
    content    TEXT NOT NULL,
    sent_at    TEXT NOT NULL,
    is_read    INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS pets (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id   INTEGER NOT NULL REFERENCES users(id),
    name       TEXT NOT NULL,
    type_id    INTEGER NOT NULL REFERENCES pet_types(id),
    breed_id   INTEGER REFERENCES pet_breeds(id),
    gender     TEXT,
    dob        TEXT,
    notes      TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS medical_files (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    pet_id        INTEGER NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
    filename      TEXT NOT NULL,
    original_name TEXT NOT NULL,
    content_type  TEXT NOT NULL,
    description   TEXT,
    uploaded_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS health_stats (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    pet_id      INTEGER NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
    metric      TEXT NOT NULL,       -- StatMetric, snake_case
    value       REAL NOT NULL,
    recorded_on TEXT NOT NULL,       -- YYYY-MM-DD
    note        TEXT
);

CREATE INDEX IF NOT EXISTS adoptables_caretaker_idx ON adoptables(caretaker_id);
CREATE INDEX IF NOT EXISTS adoptables_status_idx    ON adoptables(status);
CREATE INDEX IF NOT EXISTS requests_adoptable_idx   ON adoption_requests(adoptable_id);
CREATE INDEX IF NOT EXISTS messages_request_idx     ON messages(request_id);
CREATE INDEX IF NOT EXISTS pets_owner_idx           ON pets(owner_id);
CREATE INDEX IF NOT EXISTS stats_pet_idx            ON health_stats(pet_id, recorded_on);

PRAGMA user_version = 1;
";
