//! SQL schema for the gradebook SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- ── Reference data (owned by the surrounding school system) ──────────────────

CREATE TABLE IF NOT EXISTS assessment_systems (
    assessment_system_id TEXT PRIMARY KEY,
    program_id           TEXT NOT NULL,
    name                 TEXT NOT NULL,
    kind                 TEXT NOT NULL,  -- 'MARKING_SCHEME' | 'RUBRIC' | 'CGPA' | 'HYBRID'
    gpa_scale            TEXT NOT NULL   -- JSON band list
);

CREATE TABLE IF NOT EXISTS programs (
    program_id           TEXT PRIMARY KEY,
    name                 TEXT NOT NULL,
    assessment_system_id TEXT REFERENCES assessment_systems(assessment_system_id)
);

CREATE TABLE IF NOT EXISTS term_structures (
    term_structure_id TEXT PRIMARY KEY,
    program_id        TEXT NOT NULL REFERENCES programs(program_id),
    name              TEXT NOT NULL,
    ord               INTEGER NOT NULL,
    status            TEXT NOT NULL   -- 'ACTIVE' | 'INACTIVE'
);

CREATE TABLE IF NOT EXISTS academic_terms (
    term_id           TEXT PRIMARY KEY,
    term_structure_id TEXT NOT NULL REFERENCES term_structures(term_structure_id),
    name              TEXT NOT NULL,
    ord               INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS assessment_periods (
    period_id TEXT PRIMARY KEY,
    term_id   TEXT NOT NULL REFERENCES academic_terms(term_id),
    name      TEXT NOT NULL,
    ord       INTEGER NOT NULL,
    weight    REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    credits     REAL,            -- NULL = unset
    config_json TEXT             -- SubjectAssessmentConfig or NULL
);

CREATE TABLE IF NOT EXISTS classes (
    class_id          TEXT PRIMARY KEY,
    program_id        TEXT NOT NULL REFERENCES programs(program_id),
    name              TEXT NOT NULL,
    term_structure_id TEXT REFERENCES term_structures(term_structure_id)
);

CREATE TABLE IF NOT EXISTS class_subjects (
    class_id   TEXT NOT NULL REFERENCES classes(class_id),
    subject_id TEXT NOT NULL REFERENCES subjects(subject_id),
    ord        INTEGER NOT NULL,
    PRIMARY KEY (class_id, subject_id)
);

CREATE TABLE IF NOT EXISTS enrollments (
    class_id   TEXT NOT NULL REFERENCES classes(class_id),
    student_id TEXT NOT NULL,
    PRIMARY KEY (class_id, student_id)
);

CREATE TABLE IF NOT EXISTS activities (
    activity_id     TEXT PRIMARY KEY,
    subject_id      TEXT NOT NULL REFERENCES subjects(subject_id),
    period_id       TEXT NOT NULL REFERENCES assessment_periods(period_id),
    title           TEXT NOT NULL,
    assessment_type TEXT NOT NULL,
    total_marks     REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS activity_submissions (
    activity_id    TEXT NOT NULL REFERENCES activities(activity_id),
    student_id     TEXT NOT NULL,
    obtained_marks REAL,
    total_marks    REAL,           -- overrides activities.total_marks
    status         TEXT NOT NULL,  -- 'PENDING' | 'SUBMITTED' | 'GRADED'
    graded_at      TEXT,
    graded_by      TEXT,
    PRIMARY KEY (activity_id, student_id)
);

-- ── Gradebook aggregate ──────────────────────────────────────────────────────

-- One gradebook per class. The UNIQUE constraint is the backstop for two
-- initialisations racing past the existence check.
CREATE TABLE IF NOT EXISTS gradebooks (
    gradebook_id         TEXT PRIMARY KEY,
    class_id             TEXT NOT NULL REFERENCES classes(class_id),
    assessment_system_id TEXT NOT NULL REFERENCES assessment_systems(assessment_system_id),
    term_structure_id    TEXT NOT NULL REFERENCES term_structures(term_structure_id),
    created_at           TEXT NOT NULL,
    UNIQUE (class_id)
);

-- Grade maps are JSON objects keyed by term/period id (NULL = empty).
CREATE TABLE IF NOT EXISTS subject_grade_records (
    record_id                TEXT PRIMARY KEY,
    gradebook_id             TEXT NOT NULL REFERENCES gradebooks(gradebook_id),
    subject_id               TEXT NOT NULL REFERENCES subjects(subject_id),
    term_grades              TEXT,
    assessment_period_grades TEXT,
    updated_at               TEXT NOT NULL,
    UNIQUE (gradebook_id, subject_id)
);

CREATE TABLE IF NOT EXISTS term_results (
    student_id     TEXT NOT NULL,
    term_id        TEXT NOT NULL REFERENCES academic_terms(term_id),
    gpa            REAL NOT NULL,
    total_credits  REAL NOT NULL,
    earned_credits REAL NOT NULL,
    PRIMARY KEY (student_id, term_id)
);

-- Strictly append-only.
-- No UPDATE or DELETE is ever issued against this table. `seq` is the
-- rowid, so append order is read back without a table scan.
CREATE TABLE IF NOT EXISTS grade_history (
    seq           INTEGER PRIMARY KEY AUTOINCREMENT,
    history_id    TEXT NOT NULL UNIQUE,
    student_id    TEXT NOT NULL,
    subject_id    TEXT NOT NULL,
    assessment_id TEXT NOT NULL,
    grade_value   REAL NOT NULL,
    old_value     REAL,
    modified_by   TEXT NOT NULL,
    reason        TEXT NOT NULL,
    recorded_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS periods_term_idx       ON assessment_periods(term_id);
CREATE INDEX IF NOT EXISTS activities_scope_idx   ON activities(subject_id, period_id);
CREATE INDEX IF NOT EXISTS submissions_student_idx ON activity_submissions(student_id);
CREATE INDEX IF NOT EXISTS history_student_idx    ON grade_history(student_id, seq);

PRAGMA user_version = 1;
";
