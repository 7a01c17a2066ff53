//! Schema for the approval workflow service. The directory tables
//! (departments, users, roles, courses) are shared with the wider
//! platform; the workflow tables are owned here.

pub const SCHEMA_STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS departments (
        department_id BIGSERIAL PRIMARY KEY,
        dept_name TEXT NOT NULL,
        head_of_department_id BIGINT
    )",
    "CREATE TABLE IF NOT EXISTS users (
        user_id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        full_name TEXT NOT NULL,
        email TEXT NOT NULL,
        department_id BIGINT REFERENCES departments (department_id)
    )",
    "CREATE TABLE IF NOT EXISTS roles (
        role_id BIGSERIAL PRIMARY KEY,
        role_name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS user_roles (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users (user_id),
        role_id BIGINT NOT NULL REFERENCES roles (role_id),
        UNIQUE (user_id, role_id)
    )",
    "CREATE TABLE IF NOT EXISTS courses (
        course_id BIGSERIAL PRIMARY KEY,
        course_code TEXT NOT NULL,
        course_name TEXT NOT NULL,
        department_id BIGINT NOT NULL REFERENCES departments (department_id)
    )",
    "CREATE TABLE IF NOT EXISTS syllabus (
        syllabus_id BIGSERIAL PRIMARY KEY,
        course_id BIGINT NOT NULL REFERENCES courses (course_id),
        lecturer_id BIGINT NOT NULL REFERENCES users (user_id),
        academic_year TEXT NOT NULL,
        version_no INTEGER NOT NULL DEFAULT 1,
        is_latest_version BOOLEAN NOT NULL DEFAULT TRUE,
        previous_version_id BIGINT,
        version_notes TEXT,
        description TEXT,
        current_status TEXT NOT NULL DEFAULT 'DRAFT',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ,
        published_at TIMESTAMPTZ,
        archived_at TIMESTAMPTZ,
        lock_version INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_syllabus_status ON syllabus (current_status)",
    "CREATE TABLE IF NOT EXISTS workflow_step (
        step_id BIGSERIAL PRIMARY KEY,
        step_name TEXT NOT NULL UNIQUE,
        step_order INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS syllabus_workflow_history (
        history_id BIGSERIAL PRIMARY KEY,
        syllabus_id BIGINT NOT NULL REFERENCES syllabus (syllabus_id),
        step_id BIGINT NOT NULL REFERENCES workflow_step (step_id),
        action_by BIGINT NOT NULL REFERENCES users (user_id),
        action TEXT NOT NULL,
        comment TEXT,
        action_time TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_history_syllabus ON syllabus_workflow_history (syllabus_id)",
    "CREATE TABLE IF NOT EXISTS syllabus_audit_logs (
        id BIGSERIAL PRIMARY KEY,
        syllabus_id BIGINT,
        action_type TEXT NOT NULL,
        performed_by TEXT NOT NULL,
        performed_by_role TEXT,
        old_status TEXT,
        new_status TEXT,
        comments TEXT,
        changed_fields TEXT,
        ip_address TEXT,
        user_agent TEXT,
        recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        additional_data TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_audit_syllabus ON syllabus_audit_logs (syllabus_id)",
    "CREATE INDEX IF NOT EXISTS idx_audit_performed_by ON syllabus_audit_logs (performed_by)",
    "CREATE INDEX IF NOT EXISTS idx_audit_action_type ON syllabus_audit_logs (action_type)",
    "CREATE INDEX IF NOT EXISTS idx_audit_recorded_at ON syllabus_audit_logs (recorded_at)",
    "CREATE TABLE IF NOT EXISTS notifications (
        notification_id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users (user_id),
        syllabus_id BIGINT,
        type TEXT NOT NULL,
        title TEXT NOT NULL,
        message TEXT,
        is_read BOOLEAN NOT NULL DEFAULT FALSE,
        read_at TIMESTAMPTZ,
        action_url TEXT,
        triggered_by TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )",
    "CREATE INDEX IF NOT EXISTS idx_notifications_recipient ON notifications (user_id, is_read)",
];

pub const SEED_STATEMENTS: &[&str] = &[
    "INSERT INTO roles (role_name) VALUES
        ('ADMIN'),
        ('LECTURER'),
        ('HEAD_OF_DEPARTMENT'),
        ('ACADEMIC_AFFAIRS'),
        ('PRINCIPAL'),
        ('STUDENT')
     ON CONFLICT (role_name) DO NOTHING",
];
