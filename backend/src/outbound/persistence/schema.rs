//! Diesel schema definitions for the collaboration database.
//!
//! Kept in sync with the SQL migrations by hand; `diesel print-schema` output
//! is the source of truth for column order.

diesel::table! {
    /// Registered identities, both local (password) and external (token).
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Nullable<Varchar>,
        provider -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Project aggregates. Membership is denormalised into a UUID array so
    /// collaborator checks are a single row read.
    projects (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Text,
        created_by -> Uuid,
        members -> Array<Uuid>,
        status -> Varchar,
        tags -> Array<Text>,
        roadmap -> Jsonb,
        start_date -> Nullable<Timestamptz>,
        target_date -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Pending and resolved project invitations.
    invites (id) {
        id -> Uuid,
        sender -> Uuid,
        receiver -> Uuid,
        project -> Uuid,
        status -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task aggregates. Comments live inside the row as a JSONB array because
    /// they are only ever read through their task.
    tasks (id) {
        id -> Uuid,
        project -> Uuid,
        title -> Varchar,
        description -> Text,
        status -> Varchar,
        priority -> Varchar,
        assigned_to -> Nullable<Uuid>,
        tags -> Array<Text>,
        comments -> Jsonb,
        start_date -> Nullable<Timestamptz>,
        due_date -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, projects, invites, tasks);
