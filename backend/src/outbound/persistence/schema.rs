//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the embedded migrations under
//! `backend/migrations` exactly.

diesel::table! {
    /// Registered accounts keyed by handle.
    users (handle) {
        handle -> Varchar,
        name -> Varchar,
        /// Lowercased, unique (`users_email_key`).
        email -> Varchar,
        /// Argon2id PHC string.
        password_hash -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Directed follow edges. A single row backs both the follower's
    /// `following` set and the followed account's `followers` set.
    follows (follower_handle, followed_handle) {
        follower_handle -> Varchar,
        followed_handle -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Posts with their like counters.
    posts (id) {
        id -> Uuid,
        title -> Text,
        content -> Text,
        author_handle -> Varchar,
        /// Never negative (`CHECK (like_count >= 0)`).
        like_count -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(posts -> users (author_handle));

diesel::allow_tables_to_appear_in_same_query!(users, follows, posts);
