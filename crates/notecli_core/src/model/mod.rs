//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and its JSON codec.
//! - Own identifier and timestamp value types shared by every engine.
//!
//! # Invariants
//! - A note without content is never valid for persistence.
//! - `created_at` is fixed at construction; `updated_at` only moves forward.

pub mod note;
pub mod timestamp;
