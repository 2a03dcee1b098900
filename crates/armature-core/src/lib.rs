//! Armature Core Types and Definitions
//!
//! This crate provides the foundational vocabulary for the Armature diagram
//! builder. It includes:
//!
//! - **Attributes**: insertion-ordered rendering attribute maps ([`attr`] module)
//! - **Directions**: data-flow direction for diagrams and scopes ([`direction::Direction`])
//! - **Output options**: curve style and output format ([`output`] module)
//! - **Identifiers**: node-id generation with injectable sources ([`id`] module)
//! - **Palette**: background colors for nested scopes ([`palette`] module)

pub mod attr;
pub mod direction;
pub mod error;
pub mod id;
pub mod output;
pub mod palette;
