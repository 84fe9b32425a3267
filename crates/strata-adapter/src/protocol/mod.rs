//! Wire format types for the client dialect and each Bedrock model family
//!
//! Each module contains pure serde structs matching one JSON body format.
//! They are only used at the boundary; codecs convert them to and from the
//! canonical types in [`crate::types`].

pub mod completion;
pub mod embedding;
pub mod generation;
pub mod messages;
pub mod openai;
