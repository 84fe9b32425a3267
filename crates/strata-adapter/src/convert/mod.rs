//! Conversion between the `OpenAI` client dialect and canonical types

pub mod openai;
