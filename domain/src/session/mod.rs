//! Messages, generation options and streaming events exchanged with a
//! text-generation provider.

pub mod entities;
pub mod options;
pub mod stream;
