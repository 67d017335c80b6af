//! 位置与字符流

pub mod position;
pub mod stream;

pub use position::{SourcePosition, SourceSpan};
pub use stream::CharStream;
