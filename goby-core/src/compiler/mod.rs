//! 编译前端
//!
//! 源码 → token 流 → AST。字节码生成在 `runtime::compiler`。

pub mod lexer;
pub mod parser;
