//! AST → 字节码编译器
//!
//! 把解析产物降级为指令序列树。方法体、块体与类体各自在
//! 独立上下文中编译，挂在父序列的常量池里。

pub mod context;
pub mod error;
pub mod expr;
pub mod stmt;

pub use context::{CompileContext, ContextKind};
pub use error::CompileError;

use std::rc::Rc;
use std::sync::Arc;

use goby_log::{trace, Logger};

use crate::compiler::parser::{ProgramKind, Stmt};
use crate::runtime::bytecode::{CompiledSequence, Instruction, Literal};

/// 编译整个程序，返回主序列。
pub fn compile(program: &ProgramKind) -> Result<Rc<CompiledSequence>, CompileError> {
    Compiler::new().compile_program(program)
}

/// REPL 入口：带着上一行遗留的局部变量继续编译，
/// 返回主序列与更新后的局部变量名表。
pub fn compile_with_locals(
    program: &ProgramKind,
    locals: &[String],
) -> Result<(Rc<CompiledSequence>, Vec<String>), CompileError> {
    Compiler::new().compile_program_with_locals(program, locals)
}

// ==================== 编译器 ====================

pub struct Compiler {
    pub(crate) current: CompileContext,
    pub(crate) enclosing: Vec<CompileContext>,
    pub(crate) logger: Arc<Logger>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_logger(Logger::noop())
    }

    pub fn with_logger(logger: Arc<Logger>) -> Self {
        Compiler {
            current: CompileContext::new("main", ContextKind::Main),
            enclosing: Vec::new(),
            logger,
        }
    }

    pub fn compile_program(
        mut self,
        program: &ProgramKind,
    ) -> Result<Rc<CompiledSequence>, CompileError> {
        trace!(self.logger, "compile: starting with {} statements", program.statements.len());
        self.compile_body(&program.statements, true)?;
        self.emit(Instruction::Return, 0);
        Ok(Rc::new(self.current.finish()))
    }

    pub fn compile_program_with_locals(
        mut self,
        program: &ProgramKind,
        locals: &[String],
    ) -> Result<(Rc<CompiledSequence>, Vec<String>), CompileError> {
        for name in locals {
            self.current.add_local(name)?;
        }
        self.compile_body(&program.statements, true)?;
        self.emit(Instruction::Return, 0);
        let names = self.current.locals.clone();
        Ok((Rc::new(self.current.finish()), names))
    }

    /// 编译语句序列。`keep` 表示最后一条语句的值要不要留在栈上，
    /// 其余语句的值一律丢弃。空序列在需要值时补一个 nil。
    pub(crate) fn compile_body(&mut self, body: &[Stmt], keep: bool) -> Result<(), CompileError> {
        if body.is_empty() {
            if keep {
                self.emit(Instruction::PushNil, 0);
            }
            return Ok(());
        }
        let last = body.len() - 1;
        for (index, statement) in body.iter().enumerate() {
            stmt::compile_stmt(self, statement, keep && index == last)?;
        }
        Ok(())
    }

    // ==================== 上下文切换 ====================

    pub(crate) fn push_context(&mut self, context: CompileContext) {
        self.enclosing.push(std::mem::replace(&mut self.current, context));
    }

    /// 结束当前上下文，恢复外层，返回编好的序列。
    pub(crate) fn pop_context(&mut self) -> Rc<CompiledSequence> {
        let parent = self
            .enclosing
            .pop()
            .unwrap_or_else(|| CompileContext::new("main", ContextKind::Main));
        let finished = std::mem::replace(&mut self.current, parent);
        Rc::new(finished.finish())
    }

    /// 从当前上下文向外解析变量。只有块上下文是透明的；
    /// 返回 (穿越层数, 槽位)。
    pub(crate) fn resolve_local(&self, name: &str) -> Option<(u8, u8)> {
        let mut depth = 0u8;
        let mut context = &self.current;
        let mut outer = self.enclosing.iter().rev();
        loop {
            if let Some(index) = context.resolve(name) {
                return Some((depth, index));
            }
            if context.kind != ContextKind::Block {
                return None;
            }
            context = outer.next()?;
            depth = depth.saturating_add(1);
        }
    }

    pub(crate) fn declare_local(&mut self, name: &str) -> Result<u8, CompileError> {
        self.current.add_local(name)
    }

    // ==================== 发射 ====================

    pub(crate) fn emit(&mut self, instruction: Instruction, line: u32) -> usize {
        self.current.sequence.emit(instruction, line)
    }

    pub(crate) fn emit_jump(&mut self, instruction: Instruction, line: u32) -> usize {
        self.current.sequence.emit_jump(instruction, line)
    }

    pub(crate) fn patch_jump(&mut self, at: usize) {
        self.current.sequence.patch_jump(at);
    }

    pub(crate) fn current_offset(&self) -> usize {
        self.current.sequence.current_offset()
    }

    pub(crate) fn add_constant(&mut self, literal: Literal) -> u16 {
        self.current.sequence.add_constant(literal)
    }

    pub(crate) fn add_string_constant(&mut self, value: &str) -> u16 {
        self.current.sequence.add_constant(Literal::Str(value.to_string()))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler::new()
    }
}

// ==================== 测试 ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::lexer::tokenize;
    use crate::compiler::parser::Parser;

    fn compile_source(source: &str) -> Rc<CompiledSequence> {
        let tokens = tokenize(source).unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        compile(&program).unwrap()
    }

    #[test]
    fn test_integer_literal_program() {
        let sequence = compile_source("42");
        assert_eq!(sequence.constants, vec![Literal::Integer(42)]);
        assert_eq!(
            sequence.instructions,
            vec![Instruction::PushConstant(0), Instruction::Return]
        );
    }

    #[test]
    fn test_statement_values_are_dropped_except_last() {
        let sequence = compile_source("1\n2");
        assert_eq!(
            sequence.instructions,
            vec![
                Instruction::PushConstant(0),
                Instruction::Pop,
                Instruction::PushConstant(1),
                Instruction::Return,
            ]
        );
    }

    #[test]
    fn test_binary_compiles_to_send() {
        let sequence = compile_source("1 + 2");
        let plus = sequence
            .constants
            .iter()
            .position(|c| *c == Literal::Str("+".to_string()))
            .unwrap() as u16;
        assert!(sequence
            .instructions
            .contains(&Instruction::Send { name: plus, argc: 1, block: None }));
    }

    #[test]
    fn test_assignment_declares_local_and_keeps_value() {
        let sequence = compile_source("a = 5");
        assert_eq!(sequence.locals_count, 1);
        assert_eq!(
            sequence.instructions,
            vec![
                Instruction::PushConstant(0),
                Instruction::SetLocal { depth: 0, index: 0 },
                Instruction::Return,
            ]
        );
    }

    #[test]
    fn test_local_read_after_assignment() {
        let sequence = compile_source("a = 5\na");
        assert!(sequence.instructions.contains(&Instruction::GetLocal { depth: 0, index: 0 }));
    }

    #[test]
    fn test_unknown_identifier_becomes_self_send() {
        let sequence = compile_source("foo");
        assert_eq!(sequence.instructions[0], Instruction::PushSelf);
        assert!(matches!(
            sequence.instructions[1],
            Instruction::Send { argc: 0, block: None, .. }
        ));
    }

    #[test]
    fn test_compile_with_locals_reuses_slots() {
        let tokens = tokenize("a + 1").unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        let (sequence, names) =
            compile_with_locals(&program, &["a".to_string()]).unwrap();
        assert_eq!(names, vec!["a".to_string()]);
        assert_eq!(sequence.instructions[0], Instruction::GetLocal { depth: 0, index: 0 });
    }

    #[test]
    fn test_compile_with_locals_reports_new_names() {
        let tokens = tokenize("b = 2").unwrap();
        let program = Parser::new(tokens).parse().unwrap();
        let (_, names) = compile_with_locals(&program, &["a".to_string()]).unwrap();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_empty_program_returns_nil() {
        let sequence = compile_source("");
        assert_eq!(sequence.instructions, vec![Instruction::PushNil, Instruction::Return]);
    }

    #[test]
    fn test_while_loop_shape() {
        let sequence = compile_source("i = 0\nwhile i < 3 do\n  i = i + 1\nend");
        // 循环条件失败后跳到补 nil 的位置
        let exit = sequence
            .instructions
            .iter()
            .find_map(|i| match i {
                Instruction::JumpIfFalse(target) => Some(*target),
                _ => None,
            })
            .unwrap();
        assert_eq!(sequence.instructions[exit as usize], Instruction::PushNil);
        // 回边跳向条件求值处
        assert!(sequence.instructions.iter().any(|i| matches!(i, Instruction::Jump(_))));
    }

    #[test]
    fn test_method_definition_nests_sequence() {
        let sequence = compile_source("def double(n)\n  n * 2\nend");
        let body = sequence.constants.iter().find_map(|c| match c {
            Literal::Sequence(body) => Some(body.clone()),
            _ => None,
        });
        let body = body.unwrap();
        assert_eq!(body.name, "double");
        assert_eq!(body.params.len(), 1);
        assert_eq!(body.locals_count, 1);
        assert_eq!(body.instructions.last(), Some(&Instruction::Return));
    }

    #[test]
    fn test_logical_and_short_circuits() {
        let sequence = compile_source("true && false");
        assert!(sequence.instructions.contains(&Instruction::Dup));
        assert!(sequence.instructions.iter().any(|i| matches!(i, Instruction::JumpIfFalse(_))));
    }

    #[test]
    fn test_negative_literal_is_folded() {
        let sequence = compile_source("-7");
        assert_eq!(sequence.constants, vec![Literal::Integer(-7)]);
        assert_eq!(
            sequence.instructions,
            vec![Instruction::PushConstant(0), Instruction::Return]
        );
    }

    #[test]
    fn test_block_sees_outer_local() {
        let sequence = compile_source("total = 0\n[1].each do |n|\n  total = total + n\nend");
        let block = sequence.constants.iter().find_map(|c| match c {
            Literal::Sequence(body) => Some(body.clone()),
            _ => None,
        });
        let block = block.unwrap();
        // total 在外层，块内读写都带一层深度
        assert!(block.instructions.contains(&Instruction::GetLocal { depth: 1, index: 0 }));
        assert!(block.instructions.contains(&Instruction::SetLocal { depth: 1, index: 0 }));
    }

    #[test]
    fn test_begin_rescue_shape() {
        let sequence = compile_source("begin\n  1 / 0\nrescue => e\n  0\nend");
        let rescue_target = sequence
            .instructions
            .iter()
            .find_map(|i| match i {
                Instruction::PushRescue(target) => Some(*target),
                _ => None,
            })
            .unwrap();
        // rescue 入口先把错误值存进局部再丢弃栈顶
        assert_eq!(
            sequence.instructions[rescue_target as usize],
            Instruction::SetLocal { depth: 0, index: 0 }
        );
        assert_eq!(
            sequence.instructions[rescue_target as usize + 1],
            Instruction::Pop
        );
        assert!(sequence.instructions.contains(&Instruction::PopRescue));
    }

    #[test]
    fn test_class_definition_emits_define_class() {
        let sequence = compile_source("class Foo\nend");
        assert!(sequence.instructions.iter().any(|i| matches!(
            i,
            Instruction::DefineClass { is_module: false, has_superclass: false, .. }
        )));
    }

    #[test]
    fn test_subclass_pushes_superclass_first() {
        let sequence = compile_source("class Bar < Foo\nend");
        let get_constant = sequence
            .instructions
            .iter()
            .position(|i| matches!(i, Instruction::GetConstant(_)))
            .unwrap();
        let define = sequence
            .instructions
            .iter()
            .position(|i| matches!(i, Instruction::DefineClass { has_superclass: true, .. }))
            .unwrap();
        assert!(get_constant < define);
    }
}
