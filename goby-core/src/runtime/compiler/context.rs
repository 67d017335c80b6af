//! 编译上下文与变量解析
//!
//! 每个可执行单元（主程序、方法、块、类体）在独立的上下文中
//! 编译。局部变量只是名字到槽位的映射；块上下文可以向外层
//! 继续查找，其余上下文是查找边界。

use crate::runtime::bytecode::{CompiledSequence, Instruction, Param, ParamInfo};

use super::{CompileError, Compiler};

// ==================== 上下文 ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Main,
    Method,
    Block,
    ClassBody,
}

#[derive(Debug)]
pub struct CompileContext {
    pub sequence: CompiledSequence,
    pub kind: ContextKind,
    pub locals: Vec<String>,
}

impl CompileContext {
    pub fn new(name: impl Into<String>, kind: ContextKind) -> Self {
        CompileContext { sequence: CompiledSequence::new(name), kind, locals: Vec::new() }
    }

    /// 本上下文内查找局部变量槽位。
    pub fn resolve(&self, name: &str) -> Option<u8> {
        self.locals.iter().position(|local| local == name).map(|index| index as u8)
    }

    /// 追加局部变量，返回槽位。
    pub fn add_local(&mut self, name: &str) -> Result<u8, CompileError> {
        if self.locals.len() >= 256 {
            return Err(CompileError::TooManyLocals);
        }
        self.locals.push(name.to_string());
        self.sequence.locals_count = self.locals.len();
        Ok((self.locals.len() - 1) as u8)
    }

    /// 声明形参：占一个局部槽位并登记到序列的形参表。
    pub fn add_param(&mut self, name: &str, info: ParamInfo) -> Result<u8, CompileError> {
        if self.sequence.params.len() >= 256 {
            return Err(CompileError::TooManyParameters);
        }
        let index = self.add_local(name)?;
        self.sequence.params.push(Param::new(name, info));
        Ok(index)
    }

    pub fn finish(mut self) -> CompiledSequence {
        self.sequence.locals_count = self.locals.len();
        self.sequence
    }
}

// ==================== 变量访问 ====================

/// 读取变量；解析失败时回退为向 self 发送同名无参消息。
pub(crate) fn emit_load_variable(compiler: &mut Compiler, name: &str, line: u32) {
    match compiler.resolve_local(name) {
        Some((depth, index)) => {
            compiler.emit(Instruction::GetLocal { depth, index }, line);
        }
        None => {
            let name_index = compiler.add_string_constant(name);
            compiler.emit(Instruction::PushSelf, line);
            compiler.emit(Instruction::Send { name: name_index, argc: 0, block: None }, line);
        }
    }
}

/// 写入变量；未声明时在当前上下文新建槽位。
/// 栈顶的值保留，赋值本身是表达式。
pub(crate) fn emit_store_local(
    compiler: &mut Compiler,
    name: &str,
    line: u32,
) -> Result<(), CompileError> {
    let (depth, index) = match compiler.resolve_local(name) {
        Some(found) => found,
        None => (0, compiler.declare_local(name)?),
    };
    compiler.emit(Instruction::SetLocal { depth, index }, line);
    Ok(())
}

// ==================== 测试 ====================
