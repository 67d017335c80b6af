//! 编译产物：指令序列
//!
//! 一段源码编译成一棵序列树：主程序是根，方法体、块体与类体
//! 作为字面量挂在父序列的常量池里。

use std::fmt;
use std::rc::Rc;

use super::Instruction;

// ==================== 字面量 ====================

/// 常量池条目。
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i64),
    Str(String),
    /// 方法体 / 块体 / 类体。
    Sequence(Rc<CompiledSequence>),
}

// ==================== 形参 ====================

/// 形参绑定方式。缺省值表达式编译进方法序言，不在这里存储。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamInfo {
    Required,
    Optional,
    Splat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamInfo,
}

impl Param {
    pub fn new(name: impl Into<String>, kind: ParamInfo) -> Self {
        Param { name: name.into(), kind }
    }
}

// ==================== 指令序列 ====================

/// 一个可执行单元：主程序、方法体、块体或类体。
///
/// `lines` 与 `instructions` 等长，记录每条指令来自的源码行，
/// 供运行期错误与反汇编定位。
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSequence {
    pub name: String,
    pub params: Vec<Param>,
    pub locals_count: usize,
    pub instructions: Vec<Instruction>,
    pub constants: Vec<Literal>,
    pub lines: Vec<u32>,
}

impl CompiledSequence {
    pub fn new(name: impl Into<String>) -> Self {
        CompiledSequence {
            name: name.into(),
            params: Vec::new(),
            locals_count: 0,
            instructions: Vec::new(),
            constants: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// 追加一条指令，返回它的下标。
    pub fn emit(&mut self, instruction: Instruction, line: u32) -> usize {
        self.instructions.push(instruction);
        self.lines.push(line);
        self.instructions.len() - 1
    }

    /// 写入常量并返回下标。整数与字符串按值去重，序列总是新增。
    pub fn add_constant(&mut self, literal: Literal) -> u16 {
        let existing = self.constants.iter().position(|candidate| match (candidate, &literal) {
            (Literal::Integer(a), Literal::Integer(b)) => a == b,
            (Literal::Str(a), Literal::Str(b)) => a == b,
            _ => false,
        });
        if let Some(index) = existing {
            return index as u16;
        }

        let index = self.constants.len();
        if index > u16::MAX as usize {
            panic!("Too many constants in one sequence");
        }
        self.constants.push(literal);
        index as u16
    }

    /// 发出待回填的跳转，返回指令下标供 patch_jump 使用。
    pub fn emit_jump(&mut self, instruction: Instruction, line: u32) -> usize {
        self.emit(instruction, line)
    }

    /// 把下标处的跳转目标改为当前指令末尾。
    pub fn patch_jump(&mut self, at: usize) {
        let target = self.instructions.len() as u32;
        self.patch_jump_to(at, target);
    }

    /// 把下标处的跳转目标改为指定位置。
    pub fn patch_jump_to(&mut self, at: usize, target: u32) {
        match &mut self.instructions[at] {
            Instruction::Jump(slot)
            | Instruction::JumpIfFalse(slot)
            | Instruction::JumpIfTrue(slot)
            | Instruction::JumpIfBound { target: slot, .. }
            | Instruction::PushRescue(slot) => *slot = target,
            other => panic!("patch_jump on non-jump instruction: {:?}", other),
        }
    }

    pub fn current_offset(&self) -> usize {
        self.instructions.len()
    }

    /// 指令对应的源码行；越界时返回 0。
    pub fn line_of(&self, index: usize) -> u32 {
        self.lines.get(index).copied().unwrap_or(0)
    }

    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| p.kind == ParamInfo::Required).count()
    }

    pub fn optional_count(&self) -> usize {
        self.params.iter().filter(|p| p.kind == ParamInfo::Optional).count()
    }

    pub fn has_splat(&self) -> bool {
        self.params.iter().any(|p| p.kind == ParamInfo::Splat)
    }

    /// 人类可读反汇编，`-p` 标志与测试用。
    pub fn disassemble(&self) -> String {
        let mut out = String::new();
        self.disassemble_into(&mut out, 0);
        out
    }

    fn disassemble_into(&self, out: &mut String, depth: usize) {
        use fmt::Write;

        let indent = "  ".repeat(depth);
        let _ = writeln!(out, "{}== {} ==", indent, self.name);
        for (index, instruction) in self.instructions.iter().enumerate() {
            let line = self.line_of(index);
            let _ = writeln!(out, "{}{:04} [{:>3}] {}", indent, index, line, self.describe(instruction));
        }
        for constant in &self.constants {
            if let Literal::Sequence(nested) = constant {
                nested.disassemble_into(out, depth + 1);
            }
        }
    }

    fn describe(&self, instruction: &Instruction) -> String {
        match instruction {
            Instruction::PushConstant(index) => {
                format!("PushConstant {} ({})", index, self.describe_constant(*index))
            }
            Instruction::Send { name, argc, block } => {
                let block_note = match block {
                    Some(index) => format!(" block={}", self.describe_constant(*index)),
                    None => String::new(),
                };
                format!("Send {} argc={}{}", self.describe_constant(*name), argc, block_note)
            }
            Instruction::GetInstanceVariable(index) | Instruction::SetInstanceVariable(index) => {
                format!("{:?} ({})", instruction, self.describe_constant(*index))
            }
            Instruction::GetConstant(index) | Instruction::SetConstant(index) => {
                format!("{:?} ({})", instruction, self.describe_constant(*index))
            }
            Instruction::DefineMethod { name, .. } | Instruction::DefineClassMethod { name, .. } => {
                format!("{:?} ({})", instruction, self.describe_constant(*name))
            }
            Instruction::DefineClass { name, .. } => {
                format!("{:?} ({})", instruction, self.describe_constant(*name))
            }
            other => format!("{:?}", other),
        }
    }

    fn describe_constant(&self, index: u16) -> String {
        match self.constants.get(index as usize) {
            Some(Literal::Integer(value)) => value.to_string(),
            Some(Literal::Str(value)) => format!("\"{}\"", value),
            Some(Literal::Sequence(sequence)) => format!("<sequence {}>", sequence.name),
            None => "<bad constant>".to_string(),
        }
    }
}

impl Default for CompiledSequence {
    fn default() -> Self {
        CompiledSequence::new("main")
    }
}

// ==================== 测试 ====================
