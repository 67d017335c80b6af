//! 序列与指令的编解码
//!
//! 指令编码为一字节操作码加定长小端操作数。字符串一律换成
//! 字符串池下标，嵌套序列换成序列表下标；序列表按后序排列，
//! 子序列总是先于引用它的父序列出现，解码因此可以单趟完成。

use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::bytecode::{CompiledSequence, Instruction, Literal, Param, ParamInfo};

use super::data::StringPool;
use super::reader::{BinaryReader, ReadError};
use super::writer::BinaryWriter;

// ==================== 操作码 ====================

pub(crate) mod opcode {
    pub const PUSH_CONSTANT: u8 = 0x01;
    pub const PUSH_NIL: u8 = 0x02;
    pub const PUSH_TRUE: u8 = 0x03;
    pub const PUSH_FALSE: u8 = 0x04;
    pub const PUSH_SELF: u8 = 0x05;
    pub const POP: u8 = 0x06;
    pub const DUP: u8 = 0x07;
    pub const GET_LOCAL: u8 = 0x08;
    pub const SET_LOCAL: u8 = 0x09;
    pub const GET_INSTANCE_VARIABLE: u8 = 0x0A;
    pub const SET_INSTANCE_VARIABLE: u8 = 0x0B;
    pub const GET_CONSTANT: u8 = 0x0C;
    pub const SET_CONSTANT: u8 = 0x0D;
    pub const NEW_ARRAY: u8 = 0x0E;
    pub const NEW_HASH: u8 = 0x0F;
    pub const NEW_RANGE: u8 = 0x10;
    pub const JUMP: u8 = 0x11;
    pub const JUMP_IF_FALSE: u8 = 0x12;
    pub const JUMP_IF_TRUE: u8 = 0x13;
    pub const JUMP_IF_BOUND: u8 = 0x14;
    pub const SEND: u8 = 0x15;
    pub const INVOKE_BLOCK: u8 = 0x16;
    pub const DEFINE_METHOD: u8 = 0x17;
    pub const DEFINE_CLASS_METHOD: u8 = 0x18;
    pub const DEFINE_CLASS: u8 = 0x19;
    pub const INCLUDE: u8 = 0x1A;
    pub const PUSH_RESCUE: u8 = 0x1B;
    pub const POP_RESCUE: u8 = 0x1C;
    pub const RETURN: u8 = 0x1D;
}

mod literal_tag {
    pub const INTEGER: u8 = 0x01;
    pub const STR: u8 = 0x02;
    pub const SEQUENCE: u8 = 0x03;
}

mod param_kind {
    pub const REQUIRED: u8 = 0x00;
    pub const OPTIONAL: u8 = 0x01;
    pub const SPLAT: u8 = 0x02;
}

// ==================== 错误 ====================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// 常量池引用了不在序列表里的序列
    UnregisteredSequence(String),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::UnregisteredSequence(name) => {
                write!(f, "Sequence '{}' referenced before registration", name)
            }
        }
    }
}

impl std::error::Error for EncodeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    Read(ReadError),
    /// 未知操作码
    BadOpcode { opcode: u8, offset: usize },
    /// 未知常量标签
    BadLiteralTag(u8),
    /// 未知形参种类
    BadParamKind(u8),
    /// 字符串池下标越界
    BadStringIndex(u32),
    /// 序列表下标越界或向前引用
    BadSequenceIndex(u32),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Read(e) => write!(f, "Read error: {}", e),
            DecodeError::BadOpcode { opcode, offset } => {
                write!(f, "Unknown opcode 0x{:02X} at offset {}", opcode, offset)
            }
            DecodeError::BadLiteralTag(tag) => write!(f, "Unknown literal tag 0x{:02X}", tag),
            DecodeError::BadParamKind(kind) => write!(f, "Unknown parameter kind 0x{:02X}", kind),
            DecodeError::BadStringIndex(idx) => write!(f, "String pool index {} out of range", idx),
            DecodeError::BadSequenceIndex(idx) => {
                write!(f, "Sequence index {} out of range", idx)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Read(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ReadError> for DecodeError {
    fn from(e: ReadError) -> Self {
        DecodeError::Read(e)
    }
}

// ==================== 序列收集 ====================

/// 后序收集序列树里的全部序列并编号。子序列的下标一定小于
/// 父序列，同一个 Rc 只收集一次。
pub fn collect_sequences(
    main: &Rc<CompiledSequence>,
) -> (Vec<Rc<CompiledSequence>>, HashMap<usize, u32>) {
    let mut ordered = Vec::new();
    let mut index = HashMap::new();
    collect_into(main, &mut ordered, &mut index);
    (ordered, index)
}

fn collect_into(
    sequence: &Rc<CompiledSequence>,
    ordered: &mut Vec<Rc<CompiledSequence>>,
    index: &mut HashMap<usize, u32>,
) {
    let key = Rc::as_ptr(sequence) as usize;
    if index.contains_key(&key) {
        return;
    }
    for constant in &sequence.constants {
        if let Literal::Sequence(child) = constant {
            collect_into(child, ordered, index);
        }
    }
    index.insert(key, ordered.len() as u32);
    ordered.push(sequence.clone());
}

// ==================== 编码 ====================

pub struct EncodeContext<'a> {
    pub pool: &'a mut StringPool,
    /// Rc 指针到序列表下标的映射
    pub sequence_index: &'a HashMap<usize, u32>,
}

/// 编码一个序列（不含行号表，行号在 DebugInfo section 单独存）。
pub fn encode_sequence(
    sequence: &CompiledSequence,
    ctx: &mut EncodeContext<'_>,
    out: &mut BinaryWriter,
) -> Result<(), EncodeError> {
    out.write_u32(ctx.pool.add(&sequence.name));

    out.write_u16(sequence.params.len() as u16);
    for param in &sequence.params {
        let kind = match param.kind {
            ParamInfo::Required => param_kind::REQUIRED,
            ParamInfo::Optional => param_kind::OPTIONAL,
            ParamInfo::Splat => param_kind::SPLAT,
        };
        out.write_u8(kind);
        out.write_u32(ctx.pool.add(&param.name));
    }

    out.write_u16(sequence.locals_count as u16);

    out.write_u16(sequence.constants.len() as u16);
    for constant in &sequence.constants {
        match constant {
            Literal::Integer(value) => {
                out.write_u8(literal_tag::INTEGER);
                out.write_i64(*value);
            }
            Literal::Str(value) => {
                out.write_u8(literal_tag::STR);
                out.write_u32(ctx.pool.add(value));
            }
            Literal::Sequence(child) => {
                let key = Rc::as_ptr(child) as usize;
                let index = ctx
                    .sequence_index
                    .get(&key)
                    .copied()
                    .ok_or_else(|| EncodeError::UnregisteredSequence(child.name.clone()))?;
                out.write_u8(literal_tag::SEQUENCE);
                out.write_u32(index);
            }
        }
    }

    out.write_u32(sequence.instructions.len() as u32);
    for instruction in &sequence.instructions {
        encode_instruction(instruction, out);
    }
    Ok(())
}

fn encode_instruction(instruction: &Instruction, out: &mut BinaryWriter) {
    match instruction {
        Instruction::PushConstant(index) => {
            out.write_u8(opcode::PUSH_CONSTANT);
            out.write_u16(*index);
        }
        Instruction::PushNil => out.write_u8(opcode::PUSH_NIL),
        Instruction::PushTrue => out.write_u8(opcode::PUSH_TRUE),
        Instruction::PushFalse => out.write_u8(opcode::PUSH_FALSE),
        Instruction::PushSelf => out.write_u8(opcode::PUSH_SELF),
        Instruction::Pop => out.write_u8(opcode::POP),
        Instruction::Dup => out.write_u8(opcode::DUP),
        Instruction::GetLocal { depth, index } => {
            out.write_u8(opcode::GET_LOCAL);
            out.write_u8(*depth);
            out.write_u8(*index);
        }
        Instruction::SetLocal { depth, index } => {
            out.write_u8(opcode::SET_LOCAL);
            out.write_u8(*depth);
            out.write_u8(*index);
        }
        Instruction::GetInstanceVariable(index) => {
            out.write_u8(opcode::GET_INSTANCE_VARIABLE);
            out.write_u16(*index);
        }
        Instruction::SetInstanceVariable(index) => {
            out.write_u8(opcode::SET_INSTANCE_VARIABLE);
            out.write_u16(*index);
        }
        Instruction::GetConstant(index) => {
            out.write_u8(opcode::GET_CONSTANT);
            out.write_u16(*index);
        }
        Instruction::SetConstant(index) => {
            out.write_u8(opcode::SET_CONSTANT);
            out.write_u16(*index);
        }
        Instruction::NewArray(count) => {
            out.write_u8(opcode::NEW_ARRAY);
            out.write_u16(*count);
        }
        Instruction::NewHash(count) => {
            out.write_u8(opcode::NEW_HASH);
            out.write_u16(*count);
        }
        Instruction::NewRange => out.write_u8(opcode::NEW_RANGE),
        Instruction::Jump(target) => {
            out.write_u8(opcode::JUMP);
            out.write_u32(*target);
        }
        Instruction::JumpIfFalse(target) => {
            out.write_u8(opcode::JUMP_IF_FALSE);
            out.write_u32(*target);
        }
        Instruction::JumpIfTrue(target) => {
            out.write_u8(opcode::JUMP_IF_TRUE);
            out.write_u32(*target);
        }
        Instruction::JumpIfBound { index, target } => {
            out.write_u8(opcode::JUMP_IF_BOUND);
            out.write_u8(*index);
            out.write_u32(*target);
        }
        Instruction::Send { name, argc, block } => {
            out.write_u8(opcode::SEND);
            out.write_u16(*name);
            out.write_u8(*argc);
            match block {
                Some(body) => {
                    out.write_u8(1);
                    out.write_u16(*body);
                }
                None => {
                    out.write_u8(0);
                    out.write_u16(0);
                }
            }
        }
        Instruction::InvokeBlock { argc } => {
            out.write_u8(opcode::INVOKE_BLOCK);
            out.write_u8(*argc);
        }
        Instruction::DefineMethod { name, body } => {
            out.write_u8(opcode::DEFINE_METHOD);
            out.write_u16(*name);
            out.write_u16(*body);
        }
        Instruction::DefineClassMethod { name, body } => {
            out.write_u8(opcode::DEFINE_CLASS_METHOD);
            out.write_u16(*name);
            out.write_u16(*body);
        }
        Instruction::DefineClass { name, body, is_module, has_superclass } => {
            out.write_u8(opcode::DEFINE_CLASS);
            out.write_u16(*name);
            out.write_u16(*body);
            out.write_u8(u8::from(*is_module));
            out.write_u8(u8::from(*has_superclass));
        }
        Instruction::Include => out.write_u8(opcode::INCLUDE),
        Instruction::PushRescue(target) => {
            out.write_u8(opcode::PUSH_RESCUE);
            out.write_u32(*target);
        }
        Instruction::PopRescue => out.write_u8(opcode::POP_RESCUE),
        Instruction::Return => out.write_u8(opcode::RETURN),
    }
}

// ==================== 解码 ====================

pub struct DecodeContext<'a> {
    pub pool: &'a StringPool,
    /// 已经解码完成的序列，供嵌套序列常量引用
    pub sequences: &'a [Rc<CompiledSequence>],
}

/// 解码一个序列。行号表留空，由调用方从 DebugInfo 补上。
pub fn decode_sequence(
    reader: &mut BinaryReader<'_>,
    ctx: &DecodeContext<'_>,
) -> Result<CompiledSequence, DecodeError> {
    let name = pooled_string(ctx, reader.read_u32()?)?;
    let mut sequence = CompiledSequence::new(name);

    let param_count = reader.read_u16()?;
    for _ in 0..param_count {
        let kind = match reader.read_u8()? {
            param_kind::REQUIRED => ParamInfo::Required,
            param_kind::OPTIONAL => ParamInfo::Optional,
            param_kind::SPLAT => ParamInfo::Splat,
            other => return Err(DecodeError::BadParamKind(other)),
        };
        let name = pooled_string(ctx, reader.read_u32()?)?;
        sequence.params.push(Param::new(name, kind));
    }

    sequence.locals_count = reader.read_u16()? as usize;

    let constant_count = reader.read_u16()?;
    for _ in 0..constant_count {
        let literal = match reader.read_u8()? {
            literal_tag::INTEGER => Literal::Integer(reader.read_i64()?),
            literal_tag::STR => Literal::Str(pooled_string(ctx, reader.read_u32()?)?),
            literal_tag::SEQUENCE => {
                let index = reader.read_u32()?;
                let child = ctx
                    .sequences
                    .get(index as usize)
                    .cloned()
                    .ok_or(DecodeError::BadSequenceIndex(index))?;
                Literal::Sequence(child)
            }
            other => return Err(DecodeError::BadLiteralTag(other)),
        };
        sequence.constants.push(literal);
    }

    let instruction_count = reader.read_u32()?;
    for _ in 0..instruction_count {
        sequence.instructions.push(decode_instruction(reader)?);
    }
    Ok(sequence)
}

fn pooled_string(ctx: &DecodeContext<'_>, index: u32) -> Result<String, DecodeError> {
    ctx.pool
        .get(index)
        .map(str::to_string)
        .ok_or(DecodeError::BadStringIndex(index))
}

fn decode_instruction(reader: &mut BinaryReader<'_>) -> Result<Instruction, DecodeError> {
    let offset = reader.position();
    let instruction = match reader.read_u8()? {
        opcode::PUSH_CONSTANT => Instruction::PushConstant(reader.read_u16()?),
        opcode::PUSH_NIL => Instruction::PushNil,
        opcode::PUSH_TRUE => Instruction::PushTrue,
        opcode::PUSH_FALSE => Instruction::PushFalse,
        opcode::PUSH_SELF => Instruction::PushSelf,
        opcode::POP => Instruction::Pop,
        opcode::DUP => Instruction::Dup,
        opcode::GET_LOCAL => {
            Instruction::GetLocal { depth: reader.read_u8()?, index: reader.read_u8()? }
        }
        opcode::SET_LOCAL => {
            Instruction::SetLocal { depth: reader.read_u8()?, index: reader.read_u8()? }
        }
        opcode::GET_INSTANCE_VARIABLE => Instruction::GetInstanceVariable(reader.read_u16()?),
        opcode::SET_INSTANCE_VARIABLE => Instruction::SetInstanceVariable(reader.read_u16()?),
        opcode::GET_CONSTANT => Instruction::GetConstant(reader.read_u16()?),
        opcode::SET_CONSTANT => Instruction::SetConstant(reader.read_u16()?),
        opcode::NEW_ARRAY => Instruction::NewArray(reader.read_u16()?),
        opcode::NEW_HASH => Instruction::NewHash(reader.read_u16()?),
        opcode::NEW_RANGE => Instruction::NewRange,
        opcode::JUMP => Instruction::Jump(reader.read_u32()?),
        opcode::JUMP_IF_FALSE => Instruction::JumpIfFalse(reader.read_u32()?),
        opcode::JUMP_IF_TRUE => Instruction::JumpIfTrue(reader.read_u32()?),
        opcode::JUMP_IF_BOUND => {
            Instruction::JumpIfBound { index: reader.read_u8()?, target: reader.read_u32()? }
        }
        opcode::SEND => {
            let name = reader.read_u16()?;
            let argc = reader.read_u8()?;
            let has_block = reader.read_u8()? != 0;
            let body = reader.read_u16()?;
            Instruction::Send { name, argc, block: if has_block { Some(body) } else { None } }
        }
        opcode::INVOKE_BLOCK => Instruction::InvokeBlock { argc: reader.read_u8()? },
        opcode::DEFINE_METHOD => {
            Instruction::DefineMethod { name: reader.read_u16()?, body: reader.read_u16()? }
        }
        opcode::DEFINE_CLASS_METHOD => {
            Instruction::DefineClassMethod { name: reader.read_u16()?, body: reader.read_u16()? }
        }
        opcode::DEFINE_CLASS => Instruction::DefineClass {
            name: reader.read_u16()?,
            body: reader.read_u16()?,
            is_module: reader.read_u8()? != 0,
            has_superclass: reader.read_u8()? != 0,
        },
        opcode::INCLUDE => Instruction::Include,
        opcode::PUSH_RESCUE => Instruction::PushRescue(reader.read_u32()?),
        opcode::POP_RESCUE => Instruction::PopRescue,
        opcode::RETURN => Instruction::Return,
        other => return Err(DecodeError::BadOpcode { opcode: other, offset }),
    };
    Ok(instruction)
}
