//! 指令集定义
//!
//! 虚拟机执行的结构化指令。跳转目标一律是序列内的绝对指令下标，
//! 常量操作数是所在序列常量池的下标。

// ==================== 指令 ====================

/// 单条虚拟机指令。
///
/// 约定：
/// - `u16` 操作数指向当前序列的常量池；
/// - `Send` 的方法名与可选块体都存放在常量池中；
/// - `GetLocal`/`SetLocal` 的 `depth` 表示向外穿越的作用域层数，
///   只有块才会产生非零深度。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 压入常量池中的字面量。
    PushConstant(u16),
    PushNil,
    PushTrue,
    PushFalse,
    PushSelf,
    /// 弹出并丢弃栈顶。
    Pop,
    /// 复制栈顶。
    Dup,
    GetLocal { depth: u8, index: u8 },
    /// 写局部变量但保留栈顶值（赋值是表达式）。
    SetLocal { depth: u8, index: u8 },
    GetInstanceVariable(u16),
    SetInstanceVariable(u16),
    GetConstant(u16),
    SetConstant(u16),
    /// 弹出 n 个元素构造数组。
    NewArray(u16),
    /// 弹出 n 组键值构造哈希，键是常量池字符串。
    NewHash(u16),
    /// 弹出 end、start 构造整数区间。
    NewRange,
    Jump(u32),
    JumpIfFalse(u32),
    JumpIfTrue(u32),
    /// 实参已绑定时跳过缺省值求值。
    JumpIfBound { index: u8, target: u32 },
    /// 方法调用：栈上依次是接收者与 argc 个实参。
    Send { name: u16, argc: u8, block: Option<u16> },
    /// 调用当前帧携带的块（yield）。
    InvokeBlock { argc: u8 },
    DefineMethod { name: u16, body: u16 },
    DefineClassMethod { name: u16, body: u16 },
    DefineClass { name: u16, body: u16, is_module: bool, has_superclass: bool },
    /// 弹出模块，把它的实例方法拷贝进当前类。
    Include,
    /// 注册 rescue 目标，与 PopRescue 配对。
    PushRescue(u32),
    PopRescue,
    /// 弹出返回值并结束当前帧。
    Return,
}

impl Instruction {
    /// 返回跳转类指令的目标，供反汇编与补丁逻辑使用。
    pub fn jump_target(&self) -> Option<u32> {
        match self {
            Instruction::Jump(target)
            | Instruction::JumpIfFalse(target)
            | Instruction::JumpIfTrue(target)
            | Instruction::JumpIfBound { target, .. }
            | Instruction::PushRescue(target) => Some(*target),
            _ => None,
        }
    }
}

// ==================== 测试 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_is_copy() {
        let instruction = Instruction::Send { name: 0, argc: 2, block: Some(1) };
        let copy = instruction;
        assert_eq!(instruction, copy);
    }

    #[test]
    fn test_jump_target() {
        assert_eq!(Instruction::Jump(7).jump_target(), Some(7));
        assert_eq!(Instruction::JumpIfFalse(3).jump_target(), Some(3));
        assert_eq!(Instruction::JumpIfBound { index: 0, target: 9 }.jump_target(), Some(9));
        assert_eq!(Instruction::PushRescue(4).jump_target(), Some(4));
        assert_eq!(Instruction::Pop.jump_target(), None);
    }
}
