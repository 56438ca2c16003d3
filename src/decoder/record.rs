//! The public output record types (spec.md §3.1, §3.2): a typed,
//! already-materialized description of one decoded instruction.

use crate::decoder::state::{DispInfo, ImmInfo, ModRm, Sib};
use crate::enums::*;

/// One decoded operand slot (spec.md §3.2).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DecodedOperand {
    pub kind: OperandKind,
    pub visibility: OperandVisibility,
    pub action: OperandAction,
    /// Size in bits: element width × count for vectors, scalar width
    /// otherwise.
    pub size: u16,
    pub element_count: u16,
    pub element_size: u16,
    pub element_type: ElementType,
    pub encoding: OperandEncoding,
}

impl DecodedOperand {
    pub(crate) const NONE: DecodedOperand = DecodedOperand {
        kind: OperandKind::Unused,
        visibility: OperandVisibility::Hidden,
        action: OperandAction::empty(),
        size: 0,
        element_count: 0,
        element_size: 0,
        element_type: ElementType::Invalid,
        encoding: OperandEncoding::None,
    };
}

/// The tagged payload of a [`DecodedOperand`] (spec.md §3.2).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OperandKind {
    Unused,
    Register(Register),
    Memory(MemoryOperand),
    Pointer(PointerOperand),
    Immediate(ImmediateOperand),
}

/// A memory addressing expression (spec.md §3.2).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MemoryOperand {
    pub ty: MemoryOperandType,
    pub segment: Register,
    pub base: Register,
    pub index: Register,
    pub scale: u8,
    pub displacement: i64,
    pub has_displacement: bool,
}

/// A far-pointer (`segment:offset`) immediate.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PointerOperand {
    pub segment: u16,
    pub offset: u32,
}

/// A register-immediate or relative-immediate value.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ImmediateOperand {
    pub value: u64,
    pub is_signed: bool,
    pub is_relative: bool,
}

/// The AVX-extension sub-record (spec.md §4.8), populated only for
/// VEX/EVEX/MVEX-encoded instructions at [`Granularity::Full`].
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AvxInfo {
    pub vector_length: u16,
    pub mask_register: Register,
    pub mask_mode: MaskMode,
    pub rounding: RoundingMode,
    pub sae: bool,
    pub broadcast: BroadcastMode,
    pub swizzle: SwizzleMode,
    pub conversion: ConversionMode,
    pub compressed_disp8_scale: u16,
}

/// A fully decoded instruction (spec.md §3.1).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DecodedInstruction {
    pub mnemonic: Mnemonic,
    pub length: u8,
    pub raw_bytes: [u8; 15],
    pub machine_mode: MachineMode,
    pub operand_size: u16,
    pub address_size: u16,
    pub encoding: InstructionEncoding,
    pub opcode_map: OpcodeMap,
    pub opcode: u8,
    pub attributes: InstructionAttributes,
    pub operands: [DecodedOperand; 4],
    pub raw_prefixes: [Option<Prefix>; 15],
    pub raw_prefix_count: usize,
    pub raw_modrm: Option<ModRm>,
    pub raw_sib: Option<Sib>,
    pub raw_disp: Option<DispInfo>,
    pub raw_imm: [Option<ImmInfo>; 2],
    pub avx: Option<AvxInfo>,
    pub category: InstructionCategory,
    pub isa_set: IsaSet,
    pub isa_ext: IsaExt,
    pub branch_type: BranchType,
    pub exception_class: ExceptionClass,
}

impl DecodedInstruction {
    /// The synthetic record a non-fatal decode error carries (spec.md
    /// §4.10/§7): `length = 1`, `raw_bytes[0]` is the first byte the
    /// decoder read, and every other field is blank.
    pub(crate) fn error_stub(machine_mode: MachineMode, first_byte: u8) -> DecodedInstruction {
        let mut raw_bytes = [0u8; 15];
        raw_bytes[0] = first_byte;
        DecodedInstruction {
            mnemonic: Mnemonic::INVALID,
            length: 1,
            raw_bytes,
            machine_mode,
            operand_size: 0,
            address_size: 0,
            encoding: InstructionEncoding::Legacy,
            opcode_map: OpcodeMap::Default,
            opcode: first_byte,
            attributes: InstructionAttributes::empty(),
            operands: [DecodedOperand::NONE; 4],
            raw_prefixes: [None; 15],
            raw_prefix_count: 0,
            raw_modrm: None,
            raw_sib: None,
            raw_disp: None,
            raw_imm: [None, None],
            avx: None,
            category: InstructionCategory::Unknown,
            isa_set: IsaSet::I86,
            isa_ext: IsaExt::Base,
            branch_type: BranchType::None,
            exception_class: ExceptionClass::None,
        }
    }

    /// Computes the absolute address targeted by a `REL`/rip-relative/
    /// `MOFFS` operand at slot `operand_index`, given the address this
    /// instruction itself was decoded at (spec.md's `original_source`
    /// lineage: `ZydisCalcAbsoluteAddress`).
    pub fn calc_absolute_address(
        &self,
        instruction_pointer: u64,
        operand_index: usize,
    ) -> Option<u64> {
        self.calc_absolute_address_ex(instruction_pointer, operand_index, 0)
    }

    /// As [`Self::calc_absolute_address`], but takes an explicit runtime
    /// register value for `MOFFS`/absolute-indirect forms that this crate
    /// cannot itself observe (the base register's live content).
    pub fn calc_absolute_address_ex(
        &self,
        instruction_pointer: u64,
        operand_index: usize,
        runtime_base_value: u64,
    ) -> Option<u64> {
        let op = self.operands.get(operand_index)?;
        match op.kind {
            OperandKind::Immediate(imm) if imm.is_relative => {
                let next_ip = instruction_pointer.wrapping_add(self.length as u64);
                Some(next_ip.wrapping_add(imm.value))
            }
            OperandKind::Memory(mem) if mem.base == Register::RIP || mem.base == Register::EIP => {
                let next_ip = instruction_pointer.wrapping_add(self.length as u64);
                Some(next_ip.wrapping_add(mem.displacement as u64))
            }
            OperandKind::Memory(mem) if mem.ty == MemoryOperandType::Moffs => {
                Some(mem.displacement as u64)
            }
            OperandKind::Memory(mem) if mem.base == Register::NONE && mem.index == Register::NONE => {
                Some(mem.displacement as u64)
            }
            OperandKind::Memory(mem) => {
                Some(runtime_base_value.wrapping_add(mem.displacement as u64))
            }
            _ => None,
        }
    }
}
