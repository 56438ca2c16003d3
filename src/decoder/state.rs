//! The mutable, per-call decode state threaded through every decoder stage.
//! Lives entirely on the caller's frame (spec.md §5: "per-call state ... no
//! heap allocation is required").

use crate::decoder::cursor::Cursor;
use crate::enums::{AddressWidth, InstructionEncoding, MachineMode, OpcodeMap, Register};

/// Which of `66`/`F2`/`F3` is currently the best candidate to be reinterpreted
/// as an opcode's mandatory prefix (spec.md §4.2).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MandatoryCandidate {
    None,
    OperandSize,
    Repne,
    Rep,
}

/// Decoded `REX`/`VEX`/`XOP`/`EVEX`/`MVEX` bits, canonicalized into one
/// positive-polarity cache regardless of source (spec.md §4.3).
#[derive(Copy, Clone, Debug, Default)]
pub struct VectorContext {
    pub w: u8,
    pub r: u8,
    pub x: u8,
    pub b: u8,
    /// High bit of `R` (EVEX `R'`), for 32 xmm/k registers.
    pub r2: u8,
    /// High bit of the `vvvv`/`v'` register (EVEX `V'`).
    pub v2: u8,
    pub vvvv: u8,
    /// Vector length field: VEX uses 1 bit (`L`), EVEX uses 2 (`L'L`).
    pub ll: u8,
    pub pp: u8,
    pub z: u8,
    /// EVEX/MVEX broadcast/rounding/SAE context bit.
    pub b_ctx: u8,
    pub aaa: u8,
    /// MVEX non-temporal/eviction-hint bit.
    pub e: u8,
    /// MVEX swizzle/conversion/rounding control field.
    pub sss: u8,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ModRm {
    pub md: u8,
    pub reg: u8,
    pub rm: u8,
    pub offset: u8,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sib {
    pub scale: u8,
    pub index: u8,
    pub base: u8,
    pub offset: u8,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DispInfo {
    pub value: i64,
    pub size: u8,
    pub offset: u8,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ImmInfo {
    pub value: u64,
    pub size: u8,
    pub offset: u8,
    pub is_signed: bool,
    pub is_relative: bool,
}

/// All state accumulated while decoding a single instruction.
pub struct DecodeState<'a> {
    pub cursor: Cursor<'a>,
    pub machine_mode: MachineMode,
    pub configured_address_width: AddressWidth,

    // Legacy prefixes (spec.md §4.2).
    pub lock: bool,
    pub repne: bool,
    pub rep: bool,
    pub last_segment_prefix: Option<Register>,
    pub operand_size_override: bool,
    pub address_size_override: bool,
    pub mandatory_candidate: MandatoryCandidate,
    pub rex_present: bool,
    pub rex_byte: u8,
    pub prefix_count: u8,
    /// Raw bytes of legacy prefixes (including the effective `REX`), for
    /// `RawInfo::prefixes`.
    pub prefixes: heapless_prefixes::PrefixLog,

    pub encoding: InstructionEncoding,
    pub opcode_map: OpcodeMap,
    pub opcode: u8,
    pub vec: VectorContext,

    pub modrm: Option<ModRm>,
    pub sib: Option<Sib>,
    pub disp: DispInfo,
    pub has_disp: bool,
    pub imm: [ImmInfo; 2],
    pub imm_count: u8,

    /// `ModRM`/`SIB`-resolved effective address width, set once known
    /// (spec.md §4.6).
    pub address_size: u16,
    /// Effective operand size, set once the matched definition resolves it
    /// (spec.md §4.6).
    pub operand_size: u16,
    /// Index (0/1/2) of `operand_size` into the eosz-indexed tables
    /// (16/32/64).
    pub eosz_index: usize,
    /// Index (0/1/2) of `address_size` into the easz-indexed tables.
    pub easz_index: usize,

    /// Set for the 3DNOW path: the opcode byte trailing the `ModRM`/operands
    /// that finally selects the mnemonic (spec.md §4.4).
    pub trailing_opcode: Option<u8>,
}

impl<'a> DecodeState<'a> {
    pub fn new(buffer: &'a [u8], machine_mode: MachineMode, address_width: AddressWidth) -> Self {
        DecodeState {
            cursor: Cursor::new(buffer),
            machine_mode,
            configured_address_width: address_width,
            lock: false,
            repne: false,
            rep: false,
            last_segment_prefix: None,
            operand_size_override: false,
            address_size_override: false,
            mandatory_candidate: MandatoryCandidate::None,
            rex_present: false,
            rex_byte: 0,
            prefix_count: 0,
            prefixes: heapless_prefixes::PrefixLog::new(),
            encoding: InstructionEncoding::Legacy,
            opcode_map: OpcodeMap::Default,
            opcode: 0,
            vec: VectorContext::default(),
            modrm: None,
            sib: None,
            disp: DispInfo::default(),
            has_disp: false,
            imm: [ImmInfo::default(); 2],
            imm_count: 0,
            address_size: 0,
            operand_size: 0,
            eosz_index: 0,
            easz_index: 0,
            trailing_opcode: None,
        }
    }

    pub fn rex_w(&self) -> u8 {
        if self.rex_present {
            (self.rex_byte >> 3) & 1
        } else {
            self.vec.w
        }
    }
}

/// A tiny fixed-capacity log of legacy prefix bytes; a `Vec` would violate
/// spec.md §5's no-allocation rule, and instructions are capped at 15 bytes
/// so a 15-slot array always suffices.
pub mod heapless_prefixes {
    use crate::decoder::cursor::MAX_INSTRUCTION_LENGTH;
    use crate::enums::Prefix;

    pub struct PrefixLog {
        entries: [Option<Prefix>; MAX_INSTRUCTION_LENGTH],
        len: usize,
    }

    impl PrefixLog {
        pub fn new() -> Self {
            PrefixLog {
                entries: [None; MAX_INSTRUCTION_LENGTH],
                len: 0,
            }
        }

        pub fn push(&mut self, prefix: Prefix) {
            if self.len < MAX_INSTRUCTION_LENGTH {
                self.entries[self.len] = Some(prefix);
                self.len += 1;
            }
        }

        pub fn as_slice(&self) -> &[Option<Prefix>] {
            &self.entries[..self.len]
        }
    }
}
