//! Enum and bitflag definitions shared by the decoder and its public
//! records.
#![allow(non_camel_case_types)]

use bitflags::bitflags;

mod meta;
mod mnemonic;
mod register;

pub use meta::*;
pub use mnemonic::Mnemonic;
pub use register::{Register, RegisterClass};

/// The processor execution mode the decoder targets (spec.md §6.1).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MachineMode {
    /// 16-bit real/virtual-8086 mode.
    Long16,
    /// 32-bit protected mode, or 64-bit long mode's compatibility submode.
    Long32,
    /// 64-bit long mode.
    Long64,
}

/// The stack/address width used by `MOFFS` and default-addressing
/// calculations; forced to [`AddressWidth::Width64`] in 64-bit mode
/// (spec.md §6.1).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AddressWidth {
    Width16,
    Width32,
    Width64,
}

impl AddressWidth {
    pub fn bits(self) -> u16 {
        match self {
            AddressWidth::Width16 => 16,
            AddressWidth::Width32 => 32,
            AddressWidth::Width64 => 64,
        }
    }
}

/// How much of the [`crate::decoder::DecodedInstruction`] record a decode
/// call is required to populate (spec.md §6.1).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Granularity {
    /// Only mnemonic, length, operand widths, and encoding class are
    /// guaranteed.
    Minimal,
    /// The entire record, including operands and AVX info, is populated.
    Full,
}

bitflags! {
    /// Optional decoder behaviors toggled via [`crate::Decoder::enable_mode`].
    #[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct DecoderMode: u32 {
        /// Suppress `avx` and CPU/FPU-flags population even at
        /// [`Granularity::Full`], for callers that only need mnemonic and
        /// length on a fast sweep.
        const MINIMAL = 1 << 0;
    }
}

/// The prefix/escape encoding family an instruction was decoded through
/// (spec.md §3.1).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum InstructionEncoding {
    Legacy,
    ThreeDNow,
    Xop,
    Vex,
    Evex,
    Mvex,
}

/// The opcode map a (post-escape) opcode byte is drawn from (spec.md §3.1).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OpcodeMap {
    Default,
    Map0F,
    Map0F38,
    Map0F3A,
    Map0F0F,
    MapXop8,
    MapXop9,
    MapXopA,
}

/// Which byte(s) of the instruction a prefix occupies.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrefixType {
    Rex,
    Segment,
    OperandSize,
    AddressSize,
    Lock,
    Rep,
    Repne,
}

/// A single legacy/`REX` prefix byte, as recorded in
/// [`crate::decoder::RawInfo::prefixes`].
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Prefix {
    pub ty: PrefixType,
    pub value: u8,
}

/// Where in the instruction an operand's register/memory/immediate id was
/// sourced from (spec.md §3.2).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OperandEncoding {
    None,
    ModrmReg,
    ModrmRm,
    OpcodeEmbedded,
    Ndsndd,
    MaskAaa,
    Is4,
    Imm0,
    Imm1,
}

/// Whether an operand is written into the assembly mnemonic, implied by the
/// opcode without being written, or never surfaced to the caller at all.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OperandVisibility {
    Explicit,
    Implicit,
    Hidden,
}

/// The semantic type an operand slot in an [`crate::tables::OperandDef`]
/// resolves to.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OperandType {
    Unused,
    Gpr8,
    Gpr16,
    Gpr32,
    Gpr64,
    Gpr16_32_64,
    Fpr,
    Mmx,
    Xmm,
    Ymm,
    Zmm,
    Bnd,
    Cr,
    Dr,
    Sreg,
    Mask,
    Mem,
    MemVsibX,
    MemVsibY,
    MemVsibZ,
    Ptr,
    Agen,
    Moffs,
    Imm,
    Rel,
    /// A fixed, implied register (e.g. `AL`, `DX`, `ST0`).
    FixedReg(Register),
}

/// The element type of a vector operand (spec.md §3.2).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ElementType {
    Invalid,
    Int,
    Uint,
    Float16,
    Float32,
    Float64,
    Float80,
    LongBcd,
    Cc,
    Struct,
}

/// The flavor of memory addressing a `MEM`-kind operand uses.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MemoryOperandType {
    Mem,
    Agen,
    Moffs,
    VsibX,
    VsibY,
    VsibZ,
}

/// `EVEX`/`MVEX` masking mode (spec.md §4.8).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MaskMode {
    Disabled,
    Merge,
    Zero,
}

/// `EVEX` broadcast mode (spec.md §4.8).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BroadcastMode {
    None,
    OneTo2,
    OneTo4,
    OneTo8,
    OneTo16,
}

/// `EVEX` rounding-control mode (spec.md §4.8).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RoundingMode {
    Default,
    RnSae,
    RdSae,
    RuSae,
    RzSae,
}

/// `MVEX` register-swizzle mode.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SwizzleMode {
    None,
    Cdab,
    Badc,
    Dacb,
    Aaaa,
    Bbbb,
    Cccc,
    Dddd,
}

/// `MVEX` data-conversion mode.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ConversionMode {
    None,
    Float16,
    Uint8,
    Sint8,
    Uint16,
    Sint16,
}

/// `EVEX` tuple type: determines the compressed-disp8 scale factor (spec.md
/// §4.8, GLOSSARY).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TupleType {
    None,
    Fv,
    Hv,
    Fvm,
    T1s,
    T1f,
    Gscat,
    T2,
    T4,
    T8,
    Hvm,
    Qvm,
    Ovm,
    M128,
    Dup,
}

/// What additional semantics an `EVEX`/`MVEX` encoding applies on top of
/// normal masking (spec.md §4.8).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum EvexFunctionality {
    Normal,
    Broadcast,
    RoundingControl,
    Sae,
}

bitflags! {
    /// Per-operand access mode, matching the quadrant lattice spec.md §3.2
    /// and §8 (property 5) require: every operand's action is one of these
    /// ten values, never an "illegal quadrant".
    #[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct OperandAction: u8 {
        const READ             = 1;
        const WRITE            = 2;
        const CONDREAD         = 4;
        const CONDWRITE        = 8;
        const READWRITE        = Self::READ.bits() | Self::WRITE.bits();
        const CONDREAD_WRITE   = Self::CONDREAD.bits() | Self::WRITE.bits();
        const READ_CONDWRITE   = Self::READ.bits() | Self::CONDWRITE.bits();
        const CONDREAD_CONDWRITE = Self::CONDREAD.bits() | Self::CONDWRITE.bits();
    }
}

bitflags! {
    /// Attributes describing the prefixes present on, and accepted by, a
    /// decoded instruction (spec.md §4.9).
    #[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
    #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
    pub struct InstructionAttributes: u64 {
        const HAS_MODRM                = 1 << 0;
        const HAS_SIB                  = 1 << 1;
        const HAS_REX                  = 1 << 2;
        const HAS_XOP                  = 1 << 3;
        const HAS_VEX                  = 1 << 4;
        const HAS_EVEX                 = 1 << 5;
        const HAS_MVEX                 = 1 << 6;
        const IS_RELATIVE              = 1 << 7;
        const ACCEPTS_LOCK             = 1 << 8;
        const ACCEPTS_REP              = 1 << 9;
        const ACCEPTS_REPE             = 1 << 10;
        const ACCEPTS_REPNE            = 1 << 11;
        const ACCEPTS_BND              = 1 << 12;
        const ACCEPTS_XACQUIRE         = 1 << 13;
        const ACCEPTS_XRELEASE         = 1 << 14;
        const ACCEPTS_HLE_WITHOUT_LOCK = 1 << 15;
        const ACCEPTS_BRANCH_HINTS     = 1 << 16;
        const ACCEPTS_SEGMENT          = 1 << 17;
        const HAS_LOCK                 = 1 << 18;
        const HAS_REP                  = 1 << 19;
        const HAS_REPE                 = 1 << 20;
        const HAS_REPNE                = 1 << 21;
        const HAS_BND                  = 1 << 22;
        const HAS_XACQUIRE             = 1 << 23;
        const HAS_XRELEASE             = 1 << 24;
        const HAS_BRANCH_NOT_TAKEN     = 1 << 25;
        const HAS_BRANCH_TAKEN         = 1 << 26;
        const HAS_SEGMENT_CS           = 1 << 27;
        const HAS_SEGMENT_SS           = 1 << 28;
        const HAS_SEGMENT_DS           = 1 << 29;
        const HAS_SEGMENT_ES           = 1 << 30;
        const HAS_SEGMENT_FS           = 1 << 31;
        const HAS_SEGMENT_GS           = 1 << 32;
        const HAS_OPERANDSIZE          = 1 << 33;
        const HAS_ADDRESSSIZE          = 1 << 34;
        const HAS_SEGMENT =
              Self::HAS_SEGMENT_CS.bits()
            | Self::HAS_SEGMENT_SS.bits()
            | Self::HAS_SEGMENT_DS.bits()
            | Self::HAS_SEGMENT_ES.bits()
            | Self::HAS_SEGMENT_FS.bits()
            | Self::HAS_SEGMENT_GS.bits();
    }
}
