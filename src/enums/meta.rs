//! Metadata-only enums attached to instruction definitions (§3.3): these
//! never drive a decode decision, they only describe the matched
//! instruction for downstream consumers (formatter, static analysis).

/// The broad functional category an instruction belongs to.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(non_camel_case_types)]
pub enum InstructionCategory {
    Unknown,
    DataTransfer,
    BinaryArithmetic,
    Logical,
    ShiftRotate,
    BitByte,
    ControlTransfer,
    StringOp,
    IoInstruction,
    FlagControl,
    SegmentRegister,
    Misc,
    System,
    Avx,
    ThreeDNow,
}

/// The ISA extension an instruction was introduced by.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(non_camel_case_types)]
pub enum IsaExt {
    Base,
    X87,
    Mmx,
    ThreeDNow,
    Sse,
    Sse2,
    Avx,
    Avx2,
    Avx512f,
    Long,
}

/// The ISA set (CPUID feature group) an instruction belongs to.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(non_camel_case_types)]
pub enum IsaSet {
    I86,
    I386,
    Amd64,
    Mmx,
    ThreeDNow,
    Sse,
    Sse2,
    Avx,
    Avx2,
    Avx512f,
}

/// Whether, and how, an instruction transfers control flow.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(non_camel_case_types)]
pub enum BranchType {
    None,
    Short,
    Near,
    Far,
}

/// The exception class used to group fault behavior for SIMD instructions.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(non_camel_case_types)]
pub enum ExceptionClass {
    None,
    Gp,
    Sse,
    Avx,
    Evex,
}

/// A single `FLAGS`/`EFLAGS`/`RFLAGS` bit an instruction may read or write.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(non_camel_case_types)]
pub enum CpuFlag {
    CF,
    PF,
    AF,
    ZF,
    SF,
    TF,
    IF,
    DF,
    OF,
}

/// A single x87 FPU status-word flag an instruction may read or write.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[allow(non_camel_case_types)]
pub enum FpuFlag {
    C0,
    C1,
    C2,
    C3,
}

/// Per-flag access behavior recorded for a group of flags of type
/// `FlagType` (either [`CpuFlag`] or [`FpuFlag`]).
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AccessedFlags<FlagType: 'static> {
    /// Flags that may be read (tested) by the instruction.
    pub tested: &'static [FlagType],
    /// Flags that may be modified according to the result.
    pub modified: &'static [FlagType],
    /// Flags that the instruction unconditionally clears.
    pub set_0: &'static [FlagType],
    /// Flags that the instruction unconditionally sets.
    pub set_1: &'static [FlagType],
    /// Flags with CPU-model-specific or otherwise undefined behavior.
    pub undefined: &'static [FlagType],
}
