//! Instruction mnemonics.
//!
//! The full Zydis-lineage table carries roughly 900 mnemonics generated from
//! the ISA reference manuals; per `spec.md` §1 that table is opaque,
//! generated data out of this crate's scope. This enum instead carries the
//! mnemonics actually reachable through [`crate::tables`]' hand-written
//! opcode tree — a representative slice of the one-byte map, the `0F` map,
//! 3DNOW, and the VEX/EVEX forms named in the decode scenarios.

use core::fmt;

macro_rules! mnemonics {
    ($( $variant:ident => $name:expr ),* $(,)?) => {
        /// Identifies the operation an instruction performs.
        #[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
        #[allow(non_camel_case_types)]
        pub enum Mnemonic {
            $( $variant, )*
        }

        impl Mnemonic {
            /// Returns the lowercase textual representation of this mnemonic.
            pub fn get_string(self) -> &'static str {
                match self {
                    $( Mnemonic::$variant => $name, )*
                }
            }
        }
    };
}

mnemonics! {
    INVALID => "invalid",
    NOP => "nop",
    PAUSE => "pause",

    MOV => "mov",
    MOVZX => "movzx",
    MOVSX => "movsx",
    MOVSXD => "movsxd",
    LEA => "lea",
    XCHG => "xchg",

    ADD => "add",
    OR => "or",
    ADC => "adc",
    SBB => "sbb",
    AND => "and",
    SUB => "sub",
    XOR => "xor",
    CMP => "cmp",
    TEST => "test",

    INC => "inc",
    DEC => "dec",
    NOT => "not",
    NEG => "neg",
    MUL => "mul",
    IMUL => "imul",
    DIV => "div",
    IDIV => "idiv",

    SHL => "shl",
    SHR => "shr",
    SAR => "sar",
    ROL => "rol",
    ROR => "ror",
    RCL => "rcl",
    RCR => "rcr",

    PUSH => "push",
    POP => "pop",
    PUSHF => "pushf",
    POPF => "popf",

    CALL => "call",
    CALL_FAR => "call far",
    RET => "ret",
    RET_FAR => "ret far",
    JMP => "jmp",
    JMP_FAR => "jmp far",

    JO => "jo",
    JNO => "jno",
    JB => "jb",
    JNB => "jnb",
    JZ => "jz",
    JNZ => "jnz",
    JBE => "jbe",
    JNBE => "jnbe",
    JS => "js",
    JNS => "jns",
    JP => "jp",
    JNP => "jnp",
    JL => "jl",
    JNL => "jnl",
    JLE => "jle",
    JNLE => "jnle",
    JCXZ => "jcxz",
    JECXZ => "jecxz",
    JRCXZ => "jrcxz",

    LOOP => "loop",
    LOOPE => "loope",
    LOOPNE => "loopne",

    INT3 => "int3",
    INT => "int",
    INTO => "into",
    IRET => "iret",
    HLT => "hlt",
    CLD => "cld",
    STD => "std",
    CLI => "cli",
    STI => "sti",
    CLC => "clc",
    STC => "stc",
    CMC => "cmc",
    WAIT => "wait",
    BOUND => "bound",
    LES => "les",
    LDS => "lds",

    CBW => "cbw",
    CWDE => "cwde",
    CDQE => "cdqe",
    CWD => "cwd",
    CDQ => "cdq",
    CQO => "cqo",
    LAHF => "lahf",
    SAHF => "sahf",

    MOVSB => "movsb",
    MOVSW => "movsw",
    MOVSD => "movsd",
    MOVSQ => "movsq",
    STOSB => "stosb",
    STOSW => "stosw",
    STOSD => "stosd",
    STOSQ => "stosq",
    LODSB => "lodsb",
    LODSW => "lodsw",
    LODSD => "lodsd",
    LODSQ => "lodsq",
    CMPSB => "cmpsb",
    SCASB => "scasb",

    IN => "in",
    OUT => "out",

    CPUID => "cpuid",
    SYSCALL => "syscall",
    SYSRET => "sysret",
    SWAPGS => "swapgs",
    RDTSC => "rdtsc",
    XGETBV => "xgetbv",

    VZEROUPPER => "vzeroupper",
    VZEROALL => "vzeroall",
    VADDPS => "vaddps",
    VMOVAPS => "vmovaps",
    VXORPS => "vxorps",

    PFRCP => "pfrcp",
    PFADD => "pfadd",
    PFSUB => "pfsub",
    PFMUL => "pfmul",

    ENDBR32 => "endbr32",
    ENDBR64 => "endbr64",
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get_string())
    }
}

impl Default for Mnemonic {
    fn default() -> Self {
        Mnemonic::INVALID
    }
}
