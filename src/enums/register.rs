//! Register names and register classes.

use core::fmt;

use super::MachineMode;

macro_rules! registers {
    ($( $variant:ident = $id:expr => $name:expr ),* $(,)?) => {
        /// A single canonical x86 register name.
        #[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        #[allow(non_camel_case_types)]
        pub enum Register {
            $( $variant = $id, )*
        }

        static REGISTER_NAMES: &[&str] = &[ $( $name ),* ];
    };
}

registers! {
    NONE = 0 => "none",

    AL = 1 => "al", CL = 2 => "cl", DL = 3 => "dl", BL = 4 => "bl",
    AH = 5 => "ah", CH = 6 => "ch", DH = 7 => "dh", BH = 8 => "bh",
    SPL = 9 => "spl", BPL = 10 => "bpl", SIL = 11 => "sil", DIL = 12 => "dil",
    R8B = 13 => "r8b", R9B = 14 => "r9b", R10B = 15 => "r10b", R11B = 16 => "r11b",
    R12B = 17 => "r12b", R13B = 18 => "r13b", R14B = 19 => "r14b", R15B = 20 => "r15b",

    AX = 21 => "ax", CX = 22 => "cx", DX = 23 => "dx", BX = 24 => "bx",
    SP = 25 => "sp", BP = 26 => "bp", SI = 27 => "si", DI = 28 => "di",
    R8W = 29 => "r8w", R9W = 30 => "r9w", R10W = 31 => "r10w", R11W = 32 => "r11w",
    R12W = 33 => "r12w", R13W = 34 => "r13w", R14W = 35 => "r14w", R15W = 36 => "r15w",

    EAX = 37 => "eax", ECX = 38 => "ecx", EDX = 39 => "edx", EBX = 40 => "ebx",
    ESP = 41 => "esp", EBP = 42 => "ebp", ESI = 43 => "esi", EDI = 44 => "edi",
    R8D = 45 => "r8d", R9D = 46 => "r9d", R10D = 47 => "r10d", R11D = 48 => "r11d",
    R12D = 49 => "r12d", R13D = 50 => "r13d", R14D = 51 => "r14d", R15D = 52 => "r15d",

    RAX = 53 => "rax", RCX = 54 => "rcx", RDX = 55 => "rdx", RBX = 56 => "rbx",
    RSP = 57 => "rsp", RBP = 58 => "rbp", RSI = 59 => "rsi", RDI = 60 => "rdi",
    R8 = 61 => "r8", R9 = 62 => "r9", R10 = 63 => "r10", R11 = 64 => "r11",
    R12 = 65 => "r12", R13 = 66 => "r13", R14 = 67 => "r14", R15 = 68 => "r15",

    ES = 69 => "es", CS = 70 => "cs", SS = 71 => "ss", DS = 72 => "ds",
    FS = 73 => "fs", GS = 74 => "gs",

    CR0 = 75 => "cr0", CR1 = 76 => "cr1", CR2 = 77 => "cr2", CR3 = 78 => "cr3",
    CR4 = 79 => "cr4", CR5 = 80 => "cr5", CR6 = 81 => "cr6", CR7 = 82 => "cr7",
    CR8 = 83 => "cr8", CR9 = 84 => "cr9", CR10 = 85 => "cr10", CR11 = 86 => "cr11",
    CR12 = 87 => "cr12", CR13 = 88 => "cr13", CR14 = 89 => "cr14", CR15 = 90 => "cr15",

    DR0 = 91 => "dr0", DR1 = 92 => "dr1", DR2 = 93 => "dr2", DR3 = 94 => "dr3",
    DR4 = 95 => "dr4", DR5 = 96 => "dr5", DR6 = 97 => "dr6", DR7 = 98 => "dr7",
    DR8 = 99 => "dr8", DR9 = 100 => "dr9", DR10 = 101 => "dr10", DR11 = 102 => "dr11",
    DR12 = 103 => "dr12", DR13 = 104 => "dr13", DR14 = 105 => "dr14", DR15 = 106 => "dr15",

    K0 = 107 => "k0", K1 = 108 => "k1", K2 = 109 => "k2", K3 = 110 => "k3",
    K4 = 111 => "k4", K5 = 112 => "k5", K6 = 113 => "k6", K7 = 114 => "k7",

    BND0 = 115 => "bnd0", BND1 = 116 => "bnd1", BND2 = 117 => "bnd2", BND3 = 118 => "bnd3",

    ST0 = 119 => "st0", ST1 = 120 => "st1", ST2 = 121 => "st2", ST3 = 122 => "st3",
    ST4 = 123 => "st4", ST5 = 124 => "st5", ST6 = 125 => "st6", ST7 = 126 => "st7",

    MM0 = 127 => "mm0", MM1 = 128 => "mm1", MM2 = 129 => "mm2", MM3 = 130 => "mm3",
    MM4 = 131 => "mm4", MM5 = 132 => "mm5", MM6 = 133 => "mm6", MM7 = 134 => "mm7",

    XMM0 = 135 => "xmm0", XMM1 = 136 => "xmm1", XMM2 = 137 => "xmm2", XMM3 = 138 => "xmm3",
    XMM4 = 139 => "xmm4", XMM5 = 140 => "xmm5", XMM6 = 141 => "xmm6", XMM7 = 142 => "xmm7",
    XMM8 = 143 => "xmm8", XMM9 = 144 => "xmm9", XMM10 = 145 => "xmm10", XMM11 = 146 => "xmm11",
    XMM12 = 147 => "xmm12", XMM13 = 148 => "xmm13", XMM14 = 149 => "xmm14", XMM15 = 150 => "xmm15",
    XMM16 = 151 => "xmm16", XMM17 = 152 => "xmm17", XMM18 = 153 => "xmm18", XMM19 = 154 => "xmm19",
    XMM20 = 155 => "xmm20", XMM21 = 156 => "xmm21", XMM22 = 157 => "xmm22", XMM23 = 158 => "xmm23",
    XMM24 = 159 => "xmm24", XMM25 = 160 => "xmm25", XMM26 = 161 => "xmm26", XMM27 = 162 => "xmm27",
    XMM28 = 163 => "xmm28", XMM29 = 164 => "xmm29", XMM30 = 165 => "xmm30", XMM31 = 166 => "xmm31",

    YMM0 = 167 => "ymm0", YMM1 = 168 => "ymm1", YMM2 = 169 => "ymm2", YMM3 = 170 => "ymm3",
    YMM4 = 171 => "ymm4", YMM5 = 172 => "ymm5", YMM6 = 173 => "ymm6", YMM7 = 174 => "ymm7",
    YMM8 = 175 => "ymm8", YMM9 = 176 => "ymm9", YMM10 = 177 => "ymm10", YMM11 = 178 => "ymm11",
    YMM12 = 179 => "ymm12", YMM13 = 180 => "ymm13", YMM14 = 181 => "ymm14", YMM15 = 182 => "ymm15",
    YMM16 = 183 => "ymm16", YMM17 = 184 => "ymm17", YMM18 = 185 => "ymm18", YMM19 = 186 => "ymm19",
    YMM20 = 187 => "ymm20", YMM21 = 188 => "ymm21", YMM22 = 189 => "ymm22", YMM23 = 190 => "ymm23",
    YMM24 = 191 => "ymm24", YMM25 = 192 => "ymm25", YMM26 = 193 => "ymm26", YMM27 = 194 => "ymm27",
    YMM28 = 195 => "ymm28", YMM29 = 196 => "ymm29", YMM30 = 197 => "ymm30", YMM31 = 198 => "ymm31",

    ZMM0 = 199 => "zmm0", ZMM1 = 200 => "zmm1", ZMM2 = 201 => "zmm2", ZMM3 = 202 => "zmm3",
    ZMM4 = 203 => "zmm4", ZMM5 = 204 => "zmm5", ZMM6 = 205 => "zmm6", ZMM7 = 206 => "zmm7",
    ZMM8 = 207 => "zmm8", ZMM9 = 208 => "zmm9", ZMM10 = 209 => "zmm10", ZMM11 = 210 => "zmm11",
    ZMM12 = 211 => "zmm12", ZMM13 = 212 => "zmm13", ZMM14 = 213 => "zmm14", ZMM15 = 214 => "zmm15",
    ZMM16 = 215 => "zmm16", ZMM17 = 216 => "zmm17", ZMM18 = 217 => "zmm18", ZMM19 = 218 => "zmm19",
    ZMM20 = 219 => "zmm20", ZMM21 = 220 => "zmm21", ZMM22 = 221 => "zmm22", ZMM23 = 222 => "zmm23",
    ZMM24 = 223 => "zmm24", ZMM25 = 224 => "zmm25", ZMM26 = 225 => "zmm26", ZMM27 = 226 => "zmm27",
    ZMM28 = 227 => "zmm28", ZMM29 = 228 => "zmm29", ZMM30 = 229 => "zmm30", ZMM31 = 230 => "zmm31",

    IP = 231 => "ip", EIP = 232 => "eip", RIP = 233 => "rip",
}

/// The class (kind + width, independent of a specific id) a [`Register`]
/// belongs to.
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum RegisterClass {
    Invalid,
    Gpr8,
    Gpr16,
    Gpr32,
    Gpr64,
    Segment,
    Control,
    Debug,
    Mask,
    Bound,
    X87,
    Mmx,
    Xmm,
    Ymm,
    Zmm,
    InstructionPointer,
}

impl RegisterClass {
    /// Returns the width of this register class, in bits, under the given
    /// machine mode (only [`RegisterClass::InstructionPointer`] varies by
    /// mode).
    pub fn width(self, mode: MachineMode) -> u16 {
        match self {
            RegisterClass::Invalid => 0,
            RegisterClass::Gpr8 => 8,
            RegisterClass::Gpr16 => 16,
            RegisterClass::Gpr32 => 32,
            RegisterClass::Gpr64 => 64,
            RegisterClass::Segment => 16,
            RegisterClass::Control | RegisterClass::Debug => match mode {
                MachineMode::Long64 => 64,
                _ => 32,
            },
            RegisterClass::Mask => 64,
            RegisterClass::Bound => 128,
            RegisterClass::X87 => 80,
            RegisterClass::Mmx => 64,
            RegisterClass::Xmm => 128,
            RegisterClass::Ymm => 256,
            RegisterClass::Zmm => 512,
            RegisterClass::InstructionPointer => match mode {
                MachineMode::Long16 => 16,
                MachineMode::Long32 => 32,
                MachineMode::Long64 => 64,
            },
        }
    }

    fn base(self) -> Register {
        use Register::*;
        match self {
            RegisterClass::Gpr8 => AL,
            RegisterClass::Gpr16 => AX,
            RegisterClass::Gpr32 => EAX,
            RegisterClass::Gpr64 => RAX,
            RegisterClass::Segment => ES,
            RegisterClass::Control => CR0,
            RegisterClass::Debug => DR0,
            RegisterClass::Mask => K0,
            RegisterClass::Bound => BND0,
            RegisterClass::X87 => ST0,
            RegisterClass::Mmx => MM0,
            RegisterClass::Xmm => XMM0,
            RegisterClass::Ymm => YMM0,
            RegisterClass::Zmm => ZMM0,
            RegisterClass::InstructionPointer | RegisterClass::Invalid => NONE,
        }
    }

    /// Returns the register of this class with the given id, using the
    /// no-`REX` `GPR8` numbering (`AH`/`CH`/`DH`/`BH` at ids 4..=7). For
    /// `REX`-aware `GPR8` resolution, see [`Register::gpr8`].
    pub fn encode(self, id: u8) -> Register {
        let mask: u8 = match self {
            RegisterClass::Segment => {
                return from_id(Register::ES, id % 6);
            }
            RegisterClass::Gpr8
            | RegisterClass::Gpr16
            | RegisterClass::Gpr32
            | RegisterClass::Gpr64
            | RegisterClass::Control
            | RegisterClass::Debug => 0xF,
            RegisterClass::Mask | RegisterClass::X87 | RegisterClass::Mmx => 0x7,
            RegisterClass::Bound => 0x3,
            RegisterClass::Xmm | RegisterClass::Ymm | RegisterClass::Zmm => 0x1F,
            RegisterClass::InstructionPointer | RegisterClass::Invalid => return Register::NONE,
        };
        from_id(self.base(), id & mask)
    }
}

fn from_id(base: Register, offset: u8) -> Register {
    let id = base as u16 + offset as u16;
    // SAFETY: every class `encode`/`gpr8` dispatches to was laid out as a
    // contiguous discriminant run starting at `base`, and the caller masks
    // `offset` to that run's width before calling.
    unsafe { core::mem::transmute::<u16, Register>(id) }
}

impl Register {
    /// Resolves a `GPR8` register, honoring the `REX`-present remapping:
    /// without `REX`, ids 4..=7 are `AH`/`CH`/`DH`/`BH`; with `REX` present,
    /// the same ids are `SPL`/`BPL`/`SIL`/`DIL`.
    pub fn gpr8(id: u8, rex_present: bool) -> Register {
        use Register::*;
        if rex_present {
            [AL, CL, DL, BL, SPL, BPL, SIL, DIL, R8B, R9B, R10B, R11B, R12B, R13B, R14B, R15B]
                [id as usize & 0xF]
        } else {
            RegisterClass::Gpr8.encode(id & 0x7)
        }
    }

    /// Returns the id of this register within its class (`0` for
    /// [`Register::NONE`]).
    pub fn id(self) -> u8 {
        use Register::*;
        match self {
            AH => 4,
            CH => 5,
            DH => 6,
            BH => 7,
            _ => (self as u16 - self.class().base() as u16) as u8,
        }
    }

    /// Returns the register class this register belongs to.
    pub fn class(self) -> RegisterClass {
        use Register::*;
        let id = self as u16;
        macro_rules! in_range {
            ($lo:expr, $hi:expr) => {
                id >= ($lo as u16) && id <= ($hi as u16)
            };
        }
        match self {
            NONE => RegisterClass::Invalid,
            _ if in_range!(AL, R15B) => RegisterClass::Gpr8,
            _ if in_range!(AX, R15W) => RegisterClass::Gpr16,
            _ if in_range!(EAX, R15D) => RegisterClass::Gpr32,
            _ if in_range!(RAX, R15) => RegisterClass::Gpr64,
            _ if in_range!(ES, GS) => RegisterClass::Segment,
            _ if in_range!(CR0, CR15) => RegisterClass::Control,
            _ if in_range!(DR0, DR15) => RegisterClass::Debug,
            _ if in_range!(K0, K7) => RegisterClass::Mask,
            _ if in_range!(BND0, BND3) => RegisterClass::Bound,
            _ if in_range!(ST0, ST7) => RegisterClass::X87,
            _ if in_range!(MM0, MM7) => RegisterClass::Mmx,
            _ if in_range!(XMM0, XMM31) => RegisterClass::Xmm,
            _ if in_range!(YMM0, YMM31) => RegisterClass::Ymm,
            _ if in_range!(ZMM0, ZMM31) => RegisterClass::Zmm,
            _ if in_range!(IP, RIP) => RegisterClass::InstructionPointer,
            _ => RegisterClass::Invalid,
        }
    }

    /// Returns the width of this register, in bits, under the given machine
    /// mode.
    pub fn width(self, mode: MachineMode) -> u16 {
        self.class().width(mode)
    }

    /// Returns the largest enclosing register of `self` under the given
    /// machine mode (e.g. `AX` in 64-bit mode encloses to `RAX`; in 32-bit
    /// mode it stops at `EAX`).
    pub fn get_largest_enclosing(self, mode: MachineMode) -> Register {
        match self.class() {
            RegisterClass::Gpr8 | RegisterClass::Gpr16 | RegisterClass::Gpr32 => {
                let target = if mode == MachineMode::Long64 {
                    RegisterClass::Gpr64
                } else {
                    RegisterClass::Gpr32
                };
                target.encode(self.id())
            }
            _ => self,
        }
    }

    /// Returns the textual (lowercase) representation of this register, or
    /// `None` for [`Register::NONE`].
    pub fn get_string(self) -> Option<&'static str> {
        if self == Register::NONE {
            None
        } else {
            Some(REGISTER_NAMES[self as usize])
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REGISTER_NAMES[*self as usize])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpr8_rex_remap() {
        assert_eq!(Register::gpr8(4, false), Register::AH);
        assert_eq!(Register::gpr8(4, true), Register::SPL);
        assert_eq!(Register::gpr8(12, true), Register::R12B);
    }

    #[test]
    fn class_roundtrip() {
        assert_eq!(Register::ECX.class(), RegisterClass::Gpr32);
        assert_eq!(RegisterClass::Gpr32.encode(1), Register::ECX);
        assert_eq!(Register::XMM9.id(), 9);
    }

    #[test]
    fn enclosing_widens_in_long_mode() {
        assert_eq!(
            Register::AX.get_largest_enclosing(MachineMode::Long64),
            Register::RAX
        );
        assert_eq!(
            Register::AX.get_largest_enclosing(MachineMode::Long32),
            Register::EAX
        );
    }
}
