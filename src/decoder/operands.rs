//! The operand materializer (spec.md §4.7): turns a matched definition's
//! operand-def templates into concrete [`DecodedOperand`]s against the
//! current decode state.

use crate::decoder::modrm::ensure_modrm;
use crate::decoder::record::{
    AvxInfo, DecodedOperand, ImmediateOperand, MemoryOperand, OperandKind, PointerOperand,
};
use crate::decoder::state::DecodeState;
use crate::enums::{
    InstructionEncoding, MemoryOperandType, OperandEncoding, OperandType, Register, RegisterClass,
};
use crate::status::{Result, Status};
use crate::tables::{InstructionDef, OperandDef};

/// Materializes all four operand slots of `def` against `state`, consuming
/// any remaining immediate bytes from the cursor as it goes.
pub fn materialize(
    state: &mut DecodeState,
    def: &InstructionDef,
    avx: Option<&AvxInfo>,
) -> Result<[DecodedOperand; 4]> {
    let mut out = [DecodedOperand::NONE; 4];
    for (slot, opdef) in out.iter_mut().zip(def.operands.iter()) {
        if opdef.ty == OperandType::Unused {
            break;
        }
        *slot = materialize_one(state, def, opdef, avx)?;
    }
    Ok(out)
}

fn materialize_one(
    state: &mut DecodeState,
    def: &InstructionDef,
    opdef: &OperandDef,
    avx: Option<&AvxInfo>,
) -> Result<DecodedOperand> {
    let size = opdef.size[state.eosz_index];

    // An `r/m`-encoded register-family operand is only actually a register
    // when `ModRM.mod == 3`; otherwise `ModRM.rm` plus any `SIB`/disp
    // selects a memory operand instead (spec.md §4.7 step 2's "register
    // form" caveat generalizes to every `MODRM_RM`-encoded operand, not
    // just `X87`).
    if opdef.encoding == OperandEncoding::ModrmRm && is_register_family(opdef.ty) {
        let modrm = ensure_modrm(state)?;
        if modrm.md != 3 {
            let kind = OperandKind::Memory(materialize_memory(state, opdef, avx)?);
            return Ok(finish_operand(def, opdef, kind, size, state));
        }
    }

    let kind = match opdef.ty {
        OperandType::Unused => OperandKind::Unused,

        OperandType::Gpr8 => OperandKind::Register(register_id(state, opdef.encoding)?.0),
        OperandType::Gpr16 | OperandType::Gpr32 | OperandType::Gpr64 | OperandType::Gpr16_32_64 => {
            let (class, id) = resolve_class_and_id(state, opdef)?;
            OperandKind::Register(class.encode(id))
        }
        OperandType::Fpr => resolve_simple(state, opdef, RegisterClass::X87)?,
        OperandType::Mmx => resolve_simple(state, opdef, RegisterClass::Mmx)?,
        OperandType::Xmm => resolve_simple(state, opdef, RegisterClass::Xmm)?,
        OperandType::Ymm => resolve_simple(state, opdef, RegisterClass::Ymm)?,
        OperandType::Zmm => resolve_simple(state, opdef, RegisterClass::Zmm)?,
        OperandType::Bnd => resolve_simple(state, opdef, RegisterClass::Bound)?,
        OperandType::Cr => resolve_simple(state, opdef, RegisterClass::Control)?,
        OperandType::Dr => resolve_simple(state, opdef, RegisterClass::Debug)?,
        OperandType::Sreg => resolve_simple(state, opdef, RegisterClass::Segment)?,
        OperandType::Mask => resolve_simple(state, opdef, RegisterClass::Mask)?,

        OperandType::Mem | OperandType::MemVsibX | OperandType::MemVsibY | OperandType::MemVsibZ => {
            OperandKind::Memory(materialize_memory(state, opdef, avx)?)
        }
        OperandType::Agen => OperandKind::Memory(materialize_memory(state, opdef, avx)?),
        OperandType::Moffs => OperandKind::Memory(materialize_moffs(state)?),

        OperandType::Imm | OperandType::Rel => {
            OperandKind::Immediate(read_immediate(state, opdef, size)?)
        }

        OperandType::Ptr => OperandKind::Pointer(materialize_pointer(state)?),

        OperandType::FixedReg(reg) => {
            if matches!(reg, Register::FS | Register::GS) {
                // always legal
            } else if reg.class() == RegisterClass::Segment
                && state.machine_mode == crate::enums::MachineMode::Long64
            {
                return Err(Status::BadRegister);
            }
            OperandKind::Register(reg)
        }
    };

    Ok(finish_operand(def, opdef, kind, size, state))
}

/// Whether `opdef.ty` names a register-family operand type, as opposed to
/// memory/immediate/pointer kinds that never reinterpret `ModRM.mod`.
fn is_register_family(ty: OperandType) -> bool {
    matches!(
        ty,
        OperandType::Gpr8
            | OperandType::Gpr16
            | OperandType::Gpr32
            | OperandType::Gpr64
            | OperandType::Gpr16_32_64
            | OperandType::Fpr
            | OperandType::Mmx
            | OperandType::Xmm
            | OperandType::Ymm
            | OperandType::Zmm
            | OperandType::Bnd
            | OperandType::Cr
            | OperandType::Dr
            | OperandType::Sreg
            | OperandType::Mask
    )
}

fn finish_operand(
    def: &InstructionDef,
    opdef: &OperandDef,
    kind: OperandKind,
    size: u16,
    state: &DecodeState,
) -> DecodedOperand {
    let size = match &kind {
        OperandKind::Register(r) if size == 0 => r.width(state.machine_mode),
        _ => size,
    };

    let element_size = def_element_size(def, opdef);
    let element_type = if element_size == 0 {
        crate::enums::ElementType::Invalid
    } else {
        def.element_type
    };

    DecodedOperand {
        kind,
        visibility: opdef.visibility,
        action: opdef.action,
        size,
        element_count: if size == 0 || element_size == 0 { 0 } else { size / element_size },
        element_size,
        element_type,
        encoding: opdef.encoding,
    }
}

/// A vector operand's element width comes from the owning definition's
/// `element_size` (spec.md §3.3's EVEX extras); scalar/memory/immediate
/// operand types have no notion of "elements" and report `0`.
fn def_element_size(def: &InstructionDef, opdef: &OperandDef) -> u16 {
    if is_vector_family(opdef.ty) {
        def.element_size
    } else {
        0
    }
}

/// Whether `ty` names a packed-vector register operand (as opposed to a
/// scalar GPR/FPU register, which has no per-element breakdown).
fn is_vector_family(ty: OperandType) -> bool {
    matches!(ty, OperandType::Mmx | OperandType::Xmm | OperandType::Ymm | OperandType::Zmm)
}

fn resolve_simple(
    state: &mut DecodeState,
    opdef: &OperandDef,
    class: RegisterClass,
) -> Result<OperandKind> {
    let (_, id) = resolve_class_and_id(state, opdef)?;
    Ok(OperandKind::Register(class.encode(id)))
}

/// Resolves `(class, id)` for a register-class operand per the encoding
/// source table in spec.md §4.7 step 2.
fn resolve_class_and_id(state: &mut DecodeState, opdef: &OperandDef) -> Result<(RegisterClass, u8)> {
    let eosz_index = state.eosz_index;
    let (_, id) = register_id(state, opdef.encoding)?;
    let class = gpr_class_for_eosz(opdef, eosz_index);
    Ok((class, id))
}

/// For GPR-family operand types whose width varies with eosz, returns the
/// class matching the resolved effective operand size; for fixed-width
/// register classes, returns that class directly.
fn gpr_class_for_eosz(opdef: &OperandDef, eosz_index: usize) -> RegisterClass {
    match opdef.ty {
        OperandType::Gpr8 => RegisterClass::Gpr8,
        OperandType::Gpr16 => RegisterClass::Gpr16,
        OperandType::Gpr32 => RegisterClass::Gpr32,
        OperandType::Gpr64 => RegisterClass::Gpr64,
        OperandType::Gpr16_32_64 => match eosz_index {
            0 => RegisterClass::Gpr16,
            1 => RegisterClass::Gpr32,
            _ => RegisterClass::Gpr64,
        },
        OperandType::Fpr => RegisterClass::X87,
        OperandType::Mmx => RegisterClass::Mmx,
        OperandType::Xmm => RegisterClass::Xmm,
        OperandType::Ymm => RegisterClass::Ymm,
        OperandType::Zmm => RegisterClass::Zmm,
        OperandType::Bnd => RegisterClass::Bound,
        OperandType::Cr => RegisterClass::Control,
        OperandType::Dr => RegisterClass::Debug,
        OperandType::Sreg => RegisterClass::Segment,
        OperandType::Mask => RegisterClass::Mask,
        _ => RegisterClass::Gpr32,
    }
}

/// Reads the raw register id (and the register actually produced, for
/// `GPR8`'s `REX`-remap) per the encoding source, per spec.md §4.7 step 2.
fn register_id(state: &mut DecodeState, encoding: OperandEncoding) -> Result<(Register, u8)> {
    let id = match encoding {
        OperandEncoding::ModrmReg => {
            let m = ensure_modrm(state)?;
            (((state.vec.r2 as u16) << 4) | ((state.vec.r as u16) << 3) | m.reg as u16) as u8
        }
        OperandEncoding::ModrmRm => {
            let m = ensure_modrm(state)?;
            (((state.vec.x as u16) << 4) | ((state.vec.b as u16) << 3) | m.rm as u16) as u8
        }
        OperandEncoding::OpcodeEmbedded => (state.vec.b << 3) | (state.opcode & 0x7),
        OperandEncoding::Ndsndd => ((state.vec.v2 as u16) << 4 | (state.vec.vvvv as u16)) as u8,
        OperandEncoding::MaskAaa => state.vec.aaa,
        OperandEncoding::Is4 => {
            let byte = state.cursor.next()?;
            let mask = if state.machine_mode == crate::enums::MachineMode::Long64 { 0xF } else { 0x7 };
            (byte >> 4) & mask
        }
        OperandEncoding::Imm0 | OperandEncoding::Imm1 | OperandEncoding::None => 0,
    };

    // GPR8 operands need the REX-aware remap even when resolved through the
    // generic register-id path above; callers that already special-cased
    // GPR8 (see `materialize_one`) route here too for a single source of
    // truth.
    let reg = Register::gpr8(id, state.rex_present);
    Ok((reg, id))
}

fn materialize_memory(
    state: &mut DecodeState,
    opdef: &OperandDef,
    avx: Option<&AvxInfo>,
) -> Result<MemoryOperand> {
    let modrm = ensure_modrm(state)?;
    if matches!(
        opdef.ty,
        OperandType::MemVsibX | OperandType::MemVsibY | OperandType::MemVsibZ
    ) && modrm.rm != 4
    {
        return Err(Status::InvalidVsib);
    }

    let vsib_class = match opdef.ty {
        OperandType::MemVsibX => Some(RegisterClass::Xmm),
        OperandType::MemVsibY => Some(RegisterClass::Ymm),
        OperandType::MemVsibZ => Some(RegisterClass::Zmm),
        _ => None,
    };

    let gpr_class = if state.address_size == 64 {
        RegisterClass::Gpr64
    } else if state.address_size == 32 {
        RegisterClass::Gpr32
    } else {
        RegisterClass::Gpr16
    };

    let mut base = Register::NONE;
    let mut index = Register::NONE;
    let mut scale: u8 = 0;

    let is_rip_relative =
        state.address_size != 16 && modrm.md == 0 && modrm.rm == 5 && state.machine_mode == crate::enums::MachineMode::Long64;

    if is_rip_relative {
        base = Register::RIP;
    } else if let Some(sib) = state.sib {
        let has_index = !(sib.index == 4 && state.vec.x == 1 && vsib_class.is_none());
        if has_index || vsib_class.is_some() {
            let idx_id = ((state.vec.x as u16) << 4 | sib.index as u16) as u8;
            index = match vsib_class {
                Some(class) => {
                    let idx_id = ((state.vec.v2 as u16) << 4 | idx_id as u16) as u8;
                    class.encode(idx_id)
                }
                None => gpr_class.encode(idx_id),
            };
            scale = 1 << sib.scale;
        }
        if !(sib.base == 5 && modrm.md == 0) {
            let base_id = ((state.vec.b as u16) << 3 | sib.base as u16) as u8;
            base = gpr_class.encode(base_id);
        }
    } else if !(modrm.md == 0 && modrm.rm == 5 && state.address_size != 16) {
        let base_id = if state.address_size == 16 {
            modrm.rm
        } else {
            ((state.vec.b as u16) << 3 | modrm.rm as u16) as u8
        };
        base = if state.address_size == 16 {
            sixteen_bit_addressing(base_id, &mut index)
        } else {
            gpr_class.encode(base_id)
        };
    }

    if index == Register::RSP || index == Register::ESP {
        scale = 0;
        index = Register::NONE;
    }

    let mut displacement = state.disp.value;
    if state.has_disp && state.disp.size == 8 {
        if let Some(a) = avx {
            if matches!(state.encoding, InstructionEncoding::Evex | InstructionEncoding::Mvex)
                && a.compressed_disp8_scale > 0
            {
                displacement = displacement.wrapping_mul(a.compressed_disp8_scale as i64);
            }
        }
    }

    let segment = resolve_segment(state, base);

    let ty = match opdef.ty {
        OperandType::Agen => MemoryOperandType::Agen,
        OperandType::MemVsibX => MemoryOperandType::VsibX,
        OperandType::MemVsibY => MemoryOperandType::VsibY,
        OperandType::MemVsibZ => MemoryOperandType::VsibZ,
        _ => MemoryOperandType::Mem,
    };

    Ok(MemoryOperand {
        ty,
        segment,
        base,
        index,
        scale,
        displacement,
        has_displacement: state.has_disp || is_rip_relative,
    })
}

/// 16-bit addressing's seven non-direct `ModRM.rm` forms each imply a fixed
/// base/index pair (or base-only, or disp16-only at `rm=6,mod=0`, handled by
/// the caller before this is reached).
fn sixteen_bit_addressing(rm: u8, index: &mut Register) -> Register {
    use Register::*;
    let (base, idx) = match rm {
        0 => (BX, SI),
        1 => (BX, DI),
        2 => (BP, SI),
        3 => (BP, DI),
        4 => (NONE, SI),
        5 => (NONE, DI),
        6 => (BP, NONE),
        7 => (BX, NONE),
        _ => unreachable!(),
    };
    *index = idx;
    base
}

fn resolve_segment(state: &DecodeState, base: Register) -> Register {
    if let Some(seg) = state.last_segment_prefix {
        return seg;
    }
    match base {
        Register::RSP | Register::ESP | Register::SP | Register::RBP | Register::EBP | Register::BP => {
            Register::SS
        }
        _ => Register::DS,
    }
}

fn materialize_moffs(state: &mut DecodeState) -> Result<MemoryOperand> {
    let size = state.address_size as u8 / 8;
    let offset = state.cursor.position() as u8;
    let value = state.cursor.next_le(size as usize, false)?;
    state.disp = crate::decoder::state::DispInfo { value, size: state.address_size as u8, offset };
    state.has_disp = true;
    let segment = resolve_segment(state, Register::NONE);
    Ok(MemoryOperand {
        ty: MemoryOperandType::Moffs,
        segment,
        base: Register::NONE,
        index: Register::NONE,
        scale: 0,
        displacement: value,
        has_displacement: true,
    })
}

fn materialize_pointer(state: &mut DecodeState) -> Result<PointerOperand> {
    let offset_size = if state.operand_size == 16 { 2 } else { 4 };
    let offset = state.cursor.next_le(offset_size, false)? as u32;
    let segment = state.cursor.next_le(2, false)? as u16;
    Ok(PointerOperand { segment, offset })
}

/// Reads the next immediate/relative-offset slot's bytes from the cursor
/// and records it in `state.imm` for the public `raw_imm` view, per spec.md
/// §4.5's per-definition immediate sizing and §4.7 step 4.
fn read_immediate(state: &mut DecodeState, opdef: &OperandDef, size: u16) -> Result<ImmediateOperand> {
    let slot = state.imm_count as usize;
    if slot >= 2 {
        return Err(Status::DecodingError);
    }
    let is_relative = opdef.ty == OperandType::Rel;
    let is_signed = is_relative;
    let offset = state.cursor.position() as u8;
    let bytes = (size / 8) as usize;
    let raw = state.cursor.next_le(bytes, is_signed)?;
    let value = raw as u64;

    state.imm[slot] = crate::decoder::state::ImmInfo {
        value,
        size: size as u8,
        offset,
        is_signed,
        is_relative,
    };
    state.imm_count += 1;

    Ok(ImmediateOperand { value, is_signed, is_relative })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::AddressWidth;
    use crate::enums::MachineMode;

    #[test]
    fn sixteen_bit_forms_cover_all_rm() {
        let mut idx = Register::NONE;
        assert_eq!(sixteen_bit_addressing(6, &mut idx), Register::BP);
        assert_eq!(idx, Register::NONE);
        assert_eq!(sixteen_bit_addressing(0, &mut idx), Register::BX);
        assert_eq!(idx, Register::SI);
    }

    #[test]
    fn segment_defaults_to_ss_for_stack_bases() {
        let s = DecodeState::new(&[], MachineMode::Long64, AddressWidth::Width64);
        assert_eq!(resolve_segment(&s, Register::RBP), Register::SS);
        assert_eq!(resolve_segment(&s, Register::RAX), Register::DS);
    }
}
