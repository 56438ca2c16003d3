//! The AVX-extension resolver (spec.md §4.8): derives vector length, mask,
//! rounding/SAE, broadcast, and the compressed-disp8 scale for VEX/EVEX/MVEX
//! instructions from the vector-context cache and the matched definition.

use crate::decoder::record::AvxInfo;
use crate::decoder::state::DecodeState;
use crate::enums::{
    BroadcastMode, EvexFunctionality, InstructionEncoding, MaskMode, Register, RegisterClass,
    RoundingMode, TupleType,
};
use crate::status::{Result, Status};
use crate::tables::InstructionDef;

/// Resolves the `avx` sub-record for a matched definition, or `None` if the
/// instruction wasn't VEX/EVEX/MVEX-encoded.
pub fn resolve(state: &DecodeState, def: &InstructionDef) -> Result<Option<AvxInfo>> {
    match state.encoding {
        InstructionEncoding::Vex | InstructionEncoding::Evex | InstructionEncoding::Mvex => {}
        _ => return Ok(None),
    }

    if state.vec.ll == 3 {
        return Err(Status::DecodingError);
    }
    let vector_length: u16 = match state.vec.ll {
        0 => 128,
        1 => 256,
        2 => 512,
        _ => unreachable!(),
    };

    let is_evex = state.encoding == InstructionEncoding::Evex;

    let mask_register = if is_evex || state.encoding == InstructionEncoding::Mvex {
        RegisterClass::Mask.encode(state.vec.aaa)
    } else {
        Register::NONE
    };
    let mask_mode = if mask_register == Register::K0 {
        MaskMode::Disabled
    } else if state.encoding == InstructionEncoding::Mvex {
        MaskMode::Merge
    } else if state.vec.z == 1 {
        MaskMode::Zero
    } else {
        MaskMode::Merge
    };

    let rounding = if is_evex
        && def.functionality == EvexFunctionality::RoundingControl
        && state.vec.b_ctx == 1
    {
        match state.vec.ll {
            0 => RoundingMode::RnSae,
            1 => RoundingMode::RdSae,
            2 => RoundingMode::RuSae,
            _ => RoundingMode::RzSae,
        }
    } else {
        RoundingMode::Default
    };

    let sae = is_evex && def.functionality == EvexFunctionality::Sae && state.vec.b_ctx == 1;

    let broadcast = if is_evex && state.vec.b_ctx == 1 && def.functionality != EvexFunctionality::RoundingControl {
        match def.tuple_type {
            TupleType::Fv => match (state.vec.w, vector_length) {
                (0, 128) => BroadcastMode::OneTo4,
                (0, 256) => BroadcastMode::OneTo8,
                (0, 512) => BroadcastMode::OneTo16,
                (_, 128) => BroadcastMode::OneTo2,
                (_, 256) => BroadcastMode::OneTo4,
                (_, 512) => BroadcastMode::OneTo8,
                _ => BroadcastMode::None,
            },
            _ => BroadcastMode::None,
        }
    } else {
        BroadcastMode::None
    };

    let compressed_disp8_scale =
        disp8_scale(def.tuple_type, vector_length, state.vec.w, state.vec.b_ctx, def.element_size);

    Ok(Some(AvxInfo {
        vector_length,
        mask_register,
        mask_mode,
        rounding,
        sae,
        broadcast,
        swizzle: crate::enums::SwizzleMode::None,
        conversion: crate::enums::ConversionMode::None,
        compressed_disp8_scale,
    }))
}

/// The table in spec.md §4.8: a pure function of
/// `(tuple_type, vector_length, W, b)`, plus `element_size` for `T1S`/`GSCAT`.
fn disp8_scale(tuple: TupleType, vl: u16, w: u8, b: u8, element_size: u16) -> u16 {
    match tuple {
        TupleType::None => 0,
        TupleType::Fv => match (b, w, vl) {
            (0, _, 128) => 16,
            (0, _, 256) => 32,
            (0, _, 512) => 64,
            (_, 0, _) => 4,
            (_, _, _) => 8,
        },
        TupleType::Hv => match (b, vl) {
            (0, 128) => 8,
            (0, 256) => 16,
            (0, 512) => 32,
            (_, _) => 4,
        },
        TupleType::Fvm => match vl {
            128 => 16,
            256 => 32,
            _ => 64,
        },
        TupleType::T1s => element_size / 8,
        TupleType::T1f => {
            if element_size == 64 {
                8
            } else {
                4
            }
        }
        TupleType::Gscat => {
            if w == 1 {
                8
            } else {
                4
            }
        }
        TupleType::T2 => {
            if w == 1 {
                16
            } else {
                8
            }
        }
        TupleType::T4 => {
            if w == 1 {
                32
            } else {
                16
            }
        }
        TupleType::T8 => 32,
        TupleType::Hvm => match vl {
            128 => 8,
            256 => 16,
            _ => 32,
        },
        TupleType::Qvm => match vl {
            128 => 4,
            256 => 8,
            _ => 16,
        },
        TupleType::Ovm => match vl {
            128 => 2,
            256 => 4,
            _ => 8,
        },
        TupleType::M128 => 16,
        TupleType::Dup => match vl {
            128 => 8,
            256 => 32,
            _ => 64,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::sizes::OperandSizeMap;
    use crate::enums::AddressWidth;
    use crate::enums::MachineMode;
    use crate::enums::{InstructionAttributes, InstructionCategory, IsaExt, IsaSet, Mnemonic};
    use crate::tables::{InstructionDef, NO_OPERAND};

    fn dummy_avx_def(tuple_type: TupleType, element_size: u16) -> InstructionDef {
        InstructionDef {
            mnemonic: Mnemonic::VZEROALL,
            operands: [NO_OPERAND; 4],
            operand_size_map: OperandSizeMap::IgnoreOperandSizePrefix,
            accepts: InstructionAttributes::empty(),
            category: InstructionCategory::Avx,
            isa_set: IsaSet::Avx,
            isa_ext: IsaExt::Avx,
            exception_class: crate::enums::ExceptionClass::Avx,
            branch_type: crate::enums::BranchType::None,
            cpu_flags: None,
            fpu_flags: None,
            tuple_type,
            element_size,
            element_type: crate::enums::ElementType::Invalid,
            functionality: EvexFunctionality::Normal,
        }
    }

    #[test]
    fn vzero_vex_has_no_avx_info_beyond_length() {
        let mut s = DecodeState::new(&[], MachineMode::Long64, AddressWidth::Width64);
        s.encoding = InstructionEncoding::Vex;
        s.vec.ll = 1;
        let def = dummy_avx_def(TupleType::None, 0);
        let info = resolve(&s, &def).unwrap().unwrap();
        assert_eq!(info.vector_length, 256);
        assert_eq!(info.mask_register, Register::NONE);
    }

    #[test]
    fn evex_fv_broadcast_scale() {
        assert_eq!(disp8_scale(TupleType::Fv, 512, 0, 0, 0), 64);
        assert_eq!(disp8_scale(TupleType::Fv, 512, 0, 1, 0), 4);
        assert_eq!(disp8_scale(TupleType::Fv, 512, 1, 1, 0), 8);
    }

    #[test]
    fn rejects_ll_3() {
        let mut s = DecodeState::new(&[], MachineMode::Long64, AddressWidth::Width64);
        s.encoding = InstructionEncoding::Vex;
        s.vec.ll = 3;
        let def = dummy_avx_def(TupleType::None, 0);
        assert_eq!(resolve(&s, &def), Err(Status::DecodingError));
    }
}
