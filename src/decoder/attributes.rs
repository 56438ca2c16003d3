//! The attribute finalizer (spec.md §4.9): combines which prefix bytes were
//! actually present with what the matched definition accepts to produce the
//! instruction's final attribute bitset.

use crate::decoder::state::DecodeState;
use crate::enums::{InstructionAttributes, InstructionEncoding, Register};
use crate::tables::InstructionDef;

pub fn finalize(state: &DecodeState, def: &InstructionDef) -> InstructionAttributes {
    let mut attrs = def.accepts;

    if state.modrm.is_some() {
        attrs |= InstructionAttributes::HAS_MODRM;
    }
    if state.sib.is_some() {
        attrs |= InstructionAttributes::HAS_SIB;
    }
    if state.rex_present {
        attrs |= InstructionAttributes::HAS_REX;
    }
    match state.encoding {
        InstructionEncoding::Xop => attrs |= InstructionAttributes::HAS_XOP,
        InstructionEncoding::Vex => attrs |= InstructionAttributes::HAS_VEX,
        InstructionEncoding::Evex => attrs |= InstructionAttributes::HAS_EVEX,
        InstructionEncoding::Mvex => attrs |= InstructionAttributes::HAS_MVEX,
        InstructionEncoding::Legacy | InstructionEncoding::ThreeDNow => {}
    }
    if state.imm[..state.imm_count as usize].iter().any(|i| i.is_relative) {
        attrs |= InstructionAttributes::IS_RELATIVE;
    }
    if state.operand_size_override {
        attrs |= InstructionAttributes::HAS_OPERANDSIZE;
    }
    if state.address_size_override {
        attrs |= InstructionAttributes::HAS_ADDRESSSIZE;
    }

    let hle_or_lock = state.lock
        || attrs.contains(InstructionAttributes::ACCEPTS_HLE_WITHOUT_LOCK);

    if state.lock && attrs.contains(InstructionAttributes::ACCEPTS_LOCK) {
        attrs |= InstructionAttributes::HAS_LOCK;
    }

    if state.repne {
        if attrs.contains(InstructionAttributes::ACCEPTS_REPNE) {
            attrs |= InstructionAttributes::HAS_REPNE;
        } else if hle_or_lock && attrs.contains(InstructionAttributes::ACCEPTS_XACQUIRE) {
            attrs |= InstructionAttributes::HAS_XACQUIRE;
        } else if attrs.contains(InstructionAttributes::ACCEPTS_BND) {
            attrs |= InstructionAttributes::HAS_BND;
        }
    }

    if state.rep {
        if attrs.contains(InstructionAttributes::ACCEPTS_REP) {
            attrs |= InstructionAttributes::HAS_REP;
        } else if attrs.contains(InstructionAttributes::ACCEPTS_REPE) {
            attrs |= InstructionAttributes::HAS_REPE;
        } else if hle_or_lock && attrs.contains(InstructionAttributes::ACCEPTS_XRELEASE) {
            attrs |= InstructionAttributes::HAS_XRELEASE;
        }
    }

    if attrs.contains(InstructionAttributes::ACCEPTS_BRANCH_HINTS) {
        match state.last_segment_prefix {
            Some(Register::CS) => attrs |= InstructionAttributes::HAS_BRANCH_NOT_TAKEN,
            Some(Register::DS) => attrs |= InstructionAttributes::HAS_BRANCH_TAKEN,
            _ => {}
        }
    } else if attrs.contains(InstructionAttributes::ACCEPTS_SEGMENT) {
        attrs |= match state.last_segment_prefix {
            Some(Register::CS) => InstructionAttributes::HAS_SEGMENT_CS,
            Some(Register::SS) => InstructionAttributes::HAS_SEGMENT_SS,
            Some(Register::DS) => InstructionAttributes::HAS_SEGMENT_DS,
            Some(Register::ES) => InstructionAttributes::HAS_SEGMENT_ES,
            Some(Register::FS) => InstructionAttributes::HAS_SEGMENT_FS,
            Some(Register::GS) => InstructionAttributes::HAS_SEGMENT_GS,
            _ => InstructionAttributes::empty(),
        };
    }

    attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::sizes::OperandSizeMap;
    use crate::enums::{AddressWidth, BranchType, ExceptionClass, IsaExt, IsaSet, MachineMode};
    use crate::enums::{EvexFunctionality, InstructionCategory, Mnemonic, TupleType};
    use crate::tables::NO_OPERAND;

    fn def(accepts: InstructionAttributes) -> InstructionDef {
        InstructionDef {
            mnemonic: Mnemonic::XCHG,
            operands: [NO_OPERAND; 4],
            operand_size_map: OperandSizeMap::Default,
            accepts,
            category: InstructionCategory::DataTransfer,
            isa_set: IsaSet::I86,
            isa_ext: IsaExt::Base,
            exception_class: ExceptionClass::None,
            branch_type: BranchType::None,
            cpu_flags: None,
            fpu_flags: None,
            tuple_type: TupleType::None,
            element_size: 0,
            element_type: crate::enums::ElementType::Invalid,
            functionality: EvexFunctionality::Normal,
        }
    }

    #[test]
    fn lock_requires_acceptance() {
        let mut s = DecodeState::new(&[], MachineMode::Long64, AddressWidth::Width64);
        s.lock = true;
        let d = def(InstructionAttributes::ACCEPTS_LOCK);
        assert!(finalize(&s, &d).contains(InstructionAttributes::HAS_LOCK));

        let d_no_accept = def(InstructionAttributes::empty());
        assert!(!finalize(&s, &d_no_accept).contains(InstructionAttributes::HAS_LOCK));
    }

    #[test]
    fn f2_prefers_repne_over_xacquire_and_bnd() {
        let mut s = DecodeState::new(&[], MachineMode::Long64, AddressWidth::Width64);
        s.repne = true;
        let d = def(InstructionAttributes::ACCEPTS_REPNE | InstructionAttributes::ACCEPTS_BND);
        let attrs = finalize(&s, &d);
        assert!(attrs.contains(InstructionAttributes::HAS_REPNE));
        assert!(!attrs.contains(InstructionAttributes::HAS_BND));
    }

    #[test]
    fn segment_override_wins_when_not_branch_hint() {
        let mut s = DecodeState::new(&[], MachineMode::Long64, AddressWidth::Width64);
        s.last_segment_prefix = Some(Register::FS);
        let d = def(InstructionAttributes::ACCEPTS_SEGMENT);
        assert!(finalize(&s, &d).contains(InstructionAttributes::HAS_SEGMENT_FS));
    }
}
