//! Integration coverage for the concrete decode scenarios and the
//! universal properties expected to hold across arbitrary input.

use zydec::{
    Decoder, InstructionEncoding, MachineMode, Mnemonic, OperandKind, Register, Status,
};

#[test]
fn scenario_1_nop() {
    let d = Decoder::new(MachineMode::Long64);
    let ins = d.decode(&[0x90]).unwrap();
    assert_eq!(ins.mnemonic, Mnemonic::NOP);
    assert_eq!(ins.length, 1);
    assert!(ins.operands.iter().all(|op| op.kind == OperandKind::Unused));
}

#[test]
fn scenario_2_pause() {
    let d = Decoder::new(MachineMode::Long64);
    let ins = d.decode(&[0xF3, 0x90]).unwrap();
    assert_eq!(ins.mnemonic, Mnemonic::PAUSE);
    assert_eq!(ins.length, 2);
    assert!(!ins.attributes.contains(zydec::InstructionAttributes::HAS_REP));
}

#[test]
fn scenario_3_mov_rex_w() {
    let d = Decoder::new(MachineMode::Long64);
    let ins = d.decode(&[0x48, 0x89, 0xD8]).unwrap();
    assert_eq!(ins.mnemonic, Mnemonic::MOV);
    assert_eq!(ins.length, 3);
    assert_eq!(ins.operand_size, 64);
    assert_eq!(ins.operands[0].kind, OperandKind::Register(Register::RAX));
    assert_eq!(ins.operands[1].kind, OperandKind::Register(Register::RBX));
}

#[test]
fn scenario_4_sib_addressed_mov() {
    let d = Decoder::new(MachineMode::Long64);
    let ins = d.decode(&[0x67, 0x8B, 0x04, 0x25, 0x78, 0x56, 0x34, 0x12]).unwrap();
    assert_eq!(ins.mnemonic, Mnemonic::MOV);
    assert_eq!(ins.address_size, 32);
    assert!(ins.attributes.contains(zydec::InstructionAttributes::HAS_ADDRESSSIZE));
    assert_eq!(ins.operands[0].kind, OperandKind::Register(Register::EAX));
    match ins.operands[1].kind {
        OperandKind::Memory(mem) => {
            assert_eq!(mem.base, Register::NONE);
            assert_eq!(mem.index, Register::NONE);
            assert_eq!(mem.displacement, 0x12345678);
        }
        other => panic!("expected a memory operand, got {other:?}"),
    }
}

#[test]
fn scenario_5_vzeroupper() {
    let d = Decoder::new(MachineMode::Long64);
    let ins = d.decode(&[0xC5, 0xF8, 0x77]).unwrap();
    assert_eq!(ins.mnemonic, Mnemonic::VZEROUPPER);
    assert_eq!(ins.length, 3);
    assert_eq!(ins.encoding, InstructionEncoding::Vex);
    assert_eq!(ins.opcode, 0x77);
}

#[test]
fn scenario_6_vaddps_evex_zmm() {
    let d = Decoder::new(MachineMode::Long64);
    let ins = d.decode(&[0x62, 0xF1, 0x7C, 0x48, 0x58, 0xC1]).unwrap();
    assert_eq!(ins.mnemonic, Mnemonic::VADDPS);
    assert_eq!(ins.encoding, InstructionEncoding::Evex);
    let avx = ins.avx.unwrap();
    assert_eq!(avx.vector_length, 512);
    assert_eq!(ins.operands[0].kind, OperandKind::Register(Register::ZMM0));
    assert_eq!(ins.operands[1].kind, OperandKind::Register(Register::ZMM0));
    assert_eq!(ins.operands[2].kind, OperandKind::Register(Register::ZMM1));
    for op in &ins.operands[..3] {
        assert_eq!(op.element_size, 32);
        assert_eq!(op.element_type, zydec::ElementType::Float32);
        assert_eq!(op.element_count, op.size / 32);
    }
}

#[test]
fn scenario_7_truncated_ff() {
    let d = Decoder::new(MachineMode::Long64);
    let err = d.decode(&[0xFF]).unwrap_err();
    assert!(matches!(err.status, Status::EndOfInput | Status::DecodingError));
    let partial = err.partial.expect("non-fatal error must carry a partial record");
    assert_eq!(partial.length, 1);
    assert_eq!(partial.raw_bytes[0], 0xFF);
}

#[test]
fn scenario_8_3dnow_pfrcp() {
    let d = Decoder::new(MachineMode::Long64);
    let ins = d.decode(&[0x0F, 0x0F, 0xC8, 0xBF]).unwrap();
    assert_eq!(ins.mnemonic, Mnemonic::PFRCP);
    assert_eq!(ins.opcode_map, zydec::OpcodeMap::Map0F0F);
    assert_eq!(ins.opcode, 0xBF);
    assert_eq!(ins.operands[0].kind, OperandKind::Register(Register::MM1));
    assert_eq!(ins.operands[1].kind, OperandKind::Register(Register::MM0));
}

/// Sweeps a buffer made of every scenario's bytes back to back and checks
/// the universal properties from spec.md §8 hold throughout.
#[test]
fn linear_sweep_universal_properties() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0x90]);
    bytes.extend_from_slice(&[0xF3, 0x90]);
    bytes.extend_from_slice(&[0x48, 0x89, 0xD8]);
    bytes.extend_from_slice(&[0xFF]); // undecodable alone, recovers by 1 byte
    bytes.extend_from_slice(&[0xC5, 0xF8, 0x77]);
    bytes.extend_from_slice(&[0x0F, 0x0F, 0xC8, 0xBF]);

    let d = Decoder::new(MachineMode::Long64);
    let mut consumed = 0usize;
    for result in d.instruction_iterator(&bytes) {
        match result {
            Ok(ins) => {
                assert!(ins.length <= 15);
                assert!((ins.length as usize) <= bytes.len() - consumed);
                assert_eq!(
                    &ins.raw_bytes[..ins.length as usize],
                    &bytes[consumed..consumed + ins.length as usize]
                );
                for op in ins.operands.iter() {
                    if let OperandKind::Register(r) = op.kind {
                        assert!(op.size > 0, "register operand {r:?} has zero size");
                    }
                    if let OperandKind::Memory(mem) = op.kind {
                        assert!(matches!(mem.scale, 0 | 1 | 2 | 4 | 8));
                    }
                }
                consumed += ins.length as usize;
            }
            Err(_) => consumed += 1,
        }
    }
    assert_eq!(consumed, bytes.len());
}

#[test]
fn empty_input_is_no_more_data() {
    let d = Decoder::new(MachineMode::Long64);
    let err = d.decode(&[]).unwrap_err();
    assert_eq!(err.status, Status::NoMoreData);
    assert!(err.partial.is_none());
}
