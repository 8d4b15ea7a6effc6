//! The fixed instruction every workflow sends.

use std::sync::LazyLock;

use chain_sol::{AccountMeta, Instruction, Pubkey};

/// Target program: `ETwBdF9X2eABzmKmpT3ZFYyUtmve7UWWgzbERAyd4gAC`
pub const PROPOSAL_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    0xc8, 0x0e, 0x4b, 0xd4, 0x0c, 0x46, 0x8e, 0xab, 0x15, 0x10, 0x4f, 0xb8, 0x79, 0x9e, 0x34, 0x8d,
    0xba, 0x0e, 0x92, 0xd0, 0x03, 0xd6, 0x4a, 0x48, 0xfc, 0x63, 0x87, 0xe5, 0xcc, 0x3e, 0x03, 0x89,
]);

/// Read-only account passed to the program:
/// `5jo4Lh2Z9FGQ87sDhUBwZjNZdL15MwdeT5WUXKfwFSZY`
pub const PROPOSAL_ACCOUNT: Pubkey = Pubkey::new_from_array([
    0x46, 0x65, 0x38, 0x1a, 0x8f, 0x40, 0x17, 0x9e, 0xf8, 0x56, 0x05, 0xfa, 0x09, 0x80, 0xac, 0x0c,
    0x86, 0x87, 0x78, 0xc9, 0xbc, 0xea, 0xa6, 0x67, 0xfc, 0x1b, 0x77, 0xe4, 0xe1, 0x88, 0xdd, 0xb3,
]);

/// 8-byte instruction discriminator (`74b89fceb3e0b22a`).
pub const PROPOSAL_IX_DATA: [u8; 8] = [0x74, 0xb8, 0x9f, 0xce, 0xb3, 0xe0, 0xb2, 0x2a];

/// Built once per process and never mutated.
pub static REFERENCE_INSTRUCTIONS: LazyLock<Vec<Instruction>> = LazyLock::new(|| {
    vec![Instruction::new_with_bytes(
        PROPOSAL_PROGRAM_ID,
        &PROPOSAL_IX_DATA,
        vec![AccountMeta::new_readonly(PROPOSAL_ACCOUNT, false)],
    )]
});
