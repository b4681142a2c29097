use solana_program::pubkey::Pubkey;

use crate::constants::{
    ASSOCIATED_TOKEN_PROGRAM_ID, FARMS_PROGRAM_ID, INTEGRATION_PROGRAM_ID, KLEND_PROGRAM_ID,
    KVAULT_PROGRAM_ID, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID,
};

/// The set of external programs an operation is composed against.
///
/// Passed explicitly into derivation, validation and composition so that
/// nothing depends on a process-wide cluster handle. `Default` is mainnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramIds {
    pub vault_program: Pubkey,
    pub lending_program: Pubkey,
    pub farms_program: Pubkey,
    pub token_program: Pubkey,
    pub token_2022_program: Pubkey,
    pub associated_token_program: Pubkey,
    pub integration_program: Pubkey,
}

impl Default for ProgramIds {
    fn default() -> Self {
        Self {
            vault_program: KVAULT_PROGRAM_ID,
            lending_program: KLEND_PROGRAM_ID,
            farms_program: FARMS_PROGRAM_ID,
            token_program: TOKEN_PROGRAM_ID,
            token_2022_program: TOKEN_2022_PROGRAM_ID,
            associated_token_program: ASSOCIATED_TOKEN_PROGRAM_ID,
            integration_program: INTEGRATION_PROGRAM_ID,
        }
    }
}

impl ProgramIds {
    pub fn with_vault_program(mut self, vault_program: Pubkey) -> Self {
        self.vault_program = vault_program;
        self
    }

    pub fn with_lending_program(mut self, lending_program: Pubkey) -> Self {
        self.lending_program = lending_program;
        self
    }

    pub fn with_integration_program(mut self, integration_program: Pubkey) -> Self {
        self.integration_program = integration_program;
        self
    }

    /// True for either SPL token program.
    pub fn is_token_program(&self, program: &Pubkey) -> bool {
        *program == self.token_program || *program == self.token_2022_program
    }
}
