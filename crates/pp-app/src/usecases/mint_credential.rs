use std::sync::Arc;

use alloy_sol_types::{sol, SolCall};

use pp_core::ids::Address;
use pp_core::ports::{ContractCall, LedgerError, LedgerWritePort};

use super::submission::{submit_and_follow, SubmittedTx};

sol! {
    function safeMint(address to, string uri);
}

/// Mint the passport NFT for `owner`, pointing at the uploaded content.
///
/// Always the explicit-recipient form `safeMint(to, uri)`, signed by the
/// recipient.
pub struct MintCredential {
    ledger: Arc<dyn LedgerWritePort>,
    contract: Address,
}

impl MintCredential {
    pub fn new(ledger: Arc<dyn LedgerWritePort>, contract: Address) -> Self {
        Self { ledger, contract }
    }

    pub fn call_for(&self, owner: Address, content_url: &str) -> ContractCall {
        let calldata = safeMintCall {
            to: owner,
            uri: content_url.to_string(),
        }
        .abi_encode();
        ContractCall {
            contract: self.contract,
            function: safeMintCall::SIGNATURE.to_string(),
            calldata: calldata.into(),
            signer: owner,
        }
    }

    pub async fn execute(
        &self,
        owner: Address,
        content_url: &str,
    ) -> Result<SubmittedTx, LedgerError> {
        submit_and_follow(self.ledger.as_ref(), self.call_for(owner, content_url)).await
    }
}
