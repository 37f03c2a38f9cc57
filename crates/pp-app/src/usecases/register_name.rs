use std::sync::Arc;

use alloy_sol_types::{sol, SolCall};

use pp_core::ids::Address;
use pp_core::passport::SubdomainName;
use pp_core::ports::{ContractCall, LedgerError, LedgerWritePort};

use super::submission::{submit_and_follow, SubmittedTx};

sol! {
    function registerSubname(string name);
}

/// Register `name` under the passport suffix for `owner`.
pub struct RegisterName {
    ledger: Arc<dyn LedgerWritePort>,
    contract: Address,
}

impl RegisterName {
    pub fn new(ledger: Arc<dyn LedgerWritePort>, contract: Address) -> Self {
        Self { ledger, contract }
    }

    pub async fn execute(
        &self,
        owner: Address,
        name: &SubdomainName,
    ) -> Result<SubmittedTx, LedgerError> {
        let calldata = registerSubnameCall {
            name: name.as_str().to_string(),
        }
        .abi_encode();
        let call = ContractCall {
            contract: self.contract,
            function: registerSubnameCall::SIGNATURE.to_string(),
            calldata: calldata.into(),
            signer: owner,
        };
        submit_and_follow(self.ledger.as_ref(), call).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pp_core::passport::TxStatusUpdate;
    use pp_core::ports::TxHandle;
    use tokio::sync::mpsc;

    struct RejectingLedger;

    #[async_trait::async_trait]
    impl LedgerWritePort for RejectingLedger {
        async fn submit(&self, call: ContractCall) -> Result<TxHandle, LedgerError> {
            assert_eq!(call.function_name(), "registerSubname");
            let expected = registerSubnameCall {
                name: "alice".into(),
            }
            .abi_encode();
            assert_eq!(call.calldata.as_ref(), expected.as_slice());
            Err(LedgerError::Rpc {
                code: 4001,
                message: "User rejected the request.".into(),
            })
        }

        async fn subscribe(
            &self,
            _handle: &TxHandle,
        ) -> Result<mpsc::Receiver<TxStatusUpdate>, LedgerError> {
            unreachable!("subscribe must not be called after a rejected submission")
        }
    }

    #[tokio::test]
    async fn register_name_surfaces_rejection_without_subscribing() {
        let owner: Address = "0x00000000000000000000000000000000000000aa".parse().unwrap();
        let registry: Address = "0x00000000000000000000000000000000000000bb".parse().unwrap();
        let use_case = RegisterName::new(Arc::new(RejectingLedger), registry);

        let err = use_case
            .execute(owner, &SubdomainName::parse("Alice").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, LedgerError::Rpc { code: 4001, .. }));
    }
}
