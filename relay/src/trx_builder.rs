use std::sync::Arc;
use std::time::Duration;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_sdk::clock::Slot;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::{Message, VersionedMessage};
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;
use solana_sdk::transaction::VersionedTransaction;

/// Error received when confirming a transaction
#[derive(Debug, thiserror::Error)]
pub enum TxError {
  /// The transaction was confirmed with an error
  #[error("Transaction confirmed in slot `{slot}` with error: {error}")]
  TxError {
    slot: Slot,
    error: solana_sdk::transaction::TransactionError,
  },
  /// The transaction was dropped before confirmation
  #[error("Transaction was dropped")]
  Dropped,
  /// An RPC round-trip exceeded its bounded timeout
  #[error("RPC round-trip timed out after {0:?}")]
  RpcTimeout(Duration),
  #[error(transparent)]
  Rpc(#[from] solana_client::client_error::ClientError),
  #[error(transparent)]
  Signer(#[from] solana_sdk::signer::SignerError),
}

pub type TransactionResult<T> = Result<T, TxError>;

/// Accumulates instructions and submits them as one atomic transaction,
/// polling for confirmation until the blockhash expires.
///
/// Every RPC round-trip is wrapped in `rpc_timeout`; a timeout surfaces as
/// `TxError::RpcTimeout` without any state being persisted, which lets the
/// caller release its row lock and retry on the next sweep.
pub struct TrxBuilder {
  rpc: Arc<RpcClient>,
  ixs: Vec<Instruction>,
  rpc_timeout: Duration,
}

impl TrxBuilder {
  pub fn new(rpc: Arc<RpcClient>, rpc_timeout: Duration) -> Self {
    Self {
      rpc,
      ixs: vec![],
      rpc_timeout,
    }
  }

  pub fn with_ixs(mut self, ixs: Vec<Instruction>) -> Self {
    self.ixs = ixs;
    self
  }

  pub fn add_ix(&mut self, ix: Instruction) {
    self.ixs.push(ix);
  }

  pub fn ixs(&self) -> &[Instruction] {
    &self.ixs
  }

  pub fn is_empty(&self) -> bool {
    self.ixs.is_empty()
  }

  async fn bounded<T, F>(&self, fut: F) -> TransactionResult<T>
  where
    F: std::future::Future<Output = solana_client::client_error::Result<T>>,
  {
    match tokio::time::timeout(self.rpc_timeout, fut).await {
      Ok(res) => Ok(res?),
      Err(_) => Err(TxError::RpcTimeout(self.rpc_timeout)),
    }
  }

  pub fn log_tx(sig: &Signature) {
    let url = "https://solana.fm/tx/";
    log::info!("Signature: {}{}", url, sig)
  }

  /// Build the signed transaction ready for sending.
  pub async fn build(&self, payer: &Keypair) -> TransactionResult<VersionedTransaction> {
    let bh = self.bounded(self.rpc.get_latest_blockhash()).await?;
    let msg = VersionedMessage::Legacy(Message::new_with_blockhash(
      self.ixs.as_ref(),
      Some(&payer.pubkey()),
      &bh,
    ));
    Ok(VersionedTransaction::try_new(msg, &[payer])?)
  }

  /// Send and poll until the transaction is confirmed, fails, or its
  /// blockhash expires.
  pub async fn send_and_confirm(&self, payer: &Keypair) -> TransactionResult<Signature> {
    const GET_STATUS_RETRIES: usize = 20; // 20 * 500ms = 10 seconds

    let tx = self.build(payer).await?;
    let rbh = *tx.message.recent_blockhash();
    let config = RpcSendTransactionConfig {
      skip_preflight: false,
      ..Default::default()
    };
    let sig = self
      .bounded(self.rpc.send_transaction_with_config(&tx, config))
      .await?;
    Self::log_tx(&sig);

    for _ in 0..GET_STATUS_RETRIES {
      let statuses = self
        .bounded(self.rpc.get_signature_statuses(&[sig]))
        .await?;
      match statuses.value.into_iter().next().flatten() {
        Some(status) => match status.err {
          None => return Ok(sig),
          Some(error) => {
            return Err(TxError::TxError {
              slot: status.slot,
              error,
            })
          }
        },
        None => {
          let valid = self
            .bounded(
              self
                .rpc
                .is_blockhash_valid(&rbh, CommitmentConfig::processed()),
            )
            .await?;
          if !valid {
            return Err(TxError::Dropped);
          }
          tokio::time::sleep(Duration::from_millis(500)).await;
        }
      }
    }
    Err(TxError::Dropped)
  }
}
