use std::sync::Arc;
use std::time::Duration;

use anchor_lang::AccountDeserialize;
use log::info;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;

use crate::ixs::*;
use crate::pdas::{duel_pda, pool_pda};
use crate::trx_builder::{TransactionResult, TrxBuilder};

/// Server-side client for the authority wallet: dispatches the escrow
/// instructions the coordinator drives and reads on-chain state back for
/// reconciliation. The on-chain account is always authoritative.
pub struct RelayClient {
  rpc: Arc<RpcClient>,
  signer: Arc<Keypair>,
  pub escrow_program: Pubkey,
  pub amm_program: Pubkey,
  pub fee_collector: Pubkey,
  rpc_timeout: Duration,
}

impl RelayClient {
  pub fn new(
    rpc_url: String,
    signer: Keypair,
    escrow_program: Pubkey,
    amm_program: Pubkey,
    fee_collector: Pubkey,
    rpc_timeout: Duration,
  ) -> Self {
    let signer = Arc::new(signer);
    info!("Relay using wallet: {}", signer.pubkey());
    Self {
      rpc: Arc::new(RpcClient::new_with_timeout(rpc_url, rpc_timeout)),
      signer,
      escrow_program,
      amm_program,
      fee_collector,
      rpc_timeout,
    }
  }

  pub fn rpc(&self) -> Arc<RpcClient> {
    self.rpc.clone()
  }

  pub fn authority(&self) -> Pubkey {
    self.signer.pubkey()
  }

  fn new_tx(&self) -> TrxBuilder {
    TrxBuilder::new(self.rpc.clone(), self.rpc_timeout)
  }

  pub async fn start_duel(
    &self,
    duel_id: u64,
    entry_price: u64,
  ) -> TransactionResult<Signature> {
    let ix = start_duel_ix(&self.escrow_program, duel_id, &self.authority(), entry_price);
    self
      .new_tx()
      .with_ixs(vec![ix])
      .send_and_confirm(&self.signer)
      .await
  }

  pub async fn resolve_duel(
    &self,
    duel_id: u64,
    player1: &Pubkey,
    player2: &Pubkey,
    stake_mint: &Pubkey,
    exit_price: u64,
  ) -> TransactionResult<Signature> {
    let ix = resolve_duel_ix(
      &self.escrow_program,
      duel_id,
      &self.authority(),
      player1,
      player2,
      stake_mint,
      &self.fee_collector,
      exit_price,
    );
    self
      .new_tx()
      .with_ixs(vec![ix])
      .send_and_confirm(&self.signer)
      .await
  }

  pub async fn cancel_duel(
    &self,
    duel_id: u64,
    player1: &Pubkey,
    player2: &Pubkey,
    stake_mint: &Pubkey,
  ) -> TransactionResult<Signature> {
    let ix = cancel_duel_ix(
      &self.escrow_program,
      duel_id,
      &self.authority(),
      player1,
      player2,
      stake_mint,
    );
    self
      .new_tx()
      .with_ixs(vec![ix])
      .send_and_confirm(&self.signer)
      .await
  }

  /// Read a duel account straight off the chain. None if the account does
  /// not exist (never created, or closed).
  pub async fn fetch_duel(
    &self,
    duel_id: u64,
  ) -> anyhow::Result<Option<duel_escrow::state::Duel>> {
    let (address, _) = duel_pda(&self.escrow_program, duel_id);
    match self.rpc.get_account(&address).await {
      Ok(account) => {
        let duel = duel_escrow::state::Duel::try_deserialize(&mut account.data.as_slice())?;
        Ok(Some(duel))
      }
      Err(_) => Ok(None),
    }
  }

  pub async fn fetch_pool(
    &self,
    authority: &Pubkey,
    yes_mint: &Pubkey,
    no_mint: &Pubkey,
  ) -> anyhow::Result<Option<outcome_amm::state::Pool>> {
    let (address, _) = pool_pda(&self.amm_program, authority, yes_mint, no_mint);
    match self.rpc.get_account(&address).await {
      Ok(account) => {
        let pool = outcome_amm::state::Pool::try_deserialize(&mut account.data.as_slice())?;
        Ok(Some(pool))
      }
      Err(_) => Ok(None),
    }
  }
}
