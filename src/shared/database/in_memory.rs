use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use crate::domains::ledger::models::{
    AdminSettings, AdminWallet, Currency, NewWalletTransaction, TransactionStatus, TransactionType,
    Wallet, WalletTransaction,
};
use crate::shared::database::{LedgerStore, LedgerTx};
use crate::shared::errors::LedgerError;

/// Step at which [`InMemoryLedgerStore::fail_next`] makes a transaction abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    AdjustWalletBalance,
    AdjustAdminCommission,
    AdjustTotalEarnings,
    InsertTransaction,
    Commit,
}

#[derive(Debug, Clone, Default)]
struct MemoryLedger {
    wallets: BTreeMap<i64, Wallet>,
    admin_wallets: BTreeMap<Currency, AdminWallet>,
    settings: Option<AdminSettings>,
    transactions: Vec<WalletTransaction>,
    next_wallet_id: i64,
    next_admin_wallet_id: i64,
    next_transaction_id: i64,
}

impl MemoryLedger {
    fn wallet_by_owner(&self, user_id: &str, currency: Currency) -> Option<&Wallet> {
        self.wallets
            .values()
            .find(|w| w.user_id == user_id && w.currency == currency)
    }

    fn completed_deposit(&self, reference_id: &str) -> Option<&WalletTransaction> {
        self.transactions.iter().find(|t| {
            t.transaction_type == TransactionType::Deposit
                && t.status == TransactionStatus::Completed
                && t.reference_id.as_deref() == Some(reference_id)
        })
    }
}

/// A thread-safe in-memory ledger store.
///
/// Each transaction holds the store's mutex for its whole lifetime, which
/// serializes settlements the way row locks do in PostgreSQL. Writes go to a
/// working copy that replaces the committed state only on `commit`, so a
/// dropped or failed transaction leaves nothing behind.
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    ledger: Arc<Mutex<MemoryLedger>>,
    fault: Arc<parking_lot::Mutex<Option<FaultPoint>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next transaction that reaches `point` fail with a
    /// `TransactionFailure`. The fault fires once.
    pub fn fail_next(&self, point: FaultPoint) {
        *self.fault.lock() = Some(point);
    }

    /// Seeds the settings singleton.
    pub async fn set_settings(&self, commission_rate: Decimal) {
        let now = Utc::now();
        let mut ledger = self.ledger.lock().await;
        let total_earnings = ledger
            .settings
            .as_ref()
            .map(|s| s.total_earnings)
            .unwrap_or(Decimal::ZERO);
        ledger.settings = Some(AdminSettings {
            commission_rate,
            total_earnings,
            created_at: now,
            updated_at: now,
        });
    }

    /// Every ledger entry of a wallet, oldest first.
    pub async fn transactions_of(&self, wallet_id: i64) -> Vec<WalletTransaction> {
        let ledger = self.ledger.lock().await;
        ledger
            .transactions
            .iter()
            .filter(|t| t.wallet_id == wallet_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, LedgerError> {
        let guard = self.ledger.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(InMemoryLedgerTx {
            guard,
            working,
            fault: self.fault.clone(),
        }))
    }

    async fn get_wallet(&self, user_id: &str, currency: Currency) -> Result<Option<Wallet>, LedgerError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.wallet_by_owner(user_id, currency).cloned())
    }

    async fn list_wallets(&self, user_id: &str) -> Result<Vec<Wallet>, LedgerError> {
        let ledger = self.ledger.lock().await;
        let mut wallets: Vec<Wallet> = ledger
            .wallets
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        wallets.sort_by_key(|w| w.currency);
        Ok(wallets)
    }

    async fn list_transactions(&self, wallet_id: i64, limit: i64) -> Result<Vec<WalletTransaction>, LedgerError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger
            .transactions
            .iter()
            .rev()
            .filter(|t| t.wallet_id == wallet_id)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn list_admin_wallets(&self) -> Result<Vec<AdminWallet>, LedgerError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.admin_wallets.values().cloned().collect())
    }

    async fn list_pending_withdrawals(&self, limit: i64) -> Result<Vec<WalletTransaction>, LedgerError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger
            .transactions
            .iter()
            .filter(|t| {
                t.transaction_type == TransactionType::Withdrawal
                    && t.status == TransactionStatus::Pending
            })
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn get_settings(&self) -> Result<Option<AdminSettings>, LedgerError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.settings.clone())
    }

    async fn find_deposit(&self, reference_id: &str) -> Result<Option<WalletTransaction>, LedgerError> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.completed_deposit(reference_id).cloned())
    }
}

struct InMemoryLedgerTx {
    guard: OwnedMutexGuard<MemoryLedger>,
    working: MemoryLedger,
    fault: Arc<parking_lot::Mutex<Option<FaultPoint>>>,
}

impl InMemoryLedgerTx {
    fn check_fault(&self, point: FaultPoint) -> Result<(), LedgerError> {
        let mut slot = self.fault.lock();
        if *slot == Some(point) {
            *slot = None;
            return Err(LedgerError::TransactionFailure {
                message: format!("injected fault at {:?}", point),
            });
        }
        Ok(())
    }
}

fn missing_row(what: &str) -> LedgerError {
    LedgerError::TransactionFailure {
        message: format!("{} row missing", what),
    }
}

#[async_trait]
impl LedgerTx for InMemoryLedgerTx {
    async fn lock_wallet(&mut self, user_id: &str, currency: Currency) -> Result<Option<Wallet>, LedgerError> {
        Ok(self.working.wallet_by_owner(user_id, currency).cloned())
    }

    async fn lock_or_create_wallet(&mut self, user_id: &str, currency: Currency) -> Result<Wallet, LedgerError> {
        if let Some(wallet) = self.working.wallet_by_owner(user_id, currency) {
            return Ok(wallet.clone());
        }
        self.working.next_wallet_id += 1;
        let now = Utc::now();
        let wallet = Wallet {
            id: self.working.next_wallet_id,
            user_id: user_id.to_string(),
            currency,
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        self.working.wallets.insert(wallet.id, wallet.clone());
        Ok(wallet)
    }

    async fn lock_wallet_by_id(&mut self, wallet_id: i64) -> Result<Option<Wallet>, LedgerError> {
        Ok(self.working.wallets.get(&wallet_id).cloned())
    }

    async fn adjust_wallet_balance(&mut self, wallet_id: i64, delta: Decimal) -> Result<Wallet, LedgerError> {
        self.check_fault(FaultPoint::AdjustWalletBalance)?;
        let wallet = self
            .working
            .wallets
            .get_mut(&wallet_id)
            .ok_or_else(|| missing_row("wallet"))?;
        // CHECK (balance >= 0)
        if wallet.balance + delta < Decimal::ZERO {
            return Err(LedgerError::TransactionFailure {
                message: "datastore rejected the operation".to_string(),
            });
        }
        wallet.balance += delta;
        wallet.updated_at = Utc::now();
        Ok(wallet.clone())
    }

    async fn find_deposit(&mut self, reference_id: &str) -> Result<Option<WalletTransaction>, LedgerError> {
        Ok(self.working.completed_deposit(reference_id).cloned())
    }

    async fn lock_or_create_admin_wallet(&mut self, currency: Currency) -> Result<AdminWallet, LedgerError> {
        if let Some(wallet) = self.working.admin_wallets.get(&currency) {
            return Ok(wallet.clone());
        }
        self.working.next_admin_wallet_id += 1;
        let now = Utc::now();
        let wallet = AdminWallet {
            id: self.working.next_admin_wallet_id,
            currency,
            balance: Decimal::ZERO,
            total_earned: Decimal::ZERO,
            total_withdrawn: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        self.working.admin_wallets.insert(currency, wallet.clone());
        Ok(wallet)
    }

    async fn adjust_admin_commission(&mut self, admin_wallet_id: i64, delta: Decimal) -> Result<AdminWallet, LedgerError> {
        self.check_fault(FaultPoint::AdjustAdminCommission)?;
        let wallet = self
            .working
            .admin_wallets
            .values_mut()
            .find(|w| w.id == admin_wallet_id)
            .ok_or_else(|| missing_row("admin wallet"))?;
        wallet.balance += delta;
        wallet.total_earned += delta;
        wallet.updated_at = Utc::now();
        Ok(wallet.clone())
    }

    async fn lock_or_create_settings(&mut self, default_rate: Decimal) -> Result<AdminSettings, LedgerError> {
        let now = Utc::now();
        let settings = self.working.settings.get_or_insert_with(|| AdminSettings {
            commission_rate: default_rate,
            total_earnings: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        });
        Ok(settings.clone())
    }

    async fn adjust_total_earnings(&mut self, delta: Decimal) -> Result<AdminSettings, LedgerError> {
        self.check_fault(FaultPoint::AdjustTotalEarnings)?;
        let settings = self
            .working
            .settings
            .as_mut()
            .ok_or_else(|| missing_row("admin settings"))?;
        settings.total_earnings += delta;
        settings.updated_at = Utc::now();
        Ok(settings.clone())
    }

    async fn set_commission_rate(&mut self, rate: Decimal) -> Result<AdminSettings, LedgerError> {
        let settings = self
            .working
            .settings
            .as_mut()
            .ok_or_else(|| missing_row("admin settings"))?;
        settings.commission_rate = rate;
        settings.updated_at = Utc::now();
        Ok(settings.clone())
    }

    async fn insert_transaction(&mut self, new: NewWalletTransaction) -> Result<WalletTransaction, LedgerError> {
        self.check_fault(FaultPoint::InsertTransaction)?;
        // deposit reference_id 유니크 인덱스
        if new.transaction_type == TransactionType::Deposit {
            if let Some(reference_id) = new.reference_id.as_deref() {
                let taken = self.working.transactions.iter().any(|t| {
                    t.transaction_type == TransactionType::Deposit
                        && t.reference_id.as_deref() == Some(reference_id)
                });
                if taken {
                    return Err(LedgerError::DuplicateSettlement {
                        reference_id: reference_id.to_string(),
                    });
                }
            }
        }

        self.working.next_transaction_id += 1;
        let transaction = WalletTransaction {
            id: self.working.next_transaction_id,
            wallet_id: new.wallet_id,
            transaction_type: new.transaction_type,
            amount: new.amount,
            commission: new.commission,
            currency: new.currency,
            status: new.status,
            reference_id: new.reference_id,
            transaction_hash: new.transaction_hash,
            description: new.description,
            created_at: Utc::now(),
        };
        self.working.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn lock_transaction(&mut self, transaction_id: i64) -> Result<Option<WalletTransaction>, LedgerError> {
        Ok(self
            .working
            .transactions
            .iter()
            .find(|t| t.id == transaction_id)
            .cloned())
    }

    async fn set_transaction_status(
        &mut self,
        transaction_id: i64,
        status: TransactionStatus,
        description: Option<String>,
    ) -> Result<WalletTransaction, LedgerError> {
        let transaction = self
            .working
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| missing_row("wallet transaction"))?;
        transaction.status = status;
        if description.is_some() {
            transaction.description = description;
        }
        Ok(transaction.clone())
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        self.check_fault(FaultPoint::Commit)?;
        let InMemoryLedgerTx { mut guard, working, .. } = *self;
        *guard = working;
        Ok(())
    }
}
