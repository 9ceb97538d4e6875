use std::future::Future;
use std::sync::Arc;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use crate::domains::ledger::models::{
    is_valid_commission_rate, AdminSettings, AdminWallet, CommissionSplit, Currency,
    DepositReceipt, DepositRequest, NewWalletTransaction, PaymentRail, Reconciliation,
    ReviewedWithdrawal, TransactionStatus, TransactionType, Wallet, WalletTransaction,
    WithdrawalReceipt, WithdrawalRequest,
};
use crate::domains::ledger::services::validation;
use crate::shared::database::{LedgerStore, LedgerTx};
use crate::shared::errors::LedgerError;

const MAX_PAGE_SIZE: i64 = 100;

/// 정산 엔진
/// Settlement engine: every balance change in the system goes through here
///
/// 모든 정산은 하나의 LedgerTx 안에서 실행됩니다.
/// 1. 사용자 지갑 잠금
/// 2. 관리자 지갑 잠금 (없으면 생성)
/// 3. 관리자 설정 잠금 (없으면 기본 수수료율로 생성)
/// 4. 잔고 / 수수료 / 원장 기록
/// 5. 커밋 (실패 시 전부 롤백)
///
/// 정산 작업은 tokio::spawn 으로 분리되어 있어서 HTTP 요청이 끊겨도 중간에 멈추지 않습니다.
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn LedgerStore>,
    default_commission_rate: Decimal,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LedgerStore>, default_commission_rate: Decimal) -> Self {
        Self {
            store,
            default_commission_rate,
        }
    }

    // =====================================================
    // 입금 정산
    // =====================================================

    /// 입금 정산 (결제 레일에서 확정된 입금만)
    /// Credit a rail-confirmed deposit net of commission
    ///
    /// 같은 reference_id가 이미 정산되었으면 잔고를 건드리지 않고
    /// 기존 결과를 `duplicate: true`로 돌려줍니다.
    pub async fn settle_deposit(&self, request: DepositRequest) -> Result<DepositReceipt, LedgerError> {
        validation::validate_user_id(&request.user_id)?;
        validation::validate_amount(request.gross_amount, request.currency)?;
        validation::validate_reference_id(&request.reference_id)?;

        let engine = self.clone();
        let user_id = request.user_id.clone();
        let reference_id = request.reference_id.clone();
        let result = detached(async move { engine.apply_deposit(request).await }).await;

        match result {
            // 동시에 들어온 같은 참조 ID: 유니크 인덱스에서 걸린 쪽은 먼저 커밋된 결과를 돌려준다
            Err(LedgerError::DuplicateSettlement { .. }) => {
                match self.settled_deposit(&user_id, &reference_id).await? {
                    Some(receipt) => Ok(receipt),
                    None => Err(LedgerError::DuplicateSettlement { reference_id }),
                }
            }
            other => other,
        }
    }

    #[instrument(
        name = "settle_deposit",
        skip(self, request),
        fields(
            user_id = %request.user_id,
            currency = %request.currency,
            gross = %request.gross_amount,
            reference_id = %request.reference_id,
        )
    )]
    async fn apply_deposit(&self, request: DepositRequest) -> Result<DepositReceipt, LedgerError> {
        let mut tx = self.store.begin().await?;

        let wallet = tx.lock_or_create_wallet(&request.user_id, request.currency).await?;

        // 지갑 잠금을 잡은 상태에서 중복 확인
        if let Some(prior) = tx.find_deposit(&request.reference_id).await? {
            if prior.wallet_id != wallet.id {
                warn!(prior_wallet_id = prior.wallet_id, "Reference id already settled for another wallet");
                return Err(LedgerError::DuplicateSettlement {
                    reference_id: request.reference_id,
                });
            }
            info!(transaction_id = prior.id, "Deposit already settled, returning prior result");
            return Ok(DepositReceipt {
                split: CommissionSplit::from_deposit(&prior),
                wallet,
                transaction: prior,
                duplicate: true,
            });
        }

        let (admin_wallet, settings) = self.lock_commission_accounts(tx.as_mut(), request.currency).await?;
        let split = CommissionSplit::compute(request.gross_amount, settings.commission_rate, request.currency);

        let wallet = tx.adjust_wallet_balance(wallet.id, split.net_amount).await?;
        book_commission(tx.as_mut(), &admin_wallet, split.commission).await?;

        let transaction = tx
            .insert_transaction(NewWalletTransaction {
                wallet_id: wallet.id,
                transaction_type: TransactionType::Deposit,
                amount: split.net_amount,
                commission: split.commission,
                currency: request.currency,
                status: TransactionStatus::Completed,
                reference_id: Some(request.reference_id.clone()),
                transaction_hash: request.transaction_hash.clone(),
                description: Some(format!(
                    "{} deposit of {} {} (commission {} at {}%, net {})",
                    request.rail.display_name(),
                    split.gross_amount,
                    request.currency,
                    split.commission,
                    percent(split.commission_rate),
                    split.net_amount,
                )),
            })
            .await?;

        tx.commit().await?;

        info!(
            transaction_id = transaction.id,
            net = %split.net_amount,
            commission = %split.commission,
            balance = %wallet.balance,
            "Deposit settled"
        );

        Ok(DepositReceipt {
            wallet,
            transaction,
            split,
            duplicate: false,
        })
    }

    /// 이미 정산된 입금 조회 (소유자 확인 포함)
    /// Prior settlement of `reference_id` if it belongs to `user_id`
    pub async fn settled_deposit(
        &self,
        user_id: &str,
        reference_id: &str,
    ) -> Result<Option<DepositReceipt>, LedgerError> {
        let Some(prior) = self.store.find_deposit(reference_id).await? else {
            return Ok(None);
        };

        let wallets = self.store.list_wallets(user_id).await?;
        let Some(wallet) = wallets.into_iter().find(|w| w.id == prior.wallet_id) else {
            return Err(LedgerError::DuplicateSettlement {
                reference_id: reference_id.to_string(),
            });
        };

        Ok(Some(DepositReceipt {
            split: CommissionSplit::from_deposit(&prior),
            wallet,
            transaction: prior,
            duplicate: true,
        }))
    }

    // =====================================================
    // 출금 정산
    // =====================================================

    /// 출금 정산
    /// Debit the gross amount; the payout rail is told to send the net amount
    ///
    /// USD(PayPal)는 바로 Completed, USDT_TRC20(CoinPayments)는 운영자 검토를 위해 Pending.
    /// Pending 상태에서도 잔고는 즉시 차감됩니다.
    pub async fn settle_withdrawal(&self, request: WithdrawalRequest) -> Result<WithdrawalReceipt, LedgerError> {
        validation::validate_user_id(&request.user_id)?;
        validation::validate_amount(request.gross_amount, request.currency)?;
        validation::validate_payout_target(&request.payout_target, request.currency)?;

        let engine = self.clone();
        detached(async move { engine.apply_withdrawal(request).await }).await
    }

    #[instrument(
        name = "settle_withdrawal",
        skip(self, request),
        fields(
            user_id = %request.user_id,
            currency = %request.currency,
            gross = %request.gross_amount,
        )
    )]
    async fn apply_withdrawal(&self, request: WithdrawalRequest) -> Result<WithdrawalReceipt, LedgerError> {
        let mut tx = self.store.begin().await?;

        let wallet = tx
            .lock_wallet(&request.user_id, request.currency)
            .await?
            .ok_or_else(|| LedgerError::WalletNotFound {
                user_id: request.user_id.clone(),
                currency: request.currency,
            })?;

        if wallet.balance < request.gross_amount {
            warn!(available = %wallet.balance, "Withdrawal rejected: insufficient balance");
            return Err(LedgerError::InsufficientBalance {
                available: wallet.balance,
                requested: request.gross_amount,
            });
        }

        let (admin_wallet, settings) = self.lock_commission_accounts(tx.as_mut(), request.currency).await?;
        let split = CommissionSplit::compute(request.gross_amount, settings.commission_rate, request.currency);

        let rail = PaymentRail::for_currency(request.currency);
        let status = if rail.requires_manual_review() {
            TransactionStatus::Pending
        } else {
            TransactionStatus::Completed
        };
        let reference_id = payout_reference();

        let wallet = tx.adjust_wallet_balance(wallet.id, -request.gross_amount).await?;
        book_commission(tx.as_mut(), &admin_wallet, split.commission).await?;

        let transaction = tx
            .insert_transaction(NewWalletTransaction {
                wallet_id: wallet.id,
                transaction_type: TransactionType::Withdrawal,
                amount: -request.gross_amount,
                commission: split.commission,
                currency: request.currency,
                status,
                reference_id: Some(reference_id.clone()),
                transaction_hash: Some(request.payout_target.trim().to_string()),
                description: Some(format!(
                    "{} withdrawal of {} {} (commission {}, net {})",
                    rail.display_name(),
                    split.gross_amount,
                    request.currency,
                    split.commission,
                    split.net_amount,
                )),
            })
            .await?;

        tx.commit().await?;

        info!(
            transaction_id = transaction.id,
            reference_id = %reference_id,
            status = status.as_str(),
            payout = %split.net_amount,
            balance = %wallet.balance,
            "Withdrawal settled"
        );

        Ok(WithdrawalReceipt {
            wallet,
            transaction,
            split,
            reference_id,
            rail,
            status,
        })
    }

    // =====================================================
    // 운영자 검토 (Pending 출금)
    // =====================================================

    /// 출금 승인: Pending → Completed (잔고 변화 없음)
    #[instrument(skip(self))]
    pub async fn confirm_withdrawal(&self, transaction_id: i64) -> Result<ReviewedWithdrawal, LedgerError> {
        let engine = self.clone();
        detached(async move {
            let mut tx = engine.store.begin().await?;
            let pending = lock_pending_withdrawal(tx.as_mut(), transaction_id).await?;
            let wallet = lock_owner_wallet(tx.as_mut(), &pending).await?;

            let transaction = tx
                .set_transaction_status(transaction_id, TransactionStatus::Completed, None)
                .await?;
            tx.commit().await?;

            info!(transaction_id, "Withdrawal confirmed");
            Ok(ReviewedWithdrawal { wallet, transaction })
        })
        .await
    }

    /// 출금 거절: Pending → Failed
    /// Restores the gross amount to the user and reverses the commission
    #[instrument(skip(self))]
    pub async fn reject_withdrawal(
        &self,
        transaction_id: i64,
        reason: Option<String>,
    ) -> Result<ReviewedWithdrawal, LedgerError> {
        let engine = self.clone();
        detached(async move {
            let mut tx = engine.store.begin().await?;
            let pending = lock_pending_withdrawal(tx.as_mut(), transaction_id).await?;
            let wallet = lock_owner_wallet(tx.as_mut(), &pending).await?;
            let (admin_wallet, _) = engine.lock_commission_accounts(tx.as_mut(), pending.currency).await?;

            // amount는 음수로 기록되어 있으므로 부호를 뒤집어 되돌림
            let wallet = tx.adjust_wallet_balance(wallet.id, -pending.amount).await?;
            book_commission(tx.as_mut(), &admin_wallet, -pending.commission).await?;

            let reason = reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| "no reason given".to_string());
            let description = match &pending.description {
                Some(existing) => format!("{} | rejected: {}", existing, reason),
                None => format!("rejected: {}", reason),
            };
            let transaction = tx
                .set_transaction_status(transaction_id, TransactionStatus::Failed, Some(description))
                .await?;
            tx.commit().await?;

            info!(
                transaction_id,
                restored = %(-pending.amount),
                balance = %wallet.balance,
                "Withdrawal rejected and refunded"
            );
            Ok(ReviewedWithdrawal { wallet, transaction })
        })
        .await
    }

    // =====================================================
    // 관리자 설정
    // =====================================================

    pub async fn settings(&self) -> Result<AdminSettings, LedgerError> {
        self.store.get_settings().await?.ok_or(LedgerError::SettingsNotFound)
    }

    /// 수수료율 변경 (0 <= rate < 1)
    /// Only affects settlements that start after the change commits
    #[instrument(skip(self), fields(rate = %rate))]
    pub async fn update_commission_rate(&self, rate: Decimal) -> Result<AdminSettings, LedgerError> {
        if !is_valid_commission_rate(rate) {
            return Err(LedgerError::validation(
                "Commission rate must be between 0 (inclusive) and 1 (exclusive)",
            ));
        }

        let engine = self.clone();
        detached(async move {
            let mut tx = engine.store.begin().await?;
            let previous = tx.lock_or_create_settings(engine.default_commission_rate).await?;
            let settings = tx.set_commission_rate(rate).await?;
            tx.commit().await?;

            info!(previous = %previous.commission_rate, "Commission rate updated");
            Ok(settings)
        })
        .await
    }

    // =====================================================
    // 조회
    // =====================================================

    pub async fn wallets(&self, user_id: &str) -> Result<Vec<Wallet>, LedgerError> {
        self.store.list_wallets(user_id).await
    }

    /// 지갑 트랜잭션 목록 (최신순, 최대 100건)
    pub async fn transactions(
        &self,
        user_id: &str,
        currency: Currency,
        limit: Option<i64>,
    ) -> Result<Vec<WalletTransaction>, LedgerError> {
        let wallet = self.wallet(user_id, currency).await?;
        let limit = limit.unwrap_or(50).clamp(1, MAX_PAGE_SIZE);
        self.store.list_transactions(wallet.id, limit).await
    }

    pub async fn admin_wallets(&self) -> Result<Vec<AdminWallet>, LedgerError> {
        self.store.list_admin_wallets().await
    }

    pub async fn pending_withdrawals(&self, limit: Option<i64>) -> Result<Vec<WalletTransaction>, LedgerError> {
        let limit = limit.unwrap_or(50).clamp(1, MAX_PAGE_SIZE);
        self.store.list_pending_withdrawals(limit).await
    }

    /// 원장 대사: balance == 실패하지 않은 트랜잭션 amount 합계
    pub async fn reconcile(&self, user_id: &str, currency: Currency) -> Result<Reconciliation, LedgerError> {
        let wallet = self.wallet(user_id, currency).await?;
        let entries = self.store.list_transactions(wallet.id, i64::MAX).await?;

        let ledger_sum = entries
            .iter()
            .filter(|t| t.status.counts_toward_balance())
            .map(|t| t.amount)
            .sum();
        let pending_withdrawals = entries
            .iter()
            .filter(|t| t.transaction_type == TransactionType::Withdrawal && t.status == TransactionStatus::Pending)
            .count();

        Ok(Reconciliation {
            wallet_id: wallet.id,
            currency,
            balance: wallet.balance,
            ledger_sum,
            pending_withdrawals,
        })
    }

    async fn wallet(&self, user_id: &str, currency: Currency) -> Result<Wallet, LedgerError> {
        self.store
            .get_wallet(user_id, currency)
            .await?
            .ok_or_else(|| LedgerError::WalletNotFound {
                user_id: user_id.to_string(),
                currency,
            })
    }

    // 관리자 지갑 → 설정 순서로 잠금
    async fn lock_commission_accounts(
        &self,
        tx: &mut dyn LedgerTx,
        currency: Currency,
    ) -> Result<(AdminWallet, AdminSettings), LedgerError> {
        let admin_wallet = tx.lock_or_create_admin_wallet(currency).await?;
        let settings = tx.lock_or_create_settings(self.default_commission_rate).await?;
        Ok((admin_wallet, settings))
    }
}

/// 수수료를 관리자 지갑과 total_earnings에 반영 (음수면 환원)
async fn book_commission(
    tx: &mut dyn LedgerTx,
    admin_wallet: &AdminWallet,
    commission: Decimal,
) -> Result<(), LedgerError> {
    tx.adjust_admin_commission(admin_wallet.id, commission).await?;
    tx.adjust_total_earnings(commission).await?;
    Ok(())
}

async fn lock_pending_withdrawal(
    tx: &mut dyn LedgerTx,
    transaction_id: i64,
) -> Result<WalletTransaction, LedgerError> {
    let transaction = tx
        .lock_transaction(transaction_id)
        .await?
        .ok_or(LedgerError::TransactionNotFound { id: transaction_id })?;

    if transaction.transaction_type != TransactionType::Withdrawal
        || transaction.status != TransactionStatus::Pending
    {
        warn!(
            transaction_id,
            status = transaction.status.as_str(),
            "Review rejected: not a pending withdrawal"
        );
        return Err(LedgerError::InvalidTransactionState {
            id: transaction_id,
            status: transaction.status,
        });
    }
    Ok(transaction)
}

async fn lock_owner_wallet(
    tx: &mut dyn LedgerTx,
    transaction: &WalletTransaction,
) -> Result<Wallet, LedgerError> {
    tx.lock_wallet_by_id(transaction.wallet_id)
        .await?
        .ok_or_else(|| LedgerError::TransactionFailure {
            message: format!("wallet {} of transaction {} is missing", transaction.wallet_id, transaction.id),
        })
}

/// 출금 참조 ID: WD-<uuid>
fn payout_reference() -> String {
    format!("WD-{}", Uuid::new_v4().simple())
}

fn percent(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).normalize()
}

/// 요청 future와 분리된 태스크에서 실행
/// Runs the unit of work on its own task so a dropped caller cannot cancel it halfway
async fn detached<T, F>(work: F) -> Result<T, LedgerError>
where
    F: Future<Output = Result<T, LedgerError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Settlement task aborted");
            Err(LedgerError::TransactionFailure {
                message: "settlement task aborted".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::database::InMemoryLedgerStore;
    use rust_decimal_macros::dec;

    fn engine() -> (LedgerService, Arc<InMemoryLedgerStore>) {
        let store = Arc::new(InMemoryLedgerStore::new());
        (LedgerService::new(store.clone(), dec!(0.05)), store)
    }

    fn deposit(user: &str, amount: Decimal, reference: &str) -> DepositRequest {
        DepositRequest {
            user_id: user.to_string(),
            currency: Currency::Usd,
            gross_amount: amount,
            reference_id: reference.to_string(),
            rail: PaymentRail::PayPal,
            transaction_hash: None,
        }
    }

    #[tokio::test]
    async fn deposit_creates_settings_with_default_rate() {
        let (engine, _) = engine();
        assert!(matches!(engine.settings().await, Err(LedgerError::SettingsNotFound)));

        let receipt = engine.settle_deposit(deposit("u1", dec!(100), "ORDER-1")).await.unwrap();
        assert_eq!(receipt.split.commission, dec!(5.00));
        assert_eq!(receipt.wallet.balance, dec!(95.00));

        let settings = engine.settings().await.unwrap();
        assert_eq!(settings.commission_rate, dec!(0.05));
        assert_eq!(settings.total_earnings, dec!(5.00));
    }

    #[tokio::test]
    async fn withdrawal_from_missing_wallet_is_not_found() {
        let (engine, _) = engine();
        let err = engine
            .settle_withdrawal(WithdrawalRequest {
                user_id: "ghost".to_string(),
                currency: Currency::Usd,
                gross_amount: dec!(10),
                payout_target: "ghost@example.com".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::WalletNotFound { .. }));
    }

    #[tokio::test]
    async fn reference_owned_by_another_user_is_rejected() {
        let (engine, _) = engine();
        engine.settle_deposit(deposit("alice", dec!(10), "ORDER-X")).await.unwrap();

        let err = engine.settle_deposit(deposit("bob", dec!(10), "ORDER-X")).await.unwrap_err();
        assert!(matches!(err, LedgerError::DuplicateSettlement { .. }));
        assert!(engine.wallets("bob").await.unwrap().iter().all(|w| w.balance.is_zero()));
    }

    #[tokio::test]
    async fn commission_rate_update_validates_range() {
        let (engine, _) = engine();
        assert!(matches!(
            engine.update_commission_rate(dec!(1)).await,
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            engine.update_commission_rate(dec!(-0.01)).await,
            Err(LedgerError::Validation(_))
        ));
        let settings = engine.update_commission_rate(dec!(0.1)).await.unwrap();
        assert_eq!(settings.commission_rate, dec!(0.1));
    }

    #[tokio::test]
    async fn confirming_twice_is_an_invalid_state() {
        let (engine, _) = engine();
        let mut request = deposit("u1", dec!(50), "CP-1");
        request.currency = Currency::UsdtTrc20;
        request.rail = PaymentRail::CoinPayments;
        engine.settle_deposit(request).await.unwrap();

        let receipt = engine
            .settle_withdrawal(WithdrawalRequest {
                user_id: "u1".to_string(),
                currency: Currency::UsdtTrc20,
                gross_amount: dec!(20),
                payout_target: "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(receipt.status, TransactionStatus::Pending);
        assert!(receipt.reference_id.starts_with("WD-"));

        let reviewed = engine.confirm_withdrawal(receipt.transaction.id).await.unwrap();
        assert_eq!(reviewed.transaction.status, TransactionStatus::Completed);

        let err = engine.confirm_withdrawal(receipt.transaction.id).await.unwrap_err();
        assert!(matches!(err, LedgerError::InvalidTransactionState { .. }));
        assert!(matches!(
            engine.reject_withdrawal(9999, None).await,
            Err(LedgerError::TransactionNotFound { id: 9999 })
        ));
    }
}
