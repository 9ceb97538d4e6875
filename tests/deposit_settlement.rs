// =====================================================
// 입금 정산 통합 테스트
// =====================================================

mod common;
use common::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use taskinn_ledger::domains::ledger::models::{Currency, TransactionStatus, TransactionType};
use taskinn_ledger::domains::payments::services::{IpnOutcome, PaymentsService};
use taskinn_ledger::shared::errors::LedgerError;

fn payments(ctx: &LedgerContext, card: Arc<StubCardRail>) -> PaymentsService {
    PaymentsService::new(
        ctx.ledger.clone(),
        card,
        Arc::new(StubCryptoRail::default()),
        "http://localhost:3002",
    )
}

/// 테스트: 기본 입금
///
/// 100 USD, 수수료 5% → 사용자 95, 관리자 지갑 5, total_earnings 5
#[tokio::test]
async fn test_deposit_credits_net_and_books_commission() {
    let ctx = setup_ledger().await;

    let receipt = ctx
        .ledger
        .settle_deposit(deposit_request("alice", Currency::Usd, dec!(100.00), "ORDER-100"))
        .await
        .expect("deposit should settle");

    assert!(!receipt.duplicate);
    assert_eq!(receipt.split.gross_amount, dec!(100.00));
    assert_eq!(receipt.split.commission, dec!(5.00));
    assert_eq!(receipt.split.net_amount, dec!(95.00));
    assert_eq!(receipt.wallet.balance, dec!(95.00));

    let tx = &receipt.transaction;
    assert_eq!(tx.transaction_type, TransactionType::Deposit);
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(tx.amount, dec!(95.00));
    assert_eq!(tx.commission, dec!(5.00));
    assert_eq!(tx.reference_id.as_deref(), Some("ORDER-100"));
    assert_eq!(
        tx.description.as_deref(),
        Some("PayPal deposit of 100.00 USD (commission 5.00 at 5%, net 95.00)")
    );

    let admin_wallets = ctx.ledger.admin_wallets().await.unwrap();
    let usd = admin_wallets.iter().find(|w| w.currency == Currency::Usd).unwrap();
    assert_eq!(usd.balance, dec!(5.00));
    assert_eq!(usd.total_earned, dec!(5.00));
    assert_eq!(usd.total_withdrawn, Decimal::ZERO);

    let settings = ctx.ledger.settings().await.unwrap();
    assert_eq!(settings.total_earnings, dec!(5.00));
}

/// 테스트: 지갑이 없으면 첫 입금에서 생성됨
#[tokio::test]
async fn test_first_deposit_creates_wallet() {
    let ctx = setup_ledger().await;
    assert!(ctx.ledger.wallets("newcomer").await.unwrap().is_empty());

    fund(&ctx.ledger, "newcomer", Currency::UsdtTrc20, dec!(20)).await;

    let wallets = ctx.ledger.wallets("newcomer").await.unwrap();
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].currency, Currency::UsdtTrc20);
    assert_eq!(wallets[0].balance, dec!(19.000000));
}

/// 테스트: 통화 scale 반올림 (commission + net == gross 유지)
#[tokio::test]
async fn test_commission_rounds_to_currency_scale() {
    let ctx = setup_ledger().await;

    let usd = ctx
        .ledger
        .settle_deposit(deposit_request("bob", Currency::Usd, dec!(33.33), "ORDER-ROUND"))
        .await
        .unwrap();
    // 33.33 * 0.05 = 1.6665 → 1.67
    assert_eq!(usd.split.commission, dec!(1.67));
    assert_eq!(usd.split.net_amount, dec!(31.66));
    assert_eq!(usd.split.commission + usd.split.net_amount, dec!(33.33));

    let usdt = ctx
        .ledger
        .settle_deposit(deposit_request("bob", Currency::UsdtTrc20, dec!(7.777777), "CP-ROUND"))
        .await
        .unwrap();
    // 7.777777 * 0.05 = 0.38888885 → 0.388889
    assert_eq!(usdt.split.commission, dec!(0.388889));
    assert_eq!(usdt.split.net_amount, dec!(7.388888));
}

/// 테스트: 같은 참조 ID 재전송은 잔고를 한 번만 바꿈
#[tokio::test]
async fn test_duplicate_reference_settles_once() {
    let ctx = setup_ledger().await;
    let request = deposit_request("carol", Currency::Usd, dec!(40), "ORDER-DUP");

    let first = ctx.ledger.settle_deposit(request.clone()).await.unwrap();
    let second = ctx.ledger.settle_deposit(request).await.unwrap();

    assert!(!first.duplicate);
    assert!(second.duplicate);
    assert_eq!(second.transaction.id, first.transaction.id);
    assert_eq!(second.split, first.split);
    assert_eq!(second.wallet.balance, dec!(38.00));

    let entries = ctx.store.transactions_of(first.wallet.id).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(ctx.ledger.settings().await.unwrap().total_earnings, dec!(2.00));
}

/// 테스트: 다른 사용자가 정산된 참조 ID를 쓰면 거절
#[tokio::test]
async fn test_reference_of_another_user_is_rejected() {
    let ctx = setup_ledger().await;
    ctx.ledger
        .settle_deposit(deposit_request("dave", Currency::Usd, dec!(10), "ORDER-OWNED"))
        .await
        .unwrap();

    let err = ctx
        .ledger
        .settle_deposit(deposit_request("eve", Currency::Usd, dec!(10), "ORDER-OWNED"))
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateSettlement { .. }));

    let err = ctx.ledger.settled_deposit("eve", "ORDER-OWNED").await.unwrap_err();
    assert!(matches!(err, LedgerError::DuplicateSettlement { .. }));
}

/// 테스트: 수수료율 변경은 이후 정산에만 적용
#[tokio::test]
async fn test_rate_change_applies_to_later_settlements() {
    let ctx = setup_ledger().await;
    fund(&ctx.ledger, "frank", Currency::Usd, dec!(100)).await;

    ctx.ledger.update_commission_rate(dec!(0.10)).await.unwrap();

    let receipt = ctx
        .ledger
        .settle_deposit(deposit_request("frank", Currency::Usd, dec!(100), "ORDER-RATE"))
        .await
        .unwrap();
    assert_eq!(receipt.split.commission_rate, dec!(0.10));
    assert_eq!(receipt.split.commission, dec!(10.00));
    assert_eq!(receipt.wallet.balance, dec!(185.00));

    let settings = ctx.ledger.settings().await.unwrap();
    assert_eq!(settings.commission_rate, dec!(0.10));
    assert_eq!(settings.total_earnings, dec!(15.00));
}

/// 테스트: 수수료율 0이면 전액 입금
#[tokio::test]
async fn test_zero_rate_credits_gross() {
    let ctx = setup_ledger().await;
    ctx.store.set_settings(Decimal::ZERO).await;

    let receipt = fund(&ctx.ledger, "grace", Currency::Usd, dec!(12.34)).await;
    assert_eq!(receipt.split.commission, Decimal::ZERO);
    assert_eq!(receipt.wallet.balance, dec!(12.34));
}

/// 테스트: 잘못된 입력은 DB에 닿기 전에 거절
#[tokio::test]
async fn test_invalid_deposits_are_rejected() {
    let ctx = setup_ledger().await;

    let cases = [
        deposit_request("henry", Currency::Usd, dec!(0), "ORDER-ZERO"),
        deposit_request("henry", Currency::Usd, dec!(-1), "ORDER-NEG"),
        deposit_request("henry", Currency::Usd, dec!(1.001), "ORDER-SCALE"),
        deposit_request("", Currency::Usd, dec!(1), "ORDER-NOUSER"),
        deposit_request("henry", Currency::Usd, dec!(1), "  "),
    ];
    for request in cases {
        let err = ctx.ledger.settle_deposit(request).await.unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "unexpected error: {:?}", err);
    }

    assert!(ctx.ledger.wallets("henry").await.unwrap().is_empty());
    assert!(matches!(ctx.ledger.settings().await, Err(LedgerError::SettingsNotFound)));
}

/// 테스트: 통화별 지갑은 독립
#[tokio::test]
async fn test_currencies_are_isolated() {
    let ctx = setup_ledger().await;
    fund(&ctx.ledger, "ivy", Currency::Usd, dec!(100)).await;
    fund(&ctx.ledger, "ivy", Currency::UsdtTrc20, dec!(50)).await;

    let wallets = ctx.ledger.wallets("ivy").await.unwrap();
    assert_eq!(wallets.len(), 2);
    let usd = wallets.iter().find(|w| w.currency == Currency::Usd).unwrap();
    let usdt = wallets.iter().find(|w| w.currency == Currency::UsdtTrc20).unwrap();
    assert_eq!(usd.balance, dec!(95));
    assert_eq!(usdt.balance, dec!(47.5));

    let admin_wallets = ctx.ledger.admin_wallets().await.unwrap();
    assert_eq!(admin_wallets.len(), 2);
    // total_earnings는 통화를 구분하지 않는 합계
    assert_eq!(ctx.ledger.settings().await.unwrap().total_earnings, dec!(7.5));
}

/// 테스트: 트랜잭션 내역은 최신순, limit 적용
#[tokio::test]
async fn test_transaction_history_is_newest_first() {
    let ctx = setup_ledger().await;
    for i in 1..=3 {
        ctx.ledger
            .settle_deposit(deposit_request("judy", Currency::Usd, dec!(10), &format!("ORDER-H{}", i)))
            .await
            .unwrap();
    }

    let history = ctx.ledger.transactions("judy", Currency::Usd, None).await.unwrap();
    let references: Vec<_> = history.iter().filter_map(|t| t.reference_id.as_deref()).collect();
    assert_eq!(references, vec!["ORDER-H3", "ORDER-H2", "ORDER-H1"]);

    let limited = ctx.ledger.transactions("judy", Currency::Usd, Some(2)).await.unwrap();
    assert_eq!(limited.len(), 2);

    let err = ctx.ledger.transactions("judy", Currency::UsdtTrc20, None).await.unwrap_err();
    assert!(matches!(err, LedgerError::WalletNotFound { .. }));
}

/// 테스트: 입금 후 원장 대사 일치
#[tokio::test]
async fn test_deposits_reconcile() {
    let ctx = setup_ledger().await;
    fund(&ctx.ledger, "ken", Currency::Usd, dec!(19.99)).await;
    fund(&ctx.ledger, "ken", Currency::Usd, dec!(0.01)).await;

    let reconciliation = ctx.ledger.reconcile("ken", Currency::Usd).await.unwrap();
    assert!(reconciliation.is_balanced());
    assert_eq!(reconciliation.pending_withdrawals, 0);
}

/// 테스트: PayPal 주문은 만든 사용자만 캡처할 수 있음
///
/// alice가 만든 주문을 bob이 캡처 → 거부, 레일 캡처 호출 없음, alice는 정상 캡처
#[tokio::test]
async fn test_paypal_order_is_captured_only_by_its_creator() {
    let ctx = setup_ledger().await;
    let card = Arc::new(StubCardRail::default());
    let payments = payments(&ctx, card.clone());

    let order = payments.create_paypal_order("alice", dec!(100.00)).await.unwrap();
    card.approve(&order.order_id, "alice", dec!(100.00));

    let err = payments
        .capture_paypal_order("bob", &order.order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)), "{:?}", err);
    assert_eq!(card.capture_calls.load(Ordering::SeqCst), 0);
    assert!(ctx.ledger.wallets("bob").await.unwrap().is_empty());

    let receipt = payments
        .capture_paypal_order("alice", &order.order_id)
        .await
        .expect("creator should capture");
    assert!(!receipt.duplicate);
    assert_eq!(receipt.wallet.user_id, "alice");
    assert_eq!(receipt.wallet.balance, dec!(95.00));
    assert_eq!(card.capture_calls.load(Ordering::SeqCst), 1);
}

/// 테스트: 통화 최소 단위보다 작은 IPN 금액은 정산 없이 수신 확인
#[tokio::test]
async fn test_ipn_below_currency_precision_is_acknowledged_only() {
    let ctx = setup_ledger().await;
    let payments = payments(&ctx, Arc::new(StubCardRail::default()));

    let (body, signature) = signed_ipn("CPDUST01", "alice", "0.00000040", 100);
    let outcome = payments
        .handle_ipn(body.as_bytes(), Some(&signature))
        .await
        .expect("sub-unit IPN should be acknowledged");

    assert!(matches!(outcome, IpnOutcome::Ignored { ref txn_id, status: 100 } if txn_id == "CPDUST01"));
    assert!(ctx.ledger.wallets("alice").await.unwrap().is_empty());
    assert!(ctx.ledger.admin_wallets().await.unwrap().is_empty());
}
