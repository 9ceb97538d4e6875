// =====================================================
// 동시성 통합 테스트
// =====================================================
// 같은 지갑 / 같은 참조 ID에 대한 동시 정산이 직렬화되는지 확인
// =====================================================

mod common;
use common::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use taskinn_ledger::domains::ledger::models::Currency;
use taskinn_ledger::shared::errors::LedgerError;

/// 테스트: 동시 출금으로 잔고가 음수가 되지 않음
///
/// 잔고 95에서 10씩 20건 동시 출금 → 9건 성공, 11건 잔고 부족
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdrawals_never_overdraw() {
    let ctx = setup_ledger().await;
    fund(&ctx.ledger, "alice", Currency::Usd, dec!(100)).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let ledger = ctx.ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .settle_withdrawal(withdrawal_request("alice", Currency::Usd, dec!(10)))
                .await
        }));
    }

    let mut succeeded = 0;
    let mut insufficient = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(LedgerError::InsufficientBalance { .. }) => insufficient += 1,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }
    assert_eq!(succeeded, 9);
    assert_eq!(insufficient, 11);

    let wallet = &ctx.ledger.wallets("alice").await.unwrap()[0];
    assert_eq!(wallet.balance, dec!(5.00));
    assert!(wallet.balance >= Decimal::ZERO);
    assert!(ctx.ledger.reconcile("alice", Currency::Usd).await.unwrap().is_balanced());
}

/// 테스트: 같은 참조 ID 동시 확인 → 한 번만 정산
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_confirmations_settle_once() {
    let ctx = setup_ledger().await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let ledger = ctx.ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .settle_deposit(deposit_request("bob", Currency::UsdtTrc20, dec!(50), "CP-RACE"))
                .await
        }));
    }

    let mut fresh = 0;
    let mut transaction_ids = Vec::new();
    for handle in handles {
        let receipt = handle.await.unwrap().expect("every confirmation returns a receipt");
        if !receipt.duplicate {
            fresh += 1;
        }
        transaction_ids.push(receipt.transaction.id);
    }
    assert_eq!(fresh, 1);
    transaction_ids.dedup();
    assert_eq!(transaction_ids.len(), 1);

    let wallet = &ctx.ledger.wallets("bob").await.unwrap()[0];
    assert_eq!(wallet.balance, dec!(47.5));
    assert_eq!(ctx.ledger.settings().await.unwrap().total_earnings, dec!(2.5));
}

/// 테스트: 여러 사용자 동시 입금 → 수수료 합계 일치
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_deposits_accumulate_commission() {
    let ctx = setup_ledger().await;

    let mut handles = Vec::new();
    for i in 0..25 {
        let ledger = ctx.ledger.clone();
        handles.push(tokio::spawn(async move {
            let user_id = format!("user-{}", i % 5);
            ledger
                .settle_deposit(deposit_request(&user_id, Currency::Usd, dec!(20), &format!("ORDER-C{}", i)))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // 25건 * 1.00
    assert_eq!(ctx.ledger.settings().await.unwrap().total_earnings, dec!(25.00));
    let admin_wallets = ctx.ledger.admin_wallets().await.unwrap();
    assert_eq!(admin_wallets[0].total_earned, dec!(25.00));

    for i in 0..5 {
        let user_id = format!("user-{}", i);
        let wallet = &ctx.ledger.wallets(&user_id).await.unwrap()[0];
        assert_eq!(wallet.balance, dec!(95.00));
        assert!(ctx.ledger.reconcile(&user_id, Currency::Usd).await.unwrap().is_balanced());
    }
}

/// 테스트: 입금과 출금이 섞여도 원장 대사 유지
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interleaved_deposits_and_withdrawals_reconcile() {
    let ctx = setup_ledger().await;
    fund(&ctx.ledger, "carol", Currency::UsdtTrc20, dec!(10)).await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let ledger = ctx.ledger.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                ledger
                    .settle_deposit(deposit_request("carol", Currency::UsdtTrc20, dec!(4), &format!("CP-MIX{}", i)))
                    .await
                    .map(|_| ())
            } else {
                ledger
                    .settle_withdrawal(withdrawal_request("carol", Currency::UsdtTrc20, dec!(3)))
                    .await
                    .map(|_| ())
            }
        }));
    }
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) | Err(LedgerError::InsufficientBalance { .. }) => {}
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    let reconciliation = ctx.ledger.reconcile("carol", Currency::UsdtTrc20).await.unwrap();
    assert!(reconciliation.is_balanced());
    assert!(reconciliation.balance >= Decimal::ZERO);
}
