//! LedgerStore interface tests.
//!
//! These tests verify the contract of the LedgerStore trait.
//! Each storage implementation should run these tests. Every test uses its
//! own account ids so one store can run the whole suite.

use chrono::{TimeZone, Utc};
use futures::future::join_all;

use reward_ledger::domain::{AccountId, Amount};
use reward_ledger::storage::{LedgerStore, StorageError};

fn id(raw: i64) -> AccountId {
    AccountId::new(raw)
}

fn major(amount: i64) -> Amount {
    Amount::from_major(amount)
}

async fn balance_of<S: LedgerStore + ?Sized>(store: &S, account: AccountId) -> Amount {
    store
        .get_account(account)
        .await
        .expect("get should succeed")
        .expect("account should exist")
        .balance
}

// =============================================================================
// Account creation
// =============================================================================

pub async fn test_get_unknown_account<S: LedgerStore + ?Sized>(store: &S) {
    let account = store.get_account(id(100)).await.expect("get should succeed");
    assert!(account.is_none(), "unknown id should be None");
}

pub async fn test_create_if_absent_is_idempotent<S: LedgerStore + ?Sized>(store: &S) {
    let (account, created) = store
        .create_account_if_absent(id(110), Some(id(111)))
        .await
        .expect("create should succeed");
    assert!(created);
    assert_eq!(account.balance, Amount::ZERO);
    assert_eq!(account.referred_by, Some(id(111)));
    assert_eq!(account.last_bonus_at, None);

    let (again, created) = store
        .create_account_if_absent(id(110), Some(id(112)))
        .await
        .expect("create should succeed");
    assert!(!created, "second create should report existing");
    assert_eq!(again.referred_by, Some(id(111)), "referrer is immutable");
}

pub async fn test_create_drops_self_referral<S: LedgerStore + ?Sized>(store: &S) {
    let (account, created) = store
        .create_account_if_absent(id(120), Some(id(120)))
        .await
        .expect("create should succeed");
    assert!(created);
    assert_eq!(account.referred_by, None);
}

pub async fn test_concurrent_create_single_winner<S: LedgerStore + ?Sized>(store: &S) {
    let attempts = (0..10).map(|i| store.create_account_if_absent(id(130), Some(id(131 + i))));
    let results = join_all(attempts).await;

    let winners = results
        .into_iter()
        .map(|r| r.expect("create should succeed"))
        .filter(|(_, created)| *created)
        .count();
    assert_eq!(winners, 1, "exactly one create should win");
}

// =============================================================================
// adjust_balance
// =============================================================================

pub async fn test_adjust_balance_credit_and_debit<S: LedgerStore + ?Sized>(store: &S) {
    store.create_account_if_absent(id(200), None).await.unwrap();

    let balance = store.adjust_balance(id(200), major(5)).await.unwrap();
    assert_eq!(balance, major(5));

    let balance = store
        .adjust_balance(id(200), Amount::from_minor(-250))
        .await
        .unwrap();
    assert_eq!(balance, Amount::from_minor(250));
    assert_eq!(balance_of(store, id(200)).await, Amount::from_minor(250));
}

pub async fn test_adjust_balance_rejects_overdraw<S: LedgerStore + ?Sized>(store: &S) {
    store.create_account_if_absent(id(210), None).await.unwrap();
    store.adjust_balance(id(210), major(3)).await.unwrap();

    let err = store
        .adjust_balance(id(210), major(-4))
        .await
        .expect_err("overdraw should fail");
    assert!(
        matches!(err, StorageError::InsufficientFunds { balance, .. } if balance == major(3)),
        "unexpected error: {err}"
    );
    assert_eq!(balance_of(store, id(210)).await, major(3), "balance unchanged");
}

pub async fn test_adjust_balance_unknown_account<S: LedgerStore + ?Sized>(store: &S) {
    let err = store
        .adjust_balance(id(220), major(1))
        .await
        .expect_err("unknown account should fail");
    assert!(matches!(err, StorageError::AccountNotFound(a) if a == id(220)));
}

pub async fn test_concurrent_credits_are_not_lost<S: LedgerStore + ?Sized>(store: &S) {
    store.create_account_if_absent(id(230), None).await.unwrap();

    let credits = (0..25).map(|_| store.adjust_balance(id(230), Amount::from_minor(1)));
    for result in join_all(credits).await {
        result.expect("credit should succeed");
    }

    assert_eq!(balance_of(store, id(230)).await, Amount::from_minor(25));
}

// =============================================================================
// set_balance
// =============================================================================

pub async fn test_set_balance_clears_at_floor<S: LedgerStore + ?Sized>(store: &S) {
    store.create_account_if_absent(id(300), None).await.unwrap();
    store.adjust_balance(id(300), major(50)).await.unwrap();

    let prior = store
        .set_balance(id(300), Amount::ZERO, major(50))
        .await
        .unwrap();
    assert_eq!(prior, Some(major(50)));
    assert_eq!(balance_of(store, id(300)).await, Amount::ZERO);
}

pub async fn test_set_balance_below_floor_is_noop<S: LedgerStore + ?Sized>(store: &S) {
    store.create_account_if_absent(id(310), None).await.unwrap();
    store.adjust_balance(id(310), major(49)).await.unwrap();

    let prior = store
        .set_balance(id(310), Amount::ZERO, major(50))
        .await
        .unwrap();
    assert_eq!(prior, None);
    assert_eq!(balance_of(store, id(310)).await, major(49));
}

pub async fn test_set_balance_unknown_account<S: LedgerStore + ?Sized>(store: &S) {
    let err = store
        .set_balance(id(320), Amount::ZERO, Amount::ZERO)
        .await
        .expect_err("unknown account should fail");
    assert!(matches!(err, StorageError::AccountNotFound(_)));
}

pub async fn test_concurrent_set_balance_single_winner<S: LedgerStore + ?Sized>(store: &S) {
    store.create_account_if_absent(id(330), None).await.unwrap();
    store.adjust_balance(id(330), major(80)).await.unwrap();

    let swaps = (0..6).map(|_| store.set_balance(id(330), Amount::ZERO, major(50)));
    let paid: Vec<Amount> = join_all(swaps)
        .await
        .into_iter()
        .filter_map(|r| r.expect("swap should succeed"))
        .collect();

    assert_eq!(paid, vec![major(80)], "exactly one swap should apply");
    assert_eq!(balance_of(store, id(330)).await, Amount::ZERO);
}

// =============================================================================
// Bonus claims
// =============================================================================

pub async fn test_record_bonus_claim<S: LedgerStore + ?Sized>(store: &S) {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    store.create_account_if_absent(id(400), None).await.unwrap();

    store.record_bonus_claim(id(400), at).await.unwrap();

    let account = store.get_account(id(400)).await.unwrap().unwrap();
    assert_eq!(account.last_bonus_at, Some(at));
    assert_eq!(account.balance, Amount::ZERO, "stamp does not credit");
}

pub async fn test_record_bonus_claim_unknown_account<S: LedgerStore + ?Sized>(store: &S) {
    let err = store
        .record_bonus_claim(id(410), Utc::now())
        .await
        .expect_err("unknown account should fail");
    assert!(matches!(err, StorageError::AccountNotFound(_)));
}

pub async fn test_try_record_bonus_claim_checks_previous_stamp<S: LedgerStore + ?Sized>(
    store: &S,
) {
    let first = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
    let second = Utc.with_ymd_and_hms(2024, 3, 2, 9, 30, 0).unwrap();
    store.create_account_if_absent(id(420), None).await.unwrap();

    assert!(store.try_record_bonus_claim(id(420), None, first).await.unwrap());
    assert!(
        !store.try_record_bonus_claim(id(420), None, second).await.unwrap(),
        "a stale read of the stamp must not overwrite it"
    );
    assert!(store
        .try_record_bonus_claim(id(420), Some(first), second)
        .await
        .unwrap());

    let account = store.get_account(id(420)).await.unwrap().unwrap();
    assert_eq!(account.last_bonus_at, Some(second));
    assert_eq!(account.balance, Amount::ZERO, "stamp does not credit");
}

pub async fn test_try_record_bonus_claim_unknown_account<S: LedgerStore + ?Sized>(store: &S) {
    let err = store
        .try_record_bonus_claim(id(430), None, Utc::now())
        .await
        .expect_err("unknown account should fail");
    assert!(matches!(err, StorageError::AccountNotFound(_)));
}

pub async fn test_concurrent_bonus_stamps_single_winner<S: LedgerStore + ?Sized>(store: &S) {
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    store.create_account_if_absent(id(440), None).await.unwrap();

    let stamps = (0..8).map(|_| store.try_record_bonus_claim(id(440), None, at));
    let won = join_all(stamps)
        .await
        .into_iter()
        .filter(|r| *r.as_ref().expect("stamp should succeed"))
        .count();

    assert_eq!(won, 1, "exactly one claim should take the stamp");
}

// =============================================================================
// Referral edges
// =============================================================================

pub async fn test_referral_recorded_once<S: LedgerStore + ?Sized>(store: &S) {
    assert!(store.try_record_referral(id(500), id(501)).await.unwrap());
    assert!(!store.try_record_referral(id(500), id(501)).await.unwrap());
    assert!(
        !store.try_record_referral(id(502), id(501)).await.unwrap(),
        "a different referrer must not add a second edge"
    );

    assert_eq!(store.list_referrals(id(500)).await.unwrap(), vec![id(501)]);
    assert!(store.list_referrals(id(502)).await.unwrap().is_empty());
}

pub async fn test_self_referral_rejected<S: LedgerStore + ?Sized>(store: &S) {
    assert!(!store.try_record_referral(id(510), id(510)).await.unwrap());
    assert!(store.list_referrals(id(510)).await.unwrap().is_empty());
}

pub async fn test_concurrent_referrals_single_edge<S: LedgerStore + ?Sized>(store: &S) {
    let attempts = (0..8).map(|i| store.try_record_referral(id(521 + i), id(520)));
    let inserted = join_all(attempts)
        .await
        .into_iter()
        .filter(|r| *r.as_ref().expect("insert should succeed"))
        .count();
    assert_eq!(inserted, 1);
}

pub async fn test_list_referrals<S: LedgerStore + ?Sized>(store: &S) {
    for referred in [603, 601, 602] {
        assert!(store.try_record_referral(id(600), id(referred)).await.unwrap());
    }

    let mut listed = store.list_referrals(id(600)).await.unwrap();
    listed.sort();
    assert_eq!(listed, vec![id(601), id(602), id(603)]);
}

/// Run all LedgerStore tests against a store.
#[macro_export]
macro_rules! run_ledger_store_tests {
    ($store:expr) => {
        use $crate::storage::ledger_store_tests::*;

        // creation
        test_get_unknown_account($store).await;
        println!("  test_get_unknown_account: PASSED");

        test_create_if_absent_is_idempotent($store).await;
        println!("  test_create_if_absent_is_idempotent: PASSED");

        test_create_drops_self_referral($store).await;
        println!("  test_create_drops_self_referral: PASSED");

        test_concurrent_create_single_winner($store).await;
        println!("  test_concurrent_create_single_winner: PASSED");

        // adjust_balance
        test_adjust_balance_credit_and_debit($store).await;
        println!("  test_adjust_balance_credit_and_debit: PASSED");

        test_adjust_balance_rejects_overdraw($store).await;
        println!("  test_adjust_balance_rejects_overdraw: PASSED");

        test_adjust_balance_unknown_account($store).await;
        println!("  test_adjust_balance_unknown_account: PASSED");

        test_concurrent_credits_are_not_lost($store).await;
        println!("  test_concurrent_credits_are_not_lost: PASSED");

        // set_balance
        test_set_balance_clears_at_floor($store).await;
        println!("  test_set_balance_clears_at_floor: PASSED");

        test_set_balance_below_floor_is_noop($store).await;
        println!("  test_set_balance_below_floor_is_noop: PASSED");

        test_set_balance_unknown_account($store).await;
        println!("  test_set_balance_unknown_account: PASSED");

        test_concurrent_set_balance_single_winner($store).await;
        println!("  test_concurrent_set_balance_single_winner: PASSED");

        // bonus claims
        test_record_bonus_claim($store).await;
        println!("  test_record_bonus_claim: PASSED");

        test_record_bonus_claim_unknown_account($store).await;
        println!("  test_record_bonus_claim_unknown_account: PASSED");

        test_try_record_bonus_claim_checks_previous_stamp($store).await;
        println!("  test_try_record_bonus_claim_checks_previous_stamp: PASSED");

        test_try_record_bonus_claim_unknown_account($store).await;
        println!("  test_try_record_bonus_claim_unknown_account: PASSED");

        test_concurrent_bonus_stamps_single_winner($store).await;
        println!("  test_concurrent_bonus_stamps_single_winner: PASSED");

        // referral edges
        test_referral_recorded_once($store).await;
        println!("  test_referral_recorded_once: PASSED");

        test_self_referral_rejected($store).await;
        println!("  test_self_referral_rejected: PASSED");

        test_concurrent_referrals_single_edge($store).await;
        println!("  test_concurrent_referrals_single_edge: PASSED");

        test_list_referrals($store).await;
        println!("  test_list_referrals: PASSED");
    };
}
