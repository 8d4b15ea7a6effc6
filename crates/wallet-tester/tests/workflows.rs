//! Workflow behaviour against recording collaborators.

mod common;

use chain_sol::{Blockhash, CommitmentLevel, Pubkey, Signature, SolError, WireTransaction};
use common::{instruction, Event, Harness, Journal, MockConnection, RecordingWallet};
use wallet_tester::instructions::{PROPOSAL_ACCOUNT, PROPOSAL_IX_DATA, PROPOSAL_PROGRAM_ID};
use wallet_tester::{
    make_transaction, ActionDispatcher, ActionOutcome, ActionsConfig, Command, WalletCapabilities,
    WalletTesterConfig, WalletTesterError, REFERENCE_INSTRUCTIONS,
};

fn dispatcher(harness: &Harness, wallet: WalletCapabilities) -> ActionDispatcher {
    ActionDispatcher::new(harness.connection.clone(), wallet).with_sink(harness.sink.clone())
}

// ─── Envelope builder ──────────────────────────────────────────────

#[tokio::test]
async fn envelope_keeps_input_order_for_any_length() {
    let journal = Journal::default();
    let connection = MockConnection::new(journal);

    for len in 1..=6u8 {
        let input: Vec<_> = (0..len).map(|i| instruction(len * 10 + i)).collect();
        let tx = make_transaction(&connection, &input, None, CommitmentLevel::Finalized)
            .await
            .unwrap();
        assert_eq!(tx.instructions, input);
    }
}

#[tokio::test]
async fn reference_scenario_envelope() {
    let journal = Journal::default();
    let connection = MockConnection::new(journal.clone());
    let payer = Pubkey::new_from_array([0xF0; 32]);

    let tx = make_transaction(
        &connection,
        &REFERENCE_INSTRUCTIONS,
        Some(payer),
        CommitmentLevel::Finalized,
    )
    .await
    .unwrap();

    assert_eq!(tx.instructions, *REFERENCE_INSTRUCTIONS);
    assert_eq!(tx.instructions[0].program_id, PROPOSAL_PROGRAM_ID);
    assert_eq!(tx.instructions[0].data, PROPOSAL_IX_DATA.to_vec());
    assert_eq!(tx.instructions[0].accounts[0].pubkey, PROPOSAL_ACCOUNT);
    assert_eq!(tx.fee_payer, Some(payer));
    assert_eq!(tx.recent_blockhash, Some(Blockhash::from("abc123")));
    assert_eq!(tx.last_valid_block_height, Some(4_242));
    assert_eq!(
        journal.events(),
        vec![Event::BlockhashRead(CommitmentLevel::Finalized)]
    );
}

// ─── Ordering ──────────────────────────────────────────────────────

#[tokio::test]
async fn blockhash_is_read_before_any_signing() {
    let harness = Harness::new();
    let dispatcher = dispatcher(&harness, harness.capabilities());

    for command in [
        Command::CreateProposal,
        Command::SignTransaction,
        Command::SignAllTransactions,
    ] {
        dispatcher.dispatch(command).await.unwrap();
    }

    let events = harness.journal.events();
    let reads: Vec<_> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, Event::BlockhashRead(_)))
        .map(|(i, _)| i)
        .collect();
    let signs: Vec<_> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| {
            matches!(
                e,
                Event::SendTransaction(_) | Event::SignTransaction | Event::SignAll(_)
            )
        })
        .map(|(i, _)| i)
        .collect();

    assert_eq!(reads.len(), 3);
    assert_eq!(signs.len(), 3);
    for (read, sign) in reads.iter().zip(&signs) {
        assert!(read < sign, "read at {read} must precede signing at {sign}");
    }
}

#[tokio::test]
async fn sign_transaction_steps_run_in_sequence() {
    let harness = Harness::new();
    let dispatcher = dispatcher(&harness, harness.capabilities());

    let outcome = dispatcher.sign_transaction().await.unwrap();

    let events = harness.journal.events();
    assert!(matches!(events[0], Event::BlockhashRead(CommitmentLevel::Finalized)));
    assert_eq!(events[1], Event::SignTransaction);
    let Event::Broadcast(wire, options) = &events[2] else {
        panic!("expected broadcast, got {:?}", events[2]);
    };
    assert!(options.skip_preflight);
    assert_eq!(options.preflight_commitment, Some(CommitmentLevel::Confirmed));

    let decoded = WireTransaction::decode(wire).unwrap();
    assert!(decoded.invalid_signers().is_empty());
    assert_eq!(decoded.fee_payer(), harness.wallet.pubkey());
    assert_eq!(outcome, ActionOutcome::Sent(vec![decoded.id()]));

    let txid = decoded.id().to_string();
    assert_eq!(harness.sink.logs(), vec![txid.clone()]);
    assert_eq!(
        harness.sink.notifications(),
        vec![format!("New transaction created {txid}")]
    );
}

#[tokio::test]
async fn create_proposal_names_the_action() {
    let harness = Harness::new();
    let dispatcher = dispatcher(&harness, harness.capabilities());

    let outcome = dispatcher.dispatch(Command::CreateProposal).await.unwrap();

    assert_eq!(
        harness.journal.position(|e| *e == Event::SendTransaction(Some("Mock proposal".into()))),
        Some(1)
    );
    let ActionOutcome::Sent(txids) = outcome else {
        panic!("expected a sent transaction");
    };
    assert_eq!(harness.sink.logs(), vec![txids[0].to_string()]);
    assert!(harness.sink.notifications().is_empty());
}

// ─── Fee payer ─────────────────────────────────────────────────────

#[tokio::test]
async fn absent_fee_payer_fails_signing() {
    let harness = Harness::new();
    let wallet = harness.capabilities().with_public_key(None);
    let dispatcher = dispatcher(&harness, wallet);

    let err = dispatcher.sign_transaction().await.unwrap_err();

    assert!(matches!(
        err,
        WalletTesterError::Transaction(SolError::MissingFeePayer)
    ));
    assert!(harness.journal.broadcasts().is_empty());
    assert!(harness.sink.logs().is_empty());
}

// ─── Missing capabilities ──────────────────────────────────────────

#[tokio::test]
async fn missing_capabilities_skip_without_side_effects() {
    let harness = Harness::new();
    let wallet = WalletCapabilities::disconnected().with_public_key(Some(harness.wallet.pubkey()));
    let dispatcher = dispatcher(&harness, wallet);

    for command in Command::ALL {
        assert_eq!(
            dispatcher.dispatch(command).await.unwrap(),
            ActionOutcome::Skipped
        );
    }

    assert!(harness.journal.events().is_empty());
    assert!(harness.sink.logs().is_empty());
    assert!(harness.sink.notifications().is_empty());
}

#[tokio::test]
async fn partial_wallet_runs_only_what_it_supports() {
    let harness = Harness::new();
    let wallet = WalletCapabilities::disconnected()
        .with_public_key(Some(harness.wallet.pubkey()))
        .with_sign_message(Some(harness.wallet.clone()));
    let dispatcher = dispatcher(&harness, wallet);

    assert_eq!(
        dispatcher.dispatch(Command::SignTransaction).await.unwrap(),
        ActionOutcome::Skipped
    );
    let ActionOutcome::MessageSigned(bytes) =
        dispatcher.dispatch(Command::SignMessage).await.unwrap()
    else {
        panic!("expected a message signature");
    };

    assert_eq!(harness.journal.events(), vec![Event::SignMessage(b"buffer".to_vec())]);
    let signature = Signature::try_from(bytes.as_slice()).unwrap();
    assert!(signature.verify(&harness.wallet.pubkey(), b"buffer"));
    assert_eq!(harness.sink.logs(), vec![bs58::encode(&bytes).into_string()]);
}

// ─── Sign all ──────────────────────────────────────────────────────

#[tokio::test]
async fn sign_all_broadcasts_three_identical_payloads() {
    let harness = Harness::new();
    let dispatcher = dispatcher(&harness, harness.capabilities());

    let outcome = dispatcher.sign_all_transactions().await.unwrap();

    assert!(harness.journal.events().contains(&Event::SignAll(3)));
    let broadcasts = harness.journal.broadcasts();
    assert_eq!(broadcasts.len(), 3);
    assert!(broadcasts.iter().all(|(wire, _)| *wire == broadcasts[0].0));

    let ActionOutcome::Sent(txids) = outcome else {
        panic!("expected sent transactions");
    };
    assert_eq!(txids.len(), 3);
    assert!(txids.iter().all(|id| *id == txids[0]));
    assert_eq!(harness.sink.notifications().len(), 3);
}

#[tokio::test]
async fn batch_size_comes_from_config() {
    let harness = Harness::new();
    let config = WalletTesterConfig::from_toml_str("[actions]\nbatch_size = 2\n").unwrap();
    let dispatcher = dispatcher(&harness, harness.capabilities()).with_config(config.actions);

    dispatcher.sign_all_transactions().await.unwrap();

    assert!(harness.journal.events().contains(&Event::SignAll(2)));
    assert_eq!(harness.journal.broadcasts().len(), 2);
}

// ─── Failure propagation ───────────────────────────────────────────

#[tokio::test]
async fn blockhash_failure_stops_before_any_capability_call() {
    let journal = Journal::default();
    let harness = Harness::new()
        .with_connection(MockConnection::failing(journal.clone()))
        .with_wallet(RecordingWallet::new(journal.clone()));
    let dispatcher = dispatcher(&harness, harness.capabilities());

    for command in [
        Command::CreateProposal,
        Command::SignTransaction,
        Command::SignAllTransactions,
    ] {
        let err = dispatcher.dispatch(command).await.unwrap_err();
        assert!(matches!(err, WalletTesterError::Rpc(ref msg) if msg == "connection reset"));
    }

    assert!(journal
        .events()
        .iter()
        .all(|e| matches!(e, Event::BlockhashRead(_))));
    assert!(harness.sink.logs().is_empty());
}

#[tokio::test]
async fn wallet_rejection_propagates() {
    let journal = Journal::default();
    let harness = Harness::new()
        .with_connection(MockConnection::signable(journal.clone()))
        .with_wallet(RecordingWallet::rejecting(journal.clone()));
    let dispatcher = dispatcher(&harness, harness.capabilities());

    for command in Command::ALL {
        let err = dispatcher.dispatch(command).await.unwrap_err();
        assert!(matches!(err, WalletTesterError::WalletRejected(_)));
    }

    assert!(journal.broadcasts().is_empty());
    assert!(harness.sink.logs().is_empty());
}

#[tokio::test]
async fn unsignable_blockhash_surfaces_at_signing() {
    let journal = Journal::default();
    let harness = Harness::new()
        .with_connection(MockConnection::new(journal.clone()))
        .with_wallet(RecordingWallet::new(journal.clone()));
    let dispatcher = dispatcher(&harness, harness.capabilities());

    let err = dispatcher.sign_transaction().await.unwrap_err();
    assert!(matches!(
        err,
        WalletTesterError::Transaction(SolError::InvalidBlockhash(_))
    ));
    assert!(journal.broadcasts().is_empty());
}

// ─── Concurrency ───────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_workflows_build_their_own_envelopes() {
    let harness = Harness::new();
    let dispatcher = dispatcher(&harness, harness.capabilities());

    let (a, b, c) = tokio::join!(
        dispatcher.dispatch(Command::SignTransaction),
        dispatcher.dispatch(Command::SignAllTransactions),
        dispatcher.dispatch(Command::SignMessage),
    );
    a.unwrap();
    b.unwrap();
    c.unwrap();

    let reads = harness
        .journal
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::BlockhashRead(_)))
        .count();
    assert_eq!(reads, 2);
    assert_eq!(harness.journal.broadcasts().len(), 4);
}

#[tokio::test]
async fn custom_instructions_and_send_policy() {
    let harness = Harness::new();
    let config = ActionsConfig {
        skip_preflight: false,
        ..ActionsConfig::default()
    };
    let dispatcher = dispatcher(&harness, harness.capabilities())
        .with_config(config)
        .with_instructions(vec![instruction(1), instruction(2)]);

    dispatcher.sign_transaction().await.unwrap();

    let (wire, options) = &harness.journal.broadcasts()[0];
    assert!(!options.skip_preflight);
    let decoded = WireTransaction::decode(wire).unwrap();
    assert_eq!(decoded.message.instructions.len(), 2);
}
