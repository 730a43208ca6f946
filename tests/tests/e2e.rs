//! End-to-end scenarios across the queue, messenger and rollup chain.

use alloy_primitives::{bytes, B256, U256};
use bridge_messenger::{build_withdraw_trie, MessengerError, RelayProof};
use bridge_primitives::abi::{encode_drop_callback, relay_payload_hash};
use bridge_queue::QueueError;
use tests::{Bridge, ALICE, BOB, VAULT};

#[test]
fn test_deposit_skip_and_drop_lifecycle() -> eyre::Result<()> {
    let mut bridge = Bridge::new();

    let value = U256::from(500);
    let dropped = bytes!("deadbeef");
    let executed = bytes!("c0ffee");
    assert_eq!(bridge.send(value, dropped.clone())?, 0);
    assert_eq!(bridge.send(U256::ZERO, executed.clone())?, 1);
    assert_eq!(bridge.queue.next_index(), 2);
    assert!(bridge.host.transferred_to(VAULT) > U256::ZERO);

    // the batch executes message 1 and skips message 0.
    let batch1 = bridge.commit(&bridge.genesis_header.clone(), 2, U256::from(0b01))?;
    assert!(bridge.queue.is_skipped(0));
    assert!(!bridge.queue.is_skipped(1));

    // dropping before finalization fails.
    assert_eq!(
        bridge.drop_message(value, 0, &dropped),
        Err(MessengerError::Queue(QueueError::NotFinalized(0)))
    );

    bridge.finalize(&batch1, B256::repeat_byte(0x77))?;

    bridge.host.calls.clear();
    bridge.drop_message(value, 0, &dropped)?;
    assert!(bridge.queue.is_dropped(0));
    // the refund callback carries the original message and value.
    assert_eq!(bridge.host.calls, vec![(ALICE, value, encode_drop_callback(&dropped))]);

    // the executed message was never skipped, so it cannot be dropped.
    assert_eq!(
        bridge.drop_message(U256::ZERO, 1, &executed),
        Err(MessengerError::Queue(QueueError::NotSkipped(1)))
    );

    Ok(())
}

#[test]
fn test_withdraw_relay_flow() -> eyre::Result<()> {
    let mut bridge = Bridge::new();

    // an L2-originated withdrawal, leaf 0 of the batch's withdraw trie.
    let value = U256::from(42);
    let message = bytes!("deadbeef");
    let leaf = relay_payload_hash(BOB, ALICE, value, U256::ZERO, &message);
    let (withdraw_root, proofs) = build_withdraw_trie(&[leaf]);
    let proof = RelayProof { batch_index: 1, merkle_proof: proofs[0].clone() };

    let batch1 = bridge.commit(&bridge.genesis_header.clone(), 0, U256::ZERO)?;

    // the batch is committed but not finalized, so the relay is rejected.
    assert_eq!(
        bridge.relay(BOB, ALICE, value, 0, &message, &proof),
        Err(MessengerError::BatchNotFinalized(1))
    );

    bridge.finalize(&batch1, withdraw_root)?;

    bridge.host.calls.clear();
    assert!(bridge.relay(BOB, ALICE, value, 0, &message, &proof)?);
    assert!(bridge.messenger.is_executed(&leaf));
    assert_eq!(bridge.host.calls, vec![(ALICE, value, message.clone())]);

    assert_eq!(
        bridge.relay(BOB, ALICE, value, 0, &message, &proof),
        Err(MessengerError::AlreadyExecuted(leaf))
    );

    Ok(())
}

#[test]
fn test_replay_chain_drops_across_batches() -> eyre::Result<()> {
    let mut bridge = Bridge::new();

    let value = U256::from(100);
    let message = bytes!("deadbeef");
    let nonce = bridge.send(value, message.clone())?;
    let hash = relay_payload_hash(ALICE, BOB, value, U256::from(nonce), &message);

    // the first batch skips the original instance.
    let batch1 = bridge.commit(&bridge.genesis_header.clone(), 1, U256::from(0b1))?;

    let replay_index = bridge.replay(value, nonce, &message)?;
    assert_eq!(replay_index, 1);
    assert_eq!(bridge.messenger.prev_replay_index(replay_index), Some(nonce));

    // the second batch skips the replay instance too.
    let batch2 = bridge.commit(&batch1.encode(), 1, U256::from(0b1))?;

    // both instances consumed but nothing finalized yet.
    assert_eq!(
        bridge.drop_message(value, nonce, &message),
        Err(MessengerError::Queue(QueueError::NotFinalized(1)))
    );

    bridge.finalize_bundle(&batch2, B256::repeat_byte(0x77))?;
    assert_eq!(bridge.chain.last_finalized_index(), 2);
    assert_eq!(bridge.queue.finalized_index(), 2);

    bridge.drop_message(value, nonce, &message)?;
    assert!(bridge.queue.is_dropped(nonce));
    assert!(bridge.queue.is_dropped(replay_index));
    assert!(bridge.messenger.is_dropped(&hash));

    // a dropped message cannot be replayed again.
    assert_eq!(
        bridge.replay(value, nonce, &message),
        Err(MessengerError::MessageDropped(hash))
    );

    Ok(())
}

#[test]
fn test_revert_rewinds_queue_but_keeps_messenger_state() -> eyre::Result<()> {
    let mut bridge = Bridge::new();

    let message = bytes!("deadbeef");
    bridge.send(U256::ZERO, message.clone())?;
    bridge.send(U256::ZERO, bytes!("c0ffee"))?;

    let batch1 = bridge.commit(&bridge.genesis_header.clone(), 2, U256::from(0b10))?;
    assert_eq!(bridge.queue.pending_index(), 2);
    assert!(bridge.queue.is_skipped(1));

    bridge.chain.revert(&mut bridge.queue, &batch1.encode(), 1)?;
    assert_eq!(bridge.chain.last_committed_index(), 0);
    assert_eq!(bridge.queue.pending_index(), 0);
    assert!(!bridge.queue.is_skipped(1));

    // sent messages survive the revert untouched.
    let hash = relay_payload_hash(ALICE, BOB, U256::ZERO, U256::ZERO, &message);
    assert!(bridge.messenger.send_timestamp(&hash).is_some());

    // recommitted without skips, both messages execute and nothing is droppable.
    let recommitted = bridge.commit(&bridge.genesis_header.clone(), 2, U256::ZERO)?;
    bridge.finalize(&recommitted, B256::repeat_byte(0x77))?;
    assert_eq!(
        bridge.drop_message(U256::ZERO, 0, &message),
        Err(MessengerError::Queue(QueueError::NotSkipped(0)))
    );

    Ok(())
}

#[test]
fn test_v7_atomic_path_after_legacy_batches() -> eyre::Result<()> {
    let mut bridge = Bridge::new();

    bridge.send(U256::ZERO, bytes!("deadbeef"))?;
    let batch1 = bridge.commit(&bridge.genesis_header.clone(), 1, U256::ZERO)?;
    bridge.finalize(&batch1, B256::ZERO)?;

    // an L2 withdrawal finalized through the atomic V7 path.
    let value = U256::from(7);
    let message = bytes!("c0ffee");
    let leaf = relay_payload_hash(BOB, ALICE, value, U256::ZERO, &message);
    let (withdraw_root, proofs) = build_withdraw_trie(&[leaf]);

    bridge.send(U256::ZERO, bytes!("deadbeef"))?;
    let post_state_root = B256::repeat_byte(0x55);
    let batch2 = bridge.chain.commit_and_finalize(
        &mut bridge.queue,
        7,
        &batch1.encode(),
        2,
        post_state_root,
        withdraw_root,
        b"proof",
    )?;
    bridge.state_root = post_state_root;

    assert_eq!(batch2.batch_index(), 2);
    assert_eq!(bridge.chain.last_finalized_index(), 2);
    assert_eq!(bridge.queue.pending_index(), 2);
    assert_eq!(bridge.queue.finalized_index(), 2);

    // the V7 batch's withdraw root authorizes relays like any other.
    let proof = RelayProof { batch_index: 2, merkle_proof: proofs[0].clone() };
    assert!(bridge.relay(BOB, ALICE, value, 0, &message, &proof)?);

    // further V7 batches chain off the finalized tail.
    bridge.send(U256::ZERO, bytes!("deadbeef"))?;
    let batch3 = bridge.chain.commit_and_finalize(
        &mut bridge.queue,
        7,
        &batch2.encode(),
        3,
        B256::repeat_byte(0x66),
        withdraw_root,
        b"proof",
    )?;
    assert_eq!(batch3.batch_index(), 3);
    assert_eq!(batch3.parent_batch_hash(), batch2.hash_slow());
    assert_eq!(bridge.queue.finalized_index(), 3);

    Ok(())
}
