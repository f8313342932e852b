use mt_circular_buffer::{BufferError, Config, MtCircularBuffer};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[test]
fn fifo_delivery_single_producer_single_consumer_threads() {
    let buff = Arc::new(MtCircularBuffer::<u64>::new(64));
    const N: u64 = 20_000;

    let producer_buff = Arc::clone(&buff);
    let producer = thread::spawn(move || {
        for i in 0..N {
            loop {
                match producer_buff.write_next() {
                    Ok(mut wa) => {
                        *wa = i;
                        break;
                    }
                    Err(BufferError::SlotAcqTimeout) => continue,
                    Err(other) => panic!("unexpected producer error: {other:?}"),
                }
            }
        }
    });

    let consumer_buff = Arc::clone(&buff);
    let consumer = thread::spawn(move || {
        let mut expected = 0u64;
        while expected < N {
            match consumer_buff.consume_next_available_timeout(Duration::from_secs(2)) {
                Ok(ca) => {
                    assert_eq!(*ca, expected, "FIFO violation");
                    expected += 1;
                }
                Err(e) => panic!("unexpected consumer error: {e:?}"),
            }
        }
        expected
    });

    producer.join().unwrap();
    let total = consumer.join().unwrap();
    assert_eq!(total, N);
    assert_eq!(buff.num_consumable_slots(), 0);
}

#[test]
fn fifo_delivery_with_multiple_consumers_racing() {
    // FIFO is only guaranteed across the full stream of consume calls, not
    // attributed to any particular consumer thread: many consumers racing
    // for consume_next_available must still drain every item exactly once,
    // in production order.
    let buff = Arc::new(MtCircularBuffer::<u64>::new(32));
    const N: u64 = 5_000;
    const N_CONSUMERS: usize = 4;

    let producer_buff = Arc::clone(&buff);
    let producer = thread::spawn(move || {
        for i in 0..N {
            loop {
                match producer_buff.write_next() {
                    Ok(mut wa) => {
                        *wa = i;
                        break;
                    }
                    Err(_) => continue,
                }
            }
        }
    });

    let consumed_count = Arc::new(AtomicUsize::new(0));
    let mut consumers = Vec::new();
    for _ in 0..N_CONSUMERS {
        let consumer_buff = Arc::clone(&buff);
        let consumed_count = Arc::clone(&consumed_count);
        consumers.push(thread::spawn(move || {
            let mut local = 0usize;
            loop {
                if consumed_count.load(Ordering::Acquire) as u64 >= N {
                    break;
                }
                match consumer_buff.consume_next_available_timeout(Duration::from_millis(200)) {
                    Ok(_ca) => {
                        local += 1;
                        consumed_count.fetch_add(1, Ordering::AcqRel);
                    }
                    Err(BufferError::DataAvailableTimeout) => continue,
                    Err(e) => panic!("unexpected consumer error: {e:?}"),
                }
            }
            local
        }));
    }

    producer.join().unwrap();
    let total: usize = consumers.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, N as usize);
    assert_eq!(buff.num_consumable_slots(), 0);
}

#[test]
fn overwrite_is_reported_when_ring_wraps_with_undrained_slots() {
    let buff = MtCircularBuffer::<u64>::new(3);

    // Fill all three slots without draining any of them.
    for v in 0..3u64 {
        let mut wa = buff.write_next().unwrap();
        *wa = v;
    }
    assert_eq!(buff.num_consumable_slots(), 3);

    // Wrapping back to slot 0 must report an overwrite.
    let wa = buff.write_next().unwrap();
    assert!(wa.overwrite());
    assert_eq!(wa.slot_index(), 0);
    drop(wa);

    // The queue gained no duplicate entry for slot 0.
    assert_eq!(buff.num_consumable_slots(), 3);
}

#[test]
fn peek_read_does_not_drain_and_allows_concurrent_consume_order() {
    let buff = MtCircularBuffer::<u64>::new(4);
    for v in [1, 2, 3] {
        let mut wa = buff.write_next().unwrap();
        *wa = v;
    }

    // Peek at the newest filled slot: does not remove it from the queue.
    let newest = buff.read_newest_available().unwrap();
    assert_eq!(*newest, 3);
    drop(newest);
    assert_eq!(buff.num_consumable_slots(), 3);

    // Consumption is unaffected by the peek and still proceeds oldest-first.
    let first = buff.consume_next_available().unwrap();
    assert_eq!(*first, 1);
}

#[test]
fn concurrent_peek_readers_observe_same_slot() {
    let buff = Arc::new(MtCircularBuffer::<u64>::new(4));
    {
        let mut wa = buff.write_next().unwrap();
        *wa = 42;
    }

    let barrier = Arc::new(Barrier::new(3));
    let mut handles = Vec::new();
    for _ in 0..2 {
        let buff = Arc::clone(&buff);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let ra = buff.read_slot(0).unwrap();
            assert_eq!(*ra, 42);
        }));
    }
    barrier.wait();
    for h in handles {
        h.join().unwrap();
    }
    assert!(!buff.is_read(0));
}

#[test]
fn config_enables_metrics_when_requested() {
    let config = Config::new(4, Duration::from_millis(200), true);
    let buff = MtCircularBuffer::<u64>::with_config(config);

    {
        let mut wa = buff.write_next().unwrap();
        *wa = 1;
    }
    let ca = buff.consume_next_available().unwrap();
    let _ = *ca;
    drop(ca);

    let snapshot = buff.metrics();
    assert_eq!(snapshot.writes_completed, 1);
    assert_eq!(snapshot.consumes_completed, 1);
    assert_eq!(snapshot.overwrites, 0);
}

#[test]
fn clear_is_safe_to_call_between_drain_cycles() {
    let buff = MtCircularBuffer::<u64>::new(4);
    for v in 0..4u64 {
        let mut wa = buff.write_next().unwrap();
        *wa = v;
    }
    buff.clear().unwrap();
    assert_eq!(buff.num_consumable_slots(), 0);

    let wa = buff.write_next().unwrap();
    assert_eq!(wa.slot_index(), 0);
}
