use heapless::{spsc::Queue, Deque};

use super::ByteSource;

#[test]
fn slice_source_advances() {
    let data = [1u8, 2, 3, 4, 5];
    let mut source: &[u8] = &data;
    let mut buf = [0u8; 3];

    assert_eq!(source.consume(&mut buf), 3);
    assert_eq!(buf, [1, 2, 3]);
    assert_eq!(source.available(), 2);
    assert_eq!(source.consume(&mut buf), 2);
    assert_eq!(&buf[..2], &[4, 5]);
    assert_eq!(source.available(), 0);
    assert_eq!(source.consume(&mut buf), 0);
}

#[test]
fn deque_source_drains_front_first() {
    let mut deque: Deque<u8, 16> = Deque::new();
    for byte in 0..10u8 {
        deque.push_back(byte).unwrap();
    }
    let mut buf = [0u8; 4];
    assert_eq!(deque.consume(&mut buf), 4);
    assert_eq!(buf, [0, 1, 2, 3]);
    assert_eq!(deque.available(), 6);
}

#[test]
fn spsc_consumer_reports_only_buffered_bytes() {
    let mut queue: Queue<u8, 8> = Queue::new();
    let (mut producer, mut consumer) = queue.split();
    producer.enqueue(b'h').unwrap();
    producer.enqueue(b'i').unwrap();

    let mut buf = [0u8; 8];
    assert_eq!(consumer.available(), 2);
    assert_eq!(consumer.consume(&mut buf), 2);
    assert_eq!(&buf[..2], b"hi");
    assert_eq!(consumer.available(), 0);
}
