use super::{
    matches, validate_name, Node, FLAG_ALLOCATED, FLAG_CHAINED, FLAG_FREE, NAME_FIELD,
};
use crate::{
    config::{NAME_MAX, NODE_SIZE},
    error::FsError,
};

#[test]
fn encode_places_fields_at_fixed_offsets() {
    let mut node = Node::allocated(7, FLAG_ALLOCATED, b"a.txt");
    node.size = 0x0102_0304;
    node.nextid = 9;

    let mut bytes = [0xAAu8; NODE_SIZE];
    node.encode(&mut bytes);

    assert_eq!(&bytes[..5], b"a.txt");
    assert!(bytes[5..NAME_FIELD].iter().all(|&b| b == 0));
    assert_eq!(bytes[55], FLAG_ALLOCATED);
    assert_eq!(&bytes[56..60], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(&bytes[60..62], &[7, 0]);
    assert_eq!(&bytes[62..64], &[9, 0]);
    assert_eq!(Node::decode(&bytes), node);
}

#[test]
fn name_without_terminator_is_capped() {
    let bytes = [b'x'; NODE_SIZE];
    let node = Node::decode(&bytes);
    assert_eq!(node.name().len(), NAME_MAX);
}

#[test]
fn zeroed_record_is_free() {
    let node = Node::decode(&[0u8; NODE_SIZE]);
    assert!(node.is_free());
    assert!(!node.is_head());
    assert_eq!(node.name(), b"");
}

#[test]
fn filter_matches_exact_or_any_bit() {
    assert!(matches(FLAG_FREE, FLAG_FREE));
    assert!(!matches(FLAG_ALLOCATED, FLAG_FREE));
    assert!(!matches(0xFF, FLAG_FREE));

    assert!(matches(FLAG_ALLOCATED, FLAG_ALLOCATED));
    assert!(matches(FLAG_ALLOCATED | FLAG_CHAINED, FLAG_ALLOCATED));
    assert!(!matches(FLAG_FREE, FLAG_ALLOCATED));
    assert!(!matches(FLAG_CHAINED, FLAG_ALLOCATED));
}

#[test]
fn head_and_continuation_are_distinct() {
    let head = Node::allocated(0, FLAG_ALLOCATED, b"log.bin");
    let tail = Node::allocated(1, FLAG_ALLOCATED | FLAG_CHAINED, b"");
    assert!(head.is_head() && !head.is_continuation());
    assert!(tail.is_continuation() && !tail.is_head());
    assert!(head.is_terminal());
}

#[test]
fn name_validation() {
    assert_eq!(validate_name(b""), Err(FsError::InvalidName));
    assert_eq!(validate_name(b"a\0b"), Err(FsError::InvalidName));
    assert_eq!(validate_name(&[b'n'; NAME_MAX + 1]), Err(FsError::InvalidName));
    assert_eq!(validate_name(&[b'n'; NAME_MAX]), Ok(()));
}
