//! Tests for the Dictionary engine
//!
//! These tests verify:
//! - Round-trip of set/get, sizes and truncation
//! - Same-size updates in place, resized updates via delete + append
//! - Compaction on remove
//! - Capacity limits on fixed media, growth on volatile stores
//! - Persist-once-per-mutation
//! - Recovery from corrupt or mismatched images

use tlvdict::codec::EMPTY_STORE_SIZE;
use tlvdict::{Config, DictError, Dictionary, LoadOutcome, MemoryMedium, Volatile};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_fixed(capacity: usize) -> (MemoryMedium, Dictionary<MemoryMedium>) {
    let medium = MemoryMedium::new(capacity);
    let config = Config::builder().capacity(capacity).build();
    let dict = Dictionary::open(medium.clone(), config).unwrap();
    (medium, dict)
}

fn setup_volatile() -> Dictionary<Volatile> {
    Dictionary::in_memory(Config::default()).unwrap()
}

fn offset_of(dict: &mut Dictionary<MemoryMedium>, tag: &[u8]) -> usize {
    dict.iter()
        .find(|entry| entry.tag == tag)
        .map(|entry| entry.offset)
        .unwrap()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_open_blank_medium_initializes_empty_store() {
    let (medium, mut dict) = setup_fixed(64);

    assert_eq!(dict.load_outcome(), LoadOutcome::Missing);
    assert_eq!(dict.used(), EMPTY_STORE_SIZE);
    assert_eq!(dict.remaining(), 64 - EMPTY_STORE_SIZE);
    assert!(dict.is_empty());
    assert_eq!(&medium.snapshot()[..13], b"vers\x00\x01\x01end\x00\x01\x01");

    let stats = dict.stats();
    assert_eq!(stats.resets, 1);
    assert_eq!(stats.recoveries, 0);
    assert_eq!(stats.saves, 1);
}

#[test]
fn test_set_get_round_trip() {
    let (_medium, mut dict) = setup_fixed(256);

    dict.set("alpha", [1u8, 2, 3]).unwrap();
    dict.set("beta", b"hello").unwrap();

    let mut out = [0u8; 16];
    assert_eq!(dict.get("alpha", &mut out), 3);
    assert_eq!(&out[..3], &[1, 2, 3]);
    assert_eq!(dict.get_vec("beta"), Some(b"hello".to_vec()));
}

#[test]
fn test_get_absent_leaves_output_untouched() {
    let (_medium, mut dict) = setup_fixed(64);

    let mut out = [0xEEu8; 4];
    assert_eq!(dict.get("missing", &mut out), 0);
    assert_eq!(out, [0xEE; 4]);
    assert_eq!(dict.get_vec("missing"), None);
    assert_eq!(dict.size("missing"), 0);
    assert!(!dict.contains("missing"));
}

#[test]
fn test_get_truncates_silently() {
    let (_medium, mut dict) = setup_fixed(64);
    dict.set("long", b"0123456789").unwrap();

    let mut out = [0u8; 4];
    assert_eq!(dict.get("long", &mut out), 4);
    assert_eq!(&out, b"0123");
    assert_eq!(dict.size("long"), 10);
}

#[test]
fn test_tags_are_case_sensitive() {
    let (_medium, mut dict) = setup_fixed(64);
    dict.set("Key", b"upper").unwrap();
    dict.set("key", b"lower").unwrap();

    assert_eq!(dict.get_vec("Key"), Some(b"upper".to_vec()));
    assert_eq!(dict.get_vec("key"), Some(b"lower".to_vec()));
    assert_eq!(dict.len(), 2);
}

#[test]
fn test_zero_length_value_declares_tag() {
    let (_medium, mut dict) = setup_fixed(64);
    let before = dict.used();

    dict.set("flag", b"").unwrap();

    assert!(dict.contains("flag"));
    assert_eq!(dict.size("flag"), 0);
    assert_eq!(dict.get_vec("flag"), Some(Vec::new()));
    assert_eq!(dict.used(), before + 4 + 2);
}

#[test]
fn test_string_shims() {
    let (_medium, mut dict) = setup_fixed(64);
    dict.set_str("name", "teensy").unwrap();

    assert_eq!(dict.size("name"), 7);
    assert_eq!(dict.get_string("name"), Some("teensy".to_string()));
    assert_eq!(dict.get_string("other"), None);
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_wifi_scenario() {
    let (_medium, mut dict) = setup_fixed(64);

    dict.set_str("wifi", "SSID1").unwrap();
    assert_eq!(dict.size("wifi"), 6);

    let before = dict.used();
    dict.set_str("wifi", "SSID22").unwrap();
    assert_eq!(dict.get_string("wifi"), Some("SSID22".to_string()));
    assert_eq!(dict.used(), before + 1);

    dict.set("wifi", b"").unwrap();
    let mut out = [0xEEu8; 8];
    assert_eq!(dict.get("wifi", &mut out), 0);
    assert_eq!(dict.size("wifi"), 0);
    assert!(dict.contains("wifi"));

    dict.reset().unwrap();
    assert_eq!(dict.used(), EMPTY_STORE_SIZE);
    assert!(!dict.contains("wifi"));
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_identical_set_is_a_no_op() {
    let (medium, mut dict) = setup_fixed(128);
    dict.set("a", b"one").unwrap();
    dict.set("b", b"two").unwrap();

    let used = dict.used();
    let offset_b = offset_of(&mut dict, b"b");
    let writes = medium.write_calls();

    dict.set("a", b"one").unwrap();

    assert_eq!(dict.used(), used);
    assert_eq!(offset_of(&mut dict, b"b"), offset_b);
    assert_eq!(medium.write_calls(), writes);
}

#[test]
fn test_same_size_update_in_place() {
    let (medium, mut dict) = setup_fixed(128);
    dict.set("a", b"one").unwrap();
    dict.set("b", b"two").unwrap();
    dict.set("c", b"six").unwrap();

    let used = dict.used();
    let offsets: Vec<usize> = dict.iter().map(|e| e.offset).collect();
    let writes = medium.write_calls();

    dict.set("a", b"ONE").unwrap();

    assert_eq!(dict.used(), used);
    assert_eq!(dict.iter().map(|e| e.offset).collect::<Vec<_>>(), offsets);
    assert_eq!(dict.tags(), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    assert_eq!(dict.get_vec("a"), Some(b"ONE".to_vec()));
    assert_eq!(medium.write_calls(), writes + 1);
}

#[test]
fn test_resized_update_moves_entry_to_end() {
    let (_medium, mut dict) = setup_fixed(128);
    dict.set("a", b"one").unwrap();
    dict.set("b", b"two").unwrap();
    dict.set("c", b"three").unwrap();

    let used = dict.used();
    dict.set("a", b"uno-dos").unwrap();

    assert_eq!(dict.used(), used + 4);
    assert_eq!(dict.tags(), vec![b"b".to_vec(), b"c".to_vec(), b"a".to_vec()]);
    assert_eq!(dict.get_vec("a"), Some(b"uno-dos".to_vec()));
    assert_eq!(dict.get_vec("b"), Some(b"two".to_vec()));
    assert_eq!(dict.get_vec("c"), Some(b"three".to_vec()));
}

#[test]
fn test_version_entry_untouched_by_mutations() {
    let (_medium, mut dict) = setup_fixed(128);
    dict.set("a", b"1").unwrap();
    dict.set("a", b"22").unwrap();
    dict.remove("a").unwrap();

    assert_eq!(&dict.data()[..7], b"vers\x00\x01\x01");
}

// =============================================================================
// Remove / Compaction Tests
// =============================================================================

#[test]
fn test_remove_compacts() {
    let (_medium, mut dict) = setup_fixed(128);
    dict.set("first", b"xxxx").unwrap();
    dict.set("second", b"yy").unwrap();
    dict.set("third", b"z").unwrap();

    let used = dict.used();
    let third_before = offset_of(&mut dict, b"third");

    assert!(dict.remove("first").unwrap());

    // "first" + terminator + len + 4 data bytes
    assert_eq!(dict.used(), used - 11);
    assert_eq!(offset_of(&mut dict, b"third"), third_before - 11);
    assert_eq!(dict.get_vec("second"), Some(b"yy".to_vec()));
    assert_eq!(dict.get_vec("third"), Some(b"z".to_vec()));
}

#[test]
fn test_remove_last_entry() {
    let (_medium, mut dict) = setup_fixed(64);
    dict.set("only", b"1").unwrap();

    assert!(dict.remove("only").unwrap());

    assert_eq!(dict.used(), EMPTY_STORE_SIZE);
    assert!(dict.is_empty());
}

#[test]
fn test_remove_absent_or_reserved() {
    let (medium, mut dict) = setup_fixed(64);
    let writes = medium.write_calls();

    assert!(!dict.remove("missing").unwrap());
    assert!(!dict.remove("vers").unwrap());
    assert!(!dict.remove("end").unwrap());

    assert_eq!(medium.write_calls(), writes);
    assert_eq!(dict.used(), EMPTY_STORE_SIZE);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_set_rejects_oversized_payload() {
    let (medium, mut dict) = setup_fixed(1024);
    let image = medium.snapshot();

    let result = dict.set("big", vec![0u8; 256]);

    assert!(matches!(result, Err(DictError::PayloadTooLarge { len: 256, .. })));
    assert_eq!(medium.snapshot(), image);

    dict.set("big", vec![7u8; 255]).unwrap();
    assert_eq!(dict.size("big"), 255);
}

#[test]
fn test_set_rejects_reserved_and_malformed_tags() {
    let (_medium, mut dict) = setup_fixed(64);

    for tag in [&b"vers"[..], &b"end"[..], &b""[..], &b"a\0b"[..]] {
        assert!(matches!(dict.set(tag, b"x"), Err(DictError::InvalidTag(_))));
    }
    assert_eq!(dict.used(), EMPTY_STORE_SIZE);
}

#[test]
fn test_reserved_tags_read_as_absent() {
    let (_medium, mut dict) = setup_fixed(64);

    assert!(!dict.contains("vers"));
    assert_eq!(dict.size("end"), 0);
    assert_eq!(dict.get_vec("vers"), None);
}

// =============================================================================
// Capacity Tests
// =============================================================================

#[test]
fn test_fixed_capacity_boundary() {
    let (medium, mut dict) = setup_fixed(64);

    let mut i = 0;
    loop {
        let tag = format!("k{}", i);
        let needed = tag.len() + 2 + 8;
        if dict.remaining() < needed {
            let used = dict.used();
            let image = medium.snapshot();
            let buffer = dict.data().to_vec();

            let result = dict.set(&tag, [0u8; 8]);

            assert!(matches!(result, Err(DictError::CapacityExceeded { .. })));
            assert_eq!(dict.used(), used);
            assert_eq!(dict.data(), buffer.as_slice());
            assert_eq!(medium.snapshot(), image);
            break;
        }
        dict.set(&tag, [i as u8; 8]).unwrap();
        i += 1;
    }

    assert!(i > 0);
    assert_eq!(dict.capacity(), 64);
}

#[test]
fn test_exact_fit_succeeds() {
    let (_medium, mut dict) = setup_fixed(32);
    // 32 - 13 = 19 free: tag "t" (1) + 2 + 16 data
    dict.set("t", [1u8; 16]).unwrap();

    assert_eq!(dict.used(), 32);
    assert_eq!(dict.remaining(), 0);
    assert!(matches!(dict.set("u", b""), Err(DictError::CapacityExceeded { .. })));
}

#[test]
fn test_failed_grow_keeps_old_value() {
    let (_medium, mut dict) = setup_fixed(32);
    dict.set("t", [1u8; 10]).unwrap();

    let result = dict.set("t", [2u8; 20]);

    assert!(matches!(result, Err(DictError::CapacityExceeded { .. })));
    assert_eq!(dict.get_vec("t"), Some(vec![1u8; 10]));
}

#[test]
fn test_shrink_then_grow_within_freed_space() {
    let (_medium, mut dict) = setup_fixed(32);
    dict.set("t", [1u8; 16]).unwrap();

    // Replacing an entry may reuse its own footprint
    dict.set("t", [2u8; 15]).unwrap();
    dict.set("t", [3u8; 16]).unwrap();

    assert_eq!(dict.get_vec("t"), Some(vec![3u8; 16]));
    assert_eq!(dict.used(), 32);
}

#[test]
fn test_volatile_store_grows_and_shrinks_on_reset() {
    let mut dict = setup_volatile();
    assert_eq!(dict.capacity(), EMPTY_STORE_SIZE);

    for i in 0..20u8 {
        dict.set(format!("entry{}", i), [i; 32]).unwrap();
    }

    assert_eq!(dict.len(), 20);
    assert!(dict.capacity() >= dict.used());
    assert_eq!(dict.get_vec("entry7"), Some(vec![7u8; 32]));

    dict.reset().unwrap();
    assert_eq!(dict.capacity(), EMPTY_STORE_SIZE);
    assert_eq!(dict.used(), EMPTY_STORE_SIZE);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_each_mutation_persists_once() {
    let (medium, mut dict) = setup_fixed(128);
    let writes = medium.write_calls();

    dict.set("a", b"1").unwrap();
    assert_eq!(medium.write_calls(), writes + 1);

    dict.set("a", b"22").unwrap();
    assert_eq!(medium.write_calls(), writes + 2);

    dict.remove("a").unwrap();
    assert_eq!(medium.write_calls(), writes + 3);

    let _ = dict.set("b", vec![0u8; 300]);
    assert_eq!(medium.write_calls(), writes + 3);
}

#[test]
fn test_reopen_sees_persisted_entries() {
    let (medium, mut dict) = setup_fixed(128);
    dict.set("a", b"persisted").unwrap();
    dict.set_str("b", "text").unwrap();
    drop(dict);

    let config = Config::builder().capacity(128).build();
    let mut reopened = Dictionary::open(medium, config).unwrap();

    assert_eq!(reopened.load_outcome(), LoadOutcome::Valid);
    assert_eq!(reopened.get_vec("a"), Some(b"persisted".to_vec()));
    assert_eq!(reopened.get_string("b"), Some("text".to_string()));
    assert_eq!(reopened.stats().resets, 0);
}

// =============================================================================
// Recovery Tests
// =============================================================================

#[test]
fn test_version_mismatch_resets() {
    let (medium, mut dict) = setup_fixed(64);
    dict.set("a", b"old").unwrap();
    drop(dict);

    let config = Config::builder().capacity(64).version(2).build();
    let mut reopened = Dictionary::open(medium.clone(), config).unwrap();

    assert_eq!(reopened.load_outcome(), LoadOutcome::VersionMismatch { found: 1 });
    assert_eq!(reopened.used(), EMPTY_STORE_SIZE);
    assert!(!reopened.contains("a"));
    assert_eq!(reopened.stats().recoveries, 1);
    assert_eq!(&medium.snapshot()[..13], b"vers\x00\x01\x02end\x00\x01\x02");
}

#[test]
fn test_malformed_stamp_length_resets() {
    let medium = MemoryMedium::new(64);
    medium.poke(0, b'v');
    medium.poke(1, b'e');
    medium.poke(2, b'r');
    medium.poke(3, b's');
    medium.poke(4, 0);
    medium.poke(5, 2);

    let dict = Dictionary::open(medium, Config::builder().capacity(64).build()).unwrap();

    assert_eq!(dict.load_outcome(), LoadOutcome::Missing);
    assert_eq!(dict.stats().resets, 1);
}

#[test]
fn test_corrupt_structure_resets_on_load() {
    let (medium, mut dict) = setup_fixed(64);
    dict.set("a", [1u8, 2, 3]).unwrap();
    drop(dict);

    // Length byte of "a" now points far past the end of the medium
    medium.poke(9, 200);

    let config = Config::builder().capacity(64).build();
    let mut reopened = Dictionary::open(medium, config).unwrap();

    assert_eq!(reopened.load_outcome(), LoadOutcome::Corrupt);
    assert_eq!(reopened.used(), EMPTY_STORE_SIZE);
    assert!(!reopened.contains("a"));
    assert_eq!(reopened.stats().recoveries, 1);
}

#[test]
fn test_open_rejects_tiny_medium() {
    let medium = MemoryMedium::new(8);
    let result = Dictionary::open(medium, Config::builder().capacity(64).build());
    assert!(matches!(result, Err(DictError::Config(_))));
}

#[test]
fn test_invalid_config() {
    let result = Dictionary::in_memory(Config::builder().initial_capacity(4).build());
    assert!(matches!(result, Err(DictError::Config(_))));
}
