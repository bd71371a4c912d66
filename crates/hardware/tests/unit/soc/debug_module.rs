//! # Debug Module Tests
//!
//! Debug RAM word/byte views, window bounds and the debug interrupt set.

use hartsim_core::common::{DEBUG_RAM_SIZE, DebugModuleError};
use hartsim_core::soc::devices::{DebugModule, Device};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_default_ram_geometry() {
    let dm = DebugModule::new(0);
    assert_eq!(dm.ram_size(), DEBUG_RAM_SIZE);
    assert_eq!(dm.ram_words(), DEBUG_RAM_SIZE / 4);
    assert_eq!(dm.address_range(), (0, DEBUG_RAM_SIZE as u64));
    assert_eq!(dm.name(), "DEBUG");
}

#[test]
fn test_fresh_ram_is_zeroed() {
    let dm = DebugModule::with_ram_size(0, 128);
    for i in 0..dm.ram_words() {
        assert_eq!(dm.ram_read32(i).unwrap(), 0);
    }
}

#[test]
fn test_word_write_visible_through_byte_window() {
    let mut dm = DebugModule::with_ram_size(0x400, 128);
    dm.ram_write32(3, 0xdead_beef).unwrap();
    assert_eq!(dm.ram_read32(3).unwrap(), 0xdead_beef);

    let mut bytes = [0u8; 4];
    assert!(dm.load(12, &mut bytes));
    assert_eq!(bytes, [0xef, 0xbe, 0xad, 0xde]);
}

#[test]
fn test_byte_store_visible_through_word_view() {
    let mut dm = DebugModule::with_ram_size(0, 128);
    assert!(dm.store(124, &[0x78, 0x56, 0x34, 0x12]));
    assert_eq!(dm.ram_read32(31).unwrap(), 0x1234_5678);
}

#[test]
fn test_word_index_past_end_rejected() {
    let mut dm = DebugModule::with_ram_size(0, 128);
    assert_eq!(
        dm.ram_read32(32),
        Err(DebugModuleError::WordIndexOutOfRange {
            index: 32,
            words: 32
        })
    );
    assert!(dm.ram_write32(32, 1).is_err());
}

#[test]
fn test_store_crossing_window_end_leaves_ram_untouched() {
    let mut dm = DebugModule::with_ram_size(0, 128);
    dm.ram_write32(31, 0xaaaa_aaaa).unwrap();
    assert!(!dm.store(126, &[1, 2, 3, 4]));
    assert_eq!(dm.ram_read32(31).unwrap(), 0xaaaa_aaaa);
}

#[test]
fn test_load_outside_window_leaves_buffer_untouched() {
    let mut dm = DebugModule::with_ram_size(0, 128);
    let mut buf = [0x55u8; 8];
    assert!(!dm.load(128, &mut buf));
    assert!(!dm.load(u64::MAX, &mut buf));
    assert_eq!(buf, [0x55; 8]);
}

#[test]
fn test_offset_of_respects_base() {
    let dm = DebugModule::with_ram_size(0x1000, 128);
    assert_eq!(dm.offset_of(0x0fff), None);
    assert_eq!(dm.offset_of(0x1000), Some(0));
    assert_eq!(dm.offset_of(0x107f), Some(0x7f));
    assert_eq!(dm.offset_of(0x1080), None);
}

#[test]
fn test_interrupt_set_and_clear_are_idempotent() {
    let mut dm = DebugModule::new(0);
    assert!(!dm.get_interrupt(2));

    dm.set_interrupt(2);
    dm.set_interrupt(2);
    assert!(dm.get_interrupt(2));
    assert!(!dm.get_interrupt(3));

    dm.clear_interrupt(2);
    assert!(!dm.get_interrupt(2));
    dm.clear_interrupt(2);
    assert!(!dm.get_interrupt(2));
}

#[test]
fn test_clear_of_unset_hart_is_noop() {
    let mut dm = DebugModule::new(0);
    dm.set_interrupt(1);
    dm.clear_interrupt(7);
    assert_eq!(dm.pending_interrupts().collect::<Vec<_>>(), vec![1]);
}

#[test]
fn test_pending_interrupts_ascending() {
    let mut dm = DebugModule::new(0);
    for hart in [9, 0, 4] {
        dm.set_interrupt(hart);
    }
    assert_eq!(dm.pending_interrupts().collect::<Vec<_>>(), vec![0, 4, 9]);
}

proptest! {
    #[test]
    fn prop_word_write_touches_only_its_word(index in 0usize..32, value: u32) {
        let mut dm = DebugModule::with_ram_size(0, 128);
        dm.ram_write32(index, value).unwrap();
        for i in 0..32 {
            let expected = if i == index { value } else { 0 };
            prop_assert_eq!(dm.ram_read32(i).unwrap(), expected);
        }
    }
}
