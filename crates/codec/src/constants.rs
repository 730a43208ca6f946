/// The size in bytes of one skipped-message bitmap item (a 256-bit word).
pub const SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE: usize = 32;
