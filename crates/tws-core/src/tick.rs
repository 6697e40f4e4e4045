/// Flags attached to a price tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickAttrib {
    pub can_auto_execute: bool,
    pub past_limit: bool,
    pub pre_open: bool,
}

impl TickAttrib {
    /// Decode the attribute bitmask sent with price ticks.
    pub fn from_mask(mask: i32) -> Self {
        Self {
            can_auto_execute: mask & 0x1 != 0,
            past_limit: mask & 0x2 != 0,
            pre_open: mask & 0x4 != 0,
        }
    }
}
