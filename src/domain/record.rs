//! Display-name derivation for raw records.

/// Records that may carry a human-readable label.
///
/// Builders call [`Named::name`] when a node is created; `None` makes the
/// node fall back to the rendered id.
pub trait Named {
    fn name(&self) -> Option<&str> {
        None
    }
}

// Bare keys used as their own record never carry a separate label.
macro_rules! unnamed {
    ($($t:ty),* $(,)?) => {
        $(impl Named for $t {})*
    };
}

unnamed!(String, &str, u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, char);
