//! Steam application id helpers.
//!
//! Steam uses the upper half of the 32-bit id space for shortcuts: an id is a
//! catalogued store title only when its high bit is clear.

/// High bit marking a synthetic shortcut id.
pub const SHORTCUT_ID_FLAG: u32 = 0x8000_0000;

/// Returns `true` if `id` denotes a catalogued Steam title.
pub fn is_genuine(id: u64) -> bool {
    id < SHORTCUT_ID_FLAG as u64
}

/// Parses `raw` as a numeric app id and checks [`is_genuine`].
///
/// Non-numeric input is never genuine.
pub fn is_genuine_str(raw: &str) -> bool {
    raw.trim().parse::<u64>().map(is_genuine).unwrap_or(false)
}

/// Computes the runtime id Steam assigns to a shortcut with the given
/// registry `appid` value.
pub fn shortcut_runtime_id(value: u32) -> u32 {
    value | SHORTCUT_ID_FLAG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genuine_below_high_bit() {
        assert!(is_genuine(0));
        assert!(is_genuine(620));
        assert!(is_genuine(0x7FFF_FFFF));
        assert!(!is_genuine(0x8000_0000));
        assert!(!is_genuine(u64::from(u32::MAX)));
        assert!(!is_genuine(u64::MAX));
    }

    #[test]
    fn runtime_ids_are_never_genuine() {
        for value in [0u32, 1, 620, 0x1234_5678, 0x7FFF_FFFF, 0x8000_0000, u32::MAX] {
            assert!(!is_genuine(u64::from(shortcut_runtime_id(value))));
        }
    }

    #[test]
    fn genuine_str_rejects_garbage() {
        assert!(is_genuine_str("620"));
        assert!(is_genuine_str(" 1245620 "));
        assert!(!is_genuine_str("3221225472"));
        assert!(!is_genuine_str(""));
        assert!(!is_genuine_str("portal"));
        assert!(!is_genuine_str("-5"));
    }
}
