use crate::models::geth::CallFrame;

/// Address prefix shared by the precompiled contracts. Compared on the raw
/// string, so malformed or short addresses simply never match.
const PRECOMPILE_PREFIX: &str = "0x000000000000000000000000000000000000";

/// Drops the implicit zero-value calls the tracer reports against
/// precompiled-contract addresses.
///
/// A child survives if its target lies outside the precompile range or if it
/// carried an explicit value (even `"0x0"` counts as explicit). A dropped
/// child takes its entire subtree with it; the walk never sees it.
pub fn filter_precompile_calls(calls: Vec<CallFrame>) -> Vec<CallFrame> {
    calls
        .into_iter()
        .filter(|call| !call.to.starts_with(PRECOMPILE_PREFIX) || !call.value.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(to: &str, value: &str) -> CallFrame {
        CallFrame {
            typ: "CALL".to_string(),
            to: to.to_string(),
            value: value.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn drops_valueless_precompile_calls() {
        let calls = vec![
            frame("0x0000000000000000000000000000000000000001", ""),
            frame("0x0000000000000000000000000000000000000009", ""),
        ];
        assert!(filter_precompile_calls(calls).is_empty());
    }

    #[test]
    fn keeps_precompile_calls_with_explicit_value() {
        let calls = vec![
            frame("0x0000000000000000000000000000000000000001", "0x1"),
            frame("0x0000000000000000000000000000000000000002", "0x0"),
        ];
        assert_eq!(filter_precompile_calls(calls).len(), 2);
    }

    #[test]
    fn keeps_ordinary_addresses_regardless_of_value() {
        let calls = vec![
            frame("0xdeadbeef00000000000000000000000000000001", ""),
            frame("", ""),
        ];
        assert_eq!(filter_precompile_calls(calls).len(), 2);
    }
}
