//! SAN spelling differences between the rules engine and the contract.
//!
//! The contract spells castling with zeros (`0-0`, `0-0-0`); shakmaty and
//! every human-facing surface use the letter O.

use std::sync::LazyLock;

use regex::Regex;

/// Recorded in place of a SAN move when a player claims the opponent timed out.
pub const TIMEOUT_CLAIM: &str = "timeout";

static LETTER_O: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)o").unwrap());
static DIGIT_ZERO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"0").unwrap());

/// Convert a SAN move to the contract's spelling before submission.
pub fn to_contract_san(san: &str) -> String {
    let san = san.trim();
    if san.starts_with('O') || san.starts_with('o') {
        LETTER_O.replace_all(san, "0").into_owned()
    } else {
        san.to_string()
    }
}

/// Convert a recorded SAN move back to the spelling the rules engine parses.
pub fn from_contract_san(san: &str) -> String {
    let san = san.trim();
    if san.starts_with('0') {
        DIGIT_ZERO.replace_all(san, "O").into_owned()
    } else {
        san.to_string()
    }
}

pub fn is_timeout_claim(san: &str) -> bool {
    san == TIMEOUT_CLAIM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_castling_goes_out_as_zeros() {
        assert_eq!(to_contract_san("O-O"), "0-0");
        assert_eq!(to_contract_san("O-O-O+"), "0-0-0+");
        assert_eq!(to_contract_san("o-o"), "0-0");
    }

    #[test]
    fn test_other_moves_untouched() {
        assert_eq!(to_contract_san("e4"), "e4");
        assert_eq!(to_contract_san("Nf3"), "Nf3");
        assert_eq!(to_contract_san(" Qxd8# "), "Qxd8#");
    }

    #[test]
    fn test_recorded_castling_comes_back_as_letters() {
        assert_eq!(from_contract_san("0-0"), "O-O");
        assert_eq!(from_contract_san("0-0-0#"), "O-O-O#");
        assert_eq!(from_contract_san("Rd1"), "Rd1");
    }
}
