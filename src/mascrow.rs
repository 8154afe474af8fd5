//! Mascrow integrity fingerprints for QR payloads.
//!
//! A 32-bit rolling checksum (`h = h * 31 + unit` over UTF-16 code units,
//! wrapping) rendered as `hash_<hex of |h|>`. The format matches fingerprints
//! printed on codes issued by the dashboard, so the arithmetic must stay
//! bit-for-bit stable. This is tamper-evident, not tamper-proof: anyone can
//! recompute it for modified content.

const PREFIX: &str = "hash_";

fn rolling_hash(input: impl Iterator<Item = u16>) -> i32 {
    input.fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

/// Fingerprint of `content` with an empty salt.
pub fn fingerprint(content: &str) -> String {
    fingerprint_with_salt(content, "")
}

pub fn fingerprint_with_salt(content: &str, salt: &str) -> String {
    let hash = rolling_hash(content.encode_utf16().chain(salt.encode_utf16()));
    format!("{}{:x}", PREFIX, hash.unsigned_abs())
}

/// True when `provided` is exactly the unsalted fingerprint of `content`.
pub fn verify(provided: &str, content: &str) -> bool {
    verify_with_salt(provided, content, "")
}

pub fn verify_with_salt(provided: &str, content: &str, salt: &str) -> bool {
    provided == fingerprint_with_salt(content, salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &[&str] = &[
        "https://pay.example.com/merchant/42?amount=100",
        "upi://pay?pa=shop@bank&pn=Corner%20Store&am=250",
        "WIFI:S:CoffeeHouse;T:WPA;P:latte-art;;",
        "bitcoin:bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh",
        "Plain text menu: espresso, cortado, flat white",
    ];

    #[test]
    fn test_known_values() {
        assert_eq!(fingerprint(""), "hash_0");
        assert_eq!(fingerprint("a"), "hash_61");
        assert_eq!(fingerprint("ab"), "hash_c21");
    }

    #[test]
    fn test_salt_is_appended() {
        assert_eq!(fingerprint_with_salt("a", "b"), fingerprint("ab"));
        assert_ne!(fingerprint_with_salt("a", "x"), fingerprint("a"));
    }

    #[test]
    fn test_deterministic_and_verifiable() {
        for content in CORPUS {
            assert_eq!(fingerprint(content), fingerprint(content));
            assert!(verify(&fingerprint(content), content));
            assert!(verify_with_salt(
                &fingerprint_with_salt(content, "merchant-7"),
                content,
                "merchant-7"
            ));
        }
    }

    #[test]
    fn test_single_character_mutations_change_fingerprint() {
        for content in CORPUS {
            let original = fingerprint(content);
            let chars: Vec<char> = content.chars().collect();
            for i in 0..chars.len() {
                let mut mutated = chars.clone();
                mutated[i] = if chars[i] == 'x' { 'y' } else { 'x' };
                let mutated: String = mutated.into_iter().collect();
                assert_ne!(fingerprint(&mutated), original, "mutation at {i} of {content}");
            }
        }
    }

    #[test]
    fn test_rejects_other_content() {
        let issued = fingerprint(CORPUS[0]);
        assert!(!verify(&issued, CORPUS[1]));
        assert!(!verify("", CORPUS[0]));
    }

    #[test]
    fn test_non_ascii_content() {
        let content = "₹500 का भुगतान करें";
        assert!(verify(&fingerprint(content), content));
    }
}
