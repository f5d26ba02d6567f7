use proptest::prelude::*;
use vigil_core::models::ContentHash;

proptest! {
    #[test]
    fn hash_never_contains_the_payload(payload in "[g-z]{12,80}") {
        let hash = ContentHash::of(&payload);
        prop_assert_eq!(hash.as_str().len(), 64);
        prop_assert!(!hash.as_str().contains(payload.as_str()));
    }

    #[test]
    fn hash_is_deterministic_and_parseable(payload in ".{0,200}") {
        let a = ContentHash::of(&payload);
        let b = ContentHash::of(&payload);
        prop_assert_eq!(&a, &b);
        prop_assert!(a.matches(&payload));
        prop_assert_eq!(ContentHash::parse(a.as_str()), Some(a.clone()));
    }
}

#[test]
fn parse_rejects_non_hex() {
    assert!(ContentHash::parse("xyz").is_none());
    assert!(ContentHash::parse(&"A".repeat(64)).is_none());
}
