//! Property tests for pagination cursors.

use proptest::prelude::*;
use vigil_storage::PaginationCursor;

proptest! {
    #[test]
    fn cursor_decodes_to_same_position(segment_id in 0i64..i64::MAX, frame_offset in any::<u64>()) {
        let cursor = PaginationCursor { segment_id, frame_offset };
        let decoded = PaginationCursor::decode(&cursor.encode());
        prop_assert_eq!(decoded.map(|c| c.key()), Some((segment_id, frame_offset)));
    }

    #[test]
    fn arbitrary_text_never_panics(raw in ".{0,64}") {
        let _ = PaginationCursor::decode(&raw);
    }

    #[test]
    fn encoded_cursor_is_url_safe(segment_id in 0i64..1_000_000, frame_offset in 0u64..1_000_000_000) {
        let encoded = PaginationCursor { segment_id, frame_offset }.encode();
        prop_assert!(encoded.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
