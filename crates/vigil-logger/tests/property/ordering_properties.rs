//! Property tests: per-session sequences are gapless in call order.

use std::sync::Arc;

use proptest::prelude::*;
use test_fixtures::builders::metadata_for;
use test_fixtures::sinks::{CountingObserver, RecordingSink};
use vigil_core::config::LoggerConfig;
use vigil_core::models::Stage;
use vigil_logger::{EventInput, EventLogger};

fn non_response_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![
        Just(Stage::Retrieval),
        Just(Stage::Llm),
        Just(Stage::Security),
        Just(Stage::Error),
    ]
}

proptest! {
    #[test]
    fn interleaved_sessions_get_gapless_sequences(
        calls in prop::collection::vec((0usize..4, non_response_stage()), 1..60)
    ) {
        let sink = Arc::new(RecordingSink::new());
        let logger = EventLogger::new(&LoggerConfig::default(), sink.clone(), Arc::new(CountingObserver::default()));
        let sessions = ["a", "b", "c", "d"];
        for session in sessions {
            logger.record(EventInput::new(Stage::Query, session, metadata_for(Stage::Query))).unwrap();
        }
        for (idx, stage) in &calls {
            logger.record(EventInput::new(*stage, sessions[*idx], metadata_for(*stage))).unwrap();
        }

        let events = sink.events();
        for session in sessions {
            let recorded: Vec<_> = events.iter().filter(|e| e.session_id == session).collect();
            let seqs: Vec<u32> = recorded.iter().map(|e| e.sequence).collect();
            let expected: Vec<u32> = (0..recorded.len() as u32).collect();
            prop_assert_eq!(seqs, expected);
            prop_assert_eq!(recorded[0].stage, Stage::Query);
        }
        prop_assert!(events.windows(2).all(|w| w[0].capture_seq < w[1].capture_seq));
    }
}
