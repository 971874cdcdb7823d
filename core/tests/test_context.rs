// Connection contexts: negotiated parameters, history kept across messages,
// resets, limits and counters.

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};

    use pmdeflate_core::compression::{
        compress_context_takeover, decompress_context_takeover, CodecPool, CompressionError,
        CompressionLevel, SlidingWindow, MAX_WINDOW_SIZE,
    };
    use pmdeflate_core::config::{DeflateParams, PoolConfig};
    use pmdeflate_core::context::DeflateContext;

    fn pair(params: DeflateParams) -> (DeflateContext, DeflateContext) {
        let pool = CodecPool::new();
        let sender = DeflateContext::new(pool.clone(), params).unwrap();
        let receiver = DeflateContext::new(pool, params).unwrap();
        (sender, receiver)
    }

    fn chat_message(i: usize) -> Vec<u8> {
        format!(
            r#"{{"channel":"lobby","user":"player-{}","text":"gg, well played everyone","seq":{}}}"#,
            i % 3,
            i
        )
        .into_bytes()
    }

// # ✅ 1. Parameters

    #[test]
    fn default_params_keep_context_in_both_directions() {
        let params = DeflateParams::default();
        assert_eq!(params.level, CompressionLevel::FAST);
        assert!(params.outbound_context_takeover);
        assert!(params.inbound_context_takeover);
        assert_eq!(params.max_window_size, MAX_WINDOW_SIZE);
        assert_eq!(params.max_message_size, None);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: DeflateParams =
            serde_json::from_str(r#"{"level":9,"inbound_context_takeover":false}"#).unwrap();
        assert_eq!(params.level, CompressionLevel::BEST);
        assert!(params.outbound_context_takeover);
        assert!(!params.inbound_context_takeover);
        assert_eq!(params.max_window_size, MAX_WINDOW_SIZE);

        let json = serde_json::to_string(&params).unwrap();
        let back: DeflateParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);

        let pool: PoolConfig = serde_json::from_str(r#"{"max_idle_per_bucket":4}"#).unwrap();
        assert_eq!(pool.max_idle_per_bucket, 4);
        assert!(!pool.recycle_dictionary_compressors);
    }

    #[test]
    fn out_of_range_level_is_rejected_on_deserialize() {
        assert!(serde_json::from_str::<DeflateParams>(r#"{"level":12}"#).is_err());
        assert!(serde_json::from_str::<DeflateParams>(r#"{"level":-1}"#).is_err());
    }

    #[test]
    fn invalid_window_size_is_rejected() {
        assert!(matches!(
            DeflateParams::new().with_max_window_size(0),
            Err(CompressionError::InvalidWindowSize { have: 0, .. })
        ));
        assert!(DeflateParams::new().with_max_window_size(MAX_WINDOW_SIZE + 1).is_err());

        let params = DeflateParams {
            max_window_size: 0,
            ..DeflateParams::default()
        };
        assert!(matches!(
            DeflateContext::new(CodecPool::new(), params),
            Err(CompressionError::InvalidWindowSize { .. })
        ));
    }

    #[test]
    fn set_level_validates() {
        let mut ctx = DeflateContext::new(CodecPool::new(), DeflateParams::default()).unwrap();
        assert!(matches!(ctx.set_level(42), Err(CompressionError::InvalidLevel { level: 42, .. })));
        assert_eq!(ctx.params().level, CompressionLevel::FAST);

        ctx.set_level(9).unwrap();
        assert_eq!(ctx.params().level, CompressionLevel::BEST);
    }

    #[test]
    fn disabled_directions_have_no_window() {
        let params = DeflateParams::default().with_inbound_context_takeover(false);
        let ctx = DeflateContext::new(CodecPool::new(), params).unwrap();
        assert!(ctx.outbound_window().is_some());
        assert!(ctx.inbound_window().is_none());
    }

// # ✅ 2. Context takeover across messages

    #[test]
    fn takeover_sequence_round_trips_and_windows_agree() {
        let (mut sender, mut receiver) = pair(DeflateParams::default());

        let mut sizes = Vec::new();
        for i in 0..10 {
            let message = chat_message(i);
            let wire = sender.compress_message(&message).unwrap();
            sizes.push(wire.len());

            assert_eq!(receiver.decompress_message(&wire).unwrap(), message);
            assert_eq!(sender.outbound_window(), receiver.inbound_window());
        }

        assert!(sizes[5] < sizes[0], "sizes {:?}", sizes);
    }

    #[test]
    fn takeover_beats_fresh_context() {
        let (mut with_history, _) = pair(DeflateParams::default());
        let (mut without, _) = pair(DeflateParams::no_context_takeover());

        let mut total_with = 0;
        let mut total_without = 0;
        for i in 0..20 {
            let message = chat_message(i);
            total_with += with_history.compress_message(&message).unwrap().len();
            total_without += without.compress_message(&message).unwrap().len();
        }
        assert!(total_with < total_without, "{} vs {}", total_with, total_without);
    }

    #[test]
    fn window_stays_bounded() {
        let (mut sender, mut receiver) = pair(DeflateParams::default());
        for round in 0..3u8 {
            let message: Vec<u8> = (0..20_000u32).map(|i| (i as u8) ^ round).collect();
            let wire = sender.compress_message(&message).unwrap();
            assert_eq!(receiver.decompress_message(&wire).unwrap(), message);
        }

        let window = sender.outbound_window().unwrap();
        assert_eq!(window.len(), MAX_WINDOW_SIZE);
        assert_eq!(Some(window), receiver.inbound_window());
    }

    #[test]
    fn small_window_round_trips() {
        let params = DeflateParams::default().with_max_window_size(1024).unwrap();
        let (mut sender, mut receiver) = pair(params);
        for i in 0..50 {
            let message = chat_message(i).repeat(i % 4 + 1);
            let wire = sender.compress_message(&message).unwrap();
            assert_eq!(receiver.decompress_message(&wire).unwrap(), message);
        }
        assert_eq!(sender.outbound_window().unwrap().len(), 1024);
    }

    #[test]
    fn mirrored_resets_keep_peers_in_sync() {
        let (mut sender, mut receiver) = pair(DeflateParams::default());
        for i in 0..3 {
            let wire = sender.compress_message(&chat_message(i)).unwrap();
            receiver.decompress_message(&wire).unwrap();
        }

        sender.reset_outbound();
        receiver.reset_inbound();
        assert!(sender.outbound_window().unwrap().is_empty());

        let message = chat_message(3);
        let wire = sender.compress_message(&message).unwrap();
        assert_eq!(receiver.decompress_message(&wire).unwrap(), message);
    }

    #[test]
    fn streaming_sessions_share_the_context_window() {
        let (mut sender, mut receiver) = pair(DeflateParams::default());
        let first = chat_message(0);
        let second = chat_message(1);

        for message in [&first, &second] {
            let mut writer = sender.writer(Vec::new()).unwrap();
            for chunk in message.chunks(10) {
                writer.write_all(chunk).unwrap();
            }
            writer.close().unwrap();
            let wire = writer.into_inner();

            let mut reader = receiver.reader(wire.as_slice()).unwrap();
            let mut out = Vec::new();
            reader.read_to_end(&mut out).unwrap();
            assert!(reader.is_finished());
            assert!(matches!(reader.close(), Err(CompressionError::Closed)));
            assert_eq!(&out, message);
        }

        let mut expected = first.clone();
        expected.extend_from_slice(&second);
        assert_eq!(sender.outbound_window().unwrap().as_slice(), expected.as_slice());
        assert_eq!(receiver.inbound_window().unwrap().as_slice(), expected.as_slice());
    }

    #[test]
    fn free_functions_with_recycled_seeded_compressors() {
        let pool = CodecPool::with_config(PoolConfig {
            recycle_dictionary_compressors: true,
            ..PoolConfig::default()
        });
        let mut tx = SlidingWindow::new();
        let mut rx = SlidingWindow::new();

        for i in 0..6 {
            let message = chat_message(i);
            let mut writer =
                compress_context_takeover(&pool, Vec::new(), CompressionLevel::BEST, &mut tx).unwrap();
            writer.write(&message).unwrap();
            writer.close().unwrap();
            let wire = writer.into_inner();

            let mut reader = decompress_context_takeover(&pool, wire.as_slice(), &mut rx).unwrap();
            let mut out = Vec::new();
            reader.read_to_end(&mut out).unwrap();
            assert_eq!(out, message);
        }
        assert!(pool.stats().reused >= 5);
        assert_eq!(tx, rx);
    }

// # ❌ 3. Limits

    #[test]
    fn message_size_limit_applies_to_context() {
        let params = DeflateParams::default().with_max_message_size(Some(1_000));
        let (mut sender, mut receiver) = pair(params);

        let small = chat_message(0);
        let wire = sender.compress_message(&small).unwrap();
        assert_eq!(receiver.decompress_message(&wire).unwrap(), small);

        let big = vec![b'x'; 5_000];
        let wire = sender.compress_message(&big).unwrap();
        assert!(matches!(
            receiver.decompress_message(&wire),
            Err(CompressionError::MessageTooLarge { limit: 1_000 })
        ));
    }

// # ✅ 4. Counters

    #[test]
    fn counters_track_both_directions() {
        let (mut sender, mut receiver) = pair(DeflateParams::default());
        let message = vec![b'z'; 10_000];

        let wire = sender.compress_message(&message).unwrap();
        receiver.decompress_message(&wire).unwrap();

        let out = sender.counters();
        assert_eq!(out.messages_compressed, 1);
        assert_eq!(out.bytes_plaintext_out, 10_000);
        assert_eq!(out.bytes_wire_out, wire.len() as u64);
        assert_eq!(out.messages_decompressed, 0);

        let inbound = receiver.snapshot();
        assert_eq!(inbound.messages_decompressed, 1);
        assert_eq!(inbound.bytes_wire_in, wire.len() as u64);
        assert_eq!(inbound.bytes_plaintext_in, 10_000);
        assert!(inbound.inbound_ratio > 0.0 && inbound.inbound_ratio < 0.1);
        assert_eq!(inbound.outbound_ratio, 0.0);

        let mut total = sender.counters().clone();
        total += receiver.counters().clone();
        assert_eq!(total.messages_compressed + total.messages_decompressed, 2);
    }
}
