// Behaviour of the sink adapter that withholds the sync-flush trailer:
//
// * forwarding everything but the last four bytes
// * trailer verification on close
// * closed-state and downstream errors

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use pmdeflate_core::compression::{CompressionError, TrailerStripWriter, SYNC_FLUSH_TRAILER};

    struct FlushFails;

    impl Write for FlushFails {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer went away"))
        }
    }

    struct WriteFails;

    impl Write for WriteFails {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "socket closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Records flushes and writes so close can be observed from outside.
    #[derive(Default)]
    struct Tracking {
        bytes: Vec<u8>,
        flushes: usize,
    }

    impl Write for Tracking {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

// # ✅ 1. Single write: body forwarded, trailer held

    #[test]
    fn single_write_withholds_last_four_bytes() {
        let mut w = TrailerStripWriter::new(Vec::new());
        w.write_all(b"payload\x00\x00\xff\xff").unwrap();

        assert_eq!(w.get_ref().as_slice(), b"payload");
        assert_eq!(w.retained(), SYNC_FLUSH_TRAILER);

        w.close().unwrap();
        assert_eq!(w.into_inner(), b"payload");
    }

// # ✅ 2. Byte-at-a-time writes give the same result

    #[test]
    fn byte_at_a_time_matches_single_write() {
        let stream = b"abcdefghij\x00\x00\xff\xff";
        let mut w = TrailerStripWriter::new(Vec::new());
        for b in stream.iter() {
            assert_eq!(w.write(std::slice::from_ref(b)).unwrap(), 1);
        }
        w.close().unwrap();
        assert_eq!(w.into_inner(), b"abcdefghij");
    }

// # ✅ 3. Uneven chunking across the hold boundary

    #[test]
    fn uneven_chunks_forward_in_order() {
        let mut w = TrailerStripWriter::new(Vec::new());
        w.write_all(b"ab").unwrap();
        assert!(w.get_ref().is_empty());
        w.write_all(b"cdefg").unwrap();
        assert_eq!(w.get_ref().as_slice(), b"abc");
        w.write_all(b"\x00\x00").unwrap();
        w.write_all(b"\xff\xff").unwrap();
        w.close().unwrap();
        assert_eq!(w.into_inner(), b"abcdefg");
    }

// # ❌ 4. Wrong tail is an integrity error

    #[test]
    fn wrong_tail_is_rejected() {
        let mut w = TrailerStripWriter::new(Vec::new());
        w.write_all(b"data\x01\x02\x03\x04").unwrap();
        match w.close() {
            Err(CompressionError::TrailerMismatch { found }) => assert_eq!(found, vec![1, 2, 3, 4]),
            other => panic!("unexpected result: {:?}", other),
        }
    }

// # ❌ 5. Fewer than four bytes cannot hold the trailer

    #[test]
    fn short_stream_is_rejected() {
        let mut w = TrailerStripWriter::new(Vec::new());
        w.write_all(b"\x00\xff").unwrap();
        assert!(matches!(w.close(), Err(CompressionError::TrailerMismatch { .. })));
        assert!(w.get_ref().is_empty());
    }

// # ✅ 6. Close flushes the destination and hands it back open

    #[test]
    fn close_flushes_and_leaves_destination_to_its_owner() {
        let mut w = TrailerStripWriter::new(Tracking::default());
        w.write_all(b"body\x00\x00\xff\xff").unwrap();
        assert_eq!(w.get_ref().flushes, 0);

        w.close().unwrap();
        assert_eq!(w.get_ref().flushes, 1);
        assert!(w.retained() == SYNC_FLUSH_TRAILER);

        // Still writable by its owner; the trailer was never forwarded.
        let mut dest = w.into_inner();
        assert_eq!(dest.bytes, b"body");
        dest.write_all(b"next frame").unwrap();
        assert_eq!(dest.bytes, b"bodynext frame");
    }

// # ❌ 7. Use after close

    #[test]
    fn write_and_close_after_close_fail_as_closed() {
        let mut w = TrailerStripWriter::new(Vec::new());
        w.write_all(&SYNC_FLUSH_TRAILER).unwrap();
        w.close().unwrap();
        assert!(w.is_closed());

        let err = w.write(b"more").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(CompressionError::from(err).is_closed());

        assert!(matches!(w.close(), Err(CompressionError::Closed)));
    }

// # ❌ 8. Downstream close error wins over trailer mismatch

    #[test]
    fn downstream_flush_error_is_reported_first() {
        let mut w = TrailerStripWriter::new(FlushFails);
        w.write_all(b"no trailer here").unwrap();
        match w.close() {
            Err(CompressionError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("unexpected result: {:?}", other),
        }
    }

// # ❌ 9. Downstream write errors propagate unchanged

    #[test]
    fn downstream_write_error_propagates() {
        let mut w = TrailerStripWriter::new(WriteFails);
        // Held entirely in the buffer: nothing reaches the sink yet.
        w.write_all(b"abcd").unwrap();
        let err = w.write(b"e").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(matches!(CompressionError::from(err), CompressionError::Io(_)));
    }
}
