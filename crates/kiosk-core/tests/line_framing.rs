//! Integration tests for serial line framing through the public API.
//!
//! A scan stream is fed to the framer in every possible chunking, and the
//! emitted frames must not depend on how the bytes were split.

use kiosk_core::{Frame, LineFramer};

fn frame_texts(frames: Vec<Frame>) -> Vec<String> {
    frames.into_iter().map(Frame::into_text).collect()
}

/// Feeds `stream` in chunks of `chunk_len` bytes and collects every frame.
fn frame_in_chunks(stream: &[u8], chunk_len: usize) -> Vec<String> {
    let mut framer = LineFramer::default();
    let mut out = Vec::new();
    for chunk in stream.chunks(chunk_len) {
        out.extend(frame_texts(framer.push(chunk)));
    }
    out
}

#[test]
fn test_k_terminated_lines_yield_k_frames_in_order() {
    // Arrange
    let ids = ["0001", "A2B3C4", "kartu-99", "7", "LAST"];
    let stream: Vec<u8> = ids.iter().flat_map(|id| format!("{id}\n").into_bytes()).collect();

    // Act
    let frames = frame_in_chunks(&stream, stream.len());

    // Assert
    assert_eq!(frames, ids);
}

#[test]
fn test_frames_do_not_depend_on_read_boundaries() {
    let stream = b"ID-1\r\nID-22\r\n\r\nID-333\n";
    let expected = vec!["ID-1", "ID-22", "ID-333"];

    for chunk_len in 1..=stream.len() {
        assert_eq!(
            frame_in_chunks(stream, chunk_len),
            expected,
            "chunk length {chunk_len}"
        );
    }
}

#[test]
fn test_empty_lines_never_produce_frames() {
    let frames = frame_in_chunks(b"\n\n\r\n \t \n", 3);
    assert!(frames.is_empty());
}

#[test]
fn test_trailing_whitespace_is_stripped_and_leading_kept() {
    let frames = frame_in_chunks(b" 12AB \t\r\n", 2);
    assert_eq!(frames, vec![" 12AB"]);
}

#[test]
fn test_invalid_bytes_are_dropped_without_losing_the_line() {
    let frames = frame_in_chunks(&[b'4', 0xFF, b'2', b'\r', b'\n'], 1);
    assert_eq!(frames, vec!["42"]);
}

#[test]
fn test_unterminated_tail_is_not_emitted() {
    // Arrange
    let mut framer = LineFramer::default();

    // Act
    let frames = framer.push(b"DONE\nPARTIAL");

    // Assert
    assert_eq!(frame_texts(frames), vec!["DONE"]);
    assert_eq!(framer.pending_len(), "PARTIAL".len());
}
