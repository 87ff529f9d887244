use narrator::ChunkDecoder;

#[test]
fn holds_back_split_characters() {
    let bytes = "héllo wörld".as_bytes();
    let mut decoder = ChunkDecoder::new();
    let mut out = String::new();
    for chunk in bytes.chunks(2) {
        out.push_str(&decoder.decode(chunk));
    }
    out.push_str(&decoder.finish());
    assert_eq!(out, "héllo wörld");
}

#[test]
fn incomplete_sequence_waits_for_next_chunk() {
    let snowman = "☃".as_bytes();
    let mut decoder = ChunkDecoder::new();
    assert_eq!(decoder.decode(&snowman[..1]), "");
    assert_eq!(decoder.decode(&snowman[1..]), "☃");
}

#[test]
fn invalid_bytes_are_replaced() {
    let mut decoder = ChunkDecoder::new();
    assert_eq!(decoder.decode(b"a\xffb"), "a\u{fffd}b");
    assert_eq!(decoder.finish(), "");
}

#[test]
fn truncated_tail_is_flushed_lossily() {
    let mut decoder = ChunkDecoder::new();
    assert_eq!(decoder.decode(b"ok\xe2\x98"), "ok");
    assert_eq!(decoder.finish(), "\u{fffd}");
}
