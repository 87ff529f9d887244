use futures::StreamExt;
use lingproc::{LineSplitter, line_stream};
use shared::Utterance;
use tokio_stream::iter;

#[test]
fn flushes_trailing_line_on_finish() {
    let mut splitter = LineSplitter::new();
    assert!(splitter.push_str("Hello ").is_empty());
    assert_eq!(
        splitter.push_str("world\nFoo"),
        vec![Utterance::new("Hello world", 0)]
    );
    assert!(splitter.push_str("bar").is_empty());
    assert_eq!(splitter.pending(), "Foobar");
    assert_eq!(splitter.finish(), Some(Utterance::new("Foobar\n", 1)));
}

#[test]
fn one_chunk_with_several_lines() {
    let mut splitter = LineSplitter::new();
    let lines = splitter.push_str("Part one.\nPart two.\n");
    assert_eq!(
        lines,
        vec![Utterance::new("Part one.", 0), Utterance::new("Part two.", 1)]
    );
    assert_eq!(splitter.next_index(), 2);
    assert_eq!(splitter.finish(), None);
}

#[test]
fn blank_lines_do_not_consume_indices() {
    let mut splitter = LineSplitter::starting_at(10);
    let lines = splitter.push_str("a\r\n\n   \nb\n");
    assert_eq!(lines, vec![Utterance::new("a", 10), Utterance::new("b", 11)]);
}

#[test]
fn newline_split_across_chunks() {
    let mut splitter = LineSplitter::new();
    assert!(splitter.push_str("first").is_empty());
    assert_eq!(splitter.push_str("\n"), vec![Utterance::new("first", 0)]);
    assert!(splitter.push_str("sec").is_empty());
    assert_eq!(
        splitter.push_str("ond\nthi"),
        vec![Utterance::new("second", 1)]
    );
    assert_eq!(splitter.finish(), Some(Utterance::new("thi\n", 2)));
}

#[tokio::test]
async fn line_stream_matches_splitter() {
    let chunks = vec!["Hello ", "world\nFoo", "bar"]
        .into_iter()
        .map(String::from);
    let lines: Vec<Utterance> = line_stream(iter(chunks)).collect().await;
    assert_eq!(
        lines,
        vec![Utterance::new("Hello world", 0), Utterance::new("Foobar\n", 1)]
    );
}

#[tokio::test]
async fn line_stream_of_nothing_is_empty() {
    let chunks = vec!["", "  "].into_iter().map(String::from);
    let lines: Vec<Utterance> = line_stream(iter(chunks)).collect().await;
    assert!(lines.is_empty());
}
