use lingproc::{narration_copy, strip_markup};
use shared::Utterance;

#[test]
fn strips_emphasis_and_tags() {
    assert_eq!(strip_markup("**hello** *world*!"), "hello world!");
    assert_eq!(strip_markup("<i>quiet</i> please"), "quiet please");
    assert_eq!(strip_markup("## Summary"), "Summary");
    assert_eq!(strip_markup("- first point"), "first point");
}

#[test]
fn markup_only_becomes_empty() {
    assert_eq!(strip_markup("***"), "");
    assert_eq!(strip_markup("<br>"), "");
}

#[test]
fn block_html_keeps_its_words() {
    assert_eq!(strip_markup("<p>Hello world</p>"), "Hello world");
    assert_eq!(strip_markup("<li>Point one</li>"), "Point one");
    assert_eq!(strip_markup("<h3>Key takeaways</h3>"), "Key takeaways");
    assert_eq!(strip_markup("<div class=\"note\">Summary text</div>"), "Summary text");
    assert_eq!(strip_markup("<p>One</p><p>Two</p>"), "One Two");
    assert_eq!(strip_markup("<b>Foo</b>bar <!-- hidden -->"), "Foobar");
}

#[test]
fn literal_symbols_survive() {
    assert_eq!(strip_markup("C# is great"), "C# is great");
    assert_eq!(strip_markup("use snake_case names"), "use snake_case names");
    assert_eq!(strip_markup("if a < b and c > d"), "if a < b and c > d");
}

#[test]
fn ordered_items_keep_their_numbers() {
    assert_eq!(strip_markup("1. Buy milk"), "1. Buy milk");
    assert_eq!(strip_markup("3. Third\n4. Fourth"), "3. Third 4. Fourth");
    assert_eq!(strip_markup("- bullet"), "bullet");
}

#[test]
fn narration_copy_keeps_index_and_display_text() {
    let display = Utterance::new("**Foo**bar\n", 4);
    let spoken = narration_copy(&display);
    assert_eq!(spoken, Utterance::new("Foobar", 4));
    assert_eq!(display.text, "**Foo**bar\n");
}
