use async_trait::async_trait;
use narrator::Dispatcher;
use net::{Relay, RetryPolicy, StreamBus, Transport, TransportError};
use shared::{NarrationCommand, Reply};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every delivered command, optionally failing all of them.
#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<NarrationCommand>>,
    closed: bool,
}

impl RecordingTransport {
    fn sent(&self) -> Vec<NarrationCommand> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn deliver(&self, command: NarrationCommand) -> Result<Reply, TransportError> {
        if self.closed {
            return Err(TransportError::ChannelClosed);
        }
        let reply = match command {
            NarrationCommand::CheckSpeaking => Reply::Speaking { speaking: true },
            _ => Reply::Ack,
        };
        self.sent.lock().unwrap().push(command);
        Ok(reply)
    }
}

fn dispatcher(
    transport: Arc<RecordingTransport>,
    resume: bool,
) -> Dispatcher<Arc<RecordingTransport>> {
    let relay = Relay::new(
        transport,
        RetryPolicy::new(1, Duration::from_millis(1)),
        StreamBus::default(),
    );
    Dispatcher::new(Arc::new(relay), resume)
}

fn speak(text: &str, index: u64) -> NarrationCommand {
    NarrationCommand::Speak {
        text: text.into(),
        index,
    }
}

#[tokio::test]
async fn flushes_the_last_line_on_finish() {
    let transport = Arc::new(RecordingTransport::default());
    let mut d = dispatcher(transport.clone(), false);

    d.begin().await.unwrap();
    assert!(d.push("Hello ").await.is_empty());
    let lines = d.push("world\nFoo").await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "Hello world");
    assert!(d.push("bar").await.is_empty());
    let last = d.finish().await.unwrap();
    assert_eq!(last.text, "Foobar\n");
    assert_eq!(last.index, 1);

    assert_eq!(
        transport.sent(),
        vec![
            NarrationCommand::Reset,
            speak("Hello world", 0),
            speak("Foobar", 1)
        ]
    );
}

#[tokio::test]
async fn narrates_without_markup_but_displays_it() {
    let transport = Arc::new(RecordingTransport::default());
    let mut d = dispatcher(transport.clone(), false);

    let lines = d.push("**Bold** <i>move</i>\n---\n").await;
    assert_eq!(lines[0].text, "**Bold** <i>move</i>");
    assert_eq!(transport.sent(), vec![speak("Bold move", 0)]);
    assert_eq!(d.next_index(), 2);
}

#[tokio::test]
async fn html_lines_are_narrated() {
    let transport = Arc::new(RecordingTransport::default());
    let mut d = dispatcher(transport.clone(), false);

    d.push("<p>Hello</p>\n<li>Point one</li>\n").await;
    assert_eq!(
        transport.sent(),
        vec![speak("Hello", 0), speak("Point one", 1)]
    );
}

#[tokio::test]
async fn resume_mode_sends_speak_and_resume() {
    let transport = Arc::new(RecordingTransport::default());
    let mut d = dispatcher(transport.clone(), true);

    d.push("Part one.\nPart two.\n").await;
    assert_eq!(
        transport.sent(),
        vec![
            NarrationCommand::SpeakAndResume {
                text: "Part one.".into(),
                index: 0
            },
            NarrationCommand::SpeakAndResume {
                text: "Part two.".into(),
                index: 1
            },
        ]
    );
}

#[tokio::test]
async fn control_commands_pass_through() {
    let transport = Arc::new(RecordingTransport::default());
    let d = dispatcher(transport.clone(), false);

    d.skip_to(3).await.unwrap();
    d.stop().await.unwrap();
    assert!(d.is_speaking().await.unwrap());
    assert_eq!(
        transport.sent(),
        vec![
            NarrationCommand::DeleteAfter { index: 3 },
            NarrationCommand::Stop,
            NarrationCommand::CheckSpeaking,
        ]
    );
}

#[tokio::test]
async fn undeliverable_lines_are_dropped_but_control_fails() {
    let transport = Arc::new(RecordingTransport {
        closed: true,
        ..Default::default()
    });
    let mut d = dispatcher(transport.clone(), false);

    let lines = d.push("one\ntwo\n").await;
    assert_eq!(lines.len(), 2);
    assert!(d.finish().await.is_none());

    let err = d.stop().await.unwrap_err();
    assert_eq!(err.attempts(), 2);
    assert!(d.begin().await.is_err());
}
