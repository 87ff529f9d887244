//! Command handling on the narration side.
//!
//! [`serve`] pulls commands off an [`Inbox`] and applies them to the
//! [`PlaybackCoordinator`], answering each sender.

use net::Inbox;
use shared::{NarrationCommand, Reply};
use tracing::{debug, info};

use crate::coordinator::PlaybackCoordinator;
use crate::CoordinatorError;

/// Apply one command to the coordinator.
pub async fn handle_command(
    coordinator: &PlaybackCoordinator,
    command: NarrationCommand,
) -> Result<Reply, CoordinatorError> {
    match command {
        NarrationCommand::Reset => coordinator.reset().await.map(|_| Reply::Ack),
        NarrationCommand::Speak { text, index } => coordinator
            .stream_text(text, index)
            .await
            .map(|_| Reply::Ack),
        NarrationCommand::SpeakAndResume { text, index } => coordinator
            .stream_text_and_resume(text, index)
            .await
            .map(|_| Reply::Ack),
        NarrationCommand::DeleteAfter { index } => {
            coordinator.delete_after(index).await.map(|_| Reply::Ack)
        }
        NarrationCommand::Stop => coordinator.stop().await.map(|_| Reply::Ack),
        NarrationCommand::CheckSpeaking => coordinator
            .is_speaking()
            .await
            .map(|speaking| Reply::Speaking { speaking }),
    }
}

/// Serve commands until every sender is gone.
pub async fn serve(mut inbox: Inbox, coordinator: PlaybackCoordinator) {
    info!("narration service listening");
    while let Some(incoming) = inbox.recv().await {
        let action = incoming.command.action();
        debug!(action, "command received");
        let reply = handle_command(&coordinator, incoming.command.clone())
            .await
            .map_err(|e| e.to_string());
        incoming.respond(reply);
    }
    info!("narration service closed");
}
