//! Background execution of UI commands.

use crate::controller::TagController;
use crate::events::TuiEvent;
use crate::state::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Run `command` on the runtime; its outcome comes back through `tx`.
pub fn spawn_command(
    controller: &TagController,
    command: Command,
    tx: mpsc::Sender<TuiEvent>,
) -> JoinHandle<()> {
    let controller = controller.clone();
    tokio::spawn(async move {
        let event = run_command(&controller, command).await;
        if let Some(event) = event {
            if tx.send(event).await.is_err() {
                debug!("event loop closed before command settled");
            }
        }
    })
}

/// Run `command` to completion, returning the event to report, if any.
pub async fn run_command(controller: &TagController, command: Command) -> Option<TuiEvent> {
    match command {
        Command::LoadTags => controller
            .tags()
            .await
            .err()
            .map(|err| TuiEvent::QueryFailed(format!("Loading tags failed: {err}"))),
        Command::RefreshTags => controller
            .refresh_tags()
            .await
            .err()
            .map(|err| TuiEvent::QueryFailed(format!("Refreshing tags failed: {err}"))),
        Command::LoadCurrent => controller
            .current_tag()
            .await
            .err()
            .map(|err| TuiEvent::QueryFailed(format!("Loading tag failed: {err}"))),
        Command::Mutate { kind, tag } => {
            let result = controller.run(kind, tag).await;
            Some(TuiEvent::MutationSettled { kind, result })
        }
    }
}
