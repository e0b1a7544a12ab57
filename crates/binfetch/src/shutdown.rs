//! Ctrl+C handling for the binfetch CLI

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Return a token that is cancelled when the user presses Ctrl+C.
///
/// In-flight API requests and downloads observe the token and abort with a
/// cancellation error.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, cancelling");
                trigger.cancel();
            }
            Err(e) => warn!(error = %e, "Failed to install Ctrl+C handler"),
        }
    });

    token
}
