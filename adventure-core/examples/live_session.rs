//! Play a short story against a running Story Service, always taking the
//! first choice.
//!
//! Run with: `cargo run -p adventure-core --example live_session`

use adventure_core::{Controller, ControllerConfig, ControllerState, StoryClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let client = StoryClient::from_env()?;
    println!("=== Live session against {} ===\n", client.base_url());

    let mut controller = Controller::new(client, ControllerConfig::new());
    controller.configure(3)?;
    controller.start_session().await?;

    while controller.state() == ControllerState::Playing {
        println!("--- {} ---", controller.progress().label());
        println!("{}\n", controller.current_story().unwrap_or_default());

        let Some(first) = controller.current_choices().first().cloned() else {
            println!("No choices offered.");
            break;
        };
        println!("> {first}\n");
        controller.submit_choice(1).await?;

        if controller.status_message().is_some() {
            break;
        }
    }

    if let Some(status) = controller.status_message() {
        println!("[status] {status}");
    }
    if let Some(conclusion) = controller.conclusion() {
        println!("=== The End ===\n{conclusion}");
    }
    Ok(())
}
