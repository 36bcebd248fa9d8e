//! # Headless Example
//!
//! Drives a progress bar and an avatar without any renderer and prints each
//! element's attributes as JSON, the same data an adapter would consume.
//!
//! Run with: `cargo run --example headless`

use husk::widgets::avatar::{create_avatar, AvatarOptions};
use husk::widgets::progress::{self, create_progress, ProgressOptions};
use husk::InputEvent;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    husk::init_tracing();

    let bar = create_progress().create(&ProgressOptions {
        label: Some("Upload".into()),
        ..Default::default()
    });
    let updates = bar.state().subscribe(|s| tracing::info!(value = s.value, "progress changed"));

    for _ in 0..3 {
        bar.logic()
            .handle_event(progress::events::INCREMENT, Some(&InputEvent::Value(25.0)));
    }
    println!("{}", serde_json::to_string_pretty(&bar.snapshot())?);
    updates.unsubscribe();
    bar.destroy();

    let avatar = create_avatar().create(&AvatarOptions {
        src: Some("https://example.com/ada.png".into()),
        name: Some("Ada Lovelace".into()),
        ..Default::default()
    });
    avatar
        .logic()
        .get_interaction_handlers("image")
        .trigger("error", &InputEvent::Error("404".into()));
    println!("{}", serde_json::to_string_pretty(&avatar.snapshot())?);
    avatar.destroy();

    Ok(())
}
