//! Echo bot: replies to every text message with the same text.
//!
//! Reads APP_ID, APP_SECRET and the optional FEISHU_VERIFY_TOKEN /
//! FEISHU_ENCRYPT_KEY from the environment, then processes one captured
//! event callback body from stdin.
//!
//! Run with: cargo run --example echo_bot < callback.json

use feishu::prelude::*;
use std::io::Read;
use tracing_subscriber::EnvFilter;

async fn echo(client: FeishuClient, event: Event) -> HandlerResult {
    if let EventContent::TextMessage(message) = event.event {
        let receiver = Receiver::open_id(&message.meta.open_id);
        client
            .message
            .send_text(receiver, message.text_without_at_bot)
            .await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = ClientBuilder::new().build_async()?;
    let replier = client.clone();
    let dispatcher = EventDispatcher::task(
        WebhookConfig::from_env(),
        FnHandler::new("echo", move |event: Event| echo(replier.clone(), event)),
    );

    let mut body = Vec::new();
    std::io::stdin().read_to_end(&mut body)?;

    // What a web framework route would write back to the platform
    let response = dispatcher.handle(&WebhookRequest::new(body)).await;
    println!("{} {}", response.status, response.body);

    dispatcher.drain().await;
    client.close().await?;
    Ok(())
}
