//! Wallace console bot.
//!
//! Reads chat messages from stdin, one per line, and prints whatever the bot
//! sends back. A line starting with `@<channel> ` is posted to that channel
//! instead of the default one.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package wallace-bot -- --channel D0CONSOLE
//! > .help
//! > @C0GENERAL Reminder: foodtruck
//! ```

mod commands;

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use wallace::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "wallace", version, about = "Console front end for the Wallace chat bot")]
struct Args {
    /// Configuration file, instead of searching for wallace.toml.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile, e.g. "production".
    #[arg(short, long)]
    profile: Option<String>,

    /// Channel for lines without an `@<channel>` prefix. Direct-message
    /// channels start with `D`.
    #[arg(long, default_value = "D0CONSOLE")]
    channel: String,

    /// Print outbound messages as JSON lines.
    #[arg(long)]
    json: bool,
}

/// Turns one console line into an inbound message.
fn parse_line(line: &str, default_channel: &str) -> InboundMessage {
    let (channel, text) = line
        .strip_prefix('@')
        .and_then(|rest| rest.split_once(' '))
        .unwrap_or((default_channel, line));
    InboundMessage::new(channel, text).from_user("console")
}

fn render(message: &OutboundMessage, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string(message)?);
    }

    let mut out = match message {
        OutboundMessage::Text { channel, text } => format!("[{channel}] {text}"),
        OutboundMessage::Post { channel, post } => match &post.username {
            Some(name) => format!("[{channel}] {name}: {}", post.text),
            None => format!("[{channel}] {}", post.text),
        },
    };
    if let OutboundMessage::Post { post, .. } = message {
        for attachment in &post.attachments {
            for field in &attachment.fields {
                out.push_str(&format!("\n    {}: {}", field.title, field.value));
            }
        }
    }
    Ok(out)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = WallaceRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }
    let mut runtime = builder.build()?;

    info!("Running wallace v{}", env!("CARGO_PKG_VERSION"));
    commands::register(runtime.dispatcher_mut())?;
    info!("Registered {} commands", runtime.command_count());

    let (sender, transport) = runtime.inbound_channel();
    let (outbound, mut replies) = channel_outbound();

    let json = args.json;
    let printer = tokio::spawn(async move {
        while let Some(message) = replies.recv().await {
            match render(&message, json) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "Failed to render outbound message"),
            }
        }
    });

    // stdin is read on its own thread until EOF
    let default_channel = args.channel;
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => {
                    if sender
                        .blocking_send(parse_line(&line, &default_channel))
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
    });

    let stats = runtime.run(transport, &outbound).await?;
    drop(outbound);
    printer.await?;

    info!(
        received = stats.received,
        invoked = stats.invoked,
        "Wallace stopped"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_default_channel() {
        let message = parse_line(".help", "D0CONSOLE");
        assert_eq!(message.channel, "D0CONSOLE");
        assert_eq!(message.text, ".help");
        assert_eq!(message.user, "console");
    }

    #[test]
    fn test_parse_line_channel_prefix() {
        let message = parse_line("@C0GENERAL Reminder: foodtruck", "D0CONSOLE");
        assert_eq!(message.channel, "C0GENERAL");
        assert_eq!(message.text, "Reminder: foodtruck");
    }

    #[test]
    fn test_parse_line_bare_mention_is_text() {
        let message = parse_line("@nobody", "D0CONSOLE");
        assert_eq!(message.channel, "D0CONSOLE");
        assert_eq!(message.text, "@nobody");
    }

    #[test]
    fn test_render_post_with_fields() {
        let message = OutboundMessage::Post {
            channel: "C1".into(),
            post: PostMessage::new("Lunch")
                .attachment(Attachment::new().field("Location", "Lot B")),
        };
        assert_eq!(
            render(&message, false).unwrap(),
            "[C1] Lunch\n    Location: Lot B"
        );
    }

    #[test]
    fn test_render_json() {
        let message = OutboundMessage::Text {
            channel: "C1".into(),
            text: "hi".into(),
        };
        assert_eq!(
            render(&message, true).unwrap(),
            r#"{"kind":"text","channel":"C1","text":"hi"}"#
        );
    }
}
