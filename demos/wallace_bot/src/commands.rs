//! The bot's command set.

use anyhow::Result;
use regex::Regex;
use wallace::prelude::*;

const SEARCH_URL_BASE: &str =
    "http://vancouver.craigslist.ca/search/sss?sort=rel&is_paid=all&srchType=T&min_price=50&query=";

/// Users `sayas` can speak for: (id, display name, avatar).
const KNOWN_USERS: &[(&str, &str, &str)] = &[
    ("U024BE7LH", "Avery Quinn", "https://avatars.example.com/avery-192.png"),
    ("U0G9QF9C6", "Jordan Lee", "https://avatars.example.com/jordan-192.png"),
];

struct Vendor {
    name: &'static str,
    color: &'static str,
    location: &'static str,
    hours: &'static str,
    url: &'static str,
}

const SCHEDULE: &[Vendor] = &[
    Vendor {
        name: "tacofino",
        color: "e4572e",
        location: "Great Northern Way at Thornton St",
        hours: "From Jun 3 11:30AM To Jun 3 2:00PM",
        url: "http://tacofino.com",
    },
    Vendor {
        name: "mom's grilled cheese",
        color: "29335c",
        location: "Great Northern Way Campus, east lot",
        hours: "From Jun 3 11:00AM To Jun 3 2:30PM",
        url: "http://momsgrilledcheesetruck.com",
    },
];

/// Registers every command on `dispatcher`.
pub fn register(dispatcher: &mut Dispatcher) -> Result<()> {
    let user_mention = Regex::new(r"(?:<@)(\w+)")?;
    let channel_mention = Regex::new(r"(?:<#)(\w+)")?;

    let channel_ref = channel_mention.clone();
    dispatcher.register(
        "sayas",
        move |event| {
            let (Some(user), Some(channel)) = (
                capture(&user_mention, &event.args()[0]),
                capture(&channel_ref, &event.args()[1]),
            ) else {
                return Ok(());
            };

            if let Some((_, name, icon)) = KNOWN_USERS.iter().find(|(id, ..)| *id == user) {
                let post = PostMessage::new(event.args()[2].clone())
                    .as_user(false)
                    .username(*name)
                    .icon_url(*icon);
                event.outbound().post_message(channel, post)?;
            }
            Ok(())
        },
        CommandOptions::builder()
            .required_args(3, "@user #channel <message>")
            .capture_after(2)
            .match_channel("^D")
            .quotes_enabled(false)
            .try_build()?,
    );

    dispatcher.register(
        "say",
        move |event| {
            if let Some(channel) = capture(&channel_mention, &event.args()[0]) {
                event.outbound().send_message(channel, &event.args()[1])?;
            }
            Ok(())
        },
        CommandOptions::builder()
            .required_args(2, "#channel <message>")
            .match_channel("^D")
            .capture_after(1)
            .try_build()?,
    );

    dispatcher.register(
        "cl",
        |event| {
            let query = event.args()[0].replace(' ', "+");
            event.reply(&format!("{SEARCH_URL_BASE}{query}"))?;
            Ok(())
        },
        CommandOptions::builder()
            .match_channel("^D")
            .required_args(1, "\"search query\"")
            .try_build()?,
    );

    dispatcher.register(
        "help",
        |event| {
            event.reply(&event.registry().usage_text())?;
            Ok(())
        },
        CommandOptions::builder().match_channel("^D").try_build()?,
    );

    dispatcher.register(
        "foodtruck",
        |event| {
            let post = SCHEDULE.iter().fold(
                PostMessage::new("Food trucks at Great Northern Way").as_user(true),
                |post, vendor| {
                    post.attachment(
                        Attachment::new()
                            .color(vendor.color)
                            .fallback(vendor.name)
                            .field("Location", vendor.location)
                            .field("Time", vendor.hours)
                            .field("Website", vendor.url),
                    )
                },
            );
            event.reply_post(post)?;
            Ok(())
        },
        CommandOptions::builder()
            .match_channel("^C")
            .match_msg("^Reminder: foodtruck")
            .try_build()?,
    );

    Ok(())
}

fn capture<'t>(regex: &Regex, text: &'t str) -> Option<&'t str> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
