// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sparks is a command-line tool for quickly sending email using SparkPost.
//!
//! The API key comes from `SPARKPOST_API_KEY`. Content flags (`--html`,
//! `--text`, `--subs`) accept either literal content or, when the value
//! contains a `/`, a file path to read it from.
//!
//! Usage:
//!   sparks --to you@example.com --subject hi --text "hello there"
//!   sparks --to you@example.com --html ./page.html --send-delay 2h
//!   sparks --to you@example.com --text hi --dry-run   # dump JSON, send nothing

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use env_logger::Env;
use log::info;

use mailtools::cli::{file_or_literal, parse_duration, split_image_spec};
use mailtools::config::SparksSettings;
use mailtools::sparkpost::{self, Content, InlineImage, Transmission, TxOptions};

#[derive(Parser, Debug)]
#[command(name = "sparks", about = "Send email through the SparkPost API")]
struct Args {
    /// Where the mail came from
    #[arg(long, default_value = "default@sparkpostbox.com")]
    from: String,

    /// Where the mail goes to
    #[arg(long)]
    to: String,

    /// Carbon copy this address
    #[arg(long)]
    cc: Option<String>,

    /// Blind carbon copy this address
    #[arg(long)]
    bcc: Option<String>,

    /// Email subject
    #[arg(long, default_value = "")]
    subject: String,

    /// String/filename containing html content
    #[arg(long)]
    html: Option<String>,

    /// String/filename containing text content
    #[arg(long)]
    text: Option<String>,

    /// String/filename containing substitution data (json object)
    #[arg(long)]
    subs: Option<String>,

    /// mimetype:cid:path for an image to include inline
    #[arg(long)]
    img: Option<String>,

    /// Delay delivery by the specified amount of time (e.g. 30m, 2h)
    #[arg(long)]
    send_delay: Option<String>,

    /// Automatically inline css
    #[arg(long)]
    inline_css: bool,

    /// Dump the json that would be sent to the server, without sending
    #[arg(long)]
    dry_run: bool,

    /// Base url for api requests; must be https
    #[arg(long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(err) = run(Args::parse()).await {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    if args.to.trim().is_empty() {
        anyhow::bail!("refusing to send mail to nobody (--to)");
    }

    let settings = SparksSettings::new()?;

    let html = args
        .html
        .as_deref()
        .map(file_or_literal)
        .transpose()
        .context("reading --html")?;
    let text = args
        .text
        .as_deref()
        .map(file_or_literal)
        .transpose()
        .context("reading --text")?;
    if html.is_none() && text.is_none() {
        anyhow::bail!("must specify one of --html or --text");
    }

    let mut config = sparkpost::Config::new(settings.api_key);
    if let Some(url) = &args.url {
        if !url.starts_with("https://") {
            anyhow::bail!("base url must be https");
        }
        config = config.with_base_url(url.trim_end_matches('/'));
    }

    let substitution_data: Option<serde_json::Value> = match &args.subs {
        Some(subs) => {
            let raw = file_or_literal(subs).context("reading --subs")?;
            Some(serde_json::from_str(&raw).context("parsing --subs as a JSON object")?)
        }
        None => None,
    };

    let mut content = Content {
        from: args.from.clone(),
        subject: args.subject.clone(),
        html,
        text,
        ..Content::default()
    };

    if let Some(spec) = &args.img {
        let (mime_type, cid, path) = split_image_spec(spec)?;
        let bytes =
            std::fs::read(&path).with_context(|| format!("reading inline image {path}"))?;
        content
            .inline_images
            .push(InlineImage::new(mime_type, cid, &bytes));
    }

    let (recipients, cc_header) = sparkpost::expand_recipients(
        &args.to,
        args.cc.as_deref(),
        args.bcc.as_deref(),
        substitution_data.as_ref(),
    );
    if let Some(cc) = cc_header {
        content.headers.insert("cc".to_string(), cc);
    }

    let mut options: Option<TxOptions> = None;
    if let Some(delay) = &args.send_delay {
        let duration = parse_duration(delay)?;
        let start = chrono::Local::now()
            + chrono::Duration::from_std(duration).context("--send-delay out of range")?;
        options.get_or_insert_with(TxOptions::default).start_time =
            Some(start.to_rfc3339_opts(chrono::SecondsFormat::Secs, false));
    }
    if args.inline_css {
        options.get_or_insert_with(TxOptions::default).inline_css = Some(true);
    }

    let transmission = Transmission {
        options,
        recipients,
        content,
    };

    if args.dry_run {
        println!("{}", serde_json::to_string(&transmission)?);
        return Ok(());
    }

    let client = sparkpost::Client::new(config);
    let receipt = client.send(&transmission).await?;
    info!("HTTP [{}] TX {}", receipt.status, receipt.id);
    if receipt.total_rejected > 0 {
        log::warn!(
            "{} of {} recipients rejected",
            receipt.total_rejected,
            receipt.total_accepted + receipt.total_rejected
        );
    }

    Ok(())
}
