// Copyright (c) 2025 TexasFortress.AI
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! IMAP mailbox search tool.
//!
//! Connects to the mailbox configured through `CLIMAP_*` environment
//! variables, searches for messages matching the given criteria and
//! optionally downloads them (extracting the first attachment of each).
//!
//! Usage:
//!   climap                                  # connectivity check only
//!   climap --newer 36h                      # recent messages
//!   climap --subject invoice --download     # download matches to CLIMAP_BASE
//!
//! With no search criteria the tool stops after a successful login, which
//! makes it usable as a credentials check.

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use env_logger::Env;
use log::{debug, info, warn};

use mailtools::cli::parse_duration;
use mailtools::config::ClimapSettings;
use mailtools::imap::session::MailSession;
use mailtools::imap::types::SearchCriteria;
use mailtools::mime::{self, MimeError};
use mailtools::store::MessageStore;

#[derive(Parser, Debug)]
#[command(name = "climap", about = "Search an IMAP mailbox, optionally downloading matches")]
struct Args {
    /// Mailbox name
    #[arg(long, default_value = "INBOX")]
    mbox: String,

    /// Message received date must be more recent than this (e.g. 36h, 7d)
    #[arg(long)]
    newer: Option<String>,

    /// Message must contain this substring in its subject
    #[arg(long)]
    subject: Option<String>,

    /// Download matching messages and extract their first attachment
    #[arg(long)]
    download: bool,
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
    let settings = ClimapSettings::new(None)?;

    if args.download && settings.base.is_none() {
        anyhow::bail!("no base directory set for saving messages (CLIMAP_BASE)");
    }

    let mut session = match MailSession::connect(
        &settings.host,
        settings.port,
        &settings.user,
        &settings.pass,
        settings.tls_servername.as_deref(),
    )
    .await
    {
        Ok(session) => session,
        Err(err) => {
            if err.to_string().contains("NotValidForName") {
                warn!("hint: set CLIMAP_TLS_SERVERNAME to work around certificate domain mismatches");
            }
            return Err(err).context("connecting to IMAP server");
        }
    };
    info!("login successful for {} at {}", settings.user, settings.host);

    // No criteria: this run was only a connectivity check.
    if args.newer.is_none() && args.subject.is_none() {
        session.logout().await?;
        return Ok(());
    }

    session.select_mailbox(&args.mbox).await?;

    let store = match (&settings.base, args.download) {
        (Some(base), true) => {
            let store = MessageStore::new(base, &settings.user, &args.mbox);
            store.ensure_dir().await?;
            Some(store)
        }
        _ => None,
    };

    let mut criteria = SearchCriteria::new();
    if let Some(newer) = &args.newer {
        let duration = parse_duration(newer)?;
        let since = (chrono::Local::now()
            - chrono::Duration::from_std(duration).context("--newer out of range")?)
        .date_naive();
        criteria = criteria.since(since);
    }
    if let Some(subject) = &args.subject {
        criteria = criteria.subject(subject.clone());
    }

    let uids = session.search(&criteria).await?;
    info!("search returned {} messages", uids.len());

    for (idx, uid) in uids.iter().copied().enumerate() {
        info!("- uid={} ({}/{})", uid, idx + 1, uids.len());
        match &store {
            Some(store) => {
                let raw = match store.load(uid).await? {
                    Some(raw) => {
                        info!("  file cached for uid {}: {}", uid, store.message_path(uid).display());
                        raw
                    }
                    None => {
                        let raw = session.fetch_message(uid).await?;
                        store.save(uid, &raw).await?;
                        info!("  saved {} bytes for uid {}", raw.len(), uid);
                        raw
                    }
                };
                report_attachment(uid, &raw);
            }
            None => {
                let header = session.fetch_headers(uid).await?;
                log_summary(&header);
            }
        }
    }

    session.logout().await?;
    Ok(())
}

fn report_attachment(uid: u32, raw: &[u8]) {
    match mime::first_attachment(raw) {
        Ok(Some(attachment)) => info!(
            "  found attachment: {} ({} bytes)",
            attachment.filename,
            attachment.len()
        ),
        Ok(None) => debug!("  no attachment in uid {}", uid),
        Err(err @ (MimeError::NotMultipart(_) | MimeError::MissingBoundary)) => {
            debug!("  skipping uid {}: {}", uid, err)
        }
        Err(err) => warn!("  could not extract attachment from uid {}: {}", uid, err),
    }
}

fn log_summary(raw_header: &[u8]) {
    if let Some(message) = mail_parser::MessageParser::default().parse(raw_header) {
        let subject = message.subject().unwrap_or("(no subject)");
        let from = message
            .from()
            .and_then(|address| address.first())
            .and_then(|addr| addr.address.as_deref())
            .unwrap_or("(unknown sender)");
        info!("  from {}: {}", from, subject);
    }
}
