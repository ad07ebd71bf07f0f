use std::sync::Arc;
use std::time::Duration;

use async_imap::{Client as AsyncImapClient, Session as AsyncImapSession};
use futures_util::stream::TryStreamExt;
use rustls::pki_types::ServerName as PkiServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream as TokioTcpStream;
use tokio::time::timeout;
use tokio_rustls::{client::TlsStream as TokioTlsStreamClient, TlsConnector};
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use crate::imap::error::ImapError;
use crate::imap::types::SearchCriteria;

// --- Type Aliases ---

// Concrete Tokio types
type BaseTcpStream = TokioTcpStream;
type BaseTlsStream = TokioTlsStreamClient<BaseTcpStream>;

// Compatibility wrapper for async_imap
type CompatStream = Compat<BaseTlsStream>;

// The actual session type returned by async_imap::login
type UnderlyingImapSession = AsyncImapSession<CompatStream>;

const LOGIN_TIMEOUT: Duration = Duration::from_secs(30);
const LOGOUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin wrapper over an authenticated `async_imap` session.
///
/// Owns connection setup (TCP + TLS + LOGIN) and exposes the handful of
/// commands the tools need: NOOP, mailbox selection, UID SEARCH and UID
/// FETCH. The protocol itself is entirely async-imap's business.
pub struct MailSession {
    session: UnderlyingImapSession,
}

// --- Internal Connection Logic ---

/// Establishes the TCP connection and performs the TLS handshake.
///
/// `sni_override` substitutes the name used for SNI and certificate
/// verification, for servers whose certificate does not match the
/// connection host.
async fn setup_tls_stream(
    host: &str,
    port: u16,
    sni_override: Option<&str>,
) -> Result<BaseTlsStream, ImapError> {
    let verify_name = sni_override.unwrap_or(host).to_string();
    let server_name: PkiServerName<'static> = PkiServerName::try_from(verify_name.clone())
        .map_err(|_| ImapError::Tls(format!("invalid server name: {verify_name}")))?;

    let mut root_cert_store = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs()?;
    let (added, ignored) = root_cert_store.add_parsable_certificates(certs);
    log::debug!("Loaded {} native certs, ignored {}.", added, ignored);
    if root_cert_store.is_empty() {
        log::warn!("Root certificate store is empty after loading native certs.");
    }

    let config = ClientConfig::builder()
        .with_root_certificates(root_cert_store)
        .with_no_client_auth();
    let tls_connector = TlsConnector::from(Arc::new(config));

    log::debug!("Attempting TCP connection to {}:{}...", host, port);
    let tcp_stream = BaseTcpStream::connect((host, port)).await?;
    log::debug!("TCP connected. Performing TLS handshake...");

    let tls_stream = tls_connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(|e| ImapError::Tls(e.to_string()))?;
    log::debug!("TLS handshake successful.");
    Ok(tls_stream)
}

/// Performs IMAP LOGIN on the freshly connected stream.
async fn perform_imap_login(
    compat_stream: CompatStream,
    username: &str,
    password: &str,
) -> Result<UnderlyingImapSession, ImapError> {
    let client = AsyncImapClient::new(compat_stream);
    log::debug!("IMAP client created. Attempting login for user '{}'...", username);

    match timeout(LOGIN_TIMEOUT, client.login(username, password)).await {
        Ok(Ok(session)) => {
            log::debug!("IMAP login successful for user: {}", username);
            Ok(session)
        }
        Ok(Err((e, _client))) => Err(ImapError::Auth(e.to_string())),
        Err(_) => Err(ImapError::Timeout(format!(
            "login did not complete within {LOGIN_TIMEOUT:?}"
        ))),
    }
}

impl MailSession {
    /// Connects, logs in and pings the server, returning a ready session.
    ///
    /// async-imap only speaks commands on an authenticated session, so the
    /// connectivity NOOP runs right after LOGIN rather than before it.
    pub async fn connect(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        sni_override: Option<&str>,
    ) -> Result<Self, ImapError> {
        let tls_stream = setup_tls_stream(host, port, sni_override).await?;
        let compat_stream = tls_stream.compat();
        let session = perform_imap_login(compat_stream, username, password).await?;
        let mut session = Self { session };
        session.ping().await?;
        Ok(session)
    }

    /// Runs a NOOP to confirm the server still answers.
    pub async fn ping(&mut self) -> Result<(), ImapError> {
        self.session.noop().await.map_err(ImapError::from)
    }

    /// Confirms via LIST that `name` exists, then opens every match
    /// read-only. An unknown mailbox is an error, not an empty result.
    pub async fn select_mailbox(&mut self, name: &str) -> Result<(), ImapError> {
        let mut list_stream = self.session.list(Some(""), Some(name)).await?;
        let mut matches = Vec::new();
        while let Some(mailbox) = list_stream.try_next().await? {
            matches.push(mailbox.name().to_string());
        }
        drop(list_stream);

        if matches.is_empty() {
            return Err(ImapError::MailboxNotFound(name.to_string()));
        }
        for mailbox in &matches {
            let status = self.session.examine(mailbox).await?;
            log::debug!("selected {} read-only ({} messages)", mailbox, status.exists);
        }
        Ok(())
    }

    /// UID SEARCH with the given criteria, returned in ascending UID order.
    pub async fn search(&mut self, criteria: &SearchCriteria) -> Result<Vec<u32>, ImapError> {
        if criteria.is_empty() {
            return Err(ImapError::Command("empty search criteria".to_string()));
        }
        let uids = self.session.uid_search(criteria.to_query()).await?;
        let mut uids: Vec<u32> = uids.into_iter().collect();
        uids.sort_unstable();
        Ok(uids)
    }

    /// Fetches the full raw message (`BODY[]`) for a UID.
    pub async fn fetch_message(&mut self, uid: u32) -> Result<Vec<u8>, ImapError> {
        self.fetch_part(uid, "BODY[]", |fetch| fetch.body().map(<[u8]>::to_vec))
            .await
    }

    /// Fetches only the header block (`RFC822.HEADER`) for a UID.
    pub async fn fetch_headers(&mut self, uid: u32) -> Result<Vec<u8>, ImapError> {
        self.fetch_part(uid, "RFC822.HEADER", |fetch| {
            fetch.header().map(<[u8]>::to_vec)
        })
        .await
    }

    async fn fetch_part<F>(
        &mut self,
        uid: u32,
        query: &str,
        extract: F,
    ) -> Result<Vec<u8>, ImapError>
    where
        F: Fn(&async_imap::types::Fetch) -> Option<Vec<u8>>,
    {
        let uid_set = uid.to_string();
        let mut fetch_stream = self.session.uid_fetch(&uid_set, query).await?;
        let mut data: Option<Vec<u8>> = None;
        while let Some(fetch) = fetch_stream.try_next().await? {
            if data.is_none() {
                data = extract(&fetch);
            }
        }
        drop(fetch_stream);

        data.ok_or_else(|| ImapError::MissingData(format!("no {query} returned for uid {uid}")))
    }

    /// Logs out, bounded by a timeout. Consumes the session; there is
    /// nothing useful to do with one after LOGOUT.
    pub async fn logout(mut self) -> Result<(), ImapError> {
        match timeout(LOGOUT_TIMEOUT, self.session.logout()).await {
            Ok(result) => result.map_err(ImapError::from),
            Err(_) => Err(ImapError::Timeout(format!(
                "logout did not complete within {LOGOUT_TIMEOUT:?}"
            ))),
        }
    }
}
