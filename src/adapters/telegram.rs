//! Telegram bot chat adapter.
//!
//! Implements [`ChatPort`] over the Telegram bot HTTP API: `sendMessage`
//! for outbound text and long-poll-free `getUpdates` batches for inbound
//! commands.  The update-batch parsing is a pure function so the wire
//! handling is testable on the host.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: HTTPS requests via the ESP-IDF HTTP
//!   client with the bundled CA store.
//! - **all other targets**: in-memory queues for host-side tests.
//!
//! Transport failures are demoted to log lines — a failed poll or send
//! skips the cycle, it never takes down the control loop.

#[cfg(target_os = "espidf")]
use log::warn;
use serde::Deserialize;

#[cfg(not(target_os = "espidf"))]
use std::collections::VecDeque;

use crate::app::ports::{ChatError, ChatPort, InboundMessage, TextFormat};

#[cfg(target_os = "espidf")]
const API_BASE: &str = "https://api.telegram.org/bot";

/// Updates fetched per poll batch.  The service loops until a batch
/// comes back empty, so this only bounds one round trip.
#[cfg(target_os = "espidf")]
const POLL_LIMIT: u8 = 10;

// ───────────────────────────────────────────────────────────────
// Wire format (getUpdates response, relevant subset)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    #[serde(default)]
    result: Vec<Update>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    text: Option<String>,
    chat: ChatRef,
}

#[derive(Debug, Deserialize)]
struct ChatRef {
    id: i64,
}

/// Parse a `getUpdates` response body.
///
/// Returns the text messages in arrival order plus the next poll offset
/// (highest update id + 1), `None` when the batch was empty.  Non-text
/// updates (stickers, joins, edits) still advance the offset so they are
/// acknowledged and never re-fetched.
pub fn parse_updates(body: &str) -> Result<(Vec<InboundMessage>, Option<i64>), ChatError> {
    let resp: UpdatesResponse = serde_json::from_str(body).map_err(|_| ChatError::PollFailed)?;
    if !resp.ok {
        return Err(ChatError::PollFailed);
    }

    let mut next_offset = None;
    let mut messages = Vec::new();
    for update in resp.result {
        next_offset = Some(update.update_id + 1);
        if let Some(message) = update.message {
            if let Some(text) = message.text {
                messages.push(InboundMessage {
                    chat_id: message.chat.id.to_string(),
                    text,
                });
            }
        }
    }
    Ok((messages, next_offset))
}

/// Percent-encode a query-string value (RFC 3986 unreserved set).
pub fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

pub struct TelegramAdapter {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    token: String,
    /// Next `getUpdates` offset; acknowledges everything below it.
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    next_offset: i64,
    #[cfg(not(target_os = "espidf"))]
    sim_inbound: VecDeque<InboundMessage>,
    #[cfg(not(target_os = "espidf"))]
    sim_sent: Vec<(String, String)>,
}

impl TelegramAdapter {
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            next_offset: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_inbound: VecDeque::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_sent: Vec::new(),
        }
    }

    /// Queue an inbound message (host/test builds only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_push_inbound(&mut self, chat_id: &str, text: &str) {
        self.sim_inbound.push_back(InboundMessage {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        });
    }

    /// Messages sent so far as (chat id, text) pairs (host/test builds only).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_sent(&self) -> &[(String, String)] {
        &self.sim_sent
    }

    // ── Platform-specific transport ───────────────────────────

    /// One HTTPS GET, response body as a string.  Bounded by the HTTP
    /// client's own timeout; errors map to [`ChatError`].
    #[cfg(target_os = "espidf")]
    fn http_get(&self, url: &str) -> Result<String, ChatError> {
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use esp_idf_svc::http::Method;

        let mut conn = EspHttpConnection::new(&Configuration {
            use_global_ca_store: true,
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(|_| ChatError::Disconnected)?;

        conn.initiate_request(Method::Get, url, &[])
            .map_err(|_| ChatError::SendFailed)?;
        conn.initiate_response().map_err(|_| ChatError::SendFailed)?;

        if conn.status() != 200 {
            warn!("Telegram: HTTP status {}", conn.status());
            return Err(ChatError::SendFailed);
        }

        let mut body = Vec::new();
        let mut chunk = [0u8; 512];
        loop {
            match conn.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => body.extend_from_slice(&chunk[..n]),
                Err(_) => return Err(ChatError::PollFailed),
            }
        }
        String::from_utf8(body).map_err(|_| ChatError::PollFailed)
    }
}

impl ChatPort for TelegramAdapter {
    #[cfg(target_os = "espidf")]
    fn send_text(
        &mut self,
        chat_id: &str,
        text: &str,
        format: TextFormat,
    ) -> Result<(), ChatError> {
        let mut url = format!(
            "{API_BASE}{}/sendMessage?chat_id={}&text={}",
            self.token,
            chat_id,
            urlencode(text)
        );
        if format == TextFormat::Markdown {
            url.push_str("&parse_mode=Markdown");
        }
        self.http_get(&url).map(|_| ())
    }

    #[cfg(not(target_os = "espidf"))]
    fn send_text(
        &mut self,
        chat_id: &str,
        text: &str,
        _format: TextFormat,
    ) -> Result<(), ChatError> {
        self.sim_sent.push((chat_id.to_string(), text.to_string()));
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn poll_inbound(&mut self) -> Vec<InboundMessage> {
        let url = format!(
            "{API_BASE}{}/getUpdates?offset={}&limit={}",
            self.token, self.next_offset, POLL_LIMIT
        );
        let body = match self.http_get(&url) {
            Ok(b) => b,
            Err(e) => {
                warn!("Telegram: poll failed ({e}), skipping cycle");
                return Vec::new();
            }
        };
        match parse_updates(&body) {
            Ok((messages, next_offset)) => {
                if let Some(offset) = next_offset {
                    self.next_offset = offset;
                }
                messages
            }
            Err(e) => {
                warn!("Telegram: bad update payload ({e})");
                Vec::new()
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn poll_inbound(&mut self) -> Vec<InboundMessage> {
        self.sim_inbound.drain(..).collect()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
