//! First-attachment extraction for multipart messages.
//!
//! MIME parsing is mail-parser's job; this module only walks the parsed
//! parts, picks the first one carrying a filename, and polices the declared
//! Content-Transfer-Encoding. Only base64 and the identity encodings are
//! accepted; anything else is an error rather than a silent decode.

use mail_parser::{MessageParser, MimeHeaders};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MimeError {
    #[error("message could not be parsed as MIME")]
    Parse,

    #[error("unsupported top-level content type [{0}]")]
    NotMultipart(String),

    #[error("no boundary in content type")]
    MissingBoundary,

    #[error("unsupported content-transfer-encoding [{0}]")]
    UnsupportedTransferEncoding(String),
}

/// A decoded file attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Returns the first attachment of a multipart message, decoded.
///
/// The top-level Content-Type must be `multipart/*` with a boundary. Parts
/// without a filename are skipped; a message with no named attachment at
/// all yields `Ok(None)`.
pub fn first_attachment(raw: &[u8]) -> Result<Option<Attachment>, MimeError> {
    let message = MessageParser::default().parse(raw).ok_or(MimeError::Parse)?;

    let content_type = message
        .content_type()
        .ok_or_else(|| MimeError::NotMultipart("(none)".to_string()))?;
    if !content_type.c_type.eq_ignore_ascii_case("multipart") {
        let subtype = content_type.subtype().unwrap_or("");
        return Err(MimeError::NotMultipart(format!(
            "{}/{}",
            content_type.c_type, subtype
        )));
    }
    if content_type.attribute("boundary").is_none() {
        return Err(MimeError::MissingBoundary);
    }

    for part in message.attachments() {
        let Some(filename) = part.attachment_name() else {
            continue;
        };

        if let Some(encoding) = part.content_transfer_encoding() {
            let encoding = encoding.trim().to_ascii_lowercase();
            match encoding.as_str() {
                "" | "base64" | "7bit" | "8bit" | "binary" => {}
                _ => return Err(MimeError::UnsupportedTransferEncoding(encoding)),
            }
        }

        // mail-parser has already undone the transfer encoding here.
        return Ok(Some(Attachment {
            filename: filename.to_string(),
            content: part.contents().to_vec(),
        }));
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "=_bnd_42";

    fn multipart_with(attachment_headers: &str, attachment_body: &str) -> Vec<u8> {
        format!(
            "From: a@example.com\r\n\
             To: b@example.com\r\n\
             Subject: files\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/mixed; boundary=\"{BOUNDARY}\"\r\n\
             \r\n\
             --{BOUNDARY}\r\n\
             Content-Type: text/plain\r\n\
             \r\n\
             see attached\r\n\
             --{BOUNDARY}\r\n\
             {attachment_headers}\r\n\
             \r\n\
             {attachment_body}\r\n\
             --{BOUNDARY}--\r\n"
        )
        .into_bytes()
    }

    #[test]
    fn base64_attachment_is_decoded() {
        // "zip contents\n"
        let raw = multipart_with(
            "Content-Type: application/zip\r\n\
             Content-Transfer-Encoding: base64\r\n\
             Content-Disposition: attachment; filename=\"report.zip\"",
            "emlwIGNvbnRlbnRzCg==",
        );
        let attachment = first_attachment(&raw).unwrap().expect("attachment expected");
        assert_eq!(attachment.filename, "report.zip");
        assert_eq!(attachment.content, b"zip contents\n");
        assert_eq!(attachment.len(), 13);
    }

    #[test]
    fn base64_with_line_breaks_is_decoded() {
        let raw = multipart_with(
            "Content-Type: application/octet-stream\r\n\
             Content-Transfer-Encoding: base64\r\n\
             Content-Disposition: attachment; filename=\"blob.bin\"",
            "aGVsbG8g\r\nd29ybGQ=",
        );
        let attachment = first_attachment(&raw).unwrap().expect("attachment expected");
        assert_eq!(attachment.content, b"hello world");
    }

    #[test]
    fn unencoded_attachment_passes_through() {
        let raw = multipart_with(
            "Content-Type: text/csv\r\n\
             Content-Disposition: attachment; filename=\"data.csv\"",
            "a,b\r\n1,2",
        );
        let attachment = first_attachment(&raw).unwrap().expect("attachment expected");
        assert_eq!(attachment.filename, "data.csv");
        assert_eq!(attachment.content, b"a,b\r\n1,2");
    }

    #[test]
    fn quoted_printable_attachment_is_rejected() {
        let raw = multipart_with(
            "Content-Type: text/plain\r\n\
             Content-Transfer-Encoding: quoted-printable\r\n\
             Content-Disposition: attachment; filename=\"notes.txt\"",
            "caf=C3=A9",
        );
        let err = first_attachment(&raw).unwrap_err();
        assert!(matches!(
            err,
            MimeError::UnsupportedTransferEncoding(enc) if enc == "quoted-printable"
        ));
    }

    #[test]
    fn first_named_part_wins() {
        let raw = format!(
            "From: a@example.com\r\n\
             Subject: two files\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/mixed; boundary=\"{BOUNDARY}\"\r\n\
             \r\n\
             --{BOUNDARY}\r\n\
             Content-Type: text/plain\r\n\
             Content-Disposition: attachment; filename=\"first.txt\"\r\n\
             \r\n\
             one\r\n\
             --{BOUNDARY}\r\n\
             Content-Type: text/plain\r\n\
             Content-Disposition: attachment; filename=\"second.txt\"\r\n\
             \r\n\
             two\r\n\
             --{BOUNDARY}--\r\n"
        )
        .into_bytes();
        let attachment = first_attachment(&raw).unwrap().expect("attachment expected");
        assert_eq!(attachment.filename, "first.txt");
        assert_eq!(attachment.content, b"one");
    }

    #[test]
    fn message_without_named_parts_yields_none() {
        let raw = format!(
            "From: a@example.com\r\n\
             Subject: plain\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/alternative; boundary=\"{BOUNDARY}\"\r\n\
             \r\n\
             --{BOUNDARY}\r\n\
             Content-Type: text/plain\r\n\
             \r\n\
             hello\r\n\
             --{BOUNDARY}\r\n\
             Content-Type: text/html\r\n\
             \r\n\
             <p>hello</p>\r\n\
             --{BOUNDARY}--\r\n"
        )
        .into_bytes();
        assert_eq!(first_attachment(&raw).unwrap(), None);
    }

    #[test]
    fn non_multipart_message_is_rejected() {
        let raw = b"From: a@example.com\r\n\
            Subject: plain\r\n\
            Content-Type: text/plain\r\n\
            \r\n\
            just text\r\n";
        let err = first_attachment(raw).unwrap_err();
        assert!(matches!(err, MimeError::NotMultipart(t) if t == "text/plain"));
    }

    #[test]
    fn multipart_without_boundary_is_rejected() {
        let raw = b"From: a@example.com\r\n\
            Subject: broken\r\n\
            Content-Type: multipart/mixed\r\n\
            \r\n\
            whatever\r\n";
        let err = first_attachment(raw).unwrap_err();
        assert!(matches!(err, MimeError::MissingBoundary));
    }
}
