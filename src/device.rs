//! Typed views of the XML documents returned by the switch.
//!
//! The firmware wraps every answer in a `ResponseData` envelope whose nesting
//! differs between firmware releases. Fields are therefore looked up by tag
//! name anywhere in the document, and each lookup yields an `Option` so an
//! absent field stays distinguishable from an empty one.

use log::trace;
use roxmltree::Document;

use crate::config::{MISSING_STATUS_CODE, MISSING_STATUS_MESSAGE};
use crate::error::SwitchError;

/// Outcome reported by an action endpoint such as the login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResult {
    /// `statusCode` of the response. `0` means success.
    pub code: i64,
    /// `statusString` of the response.
    pub message: String,
}

impl StatusResult {
    /// Parses a status response.
    ///
    /// A missing `statusCode` becomes [`MISSING_STATUS_CODE`] and a missing
    /// `statusString` becomes [`MISSING_STATUS_MESSAGE`]. A `statusCode` that is
    /// present but not an integer is reported as a configuration error.
    pub fn from_xml(xml: &str) -> Result<Self, SwitchError> {
        let doc = parse_document(xml)?;

        let code = match field(&doc, "statusCode") {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                SwitchError::Configuration(format!("statusCode is not an integer: {raw}"))
            })?,
            None => MISSING_STATUS_CODE,
        };
        let message = field(&doc, "statusString")
            .map(str::to_string)
            .unwrap_or_else(|| MISSING_STATUS_MESSAGE.to_string());

        trace!("status response: code={code} message={message}");
        Ok(Self { code, message })
    }

    /// True when the device reported success.
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Password encryption policy announced by the switch.
///
/// When `password_encrypt_enabled` is set, both the public key and the login
/// token are guaranteed to be present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionSettings {
    pub password_encrypt_enabled: bool,
    /// RSA public key the credential blob must be encrypted with.
    pub rsa_public_key: Option<String>,
    /// One-time token embedded into the encrypted credential blob.
    pub login_token: Option<String>,
}

impl EncryptionSettings {
    /// Settings of a device that accepts plain-text logins.
    pub fn disabled() -> Self {
        Self {
            password_encrypt_enabled: false,
            rsa_public_key: None,
            login_token: None,
        }
    }

    /// Parses the answer of the encryption settings endpoint.
    ///
    /// Only the literal text `1` in `passwEncryptEnable` enables encryption.
    pub fn from_xml(xml: &str) -> Result<Self, SwitchError> {
        let doc = parse_document(xml)?;

        let enabled = field(&doc, "passwEncryptEnable") == Some("1");
        if !enabled {
            trace!("password encryption disabled");
            return Ok(Self::disabled());
        }

        let rsa_public_key = field(&doc, "rsaPublicKey").ok_or_else(|| {
            SwitchError::Configuration(
                "publicKey missing from encryption settings".to_string(),
            )
        })?;
        let login_token = field(&doc, "loginToken").ok_or_else(|| {
            SwitchError::Configuration(
                "login token missing from encryption settings".to_string(),
            )
        })?;

        trace!("password encryption enabled");
        Ok(Self {
            password_encrypt_enabled: true,
            rsa_public_key: Some(rsa_public_key.to_string()),
            login_token: Some(login_token.to_string()),
        })
    }

    /// Public key and login token, when the device demands encryption.
    pub fn encryption_material(&self) -> Option<(&str, &str)> {
        if !self.password_encrypt_enabled {
            return None;
        }
        Some((self.rsa_public_key.as_deref()?, self.login_token.as_deref()?))
    }
}

fn parse_document(xml: &str) -> Result<Document<'_>, SwitchError> {
    let xml = xml.trim_start_matches('\u{feff}').trim_start();
    Document::parse(xml)
        .map_err(|e| SwitchError::Configuration(format!("malformed device XML: {e}")))
}

/// Trimmed text of the first element named `tag`, if it exists and is not empty.
fn field<'a>(doc: &'a Document<'_>, tag: &str) -> Option<&'a str> {
    doc.descendants()
        .find(|node| node.is_element() && node.has_tag_name(tag))
        .and_then(|node| node.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
}
