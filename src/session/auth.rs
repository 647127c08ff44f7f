use super::*;

impl SwitchSession {
    /// Returns the session prefix, discovering it on first use.
    ///
    /// The device redirects its root page into a session specific path such as
    /// `/cs4d2e91/hpe/config/login.htm`; everything in front of `hpe/` is the
    /// prefix. Later calls return the cached value without a request.
    ///
    /// A root page that is not delivered fails the discovery like a missing
    /// marker does; the HTTP status is kept in the message.
    pub async fn discover_session_prefix(&mut self) -> Result<String, SwitchError> {
        if let Some(prefix) = &self.session_prefix {
            return Ok(prefix.clone());
        }

        let response = self.get("", None).await?;
        if !is_ok_status(&response) {
            return Err(SwitchError::Protocol(format!(
                "root page returned HTTP {} at {}",
                response.status().as_u16(),
                redact(response.url().as_str())
            )));
        }

        let prefix = session_prefix_from_path(response.url().path())?;
        debug!("{} session prefix: '{}'", self.host, prefix);
        self.session_prefix = Some(prefix.clone());
        Ok(prefix)
    }

    /// Fetches and parses the password encryption policy of the device.
    pub async fn fetch_encryption_settings(&self) -> Result<EncryptionSettings, SwitchError> {
        let xml = self.get_text(config::ENCRYPTION_SETTINGS_PATH).await?;
        EncryptionSettings::from_xml(&xml)
    }

    /// Logs in with the session credentials.
    ///
    /// One attempt is made. The device either accepts the login
    /// (`statusCode` 0) or the call fails with the reason it reported. Any
    /// other code, negative values included, is a rejection.
    pub async fn authenticate(&mut self) -> Result<(), SwitchError> {
        debug!(">> authenticate {}", self.host);
        let settings = self.fetch_encryption_settings().await?;
        if settings.password_encrypt_enabled {
            debug!("{} requires encrypted credentials", self.host);
        }

        let path = build_login_path(&settings, &self.username, &self.password)?;
        let body = self.get_text(&path).await?;

        let status = StatusResult::from_xml(&body)?;
        if !status.is_success() {
            return Err(SwitchError::Authentication {
                code: status.code,
                message: status.message,
            });
        }

        info!("{} authenticated as {}", self.host, self.username);
        Ok(())
    }
}

/// Extracts the session prefix from the path of the redirect target.
///
/// Leading and trailing slashes are dropped, so `/cs4d2e91/hpe/` yields
/// `cs4d2e91` and `/hpe/` yields an empty prefix.
pub fn session_prefix_from_path(path: &str) -> Result<String, SwitchError> {
    let idx = path.find(config::SESSION_MARKER).ok_or_else(|| {
        SwitchError::Protocol(format!(
            "redirect target '{path}' has no '{}' segment",
            config::SESSION_MARKER
        ))
    })?;
    Ok(path[..idx].trim_matches('/').to_string())
}

/// Builds the login path for the given encryption policy.
///
/// Plain logins carry the credentials as query parameters, which the firmware
/// requires. Encrypted logins carry a single `cred` parameter holding the
/// lowercase hex of the RSA ciphertext.
pub fn build_login_path(
    settings: &EncryptionSettings,
    username: &str,
    password: &str,
) -> Result<String, SwitchError> {
    if !settings.password_encrypt_enabled {
        return Ok(format!(
            "{}&user={username}&password={password}&ssd=true&",
            config::LOGIN_PATH
        ));
    }

    let (public_key, token) = settings.encryption_material().ok_or_else(|| {
        SwitchError::Configuration("encryption enabled without key material".to_string())
    })?;
    let blob = format!("user={username}&password={password}&ssd=true&token={token}&");
    let cipher = encrypt_credentials(public_key, &blob)?;
    Ok(format!("{}&cred={}", config::LOGIN_PATH, hex::encode(cipher)))
}
