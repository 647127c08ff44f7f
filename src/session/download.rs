use super::*;

const HOSTNAME_TOKEN: &str = "hostname ";

impl SwitchSession {
    /// Downloads the running configuration.
    ///
    /// Must be called after [`SwitchSession::authenticate`]; the download
    /// endpoint relies on the login cookie.
    pub async fn download_running_config(&mut self) -> Result<String, SwitchError> {
        debug!(">> download running config {}", self.host);
        let prefix = self.discover_session_prefix().await?;
        let path = download_path(&prefix, config::RUNNING_CONFIG_ACTION);
        self.get_text(&path).await
    }

    /// Downloads the startup configuration, if the device delivers it.
    ///
    /// Many firmware releases abort or truncate this download. Timeouts,
    /// transport failures, non-OK answers and bodies of at most
    /// [`config::STARTUP_CONFIG_MIN_LEN`] characters all yield `Ok(None)`.
    /// Only a failed session prefix discovery is reported as an error.
    pub async fn download_startup_config(&mut self) -> Result<Option<String>, SwitchError> {
        debug!(">> download startup config {}", self.host);
        let prefix = self.discover_session_prefix().await?;
        let path = download_path(&prefix, config::STARTUP_CONFIG_ACTION);

        let response = match self.get(&path, Some(config::STARTUP_CONFIG_TIMEOUT)).await {
            Ok(response) => response,
            Err(err) => {
                warn!("{} startup config download failed: {}", self.host, err);
                return Ok(None);
            }
        };
        if !is_ok_status(&response) {
            warn!(
                "{} startup config not delivered: HTTP {}",
                self.host,
                response.status().as_u16()
            );
            return Ok(None);
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                warn!("{} startup config transfer aborted: {}", self.host, SwitchError::from(err));
                return Ok(None);
            }
        };
        let len = text.chars().count();
        if len <= config::STARTUP_CONFIG_MIN_LEN {
            warn!("{} startup config too short ({} chars), ignoring", self.host, len);
            return Ok(None);
        }
        Ok(Some(text))
    }

    /// Hostname configured in `running_config`, or the session host.
    pub fn extract_hostname(&self, running_config: &str) -> String {
        extract_hostname(running_config, &self.host)
    }
}

/// Returns the first `hostname` statement of a configuration.
///
/// Surrounding double quotes are stripped. When no line yields a non-empty
/// name, `fallback` is returned unchanged.
pub fn extract_hostname(config_text: &str, fallback: &str) -> String {
    let found = config_text
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix(HOSTNAME_TOKEN))
        .map(|name| name.trim().trim_matches('"').trim())
        .find(|name| !name.is_empty());

    match found {
        Some(name) => {
            info!("switch hostname found: {name}");
            name.to_string()
        }
        None => {
            warn!("no hostname in running config, using {fallback}");
            fallback.to_string()
        }
    }
}

fn download_path(prefix: &str, action: u8) -> String {
    let query = format!("action={action}&ssd={}", config::DOWNLOAD_SSD);
    if prefix.is_empty() {
        format!("{}?{query}", config::DOWNLOAD_PATH)
    } else {
        format!("{prefix}/{}?{query}", config::DOWNLOAD_PATH)
    }
}
