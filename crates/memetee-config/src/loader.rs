use std::path::Path;

use crate::{Config, MemeProviderType};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded = crate::env::expand_env(&raw)
            .map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded)
            .map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error when rate-limit windows or timeouts do not parse,
    /// a provider lacks its credential, or the contact transport is
    /// missing required addressing.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_rate_limits()?;
        self.validate_memegen()?;
        self.validate_contact()?;
        Ok(())
    }

    fn validate_rate_limits(&self) -> anyhow::Result<()> {
        let rl = &self.server.rate_limit;
        for (scope, limit) in [("meme", &rl.meme), ("mockup", &rl.mockup), ("contact", &rl.contact)]
        {
            limit
                .window_duration()
                .map_err(|e| anyhow::anyhow!("rate_limit.{scope}: {e}"))?;
            if limit.requests == 0 {
                anyhow::bail!("rate_limit.{scope}: requests must be > 0");
            }
        }
        Ok(())
    }

    fn validate_memegen(&self) -> anyhow::Result<()> {
        self.memegen.options.request_timeout_duration()?;

        for (name, provider) in &self.memegen.providers {
            if provider.api_key.is_none() {
                anyhow::bail!("memegen provider '{name}' is missing an api_key");
            }
            if provider.model.is_some() && provider.provider_type == MemeProviderType::Openai {
                anyhow::bail!(
                    "memegen provider '{name}': model overrides only apply to replicate providers"
                );
            }
        }
        Ok(())
    }

    fn validate_contact(&self) -> anyhow::Result<()> {
        let Some(ref transport) = self.contact.transport else {
            return Ok(());
        };

        // Gmail can default the from/admin addresses to the account user;
        // the other transports have no such anchor.
        if !matches!(transport, crate::EmailTransportConfig::Gmail { .. }) {
            if self.contact.from_email.is_none() {
                anyhow::bail!(
                    "contact.from_email is required for the {} transport",
                    transport.kind()
                );
            }
            if self.contact.admin_email.is_none() {
                anyhow::bail!(
                    "contact.admin_email is required for the {} transport",
                    transport.kind()
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn load_str(toml: &str) -> anyhow::Result<Config> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml.as_bytes()).unwrap();
        Config::load(file.path())
    }

    #[test]
    fn empty_config_is_valid() {
        let config = load_str("").unwrap();
        assert!(config.memegen.providers.is_empty());
        assert!(config.contact.transport.is_none());
        assert!(config.server.health.enabled);
    }

    #[test]
    fn provider_requires_api_key() {
        let err = load_str(
            r#"
            [memegen.providers.openai]
            type = "openai"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("api_key"));
    }

    #[test]
    fn env_placeholder_is_expanded_into_secret() {
        temp_env::with_var("MEMETEE_TEST_OPENAI_KEY", Some("sk-test"), || {
            let config = load_str(
                r#"
                [memegen.providers.openai]
                type = "openai"
                api_key = "{{ env.MEMETEE_TEST_OPENAI_KEY }}"
                "#,
            )
            .unwrap();
            assert!(
                config
                    .memegen
                    .provider_of_type(MemeProviderType::Openai)
                    .is_some()
            );
        });
    }

    #[test]
    fn bad_rate_limit_window_is_rejected() {
        let err = load_str(
            r#"
            [server.rate_limit.meme]
            requests = 3
            window = "sometimes"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("rate_limit.meme"));
    }

    #[test]
    fn non_gmail_transport_requires_from_address() {
        let err = load_str(
            r#"
            [contact.transport]
            type = "sendgrid"
            api_key = "SG.test"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("from_email"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(load_str("[server]\nbanana = 1").is_err());
    }
}
