use std::time::Duration;

use ureq::{Agent, Proxy};

/// Settings for the HTTP agent used to talk to the package index.
///
/// The agent built from it is owned by whoever resolves labels; there is no
/// process-wide client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub user_agent: Option<String>,
    /// Explicit proxy. When unset the agent honours the usual proxy env vars.
    pub proxy: Option<Proxy>,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: Some(format!("depot/{}", env!("CARGO_PKG_VERSION"))),
            proxy: None,
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Builds an HTTP `Agent` configured from this `ClientConfig`.
    pub fn build(&self) -> Agent {
        let mut config = Agent::config_builder().timeout_global(self.timeout);

        if let Some(proxy) = &self.proxy {
            config = config.proxy(Some(proxy.clone()));
        }

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ClientConfig::default();
        assert!(cfg.user_agent.as_deref().is_some_and(|ua| ua.starts_with("depot/")));
        assert!(cfg.proxy.is_none());
        assert!(cfg.timeout.is_none());
    }
}
