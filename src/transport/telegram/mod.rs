mod api;
mod listen;

#[cfg(test)]
mod tests;

pub use listen::parse_update;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram transport — long-polls the Bot API for updates and sends
/// messages, edits, and forwards on behalf of the survey core.
pub struct TelegramTransport {
    bot_token: String,
    allowed_users: Vec<String>,
    api_base: String,
    client: reqwest::Client,
}

impl TelegramTransport {
    pub fn new(bot_token: String, allowed_users: Vec<String>) -> Self {
        Self::with_api_base(bot_token, allowed_users, TELEGRAM_API_BASE.into())
    }

    /// Point the transport at a different API host (mock servers in tests).
    pub fn with_api_base(bot_token: String, allowed_users: Vec<String>, api_base: String) -> Self {
        Self {
            bot_token,
            allowed_users,
            api_base,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    /// Exact-match allowlist with a `*` wildcard. An empty list denies all.
    fn is_user_allowed(&self, identity: &str) -> bool {
        !identity.is_empty()
            && self
                .allowed_users
                .iter()
                .any(|allowed| allowed == "*" || allowed == identity)
    }

    fn is_any_user_allowed<'a, I>(&self, identities: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        identities.into_iter().any(|id| self.is_user_allowed(id))
    }

    pub async fn health_check(&self) -> bool {
        self.client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }
}
