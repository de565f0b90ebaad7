use serde::Deserialize;

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const USER_API_URL: &str = "https://api.github.com/user";

/// GitHub profile fields we persist.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubProfile {
    pub id: i64,
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error_description: Option<String>,
}

/// OAuth client for the GitHub authorization-code flow (RFC 6749 §4.1).
pub struct GithubOAuth {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
}

impl GithubOAuth {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .user_agent("formerr")
                .build()
                .expect("Failed to build reqwest client"),
            client_id,
            client_secret,
        }
    }

    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        let redirect: String = form_urlencoded::byte_serialize(redirect_uri.as_bytes()).collect();
        format!(
            "{AUTHORIZE_URL}?client_id={}&redirect_uri={redirect}&scope=read:user%20user:email&state={state}",
            self.client_id,
        )
    }

    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<String, String> {
        let resp = self
            .client
            .post(TOKEN_URL)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| format!("Token exchange request failed: {e}"))?;

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| format!("Invalid token response: {e}"))?;

        token.access_token.ok_or_else(|| {
            token
                .error_description
                .unwrap_or_else(|| "GitHub did not return an access token".to_string())
        })
    }

    pub async fn fetch_profile(&self, access_token: &str) -> Result<GithubProfile, String> {
        let resp = self
            .client
            .get(USER_API_URL)
            .bearer_auth(access_token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| format!("Profile request failed: {e}"))?;

        if !resp.status().is_success() {
            return Err(format!("GitHub profile request returned {}", resp.status()));
        }

        resp.json()
            .await
            .map_err(|e| format!("Invalid profile response: {e}"))
    }
}

/// Random state parameter for CSRF protection of the OAuth flow.
pub fn generate_state() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_escapes_redirect() {
        let oauth = GithubOAuth::new("id".to_string(), "secret".to_string());
        let url = oauth.authorize_url("http://localhost:3000/auth/github/callback", "abc");
        assert!(url.contains("client_id=id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fgithub%2Fcallback"));
        assert!(url.contains("state=abc"));
    }
}
