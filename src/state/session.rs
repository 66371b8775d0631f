/// Instagram login redirect handling
///
/// Only the redirect half of an authorization-code flow is implemented.
/// A `code` parameter on the launch URL is taken as a successful login;
/// the code is never exchanged for a token nor verified. Treat the
/// resulting flag as cosmetic, not as proof of identity.

use url::Url;

/// Storage key of the login flag inside the local store
pub const LOGIN_KEY: &str = "ig-loggedin";

const AUTHORIZE_ENDPOINT: &str = "https://api.instagram.com/oauth/authorize";
const SCOPE: &str = "user_profile";

/// Parameters of the outbound authorization request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginConfig {
    pub client_id: String,
    pub redirect_uri: String,
}

impl LoginConfig {
    /// The URL the user has to open to authorize the app
    pub fn authorize_url(&self) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            AUTHORIZE_ENDPOINT,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPE),
                ("response_type", "code"),
            ],
        )
    }
}

/// Where the authorization page ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginLaunch {
    /// Opened in the system browser
    Browser,
    /// The browser could not be started; the caller should hand the
    /// URL over another way
    Fallback(Url),
}

/// Build the authorization URL and try to open it with `open`
pub fn launch_login(
    config: &LoginConfig,
    open: impl FnOnce(&str) -> std::io::Result<()>,
) -> Result<LoginLaunch, url::ParseError> {
    let url = config.authorize_url()?;

    match open(url.as_str()) {
        Ok(()) => Ok(LoginLaunch::Browser),
        Err(e) => {
            tracing::warn!("⚠️  Could not open the browser: {e}");
            Ok(LoginLaunch::Fallback(url))
        }
    }
}

/// What was found on the launch URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Authorization code, if the URL carried one
    pub code: Option<String>,
    /// The URL to keep, with the query removed once a code was consumed
    pub location: Url,
}

/// Look for a `code` parameter; when one is found, strip the query
pub fn take_redirect(url: &Url) -> Redirect {
    let code = url
        .query_pairs()
        .find(|(key, value)| key == "code" && !value.is_empty())
        .map(|(_, value)| value.into_owned());

    let mut location = url.clone();
    if code.is_some() {
        location.set_query(None);
    }

    Redirect { code, location }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_parameters() {
        let config = LoginConfig {
            client_id: "778757358530314".into(),
            redirect_uri: "artvibe://oauth/callback".into(),
        };
        let url = config.authorize_url().unwrap();

        assert_eq!(url.host_str(), Some("api.instagram.com"));
        assert_eq!(url.path(), "/oauth/authorize");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("client_id".into(), "778757358530314".into()),
                ("redirect_uri".into(), "artvibe://oauth/callback".into()),
                ("scope".into(), "user_profile".into()),
                ("response_type".into(), "code".into()),
            ]
        );
        // The redirect URI is percent-encoded in the raw query
        assert!(url.as_str().contains("redirect_uri=artvibe%3A%2F%2Foauth%2Fcallback"));
    }

    #[test]
    fn test_launch_login_opens_authorize_url() {
        let config = LoginConfig {
            client_id: "42".into(),
            redirect_uri: "artvibe://oauth/callback".into(),
        };
        let mut opened = None;

        let launch = launch_login(&config, |url| {
            opened = Some(url.to_string());
            Ok(())
        })
        .unwrap();

        assert_eq!(launch, LoginLaunch::Browser);
        assert_eq!(opened, Some(config.authorize_url().unwrap().to_string()));
    }

    #[test]
    fn test_launch_login_falls_back_when_browser_fails() {
        let config = LoginConfig {
            client_id: "42".into(),
            redirect_uri: "artvibe://oauth/callback".into(),
        };

        let launch = launch_login(&config, |_| {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no browser"))
        })
        .unwrap();

        assert_eq!(launch, LoginLaunch::Fallback(config.authorize_url().unwrap()));
    }

    #[test]
    fn test_redirect_with_code() {
        let url = Url::parse("artvibe://oauth/callback?code=xyz&state=1").unwrap();
        let redirect = take_redirect(&url);

        assert_eq!(redirect.code.as_deref(), Some("xyz"));
        assert_eq!(redirect.location.query(), None);
        assert_eq!(redirect.location.as_str(), "artvibe://oauth/callback");
    }

    #[test]
    fn test_redirect_without_code() {
        let url = Url::parse("https://example.com/app?error=access_denied").unwrap();
        let redirect = take_redirect(&url);

        assert!(redirect.code.is_none());
        assert_eq!(redirect.location, url);
        assert_eq!(redirect.location.query(), Some("error=access_denied"));
    }

    #[test]
    fn test_empty_code_is_ignored() {
        let url = Url::parse("artvibe://oauth/callback?code=").unwrap();
        let redirect = take_redirect(&url);

        assert!(redirect.code.is_none());
        assert_eq!(redirect.location.query(), Some("code="));
    }
}
