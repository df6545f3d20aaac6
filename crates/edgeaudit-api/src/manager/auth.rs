// Manager session authentication
//
// Form-based `j_security_check` login sets a `JSESSIONID` cookie in the
// client's jar; the XSRF token is then fetched once and attached to every
// subsequent request.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::Error;
use crate::manager::client::{ManagerClient, looks_like_html};

impl ManagerClient {
    /// Authenticate with the manager using username/password.
    ///
    /// `POST /j_security_check` with form fields `j_username` / `j_password`.
    /// The manager replies HTTP 200 in both cases; a rejected login returns
    /// the HTML login page instead of an empty body.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.url("j_security_check")?;
        debug!("logging in at {}", url);

        let form = [
            ("j_username", username),
            ("j_password", password.expose_secret()),
        ];

        let resp = self
            .http()
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status})"),
            });
        }
        if looks_like_html(&body) {
            return Err(Error::Authentication {
                message: "manager rejected the supplied credentials".into(),
            });
        }

        self.fetch_xsrf_token().await?;
        debug!("login successful");
        Ok(())
    }

    /// Fetch the anti-CSRF token for this session.
    ///
    /// `GET /dataservice/client/token`. A 404 means the manager predates
    /// token enforcement and is not an error.
    async fn fetch_xsrf_token(&self) -> Result<(), Error> {
        let url = self.dataservice_url("client/token")?;
        let resp = self.http().get(url).send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("manager does not issue XSRF tokens");
            self.set_xsrf_token(None);
            return Ok(());
        }
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("XSRF token request failed (HTTP {status})"),
            });
        }

        let token = resp.text().await.map_err(Error::Transport)?;
        let token = token.trim();
        if token.is_empty() || looks_like_html(token) {
            return Err(Error::Authentication {
                message: "manager returned no XSRF token".into(),
            });
        }
        self.set_xsrf_token(Some(token.to_owned()));
        Ok(())
    }

    /// End the current session.
    ///
    /// `GET /logout?nocache=<n>` invalidates the session cookie server-side.
    pub async fn logout(&self) -> Result<(), Error> {
        let mut url = self.url("logout")?;
        let nocache = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        url.query_pairs_mut()
            .append_pair("nocache", &nocache.to_string());

        debug!("logging out at {}", url);

        let _resp = self
            .apply_xsrf(self.http().get(url))
            .send()
            .await
            .map_err(Error::Transport)?;

        self.set_xsrf_token(None);
        debug!("logout complete");
        Ok(())
    }
}
