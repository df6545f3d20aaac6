// ── SSH command executor ──
//
// libssh2 via the `ssh2` crate. Everything here blocks; callers run it on
// the blocking pool.

use std::io::{self, Read};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};

use crate::config::SshCredentials;
use crate::executor::{CommandExecutor, CommandSession, ExecError};

/// libssh2 `LIBSSH2_ERROR_TIMEOUT`.
const LIBSSH2_ERROR_TIMEOUT: i32 = -9;

/// Answers every keyboard-interactive prompt with the password.
///
/// IOS-XE images configured for AAA often only offer this method.
struct PasswordPrompt<'a> {
    password: &'a str,
}

impl ssh2::KeyboardInteractivePrompt for PasswordPrompt<'_> {
    fn prompt<'b>(
        &mut self,
        _username: &str,
        _instructions: &str,
        prompts: &[ssh2::Prompt<'b>],
    ) -> Vec<String> {
        prompts.iter().map(|_| self.password.to_owned()).collect()
    }
}

/// Opens password-authenticated SSH sessions to routers.
#[derive(Debug, Clone)]
pub struct SshExecutor {
    username: String,
    password: SecretString,
    port: u16,
    timeout: Duration,
}

impl SshExecutor {
    pub fn new(credentials: &SshCredentials) -> Self {
        Self {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            port: credentials.port,
            timeout: credentials.command_timeout,
        }
    }

    fn connect_tcp(&self, host: &str) -> Result<TcpStream, ExecError> {
        let connect_err = |reason: String| ExecError::Connect {
            host: host.to_owned(),
            reason,
        };

        let addr = (host, self.port)
            .to_socket_addrs()
            .map_err(|e| connect_err(format!("cannot resolve address: {e}")))?
            .next()
            .ok_or_else(|| connect_err("no address resolved".into()))?;

        let tcp = TcpStream::connect_timeout(&addr, self.timeout).map_err(|e| {
            if e.kind() == io::ErrorKind::TimedOut {
                ExecError::Timeout {
                    operation: format!("TCP connect to {addr}"),
                }
            } else {
                connect_err(format!("TCP connection failed: {e}"))
            }
        })?;
        tcp.set_read_timeout(Some(self.timeout))?;
        tcp.set_write_timeout(Some(self.timeout))?;
        Ok(tcp)
    }
}

impl CommandExecutor for SshExecutor {
    type Session = SshSession;

    fn open(&self, host: &str) -> Result<SshSession, ExecError> {
        let tcp = self.connect_tcp(host)?;

        let mut session = ssh2::Session::new().map_err(|e| ExecError::Connect {
            host: host.to_owned(),
            reason: format!("cannot create SSH session: {e}"),
        })?;
        session.set_tcp_stream(tcp);
        session.set_timeout(u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX));
        session
            .handshake()
            .map_err(|e| ssh_error(e, || format!("SSH handshake with {host}"), |reason| {
                ExecError::Connect {
                    host: host.to_owned(),
                    reason: format!("SSH handshake failed: {reason}"),
                }
            }))?;

        let password = self.password.expose_secret();
        if session.userauth_password(&self.username, password).is_err()
            || !session.authenticated()
        {
            debug!(host, "password auth refused, trying keyboard-interactive");
            let mut prompt = PasswordPrompt { password };
            // Outcome is checked through `authenticated()` below.
            let _ = session.userauth_keyboard_interactive(&self.username, &mut prompt);
        }

        if !session.authenticated() {
            return Err(ExecError::Auth {
                host: host.to_owned(),
                username: self.username.clone(),
            });
        }

        debug!(host, "SSH session established");
        Ok(SshSession {
            host: host.to_owned(),
            session,
        })
    }
}

/// An authenticated libssh2 session. Each command runs on its own channel.
pub struct SshSession {
    host: String,
    session: ssh2::Session,
}

impl std::fmt::Debug for SshSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshSession").field("host", &self.host).finish_non_exhaustive()
    }
}

impl CommandSession for SshSession {
    fn run(&mut self, command: &str) -> Result<String, ExecError> {
        let command_err = |reason: String| ExecError::Command {
            command: command.to_owned(),
            reason,
        };
        let timeout_op = || format!("'{command}' on {}", self.host);

        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| ssh_error(e, timeout_op, |r| command_err(format!("cannot open channel: {r}"))))?;
        channel
            .exec(command)
            .map_err(|e| ssh_error(e, timeout_op, |r| command_err(format!("exec failed: {r}"))))?;

        let mut output = String::new();
        channel.read_to_string(&mut output).map_err(|e| match e.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ExecError::Timeout {
                operation: timeout_op(),
            },
            _ => command_err(format!("cannot read output: {e}")),
        })?;
        let _ = channel.wait_close();

        trace!(host = %self.host, command, bytes = output.len(), "command output");

        if let Some(line) = output.lines().find(|l| l.trim_start().starts_with("% Invalid input")) {
            return Err(command_err(line.trim().to_owned()));
        }
        Ok(output)
    }

    fn close(&mut self) {
        if let Err(e) = self.session.disconnect(None, "audit complete", None) {
            debug!(host = %self.host, error = %e, "SSH disconnect failed");
        }
    }
}

/// Map an `ssh2::Error`, splitting libssh2 timeouts out of the general case.
fn ssh_error(
    err: ssh2::Error,
    operation: impl FnOnce() -> String,
    other: impl FnOnce(String) -> ExecError,
) -> ExecError {
    if matches!(err.code(), ssh2::ErrorCode::Session(LIBSSH2_ERROR_TIMEOUT)) {
        ExecError::Timeout {
            operation: operation(),
        }
    } else {
        other(err.message().to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_port_is_a_connect_error() {
        // Port 1 on loopback is closed on any sane test host.
        let executor = SshExecutor::new(&SshCredentials {
            username: "admin".into(),
            password: SecretString::from("secret"),
            port: 1,
            command_timeout: Duration::from_secs(2),
        });
        let err = executor.open("127.0.0.1").err();
        assert!(matches!(
            err,
            Some(ExecError::Connect { .. } | ExecError::Timeout { .. })
        ));
    }

    #[test]
    fn keyboard_interactive_answers_every_prompt() {
        use ssh2::KeyboardInteractivePrompt;
        let mut prompt = PasswordPrompt { password: "pw" };
        let prompts = [
            ssh2::Prompt {
                text: "Password: ".into(),
                echo: false,
            },
            ssh2::Prompt {
                text: "Token: ".into(),
                echo: false,
            },
        ];
        assert_eq!(prompt.prompt("admin", "", &prompts), vec!["pw", "pw"]);
    }
}
