// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client that runs the vendor status script.
//!
//! The script takes `key=value` arguments:
//!
//! - `<script> ip=<address> status` prints the status JSON
//! - `<script> ip=<address> outputN=on|off|reboot user=<user> pass=<token>`
//!   performs an outlet command
//!
//! A non-zero exit status is a failure; its stderr is kept in the error.

use std::ffi::OsString;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use crate::command::OutletCommand;
use crate::config::Credentials;
use crate::error::ProtocolError;
use crate::protocol::{DeviceClient, StatusPayload};

/// Client that shells out to the status script.
///
/// The child process is killed if the call is dropped, so the engine's
/// timeout does not leave stray scripts behind.
///
/// ```no_run
/// use ups_bridge::protocol::{DeviceClient, ScriptClient};
///
/// # async fn example() -> Result<(), ups_bridge::error::ProtocolError> {
/// let client = ScriptClient::new("/opt/ups/apc-status.sh");
/// let status = client.query_status("192.168.1.20").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ScriptClient {
    program: PathBuf,
    leading_args: Vec<OsString>,
}

impl ScriptClient {
    /// Creates a client running `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Adds an argument passed before the device arguments, e.g. the script
    /// path when `program` is an interpreter.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    fn status_args(address: &str) -> Vec<String> {
        vec![format!("ip={address}"), "status".to_string()]
    }

    fn command_args(
        address: &str,
        command: OutletCommand,
        credentials: &Credentials,
    ) -> Result<Vec<String>, ProtocolError> {
        Ok(vec![
            format!("ip={address}"),
            command.argument(),
            format!("user={}", credentials.username()),
            format!("pass={}", credentials.encoded_password()?),
        ])
    }

    async fn run(&self, args: &[String]) -> Result<String, ProtocolError> {
        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ProtocolError::ScriptFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl DeviceClient for ScriptClient {
    async fn query_status(&self, address: &str) -> Result<StatusPayload, ProtocolError> {
        let args = Self::status_args(address);
        tracing::debug!(program = %self.program.display(), ?args, "Running status script");

        let stdout = self.run(&args).await?;
        tracing::debug!(stdout = %stdout.trim(), "Status script finished");
        Ok(StatusPayload::new(stdout))
    }

    async fn send_command(
        &self,
        address: &str,
        command: OutletCommand,
        credentials: &Credentials,
    ) -> Result<(), ProtocolError> {
        let args = Self::command_args(address, command, credentials)?;
        tracing::debug!(
            program = %self.program.display(),
            address,
            command = %command,
            "Running command script"
        );

        self.run(&args).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OutletIndex;

    #[test]
    fn status_arguments() {
        assert_eq!(
            ScriptClient::status_args("10.0.0.5"),
            vec!["ip=10.0.0.5", "status"]
        );
    }

    #[test]
    fn command_arguments_use_encoded_password() {
        let args = ScriptClient::command_args(
            "10.0.0.5",
            OutletCommand::switch(OutletIndex::new(1).unwrap(), true),
            &Credentials::new("apc", "apc"),
        )
        .unwrap();
        assert_eq!(
            args,
            vec!["ip=10.0.0.5", "output1=on", "user=apc", "pass=61-70-63"]
        );
    }

    #[cfg(unix)]
    fn fake_script(body: &str) -> ScriptClient {
        // `sh -c <body> <name> args...` puts the device arguments in $1, $2...
        ScriptClient::new("sh").arg("-c").arg(body).arg("apc-status")
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn status_is_read_from_stdout() {
        let client = fake_script(
            r#"[ "$1" = "ip=10.0.0.5" ] && [ "$2" = "status" ] && echo '{"upsstatus":"On Line"}'"#,
        );
        let payload = client.query_status("10.0.0.5").await.unwrap();
        assert_eq!(payload.body().trim(), r#"{"upsstatus":"On Line"}"#);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_script_failure() {
        let client = fake_script("echo 'login failed' >&2; exit 3");
        let err = client
            .send_command(
                "10.0.0.5",
                OutletCommand::reboot(OutletIndex::new(2).unwrap()),
                &Credentials::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ScriptFailed { code: Some(3), ref stderr } if stderr == "login failed"
        ));
    }

    #[tokio::test]
    async fn missing_program_is_io_error() {
        let client = ScriptClient::new("/nonexistent/apc-status");
        let err = client.query_status("10.0.0.5").await.unwrap_err();
        assert!(matches!(err, ProtocolError::Io(_)));
    }
}
