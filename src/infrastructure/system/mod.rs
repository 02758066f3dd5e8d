//! Host control and network probing

use async_trait::async_trait;
use std::net::UdpSocket;

use crate::domain::traits::{Host, NetworkInfo};

/// The real machine
pub struct SystemHost {
    reboot_command: Vec<String>,
}

impl SystemHost {
    pub fn new() -> Self {
        Self {
            reboot_command: vec!["sudo".to_string(), "reboot".to_string()],
        }
    }

    pub fn with_reboot_command(mut self, command: Vec<String>) -> Self {
        self.reboot_command = command;
        self
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Host for SystemHost {
    async fn reboot(&self) {
        let Some((program, args)) = self.reboot_command.split_first() else {
            tracing::error!("No reboot command configured");
            return;
        };

        tracing::warn!("Rebooting host: {}", self.reboot_command.join(" "));
        match tokio::process::Command::new(program).args(args).status().await {
            Ok(status) if status.success() => {}
            Ok(status) => tracing::error!("Reboot command exited with {}", status),
            Err(e) => tracing::error!("Failed to run reboot command: {}", e),
        }
    }

    async fn exit(&self, code: i32) {
        tracing::info!("Exiting with code {}", code);
        std::process::exit(code);
    }
}

/// Finds the address of the interface used for outbound traffic
pub struct LocalNetwork;

impl NetworkInfo for LocalNetwork {
    fn local_address(&self) -> String {
        // Connecting a UDP socket sends nothing; it only selects a route.
        let probe = UdpSocket::bind("0.0.0.0:0")
            .and_then(|socket| socket.connect("10.255.255.255:1").map(|_| socket))
            .and_then(|socket| socket.local_addr());

        match probe {
            Ok(addr) if !addr.ip().is_unspecified() => addr.ip().to_string(),
            Ok(_) => "127.0.0.1".to_string(),
            Err(e) => {
                tracing::debug!("Local address probe failed: {}", e);
                "127.0.0.1".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::capture_logs;

    #[test]
    fn local_address_is_an_ip() {
        let address = LocalNetwork.local_address();
        assert!(address.parse::<std::net::IpAddr>().is_ok(), "{}", address);
    }

    #[tokio::test]
    async fn reboot_runs_configured_command() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("rebooted");
        let host = SystemHost::new().with_reboot_command(vec![
            "touch".to_string(),
            marker.display().to_string(),
        ]);

        host.reboot().await;

        assert!(marker.exists());
    }

    #[tokio::test]
    async fn failed_reboot_command_is_logged() {
        let host = SystemHost::new().with_reboot_command(vec!["false".to_string()]);
        let (logs, _guard) = capture_logs();

        host.reboot().await;

        assert!(logs.contents().contains("Reboot command exited with"));
    }
}
