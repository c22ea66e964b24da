use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use crate::core_network::error::DataConnectionError;
use log::{debug, warn};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};

/// Handles the PORT (Active Mode) FTP command.
///
/// The argument `h1,h2,h3,h4,p1,p2` names the address the server connects to for the
/// next transfer.
pub struct Port;

/// Parses the PORT argument into a socket address.
pub fn parse_port_argument(argument: &str) -> Option<SocketAddr> {
    let parts: Vec<u8> = argument
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() != 6 {
        return None;
    }
    let ip = Ipv4Addr::new(parts[0], parts[1], parts[2], parts[3]);
    let port = (u16::from(parts[4]) << 8) | u16::from(parts[5]);
    if port == 0 {
        return None;
    }
    Some(SocketAddr::from((ip, port)))
}

#[async_trait]
impl Command for Port {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let Some(addr) = request.argument().and_then(parse_port_argument) else {
            return out.send(501, "Syntax error in parameters or arguments.").await;
        };

        match session.data_connection.init_active(addr) {
            Ok(()) => {
                debug!("PORT {} accepted for {}", addr, session.peer_addr);
                out.send(200, "Command PORT okay.").await
            }
            Err(DataConnectionError::ActiveDisabled) => {
                out.send(500, "PORT command disabled.").await
            }
            Err(e) => {
                warn!("PORT {} refused for {}: {}", addr, session.peer_addr, e);
                out.send(501, "Syntax error in IP address.").await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_ftpcommand::test_support::Harness;
    use crate::core_network::data_config::DataConnectionSettings;

    #[test]
    fn test_parse_port_argument() {
        assert_eq!(
            parse_port_argument("127,0,0,1,8,253"),
            Some("127.0.0.1:2301".parse().unwrap())
        );
        assert_eq!(parse_port_argument("127,0,0,1,8"), None);
        assert_eq!(parse_port_argument("127,0,0,1,8,256"), None);
        assert_eq!(parse_port_argument("a,b,c,d,e,f"), None);
        assert_eq!(parse_port_argument("127,0,0,1,0,0"), None);
    }

    #[tokio::test]
    async fn test_port_replies() {
        let mut h = Harness::new().await;
        assert_eq!(h.run("PORT").await, vec![501]);
        assert_eq!(h.run("PORT 127,0,0,1,8,253").await, vec![200]);
        assert!(h.session.data_connection.has_mode());
    }

    #[tokio::test]
    async fn test_port_disabled_and_ip_check() {
        let mut h = Harness::with_data_settings(DataConnectionSettings {
            active_enabled: false,
            ..Default::default()
        })
        .await;
        assert_eq!(h.run("PORT 127,0,0,1,8,253").await, vec![500]);

        let mut h = Harness::with_data_settings(DataConnectionSettings {
            active_ip_check: true,
            ..Default::default()
        })
        .await;
        assert_eq!(h.run("PORT 10,0,0,9,8,253").await, vec![501]);
        assert_eq!(h.run("PORT 127,0,0,1,8,253").await, vec![200]);
    }
}
