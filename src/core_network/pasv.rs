use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use log::{debug, warn};
use std::io;
use std::net::{IpAddr, SocketAddr, SocketAddrV4};

/// Handles the PASV FTP command.
///
/// Reserves a passive port, starts listening on it and advertises it as
/// `h1,h2,h3,h4,p1,p2`. Fails with 425 when no port frees up in time.
pub struct Pasv;

/// Handles the EPSV FTP command. Like PASV, but only the port is advertised.
pub struct Epsv;

/// Formats the 227 reply text for `addr`.
pub fn format_pasv_reply(addr: SocketAddrV4) -> String {
    let [h1, h2, h3, h4] = addr.ip().octets();
    format!(
        "Entering Passive Mode ({},{},{},{},{},{}).",
        h1,
        h2,
        h3,
        h4,
        addr.port() >> 8,
        addr.port() & 0xff
    )
}

fn as_v4(addr: SocketAddr) -> Option<SocketAddrV4> {
    match addr.ip() {
        IpAddr::V4(ip) => Some(SocketAddrV4::new(ip, addr.port())),
        IpAddr::V6(ip) => ip
            .to_ipv4_mapped()
            .map(|ip| SocketAddrV4::new(ip, addr.port())),
    }
}

#[async_trait]
impl Command for Pasv {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        session: &mut Session,
        _request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let advertised = match session.data_connection.init_passive().await {
            Ok(addr) => addr,
            Err(e) => {
                warn!("PASV for {} failed: {}", session.peer_addr, e);
                let (code, text) = e.to_ftp_response();
                return out.send(code, text).await;
            }
        };

        match as_v4(advertised) {
            Some(addr) => {
                debug!("PASV response for {}: {}", session.peer_addr, addr);
                out.send(227, &format_pasv_reply(addr)).await
            }
            None => {
                warn!("PASV cannot advertise IPv6 address {}, use EPSV", advertised);
                session.data_connection.close();
                out.send(425, "Can't open data connection.").await
            }
        }
    }
}

#[async_trait]
impl Command for Epsv {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        session: &mut Session,
        _request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        match session.data_connection.init_passive().await {
            Ok(addr) => {
                out.send(
                    229,
                    &format!("Entering Extended Passive Mode (|||{}|)", addr.port()),
                )
                .await
            }
            Err(e) => {
                warn!("EPSV for {} failed: {}", session.peer_addr, e);
                let (code, text) = e.to_ftp_response();
                out.send(code, text).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_ftpcommand::test_support::Harness;
    use crate::core_network::data_config::DataConnectionSettings;
    use std::net::Ipv4Addr;

    fn free_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn test_format_pasv_reply() {
        let addr = SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 2), 2301);
        assert_eq!(
            format_pasv_reply(addr),
            "Entering Passive Mode (192,168,1,2,8,253)."
        );
    }

    #[tokio::test]
    async fn test_pasv_exhausted_pool_replies_425() {
        let port = free_port();
        let mut h = Harness::with_data_settings(DataConnectionSettings {
            passive_ports: port.to_string(),
            passive_port_wait_ms: 10,
            ..Default::default()
        })
        .await;
        let mut other = Harness::with_data_settings(DataConnectionSettings::default()).await;
        // Share the pool of the first harness.
        other.session.data_connection = crate::core_network::data_connection::DataConnection::new(
            std::sync::Arc::clone(&h.ctx.data_config),
            other.session.local_addr,
            other.session.peer_addr,
        );

        assert_eq!(h.run("PASV").await, vec![227]);
        assert_eq!(other.run("PASV").await, vec![425]);
        assert!(!other.session.data_connection.has_mode());

        assert_eq!(h.run("EPSV").await, vec![229]);
        assert_eq!(h.session.data_connection.passive_port(), Some(port));
    }

    #[tokio::test]
    async fn test_pasv_advertises_external_address() {
        let mut h = Harness::with_data_settings(DataConnectionSettings {
            passive_external_address: Some(IpAddr::from([203, 0, 113, 7])),
            ..Default::default()
        })
        .await;
        assert_eq!(h.run("PASV").await, vec![227]);
        assert!(h.session.data_connection.is_passive());
    }
}
