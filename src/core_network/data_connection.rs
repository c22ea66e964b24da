use crate::core_network::data_config::{DataConnectionConfig, PortReservation};
use crate::core_network::error::DataConnectionError;
use log::{debug, info, warn};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::time::timeout;

/// Byte stream carrying one transfer, plain TCP or TLS.
pub trait DataTransport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> DataTransport for T {}

pub type DataStream = Box<dyn DataTransport>;

enum DataMode {
    Active(SocketAddr),
    Passive {
        listener: TcpListener,
        reservation: PortReservation,
    },
}

/// Data connection state of one control connection.
///
/// PORT/PASV prepare the connection, transfer commands open it through [`open`] and the
/// returned [`DataChannel`] closes it again when it goes out of scope.
///
/// [`open`]: DataConnection::open
pub struct DataConnection {
    config: Arc<DataConnectionConfig>,
    control_local: SocketAddr,
    control_peer: SocketAddr,
    mode: Option<DataMode>,
    secure: bool,
}

impl DataConnection {
    pub fn new(
        config: Arc<DataConnectionConfig>,
        control_local: SocketAddr,
        control_peer: SocketAddr,
    ) -> Self {
        Self {
            config,
            control_local,
            control_peer,
            mode: None,
            secure: false,
        }
    }

    pub fn config(&self) -> &Arc<DataConnectionConfig> {
        &self.config
    }

    /// PROT P selects a TLS protected data channel.
    pub fn set_secure(&mut self, secure: bool) {
        self.secure = secure;
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn has_mode(&self) -> bool {
        self.mode.is_some()
    }

    pub fn is_passive(&self) -> bool {
        matches!(self.mode, Some(DataMode::Passive { .. }))
    }

    /// Port the passive listener is bound to, if any.
    pub fn passive_port(&self) -> Option<u16> {
        match &self.mode {
            Some(DataMode::Passive { listener, .. }) => {
                listener.local_addr().ok().map(|addr| addr.port())
            }
            _ => None,
        }
    }

    /// Switches to active mode; the next transfer connects to `addr`.
    pub fn init_active(&mut self, addr: SocketAddr) -> Result<(), DataConnectionError> {
        self.close();

        if !self.config.is_active_enabled() {
            return Err(DataConnectionError::ActiveDisabled);
        }
        self.check_active_peer(addr.ip())?;

        debug!("Active data connection target set to {}", addr);
        self.mode = Some(DataMode::Active(addr));
        Ok(())
    }

    /// Switches to passive mode: reserves a port, starts listening on it and returns the
    /// address to advertise to the client.
    pub async fn init_passive(&mut self) -> Result<SocketAddr, DataConnectionError> {
        self.close();

        let reservation = self.config.acquire_passive_port().await?;
        let bind_ip = self
            .config
            .passive_address()
            .unwrap_or_else(|| self.control_local.ip());

        // On bind failure the reservation is dropped here and the port goes back.
        let listener = TcpListener::bind((bind_ip, reservation.port())).await?;
        let local = listener.local_addr()?;

        let advertised_ip = match self.config.passive_external_address() {
            Some(external) => external,
            None if local.ip().is_unspecified() => self.control_local.ip(),
            None => local.ip(),
        };
        let advertised = SocketAddr::new(advertised_ip, local.port());

        info!(
            "Passive data connection listening on {} (advertised as {})",
            local, advertised
        );
        self.mode = Some(DataMode::Passive {
            listener,
            reservation,
        });
        Ok(advertised)
    }

    fn check_active_peer(&self, ip: IpAddr) -> Result<(), DataConnectionError> {
        if self.config.is_active_ip_check() && ip != self.control_peer.ip() {
            warn!(
                "Rejected active data connection to {}, control peer is {}",
                ip,
                self.control_peer.ip()
            );
            return Err(DataConnectionError::IpCheckFailed {
                expected: self.control_peer.ip(),
                actual: ip,
            });
        }
        Ok(())
    }

    /// Materializes the data socket for the current mode, within the idle timeout.
    pub async fn establish(&mut self) -> Result<DataStream, DataConnectionError> {
        let idle = self.config.idle_time();

        let tcp = match &self.mode {
            None => return Err(DataConnectionError::NoDataMode),
            Some(DataMode::Active(addr)) => {
                let addr = *addr;
                if !self.config.is_active_enabled() {
                    return Err(DataConnectionError::ActiveDisabled);
                }
                self.check_active_peer(addr.ip())?;

                let socket = if addr.is_ipv4() {
                    TcpSocket::new_v4()?
                } else {
                    TcpSocket::new_v6()?
                };
                if let Some(local_ip) = self.config.active_local_address() {
                    socket.set_reuseaddr(true)?;
                    socket.bind(SocketAddr::new(local_ip, self.config.active_local_port()))?;
                }

                debug!("Connecting active data connection to {}", addr);
                timeout(idle, socket.connect(addr))
                    .await
                    .map_err(|_| DataConnectionError::Timeout(idle))??
            }
            Some(DataMode::Passive { listener, .. }) => {
                let (stream, peer) = timeout(idle, listener.accept())
                    .await
                    .map_err(|_| DataConnectionError::Timeout(idle))??;
                debug!("Accepted passive data connection from {}", peer);
                stream
            }
        };

        self.wrap(tcp, idle).await
    }

    async fn wrap(
        &self,
        tcp: TcpStream,
        idle: std::time::Duration,
    ) -> Result<DataStream, DataConnectionError> {
        if !(self.config.is_implicit_ssl() || self.secure) {
            return Ok(Box::new(tcp));
        }

        let ssl = self
            .config
            .ssl_configuration()
            .ok_or(DataConnectionError::SslNotConfigured)?;
        let tls = timeout(idle, ssl.accept(tcp))
            .await
            .map_err(|_| DataConnectionError::Timeout(idle))?
            .map_err(DataConnectionError::Tls)?;
        Ok(Box::new(tls))
    }

    /// Establishes the data socket and hands it out as a scoped channel.
    ///
    /// The connection is closed when the channel is dropped, and also when establishing
    /// fails.
    pub async fn open(&mut self) -> Result<DataChannel<'_>, DataConnectionError> {
        match self.establish().await {
            Ok(stream) => Ok(DataChannel {
                stream,
                connection: self,
            }),
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    /// Drops the listener, releases the passive port and forgets the mode.
    ///
    /// Calling it again, or without a prior PORT/PASV, does nothing.
    pub fn close(&mut self) {
        match self.mode.take() {
            Some(DataMode::Passive {
                listener,
                reservation,
            }) => {
                drop(listener);
                debug!("Closed passive data connection on port {}", reservation.port());
                reservation.release();
            }
            Some(DataMode::Active(addr)) => {
                debug!("Closed active data connection to {}", addr);
            }
            None => {}
        }
    }
}

/// An open data socket. Dropping it closes the owning [`DataConnection`].
pub struct DataChannel<'a> {
    stream: DataStream,
    connection: &'a mut DataConnection,
}

impl DataChannel<'_> {
    pub fn stream(&mut self) -> &mut DataStream {
        &mut self.stream
    }

    /// Shuts the stream down gracefully, then closes the connection.
    pub async fn finish(mut self) -> io::Result<()> {
        self.stream.shutdown().await
    }
}

impl Drop for DataChannel<'_> {
    fn drop(&mut self) {
        self.connection.close();
    }
}
