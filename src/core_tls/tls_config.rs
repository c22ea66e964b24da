use log::debug;
use std::fmt;
use std::io;
use tokio::net::TcpStream;
use tokio_rustls::server::TlsStream;
use tokio_rustls::TlsAcceptor;

/// Opaque SSL capability shared by every data connection of a listener.
#[derive(Clone)]
pub struct SslConfiguration {
    acceptor: TlsAcceptor,
}

impl SslConfiguration {
    pub fn new(acceptor: TlsAcceptor) -> Self {
        Self { acceptor }
    }

    /// Runs the server side of the TLS handshake on a freshly opened data socket.
    ///
    /// The server is the TLS server on the data channel in both active and passive
    /// mode.
    pub async fn accept(&self, stream: TcpStream) -> io::Result<TlsStream<TcpStream>> {
        let peer = stream.peer_addr().ok();
        let tls_stream = self.acceptor.accept(stream).await?;
        debug!("TLS handshake completed on data connection with {:?}", peer);
        Ok(tls_stream)
    }
}

impl fmt::Debug for SslConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SslConfiguration").finish_non_exhaustive()
    }
}
