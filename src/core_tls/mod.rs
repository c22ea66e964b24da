// SSL/TLS support for data connections.
// Certificates are loaded by the embedding application; the server only consumes a
// ready-made acceptor.

pub mod tls_config;

pub use tls_config::SslConfiguration;
