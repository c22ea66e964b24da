pub mod data_config;
pub mod data_connection;
pub mod error;
pub mod network;
pub mod passive_ports;
pub mod pasv;
pub mod port;

pub use data_config::{DataConnectionConfig, DataConnectionSettings, PortReservation};
pub use data_connection::{DataChannel, DataConnection, DataStream};
pub use error::DataConnectionError;
pub use passive_ports::PassivePorts;
