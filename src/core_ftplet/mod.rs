pub mod chain;
pub mod ftplet;

pub use chain::FtpletChain;
pub use ftplet::{Ftplet, FtpletResult};
