use crate::config::{Config, ServerConfig};
use crate::core_auth::User;
use crate::core_ftpcommand::dispatch::{dispatch, SessionFlow};
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftplet::FtpletChain;
use crate::core_network::data_config::DataConnectionSettings;
use crate::core_network::data_connection::DataConnection;
use crate::server::FtpServerContext;
use crate::session::Session;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// A logged-in session over a scratch directory, driven command by command.
pub struct Harness {
    pub ctx: FtpServerContext,
    pub session: Session,
    pub out: FtpWriter,
    pub dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        Self::build(DataConnectionSettings::default(), FtpletChain::new(), true, true).await
    }

    pub async fn new_logged_out() -> Self {
        Self::build(DataConnectionSettings::default(), FtpletChain::new(), true, false).await
    }

    pub async fn read_only() -> Self {
        Self::build(DataConnectionSettings::default(), FtpletChain::new(), false, true).await
    }

    pub async fn with_ftplets(ftplets: FtpletChain) -> Self {
        Self::build(DataConnectionSettings::default(), ftplets, true, true).await
    }

    pub async fn with_data_settings(mut settings: DataConnectionSettings) -> Self {
        if settings.passive_address.is_none() {
            settings.passive_address = Some(IpAddr::from([127, 0, 0, 1]));
        }
        Self::build(settings, FtpletChain::new(), true, true).await
    }

    pub async fn logged_out_with(server: ServerConfig) -> Self {
        let config = Config {
            server,
            ..Default::default()
        };
        Self::build_from(config, FtpletChain::new(), true, false).await
    }

    async fn build(
        data_connection: DataConnectionSettings,
        ftplets: FtpletChain,
        write: bool,
        logged_in: bool,
    ) -> Self {
        let config = Config {
            data_connection,
            ..Default::default()
        };
        Self::build_from(config, ftplets, write, logged_in).await
    }

    async fn build_from(
        mut config: Config,
        ftplets: FtpletChain,
        write: bool,
        logged_in: bool,
    ) -> Self {
        let dir = tempfile::tempdir().unwrap();
        config.server.chroot_dir = dir.path().to_string_lossy().to_string();

        let ctx = FtpServerContext::from_config(config, ftplets).unwrap();
        let local: SocketAddr = "127.0.0.1:21".parse().unwrap();
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();
        let connection = DataConnection::new(Arc::clone(&ctx.data_config), local, peer);
        let mut session = Session::new(connection, local, peer);

        if logged_in {
            let user = User {
                name: "tester".to_string(),
                home_dir: "/".to_string(),
                write_permission: write,
                anonymous: false,
            };
            let view = ctx.file_system.create_view(&user).await.unwrap();
            session.login(user, view);
        }

        Self {
            ctx,
            session,
            out: FtpWriter::new(tokio::io::sink()),
            dir,
        }
    }

    /// Runs one line; `out` holds only the replies to this line afterwards.
    pub async fn dispatch(&mut self, line: &str) -> SessionFlow {
        self.out.clear();
        dispatch(&self.ctx, &mut self.session, line, &mut self.out)
            .await
            .unwrap()
    }

    /// Runs one line and returns the reply codes it produced.
    pub async fn run(&mut self, line: &str) -> Vec<u16> {
        self.dispatch(line).await;
        self.out.replies().to_vec()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write_file(&self, name: &str, content: &str) {
        std::fs::write(self.path(name), content).unwrap();
    }

    pub fn make_dir(&self, name: &str) {
        std::fs::create_dir_all(self.path(name)).unwrap();
    }
}
