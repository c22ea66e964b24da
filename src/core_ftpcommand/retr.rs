use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::utils::{send_error, send_to_client};
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use log::{info, warn};
use std::io;

/// Handles the RETR (Retrieve) FTP command.
///
/// The file is checked before the data connection is opened; the connection is closed
/// again before the final reply.
pub struct Retr;

#[async_trait]
impl Command for Retr {
    async fn execute(
        &self,
        ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let Some(file_name) = request.argument() else {
            return out.send(501, "Syntax error in parameters or arguments.").await;
        };
        let Some(fs) = session.file_system.as_deref() else {
            return out.send(530, "Not logged in.").await;
        };

        // Check the file before opening the data connection
        let path = session.resolve(file_name);
        let file = match fs.file(&path).await {
            Ok(file) if file.is_file() && file.is_readable() => file,
            _ => return out.send(550, &format!("{}: Not a readable file.", path)).await,
        };

        let mut source = match fs.open_read(&file).await {
            Ok(source) => source,
            Err(e) => {
                warn!("RETR {}: {}", path, e);
                return out.send(550, &format!("{}: Not a readable file.", path)).await;
            }
        };

        out.send(
            150,
            &format!(
                "Opening {} mode data connection for {} ({} bytes).",
                session.data_type.as_str(),
                path,
                file.size()
            ),
        )
        .await?;

        // Open the data connection
        let mut channel = match session.data_connection.open().await {
            Ok(channel) => channel,
            Err(e) => {
                warn!("RETR {} from {}: {}", path, session.peer_addr, e);
                return send_error(out, &FtpError::from(e)).await;
            }
        };

        // Send the file and close the data connection gracefully
        let buffer_size = ctx.config.server.download_buffer_size();
        let copied =
            send_to_client(&mut source, channel.stream(), session.data_type, buffer_size).await;
        let result = match copied {
            Ok(bytes) => channel
                .finish()
                .await
                .map(|()| bytes)
                .map_err(FtpError::TransferAborted),
            Err(e) => {
                drop(channel);
                Err(e)
            }
        };

        // Report the outcome
        match result {
            Ok(bytes) => {
                info!("File download : {} - {} ({} bytes)", session.user_name(), path, bytes);
                ctx.statistics.set_download(bytes);
                out.send(226, "Transfer complete.").await
            }
            Err(e) => {
                warn!("RETR {} failed: {}", path, e);
                send_error(out, &e).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core_ftpcommand::test_support::Harness;
    use crate::core_network::data_config::DataConnectionSettings;
    use std::net::SocketAddr;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_retr_binary() {
        let mut h = Harness::with_data_settings(DataConnectionSettings::default()).await;
        h.write_file("a.txt", "one\ntwo\n");

        assert_eq!(h.run("TYPE I").await, vec![200]);
        assert_eq!(h.run("PASV").await, vec![227]);
        let port = h.session.data_connection.passive_port().unwrap();
        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(SocketAddr::from(([127, 0, 0, 1], port)))
                .await
                .unwrap();
            let mut data = Vec::new();
            stream.read_to_end(&mut data).await.unwrap();
            data
        });

        assert_eq!(h.run("RETR a.txt").await, vec![150, 226]);
        assert_eq!(client.await.unwrap(), b"one\ntwo\n");
        assert_eq!(h.ctx.statistics.snapshot().bytes_downloaded, 8);
        assert!(!h.session.data_connection.has_mode());
    }

    #[tokio::test]
    async fn test_retr_checks_file_before_data_connection() {
        let mut h = Harness::new().await;
        h.make_dir("sub");
        assert_eq!(h.run("RETR").await, vec![501]);
        assert_eq!(h.run("RETR missing").await, vec![550]);
        assert_eq!(h.run("RETR sub").await, vec![550]);
    }

    #[tokio::test]
    async fn test_retr_without_data_connection() {
        let mut h = Harness::new().await;
        h.write_file("a.txt", "x");
        assert_eq!(h.run("RETR a.txt").await, vec![150, 425]);
        assert_eq!(h.ctx.statistics.snapshot().downloads, 0);
    }
}
