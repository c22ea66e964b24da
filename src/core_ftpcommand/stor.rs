use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::utils::{receive_from_client, send_error};
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use log::{info, warn};
use std::io;

/// Handles the STOR (Store) FTP command. An existing file is overwritten.
pub struct Stor;

#[async_trait]
impl Command for Stor {
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

        // Check the target before opening the data connection
        let path = session.resolve(file_name);
        let file = match fs.file(&path).await {
            Ok(file) if !file.is_directory() && file.is_writable() => file,
            _ => return out.send(550, &format!("{}: Permission denied.", path)).await,
        };

        out.send(
            150,
            &format!(
                "Opening {} mode data connection for {}.",
                session.data_type.as_str(),
                path
            ),
        )
        .await?;

        // Open the data connection
        let mut channel = match session.data_connection.open().await {
            Ok(channel) => channel,
            Err(e) => {
                warn!("STOR {} from {}: {}", path, session.peer_addr, e);
                return send_error(out, &FtpError::from(e)).await;
            }
        };

        // Create or truncate the file
        let mut sink = match fs.open_write(&file).await {
            Ok(sink) => sink,
            Err(e) => {
                drop(channel);
                return send_error(out, &FtpError::LocalIo(e)).await;
            }
        };

        // Copy, then close the data connection before the final reply
        let buffer_size = ctx.config.server.upload_buffer_size();
        let result =
            receive_from_client(channel.stream(), &mut sink, session.data_type, buffer_size).await;
        drop(channel);

        match result {
            Ok(bytes) => {
                info!("File upload : {} - {} ({} bytes)", session.user_name(), path, bytes);
                ctx.statistics.set_upload(bytes);
                out.send(226, "Transfer complete.").await
            }
            Err(e) => {
                warn!("STOR {} failed: {}", path, e);
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
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_stor_ascii_upload() {
        let mut h = Harness::with_data_settings(DataConnectionSettings::default()).await;

        assert_eq!(h.run("PASV").await, vec![227]);
        let port = h.session.data_connection.passive_port().unwrap();
        let client = tokio::spawn(async move {
            let mut stream = TcpStream::connect(SocketAddr::from(([127, 0, 0, 1], port)))
                .await
                .unwrap();
            stream.write_all(b"one\r\ntwo\r\n").await.unwrap();
            stream.shutdown().await.unwrap();
        });

        assert_eq!(h.run("STOR up.txt").await, vec![150, 226]);
        client.await.unwrap();
        assert_eq!(std::fs::read_to_string(h.path("up.txt")).unwrap(), "one\ntwo\n");
        assert_eq!(h.ctx.statistics.snapshot().uploads, 1);
    }

    #[tokio::test]
    async fn test_stor_read_only() {
        let mut h = Harness::read_only().await;
        assert_eq!(h.run("STOR up.txt").await, vec![550]);
        assert!(!h.path("up.txt").exists());
    }
}
