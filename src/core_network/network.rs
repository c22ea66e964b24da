use crate::core_ftpcommand::dispatch::{dispatch, SessionFlow};
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftplet::{Ftplet, FtpletResult};
use crate::core_network::data_connection::DataConnection;
use crate::server::FtpServerContext;
use crate::session::Session;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// Binds the configured control address and serves connections until Ctrl-C.
pub async fn start_server(ctx: Arc<FtpServerContext>) -> Result<()> {
    let address = format!(
        "{}:{}",
        ctx.config.server.listen_address, ctx.config.server.listen_port
    );
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind control address {}", address))?;
    info!("Server listening on {}", listener.local_addr()?);

    tokio::select! {
        result = serve(listener, ctx) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested.");
            Ok(())
        }
    }
}

/// Accepts control connections on `listener`, one task per connection.
pub async fn serve(listener: TcpListener, ctx: Arc<FtpServerContext>) -> Result<()> {
    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        info!("New connection from {}", addr);

        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, ctx).await {
                warn!("Connection error for {}: {:#}", addr, e);
            }
            info!("Connection closed for {}", addr);
        });
    }
}

/// Serves one control connection from greeting to close.
///
/// Whatever ends the session, the data connection is closed, the ftplets see
/// `on_disconnect` and the statistics are updated.
pub async fn handle_connection(socket: TcpStream, ctx: Arc<FtpServerContext>) -> Result<()> {
    let peer = socket.peer_addr()?;
    let local = socket.local_addr()?;
    let (reader, writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut out = FtpWriter::new(writer);

    let data_connection = DataConnection::new(Arc::clone(&ctx.data_config), local, peer);
    let mut session = Session::new(data_connection, local, peer);
    ctx.statistics.set_open_connection();

    let result = run_session(&ctx, &mut session, &mut reader, &mut out).await;

    session.data_connection.close();
    if let Err(e) = ctx.ftplets.on_disconnect(&mut session).await {
        warn!("Ftplet on_disconnect failed for {}: {}", peer, e);
    }
    if let Some(user) = session.logout() {
        info!("Logout - {} from {}", user.name, peer);
        ctx.statistics.set_logout(user.anonymous);
    }
    ctx.statistics.set_close_connection();
    if let Err(e) = out.shutdown().await {
        debug!("Control connection shutdown for {}: {}", peer, e);
    }

    result.with_context(|| format!("Session with {} failed", peer))
}

async fn run_session<R>(
    ctx: &FtpServerContext,
    session: &mut Session,
    reader: &mut R,
    out: &mut FtpWriter,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    match ctx.ftplets.on_connect(session).await? {
        FtpletResult::Disconnect => {
            info!("Ftplet refused connection from {}", session.peer_addr);
            return Ok(());
        }
        // The ftplet greeted the client itself.
        FtpletResult::Skip => {}
        FtpletResult::Continue => send_banner(&ctx.banner, out).await?,
    }

    let idle = Duration::from_secs(ctx.config.server.idle_timeout_secs);
    let max_length = ctx.config.server.max_command_length;
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = match timeout(idle, read_command_line(reader, &mut line, max_length)).await {
            Ok(read) => read?,
            Err(_) => {
                info!("Idle timeout for {}", session.peer_addr);
                out.send(421, "Idle timeout, closing control connection.")
                    .await?;
                return Ok(());
            }
        };
        if read == 0 {
            debug!("Client {} disconnected", session.peer_addr);
            return Ok(());
        }

        let text = String::from_utf8_lossy(&line);
        if dispatch(ctx, session, &text, out).await? == SessionFlow::Close {
            return Ok(());
        }
    }
}

async fn send_banner(banner: &str, out: &mut FtpWriter) -> io::Result<()> {
    let lines: Vec<String> = banner
        .lines()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    if lines.is_empty() {
        return out.send(220, "Service ready for new user.").await;
    }
    out.send_multiline(220, &lines).await
}

/// Reads one line of at most `max_length` bytes plus CRLF. The rest of an over-long
/// line is discarded, so the truncated line reaches the dispatcher as too long.
async fn read_command_line<R>(reader: &mut R, line: &mut Vec<u8>, max_length: usize) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let limit = max_length as u64 + 2;
    let read = (&mut *reader).take(limit).read_until(b'\n', line).await?;

    if read as u64 == limit && !line.ends_with(b"\n") {
        let mut rest = Vec::new();
        loop {
            rest.clear();
            let discarded = (&mut *reader).take(4096).read_until(b'\n', &mut rest).await?;
            if discarded == 0 || rest.ends_with(b"\n") {
                break;
            }
        }
    }
    Ok(read)
}
