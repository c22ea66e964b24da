use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::session::DataType;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Sends the reply an error maps to.
pub async fn send_error(out: &mut FtpWriter, err: &FtpError) -> io::Result<()> {
    let (code, text) = err.to_ftp_response();
    out.send(code, &text).await
}

/// Copies a local file to the client.
///
/// Read failures are local errors (551), write failures abort the transfer (426). In
/// ASCII mode bare line feeds go out as CRLF.
pub async fn send_to_client<R, W>(
    source: &mut R,
    client: &mut W,
    data_type: DataType,
    buffer_size: usize,
) -> Result<u64, FtpError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; buffer_size];
    let mut last_was_cr = false;
    let mut transferred = 0u64;

    loop {
        let n = source.read(&mut buffer).await.map_err(FtpError::LocalIo)?;
        if n == 0 {
            break;
        }
        let chunk = &buffer[..n];
        if data_type == DataType::Ascii {
            let converted = to_network_ascii(chunk, &mut last_was_cr);
            client
                .write_all(&converted)
                .await
                .map_err(FtpError::TransferAborted)?;
        } else {
            client.write_all(chunk).await.map_err(FtpError::TransferAborted)?;
        }
        transferred += n as u64;
    }

    client.flush().await.map_err(FtpError::TransferAborted)?;
    Ok(transferred)
}

/// Copies an upload from the client into a local file.
///
/// Read failures abort the transfer (426), write failures are local errors (551). In
/// ASCII mode CRLF is stored as a bare line feed.
pub async fn receive_from_client<R, W>(
    client: &mut R,
    sink: &mut W,
    data_type: DataType,
    buffer_size: usize,
) -> Result<u64, FtpError>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buffer = vec![0u8; buffer_size];
    let mut pending_cr = false;
    let mut transferred = 0u64;

    loop {
        let n = client
            .read(&mut buffer)
            .await
            .map_err(FtpError::TransferAborted)?;
        if n == 0 {
            break;
        }
        let chunk = &buffer[..n];
        if data_type == DataType::Ascii {
            let converted = from_network_ascii(chunk, &mut pending_cr);
            sink.write_all(&converted).await.map_err(FtpError::LocalIo)?;
        } else {
            sink.write_all(chunk).await.map_err(FtpError::LocalIo)?;
        }
        transferred += n as u64;
    }

    if pending_cr {
        sink.write_all(b"\r").await.map_err(FtpError::LocalIo)?;
    }
    sink.flush().await.map_err(FtpError::LocalIo)?;
    sink.shutdown().await.map_err(FtpError::LocalIo)?;
    Ok(transferred)
}

fn to_network_ascii(chunk: &[u8], last_was_cr: &mut bool) -> Vec<u8> {
    let mut converted = Vec::with_capacity(chunk.len() + chunk.len() / 16);
    for &byte in chunk {
        if byte == b'\n' && !*last_was_cr {
            converted.push(b'\r');
        }
        converted.push(byte);
        *last_was_cr = byte == b'\r';
    }
    converted
}

// A CR at the end of a chunk is held back until the next byte shows whether it starts
// a CRLF pair.
fn from_network_ascii(chunk: &[u8], pending_cr: &mut bool) -> Vec<u8> {
    let mut converted = Vec::with_capacity(chunk.len());
    for &byte in chunk {
        if *pending_cr {
            *pending_cr = false;
            if byte != b'\n' {
                converted.push(b'\r');
            }
        }
        if byte == b'\r' {
            *pending_cr = true;
        } else {
            converted.push(byte);
        }
    }
    converted
}
