use log::trace;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Writes replies on the control connection.
pub struct FtpWriter {
    writer: Box<dyn AsyncWrite + Send + Unpin>,
    #[cfg(test)]
    sent: Vec<u16>,
}

impl FtpWriter {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            writer: Box::new(writer),
            #[cfg(test)]
            sent: Vec::new(),
        }
    }

    /// Sends a single line reply `DDD text` and flushes it.
    pub async fn send(&mut self, code: u16, text: &str) -> io::Result<()> {
        let line = format!("{} {}\r\n", code, single_line(text));
        trace!("Reply: {}", line.trim_end());
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        self.record(code);
        Ok(())
    }

    /// Sends a multi-line reply: `DDD-first`, indented middle lines, `DDD last`.
    pub async fn send_multiline(&mut self, code: u16, lines: &[String]) -> io::Result<()> {
        let mut reply = String::new();
        match lines {
            [] => reply.push_str(&format!("{} \r\n", code)),
            [only] => reply.push_str(&format!("{} {}\r\n", code, single_line(only))),
            [first, middle @ .., last] => {
                reply.push_str(&format!("{}-{}\r\n", code, single_line(first)));
                for line in middle {
                    reply.push_str(&format!(" {}\r\n", single_line(line)));
                }
                reply.push_str(&format!("{} {}\r\n", code, single_line(last)));
            }
        }
        self.writer.write_all(reply.as_bytes()).await?;
        self.writer.flush().await?;
        self.record(code);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.writer.shutdown().await
    }
}

#[cfg(not(test))]
impl FtpWriter {
    fn record(&mut self, _code: u16) {}
}

/// Reply codes seen by tests, oldest first.
#[cfg(test)]
impl FtpWriter {
    fn record(&mut self, code: u16) {
        self.sent.push(code);
    }

    pub fn replies(&self) -> &[u16] {
        &self.sent
    }

    pub fn last_reply(&self) -> Option<u16> {
        self.sent.last().copied()
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

// CR/LF inside a reply text would let a file name inject extra reply lines.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
