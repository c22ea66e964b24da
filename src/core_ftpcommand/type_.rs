use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use crate::session::DataType;
use std::io;

/// Handles the TYPE FTP command.
///
/// ASCII (optionally with the non-print format), image and local byte size 8 are
/// accepted; EBCDIC and other formats are not implemented.
pub struct Type;

fn parse_type(argument: &str) -> Result<DataType, u16> {
    let mut parts = argument.split_whitespace();
    let type_code = parts.next().ok_or(501u16)?.to_ascii_uppercase();
    let parameter = parts.next().map(|p| p.to_ascii_uppercase());
    if parts.next().is_some() {
        return Err(501);
    }

    match (type_code.as_str(), parameter.as_deref()) {
        ("A", None) | ("A", Some("N")) => Ok(DataType::Ascii),
        ("A", Some("T")) | ("A", Some("C")) => Err(504),
        ("I", None) => Ok(DataType::Image),
        ("L", Some("8")) => Ok(DataType::Local(8)),
        ("L", Some(size)) if size.parse::<u8>().is_ok() => Err(504),
        ("E", _) => Err(504),
        _ => Err(501),
    }
}

#[async_trait]
impl Command for Type {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        match parse_type(request.argument().unwrap_or("")) {
            Ok(data_type) => {
                session.data_type = data_type;
                out.send(200, &format!("Type set to {}.", data_type.as_str()))
                    .await
            }
            Err(504) => out.send(504, "Command not implemented for that parameter.").await,
            Err(_) => out.send(501, "Syntax error in parameters or arguments.").await,
        }
    }
}
