use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

// Specific crates for PORT and PASV commands
use crate::core_network::pasv;
use crate::core_network::port;

use crate::core_ftpcommand::{
    cdup, cwd, dele, feat, list, mkd, noop, nlst, pass, pbsz, prot, pwd, quit, retr, rmd, rnfr, rnto,
    stor, syst, type_, user,
};

/// The body of one FTP verb.
///
/// An `Err` means the control connection itself failed; every other outcome is reported
/// to the client through `out`.
#[async_trait]
pub trait Command: Send + Sync {
    async fn execute(
        &self,
        ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()>;
}

pub type CommandRegistry = HashMap<FtpCommand, Arc<dyn Command>>;

pub fn initialize_command_handlers() -> CommandRegistry {
    let mut handlers: CommandRegistry = HashMap::new();

    handlers.insert(FtpCommand::USER, Arc::new(user::User));
    handlers.insert(FtpCommand::PASS, Arc::new(pass::Pass));
    handlers.insert(FtpCommand::QUIT, Arc::new(quit::Quit));
    handlers.insert(FtpCommand::NOOP, Arc::new(noop::Noop));
    handlers.insert(FtpCommand::SYST, Arc::new(syst::Syst));
    handlers.insert(FtpCommand::FEAT, Arc::new(feat::Feat));
    handlers.insert(FtpCommand::TYPE, Arc::new(type_::Type));
    handlers.insert(FtpCommand::PWD, Arc::new(pwd::Pwd));
    handlers.insert(FtpCommand::CWD, Arc::new(cwd::Cwd));
    handlers.insert(FtpCommand::CDUP, Arc::new(cdup::Cdup));
    handlers.insert(FtpCommand::DELE, Arc::new(dele::Dele));
    handlers.insert(FtpCommand::MKD, Arc::new(mkd::Mkd));
    handlers.insert(FtpCommand::RMD, Arc::new(rmd::Rmd));
    handlers.insert(FtpCommand::RNFR, Arc::new(rnfr::Rnfr));
    handlers.insert(FtpCommand::RNTO, Arc::new(rnto::Rnto));
    handlers.insert(FtpCommand::NLST, Arc::new(nlst::Nlst));
    handlers.insert(FtpCommand::LIST, Arc::new(list::List));
    handlers.insert(FtpCommand::RETR, Arc::new(retr::Retr));
    handlers.insert(FtpCommand::STOR, Arc::new(stor::Stor));
    handlers.insert(FtpCommand::PASV, Arc::new(pasv::Pasv));
    handlers.insert(FtpCommand::EPSV, Arc::new(pasv::Epsv));
    handlers.insert(FtpCommand::PORT, Arc::new(port::Port));
    handlers.insert(FtpCommand::PBSZ, Arc::new(pbsz::Pbsz));
    handlers.insert(FtpCommand::PROT, Arc::new(prot::Prot));

    handlers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_verb_is_registered() {
        let handlers = initialize_command_handlers();
        for verb in [
            "USER", "PASS", "QUIT", "NOOP", "SYST", "FEAT", "TYPE", "PWD", "CWD", "CDUP", "DELE",
            "MKD", "RMD", "RNFR", "RNTO", "NLST", "LIST", "RETR", "STOR", "PASV", "EPSV", "PORT",
            "PBSZ", "PROT",
        ] {
            let command = FtpCommand::from_verb(verb).unwrap();
            assert!(handlers.contains_key(&command), "{} not registered", verb);
        }
    }
}
