#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    QUIT,
    PWD,
    LIST,
    NLST,
    CWD,
    CDUP,
    NOOP,
    MKD,
    RMD,
    DELE,
    RNFR,
    RNTO,
    RETR,
    STOR,
    PORT,
    PASV,
    EPSV,
    FEAT,
    SYST,
    TYPE,
    PBSZ,
    PROT,
}

impl FtpCommand {
    pub fn from_verb(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "QUIT" => Some(FtpCommand::QUIT),
            "PWD" | "XPWD" => Some(FtpCommand::PWD),
            "LIST" => Some(FtpCommand::LIST),
            "NLST" => Some(FtpCommand::NLST),
            "CWD" | "XCWD" => Some(FtpCommand::CWD),
            "CDUP" | "XCUP" => Some(FtpCommand::CDUP),
            "NOOP" => Some(FtpCommand::NOOP),
            "MKD" | "XMKD" => Some(FtpCommand::MKD),
            "RMD" | "XRMD" => Some(FtpCommand::RMD),
            "DELE" => Some(FtpCommand::DELE),
            "RNFR" => Some(FtpCommand::RNFR),
            "RNTO" => Some(FtpCommand::RNTO),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "PORT" => Some(FtpCommand::PORT),
            "PASV" => Some(FtpCommand::PASV),
            "EPSV" => Some(FtpCommand::EPSV),
            "FEAT" => Some(FtpCommand::FEAT),
            "SYST" => Some(FtpCommand::SYST),
            "TYPE" => Some(FtpCommand::TYPE),
            "PBSZ" => Some(FtpCommand::PBSZ),
            "PROT" => Some(FtpCommand::PROT),
            _ => None,
        }
    }

    /// Commands accepted before the client has logged in.
    pub fn allowed_before_login(&self) -> bool {
        matches!(
            self,
            FtpCommand::USER
                | FtpCommand::PASS
                | FtpCommand::QUIT
                | FtpCommand::NOOP
                | FtpCommand::SYST
                | FtpCommand::FEAT
                | FtpCommand::PBSZ
                | FtpCommand::PROT
        )
    }

    /// Commands that continue a multi-step sequence and therefore see the state left by
    /// the previous command.
    pub fn keeps_state(&self) -> bool {
        matches!(self, FtpCommand::RNTO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbs_are_case_insensitive() {
        assert_eq!(FtpCommand::from_verb("dele"), Some(FtpCommand::DELE));
        assert_eq!(FtpCommand::from_verb("NlSt"), Some(FtpCommand::NLST));
        assert_eq!(FtpCommand::from_verb("XMKD"), Some(FtpCommand::MKD));
        assert_eq!(FtpCommand::from_verb("SITE"), None);
    }

    #[test]
    fn test_only_rnto_keeps_state() {
        assert!(FtpCommand::RNTO.keeps_state());
        assert!(!FtpCommand::RNFR.keeps_state());
        assert!(!FtpCommand::DELE.keeps_state());
    }
}
