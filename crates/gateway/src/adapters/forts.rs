use luatrader_core::SecurityInfo;
use luatrader_core::instruments::forts_security_info;
use luatrader_ports::{Result, SecurityInformator, TraderError};

/// Security informator for Moscow Exchange futures (FORTS)
#[derive(Debug, Default, Clone)]
pub struct FortsSecurityInformator;

impl FortsSecurityInformator {
    pub fn new() -> Self {
        Self
    }
}

impl SecurityInformator for FortsSecurityInformator {
    fn get_security_info(&self, security_name: &str) -> Result<SecurityInfo> {
        forts_security_info(security_name)
            .ok_or_else(|| TraderError::NotFound(format!("security {}", security_name)))
    }
}
