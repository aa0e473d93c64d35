//! Running commands as a task's tenant.

/// Placeholder tenant with no OS account behind it.
pub const DEFAULT_TENANT: &str = "default";

/// Builds commands that run under a tenant's identity.
#[derive(Debug, Clone, Copy)]
pub struct TenantElevation {
    pub sudo_enabled: bool,
}

impl TenantElevation {
    /// Create a new TenantElevation.
    pub fn new(sudo_enabled: bool) -> Self {
        Self { sudo_enabled }
    }

    /// Wrap `command` in `sudo -u {tenant}` when the tenant is a real identity.
    pub fn wrap(&self, tenant: &str, command: &str) -> String {
        let tenant = tenant.trim();
        if !self.sudo_enabled || tenant.is_empty() || tenant == DEFAULT_TENANT {
            return command.to_string();
        }
        format!("sudo -u {tenant} {command}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        let sudo = TenantElevation::new(true);
        assert_eq!(sudo.wrap("etl", "kill -s SIGINT 1"), "sudo -u etl kill -s SIGINT 1");
        assert_eq!(sudo.wrap("", "ps -p 1"), "ps -p 1");
        assert_eq!(sudo.wrap("default", "ps -p 1"), "ps -p 1");

        let plain = TenantElevation::new(false);
        assert_eq!(plain.wrap("etl", "ps -p 1"), "ps -p 1");
    }
}
