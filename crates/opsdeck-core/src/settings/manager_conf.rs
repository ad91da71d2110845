// ── manager.conf renderer ──

use secrecy::ExposeSecret;

use super::{IvrSettings, SecretDisclosure};

pub const MANAGER_CONF_FILE_NAME: &str = "manager.conf";

/// Placeholder written in place of a secret.
pub const REDACTED: &str = "<redacted>";

const PERMISSIONS: &str =
    "system,call,log,verbose,command,agent,user,config,dtmf,reporting,cdr,dialplan";

/// Render the Asterisk Manager Interface configuration.
///
/// Identical settings always produce byte-identical output. The AMI secret
/// is redacted unless `disclosure` is [`SecretDisclosure::Reveal`].
pub fn export_manager_conf(settings: &IvrSettings, disclosure: SecretDisclosure) -> String {
    let ami = &settings.asterisk;
    let secret = match disclosure {
        SecretDisclosure::Redact => REDACTED,
        SecretDisclosure::Reveal => {
            tracing::warn!(user = %ami.username, "writing plaintext AMI secret");
            ami.secret.expose_secret()
        }
    };

    format!(
        "; Asterisk Manager Interface Configuration
[general]
enabled = yes
port = {port}
bindaddr = 0.0.0.0

[{user}]
secret = {secret}
deny = 0.0.0.0/0.0.0.0
permit = 127.0.0.1/255.255.255.0
read = {PERMISSIONS}
write = {PERMISSIONS}

; FastAGI Configuration
[{context}]
exten => _X.,1,AGI(agi://localhost:{agi_port}/ivr_handler.py)
exten => _X.,n,Hangup()
",
        port = ami.port,
        user = ami.username,
        context = ami.context,
        agi_port = settings.agi.port,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn settings() -> IvrSettings {
        let mut settings = IvrSettings::default();
        settings.asterisk.secret = SecretString::from("amp111");
        settings
    }

    #[test]
    fn default_export_snapshot() {
        let conf = export_manager_conf(&settings(), SecretDisclosure::default());
        insta::assert_snapshot!(conf, @r"
        ; Asterisk Manager Interface Configuration
        [general]
        enabled = yes
        port = 5038
        bindaddr = 0.0.0.0

        [admin]
        secret = <redacted>
        deny = 0.0.0.0/0.0.0.0
        permit = 127.0.0.1/255.255.255.0
        read = system,call,log,verbose,command,agent,user,config,dtmf,reporting,cdr,dialplan
        write = system,call,log,verbose,command,agent,user,config,dtmf,reporting,cdr,dialplan

        ; FastAGI Configuration
        [from-internal]
        exten => _X.,1,AGI(agi://localhost:4573/ivr_handler.py)
        exten => _X.,n,Hangup()
        ");
    }

    #[test]
    fn redacted_export_never_leaks_secret() {
        let conf = export_manager_conf(&settings(), SecretDisclosure::Redact);
        assert!(!conf.contains("amp111"));
    }

    #[test]
    fn reveal_writes_plaintext() {
        let conf = export_manager_conf(&settings(), SecretDisclosure::Reveal);
        assert!(conf.contains("\nsecret = amp111\n"));
    }

    #[test]
    fn export_is_idempotent() {
        let s = settings();
        assert_eq!(
            export_manager_conf(&s, SecretDisclosure::Redact),
            export_manager_conf(&s, SecretDisclosure::Redact)
        );
    }

    #[test]
    fn sections_follow_settings() {
        let mut s = settings();
        s.asterisk.username = "ivr".into();
        s.asterisk.context = "ivr-inbound".into();
        s.agi.port = 4600;
        let conf = export_manager_conf(&s, SecretDisclosure::Redact);
        assert!(conf.contains("\n[ivr]\n"));
        assert!(conf.contains("\n[ivr-inbound]\n"));
        assert!(conf.contains("agi://localhost:4600/ivr_handler.py"));
    }
}
