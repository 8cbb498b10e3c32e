use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::{AndroidSettings, LinkSettings, Sender};

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "verification-relay")]
#[command(about = "Sends email verification links with per-address rate limiting")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // SendGrid API key
    #[arg(long, env = "SENDGRID_API_KEY", hide_env_values = true)]
    pub sendgrid_api_key: String,

    // SendGrid API base url
    #[arg(long, env = "SENDGRID_URL", default_value = "https://api.sendgrid.com")]
    pub sendgrid_url: String,

    // Sender address for verification emails
    #[arg(long, env = "FROM_EMAIL")]
    pub from_email: String,

    // Sender display name
    #[arg(long, env = "FROM_NAME", default_value = "TibiBalance Team")]
    pub from_name: String,

    // Identity Toolkit (Firebase Auth) project id
    #[arg(long, env = "IDENTITY_PROJECT_ID")]
    pub identity_project_id: String,

    // Service account JSON key, tokens are minted and refreshed from it
    #[arg(
        long,
        env = "GOOGLE_APPLICATION_CREDENTIALS",
        required_unless_present = "identity_access_token"
    )]
    pub service_account_key: Option<PathBuf>,

    // Fixed access token instead of a key (emulators, externally managed tokens)
    #[arg(long, env = "IDENTITY_ACCESS_TOKEN", hide_env_values = true)]
    pub identity_access_token: Option<String>,

    // Identity Toolkit base url
    #[arg(long, env = "IDENTITY_URL", default_value = "https://identitytoolkit.googleapis.com")]
    pub identity_url: String,

    // Where the link sends the user after verification
    #[arg(long, env = "CONTINUE_URL", default_value = "https://tibibalance.page.link/confirmacion")]
    pub continue_url: String,

    #[arg(long, env = "ANDROID_PACKAGE_NAME", default_value = "com.tibibalance.android")]
    pub android_package_name: String,

    #[arg(long, env = "ANDROID_MINIMUM_VERSION", default_value = "1")]
    pub android_minimum_version: String,

    // Max verification requests per address per window
    #[arg(long, env = "MAX_ATTEMPTS", default_value_t = 5)]
    pub max_attempts: u32,

    // Attempt window in milliseconds, restarted on every admitted attempt
    #[arg(long, env = "ATTEMPT_WINDOW_MS", default_value_t = 60_000)]
    pub attempt_window_ms: u64,

    // How often stale attempt records are swept
    #[arg(long, env = "EVICTION_INTERVAL_SECS", default_value_t = 300)]
    pub eviction_interval_secs: u64,

    // Deadline for each provider call
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,
}

impl Args {
    pub fn attempt_window(&self) -> Duration {
        Duration::from_millis(self.attempt_window_ms)
    }

    pub fn eviction_interval(&self) -> Duration {
        // tokio intervals panic on zero
        Duration::from_secs(self.eviction_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn sender(&self) -> Sender {
        Sender {
            email: self.from_email.clone(),
            name: self.from_name.clone(),
        }
    }

    pub fn link_settings(&self) -> LinkSettings {
        LinkSettings {
            continue_url: self.continue_url.clone(),
            handle_code_in_app: true,
            android: Some(AndroidSettings {
                package_name: self.android_package_name.clone(),
                install_app: true,
                minimum_version: self.android_minimum_version.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 9] = [
        "verification-relay",
        "--sendgrid-api-key",
        "SG.key",
        "--from-email",
        "noreply@example.com",
        "--identity-project-id",
        "demo",
        "--identity-access-token",
        "token",
    ];

    #[test]
    fn service_account_key_can_replace_static_token() {
        let args = Args::try_parse_from([
            "verification-relay",
            "--sendgrid-api-key",
            "SG.key",
            "--from-email",
            "noreply@example.com",
            "--identity-project-id",
            "demo",
            "--service-account-key",
            "/etc/relay/key.json",
        ])
        .unwrap();

        assert_eq!(args.service_account_key, Some(PathBuf::from("/etc/relay/key.json")));
        assert_eq!(args.identity_access_token, None);
    }

    #[test]
    fn defaults_match_observed_behavior() {
        let args = Args::try_parse_from(REQUIRED).unwrap();

        assert_eq!(args.max_attempts, 5);
        assert_eq!(args.attempt_window(), Duration::from_secs(60));
        assert_eq!(args.sender().name, "TibiBalance Team");
        let link = args.link_settings();
        assert!(link.handle_code_in_app);
        assert_eq!(link.android.unwrap().package_name, "com.tibibalance.android");
    }

    #[test]
    fn overrides_are_applied() {
        let mut argv = REQUIRED.to_vec();
        argv.extend(["--max-attempts", "3", "--attempt-window-ms", "1800000"]);
        let args = Args::try_parse_from(argv).unwrap();

        assert_eq!(args.max_attempts, 3);
        assert_eq!(args.attempt_window(), Duration::from_secs(30 * 60));
    }

    #[test]
    fn eviction_interval_never_zero() {
        let mut argv = REQUIRED.to_vec();
        argv.extend(["--eviction-interval-secs", "0"]);
        let args = Args::try_parse_from(argv).unwrap();

        assert_eq!(args.eviction_interval(), Duration::from_secs(1));
    }
}
