//! Build script to inject version, git SHA and identity-client parameters at compile time.
//!
//! Environment variables (set by CI or fall back to defaults):
//! - FSH_VERSION: Version string (defaults to CARGO_PKG_VERSION)
//! - FSH_GIT_SHA: Git commit SHA (defaults to "unknown" or git rev-parse)
//! - FSH_AUTH_*: Federated identity parameters baked into the web bundle
//! - FSH_FEDERATED_PROVIDER: Identity provider name used for sign-in redirects
//! - FSH_SHOW_CONFIG_ERRORS: "true" to show an error alert when the config document fails to load

use std::process::Command;

/// Identity parameters passed through to the crate, with their defaults.
/// Empty defaults are rejected at runtime by `FederatedParams::validate`
/// and `BootstrapOptions::validate`.
const PASSTHROUGH: &[(&str, &str)] = &[
    ("FSH_AUTH_REGION", ""),
    ("FSH_AUTH_USER_POOL_ID", ""),
    ("FSH_AUTH_USER_POOL_WEB_CLIENT_ID", ""),
    ("FSH_AUTH_OAUTH_DOMAIN", ""),
    ("FSH_AUTH_OAUTH_SCOPE", "email openid profile"),
    ("FSH_AUTH_REDIRECT_SIGN_IN", ""),
    ("FSH_AUTH_REDIRECT_SIGN_OUT", ""),
    ("FSH_AUTH_RESPONSE_TYPE", "code"),
    ("FSH_FEDERATED_PROVIDER", ""),
    ("FSH_SHOW_CONFIG_ERRORS", "false"),
];

fn main() {
    // Version: prefer FSH_VERSION env var, fall back to CARGO_PKG_VERSION
    let version = std::env::var("FSH_VERSION").unwrap_or_else(|_| {
        std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".into())
    });
    println!("cargo:rustc-env=FSH_VERSION={}", version);

    // Git SHA: prefer FSH_GIT_SHA, then GITHUB_SHA, then try git command
    let git_sha = std::env::var("FSH_GIT_SHA")
        .or_else(|_| {
            std::env::var("GITHUB_SHA").map(|s| s.get(..7).unwrap_or(&s).to_string())
        })
        .unwrap_or_else(|_| get_git_sha());
    println!("cargo:rustc-env=FSH_GIT_SHA={}", git_sha);

    for (name, default) in PASSTHROUGH {
        let value = std::env::var(name).unwrap_or_else(|_| (*default).to_string());
        println!("cargo:rustc-env={}={}", name, value);
        println!("cargo:rerun-if-env-changed={}", name);
    }

    // Rebuild if these change
    println!("cargo:rerun-if-env-changed=FSH_VERSION");
    println!("cargo:rerun-if-env-changed=FSH_GIT_SHA");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");
}

fn get_git_sha() -> String {
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|o| {
            if o.status.success() {
                String::from_utf8(o.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| "unknown".into())
}
