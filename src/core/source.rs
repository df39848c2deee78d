// LogDeck - core/source.rs
//
// Per-source classification policies.
//
// Each log source (host system, reverse proxies) can contribute two
// capabilities to the classifier: a subdomain heuristic that moves
// per-virtual-host / per-domain logs into the synthetic `subdomain`
// category, and an admission check that can force a file into `unparsed`
// or drop it entirely. New sources are added here without touching the
// classifier core. Unknown sources get the no-op policy.

use crate::core::model::FileDescriptor;
use crate::core::rotation;
use crate::util::constants::{GENERIC_SYSTEM_TYPE, NON_SYSTEM_LOG_DENYLIST};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

/// What the classifier should do with a file before category assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Classify normally by declared type.
    Classify,
    /// Keep the file but file it under `unparsed` regardless of type.
    ForceUnparsed,
    /// Drop the file from the tree.
    Exclude,
}

/// Source-specific classification capability.
pub trait SourcePolicy: fmt::Debug + Send + Sync {
    /// Identity of the source this policy serves.
    fn source_id(&self) -> &str;

    /// True when `base_name` is a per-host/per-domain log that belongs in
    /// the `subdomain` category. Sources without a heuristic never match.
    fn is_subdomain_log(&self, _base_name: &str) -> bool {
        false
    }

    /// Admission check run before category assignment.
    fn admit(&self, _file: &FileDescriptor) -> Admission {
        Admission::Classify
    }
}

/// Build the policy for `source_id`.
///
/// `configured_paths` only affects the host source; when present it switches
/// that source into host-restricted mode.
pub fn policy_for(source_id: &str, configured_paths: Option<&[String]>) -> Box<dyn SourcePolicy> {
    match source_id.to_ascii_lowercase().as_str() {
        "system" | "host" => Box::new(HostPolicy::new(configured_paths)),
        "apache" | "apache2" | "httpd" => Box::new(ApachePolicy),
        "nginx" => Box::new(NginxPolicy),
        _ => {
            tracing::debug!(source = source_id, "No policy for source; heuristics disabled");
            Box::new(GenericPolicy {
                id: source_id.to_string(),
            })
        }
    }
}

// =============================================================================
// Generic (unknown) source
// =============================================================================

/// Policy for sources with no special handling.
#[derive(Debug)]
pub struct GenericPolicy {
    id: String,
}

impl SourcePolicy for GenericPolicy {
    fn source_id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Apache: hyphenated virtual-host segment
// =============================================================================

static APACHE_VHOST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:(?:access|error)-.+|.+-(?:access|error))$").expect("valid regex")
});

/// Apache names per-virtual-host logs `access-<vhost>` or `<vhost>-error`;
/// the shared default logs are plain `access` / `error`.
#[derive(Debug)]
pub struct ApachePolicy;

impl SourcePolicy for ApachePolicy {
    fn source_id(&self) -> &str {
        "apache"
    }

    fn is_subdomain_log(&self, base_name: &str) -> bool {
        APACHE_VHOST.is_match(base_name)
    }
}

// =============================================================================
// Nginx: multi-label domain between the log kind and the extension
// =============================================================================

static NGINX_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:access|error)\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)+$",
    )
    .expect("valid regex")
});

/// Nginx names per-domain logs `access.<domain>.log` / `error.<domain>.log`;
/// the shared logs are `access.log` / `error.log`.
#[derive(Debug)]
pub struct NginxPolicy;

impl SourcePolicy for NginxPolicy {
    fn source_id(&self) -> &str {
        "nginx"
    }

    fn is_subdomain_log(&self, base_name: &str) -> bool {
        NGINX_DOMAIN.is_match(base_name)
    }
}

// =============================================================================
// Host system: optional allow-list (host-restricted mode)
// =============================================================================

/// The host source. With an allow-list of configured paths it runs in
/// host-restricted mode: unconfigured files go to `unparsed`, and generic
/// system-type files named like application logs are dropped.
#[derive(Debug)]
pub struct HostPolicy {
    configured: Option<HashSet<String>>,
    denylist: Vec<glob::Pattern>,
}

impl HostPolicy {
    pub fn new(configured_paths: Option<&[String]>) -> Self {
        let denylist = NON_SYSTEM_LOG_DENYLIST
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(compiled) => Some(compiled),
                Err(e) => {
                    tracing::warn!(pattern = p, error = %e, "Invalid deny-list glob, skipping");
                    None
                }
            })
            .collect();
        Self {
            configured: configured_paths.map(|paths| paths.iter().cloned().collect()),
            denylist,
        }
    }

    /// True when the policy carries an allow-list.
    pub fn is_restricted(&self) -> bool {
        self.configured.is_some()
    }

    /// Exact path or its un-rotated base path is on the allow-list.
    /// Rotated siblings are covered only through the base-path fallback.
    fn is_configured(&self, configured: &HashSet<String>, path: &str) -> bool {
        configured.contains(path) || configured.contains(&rotation::base_path(path))
    }

    fn is_denied(&self, file_name: &str) -> bool {
        let options = glob::MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.denylist
            .iter()
            .any(|p| p.matches_with(file_name, options))
    }
}

impl SourcePolicy for HostPolicy {
    fn source_id(&self) -> &str {
        "system"
    }

    fn admit(&self, file: &FileDescriptor) -> Admission {
        let Some(configured) = &self.configured else {
            return Admission::Classify;
        };

        if file.file_type == GENERIC_SYSTEM_TYPE && self.is_denied(file.file_name()) {
            tracing::trace!(path = %file.path, "Excluded by non-system deny-list");
            return Admission::Exclude;
        }

        if self.is_configured(configured, &file.path) {
            Admission::Classify
        } else {
            Admission::ForceUnparsed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_source_has_no_heuristic() {
        let policy = policy_for("traefik", None);
        assert_eq!(policy.source_id(), "traefik");
        assert!(!policy.is_subdomain_log("access-shop"));
        assert!(!policy.is_subdomain_log("error.mysite.example.com"));
        let f = FileDescriptor::new("/x/access.log", "access", 1);
        assert_eq!(policy.admit(&f), Admission::Classify);
    }

    #[test]
    fn test_apache_hyphenated_vhost() {
        let policy = policy_for("apache", None);
        assert!(policy.is_subdomain_log("access-shop"));
        assert!(policy.is_subdomain_log("shop.example.com-error"));
        assert!(!policy.is_subdomain_log("access"));
        assert!(!policy.is_subdomain_log("error"));
        assert!(!policy.is_subdomain_log("error.mysite.example.com"));
    }

    #[test]
    fn test_nginx_multi_label_domain() {
        let policy = policy_for("NGINX", None);
        assert!(policy.is_subdomain_log("error.mysite.example.com"));
        assert!(policy.is_subdomain_log("access.example.org"));
        assert!(!policy.is_subdomain_log("access"));
        assert!(!policy.is_subdomain_log("access.example"), "single label");
        assert!(!policy.is_subdomain_log("access-shop"));
    }

    #[test]
    fn test_host_unrestricted_admits_everything() {
        let policy = policy_for("system", None);
        let f = FileDescriptor::new("/var/log/app.log", "system", 1);
        assert_eq!(policy.admit(&f), Admission::Classify);
    }

    #[test]
    fn test_host_restricted_allow_list_with_base_path_fallback() {
        let configured = vec!["/var/log/auth.log".to_string()];
        let policy = HostPolicy::new(Some(&configured));
        assert!(policy.is_restricted());

        let current = FileDescriptor::new("/var/log/auth.log", "auth", 1);
        let rotated = FileDescriptor::new("/var/log/auth.log.2.gz", "auth", 1);
        let other = FileDescriptor::new("/var/log/kern.log", "kernel", 1);
        assert_eq!(policy.admit(&current), Admission::Classify);
        assert_eq!(policy.admit(&rotated), Admission::Classify);
        assert_eq!(policy.admit(&other), Admission::ForceUnparsed);
    }

    #[test]
    fn test_host_restricted_deny_list_only_hits_generic_type() {
        let configured = vec!["/var/log/app.log".to_string()];
        let policy = HostPolicy::new(Some(&configured));

        let generic = FileDescriptor::new("/var/log/app.log", "system", 1);
        assert_eq!(policy.admit(&generic), Admission::Exclude);

        let db = FileDescriptor::new("/var/log/mysql/MySQL-slow.log", "system", 1);
        assert_eq!(policy.admit(&db), Admission::Exclude);

        let typed = FileDescriptor::new("/var/log/app.log", "custom", 1);
        assert_eq!(policy.admit(&typed), Admission::Classify);
    }
}
