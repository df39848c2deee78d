// LogDeck - core/classify.rs
//
// Rotation classifier: turns a source's flat file listing into the
// category → base-name → rotation-family tree that drives file selection.
//
// Pipeline per file:
//   1. compression policy (hide compressed, or show gzip only)
//   2. readable partition (unreadable files are segregated, never grouped)
//   3. source admission (host-restricted allow-list / deny-list)
//   4. base-name extraction and category assignment
//   5. grouping and in-group ordering (current first, then rotation index)
//
// Pure and deterministic: identical input yields an identical tree.
// Duplicate paths are kept as-is.

use crate::core::model::{Category, CategoryTree, FileDescriptor, FileGroup};
use crate::core::rotation;
use crate::core::source::{self, Admission, SourcePolicy};
use crate::util::constants::{
    PARSED_CATEGORY_PRIORITY, PROMOTED_CATEGORIES, SUBDOMAIN_CATEGORY, UNPARSED_CATEGORY,
};
use std::collections::{BTreeMap, HashMap};

/// Display options for classification.
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    /// Show gzip-compressed archives (other formats are always hidden).
    pub include_compressed: bool,

    /// Identity of the source the listing came from.
    pub source_id: String,

    /// Host-restricted allow-list. Only honoured by the host source.
    pub configured_paths: Option<Vec<String>>,
}

impl ClassifyOptions {
    pub fn for_source(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            ..Default::default()
        }
    }
}

/// Classify `files` into a category tree using the policy of
/// `options.source_id`.
pub fn classify(files: &[FileDescriptor], options: &ClassifyOptions) -> CategoryTree {
    let policy = source::policy_for(&options.source_id, options.configured_paths.as_deref());
    classify_with_policy(files, options.include_compressed, policy.as_ref())
}

/// Classify with an explicit policy object.
pub fn classify_with_policy(
    files: &[FileDescriptor],
    include_compressed: bool,
    policy: &dyn SourcePolicy,
) -> CategoryTree {
    let mut unreadable: Vec<FileDescriptor> = Vec::new();
    let mut buckets: HashMap<String, BTreeMap<String, Vec<FileDescriptor>>> = HashMap::new();
    let mut hidden = 0usize;

    for file in files {
        let name = file.file_name();

        if !rotation::passes_compression_policy(name, include_compressed) {
            hidden += 1;
            continue;
        }

        if !file.readable {
            unreadable.push(file.clone());
            continue;
        }

        let admission = policy.admit(file);
        if admission == Admission::Exclude {
            hidden += 1;
            continue;
        }

        let base = rotation::base_name(name);
        let category = match admission {
            Admission::ForceUnparsed => UNPARSED_CATEGORY.to_string(),
            _ => category_for(file, &base, policy),
        };

        tracing::trace!(path = %file.path, base = %base, category = %category, "File classified");

        buckets
            .entry(category)
            .or_default()
            .entry(base)
            .or_default()
            .push(file.clone());
    }

    let categories: Vec<Category> = category_order(&buckets)
        .into_iter()
        .filter_map(|name| {
            buckets.remove(name).map(|groups| Category {
                name: name.to_string(),
                groups: groups
                    .into_iter()
                    .map(|(base, members)| build_group(base, name, members))
                    .collect(),
            })
        })
        .collect();

    let tree = CategoryTree {
        categories,
        unreadable,
    };

    tracing::debug!(
        source = policy.source_id(),
        input = files.len(),
        grouped = tree.file_count(),
        unreadable = tree.unreadable.len(),
        hidden,
        categories = ?tree.category_names(),
        "Classification complete"
    );

    tree
}

/// Category of an admitted file: its declared type when that type has a
/// parser (unless the source reclassifies it as a subdomain log), otherwise
/// `unparsed`.
fn category_for(file: &FileDescriptor, base_name: &str, policy: &dyn SourcePolicy) -> String {
    let declared = file.file_type.to_ascii_lowercase();
    if !PARSED_CATEGORY_PRIORITY.contains(&declared.as_str()) {
        return UNPARSED_CATEGORY.to_string();
    }
    if policy.is_subdomain_log(base_name) {
        return SUBDOMAIN_CATEGORY.to_string();
    }
    declared
}

/// Display order: parsed categories by priority (with `access`/`error`
/// promoted to the front when either is present), then `subdomain`, then
/// `unparsed`.
fn category_order<V>(present: &HashMap<String, V>) -> Vec<&'static str> {
    let promote = PROMOTED_CATEGORIES
        .iter()
        .any(|c| present.contains_key(*c));

    let mut order: Vec<&'static str> = Vec::with_capacity(PARSED_CATEGORY_PRIORITY.len() + 2);
    if promote {
        order.extend(PROMOTED_CATEGORIES.iter().copied());
        order.extend(
            PARSED_CATEGORY_PRIORITY
                .iter()
                .copied()
                .filter(|c| !PROMOTED_CATEGORIES.contains(c)),
        );
    } else {
        order.extend(PARSED_CATEGORY_PRIORITY.iter().copied());
    }
    order.push(SUBDOMAIN_CATEGORY);
    order.push(UNPARSED_CATEGORY);
    order
}

/// Order a family: the current file first, then ascending rotation index.
/// Date-suffixed archives count as rotations for ordering, so they follow
/// every numbered rotation. The sort is stable, so equal keys keep listing
/// order.
fn build_group(base_name: String, category: &str, mut files: Vec<FileDescriptor>) -> FileGroup {
    files.sort_by_key(|f| {
        let name = f.file_name();
        let archived = rotation::is_rotated(name) || rotation::has_date_suffix(name);
        (archived, rotation::rotation_index(name))
    });
    let is_rotated = files.iter().any(|f| rotation::is_rotated(f.file_name()));
    FileGroup {
        base_name,
        category: category.to_string(),
        files,
        is_rotated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, file_type: &str) -> FileDescriptor {
        FileDescriptor::new(path, file_type, 100)
    }

    fn names(group: &FileGroup) -> Vec<&str> {
        group.files.iter().map(|f| f.file_name()).collect()
    }

    #[test]
    fn test_empty_input_yields_empty_tree() {
        let tree = classify(&[], &ClassifyOptions::for_source("nginx"));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_rotation_family_grouped_current_first() {
        let files = vec![
            file("/var/log/nginx/access.log.2.gz", "access"),
            file("/var/log/nginx/access.log.1", "access"),
            file("/var/log/nginx/access.log", "access"),
        ];
        let options = ClassifyOptions {
            include_compressed: true,
            source_id: "nginx".to_string(),
            configured_paths: None,
        };
        let tree = classify(&files, &options);

        let access = tree.category("access").expect("access category");
        assert_eq!(access.groups.len(), 1);
        let group = &access.groups[0];
        assert_eq!(group.base_name, "access");
        assert!(group.is_rotated);
        assert_eq!(
            names(group),
            vec!["access.log", "access.log.1", "access.log.2.gz"]
        );
        assert_eq!(group.current().file_name(), "access.log");
    }

    #[test]
    fn test_compressed_hidden_by_default() {
        let files = vec![
            file("/l/access.log", "access"),
            file("/l/access.log.2.gz", "access"),
            file("/l/access.log.3.bz2", "access"),
        ];
        let tree = classify(&files, &ClassifyOptions::for_source("nginx"));
        assert_eq!(tree.file_count(), 1);

        let shown = classify(
            &files,
            &ClassifyOptions {
                include_compressed: true,
                ..ClassifyOptions::for_source("nginx")
            },
        );
        assert_eq!(shown.file_count(), 2, "bz2 is never shown");
    }

    #[test]
    fn test_nginx_domain_log_goes_to_subdomain() {
        let files = vec![
            file("/var/log/nginx/error.mysite.example.com.log", "error"),
            file("/var/log/nginx/error.log", "error"),
        ];
        let tree = classify(&files, &ClassifyOptions::for_source("nginx"));
        assert_eq!(tree.category_names(), vec!["error", "subdomain"]);
        let sub = tree.category("subdomain").unwrap();
        assert_eq!(sub.groups[0].base_name, "error.mysite.example.com");
        let error = tree.category("error").unwrap();
        assert_eq!(names(&error.groups[0]), vec!["error.log"]);
    }

    #[test]
    fn test_unknown_source_never_produces_subdomain() {
        let files = vec![file("/l/error.mysite.example.com.log", "error")];
        let tree = classify(&files, &ClassifyOptions::for_source("mystery"));
        assert_eq!(tree.category_names(), vec!["error"]);
    }

    #[test]
    fn test_unknown_type_is_unparsed_and_last() {
        let files = vec![
            file("/l/weird.log", "binary-blob"),
            file("/l/auth.log", "auth"),
            file("/l/kern.log", "kernel"),
        ];
        let tree = classify(&files, &ClassifyOptions::for_source("system"));
        assert_eq!(tree.category_names(), vec!["auth", "kernel", "unparsed"]);
    }

    #[test]
    fn test_access_error_promoted_and_subdomain_after_parsed() {
        let files = vec![
            file("/l/auth.log", "auth"),
            file("/l/other.log", "mystery"),
            file("/l/access-shop.log", "access"),
            file("/l/error.log", "error"),
        ];
        let tree = classify(&files, &ClassifyOptions::for_source("apache"));
        assert_eq!(
            tree.category_names(),
            vec!["error", "auth", "subdomain", "unparsed"]
        );
    }

    #[test]
    fn test_unreadable_segregated() {
        let mut locked = file("/var/log/secure", "auth");
        locked.readable = false;
        let files = vec![locked.clone(), file("/var/log/auth.log", "auth")];
        let tree = classify(&files, &ClassifyOptions::for_source("system"));
        assert_eq!(tree.unreadable, vec![locked]);
        assert_eq!(tree.file_count(), 1);
    }

    #[test]
    fn test_date_suffixed_siblings_follow_numbered_rotations() {
        let files = vec![
            file("/l/syslog-20240103", "syslog"),
            file("/l/syslog.1", "syslog"),
            file("/l/syslog-20240101", "syslog"),
            file("/l/syslog", "syslog"),
        ];
        let tree = classify(&files, &ClassifyOptions::for_source("system"));
        let group = &tree.category("syslog").unwrap().groups[0];
        assert_eq!(
            names(group),
            vec!["syslog", "syslog.1", "syslog-20240101", "syslog-20240103"]
        );
    }

    #[test]
    fn test_groups_ordered_by_base_name() {
        let files = vec![
            file("/l/mail.log", "custom"),
            file("/l/app.log", "custom"),
            file("/l/zeta.log", "custom"),
        ];
        let tree = classify(&files, &ClassifyOptions::for_source("system"));
        let bases: Vec<_> = tree.categories[0]
            .groups
            .iter()
            .map(|g| g.base_name.as_str())
            .collect();
        assert_eq!(bases, vec!["app", "mail", "zeta"]);
    }

    #[test]
    fn test_host_restricted_mode() {
        let files = vec![
            file("/var/log/auth.log", "auth"),
            file("/var/log/auth.log.1", "auth"),
            file("/var/log/kern.log", "kernel"),
            file("/var/log/app.log", "system"),
        ];
        let options = ClassifyOptions {
            include_compressed: false,
            source_id: "system".to_string(),
            configured_paths: Some(vec!["/var/log/auth.log".to_string()]),
        };
        let tree = classify(&files, &options);
        assert_eq!(tree.category_names(), vec!["auth", "unparsed"]);
        assert_eq!(tree.category("auth").unwrap().groups[0].files.len(), 2);
        let unparsed = tree.category("unparsed").unwrap();
        assert_eq!(unparsed.groups.len(), 1);
        assert_eq!(unparsed.groups[0].base_name, "kern");
    }

    #[test]
    fn test_duplicates_kept() {
        let files = vec![file("/l/auth.log", "auth"), file("/l/auth.log", "auth")];
        let tree = classify(&files, &ClassifyOptions::for_source("system"));
        assert_eq!(tree.file_count(), 2);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let files = vec![
            file("/l/access.log.1", "access"),
            file("/l/error.example.com.log", "error"),
            file("/l/access.log", "access"),
            file("/l/x.bin", "other"),
            file("/l/auth.log", "auth"),
        ];
        let options = ClassifyOptions::for_source("nginx");
        let first = classify(&files, &options);
        let second = classify(&files, &options);
        assert_eq!(first, second);
    }
}
