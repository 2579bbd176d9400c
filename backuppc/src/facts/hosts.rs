// SPDX-License-Identifier: AGPL-3.0-or-later
//! `backuppc_hosts`: hosts registered in the BackupPC host registry

use std::path::Path;

use super::read_source;

/// Extract host names from registry contents.
///
/// Blank lines and `#` comments contribute nothing, wherever they appear.
/// The first remaining line is the header and is always dropped; every
/// line after it contributes its first whitespace-delimited token.
pub fn parse_hosts(contents: &str) -> Vec<String> {
    let mut records = contents
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|token| !token.starts_with('#'));

    // header
    records.next();

    records.map(str::to_string).collect()
}

/// Read the registry at `path`. `None` if it does not exist.
pub fn hosts_fact(path: &Path) -> Option<Vec<String>> {
    read_source(path).map(|contents| parse_hosts(&contents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_hosts_basic() {
        let hosts = parse_hosts("host ip\nalpha 10.0.0.1\nbeta 10.0.0.2\n");
        assert_eq!(hosts, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_parse_hosts_keeps_file_order() {
        let contents = "host dhcp user moreUsers\nzeta 0 backuppc\nalpha 0 backuppc\nmu 1 root\n";
        assert_eq!(parse_hosts(contents), vec!["zeta", "alpha", "mu"]);
    }

    #[test]
    fn test_parse_hosts_header_always_dropped() {
        // even when the first line looks like a record
        assert_eq!(parse_hosts("alpha 0 root\nbeta 0 root"), vec!["beta"]);
    }

    #[test]
    fn test_parse_hosts_skips_blank_lines() {
        let hosts = parse_hosts("host dhcp\n\nalpha 0\n   \nbeta\t1\n\n\n");
        assert_eq!(hosts, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_parse_hosts_skips_comments() {
        let contents = "host dhcp user\n# alpha is retired\nbeta 0 root\n#gamma 0 root\n";
        assert_eq!(parse_hosts(contents), vec!["beta"]);
    }

    #[test]
    fn test_parse_hosts_stock_file() {
        // the packaged file opens with a comment block before the header
        let contents = "#========\n# BackupPC hosts file\n#\n\nhost dhcp user moreUsers\nlocalhost 0 backuppc\n";
        assert_eq!(parse_hosts(contents), vec!["localhost"]);
        assert_eq!(
            parse_hosts("#====\n# comment\nhost dhcp user moreUsers\nlocalhost 0 backuppc\n"),
            vec!["localhost"]
        );
    }

    #[test]
    fn test_parse_hosts_comments_only() {
        assert!(parse_hosts("# nothing here\n#\n").is_empty());
    }

    #[test]
    fn test_parse_hosts_crlf() {
        assert_eq!(parse_hosts("host ip\r\nalpha 10.0.0.1\r\n"), vec!["alpha"]);
    }

    #[test]
    fn test_parse_hosts_header_only() {
        assert!(parse_hosts("host dhcp user moreUsers\n").is_empty());
        assert!(parse_hosts("").is_empty());
    }

    #[test]
    fn test_hosts_fact_missing_file() {
        let temp_dir = tempdir().unwrap();
        assert_eq!(hosts_fact(&temp_dir.path().join("hosts")), None);
    }

    #[test]
    fn test_hosts_fact_reads_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("hosts");
        fs::write(&path, "host dhcp user\nweb01 0 backuppc\ndb01 0 backuppc\n").unwrap();

        assert_eq!(
            hosts_fact(&path),
            Some(vec!["web01".to_string(), "db01".to_string()])
        );
    }

    #[test]
    fn test_hosts_fact_empty_file_is_present() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("hosts");
        fs::write(&path, "").unwrap();

        assert_eq!(hosts_fact(&path), Some(vec![]));
    }
}
