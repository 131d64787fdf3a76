//! Hosts-file reading and writing. One record per non-empty line,
//! `<ipv4-text> <domain>`: everything before the first space is the address,
//! everything after the last space is the domain.

use ember_dns_domain::HostsFileError;
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Loads `(domain, address)` pairs. A line without a separator is fatal.
pub fn load_records(path: &Path) -> Result<Vec<(String, String)>, HostsFileError> {
    let content = fs::read_to_string(path).map_err(|source| HostsFileError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let Some(first_space) = line.find(' ') else {
            return Err(HostsFileError::MissingSeparator { line: index + 1 });
        };
        let last_space = line.rfind(' ').unwrap_or(first_space);
        let address = &line[..first_space];
        let domain = &line[last_space + 1..];
        records.push((domain.to_string(), address.to_string()));
    }
    Ok(records)
}

/// Creates an empty hosts file; used when the cache must persist on
/// shutdown and the file does not exist yet.
pub fn create_file(path: &Path) -> Result<(), HostsFileError> {
    File::create(path)
        .map(drop)
        .map_err(|source| HostsFileError::Create {
            path: path.display().to_string(),
            source,
        })
}

/// Serializes `(domain, address)` pairs back to the hosts format.
pub fn write_records<'a>(
    path: &Path,
    records: impl Iterator<Item = (&'a str, &'a str)>,
) -> io::Result<()> {
    let mut content = String::new();
    for (domain, address) in records {
        content.push_str(address);
        content.push(' ');
        content.push_str(domain);
        content.push('\n');
    }
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn hosts_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_address_domain_pairs() {
        let file = hosts_file("10.0.0.1 intranet.local\n93.184.216.34 example.com\n");
        let records = load_records(file.path()).unwrap();
        assert_eq!(
            records,
            vec![
                ("intranet.local".to_string(), "10.0.0.1".to_string()),
                ("example.com".to_string(), "93.184.216.34".to_string()),
            ]
        );
    }

    #[test]
    fn skips_blank_lines() {
        let file = hosts_file("\n10.0.0.1 a.example\n\n\n10.0.0.2 b.example\n\n");
        assert_eq!(load_records(file.path()).unwrap().len(), 2);
    }

    #[test]
    fn splits_on_first_and_last_space() {
        let file = hosts_file("10.0.0.1  spaced.example\n");
        let records = load_records(file.path()).unwrap();
        assert_eq!(records[0], ("spaced.example".into(), "10.0.0.1".into()));
    }

    #[test]
    fn missing_separator_is_fatal() {
        let file = hosts_file("10.0.0.1 ok.example\nbroken-line\n");
        assert!(matches!(
            load_records(file.path()),
            Err(HostsFileError::MissingSeparator { line: 2 })
        ));
    }

    #[test]
    fn round_trips_through_write_records() {
        let file = NamedTempFile::new().unwrap();
        let records = vec![
            ("example.com".to_string(), "1.2.3.4".to_string()),
            ("other.org".to_string(), "5.6.7.8".to_string()),
        ];
        write_records(
            file.path(),
            records.iter().map(|(d, a)| (d.as_str(), a.as_str())),
        )
        .unwrap();
        assert_eq!(load_records(file.path()).unwrap(), records);
    }
}
