//! `.env` reading and merging.
//!
//! Init owns only the managed keys: merging replaces their values in place
//! and appends missing ones, while comments, blank lines, and unmanaged
//! keys pass through untouched. Writes go through a temp file in the target
//! directory so a crash never leaves a half-written `.env`.

use std::{
    collections::{HashMap, HashSet},
    io::Write,
    path::Path,
};

use anyhow::{Context, Result};

pub fn read_env_map(path: &Path) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    if !path.exists() {
        return Ok(map);
    }

    for entry in dotenvy::from_path_iter(path)? {
        let (key, value) = entry?;
        map.insert(key, value);
    }

    Ok(map)
}

pub fn merge_env_contents(
    existing: &str,
    kv: &[(String, String)],
    managed: &HashSet<String>,
) -> String {
    let updates: HashMap<&str, &str> = kv
        .iter()
        .filter(|(key, _)| managed.contains(key))
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();

    let mut written: HashSet<&str> = HashSet::new();
    let mut lines: Vec<String> = Vec::new();

    for line in existing.lines() {
        match line_key(line).and_then(|key| updates.get_key_value(key)) {
            Some((&key, &value)) => {
                // Duplicate managed lines collapse into the first one.
                if written.insert(key) {
                    lines.push(format!("{key}={value}"));
                }
            }
            None => lines.push(line.to_string()),
        }
    }

    for (key, value) in kv {
        if managed.contains(key) && !written.contains(key.as_str()) {
            lines.push(format!("{key}={value}"));
        }
    }

    let mut merged = lines.join("\n");
    merged.push('\n');
    merged
}

pub fn write_env_atomically(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut temp = match dir {
        Some(dir) => tempfile::NamedTempFile::new_in(dir),
        None => tempfile::NamedTempFile::new_in("."),
    }
    .context("failed to create temporary env file")?;

    temp.write_all(contents.as_bytes())
        .context("failed to write env contents")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(temp.path(), permissions)
            .context("failed to restrict env file permissions")?;
    }

    temp.persist(path)
        .with_context(|| format!("failed to persist {}", path.display()))?;
    Ok(())
}

fn line_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return None;
    }
    let (key, _) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() { None } else { Some(key) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn managed(keys: &[&str]) -> HashSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn kv(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_managed_keys_in_place() {
        let merged = merge_env_contents(
            "# picasort\nDATABASE_NAME=old\nCUSTOM=untouched\n",
            &kv(&[("DATABASE_NAME", "picasort")]),
            &managed(&["DATABASE_NAME"]),
        );
        assert_eq!(
            merged,
            "# picasort\nDATABASE_NAME=picasort\nCUSTOM=untouched\n"
        );
    }

    #[test]
    fn appends_missing_managed_keys() {
        let merged = merge_env_contents(
            "CUSTOM=1\n",
            &kv(&[("DATABASE_NAME", "picasort"), ("DATABASE_PORT", "5432")]),
            &managed(&["DATABASE_NAME", "DATABASE_PORT"]),
        );
        assert_eq!(
            merged,
            "CUSTOM=1\nDATABASE_NAME=picasort\nDATABASE_PORT=5432\n"
        );
    }

    #[test]
    fn unmanaged_kv_pairs_are_not_written() {
        let merged = merge_env_contents(
            "",
            &kv(&[("NOT_MANAGED", "x")]),
            &managed(&["DATABASE_NAME"]),
        );
        assert_eq!(merged, "\n");
    }

    #[test]
    fn drops_duplicate_managed_lines() {
        let merged = merge_env_contents(
            "DATABASE_NAME=a\nDATABASE_NAME=b\n",
            &kv(&[("DATABASE_NAME", "picasort")]),
            &managed(&["DATABASE_NAME"]),
        );
        assert_eq!(merged, "DATABASE_NAME=picasort\n");
    }

    #[test]
    fn atomic_write_round_trips_through_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        write_env_atomically(&path, "DATABASE_NAME=picasort\n").unwrap();

        let map = read_env_map(&path).unwrap();
        assert_eq!(map.get("DATABASE_NAME").map(String::as_str), Some("picasort"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode =
                std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn missing_env_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let map = read_env_map(&dir.path().join(".env")).unwrap();
        assert!(map.is_empty());
    }
}
