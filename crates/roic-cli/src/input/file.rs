use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Input encodings recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Json,
    Yaml,
    Csv,
}

impl FileKind {
    pub fn from_path(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("csv") => Ok(Self::Csv),
            _ => Err(format!(
                "Cannot tell the format of '{path}'; use a .json, .yaml, .yml or .csv file"
            )
            .into()),
        }
    }
}

/// Read a JSON or YAML file, chosen by extension, into a typed struct.
pub fn read_structured<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    match FileKind::from_path(path)? {
        FileKind::Json => read_json(path),
        FileKind::Yaml => read_yaml(path),
        FileKind::Csv => Err(format!("'{path}': CSV is only accepted for batch statements").into()),
    }
}

/// Read a JSON file and deserialise into a typed struct.
pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let (canonical, contents) = read_text(path)?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read a YAML file and deserialise into a typed struct.
pub fn read_yaml<T: DeserializeOwned>(path: &str) -> Result<T, Box<dyn std::error::Error>> {
    let (canonical, contents) = read_text(path)?;
    let value: T = serde_yaml::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
    Ok(value)
}

/// Read every row of a headed CSV file.
pub fn read_csv<T: DeserializeOwned>(path: &str) -> Result<Vec<T>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;

    let mut rows = Vec::new();
    for (i, row) in reader.deserialize().enumerate() {
        // Header is line 1
        let row: T = row.map_err(|e| {
            format!("Failed to parse '{}' line {}: {}", canonical.display(), i + 2, e)
        })?;
        rows.push(row);
    }
    debug!(path = %canonical.display(), rows = rows.len(), "read CSV");
    Ok(rows)
}

fn read_text(path: &str) -> Result<(PathBuf, String), Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    debug!(path = %canonical.display(), bytes = contents.len(), "read input file");
    Ok((canonical, contents))
}

/// Resolve the path against the working directory and check it is a file.
fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }
    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_by_extension() {
        assert_eq!(FileKind::from_path("a/b.json").unwrap(), FileKind::Json);
        assert_eq!(FileKind::from_path("b.YML").unwrap(), FileKind::Yaml);
        assert_eq!(FileKind::from_path("c.yaml").unwrap(), FileKind::Yaml);
        assert_eq!(FileKind::from_path("d.csv").unwrap(), FileKind::Csv);
        assert!(FileKind::from_path("e.txt").is_err());
        assert!(FileKind::from_path("noext").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = read_json::<serde_json::Value>("definitely/not/here.json").unwrap_err();
        assert!(err.to_string().starts_with("File not found"));
    }
}
