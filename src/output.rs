//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use vaultshare_entity::file::{File, FileVersion};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One file as a table row.
#[derive(Debug, Serialize, Tabled)]
pub struct FileRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Type")]
    pub mime_type: String,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Version")]
    pub version: i32,
    #[tabled(rename = "Updated")]
    pub updated: String,
}

impl From<&File> for FileRow {
    fn from(file: &File) -> Self {
        Self {
            id: file.id.to_string(),
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: human_size(file.size_bytes),
            status: file.status.to_string(),
            version: file.current_version,
            updated: file.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// One version as a table row.
#[derive(Debug, Serialize, Tabled)]
pub struct VersionRow {
    #[tabled(rename = "Version")]
    pub version: i32,
    #[tabled(rename = "Size")]
    pub size: String,
    #[tabled(rename = "Checksum")]
    pub checksum: String,
    #[tabled(rename = "Created")]
    pub created: String,
    #[tabled(rename = "Comment")]
    pub comment: String,
}

impl From<&FileVersion> for VersionRow {
    fn from(version: &FileVersion) -> Self {
        Self {
            version: version.version_number,
            size: human_size(version.size_bytes),
            checksum: version.checksum_sha256.chars().take(16).collect(),
            created: version.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            comment: version.comment.clone(),
        }
    }
}

/// Print files in the selected format.
pub fn print_files(files: &[File], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<FileRow> = files.iter().map(FileRow::from).collect();
            print_list(&rows, format);
        }
        OutputFormat::Json => print_json(&files),
    }
}

/// Print a single file in the selected format.
pub fn print_file(file: &File, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            print_kv("ID", &file.id.to_string());
            print_kv("Name", &file.name);
            print_kv("Original name", &file.original_name);
            print_kv("Type", &file.mime_type);
            print_kv("Size", &human_size(file.size_bytes));
            print_kv("Status", file.status.as_str());
            print_kv("Version", &file.current_version.to_string());
            print_kv(
                "Checksum",
                file.checksum_sha256.as_deref().unwrap_or("-"),
            );
            if let Some(description) = &file.description {
                print_kv("Description", description);
            }
            let tags = file.tag_list();
            if !tags.is_empty() {
                print_kv("Tags", &tags.join(", "));
            }
            if let Some(deleted_at) = file.deleted_at {
                print_kv("Deleted", &deleted_at.to_rfc3339());
            }
        }
        OutputFormat::Json => print_json(file),
    }
}

/// Print versions in the selected format.
pub fn print_versions(versions: &[FileVersion], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<VersionRow> = versions.iter().map(VersionRow::from).collect();
            print_list(&rows, format);
        }
        OutputFormat::Json => print_json(&versions),
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(&items),
    }
}

fn print_json<T: Serialize + ?Sized>(item: &T) {
    let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "null".to_string());
    println!("{json}");
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<16} {}", format!("{key}:"), value);
}

/// Format a byte count with a binary unit.
pub fn human_size(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
