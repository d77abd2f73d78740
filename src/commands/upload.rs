//! File upload command.

use std::path::PathBuf;

use bytes::Bytes;
use clap::Args;

use vaultshare_core::config::AppConfig;
use vaultshare_core::error::AppError;
use vaultshare_entity::file::FileMetadata;
use vaultshare_service::InitializeUpload;

use super::OwnerArg;
use crate::output::{self, OutputFormat};

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Path to the file to upload
    pub path: PathBuf,

    #[command(flatten)]
    pub owner: OwnerArg,

    /// Override file name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Override the MIME type guessed from the file name
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Chunk size in bytes (defaults to the configured hint)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// File description
    #[arg(long)]
    pub description: Option<String>,

    /// Tags (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

/// Execute the upload command
pub async fn execute(
    args: &UploadArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let content = tokio::fs::read(&args.path).await.map_err(|e| {
        AppError::with_source(
            vaultshare_core::ErrorKind::NotFound,
            format!("Failed to read {}", args.path.display()),
            e,
        )
    })?;

    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| AppError::invalid_request("Cannot derive a file name from the path"))?,
    };
    let mime_type = args.mime_type.clone().unwrap_or_else(|| {
        mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    });

    let services = super::build_services(config).await?;
    let ctx = args.owner.context();
    let chunk_size = match args.chunk_size {
        Some(size) => size,
        None => usize::try_from(services.upload.chunk_size_hint())
            .map_err(|_| AppError::configuration("upload.chunk_size_bytes is out of range"))?,
    }
    .max(1);

    let file = services
        .upload
        .initialize(
            &ctx,
            InitializeUpload {
                name,
                mime_type,
                size_bytes: content.len() as u64,
                metadata: FileMetadata {
                    description: args.description.clone(),
                    tags: args.tags.clone(),
                    ..FileMetadata::default()
                },
            },
        )
        .await?;

    let content = Bytes::from(content);
    let mut offset = 0;
    let mut chunk_number = 0;
    while offset < content.len() {
        let end = (offset + chunk_size).min(content.len());
        services
            .upload
            .upload_chunk(&ctx, file.id, chunk_number, content.slice(offset..end))
            .await?;
        offset = end;
        chunk_number += 1;
    }

    let file = services.upload.complete(&ctx, file.id).await?;
    if format == OutputFormat::Table {
        output::print_success(&format!(
            "Uploaded '{}' in {} chunk(s)",
            file.name, chunk_number
        ));
    }
    output::print_file(&file, format);
    Ok(())
}
