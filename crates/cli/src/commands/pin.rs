//! File pinning command.

use std::path::Path;

use agrimarket_storefront::config::MarketConfig;
use agrimarket_storefront::pinning::PinningClient;

use super::CliError;

/// Pin an image file and print its content identifier.
pub async fn run(path: &Path) -> Result<(), CliError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::Invalid(format!("bad file name: {}", path.display())))?
        .to_string();
    let content_type = mime_for_extension(path).ok_or_else(|| {
        CliError::Invalid(format!(
            "'{file_name}' does not look like an image; only images are pinned"
        ))
    })?;

    let bytes = tokio::fs::read(path).await?;

    let config = MarketConfig::from_env()?;
    let pinning = PinningClient::new(&config.pinning);

    let cid = pinning.pin_image(&file_name, content_type, bytes).await?;
    println!("Pinned {file_name}");
    println!("  cid: {cid}");
    println!("  url: {}", pinning.gateway_url(&cid));
    Ok(())
}

/// Image MIME type by file extension.
fn mime_for_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_extension_images() {
        assert_eq!(mime_for_extension(Path::new("a.png")), Some("image/png"));
        assert_eq!(mime_for_extension(Path::new("a.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_extension(Path::new("a.webp")), Some("image/webp"));
    }

    #[test]
    fn test_mime_for_extension_rejects_other_files() {
        assert_eq!(mime_for_extension(Path::new("notes.pdf")), None);
        assert_eq!(mime_for_extension(Path::new("no_extension")), None);
    }
}
