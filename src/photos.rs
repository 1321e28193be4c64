use anyhow::Context;
use bytes::Bytes;
use time::Date;
use tracing::debug;
use uuid::Uuid;

use crate::{dates::format_date, storage::StorageClient};

/// Best-effort content type from the leading magic bytes.
pub fn sniff_content_type(body: &[u8]) -> &'static str {
    match body {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [_, _, _, _, b'f', b't', b'y', b'p', b'h', b'e', b'i', b'c', ..] => "image/heic",
        _ => "application/octet-stream",
    }
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

pub fn photo_key(date: Date, entry_id: Uuid, content_type: &str) -> anyhow::Result<String> {
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    Ok(format!("entries/{}/{}.{}", format_date(date)?, entry_id, ext))
}

/// Uploads a meal photo and returns its object key.
pub async fn upload_meal_photo(
    storage: &dyn StorageClient,
    date: Date,
    entry_id: Uuid,
    body: Bytes,
) -> anyhow::Result<String> {
    let content_type = sniff_content_type(&body);
    let key = photo_key(date, entry_id, content_type)?;
    let size = body.len();
    storage
        .put_object(&key, body, content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    debug!(%entry_id, %key, size, "meal photo uploaded");
    Ok(key)
}

pub async fn presign_meal_photo(
    storage: &dyn StorageClient,
    key: &str,
    ttl_secs: u64,
) -> anyhow::Result<String> {
    storage
        .presign_get(key, ttl_secs)
        .await
        .with_context(|| format!("presign url for {}", key))
}
