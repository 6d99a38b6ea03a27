//! Unit tests for response handlers

use imagegen_studio::provider::ImageRef;
use imagegen_studio::response::{base64, ResponseHandler};

use crate::support::{png_data_uri, ScriptedBackend, PNG_BYTES};

#[test]
fn test_base64_encode_decode() {
    let original = b"Hello, World!";
    let encoded = base64::encode(original);
    let decoded = base64::decode(&encoded).unwrap();

    assert_eq!(original.as_slice(), decoded.as_slice());
}

#[test]
fn test_base64_decode_data_url() {
    let data_url = "data:image/png;base64,SGVsbG8sIFdvcmxkIQ==";
    let decoded = base64::decode(data_url).unwrap();

    assert_eq!(b"Hello, World!", decoded.as_slice());
}

#[test]
fn test_base64_decode_rejects_garbage() {
    assert!(base64::decode("data:image/png;base64,not valid base64!!!").is_err());
}

#[test]
fn test_get_mime_from_data_url() {
    assert_eq!(
        base64::get_mime_from_data_url("data:image/png;base64,abc"),
        Some("image/png")
    );
    assert_eq!(
        base64::get_mime_from_data_url("data:image/webp;base64,abc"),
        Some("image/webp")
    );
    assert_eq!(base64::get_mime_from_data_url("data:text/plain;base64,abc"), None);
    assert_eq!(base64::get_mime_from_data_url("https://img.example/a.png"), None);
}

#[test]
fn test_create_data_url() {
    let data_url = base64::create_data_url(&PNG_BYTES, "image/png");
    assert!(data_url.starts_with("data:image/png;base64,"));

    let decoded = base64::decode(&data_url).unwrap();
    assert_eq!(PNG_BYTES.as_slice(), decoded.as_slice());
}

#[test]
fn test_detect_mime_and_extension() {
    assert_eq!(base64::detect_mime(&PNG_BYTES), Some("image/png"));
    assert_eq!(
        base64::detect_mime(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0]),
        Some("image/jpeg")
    );
    assert_eq!(base64::detect_mime(b"short"), None);

    assert_eq!(base64::extension_for_mime("image/jpeg"), "jpg");
    assert_eq!(base64::extension_for_mime("image/webp"), "webp");
    assert_eq!(base64::extension_for_mime("application/octet-stream"), "png");
}

#[tokio::test]
async fn test_resolve_batch_reports_per_image() {
    let backend = ScriptedBackend::new();
    let handler = ResponseHandler::new(backend.as_ref());

    let images = vec![
        ("e_0".to_string(), png_data_uri()),
        ("e_1".to_string(), ImageRef::url("https://img.example/gone.png")),
        ("e_2".to_string(), ImageRef("data:image/png;base64,@@@".to_string())),
    ];

    let statuses = handler.resolve_batch(&images).await;
    let ok: Vec<bool> = statuses.iter().map(|s| s.ok).collect();
    assert_eq!(ok, vec![true, false, false]);
    assert_eq!(statuses[0].bytes, Some(PNG_BYTES.len()));
    assert!(statuses[2].error.is_some());
}

#[tokio::test]
async fn test_resolved_filename_uses_mime() {
    let backend = ScriptedBackend::new();
    let handler = ResponseHandler::new(backend.as_ref());

    let jpeg = ImageRef(base64::create_data_url(&[0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3, 4], "image/jpeg"));
    let resolved = handler.resolve("abc_0", &jpeg).await.unwrap();
    assert_eq!(resolved.filename(), "flux_abc_0.jpg");
}
