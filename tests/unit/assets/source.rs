use super::*;

#[test]
fn normalizes_relative_paths() {
    assert_eq!(normalize_rel_path("a/./b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a//b.png").unwrap(), "a/b.png");
}

#[test]
fn rejects_absolute_traversal_and_empty_paths() {
    for bad in ["/etc/passwd", "../x.png", "a/../../x.png", "", "./"] {
        assert!(normalize_rel_path(bad).is_err(), "{bad}");
    }
}

#[test]
fn memory_source_returns_registered_bytes() {
    let mut src = MemoryAssetSource::new();
    src.insert("logo.png", vec![1, 2, 3]);
    assert_eq!(load_bytes("logo.png", &src).unwrap(), vec![1, 2, 3]);
    let err = load_bytes("missing.png", &src).unwrap_err();
    assert!(matches!(err, MotionError::Asset(_)));
}

#[test]
fn base64_data_uri_is_decoded_inline() {
    let src = MemoryAssetSource::new();
    let bytes = load_bytes("data:application/octet-stream;base64,AAEC/w==", &src).unwrap();
    assert_eq!(bytes, vec![0, 1, 2, 255]);
}

#[test]
fn plain_data_uri_is_percent_decoded() {
    let src = MemoryAssetSource::new();
    let bytes = load_bytes("data:image/svg+xml,%3Csvg%3E%zz", &src).unwrap();
    assert_eq!(bytes, b"<svg>%zz".to_vec());
}

#[test]
fn malformed_data_uris_are_asset_errors() {
    let src = MemoryAssetSource::new();
    assert!(matches!(
        load_bytes("data:image/png;base64", &src),
        Err(MotionError::Asset(_))
    ));
    assert!(matches!(
        load_bytes("data:image/png;base64,!!!", &src),
        Err(MotionError::Asset(_))
    ));
}

#[test]
fn fs_source_reads_under_root() {
    let dir = std::env::temp_dir().join(format!("motionboard_fs_source_{}", std::process::id()));
    std::fs::create_dir_all(dir.join("img")).unwrap();
    std::fs::write(dir.join("img/a.bin"), [7u8, 8, 9]).unwrap();

    let src = FsAssetSource::new(&dir);
    assert_eq!(src.read("img/a.bin").unwrap(), vec![7, 8, 9]);
    assert!(src.read("img/missing.bin").is_err());
    assert!(src.read("../escape.bin").is_err());

    let _ = std::fs::remove_dir_all(&dir);
}
