use super::*;

#[test]
fn format_tags_name_their_files() {
    assert_eq!(FormatTag::Gif.extension(), "gif");
    assert_eq!(FormatTag::Apng.extension(), "png");
    assert_eq!(FormatTag::Apng.mime_type(), "image/apng");
    assert_eq!(FormatTag::Apng.to_string(), "apng");
}

#[test]
fn save_forces_extension_and_creates_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let art = EncodedArtifact::new(b"GIF89a-payload".to_vec(), FormatTag::Gif);
    let out = art.save(dir.path().join("nested/deeper/spin.webp")).unwrap();
    assert_eq!(out, dir.path().join("nested/deeper/spin.gif"));
    assert_eq!(std::fs::read(&out).unwrap(), art.bytes());

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("nested/deeper"))
        .unwrap()
        .collect();
    assert_eq!(leftovers.len(), 1);
}

#[test]
fn save_overwrites_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("spin.png");
    std::fs::write(&target, b"old").unwrap();
    let art = EncodedArtifact::new(vec![1, 2, 3], FormatTag::Apng);
    assert_eq!(art.save(&target).unwrap(), target);
    assert_eq!(std::fs::read(&target).unwrap(), vec![1, 2, 3]);
    assert_eq!(art.size(), 3);
}

#[test]
fn debug_omits_payload() {
    let art = EncodedArtifact::new(vec![0; 4096], FormatTag::Gif);
    let s = format!("{art:?}");
    assert!(s.contains("4096"));
    assert!(s.len() < 80);
}

#[test]
fn into_bytes_hands_over_the_payload() {
    let art = EncodedArtifact::new(b"GIF89a".to_vec(), FormatTag::Gif);
    assert_eq!(art.size(), 6);
    assert_eq!(art.into_bytes(), b"GIF89a".to_vec());
}
