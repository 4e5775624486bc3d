use std::time::Duration;

use geoviz_rs::pipeline::retention::evict_expired;

#[tokio::test]
async fn expired_outputs_are_removed() {
    let dir = tempfile::tempdir().expect("dir");
    std::fs::write(dir.path().join("8888_output_video.mp4"), b"a").expect("write");
    std::fs::write(dir.path().join("1111_output_video.mp4"), b"b").expect("write");
    std::fs::create_dir(dir.path().join("nested")).expect("subdir");

    let removed = evict_expired(dir.path(), Duration::ZERO).await.expect("evict");

    assert_eq!(removed, 2);
    assert!(dir.path().join("nested").exists());
}

#[tokio::test]
async fn unrelated_files_are_kept() {
    let dir = tempfile::tempdir().expect("dir");
    let video = dir.path().join("8888_output_video.mp4");
    let page = dir.path().join("index.html");
    let other_video = dir.path().join("intro.mp4");
    for path in [&video, &page, &other_video] {
        std::fs::write(path, b"a").expect("write");
    }

    let removed = evict_expired(dir.path(), Duration::ZERO).await.expect("evict");

    assert_eq!(removed, 1);
    assert!(!video.exists());
    assert!(page.exists());
    assert!(other_video.exists());
}

#[tokio::test]
async fn fresh_outputs_are_kept() {
    let dir = tempfile::tempdir().expect("dir");
    let video = dir.path().join("8888_output_video.mp4");
    std::fs::write(&video, b"a").expect("write");

    let removed = evict_expired(dir.path(), Duration::from_secs(3600))
        .await
        .expect("evict");

    assert_eq!(removed, 0);
    assert!(video.exists());
}

#[tokio::test]
async fn missing_directory_is_empty() {
    let dir = tempfile::tempdir().expect("dir");

    let removed = evict_expired(&dir.path().join("static"), Duration::ZERO)
        .await
        .expect("evict");

    assert_eq!(removed, 0);
}
