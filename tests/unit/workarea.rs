use super::*;

fn upload(area: &WorkArea, index: usize, name: &str, bytes: &[u8]) -> PathBuf {
    let path = area.image_upload_path(index, name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn each_run_gets_its_own_directory() {
    let root = tempfile::tempdir().unwrap();
    let a = WorkArea::create(root.path()).unwrap();
    let b = WorkArea::create(root.path()).unwrap();

    assert_ne!(a.run_id(), b.run_id());
    assert_ne!(a.path(), b.path());
    assert!(a.images_dir().is_dir());
    assert!(a.path().starts_with(root.path()));
    assert!(
        a.path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(RUN_DIR_PREFIX)
    );
    assert_eq!(a.silent_video_path().parent(), Some(a.path()));
    assert_eq!(a.final_video_path().parent(), Some(a.path()));
}

#[test]
fn dropping_removes_the_run_directory() {
    let root = tempfile::tempdir().unwrap();
    let area = WorkArea::create(root.path()).unwrap();
    let path = area.path().to_path_buf();
    upload(&area, 0, "a.png", b"x");
    drop(area);
    assert!(!path.exists());

    let area = WorkArea::create(root.path()).unwrap();
    let path = area.path().to_path_buf();
    area.close().unwrap();
    assert!(!path.exists());
}

#[test]
fn saved_uploads_are_sanitized_and_not_overwritten() {
    let root = tempfile::tempdir().unwrap();
    let area = WorkArea::create(root.path()).unwrap();

    let first = upload(&area, 0, "../x/slide.png", b"one");
    let second = upload(&area, 1, "slide.png", b"two");
    let foreign = upload(&area, 2, "图片.jpg", b"three");

    assert_eq!(first, area.images_dir().join("slide.png"));
    assert_eq!(second, area.images_dir().join("slide_1.png"));
    assert_eq!(foreign, area.images_dir().join("image_0002.jpg"));
    assert_eq!(std::fs::read(&first).unwrap(), b"one");
    assert_eq!(std::fs::read(&second).unwrap(), b"two");

    let audio = area.audio_upload_path("my song.mp3").unwrap();
    assert!(audio.starts_with(area.path()));
    assert_eq!(audio.file_name().unwrap(), "my_song.mp3");
    assert_ne!(audio, area.trimmed_audio_path());
}

#[test]
fn suffixed_names_never_collide_with_later_uploads() {
    let root = tempfile::tempdir().unwrap();
    let area = WorkArea::create(root.path()).unwrap();

    let a = upload(&area, 0, "a.png", b"one");
    let b = upload(&area, 1, "a_2.png", b"two");
    let c = upload(&area, 2, "a.png", b"three");
    let d = upload(&area, 3, "a.png", b"four");

    assert_eq!(b, area.images_dir().join("a_2.png"));
    assert_eq!(c, area.images_dir().join("a_3.png"));
    assert_eq!(d, area.images_dir().join("a_4.png"));
    for (path, bytes) in [(a, "one"), (b, "two"), (c, "three"), (d, "four")] {
        assert_eq!(std::fs::read_to_string(path).unwrap(), bytes);
    }
    assert_eq!(std::fs::read_dir(area.images_dir()).unwrap().count(), 4);
}

#[test]
fn sweep_removes_only_old_abandoned_run_directories() {
    let root = tempfile::tempdir().unwrap();
    let abandoned = root.path().join(format!("{RUN_DIR_PREFIX}{}", Uuid::now_v7()));
    std::fs::create_dir(&abandoned).unwrap();
    std::fs::create_dir(root.path().join("run-leftover")).unwrap();
    std::fs::create_dir(root.path().join("keep-me")).unwrap();
    let live = WorkArea::create(root.path()).unwrap();

    let young = WorkArea::sweep_stale(root.path(), STALE_AFTER).unwrap();
    assert_eq!(young, 0);

    // Everything counts as stale with a zero threshold; live runs and non-run entries survive.
    let removed = WorkArea::sweep_stale(root.path(), Duration::ZERO).unwrap();
    assert_eq!(removed, 2);
    assert!(!abandoned.exists());
    assert!(root.path().join("keep-me").exists());
    assert!(live.path().is_dir());
    assert!(live.images_dir().is_dir());

    let path = live.path().to_path_buf();
    live.close().unwrap();
    assert!(!path.exists());
    std::fs::create_dir(&path).unwrap();
    assert_eq!(WorkArea::sweep_stale(root.path(), Duration::ZERO).unwrap(), 1);
}

#[test]
fn sweep_of_missing_root_is_a_noop() {
    let root = tempfile::tempdir().unwrap();
    let missing = root.path().join("nope");
    assert_eq!(WorkArea::sweep_stale(&missing, Duration::ZERO).unwrap(), 0);
}
