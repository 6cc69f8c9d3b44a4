use super::*;

fn frame(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: true,
    }
}

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        frame_rate: 10.0,
        quality: 0.8,
        total_frames: 5,
    }
}

#[test]
fn flatten_over_matte() {
    let src = vec![0, 0, 0, 0, 128, 0, 0, 128, 10, 20, 30, 255];
    let mut dst = vec![0u8; src.len()];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [0, 0, 255, 255]).unwrap();
    assert_eq!(&dst[0..4], &[0, 0, 255, 255]);
    assert_eq!(&dst[4..8], &[128, 0, 127, 255]);
    assert_eq!(&dst[8..12], &[10, 20, 30, 255]);

    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut [0u8; 4], &[0u8; 8], [0; 4]).is_err());
}

#[test]
fn crf_maps_quality_range() {
    assert_eq!(vp9_crf(1.0), 10);
    assert_eq!(vp9_crf(0.0), 63);
    assert_eq!(vp9_crf(0.8), 21);
    assert_eq!(vp9_crf(7.0), 10);
    assert_eq!(vp9_crf(f64::NAN), 21);
}

#[test]
fn codec_args_per_format() {
    let webm = codec_args(ExportFormat::Webm, 0.5).unwrap();
    assert!(webm.iter().any(|a| a == "libvpx-vp9"));
    assert!(webm.windows(2).any(|w| w[0] == "-crf" && w[1] == "37"));
    assert_eq!(webm.last().map(String::as_str), Some("webm"));

    let gif = codec_args(ExportFormat::Gif, 0.5).unwrap();
    assert!(gif.iter().any(|a| a.contains("palettegen")));
    assert_eq!(gif.last().map(String::as_str), Some("gif"));

    assert!(matches!(
        codec_args(ExportFormat::PngSequence, 0.5),
        Err(MotionError::Validation(_))
    ));
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(ExportFormat::Webm));
    assert!(sink.push_frame(FrameIndex(0), &frame(2, 2, [0; 4])).is_err());
    assert!(sink.end().is_err());
    sink.abort();
    assert!(sink.take_output().is_none());
}

#[test]
fn begin_rejects_bad_config_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(ExportFormat::Gif));
    let mut bad = cfg(4, 4);
    bad.frame_rate = 0.0;
    assert!(matches!(sink.begin(bad), Err(MotionError::Validation(_))));
    assert!(matches!(sink.begin(cfg(0, 4)), Err(MotionError::Validation(_))));

    let mut png = FfmpegSink::new(FfmpegSinkOpts::new(ExportFormat::PngSequence));
    assert!(png.begin(cfg(4, 4)).is_err());
}

#[test]
fn ensure_parent_dir_creates_directories() {
    let root = std::env::temp_dir().join(format!("motionboard_parent_{}", std::process::id()));
    let path = root.join("a/b/out.webm");
    ensure_parent_dir(&path).unwrap();
    assert!(root.join("a/b").is_dir());
    ensure_parent_dir(Path::new("bare.webm")).unwrap();
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn encodes_gif_in_memory_when_ffmpeg_is_available() {
    if !is_ffmpeg_on_path() {
        eprintln!("ffmpeg not found; skipping");
        return;
    }
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(ExportFormat::Gif));
    sink.begin(cfg(8, 6)).unwrap();
    for i in 0..5 {
        let shade = (i * 50) as u8;
        sink.push_frame(FrameIndex(i), &frame(8, 6, [shade, 0, 0, 255]))
            .unwrap();
    }
    assert!(sink.push_frame(FrameIndex(2), &frame(8, 6, [0; 4])).is_err());
    sink.end().unwrap();
    let out = sink.take_output().unwrap();
    assert!(out.starts_with(b"GIF8"));
}

#[test]
fn abort_kills_running_encoder() {
    if !is_ffmpeg_on_path() {
        eprintln!("ffmpeg not found; skipping");
        return;
    }
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(ExportFormat::Webm));
    sink.begin(cfg(16, 16)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(16, 16, [0, 0, 0, 255]))
        .unwrap();
    sink.abort();
    assert!(sink.take_output().is_none());
    assert!(sink.end().is_err());
}

#[cfg(unix)]
fn fake_encoder(name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt as _;

    let dir = std::env::temp_dir().join(format!(
        "motionboard_fake_ffmpeg_{}_{name}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let script = dir.join("ffmpeg");
    // The output path is the last argument.
    std::fs::write(&script, format!("#!/bin/sh\neval out=\\${{$#}}\n{body}\n")).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(unix)]
fn wait_for_file(path: &Path) {
    for _ in 0..500 {
        if path.exists() {
            return;
        }
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    panic!("{} was never created", path.display());
}

#[cfg(unix)]
fn file_sink(script: &Path, out: &Path) -> FfmpegSink {
    FfmpegSink::new(
        FfmpegSinkOpts::new(ExportFormat::Webm)
            .with_out_path(out.to_path_buf())
            .with_binary(script.to_path_buf()),
    )
}

#[cfg(unix)]
#[test]
fn abort_and_drop_remove_partial_output_file() {
    let script = fake_encoder("abort", "printf partial > \"$out\"\ncat > /dev/null");
    let out = script.with_file_name("out.webm");

    let mut sink = file_sink(&script, &out);
    sink.begin(cfg(4, 4)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(4, 4, [0, 0, 0, 255]))
        .unwrap();
    wait_for_file(&out);
    sink.abort();
    assert!(!out.exists());

    let mut sink = file_sink(&script, &out);
    sink.begin(cfg(4, 4)).unwrap();
    wait_for_file(&out);
    drop(sink);
    assert!(!out.exists());

    let _ = std::fs::remove_dir_all(script.parent().unwrap());
}

#[cfg(unix)]
#[test]
fn failed_encode_removes_output_and_success_keeps_it() {
    let failing = fake_encoder(
        "fail",
        "printf partial > \"$out\"\ncat > /dev/null\necho 'codec exploded' >&2\nexit 1",
    );
    let out = failing.with_file_name("out.webm");
    let mut sink = file_sink(&failing, &out);
    sink.begin(cfg(4, 4)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(4, 4, [0, 0, 0, 255]))
        .unwrap();
    let err = sink.end().unwrap_err();
    assert!(matches!(err, MotionError::Encode(_)));
    assert!(err.to_string().contains("codec exploded"));
    assert!(!out.exists());

    let ok = fake_encoder("ok", "printf done > \"$out\"\ncat > /dev/null");
    let out = ok.with_file_name("out.webm");
    let mut sink = file_sink(&ok, &out);
    sink.begin(cfg(4, 4)).unwrap();
    sink.push_frame(FrameIndex(0), &frame(4, 4, [0, 0, 0, 255]))
        .unwrap();
    sink.end().unwrap();
    sink.abort();
    drop(sink);
    assert_eq!(std::fs::read(&out).unwrap(), b"done");

    let _ = std::fs::remove_dir_all(failing.parent().unwrap());
    let _ = std::fs::remove_dir_all(ok.parent().unwrap());
}
