use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use compress_client::{
    BatchRunner, ClientError, CompressClient, CompressOptions, Compressor, FileSelection,
    Outcome, SelectedFile, archive_offered, build_archive,
};
use compress_core::OutputFormat;
use compress_server::{AppState, ServerConfig, router};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tokio::net::TcpListener;

async fn start_server() -> String {
    let mut config = ServerConfig::default();
    config.max_concurrent_encodes = 2;
    let app = router(AppState::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn client(base_url: &str) -> CompressClient {
    CompressClient::new(base_url, Duration::from_secs(60)).unwrap()
}

fn jpeg(name: &str, width: u32, height: u32) -> SelectedFile {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, 92))
        .unwrap();
    SelectedFile::new(name, "image/jpeg", Bytes::from(buf.into_inner()))
}

fn png(name: &str, width: u32, height: u32) -> SelectedFile {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::new_rgba8(width, height)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    SelectedFile::new(name, "image/png", Bytes::from(buf.into_inner()))
}

#[tokio::test]
async fn compresses_photo_to_requested_width() {
    let base_url = start_server().await;
    let photo = jpeg("photo.jpg", 2000, 1500);
    let options = CompressOptions::new(OutputFormat::WebP, 75, Some(800)).unwrap();

    let runner = BatchRunner::new(Arc::new(client(&base_url)));
    let report = runner.run(&[photo.clone()], &options).await.unwrap();

    let compressed = report.successes().next().unwrap();
    assert_eq!(compressed.filename, "photo.webp");
    assert!(compressed.size() < photo.size());
    assert!(compressed.saved_percent > 0.0);

    let decoded = image::load_from_memory(&compressed.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (800, 600));
}

#[tokio::test]
async fn batch_reports_every_file_and_packages_successes() {
    let base_url = start_server().await;

    let mut selection = FileSelection::new();
    let broken = SelectedFile::new("broken.png", "image/png", Bytes::from_static(b"not a png"));
    let notes = SelectedFile::new("notes.txt", "text/plain", Bytes::from_static(b"hi"));
    let result = selection.select(vec![
        png("a.png", 64, 32),
        broken,
        notes,
        jpeg("b.jpg", 48, 48),
    ]);
    assert!(result.is_err());
    assert_eq!(selection.files().len(), 3);

    selection.probe().await;
    assert_eq!(selection.items().len(), 3);

    let options = CompressOptions::new(OutputFormat::WebP, 60, None).unwrap();
    let runner = BatchRunner::new(Arc::new(client(&base_url))).with_concurrency(2);
    let report = runner.run(selection.files(), &options).await.unwrap();

    let names: Vec<_> = report.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.png", "broken.png", "b.jpg"]);
    assert_eq!(report.success_count(), 2);
    match &report.files[1].outcome {
        Outcome::Failure { reason } => assert!(reason.contains("could not be decoded")),
        other => panic!("expected failure, got {other:?}"),
    }

    assert!(archive_offered(&report));
    let archive = build_archive(report.successes()).unwrap();
    let zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut entries: Vec<_> = zip.file_names().map(str::to_string).collect();
    entries.sort();
    assert_eq!(
        entries,
        vec![
            "optimized_images/",
            "optimized_images/a.webp",
            "optimized_images/b.webp"
        ]
    );
}

#[tokio::test]
async fn server_error_descriptor_reaches_client() {
    let base_url = start_server().await;
    let file = SelectedFile::new("fake.jpg", "image/jpeg", Bytes::from_static(b"\xFF\xD8junk"));

    let result = client(&base_url)
        .compress(&file, &CompressOptions::default())
        .await;

    match result {
        Err(ClientError::Rejected { status, message }) => {
            assert_eq!(status, 422);
            assert!(message.starts_with("image could not be decoded"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}
