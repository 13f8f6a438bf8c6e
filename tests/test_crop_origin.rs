use std::fs;
use std::path::Path;
use std::process::Command;

use map_crop_origin::map_pipeline::{
    Advisory, CropError, CropMargins, CropOriginConfig, CropOriginPipeline, RasterImage,
};
use serde_yml::Value;
use tempfile::TempDir;

const MAP_YAML: &str = "image: maps/office.pgm\n\
                        resolution: 0.05\n\
                        origin: [0.0, 0.0, 0.0]\n\
                        negate: 0\n\
                        occupied_thresh: 0.65\n\
                        free_thresh: 0.196\n";

fn noise(x: usize, y: usize) -> u8 {
    let mut h = (x as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (y as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    h ^= h >> 29;
    h = h.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    h ^= h >> 32;
    (h & 0xFF) as u8
}

fn write_pgm(path: &Path, image: &RasterImage) {
    let mut bytes = format!("P5\n{} {}\n255\n", image.width, image.height).into_bytes();
    bytes.extend_from_slice(&image.data);
    fs::write(path, bytes).unwrap();
}

fn block_map() -> RasterImage {
    RasterImage::from_fn(10, 10, |x, y| {
        if (3..7).contains(&x) && (2..6).contains(&y) { 0 } else { 254 }
    })
    .unwrap()
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(yaml: &str, original: &RasterImage, crop: &RasterImage) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("office.yaml"), yaml).unwrap();
        write_pgm(&dir.path().join("office.pgm"), original);
        fs::create_dir(dir.path().join("cropped")).unwrap();
        write_pgm(&dir.path().join("cropped/office_crop.pgm"), crop);
        Self { dir }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, config: CropOriginConfig) -> map_crop_origin::map_pipeline::Result<map_crop_origin::map_pipeline::CropReport> {
        CropOriginPipeline::new(config).process_files(
            self.path("office.yaml"),
            self.path("office.pgm"),
            self.path("cropped/office_crop.pgm"),
            self.path("office_crop.yaml"),
        )
    }

    fn output(&self) -> Value {
        serde_yml::from_str(&fs::read_to_string(self.path("office_crop.yaml")).unwrap()).unwrap()
    }
}

fn origin_of(value: &Value) -> Vec<f64> {
    value
        .get("origin")
        .and_then(Value::as_sequence)
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect()
}

#[test]
fn test_block_scenario_end_to_end() {
    let original = block_map();
    let crop = original.sub_image(3, 2, 4, 4).unwrap();
    let ws = Workspace::new(MAP_YAML, &original, &crop);

    let report = ws.run(CropOriginConfig::default()).unwrap();
    assert_eq!(report.margins, CropMargins::new(3, 3, 2, 4));

    let output = ws.output();
    let origin = origin_of(&output);
    assert_eq!(origin.len(), 3);
    assert!((origin[0] - 0.15).abs() < 1e-9);
    assert!((origin[1] - 0.20).abs() < 1e-9);
    assert_eq!(origin[2], 0.0);
    assert_eq!(output.get("image").and_then(Value::as_str), Some("maps/office_crop.pgm"));
    assert_eq!(output.get("resolution").and_then(Value::as_f64), Some(0.05));
    assert_eq!(output.get("free_thresh").and_then(Value::as_f64), Some(0.196));
    assert_eq!(output.get("negate").and_then(Value::as_i64), Some(0));
}

#[test]
fn test_textured_map_end_to_end() {
    let original = RasterImage::from_fn(180, 140, noise).unwrap();
    let crop = original.sub_image(25, 40, 90, 70).unwrap();
    let yaml = "image: office.pgm\nresolution: 0.1\norigin: [-9.0, -7.0]\nmode: trinary\n";
    let ws = Workspace::new(yaml, &original, &crop);

    let report = ws.run(CropOriginConfig::default()).unwrap();

    // right = 180 - 115, bottom = 140 - 110
    assert_eq!(report.margins, CropMargins::new(25, 65, 40, 30));
    assert!(report.is_clean());

    let output = ws.output();
    let origin = origin_of(&output);
    assert!((origin[0] - (-9.0 + 2.5)).abs() < 1e-9);
    assert!((origin[1] - (-7.0 + 3.0)).abs() < 1e-9);
    assert_eq!(origin[2], 0.0);
    assert_eq!(output.get("image").and_then(Value::as_str), Some("office_crop.pgm"));
    assert_eq!(output.get("mode").and_then(Value::as_str), Some("trinary"));
}

#[test]
fn test_nan_yaw_end_to_end() {
    let original = block_map();
    let crop = original.sub_image(3, 2, 4, 4).unwrap();
    let yaml = "image: /srv/maps/office.pgm\nresolution: 0.05\norigin: [1.0, 2.0, .nan]\n";
    let ws = Workspace::new(yaml, &original, &crop);

    let report = ws.run(CropOriginConfig::default()).unwrap();

    assert!(report.advisories.iter().any(|a| matches!(a, Advisory::InvalidYawValue { .. })));
    let output = ws.output();
    let origin = origin_of(&output);
    assert_eq!(origin[2], 0.0);
    assert!((origin[0] - 1.15).abs() < 1e-9);
    assert!((origin[1] - 2.20).abs() < 1e-9);
    assert_eq!(output.get("image").and_then(Value::as_str), Some("/srv/maps/office_crop.pgm"));
}

#[test]
fn test_swapped_images_write_nothing() {
    let original = block_map();
    let crop = original.sub_image(3, 2, 4, 4).unwrap();
    // crop stored as the original and vice versa
    let ws = Workspace::new(MAP_YAML, &crop, &original);

    let result = ws.run(CropOriginConfig::default());

    assert!(matches!(result, Err(CropError::DimensionMismatch { .. })));
    assert!(!ws.path("office_crop.yaml").exists());
}

#[test]
fn test_missing_input_is_reported_before_reading() {
    let original = block_map();
    let ws = Workspace::new(MAP_YAML, &original, &original);
    fs::remove_file(ws.path("office.pgm")).unwrap();

    let result = ws.run(CropOriginConfig::default());

    match result {
        Err(CropError::MissingInput(path)) => assert!(path.ends_with("office.pgm")),
        other => panic!("expected MissingInput, got {:?}", other.map(|r| r.margins)),
    }
    assert!(!ws.path("office_crop.yaml").exists());
}

#[test]
fn test_undecodable_image() {
    let original = block_map();
    let ws = Workspace::new(MAP_YAML, &original, &original);
    fs::write(ws.path("cropped/office_crop.pgm"), b"P5\nnot a header").unwrap();

    let result = ws.run(CropOriginConfig::default());

    assert!(matches!(result, Err(CropError::ImageDecodeError(_))));
    assert!(!ws.path("office_crop.yaml").exists());
}

#[test]
fn test_binary_success_exit_code() {
    let original = block_map();
    let crop = original.sub_image(3, 2, 4, 4).unwrap();
    let ws = Workspace::new(MAP_YAML, &original, &crop);

    let status = Command::new(env!("CARGO_BIN_EXE_map_crop_origin"))
        .arg(ws.path("office.yaml"))
        .arg(ws.path("office.pgm"))
        .arg(ws.path("cropped/office_crop.pgm"))
        .arg(ws.path("office_crop.yaml"))
        .arg("--single-thread")
        .status()
        .unwrap();

    assert!(status.success());
    let origin = origin_of(&ws.output());
    assert!((origin[0] - 0.15).abs() < 1e-9);
}

#[test]
fn test_binary_failure_exit_code() {
    let original = block_map();
    let crop = original.sub_image(3, 2, 4, 4).unwrap();
    let ws = Workspace::new(MAP_YAML, &original, &crop);

    // swapped image arguments
    let status = Command::new(env!("CARGO_BIN_EXE_map_crop_origin"))
        .arg(ws.path("office.yaml"))
        .arg(ws.path("cropped/office_crop.pgm"))
        .arg(ws.path("office.pgm"))
        .arg(ws.path("office_crop.yaml"))
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(!ws.path("office_crop.yaml").exists());
}

#[test]
fn test_binary_usage_error_exit_code() {
    let status = Command::new(env!("CARGO_BIN_EXE_map_crop_origin"))
        .arg("only-one-argument.yaml")
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
}
