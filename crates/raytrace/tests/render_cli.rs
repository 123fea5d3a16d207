use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

fn raytrace(config_dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_raytrace"));
    command
        .env("RAYTRACE_CONFIG_DIR", config_dir.path())
        .env_remove("RAYTRACE_CONFIG")
        .stdin(Stdio::null());
    command
}

#[test]
fn renders_scene_to_png() {
    let root = TempDir::new().unwrap();
    let output = root.path().join("debug.png");

    let status = raytrace(&root)
        .args(["debug", "--size", "24x12", "--samples", "1", "-o"])
        .arg(&output)
        .status()
        .expect("failed to run raytrace");

    assert!(status.success());
    let image = image::open(&output).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (24, 12));
    assert_eq!(image.get_pixel(5, 5).0, [255, 0, 255]);
}

#[test]
fn config_file_supplies_defaults() {
    let root = TempDir::new().unwrap();
    let output = root.path().join("from-config.bmp");
    fs::write(
        root.path().join("config.toml"),
        format!(
            r#"
version = 1
[image]
width = 16
height = 16
[sampler]
kind = "regular"
samples = 1
[defaults]
scene = "3.1"
output = "{}"
"#,
            output.display().to_string().replace('\\', "\\\\")
        ),
    )
    .unwrap();

    let status = raytrace(&root).status().expect("failed to run raytrace");
    assert!(status.success());
    let image = image::open(&output).unwrap().to_rgb8();
    assert_eq!(image.get_pixel(8, 8).0, [255, 0, 0]);
}

#[test]
fn stop_command_still_saves_image() {
    let root = TempDir::new().unwrap();
    let output = root.path().join("partial.png");

    let mut child = raytrace(&root)
        .args(["3.2", "--size", "400x400", "--samples", "16", "-o"])
        .arg(&output)
        .stdin(Stdio::piped())
        .spawn()
        .expect("failed to spawn raytrace");
    {
        let mut stdin = child.stdin.take().unwrap();
        writeln!(stdin, "bogus").unwrap();
        writeln!(stdin, "stop").unwrap();
    }

    let status = child.wait().unwrap();
    assert!(status.success());
    let image = image::open(&output).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (400, 400));
}

#[test]
fn background_image_seeds_the_canvas() {
    let root = TempDir::new().unwrap();
    let seed = root.path().join("seed.png");
    image::RgbImage::from_pixel(6, 6, image::Rgb([0, 0, 200]))
        .save(&seed)
        .unwrap();
    let output = root.path().join("seeded.png");

    let status = raytrace(&root)
        .args(["debug", "--size", "6x6", "--background"])
        .arg(&seed)
        .arg("-o")
        .arg(&output)
        .status()
        .expect("failed to run raytrace");
    assert!(status.success());
    assert_eq!(image::open(&output).unwrap().to_rgb8().dimensions(), (6, 6));

    let missing = raytrace(&root)
        .args(["debug", "--size", "6x6", "--background"])
        .arg(root.path().join("absent.png"))
        .output()
        .expect("failed to run raytrace");
    assert!(!missing.status.success());
    assert!(String::from_utf8_lossy(&missing.stderr).contains("background image"));
}

#[test]
fn unknown_scene_fails() {
    let root = TempDir::new().unwrap();
    let output = raytrace(&root)
        .arg("9.9")
        .output()
        .expect("failed to run raytrace");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown scene"));
}

#[test]
fn scenes_subcommand_lists_builtins() {
    let root = TempDir::new().unwrap();
    let output = raytrace(&root)
        .arg("scenes")
        .output()
        .expect("failed to run raytrace");
    assert!(output.status.success());
    let listing = String::from_utf8_lossy(&output.stdout);
    for name in ["3.1", "3.2", "4.4a", "math", "debug"] {
        assert!(listing.contains(name), "missing {name} in {listing}");
    }
}
