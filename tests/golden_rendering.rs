use std::fs;
use std::path::PathBuf;

use offprint::{GraphicsManager, Handle};

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

fn load_scene(name: &str) -> (GraphicsManager, Handle) {
    let json = fs::read_to_string(format!("tests/goldens/scenes/{}", name)).expect("read scene");
    let mut manager = GraphicsManager::new();
    let figures = manager.load_json(&json).expect("load scene");
    (manager, figures[0])
}

/// Compare `digest` with the stored fixture, or refresh it under UPDATE_GOLDENS.
/// Without a fixture only the caller's own checks apply.
fn check_golden(name: &str, digest: &str) {
    let expected_path = golden_path(name);
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, digest).expect("write golden");
        println!("Updated golden: {:?}", expected_path);
        return;
    }

    if !expected_path.exists() {
        println!(
            "No golden at {:?}; run with UPDATE_GOLDENS=1 to record it.",
            expected_path
        );
        return;
    }

    let exp = fs::read_to_string(&expected_path).expect("unable to read golden");
    let exp_bytes = hex::decode(exp.trim()).expect("invalid hex in golden");
    assert_eq!(hex::decode(digest).unwrap(), exp_bytes);
}

#[test]
fn golden_raster_matches_fixture() {
    let (mut manager, figure) = load_scene("surface.json");
    let image = offprint::render_image(&mut manager, figure).expect("render");
    assert_eq!(image.shape(), (3, 120, 160));
    let again = offprint::render_image(&mut manager, figure).expect("render");
    assert_eq!(image.sha256_hex(), again.sha256_hex());
    // something other than the white background was drawn
    assert!(image.as_slice().iter().any(|&s| s < 128));

    check_golden("surface.raster.sha256", &image.sha256_hex());
}

#[cfg(feature = "vector")]
fn export_scene(name: &str, term: &str) -> String {
    let (mut manager, figure) = load_scene(name);
    let path = std::env::temp_dir().join(format!(
        "offprint-golden-{}-{}.svg",
        std::process::id(),
        term
    ));
    offprint::render_to_file(&mut manager, figure, &path, term).expect("export");
    let svg = fs::read_to_string(&path).expect("read export");
    fs::remove_file(&path).ok();
    svg
}

#[cfg(feature = "vector")]
#[test]
fn golden_svg_matches_fixture() {
    use sha2::{Digest, Sha256};

    let svg = export_scene("surface.json", "svg");
    assert_eq!(svg, export_scene("surface.json", "svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains(">peaks</text>"));
    assert!(svg.contains(">max</text>"));
    // the bent surface cells come out in more pieces than the simple sort draws
    let simple = export_scene("surface.json", "svgis2D");
    assert!(svg.matches("<polygon").count() > simple.matches("<polygon").count());

    check_golden("surface.svg.sha256", &hex::encode(Sha256::digest(svg.as_bytes())));
}
