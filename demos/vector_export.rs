//! Vector export example - writes one surface in every supported format

use offprint::Format;
use offprint::GraphicsManager;

const SCENE: &str = r#"{
  "figures": [{
    "position": [0, 0, 400, 300],
    "axes": [{
      "view": [-37.5, 30],
      "xlim": [-1, 1],
      "ylim": [-1, 1],
      "zlim": [0, 1],
      "title": "saddle",
      "children": [
        {
          "type": "surface",
          "xdata": [-1, -0.5, 0, 0.5, 1],
          "ydata": [-1, -0.5, 0, 0.5, 1],
          "zdata": [
            [0.5, 0.69, 0.75, 0.69, 0.5],
            [0.31, 0.5, 0.56, 0.5, 0.31],
            [0.25, 0.44, 0.5, 0.44, 0.25],
            [0.31, 0.5, 0.56, 0.5, 0.31],
            [0.5, 0.69, 0.75, 0.69, 0.5]
          ]
        }
      ]
    }]
  }]
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("offprint - Vector Export Example\n");

    let mut manager = GraphicsManager::new();
    let figure = manager.load_json(SCENE)?[0];

    for format in Format::ALL {
        let path = format!("saddle.{}", format.extension());
        match offprint::render_to_file(&mut manager, figure, &path, format.token()) {
            Ok(()) => println!("Wrote {}", path),
            Err(e) => eprintln!("Error writing {}: {}", path, e),
        }
    }

    // 2D sort without text, for comparison with the BSP output
    offprint::render_to_file(&mut manager, figure, "saddle-simple.svg", "svgis2Dnotext")?;
    println!("Wrote saddle-simple.svg");
    Ok(())
}
