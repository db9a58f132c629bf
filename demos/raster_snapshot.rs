//! Raster snapshot example - renders a figure off-screen and saves a PNG

use offprint::scene::{Axes, Figure, GraphicsObject, Line, Marker, Text};
use offprint::{GraphicsManager, Rgba};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("offprint - Raster Snapshot Example\n");

    let mut manager = GraphicsManager::new();
    let figure = manager.add_figure(Figure::new(480.0, 320.0));
    let axes = manager.add_child(
        figure,
        GraphicsObject::Axes(Axes {
            xlim: [0.0, 6.3],
            ylim: [-1.2, 1.2],
            title: Some("sin(x)".into()),
            ..Default::default()
        }),
    )?;

    let xdata: Vec<f64> = (0..=63).map(|i| i as f64 / 10.0).collect();
    let ydata = xdata.iter().map(|x| x.sin()).collect();
    manager.add_child(
        axes,
        GraphicsObject::Line(Line {
            xdata,
            ydata,
            line_width: 2.0,
            ..Default::default()
        }),
    )?;
    manager.add_child(
        axes,
        GraphicsObject::Line(Line {
            xdata: vec![1.5708, 4.7124],
            ydata: vec![1.0, -1.0],
            color: Rgba::rgb(0.85, 0.325, 0.098),
            marker: Some(Marker::Square),
            ..Default::default()
        }),
    )?;
    manager.add_child(
        axes,
        GraphicsObject::Text(Text {
            position: [1.7, 1.05, 0.0],
            string: "max".into(),
            ..Default::default()
        }),
    )?;

    let image = offprint::render_image(&mut manager, figure)?;
    let (channels, height, width) = image.shape();
    println!("Tensor shape: ({}, {}, {})", channels, height, width);
    println!("SHA-256: {}", image.sha256_hex());

    if let Some(rgb) = image.to_rgb_image() {
        rgb.save("raster_snapshot.png")?;
        println!("Wrote raster_snapshot.png");
    }
    Ok(())
}
