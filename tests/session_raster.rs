use offprint::rendering::ContextRegistry;
use offprint::scene::{Axes, Figure, GraphicsObject, Line, Patch};
use offprint::{
    Error, GraphicsManager, Handle, OutputMode, PrintConfig, RenderOutput, RenderSession,
    SceneHost, SessionState,
};

fn line_figure(width: f64, height: f64) -> (GraphicsManager, Handle) {
    let mut manager = GraphicsManager::new();
    let figure = manager.add_figure(Figure::new(width, height));
    let axes = manager
        .add_child(figure, GraphicsObject::Axes(Axes::default()))
        .unwrap();
    manager
        .add_child(
            axes,
            GraphicsObject::Line(Line {
                xdata: vec![0.0, 0.25, 0.5, 0.75, 1.0],
                ydata: vec![0.0, 1.0, 0.0, 1.0, 0.0],
                ..Default::default()
            }),
        )
        .unwrap();
    (manager, figure)
}

#[test]
fn tensor_shape_is_channels_height_width() {
    let (mut manager, figure) = line_figure(64.0, 48.0);
    let image = offprint::render_image(&mut manager, figure).unwrap();
    assert_eq!(image.shape(), (3, 48, 64));
    assert_eq!(image.as_slice().len(), 3 * 48 * 64);
}

#[test]
fn fractional_figure_size_is_truncated() {
    let (mut manager, figure) = line_figure(30.9, 20.2);
    let image = offprint::render_image(&mut manager, figure).unwrap();
    assert_eq!(image.shape(), (3, 20, 30));
}

#[test]
fn background_keeps_rgb_channel_order() {
    let mut manager = GraphicsManager::new();
    let figure = manager.add_figure(Figure {
        color: offprint::Rgba::rgb(1.0, 0.0, 0.0),
        ..Figure::new(8.0, 4.0)
    });
    let image = offprint::render_image(&mut manager, figure).unwrap();
    assert!(image.channel(0).iter().all(|&s| s == 255));
    assert!(image.channel(1).iter().all(|&s| s == 0));
    assert!(image.channel(2).iter().all(|&s| s == 0));
}

#[test]
fn first_tensor_row_is_the_top_of_the_figure() {
    let mut manager = GraphicsManager::new();
    let figure = manager.add_figure(Figure::new(20.0, 20.0));
    let axes = manager
        .add_child(
            figure,
            GraphicsObject::Axes(Axes {
                position: [0.0, 0.0, 1.0, 1.0],
                color: None,
                box_color: None,
                ..Default::default()
            }),
        )
        .unwrap();
    manager
        .add_child(
            axes,
            GraphicsObject::Patch(Patch {
                vertices: vec![
                    [0.0, 0.5, 0.0],
                    [1.0, 0.5, 0.0],
                    [1.0, 1.0, 0.0],
                    [0.0, 1.0, 0.0],
                ],
                faces: vec![vec![0, 1, 2, 3]],
                face_color: offprint::Rgba::rgb(0.0, 0.0, 1.0),
                edge_color: None,
                ..Default::default()
            }),
        )
        .unwrap();

    let image = offprint::render_image(&mut manager, figure).unwrap();
    // upper half blue, lower half the white background
    assert_eq!(image.get(0, 0, 10), Some(0));
    assert_eq!(image.get(2, 0, 10), Some(255));
    assert_eq!(image.get(0, 19, 10), Some(255));
    assert_eq!(image.get(2, 19, 10), Some(255));
}

#[test]
fn repeated_renders_are_byte_identical() {
    let (mut manager, figure) = line_figure(96.0, 64.0);
    let a = offprint::render_image(&mut manager, figure).unwrap();
    let b = offprint::render_image(&mut manager, figure).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.sha256_hex(), b.sha256_hex());
}

#[test]
fn non_figure_handles_fail_without_creating_a_context() {
    let (mut manager, figure) = line_figure(16.0, 16.0);
    let axes = manager.resolve(figure).unwrap().children()[0];
    let before = ContextRegistry::live_count();

    for handle in [axes, Handle(9999)] {
        let err = offprint::render_image(&mut manager, handle).unwrap_err();
        assert!(matches!(err, Error::InvalidHandle(_)), "{:?}", err);
    }
    assert_eq!(ContextRegistry::live_count(), before);
    assert!(manager.visibility_log().is_empty());
}

#[test]
fn visible_figure_is_toggled_and_reacquires_its_canvas() {
    let (mut manager, figure) = line_figure(32.0, 32.0);
    let canvas = manager.attach_canvas(figure).unwrap();
    let before = ContextRegistry::live_count();

    let mut session = RenderSession::new(PrintConfig::default());
    let out = session
        .render(&mut manager, figure, OutputMode::Raster)
        .unwrap();
    assert!(matches!(out, RenderOutput::Image(_)));
    assert_eq!(session.state(), SessionState::Cleaned);

    assert!(manager.is_visible(figure));
    assert_eq!(
        manager.visibility_log(),
        &[(figure, false), (figure, true)]
    );
    assert_eq!(ContextRegistry::current(), Some(canvas));
    assert_eq!(ContextRegistry::live_count(), before);
}

#[test]
fn hidden_figure_is_left_alone() {
    let (mut manager, figure) = line_figure(32.0, 32.0);
    manager.set_visible(figure, false);
    offprint::render_image(&mut manager, figure).unwrap();
    assert_eq!(manager.visibility_log(), &[(figure, false)]);
    assert!(!manager.is_visible(figure));
}

#[test]
fn bind_failure_cleans_up_and_disturbs_nothing() {
    let (mut manager, figure) = line_figure(32.0, 8.0);
    let canvas = manager.attach_canvas(figure).unwrap();
    let before = ContextRegistry::live_count();

    let config = PrintConfig {
        max_viewport: 16,
        ..Default::default()
    };
    let err = RenderSession::new(config)
        .render(&mut manager, figure, OutputMode::Raster)
        .unwrap_err();
    assert!(matches!(err, Error::ContextBindFailed(_)), "{:?}", err);

    assert_eq!(ContextRegistry::live_count(), before);
    assert_eq!(ContextRegistry::current(), Some(canvas));
    assert!(manager.visibility_log().is_empty());
    assert!(manager.is_visible(figure));
}

#[test]
fn empty_figure_fails_to_bind() {
    let (mut manager, figure) = line_figure(0.0, 10.0);
    let err = offprint::render_image(&mut manager, figure).unwrap_err();
    assert!(matches!(err, Error::ContextBindFailed(_)), "{:?}", err);
}
