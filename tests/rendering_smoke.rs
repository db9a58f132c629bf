use offprint::rendering::{
    extract, ContextConfig, ContextRegistry, OffscreenContext, RasterRenderer, RenderTarget,
    Vertex,
};
use offprint::scene::{Axes, Figure, GraphicsObject, Line};
use offprint::{GraphicsManager, PixelBuffer};

#[test]
fn smoke_bind_draw_extract() {
    let mut manager = GraphicsManager::new();
    let figure = manager.add_figure(Figure::new(256.0, 128.0));
    let axes = manager
        .add_child(figure, GraphicsObject::Axes(Axes::default()))
        .unwrap();
    manager
        .add_child(
            axes,
            GraphicsObject::Line(Line {
                xdata: vec![0.0, 1.0],
                ydata: vec![0.0, 1.0],
                ..Default::default()
            }),
        )
        .unwrap();

    let mut ctx = OffscreenContext::create(ContextConfig::SOFTWARE).unwrap();
    assert!(ctx.bind(PixelBuffer::allocate(256, 128).unwrap(), 256, 128));
    RasterRenderer::new(&mut ctx).draw(&manager, figure);

    let buffer = ctx.buffer().unwrap();
    assert_eq!(buffer.len(), 256 * 128 * 4);
    let image = extract(buffer.as_bytes(), buffer.width(), buffer.height());
    assert_eq!(image.width(), 256);
    assert_eq!(image.height(), 128);
    // the figure background is white and the plot is not
    assert_eq!(image.get(0, 0, 0), Some(255));
    assert!(image.as_slice().iter().any(|&s| s < 255));
}

#[test]
fn smoke_context_slot_follows_bind_and_destroy() {
    let before = ContextRegistry::live_count();
    let mut ctx = OffscreenContext::create(ContextConfig::SOFTWARE).unwrap();
    assert_eq!(ContextRegistry::current(), None);
    assert!(ctx.bind(PixelBuffer::allocate(4, 4).unwrap(), 4, 4));
    assert_eq!(ContextRegistry::current(), Some(ctx.id()));

    let mut r = RasterRenderer::new(&mut ctx);
    r.begin(offprint::Dimensions::new(4, 4), offprint::Rgba::BLACK);
    r.point(Vertex::new(2.0, 2.0, 0.0), offprint::Rgba::WHITE, 1.0);

    ctx.destroy();
    assert_eq!(ContextRegistry::current(), None);
    assert_eq!(ContextRegistry::live_count(), before);
}
