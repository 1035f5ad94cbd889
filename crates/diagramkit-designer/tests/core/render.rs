use std::collections::HashMap;
use std::sync::Arc;

use diagramkit_core::{AnchorPosition, Dimensions, Position};
use diagramkit_designer::connector_geometry::{compute_geometry, GeometryOptions};
use diagramkit_designer::model::{
    ConnectionPoint, Connector, ConnectorKind, EventType, Shape, ShapeKind, ShapeStyle,
    TextLayout, TextPlacement,
};
use diagramkit_designer::render::{rectangle_outline, RenderTheme, Renderers, ShapeRenderFn};

fn shape(kind: ShapeKind) -> Shape {
    Shape::new("s", kind, Position::new(0.0, 0.0), Dimensions::new(100.0, 50.0))
}

#[test]
fn test_theme_fallback_and_style_override() {
    let theme = RenderTheme::default();
    let renderers = Renderers::default();

    let plain = renderers.render_shape(&shape(ShapeKind::task()), &theme);
    assert_eq!(plain.fill, theme.fill_color);
    assert_eq!(plain.stroke_width, theme.stroke_width);
    assert!(plain.text.is_none());

    let styled = shape(ShapeKind::Rectangle).with_style(ShapeStyle {
        fill_color: Some("#ff0000".to_string()),
        ..ShapeStyle::default()
    });
    let visual = renderers.render_shape(&styled, &theme);
    assert_eq!(visual.fill, "#ff0000");
}

#[test]
fn test_end_event_has_thicker_stroke() {
    let theme = RenderTheme::default();
    let renderers = Renderers::default();
    let start = renderers.render_shape(&shape(ShapeKind::event(EventType::Start)), &theme);
    let end = renderers.render_shape(&shape(ShapeKind::event(EventType::End)), &theme);
    assert!(end.stroke_width > start.stroke_width);
}

#[test]
fn test_label_below_shape() {
    let theme = RenderTheme::default();
    let labelled = shape(ShapeKind::event(EventType::Start)).with_text(TextLayout {
        text_placement: TextPlacement::Below,
        ..TextLayout::with_text("Start")
    });
    let visual = Renderers::default().render_shape(&labelled, &theme);
    assert_eq!(visual.text.map(|t| t.text), Some("Start".to_string()));
    assert!(visual.text_anchor.y > 50.0);
}

#[test]
fn test_unknown_custom_type_falls_back_to_rectangle() {
    let theme = RenderTheme::default();
    let custom = shape(ShapeKind::Custom {
        type_name: "datastore".to_string(),
        sub_type: None,
    });
    let visual = Renderers::default().render_shape(&custom, &theme);
    assert_eq!(visual.bounds, custom.bounds());
}

#[test]
fn test_registered_renderer_is_used_and_reset_removes_it() {
    let theme = RenderTheme::default();
    let mut renderers = Renderers::default();
    let custom: ShapeRenderFn = Arc::new(|shape: &Shape, theme: &RenderTheme| {
        let mut visual = rectangle_outline(shape, theme);
        visual.fill = "#123456".to_string();
        visual
    });
    renderers.shapes.register("gateway:parallel", custom);

    let parallel = shape(ShapeKind::gateway(
        diagramkit_designer::model::GatewayType::Parallel,
    ));
    assert_eq!(renderers.render_shape(&parallel, &theme).fill, "#123456");

    renderers.reset();
    assert_eq!(renderers.render_shape(&parallel, &theme).fill, theme.fill_color);
}

#[test]
fn test_connector_arrowheads() {
    let size = Dimensions::new(100.0, 50.0);
    let shapes: HashMap<String, Shape> = [
        Shape::new("a", ShapeKind::Rectangle, Position::new(0.0, 0.0), size),
        Shape::new("b", ShapeKind::Rectangle, Position::new(200.0, 0.0), size),
    ]
    .into_iter()
    .map(|s| (s.id().to_string(), s))
    .collect();
    let mut connector = Connector::new(
        "c",
        ConnectionPoint::new("a", AnchorPosition::E),
        ConnectionPoint::new("b", AnchorPosition::W),
        ConnectorKind::Straight,
    );
    connector.arrow_start = true;
    let geometry = compute_geometry(&connector, &shapes, &GeometryOptions::default()).unwrap();

    let visual =
        Renderers::default().render_connector(&connector, &geometry, &RenderTheme::default());
    assert_eq!(visual.arrowheads.len(), 2);
    let end = visual.arrowheads[1];
    assert_eq!(end.tip, Position::new(200.0, 25.0));
    let [tip, left, right] = end.triangle(10.0, 0.5);
    assert_eq!(tip, end.tip);
    assert!(left.x < 200.0 && right.x < 200.0);
}
