use std::sync::Arc;

use diagramkit_core::{AnchorPosition, Dimensions, Position};
use diagramkit_designer::model::{
    ConnectionPoint, Connector, ConnectorKind, Entity, Shape, ShapeKind, ShapeStyle,
};
use diagramkit_designer::registry::{default_shape_validators, ShapeValidatorFn};
use diagramkit_designer::validation::{
    connector_rule, is_valid_color, rules, shape_rule, validate_entity, ValidationBuilder,
    ValidationContext, ValidationResult,
};
use std::collections::HashMap;

fn rect(id: &str, x: f64, y: f64) -> Shape {
    Shape::new(
        id,
        ShapeKind::Rectangle,
        Position::new(x, y),
        Dimensions::new(100.0, 50.0),
    )
}

fn shape_map(shapes: &[Shape]) -> HashMap<String, Shape> {
    shapes
        .iter()
        .map(|s| (s.id().to_string(), s.clone()))
        .collect()
}

#[test]
fn test_valid_rectangle_passes() {
    let result = shape_rule(&rect("a", 0.0, 0.0), ValidationContext::new());
    assert!(result.is_valid(), "{:?}", result.errors());
}

#[test]
fn test_builder_collects_every_failure() {
    let mut shape = Shape::new(
        "",
        ShapeKind::Rectangle,
        Position::new(f64::NAN, 0.0),
        Dimensions::new(0.0, -5.0),
    );
    shape.style.fill_color = Some("not-a-color".to_string());

    let result = shape_rule(&shape, ValidationContext::new());
    assert!(!result.is_valid());
    let errors = result.errors();
    assert!(errors.iter().any(|e| e.contains("id must be")));
    assert!(errors.iter().any(|e| e.contains("position")));
    assert!(errors.iter().any(|e| e.contains("width must be greater than 0")));
    assert!(errors.iter().any(|e| e.contains("height must not be negative")));
    assert!(errors.iter().any(|e| e.contains("fillColor")));
}

#[test]
fn test_validation_is_idempotent() {
    let mut shape = rect("a", 0.0, 0.0);
    shape.style.stroke_width = Some(500.0);
    let first = shape_rule(&shape, ValidationContext::new());
    let second = shape_rule(&shape, ValidationContext::new());
    assert_eq!(first, second);
    assert_eq!(first.errors().len(), 1);
}

#[test]
fn test_rule_if_skips_when_condition_false() {
    let shape = rect("a", 0.0, 0.0);
    let result = ValidationBuilder::new(&shape)
        .rule_if(false, |_, _| ValidationResult::invalid("never"))
        .rule(|_, _| ValidationResult::valid())
        .execute();
    assert!(result.is_valid());
}

#[test]
fn test_colors() {
    for ok in ["#fff", "#FFFFFF", "rgb(0, 128, 255)", "rgba(1,2,3,0.5)", "red", "transparent"] {
        assert!(is_valid_color(ok), "{ok} should be valid");
    }
    for bad in [
        "#ff",
        "#12345",
        "#11223344",
        "rgb(256,0,0)",
        "rgb(1,2)",
        "rgba(1,2,3)",
        "blurple",
        "",
    ] {
        assert!(!is_valid_color(bad), "{bad} should be invalid");
    }
}

#[test]
fn test_anchor_token_rule() {
    assert!(rules::anchor_token("source.anchor", "ne").is_valid());
    let bad = rules::anchor_token("source.anchor", "north");
    assert!(!bad.is_valid());
    assert!(bad.errors()[0].contains("source.anchor 'north'"));
}

#[test]
fn test_connector_requires_existing_shapes_with_context() {
    let shapes = shape_map(&[rect("a", 0.0, 0.0)]);
    let connector = Connector::new(
        "c1",
        ConnectionPoint::new("a", AnchorPosition::E),
        ConnectionPoint::new("missing", AnchorPosition::W),
        ConnectorKind::Straight,
    );

    assert!(connector_rule(&connector, ValidationContext::new()).is_valid());

    let result = connector_rule(&connector, ValidationContext::new().with_shapes(&shapes));
    assert_eq!(
        result.errors(),
        ["target shape 'missing' does not exist".to_string()]
    );
}

#[test]
fn test_connector_empty_shape_id_and_negative_curvature() {
    let connector = Connector::new(
        "c1",
        ConnectionPoint::new("", AnchorPosition::E),
        ConnectionPoint::new("b", AnchorPosition::W),
        ConnectorKind::Curved { curvature: -1.0 },
    );
    let result = connector_rule(&connector, ValidationContext::new());
    assert!(result.errors().iter().any(|e| e.contains("source.shapeId")));
    assert!(result.errors().iter().any(|e| e.contains("curvature")));
}

#[test]
fn test_registered_validator_runs_for_its_type() {
    let mut registry = default_shape_validators();
    let validator: ShapeValidatorFn = Arc::new(|shape: &Shape| {
        ValidationResult::check(shape.dimensions.width <= 50.0, || {
            "gateways must be at most 50 wide".to_string()
        })
    });
    registry.register("gateway", validator);

    let wide = Shape::new(
        "g",
        ShapeKind::gateway(Default::default()),
        Position::new(0.0, 0.0),
        Dimensions::new(80.0, 50.0),
    );
    let ctx = ValidationContext::new().with_validators(&registry);
    assert!(!shape_rule(&wide, ctx).is_valid());
    assert!(shape_rule(&wide, ValidationContext::new()).is_valid());
}

#[test]
fn test_builtin_pool_validator() {
    let registry = default_shape_validators();
    let pool = Shape::new(
        "p",
        ShapeKind::Pool { header_width: 300.0 },
        Position::new(0.0, 0.0),
        Dimensions::new(200.0, 100.0),
    );
    let result = shape_rule(&pool, ValidationContext::new().with_validators(&registry));
    assert!(!result.is_valid());
}

#[test]
fn test_validate_entity_dispatches() {
    let shape = rect("a", 0.0, 0.0).with_style(ShapeStyle {
        text_color: Some("#000".to_string()),
        ..ShapeStyle::default()
    });
    assert!(validate_entity(&Entity::Shape(shape), ValidationContext::new()).is_valid());
}

#[test]
fn test_into_result_maps_to_validation_error() {
    let err = ValidationResult::invalid("boom")
        .into_result("x")
        .expect_err("invalid result should fail");
    assert!(err.is_validation());
    assert_eq!(err.messages(), ["boom".to_string()]);
}
